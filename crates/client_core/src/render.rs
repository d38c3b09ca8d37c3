//! Structured page content and its HTML encoding.
//!
//! Content is kept as blocks of plain text and only turned into markup by
//! [`Block::to_html`], which encodes every text field on the way out.

use shared::protocol::{ResumeSummary, UploadResult};

use crate::page::NoticeKind;

pub const LOADING_MESSAGE: &str = "Analyzing your resume...";
pub const NO_DATA_MESSAGE: &str = "No data to display";
pub const NO_RESUMES_MESSAGE: &str = "No resumes uploaded yet";

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// CSS class attached to a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Loading,
}

impl Tone {
    pub fn class(self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Error => "error",
            Tone::Loading => "loading",
        }
    }
}

impl From<NoticeKind> for Tone {
    fn from(kind: NoticeKind) -> Self {
        match kind {
            NoticeKind::Success => Tone::Success,
            NoticeKind::Error => Tone::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph {
        tone: Option<Tone>,
        text: String,
    },
    /// Titled value, rendered as a `resume-field` group.
    Field {
        title: String,
        value: String,
        tone: Option<Tone>,
    },
}

impl Block {
    pub fn paragraph(tone: Option<Tone>, text: impl Into<String>) -> Self {
        Block::Paragraph {
            tone,
            text: text.into(),
        }
    }

    pub fn field(title: impl Into<String>, value: impl Into<String>, tone: Option<Tone>) -> Self {
        Block::Field {
            title: title.into(),
            value: value.into(),
            tone,
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            Block::Paragraph { tone, text } => paragraph_html(*tone, text),
            Block::Field { title, value, tone } => format!(
                r#"<div class="resume-field"><h3>{}</h3>{}</div>"#,
                escape_html(title),
                paragraph_html(*tone, value)
            ),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Block::Paragraph { text, .. } => text.clone(),
            Block::Field { title, value, .. } => format!("{title}: {value}"),
        }
    }
}

fn paragraph_html(tone: Option<Tone>, text: &str) -> String {
    match tone {
        Some(tone) => format!(r#"<p class="{}">{}</p>"#, tone.class(), escape_html(text)),
        None => format!("<p>{}</p>", escape_html(text)),
    }
}

pub fn blocks_to_html(blocks: &[Block]) -> String {
    blocks.iter().map(Block::to_html).collect()
}

pub fn blocks_to_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(Block::to_text)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn loading_placeholder() -> Vec<Block> {
    vec![Block::paragraph(Some(Tone::Loading), LOADING_MESSAGE)]
}

pub fn inline_message(kind: NoticeKind, text: impl Into<String>) -> Vec<Block> {
    vec![Block::paragraph(Some(kind.into()), text)]
}

/// Status message and file identifier of an upload, or the generic fallback
/// when there is nothing identifiable to show.
pub fn upload_result_blocks(data: Option<&UploadResult>) -> Vec<Block> {
    let Some((data, resume_id)) = data.and_then(|d| d.file_id().map(|id| (d, id))) else {
        return inline_message(NoticeKind::Error, NO_DATA_MESSAGE);
    };

    vec![
        Block::field(
            "Upload Status",
            data.message.clone().unwrap_or_default(),
            Some(Tone::Success),
        ),
        Block::field("File ID", resume_id.as_str(), None),
    ]
}

pub fn resume_list_blocks(resumes: &[ResumeSummary]) -> Vec<Block> {
    if resumes.is_empty() {
        return vec![Block::paragraph(None, NO_RESUMES_MESSAGE)];
    }

    resumes
        .iter()
        .map(|resume| {
            let title = match (&resume.name, &resume.id) {
                (Some(name), _) if !name.trim().is_empty() => name.clone(),
                (_, Some(id)) => format!("Resume {id}"),
                _ => "Unnamed resume".to_string(),
            };
            let mut details = Vec::new();
            if let Some(email) = resume.email.as_deref().filter(|e| !e.is_empty()) {
                details.push(email.to_string());
            }
            if !resume.skills.is_empty() {
                details.push(format!("Skills: {}", resume.skills.join(", ")));
            }
            Block::field(title, details.join(" | "), None)
        })
        .collect()
}
