//! In-process model of the page markup the controller drives.

use std::collections::BTreeMap;

use shared::domain::View;

use crate::{
    file::UploadFile,
    render::{blocks_to_html, blocks_to_text, escape_html, Block, Tone},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="{}">{}</div>"#,
            Tone::from(self.kind).class(),
            escape_html(&self.text)
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Section {
    visible: bool,
    /// Newest first.
    notices: Vec<Notice>,
    body: Vec<Block>,
}

impl Section {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn body(&self) -> &[Block] {
        &self.body
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    sections: BTreeMap<View, Section>,
    file_input: Option<UploadFile>,
    next_notice_id: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self::with_sections(View::ALL)
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page whose markup only contains some of the sections.
    pub fn with_sections(views: impl IntoIterator<Item = View>) -> Self {
        Self {
            sections: views
                .into_iter()
                .map(|view| (view, Section::default()))
                .collect(),
            file_input: None,
            next_notice_id: 1,
        }
    }

    pub fn has_section(&self, view: View) -> bool {
        self.sections.contains_key(&view)
    }

    pub fn section(&self, view: View) -> Option<&Section> {
        self.sections.get(&view)
    }

    /// Hides every present section, then shows `view` if the page has it.
    /// Returns whether `view` ended up visible.
    pub fn show_only(&mut self, view: View) -> bool {
        self.hide_all();
        match self.sections.get_mut(&view) {
            Some(section) => {
                section.visible = true;
                true
            }
            None => false,
        }
    }

    pub fn hide_all(&mut self) {
        for section in self.sections.values_mut() {
            section.visible = false;
        }
    }

    pub fn visible_views(&self) -> Vec<View> {
        self.sections
            .iter()
            .filter(|(_, section)| section.visible)
            .map(|(view, _)| *view)
            .collect()
    }

    pub fn current_view(&self) -> Option<View> {
        self.visible_views().into_iter().next()
    }

    pub fn is_visible(&self, view: View) -> bool {
        self.sections.get(&view).is_some_and(Section::is_visible)
    }

    /// Inserts a notice at the top of the visible section. `None` when no
    /// section is visible.
    pub fn insert_notice(
        &mut self,
        kind: NoticeKind,
        text: impl Into<String>,
    ) -> Option<(View, NoticeId)> {
        let view = self.current_view()?;
        let id = NoticeId(self.next_notice_id);
        self.next_notice_id += 1;
        let section = self.sections.get_mut(&view)?;
        section.notices.insert(
            0,
            Notice {
                id,
                kind,
                text: text.into(),
            },
        );
        Some((view, id))
    }

    /// Detaches a notice wherever it is. False when it was already gone.
    pub fn remove_notice(&mut self, id: NoticeId) -> bool {
        for section in self.sections.values_mut() {
            if let Some(pos) = section.notices.iter().position(|notice| notice.id == id) {
                section.notices.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn contains_notice(&self, id: NoticeId) -> bool {
        self.all_notices().any(|notice| notice.id == id)
    }

    pub fn notices(&self, view: View) -> &[Notice] {
        self.sections
            .get(&view)
            .map(Section::notices)
            .unwrap_or_default()
    }

    pub fn all_notices(&self) -> impl Iterator<Item = &Notice> {
        self.sections.values().flat_map(|section| section.notices.iter())
    }

    pub fn set_body(&mut self, view: View, blocks: Vec<Block>) -> bool {
        match self.sections.get_mut(&view) {
            Some(section) => {
                section.body = blocks;
                true
            }
            None => false,
        }
    }

    pub fn body(&self, view: View) -> &[Block] {
        self.sections
            .get(&view)
            .map(Section::body)
            .unwrap_or_default()
    }

    pub fn body_text(&self, view: View) -> String {
        blocks_to_text(self.body(view))
    }

    pub fn body_html(&self, view: View) -> String {
        blocks_to_html(self.body(view))
    }

    /// Notices followed by body, as the section's inner markup.
    pub fn section_html(&self, view: View) -> String {
        let notices: String = self.notices(view).iter().map(Notice::to_html).collect();
        format!("{notices}{}", self.body_html(view))
    }

    pub fn file_input(&self) -> Option<&UploadFile> {
        self.file_input.as_ref()
    }

    pub fn set_file_input(&mut self, file: Option<UploadFile>) {
        self.file_input = file;
    }

    pub fn clear_file_input(&mut self) {
        self.file_input = None;
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
