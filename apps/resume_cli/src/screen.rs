//! Plain-text rendering of the page for the terminal.

use client_core::{NoticeKind, Page, View};

pub fn render_page(page: &Page) -> String {
    let Some(view) = page.current_view() else {
        return "(no section visible)\n".to_string();
    };

    let mut out = format!("[{}]\n", view.section_id());
    for notice in page.notices(view) {
        let marker = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        };
        out.push_str(&format!("  ({marker}) {}\n", notice.text));
    }
    for line in page.body_text(view).lines() {
        out.push_str(&format!("  {line}\n"));
    }
    if view == View::Upload {
        if let Some(file) = page.file_input() {
            out.push_str(&format!("  selected file: {}\n", file.file_name));
        }
    }
    out
}
