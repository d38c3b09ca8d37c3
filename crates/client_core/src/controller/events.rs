//! Page events broadcast to front ends and tests.

use shared::domain::View;

use crate::page::{NoticeId, NoticeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    ViewChanged(View),
    NoticeShown {
        view: View,
        id: NoticeId,
        kind: NoticeKind,
        text: String,
    },
    NoticeDismissed(NoticeId),
    BodyRendered(View),
}
