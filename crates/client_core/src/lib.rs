//! Client-side controller for the resume upload page.
//!
//! [`ViewController`] drives a [`Page`] through the login, register, upload
//! and results sections, talking to the backend through a [`ResumeApi`] and
//! keeping the session token in an injected [`SessionStore`].

pub mod api;
pub mod controller;
pub mod error;
pub mod file;
pub mod page;
pub mod render;
pub mod session;

pub use api::{HttpResumeApi, ResumeApi};
pub use controller::{
    ControllerOptions, FormAction, PageEvent, Persistence, ViewController, DEFAULT_NOTICE_TTL,
};
pub use error::{ActionOutcome, ApiError, SessionError, UiError, UiErrorCategory, UiErrorContext};
pub use file::UploadFile;
pub use page::{Notice, NoticeId, NoticeKind, Page};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, TOKEN_KEY};
pub use shared::domain::View;
