//! View controller: section state machine, form submissions, and reporting.

pub mod events;
pub mod orchestration;

use std::{sync::Arc, time::Duration};

use shared::{
    domain::View,
    protocol::{RegisterRequest, UploadResult},
};
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{
    api::ResumeApi,
    error::{ActionOutcome, ApiError, UiError, UiErrorContext},
    file::UploadFile,
    page::{NoticeId, NoticeKind, Page},
    render::{self, Block},
    session::SessionStore,
};

pub use events::PageEvent;
pub use orchestration::FormAction;
use orchestration::Submissions;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(5000);
const EVENT_CAPACITY: usize = 64;

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful!";
pub const REGISTER_SUCCESS_MESSAGE: &str = "Registration successful! Please login.";
pub const NO_FILE_MESSAGE: &str = "Please select a file";
pub const LOADING_RESUMES_MESSAGE: &str = "Loading your resumes...";

/// How long a reported message stays on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Notice at the top of the visible section, removed after the duration.
    Timed(Duration),
    /// Replaces the visible section's body until the next render.
    Sticky,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub notice_ttl: Duration,
    /// Channel for upload and listing failures.
    pub inline_persistence: Persistence,
    pub prevent_duplicate_submissions: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            notice_ttl: DEFAULT_NOTICE_TTL,
            inline_persistence: Persistence::Sticky,
            prevent_duplicate_submissions: true,
        }
    }
}

pub struct ViewController<A, S> {
    api: A,
    session: S,
    page: Arc<Mutex<Page>>,
    options: ControllerOptions,
    submissions: Submissions,
    events: broadcast::Sender<PageEvent>,
}

impl<A: ResumeApi, S: SessionStore> ViewController<A, S> {
    pub fn new(api: A, session: S) -> Self {
        Self::with_options(api, session, ControllerOptions::default())
    }

    pub fn with_options(api: A, session: S, options: ControllerOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            session,
            page: Arc::new(Mutex::new(Page::new())),
            options,
            submissions: Submissions::default(),
            events,
        }
    }

    /// Binds to a page other than the full four-section markup.
    pub fn with_page(mut self, page: Page) -> Self {
        self.page = Arc::new(Mutex::new(page));
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    pub async fn page(&self) -> MutexGuard<'_, Page> {
        self.page.lock().await
    }

    pub async fn current_view(&self) -> Option<View> {
        self.page.lock().await.current_view()
    }

    pub fn is_submitting(&self, action: FormAction) -> bool {
        self.submissions.is_in_flight(action)
    }

    fn emit(&self, event: PageEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Shows the upload view when a session token is stored, else login.
    pub async fn init(&self) -> View {
        let view = match self.session.is_authenticated() {
            Ok(true) => View::Upload,
            Ok(false) => View::Login,
            Err(err) => {
                warn!(error = %err, "session: unreadable store, treating as logged out");
                View::Login
            }
        };
        self.navigate(view).await;
        view
    }

    /// Hides every section and shows `view`. Returns false when the page has
    /// no such section, in which case nothing is left visible.
    pub async fn navigate(&self, view: View) -> bool {
        let shown = self.page.lock().await.show_only(view);
        if shown {
            debug!(view = %view, "page: section shown");
            self.emit(PageEvent::ViewChanged(view));
        } else {
            warn!(view = %view, "page: section missing from markup");
        }
        shown
    }

    /// Navigation by element id. An unknown id still hides every section.
    pub async fn navigate_to(&self, section_id: &str) -> bool {
        match section_id.parse::<View>() {
            Ok(view) => self.navigate(view).await,
            Err(err) => {
                self.page.lock().await.hide_all();
                warn!(error = %err, "page: no section to show");
                false
            }
        }
    }

    /// Shows a user-facing message with the given persistence. Returns the
    /// notice id for timed messages that found a visible section.
    pub async fn report(
        &self,
        kind: NoticeKind,
        text: impl Into<String>,
        persistence: Persistence,
    ) -> Option<NoticeId> {
        self.report_in(None, kind, text, persistence).await
    }

    /// Like [`report`](Self::report), but a sticky message goes to `target`
    /// rather than to whichever section happens to be visible.
    pub async fn report_in(
        &self,
        target: Option<View>,
        kind: NoticeKind,
        text: impl Into<String>,
        persistence: Persistence,
    ) -> Option<NoticeId> {
        let text = text.into();
        match persistence {
            Persistence::Timed(ttl) => {
                let inserted = self.page.lock().await.insert_notice(kind, text.clone());
                let Some((view, id)) = inserted else {
                    debug!(?kind, "page: no visible section for notice");
                    return None;
                };
                self.emit(PageEvent::NoticeShown {
                    view,
                    id,
                    kind,
                    text,
                });

                let page = Arc::clone(&self.page);
                let events = self.events.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(ttl).await;
                    if page.lock().await.remove_notice(id) {
                        let _ = events.send(PageEvent::NoticeDismissed(id));
                    }
                });
                Some(id)
            }
            Persistence::Sticky => {
                let view = match target {
                    Some(view) => Some(view),
                    None => self.page.lock().await.current_view(),
                };
                match view {
                    Some(view) => self.render_body(view, render::inline_message(kind, text)).await,
                    None => debug!(?kind, "page: no visible section for inline message"),
                }
                None
            }
        }
    }

    pub async fn notify(&self, kind: NoticeKind, text: impl Into<String>) -> Option<NoticeId> {
        self.report(kind, text, Persistence::Timed(self.options.notice_ttl))
            .await
    }

    async fn render_body(&self, view: View, blocks: Vec<Block>) {
        if self.page.lock().await.set_body(view, blocks) {
            self.emit(PageEvent::BodyRendered(view));
        }
    }

    async fn fail_with_notice(&self, err: UiError) -> ActionOutcome {
        warn!(
            context = ?err.context(),
            category = ?err.category(),
            "{}",
            err.message()
        );
        self.notify(NoticeKind::Error, err.message()).await;
        ActionOutcome::Failed(err)
    }

    async fn fail_inline(&self, context: UiErrorContext, err: &ApiError) -> ActionOutcome {
        if matches!(err, ApiError::Decode(_)) {
            warn!(context = ?context, error = %err, "page: unusable result payload");
            self.render_body(View::Results, render::upload_result_blocks(None))
                .await;
            return ActionOutcome::Failed(UiError::no_data(context));
        }

        let ui = UiError::from_api(context, err);
        warn!(context = ?context, category = ?ui.category(), "{}", ui.message());
        if let Persistence::Timed(_) = self.options.inline_persistence {
            // Drop the loading placeholder; the notice carries the message.
            self.render_body(View::Results, Vec::new()).await;
        }
        self.report_in(
            Some(View::Results),
            NoticeKind::Error,
            ui.message(),
            self.options.inline_persistence,
        )
        .await;
        ActionOutcome::Failed(ui)
    }

    fn skipped(action: FormAction) -> ActionOutcome {
        info!(form = action.name(), "duplicate submission skipped");
        ActionOutcome::Skipped
    }

    /// Exchanges credentials for a session token.
    pub async fn login(&self, username: &str, password: &str) -> ActionOutcome {
        let Some(_submission) = self.submissions.try_begin(
            FormAction::Login,
            self.options.prevent_duplicate_submissions,
        ) else {
            return Self::skipped(FormAction::Login);
        };

        info!(username, "auth: submitting login");
        let token = match self.api.login(username, password).await {
            Ok(token) => token,
            Err(err) => {
                return self
                    .fail_with_notice(UiError::from_api(UiErrorContext::Login, &err))
                    .await
            }
        };

        if let Err(err) = self.session.set_token(&token) {
            return self
                .fail_with_notice(UiError::from_session(UiErrorContext::Login, &err))
                .await;
        }

        info!(username, "auth: logged in");
        self.navigate(View::Upload).await;
        self.notify(NoticeKind::Success, LOGIN_SUCCESS_MESSAGE).await;
        ActionOutcome::Completed
    }

    /// Creates an account with the default role. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> ActionOutcome {
        let Some(_submission) = self.submissions.try_begin(
            FormAction::Register,
            self.options.prevent_duplicate_submissions,
        ) else {
            return Self::skipped(FormAction::Register);
        };

        info!(username, "auth: submitting registration");
        let request = RegisterRequest::new(username, password);
        if let Err(err) = self.api.register(&request).await {
            return self
                .fail_with_notice(UiError::from_api(UiErrorContext::Register, &err))
                .await;
        }

        self.navigate(View::Login).await;
        self.notify(NoticeKind::Success, REGISTER_SUCCESS_MESSAGE).await;
        ActionOutcome::Completed
    }

    pub async fn choose_file(&self, file: Option<UploadFile>) {
        self.page.lock().await.set_file_input(file);
    }

    /// Submits whatever the upload form's file input holds.
    pub async fn submit_upload(&self) -> ActionOutcome {
        let file = self.page.lock().await.file_input().cloned();
        self.upload_resume(file).await
    }

    pub async fn upload_resume(&self, file: Option<UploadFile>) -> ActionOutcome {
        let Some(file) = file else {
            return self
                .fail_with_notice(UiError::validation(UiErrorContext::Upload, NO_FILE_MESSAGE))
                .await;
        };

        let Some(_submission) = self.submissions.try_begin(
            FormAction::Upload,
            self.options.prevent_duplicate_submissions,
        ) else {
            return Self::skipped(FormAction::Upload);
        };

        self.navigate(View::Results).await;
        self.render_body(View::Results, render::loading_placeholder())
            .await;

        let token = self.stored_token();
        match self.api.upload(token.as_deref(), &file).await {
            Ok(result) => {
                info!(
                    file_name = %file.file_name,
                    resume_id = ?result.resume_id,
                    s3_key = ?result.s3_key,
                    "upload: resume accepted"
                );
                let has_data = result.file_id().is_some();
                self.display_resume_data(Some(&result)).await;
                if has_data {
                    ActionOutcome::Completed
                } else {
                    ActionOutcome::Failed(UiError::no_data(UiErrorContext::Upload))
                }
            }
            Err(err) => self.fail_inline(UiErrorContext::Upload, &err).await,
        }
    }

    /// Renders an upload result into the results section.
    pub async fn display_resume_data(&self, data: Option<&UploadResult>) {
        if data.and_then(UploadResult::file_id).is_none() {
            debug!("page: upload result has no file id");
        }
        self.render_body(View::Results, render::upload_result_blocks(data))
            .await;
    }

    /// Lists the logged-in user's resumes in the results section.
    pub async fn show_my_resumes(&self) -> ActionOutcome {
        let Some(_submission) = self.submissions.try_begin(
            FormAction::ListResumes,
            self.options.prevent_duplicate_submissions,
        ) else {
            return Self::skipped(FormAction::ListResumes);
        };

        self.navigate(View::Results).await;
        self.render_body(
            View::Results,
            vec![Block::paragraph(
                Some(render::Tone::Loading),
                LOADING_RESUMES_MESSAGE,
            )],
        )
        .await;

        let token = self.stored_token();
        match self.api.my_resumes(token.as_deref()).await {
            Ok(resumes) => {
                info!(count = resumes.len(), "resumes: listing loaded");
                self.render_body(View::Results, render::resume_list_blocks(&resumes))
                    .await;
                ActionOutcome::Completed
            }
            Err(err) => self.fail_inline(UiErrorContext::ListResumes, &err).await,
        }
    }

    fn stored_token(&self) -> Option<String> {
        match self.session.token() {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                warn!("session: no token stored, sending request unauthenticated");
                None
            }
            Err(err) => {
                warn!(error = %err, "session: unreadable store, sending request unauthenticated");
                None
            }
        }
    }

    /// Forgets the session token and returns to the login view.
    pub async fn logout(&self) -> ActionOutcome {
        let outcome = match self.session.clear() {
            Ok(()) => {
                info!("auth: logged out");
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!(error = %err, "session: failed to clear token");
                ActionOutcome::Failed(UiError::from_session(UiErrorContext::Login, &err))
            }
        };
        self.navigate(View::Login).await;
        outcome
    }

    pub async fn reset_upload_form(&self) {
        self.page.lock().await.clear_file_input();
        self.navigate(View::Upload).await;
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
