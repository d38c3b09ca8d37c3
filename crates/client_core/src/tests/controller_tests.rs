use super::*;

use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use axum::{http::StatusCode, routing::post, Json, Router};
use shared::protocol::{LoginRequest, ResumeSummary, LOGIN_PATH};
use tokio::{net::TcpListener, sync::Notify};

use crate::{
    api::HttpResumeApi,
    error::UiErrorCategory,
    session::MemorySessionStore,
};

#[derive(Clone)]
enum Reply<T> {
    Ok(T),
    Status(u16, &'static str),
    Transport(&'static str),
    Malformed,
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T, ApiError> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Status(status, body) => Err(ApiError::status(status, body)),
            Reply::Transport(reason) => Err(ApiError::Transport(reason.to_string())),
            Reply::Malformed => Err(ApiError::Decode("expected value at line 1".to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Login { username: String },
    Register { username: String, role: shared::domain::Role },
    Upload { token: Option<String>, file_name: String },
    MyResumes { token: Option<String> },
}

struct ScriptedApi {
    login: Reply<String>,
    register: Reply<String>,
    upload: Reply<UploadResult>,
    resumes: Reply<Vec<ResumeSummary>>,
    gate: Option<Arc<Notify>>,
    calls: StdMutex<Vec<Call>>,
}

impl ScriptedApi {
    fn ok() -> Self {
        Self {
            login: Reply::Ok("tok123".to_string()),
            register: Reply::Ok("User registered successfully".to_string()),
            upload: Reply::Ok(UploadResult::new("r1", "ok")),
            resumes: Reply::Ok(Vec::new()),
            gate: None,
            calls: StdMutex::new(Vec::new()),
        }
    }

    fn with_login(mut self, reply: Reply<String>) -> Self {
        self.login = reply;
        self
    }

    fn with_register(mut self, reply: Reply<String>) -> Self {
        self.register = reply;
        self
    }

    fn with_upload(mut self, reply: Reply<UploadResult>) -> Self {
        self.upload = reply;
        self
    }

    fn with_resumes(mut self, reply: Reply<Vec<ResumeSummary>>) -> Self {
        self.resumes = reply;
        self
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls").push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls").clone()
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl ResumeApi for ScriptedApi {
    async fn login(&self, username: &str, _password: &str) -> Result<String, ApiError> {
        self.record(Call::Login {
            username: username.to_string(),
        });
        self.wait_gate().await;
        self.login.clone().into_result()
    }

    async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        self.record(Call::Register {
            username: request.username.clone(),
            role: request.role,
        });
        self.register.clone().into_result()
    }

    async fn upload(
        &self,
        token: Option<&str>,
        file: &UploadFile,
    ) -> Result<UploadResult, ApiError> {
        self.record(Call::Upload {
            token: token.map(str::to_string),
            file_name: file.file_name.clone(),
        });
        self.wait_gate().await;
        self.upload.clone().into_result()
    }

    async fn my_resumes(&self, token: Option<&str>) -> Result<Vec<ResumeSummary>, ApiError> {
        self.record(Call::MyResumes {
            token: token.map(str::to_string),
        });
        self.resumes.clone().into_result()
    }
}

fn controller(api: ScriptedApi) -> ViewController<ScriptedApi, MemorySessionStore> {
    ViewController::new(api, MemorySessionStore::new())
}

fn logged_in(api: ScriptedApi) -> ViewController<ScriptedApi, MemorySessionStore> {
    ViewController::new(api, MemorySessionStore::with_token("tok123"))
}

fn resume_file() -> UploadFile {
    UploadFile::new("cv.pdf", b"%PDF-1.4".to_vec())
}

async fn notice_texts(
    controller: &ViewController<ScriptedApi, MemorySessionStore>,
    view: View,
) -> Vec<(NoticeKind, String)> {
    controller
        .page()
        .await
        .notices(view)
        .iter()
        .map(|notice| (notice.kind, notice.text.clone()))
        .collect()
}

#[tokio::test]
async fn init_without_token_shows_login() {
    let controller = controller(ScriptedApi::ok());
    assert_eq!(controller.init().await, View::Login);
    assert_eq!(controller.page().await.visible_views(), vec![View::Login]);
}

#[tokio::test]
async fn init_with_token_shows_upload() {
    let controller = logged_in(ScriptedApi::ok());
    assert_eq!(controller.init().await, View::Upload);
    assert_eq!(controller.page().await.visible_views(), vec![View::Upload]);
}

#[tokio::test]
async fn any_navigation_sequence_leaves_one_section_visible() {
    let controller = controller(ScriptedApi::ok());
    let sequence = [
        View::Results,
        View::Login,
        View::Login,
        View::Register,
        View::Upload,
        View::Results,
        View::Register,
    ];
    for view in sequence {
        assert!(controller.navigate(view).await);
        assert_eq!(controller.page().await.visible_views(), vec![view]);
    }
}

#[tokio::test]
async fn unknown_section_id_hides_every_section() {
    let controller = controller(ScriptedApi::ok());
    controller.navigate(View::Register).await;

    assert!(!controller.navigate_to("settings-section").await);
    assert!(controller.page().await.visible_views().is_empty());

    assert!(controller.navigate_to("upload-section").await);
    assert_eq!(controller.current_view().await, Some(View::Upload));
}

#[tokio::test]
async fn section_missing_from_markup_leaves_none_visible() {
    let controller = controller(ScriptedApi::ok())
        .with_page(Page::with_sections([View::Login, View::Upload]));
    controller.navigate(View::Upload).await;

    assert!(!controller.navigate(View::Results).await);
    assert!(controller.page().await.visible_views().is_empty());
}

#[tokio::test]
async fn login_success_stores_token_and_shows_upload() {
    let controller = controller(ScriptedApi::ok());
    controller.init().await;

    let outcome = controller.login("u", "p").await;

    assert!(outcome.is_completed());
    assert_eq!(
        controller.session().token().expect("token").as_deref(),
        Some("tok123")
    );
    assert_eq!(controller.current_view().await, Some(View::Upload));
    assert_eq!(
        notice_texts(&controller, View::Upload).await,
        vec![(NoticeKind::Success, LOGIN_SUCCESS_MESSAGE.to_string())]
    );
}

#[tokio::test]
async fn login_rejection_keeps_view_and_shows_server_text() {
    let controller =
        controller(ScriptedApi::ok().with_login(Reply::Status(401, "bad credentials")));
    controller.init().await;

    let outcome = controller.login("u", "wrong").await;

    let err = outcome.error().expect("failed");
    assert_eq!(err.category(), UiErrorCategory::Http);
    assert!(err.requires_reauth());
    assert_eq!(controller.session().token().expect("token"), None);
    assert_eq!(controller.current_view().await, Some(View::Login));
    assert_eq!(
        notice_texts(&controller, View::Login).await,
        vec![(NoticeKind::Error, "Login failed: bad credentials".to_string())]
    );
}

#[tokio::test]
async fn login_transport_failure_shows_reason() {
    let controller =
        controller(ScriptedApi::ok().with_login(Reply::Transport("connection refused")));
    controller.init().await;

    let outcome = controller.login("u", "p").await;

    assert_eq!(
        outcome.error().map(UiError::category),
        Some(UiErrorCategory::Transport)
    );
    assert_eq!(
        notice_texts(&controller, View::Login).await,
        vec![(NoticeKind::Error, "Login error: connection refused".to_string())]
    );
}

#[tokio::test]
async fn register_success_returns_to_login_without_token() {
    let controller = controller(ScriptedApi::ok());
    controller.navigate(View::Register).await;

    let outcome = controller.register("ana", "pw").await;

    assert!(outcome.is_completed());
    assert_eq!(controller.session().token().expect("token"), None);
    assert_eq!(controller.current_view().await, Some(View::Login));
    assert_eq!(
        notice_texts(&controller, View::Login).await,
        vec![(NoticeKind::Success, REGISTER_SUCCESS_MESSAGE.to_string())]
    );
    assert_eq!(
        controller.api().calls(),
        vec![Call::Register {
            username: "ana".to_string(),
            role: shared::domain::Role::User,
        }]
    );
}

#[tokio::test]
async fn register_rejection_stays_on_register() {
    let controller = controller(
        ScriptedApi::ok().with_register(Reply::Status(400, "Username is already taken")),
    );
    controller.navigate(View::Register).await;

    let outcome = controller.register("ana", "pw").await;

    assert!(outcome.error().is_some());
    assert_eq!(controller.current_view().await, Some(View::Register));
    assert_eq!(
        notice_texts(&controller, View::Register).await,
        vec![(
            NoticeKind::Error,
            "Registration failed: Username is already taken".to_string()
        )]
    );
}

#[tokio::test]
async fn upload_without_file_makes_no_call() {
    let controller = logged_in(ScriptedApi::ok());
    controller.init().await;

    let outcome = controller.upload_resume(None).await;

    assert_eq!(
        outcome.error().map(UiError::category),
        Some(UiErrorCategory::Validation)
    );
    assert!(controller.api().calls().is_empty());
    assert_eq!(controller.current_view().await, Some(View::Upload));
    assert_eq!(
        notice_texts(&controller, View::Upload).await,
        vec![(NoticeKind::Error, NO_FILE_MESSAGE.to_string())]
    );
}

#[tokio::test]
async fn upload_success_renders_id_and_message() {
    let controller = logged_in(ScriptedApi::ok());
    controller.init().await;

    let outcome = controller.upload_resume(Some(resume_file())).await;

    assert!(outcome.is_completed());
    let page = controller.page().await;
    assert_eq!(page.visible_views(), vec![View::Results]);
    let text = page.body_text(View::Results);
    assert!(text.contains("r1"), "{text}");
    assert!(text.contains("ok"), "{text}");
    drop(page);

    assert_eq!(
        controller.api().calls(),
        vec![Call::Upload {
            token: Some("tok123".to_string()),
            file_name: "cv.pdf".to_string(),
        }]
    );
}

#[tokio::test]
async fn upload_shows_loading_placeholder_while_in_flight() {
    let controller = logged_in(ScriptedApi::ok());
    let mut events = controller.subscribe();

    controller.upload_resume(Some(resume_file())).await;

    let mut rendered = 0;
    while let Ok(event) = events.try_recv() {
        if event == PageEvent::BodyRendered(View::Results) {
            rendered += 1;
        }
    }
    // Placeholder, then result.
    assert_eq!(rendered, 2);
}

#[tokio::test]
async fn upload_rejection_renders_inline_error() {
    let controller =
        logged_in(ScriptedApi::ok().with_upload(Reply::Status(401, "Unauthorized")));
    controller.init().await;

    let outcome = controller.upload_resume(Some(resume_file())).await;

    assert!(outcome.error().is_some_and(UiError::requires_reauth));
    let page = controller.page().await;
    assert_eq!(page.body_text(View::Results), "Upload failed: Unauthorized");
    assert_eq!(
        page.body_html(View::Results),
        r#"<p class="error">Upload failed: Unauthorized</p>"#
    );
    assert_eq!(page.all_notices().count(), 0);
}

#[tokio::test]
async fn upload_failure_lands_in_results_after_navigating_away() {
    let gate = Arc::new(Notify::new());
    let controller = logged_in(
        ScriptedApi::ok()
            .with_upload(Reply::Status(500, "boom"))
            .gated(Arc::clone(&gate)),
    );
    controller.init().await;

    let (outcome, _) = tokio::join!(controller.upload_resume(Some(resume_file())), async {
        assert!(controller.is_submitting(FormAction::Upload));
        controller.navigate(View::Login).await;
        gate.notify_one();
    });

    assert!(outcome.error().is_some());
    let page = controller.page().await;
    assert_eq!(page.visible_views(), vec![View::Login]);
    assert_eq!(page.body_text(View::Results), "Upload failed: boom");
    assert!(page.body(View::Login).is_empty());
}

#[tokio::test]
async fn sticky_report_in_targets_hidden_section() {
    let controller = controller(ScriptedApi::ok());
    controller.navigate(View::Upload).await;

    controller
        .report_in(
            Some(View::Results),
            NoticeKind::Error,
            "late failure",
            Persistence::Sticky,
        )
        .await;

    let page = controller.page().await;
    assert_eq!(page.body_text(View::Results), "late failure");
    assert!(page.body(View::Upload).is_empty());
}

#[tokio::test]
async fn upload_transport_failure_renders_inline_error() {
    let controller = logged_in(ScriptedApi::ok().with_upload(Reply::Transport("reset by peer")));

    controller.upload_resume(Some(resume_file())).await;

    assert_eq!(
        controller.page().await.body_text(View::Results),
        "Upload error: reset by peer"
    );
}

#[tokio::test]
async fn upload_failure_can_use_timed_notice_instead() {
    let options = ControllerOptions {
        inline_persistence: Persistence::Timed(DEFAULT_NOTICE_TTL),
        ..ControllerOptions::default()
    };
    let controller = ViewController::with_options(
        ScriptedApi::ok().with_upload(Reply::Status(500, "Processing failed: disk full")),
        MemorySessionStore::with_token("tok123"),
        options,
    );

    controller.upload_resume(Some(resume_file())).await;

    assert_eq!(
        notice_texts(&controller, View::Results).await,
        vec![(
            NoticeKind::Error,
            "Upload failed: Processing failed: disk full".to_string()
        )]
    );
}

#[tokio::test]
async fn malformed_upload_payload_shows_generic_fallback() {
    let controller = logged_in(ScriptedApi::ok().with_upload(Reply::Malformed));

    let outcome = controller.upload_resume(Some(resume_file())).await;

    assert_eq!(
        outcome.error().map(UiError::category),
        Some(UiErrorCategory::Payload)
    );
    assert_eq!(
        controller.page().await.body_text(View::Results),
        render::NO_DATA_MESSAGE
    );
}

#[tokio::test]
async fn upload_result_without_id_shows_generic_fallback() {
    let idless = UploadResult {
        message: Some("ok".to_string()),
        ..UploadResult::default()
    };
    let controller = logged_in(ScriptedApi::ok().with_upload(Reply::Ok(idless)));

    let outcome = controller.upload_resume(Some(resume_file())).await;

    assert!(outcome.error().is_some());
    assert_eq!(
        controller.page().await.body_text(View::Results),
        render::NO_DATA_MESSAGE
    );
}

#[tokio::test]
async fn rendered_result_encodes_server_text() {
    let controller = logged_in(ScriptedApi::ok());
    let hostile = UploadResult::new("<b>1</b>", "<script>alert('x')</script>");

    controller.display_resume_data(Some(&hostile)).await;

    let html = controller.page().await.body_html(View::Results);
    assert!(!html.contains("<script>"), "{html}");
    assert!(html.contains("&lt;b&gt;1&lt;/b&gt;"), "{html}");
}

#[tokio::test]
async fn submit_upload_sends_the_chosen_file() {
    let controller = logged_in(ScriptedApi::ok());
    controller.init().await;
    controller
        .choose_file(Some(UploadFile::new("resume.docx", b"PK".to_vec())))
        .await;

    assert!(controller.submit_upload().await.is_completed());
    assert_eq!(
        controller.api().calls(),
        vec![Call::Upload {
            token: Some("tok123".to_string()),
            file_name: "resume.docx".to_string(),
        }]
    );
}

#[tokio::test]
async fn reset_upload_form_clears_input_and_shows_upload() {
    let controller = logged_in(ScriptedApi::ok());
    controller.choose_file(Some(resume_file())).await;
    controller.navigate(View::Results).await;

    controller.reset_upload_form().await;

    let page = controller.page().await;
    assert!(page.file_input().is_none());
    assert_eq!(page.visible_views(), vec![View::Upload]);
}

#[tokio::test]
async fn logout_clears_token_from_any_view() {
    for start in View::ALL {
        let controller = logged_in(ScriptedApi::ok());
        controller.navigate(start).await;

        assert!(controller.logout().await.is_completed());

        assert_eq!(controller.session().token().expect("token"), None);
        assert_eq!(controller.current_view().await, Some(View::Login));
    }
}

#[tokio::test]
async fn my_resumes_renders_listing() {
    let rows = vec![ResumeSummary {
        name: Some("Ana".to_string()),
        email: Some("ana@example.com".to_string()),
        skills: vec!["rust".to_string()],
        ..ResumeSummary::default()
    }];
    let controller = logged_in(ScriptedApi::ok().with_resumes(Reply::Ok(rows)));

    assert!(controller.show_my_resumes().await.is_completed());

    let page = controller.page().await;
    assert_eq!(page.visible_views(), vec![View::Results]);
    assert_eq!(
        page.body_text(View::Results),
        "Ana: ana@example.com | Skills: rust"
    );
}

#[tokio::test]
async fn my_resumes_failure_renders_inline() {
    let controller = controller(ScriptedApi::ok().with_resumes(Reply::Status(403, "Forbidden")));

    controller.show_my_resumes().await;

    assert_eq!(
        controller.page().await.body_text(View::Results),
        "Loading resumes failed: Forbidden"
    );
    assert_eq!(
        controller.api().calls(),
        vec![Call::MyResumes { token: None }]
    );
}

#[tokio::test]
async fn duplicate_login_is_skipped_while_in_flight() {
    let gate = Arc::new(Notify::new());
    let controller = controller(ScriptedApi::ok().gated(Arc::clone(&gate)));
    controller.init().await;

    let (first, second) = tokio::join!(controller.login("u", "p"), async {
        let outcome = controller.login("u", "p").await;
        assert!(controller.is_submitting(FormAction::Login));
        gate.notify_one();
        outcome
    });

    assert!(first.is_completed());
    assert!(matches!(second, ActionOutcome::Skipped));
    assert_eq!(controller.api().calls().len(), 1);
    assert!(!controller.is_submitting(FormAction::Login));
}

#[tokio::test]
async fn duplicate_logins_run_when_prevention_is_off() {
    let options = ControllerOptions {
        prevent_duplicate_submissions: false,
        ..ControllerOptions::default()
    };
    let controller =
        ViewController::with_options(ScriptedApi::ok(), MemorySessionStore::new(), options);
    controller.init().await;

    let (first, second) = tokio::join!(controller.login("u", "p"), controller.login("u", "p"));

    assert!(first.is_completed());
    assert!(second.is_completed());
    assert_eq!(controller.api().calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn notice_is_removed_after_its_lifetime() {
    let controller = controller(ScriptedApi::ok());
    controller.init().await;
    let mut events = controller.subscribe();

    let id = controller
        .notify(NoticeKind::Success, "saved")
        .await
        .expect("visible section");

    tokio::time::sleep(Duration::from_millis(4999)).await;
    assert!(controller.page().await.contains_notice(id));

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!controller.page().await.contains_notice(id));

    let mut dismissed = false;
    while let Ok(event) = events.try_recv() {
        dismissed |= event == PageEvent::NoticeDismissed(id);
    }
    assert!(dismissed);
}

#[tokio::test(start_paused = true)]
async fn notice_removed_early_is_not_dismissed_twice() {
    let controller = controller(ScriptedApi::ok());
    controller.init().await;
    let mut events = controller.subscribe();

    let id = controller
        .notify(NoticeKind::Error, "oops")
        .await
        .expect("visible section");
    assert!(controller.page().await.remove_notice(id));

    tokio::time::sleep(DEFAULT_NOTICE_TTL + Duration::from_millis(1)).await;

    while let Ok(event) = events.try_recv() {
        assert_ne!(event, PageEvent::NoticeDismissed(id));
    }
}

#[tokio::test]
async fn notice_without_visible_section_is_dropped() {
    let controller = controller(ScriptedApi::ok());
    assert!(controller.notify(NoticeKind::Success, "hidden").await.is_none());
}

#[tokio::test]
async fn sticky_report_replaces_visible_body() {
    let controller = controller(ScriptedApi::ok());
    controller.navigate(View::Results).await;

    let id = controller
        .report(NoticeKind::Success, "kept", Persistence::Sticky)
        .await;

    assert!(id.is_none());
    assert_eq!(controller.page().await.body_text(View::Results), "kept");
}

async fn handle_login(Json(body): Json<LoginRequest>) -> (StatusCode, String) {
    if body.password == "p" {
        (StatusCode::OK, "tok123".to_string())
    } else {
        (StatusCode::UNAUTHORIZED, "bad credentials".to_string())
    }
}

async fn spawn_auth_server() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route(LOGIN_PATH, post(handle_login));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn login_over_http_against_mock_endpoint() {
    let server_url = spawn_auth_server().await;
    let controller = ViewController::new(
        HttpResumeApi::new(&server_url).expect("api"),
        MemorySessionStore::new(),
    );
    controller.init().await;

    assert!(controller.login("u", "wrong").await.error().is_some());
    assert_eq!(controller.session().token().expect("token"), None);
    assert_eq!(controller.current_view().await, Some(View::Login));
    assert!(controller
        .page()
        .await
        .notices(View::Login)
        .iter()
        .any(|n| n.kind == NoticeKind::Error && n.text.contains("bad credentials")));

    assert!(controller.login("u", "p").await.is_completed());
    assert_eq!(
        controller.session().token().expect("token").as_deref(),
        Some("tok123")
    );
    assert_eq!(controller.current_view().await, Some(View::Upload));
    assert!(controller
        .page()
        .await
        .notices(View::Upload)
        .iter()
        .any(|n| n.kind == NoticeKind::Success));
}
