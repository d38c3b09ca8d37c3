//! Error taxonomy for the HTTP seam, the session store, and the user-facing page.

use shared::error::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; `body` is the server's text, verbatim.
    #[error("{body}")]
    Status {
        status: u16,
        code: ErrorCode,
        body: String,
    },
    #[error("{0}")]
    Transport(String),
    #[error("malformed response payload: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    Request(String),
}

impl ApiError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            code: ErrorCode::from_status(status),
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store io failure at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("session store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    /// Server answered with a non-2xx status.
    Http,
    Transport,
    /// Required input missing; nothing was sent.
    Validation,
    /// Success response whose body could not be used.
    Payload,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Login,
    Register,
    Upload,
    ListResumes,
}

impl UiErrorContext {
    /// Prefix for messages shown through a timed notification.
    pub fn failure_label(self) -> &'static str {
        match self {
            UiErrorContext::Login => "Login",
            UiErrorContext::Register => "Registration",
            UiErrorContext::Upload => "Upload",
            UiErrorContext::ListResumes => "Loading resumes",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    code: Option<ErrorCode>,
    message: String,
}

impl UiError {
    pub fn from_api(context: UiErrorContext, err: &ApiError) -> Self {
        let label = context.failure_label();
        match err {
            ApiError::Status { code, body, .. } => Self {
                category: UiErrorCategory::Http,
                context,
                code: Some(*code),
                message: format!("{label} failed: {body}"),
            },
            ApiError::Transport(reason) | ApiError::Request(reason) => Self {
                category: UiErrorCategory::Transport,
                context,
                code: None,
                message: format!("{label} error: {reason}"),
            },
            ApiError::Decode(_) => Self::no_data(context),
        }
    }

    pub fn from_session(context: UiErrorContext, err: &SessionError) -> Self {
        Self {
            category: UiErrorCategory::Storage,
            context,
            code: None,
            message: format!("{} error: {err}", context.failure_label()),
        }
    }

    pub fn validation(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context,
            code: None,
            message: message.into(),
        }
    }

    pub fn no_data(context: UiErrorContext) -> Self {
        Self {
            category: UiErrorCategory::Payload,
            context,
            code: None,
            message: crate::render::NO_DATA_MESSAGE.to_string(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.code.is_some_and(ErrorCode::is_auth)
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What became of a user action. The page already carries any message; this
/// lets a front end pick an exit status.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Completed,
    Failed(UiError),
    /// Same form already had a submission in flight.
    Skipped,
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ActionOutcome::Completed)
    }

    pub fn error(&self) -> Option<&UiError> {
        match self {
            ActionOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}
