use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    /// Classifies a non-2xx HTTP status. The backend answers with plain-text
    /// bodies, so the status is the only structured signal available.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            429 => ErrorCode::RateLimited,
            400..=499 => ErrorCode::Validation,
            _ => ErrorCode::Internal,
        }
    }

    pub fn is_auth(self) -> bool {
        matches!(self, ErrorCode::Unauthorized | ErrorCode::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_statuses() {
        assert_eq!(ErrorCode::from_status(401), ErrorCode::Unauthorized);
        assert!(ErrorCode::from_status(403).is_auth());
        assert!(!ErrorCode::from_status(400).is_auth());
    }

    #[test]
    fn unexpected_statuses_are_internal() {
        assert_eq!(ErrorCode::from_status(502), ErrorCode::Internal);
        assert_eq!(ErrorCode::from_status(302), ErrorCode::Internal);
        assert_eq!(ErrorCode::from_status(422), ErrorCode::Validation);
    }
}
