use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{ResumeId, Role};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const UPLOAD_PATH: &str = "/api/resume/upload";
pub const MY_RESUMES_PATH: &str = "/api/resume/my";

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl RegisterRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: Role::User,
        }
    }
}

/// Body of a successful upload. Every field is optional on the wire; a result
/// without `resumeId` is treated as "no data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    #[serde(default)]
    pub resume_id: Option<ResumeId>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub s3_key: Option<String>,
}

impl UploadResult {
    pub fn new(resume_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resume_id: Some(ResumeId(resume_id.into())),
            message: Some(message.into()),
            s3_key: None,
        }
    }

    /// Identifier, if present and non-blank.
    pub fn file_id(&self) -> Option<&ResumeId> {
        self.resume_id.as_ref().filter(|id| !id.is_blank())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSummary {
    #[serde(default)]
    pub id: Option<ResumeId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub education: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub projects: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Listing rows from older uploads send `null` for unparsed lists.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
