//! HTTP seam to the authentication and resume services.

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use shared::protocol::{
    LoginRequest, RegisterRequest, ResumeSummary, UploadResult, LOGIN_PATH, MY_RESUMES_PATH,
    REGISTER_PATH, UPLOAD_FIELD, UPLOAD_PATH,
};
use tracing::{debug, info};
use url::Url;

use crate::{error::ApiError, file::UploadFile};

#[async_trait]
pub trait ResumeApi: Send + Sync {
    /// Returns the session token on success.
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError>;
    /// Returns the server's confirmation text.
    async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError>;
    async fn upload(&self, token: Option<&str>, file: &UploadFile)
        -> Result<UploadResult, ApiError>;
    async fn my_resumes(&self, token: Option<&str>) -> Result<Vec<ResumeSummary>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpResumeApi {
    http: Client,
    base_url: Url,
}

impl HttpResumeApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Request(format!("invalid server url '{base_url}': {e}")))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Request(format!("invalid endpoint '{path}': {e}")))
    }

    fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Passes 2xx responses through; otherwise reads the body as the error text.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = read_text(response).await?;
    Err(ApiError::status(status.as_u16(), body))
}

/// A body that breaks off mid-read is a transport failure, whatever the status.
async fn read_text(response: Response) -> Result<String, ApiError> {
    response
        .text()
        .await
        .map_err(|e| ApiError::Transport(format!("failed to read response body: {e}")))
}

#[async_trait]
impl ResumeApi for HttpResumeApi {
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let token = read_text(check_status(response).await?).await?;
        debug!(username, "api: login accepted");
        Ok(token)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.endpoint(REGISTER_PATH)?)
            .json(request)
            .send()
            .await?;
        read_text(check_status(response).await?).await
    }

    async fn upload(
        &self,
        token: Option<&str>,
        file: &UploadFile,
    ) -> Result<UploadResult, ApiError> {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ApiError::Request(format!("invalid mime type: {e}")))?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        info!(
            file_name = %file.file_name,
            bytes = file.len(),
            authorized = token.is_some(),
            "api: uploading resume"
        );
        let response = Self::authorized(self.http.post(self.endpoint(UPLOAD_PATH)?), token)
            .multipart(form)
            .send()
            .await?;
        let body = read_text(check_status(response).await?).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn my_resumes(&self, token: Option<&str>) -> Result<Vec<ResumeSummary>, ApiError> {
        let response = Self::authorized(self.http.get(self.endpoint(MY_RESUMES_PATH)?), token)
            .send()
            .await?;
        let body = read_text(check_status(response).await?).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
