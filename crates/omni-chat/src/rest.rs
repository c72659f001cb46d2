//! REST endpoints for media files and images.
//!
//! Media travels outside GraphQL: downloads are plain `GET`s answered with the
//! file and a `Content-Disposition` header, uploads are multipart forms. Every
//! endpoint has its own status table; statuses it doesn't list are
//! [`ApiError::Connection`].

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::HttpApiConfig;
use crate::error::{ApiError, DomainError, MediaKind, Result, classify_status};
use crate::targets;
use crate::validation::validate_message_text;

/// Resolution of a stored image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageType {
    #[default]
    Original,
    Thumbnail,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "ORIGINAL",
            Self::Thumbnail => "THUMBNAIL",
        }
    }
}

/// Media kinds uploaded through [`RestClient::post_media_message`].
///
/// Images carry a caption and go through [`RestClient::post_image_message`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UploadKind {
    Audio,
    Video,
    Doc,
}

impl UploadKind {
    /// The media kind this upload produces.
    pub fn media_kind(&self) -> MediaKind {
        match self {
            Self::Audio => MediaKind::Audio,
            Self::Video => MediaKind::Video,
            Self::Doc => MediaKind::Doc,
        }
    }
}

/// A file sent to or received from the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFile {
    pub filename: String,
    pub bytes: Bytes,
}

impl MediaFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    fn into_part(self) -> Part {
        Part::bytes(self.bytes.to_vec()).file_name(self.filename)
    }
}

/// Body of a rejected upload.
#[derive(Deserialize)]
struct InvalidMessage {
    reason: String,
}

/// Builder for creating a REST client.
pub struct RestClientBuilder {
    config: HttpApiConfig,
    timeout: Option<Duration>,
}

impl RestClientBuilder {
    /// Create a new builder for the given endpoint.
    pub fn new(config: HttpApiConfig) -> Self {
        Self {
            config,
            timeout: None,
        }
    }

    /// Set a request timeout. None by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the REST client.
    pub fn build(self) -> Result<RestClient> {
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(RestClient {
            inner: Arc::new(RestClientInner {
                http: builder.build()?,
                config: self.config,
            }),
        })
    }
}

struct RestClientInner {
    http: reqwest::Client,
    config: HttpApiConfig,
}

/// Client for the REST media endpoints.
///
/// # Example
///
/// ```ignore
/// let rest = RestClient::new(HttpApiConfig::new(HttpProtocol::Http, "localhost:8080"))?;
/// let file = rest
///     .get_media_message(Some(&access_token), MediaKind::Doc, message_id, None)
///     .await?;
/// std::fs::write(&file.filename, &file.bytes)?;
/// ```
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

impl RestClient {
    /// Create a client with default settings.
    pub fn new(config: HttpApiConfig) -> Result<Self> {
        RestClientBuilder::new(config).build()
    }

    /// Create a new builder for configuring a REST client.
    pub fn builder(config: HttpApiConfig) -> RestClientBuilder {
        RestClientBuilder::new(config)
    }

    /// Get the endpoint configuration.
    pub fn config(&self) -> &HttpApiConfig {
        &self.inner.config
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.inner.config.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        tracing::debug!(
            target: targets::REST,
            url = %response.url(),
            status = response.status().as_u16(),
            "Received REST response"
        );
        Ok(response)
    }

    /// Download the file of a media message.
    ///
    /// `image_type` is only sent for image messages. An access token is only
    /// needed if the chat isn't public.
    pub async fn get_media_message(
        &self,
        access_token: Option<&str>,
        kind: MediaKind,
        message_id: i32,
        image_type: Option<ImageType>,
    ) -> Result<MediaFile> {
        let mut query = vec![("message-id", message_id.to_string())];
        if let Some(image_type) = image_type {
            query.push(("image-type", image_type.as_str().to_owned()));
        }
        let url = self.url(&format!("/{}-message", kind.as_str()), &query)?;

        let mut request = self.inner.http.get(url);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }
        let response = self.send(request).await?;
        if let Some(err) = classify_status(response.status().as_u16(), 200) {
            return Err(err);
        }
        read_file(response).await
    }

    /// Send an audio, video, or doc message.
    ///
    /// If the chat is a broadcast group, the user must be an admin.
    pub async fn post_media_message(
        &self,
        access_token: &str,
        kind: UploadKind,
        file: MediaFile,
        chat_id: i32,
        context_message_id: Option<i32>,
    ) -> Result<()> {
        let media_kind = kind.media_kind();
        let mut query = vec![("chat-id", chat_id.to_string())];
        if let Some(id) = context_message_id {
            query.push(("context-message-id", id.to_string()));
        }
        let url = self.url(&format!("/{}-message", media_kind.as_str()), &query)?;

        let form = Form::new().part(media_kind.as_str(), file.into_part());
        let request = self
            .inner
            .http
            .post(url)
            .bearer_auth(access_token)
            .multipart(form);
        let response = self.send(request).await?;
        upload_outcome(response, media_kind).await
    }

    /// Send an image message with an optional caption.
    ///
    /// The caption is validated as message text before any request is made.
    pub async fn post_image_message(
        &self,
        access_token: &str,
        file: MediaFile,
        chat_id: i32,
        context_message_id: Option<i32>,
        caption: Option<&str>,
    ) -> Result<()> {
        if let Some(caption) = caption {
            validate_message_text(caption)?;
        }

        let mut form = Form::new()
            .part("image", file.into_part())
            .text("chat-id", chat_id.to_string());
        if let Some(id) = context_message_id {
            form = form.text("context-message-id", id.to_string());
        }
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_owned());
        }

        let url = self.url("/image-message", &[])?;
        let request = self
            .inner
            .http
            .post(url)
            .bearer_auth(access_token)
            .multipart(form);
        let response = self.send(request).await?;
        upload_outcome(response, MediaKind::Image).await
    }

    /// Download a user's profile image. `None` if they don't have one.
    pub async fn get_profile_image(
        &self,
        user_id: i32,
        image_type: ImageType,
    ) -> Result<Option<MediaFile>> {
        let url = self.url(
            "/profile-image",
            &[
                ("user-id", user_id.to_string()),
                ("image-type", image_type.as_str().to_owned()),
            ],
        )?;
        let response = self.send(self.inner.http.get(url)).await?;
        optional_image(response, DomainError::NonexistentUserId).await
    }

    /// Replace the user's profile image.
    pub async fn patch_profile_image(&self, access_token: &str, file: MediaFile) -> Result<()> {
        let url = self.url("/profile-image", &[])?;
        let form = Form::new().part("image", file.into_part());
        let request = self
            .inner
            .http
            .patch(url)
            .bearer_auth(access_token)
            .multipart(form);
        let response = self.send(request).await?;
        image_update_outcome(response.status().as_u16())
    }

    /// Download a group chat's image. `None` if it doesn't have one.
    pub async fn get_group_chat_image(
        &self,
        chat_id: i32,
        image_type: ImageType,
    ) -> Result<Option<MediaFile>> {
        let url = self.url(
            "/group-chat-image",
            &[
                ("chat-id", chat_id.to_string()),
                ("image-type", image_type.as_str().to_owned()),
            ],
        )?;
        let response = self.send(self.inner.http.get(url)).await?;
        optional_image(response, DomainError::NonexistentChat).await
    }

    /// Replace a group chat's image. The user must be an admin of the chat.
    pub async fn patch_group_chat_image(
        &self,
        access_token: &str,
        chat_id: i32,
        file: MediaFile,
    ) -> Result<()> {
        let url = self.url("/group-chat-image", &[("chat-id", chat_id.to_string())])?;
        let form = Form::new().part("image", file.into_part());
        let request = self
            .inner
            .http
            .patch(url)
            .bearer_auth(access_token)
            .multipart(form);
        let response = self.send(request).await?;
        image_update_outcome(response.status().as_u16())
    }

    /// Check whether the backend is healthy.
    ///
    /// Only a 204 counts as healthy. An unreachable server is unhealthy.
    pub async fn health_check(&self) -> bool {
        let url = match self.url("/health-check", &[]) {
            Ok(url) => url,
            Err(err) => {
                tracing::debug!(target: targets::REST, error = %err, "Health check URL invalid");
                return false;
            }
        };
        match self.send(self.inner.http.get(url)).await {
            Ok(response) => response.status().as_u16() == 204,
            Err(err) => {
                tracing::debug!(target: targets::REST, error = %err, "Health check failed");
                false
            }
        }
    }
}

fn unexpected(status: u16) -> ApiError {
    ApiError::Connection(format!("Unexpected HTTP status {status}"))
}

async fn read_file(response: reqwest::Response) -> Result<MediaFile> {
    let filename = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(filename_from_disposition)
        .ok_or_else(|| ApiError::Connection("Missing Content-Disposition filename".into()))?;
    let bytes = response.bytes().await?;
    Ok(MediaFile { filename, bytes })
}

/// Extract the quoted filename from a `Content-Disposition` value such as
/// `attachment; filename="image.png"`.
fn filename_from_disposition(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=\"")?;
    let (filename, _) = rest.rsplit_once('"')?;
    Some(filename.to_owned())
}

async fn upload_outcome(response: reqwest::Response, kind: MediaKind) -> Result<()> {
    match response.status().as_u16() {
        500..=599 => Err(ApiError::InternalServerError),
        204 => Ok(()),
        400 => {
            let body = response.bytes().await?;
            let invalid: InvalidMessage = serde_json::from_slice(&body)?;
            match DomainError::from_upload_reason(&invalid.reason, kind) {
                Some(err) => Err(err.into()),
                None => Err(ApiError::Connection(format!(
                    "Unrecognized rejection reason: {}",
                    invalid.reason
                ))),
            }
        }
        401 => Err(ApiError::Unauthorized),
        status => Err(unexpected(status)),
    }
}

async fn optional_image(
    response: reqwest::Response,
    on_bad_request: DomainError,
) -> Result<Option<MediaFile>> {
    match response.status().as_u16() {
        500..=599 => Err(ApiError::InternalServerError),
        200 => read_file(response).await.map(Some),
        204 => Ok(None),
        400 => Err(on_bad_request.into()),
        status => Err(unexpected(status)),
    }
}

fn image_update_outcome(status: u16) -> Result<()> {
    match status {
        500..=599 => Err(ApiError::InternalServerError),
        204 => Ok(()),
        400 => Err(DomainError::InvalidImage.into()),
        401 => Err(ApiError::Unauthorized),
        status => Err(unexpected(status)),
    }
}
