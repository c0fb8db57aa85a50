//! Typed REST client for the Spotter backend.
//!
//! Call shapes mirror the server's routes exactly; this layer does no
//! retrying and no caching. Every request carries the client-wide timeout
//! and, once a session exists, the bearer token. Non-2xx answers surface
//! the server's own `error` body field verbatim when present.

use std::path::Path;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use spotter_shared::message::Message;
use spotter_shared::types::{Candidate, MatchEntry, UserRecord};

use crate::error::{ApiError, Result};

/// Fallback used when a rejection body carries no `error` field.
const GENERIC_REJECTION: &str = "The server rejected the request";

/// Outcome of a like call. Mutual-match detection is entirely
/// server-side; the client only relays the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    /// The like was recorded; no mutual match (yet).
    Liked,
    /// Both parties have now accepted each other.
    MutualMatch,
}

/// Payload for account registration.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
}

/// Partial profile update, keyed by username on the wire.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct RecommendationsResponse {
    recommendations: Vec<Candidate>,
}

#[derive(Deserialize)]
struct MatchesResponse {
    matches: Vec<MatchEntry>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct RegisterResponse {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct LikeResponse {
    #[serde(rename = "match", alias = "mutualMatch", default)]
    matched: bool,
}

#[derive(Deserialize)]
struct PasswordChangeResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ProfilePictureResponse {
    prof_pic: String,
}

#[derive(Deserialize)]
struct GalleryPicturesResponse {
    about_pics: Vec<String>,
}

/// REST boundary client. Cheap to clone; the inner `reqwest::Client`
/// shares its connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client against `base_url` with the given per-request
    /// timeout. A timed-out request surfaces as a retryable transport
    /// error rather than hanging indefinitely.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token: None,
        })
    }

    /// Attach or clear the bearer token used on subsequent requests.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut req = self.http.request(method, url);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Map a non-2xx response into the error taxonomy, surfacing the
    /// server's message when it sent one.
    pub(crate) async fn expect_ok(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }
        let message = match resp.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| GENERIC_REJECTION.to_string()),
            Err(_) => GENERIC_REJECTION.to_string(),
        };
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    // -----------------------------------------------------------------
    // Matching
    // -----------------------------------------------------------------

    /// Fetch the ordered candidate deck for `email`.
    pub async fn recommendations(&self, email: &str) -> Result<Vec<Candidate>> {
        let resp = self
            .request(Method::GET, &format!("/users/{email}/recommend-users"))
            .send()
            .await?;
        let body: RecommendationsResponse = Self::expect_ok(resp).await?.json().await?;
        debug!(email, count = body.recommendations.len(), "Fetched recommendations");
        Ok(body.recommendations)
    }

    /// Record that `self_email` accepted `email_to_like`. The response
    /// body's optional match flag decides the outcome; a bare 2xx means
    /// liked without a mutual match.
    pub async fn like(&self, self_email: &str, email_to_like: &str) -> Result<LikeOutcome> {
        let resp = self
            .request(Method::POST, &format!("/users/like/{self_email}"))
            .json(&serde_json::json!({ "emailToLike": email_to_like }))
            .send()
            .await?;
        let resp = Self::expect_ok(resp).await?;
        let outcome = match resp.json::<LikeResponse>().await {
            Ok(body) if body.matched => LikeOutcome::MutualMatch,
            _ => LikeOutcome::Liked,
        };
        debug!(self_email, email_to_like, ?outcome, "Like recorded");
        Ok(outcome)
    }

    /// Fetch the match roster for the chat sidebar.
    pub async fn matches(&self, email: &str) -> Result<Vec<MatchEntry>> {
        let resp = self
            .request(Method::GET, &format!("/users/{email}/getMatches"))
            .send()
            .await?;
        let body: MatchesResponse = Self::expect_ok(resp).await?.json().await?;
        Ok(body.matches)
    }

    /// Fetch persisted history for the conversation between the pair.
    pub async fn chat_history(&self, self_email: &str, peer_email: &str) -> Result<Vec<Message>> {
        let resp = self
            .request(Method::GET, &format!("/chat/history/{self_email}/{peer_email}"))
            .send()
            .await?;
        let body: MessagesResponse = Self::expect_ok(resp).await?.json().await?;
        Ok(body.messages)
    }

    // -----------------------------------------------------------------
    // Account
    // -----------------------------------------------------------------

    /// Register a new account. Returns the server's confirmation message
    /// when it sends one.
    pub async fn register(&self, account: &NewAccount) -> Result<Option<String>> {
        let resp = self
            .request(Method::POST, "/users/register")
            .json(account)
            .send()
            .await?;
        let body: RegisterResponse = Self::expect_ok(resp).await?.json().await?;
        Ok(body.message)
    }

    /// Exchange credentials for an opaque session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let resp = self
            .request(Method::POST, "/users/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: TokenResponse = Self::expect_ok(resp).await?.json().await?;
        Ok(body.token)
    }

    // -----------------------------------------------------------------
    // Profile
    // -----------------------------------------------------------------

    pub async fn get_user(&self, email: &str) -> Result<UserRecord> {
        let resp = self
            .request(Method::GET, &format!("/users/{email}"))
            .send()
            .await?;
        Ok(Self::expect_ok(resp).await?.json().await?)
    }

    pub async fn update_user(&self, username: &str, update: &ProfileUpdate) -> Result<()> {
        let resp = self
            .request(Method::PUT, &format!("/users/{username}"))
            .json(update)
            .send()
            .await?;
        Self::expect_ok(resp).await?;
        Ok(())
    }

    /// Change the password; the server verifies `current_password`.
    pub async fn update_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let resp = self
            .request(Method::PUT, &format!("/users/update-password/{email}"))
            .json(&serde_json::json!({
                "currentPassword": current_password,
                "newPassword": new_password,
            }))
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body: PasswordChangeResponse = Self::expect_ok(resp).await?.json().await?;
        if !body.success {
            return Err(ApiError::Rejected {
                status,
                message: body
                    .message
                    .unwrap_or_else(|| GENERIC_REJECTION.to_string()),
            });
        }
        Ok(())
    }

    /// Upload a new profile picture. Returns the stored image URL.
    pub async fn upload_profile_picture(&self, email: &str, image: &Path) -> Result<String> {
        let part = file_part(image).await?;
        let form = reqwest::multipart::Form::new().part("image", part);
        let resp = self
            .request(Method::POST, &format!("/users/add-prof-pic/{email}"))
            .multipart(form)
            .send()
            .await?;
        let body: ProfilePictureResponse = Self::expect_ok(resp).await?.json().await?;
        Ok(body.prof_pic)
    }

    /// Upload gallery pictures. Returns the stored image URLs in order.
    pub async fn upload_gallery_pictures(
        &self,
        email: &str,
        images: &[&Path],
    ) -> Result<Vec<String>> {
        let mut form = reqwest::multipart::Form::new();
        for image in images {
            form = form.part("images", file_part(image).await?);
        }
        let resp = self
            .request(Method::POST, &format!("/users/add-about-pics/{email}"))
            .multipart(form)
            .send()
            .await?;
        let body: GalleryPicturesResponse = Self::expect_ok(resp).await?.json().await?;
        Ok(body.about_pics)
    }
}

async fn file_part(path: &Path) -> Result<reqwest::multipart::Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(reqwest::multipart::Part::bytes(bytes).file_name(file_name))
}
