//! # contract: interfaces to the external collaborators of the pipeline
//!
//! The pipeline talks to four outside systems:
//! - the account store (stored refresh token, token persistence),
//! - the token exchange (refresh token → access token),
//! - the content backend (instrument listings, generated articles),
//! - the cafe platform (article submission, image download).
//!
//! Each is a trait here. The wire-shaped response types are kept as loose as the
//! backend sends them (optional fields); validation happens in the pipeline, not in
//! the clients, so that it is covered by the mock-driven tests.
//!
//! ## Mocking & Testing
//! Every trait is annotated for `mockall`. Mocks are exported under the
//! `test-export-mocks` feature so integration tests and downstream crates can use them.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::{ClientError, PipelineError};
use crate::pacing::Pacer;

/// Kind of instrument; selects the listing, the generation mode and the target board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    Domestic,
    World,
    Crypto,
}

impl InstrumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentType::Domestic => "domestic",
            InstrumentType::World => "world",
            InstrumentType::Crypto => "crypto",
        }
    }

    /// Human-readable label used in reports and logs.
    pub fn label(&self) -> &'static str {
        match self {
            InstrumentType::Domestic => "Domestic stocks",
            InstrumentType::World => "World stocks",
            InstrumentType::Crypto => "Crypto",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domestic" => Ok(InstrumentType::Domestic),
            "world" => Ok(InstrumentType::World),
            "crypto" => Ok(InstrumentType::Crypto),
            other => Err(PipelineError::UnknownType(other.to_string())),
        }
    }
}

/// One listed stock or coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Instrument {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: Some(name.into()),
        }
    }

    /// Listing name, falling back to the code when the listing had none.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.code,
        }
    }
}

/// Target board on the cafe platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub club_id: u64,
    pub menu_id: u64,
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.club_id, self.menu_id)
    }
}

/// Short-lived access token plus the long-lived refresh token that produced it.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Response of the account lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountLookup {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<AccountRecord>,
}

/// Stored account data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountRecord {
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body sent to persist a rotated token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveTokenRequest {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveTokenResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of the token exchange. Either a grant or an OAuth-style error object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Raw generated article as returned by the content backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentResponse {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Optional illustrative image URLs (charts). `null` reads as none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Validated article content for one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    pub subject: String,
    pub body: String,
    pub image_urls: Vec<String>,
}

/// Downloaded image to attach to an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Position of the image in the requested URL list.
    pub index: usize,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Multipart field name (`image[0]`, `image[1]`, ...).
    pub fn field_name(&self) -> String {
        format!("image[{}]", self.index)
    }
}

/// Article ready for submission. Subject and body are opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub subject: String,
    pub body: String,
    pub images: Vec<ImageAttachment>,
}

/// Stored account data and token persistence.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up the stored account (type and refresh token).
    async fn fetch_account(&self, account_id: &str) -> Result<AccountLookup, ClientError>;

    /// Persist a freshly exchanged token pair.
    async fn save_token(&self, request: &SaveTokenRequest) -> Result<SaveTokenResponse, ClientError>;
}

/// Refresh-token → access-token exchange.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ClientError>;
}

/// Instrument listings and article generation.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Ordered instrument list for a type. `size` bounds ranked stock lists;
    /// the crypto listing returns every coin.
    async fn list_instruments(
        &self,
        kind: InstrumentType,
        size: usize,
    ) -> Result<Vec<Instrument>, ClientError>;

    /// Generate the article for one instrument.
    async fn generate(&self, code: &str, kind: InstrumentType)
        -> Result<ContentResponse, ClientError>;
}

/// Binary download of illustrative images.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ClientError>;
}

/// Article submission endpoint of the cafe platform.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ArticleSink: Send + Sync {
    /// Submit an article to a board with a bearer access token.
    /// Returns the platform's success payload.
    async fn post_article(
        &self,
        access_token: &str,
        board: &Board,
        article: &Article,
    ) -> Result<serde_json::Value, ClientError>;
}

/// Everything the pipeline calls out to, borrowed for the duration of a run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub accounts: &'a dyn AccountStore,
    pub tokens: &'a dyn TokenExchange,
    pub content: &'a dyn ContentSource,
    pub images: &'a dyn ImageSource,
    pub articles: &'a dyn ArticleSink,
    pub pacer: &'a dyn Pacer,
}
