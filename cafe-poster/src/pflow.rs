//! # Backend client
//!
//! [`PflowClient`] implements the credential store, token exchange and content source traits of
//! `cafe-poster-core` against the content backend's HTTP API.
//!
//! Non-success responses are turned into readable errors with
//! [`extract_error_message`]; the core maps them into its own taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use cafe_poster_core::contract::{
    AccountLookup, AccountStore, ContentResponse, ContentSource, Instrument, InstrumentType,
    SaveTokenRequest, SaveTokenResponse, TokenExchange, TokenResponse,
};
use cafe_poster_core::error::ClientError;
use cafe_poster_core::message::extract_error_message;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct PflowClient {
    http: Client,
    base_url: String,
}

impl PflowClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build().map_err(|e| {
            tracing::error!(error = ?e, "Failed to build backend HTTP client");
            e
        })?;
        tracing::info!(base_url, "Initialized PflowClient");
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn account_request(&self, account_id: &str) -> RequestBuilder {
        self.http
            .get(self.url("/api/naver/saveToken"))
            .query(&[("id", account_id)])
    }

    fn save_token_request(&self, request: &SaveTokenRequest) -> RequestBuilder {
        self.http.post(self.url("/api/naver/saveToken")).json(request)
    }

    fn refresh_request(&self, refresh_token: &str) -> RequestBuilder {
        self.http
            .post(self.url("/api/naver/refresh"))
            .json(&json!({ "refresh_token": refresh_token }))
    }

    fn listing_request(&self, kind: InstrumentType, size: usize) -> RequestBuilder {
        match kind {
            InstrumentType::Crypto => self.http.get(self.url("/api/getUpbitCoinList")),
            stock => self
                .http
                .get(self.url("/api/getFavoriteList"))
                .query(&[("type", stock.as_str().to_string()), ("size", size.to_string())]),
        }
    }

    fn content_request(&self, code: &str, kind: InstrumentType) -> RequestBuilder {
        let endpoint = self.http.get(self.url("/api/pflow-content"));
        match kind {
            InstrumentType::Crypto => endpoint.query(&[("type", "crypto"), ("code", code)]),
            stock => endpoint.query(&[
                ("type", "stock"),
                ("code", code),
                ("stockType", stock.as_str()),
            ]),
        }
    }
}

/// Send a request and decode a JSON body, turning non-success statuses into readable errors.
///
/// `what` only labels the logs; callers in the core prefix the error with their own context.
async fn send_json<T: DeserializeOwned>(request: RequestBuilder, what: &str) -> Result<T, ClientError> {
    let response = request.send().await.map_err(|e| {
        tracing::error!(error = ?e, what, "Backend request failed to send");
        e
    })?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(status, &body);
        tracing::warn!(%status, what, error = %message, "Backend returned an error status");
        return Err(message.into());
    }
    let decoded = response.json::<T>().await.map_err(|e| {
        tracing::error!(error = ?e, what, "Failed to decode backend response");
        e
    })?;
    Ok(decoded)
}

#[async_trait]
impl AccountStore for PflowClient {
    async fn fetch_account(&self, account_id: &str) -> Result<AccountLookup, ClientError> {
        tracing::debug!(account_id, "Fetching stored account");
        send_json(self.account_request(account_id), "account lookup").await
    }

    async fn save_token(&self, request: &SaveTokenRequest) -> Result<SaveTokenResponse, ClientError> {
        tracing::debug!(account_id = %request.id, "Saving refreshed credentials");
        send_json(self.save_token_request(request), "token save").await
    }
}

#[async_trait]
impl TokenExchange for PflowClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ClientError> {
        send_json(self.refresh_request(refresh_token), "token exchange").await
    }
}

#[async_trait]
impl ContentSource for PflowClient {
    async fn list_instruments(
        &self,
        kind: InstrumentType,
        size: usize,
    ) -> Result<Vec<Instrument>, ClientError> {
        tracing::debug!(%kind, size, "Requesting instrument listing");
        let listed: Option<Vec<Instrument>> =
            send_json(self.listing_request(kind, size), "listing").await?;
        Ok(listed.unwrap_or_default())
    }

    async fn generate(&self, code: &str, kind: InstrumentType) -> Result<ContentResponse, ClientError> {
        tracing::debug!(code, %kind, "Requesting generated content");
        send_json(self.content_request(code, kind), "content generation").await
    }
}
