//! # Cafe client
//!
//! [`CafeClient`] submits articles to the cafe open API and downloads the images attached to
//! them. It implements [`ArticleSink`] and [`ImageSource`] from `cafe-poster-core`.
//!
//! The cafe API expects `subject` and `content` form fields to be percent-encoded UTF-8. The
//! encoding is a transport detail only; the markup itself is never touched.

use std::time::Duration;

use async_trait::async_trait;
use cafe_poster_core::contract::{Article, ArticleSink, Board, ImageSource};
use cafe_poster_core::error::ClientError;
use cafe_poster_core::message::extract_error_message;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct CafeClient {
    http: Client,
    api_base: String,
}

impl CafeClient {
    pub fn new(api_base: &str) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build().map_err(|e| {
            tracing::error!(error = ?e, "Failed to build cafe HTTP client");
            e
        })?;
        tracing::info!(api_base, "Initialized CafeClient");
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn article_url(&self, board: &Board) -> String {
        format!(
            "{}/v1/cafe/{}/menu/{}/articles",
            self.api_base, board.club_id, board.menu_id
        )
    }
}

/// Percent-encode a form value the way `encodeURIComponent` does for the cafe API.
pub fn encode_component(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Multipart body for one article: encoded text fields, `openyn=true`, then `image[<index>]` parts.
pub fn article_form(article: &Article) -> Result<Form, ClientError> {
    let mut form = Form::new()
        .text("subject", encode_component(&article.subject))
        .text("content", encode_component(&article.body))
        .text("openyn", "true");
    for image in &article.images {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str("image/png")?;
        form = form.part(image.field_name(), part);
    }
    Ok(form)
}

/// Readable reason for a rejected submission, from the platform's error body when it has one.
fn rejection_message(status: StatusCode, body: &str) -> String {
    let message = extract_error_message(status, body);
    if message == status.to_string() {
        format!("cafe returned {status}")
    } else {
        format!("cafe returned {status}: {message}")
    }
}

#[async_trait]
impl ArticleSink for CafeClient {
    async fn post_article(
        &self,
        access_token: &str,
        board: &Board,
        article: &Article,
    ) -> Result<Value, ClientError> {
        let url = self.article_url(board);
        tracing::debug!(%board, images = article.images.len(), "Submitting article");
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .multipart(article_form(article)?)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, %board, "Article submission failed to send");
                e
            })?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = rejection_message(status, &text);
            tracing::warn!(%status, %board, error = %message, "Cafe rejected the article");
            return Err(message.into());
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[async_trait]
impl ImageSource for CafeClient {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("image download failed: {status}").into());
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_poster_core::contract::ImageAttachment;

    #[test]
    fn encoding_matches_uri_component_rules() {
        assert_eq!(
            encode_component("삼성전자 outlook"),
            "%EC%82%BC%EC%84%B1%EC%A0%84%EC%9E%90%20outlook"
        );
        assert_eq!(encode_component("<p>a+b</p>"), "%3Cp%3Ea%2Bb%3C%2Fp%3E");
        assert_eq!(encode_component("plain-text_1.0*"), "plain-text_1.0*");
    }

    #[test]
    fn rejection_uses_structured_error_message() {
        let body = r#"{"error":{"code":"024","message":"Authentication failed"}}"#;
        assert_eq!(
            rejection_message(StatusCode::FORBIDDEN, body),
            "cafe returned 403 Forbidden: Authentication failed"
        );
        assert_eq!(
            rejection_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "cafe returned 500 Internal Server Error"
        );
        assert_eq!(
            rejection_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "cafe returned 502 Bad Gateway: upstream down"
        );
    }

    #[test]
    fn article_url_targets_club_and_menu() {
        let client = CafeClient::new("https://openapi.example/").unwrap();
        let board = Board {
            club_id: 31632186,
            menu_id: 29,
        };
        assert_eq!(
            client.article_url(&board),
            "https://openapi.example/v1/cafe/31632186/menu/29/articles"
        );
    }

    #[test]
    fn form_builds_with_images() {
        let article = Article {
            subject: "KRW-BTC daily outlook".into(),
            body: "<p>up</p>".into(),
            images: vec![
                ImageAttachment {
                    index: 0,
                    file_name: "chart_0.png".into(),
                    bytes: vec![1, 2, 3],
                },
                ImageAttachment {
                    index: 2,
                    file_name: "chart_2.png".into(),
                    bytes: vec![4],
                },
            ],
        };
        let form = article_form(&article).unwrap();
        assert!(!form.boundary().is_empty());
        assert_eq!(article.images[1].field_name(), "image[2]");
    }
}
