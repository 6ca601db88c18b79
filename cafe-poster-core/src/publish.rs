//! Item publisher: one instrument in, exactly one [`ItemResult`] out.
//!
//! Steps: generate content → (if a board is configured) download images and submit.
//! Nothing raised inside these steps escapes [`ItemPublisher::publish`]; failures
//! become a `Failed` result carrying the message.

use tracing::{debug, error, info, warn};

use crate::config::PublishConfig;
use crate::contract::{
    Article, ArticleSink, Board, Collaborators, ContentResponse, ContentSource, CredentialPair,
    GeneratedContent, ImageAttachment, ImageSource, Instrument, InstrumentType,
};
use crate::error::PipelineError;
use crate::report::ItemResult;

/// Validate a backend response: subject and body are both required.
pub fn require_content(response: ContentResponse) -> Result<GeneratedContent, PipelineError> {
    match (response.subject, response.content) {
        (Some(subject), Some(body)) if !subject.is_empty() && !body.is_empty() => {
            Ok(GeneratedContent {
                subject,
                body,
                image_urls: response.images,
            })
        }
        (subject, body) => Err(PipelineError::ContentGeneration(format!(
            "generated content is incomplete (subject: {}, body: {})",
            presence(subject.as_deref()),
            presence(body.as_deref()),
        ))),
    }
}

fn presence(field: Option<&str>) -> &'static str {
    match field {
        None => "missing",
        Some("") => "empty",
        Some(_) => "present",
    }
}

pub struct ItemPublisher<'a> {
    content: &'a dyn ContentSource,
    images: &'a dyn ImageSource,
    articles: &'a dyn ArticleSink,
    config: &'a PublishConfig,
}

impl<'a> ItemPublisher<'a> {
    pub fn new(services: &Collaborators<'a>, config: &'a PublishConfig) -> Self {
        Self {
            content: services.content,
            images: services.images,
            articles: services.articles,
            config,
        }
    }

    /// Publish one instrument. Never fails; see the module docs.
    pub async fn publish(
        &self,
        instrument: &Instrument,
        kind: InstrumentType,
        credentials: &CredentialPair,
        board: Option<&Board>,
    ) -> ItemResult {
        match self.try_publish(instrument, kind, credentials, board).await {
            Ok(result) => result,
            Err(e) => {
                error!(
                    instrument = %instrument.code,
                    name = %instrument.display_name(),
                    error = %e,
                    "[ITEM][ERROR] Item failed"
                );
                ItemResult::failed(instrument, &e)
            }
        }
    }

    async fn try_publish(
        &self,
        instrument: &Instrument,
        kind: InstrumentType,
        credentials: &CredentialPair,
        board: Option<&Board>,
    ) -> Result<ItemResult, PipelineError> {
        let generated = self.generate(instrument, kind).await?;
        info!(
            instrument = %instrument.code,
            subject = %generated.subject,
            body_len = generated.body.chars().count(),
            "[ITEM] Content generated"
        );

        let Some(board) = board else {
            info!(
                instrument = %instrument.code,
                "[ITEM] No board configured, content generated but not published"
            );
            return Ok(ItemResult::skipped(instrument, generated.subject));
        };

        let urls: Vec<String> = self
            .config
            .chart_image_url(kind, &instrument.code)
            .into_iter()
            .chain(generated.image_urls)
            .collect();
        let images = self.fetch_images(&instrument.code, &urls).await;

        let article = Article {
            subject: generated.subject,
            body: generated.body,
            images,
        };
        info!(
            instrument = %instrument.code,
            %board,
            images = article.images.len(),
            "[ITEM] Submitting article"
        );
        let receipt = self
            .articles
            .post_article(&credentials.access_token, board, &article)
            .await
            .map_err(|e| PipelineError::Publish(e.to_string()))?;
        debug!(instrument = %instrument.code, receipt = %receipt, "[ITEM] Submission receipt");
        info!(instrument = %instrument.code, %board, "[ITEM] Article published");

        Ok(ItemResult::published(instrument, article.subject, receipt))
    }

    async fn generate(
        &self,
        instrument: &Instrument,
        kind: InstrumentType,
    ) -> Result<GeneratedContent, PipelineError> {
        info!(instrument = %instrument.code, %kind, "[ITEM] Requesting generated content");
        let response = self
            .content
            .generate(&instrument.code, kind)
            .await
            .map_err(|e| PipelineError::ContentGeneration(e.to_string()))?;
        require_content(response)
    }

    /// Download every image; failures are logged and skipped. Indices follow `urls`.
    async fn fetch_images(&self, code: &str, urls: &[String]) -> Vec<ImageAttachment> {
        let mut attachments = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            match self.images.fetch_image(url).await {
                Ok(bytes) => {
                    debug!(instrument = %code, index, %url, size = bytes.len(), "[ITEM][IMAGE] Downloaded");
                    attachments.push(ImageAttachment {
                        index,
                        file_name: format!("chart_{index}.png"),
                        bytes,
                    });
                }
                Err(e) => {
                    let e = PipelineError::ImageFetch(format!("{url}: {e}"));
                    warn!(instrument = %code, index, error = %e, "[ITEM][IMAGE] Skipping image");
                }
            }
        }
        attachments
    }
}
