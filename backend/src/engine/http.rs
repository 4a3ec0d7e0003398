use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use shared::DocumentType;
use std::time::Duration;
use url::Url;

use super::{EngineError, ExtractionEngine, SourceDocument};
use crate::config::EngineConfig;

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    filename: &'a str,
    media_type: &'a str,
    content_base64: String,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    text: &'a str,
    doc_type: DocumentType,
    fields: &'a [&'static str],
}

#[derive(Serialize)]
struct RiskRequest<'a> {
    vendor: &'a str,
    amount: f64,
}

#[derive(Deserialize)]
struct EngineReply {
    #[serde(default)]
    text: String,
}

/// Talks to the extraction service over JSON/HTTP.
#[derive(Clone)]
pub struct HttpExtractionEngine {
    http_client: HttpClient,
    base_url: Url,
}

impl HttpExtractionEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            base_url: Url::parse(&base)?,
        })
    }

    async fn call<T: Serialize>(&self, operation: &'static str, body: &T) -> Result<String, EngineError> {
        let url = self.base_url.join(operation)?;
        log::debug!("Calling extraction engine: {}", url);

        let response = self.http_client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Extraction engine {} failed with {}: {}", operation, status, body);
            return Err(EngineError::Rejected {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        let reply: EngineReply = response.json().await?;
        Ok(reply.text)
    }
}

impl ExtractionEngine for HttpExtractionEngine {
    fn recognize<'a>(&'a self, document: &'a SourceDocument) -> BoxFuture<'a, Result<String, EngineError>> {
        async move {
            let request = RecognizeRequest {
                filename: &document.filename,
                media_type: document.media_type.mime(),
                content_base64: BASE64.encode(&document.bytes),
            };
            self.call("ocr", &request).await
        }
        .boxed()
    }

    fn extract<'a>(
        &'a self,
        text: &'a str,
        doc_type: DocumentType,
        fields: &'a [&'static str],
    ) -> BoxFuture<'a, Result<String, EngineError>> {
        async move {
            let request = ExtractRequest { text, doc_type, fields };
            self.call("extract", &request).await
        }
        .boxed()
    }

    fn assess_risk<'a>(&'a self, vendor: &'a str, amount: f64) -> BoxFuture<'a, Result<String, EngineError>> {
        async move { self.call("risk", &RiskRequest { vendor, amount }).await }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let engine = HttpExtractionEngine::new(&EngineConfig {
            base_url: "http://engine:8090/v1".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(engine.base_url.join("ocr").unwrap().as_str(), "http://engine:8090/v1/ocr");
    }

    #[test]
    fn invalid_base_url_is_an_error() {
        let result = HttpExtractionEngine::new(&EngineConfig {
            base_url: "not a url".into(),
            timeout_secs: 5,
        });
        assert!(matches!(result, Err(EngineError::Url(_))));
    }

    #[test]
    fn recognize_request_carries_base64_content() {
        let request = RecognizeRequest {
            filename: "a.pdf",
            media_type: "application/pdf",
            content_base64: BASE64.encode(b"%PDF"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["content_base64"], "JVBERg==");
    }
}
