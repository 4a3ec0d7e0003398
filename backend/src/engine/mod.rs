//! Boundary to the OCR and language-model service that reads documents.

pub mod http;

use futures::future::BoxFuture;
use shared::{DocumentType, MediaType};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
    #[error("Engine rejected {operation} with status {status}: {body}")]
    Rejected {
        operation: &'static str,
        status: u16,
        body: String,
    },
}

/// An uploaded document held in memory for the length of one request.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub filename: String,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

/// The three reading steps of the pipeline. Implementations return raw
/// engine output; parsing and policy stay in the pipeline.
pub trait ExtractionEngine: Send + Sync {
    /// Full text of every page, in reading order.
    fn recognize<'a>(&'a self, document: &'a SourceDocument) -> BoxFuture<'a, Result<String, EngineError>>;

    /// Model output expected to hold one JSON object with `fields` as keys.
    fn extract<'a>(
        &'a self,
        text: &'a str,
        doc_type: DocumentType,
        fields: &'a [&'static str],
    ) -> BoxFuture<'a, Result<String, EngineError>>;

    /// A one-line judgement of whether `amount` is plausible for `vendor`.
    fn assess_risk<'a>(&'a self, vendor: &'a str, amount: f64) -> BoxFuture<'a, Result<String, EngineError>>;
}
