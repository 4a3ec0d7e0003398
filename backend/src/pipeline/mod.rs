//! Server-side triage: read the document, decide whether a human must look
//! at it, and otherwise extract, validate and record it.

pub mod error;
pub mod rules;

use shared::renderer::projection;
use shared::{
    DashboardPayload, DocumentType, FieldValue, MediaType, ProcessingResult, ProcessingStatus,
    ReviewQueueEntry,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::engine::{ExtractionEngine, SourceDocument};
use crate::store::ledger::{Ledger, LedgerRecord};
use crate::store::queue::ReviewQueueStore;
pub use error::PipelineError;
use rules::RiskInput;

/// A file as received in a multipart request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    fn into_document(self) -> Result<SourceDocument, PipelineError> {
        let media_type = MediaType::detect(&self.filename, &self.content_type).ok_or_else(|| {
            PipelineError::UnsupportedMedia(if self.content_type.is_empty() {
                self.filename.clone()
            } else {
                self.content_type.clone()
            })
        })?;
        if self.bytes.is_empty() {
            return Err(PipelineError::EmptyUpload);
        }
        Ok(SourceDocument {
            filename: self.filename,
            media_type,
            bytes: self.bytes,
        })
    }
}

/// Policy knobs taken from [`ServiceConfig`].
#[derive(Debug, Clone, Copy)]
pub struct TriagePolicy {
    pub review_threshold: f64,
    pub amount_ceiling: f64,
    pub top_vendor_limit: usize,
}

impl From<&ServiceConfig> for TriagePolicy {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            review_threshold: config.review_threshold,
            amount_ceiling: config.amount_ceiling,
            top_vendor_limit: config.top_vendor_limit,
        }
    }
}

struct Analysis {
    fields: BTreeMap<String, FieldValue>,
    checks: BTreeMap<String, String>,
    risk: String,
}

pub struct DocumentPipeline {
    engine: Arc<dyn ExtractionEngine>,
    queue: ReviewQueueStore,
    ledger: Ledger,
    policy: TriagePolicy,
}

impl DocumentPipeline {
    pub fn new(engine: Arc<dyn ExtractionEngine>, queue: ReviewQueueStore, ledger: Ledger, policy: TriagePolicy) -> Self {
        Self {
            engine,
            queue,
            ledger,
            policy,
        }
    }

    /// Classifies a new upload. Low-confidence documents are parked in the
    /// review queue and returned without details.
    pub async fn process(&self, upload: Upload) -> Result<ProcessingResult, PipelineError> {
        let document = upload.into_document()?;
        let raw_text = self.recognize(&document).await?;
        let hinted = rules::append_amount_hint(&raw_text);
        let (doc_type, confidence) = rules::classify_text(&hinted);
        log::info!(
            "Classified {} as {} with confidence {:.2}",
            document.filename,
            doc_type,
            confidence
        );

        if confidence < self.policy.review_threshold {
            self.queue
                .upsert(ReviewQueueEntry::new(document.filename.clone(), doc_type, confidence))
                .await?;
            return Ok(ProcessingResult {
                filename: document.filename,
                raw_text,
                document_type: doc_type,
                confidence,
                status: ProcessingStatus::PendingReview,
                extracted_fields: BTreeMap::new(),
                validation_checks: BTreeMap::new(),
                risk_narrative: String::new(),
            });
        }

        let analysis = self.analyze(&hinted, doc_type).await?;
        self.ledger
            .append(LedgerRecord::new(doc_type, &analysis.fields, &document.bytes))
            .await?;
        // A confident re-upload supersedes any earlier parked copy.
        if self.queue.remove(&document.filename).await? {
            log::info!("Finalized {} replaced its pending review entry", document.filename);
        }

        Ok(finalized(document.filename, raw_text, doc_type, confidence, analysis))
    }

    /// Applies a reviewer's correction to a parked document.
    pub async fn review(
        &self,
        upload: Upload,
        corrected_type: DocumentType,
        filename_to_remove: &str,
    ) -> Result<ProcessingResult, PipelineError> {
        if upload.filename != filename_to_remove {
            return Err(PipelineError::FilenameMismatch {
                expected: filename_to_remove.to_string(),
                uploaded: upload.filename,
            });
        }
        if !self.queue.contains(filename_to_remove).await {
            return Err(PipelineError::NotPending(filename_to_remove.to_string()));
        }

        let document = upload.into_document()?;
        let raw_text = self.recognize(&document).await?;
        let hinted = rules::append_amount_hint(&raw_text);
        let analysis = self.analyze(&hinted, corrected_type).await?;

        // Claim the entry before recording so concurrent corrections of the
        // same file record it once.
        if !self.queue.remove(filename_to_remove).await? {
            return Err(PipelineError::NotPending(filename_to_remove.to_string()));
        }
        let record = LedgerRecord::new(corrected_type, &analysis.fields, &document.bytes);
        if let Err(e) = self.ledger.append(record).await {
            let restored = ReviewQueueEntry {
                filename: filename_to_remove.to_string(),
                model_guess: corrected_type,
                model_confidence: "100%".to_string(),
            };
            if let Err(restore_err) = self.queue.upsert(restored).await {
                log::error!("Could not restore {} to the review queue: {}", filename_to_remove, restore_err);
            }
            return Err(e.into());
        }
        log::info!("Review of {} confirmed as {}", filename_to_remove, corrected_type);

        Ok(finalized(document.filename, raw_text, corrected_type, 1.0, analysis))
    }

    pub async fn queue(&self) -> Vec<ReviewQueueEntry> {
        self.queue.list().await
    }

    pub async fn dashboard(&self) -> DashboardPayload {
        self.ledger.dashboard(self.policy.top_vendor_limit).await
    }

    async fn recognize(&self, document: &SourceDocument) -> Result<String, PipelineError> {
        let text = self.engine.recognize(document).await?;
        if text.trim().is_empty() {
            return Err(PipelineError::OcrFailed);
        }
        Ok(text)
    }

    async fn analyze(&self, text: &str, doc_type: DocumentType) -> Result<Analysis, PipelineError> {
        let fields = match projection(doc_type) {
            Some(specs) => {
                let keys: Vec<&'static str> = specs.iter().map(|spec| spec.key).collect();
                let raw = self.engine.extract(text, doc_type, &keys).await?;
                rules::parse_extraction(&raw).map_err(|reason| {
                    log::error!("Unusable extraction output for {}: {}", doc_type, reason);
                    PipelineError::InvalidExtraction(reason)
                })?
            }
            None => BTreeMap::new(),
        };

        let checks = rules::validate_fields(&fields, self.policy.amount_ceiling);
        let risk = self.assess_risk(&fields).await;
        Ok(Analysis { fields, checks, risk })
    }

    async fn assess_risk(&self, fields: &BTreeMap<String, FieldValue>) -> String {
        match rules::risk_input(fields) {
            RiskInput::Insufficient => rules::RISK_INSUFFICIENT.to_string(),
            RiskInput::Unparsable => rules::RISK_FAILED.to_string(),
            RiskInput::Ready { vendor, amount } => match self.engine.assess_risk(&vendor, amount).await {
                Ok(narrative) if !narrative.trim().is_empty() => narrative.trim().to_string(),
                Ok(_) => rules::RISK_FAILED.to_string(),
                Err(e) => {
                    log::warn!("Risk analysis failed for {}: {}", vendor, e);
                    rules::RISK_FAILED.to_string()
                }
            },
        }
    }
}

fn finalized(
    filename: String,
    raw_text: String,
    document_type: DocumentType,
    confidence: f64,
    analysis: Analysis,
) -> ProcessingResult {
    ProcessingResult {
        filename,
        raw_text,
        document_type,
        confidence,
        status: ProcessingStatus::Finalized,
        extracted_fields: analysis.fields,
        validation_checks: analysis.checks,
        risk_narrative: analysis.risk,
    }
}
