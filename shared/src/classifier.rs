use crate::error::ClientError;
use crate::model::{ProcessingResult, ProcessingStatus};
use crate::renderer::Layout;
use crate::session::Session;
use crate::transport::DocumentService;
use crate::upload::check_upload;

pub const REVIEW_DIRECTIVE: &str = "This document's confidence score was too low. It has been \
automatically sent to the Review Queue. Please open the Review Queue to complete processing.";

/// Where a result goes next.
///
/// Decided only by the status the service reported. The confidence
/// threshold is the service's policy and is never recomputed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triage {
    Finalized { layout: Layout },
    PendingReview { directive: &'static str },
}

pub fn classify(result: &ProcessingResult) -> Triage {
    match result.status {
        ProcessingStatus::Finalized => Triage::Finalized {
            layout: Layout::for_type(result.document_type),
        },
        ProcessingStatus::PendingReview => Triage::PendingReview {
            directive: REVIEW_DIRECTIVE,
        },
    }
}

/// Checks the upload locally, submits it once, and triages the answer.
pub async fn process_document<S: DocumentService>(
    service: &S,
    session: &Session,
    file: &S::File,
) -> Result<(ProcessingResult, Triage), ClientError> {
    check_upload(file)?;
    let result = service.submit(session, file).await?;
    let triage = classify(&result);
    log::info!(
        "Processed {} as {} ({}): {:?}",
        result.filename,
        result.document_type,
        result.confidence_percent(),
        result.status
    );
    Ok((result, triage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::model::DocumentType;
    use crate::transport::testing::{FakeService, result};
    use crate::upload::testing::TestFile;
    use futures::executor::block_on;

    fn session() -> Session {
        Session::new("token").unwrap()
    }

    #[test]
    fn classification_follows_reported_status_only() {
        // A low confidence with a finalized status stays finalized.
        let low = result("a.pdf", DocumentType::Invoice, 0.10, ProcessingStatus::Finalized);
        assert!(matches!(classify(&low), Triage::Finalized { .. }));
        let high = result("b.pdf", DocumentType::Invoice, 0.99, ProcessingStatus::PendingReview);
        assert_eq!(classify(&high), Triage::PendingReview { directive: REVIEW_DIRECTIVE });
    }

    #[test]
    fn finalized_invoice_creates_no_queue_entry() {
        let service = FakeService::default();
        service.script(result("invoice_a.pdf", DocumentType::Invoice, 0.92, ProcessingStatus::Finalized));

        let (processed, triage) =
            block_on(process_document(&service, &session(), &TestFile::pdf("invoice_a.pdf"))).unwrap();

        assert_eq!(processed.confidence_percent().to_string(), "92%");
        assert_eq!(
            triage,
            Triage::Finalized { layout: Layout::for_type(DocumentType::Invoice) }
        );
        assert!(matches!(triage, Triage::Finalized { layout: Layout::Projection(_) }));
        assert!(block_on(service.list_queue(&session())).unwrap().is_empty());
    }

    #[test]
    fn pending_result_appears_on_next_listing() {
        let service = FakeService::default();
        service.script(result("form_b.pdf", DocumentType::ClaimForm, 0.41, ProcessingStatus::PendingReview));

        let (_, triage) =
            block_on(process_document(&service, &session(), &TestFile::pdf("form_b.pdf"))).unwrap();
        assert!(matches!(triage, Triage::PendingReview { .. }));

        let queue = block_on(service.list_queue(&session())).unwrap();
        let matching: Vec<_> = queue.iter().filter(|e| e.filename == "form_b.pdf").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].model_confidence, "41%");
    }

    #[test]
    fn unsupported_upload_is_never_sent() {
        let service = FakeService::default();
        let gif = TestFile { name: "a.gif".into(), media_type: "image/gif".into() };
        let err = block_on(process_document(&service, &session(), &gif)).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::UnsupportedMediaType { .. })));
        assert_eq!(service.calls_named("submit"), 0);
    }

    #[test]
    fn service_rejection_is_surfaced() {
        let service = FakeService::default();
        let err = block_on(process_document(&service, &session(), &TestFile::pdf("blank.pdf"))).unwrap_err();
        assert_eq!(err.to_string(), "OCR failed.");
    }
}
