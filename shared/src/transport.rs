//! Contract of the remote document service.
//!
//! Implementations perform exactly one request per call. Nothing here
//! retries: re-submitting a file is not idempotent on the server, so retry
//! policy belongs to whoever drives the call.

use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::model::{DashboardPayload, DashboardSnapshot, DocumentType, ProcessingResult, ReviewQueueEntry};
use crate::session::Session;
use crate::upload::AttachedFile;

pub mod endpoints {
    pub const PROCESS_DOCUMENT: &str = "/process-document/";
    pub const REVIEW_QUEUE: &str = "/review-queue/";
    pub const REVIEW_DOCUMENT: &str = "/review-document/";
    pub const DASHBOARD_DATA: &str = "/dashboard-data/";
    pub const AUTH_ME: &str = "/auth/me";
}

/// Multipart field names shared by client and server.
pub mod form_fields {
    pub const FILE: &str = "file";
    pub const CORRECT_DOC_TYPE: &str = "correct_doc_type";
    pub const FILENAME_TO_REMOVE: &str = "filename_to_remove";
}

/// Payload of a review correction: the re-attached source file, the type
/// the reviewer chose, and the queue entry it resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionRequest<F> {
    pub file: F,
    pub corrected_type: DocumentType,
    pub target_filename: String,
}

#[allow(async_fn_in_trait)]
pub trait DocumentService {
    type File: AttachedFile;

    async fn submit(
        &self,
        session: &Session,
        file: &Self::File,
    ) -> Result<ProcessingResult, ClientError>;

    /// An empty queue is `Ok(vec![])`, never an error.
    async fn list_queue(&self, session: &Session) -> Result<Vec<ReviewQueueEntry>, ClientError>;

    async fn confirm_correction(
        &self,
        session: &Session,
        request: &CorrectionRequest<Self::File>,
    ) -> Result<ProcessingResult, ClientError>;

    async fn fetch_dashboard(&self, session: &Session) -> Result<DashboardSnapshot, ClientError>;
}

/// Decodes a JSON body, turning non-2xx statuses into `Service` errors.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ClientError> {
    if !(200..300).contains(&status) {
        return Err(ClientError::from_response(status, body));
    }
    serde_json::from_str(body).map_err(ClientError::malformed)
}

pub fn decode_queue(status: u16, body: &str) -> Result<Vec<ReviewQueueEntry>, ClientError> {
    let entries: Option<Vec<ReviewQueueEntry>> = decode_response(status, body)?;
    Ok(entries.unwrap_or_default())
}

pub fn decode_dashboard(status: u16, body: &str) -> Result<DashboardSnapshot, ClientError> {
    let payload: Option<DashboardPayload> = decode_response(status, body)?;
    Ok(payload.unwrap_or_default().into())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    use super::*;
    use crate::model::ProcessingStatus;
    use crate::upload::testing::TestFile;

    /// In-memory stand-in for the remote service that mimics its queue
    /// bookkeeping and records every call.
    #[derive(Default)]
    pub struct FakeService {
        pub queue: RefCell<Vec<ReviewQueueEntry>>,
        pub scripted: RefCell<HashMap<String, ProcessingResult>>,
        pub confirm_failures: RefCell<VecDeque<ClientError>>,
        pub dashboards: RefCell<VecDeque<Result<DashboardSnapshot, ClientError>>>,
        pub calls: RefCell<Vec<String>>,
    }

    pub fn result(filename: &str, doc_type: DocumentType, confidence: f64, status: ProcessingStatus) -> ProcessingResult {
        ProcessingResult {
            filename: filename.to_string(),
            raw_text: format!("text of {}", filename),
            document_type: doc_type,
            confidence,
            status,
            extracted_fields: Default::default(),
            validation_checks: Default::default(),
            risk_narrative: String::new(),
        }
    }

    impl FakeService {
        pub fn script(&self, result: ProcessingResult) {
            self.scripted.borrow_mut().insert(result.filename.clone(), result);
        }

        pub fn calls_named(&self, name: &str) -> usize {
            self.calls.borrow().iter().filter(|call| call.starts_with(name)).count()
        }
    }

    impl DocumentService for FakeService {
        type File = TestFile;

        async fn submit(&self, _session: &Session, file: &TestFile) -> Result<ProcessingResult, ClientError> {
            self.calls.borrow_mut().push(format!("submit:{}", file.name));
            let result = self
                .scripted
                .borrow()
                .get(&file.name)
                .cloned()
                .ok_or_else(|| ClientError::service(Some(400), Some("OCR failed.".into())))?;
            let mut queue = self.queue.borrow_mut();
            queue.retain(|entry| entry.filename != result.filename);
            if result.status == ProcessingStatus::PendingReview {
                queue.push(ReviewQueueEntry::new(
                    result.filename.clone(),
                    result.document_type,
                    result.confidence,
                ));
            }
            Ok(result)
        }

        async fn list_queue(&self, _session: &Session) -> Result<Vec<ReviewQueueEntry>, ClientError> {
            self.calls.borrow_mut().push("list_queue".to_string());
            Ok(self.queue.borrow().clone())
        }

        async fn confirm_correction(
            &self,
            _session: &Session,
            request: &CorrectionRequest<TestFile>,
        ) -> Result<ProcessingResult, ClientError> {
            self.calls
                .borrow_mut()
                .push(format!("confirm:{}:{}", request.target_filename, request.corrected_type));
            if let Some(failure) = self.confirm_failures.borrow_mut().pop_front() {
                return Err(failure);
            }
            self.queue
                .borrow_mut()
                .retain(|entry| entry.filename != request.target_filename);
            Ok(result(
                &request.target_filename,
                request.corrected_type,
                1.0,
                ProcessingStatus::Finalized,
            ))
        }

        async fn fetch_dashboard(&self, _session: &Session) -> Result<DashboardSnapshot, ClientError> {
            self.calls.borrow_mut().push("fetch_dashboard".to_string());
            self.dashboards
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Transport("no scripted dashboard".into())))
        }
    }
}
