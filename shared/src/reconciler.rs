//! Review queue reconciliation.
//!
//! A reviewer opens a pending entry, re-attaches the original file (the
//! service keeps no bytes between the rejection and the correction), picks
//! the correct document type and confirms. Confirmation is only reachable
//! when the attached file's declared name equals the entry's filename;
//! there is no override.
//!
//! The reconciler is a plain state holder. Views that cannot keep `&mut`
//! across an await drive it with [`ReviewReconciler::begin_confirm`] and
//! [`ReviewReconciler::finish_confirm`]; everything else can use
//! [`ReviewReconciler::confirm`].

use std::collections::BTreeSet;

use crate::error::{ClientError, ValidationError};
use crate::model::{DocumentType, ProcessingResult, ReviewQueueEntry};
use crate::session::Session;
use crate::transport::{CorrectionRequest, DocumentService};
use crate::upload::{AttachedFile, check_upload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    /// No entry open; the cached listing is on screen.
    Listed,
    /// Entry just opened, type pre-filled; the source file must be
    /// attached again before anything else can happen.
    AwaitingFile,
    /// Entry open with a matching file but no document type selected.
    AwaitingType,
    FileMismatch,
    ReadyToConfirm,
    Confirming,
    /// Last confirmation succeeded; the listing must be refreshed.
    Resolved,
}

#[derive(Debug, Clone)]
struct CorrectionForm<F> {
    entry: ReviewQueueEntry,
    selected_type: Option<DocumentType>,
    attached: Option<F>,
    rejected_attachment: Option<ValidationError>,
    confirming: bool,
    failure: Option<ClientError>,
}

/// Permission to apply one queue listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct ReviewReconciler<F> {
    entries: Vec<ReviewQueueEntry>,
    ambiguous: BTreeSet<String>,
    form: Option<CorrectionForm<F>>,
    resolved: Option<String>,
    last_result: Option<ProcessingResult>,
    listing_generation: u64,
}

impl<F> Default for ReviewReconciler<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            ambiguous: BTreeSet::new(),
            form: None,
            resolved: None,
            last_result: None,
            listing_generation: 0,
        }
    }
}

impl<F: AttachedFile> ReviewReconciler<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ReviewQueueEntry] {
        &self.entries
    }

    /// Installs a fresh listing from the service.
    ///
    /// Filenames listed more than once are recorded as ambiguous: the
    /// correction endpoint resolves by filename alone, so one confirmation
    /// may clear several rows.
    pub fn replace_queue(&mut self, entries: Vec<ReviewQueueEntry>) {
        let mut seen = BTreeSet::new();
        let mut ambiguous = BTreeSet::new();
        for entry in &entries {
            if !seen.insert(entry.filename.as_str()) {
                ambiguous.insert(entry.filename.clone());
            }
        }
        for filename in &ambiguous {
            log::warn!("Review queue lists \"{}\" more than once", filename);
        }

        self.ambiguous = ambiguous;
        self.entries = entries;
        self.resolved = None;

        let orphaned = self.form.as_ref().is_some_and(|form| {
            !form.confirming && !self.entries.iter().any(|e| e.filename == form.entry.filename)
        });
        if orphaned {
            log::info!("Open review entry disappeared from the queue; closing it");
            self.form = None;
        }
    }

    /// Stamps a listing request before it is sent.
    pub fn begin_listing(&self) -> Listing {
        Listing {
            generation: self.listing_generation,
        }
    }

    /// Applies a listing stamped by `begin_listing`. A listing requested
    /// before the last successful confirmation may still show the resolved
    /// entry, so it is discarded and `false` is returned.
    pub fn finish_listing(&mut self, listing: Listing, entries: Vec<ReviewQueueEntry>) -> bool {
        if listing.generation != self.listing_generation {
            log::debug!("Discarding review queue listing requested before the last confirmation");
            return false;
        }
        self.replace_queue(entries);
        true
    }

    pub fn is_ambiguous(&self, filename: &str) -> bool {
        self.ambiguous.contains(filename)
    }

    pub fn ambiguous_filenames(&self) -> impl Iterator<Item = &str> {
        self.ambiguous.iter().map(String::as_str)
    }

    pub fn state(&self) -> ReviewState {
        let Some(form) = &self.form else {
            return if self.resolved.is_some() {
                ReviewState::Resolved
            } else {
                ReviewState::Listed
            };
        };
        if form.confirming {
            ReviewState::Confirming
        } else if matches!(form.rejected_attachment, Some(ValidationError::FileMismatch { .. })) {
            ReviewState::FileMismatch
        } else if form.attached.is_none() {
            ReviewState::AwaitingFile
        } else if form.selected_type.is_none() {
            ReviewState::AwaitingType
        } else {
            ReviewState::ReadyToConfirm
        }
    }

    pub fn open_entry(&self) -> Option<&ReviewQueueEntry> {
        self.form.as_ref().map(|form| &form.entry)
    }

    pub fn selected_type(&self) -> Option<DocumentType> {
        self.form.as_ref().and_then(|form| form.selected_type)
    }

    pub fn attached_file(&self) -> Option<&F> {
        self.form.as_ref().and_then(|form| form.attached.as_ref())
    }

    pub fn resolved_filename(&self) -> Option<&str> {
        self.resolved.as_deref()
    }

    /// Outcome of the last successful confirmation. Survives refreshes and
    /// is dropped when another entry is opened or the form is closed.
    pub fn last_result(&self) -> Option<&ProcessingResult> {
        self.last_result.as_ref()
    }

    pub fn can_confirm(&self) -> bool {
        self.state() == ReviewState::ReadyToConfirm
    }

    /// Opens an entry for correction, pre-selecting the model's guess.
    pub fn open(&mut self, filename: &str) -> Result<ReviewState, ValidationError> {
        if self.form.as_ref().is_some_and(|form| form.confirming) {
            return Err(ValidationError::ConfirmationInFlight);
        }
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.filename == filename)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownEntry(filename.to_string()))?;

        self.form = Some(CorrectionForm {
            selected_type: Some(entry.model_guess),
            entry,
            attached: None,
            rejected_attachment: None,
            confirming: false,
            failure: None,
        });
        self.resolved = None;
        self.last_result = None;
        Ok(self.state())
    }

    /// Closes the form. Refused while a confirmation is outstanding.
    pub fn close(&mut self) -> bool {
        match &self.form {
            Some(form) if form.confirming => false,
            _ => {
                self.form = None;
                self.last_result = None;
                true
            }
        }
    }

    fn editable_form(&mut self) -> Result<&mut CorrectionForm<F>, ValidationError> {
        let form = self.form.as_mut().ok_or(ValidationError::NoEntryOpen)?;
        if form.confirming {
            return Err(ValidationError::ConfirmationInFlight);
        }
        Ok(form)
    }

    /// Attaches the re-uploaded source file.
    ///
    /// A name that differs from the entry's filename is rejected and any
    /// previously accepted file is dropped, so the form is blocked until a
    /// matching file arrives.
    pub fn attach_file(&mut self, file: F) -> Result<ReviewState, ValidationError> {
        let form = self.editable_form()?;
        form.failure = None;

        let attached_name = file.name();
        if attached_name != form.entry.filename {
            let mismatch = ValidationError::FileMismatch {
                expected: form.entry.filename.clone(),
                attached: attached_name,
            };
            form.attached = None;
            form.rejected_attachment = Some(mismatch.clone());
            return Err(mismatch);
        }
        if let Err(unsupported) = check_upload(&file) {
            form.attached = None;
            form.rejected_attachment = Some(unsupported.clone());
            return Err(unsupported);
        }

        form.attached = Some(file);
        form.rejected_attachment = None;
        Ok(self.state())
    }

    pub fn select_type(&mut self, document_type: Option<DocumentType>) -> Result<ReviewState, ValidationError> {
        let form = self.editable_form()?;
        form.selected_type = document_type;
        form.failure = None;
        Ok(self.state())
    }

    /// The message to show inline under the form, if any.
    pub fn notice(&self) -> Option<String> {
        let form = self.form.as_ref()?;
        if let Some(failure) = &form.failure {
            return Some(failure.to_string());
        }
        if let Some(rejected) = &form.rejected_attachment {
            return Some(rejected.to_string());
        }
        if form.attached.is_some() && form.selected_type.is_none() {
            return Some(ValidationError::MissingType.to_string());
        }
        if self.is_ambiguous(&form.entry.filename) {
            return Some(format!(
                "\"{}\" appears more than once in the queue. Confirming resolves every row with this filename.",
                form.entry.filename
            ));
        }
        None
    }

    /// Guards the transition into `Confirming` and hands out the request
    /// to send. A second call while one is outstanding is rejected.
    pub fn begin_confirm(&mut self) -> Result<CorrectionRequest<F>, ValidationError> {
        let form = self.editable_form()?;
        if let Some(rejected @ ValidationError::FileMismatch { .. }) = &form.rejected_attachment {
            return Err(rejected.clone());
        }
        let file = form.attached.clone().ok_or(ValidationError::MissingFile)?;
        let corrected_type = form.selected_type.ok_or(ValidationError::MissingType)?;
        if file.name() != form.entry.filename {
            return Err(ValidationError::FileMismatch {
                expected: form.entry.filename.clone(),
                attached: file.name(),
            });
        }

        form.confirming = true;
        form.failure = None;
        Ok(CorrectionRequest {
            file,
            corrected_type,
            target_filename: form.entry.filename.clone(),
        })
    }

    /// Applies the outcome of the request handed out by `begin_confirm`.
    ///
    /// Success drops the entry locally and marks the listing for a full
    /// refresh. Failure returns to `ReadyToConfirm` with the file and type
    /// intact so the reviewer can retry without re-attaching.
    pub fn finish_confirm(
        &mut self,
        outcome: Result<ProcessingResult, ClientError>,
    ) -> Result<ProcessingResult, ClientError> {
        let Some(form) = self.form.as_mut().filter(|form| form.confirming) else {
            log::warn!("Confirmation finished with no confirmation outstanding");
            return outcome;
        };

        match outcome {
            Ok(result) => {
                let target = form.entry.filename.clone();
                log::info!("Review correction for {} confirmed as {}", target, result.document_type);
                self.entries.retain(|entry| entry.filename != target);
                self.ambiguous.remove(&target);
                self.form = None;
                self.resolved = Some(target);
                self.last_result = Some(result.clone());
                self.listing_generation += 1;
                Ok(result)
            }
            Err(err) => {
                log::warn!("Review correction for {} failed: {}", form.entry.filename, err);
                form.confirming = false;
                form.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    pub async fn refresh<S>(&mut self, service: &S, session: &Session) -> Result<(), ClientError>
    where
        S: DocumentService<File = F>,
    {
        let listing = self.begin_listing();
        let entries = service.list_queue(session).await?;
        self.finish_listing(listing, entries);
        Ok(())
    }

    /// Runs a full confirmation: guard, one request, bookkeeping, then a
    /// queue refresh from the service rather than a local splice.
    pub async fn confirm<S>(&mut self, service: &S, session: &Session) -> Result<ProcessingResult, ClientError>
    where
        S: DocumentService<File = F>,
    {
        let request = self.begin_confirm()?;
        let outcome = service.confirm_correction(session, &request).await;
        let result = self.finish_confirm(outcome)?;
        if let Err(err) = self.refresh(service, session).await {
            log::warn!("Queue refresh after confirmation failed: {}", err);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProcessingStatus;
    use crate::transport::testing::{FakeService, result};
    use crate::upload::testing::TestFile;
    use futures::executor::block_on;

    fn session() -> Session {
        Session::new("token").unwrap()
    }

    fn service_with_pending(names: &[&str]) -> FakeService {
        let service = FakeService::default();
        for name in names {
            service
                .queue
                .borrow_mut()
                .push(ReviewQueueEntry::new(*name, DocumentType::Unknown, 0.41));
        }
        service
    }

    fn loaded(service: &FakeService) -> ReviewReconciler<TestFile> {
        let mut reconciler = ReviewReconciler::new();
        block_on(reconciler.refresh(service, &session())).unwrap();
        reconciler
    }

    #[test]
    fn opening_prefills_guess_and_awaits_file() {
        let service = service_with_pending(&["form_b.pdf"]);
        let mut reconciler = loaded(&service);
        assert_eq!(reconciler.state(), ReviewState::Listed);

        assert_eq!(reconciler.open("form_b.pdf"), Ok(ReviewState::AwaitingFile));
        assert_eq!(reconciler.selected_type(), Some(DocumentType::Unknown));
        assert!(!reconciler.can_confirm());
        assert_eq!(
            reconciler.begin_confirm().unwrap_err(),
            ValidationError::MissingFile
        );
    }

    #[test]
    fn opening_an_unlisted_entry_fails() {
        let service = service_with_pending(&["form_b.pdf"]);
        let mut reconciler = loaded(&service);
        assert_eq!(
            reconciler.open("other.pdf"),
            Err(ValidationError::UnknownEntry("other.pdf".into()))
        );
        assert_eq!(reconciler.state(), ReviewState::Listed);
    }

    #[test]
    fn mismatched_file_blocks_confirmation() {
        let service = service_with_pending(&["form_b.pdf"]);
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();

        let err = reconciler.attach_file(TestFile::pdf("form_c.pdf")).unwrap_err();
        assert_eq!(reconciler.state(), ReviewState::FileMismatch);
        let notice = reconciler.notice().unwrap();
        assert!(notice.contains("form_b.pdf") && notice.contains("form_c.pdf"));
        assert_eq!(err.to_string(), notice);
        assert!(!reconciler.can_confirm());

        let outcome = block_on(reconciler.confirm(&service, &session()));
        assert!(matches!(
            outcome,
            Err(ClientError::Validation(ValidationError::FileMismatch { .. }))
        ));
        assert_eq!(service.calls_named("confirm"), 0);
        assert_eq!(reconciler.state(), ReviewState::FileMismatch);
    }

    #[test]
    fn no_unequal_name_pair_reaches_the_service() {
        let pairs = [
            ("form_b.pdf", "form_c.pdf"),
            ("form_b.pdf", "FORM_B.pdf"),
            ("form_b.pdf", "form_b.pdf "),
            ("form_b.pdf", "form_b.PDF"),
            ("scan.png", "scan.jpg"),
            ("a.pdf", ""),
        ];
        for (expected, attached) in pairs {
            let service = service_with_pending(&[expected]);
            let mut reconciler = loaded(&service);
            reconciler.open(expected).unwrap();
            let file = TestFile { name: attached.into(), media_type: "application/pdf".into() };
            assert!(reconciler.attach_file(file).is_err());
            assert_eq!(reconciler.state(), ReviewState::FileMismatch, "{expected} vs {attached:?}");
            assert!(block_on(reconciler.confirm(&service, &session())).is_err());
            assert_eq!(service.calls_named("confirm"), 0);
        }
    }

    #[test]
    fn matching_file_replaces_an_earlier_mismatch() {
        let service = service_with_pending(&["form_b.pdf"]);
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();
        reconciler.attach_file(TestFile::pdf("form_c.pdf")).unwrap_err();
        assert_eq!(
            reconciler.attach_file(TestFile::pdf("form_b.pdf")),
            Ok(ReviewState::ReadyToConfirm)
        );
        assert!(reconciler.notice().is_none());
    }

    #[test]
    fn a_matching_file_after_a_good_one_still_demands_a_match() {
        let service = service_with_pending(&["form_b.pdf"]);
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();
        reconciler.attach_file(TestFile::pdf("form_b.pdf")).unwrap();
        reconciler.attach_file(TestFile::pdf("other.pdf")).unwrap_err();
        assert!(reconciler.attached_file().is_none());
        assert_eq!(reconciler.state(), ReviewState::FileMismatch);
    }

    #[test]
    fn clearing_the_type_blocks_confirmation() {
        let service = service_with_pending(&["form_b.pdf"]);
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();
        reconciler.attach_file(TestFile::pdf("form_b.pdf")).unwrap();
        assert_eq!(reconciler.select_type(None), Ok(ReviewState::AwaitingType));
        assert_eq!(reconciler.begin_confirm().unwrap_err(), ValidationError::MissingType);
        assert!(reconciler.notice().is_some());
    }

    #[test]
    fn confirmed_correction_leaves_the_queue() {
        let service = service_with_pending(&["form_b.pdf", "other.png"]);
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();
        reconciler.attach_file(TestFile::pdf("form_b.pdf")).unwrap();
        reconciler.select_type(Some(DocumentType::ClaimForm)).unwrap();
        assert!(reconciler.can_confirm());

        let confirmed = block_on(reconciler.confirm(&service, &session())).unwrap();
        assert_eq!(confirmed.status, ProcessingStatus::Finalized);
        assert_eq!(confirmed.document_type, DocumentType::ClaimForm);
        assert_eq!(service.calls.borrow().iter().filter(|c| *c == "confirm:form_b.pdf:Claim Form").count(), 1);

        assert_eq!(reconciler.state(), ReviewState::Listed);
        let listed: Vec<_> = reconciler.entries().iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(listed, ["other.png"]);
        let next = block_on(service.list_queue(&session())).unwrap();
        assert!(next.iter().all(|e| e.filename != "form_b.pdf"));
    }

    #[test]
    fn success_marks_resolved_until_refreshed() {
        let service = service_with_pending(&["form_b.pdf"]);
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();
        reconciler.attach_file(TestFile::pdf("form_b.pdf")).unwrap();

        let request = reconciler.begin_confirm().unwrap();
        assert_eq!(request.target_filename, "form_b.pdf");
        assert_eq!(reconciler.state(), ReviewState::Confirming);

        let ok = result("form_b.pdf", DocumentType::Unknown, 1.0, ProcessingStatus::Finalized);
        reconciler.finish_confirm(Ok(ok)).unwrap();
        assert_eq!(reconciler.state(), ReviewState::Resolved);
        assert_eq!(reconciler.resolved_filename(), Some("form_b.pdf"));
        assert!(reconciler.entries().is_empty());

        reconciler.replace_queue(Vec::new());
        assert_eq!(reconciler.state(), ReviewState::Listed);
    }

    #[test]
    fn listing_requested_before_confirmation_is_discarded() {
        let service = service_with_pending(&["form_b.pdf"]);
        let mut reconciler = loaded(&service);
        let in_flight = reconciler.begin_listing();

        reconciler.open("form_b.pdf").unwrap();
        reconciler.attach_file(TestFile::pdf("form_b.pdf")).unwrap();
        reconciler.begin_confirm().unwrap();
        let ok = result("form_b.pdf", DocumentType::ClaimForm, 1.0, ProcessingStatus::Finalized);
        reconciler.finish_confirm(Ok(ok)).unwrap();

        let stale = vec![ReviewQueueEntry::new("form_b.pdf", DocumentType::Unknown, 0.41)];
        assert!(!reconciler.finish_listing(in_flight, stale));
        assert!(reconciler.entries().is_empty());
        assert_eq!(reconciler.state(), ReviewState::Resolved);

        let fresh = reconciler.begin_listing();
        assert!(reconciler.finish_listing(fresh, Vec::new()));
        assert_eq!(reconciler.state(), ReviewState::Listed);
    }

    #[test]
    fn confirmed_result_outlives_the_follow_up_refresh() {
        let service = service_with_pending(&["form_b.pdf", "form_c.pdf"]);
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();
        reconciler.attach_file(TestFile::pdf("form_b.pdf")).unwrap();
        reconciler.begin_confirm().unwrap();
        let ok = result("form_b.pdf", DocumentType::ClaimForm, 1.0, ProcessingStatus::Finalized);
        reconciler.finish_confirm(Ok(ok)).unwrap();

        let listing = reconciler.begin_listing();
        reconciler.finish_listing(listing, vec![ReviewQueueEntry::new("form_c.pdf", DocumentType::Unknown, 0.4)]);
        assert_eq!(reconciler.state(), ReviewState::Listed);
        let kept = reconciler.last_result().map(|r| r.filename.as_str());
        assert_eq!(kept, Some("form_b.pdf"));

        reconciler.open("form_c.pdf").unwrap();
        assert!(reconciler.last_result().is_none());
    }

    #[test]
    fn second_confirmation_is_rejected_while_in_flight() {
        let service = service_with_pending(&["form_b.pdf"]);
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();
        reconciler.attach_file(TestFile::pdf("form_b.pdf")).unwrap();
        reconciler.begin_confirm().unwrap();

        assert_eq!(reconciler.begin_confirm().unwrap_err(), ValidationError::ConfirmationInFlight);
        assert_eq!(
            reconciler.attach_file(TestFile::pdf("form_b.pdf")).unwrap_err(),
            ValidationError::ConfirmationInFlight
        );
        assert!(!reconciler.close());
        assert_eq!(reconciler.open("form_b.pdf").unwrap_err(), ValidationError::ConfirmationInFlight);
        assert_eq!(reconciler.state(), ReviewState::Confirming);
    }

    #[test]
    fn failure_returns_to_ready_and_keeps_the_selection() {
        let service = service_with_pending(&["form_b.pdf"]);
        service
            .confirm_failures
            .borrow_mut()
            .push_back(ClientError::from_response(500, r#"{"detail":"Engine timed out"}"#));
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();
        reconciler.attach_file(TestFile::pdf("form_b.pdf")).unwrap();
        reconciler.select_type(Some(DocumentType::Invoice)).unwrap();

        let err = block_on(reconciler.confirm(&service, &session())).unwrap_err();
        assert_eq!(err.to_string(), "Engine timed out");
        assert_eq!(reconciler.state(), ReviewState::ReadyToConfirm);
        assert_eq!(reconciler.notice().as_deref(), Some("Engine timed out"));
        assert_eq!(reconciler.selected_type(), Some(DocumentType::Invoice));
        assert_eq!(reconciler.attached_file().map(|f| f.name.as_str()), Some("form_b.pdf"));

        // Retry without re-attaching.
        block_on(reconciler.confirm(&service, &session())).unwrap();
        assert_eq!(service.calls_named("confirm"), 2);
        assert!(reconciler.entries().is_empty());
    }

    #[test]
    fn transport_failure_is_surfaced_on_confirm() {
        let service = service_with_pending(&["form_b.pdf"]);
        service
            .confirm_failures
            .borrow_mut()
            .push_back(ClientError::Transport("connection reset".into()));
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();
        reconciler.attach_file(TestFile::pdf("form_b.pdf")).unwrap();

        let err = block_on(reconciler.confirm(&service, &session())).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert!(reconciler.can_confirm());
    }

    #[test]
    fn repeated_listing_is_stable() {
        let service = service_with_pending(&["a.pdf", "b.png", "c.jpg"]);
        let mut reconciler = loaded(&service);
        let first = reconciler.entries().to_vec();
        block_on(reconciler.refresh(&service, &session())).unwrap();
        block_on(reconciler.refresh(&service, &session())).unwrap();
        assert_eq!(reconciler.entries(), first.as_slice());
    }

    #[test]
    fn duplicate_filenames_are_flagged() {
        let service = service_with_pending(&["dup.pdf", "dup.pdf", "solo.pdf"]);
        let mut reconciler = loaded(&service);
        assert!(reconciler.is_ambiguous("dup.pdf"));
        assert!(!reconciler.is_ambiguous("solo.pdf"));
        assert_eq!(reconciler.ambiguous_filenames().collect::<Vec<_>>(), ["dup.pdf"]);

        reconciler.open("dup.pdf").unwrap();
        assert!(reconciler.notice().unwrap().contains("more than once"));
    }

    #[test]
    fn open_entry_closes_when_it_vanishes_from_a_refresh() {
        let service = service_with_pending(&["form_b.pdf"]);
        let mut reconciler = loaded(&service);
        reconciler.open("form_b.pdf").unwrap();
        service.queue.borrow_mut().clear();
        block_on(reconciler.refresh(&service, &session())).unwrap();
        assert_eq!(reconciler.state(), ReviewState::Listed);
        assert!(reconciler.open_entry().is_none());
    }

    #[test]
    fn unsupported_type_with_matching_name_is_rejected() {
        let service = service_with_pending(&["notes.txt"]);
        let mut reconciler = loaded(&service);
        reconciler.open("notes.txt").unwrap();
        let file = TestFile { name: "notes.txt".into(), media_type: "text/plain".into() };
        assert!(matches!(
            reconciler.attach_file(file),
            Err(ValidationError::UnsupportedMediaType { .. })
        ));
        assert_eq!(reconciler.state(), ReviewState::AwaitingFile);
        assert!(reconciler.notice().is_some());
    }
}
