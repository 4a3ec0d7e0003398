pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod model;
pub mod reconciler;
pub mod renderer;
pub mod session;
pub mod transport;
pub mod upload;

pub use aggregator::{DashboardAggregator, REFRESH_INTERVAL, Tick};
pub use classifier::{Triage, classify, process_document};
pub use error::{ClientError, ValidationError};
pub use model::{
    DashboardPayload, DashboardSnapshot, DocumentType, FieldValue, Percent, ProcessingResult,
    ProcessingStatus, ReviewQueueEntry,
};
pub use reconciler::{Listing, ReviewReconciler, ReviewState};
pub use renderer::{ResultView, render};
pub use session::Session;
pub use transport::{CorrectionRequest, DocumentService};
pub use upload::{AttachedFile, MediaType};
