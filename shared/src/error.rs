use serde::Deserialize;

/// Shown when the service rejects a request without saying why.
pub const GENERIC_SERVICE_MESSAGE: &str = "An API error occurred.";

/// Locally detected precondition failures. Always shown inline; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "Warning: The file you uploaded ({attached}) does not match the selected row ({expected})."
    )]
    FileMismatch { expected: String, attached: String },
    #[error("Please select the correct file and document type.")]
    MissingFile,
    #[error("Please select the correct document type.")]
    MissingType,
    #[error("No review entry is open.")]
    NoEntryOpen,
    #[error("\"{0}\" is no longer in the review queue.")]
    UnknownEntry(String),
    #[error("A correction is already being processed.")]
    ConfirmationInFlight,
    #[error("Unsupported file type for {name}. Please upload a PDF, PNG or JPG.")]
    UnsupportedMediaType { name: String, media_type: String },
    #[error("The selected file has no name.")]
    EmptyFileName,
    #[error("Please select a file first.")]
    NoFileSelected,
}

/// Failure of a core operation, normalized across transports.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// No response arrived (connectivity, timeout, aborted request).
    #[error("Network error: {0}")]
    Transport(String),
    /// The service answered with a rejection; `detail` is shown verbatim.
    #[error("{detail}")]
    Service { status: Option<u16>, detail: String },
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

#[derive(Deserialize)]
struct DetailBody {
    detail: Option<serde_json::Value>,
}

impl ClientError {
    pub fn service(status: Option<u16>, detail: Option<String>) -> Self {
        let detail = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| GENERIC_SERVICE_MESSAGE.to_string());
        ClientError::Service { status, detail }
    }

    /// Builds a `Service` error from a non-success response body.
    ///
    /// Only the `detail` member of a JSON body is trusted as a message;
    /// anything else falls back to the generic text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<DetailBody>(body)
            .ok()
            .and_then(|parsed| parsed.detail)
            .and_then(|detail| match detail {
                serde_json::Value::String(text) => Some(text),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            });
        ClientError::service(Some(status), detail)
    }

    pub fn malformed(reason: impl std::fmt::Display) -> Self {
        ClientError::service(None, Some(format!("Failed to parse response: {}", reason)))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_surfaced_verbatim() {
        let err = ClientError::from_response(400, r#"{"detail":"OCR failed."}"#);
        assert_eq!(
            err,
            ClientError::Service { status: Some(400), detail: "OCR failed.".into() }
        );
        assert_eq!(err.to_string(), "OCR failed.");
    }

    #[test]
    fn detail_whitespace_is_not_rewritten() {
        let err = ClientError::from_response(400, r#"{"detail":"  Line one.\n  Line two.  "}"#);
        assert_eq!(err.to_string(), "  Line one.\n  Line two.  ");

        let blank = ClientError::from_response(400, r#"{"detail":"   "}"#);
        assert_eq!(blank.to_string(), GENERIC_SERVICE_MESSAGE);
    }

    #[test]
    fn missing_detail_falls_back() {
        for body in ["", "<html>bad gateway</html>", r#"{"error":"x"}"#, r#"{"detail":null}"#] {
            let err = ClientError::from_response(502, body);
            assert_eq!(err.to_string(), GENERIC_SERVICE_MESSAGE, "body: {body}");
        }
    }

    #[test]
    fn structured_detail_is_kept() {
        let err = ClientError::from_response(422, r#"{"detail":[{"msg":"field required"}]}"#);
        assert!(err.to_string().contains("field required"));
    }

    #[test]
    fn mismatch_warning_names_both_files() {
        let err = ValidationError::FileMismatch {
            expected: "form_b.pdf".into(),
            attached: "form_c.pdf".into(),
        };
        let text = err.to_string();
        assert!(text.contains("form_b.pdf"));
        assert!(text.contains("form_c.pdf"));
    }
}
