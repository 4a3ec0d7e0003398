use crate::error::ValidationError;

/// Media types the extraction service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Pdf,
}

impl MediaType {
    pub const ACCEPT_ATTRIBUTE: &'static str = "image/jpeg,image/png,application/pdf,.jpg,.jpeg,.png,.pdf";

    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(MediaType::Jpeg),
            "image/png" => Some(MediaType::Png),
            "application/pdf" => Some(MediaType::Pdf),
            _ => None,
        }
    }

    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "png" => Some(MediaType::Png),
            "pdf" => Some(MediaType::Pdf),
            _ => None,
        }
    }

    /// The declared type wins; the extension only decides when the sender
    /// declared nothing or a generic octet stream.
    pub fn detect(name: &str, mime: &str) -> Option<Self> {
        let declared = mime.trim();
        if declared.is_empty() || declared.eq_ignore_ascii_case("application/octet-stream") {
            Self::from_filename(name)
        } else {
            Self::from_mime(declared)
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Pdf => "application/pdf",
        }
    }
}

/// A user-chosen file as the core sees it: a declared name and media type.
/// The bytes stay with the platform handle.
pub trait AttachedFile: Clone {
    fn name(&self) -> String;
    fn media_type(&self) -> String;
}

pub fn check_upload<F: AttachedFile>(file: &F) -> Result<MediaType, ValidationError> {
    let name = file.name();
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyFileName);
    }
    let media_type = file.media_type();
    MediaType::detect(&name, &media_type)
        .ok_or(ValidationError::UnsupportedMediaType { name, media_type })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::AttachedFile;

    #[derive(Debug, Clone, PartialEq)]
    pub struct TestFile {
        pub name: String,
        pub media_type: String,
    }

    impl TestFile {
        pub fn pdf(name: &str) -> Self {
            Self { name: name.to_string(), media_type: "application/pdf".to_string() }
        }
    }

    impl AttachedFile for TestFile {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn media_type(&self) -> String {
            self.media_type.clone()
        }
    }
}
