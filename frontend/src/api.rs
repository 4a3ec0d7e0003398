use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use serde::Deserialize;
use shared::transport::{
    decode_dashboard, decode_queue, decode_response, endpoints, form_fields,
};
use shared::{
    AttachedFile, ClientError, CorrectionRequest, DashboardSnapshot, DocumentService,
    ProcessingResult, ReviewQueueEntry, Session,
};
use web_sys::FormData;

const API_BASE_URL: Option<&str> = option_env!("API_BASE_URL");
pub const LOGIN_URL: &str = match option_env!("LOGIN_URL") {
    Some(url) => url,
    None => "/auth/login",
};

/// A file picked in the browser. The bytes stay in the browser until the
/// form is sent.
#[derive(Debug, Clone)]
pub struct BrowserFile(pub GlooFile);

impl From<web_sys::File> for BrowserFile {
    fn from(file: web_sys::File) -> Self {
        BrowserFile(GlooFile::from(file))
    }
}

impl AttachedFile for BrowserFile {
    fn name(&self) -> String {
        self.0.name()
    }

    fn media_type(&self) -> String {
        self.0.raw_mime_type()
    }
}

/// Identity the backend verified from the bearer token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identity {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl Identity {
    pub fn display_name(&self) -> &str {
        [&self.name, &self.email]
            .into_iter()
            .find(|candidate| !candidate.trim().is_empty())
            .unwrap_or(&self.sub)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlooDocumentService {
    base_url: String,
}

impl Default for GlooDocumentService {
    fn default() -> Self {
        Self::with_base_url(API_BASE_URL.unwrap_or_default())
    }
}

impl GlooDocumentService {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn fetch_identity(&self, session: &Session) -> Result<Identity, ClientError> {
        let response = Request::get(&self.url(endpoints::AUTH_ME))
            .header("Authorization", &session.authorization_header())
            .send()
            .await;
        let (status, body) = read_body(response).await?;
        decode_response(status, &body)
    }

    async fn post_form(
        &self,
        session: &Session,
        path: &str,
        form: FormData,
    ) -> Result<(u16, String), ClientError> {
        let request = Request::post(&self.url(path))
            .header("Authorization", &session.authorization_header())
            .body(form)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        read_body(request.send().await).await
    }
}

async fn read_body(response: Result<Response, gloo_net::Error>) -> Result<(u16, String), ClientError> {
    let response = response.map_err(|e| {
        log::error!("Request failed before a response arrived: {}", e);
        ClientError::Transport(e.to_string())
    })?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;
    if !response.ok() {
        log::warn!("{} answered {}: {}", response.url(), status, body);
    }
    Ok((status, body))
}

fn file_form(file: &BrowserFile) -> Result<FormData, ClientError> {
    let form = FormData::new().map_err(|e| ClientError::Transport(format!("{:?}", e)))?;
    form.append_with_blob_and_filename(form_fields::FILE, file.0.as_ref(), &file.name())
        .map_err(|e| ClientError::Transport(format!("{:?}", e)))?;
    Ok(form)
}

impl DocumentService for GlooDocumentService {
    type File = BrowserFile;

    async fn submit(
        &self,
        session: &Session,
        file: &BrowserFile,
    ) -> Result<ProcessingResult, ClientError> {
        let form = file_form(file)?;
        let (status, body) = self
            .post_form(session, endpoints::PROCESS_DOCUMENT, form)
            .await?;
        decode_response(status, &body)
    }

    async fn list_queue(&self, session: &Session) -> Result<Vec<ReviewQueueEntry>, ClientError> {
        let response = Request::get(&self.url(endpoints::REVIEW_QUEUE))
            .header("Authorization", &session.authorization_header())
            .send()
            .await;
        let (status, body) = read_body(response).await?;
        decode_queue(status, &body)
    }

    async fn confirm_correction(
        &self,
        session: &Session,
        request: &CorrectionRequest<BrowserFile>,
    ) -> Result<ProcessingResult, ClientError> {
        let form = file_form(&request.file)?;
        form.append_with_str(form_fields::CORRECT_DOC_TYPE, request.corrected_type.label())
            .and_then(|_| form.append_with_str(form_fields::FILENAME_TO_REMOVE, &request.target_filename))
            .map_err(|e| ClientError::Transport(format!("{:?}", e)))?;
        let (status, body) = self
            .post_form(session, endpoints::REVIEW_DOCUMENT, form)
            .await?;
        decode_response(status, &body)
    }

    async fn fetch_dashboard(&self, session: &Session) -> Result<DashboardSnapshot, ClientError> {
        let response = Request::get(&self.url(endpoints::DASHBOARD_DATA))
            .header("Authorization", &session.authorization_header())
            .send()
            .await;
        let (status, body) = read_body(response).await?;
        decode_dashboard(status, &body)
    }
}
