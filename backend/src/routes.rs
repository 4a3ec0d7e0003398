use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures::TryStreamExt;
use shared::transport::{endpoints, form_fields};
use shared::DocumentType;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::middleware::AuthMiddleware;
use crate::pipeline::{DocumentPipeline, PipelineError, Upload};

/// Largest accepted multipart file, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: Option<PathBuf>, auth: AuthMiddleware) {
    cfg.service(
        web::resource(endpoints::PROCESS_DOCUMENT)
            .wrap(auth.clone())
            .route(web::post().to(process_document)),
    )
    .service(
        web::resource(endpoints::REVIEW_QUEUE)
            .wrap(auth.clone())
            .route(web::get().to(review_queue)),
    )
    .service(
        web::resource(endpoints::REVIEW_DOCUMENT)
            .wrap(auth.clone())
            .route(web::post().to(review_document)),
    )
    .service(
        web::resource(endpoints::DASHBOARD_DATA)
            .wrap(auth.clone())
            .route(web::get().to(dashboard_data)),
    )
    .service(
        web::resource(endpoints::AUTH_ME)
            .wrap(auth)
            .route(web::get().to(crate::auth::routes::me)),
    );

    if let Some(dir) = frontend_dir {
        log::info!("Serving frontend from {}", dir.display());
        cfg.service(Files::new("/", dir).index_file("index.html"));
    }
}

#[derive(Default)]
struct ParsedForm {
    file: Option<Upload>,
    fields: HashMap<String, String>,
}

impl ParsedForm {
    fn take_file(&mut self) -> Result<Upload, PipelineError> {
        self.file.take().ok_or(PipelineError::MissingField(form_fields::FILE))
    }

    fn text(&self, name: &'static str) -> Result<&str, PipelineError> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or(PipelineError::MissingField(name))
    }
}

fn multipart_error(e: actix_multipart::MultipartError) -> PipelineError {
    PipelineError::Multipart(e.to_string())
}

async fn read_form(mut payload: Multipart, max_bytes: usize) -> Result<ParsedForm, PipelineError> {
    let mut form = ParsedForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.to_string()).unwrap_or_default();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(PipelineError::UploadTooLarge(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        if name == form_fields::FILE {
            if form.file.is_some() {
                return Err(PipelineError::Multipart("exactly one file per request".to_string()));
            }
            form.file = Some(Upload {
                filename: filename.unwrap_or_default(),
                content_type,
                bytes,
            });
        } else {
            let text = String::from_utf8(bytes)
                .map_err(|_| PipelineError::Multipart(format!("field {} is not valid UTF-8", name)))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

async fn process_document(
    pipeline: web::Data<DocumentPipeline>,
    limit: web::Data<UploadLimit>,
    payload: Multipart,
) -> Result<HttpResponse, PipelineError> {
    let mut form = read_form(payload, limit.0).await?;
    let upload = form.take_file()?;
    log::info!("Received {} ({} bytes)", upload.filename, upload.bytes.len());

    let result = pipeline.process(upload).await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn review_queue(pipeline: web::Data<DocumentPipeline>) -> HttpResponse {
    HttpResponse::Ok().json(pipeline.queue().await)
}

async fn review_document(
    pipeline: web::Data<DocumentPipeline>,
    limit: web::Data<UploadLimit>,
    payload: Multipart,
) -> Result<HttpResponse, PipelineError> {
    let mut form = read_form(payload, limit.0).await?;
    let upload = form.take_file()?;
    let raw_type = form.text(form_fields::CORRECT_DOC_TYPE)?;
    let corrected_type = DocumentType::from_str(raw_type).map_err(|_| PipelineError::InvalidField {
        name: form_fields::CORRECT_DOC_TYPE,
        value: raw_type.to_string(),
    })?;
    let target = form.text(form_fields::FILENAME_TO_REMOVE)?.to_string();
    log::info!("Review correction for {} as {}", target, corrected_type);

    let result = pipeline.review(upload, corrected_type, &target).await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn dashboard_data(pipeline: web::Data<DocumentPipeline>) -> HttpResponse {
    HttpResponse::Ok().json(pipeline.dashboard().await)
}
