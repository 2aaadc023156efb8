use axum::{
    Form, Json,
    body::Bytes,
    extract::{
        FromRequest, Multipart, Request, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::header::CONTENT_TYPE,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::orchestrator::GenerationRequest;
use crate::storage::{ImageEntry, extension_for_upload};
use crate::web::AppState;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

const IMAGE_FIELD: &str = "image";
const UPLOAD_PREFIX: &str = "upload";
const REFERENCE_PREFIX: &str = "ref";

#[derive(Serialize)]
pub struct ImagesResponse {
    images: Vec<ImageEntry>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    ok: bool,
    filename: String,
    url: String,
}

#[derive(Serialize)]
struct GenerateResponse {
    ok: bool,
    image_url: String,
    prompt_used: String,
    ref_image_url: Option<String>,
}

#[derive(Serialize)]
struct GenerateFailure {
    ok: bool,
    error: String,
}

struct FilePart {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

#[derive(Default)]
struct FormInput {
    fields: GenerationRequest,
    image: Option<FilePart>,
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::Validation(format!("Failed to read form: {}", err.body_text()))
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormInput> {
    let mut input = FormInput::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            IMAGE_FIELD => {
                // A part without a filename attribute is a plain form value, not a file.
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                input.image = Some(FilePart {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            "style" => input.fields.style = Some(field.text().await.map_err(multipart_error)?),
            "composition" => {
                input.fields.composition = Some(field.text().await.map_err(multipart_error)?)
            }
            "prompt" => input.fields.prompt = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }
    Ok(input)
}

/// Accepts multipart, url-encoded or JSON bodies. Anything else is treated
/// as an empty request so the preset defaults apply.
async fn read_generate_input(request: Request) -> Result<FormInput> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|err| AppError::Validation(err.body_text()))?;
        read_multipart(multipart).await
    } else if content_type.starts_with("application/json") {
        let Json(fields) = Json::<GenerationRequest>::from_request(request, &())
            .await
            .map_err(|err| AppError::Validation(err.body_text()))?;
        Ok(FormInput {
            fields,
            image: None,
        })
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields) = Form::<GenerationRequest>::from_request(request, &())
            .await
            .map_err(|err| AppError::Validation(err.body_text()))?;
        Ok(FormInput {
            fields,
            image: None,
        })
    } else {
        Ok(FormInput::default())
    }
}

fn generate_failure(err: AppError) -> Response {
    err.log();
    (
        err.status_code(),
        Json(GenerateFailure {
            ok: false,
            error: err.to_string(),
        }),
    )
        .into_response()
}

pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn list_images(State(state): State<AppState>) -> Result<Json<ImagesResponse>> {
    let images = state.generated.list("png").await?;
    Ok(Json(ImagesResponse { images }))
}

pub async fn upload_image(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let multipart = multipart.map_err(|err| AppError::Validation(err.body_text()))?;
    let input = read_multipart(multipart).await?;
    let image = input
        .image
        .ok_or_else(|| AppError::Validation("No file part named 'image'".to_string()))?;
    if image.file_name.is_empty() {
        return Err(AppError::Validation("Empty filename".to_string()));
    }

    let ext = extension_for_upload(&image.file_name, image.content_type.as_deref());
    let stored = state.uploads.save(UPLOAD_PREFIX, &ext, &image.bytes).await?;
    tracing::info!(filename = %stored.filename, size = image.bytes.len(), "Stored upload");

    Ok(Json(UploadResponse {
        ok: true,
        filename: stored.filename,
        url: stored.url,
    }))
}

/// The reference image is kept for the client's preview only; it does not
/// feed into generation.
pub async fn generate(State(state): State<AppState>, request: Request) -> Response {
    let input = match read_generate_input(request).await {
        Ok(input) => input,
        Err(err) => return generate_failure(err),
    };

    let mut ref_image_url = None;
    if let Some(image) = input.image.filter(|image| !image.file_name.is_empty()) {
        let ext = extension_for_upload(&image.file_name, image.content_type.as_deref());
        match state.uploads.save(REFERENCE_PREFIX, &ext, &image.bytes).await {
            Ok(stored) => ref_image_url = Some(stored.url),
            Err(err) => return generate_failure(err),
        }
    }

    match state.orchestrator.generate(&input.fields).await {
        Ok(outcome) => Json(GenerateResponse {
            ok: true,
            image_url: outcome.image_url,
            prompt_used: outcome.prompt_used,
            ref_image_url,
        })
        .into_response(),
        Err(err) => generate_failure(err),
    }
}
