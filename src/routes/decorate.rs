//! Decoration endpoints under `/api/room-decorator`.
//!
//! Every failure is answered with a [`DecorationResponse`] body so clients
//! can always read `success` and `message`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{error, info, warn};
use validator::Validate;

use crate::middleware::rate_limiter_middleware;
use crate::models::{
    AppState, DecoratedRoomOption, DecorationRequest, DecorationRequestWithImage, DecorationResponse,
    RoomAnalysisResponse,
};
use crate::types::{AppError, AppResult};

pub const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/room-decorator/decorate", post(decorate_room))
        .route("/api/room-decorator/decorate-json", post(decorate_room_json))
        .route("/api/room-decorator/analyze", post(analyze_room))
        .route("/api/room-decorator/options/{id}/regenerate", post(regenerate_option))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limiter_middleware))
        .with_state(state)
}

pub fn is_valid_image_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ACCEPTED_IMAGE_TYPES.contains(&ct.trim().to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Upload(e) => {
                let status = e.status();
                error!(error = %e, %status, "Failed to read multipart upload");
                if status.is_server_error() {
                    (status, format!("Internal server error: {}", e.body_text()))
                } else {
                    (status, e.body_text())
                }
            }
            other => {
                error!(error = %other, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal server error: {}", other))
            }
        };
        (status, Json(DecorationResponse::error(message))).into_response()
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::InvalidRequest(message.into())
}

/// Boolean form values as browsers and form libraries send them
fn parse_form_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Uploaded photo plus whatever text fields accompanied it
#[derive(Debug, Default)]
struct DecorateForm {
    image: Option<bytes::Bytes>,
    image_content_type: Option<String>,
    design_style: Option<String>,
    room_type: Option<String>,
    color_preference: Option<String>,
    budget_range: Option<String>,
    preserve_existing_furniture: Option<String>,
}

impl DecorateForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = DecorateForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    form.image_content_type = field.content_type().map(str::to_string);
                    form.image = Some(field.bytes().await?);
                }
                "designStyle" => form.design_style = Some(field.text().await?),
                "roomType" => form.room_type = Some(field.text().await?),
                "colorPreference" => form.color_preference = Some(field.text().await?),
                "budgetRange" => form.budget_range = Some(field.text().await?),
                "preserveExistingFurniture" => form.preserve_existing_furniture = Some(field.text().await?),
                other => warn!(field = %other, "Ignoring unknown multipart field"),
            }
        }

        Ok(form)
    }

    /// Validated image bytes
    fn take_image(&mut self) -> AppResult<Arc<[u8]>> {
        let image = match self.image.take() {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Err(invalid("No image provided")),
        };
        if !is_valid_image_type(self.image_content_type.as_deref()) {
            return Err(invalid("Invalid image format. Please use JPG, PNG, or WEBP"));
        }
        Ok(Arc::from(image.as_ref()))
    }

    fn preferences(self) -> AppResult<DecorationRequest> {
        let preserve_existing_furniture = match self.preserve_existing_furniture.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(value) => parse_form_flag(value)
                .ok_or_else(|| invalid(format!("Invalid preserveExistingFurniture value: {}", value)))?,
        };

        let request = DecorationRequest {
            design_style: self.design_style.unwrap_or_default().trim().to_string(),
            room_type: self.room_type.filter(|s| !s.is_empty()),
            color_preference: self.color_preference.filter(|s| !s.is_empty()),
            budget_range: self.budget_range.filter(|s| !s.is_empty()),
            preserve_existing_furniture,
        };
        request.validate().map_err(|e| invalid(validation_message(&e)))?;
        Ok(request)
    }
}

fn validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| errors.to_string())
}

fn processing_error(message: impl std::fmt::Display) -> AppError {
    invalid(format!("Error processing request: {}", message))
}

async fn run_pipeline(state: &AppState, image: Arc<[u8]>, request: DecorationRequest) -> DecorationResponse {
    info!(style = %request.design_style, bytes = image.len(), "Analyzing room image");
    let analysis = state.analyzer.analyze_room(Arc::clone(&image)).await;

    info!("Generating decoration options");
    let options = state
        .decorator
        .generate_decoration_options(image, &request, &analysis)
        .await;

    info!(count = options.len(), "Successfully generated decoration options");
    DecorationResponse::success(options, &analysis)
}

/// POST /api/room-decorator/decorate (multipart/form-data)
async fn decorate_room(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DecorationResponse>> {
    let mut form = DecorateForm::read(multipart).await?;
    let image = form.take_image()?;
    let request = form.preferences()?;

    Ok(Json(run_pipeline(&state, image, request).await))
}

/// Strip an optional `data:<mime>;base64,` prefix before decoding
fn decode_image_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };
    STANDARD.decode(payload.trim())
}

/// POST /api/room-decorator/decorate-json
///
/// Any malformed body, including a missing content type, is a 400.
async fn decorate_room_json(
    State(state): State<AppState>,
    payload: Result<Json<DecorationRequestWithImage>, JsonRejection>,
) -> AppResult<Json<DecorationResponse>> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected JSON decoration request");
        processing_error(rejection.body_text())
    })?;

    payload
        .validate()
        .map_err(|e| processing_error(validation_message(&e)))?;

    let (encoded, mut request) = payload.into_parts();
    request.design_style = request.design_style.trim().to_string();

    let image = match decode_image_base64(&encoded) {
        Ok(bytes) if !bytes.is_empty() => Arc::<[u8]>::from(bytes),
        Ok(_) => return Err(processing_error("No image provided")),
        Err(e) => {
            error!(error = %e, "Error processing JSON decoration request");
            return Err(processing_error(format!("Invalid base64 image data ({})", e)));
        }
    };

    Ok(Json(run_pipeline(&state, image, request).await))
}

/// POST /api/room-decorator/analyze (multipart/form-data, `image` field only)
async fn analyze_room(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<RoomAnalysisResponse>> {
    let mut form = DecorateForm::read(multipart).await?;
    let image = form.take_image()?;

    let analysis = state.analyzer.analyze_room(image).await;
    Ok(Json(RoomAnalysisResponse {
        analysis: Some(analysis),
        success: true,
        message: "Room analysis complete".to_string(),
    }))
}

/// POST /api/room-decorator/options/{id}/regenerate
async fn regenerate_option(
    State(state): State<AppState>,
    Path(option_id): Path<String>,
    payload: Result<Json<DecorationRequest>, JsonRejection>,
) -> AppResult<Json<DecoratedRoomOption>> {
    let Json(request) = payload.map_err(|rejection| invalid(rejection.body_text()))?;
    request.validate().map_err(|e| invalid(validation_message(&e)))?;

    Ok(Json(state.decorator.regenerate_option(&option_id, &request)))
}
