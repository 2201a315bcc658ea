use axum::{
    body::Bytes,
    extract::{multipart::Field, rejection::JsonRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use easel_canvas::{imaging, Error as CanvasError, ImageSource, NewElement, Shape, PDF_FILENAME};
use tracing::{debug, error, info};

use super::types::{
    capped_size, color, coordinate, parse_leading_int, AddCircleRequest, AddRectangleRequest,
    AddTextRequest, ApiError, ApiResult, CanvasResponse, InitRequest, IntField, DEFAULT_BOX,
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_RADIUS, DEFAULT_STROKE_WIDTH,
};
use super::CanvasState;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| ApiError(CanvasError::invalid_value("body", rejection.body_text())))
}

/// Replace the scene with an empty canvas of the requested size
pub async fn init_canvas(
    State(state): State<CanvasState>,
    payload: Result<Json<InitRequest>, JsonRejection>,
) -> ApiResult<Json<CanvasResponse>> {
    let request = body(payload)?;
    let width = dimension(&state, request.width.as_ref(), "width")?;
    let height = dimension(&state, request.height.as_ref(), "height")?;

    let scene = state.store.init(width, height).await?;
    info!(width, height, "Canvas initialized");
    Ok(CanvasResponse::scene(scene))
}

fn dimension(
    state: &CanvasState,
    value: Option<&IntField>,
    field: &str,
) -> Result<i64, CanvasError> {
    let parsed = value
        .map(|v| v.parse(field))
        .transpose()
        .map_err(|_| CanvasError::invalid_dimension(format!("{field} must be a number")))?
        .flatten()
        .ok_or_else(|| CanvasError::invalid_dimension(format!("{field} is required")))?;

    let limits = &state.limits;
    if parsed > 0
        && (parsed < i64::from(limits.min_dimension) || parsed > i64::from(limits.max_dimension))
    {
        return Err(CanvasError::invalid_dimension(format!(
            "{field} must be between {} and {}, got {parsed}",
            limits.min_dimension, limits.max_dimension
        )));
    }
    Ok(parsed)
}

/// Remove every element, keeping the canvas size
pub async fn clear_canvas(State(state): State<CanvasState>) -> Json<CanvasResponse> {
    let scene = state.store.clear().await;
    info!("Canvas cleared");
    CanvasResponse::scene(scene)
}

/// Current scene snapshot
pub async fn get_state(State(state): State<CanvasState>) -> Json<CanvasResponse> {
    CanvasResponse::scene(state.store.snapshot().await)
}

/// Append a rectangle
pub async fn add_rectangle(
    State(state): State<CanvasState>,
    payload: Result<Json<AddRectangleRequest>, JsonRejection>,
) -> ApiResult<Json<CanvasResponse>> {
    let r = body(payload)?;
    let max = state.limits.max_dimension;
    let draft = NewElement::new(
        coordinate(r.x.as_ref(), "x")?,
        coordinate(r.y.as_ref(), "y")?,
        Shape::Rectangle {
            width: capped_size(r.width.as_ref(), "width", DEFAULT_BOX, max)?,
            height: capped_size(r.height.as_ref(), "height", DEFAULT_BOX, max)?,
            fill_color: color(r.fill_color.as_deref(), "fillColor")?,
            stroke_color: color(r.stroke_color.as_deref(), "strokeColor")?,
            stroke_width: capped_size(
                r.stroke_width.as_ref(),
                "strokeWidth",
                DEFAULT_STROKE_WIDTH,
                max,
            )?,
        },
    );
    append(&state, draft).await
}

/// Append a circle
pub async fn add_circle(
    State(state): State<CanvasState>,
    payload: Result<Json<AddCircleRequest>, JsonRejection>,
) -> ApiResult<Json<CanvasResponse>> {
    let c = body(payload)?;
    let max = state.limits.max_dimension;
    let draft = NewElement::new(
        coordinate(c.x.as_ref(), "x")?,
        coordinate(c.y.as_ref(), "y")?,
        Shape::Circle {
            radius: capped_size(c.radius.as_ref(), "radius", DEFAULT_RADIUS, max)?,
            fill_color: color(c.fill_color.as_deref(), "fillColor")?,
            stroke_color: color(c.stroke_color.as_deref(), "strokeColor")?,
            stroke_width: capped_size(
                c.stroke_width.as_ref(),
                "strokeWidth",
                DEFAULT_STROKE_WIDTH,
                max,
            )?,
        },
    );
    append(&state, draft).await
}

/// Append a text run
pub async fn add_text(
    State(state): State<CanvasState>,
    payload: Result<Json<AddTextRequest>, JsonRejection>,
) -> ApiResult<Json<CanvasResponse>> {
    let t = body(payload)?;
    let font_family = match t.font_family.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_FONT_FAMILY.to_string(),
        Some(family) => family.to_string(),
    };
    let draft = NewElement::new(
        coordinate(t.x.as_ref(), "x")?,
        coordinate(t.y.as_ref(), "y")?,
        Shape::Text {
            text: t.text.unwrap_or_default(),
            font_size: capped_size(
                t.font_size.as_ref(),
                "fontSize",
                DEFAULT_FONT_SIZE,
                state.limits.max_dimension,
            )?,
            font_family,
            color: color(t.color.as_deref(), "color")?,
        },
    );
    append(&state, draft).await
}

/// Multipart fields of an add-image request
#[derive(Debug, Default)]
struct ImageForm {
    x: Option<String>,
    y: Option<String>,
    width: Option<String>,
    height: Option<String>,
    image: Option<Bytes>,
    image_url: Option<String>,
}

async fn read_text(field: Field<'_>) -> Result<String, CanvasError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| CanvasError::invalid_value(name, e.body_text()))
}

impl ImageForm {
    async fn read(mut multipart: Multipart, max_upload_bytes: usize) -> Result<Self, CanvasError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| CanvasError::invalid_value("body", e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| CanvasError::invalid_value("image", e.body_text()))?;
                    if bytes.len() > max_upload_bytes {
                        return Err(CanvasError::invalid_value(
                            "image",
                            format!("upload exceeds {max_upload_bytes} bytes"),
                        ));
                    }
                    if !bytes.is_empty() {
                        form.image = Some(bytes);
                    }
                }
                "imageUrl" => form.image_url = Some(read_text(field).await?),
                "x" => form.x = Some(read_text(field).await?),
                "y" => form.y = Some(read_text(field).await?),
                "width" => form.width = Some(read_text(field).await?),
                "height" => form.height = Some(read_text(field).await?),
                other => debug!(field = other, "Ignoring unknown multipart field"),
            }
        }
        Ok(form)
    }
}

fn form_int(raw: Option<&str>, field: &str, default: i64) -> Result<i64, CanvasError> {
    Ok(raw
        .map(|s| parse_leading_int(s, field))
        .transpose()?
        .flatten()
        .unwrap_or(default))
}

fn form_size(state: &CanvasState, raw: Option<&str>, field: &str) -> Result<u32, CanvasError> {
    let value = form_int(raw, field, DEFAULT_BOX)?;
    if value <= 0 {
        return Err(CanvasError::invalid_value(field, "must be greater than zero"));
    }
    if value > i64::from(state.limits.max_dimension) {
        return Err(CanvasError::invalid_value(
            field,
            format!("must not exceed {}", state.limits.max_dimension),
        ));
    }
    Ok(value as u32)
}

/// Append an image from an uploaded file or a URL
///
/// Uploads are decoded and resized to the target box here; URLs are stored
/// as given and fetched whenever the scene is rendered.
pub async fn add_image(
    State(state): State<CanvasState>,
    multipart: Multipart,
) -> ApiResult<Json<CanvasResponse>> {
    let form = ImageForm::read(multipart, state.limits.max_upload_bytes).await?;

    let x = form_int(form.x.as_deref(), "x", 0)?;
    let y = form_int(form.y.as_deref(), "y", 0)?;
    let x = i32::try_from(x).map_err(|_| CanvasError::invalid_value("x", "coordinate out of range"))?;
    let y = i32::try_from(y).map_err(|_| CanvasError::invalid_value("y", "coordinate out of range"))?;
    let width = form_size(&state, form.width.as_deref(), "width")?;
    let height = form_size(&state, form.height.as_deref(), "height")?;

    let source = match (form.image, form.image_url) {
        (Some(bytes), _) => {
            let png = tokio::task::spawn_blocking(move || {
                imaging::normalize_upload(&bytes, width, height)
            })
            .await
            .map_err(CanvasError::from)??;
            ImageSource::embedded(png)
        }
        (None, Some(url)) if !url.trim().is_empty() => ImageSource::remote(url.trim()),
        _ => return Err(CanvasError::missing_field("image").into()),
    };

    append(&state, NewElement::image(x, y, width, height, source)).await
}

async fn append(state: &CanvasState, draft: NewElement) -> ApiResult<Json<CanvasResponse>> {
    let (element, scene) = state.store.append(draft).await?;
    debug!(id = %element.id, kind = element.element_type(), "Element added");
    Ok(CanvasResponse::added(element, scene))
}

/// Server-side raster preview of the current scene
pub async fn preview_png(State(state): State<CanvasState>) -> ApiResult<Response> {
    let scene = state.store.snapshot().await;
    let png = state.pipeline.render_png(&scene).await.map_err(|e| {
        error!(error = %e, "Preview rendering failed");
        ApiError(e)
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        png,
    )
        .into_response())
}

/// Render the current scene into a downloadable single-page PDF
pub async fn export_pdf(State(state): State<CanvasState>) -> ApiResult<Response> {
    let scene = state.store.snapshot().await;
    info!(
        width = scene.width,
        height = scene.height,
        elements = scene.element_count(),
        "Exporting canvas"
    );

    let pdf = state.pipeline.export_pdf(&scene).await.map_err(|e| {
        error!(error = %e, "PDF export failed");
        ApiError(e)
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
