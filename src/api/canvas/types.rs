use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use easel_canvas::{Color, Element, Error as CanvasError, Scene};
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_BOX: i64 = 100;
pub(crate) const DEFAULT_RADIUS: i64 = 50;
pub(crate) const DEFAULT_STROKE_WIDTH: i64 = 1;
pub(crate) const DEFAULT_FONT_SIZE: i64 = 16;
pub(crate) const DEFAULT_FONT_FAMILY: &str = "Arial";
pub(crate) const DEFAULT_COLOR: Color = Color::BLACK;

/// Request-time limits applied on top of the store's own validation
#[derive(Debug, Clone, Copy)]
pub struct CanvasLimits {
    pub min_dimension: u32,
    pub max_dimension: u32,
    pub max_upload_bytes: usize,
}

impl Default for CanvasLimits {
    fn default() -> Self {
        Self {
            min_dimension: 1,
            max_dimension: 10_000,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Integer field that also accepts numeric strings (`"12"`, `"12.5"`, `"12px"`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IntField {
    Number(f64),
    Text(String),
}

impl IntField {
    /// Leading integer of the value; `None` when the field is effectively blank
    pub fn parse(&self, field: &str) -> Result<Option<i64>, CanvasError> {
        match self {
            Self::Number(n) => Ok(Some(n.trunc() as i64)),
            Self::Text(s) => parse_leading_int(s, field),
        }
    }
}

/// Parse the integer prefix of a form or JSON string value
pub(crate) fn parse_leading_int(raw: &str, field: &str) -> Result<Option<i64>, CanvasError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }

    let (negative, digits) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Err(CanvasError::invalid_value(
            field,
            format!("'{raw}' is not a number"),
        ));
    }

    let magnitude: i64 = digits[..end]
        .parse()
        .map_err(|_| CanvasError::invalid_value(field, format!("'{raw}' is out of range")))?;
    Ok(Some(if negative { -magnitude } else { magnitude }))
}

/// Resolve an optional integer field against its default
pub(crate) fn int_or(
    value: Option<&IntField>,
    field: &str,
    default: i64,
) -> Result<i64, CanvasError> {
    match value {
        Some(v) => Ok(v.parse(field)?.unwrap_or(default)),
        None => Ok(default),
    }
}

/// Coordinate field (may be negative)
pub(crate) fn coordinate(value: Option<&IntField>, field: &str) -> Result<i32, CanvasError> {
    let v = int_or(value, field, 0)?;
    i32::try_from(v).map_err(|_| CanvasError::invalid_value(field, "coordinate out of range"))
}

/// Size field; zero passes through so the store reports it
pub(crate) fn size(value: Option<&IntField>, field: &str, default: i64) -> Result<u32, CanvasError> {
    let v = int_or(value, field, default)?;
    if v < 0 {
        return Err(CanvasError::invalid_value(field, "must not be negative"));
    }
    u32::try_from(v).map_err(|_| CanvasError::invalid_value(field, "value too large"))
}

/// Size field bounded by the canvas dimension limit
pub(crate) fn capped_size(
    value: Option<&IntField>,
    field: &str,
    default: i64,
    max: u32,
) -> Result<u32, CanvasError> {
    let v = size(value, field, default)?;
    if v > max {
        return Err(CanvasError::invalid_value(field, format!("must not exceed {max}")));
    }
    Ok(v)
}

/// Colour field, blank means the default
pub(crate) fn color(value: Option<&str>, field: &str) -> Result<Color, CanvasError> {
    match value.map(str::trim) {
        None | Some("") => Ok(DEFAULT_COLOR),
        Some(s) => Color::parse(s)
            .ok_or_else(|| CanvasError::invalid_value(field, format!("unrecognised colour '{s}'"))),
    }
}

/// Request to (re)initialize the canvas
#[derive(Debug, Default, Deserialize)]
pub struct InitRequest {
    pub width: Option<IntField>,
    pub height: Option<IntField>,
}

/// Request to add a rectangle
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRectangleRequest {
    pub x: Option<IntField>,
    pub y: Option<IntField>,
    pub width: Option<IntField>,
    pub height: Option<IntField>,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<IntField>,
}

/// Request to add a circle
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCircleRequest {
    pub x: Option<IntField>,
    pub y: Option<IntField>,
    pub radius: Option<IntField>,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<IntField>,
}

/// Request to add a text run
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTextRequest {
    pub x: Option<IntField>,
    pub y: Option<IntField>,
    pub text: Option<String>,
    pub font_size: Option<IntField>,
    pub font_family: Option<String>,
    pub color: Option<String>,
}

/// Response carrying the canvas snapshot
#[derive(Debug, Serialize, Deserialize)]
pub struct CanvasResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    pub canvas: Scene,
}

impl CanvasResponse {
    pub fn scene(canvas: Scene) -> Json<Self> {
        Json(Self {
            success: true,
            element: None,
            canvas,
        })
    }

    pub fn added(element: Element, canvas: Scene) -> Json<Self> {
        Json(Self {
            success: true,
            element: Some(element),
            canvas,
        })
    }
}

/// Error body: `{"success": false, "error": "...", "code": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: String,
}

/// Handler error mapped onto the HTTP status taxonomy
#[derive(Debug)]
pub struct ApiError(pub CanvasError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<CanvasError> for ApiError {
    fn from(err: CanvasError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            error: self.0.to_string(),
            code: self.0.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
