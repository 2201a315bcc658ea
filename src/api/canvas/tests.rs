use super::types::{ErrorBody, IntField};
use super::*;
use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::Json;
use easel_canvas::{Color, HttpImageLoader, ImageSource, Shape, TextRasterizer};
use std::time::Duration;
use tower::ServiceExt;

fn test_state() -> CanvasState {
    let loader = HttpImageLoader::with_limits(Duration::from_millis(500), 1024 * 1024).unwrap();
    CanvasState::new(
        Arc::new(SceneStore::new(800, 600).unwrap()),
        ExportPipeline::new(Arc::new(loader), Arc::new(TextRasterizer::new())),
        CanvasLimits::default(),
    )
}

fn num(n: f64) -> Option<IntField> {
    Some(IntField::Number(n))
}

fn text(s: &str) -> Option<IntField> {
    Some(IntField::Text(s.to_string()))
}

#[tokio::test]
async fn test_init_and_state() {
    let state = test_state();

    let response = init_canvas(
        State(state.clone()),
        Ok(Json(types::InitRequest {
            width: num(400.0),
            height: text("300"),
        })),
    )
    .await
    .unwrap();
    assert!(response.0.success);
    assert_eq!((response.0.canvas.width, response.0.canvas.height), (400, 300));

    let Json(snapshot) = get_state(State(state)).await;
    assert_eq!(snapshot.canvas.width, 400);
    assert!(snapshot.canvas.elements.is_empty());
}

#[tokio::test]
async fn test_init_rejects_bad_dimensions_without_change() {
    let state = test_state();

    for request in [
        types::InitRequest {
            width: None,
            height: num(100.0),
        },
        types::InitRequest {
            width: num(0.0),
            height: num(100.0),
        },
        types::InitRequest {
            width: num(100.0),
            height: num(-5.0),
        },
        types::InitRequest {
            width: num(20_000.0),
            height: num(100.0),
        },
        types::InitRequest {
            width: text("wide"),
            height: num(100.0),
        },
    ] {
        let err = init_canvas(State(state.clone()), Ok(Json(request)))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.0.code(), "invalid_dimension");
    }

    let Json(snapshot) = get_state(State(state)).await;
    assert_eq!((snapshot.canvas.width, snapshot.canvas.height), (800, 600));
}

#[tokio::test]
async fn test_add_rectangle_applies_defaults() {
    let state = test_state();

    let response = add_rectangle(State(state), Ok(Json(Default::default())))
        .await
        .unwrap();
    let element = response.0.element.unwrap();
    assert_eq!((element.x, element.y), (0, 0));
    assert_eq!(
        element.shape,
        Shape::Rectangle {
            width: 100,
            height: 100,
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            stroke_width: 1,
        }
    );
    assert_eq!(response.0.canvas.elements.len(), 1);
}

#[tokio::test]
async fn test_numeric_strings_are_truncated() {
    let state = test_state();

    let response = add_circle(
        State(state),
        Ok(Json(types::AddCircleRequest {
            x: text("12.7"),
            y: text(" -4"),
            radius: text("30px"),
            fill_color: Some("rgb(255, 0, 0)".to_string()),
            stroke_width: num(0.0),
            ..Default::default()
        })),
    )
    .await
    .unwrap();

    let element = response.0.element.unwrap();
    assert_eq!((element.x, element.y), (12, -4));
    match element.shape {
        Shape::Circle {
            radius,
            fill_color,
            stroke_width,
            ..
        } => {
            assert_eq!(radius, 30);
            assert_eq!(fill_color, Color::rgb(255, 0, 0));
            assert_eq!(stroke_width, 0);
        }
        other => panic!("expected circle, got {other:?}"),
    }
}

#[tokio::test]
async fn test_explicit_zero_radius_is_rejected() {
    let state = test_state();
    let err = add_circle(
        State(state.clone()),
        Ok(Json(types::AddCircleRequest {
            radius: num(0.0),
            ..Default::default()
        })),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0.code(), "invalid_value");
    assert_eq!(state.store.element_count().await, 0);
}

#[tokio::test]
async fn test_sizes_above_dimension_limit_are_rejected() {
    let state = test_state();

    let err = add_circle(
        State(state.clone()),
        Ok(Json(types::AddCircleRequest {
            radius: num(3_000_000_000.0),
            ..Default::default()
        })),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(err.0.to_string().contains("radius"));

    let err = add_rectangle(
        State(state.clone()),
        Ok(Json(types::AddRectangleRequest {
            width: num(10_001.0),
            ..Default::default()
        })),
    )
    .await
    .unwrap_err();
    assert!(err.0.to_string().contains("width"));

    let err = add_text(
        State(state.clone()),
        Ok(Json(types::AddTextRequest {
            text: Some("W".to_string()),
            font_size: text("20000"),
            ..Default::default()
        })),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0.code(), "invalid_value");
    assert!(err.0.to_string().contains("fontSize"));
    assert_eq!(state.store.element_count().await, 0);

    add_circle(
        State(state.clone()),
        Ok(Json(types::AddCircleRequest {
            radius: num(10_000.0),
            ..Default::default()
        })),
    )
    .await
    .unwrap();
    assert_eq!(state.store.element_count().await, 1);
}

#[tokio::test]
async fn test_add_text_requires_content() {
    let state = test_state();

    let err = add_text(
        State(state.clone()),
        Ok(Json(types::AddTextRequest {
            text: Some(String::new()),
            ..Default::default()
        })),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.0.code(), "missing_field");
    assert_eq!(state.store.element_count().await, 0);

    let response = add_text(
        State(state),
        Ok(Json(types::AddTextRequest {
            text: Some("Hello".to_string()),
            ..Default::default()
        })),
    )
    .await
    .unwrap();
    match response.0.element.unwrap().shape {
        Shape::Text {
            font_size,
            font_family,
            ..
        } => {
            assert_eq!(font_size, 16);
            assert_eq!(font_family, "Arial");
        }
        other => panic!("expected text, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_colour_names_the_field() {
    let state = test_state();
    let err = add_rectangle(
        State(state),
        Ok(Json(types::AddRectangleRequest {
            stroke_color: Some("not-a-colour".to_string()),
            ..Default::default()
        })),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0.code(), "invalid_value");
    assert!(err.0.to_string().contains("strokeColor"));
}

#[tokio::test]
async fn test_ids_increase_and_clear_keeps_size() {
    let state = test_state();

    let mut last = 0;
    for _ in 0..3 {
        let response = add_rectangle(State(state.clone()), Ok(Json(Default::default())))
            .await
            .unwrap();
        let id = response.0.element.unwrap().id.0;
        assert!(id > last);
        last = id;
    }

    let Json(cleared) = clear_canvas(State(state.clone())).await;
    assert!(cleared.canvas.elements.is_empty());
    assert_eq!((cleared.canvas.width, cleared.canvas.height), (800, 600));

    let response = add_rectangle(State(state), Ok(Json(Default::default())))
        .await
        .unwrap();
    assert!(response.0.element.unwrap().id.0 > last);
}

// Router-level tests

async fn send(state: &CanvasState, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = canvas_routes_with_state(state.clone())
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec(), content_type)
}

const BOUNDARY: &str = "easel-test-boundary";

fn multipart(fields: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        if *name == "image" {
            body.extend_from_slice(
                b"Content-Disposition: form-data; name=\"image\"; filename=\"pic.png\"\r\n\
                  Content-Type: image/png\r\n\r\n",
            );
        } else {
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
        }
        body.extend_from_slice(value);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/api/canvas/add-image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn sample_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 200, 0, 255]));
    easel_canvas::imaging::encode_png(&img).unwrap()
}

#[tokio::test]
async fn test_upload_is_resized_and_embedded() {
    let state = test_state();
    let png = sample_png();

    let (status, body, _) = send(
        &state,
        multipart(&[
            ("x", b"10"),
            ("y", b"20"),
            ("width", b"40"),
            ("height", b"30"),
            ("image", &png),
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response: CanvasResponse = serde_json::from_slice(&body).unwrap();
    let element = response.element.unwrap();
    assert_eq!((element.x, element.y), (10, 20));
    let Shape::Image {
        width,
        height,
        source: ImageSource::Embedded { data },
    } = element.shape
    else {
        panic!("expected embedded image");
    };
    assert_eq!((width, height), (40, 30));
    let stored = easel_canvas::imaging::decode(&data).unwrap();
    assert_eq!(stored.dimensions(), (40, 30));
}

#[tokio::test]
async fn test_image_url_is_stored_with_default_box() {
    let state = test_state();
    let (status, body, _) = send(
        &state,
        multipart(&[("imageUrl", b"https://example.com/cat.png")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["element"]["type"], "image");
    assert_eq!(json["element"]["imageUrl"], "https://example.com/cat.png");
    assert_eq!(json["element"]["width"], 100);
    assert_eq!(json["element"]["height"], 100);
}

#[tokio::test]
async fn test_image_without_source_is_missing_field() {
    let state = test_state();
    let (status, body, _) = send(&state, multipart(&[("x", b"5")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert!(!error.success);
    assert_eq!(error.code, "missing_field");
    assert_eq!(state.store.element_count().await, 0);
}

#[tokio::test]
async fn test_corrupt_upload_is_rejected() {
    let state = test_state();
    let (status, body, _) = send(&state, multipart(&[("image", b"GIF89a-but-not-really")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code, "invalid_value");
}

#[tokio::test]
async fn test_malformed_json_gets_json_error() {
    let state = test_state();
    let request = Request::post("/api/canvas/add-rectangle")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body, content_type) = send(&state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert!(!error.success);
}

#[tokio::test]
async fn test_export_pdf_response() {
    let state = test_state();
    state.store.init(400, 300).await.unwrap();

    let response = canvas_routes_with_state(state.clone())
        .oneshot(
            Request::post("/api/canvas/export-pdf")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"canvas-export.pdf\""
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_preview_is_png_of_scene_size() {
    let state = test_state();
    state.store.init(120, 80).await.unwrap();

    let request = Request::get("/api/canvas/preview.png")
        .body(Body::empty())
        .unwrap();
    let (status, body, content_type) = send(&state, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));

    let decoded = easel_canvas::imaging::decode(&body).unwrap();
    assert_eq!(decoded.dimensions(), (120, 80));
}
