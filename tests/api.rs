use std::io::Cursor;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgb, RgbImage};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use tower::ServiceExt;

use room_decorator::{create_router, AppState, Config};

const BOUNDARY: &str = "room-decorator-test-boundary";

fn app(config: Config) -> Router {
    create_router(AppState::from_config(config).unwrap())
}

fn room_png() -> Vec<u8> {
    let image = RgbImage::from_pixel(32, 32, Rgb([200, 200, 200]));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

/// Build a multipart body; `file` is (content type, bytes) for the `image` field
fn multipart_body(file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"room\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn mock_vision(server: &mut Server, description: &str) -> mockito::Mock {
    server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({ "model": "gpt-4o", "max_tokens": 500 })))
        .with_status(200)
        .with_body(
            json!({
                "choices": [{
                    "message": { "role": "assistant", "content": description },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30 }
            })
            .to_string(),
        )
        .create_async()
        .await
}

#[tokio::test]
async fn test_styles_lists_all_display_names() {
    let response = app(Config::for_upstream("http://127.0.0.1:9"))
        .oneshot(Request::get("/api/room-decorator/styles").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let styles = read_json(response).await;
    assert_eq!(
        styles,
        json!(["Finnish", "Swedish", "Arabic", "Russian", "American", "Modern", "Traditional"])
    );
}

#[tokio::test]
async fn test_style_details_pair_names_with_descriptions() {
    let response = app(Config::for_upstream("http://127.0.0.1:9"))
        .oneshot(Request::get("/api/room-decorator/styles/details").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let details = read_json(response).await;
    let details = details.as_array().unwrap();
    assert_eq!(details.len(), 7);
    assert_eq!(details[0]["name"], "Finnish");
    assert_eq!(
        details[0]["description"],
        "Minimalist, natural wood, clean lines, functional design, light colors"
    );
    assert!(details.iter().all(|d| !d["description"].as_str().unwrap().is_empty()));
}

#[tokio::test]
async fn test_health_endpoints() {
    let router = app(Config::for_upstream("http://127.0.0.1:9"));

    let response = router
        .clone()
        .oneshot(Request::get("/api/room-decorator/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&text[..], b"Room Decorator API is running");

    let response = router
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let health = read_json(response).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["image_provider"], "openai");
    assert_eq!(health["vision_configured"], true);
}

#[tokio::test]
async fn test_decorate_without_image_is_rejected() {
    let body = multipart_body(None, &[("designStyle", "Swedish")]);
    let response = app(Config::for_upstream("http://127.0.0.1:9"))
        .oneshot(multipart_request("/api/room-decorator/decorate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "No image provided");
}

#[tokio::test]
async fn test_decorate_rejects_unsupported_image_type() {
    let body = multipart_body(Some(("image/gif", b"GIF89a")), &[("designStyle", "Swedish")]);
    let response = app(Config::for_upstream("http://127.0.0.1:9"))
        .oneshot(multipart_request("/api/room-decorator/decorate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["message"], "Invalid image format. Please use JPG, PNG, or WEBP");
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected_with_413() {
    let mut config = Config::for_upstream("http://127.0.0.1:9");
    config.server.max_upload_bytes = 1024;

    let oversized = vec![0u8; 4096];
    let body = multipart_body(Some(("image/png", &oversized)), &[("designStyle", "Modern")]);
    let response = app(config)
        .oneshot(multipart_request("/api/room-decorator/decorate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(read_json(response).await["success"], false);
}

#[tokio::test]
async fn test_decorate_multipart_accepts_form_style_flag() {
    let mut server = Server::new_async().await;
    let _vision = mock_vision(&mut server, "A dining room").await;
    let _images = server
        .mock("POST", "/images/generations")
        .with_status(200)
        .with_body(r#"{"data":[{"b64_json":"aW1n"}]}"#)
        .expect(3)
        .create_async()
        .await;

    let png = room_png();
    let body = multipart_body(
        Some(("image/png", &png)),
        &[("designStyle", "Modern"), ("preserveExistingFurniture", "off")],
    );
    let response = app(Config::for_upstream(&server.url()))
        .oneshot(multipart_request("/api/room-decorator/decorate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["success"], true);
}

#[tokio::test]
async fn test_decorate_multipart_generates_three_options() {
    let mut server = Server::new_async().await;
    let vision = mock_vision(&mut server, "A bright bedroom with a double bed").await;
    let images = server
        .mock("POST", "/images/generations")
        .with_status(200)
        .with_body(r#"{"data":[{"b64_json":"ZGVjb3JhdGVk"}]}"#)
        .expect(3)
        .create_async()
        .await;

    let png = room_png();
    let body = multipart_body(
        Some(("image/png", &png)),
        &[("designStyle", "finnish"), ("colorPreference", "sage green")],
    );
    let response = app(Config::for_upstream(&server.url()))
        .oneshot(multipart_request("/api/room-decorator/decorate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    vision.assert_async().await;
    images.assert_async().await;

    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Successfully generated 3 decoration options");
    assert_eq!(json["originalImageAnalysis"], "A bright bedroom with a double bed");

    let options = json["options"].as_array().unwrap();
    assert_eq!(options.len(), 3);
    for option in options {
        assert_eq!(option["designStyle"], "Finnish");
        assert_eq!(option["imageBase64"], "ZGVjb3JhdGVk");
    }
    assert!(options[0]["description"].as_str().unwrap().contains("subtle enhancements"));
    assert!(options[2]["description"].as_str().unwrap().contains("bold reimagining"));
}

#[tokio::test]
async fn test_decorate_json_falls_back_to_placeholders_when_generation_fails() {
    let mut server = Server::new_async().await;
    let _vision = mock_vision(&mut server, "A small kitchen").await;
    let _images = server
        .mock("POST", "/images/generations")
        .with_status(500)
        .with_body(r#"{"error":{"message":"server overloaded","type":"server_error","code":null}}"#)
        .expect(3)
        .create_async()
        .await;

    let request = json_request(
        "/api/room-decorator/decorate-json",
        json!({
            "imageBase64": format!("data:image/png;base64,{}", STANDARD.encode(room_png())),
            "designStyle": "Arabic"
        }),
    );
    let response = app(Config::for_upstream(&server.url())).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    let options = json["options"].as_array().unwrap();
    assert_eq!(options.len(), 3);
    assert!(options
        .iter()
        .all(|o| o["imageBase64"] == room_decorator::generation::PLACEHOLDER_IMAGE));
}

#[tokio::test]
async fn test_decorate_json_rejects_bad_base64() {
    let request = json_request(
        "/api/room-decorator/decorate-json",
        json!({ "imageBase64": "%%% not base64 %%%", "designStyle": "Modern" }),
    );
    let response = app(Config::for_upstream("http://127.0.0.1:9"))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Error processing request:"));
}

#[tokio::test]
async fn test_decorate_json_missing_design_style_is_400() {
    let request = json_request(
        "/api/room-decorator/decorate-json",
        json!({ "imageBase64": "aGVsbG8=" }),
    );
    let response = app(Config::for_upstream("http://127.0.0.1:9"))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Error processing request: designStyle is required");
}

#[tokio::test]
async fn test_decorate_json_malformed_body_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/room-decorator/decorate-json")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"imageBase64": 42}"#))
        .unwrap();
    let response = app(Config::for_upstream("http://127.0.0.1:9"))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Error processing request:"));
}

#[tokio::test]
async fn test_analyze_reports_room_type_from_description() {
    let mut server = Server::new_async().await;
    let _vision = mock_vision(&mut server, "A living room with a grey sofa").await;

    let png = room_png();
    let body = multipart_body(Some(("image/png", &png)), &[]);
    let response = app(Config::for_upstream(&server.url()))
        .oneshot(multipart_request("/api/room-decorator/analyze", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["analysis"]["roomType"], "Living Room");
    assert_eq!(json["analysis"]["lighting"], "Bright");
}

#[tokio::test]
async fn test_regenerate_keeps_option_id() {
    let request = json_request(
        "/api/room-decorator/options/opt-7/regenerate",
        json!({ "designStyle": "Russian" }),
    );
    let response = app(Config::for_upstream("http://127.0.0.1:9"))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["id"], "opt-7");
    assert_eq!(json["designStyle"], "Russian");
    assert_eq!(json["description"], "Regenerated Russian design with updated preferences.");
}

#[tokio::test]
async fn test_regenerate_without_design_style_is_400() {
    let response = app(Config::for_upstream("http://127.0.0.1:9"))
        .oneshot(json_request("/api/room-decorator/options/x/regenerate", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "designStyle is required");
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let mut config = Config::for_upstream("http://127.0.0.1:9");
    config.rate_limit.per_minute = 1;
    let router = app(config);

    let first = router
        .clone()
        .oneshot(json_request(
            "/api/room-decorator/options/a/regenerate",
            json!({ "designStyle": "Modern" }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = router
        .clone()
        .oneshot(json_request(
            "/api/room-decorator/options/b/regenerate",
            json!({ "designStyle": "Modern" }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(read_json(second).await["success"], false);

    // styles are not metered
    let styles = router
        .oneshot(Request::get("/api/room-decorator/styles").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(styles.status(), StatusCode::OK);
}
