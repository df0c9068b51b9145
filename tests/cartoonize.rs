use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, GenericImageView, ImageOutputFormat, Rgb, RgbImage};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cartoonizer::caption::CaptionClient;
use cartoonizer::diffusion::DiffusionClient;
use cartoonizer::endpoint::PredictEndpoint;
use cartoonizer::server::{CartoonResponse, HealthResponse};
use cartoonizer::watermark::Watermark;
use cartoonizer::{create_router, AppState, CartoonizeOptions, Cartoonizer, PipelineError, Strength};

const BOUNDARY: &str = "cartoonizer-test-boundary";

fn png(img: &DynamicImage) -> Vec<u8> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .unwrap();
    out
}

fn photo() -> Vec<u8> {
    png(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
        640,
        480,
        Rgb([10, 120, 200]),
    )))
}

fn generated_b64() -> String {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(512, 512, Rgb([0, 0, 0])));
    general_purpose::STANDARD.encode(png(&img))
}

struct Upstream {
    clip: MockServer,
    sd: MockServer,
}

impl Upstream {
    async fn start() -> Self {
        Self {
            clip: MockServer::start().await,
            sd: MockServer::start().await,
        }
    }

    async fn caption_replies(&self, labels: &str) {
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(serde_json::json!({ "mode": "fast" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "completion": { "labels": labels }
            })))
            .mount(&self.clip)
            .await;
    }

    fn cartoonizer(&self) -> Cartoonizer {
        let timeout = Duration::from_secs(5);
        let clip = PredictEndpoint::new("caption", self.clip.uri(), None, timeout).unwrap();
        let sd = PredictEndpoint::new("diffusion", self.sd.uri(), None, timeout).unwrap();
        Cartoonizer::new(
            CaptionClient::new(clip),
            DiffusionClient::new(sd),
            Watermark::badge(),
        )
    }
}

fn multipart(fields: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        if *name == "image" {
            body.extend_from_slice(
                b"Content-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\n\
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

    Request::builder()
        .method("POST")
        .uri("/cartoonize")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn router(upstream: &Upstream) -> axum::Router {
    let state = Arc::new(AppState {
        cartoonizer: upstream.cartoonizer(),
    });
    create_router(state, std::path::Path::new("assets"), 10 * 1024 * 1024)
}

async fn json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn decode_data_url(url: &str) -> DynamicImage {
    let b64 = url.strip_prefix("data:image/png;base64,").unwrap();
    image::load_from_memory(&general_purpose::STANDARD.decode(b64).unwrap()).unwrap()
}

#[tokio::test]
async fn pipeline_runs_end_to_end() {
    let upstream = Upstream::start().await;
    upstream.caption_replies("a person in a blue room").await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "as a viking, a person in a blue room",
            "seed": 321,
            "model": "cgi",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "completion": { "image_0": generated_b64() }
        })))
        .expect(1)
        .mount(&upstream.sd)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("cartoonized_marked.png");
    let cartoonizer = upstream.cartoonizer().with_output_path(&out_path);

    let opts = CartoonizeOptions {
        strength: Strength::new(6).unwrap(),
        seed: 321,
        context: "as a viking".to_string(),
    };
    let cartoon = cartoonizer.cartoonize(&photo(), &opts).await.unwrap();

    assert_eq!(cartoon.caption, "a person in a blue room");
    assert_eq!(cartoon.prompt, "as a viking, a person in a blue room");
    assert_eq!(cartoon.seed, 321);
    assert_eq!(cartoon.strength.level(), 6);

    let original = image::load_from_memory(&cartoon.original_png).unwrap();
    assert_eq!(original.dimensions(), (512, 512));

    let result = image::load_from_memory(&cartoon.cartoon_png).unwrap();
    assert_eq!(result.dimensions(), (512, 512));
    // Badge brightens the top-left corner of the black generated image only.
    assert!(result.get_pixel(50, 50).0[0] > 100);
    assert_eq!(result.get_pixel(300, 300).0[..3], [0, 0, 0]);

    let saved = std::fs::read(&out_path).unwrap();
    assert_eq!(saved, cartoon.cartoon_png);
}

#[tokio::test]
async fn caption_failure_skips_diffusion() {
    let upstream = Upstream::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&upstream.clip)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream.sd)
        .await;

    let err = upstream
        .cartoonizer()
        .cartoonize(&photo(), &CartoonizeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Upstream {
            service: "caption",
            status: 500,
            ..
        }
    ));
}

#[tokio::test]
async fn index_serves_page() {
    let upstream = Upstream::start().await;
    let response = router(&upstream)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Cartoonizer"));
    assert!(html.contains("Generate New Variation!"));
}

#[tokio::test]
async fn health_reports_version() {
    let upstream = Upstream::start().await;
    let response = router(&upstream)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = json(response).await;
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn cartoonize_endpoint_returns_both_images() {
    let upstream = Upstream::start().await;
    upstream.caption_replies("a smiling face").await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "a smiling face",
            "seed": 0,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "completion": { "image_0": generated_b64() }
        })))
        .expect(1)
        .mount(&upstream.sd)
        .await;

    let photo = photo();
    let response = router(&upstream)
        .oneshot(multipart(&[("image", &photo[..]), ("strength", &b"8"[..])]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: CartoonResponse = json(response).await;
    assert_eq!(body.caption, "a smiling face");
    assert_eq!(body.prompt, "a smiling face");
    assert_eq!(body.seed, 0);
    assert_eq!(body.strength, 8);
    assert_eq!(decode_data_url(&body.original).dimensions(), (512, 512));
    assert_eq!(decode_data_url(&body.cartoon).dimensions(), (512, 512));
}

#[tokio::test]
async fn variation_uses_random_seed() {
    let upstream = Upstream::start().await;
    upstream.caption_replies("a cat").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "completion": { "image_0": generated_b64() }
        })))
        .mount(&upstream.sd)
        .await;

    let photo = photo();
    let response = router(&upstream)
        .oneshot(multipart(&[
            ("image", &photo[..]),
            ("variation", &b"true"[..]),
            ("context", &b"wearing sunglasses"[..]),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: CartoonResponse = json(response).await;
    assert!(body.seed <= 1024);
    assert_eq!(body.prompt, "wearing sunglasses, a cat");
    assert_eq!(body.strength, 4);
}

#[tokio::test]
async fn missing_image_is_bad_request() {
    let upstream = Upstream::start().await;
    let response = router(&upstream)
        .oneshot(multipart(&[("strength", &b"5"[..])]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = json(response).await;
    assert_eq!(body["detail"], "Bad request: missing `image` field");
}

#[tokio::test]
async fn out_of_range_strength_is_bad_request() {
    let upstream = Upstream::start().await;
    let photo = photo();
    let response = router(&upstream)
        .oneshot(multipart(&[("image", &photo[..]), ("strength", &b"11"[..])]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn undecodable_upload_is_bad_request() {
    let upstream = Upstream::start().await;
    let response = router(&upstream)
        .oneshot(multipart(&[("image", &b"not a photo"[..])]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let upstream = Upstream::start().await;
    upstream.caption_replies("a tree").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "completion": {}
        })))
        .mount(&upstream.sd)
        .await;

    let photo = photo();
    let response = router(&upstream)
        .oneshot(multipart(&[("image", &photo[..])]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = json(response).await;
    assert_eq!(
        body["detail"],
        "Upstream error: diffusion response is missing `image_0`"
    );
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() {
    let upstream = Upstream::start().await;
    let state = Arc::new(AppState {
        cartoonizer: upstream.cartoonizer(),
    });
    let app = create_router(state, std::path::Path::new("assets"), 1000);

    let big = vec![0xAB; 5000];
    let response = app
        .oneshot(multipart(&[("image", &big[..])]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: serde_json::Value = json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Payload too large"));
}
