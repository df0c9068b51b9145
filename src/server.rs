//! HTTP surface: the page, the cartoonize endpoint, health and static assets.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::page::INDEX_HTML;
use crate::pipeline::{CartoonizeOptions, Cartoonizer};
use crate::prompt::{random_seed, Strength};

pub struct AppState {
    pub cartoonizer: Cartoonizer,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartoonResponse {
    /// `data:` URL of the normalized input
    pub original: String,
    /// `data:` URL of the watermarked result
    pub cartoon: String,
    pub caption: String,
    pub prompt: String,
    pub seed: u32,
    pub strength: u8,
    pub processing_time_ms: u128,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png))
}

/// Form fields of one cartoonize request.
#[derive(Debug, Default)]
struct CartoonizeForm {
    image: Option<Vec<u8>>,
    strength: Option<String>,
    seed: Option<String>,
    variation: bool,
    context: String,
}

impl CartoonizeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => form.image = Some(field.bytes().await?.to_vec()),
                "strength" => form.strength = Some(field.text().await?),
                "seed" => form.seed = Some(field.text().await?),
                "variation" => {
                    let value = field.text().await?;
                    form.variation = matches!(value.trim(), "true" | "1" | "on");
                }
                "context" => form.context = field.text().await?,
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    fn options(&self) -> Result<CartoonizeOptions, ApiError> {
        let strength = match self.strength.as_deref().map(str::trim) {
            None | Some("") => Strength::default(),
            Some(raw) => raw
                .parse::<u8>()
                .ok()
                .and_then(Strength::new)
                .ok_or_else(|| {
                    ApiError::bad_request(format!(
                        "strength must be an integer between {} and {}, got {raw:?}",
                        Strength::MIN,
                        Strength::MAX
                    ))
                })?,
        };

        let seed = if self.variation {
            random_seed()
        } else {
            match self.seed.as_deref().map(str::trim) {
                None | Some("") => 0,
                Some(raw) => raw.parse::<u32>().map_err(|_| {
                    ApiError::bad_request(format!("seed must be a non-negative integer, got {raw:?}"))
                })?,
            }
        };

        Ok(CartoonizeOptions {
            strength,
            seed,
            context: self.context.clone(),
        })
    }
}

async fn cartoonize(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<CartoonResponse>, ApiError> {
    let form = CartoonizeForm::read(multipart).await?;
    let opts = form.options()?;
    let upload = form
        .image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing `image` field"))?;

    tracing::info!(
        upload_bytes = upload.len(),
        strength = opts.strength.level(),
        seed = opts.seed,
        "cartoonize request"
    );

    let cartoon = state.cartoonizer.cartoonize(&upload, &opts).await?;

    Ok(Json(CartoonResponse {
        original: png_data_url(&cartoon.original_png),
        cartoon: png_data_url(&cartoon.cartoon_png),
        caption: cartoon.caption,
        prompt: cartoon.prompt,
        seed: cartoon.seed,
        strength: cartoon.strength.level(),
        processing_time_ms: cartoon.processing_time_ms,
    }))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn create_router(state: Arc<AppState>, assets_dir: &Path, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/cartoonize", post(cartoonize))
        .route("/health", get(health))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}
