//! The cartoonize pipeline: normalize, caption, prompt, img2img, watermark.

use std::path::PathBuf;
use std::time::Instant;

use image::DynamicImage;

use crate::caption::CaptionClient;
use crate::config::Config;
use crate::diffusion::DiffusionClient;
use crate::endpoint::PredictEndpoint;
use crate::error::Result;
use crate::normalize::{encode_png, normalize};
use crate::prompt::{build_prompt, Strength};
use crate::watermark::Watermark;

/// User-controlled knobs for one run.
#[derive(Debug, Clone, Default)]
pub struct CartoonizeOptions {
    pub strength: Strength,
    pub seed: u32,
    /// Extra free text prepended to the caption.
    pub context: String,
}

/// Result of one run.
#[derive(Debug, Clone)]
pub struct Cartoon {
    /// Normalized 512x512 input, PNG encoded.
    pub original_png: Vec<u8>,
    /// Watermarked result, PNG encoded.
    pub cartoon_png: Vec<u8>,
    pub caption: String,
    pub prompt: String,
    pub seed: u32,
    pub strength: Strength,
    pub processing_time_ms: u128,
}

pub struct Cartoonizer {
    caption: CaptionClient,
    diffusion: DiffusionClient,
    watermark: Watermark,
    output_path: Option<PathBuf>,
}

impl Cartoonizer {
    pub fn new(caption: CaptionClient, diffusion: DiffusionClient, watermark: Watermark) -> Self {
        Self {
            caption,
            diffusion,
            watermark,
            output_path: None,
        }
    }

    /// Builds the clients and loads the logo described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let caption = PredictEndpoint::new(
            "caption",
            config.clip_endpoint.clone(),
            config.api_token.clone(),
            config.request_timeout,
        )?;
        let diffusion = PredictEndpoint::new(
            "diffusion",
            config.sd_endpoint.clone(),
            config.api_token.clone(),
            config.request_timeout,
        )?;

        let watermark = match Watermark::load(&config.watermark_path, config.watermark_opacity) {
            Ok(mark) => mark,
            Err(e) => {
                tracing::warn!(
                    path = %config.watermark_path.display(),
                    "watermark not loaded ({e}), using built-in badge"
                );
                Watermark::badge()
            }
        };

        let mut cartoonizer = Self::new(
            CaptionClient::new(caption),
            DiffusionClient::new(diffusion),
            watermark,
        );
        cartoonizer.output_path = config.output_path.clone();
        Ok(cartoonizer)
    }

    /// Saves every watermarked result to `path`, overwriting the previous one.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub async fn cartoonize(&self, upload: &[u8], opts: &CartoonizeOptions) -> Result<Cartoon> {
        let start = Instant::now();

        let bytes = upload.to_vec();
        let normalized = tokio::task::spawn_blocking(move || normalize(&bytes)).await??;
        let caption = self.caption.caption(&normalized).await?;
        let prompt = build_prompt(&opts.context, &caption);

        let generated = self
            .diffusion
            .generate(&normalized, &prompt, opts.strength, opts.seed)
            .await?;

        let watermark = self.watermark.clone();
        let cartoon_png = tokio::task::spawn_blocking(move || {
            let marked = DynamicImage::ImageRgba8(watermark.apply(&generated));
            encode_png(&marked)
        })
        .await??;

        if let Some(path) = &self.output_path {
            tokio::fs::write(path, &cartoon_png).await?;
            tracing::debug!(path = %path.display(), "saved result");
        }

        let processing_time_ms = start.elapsed().as_millis();
        tracing::info!(
            seed = opts.seed,
            strength = opts.strength.level(),
            processing_time_ms,
            "cartoonized image"
        );

        Ok(Cartoon {
            original_png: normalized.png,
            cartoon_png,
            caption,
            prompt,
            seed: opts.seed,
            strength: opts.strength,
            processing_time_ms,
        })
    }
}
