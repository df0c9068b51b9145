//! Client for the Stable Diffusion img2img endpoint.

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat};
use serde::Serialize;

use crate::endpoint::PredictEndpoint;
use crate::error::{PipelineError, Result};
use crate::normalize::{NormalizedImage, CANVAS_SIZE};
use crate::prompt::Strength;

pub const NEGATIVE_PROMPT: &str = "EasyNegative, drawn by bad-artist, sketch by bad-artist-anime, (bad_prompt:0.8), (artist name, signature, watermark:1.4), (ugly:1.2), (worst quality, poor details:1.4), bad-hands-5, badhandv4, blurry, nsfw";

/// img2img payload. Everything past `strength` is fixed for the cartoon checkpoint.
#[derive(Debug, Serialize)]
pub struct Img2ImgRequest<'a> {
    pub image: &'a str,
    pub prompt: &'a str,
    pub strength: f32,
    pub negative_prompt: &'a str,
    pub model: &'a str,
    pub vae: &'a str,
    pub sampler: &'a str,
    pub cfg_scale: u32,
    pub num_images: u32,
    pub seed: u32,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
}

impl<'a> Img2ImgRequest<'a> {
    pub fn new(image: &'a NormalizedImage, prompt: &'a str, strength: Strength, seed: u32) -> Self {
        Self {
            image: &image.base64,
            prompt,
            strength: strength.as_fraction(),
            negative_prompt: NEGATIVE_PROMPT,
            model: "cgi",
            vae: "YOZORA.vae.pt",
            sampler: "K_EULER_ANCESTRAL",
            cfg_scale: 7,
            num_images: 1,
            seed,
            width: CANVAS_SIZE,
            height: CANVAS_SIZE,
            steps: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiffusionClient {
    endpoint: PredictEndpoint,
}

impl DiffusionClient {
    pub fn new(endpoint: PredictEndpoint) -> Self {
        Self { endpoint }
    }

    /// Generates the cartoon version of `image` guided by `prompt`.
    pub async fn generate(
        &self,
        image: &NormalizedImage,
        prompt: &str,
        strength: Strength,
        seed: u32,
    ) -> Result<DynamicImage> {
        let request = Img2ImgRequest::new(image, prompt, strength, seed);
        tracing::info!(
            prompt,
            strength = request.strength,
            seed,
            "requesting img2img generation"
        );

        let reply = self.endpoint.predict(&request).await?;
        let encoded = self.endpoint.completion_str(&reply, "image_0")?;

        let bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|source| PipelineError::Base64 {
                service: self.endpoint.service(),
                source,
            })?;

        image::load_from_memory_with_format(&bytes, ImageFormat::Png).map_err(|source| {
            PipelineError::UpstreamImage {
                service: self.endpoint.service(),
                source,
            }
        })
    }
}
