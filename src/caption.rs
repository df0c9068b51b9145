//! Client for the CLIP interrogator endpoint that labels the photo.

use serde::Serialize;

use crate::endpoint::PredictEndpoint;
use crate::error::Result;
use crate::normalize::NormalizedImage;

#[derive(Debug, Serialize)]
struct CaptionRequest<'a> {
    mode: &'a str,
    image: &'a str,
}

#[derive(Debug, Clone)]
pub struct CaptionClient {
    endpoint: PredictEndpoint,
}

impl CaptionClient {
    pub fn new(endpoint: PredictEndpoint) -> Self {
        Self { endpoint }
    }

    /// Returns a short natural-language label for the image.
    pub async fn caption(&self, image: &NormalizedImage) -> Result<String> {
        let request = CaptionRequest {
            mode: "fast",
            image: &image.base64,
        };

        let reply = self.endpoint.predict(&request).await?;
        let labels = self.endpoint.completion_str(&reply, "labels")?;

        tracing::info!(labels = %labels, "caption received");
        Ok(labels)
    }
}
