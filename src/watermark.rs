//! Logo overlay for generated images.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::Result;

/// Logo edge length after resizing.
pub const LOGO_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct Watermark {
    logo: RgbaImage,
    position: (i64, i64),
}

impl Watermark {
    /// Wraps an already-loaded logo. `opacity` scales its alpha channel.
    pub fn new(logo: &DynamicImage, opacity: f32) -> Self {
        let mut logo = logo
            .resize_exact(LOGO_SIZE, LOGO_SIZE, FilterType::CatmullRom)
            .to_rgba8();

        let opacity = opacity.clamp(0.0, 1.0);
        if opacity < 1.0 {
            for px in logo.pixels_mut() {
                px.0[3] = (f32::from(px.0[3]) * opacity).round() as u8;
            }
        }

        Self {
            logo,
            position: (0, 0),
        }
    }

    pub fn load(path: &Path, opacity: f32) -> Result<Self> {
        let logo = image::open(path)?;
        Ok(Self::new(&logo, opacity))
    }

    /// Semi-transparent white disc, used when no logo file is configured.
    pub fn badge() -> Self {
        let center = (LOGO_SIZE as f32 - 1.0) / 2.0;
        let radius = LOGO_SIZE as f32 * 0.4;
        let logo = RgbaImage::from_fn(LOGO_SIZE, LOGO_SIZE, |x, y| {
            let d = ((x as f32 - center).powi(2) + (y as f32 - center).powi(2)).sqrt();
            // One pixel of antialiasing at the rim.
            let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
            Rgba([255, 255, 255, (coverage * 160.0).round() as u8])
        });
        Self {
            logo,
            position: (0, 0),
        }
    }

    pub fn at(mut self, x: i64, y: i64) -> Self {
        self.position = (x, y);
        self
    }

    pub fn logo(&self) -> &RgbaImage {
        &self.logo
    }

    /// Alpha-blends the logo onto a copy of `base`.
    pub fn apply(&self, base: &DynamicImage) -> RgbaImage {
        let mut out = base.to_rgba8();
        imageops::overlay(&mut out, &self.logo, self.position.0, self.position.1);
        out
    }
}
