//! Photo-to-cartoon web demo.
//!
//! An upload is normalized to a 512x512 PNG, labelled by a CLIP interrogator
//! endpoint, redrawn by a Stable Diffusion img2img endpoint, and watermarked.

pub mod caption;
pub mod config;
pub mod diffusion;
pub mod endpoint;
pub mod error;
pub mod normalize;
pub mod page;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod watermark;

pub use config::Config;
pub use error::{ApiError, PipelineError};
pub use pipeline::{Cartoon, CartoonizeOptions, Cartoonizer};
pub use prompt::Strength;
pub use server::{create_router, AppState};
