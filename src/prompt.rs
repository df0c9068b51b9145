//! Prompt assembly and the user-facing generation controls.

use rand::Rng;

/// Joins user-supplied context with the caption label.
pub fn build_prompt(context: &str, label: &str) -> String {
    let context = context.trim();
    let label = label.trim();
    if context.is_empty() {
        label.to_string()
    } else {
        format!("{context}, {label}")
    }
}

/// "Imagination" slider level. Higher levels let the result drift further
/// from the photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strength(u8);

impl Strength {
    pub const MIN: u8 = 3;
    pub const MAX: u8 = 10;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Value sent to the diffusion service, in 0..=1.
    pub fn as_fraction(self) -> f32 {
        f32::from(self.0) / 10.0
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self(4)
    }
}

/// Largest seed handed out for a new variation.
pub const MAX_VARIATION_SEED: u32 = 1024;

/// Seed for a fresh "new variation" request.
pub fn random_seed() -> u32 {
    rand::rng().random_range(0..=MAX_VARIATION_SEED)
}
