//! Image normalization and placeholder synthesis

mod normalize;
mod placeholder;

pub use normalize::normalize_png;
pub use placeholder::{pick_label, placeholder_png};
