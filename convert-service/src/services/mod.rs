pub mod cleanup;
pub mod converter;
pub mod metrics;
pub mod prompts;
pub mod providers;
pub mod validation;

pub use converter::ImageConverter;
pub use metrics::{get_metrics, init_metrics};
