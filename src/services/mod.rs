pub mod model_adapter;
pub mod prompts;

pub use model_adapter::{jpeg_data_url, png_data_url, ModelAdapter, ResponseMode};
