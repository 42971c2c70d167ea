pub mod client;
pub mod gemini;
#[cfg(test)]
pub mod testing;

pub use client::{AiClient, ImageMime, ImagePart};
pub use gemini::GeminiClient;
