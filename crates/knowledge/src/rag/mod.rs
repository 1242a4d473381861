//! Grounded answer synthesis.

pub mod answer;
pub mod types;

pub use answer::{synthesize, MIN_RELEVANCE_SCORE};
pub use types::Answer;
