//! Generator integration crate for medquery.
//!
//! This crate provides a provider-agnostic abstraction for the generative
//! model used during answer synthesis, through a unified trait-based
//! interface.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//!
//! # Example
//! ```no_run
//! use medquery_llm::{Generator, GenerationRequest, providers::OllamaGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = OllamaGenerator::new();
//! let request = GenerationRequest::new("Hello, world!", "llama3.2");
//! let response = generator.generate(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{GenerationRequest, GenerationResponse, GenerationUsage, Generator};
pub use factory::create_generator;
pub use providers::OllamaGenerator;
