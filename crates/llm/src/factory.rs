//! Generator provider factory.
//!
//! This module provides a factory for creating generator clients based on
//! application configuration.

use crate::client::Generator;
use crate::providers::OllamaGenerator;
use std::sync::Arc;

/// Create a generator client based on the provider name.
///
/// The returned handle is intended to be constructed once at process start
/// and shared for the process lifetime.
///
/// # Arguments
/// * `provider` - Provider identifier (currently "ollama")
/// * `endpoint` - Optional custom endpoint URL
///
/// # Errors
/// Returns an error string if the provider is unknown.
pub fn create_generator(
    provider: &str,
    endpoint: Option<&str>,
) -> Result<Arc<dyn Generator>, String> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let generator = OllamaGenerator::with_base_url(base_url);
            Ok(Arc::new(generator))
        }
        _ => Err(format!("Unknown generator provider: {}", provider)),
    }
}
