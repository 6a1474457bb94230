//! Generation port - the hosted LLM behind the cache
//!
//! The generator is opaque: potentially slow (seconds) and fallible. The
//! cache never retries it and never lets its own failures mask a generator
//! result.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

use crate::error::ApplicationError;

/// Options forwarded to the generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature
    pub temperature: f32,
    /// Output token budget
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }
}

/// Port for AI response generation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GenerationPort: Send + Sync {
    /// Generate a response for the given prompt
    ///
    /// The returned value is the parsed payload the surrounding handler
    /// would hand to the UI; the cache stores it verbatim.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Value, ApplicationError>;
}
