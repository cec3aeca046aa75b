//! Text-generation seam.
//!
//! Model providers live outside this workspace. They plug in through
//! [`TextGenerator`], which reports its provider label and model so the
//! orchestrator can price and record each call.

use chrono::Utc;

/// One completed generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    /// Generated text.
    pub content: String,
    /// Tokens billed for the call.
    pub tokens: i64,
}

/// A generation call failed.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The provider could not be reached or is not configured.
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with an error.
    #[error("generation failed: {message}")]
    Failed {
        /// Provider message.
        message: String,
    },
}

/// A text-generation provider.
pub trait TextGenerator: Send + Sync {
    /// Provider label recorded on cost records (`openai`, `local`, ...).
    fn provider(&self) -> &str;

    /// Model recorded on cost records and used for pricing.
    fn model(&self) -> &str;

    /// Generate text for `prompt`.
    fn generate(&self, prompt: &str) -> Result<Generation, GenerationError>;
}

/// Prompt for a draft of `doc_type`.
pub fn build_prompt(doc_type: &str, context: &str, features: Option<&str>) -> String {
    let features = features
        .filter(|f| !f.trim().is_empty())
        .unwrap_or("Key features will be detailed in the specification.");
    format!("Document type: {doc_type}\n\nCONTEXT: {context}\n\nKEY FEATURES:\n{features}\n")
}

/// Placeholder generator used when no provider is wired in.
#[derive(Clone, Debug)]
pub struct SimulatedGenerator {
    tokens: i64,
}

impl SimulatedGenerator {
    /// Provider and model label of simulated generations.
    pub const LABEL: &'static str = "simulated";

    /// Generator charging `tokens` per call.
    pub fn new(tokens: i64) -> Self {
        Self { tokens }
    }

    /// Tokens charged per call.
    pub fn tokens(&self) -> i64 {
        self.tokens
    }

    /// Placeholder draft text.
    pub fn placeholder(&self, prompt: &str) -> String {
        let summary = prompt.lines().next().unwrap_or_default();
        format!(
            "# Simulated Draft\n\
             \n\
             ## Based on: {summary}\n\
             \n\
             ### Generated: {}\n\
             ### Status: Simulated (no text-generation provider configured)\n\
             \n\
             **Example Content Structure:**\n\
             - Overview\n\
             - Technical specifications\n\
             - Requirements\n\
             - Integration points\n\
             - Security considerations\n\
             - Licensing recommendations\n",
            Utc::now().format("%Y-%m-%d %H:%M")
        )
    }
}

impl TextGenerator for SimulatedGenerator {
    fn provider(&self) -> &str {
        Self::LABEL
    }

    fn model(&self) -> &str {
        Self::LABEL
    }

    fn generate(&self, prompt: &str) -> Result<Generation, GenerationError> {
        Ok(Generation {
            content: self.placeholder(prompt),
            tokens: self.tokens,
        })
    }
}
