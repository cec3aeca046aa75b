//! # documenter-runtime
//!
//! The lifecycle orchestrator and the text-generation seam.
//!
//! - **Generator**: [`TextGenerator`] is the only boundary to a model provider.
//!   [`SimulatedGenerator`] produces placeholder drafts when no provider is
//!   wired in.
//! - **Orchestrator**: drives each document through
//!   `Draft -> PendingReview -> Reviewed -> LicensingReady`, recording cost
//!   in the ledger, consulting the cost governor after spend and feeding
//!   review edits to the learning engine.
//!
//! ## Crate Position
//!
//! Aggregation layer. Depends on: documenter-settings, documenter-ledger,
//! documenter-governor, documenter-learning, documenter-review.
//! Depended on by: documenter-cli.

#![deny(unsafe_code)]

pub mod errors;
pub mod generator;
pub mod orchestrator;

pub use errors::{OrchestratorError, Result};
pub use generator::{Generation, GenerationError, SimulatedGenerator, TextGenerator, build_prompt};
pub use orchestrator::{
    GenerateOutcome, GenerateRequest, Orchestrator, ReviewOutcome, SubmitReview, draft_filename,
};
