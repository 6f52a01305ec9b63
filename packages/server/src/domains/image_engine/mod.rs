//! Image generation request pipeline.
//!
//! The pure stages (decision, safety, prompt, sizes) depend on nothing;
//! the orchestrator in `pipeline` composes them with the effectful adapters
//! from the kernel.

pub mod decision;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod safety;
pub mod sizes;

pub use decision::decide;
pub use models::{Decision, ImageEngineRequest, ImageEngineResult};
pub use pipeline::run_pipeline;
pub use safety::{evaluate, SafetyInput};
pub use sizes::resolve_size;
