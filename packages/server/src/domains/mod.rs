//! Domain modules - business logic.

pub mod image_engine;
