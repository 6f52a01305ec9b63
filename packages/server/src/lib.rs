//! Image engine service core.
//!
//! Turns a validated marketing-image request into either a stored image URL
//! or a well-typed fallback/error, without ever surfacing an unhandled
//! failure to the caller.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::{Config, Environment};
