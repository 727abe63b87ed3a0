//! Experiment server control for hitdesk.
//!
//! Two independent pieces:
//! - [`controller`]: spawns and stops the local experiment server process and
//!   answers the three-valued status question (running / stopped / pending).
//! - [`dashboard`]: a small auxiliary HTTP status page served with axum.

pub mod controller;
pub mod dashboard;
pub mod error;

pub use controller::{ControllerConfig, ServerController, ServerStatus};
pub use error::ServerError;
