//! Application module
//!
//! This module contains the daemon's application structure and lifecycle
//! management, organized into logical sub-modules.

pub mod builder;
pub mod core;
pub mod tasks;

pub use builder::ApplicationBuilder;
pub use core::Application;
