//! # sentinel-core
//!
//! Shared vocabulary for the Sentinel context toolkit.
//!
//! - **Layout**: fixed repository paths (`.sentinel/context`, capsule file names)
//! - **Text**: line counting shared by the capsule builder and the context linter
//! - **Logging**: `tracing` subscriber setup for binaries and tests

#![deny(unsafe_code)]

pub mod constants;
pub mod logging;
pub mod text;

pub use logging::init_subscriber;
pub use text::count_lines;
