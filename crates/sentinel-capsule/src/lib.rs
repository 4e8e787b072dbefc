//! # sentinel-capsule
//!
//! Packages a spec directory (`spec.md`, `plan.md`, `tasks.md`) into a
//! bounded-size capsule.
//!
//! - [`identity`]: content-addressed `slug@hash8` identifiers
//! - [`template`]: token rendering with unresolved-token detection
//! - [`builder`]: section extraction, Allowed Context, line ceiling, write

#![deny(unsafe_code)]

pub mod builder;
pub mod errors;
pub mod identity;
pub mod template;

pub use builder::{Capsule, CapsuleBuilder, CapsuleRequest};
pub use errors::{CapsuleError, Result};
pub use identity::capsule_id;
