//! Subcommand handlers. Each returns an [`Outcome`](crate::output::Outcome);
//! fatal errors propagate to `main` as `anyhow::Error`.

pub(crate) mod capsule;
pub(crate) mod context;
