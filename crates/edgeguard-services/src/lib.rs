//! # EdgeGuard Services
//!
//! Secret store backends for EdgeGuard.
//!
//! This crate provides implementations of [`edgeguard_types::SecretStore`]:
//! - **Doppler**: drives the `doppler` command-line tool as a subprocess
//! - **Memory**: in-process map with a call journal and fault injection,
//!   for tests and dry experiments

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod doppler;
pub mod memory;

pub use doppler::DopplerClient;
pub use memory::{MemoryStore, StoreCall, StoreOp};
