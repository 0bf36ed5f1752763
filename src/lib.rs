//! Tileforged - texture optimizer for b3dm 3D tiles
//!
//! This library crate exposes the core functionality for integration testing
//! and benchmarks. Framing lives in `tileforged-format`; this crate adds the
//! image work and the batch machinery around it.

pub mod batch;
pub mod config;
pub mod discovery;
pub mod error;
pub mod inspect;
pub mod optimize;
pub mod remap;
pub mod transcode;

pub use error::{Error, Result};
