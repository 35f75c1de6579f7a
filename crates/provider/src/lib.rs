//! Client for the upstream sports data provider.
//!
//! The [`client::SportsProvider`] trait is the seam the engine and API
//! depend on; [`client::HttpProvider`] is the reqwest-backed production
//! implementation. Provider failures are opaque I/O errors from the
//! caller's point of view.

pub mod client;
pub mod dto;
pub mod error;

pub use client::{HttpProvider, SportsProvider};
pub use error::ProviderError;
