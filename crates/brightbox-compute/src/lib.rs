//! Compute driver and data models for the Brightbox Cloud API.
//!
//! Provides the canonical compute entities (nodes, images, sizes,
//! locations), the normalizers that build them from provider payloads, and
//! the [`BrightboxDriver`] facade implementing the provider-agnostic
//! [`ComputeDriver`] operation set plus cloud IP extension operations.

#![deny(missing_docs)]

pub mod driver;
pub mod models;
pub mod normalize;
pub mod state;

pub use driver::{BrightboxDriver, ComputeDriver};
pub use models::{
    CloudIp, CreateServerRequest, Extra, Image, Location, MapCloudIpRequest, Node, Size,
};
pub use state::NodeState;

/// Convenient result alias that reuses the shared error type.
pub type Result<T> = brightbox_core::Result<T>;
