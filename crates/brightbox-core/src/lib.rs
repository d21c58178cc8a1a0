//! # brightbox-core
//!
//! Core types and utilities for working with the Brightbox Cloud API.
//!
//! This crate provides the foundational pieces shared by the service crates:
//! error handling, client configuration, OAuth credential and token
//! management, and the authenticated HTTP connection.
//!
//! ## Modules
//!
//! - [`error`] - Error types and response status classification
//! - [`config`] - Configuration structures for API clients
//! - [`auth`] - Client credentials, access tokens, and the token session
//! - [`id`] - Strongly-typed resource identifier wrappers
//! - [`connection`] - Authenticated HTTP connection to the API

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod connection;
pub mod error;
pub mod id;

// Re-export commonly used types
pub use error::{Error, Result};
