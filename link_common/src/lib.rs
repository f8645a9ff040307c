//! Link Common Library
//!
//! This crate provides the shared protocol layout, pose math and
//! configuration loading utilities for all Link workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Resource names, default paths and tick timing
//! - [`layout`] - Fixed binary layout of the Link shared memory record
//! - [`math`] - Vector type and forward-vector derivation
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! Add to your `Cargo.toml` with alias for shorter imports:
//! ```toml
//! [dependencies]
//! link = { package = "link_common", path = "../link_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use link_common::layout::LINK_SIZE;
//! use link_common::config::{ConfigLoader, SharedConfig};
//! ```

pub mod config;
pub mod consts;
pub mod layout;
pub mod math;
pub mod prelude;
