//! Prelude module for common re-exports.
//!
//! ```rust
//! use link_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, LinkConfig, LogLevel, SharedConfig, StrategyChoice,
};

// ─── Protocol Layout ────────────────────────────────────────────────
pub use crate::layout::{LINK_SIZE, LINK_VERSION, LayoutError, LinkBuffer, LinkFrame};

// ─── Math ───────────────────────────────────────────────────────────
pub use crate::math::{Vec3, forward_from_angles};
