//! Platform-specific resource naming and memory mapping

pub mod linux;

pub use linux::*;
