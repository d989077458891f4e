//! Core domain types
//!
//! These types describe what the workspace service hands back to us. They are
//! created fresh on every listing and never persisted.

pub mod definition;
pub mod item;
pub mod workspace;
