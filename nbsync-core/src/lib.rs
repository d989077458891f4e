//! nbsync Core
//!
//! Core types shared by the nbsync crates.
//!
//! This crate contains:
//! - Domain types: workspace context, notebook items, folders and item definitions
//! - DTOs: envelopes returned by the workspace REST service

pub mod domain;
pub mod dto;

pub use domain::definition::{DefinitionPart, DefinitionResponse, ItemDefinition, OperationStatus};
pub use domain::item::{Folder, Resource};
pub use domain::workspace::WorkspaceContext;
