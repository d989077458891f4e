//! Data Transfer Objects
//!
//! Envelopes used by the workspace REST service around the domain types.

pub mod list;

pub use list::ListResponse;
