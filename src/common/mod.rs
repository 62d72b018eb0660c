//! Common types, traits, and error definitions for push_planner
//!
//! This module provides the data model shared by the planner and the
//! validator.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
