//! Core types shared across the crate.
//!
//! Currently this module hosts the error taxonomy. Domain types live next
//! to the component that owns them: catalog records in [`crate::catalog`],
//! resolution results in [`crate::resolver`], plans in [`crate::planner`],
//! and persisted state in [`crate::tracker`].

pub mod error;

pub use error::AicmError;
