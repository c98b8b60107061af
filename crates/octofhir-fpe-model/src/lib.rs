//! Editor data model registries
//!
//! This crate provides:
//! - the [`SchemaProvider`] trait consumed by type inference
//! - [`SchemaRegistry`], the default JSON-backed provider
//! - the standard function catalog
//! - [`QuestionnaireItems`], the linkId registry behind answer shortcuts

pub mod functions;
pub mod provider;
pub mod questionnaire;
pub mod registry;
pub mod schema;

pub use functions::*;
pub use provider::*;
pub use questionnaire::*;
pub use registry::*;
