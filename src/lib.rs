//! Lint and breaking-change rules for protobuf API conventions.
//!
//! Descriptors are loaded with [`loader`], converted into the read-only
//! [`descriptor`] tree and checked by the rules in [`rules`]:
//!
//! ```no_run
//! use proto_conventions::{loader, rules::{CheckConfig, CheckEngine}};
//!
//! # fn main() -> proto_conventions::Result<()> {
//! let files = loader::load_proto_files("proto", &["library/v1/library.proto"])?;
//! let result = CheckEngine::new()?.lint(&files, &CheckConfig::default());
//! for annotation in &result.annotations {
//!     println!("{annotation}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod descriptor;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod rules;

pub use error::{Error, Result};
