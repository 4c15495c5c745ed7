
// The #[non_exhaustive] attribute applies at the crate-level, and I
// want module-level restrictions, which are far stricter.
#![allow(clippy::manual_non_exhaustive)]

#![warn(clippy::derive_partial_eq_without_eq)]

pub mod driver;
pub mod error;
pub mod errorlist;
pub mod eval;
pub mod format;
pub mod lexer;
pub mod parser;
pub mod result;
pub mod settings;
pub mod source;
pub mod tables;
pub mod util;

pub use driver::{calculate, calculate_with};
pub use error::Error;
pub use result::DocumentResult;
pub use settings::Settings;
