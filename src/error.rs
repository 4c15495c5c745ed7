
//! Top-level crate error: construction-time failures only (malformed
//! bundled data). Per-line lexer/parser/runtime errors never
//! propagate through this type — they are collected into an
//! [`crate::errorlist::ErrorList`] and attached to the line instead.
//! Grounded on the teacher's own `error.rs`, which composes
//! `StackError`/`TauriError` into one top-level enum the same way,
//! via `#[from]`.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
  #[error("failed to load bundled data: {0}")]
  DataLoad(#[from] serde_json::Error),
}
