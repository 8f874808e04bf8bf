//! flowstore - git-friendly flow storage
//!
//! Persists an ordered collection of dataflow node records as individual,
//! human-diffable text files instead of one monolithic document, so that
//! version control produces meaningful per-node diffs.
//!
//! # Architecture
//!
//! - [`codec`] - bidirectional record ↔ document codec (escape, encode,
//!   parse)
//! - [`sync`] - directory synchronizer, atomic file collaborators, content
//!   hashing
//! - [`store`] - the `FlowStore` facade (flows, snapshot fallback,
//!   credentials)
//! - [`model`] - the `Record` type and its field conventions
//! - [`config`] - configuration inputs and the frozen resolved layout
//! - [`cli`] - command-line interface using clap
//! - [`error`] - error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
