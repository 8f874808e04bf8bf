//! Data model for flowstore.
//!
//! A flow is an ordered collection of [`Record`]s. Each record is an
//! insertion-ordered field map with two required fields (`id`, `type`),
//! optional multi-line text fields, optional script-body fields, and
//! arbitrary pass-through fields owned by the editor runtime.

pub mod record;

pub use record::{Record, BASE_PARAMS, ORDER_KEY, SCRIPT_FIELDS, TEXT_FIELDS};
