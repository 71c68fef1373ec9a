#![allow(clippy::result_large_err)]
//! topping-core: topping requirement compiler and valuation engine.
//!
//! Turns a YAML requirements document into one immutable
//! [`CompiledRequirements`] per cookie, and defines how toppings and
//! five-topping sets are valued and bounded for an outer search.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`compile_document()`] -- normalize and compile every cookie
//! - [`RequirementsDocument`] -- serde model of the document
//! - [`Requirements`] / [`CompiledRequirements`] -- per-cookie requirements
//!   before and after [`Requirements::realize`]
//! - [`Topping`], [`ToppingSet`], [`best_possible_set_effect()`] -- item
//!   model and the admissible set-bonus bound
//! - [`CompileError`], [`DocumentError`], [`ToppingError`] -- error types

pub mod catalog;
pub mod compile;
pub mod constraint;
pub mod cookies;
pub mod document;
pub mod error;
pub mod modifiers;
pub mod objective;
pub mod requirements;
pub mod topping;

// ── Convenience re-exports: key types ────────────────────────────────

pub use catalog::{Resonance, StatInfo, StatKind, TOPPING_STATS};
pub use constraint::{Bound, BoundOp, Constraint, Equality};
pub use cookies::{CookieDirectory, EmptyDirectory, MapDirectory};
pub use document::{NormalizeOptions, RequirementsDocument};
pub use error::{CompileError, DocumentError, ToppingError};
pub use modifiers::{BaselineTable, Modifiers};
pub use objective::Objective;
pub use requirements::{CompiledRequirements, Requirements, SiblingStats, SiblingTable};
pub use topping::{best_possible_set_effect, Topping, ToppingSet};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::{compile_document, Compilation};
