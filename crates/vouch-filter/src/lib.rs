// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Filter expression compiler and evaluator for Vouch occurrence listings.
//!
//! Callers hand the listing API a filter string such as
//! `severity > 5 AND kind = "VULNERABILITY"`; this crate compiles it once
//! into an immutable expression tree and matches it against candidate
//! records:
//!
//! ```
//! use vouch_filter::{compile, Record};
//! use serde_json::json;
//!
//! let filter = compile(r#"severity > 5 AND kind = "VULNERABILITY""#).unwrap();
//! let record = Record::from(json!({"severity": 7, "kind": "VULNERABILITY"}));
//! assert!(filter.matches(&record));
//! ```
//!
//! Compilation is the only fallible step. Evaluation always produces a
//! definite answer: absent fields and type mismatches mean "no match",
//! never an error, so a listing can keep paginating over heterogeneous
//! records. A [`CompiledFilter`] is immutable and safe to share across
//! concurrent evaluations.

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod ops;
pub mod parser;
pub mod value;

use std::str::FromStr;

use tracing::debug;

pub use ast::{Expr, FieldPath};
pub use error::{CompileError, LexError, ParseError};
pub use ops::{find, CombineOp, CompareOp, Op};
pub use value::{Record, Value};

/// A successfully compiled filter: one immutable expression tree plus the
/// original query text for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
	root: Expr,
	source: String,
}

/// Compile a filter query into a reusable [`CompiledFilter`].
///
/// The empty (or all-whitespace) query compiles to a filter that matches
/// every record, so an absent filter parameter behaves as "no restriction".
pub fn compile(query: &str) -> Result<CompiledFilter, CompileError> {
	let tokens = lexer::tokenize(query)?;
	let root = parser::parse(&tokens, query.len())?;
	debug!(filter = query, "compiled filter expression");
	Ok(CompiledFilter {
		root,
		source: query.to_string(),
	})
}

impl CompiledFilter {
	/// Evaluate the filter against one record.
	pub fn matches(&self, record: &Record) -> bool {
		eval::evaluate(&self.root, record)
	}

	/// The original query text.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// The root of the compiled expression tree.
	pub fn root(&self) -> &Expr {
		&self.root
	}
}

impl FromStr for CompiledFilter {
	type Err = CompileError;

	fn from_str(query: &str) -> Result<Self, Self::Err> {
		compile(query)
	}
}
