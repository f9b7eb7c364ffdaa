// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Malformed surface syntax: an unterminated string literal, an unsupported
/// escape, or a character no token starts with. `offset` is the byte offset
/// of the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lex error at byte {offset}: {found}")]
pub struct LexError {
	pub offset: usize,
	pub found: String,
}

/// Well-tokenized but structurally invalid input, reported against the
/// offending token's byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at byte {offset}: expected {expected}, found {found}")]
pub struct ParseError {
	pub offset: usize,
	pub expected: String,
	pub found: String,
}

/// Compilation failure: either stage, never a partially built filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
	#[error(transparent)]
	Lex(#[from] LexError),

	#[error(transparent)]
	Parse(#[from] ParseError),
}

impl CompileError {
	/// Byte offset of the failure within the original query text.
	pub fn offset(&self) -> usize {
		match self {
			CompileError::Lex(err) => err.offset,
			CompileError::Parse(err) => err.offset,
		}
	}
}
