// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operator taxonomy for the filter language.
//!
//! Surface syntax (`"AND"`, `"<="`, `":"`, ...) is resolved through [`find`]
//! into canonical operators exactly once, at the lexer boundary. Past that
//! boundary the parser and evaluator only ever see the closed enums below,
//! so a newly added operator that is not handled everywhere is a compile
//! error rather than a silent runtime gap.

use std::fmt;

/// Comparison (restriction) operators. A node tagged with one of these is
/// always a leaf: a left operand plus, except for `Global` and `Has`, a
/// right operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
	/// Unanchored match anywhere in the record. Synthesized by the parser
	/// for bare clauses; no surface syntax.
	Global,
	/// Field presence, written `path:`.
	Has,
	Equals,
	NotEquals,
	Less,
	LessEquals,
	Greater,
	GreaterEquals,
}

/// Structural operators. These combine or transform sub-expressions and are
/// never leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombineOp {
	/// Implicit conjunction formed by juxtaposing clauses. Evaluates like
	/// `And`; kept distinct so diagnostics can tell the two apart.
	Sequence,
	And,
	Or,
	Not,
	/// Arithmetic sign negation. Value-producing, so only legal inside a
	/// comparison operand.
	Negate,
	/// Map/list subscript, written `value[index]`.
	Index,
}

/// The union of both operator classes. The classes are disjoint by
/// construction: an `Op` is exactly one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
	Combine(CombineOp),
	Compare(CompareOp),
}

/// Every operator value, for exhaustive table checks.
pub const ALL: [Op; 14] = [
	Op::Combine(CombineOp::Sequence),
	Op::Combine(CombineOp::And),
	Op::Combine(CombineOp::Or),
	Op::Combine(CombineOp::Not),
	Op::Combine(CombineOp::Negate),
	Op::Combine(CombineOp::Index),
	Op::Compare(CompareOp::Global),
	Op::Compare(CompareOp::Has),
	Op::Compare(CompareOp::Equals),
	Op::Compare(CompareOp::NotEquals),
	Op::Compare(CompareOp::Less),
	Op::Compare(CompareOp::LessEquals),
	Op::Compare(CompareOp::Greater),
	Op::Compare(CompareOp::GreaterEquals),
];

/// Resolve surface syntax to its canonical operator.
///
/// Surrounding whitespace is trimmed; the lookup itself is exact and
/// case-sensitive (`"AND"` resolves, `"and"` is an ordinary identifier).
/// Unrecognized text yields `None`, never a coercion.
pub fn find(text: &str) -> Option<Op> {
	match text.trim() {
		"AND" => Some(Op::Combine(CombineOp::And)),
		"OR" => Some(Op::Combine(CombineOp::Or)),
		"NOT" => Some(Op::Combine(CombineOp::Not)),
		"-" => Some(Op::Combine(CombineOp::Negate)),
		"[" => Some(Op::Combine(CombineOp::Index)),
		":" => Some(Op::Compare(CompareOp::Has)),
		"=" => Some(Op::Compare(CompareOp::Equals)),
		"!=" => Some(Op::Compare(CompareOp::NotEquals)),
		"<" => Some(Op::Compare(CompareOp::Less)),
		"<=" => Some(Op::Compare(CompareOp::LessEquals)),
		">" => Some(Op::Compare(CompareOp::Greater)),
		">=" => Some(Op::Compare(CompareOp::GreaterEquals)),
		_ => None,
	}
}

impl Op {
	/// True iff the operator denotes a restriction (a comparison leaf)
	/// rather than a structural combinator. Total over every operator.
	pub fn is_restriction(self) -> bool {
		matches!(self, Op::Compare(_))
	}

	/// Canonical display name, used in diagnostics.
	pub fn name(self) -> &'static str {
		match self {
			Op::Combine(op) => op.name(),
			Op::Compare(op) => op.name(),
		}
	}
}

impl CombineOp {
	pub fn name(self) -> &'static str {
		match self {
			CombineOp::Sequence => "<sequence>",
			CombineOp::And => "AND",
			CombineOp::Or => "OR",
			CombineOp::Not => "NOT",
			CombineOp::Negate => "-",
			CombineOp::Index => "[]",
		}
	}
}

impl CompareOp {
	pub fn name(self) -> &'static str {
		match self {
			CompareOp::Global => "<global>",
			CompareOp::Has => ":",
			CompareOp::Equals => "=",
			CompareOp::NotEquals => "!=",
			CompareOp::Less => "<",
			CompareOp::LessEquals => "<=",
			CompareOp::Greater => ">",
			CompareOp::GreaterEquals => ">=",
		}
	}
}

impl fmt::Display for Op {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl fmt::Display for CombineOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl fmt::Display for CompareOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
