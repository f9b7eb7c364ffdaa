// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Evaluation of expression trees against records.
//!
//! Evaluation always yields a definite match/no-match. Type mismatches and
//! absent fields are not errors: they evaluate to `false`, so a caller can
//! keep scanning heterogeneous records without aborting.

use std::cmp::Ordering;

use crate::ast::Expr;
use crate::ops::{CombineOp, CompareOp};
use crate::value::{Record, Value};

/// Walk the tree against a record. Total and terminating; logical
/// combinators short-circuit left to right.
pub fn evaluate(expr: &Expr, record: &Record) -> bool {
	match expr {
		Expr::Restriction { op, left, right } => {
			restriction(*op, left, right.as_deref(), record)
		}
		Expr::Combinator { op, children } => match op {
			CombineOp::And | CombineOp::Sequence => {
				children.iter().all(|child| evaluate(child, record))
			}
			CombineOp::Or => children.iter().any(|child| evaluate(child, record)),
			CombineOp::Not => children
				.first()
				.map(|child| !evaluate(child, record))
				.unwrap_or(false),
			// Value-producing combinators carry no truth value of their own.
			CombineOp::Negate | CombineOp::Index => false,
		},
		Expr::Literal(_) | Expr::Field(_) => false,
	}
}

fn restriction(op: CompareOp, left: &Expr, right: Option<&Expr>, record: &Record) -> bool {
	match op {
		CompareOp::Has => resolve(left, record).is_some(),
		CompareOp::Global => global(left, record),
		CompareOp::Equals => match (resolve(left, record), right.and_then(|r| resolve(r, record))) {
			(Some(a), Some(b)) => value_eq(&a, &b),
			_ => false,
		},
		CompareOp::NotEquals => {
			match (resolve(left, record), right.and_then(|r| resolve(r, record))) {
				(Some(a), Some(b)) => same_class(&a, &b) && !value_eq(&a, &b),
				_ => false,
			}
		}
		CompareOp::Less | CompareOp::LessEquals | CompareOp::Greater | CompareOp::GreaterEquals => {
			match (resolve(left, record), right.and_then(|r| resolve(r, record))) {
				(Some(a), Some(b)) => match ordering(&a, &b) {
					Some(order) => match op {
						CompareOp::Less => order == Ordering::Less,
						CompareOp::LessEquals => order != Ordering::Greater,
						CompareOp::Greater => order == Ordering::Greater,
						_ => order != Ordering::Less,
					},
					None => false,
				},
				_ => false,
			}
		}
	}
}

/// Resolve a value-producing node. `None` means "no value": an absent
/// field, a negation of something non-numeric, an index miss.
fn resolve(expr: &Expr, record: &Record) -> Option<Value> {
	match expr {
		Expr::Literal(value) => Some(value.clone()),
		Expr::Field(path) => record.resolve(path.segments()).cloned(),
		Expr::Combinator { op: CombineOp::Negate, children } => {
			match resolve(children.first()?, record)? {
				Value::Int(n) => Some(Value::Int(-n)),
				Value::Float(n) => Some(Value::Float(-n)),
				_ => None,
			}
		}
		Expr::Combinator { op: CombineOp::Index, children } => {
			let target = resolve(children.first()?, record)?;
			let index = resolve(children.get(1)?, record)?;
			match (target, index) {
				(Value::List(items), Value::Int(i)) => {
					items.get(usize::try_from(i).ok()?).cloned()
				}
				(Value::Map(entries), Value::String(key)) => entries.get(&key).cloned(),
				_ => None,
			}
		}
		_ => None,
	}
}

/// Unanchored existence: a field path matches if it resolves at any nesting
/// level of the record; a string matches any string value containing it
/// (case-insensitive); other literals match by equality anywhere.
fn global(left: &Expr, record: &Record) -> bool {
	match left {
		Expr::Field(path) => {
			let segments = path.segments();
			record.resolve(segments).is_some()
				|| record.values().any(|value| path_anywhere(value, segments))
		}
		Expr::Literal(Value::String(needle)) => {
			let needle = needle.to_lowercase();
			record.values().any(|value| text_anywhere(value, &needle))
		}
		Expr::Literal(needle) => record.values().any(|value| value_anywhere(value, needle)),
		other => resolve(other, record).is_some(),
	}
}

fn path_anywhere(value: &Value, segments: &[String]) -> bool {
	if value.traverse(segments).is_some() {
		return true;
	}
	match value {
		Value::List(items) => items.iter().any(|item| path_anywhere(item, segments)),
		Value::Map(entries) => entries.values().any(|entry| path_anywhere(entry, segments)),
		_ => false,
	}
}

fn text_anywhere(value: &Value, needle: &str) -> bool {
	match value {
		Value::String(text) => text.to_lowercase().contains(needle),
		Value::List(items) => items.iter().any(|item| text_anywhere(item, needle)),
		Value::Map(entries) => entries.values().any(|entry| text_anywhere(entry, needle)),
		_ => false,
	}
}

fn value_anywhere(value: &Value, needle: &Value) -> bool {
	if value_eq(value, needle) {
		return true;
	}
	match value {
		Value::List(items) => items.iter().any(|item| value_anywhere(item, needle)),
		Value::Map(entries) => entries.values().any(|entry| value_anywhere(entry, needle)),
		_ => false,
	}
}

/// Value equality under dynamic typing. Ints and floats compare as one
/// numeric class; everything else must match variants exactly.
fn value_eq(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Null, Value::Null) => true,
		(Value::Bool(x), Value::Bool(y)) => x == y,
		(Value::Int(x), Value::Int(y)) => x == y,
		(Value::Float(x), Value::Float(y)) => x == y,
		(Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => {
			(*x as f64) == *y
		}
		(Value::String(x), Value::String(y)) => x == y,
		(Value::List(x), Value::List(y)) => {
			x.len() == y.len() && x.iter().zip(y).all(|(a, b)| value_eq(a, b))
		}
		(Value::Map(x), Value::Map(y)) => {
			x.len() == y.len()
				&& x.iter()
					.zip(y)
					.all(|((ka, va), (kb, vb))| ka == kb && value_eq(va, vb))
		}
		_ => false,
	}
}

fn same_class(a: &Value, b: &Value) -> bool {
	if a.is_numeric() && b.is_numeric() {
		return true;
	}
	matches!(
		(a, b),
		(Value::Null, Value::Null)
			| (Value::Bool(_), Value::Bool(_))
			| (Value::String(_), Value::String(_))
			| (Value::List(_), Value::List(_))
			| (Value::Map(_), Value::Map(_))
	)
}

/// Ordering is defined for numeric pairs and string pairs only.
fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
	match (a, b) {
		(Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
		(Value::String(x), Value::String(y)) => Some(x.cmp(y)),
		_ if a.is_numeric() && b.is_numeric() => a.as_f64()?.partial_cmp(&b.as_f64()?),
		_ => None,
	}
}
