// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Typed values and the records filters are evaluated against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A dynamically typed value held by a record field.
///
/// The variant set is closed so comparison logic can match exhaustively;
/// there is deliberately no open "any" escape hatch. `Int` and `Float`
/// form a single numeric class for comparison purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	List(Vec<Value>),
	Map(BTreeMap<String, Value>),
}

impl Value {
	/// Walk nested maps along `segments`. An empty slice yields `self`.
	pub(crate) fn traverse(&self, segments: &[String]) -> Option<&Value> {
		let mut current = self;
		for segment in segments {
			match current {
				Value::Map(entries) => current = entries.get(segment)?,
				_ => return None,
			}
		}
		Some(current)
	}

	pub(crate) fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Int(n) => Some(*n as f64),
			Value::Float(n) => Some(*n),
			_ => None,
		}
	}

	pub(crate) fn is_numeric(&self) -> bool {
		matches!(self, Value::Int(_) | Value::Float(_))
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value)
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Value::Null,
			serde_json::Value::Bool(b) => Value::Bool(b),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => Value::Int(i),
				None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
			},
			serde_json::Value::String(s) => Value::String(s),
			serde_json::Value::Array(items) => {
				Value::List(items.into_iter().map(Value::from).collect())
			}
			serde_json::Value::Object(entries) => Value::Map(
				entries
					.into_iter()
					.map(|(key, value)| (key, Value::from(value)))
					.collect(),
			),
		}
	}
}

/// A read-only mapping from field name to typed value: the unit a compiled
/// filter is matched against. The engine never mutates a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
		self.0.insert(field.into(), value.into());
	}

	pub fn get(&self, field: &str) -> Option<&Value> {
		self.0.get(field)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Resolve a dotted field path against the record, walking nested maps.
	/// Absent paths are `None`, never an error.
	pub fn resolve(&self, segments: &[String]) -> Option<&Value> {
		let (first, rest) = segments.split_first()?;
		self.0.get(first)?.traverse(rest)
	}

	pub(crate) fn values(&self) -> impl Iterator<Item = &Value> {
		self.0.values()
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Record(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

impl From<serde_json::Value> for Record {
	/// Object roots become records field by field; any other JSON root
	/// converts to the empty record.
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Object(entries) => entries
				.into_iter()
				.map(|(key, value)| (key, Value::from(value)))
				.collect(),
			_ => Record::new(),
		}
	}
}
