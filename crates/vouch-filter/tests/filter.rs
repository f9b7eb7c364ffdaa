// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end behavior of the compile/match pipeline.

use proptest::prelude::*;
use serde_json::json;
use vouch_filter::{compile, ops, CompiledFilter, Record, Value};

fn record(json: serde_json::Value) -> Record {
	Record::from(json)
}

#[test]
fn empty_query_matches_every_record() {
	let filter = compile("").unwrap();
	assert!(filter.matches(&Record::new()));
	assert!(filter.matches(&record(json!({"anything": [1, 2, 3]}))));
}

#[test]
fn operator_table_round_trip() {
	use vouch_filter::{CombineOp, CompareOp, Op};

	assert_eq!(ops::find("AND"), Some(Op::Combine(CombineOp::And)));
	assert_eq!(ops::find(" = "), Some(Op::Compare(CompareOp::Equals)));
	assert_eq!(ops::find("<="), Some(Op::Compare(CompareOp::LessEquals)));
	assert_eq!(ops::find("bogus"), None);
}

#[test]
fn restriction_classification_is_total_and_disjoint() {
	for op in ops::ALL {
		let restriction = matches!(op, vouch_filter::Op::Compare(_));
		assert_eq!(op.is_restriction(), restriction);
		assert_ne!(restriction, matches!(op, vouch_filter::Op::Combine(_)));
	}
}

#[test]
fn short_circuit_skips_the_unresolvable_side() {
	// `a` is false, so the right conjunct (whose field does not exist)
	// must never need to resolve.
	let filter = compile("a = 1 AND missing.deep = \"x\"").unwrap();
	let r = record(json!({"a": 2}));
	assert!(!filter.matches(&r));

	let filter = compile("a = 2 OR missing.deep = \"x\"").unwrap();
	assert!(filter.matches(&r));
}

#[test]
fn string_and_number_never_compare_equal() {
	let filter = compile(r#"field = "5""#).unwrap();
	assert!(!filter.matches(&record(json!({"field": 5}))));
	assert!(filter.matches(&record(json!({"field": "5"}))));
}

#[test]
fn precedence_vs_explicit_parentheses() {
	// AND binds tighter, so this is A OR (B AND C).
	let defaulted = compile("a = 1 OR b = 1 AND c = 1").unwrap();
	let grouped = compile("(a = 1 OR b = 1) AND c = 1").unwrap();
	let r = record(json!({"a": 1, "b": 0, "c": 0}));

	assert!(defaulted.matches(&r));
	assert!(!grouped.matches(&r));
}

#[test]
fn has_and_equals_agree_on_presence() {
	let zero = record(json!({"x": 0}));
	assert!(compile("x:").unwrap().matches(&zero));
	assert!(compile("x = 0").unwrap().matches(&zero));

	let empty = Record::new();
	assert!(!compile("x:").unwrap().matches(&empty));
	assert!(!compile("x = 0").unwrap().matches(&empty));
}

#[test]
fn hex_literals_compare_as_integers() {
	let filter = compile("mask = 0x20").unwrap();
	assert!(filter.matches(&record(json!({"mask": 32}))));
}

#[test]
fn lex_failures_report_byte_offsets() {
	assert_eq!(compile("a = \"unterminated").unwrap_err().offset(), 4);
	assert_eq!(compile("ok = 1 AND ^").unwrap_err().offset(), 11);
	assert_eq!(compile(r#"a = "bad\escape""#).unwrap_err().offset(), 4);
}

#[test]
fn compiled_filters_are_shareable_across_threads() {
	let filter = std::sync::Arc::new(compile("severity >= 5").unwrap());
	let records: Vec<Record> = (0..8)
		.map(|n| record(json!({"severity": n})))
		.collect();

	let handles: Vec<_> = records
		.into_iter()
		.map(|r| {
			let filter = std::sync::Arc::clone(&filter);
			std::thread::spawn(move || filter.matches(&r))
		})
		.collect();

	let outcomes: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
	assert_eq!(outcomes.iter().filter(|hit| **hit).count(), 3);
}

/// A pool of well-formed queries for determinism checks.
fn arb_query() -> impl Strategy<Value = &'static str> {
	prop_oneof![
		Just(""),
		Just("severity > 5"),
		Just(r#"kind = "VULNERABILITY""#),
		Just("severity > 5 AND kind = \"VULNERABILITY\""),
		Just("a = 1 OR b = 2 AND c = 3"),
		Just("NOT severity < 3"),
		Just("resource.labels.env = \"prod\""),
		Just("tags[0] = \"critical\""),
		Just("x: y = 2"),
		Just("\"needle\""),
	]
}

fn arb_record() -> impl Strategy<Value = Record> {
	let value = prop_oneof![
		any::<i64>().prop_map(Value::Int),
		any::<bool>().prop_map(Value::Bool),
		r"[a-zA-Z]{0,6}".prop_map(Value::String),
	];
	proptest::collection::btree_map(r"[a-c]", value, 0..4)
		.prop_map(|entries| entries.into_iter().collect())
}

proptest! {
	/// Compiling the same query twice yields filters that agree on every
	/// record.
	#[test]
	fn compile_is_deterministic(query in arb_query(), record in arb_record()) {
		let first = compile(query).unwrap();
		let second: CompiledFilter = query.parse().unwrap();
		prop_assert_eq!(first.root(), second.root());
		prop_assert_eq!(first.matches(&record), second.matches(&record));
	}

	/// Whatever the record, evaluation terminates with a definite answer
	/// and never panics.
	#[test]
	fn evaluation_is_total(query in arb_query(), record in arb_record()) {
		let filter = compile(query).unwrap();
		let _ = filter.matches(&record);
	}
}
