// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Precedence-climbing parser from token sequences to expression trees.
//!
//! Binding strength, weakest to tightest: juxtaposition/`OR` (one tier,
//! left-associative), `AND`, prefix `NOT`, comparisons, postfix `[...]`,
//! atoms. Juxtaposed clauses fold into an n-ary `Sequence`; a bare
//! comparable at boolean position becomes a `Global` restriction, the way
//! unanchored search clauses are written.

use crate::ast::Expr;
use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};
use crate::ops::{CombineOp, CompareOp, Op};

/// Parse a token sequence into a single expression tree. `end_offset` is
/// the byte length of the source, reported when input ends prematurely.
pub fn parse(tokens: &[Token], end_offset: usize) -> Result<Expr, ParseError> {
	let mut parser = Parser {
		tokens,
		pos: 0,
		end_offset,
	};
	if parser.at_end() {
		return Ok(Expr::match_all());
	}
	let expr = parser.expression()?;
	if !parser.at_end() {
		return Err(parser.error("end of input"));
	}
	Ok(expr)
}

struct Parser<'a> {
	tokens: &'a [Token],
	pos: usize,
	end_offset: usize,
}

impl Parser<'_> {
	// Juxtaposition and OR share the weakest tier, left-associative.
	fn expression(&mut self) -> Result<Expr, ParseError> {
		let mut node = self.conjunction()?;
		loop {
			if self.eat_combine(CombineOp::Or) {
				let right = self.conjunction()?;
				node = Expr::or(node, right);
			} else if self.at_clause_start() {
				let mut children = vec![node];
				while self.at_clause_start() {
					children.push(self.conjunction()?);
				}
				node = Expr::sequence(children);
			} else {
				break;
			}
		}
		Ok(node)
	}

	fn conjunction(&mut self) -> Result<Expr, ParseError> {
		let mut node = self.unary()?;
		while self.eat_combine(CombineOp::And) {
			let right = self.unary()?;
			node = Expr::and(node, right);
		}
		Ok(node)
	}

	fn unary(&mut self) -> Result<Expr, ParseError> {
		if self.eat_combine(CombineOp::Not) {
			let child = self.unary()?;
			return Ok(Expr::not(child));
		}
		if self.peek_is_combine(CombineOp::Negate) {
			// Sign negation produces a value, not a truth value; it only
			// belongs inside a comparison operand.
			return Err(self.error("a filter clause"));
		}
		self.restriction()
	}

	fn restriction(&mut self) -> Result<Expr, ParseError> {
		let left = self.comparable()?;
		if let Some(op) = self.take_compare_op() {
			if op == CompareOp::Has {
				return Ok(Expr::has(left));
			}
			let right = self.comparable()?;
			return Ok(Expr::restriction(op, left, right));
		}
		if left.is_boolean() {
			return Ok(left);
		}
		Ok(Expr::global(left))
	}

	fn comparable(&mut self) -> Result<Expr, ParseError> {
		if self.eat_combine(CombineOp::Negate) {
			let operand = self.comparable()?;
			return Ok(Expr::negate(operand));
		}
		let mut node = self.primary()?;
		while self.eat_kind(&TokenKind::LBracket) {
			let index = self.comparable()?;
			self.expect_kind(&TokenKind::RBracket, "']'")?;
			node = Expr::index(node, index);
		}
		Ok(node)
	}

	fn primary(&mut self) -> Result<Expr, ParseError> {
		let Some(token) = self.peek() else {
			return Err(self.error("a literal, field reference, or '('"));
		};
		let expr = match &token.kind {
			TokenKind::Ident(name) => Expr::field(name.as_str()),
			TokenKind::Str(text) => Expr::literal(text.as_str()),
			TokenKind::Int(value) => Expr::literal(*value),
			TokenKind::Float(value) => Expr::literal(*value),
			TokenKind::Bool(value) => Expr::literal(*value),
			TokenKind::Null => Expr::Literal(crate::value::Value::Null),
			TokenKind::LParen => {
				self.advance();
				let inner = self.expression()?;
				self.expect_kind(&TokenKind::RParen, "')'")?;
				return Ok(inner);
			}
			_ => return Err(self.error("a literal, field reference, or '('")),
		};
		self.advance();
		Ok(expr)
	}

	fn at_clause_start(&self) -> bool {
		matches!(
			self.peek().map(|t| &t.kind),
			Some(
				TokenKind::Ident(_)
					| TokenKind::Str(_)
					| TokenKind::Int(_)
					| TokenKind::Float(_)
					| TokenKind::Bool(_)
					| TokenKind::Null
					| TokenKind::LParen
					| TokenKind::Op(Op::Combine(CombineOp::Not | CombineOp::Negate))
			)
		)
	}

	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos)
	}

	fn at_end(&self) -> bool {
		self.pos >= self.tokens.len()
	}

	fn advance(&mut self) {
		self.pos += 1;
	}

	fn peek_is_combine(&self, op: CombineOp) -> bool {
		matches!(
			self.peek().map(|t| &t.kind),
			Some(TokenKind::Op(Op::Combine(found))) if *found == op
		)
	}

	fn eat_combine(&mut self, op: CombineOp) -> bool {
		if self.peek_is_combine(op) {
			self.advance();
			true
		} else {
			false
		}
	}

	fn take_compare_op(&mut self) -> Option<CompareOp> {
		match self.peek().map(|t| &t.kind) {
			Some(TokenKind::Op(Op::Compare(op))) => {
				let op = *op;
				self.advance();
				Some(op)
			}
			_ => None,
		}
	}

	fn eat_kind(&mut self, kind: &TokenKind) -> bool {
		if self.peek().map(|t| &t.kind) == Some(kind) {
			self.advance();
			true
		} else {
			false
		}
	}

	fn expect_kind(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
		if self.eat_kind(kind) {
			Ok(())
		} else {
			Err(self.error(expected))
		}
	}

	fn error(&self, expected: &str) -> ParseError {
		match self.peek() {
			Some(token) => ParseError {
				offset: token.offset,
				expected: expected.to_string(),
				found: token.kind.to_string(),
			},
			None => ParseError {
				offset: self.end_offset,
				expected: expected.to_string(),
				found: "end of input".to_string(),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::lexer::tokenize;
	use crate::value::Value;

	fn parse_str(query: &str) -> Result<Expr, ParseError> {
		parse(&tokenize(query).unwrap(), query.len())
	}

	fn eq(field: &str, value: impl Into<Value>) -> Expr {
		Expr::restriction(CompareOp::Equals, Expr::field(field), Expr::Literal(value.into()))
	}

	#[test]
	fn empty_input_matches_everything() {
		assert_eq!(parse_str("").unwrap(), Expr::match_all());
		assert_eq!(parse_str("   ").unwrap(), Expr::match_all());
	}

	#[test]
	fn single_comparison() {
		assert_eq!(parse_str("a = 1").unwrap(), eq("a", Value::Int(1)));
	}

	#[test]
	fn and_binds_tighter_than_or() {
		let tree = parse_str("a = 1 OR b = 2 AND c = 3").unwrap();
		assert_eq!(
			tree,
			Expr::or(
				eq("a", Value::Int(1)),
				Expr::and(eq("b", Value::Int(2)), eq("c", Value::Int(3))),
			)
		);
	}

	#[test]
	fn parentheses_override_precedence() {
		let tree = parse_str("(a = 1 OR b = 2) AND c = 3").unwrap();
		assert_eq!(
			tree,
			Expr::and(
				Expr::or(eq("a", Value::Int(1)), eq("b", Value::Int(2))),
				eq("c", Value::Int(3)),
			)
		);
	}

	#[test]
	fn juxtaposed_clauses_fold_into_a_sequence() {
		let tree = parse_str("a = 1 b = 2 c = 3").unwrap();
		assert_eq!(
			tree,
			Expr::sequence(vec![
				eq("a", Value::Int(1)),
				eq("b", Value::Int(2)),
				eq("c", Value::Int(3)),
			])
		);
	}

	#[test]
	fn juxtaposition_and_or_share_a_tier() {
		let tree = parse_str("a = 1 b = 2 OR c = 3").unwrap();
		assert_eq!(
			tree,
			Expr::or(
				Expr::sequence(vec![eq("a", Value::Int(1)), eq("b", Value::Int(2))]),
				eq("c", Value::Int(3)),
			)
		);
	}

	#[test]
	fn bare_terms_become_global_restrictions() {
		assert_eq!(
			parse_str("connected").unwrap(),
			Expr::global(Expr::field("connected"))
		);
		assert_eq!(
			parse_str(r#""needle""#).unwrap(),
			Expr::global(Expr::literal("needle"))
		);
	}

	#[test]
	fn has_takes_no_right_operand() {
		assert_eq!(
			parse_str("resource.uri:").unwrap(),
			Expr::has(Expr::field("resource.uri"))
		);
	}

	#[test]
	fn not_applies_to_the_whole_comparison() {
		assert_eq!(
			parse_str("NOT a = 1").unwrap(),
			Expr::not(eq("a", Value::Int(1)))
		);
	}

	#[test]
	fn negate_is_legal_inside_an_operand() {
		assert_eq!(
			parse_str("a = -b").unwrap(),
			Expr::restriction(
				CompareOp::Equals,
				Expr::field("a"),
				Expr::negate(Expr::field("b")),
			)
		);
	}

	#[test]
	fn negate_at_clause_position_is_rejected() {
		let err = parse_str("a = 1 AND - b").unwrap_err();
		assert_eq!(err.offset, 10);
		assert_eq!(err.found, "'-'");
	}

	#[test]
	fn index_parses_nested() {
		let tree = parse_str("tags[0] = \"x\"").unwrap();
		assert_eq!(
			tree,
			Expr::restriction(
				CompareOp::Equals,
				Expr::index(Expr::field("tags"), Expr::literal(0i64)),
				Expr::literal("x"),
			)
		);
		let nested = parse_str("m[keys[0]]:").unwrap();
		assert_eq!(
			nested,
			Expr::has(Expr::index(
				Expr::field("m"),
				Expr::index(Expr::field("keys"), Expr::literal(0i64)),
			))
		);
	}

	#[test]
	fn unmatched_parenthesis_is_an_error() {
		let err = parse_str("(a = 1").unwrap_err();
		assert_eq!(err.offset, 6);
		assert_eq!(err.expected, "')'");
		assert_eq!(err.found, "end of input");

		let err = parse_str("a = 1)").unwrap_err();
		assert_eq!(err.offset, 5);
		assert_eq!(err.expected, "end of input");
	}

	#[test]
	fn dangling_operator_is_an_error() {
		let err = parse_str("a =").unwrap_err();
		assert_eq!(err.found, "end of input");
		assert!(parse_str("AND a = 1").is_err());
	}

	#[test]
	fn unmatched_bracket_is_an_error() {
		let err = parse_str("tags[0 = 1").unwrap_err();
		assert_eq!(err.expected, "']'");
	}
}
