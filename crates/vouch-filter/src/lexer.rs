// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tokenization of raw filter text.
//!
//! The lexer produces a flat token sequence in source order, each token
//! carrying its starting byte offset. It fails fast: the first character no
//! token can start with terminates lexing with a [`LexError`], no recovery.

use std::fmt;

use winnow::ascii::multispace0;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_while;

use crate::error::LexError;
use crate::ops::{self, Op};

/// Symbolic operator spellings, longest first so `<=` wins over `<`.
const SYMBOLS: [&str; 8] = ["<=", ">=", "!=", "<", ">", "=", ":", "-"];

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
	/// A full dot-separated field path, e.g. `resource.labels.env`.
	Ident(String),
	Str(String),
	Int(i64),
	Float(f64),
	Bool(bool),
	Null,
	/// An operator keyword or symbol, resolved through the operator table.
	Op(Op),
	LParen,
	RParen,
	LBracket,
	RBracket,
	Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	/// Byte offset of the token's first character in the source text.
	pub offset: usize,
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenKind::Ident(name) => write!(f, "identifier '{name}'"),
			TokenKind::Str(text) => write!(f, "string \"{text}\""),
			TokenKind::Int(value) => write!(f, "integer {value}"),
			TokenKind::Float(value) => write!(f, "number {value}"),
			TokenKind::Bool(value) => write!(f, "'{value}'"),
			TokenKind::Null => f.write_str("'null'"),
			TokenKind::Op(op) => write!(f, "'{op}'"),
			TokenKind::LParen => f.write_str("'('"),
			TokenKind::RParen => f.write_str("')'"),
			TokenKind::LBracket => f.write_str("'['"),
			TokenKind::RBracket => f.write_str("']'"),
			TokenKind::Comma => f.write_str("','"),
		}
	}
}

/// Tokenize a filter source string.
pub fn tokenize(query: &str) -> Result<Vec<Token>, LexError> {
	let mut rest = query;
	let mut tokens = Vec::new();
	loop {
		skip_whitespace(&mut rest);
		let Some(first) = rest.chars().next() else {
			break;
		};
		let offset = query.len() - rest.len();
		let kind = next_token(&mut rest, first, offset)?;
		tokens.push(Token { kind, offset });
	}
	Ok(tokens)
}

fn skip_whitespace(input: &mut &str) {
	let _: Result<&str, ContextError> = multispace0.parse_next(input);
}

fn next_token(input: &mut &str, first: char, offset: usize) -> Result<TokenKind, LexError> {
	match first {
		'(' => {
			*input = &input[1..];
			Ok(TokenKind::LParen)
		}
		')' => {
			*input = &input[1..];
			Ok(TokenKind::RParen)
		}
		'[' => {
			*input = &input[1..];
			Ok(TokenKind::LBracket)
		}
		']' => {
			*input = &input[1..];
			Ok(TokenKind::RBracket)
		}
		',' => {
			*input = &input[1..];
			Ok(TokenKind::Comma)
		}
		'"' | '\'' => lex_string(input, first, offset),
		c if c.is_ascii_digit() => lex_number(input, false, offset),
		'-' if input[1..].starts_with(|c: char| c.is_ascii_digit()) => {
			*input = &input[1..];
			lex_number(input, true, offset)
		}
		c if is_ident_start(c) => Ok(lex_ident(input)),
		_ => lex_symbol(input, first, offset),
	}
}

fn lex_symbol(input: &mut &str, first: char, offset: usize) -> Result<TokenKind, LexError> {
	for symbol in SYMBOLS {
		if input.starts_with(symbol) {
			if let Some(op) = ops::find(symbol) {
				*input = &input[symbol.len()..];
				return Ok(TokenKind::Op(op));
			}
		}
	}
	Err(LexError {
		offset,
		found: format!("'{first}'"),
	})
}

fn is_ident_start(c: char) -> bool {
	c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_'
}

fn lex_ident(input: &mut &str) -> TokenKind {
	let mut text = String::new();
	while let Ok(segment) = ident_segment(input) {
		text.push_str(segment);
		if input.starts_with('.') && input[1..].starts_with(is_ident_char) {
			*input = &input[1..];
			text.push('.');
		} else {
			break;
		}
	}
	match text.as_str() {
		"true" => TokenKind::Bool(true),
		"false" => TokenKind::Bool(false),
		"null" => TokenKind::Null,
		_ => match ops::find(&text) {
			Some(op) => TokenKind::Op(op),
			None => TokenKind::Ident(text),
		},
	}
}

fn ident_segment<'a>(input: &mut &'a str) -> Result<&'a str, ContextError> {
	take_while(1.., is_ident_char).parse_next(input)
}

fn lex_number(input: &mut &str, negative: bool, offset: usize) -> Result<TokenKind, LexError> {
	let malformed = |_: ContextError| LexError {
		offset,
		found: "malformed numeric literal".to_string(),
	};
	let sign = if negative { "-" } else { "" };

	if input.starts_with("0x") || input.starts_with("0X") {
		*input = &input[2..];
		let digits = take_while(1.., |c: char| c.is_ascii_hexdigit())
			.parse_next(input)
			.map_err(malformed)?;
		return i64::from_str_radix(&format!("{sign}{digits}"), 16)
			.map(TokenKind::Int)
			.map_err(|_| LexError {
				offset,
				found: "integer literal out of range".to_string(),
			});
	}

	let whole = take_while(1.., |c: char| c.is_ascii_digit())
		.parse_next(input)
		.map_err(malformed)?;

	if input.starts_with('.') {
		*input = &input[1..];
		let frac: &str = take_while(0.., |c: char| c.is_ascii_digit())
			.parse_next(input)
			.map_err(malformed)?;
		let text = format!("{sign}{whole}.{frac}");
		return text.parse::<f64>().map(TokenKind::Float).map_err(|_| LexError {
			offset,
			found: "malformed numeric literal".to_string(),
		});
	}

	format!("{sign}{whole}")
		.parse::<i64>()
		.map(TokenKind::Int)
		.map_err(|_| LexError {
			offset,
			found: "integer literal out of range".to_string(),
		})
}

fn lex_string(input: &mut &str, quote: char, offset: usize) -> Result<TokenKind, LexError> {
	let mut chars = input.char_indices();
	chars.next();
	let mut text = String::new();
	let mut escaped = false;
	for (at, c) in chars {
		if escaped {
			if c == quote || c == '\\' {
				text.push(c);
				escaped = false;
			} else {
				return Err(LexError {
					offset,
					found: format!("unsupported escape '\\{c}'"),
				});
			}
		} else if c == '\\' {
			escaped = true;
		} else if c == quote {
			*input = &input[at + 1..];
			return Ok(TokenKind::Str(text));
		} else {
			text.push(c);
		}
	}
	Err(LexError {
		offset,
		found: "unterminated string literal".to_string(),
	})
}
