//! Lexer: turns a [`Source`] into a flat `Vec<Token>` with spans attached.
//!
//! The whole source is tokenized eagerly rather than lazily streamed; the
//! parser consumes the resulting slice with simple index-based lookahead,
//! which keeps backtracking (used heavily by the Pratt expression parser)
//! trivial to reason about.

mod cursor;
pub mod token;

pub use cursor::Cursor;
pub use token::{FStringPart, Keyword, Token, TokenKind};

use crate::error::{Result, SafulateError};
use crate::span::{Source, Span};

const PUNCTUATORS: &[&str] = &["(", ")", "[", "]", "{", "}", ";", ",", ".", ":", "@"];

/// Longest match first so `...` isn't lexed as three `.` punctuators etc.
const OPERATORS: &[&str] = &[
	"...", "->", "**", "==", "!=", ">=", "<=", "&&", "||", "..", "+", "-", "*", "/", "!", "&", "|",
	"=", "~", ">", "<", "\\",
];

pub struct Lexer<'a> {
	source: &'a Source,
	cursor: Cursor<'a>,
}

pub fn tokenize(source: &Source) -> Result<Vec<Token>> {
	let mut lexer = Lexer {
		source,
		cursor: Cursor::new(&source.text),
	};
	lexer.run()
}

impl<'a> Lexer<'a> {
	fn run(&mut self) -> Result<Vec<Token>> {
		let mut tokens = Vec::new();
		loop {
			self.skip_trivia();
			let start = self.cursor.pos;
			let Some(c) = self.cursor.peek() else {
				tokens.push(self.token(TokenKind::Eof, start, String::new()));
				break;
			};

			let kind = if c == '"' || (c == 'f' && self.cursor.peek_at(1) == Some('"')) {
				self.lex_string()?
			} else if c.is_ascii_digit() {
				self.lex_number()
			} else if is_ident_start(c) {
				self.lex_identifier()
			} else if let Some(op) = self.try_match(OPERATORS) {
				TokenKind::Op(op)
			} else if let Some(p) = self.try_match(PUNCTUATORS) {
				TokenKind::Punct(p)
			} else {
				let span = self.span_from(start);
				return Err(SafulateError::Lexical(span, format!("unexpected character '{c}'")));
			};

			let text = self.source.text[start.offset..self.cursor.pos.offset].to_string();
			tokens.push(self.token(kind, start, text));
		}
		Ok(tokens)
	}

	fn token(&self, kind: TokenKind, start: crate::span::Pos, text: String) -> Token {
		Token {
			kind,
			text,
			span: self.span_from(start),
		}
	}

	fn span_from(&self, start: crate::span::Pos) -> Span {
		Span::new(self.source.name.clone(), start, self.cursor.pos)
	}

	fn skip_trivia(&mut self) {
		loop {
			match self.cursor.peek() {
				Some(c) if c.is_whitespace() => {
					self.cursor.read();
				}
				Some('#') => {
					while let Some(c) = self.cursor.peek() {
						if c == '\n' {
							break;
						}
						self.cursor.read();
					}
				}
				_ => break,
			}
		}
	}

	fn try_match(&mut self, candidates: &[&'static str]) -> Option<&'static str> {
		for &candidate in candidates {
			let save = self.cursor;
			let mut ok = true;
			for expected in candidate.chars() {
				if !self.cursor.read_if(expected) {
					ok = false;
					break;
				}
			}
			if ok {
				return Some(candidate);
			}
			self.cursor = save;
		}
		None
	}

	fn lex_number(&mut self) -> TokenKind {
		let start = self.cursor.pos;
		while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
			self.cursor.read();
		}
		if self.cursor.peek() == Some('.') && matches!(self.cursor.peek_at(1), Some(c) if c.is_ascii_digit()) {
			self.cursor.read();
			while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
				self.cursor.read();
			}
		}
		if matches!(self.cursor.peek(), Some('e') | Some('E')) {
			let save = self.cursor;
			self.cursor.read();
			if matches!(self.cursor.peek(), Some('+') | Some('-')) {
				self.cursor.read();
			}
			if matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
				while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
					self.cursor.read();
				}
			} else {
				self.cursor = save;
			}
		}
		let text = &self.source.text[start.offset..self.cursor.pos.offset];
		TokenKind::Number(text.parse().unwrap_or(f64::NAN))
	}

	fn lex_identifier(&mut self) -> TokenKind {
		let start = self.cursor.pos;
		while matches!(self.cursor.peek(), Some(c) if is_ident_continue(c)) {
			self.cursor.read();
		}
		let text = &self.source.text[start.offset..self.cursor.pos.offset];
		match Keyword::lookup(text) {
			Some(kw) => TokenKind::Keyword(kw),
			None => TokenKind::Identifier,
		}
	}

	fn lex_string(&mut self) -> Result<TokenKind> {
		let is_fstring = self.cursor.peek() == Some('f');
		if is_fstring {
			self.cursor.read();
		}
		let quote_start = self.cursor.pos;
		self.cursor.read(); // opening quote

		if is_fstring {
			let parts = self.lex_fstring_body(quote_start)?;
			Ok(TokenKind::FString(parts))
		} else {
			let text = self.lex_plain_string_body(quote_start)?;
			Ok(TokenKind::String(text))
		}
	}

	fn lex_plain_string_body(&mut self, quote_start: crate::span::Pos) -> Result<String> {
		let mut out = String::new();
		loop {
			match self.cursor.read() {
				None => {
					let span = self.span_from(quote_start);
					return Err(SafulateError::Lexical(span, "unterminated string literal".into()));
				}
				Some('"') => break,
				Some('\\') => out.push(self.read_escape(quote_start)?),
				Some(c) => out.push(c),
			}
		}
		Ok(out)
	}

	fn lex_fstring_body(&mut self, quote_start: crate::span::Pos) -> Result<Vec<FStringPart>> {
		let mut parts = Vec::new();
		let mut text = String::new();
		loop {
			match self.cursor.peek() {
				None => {
					let span = self.span_from(quote_start);
					return Err(SafulateError::Lexical(span, "unterminated string literal".into()));
				}
				Some('"') => {
					self.cursor.read();
					break;
				}
				Some('\\') => {
					self.cursor.read();
					text.push(self.read_escape(quote_start)?);
				}
				Some('{') => {
					if !text.is_empty() {
						parts.push(FStringPart::Text(std::mem::take(&mut text)));
					}
					self.cursor.read();
					let dynamic_name = self.cursor.read_if(':');
					let expr_start = self.cursor.pos;
					let mut depth = 1usize;
					while depth > 0 {
						match self.cursor.read() {
							None => {
								let span = self.span_from(quote_start);
								return Err(SafulateError::Lexical(span, "unterminated f-string expression".into()));
							}
							Some('{') => depth += 1,
							Some('}') => depth -= 1,
							Some(_) => {}
						}
					}
					let expr_end = self.cursor.pos.offset - 1;
					let expr_text = self.source.text[expr_start.offset..expr_end].to_string();
					parts.push(if dynamic_name {
						FStringPart::DynName(expr_text)
					} else {
						FStringPart::Expr(expr_text)
					});
				}
				Some(c) => {
					self.cursor.read();
					text.push(c);
				}
			}
		}
		if !text.is_empty() {
			parts.push(FStringPart::Text(text));
		}
		Ok(parts)
	}

	fn read_escape(&mut self, quote_start: crate::span::Pos) -> Result<char> {
		match self.cursor.read() {
			Some('\\') => Ok('\\'),
			Some('"') => Ok('"'),
			Some('n') => Ok('\n'),
			Some('t') => Ok('\t'),
			Some(other) => Ok(other),
			None => {
				let span = self.span_from(quote_start);
				Err(SafulateError::Lexical(span, "unterminated escape sequence".into()))
			}
		}
	}
}

fn is_ident_start(c: char) -> bool {
	c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
	c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lex(src: &str) -> Vec<TokenKind> {
		let source = Source::synthetic(src);
		tokenize(&source)
			.unwrap()
			.into_iter()
			.map(|t| t.kind)
			.collect()
	}

	#[test]
	fn lexes_numbers_and_operators() {
		let tokens = lex("1 + 2.5 ** 3");
		assert_eq!(
			tokens,
			vec![
				TokenKind::Number(1.0),
				TokenKind::Op("+"),
				TokenKind::Number(2.5),
				TokenKind::Op("**"),
				TokenKind::Number(3.0),
				TokenKind::Eof,
			]
		);
	}

	#[test]
	fn lexes_keywords_and_identifiers() {
		let tokens = lex("var x = foo");
		assert_eq!(
			tokens,
			vec![
				TokenKind::Keyword(Keyword::Var),
				TokenKind::Identifier,
				TokenKind::Op("="),
				TokenKind::Identifier,
				TokenKind::Eof,
			]
		);
	}

	#[test]
	fn lexes_fstring_segments() {
		let tokens = lex(r#"f"hi {name}!""#);
		match &tokens[0] {
			TokenKind::FString(parts) => {
				assert_eq!(
					parts,
					&vec![
						FStringPart::Text("hi ".into()),
						FStringPart::Expr("name".into()),
						FStringPart::Text("!".into()),
					]
				);
			}
			other => panic!("expected fstring, got {other:?}"),
		}
	}

	#[test]
	fn skips_comments() {
		let tokens = lex("1 # a comment\n+ 2");
		assert_eq!(
			tokens,
			vec![
				TokenKind::Number(1.0),
				TokenKind::Op("+"),
				TokenKind::Number(2.0),
				TokenKind::Eof,
			]
		);
	}

	#[test]
	fn reports_unterminated_string() {
		let source = Source::synthetic("\"abc");
		let err = tokenize(&source).unwrap_err();
		assert!(matches!(err, SafulateError::Lexical(..)));
	}
}
