use super::Parser;
use crate::ast::{Arg, BinaryOp, Expr, ExprKind, FStringSeg, LogicalOp, UnaryOp};
use crate::error::Result;
use crate::lexer::{tokenize, FStringPart, Keyword, TokenKind};
use crate::span::{Source, Span};

impl Parser {
	pub(crate) fn parse_expr(&mut self) -> Result<Expr> {
		self.parse_assignment()
	}

	fn parse_assignment(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let target = self.parse_or()?;
		if self.eat_op("=") {
			let value = self.parse_assignment()?;
			let span = self.span_since(start);
			return Ok(Expr {
				kind: ExprKind::Assign {
					target: Box::new(target),
					value: Box::new(value),
				},
				span,
			});
		}
		Ok(target)
	}

	fn parse_or(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let mut lhs = self.parse_and()?;
		loop {
			if self.eat_op("||") {
				let rhs = self.parse_and()?;
				let span = self.span_since(start.clone());
				lhs = Expr {
					kind: ExprKind::Logical(LogicalOp::Or, Box::new(lhs), Box::new(rhs)),
					span,
				};
			} else if self.eat_op("|") {
				let rhs = self.parse_and()?;
				let span = self.span_since(start.clone());
				lhs = Expr {
					kind: ExprKind::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs)),
					span,
				};
			} else {
				break;
			}
		}
		Ok(lhs)
	}

	fn parse_and(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let mut lhs = self.parse_equality()?;
		loop {
			if self.eat_op("&&") {
				let rhs = self.parse_equality()?;
				let span = self.span_since(start.clone());
				lhs = Expr {
					kind: ExprKind::Logical(LogicalOp::And, Box::new(lhs), Box::new(rhs)),
					span,
				};
			} else if self.eat_op("&") {
				let rhs = self.parse_equality()?;
				let span = self.span_since(start.clone());
				lhs = Expr {
					kind: ExprKind::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs)),
					span,
				};
			} else {
				break;
			}
		}
		Ok(lhs)
	}

	fn parse_equality(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let mut lhs = self.parse_relational()?;
		loop {
			let op = if self.eat_op("==") {
				BinaryOp::Eq
			} else if self.eat_op("!=") {
				BinaryOp::Ne
			} else {
				break;
			};
			let rhs = self.parse_relational()?;
			let span = self.span_since(start.clone());
			lhs = Expr {
				kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
				span,
			};
		}
		Ok(lhs)
	}

	fn parse_relational(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let mut lhs = self.parse_additive()?;
		loop {
			let op = if self.eat_op(">=") {
				BinaryOp::Ge
			} else if self.eat_op("<=") {
				BinaryOp::Le
			} else if self.eat_op(">") {
				BinaryOp::Gt
			} else if self.eat_op("<") {
				BinaryOp::Lt
			} else if self.eat_keyword(Keyword::In) {
				BinaryOp::In
			} else if self.eat_keyword(Keyword::Contains) {
				BinaryOp::Contains
			} else {
				break;
			};
			let rhs = self.parse_additive()?;
			let span = self.span_since(start.clone());
			lhs = Expr {
				kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
				span,
			};
		}
		Ok(lhs)
	}

	fn parse_additive(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let mut lhs = self.parse_multiplicative()?;
		loop {
			let op = if self.eat_op("+") {
				BinaryOp::Add
			} else if self.eat_op("-") {
				BinaryOp::Sub
			} else {
				break;
			};
			let rhs = self.parse_multiplicative()?;
			let span = self.span_since(start.clone());
			lhs = Expr {
				kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
				span,
			};
		}
		Ok(lhs)
	}

	fn parse_multiplicative(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let mut lhs = self.parse_power()?;
		loop {
			let op = if self.eat_op("*") {
				BinaryOp::Mul
			} else if self.eat_op("/") {
				BinaryOp::Div
			} else {
				break;
			};
			let rhs = self.parse_power()?;
			let span = self.span_since(start.clone());
			lhs = Expr {
				kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
				span,
			};
		}
		Ok(lhs)
	}

	/// Right-associative: `2 ** 3 ** 2 == 2 ** (3 ** 2)`.
	fn parse_power(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let lhs = self.parse_unary()?;
		if self.eat_op("**") {
			let rhs = self.parse_power()?;
			let span = self.span_since(start);
			return Ok(Expr {
				kind: ExprKind::Binary(BinaryOp::Pow, Box::new(lhs), Box::new(rhs)),
				span,
			});
		}
		Ok(lhs)
	}

	fn parse_unary(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let op = if self.eat_op("+") {
			Some(UnaryOp::Pos)
		} else if self.eat_op("-") {
			Some(UnaryOp::Neg)
		} else if self.eat_op("!") {
			Some(UnaryOp::Not)
		} else {
			None
		};
		if let Some(op) = op {
			let operand = self.parse_unary()?;
			let span = self.span_since(start);
			return Ok(Expr {
				kind: ExprKind::Unary(op, Box::new(operand)),
				span,
			});
		}
		self.parse_postfix()
	}

	fn parse_postfix(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let mut expr = self.parse_primary()?;
		loop {
			if self.eat_punct(".") {
				let name = self.expect_identifier()?;
				let span = self.span_since(start.clone());
				expr = Expr {
					kind: ExprKind::Attribute {
						object: Box::new(expr),
						name,
					},
					span,
				};
			} else if self.check_punct("(") {
				let args = self.parse_call_args()?;
				let span = self.span_since(start.clone());
				expr = Expr {
					kind: ExprKind::Call {
						callee: Box::new(expr),
						args,
					},
					span,
				};
			} else if self.check_punct("[") {
				let items = self.parse_bracket_items()?;
				let span = self.span_since(start.clone());
				expr = Expr {
					kind: ExprKind::Bracket {
						object: Box::new(expr),
						items,
					},
					span,
				};
			} else {
				break;
			}
		}
		Ok(expr)
	}

	fn parse_call_args(&mut self) -> Result<Vec<Arg>> {
		self.expect_punct("(")?;
		let args = self.parse_arg_list(")")?;
		self.expect_punct(")")?;
		Ok(args)
	}

	fn parse_bracket_items(&mut self) -> Result<Vec<Arg>> {
		self.expect_punct("[")?;
		let args = self.parse_arg_list("]")?;
		self.expect_punct("]")?;
		Ok(args)
	}

	fn parse_arg_list(&mut self, closing: &str) -> Result<Vec<Arg>> {
		let mut args = Vec::new();
		if self.check_punct(closing) {
			return Ok(args);
		}
		loop {
			args.push(self.parse_one_arg()?);
			if !self.eat_punct(",") {
				break;
			}
			if self.check_punct(closing) {
				break;
			}
		}
		Ok(args)
	}

	fn parse_one_arg(&mut self) -> Result<Arg> {
		if self.eat_op("..") {
			let expr = self.parse_expr()?;
			return Ok(Arg::Spread(expr));
		}
		if self.eat_op("...") {
			let expr = self.parse_expr()?;
			return Ok(Arg::KeywordSpread(expr));
		}
		if self.check_punct("{") && self.peek_at(1).is_punct(":") {
			self.advance();
			self.advance();
			let name_expr = self.parse_expr()?;
			self.expect_punct("}")?;
			self.expect_op("=")?;
			let value = self.parse_expr()?;
			return Ok(Arg::DynKeyword(name_expr, value));
		}
		if matches!(self.peek().kind, TokenKind::Identifier) && self.peek_at(1).is_op("=") {
			let name = self.expect_identifier()?;
			self.advance();
			let value = self.parse_expr()?;
			return Ok(Arg::Keyword(name, value));
		}
		Ok(Arg::Positional(self.parse_expr()?))
	}

	fn parse_primary(&mut self) -> Result<Expr> {
		let start = self.peek().span.clone();
		let token = self.peek().clone();
		let kind = match &token.kind {
			TokenKind::Number(n) => {
				self.advance();
				ExprKind::Number(*n)
			}
			TokenKind::String(s) => {
				let s = s.clone();
				self.advance();
				ExprKind::String(s)
			}
			TokenKind::FString(parts) => {
				let parts = parts.clone();
				self.advance();
				ExprKind::FString(self.build_fstring_segments(parts, &start)?)
			}
			TokenKind::Keyword(Keyword::True) => {
				self.advance();
				ExprKind::Boolean(true)
			}
			TokenKind::Keyword(Keyword::False) => {
				self.advance();
				ExprKind::Boolean(false)
			}
			TokenKind::Keyword(Keyword::Null) => {
				self.advance();
				ExprKind::Null
			}
			TokenKind::Identifier => {
				let name = token.text.clone();
				self.advance();
				ExprKind::Identifier(name)
			}
			TokenKind::Op("\\") => {
				self.advance();
				let name = self.expect_identifier()?;
				ExprKind::OuterRef(name)
			}
			TokenKind::Punct("(") => {
				self.advance();
				let inner = self.parse_expr()?;
				self.expect_punct(")")?;
				inner.kind
			}
			TokenKind::Punct("[") => {
				self.advance();
				let mut items = Vec::new();
				if !self.check_punct("]") {
					loop {
						items.push(self.parse_expr()?);
						if !self.eat_punct(",") {
							break;
						}
						if self.check_punct("]") {
							break;
						}
					}
				}
				self.expect_punct("]")?;
				ExprKind::List(items)
			}
			_ => return Err(self.error(format!("unexpected token '{}'", token.text))),
		};
		let span = self.span_since(start);
		Ok(Expr { kind, span })
	}

	fn build_fstring_segments(&self, parts: Vec<FStringPart>, span: &Span) -> Result<Vec<FStringSeg>> {
		let source = Source::new(format!("{}:fstring", span.source), String::new());
		let mut segments = Vec::with_capacity(parts.len());
		for part in parts {
			segments.push(match part {
				FStringPart::Text(text) => FStringSeg::Text(text),
				FStringPart::Expr(code) => FStringSeg::Expr(parse_sub_expr(&source, &code)?),
				FStringPart::DynName(code) => FStringSeg::DynName(parse_sub_expr(&source, &code)?),
			});
		}
		Ok(segments)
	}
}

fn parse_sub_expr(source_template: &Source, code: &str) -> Result<Expr> {
	let source = Source::new(source_template.name.clone(), code.to_string());
	let tokens = tokenize(&source)?;
	let mut parser = Parser { tokens, pos: 0 };
	parser.parse_expr()
}
