use super::Parser;
use crate::ast::*;
use crate::error::Result;
use crate::lexer::{Keyword, TokenKind};

impl Parser {
	pub(crate) fn parse_program(&mut self) -> Result<Program> {
		let mut statements = Vec::new();
		while !self.at_eof() {
			statements.push(self.parse_statement()?);
		}
		Ok(Program { statements })
	}

	pub(crate) fn parse_statement(&mut self) -> Result<Stmt> {
		match &self.peek().kind {
			TokenKind::Punct("{") => self.parse_block(),
			TokenKind::Keyword(Keyword::Var)
			| TokenKind::Keyword(Keyword::Let)
			| TokenKind::Keyword(Keyword::Pub)
			| TokenKind::Keyword(Keyword::Priv) => self.parse_decl(),
			TokenKind::Keyword(Keyword::Del) => self.parse_del(),
			TokenKind::Keyword(Keyword::If) => self.parse_if(),
			TokenKind::Keyword(Keyword::While) => self.parse_while(),
			TokenKind::Keyword(Keyword::For) => self.parse_for(),
			TokenKind::Keyword(Keyword::Break) => self.parse_break(),
			TokenKind::Keyword(Keyword::Continue) => self.parse_continue(),
			TokenKind::Keyword(Keyword::Return) => self.parse_return(),
			TokenKind::Keyword(Keyword::Raise) => self.parse_raise(),
			TokenKind::Keyword(Keyword::Try) => self.parse_try(),
			TokenKind::Keyword(Keyword::Switch) => self.parse_switch(),
			TokenKind::Keyword(Keyword::Func) => self.parse_func_stmt(),
			TokenKind::Keyword(Keyword::Spec) => self.parse_spec_stmt(),
			TokenKind::Keyword(Keyword::Struct) => self.parse_struct_stmt(),
			TokenKind::Keyword(Keyword::Type) => self.parse_type_stmt(),
			TokenKind::Keyword(Keyword::Req) => self.parse_req(),
			_ => self.parse_expr_or_edit(),
		}
	}

	fn parse_block(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_punct("{")?;
		let mut statements = Vec::new();
		while !self.check_punct("}") && !self.at_eof() {
			statements.push(self.parse_statement()?);
		}
		self.expect_punct("}")?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Block(statements),
			span,
		})
	}

	fn parse_decl_name(&mut self) -> Result<DeclName> {
		if self.check_punct("{") && self.peek_at(1).is_punct(":") {
			self.advance();
			self.advance();
			let expr = self.parse_expr()?;
			self.expect_punct("}")?;
			Ok(DeclName::Dynamic(expr))
		} else {
			Ok(DeclName::Name(self.expect_identifier()?))
		}
	}

	fn parse_decl(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		let kind = match &self.peek().kind {
			TokenKind::Keyword(Keyword::Var) => DeclKind::Var,
			TokenKind::Keyword(Keyword::Let) => DeclKind::Let,
			TokenKind::Keyword(Keyword::Pub) => DeclKind::Pub,
			TokenKind::Keyword(Keyword::Priv) => DeclKind::Priv,
			_ => unreachable!("parse_decl only called for declaration keywords"),
		};
		self.advance();
		let name = self.parse_decl_name()?;
		let value = if self.eat_op("=") { Some(self.parse_expr()?) } else { None };
		self.expect_punct(";")?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Decl { kind, name, value },
			span,
		})
	}

	fn parse_del(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::Del)?;
		let name = self.expect_identifier()?;
		self.expect_punct(";")?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Del(name),
			span,
		})
	}

	fn parse_if(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::If)?;
		let cond = self.parse_expr()?;
		let then_branch = Box::new(self.parse_block()?);
		let else_branch = if self.eat_keyword(Keyword::Else) {
			if self.check_keyword(Keyword::If) {
				Some(Box::new(self.parse_if()?))
			} else {
				Some(Box::new(self.parse_block()?))
			}
		} else {
			None
		};
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::If {
				cond,
				then_branch,
				else_branch,
			},
			span,
		})
	}

	fn parse_while(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::While)?;
		let cond = self.parse_expr()?;
		let body = Box::new(self.parse_block()?);
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::While { cond, body },
			span,
		})
	}

	fn parse_for(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::For)?;
		let var = self.expect_identifier()?;
		self.expect_keyword(Keyword::In)?;
		let iter = self.parse_expr()?;
		let body = Box::new(self.parse_block()?);
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::For { var, iter, body },
			span,
		})
	}

	fn parse_depth_arg(&mut self) -> u32 {
		if let TokenKind::Number(n) = self.peek().kind {
			self.advance();
			n as u32
		} else {
			1
		}
	}

	fn parse_break(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::Break)?;
		let n = self.parse_depth_arg();
		self.expect_punct(";")?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Break(n),
			span,
		})
	}

	fn parse_continue(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::Continue)?;
		let n = self.parse_depth_arg();
		self.expect_punct(";")?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Continue(n),
			span,
		})
	}

	fn parse_return(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::Return)?;
		let value = if self.check_punct(";") { None } else { Some(self.parse_expr()?) };
		self.expect_punct(";")?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Return(value),
			span,
		})
	}

	fn parse_raise(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::Raise)?;
		let value = self.parse_expr()?;
		self.expect_punct(";")?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Raise(value),
			span,
		})
	}

	fn parse_try(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::Try)?;
		let body = Box::new(self.parse_block()?);
		let catch = if self.eat_keyword(Keyword::Catch) {
			let name = if matches!(self.peek().kind, TokenKind::Identifier) {
				Some(self.expect_identifier()?)
			} else {
				None
			};
			let catch_body = Box::new(self.parse_block()?);
			Some((name, catch_body))
		} else {
			None
		};
		let else_branch = if self.eat_keyword(Keyword::Else) {
			Some(Box::new(self.parse_block()?))
		} else {
			None
		};
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Try {
				body,
				catch,
				else_branch,
			},
			span,
		})
	}

	fn parse_switch(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::Switch)?;
		let scrutinee = self.parse_expr()?;
		self.expect_punct("{")?;
		let mut cases = Vec::new();
		while self.eat_keyword(Keyword::Case) {
			let pattern = self.parse_expr()?;
			let body = self.parse_block()?;
			cases.push((pattern, body));
		}
		self.expect_punct("}")?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Switch { scrutinee, cases },
			span,
		})
	}

	fn parse_params(&mut self) -> Result<Vec<Param>> {
		let mut params = Vec::new();
		if self.check_punct(")") {
			return Ok(params);
		}
		loop {
			let name = self.expect_identifier()?;
			let default = if self.eat_op("=") { Some(self.parse_expr()?) } else { None };
			params.push(Param { name, default });
			if !self.eat_punct(",") {
				break;
			}
			if self.check_punct(")") {
				break;
			}
		}
		Ok(params)
	}

	fn parse_decorators(&mut self) -> Result<Vec<Expr>> {
		let mut decorators = Vec::new();
		while self.check_punct("[") {
			self.advance();
			if !self.check_punct("]") {
				loop {
					decorators.push(self.parse_expr()?);
					if !self.eat_punct(",") {
						break;
					}
					if self.check_punct("]") {
						break;
					}
				}
			}
			self.expect_punct("]")?;
		}
		Ok(decorators)
	}

	fn parse_func_like(&mut self) -> Result<FuncDef> {
		self.advance(); // `func` or `spec`
		let name = Some(DeclName::Name(self.expect_identifier()?));
		self.expect_punct("(")?;
		let params = self.parse_params()?;
		self.expect_punct(")")?;
		let decorators = self.parse_decorators()?;
		let body = Box::new(self.parse_block()?);
		Ok(FuncDef {
			name,
			params,
			decorators,
			body,
		})
	}

	fn parse_func_stmt(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		let def = self.parse_func_like()?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::FuncDef(def),
			span,
		})
	}

	fn parse_spec_stmt(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		let def = self.parse_func_like()?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::SpecDef(def),
			span,
		})
	}

	fn parse_struct_stmt(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::Struct)?;
		let name = self.expect_identifier()?;
		self.expect_punct("(")?;
		let params = self.parse_params()?;
		self.expect_punct(")")?;
		let body = Box::new(self.parse_block()?);
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::StructDef { name, params, body },
			span,
		})
	}

	fn parse_type_stmt(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::Type)?;
		let name = self.expect_identifier()?;
		let static_body = Box::new(self.parse_block()?);
		self.expect_op("->")?;
		self.expect_punct("(")?;
		let mut fields = Vec::new();
		if !self.check_punct(")") {
			loop {
				fields.push(self.expect_identifier()?);
				if !self.eat_punct(",") {
					break;
				}
				if self.check_punct(")") {
					break;
				}
			}
		}
		self.expect_punct(")")?;
		let instance_body = Box::new(self.parse_block()?);
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::TypeDef {
				name,
				static_body,
				fields,
				instance_body,
			},
			span,
		})
	}

	/// `req` gets a dedicated, slightly ad-hoc token-level scan rather than
	/// fitting neatly into the expression grammar: a version constraint like
	/// `+v1.2` doesn't tokenize as a single token, so we reassemble it from
	/// the underlying `v1`/`.`/`2` tokens.
	fn parse_req(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		self.expect_keyword(Keyword::Req)?;

		if self.check_op("+") || self.check_op("-") || self.looks_like_version() {
			let text = self.consume_version_constraint()?;
			self.expect_punct(";")?;
			let span = self.span_since(start);
			return Ok(Stmt {
				kind: StmtKind::Req {
					alias: None,
					source: ReqSource::Version(text),
				},
				span,
			});
		}

		let name = self.expect_identifier()?;
		let (alias, source) = if self.eat_punct("@") {
			if let TokenKind::String(s) = &self.peek().kind {
				let s = s.clone();
				self.advance();
				(Some(name), ReqSource::Url(s))
			} else {
				let target = self.expect_identifier()?;
				(Some(name), ReqSource::Name(target))
			}
		} else {
			(None, ReqSource::Name(name))
		};
		self.expect_punct(";")?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Req { alias, source },
			span,
		})
	}

	fn looks_like_version(&self) -> bool {
		matches!(&self.peek().kind, TokenKind::Identifier if self.peek().text.starts_with('v')
			&& self.peek().text[1..].chars().all(|c| c.is_ascii_digit()) && self.peek().text.len() > 1)
	}

	fn consume_version_constraint(&mut self) -> Result<String> {
		let mut text = String::new();
		if self.eat_op("+") {
			text.push('+');
		} else if self.eat_op("-") {
			text.push('-');
		}
		text.push_str(&self.consume_version_token()?);
		if self.eat_op("-") {
			text.push_str(" - ");
			text.push_str(&self.consume_version_token()?);
		}
		Ok(text)
	}

	/// A trailing `.2.3` (minor and patch) is one `Number` token since the
	/// lexer reads the whole `2.3` as a float — reassemble from its raw
	/// source text rather than the parsed `f64`, or a patch component gets
	/// truncated (`2.3 as i64 == 2`, dropping the patch entirely).
	fn consume_version_token(&mut self) -> Result<String> {
		let mut text = self.expect_identifier()?;
		while self.check_punct(".") && matches!(self.peek_at(1).kind, TokenKind::Number(_)) {
			self.advance();
			let digits = self.peek().text.clone();
			self.advance();
			text.push('.');
			text.push_str(&digits);
		}
		Ok(text)
	}

	fn parse_expr_or_edit(&mut self) -> Result<Stmt> {
		let start = self.peek().span.clone();
		let expr = self.parse_expr()?;
		if self.eat_op("~") {
			let body = Box::new(self.parse_block()?);
			let span = self.span_since(start);
			return Ok(Stmt {
				kind: StmtKind::Edit { target: expr, body },
				span,
			});
		}
		self.expect_punct(";")?;
		let span = self.span_since(start);
		Ok(Stmt {
			kind: StmtKind::Expr(expr),
			span,
		})
	}
}
