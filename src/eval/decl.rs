//! Struct and type desugaring.

use super::Interpreter;
use crate::ast::{DeclKind, DeclName, Expr, ExprKind, Param, Stmt, StmtKind};
use crate::env::Env;
use crate::error::Result;
use crate::span::Span;
use crate::value::Value;
use std::rc::Rc;

fn ident(name: &str, span: &Span) -> Expr {
	Expr {
		kind: ExprKind::Identifier(name.to_string()),
		span: span.clone(),
	}
}

fn call_builtin(name: &str, span: &Span) -> Expr {
	Expr {
		kind: ExprKind::Call {
			callee: Box::new(ident(name, span)),
			args: Vec::new(),
		},
		span: span.clone(),
	}
}

/// `struct Name(params) { body }` ==
/// `func Name(params) { var __o = object(); __o ~ { body }; return __o; }`
pub fn desugar_struct(params: Vec<Param>, body: Stmt, span: &Span) -> Stmt {
	let decl_o = Stmt {
		kind: StmtKind::Decl {
			kind: DeclKind::Var,
			name: DeclName::Name("__o".to_string()),
			value: Some(call_builtin("object", span)),
		},
		span: span.clone(),
	};
	let edit = Stmt {
		kind: StmtKind::Edit {
			target: ident("__o", span),
			body: Box::new(body),
		},
		span: span.clone(),
	};
	let ret = Stmt {
		kind: StmtKind::Return(Some(ident("__o", span))),
		span: span.clone(),
	};
	Stmt {
		kind: StmtKind::Block(vec![decl_o, edit, ret]),
		span: span.clone(),
	}
}

/// `type Name { static-body } -> (f1, f2, ...) { instance-body }`.
///
/// Modeled as an `Object` (so attribute reads like `Name.members` work
/// through the ordinary public namespace) carrying a `construct` entry in
/// its `specs` table — a `Function` built the same way `desugar_struct`
/// builds a struct's body, except the destructured fields are bound before
/// the instance body runs. There is no `call` spec in the operator-dispatch
/// table, so `Call` evaluation special-cases objects that carry
/// `specs.construct` instead (see `eval::mod::eval_call`).
pub fn desugar_type(interp: &mut Interpreter, env: &Env, fields: Vec<String>, static_body: &Stmt, instance_body: &Stmt, span: &Span) -> Result<Value> {
	let (type_value, type_obj) = Interpreter::new_object_with_type(None);

	let static_env = env.child_edit(type_value.clone());
	interp.exec_block_stmts(static_body, &static_env)?;

	let field_decls: Vec<Stmt> = fields
		.iter()
		.map(|f| Stmt {
			kind: StmtKind::Decl {
				kind: DeclKind::Pub,
				name: DeclName::Name(f.clone()),
				value: Some(ident(f, span)),
			},
			span: span.clone(),
		})
		.collect();

	let mut edit_body_stmts = field_decls;
	edit_body_stmts.push(instance_body.clone());
	let edit_body = Stmt {
		kind: StmtKind::Block(edit_body_stmts),
		span: span.clone(),
	};

	let decl_o = Stmt {
		kind: StmtKind::Decl {
			kind: DeclKind::Var,
			name: DeclName::Name("__o".to_string()),
			value: Some(call_builtin("object", span)),
		},
		span: span.clone(),
	};
	let edit = Stmt {
		kind: StmtKind::Edit {
			target: ident("__o", span),
			body: Box::new(edit_body),
		},
		span: span.clone(),
	};
	let ret = Stmt {
		kind: StmtKind::Return(Some(ident("__o", span))),
		span: span.clone(),
	};
	let constructor_body = Stmt {
		kind: StmtKind::Block(vec![decl_o, edit, ret]),
		span: span.clone(),
	};

	let params = fields.into_iter().map(|name| Param { name, default: None }).collect();
	let constructor = Value::new_function(None, params, Rc::new(constructor_body), env.clone());
	type_obj.borrow_mut().specs.insert("construct".to_string(), constructor);

	Ok(type_value)
}
