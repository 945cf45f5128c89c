//! The tree-walking evaluator: statement execution, expression evaluation,
//! operator dispatch through specs, and the `req` directive.

mod call;
mod control;
mod decl;
mod ops;

pub use control::{Outcome, Signal};

use crate::ast::{
	Arg, BinaryOp, DeclKind, DeclName, Expr, ExprKind, FStringSeg, LogicalOp, Program, ReqSource, Stmt, StmtKind, UnaryOp,
};
use crate::builtins;
use crate::env::Env;
use crate::error::{Result, SafulateError};
use crate::module::{InterpreterConfig, ModuleLoader, NullModuleLoader, Version};
use crate::span::Span;
use crate::value::Value;
use control::Flow;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

pub struct Interpreter {
	global: Env,
	depth: usize,
	max_depth: usize,
	host_version: Version,
	module_loader: Box<dyn ModuleLoader>,
	loaded_modules: HashMap<String, Value>,
}

impl Interpreter {
	pub fn new(loader: Box<dyn ModuleLoader>, version: Version, config: InterpreterConfig) -> Interpreter {
		let global = Env::root();
		let mut interp = Interpreter {
			global,
			depth: 0,
			max_depth: config.max_depth,
			host_version: version,
			module_loader: loader,
			loaded_modules: HashMap::new(),
		};
		builtins::install(&mut interp);
		interp
	}

	/// Default construction for embedders that don't need module
	/// resolution: an `Interpreter` with no loader and the library's
	/// conservative default config.
	pub fn with_defaults() -> Interpreter {
		Interpreter::new(Box::new(NullModuleLoader), Version::default(), InterpreterConfig::default())
	}

	pub fn define_builtin(&mut self, name: &str, value: Value) {
		self.global.declare_var(name, value);
	}

	/// Runs every top-level statement in `program`'s global scope and
	/// returns the value of the final expression statement, if any — handy
	/// for embedders/tests that want a result rather than only side effects.
	pub fn run(&mut self, program: &Program) -> Result<Value> {
		let global = self.global.clone();
		let mut last = Value::Null;
		let last_index = program.statements.len().wrapping_sub(1);
		for (i, stmt) in program.statements.iter().enumerate() {
			if i == last_index {
				if let StmtKind::Expr(e) = &stmt.kind {
					last = self.eval_expr(e, &global)?;
					continue;
				}
			}
			match self.exec_stmt(stmt, &global) {
				Ok(()) => {}
				Err(Outcome::Error(err)) => return Err(err),
				Err(Outcome::Signal(Signal::Return(v))) => {
					last = v;
					break;
				}
				Err(Outcome::Signal(_)) => {
					// top-level break/continue: nothing to absorb it, drop it.
				}
			}
		}
		Ok(last)
	}

	fn exec_stmts(&mut self, stmts: &[Stmt], env: &Env) -> Flow<()> {
		for stmt in stmts {
			self.exec_stmt(stmt, env)?;
		}
		Ok(())
	}

	/// Runs a (typically `Block`) statement's direct children in `env`
	/// without the usual nested-scope wrapping, surfacing only genuine
	/// errors — used for a type's static body, which must write through to
	/// `env` itself rather than a throwaway child scope.
	pub(crate) fn exec_block_stmts(&mut self, stmt: &Stmt, env: &Env) -> Result<()> {
		let stmts: &[Stmt] = match &stmt.kind {
			StmtKind::Block(stmts) => stmts,
			_ => std::slice::from_ref(stmt),
		};
		match self.exec_stmts(stmts, env) {
			Ok(()) => Ok(()),
			Err(Outcome::Error(e)) => Err(e),
			Err(Outcome::Signal(_)) => Err(SafulateError::Syntax(
				stmt.span.clone(),
				"break/continue/return is not valid in a type's static body".into(),
			)),
		}
	}

	fn exec_stmt(&mut self, stmt: &Stmt, env: &Env) -> Flow<()> {
		match &stmt.kind {
			StmtKind::Expr(expr) => {
				self.eval_expr(expr, env)?;
				Ok(())
			}
			StmtKind::Decl { kind, name, value } => {
				let value = match value {
					Some(e) => self.eval_expr(e, env)?,
					None => Value::Null,
				};
				let name = self.resolve_decl_name(name, env)?;
				match kind {
					DeclKind::Var | DeclKind::Let => env.declare_var(&name, value),
					DeclKind::Pub => env.declare_pub(&name, value, &stmt.span)?,
					DeclKind::Priv => env.declare_priv(&name, value, &stmt.span)?,
				}
				Ok(())
			}
			StmtKind::Del(name) => {
				env.delete(name, &stmt.span)?;
				Ok(())
			}
			StmtKind::Block(stmts) => self.exec_stmts(stmts, &env.child()),
			StmtKind::If {
				cond,
				then_branch,
				else_branch,
			} => {
				let c = self.eval_expr(cond, env)?;
				if c.truthy(self, &stmt.span)? {
					self.exec_stmt(then_branch, env)
				} else if let Some(else_branch) = else_branch {
					self.exec_stmt(else_branch, env)
				} else {
					Ok(())
				}
			}
			StmtKind::While { cond, body } => self.exec_while(cond, body, env, &stmt.span),
			StmtKind::For { var, iter, body } => self.exec_for(var, iter, body, env, &stmt.span),
			StmtKind::Break(0) | StmtKind::Continue(0) => Ok(()),
			StmtKind::Break(n) => Err(Outcome::Signal(Signal::Break(*n))),
			StmtKind::Continue(n) => Err(Outcome::Signal(Signal::Continue(*n))),
			StmtKind::Return(value) => {
				let v = match value {
					Some(e) => self.eval_expr(e, env)?,
					None => Value::Null,
				};
				Err(Outcome::Signal(Signal::Return(v)))
			}
			StmtKind::Raise(expr) => {
				let v = self.eval_expr(expr, env)?;
				Err(Outcome::Error(SafulateError::UserRaised(stmt.span.clone(), v)))
			}
			StmtKind::Try { body, catch, else_branch } => self.exec_try(body, catch, else_branch, env),
			StmtKind::Switch { scrutinee, cases } => self.exec_switch(scrutinee, cases, env, &stmt.span),
			StmtKind::FuncDef(def) => {
				let fval = self.build_function(def, env)?;
				let name = self.resolve_func_name(&def.name, env, &stmt.span)?;
				self.bind_definition(env, &name, fval, &stmt.span)
			}
			StmtKind::SpecDef(def) => {
				let fval = self.build_function(def, env)?;
				let name = self.resolve_func_name(&def.name, env, &stmt.span)?;
				if !env.in_edit_scope() {
					return Err(Outcome::Error(SafulateError::Name(
						stmt.span.clone(),
						"'spec' definition outside of an edit block".into(),
					)));
				}
				env.declare_spec(&name, fval, &stmt.span)?;
				Ok(())
			}
			StmtKind::StructDef { name, params, body } => {
				let desugared = decl::desugar_struct(params.clone(), (**body).clone(), &stmt.span);
				let fval = Value::new_function(Some(name.clone()), params.clone(), Rc::new(desugared), env.clone());
				self.bind_definition(env, name, fval, &stmt.span)
			}
			StmtKind::TypeDef {
				name,
				static_body,
				fields,
				instance_body,
			} => {
				let tval = decl::desugar_type(self, env, fields.clone(), static_body, instance_body, &stmt.span)?;
				self.bind_definition(env, name, tval, &stmt.span)
			}
			StmtKind::Edit { target, body } => {
				let target_val = self.eval_expr(target, env)?;
				if !matches!(target_val, Value::Object(_)) {
					return Err(Outcome::Error(SafulateError::Type(
						stmt.span.clone(),
						format!("cannot edit a {}", target_val.type_name()),
					)));
				}
				let edit_env = env.child_edit(target_val);
				self.exec_stmt(body, &edit_env)
			}
			StmtKind::Req { alias, source } => self.exec_req(alias, source, env, &stmt.span),
		}
	}

	fn bind_definition(&mut self, env: &Env, name: &str, value: Value, span: &Span) -> Flow<()> {
		if env.in_edit_scope() {
			env.declare_pub(name, value, span)?;
		} else {
			env.declare_var(name, value);
		}
		Ok(())
	}

	fn resolve_decl_name(&mut self, name: &DeclName, env: &Env) -> Flow<String> {
		match name {
			DeclName::Name(s) => Ok(s.clone()),
			DeclName::Dynamic(e) => {
				let v = self.eval_expr(e, env)?;
				Ok(match v {
					Value::String(s) => s.to_string(),
					other => other.display(self, &e.span)?,
				})
			}
		}
	}

	fn resolve_func_name(&mut self, name: &Option<DeclName>, env: &Env, span: &Span) -> Flow<String> {
		match name {
			Some(n) => self.resolve_decl_name(n, env),
			None => Err(Outcome::Error(SafulateError::Syntax(span.clone(), "function definition missing a name".into()))),
		}
	}

	fn build_function(&mut self, def: &crate::ast::FuncDef, env: &Env) -> Flow<Value> {
		let mut fval = Value::new_function(None, def.params.clone(), Rc::new((*def.body).clone()), env.clone());
		for deco in &def.decorators {
			let deco_val = self.eval_expr(deco, env)?;
			fval = self.call_value(&deco_val, vec![fval], HashMap::new(), deco.span.clone())?;
		}
		Ok(fval)
	}

	fn exec_while(&mut self, cond: &Expr, body: &Stmt, env: &Env, span: &Span) -> Flow<()> {
		loop {
			let c = self.eval_expr(cond, env)?;
			if !c.truthy(self, span)? {
				return Ok(());
			}
			match self.exec_stmt(body, &env.child()) {
				Ok(()) => {}
				Err(Outcome::Error(e)) => return Err(Outcome::Error(e)),
				Err(Outcome::Signal(Signal::Return(v))) => return Err(Outcome::Signal(Signal::Return(v))),
				Err(Outcome::Signal(sig)) => {
					let is_break = matches!(sig, Signal::Break(_));
					match sig.step_out() {
						None if is_break => return Ok(()),
						None => continue,
						Some(rest) => return Err(Outcome::Signal(rest)),
					}
				}
			}
		}
	}

	fn exec_for(&mut self, var: &str, iter: &Expr, body: &Stmt, env: &Env, span: &Span) -> Flow<()> {
		let iter_val = self.eval_expr(iter, env)?;
		let items: Vec<Value> = match &iter_val {
			Value::List(items) => items.borrow().clone(),
			Value::String(s) => s.chars().map(|c| Value::String(Rc::from(c.to_string()))).collect(),
			Value::Object(obj) => {
				let spec = obj.borrow().specs.get("iter").cloned();
				match spec {
					Some(f) => match self.call_value(&f, vec![], HashMap::new(), span.clone())? {
						Value::List(items) => items.borrow().clone(),
						other => {
							return Err(Outcome::Error(SafulateError::Type(
								span.clone(),
								format!("'iter' spec must return a list, got {}", other.type_name()),
							)))
						}
					},
					None => return Err(Outcome::Error(SafulateError::Type(span.clone(), "object is not iterable".into()))),
				}
			}
			other => return Err(Outcome::Error(SafulateError::Type(span.clone(), format!("{} is not iterable", other.type_name())))),
		};

		for item in items {
			let body_env = env.child();
			body_env.declare_var(var, item);
			match self.exec_stmt(body, &body_env) {
				Ok(()) => {}
				Err(Outcome::Error(e)) => return Err(Outcome::Error(e)),
				Err(Outcome::Signal(Signal::Return(v))) => return Err(Outcome::Signal(Signal::Return(v))),
				Err(Outcome::Signal(sig)) => {
					let is_break = matches!(sig, Signal::Break(_));
					match sig.step_out() {
						None if is_break => return Ok(()),
						None => continue,
						Some(rest) => return Err(Outcome::Signal(rest)),
					}
				}
			}
		}
		Ok(())
	}

	fn exec_try(&mut self, body: &Stmt, catch: &Option<(Option<String>, Box<Stmt>)>, else_branch: &Option<Box<Stmt>>, env: &Env) -> Flow<()> {
		match self.exec_stmt(body, &env.child()) {
			Ok(()) => match else_branch {
				Some(eb) => self.exec_stmt(eb, &env.child()),
				None => Ok(()),
			},
			Err(Outcome::Signal(sig)) => Err(Outcome::Signal(sig)),
			Err(Outcome::Error(err)) => {
				if !err.is_catchable() {
					return Err(Outcome::Error(err));
				}
				match catch {
					Some((name, catch_body)) => {
						let catch_env = env.child();
						if let Some(name) = name {
							catch_env.declare_var(name, err.into_value());
						}
						self.exec_stmt(catch_body, &catch_env)
					}
					None => Err(Outcome::Error(err)),
				}
			}
		}
	}

	fn exec_switch(&mut self, scrutinee: &Expr, cases: &[(Expr, Stmt)], env: &Env, span: &Span) -> Flow<()> {
		let scrutinee_val = self.eval_expr(scrutinee, env)?;
		let mut idx = None;
		for (i, (pattern, _)) in cases.iter().enumerate() {
			let pattern_val = self.eval_expr(pattern, env)?;
			if self.values_equal(&scrutinee_val, &pattern_val, span)? {
				idx = Some(i);
				break;
			}
		}
		let Some(mut idx) = idx else { return Ok(()) };

		loop {
			let case_env = env.child();
			match self.exec_stmt(&cases[idx].1, &case_env) {
				Ok(()) => return Ok(()),
				Err(Outcome::Error(e)) => return Err(Outcome::Error(e)),
				Err(Outcome::Signal(Signal::Return(v))) => return Err(Outcome::Signal(Signal::Return(v))),
				Err(Outcome::Signal(Signal::Break(n))) => {
					if n <= 1 {
						return Ok(());
					}
					return Err(Outcome::Signal(Signal::Break(n - 1)));
				}
				Err(Outcome::Signal(Signal::Continue(n))) => {
					idx += n as usize;
					if idx >= cases.len() {
						return Ok(());
					}
				}
			}
		}
	}

	fn exec_req(&mut self, alias: &Option<String>, source: &ReqSource, env: &Env, span: &Span) -> Flow<()> {
		match source {
			ReqSource::Version(text) => {
				if !crate::module::satisfies(text, self.host_version) {
					return Err(Outcome::Error(SafulateError::Version(
						span.clone(),
						format!("host version {} does not satisfy '{}'", self.host_version, text),
					)));
				}
				Ok(())
			}
			ReqSource::Name(name) => {
				let module = self.load_module(name, span).map_err(Outcome::Error)?;
				env.declare_var(alias.as_deref().unwrap_or(name), module);
				Ok(())
			}
			ReqSource::Url(url) => {
				let module = self.load_module(url, span).map_err(Outcome::Error)?;
				let bind_name = alias
					.clone()
					.ok_or_else(|| Outcome::Error(SafulateError::Import(span.clone(), "url import requires an alias".into())))?;
				env.declare_var(&bind_name, module);
				Ok(())
			}
		}
	}

	fn load_module(&mut self, key: &str, span: &Span) -> Result<Value> {
		if let Some(v) = self.loaded_modules.get(key) {
			return Ok(v.clone());
		}
		debug!(module = key, "loading module");
		let program = self.module_loader.load(key).map_err(|e| SafulateError::Import(span.clone(), e.to_string()))?;
		let (module_val, _) = Interpreter::new_object_with_type(None);
		let module_env = self.global.child_edit(module_val.clone());
		for stmt in &program.statements {
			match self.exec_stmt(stmt, &module_env) {
				Ok(()) => {}
				Err(Outcome::Error(e)) => return Err(e),
				Err(Outcome::Signal(_)) => {
					return Err(SafulateError::Import(span.clone(), format!("module '{key}' used break/continue/return at top level")))
				}
			}
		}
		self.loaded_modules.insert(key.to_string(), module_val.clone());
		Ok(module_val)
	}

	// ---- expressions ----

	fn eval_expr(&mut self, expr: &Expr, env: &Env) -> Result<Value> {
		match &expr.kind {
			ExprKind::Number(n) => Ok(Value::Number(*n)),
			ExprKind::String(s) => Ok(Value::String(Rc::from(s.as_str()))),
			ExprKind::Boolean(b) => Ok(Value::Boolean(*b)),
			ExprKind::Null => Ok(Value::Null),
			ExprKind::List(items) => {
				let mut values = Vec::with_capacity(items.len());
				for item in items {
					values.push(self.eval_expr(item, env)?);
				}
				Ok(Value::List(Rc::new(std::cell::RefCell::new(values))))
			}
			ExprKind::FString(segments) => self.eval_fstring(segments, env, &expr.span),
			ExprKind::Identifier(name) => env
				.lookup(name)
				.ok_or_else(|| SafulateError::Name(expr.span.clone(), format!("'{name}' is not declared"))),
			ExprKind::OuterRef(name) => env
				.lookup_outer(name)
				.ok_or_else(|| SafulateError::Name(expr.span.clone(), format!("'{name}' is not declared in an outer scope"))),
			ExprKind::Unary(op, operand) => {
				let v = self.eval_expr(operand, env)?;
				self.apply_unary(*op, v, &expr.span)
			}
			ExprKind::Binary(op, lhs, rhs) => {
				let l = self.eval_expr(lhs, env)?;
				let r = self.eval_expr(rhs, env)?;
				self.apply_binary(*op, l, r, &expr.span)
			}
			ExprKind::Logical(op, lhs, rhs) => {
				let l = self.eval_expr(lhs, env)?;
				let truthy = l.truthy(self, &expr.span)?;
				match op {
					LogicalOp::And if !truthy => Ok(l),
					LogicalOp::And => self.eval_expr(rhs, env),
					LogicalOp::Or if truthy => Ok(l),
					LogicalOp::Or => self.eval_expr(rhs, env),
				}
			}
			ExprKind::Call { callee, args } => self.eval_call(callee, args, env, &expr.span),
			ExprKind::Attribute { object, name } => self.eval_attribute(object, name, env, &expr.span),
			ExprKind::Bracket { object, items } => self.eval_bracket(object, items, env, &expr.span),
			ExprKind::Assign { target, value } => self.eval_assign(target, value, env, &expr.span),
		}
	}

	fn eval_fstring(&mut self, segments: &[FStringSeg], env: &Env, span: &Span) -> Result<Value> {
		let mut out = String::new();
		for seg in segments {
			match seg {
				FStringSeg::Text(t) => out.push_str(t),
				FStringSeg::Expr(e) | FStringSeg::DynName(e) => {
					let v = self.eval_expr(e, env)?;
					out.push_str(&v.display(self, span)?);
				}
			}
		}
		Ok(Value::String(Rc::from(out)))
	}

	fn eval_call(&mut self, callee_expr: &Expr, args: &[Arg], env: &Env, span: &Span) -> Result<Value> {
		let callee_val = self.eval_expr(callee_expr, env)?;
		if let Value::Object(obj) = &callee_val {
			let construct = obj.borrow().specs.get("construct").cloned();
			if let Some(ctor) = construct {
				let (pos, kw) = self.eval_args(args, env, span)?;
				return self.call_value(&ctor, pos, kw, span.clone());
			}
			return Err(SafulateError::Type(span.clone(), "object is not callable".into()));
		}
		let (pos, kw) = self.eval_args(args, env, span)?;
		self.call_value(&callee_val, pos, kw, span.clone())
	}

	fn eval_attribute(&mut self, object: &Expr, name: &str, env: &Env, span: &Span) -> Result<Value> {
		let obj_val = self.eval_expr(object, env)?;
		match &obj_val {
			Value::Object(obj) => {
				let found = obj.borrow().public.get(name).cloned();
				match found {
					Some(Value::Function(f)) => Ok(Value::Function(Rc::new(f.bind(obj_val.clone())))),
					Some(Value::Property(f)) => {
						let bound = Rc::new(f.bind(obj_val.clone()));
						self.call_value(&Value::Function(bound), vec![], HashMap::new(), span.clone())
					}
					Some(other) => Ok(other),
					None => Err(SafulateError::Attribute(span.clone(), format!("no attribute '{name}' on object"))),
				}
			}
			Value::Partial(p) if name == "partial_args" => Ok(Value::List(Rc::new(std::cell::RefCell::new(p.args.clone())))),
			Value::Partial(p) => {
				if name == "without_partials" {
					let base = p.without_partials();
					Ok(Value::Native(Rc::new(crate::value::NativeFunction {
						name: "without_partials".into(),
						func: Box::new(move |_interp, _args, _kwargs, _span| Ok(base.clone())),
					})))
				} else {
					Err(SafulateError::Attribute(span.clone(), format!("no attribute '{name}' on a partial")))
				}
			}
			Value::BuiltinType(bt) if name == "check" => {
				let check = bt.check;
				Ok(Value::Native(Rc::new(crate::value::NativeFunction {
					name: format!("{}.check", bt.name),
					func: Box::new(move |_interp, args, _kwargs, span| {
						let arg = args.into_iter().next().ok_or_else(|| SafulateError::Argument(span, "check() requires one argument".into()))?;
						Ok(Value::Number(if check(&arg) { 1.0 } else { 0.0 }))
					}),
				})))
			}
			Value::String(s) if name == "format" => {
				let template = s.clone();
				Ok(Value::Native(Rc::new(crate::value::NativeFunction {
					name: "format".into(),
					func: Box::new(move |interp, args, _kwargs, span| builtins::format_string(interp, &template, args, span)),
				})))
			}
			other => Err(SafulateError::Attribute(span.clone(), format!("'{}' has no attribute '{name}'", other.type_name()))),
		}
	}

	fn eval_bracket(&mut self, object: &Expr, items: &[Arg], env: &Env, span: &Span) -> Result<Value> {
		let obj_val = self.eval_expr(object, env)?;
		if obj_val.is_callable() {
			return self.make_partial(obj_val, items, env, span);
		}
		let (pos, _kw) = self.eval_args(items, env, span)?;
		match &obj_val {
			Value::List(list) => {
				let index = expect_index(&pos, span)?;
				let list = list.borrow();
				list.get(index)
					.cloned()
					.ok_or_else(|| SafulateError::Value(span.clone(), format!("index {index} out of range")))
			}
			Value::String(s) => {
				let index = expect_index(&pos, span)?;
				s.chars()
					.nth(index)
					.map(|c| Value::String(Rc::from(c.to_string())))
					.ok_or_else(|| SafulateError::Value(span.clone(), format!("index {index} out of range")))
			}
			Value::Object(obj) => {
				let spec = obj.borrow().specs.get("get").cloned();
				match spec {
					Some(f) => self.call_value(&f, pos, HashMap::new(), span.clone()),
					None => Err(SafulateError::Type(span.clone(), "object has no 'get' spec".into())),
				}
			}
			other => Err(SafulateError::Type(span.clone(), format!("'{}' is not subscriptable", other.type_name()))),
		}
	}

	fn eval_assign(&mut self, target: &Expr, value: &Expr, env: &Env, span: &Span) -> Result<Value> {
		match &target.kind {
			ExprKind::Identifier(name) => {
				let v = self.eval_expr(value, env)?;
				env.assign(name, v.clone(), span)?;
				Ok(v)
			}
			ExprKind::Attribute { .. } => Err(SafulateError::Attribute(
				span.clone(),
				"attribute write requires an edit block".into(),
			)),
			ExprKind::Bracket { object, items } => {
				let obj_val = self.eval_expr(object, env)?;
				let v = self.eval_expr(value, env)?;
				match &obj_val {
					Value::List(list) => {
						let (pos, _) = self.eval_args(items, env, span)?;
						let index = expect_index(&pos, span)?;
						let mut list = list.borrow_mut();
						if index >= list.len() {
							return Err(SafulateError::Value(span.clone(), format!("index {index} out of range")));
						}
						list[index] = v.clone();
						Ok(v)
					}
					Value::Object(obj) => {
						let spec = obj.borrow().specs.get("set").cloned();
						match spec {
							Some(f) => {
								let (mut pos, _) = self.eval_args(items, env, span)?;
								pos.push(v.clone());
								self.call_value(&f, pos, HashMap::new(), span.clone())?;
								Ok(v)
							}
							None => Err(SafulateError::Type(span.clone(), "object has no 'set' spec".into())),
						}
					}
					other => Err(SafulateError::Type(span.clone(), format!("'{}' is not subscript-assignable", other.type_name()))),
				}
			}
			_ => Err(SafulateError::Syntax(span.clone(), "invalid assignment target".into())),
		}
	}

	fn apply_unary(&mut self, op: UnaryOp, v: Value, span: &Span) -> Result<Value> {
		let spec_name = match op {
			UnaryOp::Neg => "neg",
			UnaryOp::Pos => "pos",
			UnaryOp::Not => "not",
		};
		if let Value::Object(obj) = &v {
			let spec = obj.borrow().specs.get(spec_name).cloned();
			if let Some(f) = spec {
				return self.call_value(&f, vec![], HashMap::new(), span.clone());
			}
		}
		let default = match op {
			UnaryOp::Neg => ops::default_unary_neg(&v),
			UnaryOp::Pos => ops::default_unary_pos(&v),
			UnaryOp::Not => ops::default_unary_not(&v),
		};
		default.ok_or_else(|| SafulateError::Type(span.clone(), format!("unsupported operand type for '{spec_name}': {}", v.type_name())))
	}

	fn apply_binary(&mut self, op: BinaryOp, l: Value, r: Value, span: &Span) -> Result<Value> {
		let spec_name = binary_spec_name(op);
		let (target, arg) = if op == BinaryOp::In { (&r, &l) } else { (&l, &r) };
		if let Value::Object(obj) = target {
			let spec = obj.borrow().specs.get(spec_name).cloned();
			if let Some(f) = spec {
				return self.call_value(&f, vec![arg.clone()], HashMap::new(), span.clone());
			}
		}
		let (default_op, default_l, default_r) = if op == BinaryOp::In { (BinaryOp::Contains, &r, &l) } else { (op, &l, &r) };
		if let Some(v) = ops::default_binary(default_op, default_l, default_r, span)? {
			return Ok(v);
		}
		Err(SafulateError::Type(
			span.clone(),
			format!("unsupported operand types for '{spec_name}': {} and {}", l.type_name(), r.type_name()),
		))
	}

	/// Equality used by `switch`/`case` matching: the `eq` spec if the
	/// scrutinee is an `Object` that defines one, else the same identity
	/// fallback as `apply_binary`'s default for `Eq`.
	fn values_equal(&mut self, a: &Value, b: &Value, span: &Span) -> Result<bool> {
		match self.apply_binary(BinaryOp::Eq, a.clone(), b.clone(), span)? {
			Value::Boolean(eq) => Ok(eq),
			other => other.truthy(self, span),
		}
	}
}

fn binary_spec_name(op: BinaryOp) -> &'static str {
	use BinaryOp::*;
	match op {
		Add => "add",
		Sub => "sub",
		Mul => "mul",
		Div => "div",
		Pow => "pow",
		Eq => "eq",
		Ne => "ne",
		Lt => "lt",
		Le => "le",
		Gt => "gt",
		Ge => "ge",
		Contains | In => "contains",
		Or => "or",
		And => "and",
	}
}

fn expect_index(args: &[Value], span: &Span) -> Result<usize> {
	match args.first() {
		Some(Value::Number(n)) if *n >= 0.0 => Ok(*n as usize),
		Some(Value::Number(_)) => Err(SafulateError::Value(span.clone(), "index must not be negative".into())),
		Some(other) => Err(SafulateError::Type(span.clone(), format!("index must be a number, got {}", other.type_name()))),
		None => Err(SafulateError::Argument(span.clone(), "subscript requires one index argument".into())),
	}
}
