//! Argument evaluation and binding, and the call dispatch shared by ordinary
//! calls and spec-operator dispatch.

use super::control::{Outcome, Signal};
use super::Interpreter;
use crate::ast::Arg;
use crate::env::Env;
use crate::error::{Result, SafulateError};
use crate::span::Span;
use crate::value::{Function, Object, Partial};
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

impl Interpreter {
	/// Evaluates a call's argument list into the positional/keyword values
	/// `call_value` binds against, expanding spreads in source order.
	/// Dynamic-name keywords are applied last.
	pub(super) fn eval_args(&mut self, args: &[Arg], env: &Env, span: &Span) -> Result<(Vec<Value>, HashMap<String, Value>)> {
		let mut positional = Vec::new();
		let mut keywords: HashMap<String, Value> = HashMap::new();
		let mut dynamic = Vec::new();

		for arg in args {
			match arg {
				Arg::Positional(expr) => positional.push(self.eval_expr(expr, env)?),
				Arg::Spread(expr) => {
					let value = self.eval_expr(expr, env)?;
					match value {
						Value::List(items) => positional.extend(items.borrow().iter().cloned()),
						other => {
							return Err(SafulateError::Type(
								span.clone(),
								format!("cannot spread a {}", other.type_name()),
							))
						}
					}
				}
				Arg::Keyword(name, expr) => {
					let value = self.eval_expr(expr, env)?;
					if keywords.insert(name.clone(), value).is_some() {
						return Err(SafulateError::Argument(span.clone(), format!("duplicate keyword argument '{name}'")));
					}
				}
				Arg::KeywordSpread(expr) => {
					let value = self.eval_expr(expr, env)?;
					match value {
						Value::Object(obj) => {
							for (k, v) in obj.borrow().public.iter() {
								if keywords.insert(k.clone(), v.clone()).is_some() {
									return Err(SafulateError::Argument(span.clone(), format!("duplicate keyword argument '{k}'")));
								}
							}
						}
						other => {
							return Err(SafulateError::Type(
								span.clone(),
								format!("cannot spread a {} as keywords", other.type_name()),
							))
						}
					}
				}
				Arg::DynKeyword(name_expr, value_expr) => {
					let name_value = self.eval_expr(name_expr, env)?;
					let name = match name_value {
						Value::String(s) => s.to_string(),
						other => other.display(self, span)?,
					};
					let value = self.eval_expr(value_expr, env)?;
					dynamic.push((name, value));
				}
			}
		}

		for (name, value) in dynamic {
			if keywords.insert(name.clone(), value).is_some() {
				return Err(SafulateError::Argument(span.clone(), format!("duplicate keyword argument '{name}'")));
			}
		}

		Ok((positional, keywords))
	}

	/// Calls any callable `Value` with already-evaluated arguments. Used
	/// both for ordinary `Call` expressions and for spec dispatch (where the
	/// "arguments" are the operator's operands).
	pub fn call_value(&mut self, callee: &Value, args: Vec<Value>, kwargs: HashMap<String, Value>, span: Span) -> Result<Value> {
		match callee {
			Value::Partial(_) => {
				let (base, mut bound) = collect_partial_args(callee);
				bound.extend(args);
				self.call_value(&base, bound, kwargs, span)
			}
			Value::Function(f) => self.call_function(f.clone(), args, kwargs, span),
			Value::Native(n) => (n.func)(self, args, kwargs, span),
			Value::Property(f) => self.call_function(f.clone(), args, kwargs, span),
			other => Err(SafulateError::Type(span, format!("'{}' is not callable", other.type_name()))),
		}
	}

	fn call_function(&mut self, func: Rc<Function>, args: Vec<Value>, mut kwargs: HashMap<String, Value>, span: Span) -> Result<Value> {
		if self.depth >= self.max_depth {
			return Err(SafulateError::StackOverflow(span));
		}

		let call_env = match &func.parent {
			Some(parent) => func.env.child_bound(parent.clone()),
			None => func.env.child(),
		};

		let mut args = args.into_iter();
		for param in &func.params {
			let value = if let Some(v) = args.next() {
				v
			} else if let Some(v) = kwargs.remove(&param.name) {
				v
			} else if let Some(default) = &param.default {
				self.eval_expr(default, &func.env)?
			} else {
				return Err(SafulateError::Argument(span, format!("missing required parameter '{}'", param.name)));
			};
			call_env.declare_var(&param.name, value);
		}
		if args.next().is_some() {
			return Err(SafulateError::Argument(span, "too many positional arguments".into()));
		}
		if let Some((name, _)) = kwargs.into_iter().next() {
			return Err(SafulateError::Argument(span, format!("unexpected keyword argument '{name}'")));
		}

		self.depth += 1;
		let result = self.exec_stmt(&func.body, &call_env);
		self.depth -= 1;

		match result {
			Ok(()) => Ok(Value::Null),
			Err(Outcome::Signal(Signal::Return(value))) => Ok(value),
			Err(Outcome::Signal(Signal::Break(_) | Signal::Continue(_))) => Ok(Value::Null),
			Err(Outcome::Error(err)) => Err(err),
		}
	}

	/// `f[a, b]` — builds a `Partial` with `a, b` bound as leading arguments.
	pub(super) fn make_partial(&mut self, callee: Value, items: &[Arg], env: &Env, span: &Span) -> Result<Value> {
		let (args, kwargs) = self.eval_args(items, env, span)?;
		if !kwargs.is_empty() {
			return Err(SafulateError::Argument(span.clone(), "partial application does not accept keyword arguments".into()));
		}
		Ok(Value::Partial(Rc::new(Partial { callee, args })))
	}

	pub(crate) fn new_object_with_type(type_tag: Option<String>) -> (Value, Rc<std::cell::RefCell<Object>>) {
		let obj = Rc::new(std::cell::RefCell::new(Object {
			type_tag,
			..Object::new()
		}));
		(Value::Object(obj.clone()), obj)
	}
}

fn collect_partial_args(value: &Value) -> (Value, Vec<Value>) {
	match value {
		Value::Partial(p) => {
			let (base, mut args) = collect_partial_args(&p.callee);
			args.extend(p.args.iter().cloned());
			(base, args)
		}
		other => (other.clone(), Vec::new()),
	}
}
