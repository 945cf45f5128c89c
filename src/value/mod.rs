//! The runtime value universe: scalars, lists, objects, functions and the
//! handful of builtin types the evaluator needs to know about natively.
//!
//! Mutable, reference-identity values (`List`, `Object`) are `Rc<RefCell<_>>`
//! so that Safulate's "everything shared is mutated in place" semantics are
//! representable in safe Rust, rather than reaching for an unsafe cell.

mod function;
mod object;

pub use function::{Function, NativeFunction, Partial};
pub use object::Object;

use crate::ast::Param;
use crate::env::Env;
use crate::error::Result;
use crate::eval::Interpreter;
use crate::span::Span;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub enum Value {
	Number(f64),
	String(Rc<str>),
	Boolean(bool),
	Null,
	List(Rc<RefCell<Vec<Value>>>),
	Object(Rc<RefCell<Object>>),
	Function(Rc<Function>),
	Partial(Rc<Partial>),
	/// A zero-argument function wrapped by the `property` decorator.
	Property(Rc<Function>),
	BuiltinType(Rc<BuiltinType>),
	Native(Rc<NativeFunction>),
}

pub struct BuiltinType {
	pub name: &'static str,
	pub check: fn(&Value) -> bool,
}

impl Value {
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Number(_) => "num",
			Value::String(_) => "str",
			Value::Boolean(_) => "bool",
			Value::Null => "null",
			Value::List(_) => "list",
			Value::Object(_) => "object",
			Value::Function(_) => "function",
			Value::Partial(_) => "partial",
			Value::Property(_) => "property",
			Value::BuiltinType(_) => "type",
			Value::Native(_) => "function",
		}
	}

	/// Truthiness used by `if`/`while`/logical short-circuit operators.
	/// Falls back to the `bool` spec for objects.
	pub fn truthy(&self, interp: &mut Interpreter, span: &Span) -> Result<bool> {
		Ok(match self {
			Value::Boolean(b) => *b,
			Value::Null => false,
			Value::Number(n) => *n != 0.0,
			Value::String(s) => !s.is_empty(),
			Value::List(l) => !l.borrow().is_empty(),
			Value::Object(obj) => {
				if let Some(spec) = obj.borrow().specs.get("bool").cloned() {
					return interp.call_value(&spec, vec![], HashMap::new(), span.clone())?.truthy(interp, span);
				}
				true
			}
			_ => true,
		})
	}

	pub fn is_callable(&self) -> bool {
		matches!(
			self,
			Value::Function(_) | Value::Partial(_) | Value::Native(_) | Value::BuiltinType(_)
		)
	}

	/// Identity/value equality for the cases the evaluator must decide
	/// without going through `eq`-spec dispatch (e.g. switch scrutinee
	/// comparison falls back here when a value has no spec, and object
	/// equality with no spec defaults to identity per Open Question (c)).
	pub fn raw_eq(&self, other: &Value) -> bool {
		match (self, other) {
			(Value::Number(a), Value::Number(b)) => a == b,
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Boolean(a), Value::Boolean(b)) => a == b,
			(Value::Null, Value::Null) => true,
			(Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
			(Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
			(Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
			(Value::Partial(a), Value::Partial(b)) => Rc::ptr_eq(a, b),
			(Value::Property(a), Value::Property(b)) => Rc::ptr_eq(a, b),
			(Value::BuiltinType(a), Value::BuiltinType(b)) => Rc::ptr_eq(a, b),
			(Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}

	pub fn new_object() -> Value {
		Value::Object(Rc::new(RefCell::new(Object::new())))
	}

	pub fn new_function(
		name: Option<String>,
		params: Vec<Param>,
		body: Rc<crate::ast::Stmt>,
		env: Env,
	) -> Value {
		Value::Function(Rc::new(Function {
			name,
			params,
			body,
			env,
			parent: None,
		}))
	}

	/// Produces the display form used by `print`/f-string interpolation,
	/// dispatching through the `repr` spec for objects when present.
	pub fn display(&self, interp: &mut Interpreter, span: &Span) -> Result<String> {
		if let Value::Object(obj) = self {
			if let Some(spec) = obj.borrow().specs.get("repr").cloned() {
				let result = interp.call_value(&spec, vec![], HashMap::new(), span.clone())?;
				return result.display(interp, span);
			}
		}
		Ok(format!("{self}"))
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Number(n) => {
				if n.fract() == 0.0 && n.is_finite() {
					write!(f, "{}", *n as i64)
				} else {
					write!(f, "{n}")
				}
			}
			Value::String(s) => write!(f, "{s}"),
			Value::Boolean(b) => write!(f, "{b}"),
			Value::Null => write!(f, "null"),
			Value::List(l) => {
				write!(f, "[")?;
				for (i, item) in l.borrow().iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{item}")?;
				}
				write!(f, "]")
			}
			Value::Object(_) => write!(f, "<object>"),
			Value::Function(func) => write!(f, "<function {}>", func.name.as_deref().unwrap_or("anonymous")),
			Value::Partial(_) => write!(f, "<partial>"),
			Value::Property(_) => write!(f, "<property>"),
			Value::BuiltinType(t) => write!(f, "<type {}>", t.name),
			Value::Native(n) => write!(f, "<builtin {}>", n.name),
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{self}")
	}
}
