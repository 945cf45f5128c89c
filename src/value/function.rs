use super::Value;
use crate::ast::{Param, Stmt};
use crate::env::Env;
use crate::error::Result;
use crate::eval::Interpreter;
use crate::span::Span;
use std::collections::HashMap;
use std::rc::Rc;

/// A user-defined function, struct constructor, or spec. Struct constructors
/// are ordinary `Function`s whose body is the desugared form built by
/// `eval::decl::desugar_struct`.
pub struct Function {
	pub name: Option<String>,
	pub params: Vec<Param>,
	pub body: Rc<Stmt>,
	/// The lexical environment captured at definition time (closure).
	pub env: Env,
	/// Set only on the transient bound-method wrapper produced when a
	/// function is read off an object's public namespace — never mutated on
	/// the stored function.
	pub parent: Option<Value>,
}

impl Function {
	/// Returns a copy of this function bound to `parent`, used by attribute
	/// read when a method is looked up on an object. Cheap: `body`/`env` are
	/// reference-counted.
	pub fn bind(&self, parent: Value) -> Function {
		Function {
			name: self.name.clone(),
			params: self.params.clone(),
			body: self.body.clone(),
			env: self.env.clone(),
			parent: Some(parent),
		}
	}
}

/// `f[a, b]` — a callable with some leading positional arguments already
/// bound.
pub struct Partial {
	pub callee: Value,
	pub args: Vec<Value>,
}

impl Partial {
	pub fn without_partials(&self) -> Value {
		let mut callee = self.callee.clone();
		while let Value::Partial(inner) = &callee {
			callee = inner.callee.clone();
		}
		callee
	}
}

pub type NativeFn = dyn Fn(&mut Interpreter, Vec<Value>, HashMap<String, Value>, Span) -> Result<Value>;

/// A Rust-implemented builtin (`print`, `object`, `list`, ...). See
/// `crate::builtins` for the standard set installed by
/// `Interpreter::with_default_builtins`.
pub struct NativeFunction {
	pub name: String,
	pub func: Box<NativeFn>,
}
