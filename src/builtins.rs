//! The native function set every interpreter starts with.
//!
//! Each builtin is a [`crate::value::NativeFunction`] closure installed into
//! the global scope by [`install`]; see `eval::call::call_value` for how
//! `Value::Native` dispatches into these.

use crate::error::{Result, SafulateError};
use crate::eval::Interpreter;
use crate::span::Span;
use crate::value::{BuiltinType, NativeFunction, Object, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub fn install(interp: &mut Interpreter) {
	native(interp, "print", print);
	native(interp, "object", object);
	native(interp, "list", list);
	native(interp, "dict", dict);
	native(interp, "assert", assert);
	native(interp, "len", len);

	interp.define_builtin("types", types_namespace());
	interp.define_builtin("property", property_decorator());
}

fn native(interp: &mut Interpreter, name: &str, func: impl Fn(&mut Interpreter, Vec<Value>, HashMap<String, Value>, Span) -> Result<Value> + 'static) {
	interp.define_builtin(
		name,
		Value::Native(Rc::new(NativeFunction {
			name: name.to_string(),
			func: Box::new(func),
		})),
	);
}

fn print(interp: &mut Interpreter, args: Vec<Value>, _kwargs: HashMap<String, Value>, span: Span) -> Result<Value> {
	let mut parts = Vec::with_capacity(args.len());
	for arg in &args {
		parts.push(arg.display(interp, &span)?);
	}
	println!("{}", parts.join(" "));
	Ok(Value::Null)
}

fn object(_interp: &mut Interpreter, _args: Vec<Value>, _kwargs: HashMap<String, Value>, _span: Span) -> Result<Value> {
	Ok(Value::new_object())
}

fn list(_interp: &mut Interpreter, args: Vec<Value>, _kwargs: HashMap<String, Value>, _span: Span) -> Result<Value> {
	Ok(Value::List(Rc::new(RefCell::new(args))))
}

/// `dict(**kwargs)` — an object whose public namespace is the call's
/// keyword arguments; plain positional arguments are rejected.
fn dict(_interp: &mut Interpreter, args: Vec<Value>, kwargs: HashMap<String, Value>, span: Span) -> Result<Value> {
	if !args.is_empty() {
		return Err(SafulateError::Argument(span, "dict() takes only keyword arguments".into()));
	}
	let obj = Object {
		public: kwargs,
		..Object::new()
	};
	Ok(Value::Object(Rc::new(RefCell::new(obj))))
}

fn assert(interp: &mut Interpreter, args: Vec<Value>, _kwargs: HashMap<String, Value>, span: Span) -> Result<Value> {
	let mut args = args.into_iter();
	let cond = args.next().ok_or_else(|| SafulateError::Argument(span.clone(), "assert() requires a condition".into()))?;
	if cond.truthy(interp, &span)? {
		return Ok(Value::Null);
	}
	let message = match args.next() {
		Some(v) => v.display(interp, &span)?,
		None => "assertion failed".to_string(),
	};
	Err(SafulateError::Value(span, message))
}

fn len(interp: &mut Interpreter, args: Vec<Value>, _kwargs: HashMap<String, Value>, span: Span) -> Result<Value> {
	let value = args.into_iter().next().ok_or_else(|| SafulateError::Argument(span.clone(), "len() requires one argument".into()))?;
	let n = match &value {
		Value::List(items) => items.borrow().len(),
		Value::String(s) => s.chars().count(),
		Value::Object(obj) => {
			let spec = obj.borrow().specs.get("len").cloned();
			match spec {
				Some(f) => {
					return interp.call_value(&f, vec![], HashMap::new(), span);
				}
				None => return Err(SafulateError::Type(span, "object has no 'len' spec".into())),
			}
		}
		other => return Err(SafulateError::Type(span, format!("{} has no length", other.type_name()))),
	};
	Ok(Value::Number(n as f64))
}

/// `"{}-{}".format(a, b)` — `{}` placeholders filled positionally in order.
pub fn format_string(interp: &mut Interpreter, template: &str, args: Vec<Value>, span: Span) -> Result<Value> {
	let mut out = String::new();
	let mut args = args.into_iter();
	let mut chars = template.chars().peekable();
	while let Some(c) = chars.next() {
		if c == '{' && chars.peek() == Some(&'}') {
			chars.next();
			let arg = args
				.next()
				.ok_or_else(|| SafulateError::Argument(span.clone(), "not enough arguments for format()".into()))?;
			out.push_str(&arg.display(interp, &span)?);
		} else {
			out.push(c);
		}
	}
	Ok(Value::String(Rc::from(out)))
}

/// `types.str`/`.num`/`.list`/`.property`, each exposing `.check(v)`.
fn types_namespace() -> Value {
	let mut public = HashMap::new();
	public.insert("str".to_string(), builtin_type("str", |v| matches!(v, Value::String(_))));
	public.insert("num".to_string(), builtin_type("num", |v| matches!(v, Value::Number(_))));
	public.insert("bool".to_string(), builtin_type("bool", |v| matches!(v, Value::Boolean(_))));
	public.insert("list".to_string(), builtin_type("list", |v| matches!(v, Value::List(_))));
	public.insert("object".to_string(), builtin_type("object", |v| matches!(v, Value::Object(_))));
	public.insert(
		"function".to_string(),
		builtin_type("function", |v| matches!(v, Value::Function(_) | Value::Native(_) | Value::Partial(_))),
	);
	public.insert("property".to_string(), builtin_type("property", |v| matches!(v, Value::Property(_))));
	Value::Object(Rc::new(RefCell::new(Object {
		public,
		..Object::new()
	})))
}

fn builtin_type(name: &'static str, check: fn(&Value) -> bool) -> Value {
	Value::BuiltinType(Rc::new(BuiltinType { name, check }))
}

/// `property` decorator: wraps a zero-arg function so attribute reads invoke
/// it instead of returning it as-is.
fn property_decorator() -> Value {
	Value::Native(Rc::new(NativeFunction {
		name: "property".to_string(),
		func: Box::new(|_interp, args, _kwargs, span| {
			let mut args = args.into_iter();
			match args.next() {
				Some(Value::Function(f)) => Ok(Value::Property(f)),
				Some(other) => Err(SafulateError::Type(span, format!("property() requires a function, got {}", other.type_name()))),
				None => Err(SafulateError::Argument(span, "property() requires a function argument".into())),
			}
		}),
	}))
}
