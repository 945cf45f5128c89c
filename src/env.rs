//! Lexical scoping plus the object-bound frames used by edit blocks and
//! method calls.
//!
//! An [`Env`] is a cheaply-cloned handle (`Rc`) onto a chain of frames. Each
//! frame has its own local `vars` table and an optional `target` object: for
//! an edit block (`obj ~ { .. }`) the target is the object being edited; for
//! a call frame it is the object a method was read through (late-bound
//! `parent`). Both cases share the same identifier-resolution rule (vars,
//! then target's private/public, then the parent frame), which is why a
//! single `target: Option<Value>` field covers them.

use crate::error::{Result, SafulateError};
use crate::span::Span;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

struct Frame {
	vars: RefCell<HashMap<String, Value>>,
	target: Option<Value>,
	/// True only for genuine edit blocks / type bodies, not for plain
	/// method-call frames. `pub`/`priv`/`spec` declarations only write
	/// through a frame where this is set — identifier lookup and assignment
	/// ignore it and use any `target`.
	is_edit: bool,
	parent: Option<Env>,
}

#[derive(Clone)]
pub struct Env(Rc<Frame>);

impl Env {
	pub fn root() -> Env {
		Env(Rc::new(Frame {
			vars: RefCell::new(HashMap::new()),
			target: None,
			is_edit: false,
			parent: None,
		}))
	}

	/// A fresh lexical scope nested under `self` (blocks, loop bodies, ...).
	pub fn child(&self) -> Env {
		Env(Rc::new(Frame {
			vars: RefCell::new(HashMap::new()),
			target: None,
			is_edit: false,
			parent: Some(self.clone()),
		}))
	}

	/// A call frame bound to `target` (the object a method was read
	/// through), nested under `self` — `self` is the function's captured
	/// environment, not the caller's.
	pub fn child_bound(&self, target: Value) -> Env {
		Env(Rc::new(Frame {
			vars: RefCell::new(HashMap::new()),
			target: Some(target),
			is_edit: false,
			parent: Some(self.clone()),
		}))
	}

	/// An edit-block frame bound to `target`, nested under `self`.
	pub fn child_edit(&self, target: Value) -> Env {
		Env(Rc::new(Frame {
			vars: RefCell::new(HashMap::new()),
			target: Some(target),
			is_edit: true,
			parent: Some(self.clone()),
		}))
	}

	pub fn declare_var(&self, name: &str, value: Value) {
		self.0.vars.borrow_mut().insert(name.to_string(), value);
	}

	pub fn declare_pub(&self, name: &str, value: Value, span: &Span) -> Result<()> {
		let obj = self.nearest_target(span, "pub")?;
		obj.public.insert(name.to_string(), value);
		Ok(())
	}

	pub fn declare_priv(&self, name: &str, value: Value, span: &Span) -> Result<()> {
		let obj = self.nearest_target(span, "priv")?;
		obj.private.insert(name.to_string(), value);
		Ok(())
	}

	pub fn declare_spec(&self, name: &str, value: Value, span: &Span) -> Result<()> {
		let obj = self.nearest_target(span, "spec")?;
		obj.specs.insert(name.to_string(), value);
		Ok(())
	}

	/// The object bound by the nearest enclosing edit block / call frame,
	/// for declarations that must land on an object's namespace.
	fn nearest_target(&self, span: &Span, keyword: &str) -> Result<std::cell::RefMut<'_, crate::value::Object>> {
		let mut frame = self.0.clone();
		loop {
			if frame.is_edit {
				if let Some(Value::Object(obj)) = &frame.target {
					return Ok(obj.borrow_mut());
				}
			}
			match &frame.parent {
				Some(parent) => frame = parent.0.clone(),
				None => {
					return Err(SafulateError::Name(
						span.clone(),
						format!("'{keyword}' declaration outside of an edit block or method"),
					))
				}
			}
		}
	}

	/// Whether `self` is nested (directly or through plain lexical frames)
	/// inside a genuine edit block — used to decide whether `func`/`spec`
	/// statements bind a bound method onto an object or a plain local.
	pub fn in_edit_scope(&self) -> bool {
		let mut frame = self.0.clone();
		loop {
			if frame.is_edit && matches!(frame.target, Some(Value::Object(_))) {
				return true;
			}
			match &frame.parent {
				Some(parent) => frame = parent.0.clone(),
				None => return false,
			}
		}
	}

	pub fn assign(&self, name: &str, value: Value, span: &Span) -> Result<()> {
		let mut frame = Some(self.0.clone());
		while let Some(f) = frame {
			if f.vars.borrow().contains_key(name) {
				f.vars.borrow_mut().insert(name.to_string(), value);
				return Ok(());
			}
			if let Some(Value::Object(obj)) = &f.target {
				let mut obj = obj.borrow_mut();
				if obj.public.contains_key(name) {
					obj.public.insert(name.to_string(), value);
					return Ok(());
				}
				if obj.private.contains_key(name) {
					obj.private.insert(name.to_string(), value);
					return Ok(());
				}
			}
			frame = f.parent.as_ref().map(|p| p.0.clone());
		}
		Err(SafulateError::Name(span.clone(), format!("'{name}' is not declared")))
	}

	pub fn lookup(&self, name: &str) -> Option<Value> {
		self.lookup_from(Some(self.0.clone()), name)
	}

	/// Implements `\name` — resolution starting at the parent of the
	/// current frame, skipping its own locals.
	pub fn lookup_outer(&self, name: &str) -> Option<Value> {
		self.lookup_from(self.0.parent.as_ref().map(|p| p.0.clone()), name)
	}

	fn lookup_from(&self, mut frame: Option<Rc<Frame>>, name: &str) -> Option<Value> {
		while let Some(f) = frame {
			if let Some(v) = f.vars.borrow().get(name) {
				return Some(v.clone());
			}
			if let Some(Value::Object(obj)) = &f.target {
				let obj = obj.borrow();
				if let Some(v) = obj.private.get(name) {
					return Some(v.clone());
				}
				if let Some(v) = obj.public.get(name) {
					return Some(v.clone());
				}
			}
			frame = f.parent.as_ref().map(|p| p.0.clone());
		}
		None
	}

	pub fn delete(&self, name: &str, span: &Span) -> Result<()> {
		let mut frame = Some(self.0.clone());
		while let Some(f) = frame {
			if f.vars.borrow_mut().remove(name).is_some() {
				return Ok(());
			}
			if let Some(Value::Object(obj)) = &f.target {
				let mut obj = obj.borrow_mut();
				if obj.public.remove(name).is_some() || obj.private.remove(name).is_some() {
					return Ok(());
				}
			}
			frame = f.parent.as_ref().map(|p| p.0.clone());
		}
		Err(SafulateError::Name(span.clone(), format!("'{name}' is not declared")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn shadowing_is_scoped() {
		let root = Env::root();
		root.declare_var("x", Value::Number(5.0));
		let inner = root.child();
		inner.declare_var("x", Value::Number(10.0));
		assert!(matches!(inner.lookup("x"), Some(Value::Number(n)) if n == 10.0));
		assert!(matches!(root.lookup("x"), Some(Value::Number(n)) if n == 5.0));
	}

	#[test]
	fn plain_assignment_requires_existing_binding() {
		let root = Env::root();
		let span = Span::synthetic();
		assert!(root.assign("y", Value::Number(1.0), &span).is_err());
		root.declare_var("y", Value::Number(0.0));
		assert!(root.assign("y", Value::Number(1.0), &span).is_ok());
	}

	#[test]
	fn assignment_through_child_mutates_outer_binding() {
		let root = Env::root();
		root.declare_var("x", Value::Number(1.0));
		let inner = root.child();
		inner.assign("x", Value::Number(2.0), &Span::synthetic()).unwrap();
		assert!(matches!(root.lookup("x"), Some(Value::Number(n)) if n == 2.0));
	}
}
