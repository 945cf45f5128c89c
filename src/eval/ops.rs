//! Default operator behavior for builtin scalars. Consulted only when the
//! left operand (or, for `in`, the right operand) is not an `Object` with a
//! matching entry in its `specs` table.

use crate::ast::BinaryOp;
use crate::error::{Result, SafulateError};
use crate::span::Span;
use crate::value::Value;
use std::rc::Rc;

/// `Some(value)` if a default exists for this operator/operand-type
/// combination, `None` if the evaluator should raise `TypeError`.
pub fn default_binary(op: BinaryOp, l: &Value, r: &Value, span: &Span) -> Result<Option<Value>> {
	use BinaryOp::*;
	use Value::*;

	if matches!(op, Eq | Ne) {
		let eq = l.raw_eq(r);
		return Ok(Some(Boolean(if op == Eq { eq } else { !eq })));
	}

	let result = match (op, l, r) {
		(Add, Number(a), Number(b)) => Number(a + b),
		(Sub, Number(a), Number(b)) => Number(a - b),
		(Mul, Number(a), Number(b)) => Number(a * b),
		(Div, Number(a), Number(b)) => {
			if *b == 0.0 {
				return Err(SafulateError::Value(span.clone(), "division by zero".into()));
			}
			Number(a / b)
		}
		(Pow, Number(a), Number(b)) => Number(a.powf(*b)),
		(Lt, Number(a), Number(b)) => Boolean(a < b),
		(Le, Number(a), Number(b)) => Boolean(a <= b),
		(Gt, Number(a), Number(b)) => Boolean(a > b),
		(Ge, Number(a), Number(b)) => Boolean(a >= b),

		(Add, String(a), String(b)) => String(Rc::from(format!("{a}{b}"))),
		(Lt, String(a), String(b)) => Boolean(a < b),
		(Le, String(a), String(b)) => Boolean(a <= b),
		(Gt, String(a), String(b)) => Boolean(a > b),
		(Ge, String(a), String(b)) => Boolean(a >= b),
		(Contains, String(a), String(b)) => Boolean(a.contains(b.as_ref())),

		(Add, List(a), List(b)) => {
			let mut items = a.borrow().clone();
			items.extend(b.borrow().iter().cloned());
			Value::List(Rc::new(std::cell::RefCell::new(items)))
		}
		(Contains, List(items), needle) => Boolean(items.borrow().iter().any(|item| item.raw_eq(needle))),

		(Or, Boolean(a), Boolean(b)) => Boolean(*a || *b),
		(And, Boolean(a), Boolean(b)) => Boolean(*a && *b),

		_ => return Ok(None),
	};
	Ok(Some(result))
}

pub fn default_unary_neg(v: &Value) -> Option<Value> {
	match v {
		Value::Number(n) => Some(Value::Number(-n)),
		_ => None,
	}
}

pub fn default_unary_pos(v: &Value) -> Option<Value> {
	match v {
		Value::Number(n) => Some(Value::Number(*n)),
		_ => None,
	}
}

pub fn default_unary_not(v: &Value) -> Option<Value> {
	match v {
		Value::Boolean(b) => Some(Value::Boolean(!b)),
		_ => None,
	}
}
