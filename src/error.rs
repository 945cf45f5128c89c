//! Error kinds produced by the lexer, parser and evaluator.
//!
//! `Lexical` and `Syntax` are produced before execution starts and propagate
//! as plain `Result::Err` values; every other variant can also be raised and
//! caught from inside a running program via `try`/`catch`.

use crate::span::Span;
use crate::value::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SafulateError>;

#[derive(Debug, Clone, Error)]
pub enum SafulateError {
	#[error("{0:?}: lexical error: {1}")]
	Lexical(Span, String),

	#[error("{0:?}: syntax error: {1}")]
	Syntax(Span, String),

	#[error("{0:?}: name error: {1}")]
	Name(Span, String),

	#[error("{0:?}: attribute error: {1}")]
	Attribute(Span, String),

	#[error("{0:?}: argument error: {1}")]
	Argument(Span, String),

	#[error("{0:?}: type error: {1}")]
	Type(Span, String),

	#[error("{0:?}: value error: {1}")]
	Value(Span, String),

	#[error("{0:?}: version error: {1}")]
	Version(Span, String),

	#[error("{0:?}: import error: {1}")]
	Import(Span, String),

	#[error("{0:?}: stack overflow")]
	StackOverflow(Span),

	/// Any value raised with `raise expr`, including values raised by the
	/// other variants above when they cross a `try`/`catch` boundary.
	#[error("{0:?}: raised: {1:?}")]
	UserRaised(Span, Value),
}

impl SafulateError {
	pub fn span(&self) -> &Span {
		match self {
			SafulateError::Lexical(s, _)
			| SafulateError::Syntax(s, _)
			| SafulateError::Name(s, _)
			| SafulateError::Attribute(s, _)
			| SafulateError::Argument(s, _)
			| SafulateError::Type(s, _)
			| SafulateError::Value(s, _)
			| SafulateError::Version(s, _)
			| SafulateError::Import(s, _)
			| SafulateError::StackOverflow(s)
			| SafulateError::UserRaised(s, _) => s,
		}
	}

	/// The value a `catch` clause binds: the original raised value for
	/// `UserRaised`, or a string message for everything else so that
	/// `catch e { print(e) }` always has something printable.
	pub fn into_value(self) -> Value {
		match self {
			SafulateError::UserRaised(_, value) => value,
			other => Value::String(std::rc::Rc::from(other.to_string())),
		}
	}

	pub fn is_catchable(&self) -> bool {
		!matches!(self, SafulateError::Lexical(..) | SafulateError::Syntax(..))
	}
}
