use crate::error::SafulateError;
use crate::value::Value;

/// Non-local control transfer produced by executing a statement. Ordinary
/// completion is `Ok(None)`; everything else unwinds through the enclosing
/// statement executors until something is positioned to absorb it (a loop
/// absorbs `Break`/`Continue` at depth 1, a function call absorbs `Return`,
/// `try` absorbs `Raise` as a catchable `SafulateError::UserRaised`).
pub enum Signal {
	Break(u32),
	Continue(u32),
	Return(Value),
}

pub type Flow<T> = Result<T, Outcome>;

/// Either a `Signal` unwinding the Rust call stack, or a genuine error.
/// Kept distinct from `SafulateError` because break/continue/return are not
/// errors and must never be catchable by `try`/`catch`.
pub enum Outcome {
	Signal(Signal),
	Error(SafulateError),
}

impl From<SafulateError> for Outcome {
	fn from(err: SafulateError) -> Self {
		Outcome::Error(err)
	}
}

impl Signal {
	/// Decrement a break/continue depth after absorbing one loop level.
	/// Returns `None` once the signal is fully absorbed (depth reaches 0).
	pub fn step_out(self) -> Option<Signal> {
		match self {
			Signal::Break(n) if n > 1 => Some(Signal::Break(n - 1)),
			Signal::Break(_) => None,
			Signal::Continue(n) if n > 1 => Some(Signal::Continue(n - 1)),
			Signal::Continue(_) => None,
			Signal::Return(v) => Some(Signal::Return(v)),
		}
	}
}
