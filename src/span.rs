//! Source positions and spans, shared by the lexer, parser and evaluator.

use std::fmt;
use std::rc::Rc;

/// A single location in a [`Source`], tracked as line/column plus a raw
/// byte offset so slicing the original text is O(1).
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub struct Pos {
	pub line: usize,
	pub column: usize,
	pub offset: usize,
}

impl fmt::Display for Pos {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.line + 1, self.column + 1)
	}
}

/// A source file (or synthetic origin) loaded into memory.
#[derive(Clone, Debug)]
pub struct Source {
	pub name: Rc<str>,
	pub text: Rc<str>,
}

impl Source {
	pub fn new(name: impl Into<Rc<str>>, text: impl Into<Rc<str>>) -> Self {
		Source {
			name: name.into(),
			text: text.into(),
		}
	}

	pub fn synthetic(text: impl Into<Rc<str>>) -> Self {
		Source::new("<script>", text)
	}
}

/// A half-open `[start, end)` range in a [`Source`].
#[derive(Clone, Debug)]
pub struct Span {
	pub source: Rc<str>,
	pub start: Pos,
	pub end: Pos,
}

impl Span {
	pub fn new(source: Rc<str>, start: Pos, end: Pos) -> Self {
		Span { source, start, end }
	}

	/// A span with no useful location, used for values synthesized by the
	/// evaluator (e.g. builtins) rather than parsed from source text.
	pub fn synthetic() -> Self {
		Span {
			source: Rc::from("<builtin>"),
			start: Pos::default(),
			end: Pos::default(),
		}
	}

	pub fn merge(&self, other: &Span) -> Span {
		Span {
			source: self.source.clone(),
			start: self.start,
			end: other.end,
		}
	}
}

impl fmt::Display for Span {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.source, self.start)
	}
}
