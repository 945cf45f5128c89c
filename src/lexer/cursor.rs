use crate::span::Pos;

/// Indexes a position in the source text and provides methods for consuming
/// it one character at a time.
///
/// Designed with lightweight copy semantics so lookahead is just "save a
/// cursor, try to read, restore on failure".
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
	pub text: &'a str,
	pub pos: Pos,
}

impl<'a> Cursor<'a> {
	pub fn new(text: &'a str) -> Self {
		Cursor {
			text,
			pos: Pos::default(),
		}
	}

	pub fn at_end(&self) -> bool {
		self.pos.offset >= self.text.len()
	}

	pub fn peek(&self) -> Option<char> {
		self.text[self.pos.offset..].chars().next()
	}

	pub fn peek_at(&self, ahead: usize) -> Option<char> {
		self.text[self.pos.offset..].chars().nth(ahead)
	}

	pub fn read(&mut self) -> Option<char> {
		let next = self.peek()?;
		let offset = self.pos.offset + next.len_utf8();
		self.advance(next, offset);
		Some(next)
	}

	pub fn read_if(&mut self, expected: char) -> bool {
		let save = *self;
		if self.read() == Some(expected) {
			true
		} else {
			*self = save;
			false
		}
	}

	fn advance(&mut self, next: char, offset: usize) {
		match next {
			'\n' => {
				self.pos.line += 1;
				self.pos.column = 0;
			}
			_ => {
				self.pos.column += 1;
			}
		}
		self.pos.offset = offset;
	}
}
