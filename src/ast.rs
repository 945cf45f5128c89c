//! The parse tree produced by [`crate::parser`] and walked by [`crate::eval`].
//!
//! Nodes are plain owned trees (`Box`/`Vec`), not an arena — programs are
//! parsed once and walked directly, so there is no need for handle-based
//! indirection into a separate node table.

use crate::span::Span;

#[derive(Clone, Debug)]
pub struct Program {
	pub statements: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct Param {
	pub name: String,
	pub default: Option<Expr>,
}

#[derive(Clone, Debug)]
pub enum FStringSeg {
	Text(String),
	Expr(Expr),
	DynName(Expr),
}

#[derive(Clone, Debug)]
pub enum ExprKind {
	Number(f64),
	String(String),
	FString(Vec<FStringSeg>),
	List(Vec<Expr>),
	Boolean(bool),
	Null,
	Identifier(String),
	/// `\name` — reference to the nearest *enclosing* (non-call) lexical
	/// binding, skipping the innermost scope. Experimental, see DESIGN.md.
	OuterRef(String),
	Unary(UnaryOp, Box<Expr>),
	Binary(BinaryOp, Box<Expr>, Box<Expr>),
	Logical(LogicalOp, Box<Expr>, Box<Expr>),
	Call {
		callee: Box<Expr>,
		args: Vec<Arg>,
	},
	Attribute {
		object: Box<Expr>,
		name: String,
	},
	/// `expr[ items ]`. At evaluation time this is either a subscript
	/// (indexing a list/string) or a partial application, decided by the
	/// runtime type of `object` — see `eval::call::apply_brackets`.
	Bracket {
		object: Box<Expr>,
		items: Vec<Arg>,
	},
	Assign {
		target: Box<Expr>,
		value: Box<Expr>,
	},
}

#[derive(Clone, Debug)]
pub struct Expr {
	pub kind: ExprKind,
	pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Arg {
	Positional(Expr),
	Spread(Expr),
	Keyword(String, Expr),
	KeywordSpread(Expr),
	DynKeyword(Expr, Expr),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
	Neg,
	Pos,
	Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
	Add,
	Sub,
	Mul,
	Div,
	Pow,
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
	In,
	Contains,
	/// `a | b` — dispatches to the `or` spec; distinct from the
	/// short-circuit `||` which never calls user code.
	Or,
	/// `a & b` — dispatches to the `and` spec; distinct from `&&`.
	And,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogicalOp {
	And,
	Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclKind {
	Var,
	Let,
	Pub,
	Priv,
}

#[derive(Clone, Debug)]
pub enum DeclName {
	Name(String),
	Dynamic(Expr),
}

#[derive(Clone, Debug)]
pub enum ReqSource {
	Name(String),
	Url(String),
	Version(String),
}

#[derive(Clone, Debug)]
pub struct FuncDef {
	pub name: Option<DeclName>,
	pub params: Vec<Param>,
	pub decorators: Vec<Expr>,
	pub body: Box<Stmt>,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
	Expr(Expr),
	Decl {
		kind: DeclKind,
		name: DeclName,
		value: Option<Expr>,
	},
	Del(String),
	Block(Vec<Stmt>),
	If {
		cond: Expr,
		then_branch: Box<Stmt>,
		else_branch: Option<Box<Stmt>>,
	},
	While {
		cond: Expr,
		body: Box<Stmt>,
	},
	For {
		var: String,
		iter: Expr,
		body: Box<Stmt>,
	},
	Break(u32),
	Continue(u32),
	Return(Option<Expr>),
	Raise(Expr),
	Try {
		body: Box<Stmt>,
		catch: Option<(Option<String>, Box<Stmt>)>,
		else_branch: Option<Box<Stmt>>,
	},
	Switch {
		scrutinee: Expr,
		cases: Vec<(Expr, Stmt)>,
	},
	FuncDef(FuncDef),
	SpecDef(FuncDef),
	StructDef {
		name: String,
		params: Vec<Param>,
		body: Box<Stmt>,
	},
	TypeDef {
		name: String,
		static_body: Box<Stmt>,
		fields: Vec<String>,
		instance_body: Box<Stmt>,
	},
	Edit {
		target: Expr,
		body: Box<Stmt>,
	},
	Req {
		alias: Option<String>,
		source: ReqSource,
	},
}

#[derive(Clone, Debug)]
pub struct Stmt {
	pub kind: StmtKind,
	pub span: Span,
}
