// Copyright 2018-2026 the Deno authors. MIT license.

//! A minimal, self-contained JS/CJS AST. Per the input contract (SPEC_FULL
//! §6), the embedding bundler is responsible for producing a tree of this
//! shape from whatever it parsed with; this crate never parses source text
//! itself.
//!
//! Every node kind is a variant of a sum type (`Expr`, `Stmt`, `Pat`) with
//! exhaustive `match` handling throughout the crate, rather than a `dyn
//! Trait` node hierarchy — see the "Dynamic dispatch" design note.

use crate::symbol::SymbolId;
use swc_common::BytePos;
use swc_common::Span;
use swc_common::DUMMY_SP;

/// A whole module, as handed to the driver.
#[derive(Debug, Clone, Default)]
pub struct Module {
  pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDeclKind {
  Var,
  Let,
  Const,
}

impl VarDeclKind {
  pub fn as_str(self) -> &'static str {
    match self {
      VarDeclKind::Var => "var",
      VarDeclKind::Let => "let",
      VarDeclKind::Const => "const",
    }
  }
}

#[derive(Debug, Clone)]
pub struct VarDeclarator {
  pub span: Span,
  pub name: Pat,
  pub init: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
  pub span: Span,
  pub kind: VarDeclKind,
  pub decls: Vec<VarDeclarator>,
}

#[derive(Debug, Clone)]
pub struct ObjectPatProp {
  /// The source/key name, e.g. `a` in `{ a }` or `{ a: localA }`.
  pub key: String,
  /// The local binding the property is destructured into.
  pub value: Pat,
}

/// A binding pattern: the left-hand side of a declarator, a function
/// parameter, or an assignment target.
#[derive(Debug, Clone)]
pub enum Pat {
  Ident(SymbolId),
  Object {
    props: Vec<ObjectPatProp>,
    /// `true` when the pattern contains anything this crate's binding
    /// extractor can't flatten (nested patterns, rest elements, computed
    /// keys): the extractor reports a failed match and the validator may
    /// flag it, rather than silently mis-rewriting.
    has_unsupported_shape: bool,
  },
  /// Anything else (array patterns, assignment patterns with defaults,
  /// rest patterns): opaque to the rewriter, printed as received.
  Opaque(Box<Expr>),
}

#[derive(Debug, Clone)]
pub struct FunctionBody {
  pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Function {
  pub name: Option<SymbolId>,
  pub params: Vec<Pat>,
  pub body: FunctionBody,
  pub is_arrow: bool,
  pub is_async: bool,
  pub is_generator: bool,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
  pub key: String,
  pub is_static: bool,
  pub value: Option<Expr>,
  pub method: Option<Function>,
}

#[derive(Debug, Clone)]
pub struct Class {
  pub name: Option<SymbolId>,
  pub super_class: Option<Box<Expr>>,
  pub members: Vec<ClassMember>,
}

#[derive(Debug, Clone)]
pub struct ExprOrSpread {
  pub spread: bool,
  pub expr: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberProp {
  /// `.name`
  Ident,
  /// `[expr]`
  Computed,
}

#[derive(Debug, Clone)]
pub struct MemberExpr {
  pub obj: Box<Expr>,
  /// The property name when `prop == MemberProp::Ident`; unused (empty)
  /// otherwise — the computed expression lives in `computed_prop`.
  pub prop_name: String,
  pub computed_prop: Option<Box<Expr>>,
  pub prop: MemberProp,
  pub optional: bool,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
  pub callee: Box<Expr>,
  pub args: Vec<ExprOrSpread>,
  pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
  Minus,
  Plus,
  Bang,
  Tilde,
  TypeOf,
  Void,
  Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
  Inc,
  Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  EqEq,
  NotEq,
  EqEqEq,
  NotEqEq,
  Lt,
  LtEq,
  Gt,
  GtEq,
  LShift,
  RShift,
  ZeroFillRShift,
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  BitOr,
  BitXor,
  BitAnd,
  LogicalOr,
  LogicalAnd,
  NullishCoalescing,
  In,
  InstanceOf,
  Exp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
  Assign,
  AddAssign,
  SubAssign,
  MulAssign,
  DivAssign,
  ModAssign,
  OrAssign,
  AndAssign,
  NullishAssign,
}

#[derive(Debug, Clone)]
pub struct AssignExpr {
  pub op: AssignOp,
  pub target: Box<Expr>,
  pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct CondExpr {
  pub test: Box<Expr>,
  pub cons: Box<Expr>,
  pub alt: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct TemplateLit {
  pub quasis: Vec<String>,
  pub exprs: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct ObjectProp {
  pub key: String,
  pub computed_key: Option<Box<Expr>>,
  pub value: Expr,
  pub shorthand: bool,
}

/// A numeric literal. Kept as the source `f64` value; the printer (§4.7)
/// is responsible for choosing the shortest textual representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number(pub f64);

#[derive(Debug, Clone)]
pub enum Expr {
  Ident(SymbolId),
  /// An identifier that, per the input contract, never resolves to a
  /// `SymbolId` (e.g. a bare property name used in a position the
  /// resolver doesn't track, such as after `typeof`). Vanishingly rare in
  /// well-formed input; kept so the AST stays total.
  RawIdent(String),
  Number(Number),
  Str(String),
  Bool(bool),
  Null,
  This,
  Array(Vec<Option<ExprOrSpread>>),
  Object(Vec<ObjectProp>),
  Template(TemplateLit),
  Function(Box<Function>),
  Class(Box<Class>),
  Call(Box<CallExpr>),
  New(Box<CallExpr>),
  Member(Box<MemberExpr>),
  Unary {
    op: UnaryOp,
    arg: Box<Expr>,
  },
  Update {
    op: UpdateOp,
    prefix: bool,
    arg: Box<Expr>,
  },
  Binary {
    op: BinaryOp,
    left: Box<Expr>,
    right: Box<Expr>,
  },
  Assign(Box<AssignExpr>),
  Cond(Box<CondExpr>),
  Seq(Vec<Expr>),
  Paren(Box<Expr>),
  Await(Box<Expr>),
  Yield {
    arg: Option<Box<Expr>>,
    delegate: bool,
  },
  /// A construct the printer must reproduce byte-for-byte because the
  /// rewriter has no reason to ever look inside it (e.g. a regex literal,
  /// or a JSX/TS construct the bundler has already stripped). Not used for
  /// anything the rewriter needs to recognize.
  Verbatim(String),
}

#[derive(Debug, Clone)]
pub struct IfStmt {
  pub test: Expr,
  pub cons: Box<Stmt>,
  pub alt: Option<Box<Stmt>>,
}

#[derive(Debug, Clone)]
pub enum ForInit {
  VarDecl(VarDecl),
  Expr(Expr),
  None,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
  pub init: ForInit,
  pub test: Option<Expr>,
  pub update: Option<Expr>,
  pub body: Box<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForHeadKind {
  In,
  Of,
}

#[derive(Debug, Clone)]
pub struct ForHeadStmt {
  pub kind: ForHeadKind,
  pub left: ForInit,
  pub right: Expr,
  pub body: Box<Stmt>,
}

#[derive(Debug, Clone)]
pub struct TryStmt {
  pub block: Vec<Stmt>,
  pub handler_param: Option<Pat>,
  pub handler_body: Option<Vec<Stmt>>,
  pub finalizer: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
  pub test: Option<Expr>,
  pub body: Vec<Stmt>,
}

/// A named, zero-parameter function declaration synthesized by the
/// statement rewriter for a deferred accessor (`function __get_x__() {
/// ... }`). The accessor's name is generated text, not an input-contract
/// `SymbolId` — this is the one place the AST needs a declaration whose
/// name isn't resolver-assigned, so it gets its own narrow variant rather
/// than overloading `Stmt::FunctionDecl`.
#[derive(Debug, Clone)]
pub struct RawFunctionDecl {
  pub name: String,
  pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
  VarDecl(VarDecl),
  Expr(Expr),
  Block(Vec<Stmt>),
  If(IfStmt),
  For(ForStmt),
  ForHead(ForHeadStmt),
  While {
    test: Expr,
    body: Box<Stmt>,
  },
  DoWhile {
    test: Expr,
    body: Box<Stmt>,
  },
  Try(TryStmt),
  Labeled {
    label: String,
    body: Box<Stmt>,
  },
  Break(Option<String>),
  Continue(Option<String>),
  Return(Option<Expr>),
  Throw(Expr),
  FunctionDecl {
    name: SymbolId,
    function: Function,
  },
  RawFunctionDecl(RawFunctionDecl),
  ClassDecl {
    name: SymbolId,
    class: Class,
  },
  Switch {
    disc: Expr,
    cases: Vec<SwitchCase>,
  },
  Empty,
  /// A `throw new Error(...)` synthesized by the validator (§4.6) in place
  /// of a construct it rejected.
  SyntheticThrow {
    message: String,
  },
}

/// Helper for constructing spans in tests and in rewriter-synthesized
/// nodes, where no source position is meaningful.
pub fn dummy_span() -> Span {
  DUMMY_SP
}

pub fn byte_pos(n: u32) -> BytePos {
  BytePos(n)
}
