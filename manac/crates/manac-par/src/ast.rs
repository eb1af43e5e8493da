//! Abstract syntax tree for mana.
//!
//! Three top-level kinds — declarations, statements, expressions — each an
//! owned enum with `Box` children. The tree is strictly parent-owned (no
//! sharing, no back-pointers); every node carries a [`Span`].
//!
//! A few fields are written by later stages rather than the parser:
//! [`MethodCallExpr::receiver_type`] is annotated during semantic analysis
//! so the emitter can mangle method calls, and `source_module` on
//! declarations is stamped by the import resolver.

use manac_util::Span;

/// A parsed module: a name and its declarations in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub name: String,
    pub decls: Vec<Decl>,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Import(ImportDecl),
    Use(UseDecl),
    Function(FuncDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    Trait(TraitDecl),
    Impl(ImplDecl),
    TypeAlias(TypeAliasDecl),
    Global(GlobalDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Import(d) => d.span,
            Decl::Use(d) => d.span,
            Decl::Function(d) => d.span,
            Decl::Struct(d) => d.span,
            Decl::Enum(d) => d.span,
            Decl::Trait(d) => d.span,
            Decl::Impl(d) => d.span,
            Decl::TypeAlias(d) => d.span,
            Decl::Global(d) => d.span,
        }
    }

    /// The module a declaration was imported from, if any.
    pub fn source_module(&self) -> Option<&str> {
        let source = match self {
            Decl::Function(d) => &d.source_module,
            Decl::Struct(d) => &d.source_module,
            Decl::Enum(d) => &d.source_module,
            Decl::Trait(d) => &d.source_module,
            Decl::Impl(d) => &d.source_module,
            Decl::TypeAlias(d) => &d.source_module,
            Decl::Global(d) => &d.source_module,
            Decl::Import(_) | Decl::Use(_) => return None,
        };
        source.as_deref()
    }

    /// Stamps the declaration with the module it came from.
    pub fn set_source_module(&mut self, module: &str) {
        let slot = match self {
            Decl::Function(d) => &mut d.source_module,
            Decl::Struct(d) => &mut d.source_module,
            Decl::Enum(d) => &mut d.source_module,
            Decl::Trait(d) => &mut d.source_module,
            Decl::Impl(d) => &mut d.source_module,
            Decl::TypeAlias(d) => &mut d.source_module,
            Decl::Global(d) => &mut d.source_module,
            Decl::Import(_) | Decl::Use(_) => return,
        };
        *slot = Some(module.to_string());
    }
}

/// `import "path"` (file import) or `import a::b::c` (module import).
#[derive(Clone, Debug, PartialEq)]
pub struct ImportDecl {
    pub path: String,
    pub is_file_import: bool,
    pub span: Span,
}

/// `use path`, `use path::*`, `use path::{a, b}`, `use path as alias`.
#[derive(Clone, Debug, PartialEq)]
pub struct UseDecl {
    pub path: String,
    pub is_glob: bool,
    pub names: Vec<String>,
    pub alias: Option<String>,
    pub is_pub: bool,
    pub span: Span,
}

/// A value parameter: `name: Type` with an optional default.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_name: String,
    pub default_value: Option<Expr>,
    pub span: Span,
}

/// A `where` clause entry: `T: TraitA + TraitB`.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeConstraint {
    pub type_param: String,
    pub traits: Vec<String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    /// `fn Type.method(...)` receiver, or the impl target for impl methods.
    pub receiver_type: Option<String>,
    pub type_params: Vec<String>,
    pub constraints: Vec<TypeConstraint>,
    pub params: Vec<Param>,
    pub return_type: String,
    /// Absent only for `extern` declarations.
    pub body: Option<Block>,
    pub is_pub: bool,
    pub is_async: bool,
    pub is_test: bool,
    pub is_extern: bool,
    /// Static impl method (no `self` receiver).
    pub is_static: bool,
    pub has_self: bool,
    pub doc: Option<String>,
    pub source_module: Option<String>,
    pub span: Span,
}

impl FuncDecl {
    pub fn is_method(&self) -> bool {
        self.receiver_type.is_some()
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructField {
    pub name: String,
    pub type_name: String,
    pub default_value: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub fields: Vec<StructField>,
    pub is_pub: bool,
    pub doc: Option<String>,
    pub source_module: Option<String>,
    pub span: Span,
}

impl StructDecl {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// One enum variant: unit, tuple-shaped, or struct-shaped, with an optional
/// explicit discriminant. `value` is always populated (auto-incremented
/// when no discriminant is written).
#[derive(Clone, Debug, PartialEq)]
pub struct EnumVariant {
    pub name: String,
    pub tuple_types: Vec<String>,
    pub struct_fields: Vec<StructField>,
    pub discriminant: Option<i64>,
    pub value: i64,
    pub span: Span,
}

impl EnumVariant {
    pub fn is_tuple_variant(&self) -> bool {
        !self.tuple_types.is_empty()
    }

    pub fn is_struct_variant(&self) -> bool {
        !self.struct_fields.is_empty()
    }

    pub fn has_data(&self) -> bool {
        self.is_tuple_variant() || self.is_struct_variant()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub variants: Vec<EnumVariant>,
    pub is_pub: bool,
    /// Declared with the `variant` keyword (synonym for `enum`).
    pub declared_as_variant: bool,
    pub doc: Option<String>,
    pub source_module: Option<String>,
    pub span: Span,
}

impl EnumDecl {
    pub fn has_data_variants(&self) -> bool {
        self.variants.iter().any(EnumVariant::has_data)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssociatedType {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TraitMethod {
    pub name: String,
    pub takes_self: bool,
    pub params: Vec<Param>,
    pub return_type: String,
    /// Optional default body.
    pub body: Option<Block>,
    pub span: Span,
}

impl TraitMethod {
    pub fn has_default(&self) -> bool {
        self.body.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TraitDecl {
    pub name: String,
    pub associated_types: Vec<AssociatedType>,
    pub methods: Vec<TraitMethod>,
    pub is_pub: bool,
    pub doc: Option<String>,
    pub source_module: Option<String>,
    pub span: Span,
}

/// `type Item = Concrete;` inside an impl block.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeBinding {
    pub name: String,
    pub target_type: String,
    pub span: Span,
}

/// `const NAME: Type = expr;` inside an impl block.
#[derive(Clone, Debug, PartialEq)]
pub struct ImplConst {
    pub name: String,
    pub type_name: String,
    pub init: Expr,
    pub span: Span,
}

/// `impl Type { ... }` or `impl Trait for Type { ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImplDecl {
    pub type_name: String,
    pub trait_name: Option<String>,
    pub type_assignments: Vec<TypeBinding>,
    pub constants: Vec<ImplConst>,
    pub methods: Vec<FuncDecl>,
    pub doc: Option<String>,
    pub source_module: Option<String>,
    pub span: Span,
}

impl ImplDecl {
    pub fn is_trait_impl(&self) -> bool {
        self.trait_name.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub target_type: String,
    pub is_pub: bool,
    pub doc: Option<String>,
    pub source_module: Option<String>,
    pub span: Span,
}

/// Top-level `name: Type = expr` constant/global.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalDecl {
    pub name: String,
    pub type_name: String,
    pub init: Expr,
    pub mutable: bool,
    pub doc: Option<String>,
    pub source_module: Option<String>,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Block(Block),
    Let(LetStmt),
    Assign(AssignStmt),
    Destructure(DestructureStmt),
    If(IfStmt),
    While(WhileStmt),
    Loop(LoopStmt),
    For(ForStmt),
    ForIn(ForInStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Return(ReturnStmt),
    Defer(DeferStmt),
    Scope(ScopeStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(b) => b.span,
            Stmt::Let(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Destructure(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Loop(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForIn(s) => s.span,
            Stmt::Break(s) => s.span,
            Stmt::Continue(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Defer(s) => s.span,
            Stmt::Scope(s) => s.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

/// Variable declaration. `type_name` is `"auto"` when inference applies;
/// semantic analysis rewrites it to the inferred type for emission.
#[derive(Clone, Debug, PartialEq)]
pub struct LetStmt {
    pub name: String,
    pub type_name: String,
    pub init: Option<Expr>,
    pub mutable: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AssignTarget {
    /// Simple `name = ...`.
    Name(String),
    /// Member or index target: `obj.field = ...`, `v[i] = ...`.
    Expr(Box<Expr>),
}

/// Assignment. Compound forms (`+=` etc.) and `++`/`--` are desugared by
/// the parser into `name = name op expr`; `op` keeps the surface spelling.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignStmt {
    pub target: AssignTarget,
    pub op: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestructureKind {
    /// `let (a, b) = expr`
    Tuple,
    /// `{a, b}: Type = expr`
    Struct,
    /// `[a, b]: [N]T = expr`
    Array,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DestructureBinding {
    pub name: String,
    /// Field name for struct form; element index rendered as text for
    /// tuple/array forms.
    pub field: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DestructureStmt {
    pub kind: DestructureKind,
    pub bindings: Vec<DestructureBinding>,
    pub type_name: String,
    pub init: Expr,
    pub span: Span,
}

/// Condition of an `if`/`while`: a plain expression or an if-let/while-let
/// pattern (`Some`/`Ok`/`Err`/`None` against a scrutinee).
#[derive(Clone, Debug, PartialEq)]
pub enum CondKind {
    Expr(Expr),
    Let(LetCond),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LetCond {
    /// Pattern constructor name as written (`Some`, `ok`, ...).
    pub pattern: String,
    pub binding: Option<String>,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub cond: CondKind,
    pub then_block: Block,
    /// A `Block` statement or a nested `If` for `else if` chains.
    pub else_block: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub cond: CondKind,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoopStmt {
    pub body: Block,
    pub span: Span,
}

/// Three-part `for init; cond; step { body }`. Lowered to a while loop by
/// the middle-end before emission.
#[derive(Clone, Debug, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub step: Option<Box<Stmt>>,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ForBinding {
    /// `for x in ...`
    Single(String),
    /// `for (k, v) in ...`
    Destructured(Vec<String>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForInStmt {
    pub binding: ForBinding,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BreakStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContinueStmt {
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeferStmt {
    pub body: Block,
    pub span: Span,
}

/// `scope name = expr` — a named scoped binding.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopeStmt {
    pub name: String,
    pub init: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    /// Surface spelling, used in diagnostics and emission.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnOp {
    Not,
    Neg,
    BitNot,
    Ref,
    RefMut,
    Deref,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::Neg => "-",
            UnOp::BitNot => "~",
            UnOp::Ref => "&",
            UnOp::RefMut => "&mut",
            UnOp::Deref => "*",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    /// Integer or float; floats contain `.` or an exponent.
    Number,
    Str,
    Char,
    Bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LiteralExpr {
    pub value: String,
    pub kind: LiteralKind,
    pub span: Span,
}

impl LiteralExpr {
    /// A numeric literal contains a float marker or not.
    pub fn is_float(&self) -> bool {
        self.kind == LiteralKind::Number
            && (self.value.contains('.') || self.value.contains('e') || self.value.contains('E'))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdentExpr {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    /// Callee name; `Type::method` static calls keep the qualified text.
    pub callee: String,
    pub args: Vec<Expr>,
    /// Parallel to `args`: `Some(name)` for named arguments.
    pub arg_names: Vec<Option<String>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodCallExpr {
    pub receiver: Box<Expr>,
    pub method: String,
    pub args: Vec<Expr>,
    pub arg_names: Vec<Option<String>>,
    /// Static type of the receiver, annotated during semantic analysis;
    /// empty until then.
    pub receiver_type: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexExpr {
    pub base: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SliceExpr {
    pub base: Box<Expr>,
    pub start: Option<Box<Expr>>,
    pub end: Option<Box<Expr>>,
    pub inclusive: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RangeExpr {
    pub start: Box<Expr>,
    pub end: Box<Expr>,
    pub inclusive: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub member: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TupleExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TupleIndexExpr {
    pub tuple: Box<Expr>,
    pub index: usize,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArrayKind {
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// `[value; count]`
    Fill {
        value: Box<Expr>,
        count: Box<Expr>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayExpr {
    pub kind: ArrayKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldInit {
    /// `None` for positional initialization.
    pub name: Option<String>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructLiteralExpr {
    /// May carry generic argument text: `Pair<i32, bool>`.
    pub type_name: String,
    pub fields: Vec<FieldInit>,
    pub named: bool,
    pub span: Span,
}

/// `A::B` — enum variant or qualified constant access.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopeAccessExpr {
    pub scope: String,
    pub member: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchExpr {
    pub scrutinee: Box<Expr>,
    pub arms: Vec<MatchArm>,
    /// True once any arm is a wildcard or bare-binding pattern.
    pub has_wildcard: bool,
    /// Surface syntax: `when` uses `->`, `match` uses `=>`.
    pub when_style: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchArm {
    /// Or-patterns: one entry per `|`-separated alternative. Empty when the
    /// arm is a bare binding (`n if n < 5 => ...`).
    pub patterns: Vec<Pattern>,
    pub guard: Option<Expr>,
    pub body: Expr,
    /// Bare-binding arm: the matched value bound to this name.
    pub binding: Option<String>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureMode {
    ByRef,
    ByValue,
    ByMove,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSpec {
    pub name: String,
    pub mode: CaptureMode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClosureParam {
    pub name: String,
    /// Empty when the type is inferred.
    pub type_name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClosureBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClosureExpr {
    pub params: Vec<ClosureParam>,
    pub return_type: Option<String>,
    pub body: ClosureBody,
    /// Explicit capture list, element by element; empty for default capture.
    pub captures: Vec<CaptureSpec>,
    pub has_explicit_captures: bool,
    /// Default capture mode when no explicit list: by-ref unless a trailing
    /// `move` was written.
    pub captures_by_ref: bool,
    pub span: Span,
}

/// Postfix `?` error propagation.
#[derive(Clone, Debug, PartialEq)]
pub struct TryExpr {
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OptionalChainExpr {
    pub object: Box<Expr>,
    pub member: String,
    pub is_method_call: bool,
    pub args: Vec<Expr>,
    pub arg_names: Vec<Option<String>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NullCoalesceExpr {
    pub value: Box<Expr>,
    pub default: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AwaitExpr {
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CastExpr {
    pub operand: Box<Expr>,
    pub target_type: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub span: Span,
}

/// Fallback side of an `or` expression. The right-hand side must diverge
/// (or provide a fallback value); semantic analysis enforces this.
#[derive(Clone, Debug, PartialEq)]
pub enum OrFallback {
    Block(Block),
    Stmt(Box<Stmt>),
    Expr(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrExpr {
    pub value: Box<Expr>,
    pub fallback: OrFallback,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FStringPart {
    Literal(String),
    Expr {
        expr: Box<Expr>,
        /// Format spec after `:`, e.g. `.2f`; empty when absent.
        format_spec: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FStringExpr {
    pub parts: Vec<FStringPart>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Identifier(IdentExpr),
    Literal(LiteralExpr),
    Call(CallExpr),
    MethodCall(MethodCallExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Index(IndexExpr),
    Slice(SliceExpr),
    Range(RangeExpr),
    Member(MemberExpr),
    Tuple(TupleExpr),
    TupleIndex(TupleIndexExpr),
    Array(ArrayExpr),
    StructLiteral(StructLiteralExpr),
    ScopeAccess(ScopeAccessExpr),
    SelfValue(Span),
    Match(MatchExpr),
    Closure(ClosureExpr),
    Try(TryExpr),
    OptionalChain(OptionalChainExpr),
    NullCoalesce(NullCoalesceExpr),
    Await(AwaitExpr),
    Cast(CastExpr),
    If(IfExpr),
    Or(OrExpr),
    FString(FStringExpr),
    NoneLiteral(Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier(e) => e.span,
            Expr::Literal(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Slice(e) => e.span,
            Expr::Range(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Tuple(e) => e.span,
            Expr::TupleIndex(e) => e.span,
            Expr::Array(e) => e.span,
            Expr::StructLiteral(e) => e.span,
            Expr::ScopeAccess(e) => e.span,
            Expr::SelfValue(span) => *span,
            Expr::Match(e) => e.span,
            Expr::Closure(e) => e.span,
            Expr::Try(e) => e.span,
            Expr::OptionalChain(e) => e.span,
            Expr::NullCoalesce(e) => e.span,
            Expr::Await(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::If(e) => e.span,
            Expr::Or(e) => e.span,
            Expr::FString(e) => e.span,
            Expr::NoneLiteral(span) => *span,
        }
    }

    /// Synthesizes an integer literal, used for parser recovery and
    /// desugarings.
    pub fn int_literal(value: &str, span: Span) -> Expr {
        Expr::Literal(LiteralExpr {
            value: value.to_string(),
            kind: LiteralKind::Number,
            span,
        })
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// A match-arm pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// `_`
    Wildcard(Span),
    /// Literal comparison: number, string, or bool.
    Literal(LiteralExpr),
    /// Identifier; constant-compare or enum value depending on context.
    Ident(IdentExpr),
    /// `lo..hi` / `lo..=hi`
    Range {
        start: LiteralExpr,
        end: LiteralExpr,
        inclusive: bool,
        span: Span,
    },
    /// `Some(x)`, `None`, `Ok(x)`, `Err(e)` — lower- and upper-case
    /// constructor spellings both accepted.
    Option {
        constructor: String,
        binding: Option<String>,
        span: Span,
    },
    /// `Enum::Variant`, `Enum::Variant(a, _, c)`,
    /// `Enum::Variant { field: binding }`.
    EnumVariant {
        enum_name: String,
        variant: String,
        bindings: Vec<String>,
        field_bindings: Vec<(String, String)>,
        tuple_form: bool,
        span: Span,
    },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Wildcard(span) => *span,
            Pattern::Literal(lit) => lit.span,
            Pattern::Ident(id) => id.span,
            Pattern::Range { span, .. } => *span,
            Pattern::Option { span, .. } => *span,
            Pattern::EnumVariant { span, .. } => *span,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Pattern::Wildcard(_))
    }
}
