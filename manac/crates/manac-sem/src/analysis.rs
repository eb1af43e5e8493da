//! Body checking: declarations, statements, and expressions.
//!
//! Failing expressions type as [`Ty::Unknown`], which absorbs silently in
//! every rule here so a single mistake does not cascade into follow-on
//! errors.

use manac_par::*;
use manac_util::Span;

use crate::scope::SymbolInfo;
use crate::types::{option_inner, result_parts, split_type_list, Ty};
use crate::{SemanticAnalyzer, StructInfo};

/// Trait names accepted in `where` clauses without a user declaration:
/// the operator traits plus the built-in seeds.
fn is_builtin_trait(name: &str) -> bool {
    matches!(
        name,
        "Add" | "Sub" | "Mul" | "Div" | "Rem" | "Eq" | "Ne" | "Lt" | "Gt" | "Le" | "Ge"
            | "Neg" | "Not" | "BitAnd" | "BitOr" | "BitXor" | "Shl" | "Shr" | "Ord"
            | "Copy" | "Clone" | "Default" | "Display"
    )
}

/// Canonicalizes the Option/Result constructor spelling; the runtime
/// accepts both capitalizations as a fixed synonym table.
pub(crate) fn canonical_constructor(name: &str) -> &str {
    match name {
        "some" | "Some" => "Some",
        "ok" | "Ok" => "Ok",
        "err" | "Err" => "Err",
        "none" | "None" => "None",
        other => other,
    }
}

impl<'a> SemanticAnalyzer<'a> {
    // -- declarations (pass two) --------------------------------------------

    pub(crate) fn check_decl(&mut self, decl: &mut Decl) {
        match decl {
            Decl::Use(use_decl) => {
                self.imported_modules.push(use_decl.path.clone());
                for name in &use_decl.names {
                    self.scopes
                        .declare(name.clone(), SymbolInfo::var(name.clone(), Ty::Unknown, false));
                }
            }
            Decl::Function(func) => self.check_function(func),
            Decl::Global(global) => {
                let ty = self.resolve_type(&global.type_name);
                if !self.scopes.declare(
                    global.name.clone(),
                    SymbolInfo::var(global.name.clone(), ty, global.mutable),
                ) {
                    self.error(
                        format!("duplicate definition of '{}'", global.name),
                        global.span,
                    );
                }
                self.check_expr(&mut global.init);
            }
            Decl::Struct(decl) => {
                // Field defaults must match the declared field type.
                for field in &mut decl.fields {
                    if let Some(default) = &mut field.default_value {
                        let expected = self.resolve_type(&field.type_name);
                        let span = field.span;
                        let actual = self.check_expr(default);
                        if actual != expected && !actual.is_unknown() && !expected.is_unknown() {
                            self.error(
                                format!("default value type mismatch for field '{}'", field.name),
                                span,
                            );
                        }
                    }
                }
            }
            Decl::Enum(_) | Decl::Trait(_) | Decl::TypeAlias(_) | Decl::Import(_) => {}
            Decl::Impl(decl) => self.check_impl(decl),
        }
    }

    fn check_function(&mut self, func: &mut FuncDecl) {
        // Validate the where clause against declared type parameters and
        // known traits.
        for constraint in &func.constraints {
            if !func.type_params.contains(&constraint.type_param) {
                self.error(
                    format!(
                        "where clause references unknown type parameter '{}'",
                        constraint.type_param
                    ),
                    constraint.span,
                );
            }
            for trait_name in &constraint.traits {
                if !self.traits.contains_key(trait_name) && !is_builtin_trait(trait_name) {
                    self.error(
                        format!("where clause references unknown trait '{}'", trait_name),
                        constraint.span,
                    );
                }
            }
        }

        let Some(body) = &mut func.body else {
            return; // extern declarations have no body to check
        };

        // An imported function's body is checked as its home module, so a
        // public function may call its private helpers.
        let saved_module = self.current_module.clone();
        if let Some(source) = &func.source_module {
            self.current_module = source.clone();
        }

        self.scopes.push();

        if let Some(receiver) = &func.receiver_type {
            let receiver_ty = self.resolve_type(receiver);
            self.current_receiver = receiver_ty.clone();
            if !func.is_static {
                self.scopes
                    .declare("self", SymbolInfo::var("self", receiver_ty, true));
            }
        }

        for param in &func.params {
            let ty = self.resolve_type(&param.type_name);
            self.scopes
                .declare(param.name.clone(), SymbolInfo::var(param.name.clone(), ty, true));
        }

        self.current_return_type = self.resolve_type(&func.return_type);
        self.check_block(body);

        // Return coverage for non-void functions; main gets an implicit 0.
        if !self.current_return_type.is_void()
            && !(func.name == "main" && func.receiver_type.is_none())
            && !always_returns_block(body)
        {
            self.error(
                format!(
                    "function '{}' does not return a value on all code paths",
                    func.name
                ),
                func.span,
            );
        }

        self.scopes.pop();
        self.current_receiver = Ty::Unknown;
        self.current_module = saved_module;
    }

    fn check_impl(&mut self, decl: &mut ImplDecl) {
        if !self.structs.contains_key(&decl.type_name) && !self.enums.contains_key(&decl.type_name)
        {
            self.error("impl for unknown type", decl.span);
            return;
        }

        if let Some(trait_name) = decl.trait_name.clone() {
            let known = self.traits.contains_key(&trait_name);
            if !known && !is_builtin_trait(&trait_name) {
                self.error("impl for unknown trait", decl.span);
                return;
            }

            // Associated types: every one the trait declares must be bound,
            // and nothing extra may appear.
            if let Some(info) = self.traits.get(&trait_name).cloned() {
                for required in &info.associated_types {
                    if !decl.type_assignments.iter().any(|a| &a.name == required) {
                        self.error(
                            format!(
                                "missing associated type '{}' in impl for {}",
                                required, trait_name
                            ),
                            decl.span,
                        );
                    }
                }
                for assignment in &decl.type_assignments {
                    if !info.associated_types.contains(&assignment.name) {
                        self.error(
                            format!(
                                "unknown associated type '{}' in impl for {}",
                                assignment.name, trait_name
                            ),
                            assignment.span,
                        );
                    }
                }
            }
        }

        // Impl constants become Type_CONST symbols.
        for constant in &mut decl.constants {
            let ty = self.resolve_type(&constant.type_name);
            let qualified = format!("{}_{}", decl.type_name, constant.name);
            if !self
                .scopes
                .declare(qualified.clone(), SymbolInfo::var(qualified.clone(), ty, false))
            {
                self.error(
                    format!("duplicate definition of '{}'", qualified),
                    constant.span,
                );
            }
            self.check_expr(&mut constant.init);
        }

        let saved_module = self.current_module.clone();
        if let Some(source) = &decl.source_module {
            self.current_module = source.clone();
        }

        for method in &mut decl.methods {
            let Some(body) = &mut method.body else {
                continue;
            };

            self.scopes.push();
            if !method.is_static {
                let receiver_ty = self.resolve_type(&decl.type_name);
                self.current_receiver = receiver_ty.clone();
                self.scopes
                    .declare("self", SymbolInfo::var("self", receiver_ty, true));
            }
            for param in &method.params {
                let ty = self.resolve_type(&param.type_name);
                self.scopes.declare(
                    param.name.clone(),
                    SymbolInfo::var(param.name.clone(), ty, true),
                );
            }
            self.current_return_type = self.resolve_type(&method.return_type);
            self.check_block(body);
            self.scopes.pop();
            self.current_receiver = Ty::Unknown;
        }

        self.current_module = saved_module;
    }

    // -- statements ---------------------------------------------------------

    pub(crate) fn check_block(&mut self, block: &mut Block) {
        self.scopes.push();
        let mut terminated_at: Option<u32> = None;

        for stmt in &mut block.stmts {
            if let Some(line) = terminated_at {
                // One unreachable-code warning per block, then stop
                // descending.
                self.warning(
                    format!("unreachable code after line {}", line),
                    stmt.span(),
                );
                break;
            }
            self.check_stmt(stmt);
            if matches!(stmt, Stmt::Return(_) | Stmt::Break(_) | Stmt::Continue(_)) {
                terminated_at = Some(stmt.span().line);
            }
        }

        self.scopes.pop();
    }

    pub(crate) fn check_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Block(block) => self.check_block(block),
            Stmt::Let(decl) => self.check_let(decl),
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::Destructure(destructure) => self.check_destructure(destructure),
            Stmt::If(if_stmt) => self.check_if(if_stmt),
            Stmt::While(while_stmt) => self.check_while(while_stmt),
            Stmt::Loop(loop_stmt) => {
                self.loop_depth += 1;
                self.check_block(&mut loop_stmt.body);
                self.loop_depth -= 1;
            }
            Stmt::For(for_stmt) => {
                self.scopes.push();
                if let Some(init) = &mut for_stmt.init {
                    self.check_stmt(init);
                }
                let span = for_stmt.cond.span();
                let cond_ty = self.check_expr(&mut for_stmt.cond);
                if cond_ty != Ty::Bool && !cond_ty.is_unknown() {
                    self.error(
                        format!("for condition must be bool, got {}", cond_ty),
                        span,
                    );
                }
                if let Some(step) = &mut for_stmt.step {
                    self.check_stmt(step);
                }
                self.loop_depth += 1;
                self.check_block(&mut for_stmt.body);
                self.loop_depth -= 1;
                self.scopes.pop();
            }
            Stmt::ForIn(for_in) => self.check_for_in(for_in),
            Stmt::Break(break_stmt) => {
                if self.loop_depth == 0 {
                    self.error("break outside loop", break_stmt.span);
                }
                if let Some(value) = &mut break_stmt.value {
                    self.check_expr(value);
                }
            }
            Stmt::Continue(continue_stmt) => {
                if self.loop_depth == 0 {
                    self.error("continue outside loop", continue_stmt.span);
                }
            }
            Stmt::Return(ret) => {
                if let Some(value) = &mut ret.value {
                    let span = ret.span;
                    let ty = self.check_expr(value);
                    if ty != self.current_return_type
                        && !ty.is_unknown()
                        && !self.current_return_type.is_unknown()
                    {
                        self.error(
                            format!(
                                "return type mismatch: expected {}, got {}",
                                self.current_return_type, ty
                            ),
                            span,
                        );
                    }
                }
            }
            Stmt::Defer(defer) => self.check_block(&mut defer.body),
            Stmt::Scope(scope_stmt) => {
                self.check_expr(&mut scope_stmt.init);
            }
            Stmt::Expr(expr_stmt) => {
                self.check_expr(&mut expr_stmt.expr);
            }
        }
    }

    fn check_let(&mut self, decl: &mut LetStmt) {
        let mut ty = self.resolve_type(&decl.type_name);
        let span = decl.span;

        if let Some(init) = &mut decl.init {
            let rhs = self.check_expr(init);
            if decl.type_name == "auto" || decl.type_name.is_empty() {
                // Inference: adopt the initializer's type and write it back
                // for emission.
                decl.type_name = self.type_text(&rhs);
                ty = rhs;
            } else if ty != rhs && !rhs.is_unknown() && !ty.is_unknown() {
                self.error(
                    format!(
                        "type mismatch in variable initialization: expected {}, got {}",
                        ty, rhs
                    ),
                    span,
                );
            }
        }

        if !self.scopes.declare(
            decl.name.clone(),
            SymbolInfo::var(decl.name.clone(), ty, decl.mutable),
        ) {
            self.error(
                format!("variable '{}' already declared in this scope", decl.name),
                span,
            );
        }
        self.track_variable(&decl.name, span);
    }

    fn check_assign(&mut self, assign: &mut AssignStmt) {
        let span = assign.span;
        let target_ty = match &mut assign.target {
            AssignTarget::Expr(target) => self.check_expr(target),
            AssignTarget::Name(name) => {
                let name = name.clone();
                match self.scopes.lookup(&name) {
                    None => {
                        let msg = self
                            .undeclared_message("assignment to undeclared variable", &name);
                        self.error(msg, span);
                        return;
                    }
                    Some(sym) => {
                        if !sym.mutable {
                            self.error(
                                format!("cannot assign to immutable variable '{}'", name),
                                span,
                            );
                            return;
                        }
                        sym.ty.clone()
                    }
                }
            }
        };

        let rhs = self.check_expr(&mut assign.value);
        if rhs != target_ty && !rhs.is_unknown() && !target_ty.is_unknown() {
            self.error(
                format!(
                    "type mismatch in assignment: expected {}, got {}",
                    target_ty, rhs
                ),
                span,
            );
        }
    }

    fn check_destructure(&mut self, destructure: &mut DestructureStmt) {
        let init_ty = self.check_expr(&mut destructure.init);
        let base_ty = if destructure.type_name == "auto" {
            init_ty
        } else {
            self.resolve_type(&destructure.type_name)
        };

        // Tuple element types, when the base is a tuple.
        let tuple_elems: Vec<String> = match (&destructure.kind, &base_ty) {
            (DestructureKind::Tuple, Ty::Tuple { elems }) => {
                split_type_list(&elems[1..elems.len() - 1])
            }
            _ => Vec::new(),
        };

        let struct_info: Option<StructInfo> = if destructure.kind == DestructureKind::Struct {
            self.structs.get(&destructure.type_name).cloned()
        } else {
            None
        };

        for (i, binding) in destructure.bindings.iter().enumerate() {
            let binding_ty = match destructure.kind {
                DestructureKind::Tuple => tuple_elems
                    .get(i)
                    .map(|t| self.resolve_type(t))
                    .unwrap_or(Ty::Unknown),
                DestructureKind::Struct => struct_info
                    .as_ref()
                    .and_then(|info| {
                        info.fields
                            .iter()
                            .find(|f| f.name == binding.field)
                            .map(|f| self.resolve_type(&f.type_name))
                    })
                    .unwrap_or(Ty::Unknown),
                DestructureKind::Array => match &base_ty {
                    Ty::Array { elem, .. } => self.resolve_type(elem),
                    _ => Ty::Unknown,
                },
            };
            if !self.scopes.declare(
                binding.name.clone(),
                SymbolInfo::var(binding.name.clone(), binding_ty, true),
            ) {
                self.error(
                    format!("variable '{}' already declared in this scope", binding.name),
                    binding.span,
                );
            }
            self.track_variable(&binding.name, binding.span);
        }
    }

    fn check_if(&mut self, if_stmt: &mut IfStmt) {
        match &mut if_stmt.cond {
            CondKind::Expr(cond) => {
                let span = cond.span();
                let ty = self.check_expr(cond);
                if ty != Ty::Bool && !ty.is_unknown() {
                    self.error(format!("if condition must be bool, got {}", ty), span);
                }
                self.check_block(&mut if_stmt.then_block);
            }
            CondKind::Let(let_cond) => {
                let scrutinee_ty = self.check_expr(&mut let_cond.value);
                let inner = self.let_pattern_inner(&let_cond.pattern, &scrutinee_ty);

                self.scopes.push();
                if let Some(binding) = &let_cond.binding {
                    if !self
                        .scopes
                        .declare(binding.clone(), SymbolInfo::var(binding.clone(), inner, false))
                    {
                        self.error(
                            format!("variable '{}' already declared in this scope", binding),
                            let_cond.value.span(),
                        );
                    }
                }
                self.check_block(&mut if_stmt.then_block);
                self.scopes.pop();
            }
        }

        if let Some(else_block) = &mut if_stmt.else_block {
            self.check_stmt(else_block);
        }
    }

    fn check_while(&mut self, while_stmt: &mut WhileStmt) {
        self.loop_depth += 1;
        match &mut while_stmt.cond {
            CondKind::Expr(cond) => {
                let span = cond.span();
                let ty = self.check_expr(cond);
                if ty != Ty::Bool && !ty.is_unknown() {
                    self.error(format!("while condition must be bool, got {}", ty), span);
                }
                self.check_block(&mut while_stmt.body);
            }
            CondKind::Let(let_cond) => {
                let scrutinee_ty = self.check_expr(&mut let_cond.value);
                let inner = self.let_pattern_inner(&let_cond.pattern, &scrutinee_ty);

                self.scopes.push();
                if let Some(binding) = &let_cond.binding {
                    if !self
                        .scopes
                        .declare(binding.clone(), SymbolInfo::var(binding.clone(), inner, false))
                    {
                        self.error(
                            format!("variable '{}' already declared in this scope", binding),
                            let_cond.value.span(),
                        );
                    }
                }
                self.check_block(&mut while_stmt.body);
                self.scopes.pop();
            }
        }
        self.loop_depth -= 1;
    }

    fn check_for_in(&mut self, for_in: &mut ForInStmt) {
        let iterable_ty = self.check_expr(&mut for_in.iterable);

        // Loop variable type: ranges yield i32; arrays and Vec<T> yield
        // their element type; anything else defaults to i32.
        let elem_ty = if matches!(for_in.iterable, Expr::Range(_)) {
            Ty::i32()
        } else {
            match &iterable_ty {
                Ty::Array { elem, .. } => self.resolve_type(elem),
                Ty::Struct { name } => match crate::types::generic_args(name, "Vec") {
                    Some(inner) => self.resolve_type(inner.trim()),
                    None => Ty::i32(),
                },
                _ => Ty::i32(),
            }
        };

        self.scopes.push();
        match &for_in.binding {
            ForBinding::Single(name) => {
                if !self
                    .scopes
                    .declare(name.clone(), SymbolInfo::var(name.clone(), elem_ty, true))
                {
                    self.error(
                        format!("variable '{}' already declared in this scope", name),
                        for_in.span,
                    );
                }
            }
            ForBinding::Destructured(names) => {
                for name in names {
                    if !self
                        .scopes
                        .declare(name.clone(), SymbolInfo::var(name.clone(), Ty::i32(), true))
                    {
                        self.error(
                            format!("variable '{}' already declared in this scope", name),
                            for_in.span,
                        );
                    }
                }
            }
        }

        self.loop_depth += 1;
        self.check_block(&mut for_in.body);
        self.loop_depth -= 1;
        self.scopes.pop();
    }

    /// Inner type bound by an if-let/while-let pattern against a scrutinee.
    fn let_pattern_inner(&self, pattern: &str, scrutinee: &Ty) -> Ty {
        let name = scrutinee.name();
        let inner = match canonical_constructor(pattern) {
            "Some" => option_inner(&name),
            "Ok" => result_parts(&name).map(|(ok, _)| ok),
            "Err" => result_parts(&name).map(|(_, err)| err),
            _ => None,
        };
        inner
            .map(|t| self.resolve_type(&t))
            .unwrap_or(Ty::Unknown)
    }

    // -- expressions --------------------------------------------------------

    pub(crate) fn check_expr(&mut self, expr: &mut Expr) -> Ty {
        match expr {
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::Bool => Ty::Bool,
                LiteralKind::Str => Ty::Str,
                LiteralKind::Char => Ty::int("char"),
                LiteralKind::Number => {
                    if lit.is_float() {
                        Ty::f64()
                    } else {
                        Ty::i32()
                    }
                }
            },
            Expr::Identifier(id) => {
                let name = id.name.clone();
                let span = id.span;
                match self.scopes.lookup(&name) {
                    Some(sym) => {
                        let ty = sym.ty.clone();
                        self.mark_variable_used(&name);
                        ty
                    }
                    None => {
                        let msg =
                            self.undeclared_message("use of undeclared identifier", &name);
                        self.error(msg, span);
                        Ty::Unknown
                    }
                }
            }
            Expr::Binary(bin) => self.check_binary(bin),
            Expr::Unary(unary) => self.check_unary(unary),
            Expr::Call(call) => self.check_call(call),
            Expr::MethodCall(call) => self.check_method_call(call),
            Expr::Index(index) => {
                self.check_expr(&mut index.base);
                self.check_expr(&mut index.index);
                Ty::Unknown
            }
            Expr::Slice(slice) => {
                self.check_expr(&mut slice.base);
                if let Some(start) = &mut slice.start {
                    self.check_expr(start);
                }
                if let Some(end) = &mut slice.end {
                    self.check_expr(end);
                }
                Ty::Unknown
            }
            Expr::Range(range) => {
                self.check_expr(&mut range.start);
                self.check_expr(&mut range.end);
                Ty::Unknown
            }
            Expr::Member(member) => self.check_member(member),
            Expr::Tuple(tuple) => {
                let mut elems = String::from("(");
                for (i, element) in tuple.elements.iter_mut().enumerate() {
                    if i > 0 {
                        elems.push_str(", ");
                    }
                    let ty = self.check_expr(element);
                    elems.push_str(&self.type_text(&ty));
                }
                elems.push(')');
                Ty::Tuple { elems }
            }
            Expr::TupleIndex(tuple_index) => self.check_tuple_index(tuple_index),
            Expr::Array(array) => self.check_array(array),
            Expr::StructLiteral(lit) => self.check_struct_literal(lit),
            Expr::ScopeAccess(access) => self.check_scope_access(access),
            Expr::SelfValue(span) => {
                if self.current_receiver.is_unknown() {
                    self.error("'self' used outside of method", *span);
                    return Ty::Unknown;
                }
                self.current_receiver.clone()
            }
            Expr::NoneLiteral(_) => {
                // Compatible with any Option<T>; a marker type the
                // compatibility rules treat as absorbing.
                Ty::structure("None")
            }
            Expr::Match(match_expr) => self.check_match(match_expr),
            Expr::Closure(closure) => self.check_closure(closure),
            Expr::Try(try_expr) => {
                let operand = self.check_expr(&mut try_expr.operand);
                let name = operand.name();
                if let Some((ok, _)) = result_parts(&name) {
                    return self.resolve_type(&ok);
                }
                if let Some(inner) = option_inner(&name) {
                    return self.resolve_type(&inner);
                }
                Ty::Unknown
            }
            Expr::OptionalChain(chain) => {
                self.check_expr(&mut chain.object);
                for arg in &mut chain.args {
                    self.check_expr(arg);
                }
                Ty::Unknown
            }
            Expr::NullCoalesce(coalesce) => {
                self.check_expr(&mut coalesce.value);
                self.check_expr(&mut coalesce.default)
            }
            Expr::Await(await_expr) => {
                self.check_expr(&mut await_expr.operand);
                Ty::Unknown
            }
            Expr::Cast(cast) => {
                self.check_expr(&mut cast.operand);
                self.resolve_type(&cast.target_type)
            }
            Expr::If(if_expr) => {
                let span = if_expr.condition.span();
                let cond = self.check_expr(&mut if_expr.condition);
                if cond != Ty::Bool && !cond.is_unknown() {
                    self.error(format!("if condition must be bool, got {}", cond), span);
                }
                let then_ty = self.check_expr(&mut if_expr.then_expr);
                let else_ty = self.check_expr(&mut if_expr.else_expr);
                if then_ty == else_ty {
                    then_ty
                } else if then_ty.is_unknown() {
                    else_ty
                } else {
                    then_ty
                }
            }
            Expr::Or(or_expr) => self.check_or(or_expr),
            Expr::FString(fstring) => {
                for part in &mut fstring.parts {
                    if let FStringPart::Expr { expr, .. } = part {
                        self.check_expr(expr);
                    }
                }
                Ty::Str
            }
        }
    }

    fn check_binary(&mut self, bin: &mut BinaryExpr) -> Ty {
        let span = bin.span;
        let left = self.check_expr(&mut bin.left);
        let right = self.check_expr(&mut bin.right);
        let op = bin.op;

        if op.is_comparison() {
            return Ty::Bool;
        }

        if op.is_logical() {
            if left != Ty::Bool && !left.is_unknown() {
                self.error(
                    format!("left operand of '{}' must be bool, got {}", op.symbol(), left),
                    span,
                );
                return Ty::Unknown;
            }
            if right != Ty::Bool && !right.is_unknown() {
                self.error(
                    format!(
                        "right operand of '{}' must be bool, got {}",
                        op.symbol(),
                        right
                    ),
                    span,
                );
                return Ty::Unknown;
            }
            return Ty::Bool;
        }

        if left.is_unknown() || right.is_unknown() {
            return Ty::Unknown;
        }

        // Bitwise and shift operators accept integers only; booleans in
        // particular are rejected.
        if op.is_bitwise() {
            if left.is_integer() && right.is_integer() {
                return left;
            }
            self.error(
                format!(
                    "invalid binary operator operands: cannot apply '{}' to {} and {}",
                    op.symbol(),
                    left,
                    right
                ),
                span,
            );
            return Ty::Unknown;
        }

        // Arithmetic returns the left operand's numeric type; width mixing
        // is accepted and canonicalized at emission.
        if left.is_numeric() && right.is_numeric() {
            return left;
        }

        // String concatenation.
        if op == BinOp::Add && left == Ty::Str && right == Ty::Str {
            return Ty::Str;
        }

        self.error(
            format!(
                "invalid binary operator operands: cannot apply '{}' to {} and {}",
                op.symbol(),
                left,
                right
            ),
            span,
        );
        Ty::Unknown
    }

    fn check_unary(&mut self, unary: &mut UnaryExpr) -> Ty {
        let span = unary.span;
        let operand = self.check_expr(&mut unary.operand);
        match unary.op {
            UnOp::Ref => Ty::Ref {
                target: operand.name(),
            },
            UnOp::RefMut => Ty::RefMut {
                target: operand.name(),
            },
            UnOp::Deref => match operand {
                Ty::Pointer { pointee } => self.resolve_type(&pointee),
                Ty::Ref { target } | Ty::RefMut { target } => self.resolve_type(&target),
                Ty::Unknown => Ty::Unknown,
                other => {
                    self.error(
                        format!("cannot dereference non-pointer type {}", other),
                        span,
                    );
                    Ty::Unknown
                }
            },
            UnOp::Not | UnOp::Neg | UnOp::BitNot => operand,
        }
    }

    fn check_call(&mut self, call: &mut CallExpr) -> Ty {
        let span = call.span;
        // Static method sugar: Type::func resolves as Type_func.
        let lookup_name = call.callee.replace("::", "_");

        let Some(sym) = self.scopes.lookup(&lookup_name).cloned() else {
            // Enum variant constructor: Enum::Variant(args).
            if let Some((enum_name, variant_name)) = call.callee.split_once("::") {
                if let Some(info) = self.enums.get(enum_name).cloned() {
                    let Some(variant) = info.variants.iter().find(|v| v.name == variant_name)
                    else {
                        self.error(
                            format!(
                                "unknown variant '{}' for enum '{}'",
                                variant_name, enum_name
                            ),
                            span,
                        );
                        return Ty::Unknown;
                    };
                    if variant.is_tuple_variant() {
                        if call.args.len() != variant.tuple_types.len() {
                            self.error(
                                format!(
                                    "wrong number of arguments for enum variant '{}': expected {}, got {}",
                                    variant_name,
                                    variant.tuple_types.len(),
                                    call.args.len()
                                ),
                                span,
                            );
                            return Ty::Unknown;
                        }
                    } else if variant.is_struct_variant() {
                        if call.args.len() != variant.struct_fields.len() {
                            self.error(
                                "wrong number of arguments for enum variant".to_string(),
                                span,
                            );
                            return Ty::Unknown;
                        }
                    } else if !call.args.is_empty() {
                        self.error(
                            format!("unit variant '{}' takes no arguments", variant_name),
                            span,
                        );
                        return Ty::Unknown;
                    }
                    for arg in &mut call.args {
                        self.check_expr(arg);
                    }
                    return Ty::enumeration(enum_name);
                }
            }

            let msg = self.undeclared_message("call to undeclared function", &call.callee);
            self.error(msg, span);
            return Ty::Unknown;
        };

        self.check_visibility(&sym, span);

        // Named arguments reorder into parameter order against the declared
        // signature.
        if call.arg_names.iter().any(Option::is_some) {
            if let Some(sig) = self.funcs.get(&lookup_name).cloned() {
                self.reorder_named_args(&mut call.args, &mut call.arg_names, &sig, span);
            }
        }

        let mut arg_types = Vec::with_capacity(call.args.len());
        for arg in &mut call.args {
            arg_types.push(self.check_expr(arg));
        }

        if let Some(sig) = self.funcs.get(&lookup_name).cloned() {
            let bindings = self.infer_type_bindings(&sig, &arg_types);

            // Every where bound is validated once a binding is inferred.
            for (type_param, required) in &sym.constraints {
                if let Some(concrete) = bindings.get(type_param) {
                    self.check_trait_bounds(type_param, concrete, required, span);
                }
            }

            if let Some(substituted) = self.substitute_return_type(&sig, &bindings) {
                return substituted;
            }
        }

        sym.ty
    }

    /// Reorders a mixed named/positional argument list into declared
    /// parameter order. Duplicate and unknown names are errors; a hole
    /// before a parameter without a default is a missing argument.
    fn reorder_named_args(
        &mut self,
        args: &mut Vec<Expr>,
        arg_names: &mut Vec<Option<String>>,
        sig: &crate::FuncSig,
        span: Span,
    ) {
        let mut slots: Vec<Option<Expr>> = (0..sig.params.len()).map(|_| None).collect();
        let mut positional = 0usize;

        for (arg, name) in std::mem::take(args)
            .into_iter()
            .zip(std::mem::take(arg_names))
        {
            match name {
                None => {
                    while positional < slots.len() && slots[positional].is_some() {
                        positional += 1;
                    }
                    if positional < slots.len() {
                        slots[positional] = Some(arg);
                        positional += 1;
                    }
                }
                Some(name) => match sig.params.iter().position(|p| p.name == name) {
                    Some(index) => {
                        if slots[index].is_some() {
                            self.error(
                                format!("duplicate argument for parameter '{}'", name),
                                span,
                            );
                        } else {
                            slots[index] = Some(arg);
                        }
                    }
                    None => {
                        self.error(format!("unknown parameter name '{}'", name), span);
                    }
                },
            }
        }

        // Trailing holes fall back to declared defaults; interior holes are
        // missing arguments.
        while matches!(slots.last(), Some(None)) {
            let index = slots.len() - 1;
            if sig.params[index].has_default {
                slots.pop();
            } else {
                break;
            }
        }
        for (index, slot) in slots.iter().enumerate() {
            if slot.is_none() {
                self.error(
                    format!("missing argument for parameter '{}'", sig.params[index].name),
                    span,
                );
            }
        }

        *args = slots.into_iter().flatten().collect();
        *arg_names = vec![None; args.len()];
    }

    fn check_method_call(&mut self, call: &mut MethodCallExpr) -> Ty {
        let receiver_ty = self.check_expr(&mut call.receiver);

        // Record the receiver's static type for emission.
        let receiver_name = receiver_ty.name();
        if receiver_name != "<unknown>" {
            call.receiver_type = receiver_name.clone();
        }

        // Named arguments against the mangled impl-method signature.
        if call.arg_names.iter().any(Option::is_some) && !call.receiver_type.is_empty() {
            let qualified = format!("{}_{}", call.receiver_type, call.method);
            if let Some(sig) = self.funcs.get(&qualified).cloned() {
                let span = call.span;
                self.reorder_named_args(&mut call.args, &mut call.arg_names, &sig, span);
            }
        }

        for arg in &mut call.args {
            self.check_expr(arg);
        }

        // Known impl method: its declared return type.
        if !call.receiver_type.is_empty() {
            let qualified = format!("{}_{}", call.receiver_type, call.method);
            if let Some(sig) = self.funcs.get(&qualified) {
                let return_type = sig.return_type.clone();
                return self.resolve_type(&return_type);
            }
        }

        // Runtime container predicates.
        if matches!(
            call.method.as_str(),
            "is_ok" | "is_err" | "is_some" | "is_none"
        ) {
            return Ty::Bool;
        }

        // Unknown method with a same-named builtin (string helpers): fall
        // through to the builtin's type.
        if let Some(sym) = self.scopes.lookup(call.method.as_str()) {
            if self.builtin_functions.contains(call.method.as_str()) {
                return sym.ty.clone();
            }
        }

        Ty::Unknown
    }

    fn check_member(&mut self, member: &mut MemberExpr) -> Ty {
        let span = member.span;
        let mut object_ty = self.check_expr(&mut member.object);

        // Member access follows through references transparently.
        if let Ty::Ref { target } | Ty::RefMut { target } = &object_ty {
            object_ty = self.resolve_type(target);
        }

        if let Ty::Struct { name } = &object_ty {
            let base = name.split('<').next().unwrap_or(name).to_string();
            if let Some(info) = self.structs.get(&base) {
                match info.fields.iter().find(|f| f.name == member.member) {
                    Some(field) => {
                        let type_name = field.type_name.clone();
                        return self.resolve_type(&type_name);
                    }
                    None => {
                        self.error(
                            format!(
                                "unknown struct member '{}' on type {}",
                                member.member, object_ty
                            ),
                            span,
                        );
                    }
                }
            }
        }
        Ty::Unknown
    }

    fn check_tuple_index(&mut self, tuple_index: &mut TupleIndexExpr) -> Ty {
        let span = tuple_index.span;
        let tuple_ty = self.check_expr(&mut tuple_index.tuple);
        let Ty::Tuple { elems } = &tuple_ty else {
            if !tuple_ty.is_unknown() {
                self.error(
                    format!("tuple index on non-tuple type {}", tuple_ty),
                    span,
                );
            }
            return Ty::Unknown;
        };

        let parts = split_type_list(&elems[1..elems.len() - 1]);
        match parts.get(tuple_index.index) {
            Some(part) => self.resolve_type(part),
            None => {
                self.error(
                    format!(
                        "tuple index out of bounds: index {} on tuple with {} elements",
                        tuple_index.index,
                        parts.len()
                    ),
                    span,
                );
                Ty::Unknown
            }
        }
    }

    fn check_array(&mut self, array: &mut ArrayExpr) -> Ty {
        let span = array.span;
        match &mut array.kind {
            ArrayKind::Fill { value, count } => {
                let elem_ty = self.check_expr(value);
                self.check_expr(count);
                Ty::Array {
                    elem: self.type_text(&elem_ty),
                    size: 0,
                }
            }
            ArrayKind::List(elements) => {
                if elements.is_empty() {
                    return Ty::Unknown; // empty array needs an annotation
                }
                let mut iter = elements.iter_mut();
                let elem_ty = self.check_expr(iter.next().unwrap());
                for element in iter {
                    let ty = self.check_expr(element);
                    if ty != elem_ty && !ty.is_unknown() && !elem_ty.is_unknown() {
                        self.error(
                            format!(
                                "array elements have inconsistent types: {} vs {}",
                                elem_ty, ty
                            ),
                            span,
                        );
                    }
                }
                Ty::Array {
                    elem: self.type_text(&elem_ty),
                    size: elements.len(),
                }
            }
        }
    }

    fn check_struct_literal(&mut self, lit: &mut StructLiteralExpr) -> Ty {
        let span = lit.span;
        let base = lit
            .type_name
            .split('<')
            .next()
            .unwrap_or(&lit.type_name)
            .to_string();

        // Builtin generic containers accept any field shape.
        if matches!(base.as_str(), "Vec" | "Option" | "Result" | "HashMap") {
            for field in &mut lit.fields {
                self.check_expr(&mut field.value);
            }
            return Ty::structure(lit.type_name.clone());
        }

        let Some(info) = self.structs.get(&base).cloned() else {
            let msg = self.undeclared_message("unknown struct type", &lit.type_name);
            self.error(msg, span);
            return Ty::Unknown;
        };

        if let Some(sym) = self.scopes.lookup(&base).cloned() {
            self.check_visibility(&sym, span);
        }

        if lit.named {
            for field in &mut lit.fields {
                let field_span = field.span;
                let Some(name) = &field.name else { continue };
                match info.fields.iter().find(|f| &f.name == name) {
                    Some(declared) => {
                        let expected = self.resolve_type(&declared.type_name);
                        let actual = self.check_expr(&mut field.value);
                        if actual != expected && !actual.is_unknown() && !expected.is_unknown() {
                            self.error(
                                "type mismatch in struct field initialization",
                                field_span,
                            );
                        }
                    }
                    None => {
                        self.error("unknown struct field", field_span);
                        self.check_expr(&mut field.value);
                    }
                }
            }
        } else {
            if lit.fields.len() > info.fields.len() {
                self.error("too many initializers for struct", span);
            }
            for (field, declared) in lit.fields.iter_mut().zip(&info.fields) {
                let field_span = field.span;
                let expected = self.resolve_type(&declared.type_name);
                let actual = self.check_expr(&mut field.value);
                if actual != expected && !actual.is_unknown() && !expected.is_unknown() {
                    self.error("type mismatch in struct field initialization", field_span);
                }
            }
        }

        Ty::structure(lit.type_name.clone())
    }

    fn check_scope_access(&mut self, access: &mut ScopeAccessExpr) -> Ty {
        let span = access.span;

        if let Some(info) = self.enums.get(&access.scope).cloned() {
            if let Some(sym) = self.scopes.lookup(&access.scope).cloned() {
                self.check_visibility(&sym, span);
            }
            if !info.variants.iter().any(|v| v.name == access.member) {
                self.error(
                    format!(
                        "unknown enum variant '{}' for enum '{}'",
                        access.member, access.scope
                    ),
                    span,
                );
            }
            return Ty::enumeration(access.scope.clone());
        }

        // Qualified constant: Type::CONST registers as Type_CONST.
        let qualified = format!("{}_{}", access.scope, access.member);
        if let Some(sym) = self.scopes.lookup(&qualified) {
            return sym.ty.clone();
        }

        self.error("unknown scope", span);
        Ty::Unknown
    }

    fn check_match(&mut self, match_expr: &mut MatchExpr) -> Ty {
        let scrutinee_ty = self.check_expr(&mut match_expr.scrutinee);
        let scrutinee_name = scrutinee_ty.name();

        let mut result_ty = Ty::Unknown;

        for arm in &mut match_expr.arms {
            let mut created_scope = false;

            // Bare-binding arm: the matched value under a new name.
            if let Some(binding) = &arm.binding {
                self.scopes.push();
                created_scope = true;
                self.scopes.declare(
                    binding.clone(),
                    SymbolInfo::var(binding.clone(), scrutinee_ty.clone(), true),
                );
            }

            if let Some(first) = arm.patterns.first() {
                match first {
                    Pattern::Option {
                        constructor,
                        binding: Some(binding),
                        ..
                    } => {
                        self.scopes.push();
                        created_scope = true;
                        let inner = self.let_pattern_inner(constructor, &scrutinee_ty);
                        self.scopes.declare(
                            binding.clone(),
                            SymbolInfo::var(binding.clone(), inner, true),
                        );
                    }
                    Pattern::EnumVariant {
                        enum_name,
                        variant,
                        bindings,
                        field_bindings,
                        tuple_form,
                        ..
                    } => {
                        if let Some(info) = self.enums.get(enum_name).cloned() {
                            if let Some(variant_info) =
                                info.variants.iter().find(|v| &v.name == variant)
                            {
                                if !bindings.is_empty() || !field_bindings.is_empty() {
                                    self.scopes.push();
                                    created_scope = true;

                                    if *tuple_form && variant_info.is_tuple_variant() {
                                        for (name, type_name) in
                                            bindings.iter().zip(&variant_info.tuple_types)
                                        {
                                            if name != "_" {
                                                let ty = self.resolve_type(type_name);
                                                self.scopes.declare(
                                                    name.clone(),
                                                    SymbolInfo::var(name.clone(), ty, true),
                                                );
                                            }
                                        }
                                    } else if !*tuple_form && variant_info.is_struct_variant() {
                                        for (field, bound) in field_bindings {
                                            if let Some((_, type_name)) = variant_info
                                                .struct_fields
                                                .iter()
                                                .find(|(name, _)| name == field)
                                            {
                                                let ty = self.resolve_type(type_name);
                                                self.scopes.declare(
                                                    bound.clone(),
                                                    SymbolInfo::var(bound.clone(), ty, true),
                                                );
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Pattern::Ident(id) => {
                        // Constant-compare pattern: the name must resolve.
                        let name = id.name.clone();
                        let span = id.span;
                        if self.scopes.lookup(&name).is_none() {
                            let msg =
                                self.undeclared_message("use of undeclared identifier", &name);
                            self.error(msg, span);
                        } else {
                            self.mark_variable_used(&name);
                        }
                    }
                    Pattern::Wildcard(_)
                    | Pattern::Literal(_)
                    | Pattern::Range { .. }
                    | Pattern::Option { .. } => {}
                }
            }

            if let Some(guard) = &mut arm.guard {
                self.check_expr(guard);
            }

            let arm_span = arm.span;
            let arm_ty = self.check_expr(&mut arm.body);

            if created_scope {
                self.scopes.pop();
            }

            // All arms must produce the same type.
            if result_ty.is_unknown() {
                result_ty = arm_ty;
            } else if arm_ty != result_ty && !arm_ty.is_unknown() {
                self.error("match arms have different types", arm_span);
            }
        }

        self.check_exhaustiveness(match_expr, &scrutinee_name);

        result_ty
    }

    /// Warns when an enum match without a wildcard omits variants, naming
    /// each missing one.
    fn check_exhaustiveness(&mut self, match_expr: &MatchExpr, scrutinee_name: &str) {
        let Some(info) = self.enums.get(scrutinee_name).cloned() else {
            return;
        };

        let mut has_wildcard = match_expr.has_wildcard;
        let mut covered: Vec<&str> = Vec::new();
        for arm in &match_expr.arms {
            if arm.binding.is_some() {
                has_wildcard = true;
            }
            for pattern in &arm.patterns {
                match pattern {
                    Pattern::Wildcard(_) => has_wildcard = true,
                    Pattern::EnumVariant { variant, .. } => covered.push(variant),
                    _ => {}
                }
            }
        }

        if has_wildcard {
            return;
        }

        let missing: Vec<String> = info
            .variants
            .iter()
            .filter(|v| !covered.contains(&v.name.as_str()))
            .map(|v| format!("{}::{}", info.name, v.name))
            .collect();

        if !missing.is_empty() {
            self.warning(
                format!("non-exhaustive match: missing variants {}", missing.join(", ")),
                match_expr.span,
            );
        }
    }

    fn check_closure(&mut self, closure: &mut ClosureExpr) -> Ty {
        self.scopes.push();

        let mut param_types = String::new();
        for (i, param) in closure.params.iter().enumerate() {
            let ty = if param.type_name.is_empty() {
                Ty::Unknown
            } else {
                self.resolve_type(&param.type_name)
            };
            if i > 0 {
                param_types.push_str(", ");
            }
            param_types.push_str(&ty.name());
            self.scopes.declare(
                param.name.clone(),
                SymbolInfo::var(param.name.clone(), ty, true),
            );
        }

        let body_ty = match &mut closure.body {
            ClosureBody::Block(block) => {
                self.check_block(block);
                match &closure.return_type {
                    Some(annotation) => self.resolve_type(annotation),
                    None => Ty::Void,
                }
            }
            ClosureBody::Expr(expr) => self.check_expr(expr),
        };

        self.scopes.pop();

        Ty::Function {
            params: param_types,
            ret: body_ty.name(),
        }
    }

    fn check_or(&mut self, or_expr: &mut OrExpr) -> Ty {
        let span = or_expr.span;
        let lhs_ty = self.check_expr(&mut or_expr.value);
        let type_name = lhs_ty.name();

        if !type_name.starts_with("Result<") {
            if !lhs_ty.is_unknown() {
                self.error(
                    format!("'or' operator requires Result type, got '{}'", type_name),
                    span,
                );
            }
            // Still check the fallback so its names resolve.
            self.check_or_fallback(&mut or_expr.fallback, span);
            return Ty::Unknown;
        }

        self.check_or_fallback(&mut or_expr.fallback, span);

        match result_parts(&type_name) {
            Some((ok, _)) => self.resolve_type(&ok),
            None => Ty::Unknown,
        }
    }

    fn check_or_fallback(&mut self, fallback: &mut OrFallback, span: Span) {
        match fallback {
            OrFallback::Block(block) => {
                self.check_block(block);
                // The block must provably diverge on every path.
                if !always_terminates_block(block) {
                    self.error(
                        "'or' block must not fall through (must return, break, or continue)",
                        span,
                    );
                }
            }
            OrFallback::Stmt(stmt) => self.check_stmt(stmt),
            OrFallback::Expr(expr) => {
                self.check_expr(expr);
            }
        }
    }

    fn check_visibility(&mut self, sym: &SymbolInfo, span: Span) {
        if let Some(source) = &sym.source_module {
            if source != &self.current_module && !sym.is_pub {
                self.error(
                    format!("'{}' is private in module '{}'", sym.name, source),
                    span,
                );
            }
        }
    }
}

// -- structural control-flow analysis ---------------------------------------

/// Whether a statement returns on every path (used for function return
/// coverage).
pub fn always_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(block) => always_returns_block(block),
        Stmt::If(if_stmt) => match &if_stmt.else_block {
            None => false,
            Some(else_block) => {
                always_returns_block(&if_stmt.then_block) && always_returns(else_block)
            }
        },
        _ => false,
    }
}

pub fn always_returns_block(block: &Block) -> bool {
    block.stmts.iter().any(always_returns)
}

/// Whether a statement terminates on every path, counting `break` and
/// `continue` as well as `return` (used for `or` blocks and dead code).
pub fn always_terminates(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) | Stmt::Break(_) | Stmt::Continue(_) => true,
        Stmt::Block(block) => always_terminates_block(block),
        Stmt::If(if_stmt) => match &if_stmt.else_block {
            None => false,
            Some(else_block) => {
                always_terminates_block(&if_stmt.then_block) && always_terminates(else_block)
            }
        },
        _ => false,
    }
}

pub fn always_terminates_block(block: &Block) -> bool {
    block.stmts.iter().any(always_terminates)
}

#[cfg(test)]
mod tests {
    use crate::test_util::*;

    #[test]
    fn test_hello_world_clean() {
        assert_clean("module m\nfn main() -> i32 { println(\"hi\")\nreturn 0 }");
    }

    #[test]
    fn test_immutable_assignment_errors() {
        let errors =
            errors_of("module m\nfn main() -> i32 { const x: i32 = 3\nx = 4\nreturn 0 }");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("cannot assign to immutable variable 'x'"));
    }

    #[test]
    fn test_did_you_mean_suggestion() {
        let errors = errors_of("module m\nfn main() -> i32 { printn(\"hi\")\nreturn 0 }");
        assert!(errors
            .iter()
            .any(|e| e.contains("printn") && e.contains("did you mean 'println'?")));
    }

    #[test]
    fn test_undeclared_identifier() {
        let errors = errors_of("module m\nfn main() -> i32 { return missing }");
        assert!(errors
            .iter()
            .any(|e| e.contains("use of undeclared identifier 'missing'")));
    }

    #[test]
    fn test_type_mismatch_in_init() {
        let errors =
            errors_of("module m\nfn main() -> i32 { let x: bool = 3\nreturn 0 }");
        assert!(errors
            .iter()
            .any(|e| e.contains("type mismatch in variable initialization")));
    }

    #[test]
    fn test_integer_width_mixing_accepted() {
        assert_clean(
            "module m\nfn main() -> i32 {\n  let a: i64 = 1\n  let b: i32 = 2\n  let _c: i64 = a + b\n  return 0\n}",
        );
    }

    #[test]
    fn test_logical_requires_bool() {
        let errors = errors_of("module m\nfn main() -> i32 { let _b = 1 && true\nreturn 0 }");
        assert!(errors.iter().any(|e| e.contains("must be bool")));
    }

    #[test]
    fn test_bitwise_on_bool_rejected() {
        let errors =
            errors_of("module m\nfn main() -> i32 { let _b = true & false\nreturn 0 }");
        assert!(errors.iter().any(|e| e.contains("cannot apply '&'")));
    }

    #[test]
    fn test_bitwise_on_ints_accepted() {
        assert_clean("module m\nfn main() -> i32 { let _b = 6 & 3\nreturn 0 }");
    }

    #[test]
    fn test_string_concatenation() {
        assert_clean(
            "module m\nfn main() -> i32 { let _s = \"a\" + \"b\"\nreturn 0 }",
        );
    }

    #[test]
    fn test_string_minus_rejected() {
        let errors =
            errors_of("module m\nfn main() -> i32 { let _s = \"a\" - \"b\"\nreturn 0 }");
        assert!(errors.iter().any(|e| e.contains("cannot apply '-'")));
    }

    #[test]
    fn test_local_redeclaration_same_scope_errors() {
        let errors = errors_of(
            "module m\nfn main() -> i32 { let x: i32 = 1\nlet x: i32 = 2\nreturn x }",
        );
        assert!(errors
            .iter()
            .any(|e| e.contains("variable 'x' already declared in this scope")));
    }

    #[test]
    fn test_shadowing_across_scopes_allowed() {
        assert_clean(
            "module m\nfn main() -> i32 {\n  let x: i32 = 1\n  {\n    let x: i32 = 2\n    println(x)\n  }\n  return x\n}",
        );
    }

    #[test]
    fn test_destructure_redeclaration_errors() {
        let errors = errors_of(
            "module m\nfn main() -> i32 {\n  let a: i32 = 1\n  let (a, b) = (2, 3)\n  return a + b\n}",
        );
        assert!(errors
            .iter()
            .any(|e| e.contains("variable 'a' already declared in this scope")));
    }

    #[test]
    fn test_for_in_duplicate_destructured_names_error() {
        let errors = errors_of(
            "module m\nfn main() -> i32 {\n  let pairs = Vec::new()\n  for (a, a) in pairs { println(a) }\n  return 0\n}",
        );
        assert!(errors
            .iter()
            .any(|e| e.contains("variable 'a' already declared in this scope")));
    }

    #[test]
    fn test_break_outside_loop() {
        let errors = errors_of("module m\nfn main() -> i32 { break\nreturn 0 }");
        assert!(errors.iter().any(|e| e.contains("break outside loop")));
    }

    #[test]
    fn test_continue_inside_loop_ok() {
        assert_clean("module m\nfn main() -> i32 { while true { continue }\nreturn 0 }");
    }

    #[test]
    fn test_self_outside_method() {
        let errors = errors_of("module m\nfn main() -> i32 { let _s = self\nreturn 0 }");
        assert!(errors.iter().any(|e| e.contains("'self' used outside of method")));
    }

    #[test]
    fn test_missing_return_path() {
        let errors = errors_of(
            "module m\nfn f(x: bool) -> i32 { if x { return 1 } }\nfn main() -> i32 { return f(true) }",
        );
        assert!(errors
            .iter()
            .any(|e| e.contains("does not return a value on all code paths")));
    }

    #[test]
    fn test_both_branches_return_is_covered() {
        assert_clean(
            "module m\nfn f(x: bool) -> i32 { if x { return 1 } else { return 2 } }\nfn main() -> i32 { return f(true) }",
        );
    }

    #[test]
    fn test_main_implicit_return_exempt() {
        assert_clean("module m\nfn main() -> i32 { println(\"no return\") }");
    }

    #[test]
    fn test_return_type_mismatch() {
        let errors =
            errors_of("module m\nfn f() -> i32 { return \"nope\" }\nfn main() -> i32 { return f() }");
        assert!(errors.iter().any(|e| e.contains("return type mismatch")));
    }

    #[test]
    fn test_unreachable_code_warning() {
        let warnings = warnings_of(
            "module m\nfn main() -> i32 {\n  return 0\n  println(\"dead\")\n}",
        );
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.contains("unreachable code"))
                .count(),
            1
        );
    }

    #[test]
    fn test_struct_member_access() {
        assert_clean(
            "module m\nstruct Point { x: i32, y: i32 }\nfn main() -> i32 {\n  let p = Point{x: 1, y: 2}\n  return p.x\n}",
        );
    }

    #[test]
    fn test_unknown_struct_member() {
        let errors = errors_of(
            "module m\nstruct Point { x: i32 }\nfn main() -> i32 {\n  let p = Point{x: 1}\n  return p.z\n}",
        );
        assert!(errors.iter().any(|e| e.contains("unknown struct member 'z'")));
    }

    #[test]
    fn test_member_access_through_reference() {
        assert_clean(
            "module m\nstruct Point { x: i32 }\nfn get(p: &Point) -> i32 { return p.x }\nfn main() -> i32 {\n  let p = Point{x: 5}\n  return get(&p)\n}",
        );
    }

    #[test]
    fn test_unknown_struct_field_in_literal() {
        let errors = errors_of(
            "module m\nstruct Point { x: i32 }\nfn main() -> i32 {\n  let _p = Point{q: 1}\n  return 0\n}",
        );
        assert!(errors.iter().any(|e| e.contains("unknown struct field")));
    }

    #[test]
    fn test_enum_variant_constructor_arity() {
        let errors = errors_of(
            "module m\nvariant E { A(i32), B }\nfn main() -> i32 {\n  let _e = E::A(1, 2)\n  return 0\n}",
        );
        assert!(errors
            .iter()
            .any(|e| e.contains("wrong number of arguments for enum variant 'A'")));
    }

    #[test]
    fn test_unit_variant_with_args() {
        let errors = errors_of(
            "module m\nvariant E { A(i32), B }\nfn main() -> i32 {\n  let _e = E::B(1)\n  return 0\n}",
        );
        assert!(errors.iter().any(|e| e.contains("unit variant 'B' takes no arguments")));
    }

    #[test]
    fn test_match_on_adt_enum() {
        assert_clean(
            "module m\nvariant E { A(i32), B }\nfn main() -> i32 {\n  let e = E::A(5)\n  return match e { E::A(n) => n, E::B => 0, }\n}",
        );
    }

    #[test]
    fn test_non_exhaustive_match_warning_names_missing() {
        let warnings = warnings_of(
            "module m\nvariant E { A, B, C }\nfn main() -> i32 {\n  let e = E::A\n  let _x = match e { E::A => 1, E::B => 2, }\n  return 0\n}",
        );
        let hits: Vec<_> = warnings
            .iter()
            .filter(|w| w.contains("non-exhaustive match"))
            .collect();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].contains("E::C"));
        assert!(!hits[0].contains("E::B"));
    }

    #[test]
    fn test_wildcard_suppresses_exhaustiveness_warning() {
        let warnings = warnings_of(
            "module m\nvariant E { A, B, C }\nfn main() -> i32 {\n  let e = E::A\n  let _x = match e { E::A => 1, _ => 0, }\n  return 0\n}",
        );
        assert!(!warnings.iter().any(|w| w.contains("non-exhaustive")));
    }

    #[test]
    fn test_match_arms_type_mismatch() {
        let errors = errors_of(
            "module m\nfn main() -> i32 {\n  let _x = match 1 { 1 => 2, _ => \"no\", }\n  return 0\n}",
        );
        assert!(errors.iter().any(|e| e.contains("match arms have different types")));
    }

    #[test]
    fn test_if_let_binds_inner_type() {
        assert_clean(
            "module m\nfn find() -> Option<i32> { return Some(3) }\nfn main() -> i32 {\n  let o = find()\n  if let Some(v) = o { return v }\n  return 0\n}",
        );
    }

    #[test]
    fn test_try_unwraps_result() {
        assert_clean(
            "module m\nfn read() -> Result<i32, string> { return Ok(1) }\nfn work() -> Result<i32, string> {\n  let v = read()?\n  return Ok(v + 1)\n}\nfn main() -> i32 { return 0 }",
        );
    }

    #[test]
    fn test_or_requires_result() {
        let errors = errors_of(
            "module m\nfn main() -> i32 {\n  let _x = 3 or return 1\n  return 0\n}",
        );
        assert!(errors.iter().any(|e| e.contains("'or' operator requires Result type")));
    }

    #[test]
    fn test_or_with_diverging_block() {
        assert_clean(
            "module m\nfn read() -> Result<i32, string> { return Ok(1) }\nfn main() -> i32 {\n  let v = read() or { return 1 }\n  return v\n}",
        );
    }

    #[test]
    fn test_or_block_fall_through_rejected() {
        let errors = errors_of(
            "module m\nfn read() -> Result<i32, string> { return Ok(1) }\nfn main() -> i32 {\n  let v = read() or { println(\"oops\") }\n  return v\n}",
        );
        assert!(errors.iter().any(|e| e.contains("'or' block must not fall through")));
    }

    #[test]
    fn test_named_arguments_reorder() {
        assert_clean(
            "module m\nfn blend(r: i32, g: i32, b: i32) -> i32 { return r + g + b }\nfn main() -> i32 { return blend(b: 3, r: 1, 2) }",
        );
    }

    #[test]
    fn test_named_argument_unknown_name() {
        let errors = errors_of(
            "module m\nfn f(a: i32) -> i32 { return a }\nfn main() -> i32 { return f(q: 1) }",
        );
        assert!(errors.iter().any(|e| e.contains("unknown parameter name 'q'")));
    }

    #[test]
    fn test_named_argument_duplicate() {
        let errors = errors_of(
            "module m\nfn f(a: i32, b: i32) -> i32 { return a }\nfn main() -> i32 { return f(1, a: 2) }",
        );
        assert!(errors.iter().any(|e| e.contains("duplicate argument for parameter 'a'")));
    }

    #[test]
    fn test_visibility_violation() {
        let handler = manac_util::Handler::new();
        let mut module = manac_par::parse_source(
            "module app\nfn main() -> i32 { return helper() }\nfn helper() -> i32 { return 1 }",
            &handler,
        );
        // Simulate an import: helper comes from another module and is
        // private there.
        for decl in &mut module.decls {
            if let manac_par::Decl::Function(f) = decl {
                if f.name == "helper" {
                    f.source_module = Some("lib".into());
                }
            }
        }
        let mut analyzer = crate::SemanticAnalyzer::new(&handler);
        analyzer.analyze(&mut module);
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("'helper' is private in module 'lib'")));
    }

    #[test]
    fn test_pub_import_visible() {
        let handler = manac_util::Handler::new();
        let mut module = manac_par::parse_source(
            "module app\nfn main() -> i32 { return helper() }\npub fn helper() -> i32 { return 1 }",
            &handler,
        );
        for decl in &mut module.decls {
            if let manac_par::Decl::Function(f) = decl {
                if f.name == "helper" {
                    f.source_module = Some("lib".into());
                }
            }
        }
        let mut analyzer = crate::SemanticAnalyzer::new(&handler);
        analyzer.analyze(&mut module);
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_impl_missing_associated_type() {
        let errors = errors_of(
            "module m\ntrait Container { type Item\nfn get(self) -> i32 }\nstruct BoxOf { v: i32 }\nimpl Container for BoxOf { fn get(self) -> i32 { return self.v } }\nfn main() -> i32 { return 0 }",
        );
        assert!(errors.iter().any(|e| e.contains("missing associated type 'Item'")));
    }

    #[test]
    fn test_impl_extraneous_associated_type() {
        let errors = errors_of(
            "module m\ntrait Marker { fn id(self) -> i32 }\nstruct S { v: i32 }\nimpl Marker for S { type Extra = i32\nfn id(self) -> i32 { return 0 } }\nfn main() -> i32 { return 0 }",
        );
        assert!(errors.iter().any(|e| e.contains("unknown associated type 'Extra'")));
    }

    #[test]
    fn test_method_call_annotates_receiver_type() {
        let (module, _) = analyze_source(
            "module m\nstruct Point { x: i32 }\nimpl Point { fn get(self) -> i32 { return self.x } }\nfn main() -> i32 {\n  let p = Point{x: 2}\n  return p.get()\n}",
        );
        let main = module
            .decls
            .iter()
            .find_map(|d| match d {
                manac_par::Decl::Function(f) if f.name == "main" => Some(f),
                _ => None,
            })
            .unwrap();
        let body = main.body.as_ref().unwrap();
        let found = body.stmts.iter().any(|s| {
            matches!(
                s,
                manac_par::Stmt::Return(r)
                    if matches!(&r.value, Some(manac_par::Expr::MethodCall(mc)) if mc.receiver_type == "Point")
            )
        });
        assert!(found, "receiver_type not annotated");
    }

    #[test]
    fn test_static_method_call() {
        assert_clean(
            "module m\nstruct Counter { n: i32 }\nimpl Counter {\n  static fn new(start: i32) -> Counter { return Counter{n: start} }\n}\nfn main() -> i32 {\n  let c = Counter::new(1)\n  return c.n\n}",
        );
    }

    #[test]
    fn test_generic_return_substitution_at_call() {
        assert_clean(
            "module m\nfn identity<T>(x: T) -> T { return x }\nfn main() -> i32 { return identity(41) + 1 }",
        );
    }

    #[test]
    fn test_default_parameter_allows_trailing_named_hole() {
        assert_clean(
            "module m\nfn pad(s: string, width: i32 = 8) -> string { return s }\nfn main() -> i32 {\n  let _x = pad(s: \"hi\")\n  return 0\n}",
        );
    }

    #[test]
    fn test_deref_non_pointer_rejected() {
        let errors = errors_of("module m\nfn main() -> i32 { let _x = *3\nreturn 0 }");
        assert!(errors.iter().any(|e| e.contains("cannot dereference non-pointer type")));
    }

    #[test]
    fn test_tuple_index_bounds() {
        let errors = errors_of(
            "module m\nfn main() -> i32 {\n  let t = (1, 2)\n  return t.5\n}",
        );
        assert!(errors.iter().any(|e| e.contains("tuple index out of bounds")));
    }

    #[test]
    fn test_array_inconsistent_elements() {
        let errors = errors_of(
            "module m\nfn main() -> i32 {\n  let _a = [1, \"two\"]\n  return 0\n}",
        );
        assert!(errors.iter().any(|e| e.contains("array elements have inconsistent types")));
    }
}
