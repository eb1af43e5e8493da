//! manac-sem - Semantic analysis for mana.
//!
//! The AST is walked in two passes. Pass one registers every top-level
//! function, struct, enum, trait, type alias, and impl method into
//! analyzer-owned registries (cloned signatures, not AST pointers), so
//! forward references succeed. Pass two checks each declaration body:
//! name resolution against a scope stack, type checking, trait-bound
//! validation, exhaustiveness analysis, and the companion diagnostics
//! ("did you mean" suggestions, unused variables, unreachable code).
//! Module-wide constant folding and the unused-variable report run after
//! the body pass.
//!
//! Errors never abort the walk: the failing expression types as
//! [`Ty::Unknown`], which absorbs silently so one mistake does not
//! cascade.

mod analysis;
mod fold;
mod infer;
pub mod scope;
pub mod types;

pub use scope::{ScopeStack, SymbolInfo};
pub use types::Ty;

use indexmap::IndexMap;
use manac_par::{Decl, FuncDecl, Module};
use manac_util::{Handler, Span};
use rustc_hash::{FxHashMap, FxHashSet};

/// Cloned parameter signature.
#[derive(Clone, Debug)]
pub struct ParamSig {
    pub name: String,
    pub type_name: String,
    pub has_default: bool,
}

/// Cloned function signature used for call checking.
#[derive(Clone, Debug)]
pub struct FuncSig {
    pub name: String,
    pub params: Vec<ParamSig>,
    pub return_type: String,
    pub type_params: Vec<String>,
    pub constraints: Vec<(String, Vec<String>)>,
    pub is_pub: bool,
    pub source_module: Option<String>,
    pub receiver: Option<String>,
}

impl FuncSig {
    fn from_decl(func: &FuncDecl) -> Self {
        Self {
            name: func.name.clone(),
            params: func
                .params
                .iter()
                .map(|p| ParamSig {
                    name: p.name.clone(),
                    type_name: p.type_name.clone(),
                    has_default: p.default_value.is_some(),
                })
                .collect(),
            return_type: func.return_type.clone(),
            type_params: func.type_params.clone(),
            constraints: func
                .constraints
                .iter()
                .map(|c| (c.type_param.clone(), c.traits.clone()))
                .collect(),
            is_pub: func.is_pub,
            source_module: func.source_module.clone(),
            receiver: func.receiver_type.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub name: String,
    pub type_name: String,
    pub has_default: bool,
}

#[derive(Clone, Debug)]
pub struct StructInfo {
    pub name: String,
    pub type_params: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub is_pub: bool,
    pub source_module: Option<String>,
}

#[derive(Clone, Debug)]
pub struct VariantInfo {
    pub name: String,
    pub tuple_types: Vec<String>,
    /// Struct-shaped payload: (field name, type text).
    pub struct_fields: Vec<(String, String)>,
}

impl VariantInfo {
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

#[derive(Clone, Debug)]
pub struct EnumInfo {
    pub name: String,
    pub variants: Vec<VariantInfo>,
    pub is_pub: bool,
    pub source_module: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TraitInfo {
    pub name: String,
    pub associated_types: Vec<String>,
    pub methods: Vec<String>,
}

/// Unused-variable bookkeeping.
struct VarUse {
    used: bool,
    span: Span,
}

/// The semantic analyzer. One instance analyzes one module.
pub struct SemanticAnalyzer<'a> {
    handler: &'a Handler,

    pub(crate) scopes: ScopeStack,
    pub(crate) structs: IndexMap<String, StructInfo>,
    pub(crate) enums: IndexMap<String, EnumInfo>,
    pub(crate) traits: IndexMap<String, TraitInfo>,
    pub(crate) funcs: IndexMap<String, FuncSig>,
    pub(crate) type_aliases: FxHashMap<String, String>,
    /// type name → traits it implements.
    pub(crate) trait_impls: FxHashMap<String, FxHashSet<String>>,
    pub(crate) builtin_functions: FxHashSet<&'static str>,
    pub(crate) test_functions: Vec<String>,
    pub(crate) imported_modules: Vec<String>,

    pub(crate) current_module: String,
    pub(crate) current_return_type: Ty,
    pub(crate) current_receiver: Ty,
    pub(crate) loop_depth: u32,

    var_use: IndexMap<String, VarUse>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(handler: &'a Handler) -> Self {
        Self {
            handler,
            scopes: ScopeStack::new(),
            structs: IndexMap::new(),
            enums: IndexMap::new(),
            traits: IndexMap::new(),
            funcs: IndexMap::new(),
            type_aliases: FxHashMap::default(),
            trait_impls: FxHashMap::default(),
            builtin_functions: FxHashSet::default(),
            test_functions: Vec::new(),
            imported_modules: Vec::new(),
            current_module: String::new(),
            current_return_type: Ty::Unknown,
            current_receiver: Ty::Unknown,
            loop_depth: 0,
            var_use: IndexMap::new(),
        }
    }

    /// Runs the full analysis over a module. The AST is mutated in place:
    /// inferred types are written back into `let` declarations, named
    /// arguments are reordered into parameter order, method calls are
    /// annotated with their receiver's static type, and pure constant
    /// expressions are folded into literals.
    pub fn analyze(&mut self, module: &mut Module) {
        self.current_module = module.name.clone();

        self.scopes.push();
        self.register_builtins();

        // Pass one: registration, so forward references succeed.
        for decl in &module.decls {
            self.register_declaration(decl);
        }

        // Pass two: check bodies in source order.
        for decl in &mut module.decls {
            self.check_decl(decl);
        }

        // Constant folding rewrites pure literal arithmetic in place.
        fold::fold_module(module);

        self.report_unused_variables();

        self.scopes.pop();
    }

    pub(crate) fn error(&self, msg: impl Into<String>, span: Span) {
        self.handler.error(msg, span);
    }

    pub(crate) fn warning(&self, msg: impl Into<String>, span: Span) {
        self.handler.warning(msg, span);
    }

    // -- registration (pass one) --------------------------------------------

    fn register_declaration(&mut self, decl: &Decl) {
        match decl {
            Decl::Function(func) => {
                let sig = FuncSig::from_decl(func);
                let sym = SymbolInfo {
                    name: func.name.clone(),
                    ty: self.resolve_type(&func.return_type),
                    mutable: false,
                    is_pub: func.is_pub,
                    source_module: func.source_module.clone(),
                    type_params: func.type_params.clone(),
                    constraints: sig.constraints.clone(),
                };
                if !self.scopes.declare(func.name.clone(), sym) {
                    self.error(
                        format!("duplicate definition of '{}'", func.name),
                        func.span,
                    );
                }
                self.funcs.insert(func.name.clone(), sig);
                if func.is_test {
                    self.test_functions.push(func.name.clone());
                }
            }
            Decl::Struct(decl) => {
                let info = StructInfo {
                    name: decl.name.clone(),
                    type_params: decl.type_params.clone(),
                    fields: decl
                        .fields
                        .iter()
                        .map(|f| FieldInfo {
                            name: f.name.clone(),
                            type_name: f.type_name.clone(),
                            has_default: f.default_value.is_some(),
                        })
                        .collect(),
                    is_pub: decl.is_pub,
                    source_module: decl.source_module.clone(),
                };
                let sym = SymbolInfo {
                    name: decl.name.clone(),
                    ty: Ty::structure(&decl.name),
                    mutable: false,
                    is_pub: decl.is_pub,
                    source_module: decl.source_module.clone(),
                    type_params: Vec::new(),
                    constraints: Vec::new(),
                };
                if !self.scopes.declare(decl.name.clone(), sym) {
                    self.error(
                        format!("duplicate definition of '{}'", decl.name),
                        decl.span,
                    );
                }
                self.structs.insert(decl.name.clone(), info);
            }
            Decl::Enum(decl) => {
                let info = EnumInfo {
                    name: decl.name.clone(),
                    variants: decl
                        .variants
                        .iter()
                        .map(|v| VariantInfo {
                            name: v.name.clone(),
                            tuple_types: v.tuple_types.clone(),
                            struct_fields: v
                                .struct_fields
                                .iter()
                                .map(|f| (f.name.clone(), f.type_name.clone()))
                                .collect(),
                        })
                        .collect(),
                    is_pub: decl.is_pub,
                    source_module: decl.source_module.clone(),
                };
                let sym = SymbolInfo {
                    name: decl.name.clone(),
                    ty: Ty::enumeration(&decl.name),
                    mutable: false,
                    is_pub: decl.is_pub,
                    source_module: decl.source_module.clone(),
                    type_params: Vec::new(),
                    constraints: Vec::new(),
                };
                if !self.scopes.declare(decl.name.clone(), sym) {
                    self.error(
                        format!("duplicate definition of '{}'", decl.name),
                        decl.span,
                    );
                }
                self.enums.insert(decl.name.clone(), info);
            }
            Decl::Trait(decl) => {
                let info = TraitInfo {
                    name: decl.name.clone(),
                    associated_types: decl
                        .associated_types
                        .iter()
                        .map(|t| t.name.clone())
                        .collect(),
                    methods: decl.methods.iter().map(|m| m.name.clone()).collect(),
                };
                let sym = SymbolInfo {
                    name: decl.name.clone(),
                    ty: Ty::Unknown,
                    mutable: false,
                    is_pub: decl.is_pub,
                    source_module: decl.source_module.clone(),
                    type_params: Vec::new(),
                    constraints: Vec::new(),
                };
                if !self.scopes.declare(decl.name.clone(), sym) {
                    self.error(
                        format!("duplicate definition of '{}'", decl.name),
                        decl.span,
                    );
                }
                self.traits.insert(decl.name.clone(), info);
            }
            Decl::TypeAlias(decl) => {
                if self.type_aliases.contains_key(&decl.name) {
                    self.error(
                        format!("type alias already defined: {}", decl.name),
                        decl.span,
                    );
                    return;
                }
                self.type_aliases
                    .insert(decl.name.clone(), decl.target_type.clone());
            }
            Decl::Impl(decl) => {
                // Record trait implementations and register methods under
                // their mangled Type_method name; both are needed before any
                // body that calls into the impl.
                if let Some(trait_name) = &decl.trait_name {
                    self.trait_impls
                        .entry(decl.type_name.clone())
                        .or_default()
                        .insert(trait_name.clone());
                }
                for method in &decl.methods {
                    let qualified = format!("{}_{}", decl.type_name, method.name);
                    let sig = FuncSig::from_decl(method);
                    let sym = SymbolInfo {
                        name: qualified.clone(),
                        ty: self.resolve_type(&method.return_type),
                        mutable: false,
                        is_pub: method.is_pub,
                        source_module: decl.source_module.clone(),
                        type_params: method.type_params.clone(),
                        constraints: Vec::new(),
                    };
                    if !self.scopes.declare(qualified.clone(), sym) {
                        self.error(
                            format!("duplicate definition of '{}'", qualified),
                            method.span,
                        );
                    }
                    self.funcs.insert(qualified, sig);
                }
            }
            Decl::Global(_) | Decl::Import(_) | Decl::Use(_) => {}
        }
    }

    // -- type resolution ----------------------------------------------------

    /// Canonicalizes a type-name string into the [`Ty`] model. Aliases
    /// resolve recursively; `int`/`float` alias the 64-bit widths; all
    /// integer widths collapse to one category with the spelling kept.
    pub fn resolve_type(&self, name: &str) -> Ty {
        let mut resolved = name.trim().to_string();

        // Alias chains resolve recursively; the guard bounds alias cycles.
        let mut hops = 0;
        while let Some(target) = self.type_aliases.get(&resolved) {
            resolved = target.clone();
            hops += 1;
            if hops > 32 {
                return Ty::Unknown;
            }
        }

        // Human-friendly spellings for the default widths.
        if resolved == "int" {
            resolved = "i64".into();
        }
        if resolved == "float" {
            resolved = "f64".into();
        }

        match resolved.as_str() {
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "char" => {
                return Ty::int(&resolved)
            }
            "f32" | "f64" => return Ty::float(&resolved),
            "bool" => return Ty::Bool,
            "string" => return Ty::Str,
            "void" => return Ty::Void,
            "auto" | "" => return Ty::Unknown,
            _ => {}
        }

        // Trait objects keep their text for emission.
        if resolved.starts_with("dyn ") {
            return Ty::structure(resolved);
        }

        if let Some(pointee) = resolved.strip_prefix('*') {
            return Ty::Pointer {
                pointee: pointee.to_string(),
            };
        }
        if let Some(rest) = resolved.strip_prefix("&mut ") {
            return Ty::RefMut {
                target: rest.to_string(),
            };
        }
        if let Some(rest) = resolved.strip_prefix('&') {
            return Ty::Ref {
                target: rest.to_string(),
            };
        }

        // Array: [N]T or []T
        if let Some(rest) = resolved.strip_prefix('[') {
            if let Some(close) = rest.find(']') {
                let size = rest[..close].parse::<usize>().unwrap_or(0);
                let elem = rest[close + 1..].to_string();
                return Ty::Array { elem, size };
            }
        }

        // Tuple: (T1, T2)
        if resolved.starts_with('(') && resolved.ends_with(')') {
            return Ty::Tuple { elems: resolved };
        }

        // Generic containers and user types; the base name decides.
        let base = resolved.split('<').next().unwrap_or(&resolved);
        if matches!(base, "Vec" | "Option" | "Result" | "HashMap") {
            return Ty::structure(resolved);
        }
        if self.structs.contains_key(base) {
            return Ty::structure(resolved);
        }
        if self.enums.contains_key(base) {
            return Ty::enumeration(resolved);
        }

        Ty::Unknown
    }

    /// Converts a type back to AST text (for inference write-back).
    pub fn type_text(&self, ty: &Ty) -> String {
        match ty {
            Ty::Unknown => "auto".to_string(),
            other => other.name(),
        }
    }

    // -- builtins -----------------------------------------------------------

    /// Seeds the global scope with the runtime's built-in functions, so
    /// calls to them resolve and suggestions can offer them.
    fn register_builtins(&mut self) {
        const VOID_BUILTINS: &[&str] = &[
            "print", "println", "sleep_ms", "vec_sort", "vec_reverse", "assert",
            "assert_true", "assert_false", "assert_eq", "assert_ne", "assert_msg",
            "assert_some", "assert_none", "assert_ok", "assert_err", "assert_contains",
            "assert_empty", "assert_len", "assert_str_eq", "assert_gt", "assert_lt",
            "assert_ge", "assert_le", "assert_approx",
        ];
        const INT_BUILTINS: &[&str] = &[
            "len", "abs", "min", "max", "clamp", "time_now_ms", "time_now_secs",
            "random_int",
        ];
        const FLOAT_BUILTINS: &[&str] = &[
            "sqrt", "sin", "cos", "tan", "asin", "acos", "atan", "atan2", "floor",
            "ceil", "round", "trunc", "log", "log10", "log2", "exp", "pow",
        ];
        const BOOL_BUILTINS: &[&str] = &[
            "is_empty", "starts_with", "ends_with", "contains", "file_exists",
            "is_directory", "vec_contains",
        ];
        const STRING_BUILTINS: &[&str] = &[
            "to_string", "trim", "substr", "read_line", "format", "path_join",
            "path_parent", "path_filename", "path_extension", "cwd", "replace",
            "to_uppercase", "to_lowercase", "join", "reverse",
        ];
        const UNKNOWN_BUILTINS: &[&str] = &[
            "Ok", "Err", "Some", "parse_int", "parse_float", "first", "last",
            "concat", "flatten", "zip", "unzip", "repeat", "split", "read_file",
            "write_file", "append_file", "delete_file", "read_lines", "env_get",
        ];
        const STATIC_CONSTRUCTORS: &[&str] = &[
            "HashMap_new", "Vec_new", "HashSet_new", "Deque_new", "String_new",
            "Vec_with_capacity", "HashMap_with_capacity", "Option_none",
        ];

        let groups: [(&[&str], Ty); 6] = [
            (VOID_BUILTINS, Ty::Void),
            (INT_BUILTINS, Ty::i32()),
            (FLOAT_BUILTINS, Ty::f64()),
            (BOOL_BUILTINS, Ty::Bool),
            (STRING_BUILTINS, Ty::Str),
            (UNKNOWN_BUILTINS, Ty::Unknown),
        ];

        for (names, ty) in groups {
            for &name in names {
                self.builtin_functions.insert(name);
                self.scopes
                    .declare(name, SymbolInfo::var(name, ty.clone(), false));
            }
        }

        for &name in STATIC_CONSTRUCTORS {
            self.builtin_functions.insert(name);
            let ty = if name == "String_new" { Ty::Str } else { Ty::Unknown };
            self.scopes.declare(name, SymbolInfo::var(name, ty, false));
        }
    }

    // -- unused variables ---------------------------------------------------

    pub(crate) fn track_variable(&mut self, name: &str, span: Span) {
        self.var_use
            .insert(name.to_string(), VarUse { used: false, span });
    }

    pub(crate) fn mark_variable_used(&mut self, name: &str) {
        if let Some(entry) = self.var_use.get_mut(name) {
            entry.used = true;
        }
    }

    fn report_unused_variables(&mut self) {
        for (name, entry) in &self.var_use {
            if !entry.used && !name.starts_with('_') {
                self.handler.warning(
                    format!("unused variable '{}' (prefix with '_' to silence)", name),
                    entry.span,
                );
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[test]
    fn test_resolve_type_primitives() {
        let handler = Handler::new();
        let analyzer = SemanticAnalyzer::new(&handler);
        assert_eq!(analyzer.resolve_type("i32"), Ty::i32());
        assert_eq!(analyzer.resolve_type("u8").name(), "u8");
        assert_eq!(analyzer.resolve_type("int").name(), "i64");
        assert_eq!(analyzer.resolve_type("float").name(), "f64");
        assert_eq!(analyzer.resolve_type("bool"), Ty::Bool);
        assert_eq!(analyzer.resolve_type("string"), Ty::Str);
        assert_eq!(analyzer.resolve_type("void"), Ty::Void);
        assert_eq!(analyzer.resolve_type("auto"), Ty::Unknown);
    }

    #[test]
    fn test_resolve_type_composites() {
        let handler = Handler::new();
        let analyzer = SemanticAnalyzer::new(&handler);
        assert_eq!(
            analyzer.resolve_type("[4]i32"),
            Ty::Array { elem: "i32".into(), size: 4 }
        );
        assert_eq!(
            analyzer.resolve_type("[]f64"),
            Ty::Array { elem: "f64".into(), size: 0 }
        );
        assert_eq!(
            analyzer.resolve_type("*u8"),
            Ty::Pointer { pointee: "u8".into() }
        );
        assert_eq!(
            analyzer.resolve_type("&mut Point"),
            Ty::RefMut { target: "Point".into() }
        );
        assert_eq!(
            analyzer.resolve_type("(i32, bool)"),
            Ty::Tuple { elems: "(i32, bool)".into() }
        );
        assert_eq!(
            analyzer.resolve_type("Option<i32>"),
            Ty::structure("Option<i32>")
        );
        assert_eq!(analyzer.resolve_type("dyn Shape"), Ty::structure("dyn Shape"));
    }

    #[test]
    fn test_alias_resolution_recursive() {
        let source = "module m\ntype A = B\ntype B = i32\nfn f() -> A { return 0 }";
        assert_clean(source);
    }

    #[test]
    fn test_forward_reference_succeeds() {
        assert_clean("module m\nfn main() -> i32 { return f() }\nfn f() -> i32 { return 7 }");
    }

    #[test]
    fn test_registration_tables() {
        let handler = Handler::new();
        let mut module = manac_par::parse_source(
            "module m\nstruct S { x: i32 }\nenum E { A, B }\ntrait T { fn f(self) -> i32 }\nimpl S { fn get(self) -> i32 { return self.x } }\nfn main() -> i32 { return 0 }",
            &handler,
        );
        let mut analyzer = SemanticAnalyzer::new(&handler);
        analyzer.analyze(&mut module);
        assert!(analyzer.structs.contains_key("S"));
        assert!(analyzer.enums.contains_key("E"));
        assert!(analyzer.traits.contains_key("T"));
        assert!(analyzer.funcs.contains_key("main"));
        assert!(analyzer.funcs.contains_key("S_get"));
    }

    #[test]
    fn test_unused_variable_warning() {
        let warnings = warnings_of("module m\nfn main() -> i32 { let x = 1\nreturn 0 }");
        assert!(warnings.iter().any(|w| w.contains("unused variable 'x'")));
    }

    #[test]
    fn test_underscore_prefix_exempt_from_unused() {
        let warnings = warnings_of("module m\nfn main() -> i32 { let _x = 1\nreturn 0 }");
        assert!(!warnings.iter().any(|w| w.contains("_x")));
    }

    #[test]
    fn test_duplicate_type_alias_errors() {
        let errors = errors_of("module m\ntype A = i32\ntype A = f64\nfn main() -> i32 { return 0 }");
        assert!(errors.iter().any(|e| e.contains("type alias already defined")));
    }

    #[test]
    fn test_duplicate_function_definition_errors() {
        let errors = errors_of(
            "module m\nfn main() -> i32 { return 0 }\nfn main() -> i32 { return 1 }",
        );
        assert!(errors
            .iter()
            .any(|e| e.contains("duplicate definition of 'main'")));
    }

    #[test]
    fn test_duplicate_struct_definition_errors() {
        let errors = errors_of(
            "module m\nstruct P { x: i32 }\nstruct P { y: i32 }\nfn main() -> i32 { return 0 }",
        );
        assert!(errors
            .iter()
            .any(|e| e.contains("duplicate definition of 'P'")));
    }

    #[test]
    fn test_duplicate_impl_method_errors() {
        let errors = errors_of(
            "module m\nstruct S { n: i32 }\nimpl S {\n  fn get(self) -> i32 { return self.n }\n  fn get(self) -> i32 { return 0 }\n}\nfn main() -> i32 { return 0 }",
        );
        assert!(errors
            .iter()
            .any(|e| e.contains("duplicate definition of 'S_get'")));
    }
}
