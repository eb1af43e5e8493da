//! manac-emit - C++ emitter.
//!
//! Walks the typed AST and produces target C++ source. Emission is a
//! translation, not a compilation: the output leans on the embedded
//! runtime header ([`runtime::RUNTIME_HEADER`]) for `Option`, `Result`,
//! `Vec`, and the helper library, and must compile in the target
//! toolchain with no further transformation.
//!
//! Declarations emit in groups: type aliases, structs, enums, trait
//! interfaces, trait-impl wrappers, forward declarations of every free
//! function, then full definitions — each group in source order. The
//! name-mangling counters are instance fields reset at the start of each
//! module emission, so emitting twice is byte-identical.

pub mod builtins;
pub mod runtime;
pub mod types;

mod expr;
mod stmt;

pub use runtime::{RUNTIME_HEADER, RUNTIME_HEADER_NAME};
pub use types::map_type;

use manac_par::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::Write;

/// The C++ emitter. One instance may emit any number of modules; all
/// per-module state resets when [`CppEmitter::emit`] starts.
pub struct CppEmitter {
    test_mode: bool,

    // Per-module counters for synthesized local names.
    pub(crate) match_counter: u32,
    pub(crate) try_counter: u32,
    pub(crate) destructure_counter: u32,
    pub(crate) while_let_counter: u32,
    pub(crate) opt_chain_counter: u32,
    pub(crate) or_counter: u32,
    pub(crate) defer_counter: u32,

    /// `?` expressions hoisted by the statement pre-pass, keyed by the
    /// `?` token's position.
    pub(crate) hoisted_tries: FxHashMap<(u32, u32), u32>,

    /// Enums with data-carrying variants (emitted as tagged unions).
    pub(crate) adt_enums: FxHashSet<String>,
    /// Every enum name, for constructor-call emission.
    pub(crate) enum_names: FxHashSet<String>,
    /// Mangled `Type_method` names from impl blocks.
    pub(crate) impl_methods: FxHashSet<String>,
    /// Functions flagged `#[test]`, for test-mode main generation.
    test_functions: Vec<String>,
}

impl CppEmitter {
    pub fn new() -> Self {
        Self {
            test_mode: false,
            match_counter: 0,
            try_counter: 0,
            destructure_counter: 0,
            while_let_counter: 0,
            opt_chain_counter: 0,
            or_counter: 0,
            defer_counter: 0,
            hoisted_tries: FxHashMap::default(),
            adt_enums: FxHashSet::default(),
            enum_names: FxHashSet::default(),
            impl_methods: FxHashSet::default(),
            test_functions: Vec::new(),
        }
    }

    /// Emits in test mode: `#[test]` functions are collected and a
    /// generated `main` runs each of them under try/catch.
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Translates a module into C++ source text.
    pub fn emit(&mut self, module: &Module) -> String {
        self.reset();
        self.collect_module_facts(module);

        let mut out = String::new();
        self.emit_prelude(module, &mut out);
        self.emit_type_aliases(module, &mut out);
        self.emit_structs(module, &mut out);
        self.emit_enums(module, &mut out);
        self.emit_traits(module, &mut out);
        self.emit_trait_impl_wrappers(module, &mut out);
        self.emit_forward_decls(module, &mut out);
        self.emit_definitions(module, &mut out);
        if self.test_mode {
            self.emit_test_main(&mut out);
        }
        out
    }

    fn reset(&mut self) {
        self.match_counter = 0;
        self.try_counter = 0;
        self.destructure_counter = 0;
        self.while_let_counter = 0;
        self.opt_chain_counter = 0;
        self.or_counter = 0;
        self.defer_counter = 0;
        self.hoisted_tries.clear();
        self.adt_enums.clear();
        self.enum_names.clear();
        self.impl_methods.clear();
        self.test_functions.clear();
    }

    fn collect_module_facts(&mut self, module: &Module) {
        for decl in &module.decls {
            match decl {
                Decl::Enum(e) => {
                    self.enum_names.insert(e.name.clone());
                    if e.has_data_variants() {
                        self.adt_enums.insert(e.name.clone());
                    }
                }
                Decl::Impl(i) => {
                    for method in &i.methods {
                        self.impl_methods
                            .insert(format!("{}_{}", i.type_name, method.name));
                    }
                }
                Decl::Function(f) => {
                    if f.is_test {
                        self.test_functions.push(f.name.clone());
                    }
                }
                _ => {}
            }
        }
    }

    pub(crate) fn indent(&self, out: &mut String, n: usize) {
        for _ in 0..n {
            out.push_str("    ");
        }
    }

    // -- prelude ------------------------------------------------------------

    fn emit_prelude(&mut self, module: &Module, out: &mut String) {
        out.push_str("// Generated by manac\n");
        out.push_str("#include <cstdint>\n");
        out.push_str("#include <string>\n");
        out.push_str("#include <array>\n");
        out.push_str("#include <vector>\n");
        out.push_str("#include <tuple>\n");
        out.push_str("#include <cmath>\n");
        out.push_str("#include <memory>\n");
        out.push_str("#include <type_traits>\n");
        out.push_str("#include <variant>\n");
        out.push_str("#include <future>\n");
        out.push_str("#include \"mana_runtime.h\"\n");

        // Standard-library use declarations emit as comments; anything else
        // becomes an include path.
        for decl in &module.decls {
            if let Decl::Use(use_decl) = decl {
                if use_decl.path.starts_with("std::") {
                    let _ = write!(out, "// use {}", use_decl.path);
                    if use_decl.is_glob {
                        out.push_str("::*");
                    }
                    if !use_decl.names.is_empty() {
                        let _ = write!(out, "::{{{}}}", use_decl.names.join(", "));
                    }
                    if let Some(alias) = &use_decl.alias {
                        let _ = write!(out, " as {}", alias);
                    }
                    out.push('\n');
                } else {
                    let path = use_decl.path.replace("::", "/");
                    let _ = writeln!(out, "#include \"{}.h\"", path);
                }
            }
        }
        out.push('\n');
    }

    fn emit_type_aliases(&mut self, module: &Module, out: &mut String) {
        let mut any = false;
        for decl in &module.decls {
            if let Decl::TypeAlias(alias) = decl {
                let _ = writeln!(
                    out,
                    "using {} = {};",
                    alias.name,
                    map_type(&alias.target_type)
                );
                any = true;
            }
        }
        if any {
            out.push('\n');
        }
    }

    // -- structs ------------------------------------------------------------

    fn emit_structs(&mut self, module: &Module, out: &mut String) {
        for decl in &module.decls {
            if let Decl::Struct(s) = decl {
                if s.is_generic() {
                    let params = s
                        .type_params
                        .iter()
                        .map(|p| format!("typename {}", p))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let _ = writeln!(out, "template<{}>", params);
                }
                let _ = writeln!(out, "struct {} {{", s.name);
                for field in &s.fields {
                    self.indent(out, 1);
                    let _ = write!(out, "{} {}", map_type(&field.type_name), field.name);
                    if let Some(default) = &field.default_value {
                        out.push_str(" = ");
                        self.emit_expr(default, out);
                    }
                    out.push_str(";\n");
                }
                out.push_str("};\n\n");
            }
        }
    }

    // -- enums --------------------------------------------------------------

    fn emit_enums(&mut self, module: &Module, out: &mut String) {
        for decl in &module.decls {
            if let Decl::Enum(e) = decl {
                if e.has_data_variants() {
                    self.emit_adt_enum(e, out);
                } else {
                    self.emit_scalar_enum(e, out);
                }
            }
        }
    }

    /// Unit-only enums emit as scalar `enum class` values with optional
    /// explicit discriminants.
    fn emit_scalar_enum(&mut self, e: &EnumDecl, out: &mut String) {
        let _ = writeln!(out, "enum class {} {{", e.name);
        for (i, variant) in e.variants.iter().enumerate() {
            self.indent(out, 1);
            out.push_str(&variant.name);
            if variant.discriminant.is_some() {
                let _ = write!(out, " = {}", variant.value);
            }
            if i + 1 < e.variants.len() {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str("};\n\n");
    }

    /// Enums with payload variants emit a tagged union: one struct per
    /// data variant, a scalar tag enum, the outer struct with tag plus
    /// `std::variant` payload, and a named constructor per variant.
    fn emit_adt_enum(&mut self, e: &EnumDecl, out: &mut String) {
        for variant in &e.variants {
            if variant.is_tuple_variant() {
                let _ = writeln!(out, "struct {}_{} {{", e.name, variant.name);
                for (j, ty) in variant.tuple_types.iter().enumerate() {
                    self.indent(out, 1);
                    let _ = writeln!(out, "{} _{};", map_type(ty), j);
                }
                out.push_str("};\n\n");
            } else if variant.is_struct_variant() {
                let _ = writeln!(out, "struct {}_{} {{", e.name, variant.name);
                for field in &variant.struct_fields {
                    self.indent(out, 1);
                    let _ = writeln!(out, "{} {};", map_type(&field.type_name), field.name);
                }
                out.push_str("};\n\n");
            }
        }

        let _ = writeln!(out, "enum class {}Tag {{", e.name);
        for (i, variant) in e.variants.iter().enumerate() {
            self.indent(out, 1);
            out.push_str(&variant.name);
            if i + 1 < e.variants.len() {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str("};\n\n");

        let _ = writeln!(out, "struct {} {{", e.name);
        self.indent(out, 1);
        let _ = writeln!(out, "{}Tag tag;", e.name);
        self.indent(out, 1);
        out.push_str("std::variant<std::monostate");
        for variant in &e.variants {
            if variant.has_data() {
                let _ = write!(out, ", {}_{}", e.name, variant.name);
            }
        }
        out.push_str("> data;\n\n");

        for variant in &e.variants {
            self.indent(out, 1);
            let _ = write!(out, "static {} {}(", e.name, variant.name);
            if variant.is_tuple_variant() {
                for (j, ty) in variant.tuple_types.iter().enumerate() {
                    if j > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{} v{}", map_type(ty), j);
                }
                out.push_str(") {\n");
                self.indent(out, 2);
                let _ = write!(
                    out,
                    "return {}{{{}Tag::{}, {}_{}{{",
                    e.name, e.name, variant.name, e.name, variant.name
                );
                for j in 0..variant.tuple_types.len() {
                    if j > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "v{}", j);
                }
                out.push_str("}};\n");
            } else if variant.is_struct_variant() {
                for (j, field) in variant.struct_fields.iter().enumerate() {
                    if j > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{} {}", map_type(&field.type_name), field.name);
                }
                out.push_str(") {\n");
                self.indent(out, 2);
                let _ = write!(
                    out,
                    "return {}{{{}Tag::{}, {}_{}{{",
                    e.name, e.name, variant.name, e.name, variant.name
                );
                for (j, field) in variant.struct_fields.iter().enumerate() {
                    if j > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&field.name);
                }
                out.push_str("}};\n");
            } else {
                out.push_str(") {\n");
                self.indent(out, 2);
                let _ = write!(
                    out,
                    "return {}{{{}Tag::{}, std::monostate{{}}}};\n",
                    e.name, e.name, variant.name
                );
            }
            self.indent(out, 1);
            out.push_str("}\n");
        }
        out.push_str("};\n\n");
    }

    // -- traits -------------------------------------------------------------

    /// Each trait emits an abstract interface class; methods with default
    /// bodies emit non-pure.
    fn emit_traits(&mut self, module: &Module, out: &mut String) {
        for decl in &module.decls {
            if let Decl::Trait(t) = decl {
                out.push_str("// Trait interface for dynamic dispatch\n");
                let _ = writeln!(out, "class I{} {{", t.name);
                out.push_str("public:\n");
                self.indent(out, 1);
                let _ = writeln!(out, "virtual ~I{}() = default;", t.name);
                for method in &t.methods {
                    self.indent(out, 1);
                    out.push_str("virtual ");
                    out.push_str(&map_type(&method.return_type));
                    let _ = write!(out, " {}(", method.name);
                    for (i, param) in method.params.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        let _ = write!(out, "{} {}", map_type(&param.type_name), param.name);
                    }
                    out.push(')');
                    if !method.has_default() {
                        out.push_str(" = 0");
                    }
                    out.push_str(";\n");
                }
                out.push_str("};\n\n");
            }
        }
    }

    /// Each `impl Trait for Type` emits a wrapper class that holds a
    /// reference to the concrete value and delegates each method to the
    /// mangled free function, plus a factory producing an owned handle.
    fn emit_trait_impl_wrappers(&mut self, module: &Module, out: &mut String) {
        for decl in &module.decls {
            let Decl::Impl(impl_decl) = decl else { continue };
            let Some(trait_name) = &impl_decl.trait_name else {
                continue;
            };

            let _ = writeln!(
                out,
                "// Wrapper for {} implementing I{}",
                impl_decl.type_name, trait_name
            );
            let _ = writeln!(
                out,
                "class {}_{}_Impl : public I{} {{",
                impl_decl.type_name, trait_name, trait_name
            );
            self.indent(out, 1);
            let _ = writeln!(out, "{}& inner_;", impl_decl.type_name);
            out.push_str("public:\n");
            self.indent(out, 1);
            let _ = writeln!(
                out,
                "explicit {}_{}_Impl({}& obj) : inner_(obj) {{}}",
                impl_decl.type_name, trait_name, impl_decl.type_name
            );
            for method in &impl_decl.methods {
                self.indent(out, 1);
                out.push_str(&map_type(&method.return_type));
                let _ = write!(out, " {}(", method.name);
                for (i, param) in method.params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{} {}", map_type(&param.type_name), param.name);
                }
                out.push_str(") override {\n");
                self.indent(out, 2);
                if method.return_type != "void" {
                    out.push_str("return ");
                }
                let _ = write!(out, "{}_{}(inner_", impl_decl.type_name, method.name);
                for param in &method.params {
                    let _ = write!(out, ", {}", param.name);
                }
                out.push_str(");\n");
                self.indent(out, 1);
                out.push_str("}\n");
            }
            out.push_str("};\n\n");

            let _ = writeln!(
                out,
                "std::unique_ptr<I{}> make_{}({}& obj) {{",
                trait_name, trait_name, impl_decl.type_name
            );
            self.indent(out, 1);
            let _ = writeln!(
                out,
                "return std::make_unique<{}_{}_Impl>(obj);",
                impl_decl.type_name, trait_name
            );
            out.push_str("}\n\n");
        }
    }

    // -- functions ----------------------------------------------------------

    /// Writes a function's signature (return type, mangled name, parameter
    /// list); shared between forward declarations and definitions.
    fn emit_function_signature(&mut self, func: &FuncDecl, with_defaults: bool, out: &mut String) {
        if func.is_generic() {
            let params = func
                .type_params
                .iter()
                .map(|p| format!("typename {}", p))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "template<{}>", params);
        }

        if func.is_async {
            let _ = write!(out, "std::future<{}> ", map_type(&func.return_type));
        } else {
            let _ = write!(out, "{} ", map_type(&func.return_type));
        }

        match &func.receiver_type {
            Some(receiver) => {
                let _ = write!(out, "{}_{}(", receiver, func.name);
                let mut first = true;
                if !func.is_static {
                    let _ = write!(out, "{}& self", receiver);
                    first = false;
                }
                for param in &func.params {
                    if !first {
                        out.push_str(", ");
                    }
                    first = false;
                    let _ = write!(out, "{} {}", map_type(&param.type_name), param.name);
                    if with_defaults {
                        if let Some(default) = &param.default_value {
                            out.push_str(" = ");
                            self.emit_expr(default, out);
                        }
                    }
                }
            }
            None => {
                let _ = write!(out, "{}(", func.name);
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{} {}", map_type(&param.type_name), param.name);
                    if with_defaults {
                        if let Some(default) = &param.default_value {
                            out.push_str(" = ");
                            self.emit_expr(default, out);
                        }
                    }
                }
            }
        }
        out.push(')');
    }

    /// Forward declarations of every free function, enabling forward
    /// references; `main` needs none.
    fn emit_forward_decls(&mut self, module: &Module, out: &mut String) {
        for decl in &module.decls {
            if let Decl::Function(func) = decl {
                if func.name == "main" && func.receiver_type.is_none() {
                    continue;
                }
                self.emit_function_signature(func, true, out);
                out.push_str(";\n");
            }
        }
        out.push('\n');
    }

    fn emit_definitions(&mut self, module: &Module, out: &mut String) {
        for decl in &module.decls {
            match decl {
                Decl::Function(func) => {
                    if func.is_extern {
                        continue; // declaration only, body is external
                    }
                    if self.test_mode && func.name == "main" && func.receiver_type.is_none() {
                        continue; // the test harness provides main
                    }
                    // Defaults already live on the forward declaration.
                    self.emit_function_definition(func, false, out);
                }
                Decl::Impl(impl_decl) => {
                    // Methods have no forward declaration, so defaults go
                    // on the definition.
                    for method in &impl_decl.methods {
                        self.emit_function_definition(method, true, out);
                    }
                }
                Decl::Global(global) => {
                    if !global.mutable {
                        out.push_str("const ");
                    }
                    let _ = write!(out, "{} {}", map_type(&global.type_name), global.name);
                    out.push_str(" = ");
                    self.emit_expr(&global.init, out);
                    out.push_str(";\n");
                }
                _ => {}
            }
        }
    }

    fn emit_function_definition(&mut self, func: &FuncDecl, with_defaults: bool, out: &mut String) {
        let Some(body) = &func.body else { return };

        self.emit_function_signature(func, with_defaults, out);
        out.push_str(" {\n");

        if func.is_async {
            // Async bodies run inside a started task; await blocks on it.
            self.indent(out, 1);
            out.push_str("return std::async(std::launch::async, [&]() {\n");
            for stmt in &body.stmts {
                self.emit_stmt(stmt, out, 2);
            }
            self.indent(out, 1);
            out.push_str("});\n");
        } else {
            for stmt in &body.stmts {
                self.emit_stmt(stmt, out, 1);
            }
            // main without a trailing return gets an implicit 0.
            if func.name == "main" && func.receiver_type.is_none() {
                let ends_with_return =
                    matches!(body.stmts.last(), Some(Stmt::Return(_)));
                if !ends_with_return {
                    self.indent(out, 1);
                    out.push_str("return 0;\n");
                }
            }
        }

        out.push_str("}\n\n");
    }

    fn emit_test_main(&mut self, out: &mut String) {
        out.push_str("int main() {\n");
        self.indent(out, 1);
        out.push_str("int __failed = 0;\n");
        for test in &self.test_functions.clone() {
            self.indent(out, 1);
            let _ = writeln!(
                out,
                "try {{ {}(); std::printf(\"test {} ... ok\\n\"); }}",
                test, test
            );
            self.indent(out, 1);
            let _ = writeln!(
                out,
                "catch (const std::exception& e) {{ __failed++; std::printf(\"test {} ... FAILED: %s\\n\", e.what()); }}",
                test
            );
        }
        self.indent(out, 1);
        let _ = writeln!(
            out,
            "std::printf(\"%d test(s), %d failed\\n\", {}, __failed);",
            self.test_functions.len()
        );
        self.indent(out, 1);
        out.push_str("return __failed == 0 ? 0 : 1;\n");
        out.push_str("}\n");
    }
}

impl Default for CppEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use manac_sem::SemanticAnalyzer;
    use manac_util::Handler;

    /// Parses, analyzes, and emits a source string, asserting no errors.
    /// Middle-end lowering is the driver's job; emitter tests that need a
    /// lowered tree write `while` loops directly.
    pub(crate) fn emit_source(source: &str) -> String {
        let handler = Handler::new();
        let mut module = manac_par::parse_source(source, &handler);
        let mut analyzer = SemanticAnalyzer::new(&handler);
        analyzer.analyze(&mut module);
        let errors: Vec<_> = handler
            .diagnostics()
            .into_iter()
            .filter(|d| d.level == manac_util::Level::Error)
            .collect();
        assert!(errors.is_empty(), "semantic errors: {:?}", errors);
        CppEmitter::new().emit(&module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::emit_source;

    #[test]
    fn test_hello_world_shape() {
        let cpp = emit_source("module m\nfn main() -> i32 { println(\"hi\")\nreturn 0 }");
        assert!(cpp.contains("#include \"mana_runtime.h\""));
        assert!(cpp.contains("int32_t main() {"));
        assert!(cpp.contains("mana::println(\"hi\");"));
        assert!(cpp.contains("return 0;"));
    }

    #[test]
    fn test_main_implicit_return_zero() {
        let cpp = emit_source("module m\nfn main() -> i32 { println(\"x\") }");
        assert!(cpp.contains("return 0;"));
    }

    #[test]
    fn test_forward_declarations_enable_forward_references() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 { return f() }\nfn f() -> i32 { return 7 }",
        );
        // Forward declaration precedes the main definition.
        let fwd = cpp.find("int32_t f();").expect("missing forward decl");
        let def = cpp.find("int32_t main() {").expect("missing main");
        assert!(fwd < def);
    }

    #[test]
    fn test_scalar_enum_emission() {
        let cpp = emit_source("module m\nenum Color { Red, Green = 5, Blue }\nfn main() -> i32 { return 0 }");
        assert!(cpp.contains("enum class Color {"));
        assert!(cpp.contains("Green = 5"));
        assert!(!cpp.contains("ColorTag"));
    }

    #[test]
    fn test_adt_enum_emission() {
        let cpp = emit_source(
            "module m\nvariant Shape { Circle(f64), Point }\nfn main() -> i32 { return 0 }",
        );
        assert!(cpp.contains("struct Shape_Circle {"));
        assert!(cpp.contains("enum class ShapeTag {"));
        assert!(cpp.contains("std::variant<std::monostate, Shape_Circle> data;"));
        assert!(cpp.contains("static Shape Circle(double v0)"));
        assert!(cpp.contains("static Shape Point()"));
    }

    #[test]
    fn test_struct_with_default_field() {
        let cpp = emit_source(
            "module m\nstruct Point { x: i32, y: i32 = 4 }\nfn main() -> i32 { return 0 }",
        );
        assert!(cpp.contains("struct Point {"));
        assert!(cpp.contains("int32_t y = 4;"));
    }

    #[test]
    fn test_generic_struct_and_function_templates() {
        let cpp = emit_source(
            "module m\nstruct Pair<A, B> { first: A, second: B }\nfn pick<T>(x: T) -> T { return x }\nfn main() -> i32 { return pick(3) }",
        );
        assert!(cpp.contains("template<typename A, typename B>\nstruct Pair {"));
        assert!(cpp.contains("template<typename T>"));
    }

    #[test]
    fn test_trait_interface_and_wrapper() {
        let cpp = emit_source(
            "module m\ntrait Shape { fn area(self) -> f64 }\nstruct Circle { r: f64 }\nimpl Shape for Circle { fn area(self) -> f64 { return self.r } }\nfn main() -> i32 { return 0 }",
        );
        assert!(cpp.contains("class IShape {"));
        assert!(cpp.contains("virtual double area() = 0;"));
        assert!(cpp.contains("class Circle_Shape_Impl : public IShape {"));
        assert!(cpp.contains("return Circle_area(inner_);"));
        assert!(cpp.contains("std::unique_ptr<IShape> make_Shape(Circle& obj)"));
    }

    #[test]
    fn test_method_mangling_with_self() {
        let cpp = emit_source(
            "module m\nstruct P { x: i32 }\nimpl P {\n  fn get(self) -> i32 { return self.x }\n  static fn zero() -> i32 { return 0 }\n}\nfn main() -> i32 { return 0 }",
        );
        assert!(cpp.contains("int32_t P_get(P& self)"));
        assert!(cpp.contains("int32_t P_zero()"));
        assert!(!cpp.contains("P_zero(P& self"));
    }

    #[test]
    fn test_async_function_wrapping() {
        let cpp = emit_source(
            "module m\nasync fn work() -> i32 { return 1 }\nfn main() -> i32 { return 0 }",
        );
        assert!(cpp.contains("std::future<int32_t> work()"));
        assert!(cpp.contains("std::async(std::launch::async"));
    }

    #[test]
    fn test_global_constants() {
        let cpp = emit_source("module m\nLIMIT: i32 = 100\nfn main() -> i32 { return LIMIT }");
        assert!(cpp.contains("int32_t LIMIT = 100;"));
    }

    #[test]
    fn test_emission_replay_identical() {
        let handler = manac_util::Handler::new();
        let mut module = manac_par::parse_source(
            "module m\nvariant E { A(i32), B }\nfn main() -> i32 {\n  let e = E::A(5)\n  return match e { E::A(n) => n, E::B => 0, }\n}",
            &handler,
        );
        let mut analyzer = manac_sem::SemanticAnalyzer::new(&handler);
        analyzer.analyze(&mut module);
        let mut emitter = CppEmitter::new();
        let first = emitter.emit(&module);
        let second = emitter.emit(&module);
        assert_eq!(first, second);
    }

    #[test]
    fn test_test_mode_generates_harness() {
        let handler = manac_util::Handler::new();
        let mut module = manac_par::parse_source(
            "module m\n#[test]\nfn check_math() -> void { assert(1 + 1 == 2) }\nfn main() -> i32 { return 0 }",
            &handler,
        );
        let mut analyzer = manac_sem::SemanticAnalyzer::new(&handler);
        analyzer.analyze(&mut module);
        let cpp = CppEmitter::new().with_test_mode(true).emit(&module);
        assert!(cpp.contains("try { check_math();"));
        assert!(cpp.contains("int main() {"));
        // The user main is replaced by the harness.
        assert!(!cpp.contains("int32_t main()"));
    }
}
