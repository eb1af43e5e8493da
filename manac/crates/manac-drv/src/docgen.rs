//! Markdown documentation generation from `///` doc comments.

use manac_par::*;
use std::fmt::Write;

/// Renders a module's documented declarations as Markdown.
pub fn generate(module: &Module) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Module `{}`\n", module.name);

    for decl in &module.decls {
        match decl {
            Decl::Function(func) => {
                if func.source_module.is_some() {
                    continue; // imported declarations document in their own file
                }
                let _ = writeln!(out, "## fn `{}`\n", func.name);
                let _ = writeln!(out, "```mana\n{}\n```\n", function_signature(func));
                if let Some(doc) = &func.doc {
                    let _ = writeln!(out, "{}\n", doc);
                }
            }
            Decl::Struct(decl) => {
                if decl.source_module.is_some() {
                    continue;
                }
                let _ = writeln!(out, "## struct `{}`\n", decl.name);
                if let Some(doc) = &decl.doc {
                    let _ = writeln!(out, "{}\n", doc);
                }
                for field in &decl.fields {
                    let _ = writeln!(out, "- `{}: {}`", field.name, field.type_name);
                }
                out.push('\n');
            }
            Decl::Enum(decl) => {
                if decl.source_module.is_some() {
                    continue;
                }
                let _ = writeln!(out, "## enum `{}`\n", decl.name);
                if let Some(doc) = &decl.doc {
                    let _ = writeln!(out, "{}\n", doc);
                }
                for variant in &decl.variants {
                    let _ = writeln!(out, "- `{}`", variant.name);
                }
                out.push('\n');
            }
            Decl::Trait(decl) => {
                if decl.source_module.is_some() {
                    continue;
                }
                let _ = writeln!(out, "## trait `{}`\n", decl.name);
                if let Some(doc) = &decl.doc {
                    let _ = writeln!(out, "{}\n", doc);
                }
                for method in &decl.methods {
                    let _ = writeln!(out, "- `fn {}(...) -> {}`", method.name, method.return_type);
                }
                out.push('\n');
            }
            _ => {}
        }
    }

    out
}

fn function_signature(func: &FuncDecl) -> String {
    let mut sig = String::new();
    if func.is_pub {
        sig.push_str("pub ");
    }
    if func.is_async {
        sig.push_str("async ");
    }
    sig.push_str("fn ");
    if let Some(receiver) = &func.receiver_type {
        let _ = write!(sig, "{}.", receiver);
    }
    let _ = write!(sig, "{}(", func.name);
    let mut first = true;
    if func.has_self {
        sig.push_str("self");
        first = false;
    }
    for param in &func.params {
        if !first {
            sig.push_str(", ");
        }
        first = false;
        let _ = write!(sig, "{}: {}", param.name, param.type_name);
    }
    let _ = write!(sig, ") -> {}", func.return_type);
    sig
}
