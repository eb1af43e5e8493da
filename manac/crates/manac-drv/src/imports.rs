//! Recursive, cycle-safe file-import resolution.
//!
//! `import "relative/path"` adds a source file (`.mana` appended,
//! resolved relative to the importing file's directory). Resolution
//! recurses through the imported files; a visited set keyed by canonical
//! path makes cycles terminate, each file analyzed once. Imported
//! declarations are prepended to the importing module in order, stamped
//! with their source module so visibility is enforced during analysis.
//! `import a::b` module paths are reserved for the standard library and
//! ignored here.

use manac_par::{parse_source, Decl, Module};
use manac_util::{Handler, Span};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves every file import in `module`, in place. Returns false when
/// an imported file failed to load or parse (diagnostics carry details).
pub fn resolve_imports(
    module: &mut Module,
    base_dir: &Path,
    handler: &Handler,
    visited: &mut HashSet<PathBuf>,
) -> bool {
    let mut imported_decls: Vec<Decl> = Vec::new();

    for decl in &module.decls {
        let Decl::Import(import) = decl else { continue };
        if !import.is_file_import {
            continue; // module-path imports belong to the standard library
        }

        let import_path = base_dir.join(format!("{}.mana", import.path));
        let canonical = import_path
            .canonicalize()
            .unwrap_or_else(|_| import_path.clone());

        // Already imported (possibly via a cycle): analyzed once only.
        if !visited.insert(canonical.clone()) {
            continue;
        }

        debug!(path = %canonical.display(), "resolving file import");

        let source = match fs::read_to_string(&canonical) {
            Ok(source) => source,
            Err(_) => {
                handler.error(
                    format!("cannot open imported file: {}", import_path.display()),
                    Span::DUMMY,
                );
                return false;
            }
        };

        let mut imported_module = parse_source(&source, handler);
        if handler.has_errors() {
            return false;
        }

        let parent = import_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| base_dir.to_path_buf());
        if !resolve_imports(&mut imported_module, &parent, handler, visited) {
            return false;
        }

        // Both public and private declarations come across; visibility is
        // enforced at semantic analysis, which lets public functions call
        // their private helpers.
        let module_name = if imported_module.name.is_empty() {
            canonical.display().to_string()
        } else {
            imported_module.name.clone()
        };
        for mut decl in imported_module.decls {
            if matches!(decl, Decl::Import(_) | Decl::Use(_)) {
                continue;
            }
            decl.set_source_module(&module_name);
            imported_decls.push(decl);
        }
    }

    // Prepend in order, so imported declarations register before local
    // ones while keeping their own relative order.
    for decl in imported_decls.into_iter().rev() {
        module.decls.insert(0, decl);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("write test file");
    }

    fn resolve(dir: &Path, entry_source: &str) -> (Module, Handler, bool) {
        let handler = Handler::new();
        let mut module = parse_source(entry_source, &handler);
        let mut visited = HashSet::new();
        let ok = resolve_imports(&mut module, dir, &handler, &mut visited);
        (module, handler, ok)
    }

    #[test]
    fn test_single_file_import() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "helpers.mana",
            "module helpers\npub fn twice(x: i32) -> i32 { return x * 2 }",
        );
        let (module, handler, ok) = resolve(
            dir.path(),
            "module app\nimport \"helpers\"\nfn main() -> i32 { return twice(2) }",
        );
        assert!(ok);
        assert!(!handler.has_errors());
        let imported = module
            .decls
            .iter()
            .find_map(|d| match d {
                Decl::Function(f) if f.name == "twice" => Some(f),
                _ => None,
            })
            .expect("imported function present");
        assert_eq!(imported.source_module.as_deref(), Some("helpers"));
        // Imported declarations come first.
        assert!(matches!(&module.decls[0], Decl::Function(f) if f.name == "twice"));
    }

    #[test]
    fn test_nested_imports() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "a.mana", "module a\nimport \"b\"\npub fn fa() -> i32 { return 1 }");
        write(dir.path(), "b.mana", "module b\npub fn fb() -> i32 { return 2 }");
        let (module, _, ok) = resolve(
            dir.path(),
            "module app\nimport \"a\"\nfn main() -> i32 { return fa() + fb() }",
        );
        assert!(ok);
        let names: Vec<_> = module
            .decls
            .iter()
            .filter_map(|d| match d {
                Decl::Function(f) => Some(f.name.as_str()),
                _ => None,
            })
            .collect();
        assert!(names.contains(&"fa"));
        assert!(names.contains(&"fb"));
    }

    #[test]
    fn test_import_cycle_terminates() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "x.mana", "module x\nimport \"y\"\npub fn fx() -> i32 { return 1 }");
        write(dir.path(), "y.mana", "module y\nimport \"x\"\npub fn fy() -> i32 { return 2 }");
        let (module, handler, ok) = resolve(
            dir.path(),
            "module app\nimport \"x\"\nfn main() -> i32 { return fx() + fy() }",
        );
        assert!(ok);
        assert!(!handler.has_errors());
        // Each file analyzed once: exactly one fx and one fy.
        let fx_count = module
            .decls
            .iter()
            .filter(|d| matches!(d, Decl::Function(f) if f.name == "fx"))
            .count();
        assert_eq!(fx_count, 1);
    }

    #[test]
    fn test_missing_import_reports_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, handler, ok) = resolve(
            dir.path(),
            "module app\nimport \"nowhere\"\nfn main() -> i32 { return 0 }",
        );
        assert!(!ok);
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("cannot open imported file")));
    }

    #[test]
    fn test_module_path_imports_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, handler, ok) = resolve(
            dir.path(),
            "module app\nimport std::io\nfn main() -> i32 { return 0 }",
        );
        assert!(ok);
        assert!(!handler.has_errors());
    }
}
