//! manac-drv - Compiler driver.
//!
//! Orchestrates the pipeline: lex → parse → import resolution → semantic
//! analysis → middle-end lowering → C++ emission, with the diagnostic
//! sink threaded through every stage. Emission runs only when the error
//! count is zero; warnings are still rendered on success. The emitted
//! text is cached content-addressed per source file.

pub mod astprint;
pub mod cache;
pub mod docgen;
pub mod imports;
pub mod manifest;

use manac_emit::CppEmitter;
use manac_par::{Module, Parser};
use manac_sem::SemanticAnalyzer;
use manac_util::{Diagnostic, Handler, Level};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use cache::CompilationCache;

/// Options controlling one compilation.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Consult and update the on-disk emission cache.
    pub use_cache: bool,
    /// Emit in test mode (a generated main runs `#[test]` functions).
    pub test_mode: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            test_mode: false,
        }
    }
}

/// The result of one compilation.
pub struct CompileOutput {
    pub module_name: String,
    /// Emitted C++; absent when errors prevented emission.
    pub cpp: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Whether the emission came from the cache.
    pub cache_hit: bool,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }
}

/// Compiles a single source string with no file-import resolution.
pub fn compile_source(source: &str, options: &CompileOptions) -> CompileOutput {
    compile_inner(source, None, options)
}

/// Compiles a file, resolving its `import "..."` graph relative to the
/// file's directory.
pub fn compile_file(path: &Path, options: &CompileOptions) -> anyhow::Result<CompileOutput> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot open file: {}: {}", path.display(), e))?;
    Ok(compile_inner(&source, Some(path), options))
}

fn compile_inner(source: &str, path: Option<&Path>, options: &CompileOptions) -> CompileOutput {
    let handler = Handler::new();

    // Lexing and parsing.
    debug!("phase: lex+parse");
    let tokens = manac_lex::Lexer::new(source).tokenize();
    let mut module: Module = Parser::new(tokens, &handler).parse_module();

    // Import resolution, cycle-safe via the visited set.
    if let Some(path) = path {
        if !handler.has_errors() {
            debug!("phase: imports");
            let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
            let mut visited = HashSet::new();
            visited.insert(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));
            imports::resolve_imports(&mut module, base_dir, &handler, &mut visited);
        }
    }

    if handler.has_errors() {
        return CompileOutput {
            module_name: module.name,
            cpp: None,
            diagnostics: handler.take(),
            cache_hit: false,
        };
    }

    // Semantic analysis; all errors collect in the sink.
    debug!("phase: semantic analysis");
    let mut analyzer = SemanticAnalyzer::new(&handler);
    analyzer.analyze(&mut module);

    if handler.has_errors() {
        return CompileOutput {
            module_name: module.name,
            cpp: None,
            diagnostics: handler.take(),
            cache_hit: false,
        };
    }

    // Middle-end lowering.
    debug!("phase: middle-end");
    manac_mid::run_default_passes(&mut module);

    // Emission, consulting the cache when we have a stable file key.
    debug!("phase: emission");
    let file_key = path.map(|p| p.display().to_string());
    let mut cache_hit = false;
    let cpp = match (&file_key, options.use_cache) {
        (Some(key), true) => match CompilationCache::open_default() {
            Ok(mut cache) => {
                if cache.is_fresh(key, source) {
                    if let Some(cached) = cache.load(key) {
                        info!(file = %key, "using cached emission");
                        cache_hit = true;
                        cached
                    } else {
                        emit_and_store(&module, options, Some((&mut cache, key.as_str(), source)))
                    }
                } else {
                    emit_and_store(&module, options, Some((&mut cache, key.as_str(), source)))
                }
            }
            Err(_) => emit_and_store(&module, options, None),
        },
        _ => emit_and_store(&module, options, None),
    };

    CompileOutput {
        module_name: module.name,
        cpp: Some(cpp),
        diagnostics: handler.take(),
        cache_hit,
    }
}

fn emit_and_store(
    module: &Module,
    options: &CompileOptions,
    cache: Option<(&mut CompilationCache, &str, &str)>,
) -> String {
    let mut emitter = CppEmitter::new().with_test_mode(options.test_mode);
    let cpp = emitter.emit(module);
    if let Some((cache, key, source)) = cache {
        if let Err(error) = cache.store(key, source, &cpp) {
            debug!(%error, "cache store failed; continuing without cache");
        }
    }
    cpp
}
