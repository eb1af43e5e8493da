//! End-to-end pipeline tests at the library level: the spec scenarios
//! (hello world, forward references, immutability, suggestions, ADT
//! matches, constant folding) plus the cross-cutting properties
//! (determinism, emission replay, cache soundness, import cycles).

use manac_drv::cache::{content_hash, CompilationCache};
use manac_drv::{compile_file, compile_source, CompileOptions};
use manac_util::Level;
use std::fs;

fn no_cache() -> CompileOptions {
    CompileOptions {
        use_cache: false,
        test_mode: false,
    }
}

fn errors(output: &manac_drv::CompileOutput) -> Vec<String> {
    output
        .diagnostics
        .iter()
        .filter(|d| d.level == Level::Error)
        .map(|d| d.message.clone())
        .collect()
}

fn warnings(output: &manac_drv::CompileOutput) -> Vec<String> {
    output
        .diagnostics
        .iter()
        .filter(|d| d.level == Level::Warning)
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn hello_world_compiles_and_prints() {
    let output = compile_source(
        "module m\nfn main() -> i32 { println(\"hi\")\nreturn 0 }",
        &no_cache(),
    );
    assert!(!output.has_errors());
    let cpp = output.cpp.expect("emitted");
    assert!(cpp.contains("mana::println(\"hi\");"));
    assert!(cpp.contains("return 0;"));
}

#[test]
fn forward_reference_type_checks_and_emits() {
    let output = compile_source(
        "module m\nfn main() -> i32 { return f(); }\nfn f() -> i32 { return 7; }",
        &no_cache(),
    );
    assert!(!output.has_errors(), "errors: {:?}", errors(&output));
    let cpp = output.cpp.expect("emitted");
    let forward = cpp.find("int32_t f();").expect("forward declaration");
    let call_site = cpp.find("return f();").expect("call site");
    assert!(forward < call_site);
}

#[test]
fn immutable_assignment_is_exactly_one_error() {
    let output = compile_source(
        "module m\nfn main() -> i32 { const x: i32 = 3; x = 4; return 0; }",
        &no_cache(),
    );
    let errors = errors(&output);
    assert_eq!(errors.len(), 1, "got: {:?}", errors);
    assert!(errors[0].contains("cannot assign to immutable variable 'x'"));
    assert!(output.cpp.is_none());
}

#[test]
fn redeclaration_in_same_scope_is_error() {
    let output = compile_source(
        "module m\nfn main() -> i32 { let x: i32 = 1\nlet x: i32 = 2\nreturn x }",
        &no_cache(),
    );
    let errors = errors(&output);
    assert!(
        errors
            .iter()
            .any(|e| e.contains("variable 'x' already declared in this scope")),
        "got: {:?}",
        errors
    );
    assert!(output.cpp.is_none());
}

#[test]
fn duplicate_top_level_definition_is_error() {
    let output = compile_source(
        "module m\nfn work() -> i32 { return 1 }\nfn work() -> i32 { return 2 }\nfn main() -> i32 { return work() }",
        &no_cache(),
    );
    let errors = errors(&output);
    assert!(
        errors
            .iter()
            .any(|e| e.contains("duplicate definition of 'work'")),
        "got: {:?}",
        errors
    );
}

#[test]
fn did_you_mean_suggests_println() {
    let output = compile_source(
        "module m\nfn main() -> i32 { printn(\"hi\"); return 0; }",
        &no_cache(),
    );
    let errors = errors(&output);
    assert!(errors
        .iter()
        .any(|e| e.contains("printn") && e.contains("did you mean 'println'?")));
}

#[test]
fn adt_match_emits_and_missing_variant_warns() {
    let full = compile_source(
        "module m\nvariant E { A(i32), B }\nfn main() -> i32 {\n  let e: E = E::A(5)\n  return match e { E::A(n) => n, E::B => 0, }\n}",
        &no_cache(),
    );
    assert!(!full.has_errors(), "errors: {:?}", errors(&full));
    let cpp = full.cpp.expect("emitted");
    assert!(cpp.contains("ETag::A"));
    assert!(cpp.contains("auto n = __data_0._0;"));

    let partial = compile_source(
        "module m\nvariant E { A(i32), B }\nfn main() -> i32 {\n  let e: E = E::A(5)\n  return match e { E::A(n) => n, }\n}",
        &no_cache(),
    );
    let hits: Vec<_> = warnings(&partial)
        .into_iter()
        .filter(|w| w.contains("non-exhaustive match"))
        .collect();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].contains("E::B"));
}

#[test]
fn constant_folding_reaches_emission() {
    let output = compile_source(
        "module m\nfn main() -> i32 {\n  let x: i32 = 2 + 3 * 4\n  return x\n}",
        &no_cache(),
    );
    let cpp = output.cpp.expect("emitted");
    assert!(cpp.contains("int32_t x = 14;"));
    assert!(!cpp.contains("2 + 3 * 4"));
    assert!(!cpp.contains("(3 * 4)"));
}

#[test]
fn exhaustive_coverage_warning_names_only_missing_variants() {
    let output = compile_source(
        "module m\nvariant E { A, B, C }\nfn main() -> i32 {\n  let e: E = E::A\n  let _x = match e { E::A => 1, E::B => 2, }\n  return 0\n}",
        &no_cache(),
    );
    let hits: Vec<_> = warnings(&output)
        .into_iter()
        .filter(|w| w.contains("non-exhaustive match"))
        .collect();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].contains("E::C"));
    assert!(!hits[0].contains("E::B"));
}

#[test]
fn semantic_determinism_identical_diagnostic_streams() {
    let source =
        "module m\nfn main() -> i32 {\n  let unused = 1\n  let x: bool = 3\n  return missing\n}";
    let first = compile_source(source, &no_cache());
    let second = compile_source(source, &no_cache());
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn emission_replay_is_byte_identical() {
    let source = "module m\nvariant E { A(i32), B }\nfn go() -> Result<i32, string> {\n  let v = parse()?\n  return Ok(v)\n}\nfn parse() -> Result<i32, string> { return Ok(3) }\nfn main() -> i32 { return 0 }";
    let first = compile_source(source, &no_cache());
    let second = compile_source(source, &no_cache());
    assert_eq!(first.cpp, second.cpp);
}

#[test]
fn import_cycle_resolves_once_and_terminates() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("a.mana"),
        "module a\nimport \"b\"\npub fn fa() -> i32 { return 1 }",
    )
    .unwrap();
    fs::write(
        dir.path().join("b.mana"),
        "module b\nimport \"a\"\npub fn fb() -> i32 { return 2 }",
    )
    .unwrap();
    let entry = dir.path().join("main.mana");
    fs::write(
        &entry,
        "module app\nimport \"a\"\nfn main() -> i32 { return fa() + fb() }",
    )
    .unwrap();

    let output = compile_file(&entry, &no_cache()).expect("compile");
    assert!(!output.has_errors(), "errors: {:?}", errors(&output));
    let cpp = output.cpp.expect("emitted");
    // Each imported function emitted exactly once.
    assert_eq!(cpp.matches("int32_t fa() {").count(), 1);
    assert_eq!(cpp.matches("int32_t fb() {").count(), 1);
}

#[test]
fn private_import_use_is_visibility_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("lib.mana"),
        "module lib\nfn secret() -> i32 { return 1 }\npub fn open() -> i32 { return secret() }",
    )
    .unwrap();
    let entry = dir.path().join("main.mana");
    fs::write(
        &entry,
        "module app\nimport \"lib\"\nfn main() -> i32 { return secret() }",
    )
    .unwrap();

    let output = compile_file(&entry, &no_cache()).expect("compile");
    let errors = errors(&output);
    assert!(
        errors.iter().any(|e| e.contains("'secret' is private in module 'lib'")),
        "got: {:?}",
        errors
    );
}

#[test]
fn public_import_use_is_allowed() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("lib.mana"),
        "module lib\nfn secret() -> i32 { return 1 }\npub fn open() -> i32 { return secret() }",
    )
    .unwrap();
    let entry = dir.path().join("main.mana");
    fs::write(
        &entry,
        "module app\nimport \"lib\"\nfn main() -> i32 { return open() }",
    )
    .unwrap();

    let output = compile_file(&entry, &no_cache()).expect("compile");
    assert!(!output.has_errors(), "errors: {:?}", errors(&output));
}

#[test]
fn cache_soundness_cached_equals_fresh() {
    let dir = tempfile::tempdir().expect("tempdir");
    let entry = dir.path().join("main.mana");
    let source = "module m\nfn main() -> i32 { println(\"cached\")\nreturn 0 }";
    fs::write(&entry, source).unwrap();

    // A dedicated cache keyed like the driver would key it.
    let cache_dir = dir.path().join("cache");
    let mut cache = CompilationCache::open(&cache_dir).expect("open cache");
    let key = entry.display().to_string();

    let fresh = compile_file(&entry, &no_cache()).expect("compile");
    let fresh_cpp = fresh.cpp.expect("emitted");
    cache.store(&key, source, &fresh_cpp).expect("store");

    assert!(cache.is_fresh(&key, source));
    let cached_cpp = cache.load(&key).expect("cached");
    let recompiled = compile_file(&entry, &no_cache()).expect("compile again");
    assert_eq!(Some(cached_cpp), recompiled.cpp);

    // Touching the source invalidates by hash.
    let changed = "module m\nfn main() -> i32 { println(\"changed\")\nreturn 0 }";
    assert!(!cache.is_fresh(&key, changed));
    assert_ne!(content_hash(source), content_hash(changed));
}

#[test]
fn driver_cache_round_trip_hits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let entry = dir.path().join("main.mana");
    fs::write(&entry, "module m\nfn main() -> i32 { return 0 }").unwrap();

    let options = CompileOptions {
        use_cache: true,
        test_mode: false,
    };
    let first = compile_file(&entry, &options).expect("compile");
    assert!(!first.has_errors());
    let second = compile_file(&entry, &options).expect("compile again");
    assert!(second.cache_hit, "second compile should hit the cache");
    assert_eq!(first.cpp, second.cpp);
}

#[test]
fn try_propagation_desugars_at_statement_level() {
    let output = compile_source(
        "module m\nfn read() -> Result<i32, string> { return Ok(2) }\nfn work() -> Result<i32, string> {\n  let v = read()?\n  return Ok(v * 2)\n}\nfn main() -> i32 { return 0 }",
        &no_cache(),
    );
    let cpp = output.cpp.expect("emitted");
    assert!(cpp.contains("if (__try_0.__is_err()) return mana::Err(__try_0.__unwrap_err());"));
}

#[test]
fn or_expression_diverging_rhs_compiles() {
    let output = compile_source(
        "module m\nfn read() -> Result<i32, string> { return Ok(1) }\nfn main() -> i32 {\n  let v = read() or return 1\n  return v\n}",
        &no_cache(),
    );
    assert!(!output.has_errors(), "errors: {:?}", errors(&output));
    assert!(output.cpp.expect("emitted").contains("__or_0"));
}

#[test]
fn lowering_passes_are_idempotent_through_driver() {
    // Two identical compiles run lowering twice from scratch; equal
    // emission implies the rewrite is stable.
    let source = "module m\nfn main() -> i32 {\n  for i: i32 = 0; i < 4; i++ {\n    if i == 2 { return i }\n  }\n  return 0\n  println(\"dead\")\n}";
    let first = compile_source(source, &no_cache());
    let second = compile_source(source, &no_cache());
    assert_eq!(first.cpp, second.cpp);
    let cpp = first.cpp.expect("emitted");
    assert!(cpp.contains("while ((i < 4))"));
    assert!(!cpp.contains("dead"));
}

#[test]
fn unused_variable_and_unreachable_code_warnings() {
    let output = compile_source(
        "module m\nfn main() -> i32 {\n  let never_read = 5\n  return 0\n  println(\"gone\")\n}",
        &no_cache(),
    );
    let warnings = warnings(&output);
    assert!(warnings.iter().any(|w| w.contains("unused variable 'never_read'")));
    assert!(warnings.iter().any(|w| w.contains("unreachable code")));
}

#[test]
fn test_mode_generates_harness_main() {
    let options = CompileOptions {
        use_cache: false,
        test_mode: true,
    };
    let output = compile_source(
        "module m\n#[test]\nfn addition_works() -> void { assert(1 + 1 == 2) }\nfn main() -> i32 { return 0 }",
        &options,
    );
    let cpp = output.cpp.expect("emitted");
    assert!(cpp.contains("addition_works();"));
    assert!(cpp.contains("int main() {"));
}
