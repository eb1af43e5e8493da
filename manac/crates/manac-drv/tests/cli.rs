//! Command-line interface tests for the `manac` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn manac() -> Command {
    Command::cargo_bin("manac").expect("binary builds")
}

#[test]
fn no_arguments_shows_help_and_fails() {
    manac().assert().failure();
}

#[test]
fn emit_cpp_prints_translation_to_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("hello.mana");
    fs::write(
        &file,
        "module hello\nfn main() -> i32 { println(\"hi\")\nreturn 0 }",
    )
    .unwrap();

    manac()
        .arg(&file)
        .arg("--emit-cpp")
        .arg("--no-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("mana::println(\"hi\");"))
        .stdout(predicate::str::contains("#include \"mana_runtime.h\""));
}

#[test]
fn compile_writes_cpp_and_runtime_header() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("app.mana");
    fs::write(&file, "module app\nfn main() -> i32 { return 0 }").unwrap();

    manac()
        .arg(&file)
        .arg("-c")
        .arg("--no-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated:"));

    assert!(dir.path().join("app.cpp").exists());
    assert!(dir.path().join("mana_runtime.h").exists());
    let cpp = fs::read_to_string(dir.path().join("app.cpp")).unwrap();
    assert!(cpp.contains("int32_t main()"));
}

#[test]
fn errors_exit_one_with_rendered_diagnostics() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("bad.mana");
    fs::write(
        &file,
        "module bad\nfn main() -> i32 { const x: i32 = 3\nx = 4\nreturn 0 }",
    )
    .unwrap();

    manac()
        .arg(&file)
        .arg("--no-cache")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "cannot assign to immutable variable 'x'",
        ))
        .stderr(predicate::str::contains("--> "));
}

#[test]
fn ast_flag_prints_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("tree.mana");
    fs::write(&file, "module tree\nfn main() -> i32 { return 0 }").unwrap();

    manac()
        .arg(&file)
        .arg("--ast")
        .arg("--emit-cpp")
        .arg("--no-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Module tree"))
        .stdout(predicate::str::contains("Function main"));
}

#[test]
fn doc_flag_writes_markdown() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("lib.mana");
    fs::write(
        &file,
        "module lib\n/// Doubles a number.\npub fn twice(x: i32) -> i32 { return x * 2 }\nfn main() -> i32 { return 0 }",
    )
    .unwrap();

    manac()
        .arg(&file)
        .arg("--doc")
        .arg("--no-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated documentation:"));

    let md = fs::read_to_string(dir.path().join("lib.md")).unwrap();
    assert!(md.contains("Doubles a number."));
}

#[test]
fn new_scaffolds_a_package() {
    let dir = tempfile::tempdir().expect("tempdir");
    manac()
        .current_dir(dir.path())
        .args(["new", "demo"])
        .assert()
        .success();

    assert!(dir.path().join("demo/package.toml").exists());
    let main_source = fs::read_to_string(dir.path().join("demo/src/main.mana")).unwrap();
    assert!(main_source.contains("module demo"));
}

#[test]
fn build_emits_into_target() {
    let dir = tempfile::tempdir().expect("tempdir");
    manac()
        .current_dir(dir.path())
        .args(["new", "proj"])
        .assert()
        .success();

    manac()
        .current_dir(dir.path().join("proj"))
        .arg("build")
        .assert()
        .success();

    assert!(dir.path().join("proj/target/proj.cpp").exists());
    assert!(dir.path().join("proj/target/mana_runtime.h").exists());
}

#[test]
fn add_and_remove_dependency_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    manac()
        .current_dir(dir.path())
        .args(["new", "depsy"])
        .assert()
        .success();
    let proj = dir.path().join("depsy");

    manac()
        .current_dir(&proj)
        .args(["add", "mathlib@1.2"])
        .assert()
        .success();
    let manifest = fs::read_to_string(proj.join("package.toml")).unwrap();
    assert!(manifest.contains("mathlib = \"1.2\""));

    manac()
        .current_dir(&proj)
        .args(["remove", "mathlib"])
        .assert()
        .success();
    let manifest = fs::read_to_string(proj.join("package.toml")).unwrap();
    assert!(!manifest.contains("mathlib"));

    manac()
        .current_dir(&proj)
        .args(["remove", "mathlib"])
        .assert()
        .failure();
}

#[test]
fn fmt_and_repl_report_unavailable() {
    manac().args(["repl"]).assert().code(1);
    manac()
        .args(["fmt", "whatever.mana"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("formatter"));
}
