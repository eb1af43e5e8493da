//! The `manac` command-line driver.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use manac_drv::cache::CompilationCache;
use manac_drv::manifest::Manifest;
use manac_drv::{astprint, docgen, CompileOptions};
use manac_emit::{RUNTIME_HEADER, RUNTIME_HEADER_NAME};

#[derive(Parser)]
#[command(
    name = "manac",
    version,
    about = "Compiler for the mana language",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Source file to compile directly.
    file: Option<PathBuf>,

    /// Output path for the generated translation unit.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Stop after emission (the default build also stops there; kept for
    /// interface compatibility).
    #[arg(short = 'c')]
    compile_only: bool,

    /// Print the generated C++ to stdout.
    #[arg(long = "emit-cpp")]
    emit_cpp: bool,

    /// Print the AST to stdout.
    #[arg(long = "ast")]
    ast: bool,

    /// Generate Markdown documentation next to the source file.
    #[arg(long = "doc")]
    doc: bool,

    /// Disable the incremental compilation cache.
    #[arg(long = "no-cache")]
    no_cache: bool,

    /// Clear the compilation cache and exit (unless a file is given).
    #[arg(long = "clear-cache")]
    clear_cache: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build the current package (src/main.mana per package.toml).
    Build,
    /// Build the current package and report how to run it.
    Run,
    /// Compile the package in test mode.
    Test,
    /// Create a new package.
    New { name: String },
    /// Format a source file (ships outside the core distribution).
    Fmt { file: PathBuf },
    /// Start the interactive REPL (ships outside the core distribution).
    Repl,
    /// Add a dependency to package.toml.
    Add { dep: String },
    /// Remove a dependency from package.toml.
    Remove { dep: String },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("error: {:#}", error);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    if let Some(command) = cli.command {
        return match command {
            Command::Build => build_package(false),
            Command::Run => {
                let code = build_package(false)?;
                if code == 0 {
                    println!(
                        "note: invoking a native toolchain is outside the compiler core; \
                         compile the generated C++ with your C++ compiler to run it"
                    );
                }
                Ok(code)
            }
            Command::Test => build_package(true),
            Command::New { name } => new_package(&name),
            Command::Fmt { .. } => {
                eprintln!("error: the formatter ships outside the core distribution");
                Ok(1)
            }
            Command::Repl => {
                eprintln!("error: the REPL ships outside the core distribution");
                Ok(1)
            }
            Command::Add { dep } => edit_dependencies(&dep, true),
            Command::Remove { dep } => edit_dependencies(&dep, false),
        };
    }

    // --clear-cache without a file just clears and exits.
    if cli.clear_cache && cli.file.is_none() {
        CompilationCache::open_default()
            .context("open cache")?
            .clear()
            .context("clear cache")?;
        println!("Cleared compilation cache");
        return Ok(0);
    }

    let Some(file) = &cli.file else {
        bail!("no input file");
    };

    if cli.clear_cache {
        CompilationCache::open_default()
            .context("open cache")?
            .clear()
            .context("clear cache")?;
        println!("Cleared compilation cache");
    }

    compile_one(file, &cli)
}

fn compile_one(file: &Path, cli: &Cli) -> Result<u8> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("cannot open file: {}", file.display()))?;

    // The AST printer works from the parse even when later phases fail,
    // so print before judging diagnostics.
    if cli.ast {
        let handler = manac_util::Handler::new();
        let module = manac_par::parse_source(&source, &handler);
        print!("{}", astprint::print_module(&module));
    }

    let options = CompileOptions {
        use_cache: !cli.no_cache,
        test_mode: false,
    };
    let output = manac_drv::compile_file(file, &options)?;

    // Render every diagnostic — errors fail the build, warnings ride
    // along on success.
    let filename = file.display().to_string();
    for diag in &output.diagnostics {
        eprint!("{}", manac_util::diagnostic::render(diag, &filename, &source));
    }
    if output.has_errors() {
        return Ok(1);
    }

    let cpp = output.cpp.expect("emission ran without errors");

    if cli.doc {
        let handler = manac_util::Handler::new();
        let module = manac_par::parse_source(&source, &handler);
        let markdown = docgen::generate(&module);
        let doc_path = file.with_extension("md");
        fs::write(&doc_path, markdown)
            .with_context(|| format!("cannot write documentation file: {}", doc_path.display()))?;
        println!("Generated documentation: {}", doc_path.display());
        return Ok(0);
    }

    if cli.emit_cpp {
        print!("{}", cpp);
        return Ok(0);
    }

    let out_dir = file.parent().unwrap_or_else(|| Path::new("."));
    let cpp_path = match &cli.output {
        Some(output) => output.clone(),
        None => file.with_extension("cpp"),
    };

    write_output(&cpp_path, out_dir, &cpp, file)?;
    if cli.compile_only {
        return Ok(0);
    }
    Ok(0)
}

fn write_output(cpp_path: &Path, out_dir: &Path, cpp: &str, source_file: &Path) -> Result<()> {
    let runtime_path = out_dir.join(RUNTIME_HEADER_NAME);
    fs::write(&runtime_path, RUNTIME_HEADER)
        .with_context(|| format!("cannot write runtime header: {}", runtime_path.display()))?;

    let banner = format!("// Generated by manac from {}\n", source_file.display());
    fs::write(cpp_path, format!("{}{}", banner, cpp))
        .with_context(|| format!("cannot write C++ file: {}", cpp_path.display()))?;

    println!("Generated: {}", cpp_path.display());
    Ok(())
}

fn build_package(test_mode: bool) -> Result<u8> {
    let manifest_text =
        fs::read_to_string("package.toml").context("cannot read package.toml")?;
    let manifest = Manifest::parse(&manifest_text).context("invalid package.toml")?;

    let entry = Path::new("src/main.mana");
    if !entry.exists() {
        bail!("missing src/main.mana");
    }

    let options = CompileOptions {
        use_cache: true,
        test_mode,
    };
    let output = manac_drv::compile_file(entry, &options)?;

    let source = fs::read_to_string(entry)?;
    let filename = entry.display().to_string();
    for diag in &output.diagnostics {
        eprint!("{}", manac_util::diagnostic::render(diag, &filename, &source));
    }
    if output.has_errors() {
        return Ok(1);
    }

    let target_dir = Path::new("target");
    fs::create_dir_all(target_dir).context("cannot create target directory")?;
    let stem = if test_mode {
        format!("{}_test", manifest.package.name)
    } else {
        manifest.package.name.clone()
    };
    let cpp_path = target_dir.join(format!("{}.cpp", stem));
    write_output(
        &cpp_path,
        target_dir,
        &output.cpp.expect("emission ran"),
        entry,
    )?;
    Ok(0)
}

fn new_package(name: &str) -> Result<u8> {
    let root = Path::new(name);
    if root.exists() {
        bail!("directory '{}' already exists", name);
    }
    fs::create_dir_all(root.join("src"))
        .with_context(|| format!("cannot create package directory '{}'", name))?;

    let manifest = Manifest::new(name);
    fs::write(root.join("package.toml"), manifest.to_string())
        .context("cannot write package.toml")?;

    let main_source = format!(
        "module {}\n\nfn main() -> i32 {{\n    println(\"Hello from {}!\")\n    return 0\n}}\n",
        name, name
    );
    fs::write(root.join("src/main.mana"), main_source).context("cannot write src/main.mana")?;

    println!("Created package '{}'", name);
    Ok(0)
}

fn edit_dependencies(dep: &str, add: bool) -> Result<u8> {
    let manifest_text =
        fs::read_to_string("package.toml").context("cannot read package.toml")?;
    let mut manifest = Manifest::parse(&manifest_text).context("invalid package.toml")?;

    if add {
        // `name@version` pins a version; bare names track the latest.
        let (name, version) = match dep.split_once('@') {
            Some((name, version)) => (name, version),
            None => (dep, "*"),
        };
        manifest.add_dependency(name, version);
        println!("Added dependency '{}'", name);
    } else if manifest.remove_dependency(dep) {
        println!("Removed dependency '{}'", dep);
    } else {
        bail!("no dependency named '{}'", dep);
    }

    fs::write("package.toml", manifest.to_string()).context("cannot write package.toml")?;
    Ok(0)
}
