mod inputs;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use topping_core::{
    compile_document, BaselineTable, Compilation, CompiledRequirements, CookieDirectory,
    EmptyDirectory, MapDirectory, NormalizeOptions, RequirementsDocument, Topping, ToppingSet,
};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Log levels
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Topping requirements compiler and scorer.
#[derive(Parser)]
#[command(name = "topping", version, about = "Topping requirements compiler and scorer")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log level for diagnostics on stderr (overrides RUST_LOG)
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by every command that compiles a document.
#[derive(clap::Args)]
struct CompileArgs {
    /// Path to the requirements YAML document
    file: PathBuf,
    /// YAML mapping of cookie name to default resonance tags
    #[arg(long)]
    cookies: Option<PathBuf>,
    /// YAML mapping of cookie name to stat values of its finalized loadout;
    /// resolves Relative requirements
    #[arg(long)]
    siblings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every cookie and report diagnostics
    Check {
        #[command(flatten)]
        args: CompileArgs,
    },

    /// Print the compiled requirement summary of each cookie
    Show {
        #[command(flatten)]
        args: CompileArgs,
        /// Only show this cookie
        #[arg(long)]
        cookie: Option<String>,
    },

    /// Rewrite a document into canonical form
    Normalize {
        /// Path to the requirements YAML document
        file: PathBuf,
        /// Drop the leaderboard section
        #[arg(long)]
        strip_leaderboard: bool,
    },

    /// Score a five-topping loadout for one cookie
    Score {
        #[command(flatten)]
        args: CompileArgs,
        /// Cookie to score the loadout for
        #[arg(long)]
        cookie: String,
        /// YAML list of five toppings
        #[arg(long)]
        loadout: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    match cli.command {
        Commands::Check { args } => cmd_check(&args, cli.output, cli.quiet),
        Commands::Show { args, cookie } => {
            cmd_show(&args, cookie.as_deref(), cli.output, cli.quiet)
        }
        Commands::Normalize {
            file,
            strip_leaderboard,
        } => cmd_normalize(&file, strip_leaderboard, cli.output, cli.quiet),
        Commands::Score {
            args,
            cookie,
            loadout,
        } => cmd_score(&args, &cookie, &loadout, cli.output, cli.quiet),
    }
}

/// Initialize tracing on stderr. `--log-level` wins over `RUST_LOG`.
fn initialize_tracing(log_level: Option<LogLevel>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level.to_filter_directive()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ──────────────────────────────────────────────
// Compilation helpers
// ──────────────────────────────────────────────

fn load_document(path: &Path, output: OutputFormat, quiet: bool) -> RequirementsDocument {
    match RequirementsDocument::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}

fn compile(args: &CompileArgs, output: OutputFormat, quiet: bool) -> Compilation {
    let doc = load_document(&args.file, output, quiet);

    let directory: Box<dyn CookieDirectory> = match &args.cookies {
        None => Box::new(EmptyDirectory),
        Some(path) => match MapDirectory::load(path) {
            Ok(dir) => Box::new(dir),
            Err(e) => {
                report_error(&e.to_string(), output, quiet);
                process::exit(1);
            }
        },
    };

    let compilation = match compile_document(&doc, directory.as_ref()) {
        Ok(compilation) => compilation,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match &args.siblings {
        None => compilation,
        Some(path) => match inputs::load_siblings(path) {
            Ok(table) => compilation.resolve(&table),
            Err(e) => {
                report_error(&e.to_string(), output, quiet);
                process::exit(1);
            }
        },
    }
}

/// Number of Relative requirements still waiting for `--siblings`.
fn pending_note(cookie: &CompiledRequirements) -> String {
    match cookie.relative_reqs().len() {
        0 => String::new(),
        1 => " (1 relative requirement pending)".to_string(),
        n => format!(" ({} relative requirements pending)", n),
    }
}

fn print_compile_errors(compilation: &Compilation, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    for e in &compilation.errors {
        match output {
            OutputFormat::Text => eprintln!("error: {}", e),
            OutputFormat::Json => {
                let err_json = serde_json::to_string(&e.to_json_value())
                    .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
                eprintln!("{}", err_json);
            }
        }
    }
}

// ──────────────────────────────────────────────
// Commands
// ──────────────────────────────────────────────

fn cmd_check(args: &CompileArgs, output: OutputFormat, quiet: bool) {
    let compilation = compile(args, output, quiet);

    match output {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "compiled": compilation.cookies.iter().map(|c| c.name()).collect::<Vec<_>>(),
                "pending": compilation
                    .cookies
                    .iter()
                    .filter(|c| !c.is_resolved())
                    .map(|c| c.name())
                    .collect::<Vec<_>>(),
                "errors": compilation.errors.iter().map(|e| e.to_json_value()).collect::<Vec<_>>(),
            });
            let json = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            if !quiet {
                for cookie in &compilation.cookies {
                    println!("ok    {}{}", cookie.name(), pending_note(cookie));
                }
                for e in &compilation.errors {
                    println!("FAIL  {}", e);
                }
                println!();
                println!(
                    "{} compiled, {} rejected",
                    compilation.cookies.len(),
                    compilation.errors.len()
                );
            }
        }
    }

    if !compilation.is_ok() {
        process::exit(1);
    }
}

fn cmd_show(args: &CompileArgs, cookie: Option<&str>, output: OutputFormat, quiet: bool) {
    let compilation = compile(args, output, quiet);
    print_compile_errors(&compilation, output, quiet);

    let selected: Vec<&CompiledRequirements> = match cookie {
        None => compilation.cookies.iter().collect(),
        Some(name) => match compilation.get(name) {
            Some(c) => vec![c],
            None => {
                let msg = format!("cookie '{}' did not compile or is not in the document", name);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        },
    };

    match output {
        OutputFormat::Json => {
            let summaries: Vec<_> = selected.iter().map(|c| c.summary()).collect();
            let json = serde_json::to_string_pretty(&summaries)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            let blocks: Vec<String> = selected.iter().map(|c| c.to_string()).collect();
            println!("{}", blocks.join("\n\n"));
        }
    }

    if !compilation.is_ok() {
        process::exit(1);
    }
}

fn cmd_normalize(file: &Path, strip_leaderboard: bool, output: OutputFormat, quiet: bool) {
    let mut doc = load_document(file, output, quiet);
    doc.normalize(
        &BaselineTable::builtin(),
        NormalizeOptions { strip_leaderboard },
    );

    let rendered = match output {
        OutputFormat::Json => serde_json::to_string_pretty(&doc).map_err(|e| e.to_string()),
        OutputFormat::Text => doc.to_yaml_string().map_err(|e| e.to_string()),
    };
    match rendered {
        Ok(text) => println!("{}", text.trim_end()),
        Err(msg) => {
            report_error(&format!("serialization error: {}", msg), output, quiet);
            process::exit(1);
        }
    }
}

fn cmd_score(
    args: &CompileArgs,
    cookie: &str,
    loadout: &Path,
    output: OutputFormat,
    quiet: bool,
) {
    let compilation = compile(args, output, quiet);
    let Some(compiled) = compilation.get(cookie) else {
        print_compile_errors(&compilation, output, quiet);
        let msg = format!("cookie '{}' did not compile or is not in the document", cookie);
        report_error(&msg, output, quiet);
        process::exit(1);
    };

    let toppings = match inputs::load_loadout(loadout) {
        Ok(t) => t,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };
    let refs: Vec<&Topping> = toppings.iter().collect();
    let Some(set) = ToppingSet::from_slice(&refs) else {
        let msg = format!("loadout must hold exactly 5 toppings, found {}", toppings.len());
        report_error(&msg, output, quiet);
        process::exit(1);
    };

    let score = compiled.score(&set);
    let satisfied = compiled.is_satisfied_by(&set);
    let unusable: Vec<usize> = toppings
        .iter()
        .enumerate()
        .filter(|(_, t)| !compiled.accepts(t))
        .map(|(idx, _)| idx + 1)
        .collect();
    tracing::debug!(cookie, %score, satisfied, "scored loadout");

    match output {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "cookie": compiled.name(),
                "objective": compiled.objective().kind(),
                "score": score.to_string(),
                "satisfied": satisfied,
                "pending_relatives": compiled.relative_reqs().len(),
                "unusable": unusable,
            });
            let json = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            if !quiet {
                println!("{}", set);
            }
            println!("{}: {} = {}", compiled.name(), compiled.objective(), score);
            if !quiet {
                let verdict = if satisfied { "satisfied" } else { "NOT satisfied" };
                println!("requirements {}{}", verdict, pending_note(compiled));
                for idx in &unusable {
                    println!("topping {} has a resonance this cookie cannot use", idx);
                }
            }
        }
    }

    if !satisfied || !unusable.is_empty() {
        process::exit(1);
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
