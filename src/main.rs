use clap::Parser;
use goboundcheck::LintEngine;
use goboundcheck::cli::{Args, Command, LintArgs, OutputFormat};
use goboundcheck::config;
use goboundcheck::level::LintLevel;
use goboundcheck::lint::{LintRegistry, LintSettings};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    goboundcheck::telemetry::init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Some(Command::ListRules) => {
            list_rules();
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Explain { rule }) => {
            explain_rule(&rule)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Lint(lint)) => lint_command(lint),
        None => lint_command(args.lint),
    }
}

fn list_rules() {
    let registry = LintRegistry::default_rules();
    let mut rules: Vec<_> = registry.descriptors().collect();
    rules.sort_by_key(|d| d.name);

    for d in rules {
        println!("{}\t{}\t{}", d.name, d.category.as_str(), d.description);
    }
}

fn explain_rule(rule: &str) -> anyhow::Result<()> {
    let registry = LintRegistry::default_rules();
    let Some(d) = registry.get(rule) else {
        anyhow::bail!("unknown lint: {rule}");
    };

    println!("name: {}", d.name);
    println!("category: {}", d.category.as_str());
    println!("description: {}", d.description);
    Ok(())
}

fn lint_command(args: LintArgs) -> anyhow::Result<ExitCode> {
    let start_dir = infer_start_dir(&args)?;
    let loaded_cfg = config::load_config(args.config.as_deref(), &start_dir)?;

    let settings = match loaded_cfg.as_ref() {
        Some((_path, cfg)) => LintSettings::default()
            .with_config_levels(cfg.lints.levels.clone())
            .disable(cfg.lints.disabled.clone()),
        None => LintSettings::default(),
    };

    let engine = LintEngine::new_with_settings(LintRegistry::default_rules(), settings);

    let mut total_diags = 0usize;
    let mut has_error = false;

    match args.format {
        OutputFormat::Json => {
            let mut out: Vec<JsonDiagnostic> = Vec::new();

            if args.paths.is_empty() {
                let (count, file_has_error, mut diags) = lint_stdin_json(&engine)?;
                total_diags += count;
                has_error |= file_has_error;
                out.append(&mut diags);
            } else {
                let files = collect_go_files(&args.paths)?;
                for path in files {
                    let (count, file_has_error, mut diags) = lint_file_json(&engine, &path)?;
                    total_diags += count;
                    has_error |= file_has_error;
                    out.append(&mut diags);
                }
            }

            out.sort_by(|a, b| {
                (a.file.as_str(), a.row, a.column, a.lint.as_str()).cmp(&(
                    b.file.as_str(),
                    b.row,
                    b.column,
                    b.lint.as_str(),
                ))
            });

            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Pretty | OutputFormat::Github => {
            if args.paths.is_empty() {
                let (count, file_has_error) =
                    lint_stdin_text(&engine, args.format, args.deny_warnings)?;
                total_diags += count;
                has_error |= file_has_error;
            } else {
                let files = collect_go_files(&args.paths)?;
                for path in files {
                    let (count, file_has_error) =
                        lint_file_text(&engine, &path, args.format, args.deny_warnings)?;
                    total_diags += count;
                    has_error |= file_has_error;
                }
            }
        }
    }

    if has_error || (args.deny_warnings && total_diags > 0) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic {
    file: String,
    row: usize,
    column: usize,
    level: String,
    lint: String,
    message: String,
}

fn lint_file_text(
    engine: &LintEngine,
    path: &Path,
    format: OutputFormat,
    deny_warnings: bool,
) -> anyhow::Result<(usize, bool)> {
    let source = std::fs::read_to_string(path)?;
    let diagnostics = engine.lint_source(&source)?;
    let file = path.display().to_string();
    Ok(print_text_diagnostics(&diagnostics, &file, format, deny_warnings))
}

fn lint_stdin_text(
    engine: &LintEngine,
    format: OutputFormat,
    deny_warnings: bool,
) -> anyhow::Result<(usize, bool)> {
    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source)?;
    let diagnostics = engine.lint_source(&source)?;
    Ok(print_text_diagnostics(&diagnostics, "stdin", format, deny_warnings))
}

fn print_text_diagnostics(
    diagnostics: &[goboundcheck::diagnostics::Diagnostic],
    file: &str,
    format: OutputFormat,
    deny_warnings: bool,
) -> (usize, bool) {
    let mut has_error = false;

    match format {
        OutputFormat::Pretty => {
            for diag in diagnostics {
                println!(
                    "{}:{}:{}: {}: {}: {}",
                    file,
                    diag.span.start.row,
                    diag.span.start.column,
                    diag.level.as_str(),
                    diag.lint.name,
                    diag.message
                );
                has_error |= diag.level == LintLevel::Error;
            }
            println!("{} diagnostics for {}", diagnostics.len(), file);
        }
        OutputFormat::Github => {
            for diag in diagnostics {
                let msg = github_escape(&diag.message);
                let kind = if diag.level == LintLevel::Error
                    || (deny_warnings && diag.level == LintLevel::Warn)
                {
                    "error"
                } else {
                    "warning"
                };
                println!(
                    "::{} file={},line={},col={},title={}::{}",
                    kind,
                    github_escape(file),
                    diag.span.start.row,
                    diag.span.start.column,
                    diag.lint.name,
                    msg
                );
                has_error |= kind == "error";
            }
        }
        OutputFormat::Json => unreachable!("json handled elsewhere"),
    }

    (diagnostics.len(), has_error)
}

fn lint_file_json(
    engine: &LintEngine,
    path: &Path,
) -> anyhow::Result<(usize, bool, Vec<JsonDiagnostic>)> {
    let source = std::fs::read_to_string(path)?;
    let diagnostics = engine.lint_source(&source)?;
    Ok(json_diagnostics(&diagnostics, &path.display().to_string()))
}

fn lint_stdin_json(engine: &LintEngine) -> anyhow::Result<(usize, bool, Vec<JsonDiagnostic>)> {
    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source)?;
    let diagnostics = engine.lint_source(&source)?;
    Ok(json_diagnostics(&diagnostics, "stdin"))
}

fn json_diagnostics(
    diagnostics: &[goboundcheck::diagnostics::Diagnostic],
    file: &str,
) -> (usize, bool, Vec<JsonDiagnostic>) {
    let mut has_error = false;

    let out = diagnostics
        .iter()
        .map(|d| {
            has_error |= d.level == LintLevel::Error;
            JsonDiagnostic {
                file: d.file.clone().unwrap_or_else(|| file.to_string()),
                row: d.span.start.row,
                column: d.span.start.column,
                level: d.level.as_str().to_string(),
                lint: d.lint.name.to_string(),
                message: d.message.clone(),
            }
        })
        .collect::<Vec<_>>();

    (diagnostics.len(), has_error, out)
}

fn github_escape(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn collect_go_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        collect_from_path(path, &mut out)?;
    }

    out.sort();
    out.dedup();
    Ok(out)
}

fn collect_from_path(path: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let meta = std::fs::metadata(path)?;
    if meta.is_dir() {
        collect_from_dir(path, out)
    } else {
        out.push(path.to_path_buf());
        Ok(())
    }
}

fn collect_from_dir(dir: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            collect_from_dir(&path, out)?;
            continue;
        }

        if path.extension().and_then(|e| e.to_str()) == Some("go") {
            out.push(path);
        }
    }

    Ok(())
}

fn should_skip_dir(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };

    matches!(name, ".git" | "target" | "vendor")
}

fn infer_start_dir(args: &LintArgs) -> anyhow::Result<PathBuf> {
    let base = if let Some(p) = args.paths.first() {
        p.clone()
    } else {
        std::env::current_dir()?
    };

    let base = if base.is_file() {
        base.parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        base
    };

    Ok(base)
}
