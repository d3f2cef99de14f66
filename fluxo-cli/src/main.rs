//! Fluxo CLI - Command line interface
//!
//! Project-based execution: all configuration comes from fluxo.json in
//! the project directory. Every `.fxo`/`.fxm` file under that directory
//! is one workspace run; the event log is rendered to stdout.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;

use fluxo_api::{execute, init_config, EventKind, ExecuteOutput, RunConfig, SourceFile};
use fluxo_core::module::workspace::collect_units;
use fluxo_log::{Level, Logger, StderrSink};
use fluxo_vfs::NativeFileSystem;

/// fluxo.json structure
#[derive(Debug, serde::Deserialize)]
struct ProjectJson {
    /// Entry file path, relative to the project directory
    entry: String,
    /// Engine configuration
    engine: Option<EngineSection>,
}

/// Engine configuration section
#[derive(Debug, Default, serde::Deserialize)]
struct EngineSection {
    /// Require `local` before first assignment
    strict_bindings: Option<bool>,
    /// Echo source lines before running
    show_source: Option<bool>,
    /// Dump the event log as JSON instead of rendering it
    dump_events: Option<bool>,
    /// Log level: "silent", "error", "warn", "info", "debug", "trace"
    log_level: Option<String>,
}

#[derive(Parser)]
#[command(
    name = "fluxo",
    about = "Fluxo language engine - project-based workspace execution",
    version = "0.1.0"
)]
struct Cli {
    /// Configuration file path (default: ./fluxo.json)
    #[arg(value_name = "CONFIG", default_value = "fluxo.json")]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let project = match read_project_json(&cli.config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let root = cli
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let run_config = build_run_config(&project);
    init_config(run_config.clone());

    // Materialize the workspace through the VFS seam
    let fs = NativeFileSystem::new();
    let units = match collect_units(&fs, &root) {
        Ok(units) if !units.is_empty() => units,
        Ok(_) => {
            eprintln!(
                "Error: no .fxo or .fxm files under '{}'",
                root.display()
            );
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let entry = normalize_entry(&project.entry);
    if run_config.show_source {
        print_sources(&units, &entry);
    }

    let files: Vec<SourceFile> = units
        .iter()
        .map(|u| SourceFile::new(u.path.clone(), u.code.clone()))
        .collect();

    let output = execute(&files, &entry, &run_config);

    if run_config.dump_events {
        match serde_json::to_string_pretty(&output.events) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: cannot serialize events: {}", e),
        }
    } else {
        render_events(&output);
    }

    if output.error.is_some() {
        process::exit(1);
    }
}

/// Read and parse fluxo.json
fn read_project_json(path: &Path) -> Result<ProjectJson, String> {
    if !path.exists() {
        return Err(format!(
            "'{}' not found\n\nThis directory is not a Fluxo project.\nHint: create '{}' with an 'entry' field",
            path.display(),
            path.display()
        ));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;

    let project: ProjectJson = serde_json::from_str(&content)
        .map_err(|e| format!("cannot parse '{}': {}", path.display(), e))?;

    if project.entry.is_empty() {
        return Err(format!("'entry' in '{}' must not be empty", path.display()));
    }

    Ok(project)
}

/// Map the project file onto a RunConfig
fn build_run_config(project: &ProjectJson) -> RunConfig {
    let engine_section = project.engine.as_ref();
    let mut config = RunConfig::default();

    if let Some(section) = engine_section {
        if let Some(strict) = section.strict_bindings {
            config.engine.strict_bindings = strict;
        }
        config.show_source = section.show_source.unwrap_or(false);
        config.dump_events = section.dump_events.unwrap_or(false);

        if let Some(level_name) = &section.log_level {
            if let Some(level) = Level::from_name(level_name) {
                config.logger = Logger::new(level).with_sink(StderrSink);
            } else {
                eprintln!("Warning: unknown log_level '{}', logging disabled", level_name);
            }
        }
    }
    config
}

/// Workspace paths are rooted at the project directory
fn normalize_entry(entry: &str) -> String {
    if entry.starts_with('/') {
        entry.to_string()
    } else {
        format!("/{}", entry)
    }
}

fn print_sources(units: &[fluxo_core::SourceUnit], entry: &str) {
    println!("[Workspace]");
    for unit in units {
        let marker = if unit.path == entry { " (entry)" } else { "" };
        println!("--- {}{}", unit.path, marker);
        for (i, line) in unit.code.lines().enumerate() {
            println!("{:3} | {}", i + 1, line);
        }
    }
    println!("[Execution Result]");
}

/// Render the event log as `[kind] message (file:line:col)` lines
fn render_events(output: &ExecuteOutput) {
    for event in &output.events {
        let attribution = match (&event.source_file, event.line, event.column) {
            (Some(file), Some(line), Some(column)) => {
                format!(" ({}:{}:{})", file, line, column)
            }
            (Some(file), Some(line), None) => format!(" ({}:{})", file, line),
            (Some(file), None, _) => format!(" ({})", file),
            _ => String::new(),
        };
        match event.kind {
            EventKind::Log => println!("{}{}", event.message, attribution),
            EventKind::Warning => println!("[warning] {}{}", event.message, attribution),
            EventKind::Error => eprintln!("[error] {}{}", event.message, attribution),
            EventKind::Success => println!("[success] {}{}", event.message, attribution),
        }
    }
}
