//! Command dispatch

use std::io::{self, Read};
use std::path::Path;

use clap::CommandFactory;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{
    parse_script, IoResultExt, JsonResultExt, QueryBuilder, ScriptRunner,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::ToTermTree;
use crate::config::{self, OutputFormat, Settings};
use crate::domain::{Combinator, Tree};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let format = cli.format.unwrap_or(settings.output.format);
    debug!(?format, "settings loaded");

    match &cli.command {
        Some(Commands::Normalize { file }) => cmd_normalize(file.as_deref(), &settings, format),
        Some(Commands::Run {
            script,
            input,
            each,
        }) => cmd_run(script, input.as_deref(), *each, &settings, format),
        Some(Commands::Show { file }) => {
            cmd_normalize(file.as_deref(), &settings, OutputFormat::Tree)
        }
        Some(Commands::Options) => cmd_options(&settings),
        Some(Commands::Config { command }) => cmd_config(command, &settings),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "querytree", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".into())),
    }
}

/// Reads a tree file, or stdin for None and `-`.
pub fn read_tree(path: Option<&Path>) -> CliResult<Value> {
    let (text, origin) = match path {
        Some(p) if p != Path::new("-") => {
            let text = std::fs::read_to_string(p).with_path_context("read tree", p)?;
            (text, p.display().to_string())
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| CliError::io("read stdin", e))?;
            (text, "stdin".to_string())
        }
    };
    Ok(serde_json::from_str(&text).with_json_context(&origin)?)
}

pub fn render(tree: &Tree, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(tree).with_json_context("snapshot")?),
        OutputFormat::Tree => Ok(tree.to_term_tree().to_string()),
    }
}

#[instrument(skip(settings))]
fn cmd_normalize(file: Option<&Path>, settings: &Settings, format: OutputFormat) -> CliResult<()> {
    let candidate = read_tree(file)?;
    let mut snapshot = None;
    let model = QueryBuilder::with_allocator(
        Some(candidate),
        settings.ids.allocator(),
        |tree: Tree| snapshot = Some(tree),
    );
    drop(model);
    if let Some(tree) = snapshot {
        output::document(&render(&tree, format)?);
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_run(
    script: &Path,
    input: Option<&Path>,
    each: bool,
    settings: &Settings,
    format: OutputFormat,
) -> CliResult<()> {
    let text = std::fs::read_to_string(script).with_path_context("read script", script)?;
    let commands = parse_script(&text)?;
    let initial = input.map(|p| read_tree(Some(p))).transpose()?;

    let report = ScriptRunner::new(initial, settings.ids.allocator(), settings.options.clone())
        .run(&commands);
    for warning in &report.warnings {
        output::warning(warning);
    }

    if each {
        for (step, tree) in report.snapshots.iter().enumerate() {
            output::section(&format!("# step {}", step));
            output::document(&render(tree, format)?);
        }
    } else if let Some(tree) = report.final_tree() {
        output::document(&render(tree, format)?);
    }
    Ok(())
}

fn cmd_options(settings: &Settings) -> CliResult<()> {
    output::section("fields");
    for field in &settings.options.fields {
        output::item(field);
    }
    output::section("operators");
    for operator in &settings.options.operators {
        output::item(operator);
    }
    output::section("combinators");
    for combinator in Combinator::ALL {
        output::item(&combinator);
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::document(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                config::global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                config::local_config_path()
            };
            write_template(&path)?;
            output::success(&format!("created {}", path.display()));
            Ok(())
        }
        ConfigCommands::Path => {
            match config::global_config_path() {
                Some(p) => output::labelled("global", &p.display()),
                None => output::labelled("global", &"<unavailable>"),
            }
            output::labelled("local", &config::local_config_path().display());
            Ok(())
        }
    }
}

fn write_template(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(CliError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| CliError::io(format!("create {}", parent.display()), e))?;
    }
    std::fs::write(path, Settings::template())
        .map_err(|e| CliError::io(format!("write {}", path.display()), e))
}
