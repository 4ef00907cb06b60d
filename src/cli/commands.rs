//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::{ColoredString, Colorize};
use tracing::{debug, instrument};

use crate::application::services::{Outcome, ReplicatedProject, ReplicationReport};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings, DEFAULT_CONFIG_FILE};
use crate::domain::{forest_size, to_tree, Forest};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => cmd_completion(*shell),
        Commands::Config { command } => cmd_config(cli.config.as_deref(), command),
        Commands::Fetch => cmd_fetch(&container(cli)?),
        Commands::Clean {
            scope,
            require_scope,
        } => cmd_clean(&container(cli)?, scope.as_deref(), *require_scope),
        Commands::Push { dry_run } => cmd_push(&container(cli)?, *dry_run),
        Commands::Sync {
            scope,
            require_scope,
            dry_run,
        } => {
            let container = container(cli)?;
            cmd_fetch(&container)?;
            cmd_clean(&container, scope.as_deref(), *require_scope)?;
            cmd_push(&container, *dry_run)
        }
        Commands::Tree => cmd_tree(&container(cli)?),
    }
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings loaded");
    Ok(ServiceContainer::new(settings))
}

#[instrument(skip(container))]
fn cmd_fetch(container: &ServiceContainer) -> CliResult<()> {
    let service = container.sync_service();
    let records = container
        .source_client()?
        .with_session(|client| service.fetch(client))?;
    output::action(
        "Fetched",
        &format!(
            "{} projects -> {}",
            records.len(),
            container.settings.files.source_projects.display()
        ),
    );
    Ok(())
}

#[instrument(skip(container))]
fn cmd_clean(container: &ServiceContainer, scope: Option<&str>, require_scope: bool) -> CliResult<()> {
    let forest = container.sync_service().clean(scope, require_scope)?;
    if forest.is_empty() {
        output::warning("hierarchy is empty, nothing to push");
    }
    output::action(
        "Cleaned",
        &format!(
            "{} root(s), {} projects -> {}",
            forest.len(),
            forest_size(&forest),
            container.settings.files.cleaned_projects.display()
        ),
    );
    Ok(())
}

#[instrument(skip(container))]
fn cmd_push(container: &ServiceContainer, dry_run: bool) -> CliResult<()> {
    let service = container.sync_service();
    let report = if dry_run {
        output::header("Dry run, target is not contacted");
        service.plan(print_project)?
    } else {
        container
            .target_client()?
            .with_session(|client| service.push(client, print_project))?
    };
    print_summary(&report);
    Ok(())
}

fn print_project(entry: &ReplicatedProject) {
    output::project(entry.depth, outcome_label(entry.outcome), &entry.name);
}

fn outcome_label(outcome: Outcome) -> ColoredString {
    match outcome {
        Outcome::Created => "created".green(),
        Outcome::FoundExisting => "exists".yellow(),
        Outcome::Planned => "ensure".cyan(),
    }
}

fn print_summary(report: &ReplicationReport) {
    if report.planned() > 0 {
        output::success(&format!("{} projects would be ensured", report.planned()));
    } else {
        output::success(&format!(
            "{} created, {} already existed",
            report.created(),
            report.reused()
        ));
    }
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer) -> CliResult<()> {
    let forest: Forest = container.sync_service().forest()?;
    output::header(&format!(
        "{} root(s), {} projects",
        forest.len(),
        forest_size(&forest)
    ));
    for root in &forest {
        output::info(&to_tree(root));
    }
    Ok(())
}

fn cmd_config(config_file: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    let project_path = config_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config_file)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { force } => {
            if project_path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists, use --force to overwrite",
                    project_path.display()
                )));
            }
            std::fs::write(&project_path, Settings::template()).map_err(|e| {
                InfraError::io(format!("write {}", project_path.display()), e)
            })?;
            output::action("Created", &project_path.display());
        }
        ConfigCommands::Path => {
            output::header("Config files (lowest precedence first)");
            match global_config_path() {
                Some(path) => output::detail(&format!("global:  {}{}", path.display(), marker(&path))),
                None => output::detail("global:  (no config directory)"),
            }
            output::detail(&format!(
                "project: {}{}",
                project_path.display(),
                marker(&project_path)
            ));
        }
    }
    Ok(())
}

fn marker(path: &Path) -> &'static str {
    if path.exists() {
        ""
    } else {
        " (not found)"
    }
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    debug!("generating completions for {shell:?}");
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
