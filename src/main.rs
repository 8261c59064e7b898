use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use version_bump::cli::orchestration;
use version_bump::config;
use version_bump::context::RunContext;
use version_bump::git::Git2Repository;
use version_bump::ui;

#[derive(clap::Parser)]
#[command(
    name = "version-bump",
    version,
    about = "Bump package.json versions from commit messages, then commit, tag and push"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        long,
        env = "GITHUB_WORKSPACE",
        default_value = ".",
        help = "Checked-out repository"
    )]
    workspace: PathBuf,

    #[arg(
        long,
        env = "PACKAGEJSON_DIR",
        help = "Directory of the root package.json, relative to the workspace"
    )]
    package_dir: Option<String>,

    #[arg(long, env = "GITHUB_EVENT_PATH", help = "Event payload with the pushed commits")]
    event_path: Option<PathBuf>,

    #[arg(long, help = "Preview the bump without changing files or refs")]
    dry_run: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::display_fatal(&format!("{:#}", e));
            ui::display_fatal("Failed to bump version");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let vars: HashMap<String, String> = env::vars().collect();

    let mut config =
        config::load_config(args.config.as_deref()).context("Error loading config")?;
    config
        .apply_inputs(&vars)
        .context("Invalid action inputs")?;

    let ctx = RunContext::from_vars(
        &vars,
        &args.workspace,
        args.package_dir.as_deref(),
        args.event_path,
    );

    let report = orchestration::run(&config, &ctx, args.dry_run, |path| {
        Git2Repository::open(path)
    })?;
    ui::display_report(&report);

    if let Some(tag) = report.new_tag() {
        let output_file = vars
            .get(ui::GITHUB_OUTPUT)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        ui::set_output(ui::NEW_TAG_OUTPUT, tag, output_file.as_deref())
            .context("Cannot write the newTag output")?;
    }

    Ok(())
}
