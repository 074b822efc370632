use std::io::{self, BufWriter};
use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use navfilter::cli::{pipe, table, Cli, Commands};
use navfilter::policy::builtin::DEFAULT_TEMPLATE;
use navfilter::policy::reload::watch_config;
use navfilter::policy::{DispositionEngine, EngineHandle, RequestDescriptor};
use navfilter::response::HostResponse;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            url,
            category,
            json,
            explain,
        } => cmd_check(&cli.config, &url, &category, json, explain)?,
        Commands::Rules => cmd_rules(&cli.config)?,
        Commands::Validate => cmd_validate(&cli.config)?,
        Commands::Init { force } => cmd_init(&cli.config, force)?,
        Commands::Pipe { watch } => cmd_pipe(&cli.config, watch)?,
    }

    Ok(())
}

/// The rule set at `config_path`, or the built-in one when the file is absent.
fn load_engine(config_path: &Path) -> anyhow::Result<DispositionEngine> {
    if config_path.exists() {
        info!("Loading rules from {}", config_path.display());
        Ok(DispositionEngine::load_from_path(config_path)?)
    } else {
        info!(
            "{} not found, using built-in rules",
            config_path.display()
        );
        Ok(DispositionEngine::builtin()?)
    }
}

fn cmd_check(
    config_path: &Path,
    url: &str,
    category: &str,
    json: bool,
    explain: bool,
) -> anyhow::Result<()> {
    let engine = load_engine(config_path)?;
    let req = RequestDescriptor::from_tag(url, category);
    let evaluation = engine.explain(&req);

    if json {
        println!("{}", HostResponse::from(&evaluation.disposition).to_json()?);
    } else if explain {
        println!("{}", evaluation.to_json()?);
    } else {
        println!("URL:         {}", req.url);
        println!("Category:    {}", req.category);
        println!("Disposition: {}", evaluation.disposition);
        println!("Reason:      {}", evaluation.reason);
    }
    Ok(())
}

fn cmd_rules(config_path: &Path) -> anyhow::Result<()> {
    let engine = load_engine(config_path)?;
    if config_path.exists() {
        println!("Rule set ({})", config_path.display());
    } else {
        println!("Rule set (built-in)");
    }
    println!("═══════════════════════════════════════");
    table::write_rule_table(&engine, &mut io::stdout().lock())?;
    Ok(())
}

fn cmd_validate(config_path: &Path) -> anyhow::Result<()> {
    let engine = DispositionEngine::load_from_path(config_path)?;
    println!(
        "{}: OK ({} passthrough, {} ordered rules)",
        config_path.display(),
        engine.passthrough_rules().len(),
        engine.rules().len()
    );
    Ok(())
}

fn cmd_init(config_path: &Path, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        println!("Config already exists: {}", config_path.display());
        println!("Use --force to overwrite it with the built-in rules.");
        return Ok(());
    }
    std::fs::write(config_path, DEFAULT_TEMPLATE)?;
    println!("Wrote built-in rules to {}", config_path.display());
    Ok(())
}

fn cmd_pipe(config_path: &Path, watch: bool) -> anyhow::Result<()> {
    let handle = EngineHandle::new(load_engine(config_path)?);

    // Keep the watcher alive for as long as requests are being answered.
    let _watcher = if watch {
        watch_config(config_path, handle.clone())?
    } else {
        None
    };

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = BufWriter::new(io::stdout().lock());
    let answered = pipe::run_pipe(&handle, &mut reader, &mut writer)?;
    info!("Input closed after {} requests", answered);
    Ok(())
}
