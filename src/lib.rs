pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod profile;
pub mod system;
pub mod transcribe;
pub mod tts;

use anyhow::Context;
use cli::{Cli, Commands};
use generate::{generate_all, Launcher, OutputLayout, WorkerOutcome};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tts::{HttpAudioFetcher, UrlComposer};

pub use error::GenerateError;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Generate(args) => generate(args, cli.config, cli.verbose),
        Commands::Transcribe(args) => transcribe(args, cli.config),
        Commands::SystemInfo(args) => system_info(args),
        Commands::Config(args) => config_cmd(args, cli.config),
        Commands::InternalGenerateGroup(args) => internal_generate_group(args),
    }
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<config::Config> {
    let config = match path {
        Some(path) => config::Config::load_from_path(&path),
        None => config::Config::load(),
    };
    config.context("load config")
}

fn generate(args: cli::GenerateArgs, config_path: Option<PathBuf>, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }
    if let Some(output) = args.output {
        config.output.dir = output;
    }
    if let Some(workers) = args.workers {
        config.workers = Some(workers);
    }
    config.validate()?;

    let texts = profile::load_texts(&args.texts)?;
    let profiles = match (args.profiles, args.manifest) {
        (Some(path), _) => profile::load_profiles(&path)?,
        (None, Some(path)) => transcribe::manifest::read_manifest(&path)?
            .iter()
            .map(profile::VoiceProfile::from)
            .collect(),
        (None, None) => anyhow::bail!("either --profiles or --manifest is required"),
    };

    let composer = UrlComposer::from(&config.api);
    let layout = OutputLayout::from_config(&config.output);
    let timeout = config.api.timeout_seconds;
    let launcher = if args.threads {
        Launcher::Thread {
            fetcher: Arc::new(HttpAudioFetcher::new(timeout)?),
        }
    } else {
        Launcher::current_exe(verbose, timeout)?
    };

    let summary = generate_all(
        &composer,
        &texts,
        &profiles,
        &layout,
        config.worker_count(),
        &launcher,
    )
    .context("generate audio")?;

    println!(
        "Generated {} of {} pairs ({} already present) in {}",
        summary.fetched(),
        summary.total(),
        summary.skipped(),
        layout.root.display()
    );
    for report in &summary.reports {
        println!(
            "- worker {}: {} fetched, {} skipped, {:.3}s",
            report.worker,
            report.fetched,
            report.skipped,
            report.elapsed.as_secs_f64()
        );
    }

    Ok(())
}

fn transcribe(args: cli::TranscribeArgs, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(language) = args.language {
        config.asr.language = language;
    }
    if let Some(output) = args.output {
        config.asr.output_dir = output;
    }
    if let Some(endpoint) = args.endpoint {
        config.asr.endpoint = Some(endpoint);
    }
    config.validate()?;

    let endpoint = config
        .asr
        .endpoint
        .clone()
        .context("asr endpoint is not configured; set asr.endpoint or pass --endpoint")?;
    let transcriber =
        transcribe::HttpTranscriber::new(endpoint, config.asr.language.clone(), config.asr.timeout_seconds)?;

    let entries = transcribe::build_manifest(&args.input, &transcriber, &config.asr.language)?;
    let path = transcribe::manifest::write_manifest(&config.asr.output_dir, &config.asr.manifest_name, &entries)?;

    println!("Transcribed {} files -> {}", entries.len(), path.display());
    Ok(())
}

fn system_info(args: cli::SystemInfoArgs) -> anyhow::Result<()> {
    let info = system::detect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("OS: {}", info.os);
    println!("Arch: {}", info.arch);
    if let Some(cores) = info.cpu_cores {
        println!("CPU cores: {}", cores);
    }
    println!("Default workers: {}", info.default_workers);

    Ok(())
}

fn config_cmd(args: cli::ConfigArgs, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    if args.init {
        let path = config::Config::init_default()?;
        println!("Initialized config at {}", path.display());
        return Ok(());
    }

    if args.show {
        let config = load_config(config_path)?;
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if args.validate {
        let config = load_config(config_path)?;
        config.validate()?;
        UrlComposer::from(&config.api).is_valid()?;
        println!("Config OK");
        return Ok(());
    }

    let path = match config_path {
        Some(path) => path,
        None => config::Config::default_path()?,
    };
    println!("{}", path.display());
    Ok(())
}

fn internal_generate_group(args: cli::InternalGenerateGroupArgs) -> anyhow::Result<()> {
    let raw = read_stdin_bytes().context("read task from stdin")?;
    if raw.is_empty() {
        anyhow::bail!("worker expects a task JSON on stdin");
    }
    let task: generate::GroupTask = serde_json::from_slice(&raw).context("parse task JSON")?;

    let result = HttpAudioFetcher::new(args.timeout_seconds).and_then(|fetcher| task.run(&fetcher));
    let outcome = match &result {
        Ok(report) => WorkerOutcome::Ok(report.clone()),
        Err(err) => WorkerOutcome::Err(err.into()),
    };

    let mut stdout = std::io::stdout();
    serde_json::to_writer(&mut stdout, &outcome).context("write worker outcome")?;
    stdout.flush()?;

    result.map(|_| ()).map_err(anyhow::Error::from)
}

fn read_stdin_bytes() -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut stdin = std::io::stdin();
    stdin.read_to_end(&mut buf)?;
    Ok(buf)
}
