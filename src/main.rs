use clap::Parser;
use dom::Document;
use dom::snapshot::outline;
use engine::{ConfigError, Engine, EngineConfig};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const MAX_FRAMES: usize = 64;

#[derive(Parser)]
#[command(name = "slopify", about = "Rewrite AI buzzwords in a page snapshot or on stdin", version)]
struct Cli {
    /// JSON page snapshot to load
    #[arg(required_unless_present = "text")]
    page: Option<PathBuf>,

    /// Filter stdin line by line instead of loading a page
    #[arg(long, conflicts_with = "page")]
    text: bool,

    /// TOML engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of outline lines to print
    #[arg(long, default_value_t = 500)]
    max_lines: usize,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid page snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: dom::SnapshotError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn init_logging(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        },
    };
    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr).compact())
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn run_page(path: &Path, config: &EngineConfig, max_lines: usize) -> Result<(), CliError> {
    let json = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut doc = Document::from_json(&json).map_err(|source| CliError::Snapshot {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded {} nodes from {}", doc.node_count(), path.display());

    let engine = Engine::install(&mut doc, config, &config.settings_store());
    doc.finish_parsing();
    let frames = doc.run_until_idle(MAX_FRAMES);
    if doc.pending_frame_callbacks() > 0 {
        log::warn!("frame queue still busy after {frames} frames");
    }

    let stats = engine.stats();
    let mut out = BufWriter::new(io::stdout().lock());
    for line in outline(&doc, doc.root(), max_lines) {
        writeln!(out, "{line}")?;
    }
    writeln!(
        out,
        "-- initial pass changed {} leaves; {} flushes changed {} more; auto mode {}",
        stats.initial_changed,
        stats.flushes,
        stats.leaves_changed,
        if engine.auto_mode() { "on" } else { "off" },
    )?;
    out.flush()?;
    Ok(())
}

/// Rewrites `input` line by line with the same length threshold a page uses.
fn filter_lines(engine: &Engine, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        writeln!(out, "{}", engine.apply_text(&line))?;
    }
    out.flush()
}

fn run_text(config: &EngineConfig) -> Result<(), CliError> {
    let engine = Engine::new(config, false);
    let mut out = BufWriter::new(io::stdout().lock());
    filter_lines(&engine, io::stdin().lock(), &mut out)?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;
    if cli.text {
        return run_text(&config);
    }
    match &cli.page {
        Some(path) => run_page(path, &config, cli.max_lines),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("slopify: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered(config: &EngineConfig, input: &str) -> String {
        let mut out = Vec::new();
        filter_lines(&Engine::new(config, false), input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_mode_uses_loaded_config() {
        let config = EngineConfig::from_toml_str("min_text_len = 6").unwrap();
        assert_eq!(filtered(&config, "AI\nan AI tool\n"), "AI\nan SLOP tool\n");
        assert_eq!(filtered(&EngineConfig::default(), "AI\n"), "SLOP\n");
    }

    #[test]
    fn text_mode_accepts_config_flag() {
        let cli = Cli::try_parse_from(["slopify", "--text", "--config", "slop.toml"]).unwrap();
        assert!(cli.text);
        assert_eq!(cli.config.as_deref(), Some(Path::new("slop.toml")));
    }
}
