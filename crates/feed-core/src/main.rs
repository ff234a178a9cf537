//! Feed Simulation Runner
//!
//! Loads a dataset snapshot, replays a JSONL request log through the engine
//! and writes responses, opinion records and recommendation audits.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use feed_core::{default_config_toml, ConfigError, Engine, EngineConfig, EngineError};
use feed_core::{JsonlWriter, MemoryStore, Request, Response};
use feed_events::Dataset;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command line arguments for the runner
#[derive(Parser, Debug)]
#[command(name = "feed_sim")]
#[command(about = "Replays agent requests against the feed and opinion engine")]
struct Args {
    /// Dataset snapshot (JSON) to load before replaying
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Request log, one JSON request per line
    #[arg(long)]
    requests: Option<PathBuf>,

    /// Engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for responses.jsonl, opinions.jsonl and recommendations.jsonl
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

#[derive(Debug, Error)]
enum RunError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid dataset: {0}")]
    Dataset(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not load dataset: {0}")]
    Engine(#[from] EngineError),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> RunError + '_ {
    move |source| RunError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One line of responses.jsonl
#[derive(Serialize)]
struct ResponseLine<'a> {
    line: usize,
    method: &'a str,
    response: &'a Response,
}

struct Outputs {
    responses: JsonlWriter,
    opinions: JsonlWriter,
    recommendations: JsonlWriter,
}

impl Outputs {
    fn open(dir: Option<&Path>) -> Result<Self, RunError> {
        let Some(dir) = dir else {
            return Ok(Self {
                responses: JsonlWriter::discard(),
                opinions: JsonlWriter::discard(),
                recommendations: JsonlWriter::discard(),
            });
        };
        fs::create_dir_all(dir).map_err(io_error(dir))?;
        let open = |name: &str| {
            let path = dir.join(name);
            JsonlWriter::create(&path).map_err(|source| RunError::Io { path, source })
        };
        Ok(Self {
            responses: open("responses.jsonl")?,
            opinions: open("opinions.jsonl")?,
            recommendations: open("recommendations.jsonl")?,
        })
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return ExitCode::SUCCESS;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), RunError> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.engine.seed = seed;
    }

    let store = match &args.dataset {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(io_error(path))?;
            MemoryStore::from_dataset(&Dataset::from_json(&content)?)?
        }
        None => MemoryStore::new(),
    };
    info!(
        seed = config.engine.seed,
        posts = store.post_count(),
        "engine ready"
    );

    let mut engine = Engine::new(store, config);
    let mut outputs = Outputs::open(args.output_dir.as_deref())?;
    let out_path = args.output_dir.clone().unwrap_or_default();

    let mut handled = 0usize;
    if let Some(path) = &args.requests {
        let content = fs::read_to_string(path).map_err(io_error(path))?;
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (method, response) = match Request::from_json(line) {
                Ok(request) => {
                    let method = request.method();
                    (method, engine.handle(request))
                }
                Err(e) => {
                    warn!(line = index + 1, error = %e, "malformed request");
                    (
                        "unknown",
                        Response::Rejected {
                            message: e.to_string(),
                        },
                    )
                }
            };

            if let Response::Records { records } = &response {
                outputs
                    .opinions
                    .write_all_records(records)
                    .map_err(io_error(&out_path))?;
            }
            outputs
                .responses
                .write(&ResponseLine {
                    line: index + 1,
                    method,
                    response: &response,
                })
                .map_err(io_error(&out_path))?;
            handled += 1;
        }
    }

    outputs
        .recommendations
        .write_all_records(engine.store().audits())
        .map_err(io_error(&out_path))?;
    for writer in [
        &mut outputs.responses,
        &mut outputs.opinions,
        &mut outputs.recommendations,
    ] {
        writer.flush().map_err(io_error(&out_path))?;
    }

    info!(
        requests = handled,
        audits = engine.store().audits().len(),
        opinions = outputs.opinions.lines_written(),
        "replay complete"
    );
    Ok(())
}
