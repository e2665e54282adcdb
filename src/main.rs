use anyhow::Context;
use clap::{Parser, ValueEnum};
use sdgx_api::{ClusteringService, RestApi};
use sdgx_core::LabelTables;
use sdgx_storage::{ArtifactStore, JsonFileSink, NoopSink, PostgrestSink, ResultSink};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    /// Return results without persisting them
    None,
    /// Write `sdgs_{n}.json` files under --sink-dir
    File,
    /// Update the `sdgs_{n}` tables of a PostgREST endpoint
    Postgrest,
}

/// Clustering inference service for SDG village survey data
#[derive(Parser, Debug)]
#[command(name = "sdgx")]
#[command(about = "Per-scheme clustering inference service", long_about = None)]
struct Args {
    /// Directory holding model_sdg{n}.json, features_sdg{n}.json and cat_idx_sdg{n}.json
    #[arg(short, long, env = "SDGX_MODELS_DIR", default_value = "./models")]
    models_dir: PathBuf,

    /// Bind address
    #[arg(long, env = "SDGX_HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "SDGX_HTTP_PORT", default_value_t = 9000)]
    http_port: u16,

    /// JSON file with extra label tables, overlaid on the built-in ones
    #[arg(long, env = "SDGX_LABELS")]
    labels: Option<PathBuf>,

    /// Where enriched results are persisted
    #[arg(long, env = "SDGX_SINK", value_enum, default_value_t = SinkKind::None)]
    sink: SinkKind,

    /// Output directory for the file sink
    #[arg(long, env = "SDGX_SINK_DIR", default_value = "./data")]
    sink_dir: PathBuf,

    /// PostgREST base URL
    #[arg(long, env = "SUPABASE_URL")]
    postgrest_url: Option<String>,

    /// PostgREST API key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    postgrest_key: Option<String>,

    /// Column matching result rows to table rows
    #[arg(long, env = "SDGX_KEY_COLUMN", default_value = sdgx_storage::DEFAULT_KEY_COLUMN)]
    key_column: String,

    /// Request body limit in MiB
    #[arg(long, env = "SDGX_MAX_BODY_MB", default_value_t = 16)]
    max_body_mb: usize,

    /// Log level
    #[arg(long, env = "SDGX_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn load_labels(path: Option<&PathBuf>) -> anyhow::Result<LabelTables> {
    let builtin = LabelTables::builtin();
    match path {
        Some(path) => {
            let extra = LabelTables::load(path)
                .with_context(|| format!("failed to load label tables from {:?}", path))?;
            info!("Loaded {} label tables from {:?}", extra.len(), path);
            Ok(builtin.merge(extra))
        }
        None => Ok(builtin),
    }
}

fn build_sink(args: &Args) -> anyhow::Result<Arc<dyn ResultSink>> {
    let sink: Arc<dyn ResultSink> = match args.sink {
        SinkKind::None => Arc::new(NoopSink),
        SinkKind::File => Arc::new(JsonFileSink::new(&args.sink_dir)?),
        SinkKind::Postgrest => {
            let url = args
                .postgrest_url
                .clone()
                .context("--postgrest-url (or SUPABASE_URL) is required for the postgrest sink")?;
            let key = args
                .postgrest_key
                .clone()
                .context("--postgrest-key (or SUPABASE_KEY) is required for the postgrest sink")?;
            Arc::new(PostgrestSink::new(url, key).with_key_column(args.key_column.clone()))
        }
    };
    Ok(sink)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting sdgx v{}", env!("CARGO_PKG_VERSION"));
    info!("Models directory: {:?}", args.models_dir);
    info!("HTTP API port: {}", args.http_port);

    if !args.models_dir.is_dir() {
        tracing::warn!("Models directory {:?} does not exist yet", args.models_dir);
    }

    let labels = Arc::new(load_labels(args.labels.as_ref())?);
    let sink = build_sink(&args)?;
    info!("Result sink: {}", sink.name());

    let service = Arc::new(ClusteringService::new(
        ArtifactStore::new(&args.models_dir),
        labels,
        sink,
    ));

    let host = args.host.clone();
    let http_port = args.http_port;
    let max_body = args.max_body_mb * 1024 * 1024;
    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(service, host, http_port, max_body).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://{}:{}/", args.host, args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
