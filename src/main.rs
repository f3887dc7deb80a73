use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{DateTime, Local};
use clap::{Args, Parser, Subcommand};
use coverage_dash::config::AppConfig;
use coverage_dash::coverage::{CoverageDataset, TownReportRow};
use coverage_dash::error::AppError;
use coverage_dash::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    dataset: Arc<CoverageDataset>,
    default_town: String,
}

#[derive(Parser, Debug)]
#[command(
    name = "Vaccination Coverage Dashboard",
    about = "Serve and inspect municipal vaccination coverage reports from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect the coverage dataset without starting the service
    Coverage {
        #[command(subcommand)]
        command: CoverageCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum CoverageCommand {
    /// Print the coverage report for a town
    Report(CoverageReportArgs),
    /// List the selectable towns in the dataset
    Towns(CoverageTownsArgs),
}

#[derive(Args, Debug)]
struct CoverageReportArgs {
    /// Town to report on (defaults to the configured default town)
    #[arg(long)]
    town: Option<String>,
    /// Override the configured coverage CSV path
    #[arg(long)]
    data: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CoverageTownsArgs {
    /// Override the configured coverage CSV path
    #[arg(long)]
    data: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CoverageReportRequest {
    town: String,
    /// Inline CSV content to report against instead of the configured source.
    #[serde(default)]
    coverage_csv: Option<String>,
}

#[derive(Debug, Serialize)]
struct CoverageReportResponse {
    town: String,
    data_source: CoverageDataSource,
    generated_at: DateTime<Local>,
    rows: Vec<TownReportRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CoverageDataSource {
    File,
    Inline,
}

#[derive(Debug, Serialize)]
struct TownsResponse {
    towns: Vec<String>,
    default_town: String,
    default_index: usize,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Coverage {
            command: CoverageCommand::Report(args),
        } => run_coverage_report(args),
        Command::Coverage {
            command: CoverageCommand::Towns(args),
        } => run_coverage_towns(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    // The dataset is loaded exactly once, before the listener binds; every
    // report request afterwards is a pure read against the shared copy.
    let dataset = Arc::new(CoverageDataset::from_path(&config.data.coverage_path)?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        dataset: dataset.clone(),
        default_town: config.data.default_town.clone(),
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/towns", get(towns_endpoint))
        .route("/api/v1/coverage/report", post(coverage_report_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        towns = dataset.towns().len(),
        records = dataset.records().len(),
        "coverage dashboard service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_coverage_report(args: CoverageReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let path = args.data.unwrap_or(config.data.coverage_path);
    let dataset = CoverageDataset::from_path(&path)?;

    let town = match args.town {
        Some(town) => town,
        None => {
            let towns = dataset.towns();
            match towns.get(dataset.default_town_index(&config.data.default_town)) {
                Some(town) => town.clone(),
                None => {
                    println!("Coverage dataset contains no towns");
                    return Ok(());
                }
            }
        }
    };

    let rows = dataset.town_report(&town);
    render_coverage_report(&town, &rows);
    Ok(())
}

fn run_coverage_towns(args: CoverageTownsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let path = args.data.unwrap_or(config.data.coverage_path);
    let dataset = CoverageDataset::from_path(&path)?;

    let towns = dataset.towns();
    println!("{} towns in {}", towns.len(), path.display());
    let default_index = dataset.default_town_index(&config.data.default_town);
    for (index, town) in towns.iter().enumerate() {
        if index == default_index {
            println!("- {town} (default)");
        } else {
            println!("- {town}");
        }
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn towns_endpoint(State(state): State<AppState>) -> Json<TownsResponse> {
    Json(build_towns_response(&state.dataset, &state.default_town))
}

async fn coverage_report_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<CoverageReportRequest>,
) -> Result<Json<CoverageReportResponse>, AppError> {
    build_report_response(&state.dataset, payload).map(Json)
}

fn build_towns_response(dataset: &CoverageDataset, default_town: &str) -> TownsResponse {
    TownsResponse {
        towns: dataset.towns().to_vec(),
        default_town: default_town.to_string(),
        default_index: dataset.default_town_index(default_town),
    }
}

fn build_report_response(
    dataset: &CoverageDataset,
    payload: CoverageReportRequest,
) -> Result<CoverageReportResponse, AppError> {
    let CoverageReportRequest { town, coverage_csv } = payload;

    let (rows, data_source) = match coverage_csv {
        Some(csv) => {
            let inline = CoverageDataset::from_reader(Cursor::new(csv.into_bytes()))?;
            (inline.town_report(&town), CoverageDataSource::Inline)
        }
        None => (dataset.town_report(&town), CoverageDataSource::File),
    };

    Ok(CoverageReportResponse {
        town,
        data_source,
        generated_at: Local::now(),
        rows,
    })
}

fn render_coverage_report(town: &str, rows: &[TownReportRow]) {
    println!("Coverage report for {town}");

    if rows.is_empty() {
        println!("No coverage data recorded for this town");
        return;
    }

    println!(
        "\n{:<12} {:>10} {:>13} {:>6}",
        "Vaccine", "Town rate", "National avg", "Gap"
    );
    for row in rows {
        println!(
            "{:<12} {:>9}% {:>12}% {:>+5}%",
            row.display_code, row.town_rate, row.national_average, row.gap
        );
    }
}
