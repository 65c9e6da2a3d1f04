use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use inclusion_flow::config::AppConfig;
use inclusion_flow::error::AppError;
use inclusion_flow::telemetry;
use inclusion_flow::workflows::casework::{
    casework_router, disponibilidad_demo, CaseworkService, FeriadosChile, MemoryAgenda,
    MemoryAjustes, MemoryAsignaturas, MemorySolicitudes, Mes,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Gestor de Ajustes Razonables",
    about = "Run the reasonable-accommodation casework service from the command line",
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
    /// Inspect scheduling data without starting the service
    Agenda {
        #[command(subcommand)]
        command: AgendaCommand,
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
enum AgendaCommand {
    /// Print the free interview slots of a month for one coordinator
    Disponibilidad(DisponibilidadArgs),
}

#[derive(Args, Debug)]
struct DisponibilidadArgs {
    /// Month to inspect (YYYY-MM)
    #[arg(long, value_parser = parse_mes)]
    mes: Mes,
    /// Coordinator profile id
    #[arg(long)]
    coordinadora: u64,
}

fn parse_mes(raw: &str) -> Result<Mes, String> {
    raw.parse().map_err(|err| format!("{err}"))
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
        Command::Agenda {
            command: AgendaCommand::Disponibilidad(args),
        } => run_disponibilidad(args),
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let service = Arc::new(CaseworkService::new(
        Arc::new(MemorySolicitudes::default()),
        Arc::new(MemoryAgenda::default()),
        Arc::new(MemoryAjustes::default()),
        Arc::new(MemoryAsignaturas::default()),
        Arc::new(FeriadosChile),
        config.casework.clone(),
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(casework_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "casework service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_disponibilidad(args: DisponibilidadArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let vista = disponibilidad_demo(args.mes, &config.casework.agenda);

    println!(
        "Disponibilidad {:04}-{:02} para la coordinadora {}",
        args.mes.anio, args.mes.mes, args.coordinadora
    );
    for feriado in &vista.feriados {
        println!("Feriado: {} ({})", feriado.fecha, feriado.nombre);
    }
    for fecha in vista.fechas_con_disponibilidad() {
        let horas: Vec<String> = vista.dias[&fecha]
            .iter()
            .map(|hora| hora.format("%H:%M").to_string())
            .collect();
        println!("{}: {}", fecha, horas.join(", "));
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
