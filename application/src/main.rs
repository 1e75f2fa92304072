use std::{io, sync::OnceLock, time};

use application::{api, Args, Config};
use axum::{body::Body, extract::MatchedPath};
use axum_client_ip::InsecureClientIp;
use service::{
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| is_enabled(meta, false))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| is_enabled(meta, true))),
        )
        .init();

    _ = start().await;
}

/// Checks whether the event described by the provided [`log::Metadata`] is
/// written by the `stderr` (or `stdout`) layer.
///
/// Spans are always enabled, so events carry their context.
fn is_enabled(meta: &log::Metadata<'_>, stderr: bool) -> bool {
    let level = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
    meta.is_span()
        || (STDERR_LEVELS.contains(meta.level()) == stderr
            && level >= *meta.level())
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        server,
        auth,
        postgres,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let postgres_config = postgres.into();
    let mut postgres = Postgres::new(&postgres_config).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;

    migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;

    let auth = service::Config::try_from(auth).map_err(|e| {
        log::error!("invalid `auth` configuration: {e}");
    })?;
    let service = Service::new(auth, postgres);

    let cors = server.cors.layer().map_err(|e| {
        log::error!("invalid CORS origin: {e}");
    })?;

    let app = api::router(service).layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(request_span::<Body>)
            .on_response(record_response::<Body>),
    );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app)
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}

/// Creates an `HTTP request` [`log::Span`] for the provided request.
fn request_span<B>(r: &http::Request<B>) -> log::Span {
    log::info_span!(
        "HTTP request",
        http.client_ip = InsecureClientIp::from(r.headers(), r.extensions())
            .map(|ip| ip.0.to_string())
            .ok(),
        http.flavor = ?r.version(),
        http.host = r.uri().host(),
        http.method = r.method().as_str(),
        http.route = r
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
        http.target = r
            .uri()
            .path_and_query()
            .map(http::uri::PathAndQuery::as_str),
        http.user_agent = r
            .headers()
            .get(http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok()),
        http.status_code = log::field::Empty,
    )
}

/// Records the status of the provided response into its `HTTP request`
/// [`log::Span`], and logs how long it took to produce.
fn record_response<B>(
    r: &http::Response<B>,
    dur: time::Duration,
    span: &log::Span,
) {
    let status = r.status();
    _ = span.record("http.status_code", log::field::display(status.as_u16()));

    let duration = format!("{}ms", dur.as_millis());
    if status.is_server_error() {
        log::error!(duration = %duration);
    } else if status.is_client_error() {
        log::warn!(duration = %duration);
    } else {
        log::info!(duration = %duration);
    }
}
