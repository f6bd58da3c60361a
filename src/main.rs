use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tracing first, RUST_LOG-driven with an info default
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Log the effective configuration before anything can fail
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let http_port: u16 = std::env::var("CAMPUS_HTTP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3030);
    info!(
        target: "campus_auth",
        "campus-auth starting: RUST_LOG='{}', http_port={}",
        rust_log, http_port
    );

    campus_auth::server::run_with_port(http_port).await
}
