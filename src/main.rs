use anyhow::Result;
use hist_export::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(version = version::VERSION, "{} starting", version::NAME);

    let app_config = config::AppConfig::load()?;
    let client = grafana::GrafanaClient::new(&app_config.grafana)?;
    let mut sink = report::WorkbookSink::for_run(&app_config.output, chrono::Local::now());
    tracing::info!(
        metrics = app_config.metrics.len(),
        output = %sink.path().display(),
        "exporting histogram metrics"
    );

    let summary = runner::run(&app_config, &client, &mut sink).await;
    if summary.written > 0 {
        tracing::info!(path = %sink.path().display(), sheets = summary.written, "report saved");
    }

    Ok(())
}
