// Batch runner: one metric at a time, fetch -> aggregate -> write.
// A failing metric is logged and skipped; the batch always runs to the end.

use std::time::Instant;

use anyhow::Context;
use tracing::{info, instrument, warn};

use crate::config::{AppConfig, MetricConfig};
use crate::grafana::GrafanaClient;
use crate::histogram;
use crate::models;
use crate::report::{ReportSink, SheetReport};

#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    Disabled,
    /// Query returned nothing to aggregate; no sheet written.
    NoData,
    Written { sheet: String, rows: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: usize,
    pub no_data: usize,
    pub disabled: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &anyhow::Result<MetricOutcome>) {
        match outcome {
            Ok(MetricOutcome::Disabled) => self.disabled += 1,
            Ok(MetricOutcome::NoData) => self.no_data += 1,
            Ok(MetricOutcome::Written { .. }) => self.written += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Runs every configured metric in order against `client`, writing sheets to `sink`.
pub async fn run(
    config: &AppConfig,
    client: &GrafanaClient,
    sink: &mut dyn ReportSink,
) -> RunSummary {
    let mut summary = RunSummary::default();
    for (index, metric) in config.metrics.iter().enumerate() {
        let outcome = run_metric(config, client, sink, index, metric).await;
        if let Err(e) = &outcome {
            let error = format!("{:#}", e);
            warn!(
                metric = %metric.metric,
                region = %metric.region,
                error = %error,
                "metric failed, continuing with next"
            );
        }
        summary.record(&outcome);
    }
    info!(
        written = summary.written,
        no_data = summary.no_data,
        disabled = summary.disabled,
        failed = summary.failed,
        "metrics export finished"
    );
    summary
}

/// Fetches, aggregates and writes one metric. `index` is its 0-based position in config.
#[instrument(skip_all, fields(metric = %metric.metric, region = %metric.region))]
pub async fn run_metric(
    config: &AppConfig,
    client: &GrafanaClient,
    sink: &mut dyn ReportSink,
    index: usize,
    metric: &MetricConfig,
) -> anyhow::Result<MetricOutcome> {
    if !metric.enabled {
        return Ok(MetricOutcome::Disabled);
    }
    let (from_ms, to_ms) = metric.time_range.to_millis()?;

    info!("fetching metric");
    let started = Instant::now();
    let datasource = client
        .datasource(&metric.region)
        .await
        .with_context(|| format!("datasource lookup for region {}", metric.region))?;
    let raw = client
        .query(datasource.id, &metric.expr(), from_ms, to_ms)
        .await
        .context("metric query")?;
    info!(
        series = raw.len(),
        elapsed = ?started.elapsed(),
        "fetch finished"
    );

    let series = models::normalize(raw, &config.labels);
    let report = histogram::aggregate_and_decumulate_with(&series, metric.mode);
    if report.counter_resets > 0 {
        info!(series = report.counter_resets, "series excluded for counter reset");
    }
    if report.is_empty() {
        info!("no data to report, skipping sheet");
        return Ok(MetricOutcome::NoData);
    }

    let sheet_name = metric.sheet_name(index);
    let sheet = SheetReport::new(&sheet_name, &report);
    sink.write_sheet(&sheet)
        .with_context(|| format!("writing sheet {}", sheet_name))?;
    info!(sheet = %sheet_name, rows = sheet.rows.len(), "sheet saved");
    Ok(MetricOutcome::Written {
        sheet: sheet_name,
        rows: sheet.rows.len(),
    })
}
