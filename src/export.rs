use crate::error::Result;
use crate::metrics::{AlgorithmRun, RunMetrics};
use chrono::{DateTime, SecondsFormat, Utc};
use csv::Writer;
use serde::Serialize;
use std::io;

pub const CSV_HEADER: [&str; 7] = [
    "Algorithm",
    "Status",
    "Path Length",
    "Path Cost",
    "Nodes Explored",
    "Time (ms)",
    "Timestamp",
];

const NOT_AVAILABLE: &str = "N/A";

fn csv_row(run: &AlgorithmRun) -> [String; 7] {
    let result = &run.result;
    let (status, path_length) = if result.success {
        ("Success", result.path_length.to_string())
    } else {
        ("Failed", NOT_AVAILABLE.to_owned())
    };
    [
        run.algorithm.clone(),
        status.to_owned(),
        path_length,
        result
            .path_cost
            .map_or_else(|| NOT_AVAILABLE.to_owned(), |cost| format!("{cost:.2}")),
        result.nodes_explored.to_string(),
        format!("{:.2}", result.time_elapsed_ms),
        run.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    ]
}

/// Writes one row per run under [CSV_HEADER].
pub fn write_csv<W: io::Write>(metrics: &RunMetrics, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for run in metrics.runs() {
        wtr.write_record(csv_row(run))?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    export_date: DateTime<Utc>,
    total_results: usize,
    results: &'a [AlgorithmRun],
}

/// Writes `{exportDate, totalResults, results}` as pretty printed JSON.
pub fn write_json<W: io::Write>(metrics: &RunMetrics, writer: W) -> Result<()> {
    let document = ExportDocument {
        export_date: Utc::now(),
        total_results: metrics.len(),
        results: metrics.runs(),
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}
