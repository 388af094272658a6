//! Plain text rendering of transcripts, dashboards and statuses.
use std::fmt::Write;

use crate::chat::{Message, Role};
use crate::documents::{StatusKind, UploadStatus};
use crate::metrics::Dashboard;

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const RECENT_ROWS: usize = 10;
const QUERY_WIDTH: usize = 40;

pub fn render_message(msg: &Message) -> String {
    match msg.role {
        Role::User => format!("you> {}", msg.content),
        Role::Error => format!("error> {}", msg.content),
        Role::Assistant => {
            let mut out = format!("bot> {}\n", msg.content);
            let _ = writeln!(
                out,
                "     Model: {}  Latency: {}",
                msg.model.as_deref().unwrap_or("unknown"),
                msg.latency_ms
                    .map(|ms| format!("{:.0}ms", ms))
                    .unwrap_or_else(|| "-".to_string())
            );
            if !msg.sources.is_empty() {
                let _ = writeln!(out, "     Sources ({}):", msg.sources.len());
                for src in &msg.sources {
                    let _ = writeln!(
                        out,
                        "       [{}]: \"{}\" (Score: {})",
                        src.source_label,
                        src.snippet,
                        src.score_label()
                    );
                }
            }
            out.trim_end().to_string()
        }
    }
}

pub fn render_status(status: &UploadStatus) -> String {
    match status.kind {
        StatusKind::Success => format!("✓ {}", status.message),
        StatusKind::Error => format!("✗ {}", status.message),
    }
}

/// Scale `values` onto block characters, oldest first.
pub fn sparkline(values: &[f64]) -> String {
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let min = values.iter().cloned().fold(f64::MAX, f64::min);
    let range = max - min;
    values
        .iter()
        .map(|v| {
            if range <= 0.0 {
                SPARKS[0]
            } else {
                let level = ((v - min) / range * (SPARKS.len() - 1) as f64).round() as usize;
                SPARKS[level.min(SPARKS.len() - 1)]
            }
        })
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let head: String = text.chars().take(width - 1).collect();
    let mut out = head.trim_end().to_string();
    out.push('…');
    out
}

pub fn render_dashboard(dashboard: &Dashboard, window: usize) -> String {
    let summary = &dashboard.summary;
    let mut out = String::new();

    let _ = writeln!(out, "Total Requests  {:>10}   Last {} requests", summary.total, window);
    let _ = writeln!(
        out,
        "Avg Latency     {:>10}   Response time",
        format!("{}ms", summary.avg_latency_ms)
    );
    let _ = writeln!(
        out,
        "Est. Cost       {:>10}   LLM usage",
        format!("${:.4}", summary.total_cost)
    );

    if dashboard.series.is_empty() {
        let _ = writeln!(out, "\nNo queries recorded yet.");
        return out;
    }

    // The window arrives newest first, the trend reads left to right
    let latencies: Vec<f64> = dashboard
        .series
        .iter()
        .rev()
        .map(|p| p.record.latency_ms)
        .collect();
    let _ = writeln!(out, "\nLatency Trend\n{}", sparkline(&latencies));

    let _ = writeln!(
        out,
        "\n{:<10} {:<width$} {:<16} {:>9}",
        "Time",
        "Query",
        "Model",
        "Latency",
        width = QUERY_WIDTH
    );
    for point in dashboard.recent(RECENT_ROWS) {
        let _ = writeln!(
            out,
            "{:<10} {:<width$} {:<16} {:>9}",
            point.time,
            truncate(&point.record.query, QUERY_WIDTH),
            point.record.model,
            format!("{:.0}ms", point.record.latency_ms),
            width = QUERY_WIDTH
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QueryResponse;
    use crate::api::fake::record;
    use serde_json::json;

    #[test]
    fn it_renders_assistant_footer_and_sources() {
        let resp: QueryResponse = serde_json::from_value(json!({
            "answer": "30 days",
            "sources": [{
                "metadata": {"source": "policy.pdf"},
                "text": "Refunds within 30 days...",
                "score": 0.92
            }],
            "model_used": "gpt-x",
            "latency_ms": 420
        }))
        .unwrap();

        let out = render_message(&Message::assistant(&resp));

        assert!(out.starts_with("bot> 30 days"));
        assert!(out.contains("Model: gpt-x"));
        assert!(out.contains("Latency: 420ms"));
        assert!(out.contains("Sources (1):"));
        assert!(out.contains("[policy.pdf]"));
        assert!(out.contains("(Score: 0.92)"));
    }

    #[test]
    fn it_marks_user_and_error_entries() {
        assert_eq!(render_message(&Message::user("hi")), "you> hi");
        assert_eq!(
            render_message(&Message::error("Error fetching response.")),
            "error> Error fetching response."
        );
    }

    #[test]
    fn it_renders_status_banner() {
        assert_eq!(
            render_status(&UploadStatus::success("Index cleared.")),
            "✓ Index cleared."
        );
        assert_eq!(
            render_status(&UploadStatus::error("Reset failed.")),
            "✗ Reset failed."
        );
    }

    #[test]
    fn it_draws_sparklines() {
        assert_eq!(sparkline(&[]), "");
        assert_eq!(sparkline(&[5.0, 5.0]), "▁▁");
        assert_eq!(sparkline(&[0.0, 50.0, 100.0]), "▁▅█");
    }

    #[test]
    fn it_renders_empty_dashboard() {
        let out = render_dashboard(&Dashboard::default(), 50);
        assert!(out.contains("Avg Latency"));
        assert!(out.contains("0ms"));
        assert!(out.contains("$0.0000"));
        assert!(out.contains("No queries recorded yet."));
    }

    #[test]
    fn it_renders_summary_and_recent_rows() {
        let mut records: Vec<_> = (0..12).map(|i| record(100.0 + i as f64, Some(0.001))).collect();
        records[0].query = "a very long question that will not fit in the table column".to_string();
        let out = render_dashboard(&Dashboard::from_records(records), 50);

        assert!(out.contains("$0.0120"));
        assert!(out.contains("106ms"));
        assert!(out.contains("a very long question that will not fit…"));
        // Header plus ten rows after the trend line
        let table_rows = out.lines().filter(|l| l.contains("fake-model")).count();
        assert_eq!(table_rows, 10);
    }
}
