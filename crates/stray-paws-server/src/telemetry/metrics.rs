use axum::http::StatusCode;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

const METRIC_SUBSYSTEM: &str = "straypaws";

#[derive(Default)]
pub(crate) struct RequestMetrics {
    counts: Mutex<HashMap<(String, u16), u64>>,
    latency_ns: Mutex<HashMap<String, Vec<u64>>>,
}

fn percentile_ns(values: &[u64], pct: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut v = values.to_vec();
    v.sort_unstable();
    let idx = ((v.len() as f64 - 1.0) * pct).round() as usize;
    v[idx]
}

impl RequestMetrics {
    pub(crate) async fn observe_request(&self, route: &str, status: StatusCode, latency: Duration) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency_ns.lock().await;
        latency_map
            .entry(route.to_string())
            .or_insert_with(Vec::new)
            .push(latency.as_nanos() as u64);
    }

    /// Plaintext exposition: request counts per route/status plus p95 latency per route.
    pub(crate) async fn render(&self) -> String {
        let mut body = String::new();
        let counts = self.counts.lock().await;
        let mut count_lines: Vec<(&(String, u16), &u64)> = counts.iter().collect();
        count_lines.sort_by(|a, b| a.0.cmp(b.0));
        for ((route, status), count) in count_lines {
            body.push_str(&format!(
                "{METRIC_SUBSYSTEM}_http_requests_total{{route=\"{route}\",status=\"{status}\"}} {count}\n"
            ));
        }
        drop(counts);
        let latency = self.latency_ns.lock().await;
        let mut latency_lines: Vec<(&String, &Vec<u64>)> = latency.iter().collect();
        latency_lines.sort_by(|a, b| a.0.cmp(b.0));
        for (route, samples) in latency_lines {
            let p95_ms = percentile_ns(samples, 0.95) / 1_000_000;
            body.push_str(&format!(
                "{METRIC_SUBSYSTEM}_http_request_latency_p95_ms{{route=\"{route}\"}} {p95_ms}\n"
            ));
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn render_includes_counts_and_latency() {
        let metrics = RequestMetrics::default();
        metrics
            .observe_request("/api/orders/place", StatusCode::OK, Duration::from_millis(3))
            .await;
        metrics
            .observe_request("/api/orders/place", StatusCode::OK, Duration::from_millis(5))
            .await;
        metrics
            .observe_request(
                "/api/orders/place",
                StatusCode::BAD_REQUEST,
                Duration::from_millis(1),
            )
            .await;
        let body = metrics.render().await;
        assert!(body.contains(
            "straypaws_http_requests_total{route=\"/api/orders/place\",status=\"200\"} 2"
        ));
        assert!(body.contains(
            "straypaws_http_requests_total{route=\"/api/orders/place\",status=\"400\"} 1"
        ));
        assert!(body
            .contains("straypaws_http_request_latency_p95_ms{route=\"/api/orders/place\"}"));
    }

    #[test]
    fn percentile_of_empty_is_zero() {
        assert_eq!(percentile_ns(&[], 0.95), 0);
    }
}
