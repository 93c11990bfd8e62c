mod metrics;

pub(crate) use metrics::RequestMetrics;
