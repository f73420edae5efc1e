//! Metric names and the tracing layer that turns `metrics`-targeted spans into
//! latency histograms and counters.
use {
    axum_prometheus::metrics,
    std::{
        fmt::Debug,
        time::Instant,
    },
    tracing::{
        field::{
            Field,
            Visit,
        },
        span::Record,
        Id,
        Metadata,
    },
    tracing_subscriber::{
        layer::Context,
        Layer,
    },
};

pub const AUCTION_CREATED_TOTAL: &str = "auction_created_total";
pub const AUCTION_CLOSE_TOTAL: &str = "auction_close_total";

/// Seconds between an auction's deadline and the moment it was actually closed.
pub const AUCTION_CLOSE_DELAY_METRIC: &str = "auction_close_delay_seconds";
pub const AUCTION_CLOSE_DELAY_BUCKETS: &[f64; 12] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Labels collected from a `metrics` span while it is open.
#[derive(Debug, Clone)]
struct MetricSpan {
    category:   String,
    name:       String,
    result:     String,
    started_at: Instant,
}

impl MetricSpan {
    fn new(name: &str) -> MetricSpan {
        MetricSpan {
            category:   "unknown".to_string(),
            name:       name.to_string(),
            result:     "unknown".to_string(),
            started_at: Instant::now(),
        }
    }

    fn labels(&self) -> [(&'static str, String); 2] {
        [("name", self.name.clone()), ("result", self.result.clone())]
    }

    fn record(&self) {
        let labels = self.labels();
        metrics::histogram!(format!("{}_duration_seconds", self.category), &labels)
            .record(self.started_at.elapsed().as_secs_f64());
        metrics::counter!(format!("{}_total", self.category), &labels).increment(1);
    }
}

impl Visit for MetricSpan {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "result" {
            self.result = format!("{:?}", value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "category" => self.category = value.to_string(),
            "result" => self.result = value.to_string(),
            "name" => self.name = value.to_string(),
            _ => {}
        }
    }
}

/// Span filter for [`MetricsLayer`].
pub fn is_metrics(metadata: &Metadata) -> bool {
    metadata.target().starts_with("metrics")
}

/// Records `<category>_duration_seconds` and `<category>_total`, labelled by
/// name and result, for every span it sees close.
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer
where
    S: tracing::Subscriber,
    S: for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            tracing::error!("span not found: {:?}", id);
            return;
        };
        let mut data = MetricSpan::new(span.metadata().name());
        attrs.record(&mut data);
        span.extensions_mut().replace(data);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            tracing::error!("span not found: {:?}", id);
            return;
        };
        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<MetricSpan>() {
            Some(data) => values.record(data),
            None => {
                tracing::warn!("metrics data not found for span: {:?}", id);
                let mut data = MetricSpan::new(span.metadata().name());
                values.record(&mut data);
                extensions.replace(data);
            }
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            tracing::error!("span not found: {:?}", id);
            return;
        };
        let extensions = span.extensions();
        match extensions.get::<MetricSpan>() {
            Some(data) => data.record(),
            None => tracing::warn!("metrics data not found for span: {:?}", id),
        };
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        axum_prometheus::metrics_exporter_prometheus::PrometheusBuilder,
        tracing_subscriber::layer::SubscriberExt,
    };

    #[test]
    fn test_labels_default_to_unknown() {
        let data = MetricSpan::new("db_get_auctions");
        assert_eq!(data.category, "unknown");
        assert_eq!(
            data.labels(),
            [
                ("name", "db_get_auctions".to_string()),
                ("result", "unknown".to_string())
            ]
        );
    }

    #[test]
    fn test_closed_metrics_span_is_recorded() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let subscriber = tracing_subscriber::registry()
            .with(MetricsLayer.with_filter(tracing_subscriber::filter::filter_fn(is_metrics)));

        metrics::with_local_recorder(&recorder, || {
            tracing::subscriber::with_default(subscriber, || {
                let span = tracing::info_span!(
                    target: "metrics",
                    "db_get_auctions",
                    category = "db_queries",
                    result = "success",
                    name = "get_auctions"
                );
                span.in_scope(|| {
                    tracing::Span::current().record("result", "error");
                });
                // ignored by the filter
                let _ = tracing::info_span!("plain_span").entered();
            });
        });

        let rendered = handle.render();
        let total = rendered
            .lines()
            .find(|line| line.starts_with("db_queries_total{"))
            .unwrap_or_else(|| panic!("missing counter in {rendered}"));
        assert!(total.contains(r#"name="get_auctions""#), "{total}");
        assert!(total.contains(r#"result="error""#), "{total}");
        assert!(total.ends_with(" 1"), "{total}");
        assert!(!rendered.contains("unknown_total"), "{rendered}");
    }
}
