use {
    crate::auction::service::Service,
    axum_prometheus::metrics_exporter_prometheus::PrometheusHandle,
};

/// Process-wide handles shared by the long-running tasks.
pub struct ServerState {
    pub metrics_recorder: PrometheusHandle,
    pub auction_service:  Service,
}
