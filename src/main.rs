use docrouter::{
    api::{self, AppState},
    archive::ArchiveService,
    classify::LanguageClassifier,
    config,
    decisions::{ConsolePrompt, DecisionQueue, DecisionResolver},
    extraction::ExtractionService,
    logging,
    metrics::ServiceMetrics,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    config::init_config();
    logging::init_tracing();
    let config = config::get_config();

    let metrics = Arc::new(ServiceMetrics::new());
    let classifier = Arc::new(LanguageClassifier::warm_up());
    let extraction = Arc::new(ExtractionService::new(Arc::clone(&metrics)));
    let archive = Arc::new(ArchiveService::new(config.archive_root.clone()));

    let (decisions, decision_rx) = DecisionQueue::new();
    let resolver = DecisionResolver::new(
        decision_rx,
        ConsolePrompt,
        Duration::from_secs(config.resume_timeout_secs),
        Arc::clone(&metrics),
    )
    .expect("Failed to build resolver HTTP client");
    tokio::spawn(resolver.run());
    tracing::info!("Console decision resolver started");

    let app = api::create_router(AppState {
        extraction,
        classifier,
        decisions,
        archive,
        metrics,
    });

    let (listener, port) = bind_listener().await.expect("Failed to bind listener");
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.unwrap();
}

async fn bind_listener() -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    let config = config::get_config();
    if let Some(port) = config.server_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8300..=8399;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8300-8399",
    ))
}
