//! Background persistence of click events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::application::services::ClickService;
use crate::domain::click_event::ClickEvent;
use crate::error::AppError;

/// Attempts after the first failure before a click is given up.
const MAX_RETRIES: usize = 3;

/// Consumes click events until every sender is dropped.
///
/// At most `concurrency` events are written at once. A write that failed to
/// reach the store is retried with jittered exponential backoff; after
/// [`MAX_RETRIES`], or on any other error, the click is logged and dropped.
/// Redirects never wait on this loop.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    click_service: Arc<ClickService>,
    concurrency: usize,
) {
    let limiter = Arc::new(Semaphore::new(concurrency.max(1)));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = limiter.clone().acquire_owned().await else {
            break;
        };

        let click_service = click_service.clone();
        tokio::spawn(async move {
            let _permit = permit;
            persist(&click_service, event).await;
        });
    }

    // Drain in-flight writes before reporting shutdown.
    let _ = limiter.acquire_many(concurrency.max(1) as u32).await;

    tracing::info!("Click worker stopped");
}

async fn persist(click_service: &ClickService, event: ClickEvent) {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(25)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    // The insert is not idempotent; only connection-level failures are repeated.
    let result = RetryIf::spawn(
        strategy,
        || click_service.record_click(&event.link, event.attributes.clone()),
        |e: &AppError| e.is_transient(),
    )
    .await;

    if let Err(e) = result {
        tracing::error!(
            link_id = event.link.id,
            alias = %event.link.alias,
            error = %e,
            "Failed to record click"
        );
    }
}
