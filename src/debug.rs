use tracing::{info, warn};

use crate::app_state::AppState;
use crate::domain::chart::model::Granularity;

/// Runs only when in PVWATCH_DEBUG_MODE
pub async fn run_debug(state: &AppState) {
    info!("Debug mode: running debug tasks...");

    // Default window for every granularity
    for granularity in Granularity::ALL {
        match state.chart_service.window(granularity, None, Default::default()) {
            Ok(snapshot) => info!(
                "{:>5}: {} | bucket {} | next disabled: {}",
                granularity, snapshot.label, snapshot.bucket_size, snapshot.next_disabled
            ),
            Err(e) => warn!("{}: {}", granularity, e),
        }
    }

    // One round trip against the configured backend
    match state.chart_session.refresh().await {
        Ok(outcome) => info!("Backend refresh: {:?}", outcome),
        Err(e) => warn!("Backend refresh failed: {}", e),
    }
    if let Some(view) = state.chart_session.last_view().await {
        for summary in &view.summaries {
            info!("Series summary: {:?}", summary);
        }
    }

    info!("Debug tasks completed. Exiting...");
}
