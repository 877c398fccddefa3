use crate::service::BookingService;
use holdfast_core::{BookingStatus, Ledger};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What one expiry pass saw and did.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepReport {
    pub examined: usize,
    pub canceled: usize,
    pub failed: usize,
}

impl<L: Ledger> BookingService<L> {
    /// Reclaim holds abandoned past the payment window.
    ///
    /// Best-effort: a booking whose cancellation fails is logged and left for
    /// the next pass; it never aborts the sweep. Rows already canceled are
    /// skipped outright, without a second release call.
    pub async fn sweep_expired(&self) -> Result<SweepReport, holdfast_core::BookingError> {
        let cutoff = chrono::Utc::now() - self.rules().payment_window;
        let stale = self.ledger().find_stale_unresolved(cutoff).await?;

        let mut report = SweepReport {
            examined: stale.len(),
            ..SweepReport::default()
        };

        for booking in stale {
            if booking.status == BookingStatus::Canceled {
                continue;
            }
            match self.cancel_booking(booking.id).await {
                Ok(_) => report.canceled += 1,
                Err(e) => {
                    warn!(booking_id = %booking.id, error = %e, "failed to reclaim expired hold");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Periodic trigger for the expiry sweep; spawned once at startup.
pub async fn run_sweeper<L: Ledger>(service: Arc<BookingService<L>>, period: Duration) {
    info!(period_seconds = period.as_secs(), "expiry sweeper started");
    let mut ticker = tokio::time::interval(period);

    loop {
        ticker.tick().await;
        match service.sweep_expired().await {
            Ok(report) if report.examined > 0 => {
                info!(
                    examined = report.examined,
                    canceled = report.canceled,
                    failed = report.failed,
                    "expiry sweep finished"
                );
            }
            Ok(_) => debug!("expiry sweep found no stale holds"),
            Err(e) => error!(error = %e, "expiry sweep failed"),
        }
    }
}
