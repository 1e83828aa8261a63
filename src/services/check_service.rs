//! One price check: fetch, extract, record and, when cheap enough, alert.

use tracing::{debug, error, info, warn};

use crate::api::product_page::PageFetcher;
use crate::config::Config;
use crate::db::pricelog::{HistoryLog, LogWriteError};
use crate::models::{AlertStatus, CycleOutcome, PriceSample, TrackerState};
use crate::services::extract_service::extract_price;
use crate::services::notify_service::Notifier;

/// Runs check cycles against the tracked product
pub struct PriceTracker<'a, F, N> {
    config: &'a Config,
    fetcher: F,
    notifier: N,
    history: HistoryLog,
    state: TrackerState,
}

impl<'a, F, N> PriceTracker<'a, F, N>
where
    F: PageFetcher,
    N: Notifier,
{
    pub fn new(config: &'a Config, fetcher: F, notifier: N, history: HistoryLog) -> Self {
        Self {
            config,
            fetcher,
            notifier,
            history,
            state: TrackerState::Idle,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Run one full cycle; every failure is contained and the tracker ends `Idle`
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.transition(TrackerState::Checking);
        let outcome = self.check().await;
        self.transition(TrackerState::Idle);
        outcome
    }

    /// Enter the terminal state
    pub fn stop(&mut self) {
        self.transition(TrackerState::Stopped);
    }

    async fn check(&mut self) -> CycleOutcome {
        let body = match self.fetcher.fetch().await {
            Ok(body) => body,
            Err(e) => {
                error!("❌ Failed to get price: {}", e);
                return CycleOutcome::FetchFailed(e);
            }
        };

        let price = match extract_price(&body) {
            Ok(price) => price,
            Err(e) => {
                error!("❌ Failed to get price: {}", e);
                return CycleOutcome::ExtractFailed(e);
            }
        };

        let recorded = match self.history.append(&PriceSample::now(price)) {
            Ok(()) => true,
            Err(LogWriteError::NegativePrice(_)) => {
                error!("❌ Failed to get price: page shows negative price £{}", price);
                return CycleOutcome::Rejected(price);
            }
            Err(e) => {
                warn!("Price £{} was not recorded: {}", price, e);
                false
            }
        };
        info!("✅ Checked price: £{}", price);

        if price > self.config.target_price {
            debug!("£{} is above the £{} target", price, self.config.target_price);
            return CycleOutcome::Checked { price, recorded, alert: AlertStatus::NotNeeded };
        }

        self.transition(TrackerState::Notifying);
        let alert = match self.notifier.notify(price, &self.config.product_url).await {
            Ok(()) => {
                info!("✅ Email sent: Price dropped to £{}!", price);
                AlertStatus::Sent
            }
            Err(e) => {
                error!("❌ Email failed: {}", e);
                AlertStatus::Failed
            }
        };

        CycleOutcome::Checked { price, recorded, alert }
    }

    fn transition(&mut self, next: TrackerState) {
        debug!("Tracker state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
