//! Check cycle models

use rust_decimal::Decimal;
use std::fmt;

use crate::api::product_page::FetchError;
use crate::services::extract_service::ExtractError;

/// Where the tracker is in its check cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Checking,
    Notifying,
    Stopped,
}

/// What happened to the alert for a checked price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    /// Price stayed above the target
    NotNeeded,
    Sent,
    Failed,
}

/// Result of one fetch -> extract -> record -> notify cycle
#[derive(Debug)]
pub enum CycleOutcome {
    FetchFailed(FetchError),
    ExtractFailed(ExtractError),
    /// Price read from the page but refused, e.g. negative
    Rejected(Decimal),
    Checked {
        price: Decimal,
        recorded: bool,
        alert: AlertStatus,
    },
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::FetchFailed(e) => write!(f, "fetch failed ({})", e),
            CycleOutcome::ExtractFailed(e) => write!(f, "extract failed ({})", e),
            CycleOutcome::Rejected(price) => write!(f, "rejected price £{}", price),
            CycleOutcome::Checked { price, recorded, alert } => {
                write!(f, "price £{}", price)?;
                if !recorded {
                    write!(f, ", not recorded")?;
                }
                match alert {
                    AlertStatus::NotNeeded => Ok(()),
                    AlertStatus::Sent => write!(f, ", alert sent"),
                    AlertStatus::Failed => write!(f, ", alert failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_outcome_display() {
        let checked = CycleOutcome::Checked {
            price: Decimal::from_str("590.00").unwrap(),
            recorded: false,
            alert: AlertStatus::Sent,
        };
        assert_eq!(checked.to_string(), "price £590.00, not recorded, alert sent");

        let quiet = CycleOutcome::Checked {
            price: Decimal::from_str("650.00").unwrap(),
            recorded: true,
            alert: AlertStatus::NotNeeded,
        };
        assert_eq!(quiet.to_string(), "price £650.00");

        let failed = CycleOutcome::ExtractFailed(ExtractError::NotFound);
        assert_eq!(failed.to_string(), "extract failed (price element not found)");
    }
}
