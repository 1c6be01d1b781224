//! Campaign aggregator
//!
//! Progress figures are derived from the session ledger on every request and
//! never stored.

use chrono::{DateTime, Utc};

use super::reward::elapsed_hours;
use crate::models::{Campaign, CampaignAggregate, Session};

/// Fold a campaign's sessions into its aggregate as of `now`.
///
/// Open sessions count up to `now`. Each session contributes its own floored
/// hours, so two 40 minute sessions add nothing.
pub fn aggregate(campaign: &Campaign, sessions: &[Session], now: DateTime<Utc>) -> CampaignAggregate {
    let total_volunteered_hours = sessions
        .iter()
        .map(|s| elapsed_hours(s.start_at, s.effective_end(now)))
        .sum();

    CampaignAggregate {
        total_sessions: sessions.len() as i64,
        total_volunteered_hours,
        age_hours: elapsed_hours(campaign.created_at, now),
    }
}
