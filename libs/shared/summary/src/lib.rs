//! Health-state summarization rules.
//!
//! Everything here is a pure function over already-fetched rows: no storage,
//! no clock reads except where "now" is passed in by the caller.

pub mod adherence;
pub mod chart;
pub mod expiry;
pub mod ranges;
pub mod score;

pub use adherence::{adherence_rate, adherence_rate_checked, AdherenceSummary};
pub use chart::{group_vitals_by_date, most_recent, ChartPoint};
pub use expiry::{product_expiry_state, ExpiryState, EXPIRING_SOON_DAYS};
pub use ranges::is_vital_in_normal_range;
pub use score::{average_health_score, health_status_from_score, member_status};
