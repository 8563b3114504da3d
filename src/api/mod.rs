mod types;
mod client;
mod period;
mod provider;

pub use types::*;
pub use client::ScheduleClient;
pub use period::{day_name, day_short_name, PeriodClock};
pub use provider::{fetch_sessions, prepare_sessions, Prepared, SessionQuery};
