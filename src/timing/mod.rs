//! Countdown, progress and the live refresh that drives them

mod countdown;
mod ticker;

pub use countdown::{progress, start_of_day_utc, time_remaining, time_remaining_until, TimeRemaining};
pub use ticker::{Clock, CountdownTicker, SystemClock, DEFAULT_TICK_INTERVAL};
