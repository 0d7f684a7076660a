use chrono::Weekday;
use chrono_tz::Tz;

#[cfg(debug_assertions)]
pub fn get_backend_url() -> &'static str {
    match option_env!("CONSULTATAX_BACKEND_URL") {
        Some(url) => url,
        None => "http://localhost:8000", // Laravel dev server
    }
}

#[cfg(not(debug_assertions))]
pub fn get_backend_url() -> &'static str {
    match option_env!("CONSULTATAX_BACKEND_URL") {
        Some(url) => url,
        None => "", // same origin in production
    }
}

/// Upper bound for any single backend call before it is abandoned.
pub const REQUEST_TIMEOUT_MS: u32 = 15_000;

/// How long inline validation notices stay on screen.
pub const NOTICE_DISMISS_MS: u32 = 5_000;

/// The office is closed on this day, so it can never be booked.
pub const CLOSED_WEEKDAY: Weekday = Weekday::Sun;

/// Schedules are expressed in western Indonesian time (WIB).
pub const BUSINESS_TZ: Tz = chrono_tz::Asia::Jakarta;

pub const CHAT_CACHE_CAPACITY: usize = 32;
