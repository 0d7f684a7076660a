use chrono::{Locale, NaiveDate, NaiveTime};

/// Formats a rupiah amount with dot thousands separators, e.g. `Rp 70.000`.
pub fn rupiah(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("Rp {}", grouped)
}

fn localized(date: NaiveDate, pattern: &str) -> String {
    date.and_time(NaiveTime::default())
        .and_utc()
        .format_localized(pattern, Locale::id_ID)
        .to_string()
}

/// `Senin, 19 Oktober 2026`
pub fn long_date(date: NaiveDate) -> String {
    localized(date, "%A, %d %B %Y")
}

/// `19 Okt 2026`
pub fn short_date(date: NaiveDate) -> String {
    localized(date, "%d %b %Y")
}
