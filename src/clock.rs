use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Moscow is UTC+3 year-round (no DST).
const MSK_OFFSET_SECS: i32 = 3 * 3600;

fn msk() -> FixedOffset {
    FixedOffset::east_opt(MSK_OFFSET_SECS).unwrap()
}

/// Current instant in Moscow time, used for order timestamps.
pub fn now_msk() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&msk())
}

/// Current trading day in Moscow time, used when polling the exchange.
pub fn today_msk() -> NaiveDate {
    now_msk().date_naive()
}
