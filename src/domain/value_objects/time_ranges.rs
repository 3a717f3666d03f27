use chrono::{DateTime, Utc};

/// Half-open interval intersection: `[a_start, a_end)` against `[b_start, b_end)`.
/// A booking ending exactly when another starts does not overlap.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

pub fn is_valid_range(start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start < end
}
