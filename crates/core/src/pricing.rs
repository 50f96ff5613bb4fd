//! Price statistics and display formatting.
//!
//! The server detail endpoint and the client-side fallback store both build
//! [`PriceStats`] here so the two shapes cannot drift apart.

use chrono::{DateTime, Duration, Utc};

use crate::constants::{FREE_LABEL, RECENT_REPORT_WINDOW_DAYS};
use crate::price_report::PriceStats;

/// Compute min/max/avg over `(price, observed_at)` samples.
///
/// `count` covers samples strictly newer than `now - 90 days`; `total`
/// covers all of them. Returns `None` for an empty input.
pub fn compute_price_stats(
    samples: impl IntoIterator<Item = (f64, DateTime<Utc>)>,
    now: DateTime<Utc>,
) -> Option<PriceStats> {
    let cutoff = now - Duration::days(RECENT_REPORT_WINDOW_DAYS);
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut total = 0usize;
    let mut recent = 0usize;

    for (price, at) in samples {
        min = min.min(price);
        max = max.max(price);
        sum += price;
        total += 1;
        if at > cutoff {
            recent += 1;
        }
    }

    if total == 0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss, reason = "report counts are capped at 50")]
    let avg = sum / total as f64;
    Some(PriceStats {
        min: format!("{min:.2}"),
        max: format!("{max:.2}"),
        avg: format!("{avg:.2}"),
        count: recent,
        total,
    })
}

/// Format a cent amount as whole dollars. Zero renders as `FREE`.
#[must_use]
pub fn format_price(cents: Option<i64>) -> Option<String> {
    let cents = cents?;
    if cents == 0 {
        return Some(FREE_LABEL.to_owned());
    }
    #[allow(clippy::cast_precision_loss, reason = "display only")]
    let dollars = (cents as f64 / 100.0).round();
    Some(format!("${dollars:.0}"))
}

/// Format a low/high pair, collapsing equal values.
///
/// Returns `None` when both sides are missing or zero. A single missing side
/// yields just the other side.
#[must_use]
pub fn format_price_range(low_cents: Option<i64>, high_cents: Option<i64>) -> Option<String> {
    let is_blank = |c: Option<i64>| c.is_none_or(|v| v == 0);
    if is_blank(low_cents) && is_blank(high_cents) {
        return None;
    }
    match (format_price(low_cents), format_price(high_cents)) {
        (Some(low), Some(high)) if low == high => Some(low),
        (Some(low), Some(high)) => Some(format!("{low}-{high}")),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}
