//! Lifecycle state assignment.
//!
//! Statuses are a stateless classification of a record's temporal distance
//! from the injected reference date, recomputed at generation time and
//! persisted once. There is no transition logic.

use chrono::NaiveDate;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::entities::{DeliveryStatus, QuotationStatus};

/// Quotations closing within this many days count as "due soon".
const DUE_SOON_DAYS: i64 = 14;

/// Assigns a delivery status from the age of an order relative to `today`.
///
/// Older buckets weight toward Delivered/Cancelled; future orders are
/// always Pending.
pub fn delivery_status<R: Rng + ?Sized>(
    order_date: NaiveDate,
    today: NaiveDate,
    rng: &mut R,
) -> DeliveryStatus {
    use DeliveryStatus::*;

    let days_ago = (today - order_date).num_days();
    if days_ago > 30 {
        weighted(&[(Delivered, 95), (Cancelled, 5)], rng)
    } else if days_ago > 7 {
        weighted(&[(Delivered, 70), (Shipped, 25), (Cancelled, 5)], rng)
    } else if days_ago > 0 {
        weighted(&[(Shipped, 50), (Pending, 40), (Delivered, 10)], rng)
    } else {
        Pending
    }
}

/// Assigns a quotation status and win probability from the distance between
/// `today` and the expected close date.
pub fn quotation_outcome<R: Rng + ?Sized>(
    expected_close: NaiveDate,
    today: NaiveDate,
    rng: &mut R,
) -> (QuotationStatus, f64) {
    use QuotationStatus::*;

    let days_past_close = (today - expected_close).num_days();
    if days_past_close > 30 {
        // Long expired: settled one way or the other.
        let status = weighted(&[(Completed, 65), (Lost, 35)], rng);
        let probability = if status == Completed { 0.9 } else { 0.1 };
        (status, probability)
    } else if days_past_close > 0 {
        // Recently expired.
        let status = weighted(&[(Completed, 50), (Lost, 30), (Active, 20)], rng);
        (status, rng.gen_range(0.3..=0.7))
    } else if days_past_close > -DUE_SOON_DAYS {
        // Due soon.
        let status = weighted(&[(Active, 70), (Completed, 30)], rng);
        (status, rng.gen_range(0.5..=0.8))
    } else {
        // Far-future close dates.
        let status = weighted(&[(Draft, 30), (Active, 70)], rng);
        (status, rng.gen_range(0.3..=0.6))
    }
}

fn weighted<T: Copy, R: Rng + ?Sized>(choices: &[(T, u32)], rng: &mut R) -> T {
    // All weight tables above are static, non-empty, and positive.
    let dist = WeightedIndex::new(choices.iter().map(|(_, w)| *w))
        .expect("static weight table is non-empty with positive weights");
    choices[dist.sample(rng)].0
}
