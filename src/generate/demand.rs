use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;

use crate::config::GenerationConfig;

/// Temporal demand model: how many transactions a category sees on a day.
///
/// `count = round(base_rate × seasonal(month) × yoy(year) × weekend × jitter)`,
/// floored at zero. No hidden state; the random source is injected so the
/// model stays unit-testable.
#[derive(Debug, Clone, Copy)]
pub struct DemandModel<'a> {
    cfg: &'a GenerationConfig,
}

impl<'a> DemandModel<'a> {
    pub fn new(cfg: &'a GenerationConfig) -> Self {
        Self { cfg }
    }

    /// Expected transaction count for one date and base daily rate.
    pub fn daily_count<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        base_rate: f64,
        rng: &mut R,
    ) -> u32 {
        let seasonal = self.cfg.seasonal_factor(date.month());
        let yoy = self.cfg.yoy_factor(date.year());
        let weekend = if is_weekend(date) {
            self.cfg.weekend_factor
        } else {
            1.0
        };
        let jitter = rng.gen_range(self.cfg.jitter.min..=self.cfg.jitter.max);

        let count = base_rate * seasonal * yoy * weekend * jitter;
        count.round().max(0.0) as u32
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn december_weekday_count_stays_in_jitter_envelope() {
        let cfg = GenerationConfig::default();
        let model = DemandModel::new(&cfg);
        let mut rng = StdRng::seed_from_u64(42);

        // Tuesday 2025-12-02: seasonal 1.25, yoy 1.15, weekday 1.0.
        let tuesday = date(2025, 12, 2);
        assert_eq!(tuesday.weekday(), Weekday::Tue);

        let deterministic = 2.0 * 1.25 * 1.15;
        let lo = (deterministic * cfg.jitter.min).round() as u32;
        let hi = (deterministic * cfg.jitter.max).round() as u32;

        for _ in 0..200 {
            let count = model.daily_count(tuesday, 2.0, &mut rng);
            assert!(
                (lo..=hi).contains(&count),
                "count {count} outside [{lo}, {hi}]"
            );
        }
    }

    #[test]
    fn weekends_are_dampened() {
        let cfg = GenerationConfig::default();
        let model = DemandModel::new(&cfg);
        let mut rng = StdRng::seed_from_u64(7);

        let saturday = date(2025, 6, 7);
        assert_eq!(saturday.weekday(), Weekday::Sat);

        // Even at maximum jitter the weekend ceiling sits below the
        // weekday floor for a healthy base rate.
        let weekend_max = (10.0 * 1.0 * 1.15 * cfg.weekend_factor * cfg.jitter.max).round() as u32;
        for _ in 0..200 {
            let count = model.daily_count(saturday, 10.0, &mut rng);
            assert!(count <= weekend_max);
        }
    }

    #[test]
    fn zero_base_rate_yields_zero() {
        let cfg = GenerationConfig::default();
        let model = DemandModel::new(&cfg);
        let mut rng = StdRng::seed_from_u64(3);

        for day in 1..=28 {
            assert_eq!(model.daily_count(date(2025, 2, day), 0.0, &mut rng), 0);
        }
    }

    #[test]
    fn unknown_year_uses_baseline_growth() {
        let cfg = GenerationConfig::default();
        let model = DemandModel::new(&cfg);
        let mut rng = StdRng::seed_from_u64(11);

        // 2030 is not in the YoY table; June has seasonal 1.0. The count
        // must stay within base_rate × jitter alone.
        let monday = date(2030, 6, 3);
        let hi = (4.0 * cfg.jitter.max).round() as u32;
        for _ in 0..100 {
            assert!(model.daily_count(monday, 4.0, &mut rng) <= hi);
        }
    }
}
