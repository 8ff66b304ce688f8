//! Transaction synthesizer: materializes individual order and quotation
//! records for one calendar day at a time.

use chrono::{Duration, NaiveDate, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::GenerationConfig;
use crate::entities::{sales_order, sales_quotation};
use crate::generate::{demand::DemandModel, lifecycle};
use crate::masterdata::MasterData;

/// Currency-safe 2-decimal rounding (round-half-up).
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Synthesizes orders and quotations against an immutable master-data
/// snapshot. Record ids are deterministic per (date, type, sequence);
/// everything else is drawn from the injected RNG.
pub struct Synthesizer<'a> {
    master: &'a MasterData,
    cfg: &'a GenerationConfig,
    demand: DemandModel<'a>,
    today: NaiveDate,
    currency: &'a str,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        master: &'a MasterData,
        cfg: &'a GenerationConfig,
        today: NaiveDate,
        currency: &'a str,
    ) -> Self {
        Self {
            master,
            cfg,
            demand: DemandModel::new(cfg),
            today,
            currency,
        }
    }

    /// Generates all order records for one day across the configured
    /// categories. The sequence counter resets per day and runs across
    /// categories, matching the `ORD-{YYYYMMDD}-{seq:04}` id stream.
    ///
    /// Categories with no products, or an incomplete master set, yield
    /// zero records rather than an error.
    pub fn orders_for_date<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        rng: &mut R,
    ) -> Vec<sales_order::Model> {
        if self.master.is_incomplete() {
            return Vec::new();
        }

        let mut records = Vec::new();
        let mut seq = 0u32;

        for category in &self.cfg.categories {
            if !self.master.has_category(&category.name) {
                continue;
            }
            let count = self.demand.daily_count(date, category.base_rate, rng);
            for _ in 0..count {
                seq += 1;
                if let Some(order) = self.order_record(date, &category.name, seq, rng) {
                    records.push(order);
                }
            }
        }
        records
    }

    /// Generates all quotation records for one day; quotation volume runs
    /// at a configured fraction of order volume with its own id sequence.
    pub fn quotations_for_date<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        rng: &mut R,
    ) -> Vec<sales_quotation::Model> {
        if self.master.is_incomplete() {
            return Vec::new();
        }

        let mut records = Vec::new();
        let mut seq = 0u32;

        for category in &self.cfg.categories {
            if !self.master.has_category(&category.name) {
                continue;
            }
            let scaled_rate = category.base_rate * self.cfg.quotation_rate;
            let count = self.demand.daily_count(date, scaled_rate, rng);
            for _ in 0..count {
                seq += 1;
                if let Some(quote) = self.quotation_record(date, &category.name, seq, rng) {
                    records.push(quote);
                }
            }
        }
        records
    }

    fn order_record<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        category: &str,
        seq: u32,
        rng: &mut R,
    ) -> Option<sales_order::Model> {
        let product = self.master.pick_product(category, rng)?;
        let customer = self.master.pick_customer(rng)?;
        let salesperson = self.master.pick_salesperson(rng)?;

        let quantity = rng.gen_range(self.cfg.order_quantity.min..=self.cfg.order_quantity.max);
        let discount = self.draw_discount(rng);

        let qty = Decimal::from(quantity);
        let discount_factor = Decimal::ONE - discount / Decimal::ONE_HUNDRED;
        let revenue = round_money(product.unit_price * qty * discount_factor);
        let gross_profit =
            round_money((product.unit_price - product.unit_cost) * qty * discount_factor);

        Some(sales_order::Model {
            order_id: format!("ORD-{}-{:04}", date.format("%Y%m%d"), seq),
            order_date: date,
            customer_id: customer.customer_id.clone(),
            product_category: category.to_string(),
            product_name: product.product_name.clone(),
            quantity: quantity as i32,
            revenue_amount: revenue,
            currency: self.currency.to_string(),
            delivery_status: lifecycle::delivery_status(date, self.today, rng),
            salesperson_id: salesperson.salesperson_id.clone(),
            quotation_id: None,
            unit_price: product.unit_price,
            unit_cost: product.unit_cost,
            gross_profit,
            discount_rate: discount,
            sales_channel: self
                .cfg
                .sales_channels
                .choose(rng)
                .cloned()
                .unwrap_or_default(),
            created_at: Utc::now(),
        })
    }

    fn quotation_record<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        category: &str,
        seq: u32,
        rng: &mut R,
    ) -> Option<sales_quotation::Model> {
        let product = self.master.pick_product(category, rng)?;
        let customer = self.master.pick_customer(rng)?;
        let salesperson = self.master.pick_salesperson(rng)?;

        let quantity = rng.gen_range(self.cfg.quote_quantity.min..=self.cfg.quote_quantity.max);
        let qty = Decimal::from(quantity);
        let quoted_amount = round_money(product.unit_price * qty);
        let estimated_margin = round_money((product.unit_price - product.unit_cost) * qty);

        let close_offset =
            rng.gen_range(self.cfg.close_days.min..=self.cfg.close_days.max) as i64;
        let expected_close = date + Duration::days(close_offset);
        let (status, probability) = lifecycle::quotation_outcome(expected_close, self.today, rng);

        Some(sales_quotation::Model {
            quotation_id: format!("QUO-{}-{:04}", date.format("%Y%m%d"), seq),
            quotation_date: date,
            customer_id: customer.customer_id.clone(),
            product_category: category.to_string(),
            quoted_amount,
            currency: self.currency.to_string(),
            status,
            salesperson_id: salesperson.salesperson_id.clone(),
            expected_close_date: expected_close,
            estimated_margin,
            probability,
            created_at: Utc::now(),
        })
    }

    fn draw_discount<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let dist = WeightedIndex::new(self.cfg.discounts.iter().map(|d| d.weight))
            .expect("discount table validated at config load");
        Decimal::from(self.cfg.discounts[dist.sample(rng)].rate)
    }
}
