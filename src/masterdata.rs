//! Master data: extraction from the source ERP, insert-or-ignore loading,
//! and the immutable in-memory snapshot the generators draw from.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ConnectionTrait, DbBackend, EntityTrait, IntoActiveModel, Statement,
};
use tracing::{info, warn};

use crate::config::GenerationConfig;
use crate::db::DbPool;
use crate::entities::{customer, product, salesperson, LifecycleStage};
use crate::errors::EtlError;

const REGIONS: &[&str] = &[
    "Kuala Lumpur",
    "Penang",
    "Johor Bahru",
    "Kuching",
    "Melaka",
    "Ipoh",
    "Sabah",
];

const TERRITORIES: &[&str] = &["Central", "North", "South", "East", "West"];

/// Source catalog category codes, resolved to dashboard-friendly names.
///
/// Unknown codes are rejected at extraction time rather than silently
/// defaulted; "Rigid" and "Machine & Parts" resolve but carry no base rate,
/// so no transactions are synthesized for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
pub enum CategoryCode {
    #[strum(serialize = "FAB")]
    UpholsteryFabric,
    #[strum(serialize = "PVC")]
    PvcLeather,
    #[strum(serialize = "CANTARP")]
    CanvasTarpaulin,
    #[strum(serialize = "ACS")]
    Accessories,
    #[strum(serialize = "RECL")]
    Recliner,
    #[strum(serialize = "SHEET")]
    Sheeting,
    #[strum(serialize = "NW")]
    NonWoven,
    #[strum(serialize = "FL")]
    CarpetFlooring,
    #[strum(serialize = "RIG")]
    Rigid,
    #[strum(serialize = "MAC")]
    MachineParts,
}

impl CategoryCode {
    /// Resolves a raw source code, failing on anything unmapped.
    pub fn resolve(code: &str) -> Result<Self, EtlError> {
        Self::from_str(code)
            .map_err(|_| EtlError::Validation(format!("unknown category code '{code}'")))
    }

    /// Dashboard-facing category name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::UpholsteryFabric => "Upholstery Fabric",
            Self::PvcLeather => "PVC Leather",
            Self::CanvasTarpaulin => "Canvas & Tarpaulin",
            Self::Accessories => "Accessories",
            Self::Recliner => "Recliner",
            Self::Sheeting => "Sheeting",
            Self::NonWoven => "Non Woven",
            Self::CarpetFlooring => "Carpet & Flooring",
            Self::Rigid => "Rigid",
            Self::MachineParts => "Machine & Parts",
        }
    }
}

/// Maps a source customer group to a dashboard segment. Unlike category
/// codes, unmapped groups fall back to "Other"; segments are descriptive
/// and nothing downstream keys on them.
pub fn map_segment(group: &str) -> &'static str {
    match group {
        "MANUFACTURING" | "FURNITURE" | "COACH BUILDER" | "CANVAS/TARP" | "BUS SEAT/CAR SE" => {
            "Industrial"
        }
        "DESIGNER & ARCHITECT" | "PACKAGING & STATIONERY" | "SILKSCREEN & ADVERTISING" => {
            "Commercial"
        }
        "END USER" => "Retail",
        "DEALER" => "Distributor",
        _ => "Other",
    }
}

/// Immutable master-data snapshot for one run.
///
/// The category partition over products is computed once here, never per
/// draw.
#[derive(Debug, Clone, Default)]
pub struct MasterData {
    pub customers: Vec<customer::Model>,
    pub products: Vec<product::Model>,
    pub salespeople: Vec<salesperson::Model>,
    by_category: HashMap<String, Vec<usize>>,
}

impl MasterData {
    pub fn new(
        customers: Vec<customer::Model>,
        products: Vec<product::Model>,
        salespeople: Vec<salesperson::Model>,
    ) -> Self {
        let mut by_category: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, p) in products.iter().enumerate() {
            by_category
                .entry(p.product_category.clone())
                .or_default()
                .push(idx);
        }
        Self {
            customers,
            products,
            salespeople,
            by_category,
        }
    }

    /// Reads the three master collections back from the destination.
    pub async fn load(db: &DbPool) -> Result<Self, EtlError> {
        let customers = customer::Entity::find().all(db).await?;
        let products = product::Entity::find().all(db).await?;
        let salespeople = salesperson::Entity::find().all(db).await?;

        info!(
            customers = customers.len(),
            products = products.len(),
            salespeople = salespeople.len(),
            "Loaded master data"
        );

        Ok(Self::new(customers, products, salespeople))
    }

    /// True when any master collection is empty; transaction generation
    /// skips entirely in that case.
    pub fn is_incomplete(&self) -> bool {
        self.customers.is_empty() || self.products.is_empty() || self.salespeople.is_empty()
    }

    /// Whether any products exist for the given category.
    pub fn has_category(&self, category: &str) -> bool {
        self.by_category
            .get(category)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    /// Uniform draw of a product within a category, if any exist.
    pub fn pick_product<R: Rng + ?Sized>(
        &self,
        category: &str,
        rng: &mut R,
    ) -> Option<&product::Model> {
        let indices = self.by_category.get(category)?;
        indices.choose(rng).map(|&i| &self.products[i])
    }

    pub fn pick_customer<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&customer::Model> {
        self.customers.choose(rng)
    }

    pub fn pick_salesperson<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&salesperson::Model> {
        self.salespeople.choose(rng)
    }

    /// Categories present in the product catalog but absent from the
    /// configured base-rate table. These generate no transactions.
    pub fn unconfigured_categories(&self, gen: &GenerationConfig) -> Vec<String> {
        let mut missing: Vec<String> = self
            .by_category
            .keys()
            .filter(|cat| gen.base_rate(cat).is_none())
            .cloned()
            .collect();
        missing.sort_unstable();
        missing
    }
}

/// Master rows extracted from the source ERP, already mapped to the
/// destination shape.
#[derive(Debug, Clone, Default)]
pub struct ExtractedMaster {
    pub customers: Vec<customer::Model>,
    pub products: Vec<product::Model>,
    pub salespeople: Vec<salesperson::Model>,
}

/// Extracts master data from the source ERP with plain parameterized
/// queries and maps it into destination rows.
///
/// Attributes the source does not carry (territory, region, utilization,
/// costs and prices, lifecycle stage) are synthesized within documented
/// bounds using the injected RNG.
pub async fn extract_master_data<R: Rng + ?Sized>(
    source: &DbPool,
    rng: &mut R,
    today: NaiveDate,
    customer_limit: u64,
    products_per_category: u64,
) -> Result<ExtractedMaster, EtlError> {
    let backend = source.get_database_backend();

    let customers = extract_customers(source, backend, rng, today, customer_limit).await?;
    let products = extract_products(source, backend, rng, today, products_per_category).await?;
    let salespeople = extract_salespeople(source, backend, rng, today).await?;

    info!(
        customers = customers.len(),
        products = products.len(),
        salespeople = salespeople.len(),
        "Extracted master data from source"
    );

    Ok(ExtractedMaster {
        customers,
        products,
        salespeople,
    })
}

async fn extract_customers<R: Rng + ?Sized>(
    source: &DbPool,
    backend: DbBackend,
    rng: &mut R,
    today: NaiveDate,
    limit: u64,
) -> Result<Vec<customer::Model>, EtlError> {
    let rows = source
        .query_all(Statement::from_sql_and_values(
            backend,
            r#"SELECT cust_id,
                      name,
                      COALESCE(customergroup_id, 'OTHER') AS customer_segment,
                      COALESCE(industry_id, customergroup_id, 'General') AS industry,
                      COALESCE(credit_limit, 1000) AS credit_limit
               FROM customer
               WHERE name IS NOT NULL AND name != ''
               ORDER BY credit_limit DESC
               LIMIT $1"#,
            [(limit as i64).into()],
        ))
        .await?;

    let mut customers = Vec::with_capacity(rows.len());
    for row in rows {
        let cust_id: String = row.try_get("", "cust_id")?;
        let name: String = row.try_get("", "name")?;
        let group: String = row.try_get("", "customer_segment")?;
        let industry: String = row.try_get("", "industry")?;
        let credit_limit: Decimal = row.try_get("", "credit_limit")?;

        let utilization = rng.gen_range(0.2..=0.8);
        let credit_utilized = (credit_limit
            * Decimal::from_f64(utilization).unwrap_or_default())
        .round_dp(2);

        customers.push(customer::Model {
            customer_id: cust_id,
            customer_name: name,
            customer_segment: map_segment(&group).to_string(),
            region: pick_static(REGIONS, rng),
            industry,
            credit_limit,
            credit_utilized,
            first_order_date: today - Duration::days(rng.gen_range(180..=900)),
            last_order_date: today - Duration::days(rng.gen_range(1..=30)),
        });
    }
    Ok(customers)
}

async fn extract_products<R: Rng + ?Sized>(
    source: &DbPool,
    backend: DbBackend,
    rng: &mut R,
    today: NaiveDate,
    per_category: u64,
) -> Result<Vec<product::Model>, EtlError> {
    let rows = source
        .query_all(Statement::from_sql_and_values(
            backend,
            r#"WITH ranked AS (
                   SELECT s.stk_id,
                          s.name,
                          s.cat1_id AS category_code,
                          COALESCE(s.uom_id, 'ROLL') AS uom,
                          ROW_NUMBER() OVER (PARTITION BY s.cat1_id ORDER BY RANDOM()) AS rn
                   FROM stkmas s
                   WHERE s.name IS NOT NULL
                     AND s.cat1_id IS NOT NULL
               )
               SELECT stk_id, name, category_code, uom
               FROM ranked
               WHERE rn <= $1
               ORDER BY category_code, stk_id"#,
            [(per_category as i64).into()],
        ))
        .await?;

    let stages = [
        LifecycleStage::Launch,
        LifecycleStage::Growth,
        LifecycleStage::Mature,
    ];

    let mut products = Vec::with_capacity(rows.len());
    for row in rows {
        let stk_id: String = row.try_get("", "stk_id")?;
        let name: String = row.try_get("", "name")?;
        let code: String = row.try_get("", "category_code")?;
        let uom: String = row.try_get("", "uom")?;

        // Reject unmapped codes instead of defaulting them silently.
        let category = CategoryCode::resolve(&code)?;

        let unit_cost = Decimal::from_f64(rng.gen_range(15.0..=50.0))
            .unwrap_or_default()
            .round_dp(2);
        // Bounded markup keeps unit_price strictly above unit_cost.
        let markup = Decimal::from_f64(rng.gen_range(1.8..=2.5)).unwrap_or_default();
        let unit_price = (unit_cost * markup).round_dp(2);

        let name: String = name.chars().take(100).collect();

        products.push(product::Model {
            product_id: stk_id,
            product_name: name,
            product_category: category.display_name().to_string(),
            product_family: code,
            unit_cost,
            unit_price,
            launch_date: today - Duration::days(rng.gen_range(200..=800)),
            lifecycle_stage: *stages.choose(rng).unwrap_or(&LifecycleStage::Mature),
            reorder_point: rng.gen_range(100..=300),
            uom,
        });
    }
    Ok(products)
}

async fn extract_salespeople<R: Rng + ?Sized>(
    source: &DbPool,
    backend: DbBackend,
    rng: &mut R,
    today: NaiveDate,
) -> Result<Vec<salesperson::Model>, EtlError> {
    let rows = source
        .query_all(Statement::from_string(
            backend,
            r#"SELECT emp_id,
                      name,
                      COALESCE(dept_id, 'SALES') AS department
               FROM ep_emp
               WHERE status_flg = 'A'
                 AND (dept_id IN ('SALES', 'SC') OR emp_id LIKE 'SS%')
               ORDER BY emp_id
               LIMIT 15"#
                .to_string(),
        ))
        .await?;

    let mut salespeople = Vec::with_capacity(rows.len());
    for row in rows {
        salespeople.push(salesperson::Model {
            salesperson_id: row.try_get("", "emp_id")?,
            salesperson_name: row.try_get("", "name")?,
            department: row.try_get("", "department")?,
            territory: pick_static(TERRITORIES, rng),
            hire_date: today - Duration::days(rng.gen_range(365..=2500)),
        });
    }
    Ok(salespeople)
}

/// Loads extracted master rows with insert-or-ignore semantics: re-running
/// with the same seed entities is a no-op on existing rows.
pub async fn load_master_data<C: ConnectionTrait>(
    db: &C,
    extracted: &ExtractedMaster,
) -> Result<(u64, u64, u64), EtlError> {
    let customers = if extracted.customers.is_empty() {
        0
    } else {
        customer::Entity::insert_many(
            extracted
                .customers
                .iter()
                .cloned()
                .map(|m| m.into_active_model()),
        )
        .on_conflict(
            OnConflict::column(customer::Column::CustomerId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?
    };

    let products = if extracted.products.is_empty() {
        0
    } else {
        product::Entity::insert_many(
            extracted
                .products
                .iter()
                .cloned()
                .map(|m| m.into_active_model()),
        )
        .on_conflict(
            OnConflict::column(product::Column::ProductId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?
    };

    let salespeople = if extracted.salespeople.is_empty() {
        0
    } else {
        salesperson::Entity::insert_many(
            extracted
                .salespeople
                .iter()
                .cloned()
                .map(|m| m.into_active_model()),
        )
        .on_conflict(
            OnConflict::column(salesperson::Column::SalespersonId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?
    };

    if extracted.customers.len() as u64 != customers
        || extracted.products.len() as u64 != products
        || extracted.salespeople.len() as u64 != salespeople
    {
        warn!(
            "Some master rows already existed and were left untouched \
             (customers {}/{}, products {}/{}, salespeople {}/{})",
            customers,
            extracted.customers.len(),
            products,
            extracted.products.len(),
            salespeople,
            extracted.salespeople.len()
        );
    }

    Ok((customers, products, salespeople))
}

fn pick_static<R: Rng + ?Sized>(choices: &[&str], rng: &mut R) -> String {
    choices
        .choose(rng)
        .copied()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn sample_products() -> Vec<product::Model> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        vec![
            product::Model {
                product_id: "P-1".into(),
                product_name: "Marine Vinyl Roll".into(),
                product_category: "PVC Leather".into(),
                product_family: "PVC".into(),
                unit_cost: dec!(20.00),
                unit_price: dec!(45.00),
                launch_date: date,
                lifecycle_stage: LifecycleStage::Mature,
                reorder_point: 120,
                uom: "ROLL".into(),
            },
            product::Model {
                product_id: "P-2".into(),
                product_name: "Heavy Canvas 10oz".into(),
                product_category: "Canvas & Tarpaulin".into(),
                product_family: "CANTARP".into(),
                unit_cost: dec!(15.00),
                unit_price: dec!(30.00),
                launch_date: date,
                lifecycle_stage: LifecycleStage::Growth,
                reorder_point: 200,
                uom: "ROLL".into(),
            },
            product::Model {
                product_id: "P-3".into(),
                product_name: "Grade A Rigid Sheet".into(),
                product_category: "Rigid".into(),
                product_family: "RIG".into(),
                unit_cost: dec!(18.00),
                unit_price: dec!(36.00),
                launch_date: date,
                lifecycle_stage: LifecycleStage::Launch,
                reorder_point: 90,
                uom: "SHEET".into(),
            },
        ]
    }

    #[test]
    fn category_partition_is_precomputed() {
        let master = MasterData::new(vec![], sample_products(), vec![]);
        assert!(master.has_category("PVC Leather"));
        assert!(master.has_category("Rigid"));
        assert!(!master.has_category("Recliner"));

        let mut rng = StdRng::seed_from_u64(7);
        let picked = master.pick_product("Canvas & Tarpaulin", &mut rng).unwrap();
        assert_eq!(picked.product_id, "P-2");
    }

    #[test]
    fn pick_from_missing_category_returns_none() {
        let master = MasterData::new(vec![], vec![], vec![]);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(master.pick_product("PVC Leather", &mut rng).is_none());
        assert!(master.is_incomplete());
    }

    #[test]
    fn unknown_category_codes_are_rejected() {
        use assert_matches::assert_matches;

        assert!(CategoryCode::resolve("FAB").is_ok());
        assert!(CategoryCode::resolve("RIG").is_ok());
        assert_matches!(CategoryCode::resolve("BOGUS"), Err(EtlError::Validation(_)));
    }

    #[test]
    fn unconfigured_categories_are_reported() {
        let master = MasterData::new(vec![], sample_products(), vec![]);
        let gen = GenerationConfig::default();
        assert_eq!(master.unconfigured_categories(&gen), vec!["Rigid".to_string()]);
    }

    #[test]
    fn segment_mapping_falls_back_to_other() {
        assert_eq!(map_segment("DEALER"), "Distributor");
        assert_eq!(map_segment("UNSEEN GROUP"), "Other");
    }
}
