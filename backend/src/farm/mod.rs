//! Farm revenue estimate for a fixed 80-acre plan.
//!
//! The land is split into equal segments, one crop per segment. Tomato is
//! planted on two sub-plots with different yields.

use serde::Serialize;

pub const TOTAL_ACRES: f64 = 80.0;
pub const SEGMENTS: u32 = 5;

const KG_PER_TONNE: f64 = 1000.0;

/// Market price of a crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "unit", content = "rupees", rename_all = "camelCase")]
pub enum Price {
    PerKg(f64),
    PerTonne(f64),
}

impl Price {
    /// Revenue for `tonnes` of produce.
    pub fn revenue(&self, tonnes: f64) -> f64 {
        match *self {
            Price::PerKg(rs) => tonnes * KG_PER_TONNE * rs,
            Price::PerTonne(rs) => tonnes * rs,
        }
    }
}

/// Part of a segment with its yield in tonnes per acre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    pub share: f64,
    pub tonnes_per_acre: f64,
}

/// One crop grown on one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropPlan {
    pub name: &'static str,
    pub plots: Vec<Plot>,
    pub price: Price,
    /// Grown without chemicals (counts towards the chemical-free total).
    pub chemical_free: bool,
}

impl CropPlan {
    fn single(name: &'static str, tonnes_per_acre: f64, price: Price, chemical_free: bool) -> Self {
        Self {
            name,
            plots: vec![Plot {
                share: 1.0,
                tonnes_per_acre,
            }],
            price,
            chemical_free,
        }
    }

    pub fn yield_tonnes(&self, segment_acres: f64) -> f64 {
        self.plots
            .iter()
            .map(|p| p.share * segment_acres * p.tonnes_per_acre)
            .sum()
    }

    pub fn revenue(&self, segment_acres: f64) -> f64 {
        self.price.revenue(self.yield_tonnes(segment_acres))
    }
}

/// The crops grown, one per segment.
pub fn crop_plans() -> Vec<CropPlan> {
    vec![
        CropPlan {
            name: "Tomato",
            plots: vec![
                Plot {
                    share: 0.3,
                    tonnes_per_acre: 10.0,
                },
                Plot {
                    share: 0.7,
                    tonnes_per_acre: 12.0,
                },
            ],
            price: Price::PerKg(7.0),
            chemical_free: true,
        },
        CropPlan::single("Potato", 10.0, Price::PerKg(20.0), true),
        CropPlan::single("Cabbage", 14.0, Price::PerKg(24.0), true),
        CropPlan::single("Sunflower", 0.7, Price::PerKg(200.0), true),
        CropPlan::single("Sugarcane", 45.0, Price::PerTonne(4000.0), false),
    ]
}

/// Revenue of one crop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRevenue {
    pub name: &'static str,
    pub tonnes: f64,
    pub revenue: f64,
    pub chemical_free: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmReport {
    pub segment_acres: f64,
    pub crops: Vec<CropRevenue>,
    pub total_sales: f64,
    pub chemical_free_sales: f64,
}

/// Compute the revenue report for `plans` on `total_acres` split evenly.
pub fn farm_report(total_acres: f64, plans: &[CropPlan]) -> FarmReport {
    let segment_acres = if plans.is_empty() {
        0.0
    } else {
        total_acres / plans.len() as f64
    };

    let crops: Vec<CropRevenue> = plans
        .iter()
        .map(|plan| CropRevenue {
            name: plan.name,
            tonnes: plan.yield_tonnes(segment_acres),
            revenue: plan.revenue(segment_acres),
            chemical_free: plan.chemical_free,
        })
        .collect();

    let total_sales = crops.iter().map(|c| c.revenue).sum();
    let chemical_free_sales = crops
        .iter()
        .filter(|c| c.chemical_free)
        .map(|c| c.revenue)
        .sum();

    FarmReport {
        segment_acres,
        crops,
        total_sales,
        chemical_free_sales,
    }
}

/// Report for the default 80-acre plan.
pub fn default_report() -> FarmReport {
    let plans = crop_plans();
    debug_assert_eq!(plans.len() as u32, SEGMENTS);
    farm_report(TOTAL_ACRES, &plans)
}

/// Format rupees with thousands separators and two decimals, e.g. `Rs. 1,234.50`.
pub fn format_rupees(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("Rs. {}{}.{}", sign, grouped, frac)
}
