//! Read-only vehicle catalog shared by the reviewer and the scenario generator.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::text::words;

/// Market segment of a catalog model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Sedan,
    Suv,
    Truck,
    Hybrid,
    Electric,
}

/// One model with its base price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleModel {
    pub name: &'static str,
    pub segment: Segment,
    pub price: Decimal,
}

impl VehicleModel {
    /// Display name with the make.
    pub fn display_name(&self) -> String {
        format!("Toyota {}", self.name)
    }

    pub fn is_electrified(&self) -> bool {
        matches!(self.segment, Segment::Hybrid | Segment::Electric)
    }
}

/// Catalog in ascending price order.
pub const CATALOG: [VehicleModel; 11] = [
    VehicleModel { name: "Corolla", segment: Segment::Sedan, price: dec!(22000) },
    VehicleModel { name: "Prius", segment: Segment::Hybrid, price: dec!(27000) },
    VehicleModel { name: "Camry", segment: Segment::Sedan, price: dec!(28000) },
    VehicleModel { name: "Camry Hybrid", segment: Segment::Hybrid, price: dec!(30000) },
    VehicleModel { name: "RAV4", segment: Segment::Suv, price: dec!(30000) },
    VehicleModel { name: "RAV4 Hybrid", segment: Segment::Hybrid, price: dec!(32500) },
    VehicleModel { name: "Tacoma", segment: Segment::Truck, price: dec!(35000) },
    VehicleModel { name: "Highlander", segment: Segment::Suv, price: dec!(38000) },
    VehicleModel { name: "4Runner", segment: Segment::Suv, price: dec!(42000) },
    VehicleModel { name: "bZ4X", segment: Segment::Electric, price: dec!(43000) },
    VehicleModel { name: "Tundra", segment: Segment::Truck, price: dec!(45000) },
];

/// Share of annual income a vehicle price should stay under.
const AFFORDABLE_SHARE: Decimal = dec!(0.35);

/// Catalog model named in `text`. The longest matching name wins, so
/// "Camry Hybrid" beats "Camry".
pub fn find_model(text: &str) -> Option<&'static VehicleModel> {
    let tokens = words(text);
    CATALOG
        .iter()
        .filter(|model| {
            let name = words(model.name);
            tokens.windows(name.len()).any(|w| w == name.as_slice())
        })
        .max_by_key(|model| model.name.len())
}

/// Model for a stated preference, or the priciest affordable model.
pub fn select_model(preference: Option<&str>, annual_income: Decimal) -> &'static VehicleModel {
    if let Some(model) = preference.and_then(find_model) {
        return model;
    }
    let budget = annual_income * AFFORDABLE_SHARE;
    CATALOG
        .iter()
        .filter(|m| m.price <= budget)
        .max_by_key(|m| m.price)
        .unwrap_or(&CATALOG[0])
}

/// Exact lookup, with or without the make.
pub fn by_name(name: &str) -> Option<&'static VehicleModel> {
    let name = name.trim();
    let name = name.strip_prefix("Toyota ").unwrap_or(name);
    CATALOG.iter().find(|m| m.name.eq_ignore_ascii_case(name))
}

/// Closest-priced model from a different segment.
pub fn nearest_other_segment(model: &VehicleModel) -> &'static VehicleModel {
    CATALOG
        .iter()
        .filter(|m| m.segment != model.segment && !m.is_electrified())
        .min_by_key(|m| (m.price - model.price).abs())
        .unwrap_or(&CATALOG[0])
}

/// Electrified counterpart of `model` (itself when already electrified).
pub fn electrified_alternative(model: &'static VehicleModel) -> &'static VehicleModel {
    if model.is_electrified() {
        return model;
    }
    let hybrid_name = format!("{} Hybrid", model.name);
    CATALOG
        .iter()
        .find(|m| m.name == hybrid_name)
        .or_else(|| {
            CATALOG
                .iter()
                .filter(|m| m.is_electrified())
                .min_by_key(|m| (m.price - model.price).abs())
        })
        .unwrap_or(model)
}

/// Up to three models to suggest, the primary first.
pub fn suggestions(primary: &'static VehicleModel) -> Vec<&'static VehicleModel> {
    let mut out = vec![primary];
    for candidate in [electrified_alternative(primary), nearest_other_segment(primary)] {
        if !out.iter().any(|m| m.name == candidate.name) {
            out.push(candidate);
        }
    }
    if out.len() < 3
        && let Some(cheaper) = CATALOG
            .iter()
            .filter(|m| m.price < primary.price && !out.iter().any(|o| o.name == m.name))
            .max_by_key(|m| m.price)
    {
        out.push(cheaper);
    }
    out.truncate(3);
    out
}
