//! Ordered field extractors for payload values whose location has moved between
//! upstream schema versions. Each list is tried front to back; the first hit wins.

use serde_json::Value;

use crate::helpers::money::amount_from_json;
use crate::models::listing::ShippingType;

/// Shipping figure as found in the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingQuote {
    pub cost: f64,
    pub declared_type: Option<String>,
}

impl ShippingQuote {
    pub fn shipping_type(&self) -> ShippingType {
        match self.declared_type.as_deref() {
            Some("FREE") => ShippingType::Free,
            Some(_) => ShippingType::Calculated,
            None if self.cost == 0.0 => ShippingType::Free,
            None => ShippingType::Calculated,
        }
    }
}

pub type ShippingExtractor = fn(&Value) -> Option<ShippingQuote>;
pub type AmountExtractor = fn(&Value) -> Option<f64>;

pub const SHIPPING_EXTRACTORS: [ShippingExtractor; 3] = [
    first_shipping_option,
    top_level_shipping_cost,
    bare_shipping_option_cost,
];

pub const IMPORT_CHARGE_EXTRACTORS: [AmountExtractor; 2] = [import_charges_value, import_duty_amount];

/// `shippingOptions[0].shippingCost.value` + `shippingCostType`
fn first_shipping_option(payload: &Value) -> Option<ShippingQuote> {
    let option = payload.pointer("/shippingOptions/0")?;
    let cost = amount_from_json(option.pointer("/shippingCost/value")?)?;
    Some(ShippingQuote {
        cost,
        declared_type: declared_type(option),
    })
}

/// `shippingCost.value` at the top level
fn top_level_shipping_cost(payload: &Value) -> Option<ShippingQuote> {
    let cost = amount_from_json(payload.pointer("/shippingCost/value")?)?;
    Some(ShippingQuote {
        cost,
        declared_type: declared_type(payload),
    })
}

/// `shippingOptions[0].shippingCost` given as a bare amount
fn bare_shipping_option_cost(payload: &Value) -> Option<ShippingQuote> {
    let option = payload.pointer("/shippingOptions/0")?;
    let cost = amount_from_json(option.get("shippingCost")?)?;
    Some(ShippingQuote {
        cost,
        declared_type: declared_type(option),
    })
}

fn declared_type(node: &Value) -> Option<String> {
    node.get("shippingCostType")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

fn import_charges_value(payload: &Value) -> Option<f64> {
    amount_from_json(payload.pointer("/importCharges/value")?)
}

fn import_duty_amount(payload: &Value) -> Option<f64> {
    amount_from_json(payload.pointer("/importDuty/amount/value")?)
}

/// Shipping cost and type; `(0, UNKNOWN)` when no extractor matches.
pub fn extract_shipping(payload: &Value) -> (f64, ShippingType) {
    SHIPPING_EXTRACTORS
        .iter()
        .find_map(|extract| extract(payload))
        .map(|quote| (quote.cost, quote.shipping_type()))
        .unwrap_or((0.0, ShippingType::Unknown))
}

pub fn explicit_import_charges(payload: &Value) -> Option<f64> {
    IMPORT_CHARGE_EXTRACTORS.iter().find_map(|extract| extract(payload))
}
