use serde_json::Value;
use tracing::debug;

use crate::config::settings::PricingConfig;
use crate::error::ParsingError;
use crate::helpers::money::{amount_from_json, round2};
use crate::models::listing::{ListingData, ListingType, Pricing};
use crate::parser::extractors::{explicit_import_charges, extract_shipping};
use crate::utils::constants::MAX_LISTING_IMAGES;

const DEFAULT_CURRENCY: &str = "USD";

/// Map a Browse API item document to [`ListingData`].
///
/// Only `itemId` and `title` are required. Every other field falls back to an
/// empty / `false` / UNKNOWN value. The total price is always recomputed from its
/// components, whatever the payload says.
pub fn parse_listing(payload: &Value, pricing: &PricingConfig) -> Result<ListingData, ParsingError> {
    if !payload.is_object() {
        return Err(ParsingError::MalformedPayload(format!(
            "expected a JSON object, got {}",
            json_kind(payload)
        )));
    }

    let item_id = item_id(payload).ok_or(ParsingError::MissingRequiredField("itemId"))?;
    let title = text(payload, "/title")
        .filter(|t| !t.trim().is_empty())
        .ok_or(ParsingError::MissingRequiredField("title"))?;

    let item_price = payload.pointer("/price/value").and_then(amount_from_json).unwrap_or(0.0);
    let (shipping_cost, shipping_type) = extract_shipping(payload);
    let ship_from_country = text(payload, "/itemLocation/country").unwrap_or_default();
    let import_charges = import_charges(payload, item_price, &ship_from_country, pricing);
    let sales_tax = round2(item_price * pricing.sales_tax_rate);

    let returns = ReturnTerms::from_payload(payload);
    let buying_options = buying_options(payload);

    debug!(
        item_id = %item_id,
        item_price, shipping_cost, import_charges, sales_tax,
        "listing parsed"
    );

    Ok(ListingData {
        item_id,
        category_id: text(payload, "/categoryId").unwrap_or_default(),
        pricing: Pricing::new(item_price, shipping_cost, import_charges, sales_tax),
        currency: text(payload, "/price/currency").unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
        title,
        description: text(payload, "/description")
            .or_else(|| text(payload, "/shortDescription"))
            .unwrap_or_default(),
        condition: text(payload, "/condition").unwrap_or_default(),
        brand: text(payload, "/brand")
            .or_else(|| text(payload, "/product/brand"))
            .unwrap_or_default(),
        images: images(payload),
        shipping_type,
        ship_from_country,
        returns_accepted: returns.accepted,
        return_period: returns.period,
        return_policy_text: returns.policy_text,
        listing_type: listing_type(&buying_options),
        accepts_offers: buying_options.iter().any(|o| *o == "BEST_OFFER"),
        seller_name: text(payload, "/seller/username").unwrap_or_default(),
        seller_rating: payload.pointer("/seller/feedbackPercentage").and_then(amount_from_json),
    })
}

/// `legacyItemId`, else the middle part of a `v1|<id>|<variation>` item id.
fn item_id(payload: &Value) -> Option<String> {
    text(payload, "/legacyItemId")
        .filter(|id| !id.is_empty())
        .or_else(|| {
            text(payload, "/itemId").map(|raw| {
                let legacy = raw.split('|').nth(1).map(str::to_owned);
                legacy.unwrap_or(raw)
            })
        })
        .filter(|id| !id.is_empty())
}

fn import_charges(payload: &Value, item_price: f64, ship_from_country: &str, pricing: &PricingConfig) -> f64 {
    if let Some(explicit) = explicit_import_charges(payload) {
        return explicit;
    }
    let cross_border = !ship_from_country.is_empty()
        && !ship_from_country.eq_ignore_ascii_case(&pricing.home_country);
    if cross_border {
        round2(item_price * pricing.import_charge_rate)
    } else {
        0.0
    }
}

fn images(payload: &Value) -> Vec<String> {
    let main = payload.pointer("/image/imageUrl").and_then(Value::as_str);
    let additional = payload
        .get("additionalImages")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|image| image.get("imageUrl").and_then(Value::as_str));

    main.into_iter()
        .chain(additional)
        .filter(|url| !url.is_empty())
        .take(MAX_LISTING_IMAGES)
        .map(str::to_owned)
        .collect()
}

fn buying_options(payload: &Value) -> Vec<&str> {
    payload
        .get("buyingOptions")
        .and_then(Value::as_array)
        .map(|options| options.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn listing_type(buying_options: &[&str]) -> ListingType {
    if buying_options.contains(&"AUCTION") {
        ListingType::Auction
    } else if buying_options.contains(&"FIXED_PRICE") {
        ListingType::FixedPrice
    } else {
        buying_options
            .iter()
            .find(|o| **o != "BEST_OFFER")
            .map(|o| ListingType::from_raw(o))
            .unwrap_or(ListingType::Unknown)
    }
}

struct ReturnTerms {
    accepted: bool,
    period: String,
    policy_text: String,
}

impl ReturnTerms {
    fn from_payload(payload: &Value) -> Self {
        let Some(terms) = payload.get("returnTerms").filter(|t| t.is_object()) else {
            return Self {
                accepted: false,
                period: String::new(),
                policy_text: String::new(),
            };
        };
        let accepted = terms.get("returnsAccepted").and_then(Value::as_bool).unwrap_or(false);
        let period = terms.get("returnPeriod").map(format_return_period).unwrap_or_default();
        let policy_text = match (accepted, period.is_empty()) {
            (true, false) => format!("Returns accepted ({})", period),
            (true, true) => "Returns accepted".to_owned(),
            (false, _) => "No returns".to_owned(),
        };
        Self { accepted, period, policy_text }
    }
}

/// `{"value": 30, "unit": "DAY"}` -> `30 days`
fn format_return_period(period: &Value) -> String {
    let Some(value) = period.get("value").and_then(amount_from_json) else {
        return String::new();
    };
    let mut unit = period
        .get("unit")
        .and_then(Value::as_str)
        .unwrap_or("days")
        .trim()
        .to_lowercase();
    if value != 1.0 && !unit.ends_with('s') {
        unit.push('s');
    }
    if value.fract() == 0.0 {
        format!("{} {}", value as i64, unit)
    } else {
        format!("{} {}", value, unit)
    }
}

/// String at `pointer`; numbers are rendered, everything else is absent.
fn text(payload: &Value, pointer: &str) -> Option<String> {
    match payload.pointer(pointer)? {
        Value::String(s) => Some(s.to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
