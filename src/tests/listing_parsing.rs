#[cfg(test)]
mod test {

use serde_json::{json, Value};

use crate::config::settings::PricingConfig;
use crate::error::ParsingError;
use crate::models::listing::{ListingType, ShippingType};
use crate::parser::extractors::{explicit_import_charges, extract_shipping};
use crate::parser::item_url::extract_item_id;
use crate::parser::listing_parser::parse_listing;

fn minimal(extra: Value) -> Value {
    let mut payload = json!({
        "legacyItemId": "111",
        "title": "Widget",
        "price": {"value": "50.00", "currency": "USD"}
    });
    if let (Some(base), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    payload
}

fn pricing(sales_tax_rate: f64) -> PricingConfig {
    PricingConfig {
        sales_tax_rate,
        ..PricingConfig::default()
    }
}

// -------------------------------
// item url
// -------------------------------

#[test]
fn item_id_from_listing_urls() {
    assert_eq!(extract_item_id("https://www.ebay.com/itm/123456789012").unwrap(), "123456789012");
    assert_eq!(
        extract_item_id("https://www.ebay.com/itm/some-title-slug/123456789012?var=0&hash=x").unwrap(),
        "123456789012"
    );
    assert_eq!(extract_item_id("https://www.ebay.co.uk/itm/987654321/").unwrap(), "987654321");
    assert_eq!(
        extract_item_id("https://www.ebay.com/viewitem?item=555666777&cmd=ViewItem").unwrap(),
        "555666777"
    );
}

#[test]
fn urls_without_an_item_id_are_invalid() {
    for url in [
        "https://www.ebay.com/sch/i.html?_nkw=widget",
        "https://www.ebay.com/itm/only-a-slug",
        "https://www.ebay.com/viewitem?item=abc",
        "not a url",
        "",
    ] {
        assert!(
            matches!(extract_item_id(url), Err(ParsingError::InvalidUrl(_))),
            "'{url}' should be rejected"
        );
    }
}

// -------------------------------
// extractors
// -------------------------------

#[test]
fn shipping_from_any_known_location() {
    let first_option = json!({"shippingOptions": [{"shippingCostType": "CALCULATED", "shippingCost": {"value": "7.25"}}]});
    assert_eq!(extract_shipping(&first_option), (7.25, ShippingType::Calculated));

    let top_level = json!({"shippingCost": {"value": 4.0}});
    assert_eq!(extract_shipping(&top_level), (4.0, ShippingType::Calculated));

    let bare = json!({"shippingOptions": [{"shippingCost": "3.10"}]});
    assert_eq!(extract_shipping(&bare), (3.1, ShippingType::Calculated));

    let free = json!({"shippingOptions": [{"shippingCostType": "FREE", "shippingCost": {"value": "0.00"}}]});
    assert_eq!(extract_shipping(&free), (0.0, ShippingType::Free));

    let zero_untyped = json!({"shippingCost": {"value": "0"}});
    assert_eq!(extract_shipping(&zero_untyped), (0.0, ShippingType::Free));
}

#[test]
fn missing_shipping_is_unknown_not_free() {
    assert_eq!(extract_shipping(&json!({})), (0.0, ShippingType::Unknown));
    assert_eq!(extract_shipping(&json!({"shippingOptions": []})), (0.0, ShippingType::Unknown));
}

#[test]
fn explicit_import_charge_locations() {
    assert_eq!(explicit_import_charges(&json!({"importCharges": {"value": "8.40"}})), Some(8.4));
    assert_eq!(explicit_import_charges(&json!({"importDuty": {"amount": {"value": 3}}})), Some(3.0));
    assert_eq!(explicit_import_charges(&json!({"importCharges": {"value": "n/a"}})), None);
}

// -------------------------------
// parse_listing
// -------------------------------

#[test]
fn domestic_item_has_no_import_charges() {
    let payload = minimal(json!({"itemLocation": {"country": "US"}}));
    let listing = parse_listing(&payload, &pricing(0.0)).unwrap();

    assert_eq!(listing.pricing.import_charges(), 0.0);
    assert_eq!(listing.ship_from_country, "US");
    assert_eq!(listing.shipping_type, ShippingType::Unknown);
    assert_eq!(listing.price(), 50.0);
}

#[test]
fn cross_border_item_gets_estimated_import_charges() {
    let payload = minimal(json!({
        "itemLocation": {"country": "JP"},
        "shippingOptions": [{"shippingCostType": "FIXED", "shippingCost": {"value": "20.00"}}]
    }));
    let listing = parse_listing(&payload, &pricing(0.0)).unwrap();

    // 10% of the item price only
    assert_eq!(listing.pricing.import_charges(), 5.0);
    assert_eq!(listing.price(), 75.0);
}

#[test]
fn explicit_import_charges_win_over_the_estimate() {
    let payload = minimal(json!({
        "itemLocation": {"country": "GB"},
        "importCharges": {"value": "12.34"}
    }));
    let listing = parse_listing(&payload, &pricing(0.0)).unwrap();

    assert_eq!(listing.pricing.import_charges(), 12.34);
}

#[test]
fn unknown_origin_has_no_import_estimate() {
    let listing = parse_listing(&minimal(json!({})), &pricing(0.0)).unwrap();
    assert_eq!(listing.pricing.import_charges(), 0.0);
    assert_eq!(listing.ship_from_country, "");
}

#[test]
fn total_is_the_rounded_sum_of_components() {
    let payload = json!({
        "legacyItemId": "222",
        "title": "Odd cents",
        "price": {"value": "19.99"},
        "shippingOptions": [{"shippingCost": {"value": "5.01"}}],
        "itemLocation": {"country": "DE"}
    });
    let listing = parse_listing(&payload, &pricing(0.0825)).unwrap();
    let p = listing.pricing;

    assert_eq!(p.sales_tax(), 1.65);
    assert_eq!(p.import_charges(), 2.0);
    assert_eq!(p.price(), 28.65);
    let sum = p.item_price() + p.shipping_cost() + p.import_charges() + p.sales_tax();
    assert!((p.price() - sum).abs() <= 0.005);
}

#[test]
fn item_id_falls_back_to_the_rest_id() {
    let payload = json!({"itemId": "v1|333444555|0", "title": "Fallback"});
    let listing = parse_listing(&payload, &pricing(0.0)).unwrap();

    assert_eq!(listing.item_id, "333444555");
    assert_eq!(listing.pricing.item_price(), 0.0);
    assert_eq!(listing.currency, "USD");
}

#[test]
fn required_fields_are_enforced() {
    let no_id = json!({"title": "Nameless"});
    assert!(matches!(
        parse_listing(&no_id, &pricing(0.0)),
        Err(ParsingError::MissingRequiredField("itemId"))
    ));

    let blank_title = json!({"legacyItemId": "1", "title": "   "});
    assert!(matches!(
        parse_listing(&blank_title, &pricing(0.0)),
        Err(ParsingError::MissingRequiredField("title"))
    ));

    assert!(matches!(
        parse_listing(&json!([1, 2, 3]), &pricing(0.0)),
        Err(ParsingError::MalformedPayload(_))
    ));
}

#[test]
fn optional_fields_default_to_empty() {
    let listing = parse_listing(&minimal(json!({})), &pricing(0.0)).unwrap();

    assert_eq!(listing.category_id, "");
    assert_eq!(listing.description, "");
    assert_eq!(listing.brand, "");
    assert!(listing.images.is_empty());
    assert!(!listing.returns_accepted);
    assert_eq!(listing.return_policy_text, "");
    assert_eq!(listing.listing_type, ListingType::Unknown);
    assert!(!listing.accepts_offers);
    assert_eq!(listing.seller_name, "");
    assert_eq!(listing.seller_rating, None);
}

#[test]
fn return_terms_are_summarized() {
    let accepted = minimal(json!({"returnTerms": {"returnsAccepted": true, "returnPeriod": {"value": 30, "unit": "DAY"}}}));
    let listing = parse_listing(&accepted, &pricing(0.0)).unwrap();
    assert!(listing.returns_accepted);
    assert_eq!(listing.return_period, "30 days");
    assert_eq!(listing.return_policy_text, "Returns accepted (30 days)");

    let no_period = minimal(json!({"returnTerms": {"returnsAccepted": true}}));
    let listing = parse_listing(&no_period, &pricing(0.0)).unwrap();
    assert_eq!(listing.return_policy_text, "Returns accepted");

    let refused = minimal(json!({"returnTerms": {"returnsAccepted": false}}));
    let listing = parse_listing(&refused, &pricing(0.0)).unwrap();
    assert!(!listing.returns_accepted);
    assert_eq!(listing.return_policy_text, "No returns");
}

#[test]
fn images_are_capped() {
    let additional: Vec<Value> = (0..40)
        .map(|i| json!({"imageUrl": format!("https://i.ebayimg.com/{}.jpg", i)}))
        .collect();
    let payload = minimal(json!({
        "image": {"imageUrl": "https://i.ebayimg.com/main.jpg"},
        "additionalImages": additional
    }));
    let listing = parse_listing(&payload, &pricing(0.0)).unwrap();

    assert_eq!(listing.images.len(), 24);
    assert_eq!(listing.images[0], "https://i.ebayimg.com/main.jpg");
    assert_eq!(listing.images[1], "https://i.ebayimg.com/0.jpg");
}

#[test]
fn buying_options_map_to_listing_type_and_offers() {
    let auction = minimal(json!({"buyingOptions": ["AUCTION", "FIXED_PRICE"]}));
    let listing = parse_listing(&auction, &pricing(0.0)).unwrap();
    assert_eq!(listing.listing_type, ListingType::Auction);
    assert!(!listing.accepts_offers);

    let offers = minimal(json!({"buyingOptions": ["BEST_OFFER", "FIXED_PRICE"]}));
    let listing = parse_listing(&offers, &pricing(0.0)).unwrap();
    assert_eq!(listing.listing_type, ListingType::FixedPrice);
    assert!(listing.accepts_offers);

    let classified = minimal(json!({"buyingOptions": ["CLASSIFIED_AD"]}));
    let listing = parse_listing(&classified, &pricing(0.0)).unwrap();
    assert_eq!(listing.listing_type, ListingType::Other("CLASSIFIED_AD".to_owned()));
}

#[test]
fn listing_serializes_with_derived_price() {
    let payload = minimal(json!({"shippingOptions": [{"shippingCostType": "FREE", "shippingCost": {"value": "0"}}]}));
    let listing = parse_listing(&payload, &pricing(0.0)).unwrap();
    let value = serde_json::to_value(&listing).unwrap();

    assert_eq!(value["pricing"]["price"], json!(50.0));
    assert_eq!(value["shipping_type"], json!("FREE"));
    assert_eq!(value["listing_type"], json!("UNKNOWN"));
}

}
