use serde::{Serialize, Serializer};

use crate::helpers::money::round2;

/// Price components of a listing. The total is derived, never supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pricing {
    item_price: f64,
    shipping_cost: f64,
    import_charges: f64,
    sales_tax: f64,
    price: f64,
}

impl Pricing {
    pub fn new(item_price: f64, shipping_cost: f64, import_charges: f64, sales_tax: f64) -> Self {
        Self {
            item_price,
            shipping_cost,
            import_charges,
            sales_tax,
            price: round2(item_price + shipping_cost + import_charges + sales_tax),
        }
    }

    pub fn item_price(&self) -> f64 {
        self.item_price
    }

    pub fn shipping_cost(&self) -> f64 {
        self.shipping_cost
    }

    pub fn import_charges(&self) -> f64 {
        self.import_charges
    }

    pub fn sales_tax(&self) -> f64 {
        self.sales_tax
    }

    /// item + shipping + import + tax
    pub fn price(&self) -> f64 {
        self.price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingType {
    Free,
    Calculated,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingType {
    FixedPrice,
    Auction,
    Unknown,
    /// buying option this crate has no name for, kept verbatim
    Other(String),
}

impl ListingType {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "FIXED_PRICE" => ListingType::FixedPrice,
            "AUCTION" => ListingType::Auction,
            "" => ListingType::Unknown,
            other => ListingType::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ListingType::FixedPrice => "FIXED_PRICE",
            ListingType::Auction => "AUCTION",
            ListingType::Unknown => "UNKNOWN",
            ListingType::Other(raw) => raw,
        }
    }
}

impl Serialize for ListingType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalized listing, built once per fetch by the parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingData {
    pub item_id: String,
    pub category_id: String,
    pub pricing: Pricing,
    pub currency: String,
    pub title: String,
    pub description: String,
    pub condition: String,
    pub brand: String,
    pub images: Vec<String>,
    pub shipping_type: ShippingType,
    pub ship_from_country: String,
    pub returns_accepted: bool,
    pub return_period: String,
    pub return_policy_text: String,
    pub listing_type: ListingType,
    pub accepts_offers: bool,
    pub seller_name: String,
    pub seller_rating: Option<f64>,
}

impl ListingData {
    pub fn price(&self) -> f64 {
        self.pricing.price()
    }
}
