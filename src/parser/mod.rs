pub mod extractors;
pub mod item_url;
pub mod listing_parser;
