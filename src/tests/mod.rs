#[cfg(test)]
pub mod common;

mod listing_parsing;
