pub mod listing;
pub mod oauth2;
