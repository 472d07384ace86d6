pub mod credential_store;
pub mod env_file;
