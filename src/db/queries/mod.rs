pub mod asset;
pub mod payment;
pub mod reports;
pub mod requests;
pub mod user;
pub mod user_assets;
