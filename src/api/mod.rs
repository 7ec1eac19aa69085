pub mod asset;
pub mod auth;
pub mod health;
pub mod payment;
pub mod reports;
pub mod requests;
pub mod user;
pub mod user_assets;
