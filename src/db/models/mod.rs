pub mod asset;
pub mod payment;
pub mod reports;
pub mod requests;
pub mod user;
pub mod user_assets;

pub use asset::*;
pub use payment::*;
pub use reports::*;
pub use requests::*;
pub use user::*;
pub use user_assets::*;
