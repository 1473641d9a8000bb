pub mod config;
mod responses;
pub mod jwt_auth;
pub mod razorpay;
mod telemetry;
pub mod utils;

pub use self::config::AppConfig;
pub use responses::*;
pub use telemetry::*;
pub use utils::*;
