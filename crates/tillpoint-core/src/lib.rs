pub mod app_config;
pub mod config;
pub mod customer;
pub mod money;
pub mod product;
pub mod sale;
pub mod units;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use customer::Customer;
pub use product::{NewProduct, Product, ProductPatch};
pub use sale::{tax_rate, PaymentMethod, SaleTotals};
