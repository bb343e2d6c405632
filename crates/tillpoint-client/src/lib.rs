pub mod error;
pub mod products;

pub use error::ClientError;
pub use products::{ImageUpload, ProductsClient};
