pub mod fdc_client;

pub use fdc_client::FdcNutritionClient;
