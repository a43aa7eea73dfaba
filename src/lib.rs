//! Medical Cost Predictor
//!
//! Web application around a pre-trained gradient-boosted regression model:
//! - `bmi` / `features`: pure input encoding (BMI + one-hot feature vector)
//! - `model`: serialized tree-ensemble artifact, loaded once at startup
//! - `data` / `dashboard`: Polars CSV loading and descriptive statistics
//! - `server` / `web`: Axum router, JSON API and Askama HTML pages

pub mod bmi;
pub mod dashboard;
pub mod data;
pub mod features;
pub mod model;
pub mod server;
pub mod web;

// Re-export commonly used types
pub use bmi::calculate_bmi;
pub use dashboard::Dashboard;
pub use features::{build_features, FeatureVector, PatientInput, Region, Sex, Smoker, BASELINE_REGION};
pub use model::{ChargesModel, ModelError};
pub use server::{create_router, AppState};
