//! Two-layer LSTM regressor trained from scratch on each request.

pub mod adam;
pub mod config;
pub mod layers;
pub mod lstm;
pub mod network;
pub mod trainer;

pub use adam::Adam;
pub use config::ModelConfig;
pub use layers::Parameters;
pub use network::PriceNetwork;
pub use trainer::{Trainer, TrainingSummary};
