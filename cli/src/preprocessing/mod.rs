//! Scaling and sliding-window sample construction for the price series.

mod scaler;
mod window;

pub use scaler::MinMaxScaler;
pub use window::{last_window, WindowedDataset, WINDOW_SIZE};
