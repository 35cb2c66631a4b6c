pub mod market_data;
pub mod news;
pub mod sentiment;
pub mod yahoo;

pub use market_data::*;
pub use news::*;
pub use yahoo::*;
