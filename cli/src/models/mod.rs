pub mod news;
pub mod prediction;
pub mod price;
pub mod report;
pub mod ticker;

pub use news::*;
pub use prediction::*;
pub use price::*;
pub use report::*;
pub use ticker::*;
