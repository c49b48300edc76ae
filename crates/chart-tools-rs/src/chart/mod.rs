pub mod normalize;
pub mod resolve;
pub mod types;

pub use normalize::normalize;
pub use resolve::{ChartResolver, Resolution};
pub use types::{ChartConfig, ChartData, ChartType, DataPoint, Dataset, Label};
