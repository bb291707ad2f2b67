pub mod dashboard;
pub mod options;

pub use dashboard::{AggregateSnapshot, ChartHandle, ChartId, Dashboard, PageSettings, Surface};
