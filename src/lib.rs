pub mod aggregate;
pub mod chart;
pub mod config;
pub mod fetch;
pub mod process;
pub mod record;
