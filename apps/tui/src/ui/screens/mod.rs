pub mod analysis;
pub mod clusters;
pub mod datasets;
pub mod metrics;
pub mod params;
