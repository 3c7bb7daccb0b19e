//! Configuration system for skims.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod analysis_config;
pub mod scan_config;
pub mod skims_config;

pub use analysis_config::AnalysisConfig;
pub use scan_config::ScanConfig;
pub use skims_config::{CliOverrides, SkimsConfig};
