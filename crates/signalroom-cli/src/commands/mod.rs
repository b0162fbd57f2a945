pub mod brief;
pub mod config;
pub mod coverage;
pub mod modes;
