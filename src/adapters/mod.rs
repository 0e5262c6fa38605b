//! Concrete adapter implementations for ports.

pub mod console_alert_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod ini_snapshot_adapter;
