//! Port traits: the seams between the engine and the outside world.

pub mod alert_port;
pub mod config_port;
pub mod data_port;
pub mod snapshot_port;
