//! Alert sink port trait.

use crate::domain::alert::Alert;
use crate::domain::error::ConfluenceError;

pub trait AlertPort {
    fn send(&mut self, alert: &Alert) -> Result<(), ConfluenceError>;
}
