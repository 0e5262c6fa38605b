//! Engine state persistence port trait.

use crate::domain::error::ConfluenceError;
use crate::domain::snapshot::EngineSnapshot;

pub trait SnapshotPort {
    fn save(&self, snapshot: &EngineSnapshot) -> Result<(), ConfluenceError>;

    /// `Ok(None)` when no snapshot has been saved yet.
    fn load(&self) -> Result<Option<EngineSnapshot>, ConfluenceError>;
}
