//! Write configuration validation.
//! Pure checks over a WriteConfig; nothing here touches the filesystem, so it
//! runs before any lock or file is created.

use tracing::debug;

use super::types::WriteConfig;
use crate::errors::{OpenzError, Result};

impl WriteConfig {
    /// Reject option combinations that cannot be honored together.
    ///
    /// Staging to a temporary name and renaming onto the target replaces
    /// unconditionally, so it cannot give a create-exclusive guarantee at the
    /// final path.
    pub fn validate(&self) -> Result<()> {
        if self.atomic && self.exclusive {
            return Err(OpenzError::Configuration(
                "atomic write and exclusive create cannot be combined".into(),
            ));
        }
        if self.backup_on_fault && !self.backup {
            debug!("backup_on_fault has no effect without backup");
        }
        Ok(())
    }
}
