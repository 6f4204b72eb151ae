use crate::error::Result;
use crate::services::{SharedConfig, load_streak_anchor, open_db};
use gather_core::StreakAnchor;
use gather_db::Db;

pub const STREAK_ANCHOR_KEY: &str = "streak_anchor";

/// Snapshot of operator-configurable settings stored in the DB.
#[derive(Debug, Clone)]
pub struct SettingsSnapshot {
    pub streak_anchor: StreakAnchor,
    pub db_path: String,
}

#[derive(Clone)]
pub struct SettingsService {
    config: SharedConfig,
}

impl SettingsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn get(&self) -> Result<SettingsSnapshot> {
        let db = self.db()?;
        Ok(SettingsSnapshot {
            streak_anchor: load_streak_anchor(&db)?,
            db_path: self.config.db_path.to_string_lossy().to_string(),
        })
    }

    pub fn set_streak_anchor(&self, anchor: StreakAnchor) -> Result<()> {
        let db = self.db()?;
        db.set_setting(STREAK_ANCHOR_KEY, anchor.as_str())?;
        Ok(())
    }
}
