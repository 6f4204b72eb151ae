use std::path::PathBuf;

const DB_FILE_NAME: &str = "ccgather.sqlite";

#[derive(Debug, Clone)]
pub struct DataDirResolution {
    pub dir: PathBuf,
    pub matched_existing: bool,
}

/// Resolves where the SQLite database lives: an explicit `CCGATHER_DATA_DIR`
/// wins, otherwise the XDG data directory.
pub fn resolve_data_dir() -> Result<DataDirResolution, String> {
    if let Ok(dir) = std::env::var("CCGATHER_DATA_DIR") {
        if !dir.is_empty() {
            let dir = PathBuf::from(dir);
            let matched_existing = dir.join(DB_FILE_NAME).exists();
            return Ok(DataDirResolution {
                dir,
                matched_existing,
            });
        }
    }

    let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
    let base = match std::env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => PathBuf::from(home).join(".local").join("share"),
    };
    let dir = base.join("ccgather");
    let matched_existing = dir.join(DB_FILE_NAME).exists();

    Ok(DataDirResolution {
        dir,
        matched_existing,
    })
}
