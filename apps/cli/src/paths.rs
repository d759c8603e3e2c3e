use std::path::PathBuf;

use crate::config::APP_DIR_NAME;

pub fn resolve_data_dir() -> Result<PathBuf, String> {
    let base = dirs::data_dir().ok_or_else(|| "resolve data dir: no home directory".to_string())?;
    Ok(base.join(APP_DIR_NAME))
}
