use std::path::PathBuf;

use crate::Result;

pub const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Clone, Debug)]
pub struct AppPaths {
    pub app_data_dir: PathBuf,
    pub settings_path: PathBuf,
}

impl AppPaths {
    pub fn new(app_data_dir: PathBuf) -> Self {
        let settings_path = app_data_dir.join(SETTINGS_FILE_NAME);
        Self {
            app_data_dir,
            settings_path,
        }
    }
}

pub fn ensure_app_data_dir(paths: &AppPaths) -> Result<()> {
    std::fs::create_dir_all(&paths.app_data_dir)?;
    Ok(())
}
