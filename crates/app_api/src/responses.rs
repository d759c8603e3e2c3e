use serde::Serialize;
use usage_app::SettingsSnapshot;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub settings: SettingsSnapshot,
    pub settings_path: String,
    pub app_data_dir: String,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}
