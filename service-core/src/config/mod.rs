use crate::error::AppError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable prefix shared by every crate's settings.
pub const ENV_PREFIX: &str = "APP";

/// Locate `<crate>/config`, whether we run from the workspace root or the crate itself.
pub fn configuration_directory(crate_dir: &str) -> Result<PathBuf, AppError> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with(crate_dir) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(crate_dir).join("config"))
    }
}

/// Load settings from `base.yaml` in `directory`, overridden by `APP_`-prefixed
/// environment variables (`APP_BRIDGE__EXTENSION_ID` sets `bridge.extension_id`).
///
/// The file is optional; every field the caller needs must then have a serde default.
pub fn load_settings<T: DeserializeOwned>(directory: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .add_source(config::File::from(directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        api: SampleApi,
    }

    #[derive(Debug, Deserialize)]
    struct SampleApi {
        base_url: String,
        #[serde(default = "default_retries")]
        retries: u32,
    }

    fn default_retries() -> u32 {
        1
    }

    #[test]
    fn test_load_from_base_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.yaml"),
            "api:\n  base_url: http://api.test\n",
        )
        .unwrap();

        let settings: Sample = load_settings(dir.path()).unwrap();
        assert_eq!(settings.api.base_url, "http://api.test");
        assert_eq!(settings.api.retries, 1);
    }

    #[test]
    fn test_missing_required_field_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.yaml"), "api: {}\n").unwrap();

        let result: Result<Sample, _> = load_settings(dir.path());
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
