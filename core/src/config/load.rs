use anyhow::Context;
use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default data directory: ~/.pagestate
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".pagestate"))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    toml::from_str::<AppConfig>(&s).with_context(|| format!("Failed to parse config {:?}", path))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.pagestate/config.toml
    let data_dir = get_data_dir()?;
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml
    let local_config = Path::new("config.toml");

    let mut cfg = if user_config.exists() {
        load_from_path(&user_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    if cfg
        .storage
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        cfg.storage.directory = Some(data_dir.join("storage").to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg, |name| std::env::var(name).ok());
    Ok(cfg)
}

/// Environment variable overrides (highest priority).
pub fn apply_env_overrides(cfg: &mut AppConfig, var: impl Fn(&str) -> Option<String>) {
    let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("PAGESTATE_STORAGE_DIR") {
        cfg.storage.directory = Some(v);
    }
    if let Some(v) = get("PAGESTATE_PAGE_SIZE") {
        match v.trim().parse::<u32>() {
            Ok(n) if n > 0 => cfg.pagination.page_size = n,
            _ => tracing::warn!("ignoring invalid PAGESTATE_PAGE_SIZE={v}"),
        }
    }
    if let Some(v) = get("PAGESTATE_DEBOUNCE_MS") {
        match v.trim().parse::<u64>() {
            Ok(n) => cfg.dispatch.debounce_ms = n,
            Err(_) => tracing::warn!("ignoring invalid PAGESTATE_DEBOUNCE_MS={v}"),
        }
    }
    if let Some(v) = get("PAGESTATE_REMOTE") {
        cfg.sources.remote = v.eq_ignore_ascii_case("true") || v == "1";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn env_overrides_apply_and_bad_values_are_ignored() {
        let env: HashMap<&str, &str> = [
            ("PAGESTATE_STORAGE_DIR", "/tmp/ps"),
            ("PAGESTATE_PAGE_SIZE", "zero"),
            ("PAGESTATE_DEBOUNCE_MS", "150"),
            ("PAGESTATE_REMOTE", "TRUE"),
        ]
        .into_iter()
        .collect();
        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.storage.directory.as_deref(), Some("/tmp/ps"));
        assert_eq!(cfg.pagination.page_size, 12);
        assert_eq!(cfg.dispatch.debounce_ms, 150);
        assert!(cfg.sources.remote);
    }

    #[test]
    fn load_from_path_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pagination]\npage_size = \"many\"\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));

        std::fs::write(&path, "[pagination]\npage_size = 4\n").unwrap();
        assert_eq!(load_from_path(&path).unwrap().pagination.page_size, 4);
    }
}
