use std::env;
use std::path::PathBuf;

/// Location of the client state file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub state_path: PathBuf,
}

impl StoreConfig {
    pub const ENV_VAR: &str = "WAYMARK_STATE_PATH";
    pub const FILE_NAME: &str = "state.json";

    /// `WAYMARK_STATE_PATH`, then `configured` (from a config file), then
    /// `$XDG_DATA_HOME/waymark/state.json` or `~/.local/share/waymark/state.json`.
    pub fn resolve(configured: Option<PathBuf>) -> Self {
        let state_path = env::var(Self::ENV_VAR)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .or(configured)
            .unwrap_or_else(Self::default_path);
        Self { state_path }
    }

    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
        }
    }

    /// XDG data location. Like the config file, this ignores the
    /// platform-specific `dirs::data_dir()`.
    pub fn default_path() -> PathBuf {
        let base = match env::var("XDG_DATA_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
            _ => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share"),
        };
        base.join("waymark").join(Self::FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_is_kept() {
        let cfg = StoreConfig::new("/tmp/w/state.json");
        assert_eq!(cfg.state_path, PathBuf::from("/tmp/w/state.json"));
    }

    #[test]
    fn env_var_beats_configured_path() {
        let original = env::var(StoreConfig::ENV_VAR).ok();

        unsafe { env::remove_var(StoreConfig::ENV_VAR) };
        let cfg = StoreConfig::resolve(Some(PathBuf::from("/srv/waymark.json")));
        assert_eq!(cfg.state_path, PathBuf::from("/srv/waymark.json"));

        unsafe { env::set_var(StoreConfig::ENV_VAR, "/tmp/from-env.json") };
        let cfg = StoreConfig::resolve(Some(PathBuf::from("/srv/waymark.json")));
        assert_eq!(cfg.state_path, PathBuf::from("/tmp/from-env.json"));

        unsafe { env::set_var(StoreConfig::ENV_VAR, "  ") };
        let cfg = StoreConfig::resolve(None);
        assert_eq!(cfg.state_path, StoreConfig::default_path());

        match original {
            Some(v) => unsafe { env::set_var(StoreConfig::ENV_VAR, v) },
            None => unsafe { env::remove_var(StoreConfig::ENV_VAR) },
        }
    }

    #[test]
    fn default_path_ends_with_waymark_state() {
        let path = StoreConfig::default_path();
        assert!(path.ends_with("waymark/state.json"), "got {}", path.display());
    }
}
