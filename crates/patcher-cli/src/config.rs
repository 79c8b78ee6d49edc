//! Configuration file loading
//!
//! `config.json` maps game names to their install and backup directories:
//!
//! ```json
//! {
//!   "games": {
//!     "skyrim": {
//!       "target": "~/games/skyrim",
//!       "backup": "~/.local/share/patcher/skyrim"
//!     }
//!   }
//! }
//! ```
//!
//! Paths starting with `~/` are expanded against the home directory. The
//! loaded entry is validated here; the engine never sees raw config.

use patcher_core::GameEntry;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

/// File name of the configuration document inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    games: BTreeMap<String, GameConfig>,
}

#[derive(Debug, Deserialize)]
struct GameConfig {
    target: String,
    backup: String,
}

/// Load the entry for one game from `config.json`.
pub fn load_game(config_dir: &Path, game: &str) -> Result<GameEntry> {
    let path = config_dir.join(CONFIG_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CliError::user(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let config: ConfigFile = serde_json::from_str(&content).map_err(|e| {
        CliError::user(format!("Invalid config at {}: {e}", path.display()))
    })?;

    let game_config = config.games.get(game).ok_or_else(|| {
        CliError::user(format!("Game '{game}' not found in config"))
    })?;

    Ok(GameEntry::new(
        game,
        expand_home(&game_config.target),
        expand_home(&game_config.backup),
    ))
}

/// Directory holding the patch files for one game.
pub fn patches_dir(config_dir: &Path, game: &str) -> PathBuf {
    config_dir.join("patches").join(game)
}

/// Expand a leading `~/` against the home directory.
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) {
        fs::write(dir.join(CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn load_game_resolves_paths() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"{"games": {"demo": {"target": "/games/demo", "backup": "/backups/demo"}}}"#,
        );

        let entry = load_game(tmp.path(), "demo").unwrap();
        assert_eq!(entry.name, "demo");
        assert_eq!(entry.target, PathBuf::from("/games/demo"));
        assert_eq!(entry.backup, PathBuf::from("/backups/demo"));
    }

    #[test]
    fn unknown_game_is_a_user_error() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), r#"{"games": {}}"#);

        let err = load_game(tmp.path(), "nope").unwrap_err();
        assert!(err.to_string().contains("not found in config"));
    }

    #[test]
    fn missing_config_file_is_a_user_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_game(tmp.path(), "demo").unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn invalid_json_is_a_user_error() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "{broken");

        let err = load_game(tmp.path(), "demo").unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }

    #[test]
    fn tilde_paths_expand_against_home() {
        let expanded = expand_home("~/games/demo");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("games/demo"));
        }
    }

    #[test]
    fn patches_dir_is_per_game() {
        assert_eq!(
            patches_dir(Path::new("/cfg"), "demo"),
            PathBuf::from("/cfg/patches/demo")
        );
    }
}
