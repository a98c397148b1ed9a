use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

/// A structure to hold environment settings. Backed by the settings.json file
/// in the current directory (or its parent, when run from `plugins/`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Configs {
    pub verbose_mode: bool,
    pub working_directory: String,
    pub max_procs: isize,
}

impl Default for Configs {
    fn default() -> Configs {
        Configs {
            verbose_mode: true,
            working_directory: String::new(),
            max_procs: -1,
        }
    }
}

impl Configs {
    pub fn new() -> Configs {
        Configs::default()
    }

    /// Resolves a file name against the working directory. Names that already
    /// carry a directory component are returned unchanged.
    pub fn resolve_path(&self, file_name: &str) -> PathBuf {
        let path = Path::new(file_name);
        if self.working_directory.is_empty() || path.components().count() > 1 {
            return path.to_path_buf();
        }
        Path::new(&self.working_directory).join(path)
    }
}

fn settings_file() -> Result<PathBuf, Error> {
    let mut dir = std::env::current_dir()?;
    if dir.ends_with("plugins") {
        dir.pop();
    }
    Ok(dir.join("settings.json"))
}

/// Reads the settings file. A missing file yields the defaults; a file that
/// exists but cannot be parsed is an error.
pub fn get_configs() -> Result<Configs, Error> {
    read_configs(&settings_file()?)
}

pub fn read_configs(config_file: &Path) -> Result<Configs, Error> {
    match fs::read_to_string(config_file) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Failed to parse {}: {}", config_file.display(), e),
            )
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Configs::new()),
        Err(e) => Err(e),
    }
}
