use crate::domain::{config::CmdlogConfig, error::{CmdlogError, CmdlogResult}};
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

/// Configuration manager
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> Self {
        Self {
            global_config_path: Self::get_global_config_path(),
            project_config_path: Self::find_project_config_path(),
        }
    }

    /// Manager rooted at explicit paths, bypassing discovery
    pub fn with_paths(global: Option<PathBuf>, project: Option<PathBuf>) -> Self {
        Self {
            global_config_path: global,
            project_config_path: project,
        }
    }

    /// Load configuration from files
    ///
    /// Defaults, then the global file, then the project file; later layers
    /// override individual keys of earlier ones.
    pub fn load_config(&self) -> CmdlogResult<CmdlogConfig> {
        let mut merged = Table::new();

        for path in [&self.global_config_path, &self.project_config_path]
            .into_iter()
            .flatten()
        {
            if path.exists() {
                let layer = self.read_table(path)?;
                merge_tables(&mut merged, layer);
            }
        }

        let config: CmdlogConfig =
            Value::Table(merged).try_into().map_err(|e| CmdlogError::Config {
                message: format!("Invalid configuration: {}", e),
            })?;
        config.reporter.validate()?;
        Ok(config)
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> CmdlogResult<CmdlogConfig> {
        let content = fs::read_to_string(path).map_err(|e| CmdlogError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: CmdlogConfig = toml::from_str(&content).map_err(|e| CmdlogError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;
        config.reporter.validate()?;
        Ok(config)
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &CmdlogConfig) -> CmdlogResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| CmdlogError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CmdlogError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        fs::write(path, content).map_err(|e| CmdlogError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Create default project configuration, returning the file written
    pub fn init_project_config(&self, path: &Path) -> CmdlogResult<PathBuf> {
        let config_file = path.join(".cmdlog").join("config.toml");

        if config_file.exists() {
            return Err(CmdlogError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        self.save_config_to_path(&config_file, &CmdlogConfig::default())?;
        Ok(config_file)
    }

    fn read_table(&self, path: &Path) -> CmdlogResult<Table> {
        let content = fs::read_to_string(path).map_err(|e| CmdlogError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        content.parse::<Table>().map_err(|e| CmdlogError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    fn get_global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("cmdlog").join("config.toml"))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(".cmdlog").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match value {
            Value::Table(incoming) => match base.get_mut(&key) {
                Some(Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}
