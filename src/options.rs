//! Configuration for gistsel, persisted as `config.toml`.
//!
//! A [`Config`] is an explicit value handed to every component that needs it.
//! [`Config::load_or_init`] bootstraps a file with defaults on first use and
//! [`ConfigBuilder`] builds one programmatically.

use crate::error::GistError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://gist.github.com";
pub const DEFAULT_API_URL: &str = "https://api.github.com/";
pub const DEFAULT_SELECT_CMD: &str = "fzf-tmux --multi:fzf --multi:peco";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub core: CoreConfig,
    pub gist: GistConfig,
    pub flag: FlagConfig,
    pub screen: ScreenConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub editor: String,
    /// Colon-separated selector commands, tried in order.
    pub selectcmd: String,
    pub tomlfile: PathBuf,
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GistConfig {
    pub token: String,
    pub base_url: String,
    pub api_url: String,
    /// Root of the local mirrors, one directory per gist.
    pub dir: PathBuf,
    pub use_cache: bool,
    /// Cache lifetime in seconds.
    pub cache_ttl: u64,
    pub runnable_ext: Vec<String>,
    pub shell: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagConfig {
    pub starred: bool,
    #[serde(skip)]
    pub no_select: bool,
    #[serde(skip)]
    pub refresh: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub columns: Vec<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            editor: std::env::var("EDITOR")
                .ok()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "vim".to_string()),
            selectcmd: DEFAULT_SELECT_CMD.to_string(),
            tomlfile: PathBuf::new(),
            user: std::env::var("USER").unwrap_or_default(),
        }
    }
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            token: std::env::var("GITHUB_TOKEN").unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            dir: default_dir().join("files"),
            use_cache: true,
            cache_ttl: DEFAULT_CACHE_TTL_SECS,
            runnable_ext: ["sh", "rb", "py", "pl", "php"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            shell: "sh".to_string(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            columns: vec![
                "{{.ShortID}}".to_string(),
                "{{.PrivateMark}} {{.Filename}}".to_string(),
                "{{.Description}}".to_string(),
            ],
        }
    }
}

/// Returns the platform config directory for gistsel without creating it.
pub fn default_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("gistsel")
}

/// Returns the default config file path, creating its directory.
pub fn default_config_path() -> Result<PathBuf, GistError> {
    let dir = default_dir();
    fs::create_dir_all(&dir).map_err(|e| GistError::io(&dir, e))?;
    Ok(dir.join("config.toml"))
}

impl Config {
    /// Loads `path`, or writes a default config there if it does not exist yet.
    ///
    /// A freshly written config keeps its mirrors in a `files` directory next
    /// to the config file.
    pub fn load_or_init(path: &Path) -> Result<Self, GistError> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| GistError::io(path, e))?;
            let mut config: Config = toml::from_str(&content)?;
            if config.core.tomlfile.as_os_str().is_empty() {
                config.core.tomlfile = path.to_path_buf();
            }
            #[cfg(feature = "logging")]
            tracing::debug!("Loaded config from {}", path.display());
            return Ok(config);
        }

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let mut config = Config::default();
        config.core.tomlfile = path.to_path_buf();
        config.gist.dir = parent.join("files");
        fs::create_dir_all(&config.gist.dir).map_err(|e| GistError::io(&config.gist.dir, e))?;
        config.save(path)?;
        #[cfg(feature = "logging")]
        tracing::debug!("Wrote default config to {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), GistError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| GistError::io(path, e))
    }

    /// Validates the parts of the config that item conversion depends on.
    pub fn settings(&self) -> Result<Settings, GistError> {
        Settings::new(&self.gist.base_url, &self.gist.dir)
    }
}

/// Validated inputs for deriving item URLs and mirror paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: Url,
    pub dir: PathBuf,
}

impl Settings {
    pub fn new(base_url: &str, dir: impl Into<PathBuf>) -> Result<Self, GistError> {
        let base_url = Url::parse(base_url).map_err(|e| GistError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GistError::InvalidUrl {
                url: base_url.to_string(),
                reason: "cannot be used as a base".to_string(),
            });
        }
        Ok(Self {
            base_url,
            dir: dir.into(),
        })
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}
impl ConfigBuilder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let mut config = Config::default();
        config.gist.dir = dir.into();
        Self { config }
    }
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gist.base_url = url.into();
        self
    }
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.gist.api_url = url.into();
        self
    }
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.gist.token = token.into();
        self
    }
    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.config.screen.columns = columns;
        self
    }
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.config.gist.shell = shell.into();
        self
    }
    pub fn runnable_ext(mut self, exts: Vec<String>) -> Self {
        self.config.gist.runnable_ext = exts;
        self
    }
    pub fn editor(mut self, editor: impl Into<String>) -> Self {
        self.config.core.editor = editor.into();
        self
    }
    pub fn select_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.core.selectcmd = cmd.into();
        self
    }
    pub fn use_cache(mut self, yes: bool) -> Self {
        self.config.gist.use_cache = yes;
        self
    }
    pub fn cache_ttl(mut self, secs: u64) -> Self {
        self.config.gist.cache_ttl = secs;
        self
    }
    pub fn starred(mut self, yes: bool) -> Self {
        self.config.flag.starred = yes;
        self
    }
    pub fn build(self) -> Config {
        self.config
    }
}
