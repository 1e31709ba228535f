//! Lectern configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::CheckEngineConfig;
use crate::grader::GradeOptions;
use crate::reader::DEFAULT_HEADER_OFFSET;
use crate::session::FileStore;

/// Environment variable that overrides `storage_dir`.
pub const STORAGE_DIR_ENV: &str = "LECTERN_STORAGE_DIR";
/// Environment variable that overrides `session_dir`.
pub const SESSION_DIR_ENV: &str = "LECTERN_SESSION_DIR";

/// Top-level lectern configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LecternConfig {
    /// Directory holding `{worksheet id}.json` answer sets.
    #[serde(default = "default_answers_dir")]
    pub answers_dir: PathBuf,
    /// Default markdown document for reader commands.
    #[serde(default)]
    pub document: Option<PathBuf>,
    /// Long-lived storage (notes).
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// Session storage (last viewed section).
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
    /// Output directory for check reports and rendered pages.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Scroll-spy offset used by rendered reader pages.
    #[serde(default = "default_header_offset")]
    pub header_offset: f64,
    #[serde(default = "default_true")]
    pub accept_alternate_versions: bool,
    /// Max worksheets checked concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_answers_dir() -> PathBuf {
    PathBuf::from("./answers")
}
fn default_storage_dir() -> PathBuf {
    PathBuf::from("./.lectern")
}
fn default_session_dir() -> PathBuf {
    std::env::temp_dir().join("lectern-session")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./lectern-results")
}
fn default_header_offset() -> f64 {
    DEFAULT_HEADER_OFFSET
}
fn default_true() -> bool {
    true
}
fn default_parallelism() -> usize {
    4
}

impl Default for LecternConfig {
    fn default() -> Self {
        Self {
            answers_dir: default_answers_dir(),
            document: None,
            storage_dir: default_storage_dir(),
            session_dir: default_session_dir(),
            output_dir: default_output_dir(),
            header_offset: default_header_offset(),
            accept_alternate_versions: true,
            parallelism: default_parallelism(),
        }
    }
}

impl LecternConfig {
    pub fn grade_options(&self) -> GradeOptions {
        GradeOptions {
            accept_alternate_versions: self.accept_alternate_versions,
        }
    }

    pub fn engine_config(&self) -> CheckEngineConfig {
        CheckEngineConfig {
            grade: self.grade_options(),
            parallelism: self.parallelism,
        }
    }

    /// The long-lived store holding notes.
    pub fn local_store(&self) -> FileStore {
        FileStore::new(self.storage_dir.join("local.json"))
    }

    /// The session store holding the last viewed section.
    pub fn session_store(&self) -> FileStore {
        FileStore::new(self.session_dir.join("session.json"))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables expand to the empty string.
pub fn resolve_env_vars(s: &str) -> String {
    expand_vars(s, &|name| std::env::var(name).ok())
}

/// Expand `${NAME}` references through `lookup`. Inserted values are not
/// scanned again.
fn expand_vars(s: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&lookup(&rest[start + 2..start + end]).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path, env: &dyn Fn(&str) -> Option<String>) -> PathBuf {
    PathBuf::from(expand_vars(&path.to_string_lossy(), env))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `lectern.toml` in the current directory
/// 2. `~/.config/lectern/config.toml`
///
/// `LECTERN_STORAGE_DIR` and `LECTERN_SESSION_DIR` override the store
/// directories.
pub fn load_config() -> Result<LecternConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LecternConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("lectern.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            toml::from_str::<LecternConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LecternConfig::default(),
    };

    Ok(finalize(config, |name| std::env::var(name).ok()))
}

/// Apply directory overrides, then expand `${VAR}` in every path.
fn finalize(mut config: LecternConfig, env: impl Fn(&str) -> Option<String>) -> LecternConfig {
    let non_empty = |name: &str| env(name).filter(|d| !d.is_empty()).map(PathBuf::from);
    if let Some(dir) = non_empty(STORAGE_DIR_ENV) {
        config.storage_dir = dir;
    }
    if let Some(dir) = non_empty(SESSION_DIR_ENV) {
        config.session_dir = dir;
    }

    config.answers_dir = resolve_path(&config.answers_dir, &env);
    config.storage_dir = resolve_path(&config.storage_dir, &env);
    config.session_dir = resolve_path(&config.session_dir, &env);
    config.output_dir = resolve_path(&config.output_dir, &env);
    config.document = config.document.as_deref().map(|p| resolve_path(p, &env));
    config
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lectern"))
}
