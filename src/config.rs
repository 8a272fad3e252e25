//! Path configuration for an update run.

use std::path::{Path, PathBuf};

/// Maintainer-edited input, relative to the repository root.
pub const DEFAULT_SOURCE: &str = "scripts/rates.json";
/// Runtime data file served with the app.
pub const DEFAULT_DEPLOY: &str = "data/rates.json";
/// Host document embedding the offline fallback.
pub const DEFAULT_HOST: &str = "index.html";

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "RATES_ROOT";

/// Resolved file locations for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdaterConfig {
    pub source: PathBuf,
    /// `None` skips writing the runtime data file.
    pub deploy: Option<PathBuf>,
    pub host: PathBuf,
    /// Validate and compute the rewrite without touching any destination.
    pub dry_run: bool,
}

impl UpdaterConfig {
    /// Default layout under `root`.
    pub fn from_root(root: &Path) -> Self {
        Self {
            source: root.join(DEFAULT_SOURCE),
            deploy: Some(root.join(DEFAULT_DEPLOY)),
            host: root.join(DEFAULT_HOST),
            dry_run: false,
        }
    }

    pub fn with_source(mut self, source: PathBuf) -> Self {
        self.source = source;
        self
    }

    pub fn with_deploy(mut self, deploy: Option<PathBuf>) -> Self {
        self.deploy = deploy;
        self
    }

    pub fn with_host(mut self, host: PathBuf) -> Self {
        self.host = host;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Picks the repository root: explicit flag, then `RATES_ROOT`, then `.`.
pub fn resolve_root(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os(ROOT_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}
