//! Update orchestration: read, validate, rewrite in memory, then write.
//!
//! All file I/O lives here. Nothing is written until the input has been
//! validated and the host rewrite has been computed, so a bad rate file or a
//! host without the rates block leaves every destination untouched.

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::UpdaterConfig;
use crate::error::UpdateError;
use crate::host::{MarkerError, apply_rates};
use crate::parser::{parse_table, validate};
use crate::table::RateTable;

/// What a run did (or, in dry-run mode, would do).
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub dry_run: bool,
    /// Runtime data file written, if any.
    pub deploy: Option<PathBuf>,
    pub host: PathBuf,
    pub host_changed: bool,
    /// Scalar markers that had to be inserted into the host.
    pub inserted_markers: Vec<&'static str>,
    pub states: usize,
    pub year: u32,
    pub updated: String,
}

/// Reads and validates the rate file, returning its raw bytes alongside the
/// validated table.
pub fn load_table(path: &Path) -> Result<(Vec<u8>, RateTable), UpdateError> {
    let raw = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => UpdateError::MissingInput(path.to_path_buf()),
        _ => UpdateError::io(path, e),
    })?;
    debug!(path = %path.display(), bytes = raw.len(), "Rate file read");

    let doc = parse_table(&raw).map_err(|source| UpdateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let table = validate(&doc)?;

    Ok((raw, table))
}

/// Runs a full update as described by `config`.
#[tracing::instrument(skip_all, fields(source = %config.source.display(), dry_run = config.dry_run))]
pub fn run_update(config: &UpdaterConfig) -> Result<UpdateReport, UpdateError> {
    let (raw, table) = load_table(&config.source)?;
    info!(
        states = table.states.len(),
        year = table.year,
        "Rate table validated"
    );

    let host = fs::read_to_string(&config.host).map_err(|e| UpdateError::io(&config.host, e))?;
    let rewrite = apply_rates(&host, &table).map_err(|e| match e {
        MarkerError::Missing(marker) => UpdateError::MarkerNotFound {
            marker,
            path: config.host.clone(),
        },
        MarkerError::Unreadable(marker) => UpdateError::UnreadableMarker {
            marker,
            path: config.host.clone(),
        },
    })?;

    for marker in &rewrite.inserted {
        warn!(marker, host = %config.host.display(), "Marker missing, inserting after rates block");
    }

    let host_changed = rewrite.changed(&host);

    if !config.dry_run {
        if let Some(deploy) = &config.deploy {
            write_deploy_file(deploy, &raw)?;
        }

        if host_changed {
            fs::write(&config.host, &rewrite.content)
                .map_err(|e| UpdateError::io(&config.host, e))?;
            info!(host = %config.host.display(), "Host document updated");
        } else {
            info!(host = %config.host.display(), "Host document already up to date");
        }
    }

    Ok(UpdateReport {
        dry_run: config.dry_run,
        deploy: config.deploy.clone(),
        host: config.host.clone(),
        host_changed,
        inserted_markers: rewrite.inserted,
        states: table.states.len(),
        year: table.year,
        updated: table.updated,
    })
}

/// Copies the validated source bytes to `path`, creating parent directories.
pub fn write_deploy_file(path: &Path, raw: &[u8]) -> Result<(), UpdateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| UpdateError::io(parent, e))?;
    }

    fs::write(path, raw).map_err(|e| UpdateError::io(path, e))?;
    info!(path = %path.display(), bytes = raw.len(), "Deployed data file written");

    Ok(())
}
