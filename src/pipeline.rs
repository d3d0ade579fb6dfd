//! # Validation Pipeline
//!
//! One validation pass over a checkout:
//!
//! 1. Find every `readme.md` (any case) under `<cwd>/specification`.
//! 2. For each readme, in parallel on a bounded rayon pool: parse it, walk its
//!    reference graph, check its tags and report the JSON files below it that
//!    the walk never reached.
//! 3. Report API folders no readme covers.
//! 4. Drop findings about excluded paths.
//!
//! Each readme gets its own walker, so traversal state is never shared
//! between threads. A checkout with no `specification` folder is valid and
//! produces no findings.

use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;

use crate::config::ValidationConfig;
use crate::error::{Error, Result};
use crate::filesystem::SpecFs;
use crate::orphan::{is_readme, missing_readmes, unreferenced_files};
use crate::readme::Readme;
use crate::tags::{check_file_locations, check_tags};
use crate::validation::{ErrorMap, ValidationError};
use crate::walker::ReferenceWalker;

/// Validate the readme at `readme_path` and everything it reaches.
pub fn validate_readme_file<F: SpecFs + ?Sized>(
    fs: &F,
    readme_path: &Path,
    config: &ValidationConfig,
) -> Result<Vec<ValidationError>> {
    debug!("Validating {}", readme_path.display());
    let readme = Readme::load(fs, readme_path)?;
    let mut errors = readme.findings();

    let mut walker = ReferenceWalker::new(fs, &readme.path, readme.root_files());
    for item in walker.by_ref() {
        errors.push(item?);
    }
    let outcome = walker.into_outcome();

    errors.extend(check_tags(&readme, &outcome.documents, &config.aggregate_tags));
    errors.extend(check_file_locations(&readme.path, &outcome.documents));

    let files = fs.list_files(readme.dir())?;
    errors.extend(unreferenced_files(&readme.path, &files, &outcome.reachable));

    debug!(
        "{}: {} files reached, {} findings",
        readme_path.display(),
        outcome.reachable.len(),
        errors.len()
    );
    Ok(errors)
}

/// Run a full pass over `config.cwd`.
///
/// Findings are returned in readme order; a readme's findings are in
/// discovery order.
pub fn validate_specification_folder<F: SpecFs + ?Sized>(
    fs: &F,
    config: &ValidationConfig,
) -> Result<Vec<ValidationError>> {
    let specification = config.specification_dir();
    if !fs.exists(&specification) {
        info!(
            "No specification folder in {}, nothing to validate",
            config.cwd.display()
        );
        return Ok(Vec::new());
    }

    let files = fs.list_files(&specification)?;
    let readmes: Vec<&PathBuf> = files.iter().filter(|f| is_readme(f)).collect();
    info!(
        "Validating {} readme files under {} with {} workers",
        readmes.len(),
        specification.display(),
        config.concurrency
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.concurrency)
        .build()
        .map_err(|e| Error::ThreadPool {
            message: e.to_string(),
        })?;
    let per_readme: Vec<Vec<ValidationError>> = pool.install(|| {
        readmes
            .par_iter()
            .map(|readme| validate_readme_file(fs, readme, config))
            .collect::<Result<Vec<_>>>()
    })?;

    let mut errors: Vec<ValidationError> = per_readme.into_iter().flatten().collect();
    errors.extend(missing_readmes(&specification, &files));

    let before = errors.len();
    errors.retain(|e| !config.is_excluded(e.primary_path()));
    if errors.len() != before {
        debug!("Excluded {} findings by path", before - errors.len());
    }
    Ok(errors)
}

/// All findings of one pass, deduplicated by identity.
pub fn error_map_for_dir<F: SpecFs + ?Sized>(fs: &F, config: &ValidationConfig) -> Result<ErrorMap> {
    let map: ErrorMap = validate_specification_folder(fs, config)?.into_iter().collect();
    info!("{} distinct findings in {}", map.len(), config.cwd.display());
    Ok(map)
}
