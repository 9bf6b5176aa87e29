//! Parse -> render script -> run host -> post-process, once per sample.

pub mod dynamic_gesture;
pub mod report;
pub mod static_pose;

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{HandvizError, HandvizResult};

pub use dynamic_gesture::{DynamicVisualizer, dynamic_file_name};
pub use report::{BatchReport, SampleOutcome};
pub use static_pose::{StaticVisualizer, static_file_name};

// The host runs with its own notion of the script location, so every path handed to it
// is made absolute first.
pub(crate) fn absolute_path(path: &Path) -> HandvizResult<PathBuf> {
    Ok(std::path::absolute(path)
        .with_context(|| format!("failed to resolve '{}'", path.display()))?)
}

// `threads` is already checked by `VisualizerConfig::validate`.
pub(crate) fn build_thread_pool(threads: Option<usize>) -> HandvizResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| HandvizError::validation(format!("failed to build rayon thread pool: {e}")))
}
