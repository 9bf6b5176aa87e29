use std::path::{Path, PathBuf};

use crate::foundation::error::{HandvizError, HandvizResult};

/// Environment variable naming the host executable.
pub const BLENDER_ENV: &str = "HANDVIZ_BLENDER";

/// Default install location on macOS.
pub const MACOS_BLENDER_PATH: &str = "/Applications/Blender.app/Contents/MacOS/Blender";

/// `blender --version` runs and identifies itself as Blender.
pub fn is_blender_on_path() -> bool {
    std::process::Command::new("blender")
        .arg("--version")
        .stdin(std::process::Stdio::null())
        .output()
        .is_ok_and(|out| {
            let banner = String::from_utf8_lossy(&out.stdout);
            out.status.success() && banner.trim_start().starts_with("Blender")
        })
}

/// Find the host executable.
///
/// Order: `explicit`, then `$HANDVIZ_BLENDER`, then the macOS install path, then `blender`
/// on `PATH`. An explicit or environment path that does not exist is an error rather than
/// a fall-through, so a typo is not silently replaced by another install.
pub fn locate_blender(explicit: Option<&Path>) -> HandvizResult<PathBuf> {
    if let Some(path) = explicit {
        return existing(path, "configured blender_path");
    }

    if let Some(raw) = std::env::var_os(BLENDER_ENV).filter(|v| !v.is_empty()) {
        return existing(Path::new(&raw), BLENDER_ENV);
    }

    if cfg!(target_os = "macos") && Path::new(MACOS_BLENDER_PATH).is_file() {
        return Ok(PathBuf::from(MACOS_BLENDER_PATH));
    }

    if is_blender_on_path() {
        return Ok(PathBuf::from("blender"));
    }

    Err(HandvizError::host_not_found(format!(
        "Blender was not found; install it, put it on PATH, or set {BLENDER_ENV}"
    )))
}

fn existing(path: &Path, source: &str) -> HandvizResult<PathBuf> {
    if path.is_file() {
        tracing::debug!(path = %path.display(), source, "using blender executable");
        Ok(path.to_path_buf())
    } else {
        Err(HandvizError::host_not_found(format!(
            "{source} '{}' does not exist",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_path_is_host_not_found() {
        let err = locate_blender(Some(Path::new("/definitely/not/here/blender"))).unwrap_err();
        assert!(matches!(err, HandvizError::HostNotFound(_)));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn explicit_existing_path_is_used_verbatim() {
        let dir = PathBuf::from("target").join("discover_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let exe = dir.join("fake-blender");
        std::fs::write(&exe, b"").unwrap();
        assert_eq!(locate_blender(Some(&exe)).unwrap(), exe);
    }
}
