use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;

use crate::foundation::error::{HandvizError, HandvizResult};
use crate::host::discover::locate_blender;
use crate::script::HostScript;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// No UI; the process exits when the script finishes.
    Background,
    /// Opens the host UI with the script applied and waits until the user closes it.
    Interactive,
}

/// Something that can execute a rendered host script to completion.
///
/// `Sync` so a batch can fan runs out over a thread pool.
pub trait ScriptHost: Sync {
    fn run(&self, script: &HostScript, mode: RunMode) -> HandvizResult<()>;
}

/// Runs scripts through the Blender executable.
///
/// Each run writes its script to a private temp file, so runs never share state.
/// There is no timeout: a hung host blocks the caller.
#[derive(Clone, Debug)]
pub struct BlenderHost {
    executable: PathBuf,
    scratch_dir: PathBuf,
}

impl BlenderHost {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn discover(explicit: Option<&Path>) -> HandvizResult<Self> {
        Ok(Self::new(locate_blender(explicit)?))
    }

    /// Directory for per-run script files (defaults to the system temp dir).
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn command_args(script_path: &Path, mode: RunMode) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(5);
        if mode == RunMode::Background {
            args.push("--background".into());
        }
        // Without this a Python exception still exits 0.
        args.push("--python-exit-code".into());
        args.push("1".into());
        args.push("--python".into());
        args.push(script_path.as_os_str().to_owned());
        args
    }

    fn script_path(&self, script: &HostScript) -> PathBuf {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let seq = NEXT.fetch_add(1, Ordering::Relaxed);
        self.scratch_dir.join(format!(
            "handviz_{}_{}_{seq}.py",
            script.name,
            std::process::id()
        ))
    }
}

impl ScriptHost for BlenderHost {
    #[tracing::instrument(skip(self, script), fields(script = %script.name))]
    fn run(&self, script: &HostScript, mode: RunMode) -> HandvizResult<()> {
        std::fs::create_dir_all(&self.scratch_dir).with_context(|| {
            format!(
                "failed to create script directory '{}'",
                self.scratch_dir.display()
            )
        })?;
        let path = self.script_path(script);
        std::fs::write(&path, script.source())
            .with_context(|| format!("failed to write host script '{}'", path.display()))?;
        let _guard = TempFileGuard(Some(path.clone()));

        let mut cmd = Command::new(&self.executable);
        cmd.args(Self::command_args(&path, mode));
        tracing::info!(executable = %self.executable.display(), ?mode, "launching host");

        match mode {
            RunMode::Background => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
                let output = cmd.output().map_err(|e| {
                    HandvizError::host(format!(
                        "failed to spawn '{}': {e}",
                        self.executable.display()
                    ))
                })?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    return Err(HandvizError::host(format!(
                        "host exited with status {}: {}",
                        output.status,
                        tail(if stderr.trim().is_empty() { &stdout } else { &stderr }, 20)
                    )));
                }
            }
            RunMode::Interactive => {
                let status = cmd.status().map_err(|e| {
                    HandvizError::host(format!(
                        "failed to spawn '{}': {e}",
                        self.executable.display()
                    ))
                })?;
                if !status.success() {
                    return Err(HandvizError::host(format!(
                        "host exited with status {status}"
                    )));
                }
            }
        }

        tracing::debug!("host finished");
        Ok(())
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_flag_only_in_background_mode() {
        let p = Path::new("/tmp/s.py");
        let bg = BlenderHost::command_args(p, RunMode::Background);
        assert_eq!(bg[0], "--background");
        assert_eq!(bg.last().unwrap(), "/tmp/s.py");

        let ui = BlenderHost::command_args(p, RunMode::Interactive);
        assert!(!ui.iter().any(|a| a == "--background"));
        assert_eq!(ui[ui.len() - 2], "--python");
    }

    #[test]
    fn script_paths_are_unique_per_run() {
        let host = BlenderHost::new("blender").with_scratch_dir("target/runner_tests");
        let script = HostScript {
            name: "static_pose".to_string(),
            source: String::new(),
        };
        assert_ne!(host.script_path(&script), host.script_path(&script));
    }

    #[test]
    fn missing_executable_is_a_host_error() {
        let host = BlenderHost::new("target/runner_tests/no-such-blender")
            .with_scratch_dir("target/runner_tests");
        let script = HostScript {
            name: "static_pose".to_string(),
            source: "pass\n".to_string(),
        };
        let err = host.run(&script, RunMode::Background).unwrap_err();
        assert!(matches!(err, HandvizError::Host(_)));
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("x", 5), "x");
    }
}
