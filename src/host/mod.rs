//! Launching the 3D host as a subprocess.

pub mod discover;
pub mod runner;

pub use discover::{BLENDER_ENV, MACOS_BLENDER_PATH, is_blender_on_path, locate_blender};
pub use runner::{BlenderHost, RunMode, ScriptHost};
