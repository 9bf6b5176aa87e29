//! handviz poses a 3D hand armature from normalized data-glove samples and exports it
//! through Blender.
//!
//! # Pipeline overview
//!
//! 1. **Parse**: WACH text (`.txt`, static poses) or gesture JSON (`.json`, frame timelines)
//! 2. **Solve**: normalized spread/stretch values -> per-bone Euler angles ([`solve_hand_pose`])
//! 3. **Render script**: fill a host script template into a fresh [`HostScript`]
//! 4. **Run host**: launch Blender on the script and wait ([`ScriptHost`])
//! 5. **Post-process** (optional): crop the rendered PNG
//!
//! Blender does the armature import, keyframing and export; this crate never touches
//! geometry. Every run gets its own script value, so templates are never mutated and
//! static batches can opt in to running samples concurrently.
#![forbid(unsafe_code)]

pub mod config;
pub mod constraints;
pub mod foundation;
pub mod gesture;
pub mod host;
pub mod pose;
pub mod postprocess;
pub mod script;
pub mod visualize;
pub mod wach;

pub use config::VisualizerConfig;
pub use constraints::{JointConstraint, Range, scale_range};
pub use foundation::core::{ExportFormat, Finger, FrameIndex, Hand, JointSlot, finger_bone_name};
pub use foundation::error::{HandvizError, HandvizResult};
pub use gesture::{
    FrameRecord, GestureEntry, GestureSet, Phase, TimelineFrame, parse_gesture_json,
    read_gesture_file,
};
pub use host::{BlenderHost, RunMode, ScriptHost, locate_blender};
pub use pose::{BonePose, HandPose, JointValues, solve_hand_pose};
pub use postprocess::{CropRect, crop_png_in_place};
pub use script::{HostScript, ScriptTemplate, SlotBindings};
pub use visualize::{
    BatchReport, DynamicVisualizer, SampleOutcome, StaticVisualizer, dynamic_file_name,
    static_file_name,
};
pub use wach::{
    StaticSample, WACH_FIELD_COUNT, WachDocument, WachField, parse_wach, read_wach_file,
};
