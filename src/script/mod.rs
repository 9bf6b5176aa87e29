//! Host scripts: templates shipped with the crate and the slot values for each run.

pub mod template;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::foundation::core::{ExportFormat, Hand};
use crate::foundation::error::{HandvizError, HandvizResult};
use crate::gesture::TimelineFrame;
use crate::pose::{BonePose, HandPose, JointValues, solve_hand_pose};
use crate::wach::StaticSample;

pub use template::{HostScript, ScriptTemplate, SlotBindings};

pub const STATIC_TEMPLATE_SOURCE: &str = include_str!("../../scripts/static_pose.py");
pub const DYNAMIC_TEMPLATE_SOURCE: &str = include_str!("../../scripts/dynamic_gesture.py");

/// Hand object that carries the second quaternion of a dynamic frame.
pub const HAND_OBJECT_BONE: &str = "SK_Hand";

pub fn static_template() -> HandvizResult<ScriptTemplate> {
    ScriptTemplate::new("static_pose", STATIC_TEMPLATE_SOURCE)
}

pub fn dynamic_template() -> HandvizResult<ScriptTemplate> {
    ScriptTemplate::new("dynamic_gesture", DYNAMIC_TEMPLATE_SOURCE)
}

pub fn wrist_bone_name(hand: Hand) -> String {
    format!("hand_{}", hand.bone_suffix())
}

/// Inputs for one static pose run.
#[derive(Clone, Debug)]
pub struct StaticScriptParams<'a> {
    pub label: &'a str,
    pub hand: Hand,
    pub sample: &'a StaticSample,
    pub format: ExportFormat,
    /// One target path per supported format; the host writes only `format`.
    pub output_paths: &'a BTreeMap<ExportFormat, PathBuf>,
    pub fbx_path: &'a Path,
    pub png_path: Option<&'a Path>,
}

pub fn static_bindings(p: &StaticScriptParams<'_>) -> HandvizResult<SlotBindings> {
    let pose = finite_pose(&p.sample.joint_values(), p.hand, "sample")?;
    let output_paths: BTreeMap<&str, String> = p
        .output_paths
        .iter()
        .map(|(f, path)| (f.as_str(), path_string(path)))
        .collect();

    let mut b = SlotBindings::new();
    b.set("EXPORT_FILE_TYPE", p.format.as_str())?;
    b.set("LABEL", p.label)?;
    b.set("HAND", p.hand.as_str())?;
    b.set("SAMPLE_VALUES", p.sample.values)?;
    b.set("POSE", &pose.bones)?;
    b.set("FBX_PATH", path_string(p.fbx_path))?;
    b.set("OUTPUT_PATHS", output_paths)?;
    b.set("EXPORT_PNG", p.png_path.is_some())?;
    b.set("PNG_PATH", p.png_path.map(path_string).unwrap_or_default())?;
    Ok(b)
}

/// Inputs for one dynamic gesture run.
#[derive(Clone, Debug)]
pub struct DynamicScriptParams<'a> {
    pub label: &'a str,
    pub hand: Hand,
    /// `false` opens the result in the host instead of saving it.
    pub export: bool,
    pub blend_path: &'a Path,
    pub fbx_path: &'a Path,
    pub timeline: &'a [TimelineFrame],
}

#[derive(serde::Serialize)]
struct FrameKeys<'a> {
    frame: u64,
    wrist_quat: [f64; 4],
    hand_quat: [f64; 4],
    bones: &'a [BonePose],
}

pub fn dynamic_bindings(p: &DynamicScriptParams<'_>) -> HandvizResult<SlotBindings> {
    let poses = p
        .timeline
        .iter()
        .map(|f| finite_pose(&f.values, p.hand, &format!("frame {}", f.index.0)))
        .collect::<HandvizResult<Vec<_>>>()?;
    let frames: Vec<FrameKeys<'_>> = p
        .timeline
        .iter()
        .zip(&poses)
        .map(|(f, pose)| FrameKeys {
            frame: f.index.0,
            wrist_quat: f.wrist_quat,
            hand_quat: f.hand_quat,
            bones: &pose.bones,
        })
        .collect();

    let mut b = SlotBindings::new();
    b.set("EXPORT", p.export)?;
    b.set("EXPORT_FILE_TYPE", ExportFormat::Blend.as_str())?;
    b.set("LABEL", p.label)?;
    b.set("HAND", p.hand.as_str())?;
    b.set("FBX_PATH", path_string(p.fbx_path))?;
    b.set("BLEND_PATH", path_string(p.blend_path))?;
    b.set("WRIST_BONE", wrist_bone_name(p.hand))?;
    b.set("HAND_BONE", HAND_OBJECT_BONE)?;
    b.set("FRAMES", frames)?;
    Ok(b)
}

// A non-finite angle would encode as `None` and only fail inside the host.
fn finite_pose(values: &JointValues, hand: Hand, what: &str) -> HandvizResult<HandPose> {
    let pose = solve_hand_pose(values, hand);
    if let Some(bad) = pose
        .bones
        .iter()
        .find(|b| b.euler_deg.iter().any(|v| !v.is_finite()))
    {
        return Err(HandvizError::malformed(format!(
            "{what}: bone '{}' solves to a non-finite angle {:?}",
            bad.bone, bad.euler_deg
        )));
    }
    Ok(pose)
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
