//! Dynamic gesture recordings (JSON) and their flattened frame timeline.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{FrameIndex, Hand};
use crate::foundation::error::{HandvizError, HandvizResult};
use crate::pose::JointValues;
use crate::wach::{check_extension, validate_label};

pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["json"];

/// Minimum length of `rotations`: wrist quaternion then hand quaternion, each `w, x, y, z`.
pub const ROTATION_VALUES: usize = 8;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureEntry {
    pub letter: String,
    pub hand: Hand,
    pub start_to_hold: Vec<FrameRecord>,
    pub hold_to_end: Vec<FrameRecord>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameRecord {
    pub rotations: Vec<f64>,
    pub spread: [f64; 5],
    pub stretch: [[f64; 3]; 5],
}

impl FrameRecord {
    pub fn wrist_quat(&self) -> [f64; 4] {
        [
            self.rotations[0],
            self.rotations[1],
            self.rotations[2],
            self.rotations[3],
        ]
    }

    pub fn hand_quat(&self) -> [f64; 4] {
        [
            self.rotations[4],
            self.rotations[5],
            self.rotations[6],
            self.rotations[7],
        ]
    }

    pub fn joint_values(&self) -> JointValues {
        JointValues {
            spread: self.spread,
            stretch: self.stretch,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    StartToHold,
    HoldToEnd,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineFrame {
    pub index: FrameIndex,
    pub phase: Phase,
    pub wrist_quat: [f64; 4],
    pub hand_quat: [f64; 4],
    pub values: JointValues,
}

impl GestureEntry {
    /// Start phase followed by hold phase, renumbered from 0.
    pub fn timeline(&self) -> Vec<TimelineFrame> {
        let phases = [
            (Phase::StartToHold, &self.start_to_hold),
            (Phase::HoldToEnd, &self.hold_to_end),
        ];
        phases
            .into_iter()
            .flat_map(|(phase, frames)| frames.iter().map(move |f| (phase, f)))
            .enumerate()
            .map(|(i, (phase, f))| TimelineFrame {
                index: FrameIndex(i as u64),
                phase,
                wrist_quat: f.wrist_quat(),
                hand_quat: f.hand_quat(),
                values: f.joint_values(),
            })
            .collect()
    }

    pub fn frame_count(&self) -> usize {
        self.start_to_hold.len() + self.hold_to_end.len()
    }

    fn validate(&self, entry: usize) -> HandvizResult<()> {
        let all = self.start_to_hold.iter().chain(&self.hold_to_end);
        for (i, frame) in all.enumerate() {
            if frame.rotations.len() < ROTATION_VALUES {
                return Err(HandvizError::malformed(format!(
                    "gesture {entry} frame {i}: 'rotations' has {} values, expected at least {ROTATION_VALUES}",
                    frame.rotations.len()
                )));
            }
            let finite = frame.rotations.iter().all(|v| v.is_finite())
                && frame.spread.iter().all(|v| v.is_finite())
                && frame.stretch.iter().flatten().all(|v| v.is_finite());
            if !finite {
                return Err(HandvizError::malformed(format!(
                    "gesture {entry} frame {i}: values must be finite"
                )));
            }
        }
        Ok(())
    }
}

/// All gesture instances of one JSON document.
///
/// `label` and `hand` come from the first entry and name every output of the run.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureSet {
    pub label: String,
    pub hand: Hand,
    pub entries: Vec<GestureEntry>,
}

pub fn read_gesture_file(path: &Path) -> HandvizResult<GestureSet> {
    check_extension(path, SUPPORTED_INPUT_EXTENSIONS)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read gesture file '{}'", path.display()))?;
    parse_gesture_json(&content)
}

pub fn parse_gesture_json(content: &str) -> HandvizResult<GestureSet> {
    let doc: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| HandvizError::malformed(format!("gesture JSON: {e}")))?;
    if is_empty_document(&doc) {
        return Err(HandvizError::empty_gesture(format!(
            "the document contains no gesture entries (got {doc})"
        )));
    }
    let entries: Vec<GestureEntry> = serde_json::from_value(doc)
        .map_err(|e| HandvizError::malformed(format!("gesture JSON: {e}")))?;

    let Some(first) = entries.first() else {
        return Err(HandvizError::empty_gesture(
            "the document contains no gesture entries",
        ));
    };
    validate_label(&first.letter)?;
    let (label, hand) = (first.letter.clone(), first.hand);

    for (i, entry) in entries.iter().enumerate() {
        entry.validate(i)?;
    }

    Ok(GestureSet {
        label,
        hand,
        entries,
    })
}

// Recorders write `null`, `false`, `""`, `{}` or `[]` when nothing was captured.
fn is_empty_document(doc: &serde_json::Value) -> bool {
    use serde_json::Value;
    match doc {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_json(tag: f64) -> String {
        format!(
            r#"{{"rotations":[1,0,0,0,1,0,0,{tag}],"spread":[{tag},0,0,0,0],"stretch":[[0,0,0],[0,0,0],[0,0,0],[0,0,0],[0,0,{tag}]]}}"#
        )
    }

    fn entry_json(letter: &str, start: &[f64], hold: &[f64]) -> String {
        let s: Vec<_> = start.iter().map(|t| frame_json(*t)).collect();
        let h: Vec<_> = hold.iter().map(|t| frame_json(*t)).collect();
        format!(
            r#"{{"letter":"{letter}","hand":"Right","startToHold":[{}],"holdToEnd":[{}]}}"#,
            s.join(","),
            h.join(",")
        )
    }

    #[test]
    fn timeline_concatenates_phases_in_order() {
        let doc = format!("[{}]", entry_json("z", &[0.1, 0.2, 0.3], &[0.4, 0.5]));
        let set = parse_gesture_json(&doc).unwrap();
        assert_eq!(set.label, "z");
        assert_eq!(set.hand, Hand::Right);

        let tl = set.entries[0].timeline();
        assert_eq!(tl.len(), 5);
        let idx: Vec<u64> = tl.iter().map(|f| f.index.0).collect();
        assert_eq!(idx, vec![0, 1, 2, 3, 4]);
        let tags: Vec<f64> = tl.iter().map(|f| f.values.spread[0]).collect();
        assert_eq!(tags, vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(tl[2].phase, Phase::StartToHold);
        assert_eq!(tl[3].phase, Phase::HoldToEnd);
        assert_eq!(tl[4].hand_quat, [1.0, 0.0, 0.0, 0.5]);
        assert_eq!(tl[4].values.stretch[4][2], 0.5);
    }

    #[test]
    fn label_and_hand_come_from_first_entry() {
        let doc = format!(
            "[{},{}]",
            entry_json("j1", &[0.1], &[]),
            entry_json("j2", &[0.2], &[0.3]).replace("Right", "Left")
        );
        let set = parse_gesture_json(&doc).unwrap();
        assert_eq!(set.label, "j1");
        assert_eq!(set.hand, Hand::Right);
        assert_eq!(set.entries.len(), 2);
        assert_eq!(set.entries[1].frame_count(), 2);
    }

    #[test]
    fn empty_or_null_document_is_reported() {
        for doc in ["[]", "null", "false", "{}", "\"\""] {
            let err = parse_gesture_json(doc).unwrap_err();
            assert!(matches!(err, HandvizError::EmptyGesture(_)), "{doc}");
        }
    }

    #[test]
    fn non_empty_non_array_document_is_malformed() {
        for doc in ["true", "{\"letter\":\"z\"}", "\"z\"", "3"] {
            let err = parse_gesture_json(doc).unwrap_err();
            assert!(matches!(err, HandvizError::Malformed(_)), "{doc}");
        }
    }

    #[test]
    fn short_rotation_vector_is_rejected() {
        let doc = format!("[{}]", entry_json("z", &[0.1], &[])).replace("[1,0,0,0,1,0,0,", "[1,0,");
        let err = parse_gesture_json(&doc).unwrap_err();
        assert!(err.to_string().contains("'rotations'"));
    }

    #[test]
    fn wrong_extension_is_unsupported() {
        let err = read_gesture_file(Path::new("gesture.txt")).unwrap_err();
        assert!(matches!(err, HandvizError::UnsupportedInput(_)));
    }
}
