use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{HandvizError, HandvizResult};

/// Which hand a sample was recorded on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }

    /// Suffix the armature uses on bone names (`index_01_l`).
    pub fn bone_suffix(self) -> char {
        match self {
            Self::Left => 'l',
            Self::Right => 'r',
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hand {
    type Err = HandvizError;

    fn from_str(s: &str) -> HandvizResult<Self> {
        match s.trim() {
            "Left" => Ok(Self::Left),
            "Right" => Ok(Self::Right),
            other => Err(HandvizError::malformed(format!(
                "hand side must be 'Left' or 'Right', got '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }

    pub fn ordinal(self) -> usize {
        self as usize
    }
}

/// Joint position along a digit, proximal first.
///
/// For the thumb the three slots are CMC, MCP, IP; for the other fingers MCP, PIP, DIP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JointSlot {
    Proximal,
    Middle,
    Distal,
}

impl JointSlot {
    pub const ALL: [JointSlot; 3] = [JointSlot::Proximal, JointSlot::Middle, JointSlot::Distal];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn joint_name(self, finger: Finger) -> &'static str {
        match (finger, self) {
            (Finger::Thumb, Self::Proximal) => "CMC",
            (Finger::Thumb, Self::Middle) => "MCP",
            (Finger::Thumb, Self::Distal) => "IP",
            (_, Self::Proximal) => "MCP",
            (_, Self::Middle) => "PIP",
            (_, Self::Distal) => "DIP",
        }
    }
}

/// Armature pose-bone name for a finger joint, e.g. `thumb_01_r`.
pub fn finger_bone_name(finger: Finger, slot: JointSlot, hand: Hand) -> String {
    format!(
        "{}_0{}_{}",
        finger.as_str(),
        slot.ordinal() + 1,
        hand.bone_suffix()
    )
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// File types the host can export a posed hand to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Stl,
    Blend,
    Obj,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Stl, ExportFormat::Blend, ExportFormat::Obj];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Blend => "blend",
            Self::Obj => "obj",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = HandvizError;

    fn from_str(s: &str) -> HandvizResult<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                HandvizError::unsupported_output(format!(
                    "'{s}' (supported: stl, blend, obj)"
                ))
            })
    }
}
