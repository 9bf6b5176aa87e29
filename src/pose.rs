//! Per-bone rotations for a posed hand.
//!
//! The host applies each rotation as an XYZ Euler (degrees here, radians on the host side)
//! converted to a quaternion. Spread drives X, flexion drives Z with its sign flipped to
//! match the armature's local bone axes, Y stays zero.

use crate::constraints::JointConstraint;
use crate::foundation::core::{Finger, Hand, JointSlot, finger_bone_name};

/// Normalized joint values for one hand, independent of the input format.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JointValues {
    /// Per digit, thumb first.
    pub spread: [f64; 5],
    /// Per digit, three joints proximal to distal.
    pub stretch: [[f64; 3]; 5],
}

impl JointValues {
    pub fn spread_of(&self, finger: Finger) -> f64 {
        self.spread[finger.ordinal()]
    }

    pub fn stretch_of(&self, finger: Finger, slot: JointSlot) -> f64 {
        self.stretch[finger.ordinal()][slot.ordinal()]
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BonePose {
    pub bone: String,
    /// XYZ Euler angles in degrees.
    pub euler_deg: [f64; 3],
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HandPose {
    pub bones: Vec<BonePose>,
}

impl HandPose {
    pub fn bone(&self, name: &str) -> Option<&BonePose> {
        self.bones.iter().find(|b| b.bone == name)
    }
}

/// Constraint used for the flexion of a joint.
pub fn stretch_constraint(finger: Finger, slot: JointSlot) -> JointConstraint {
    match (finger, slot) {
        (Finger::Thumb, JointSlot::Proximal) => JointConstraint::StretchThumbCmc,
        (Finger::Thumb, JointSlot::Middle) => JointConstraint::StretchThumbMcp,
        (Finger::Thumb, JointSlot::Distal) => JointConstraint::StretchThumbIp,
        (_, JointSlot::Proximal) => JointConstraint::StretchFingerMcp,
        (_, JointSlot::Middle) => JointConstraint::StretchFingerPip,
        (_, JointSlot::Distal) => JointConstraint::StretchFingerDip,
    }
}

/// Constraint used for the spread of a digit. Only the proximal joint carries spread.
pub fn spread_constraint(finger: Finger) -> JointConstraint {
    match finger {
        Finger::Thumb => JointConstraint::SpreadThumbCmc,
        _ => JointConstraint::SpreadFinger,
    }
}

pub fn joint_euler_deg(values: &JointValues, finger: Finger, slot: JointSlot) -> [f64; 3] {
    let stretch = stretch_constraint(finger, slot).to_degrees(values.stretch_of(finger, slot));
    let spread = match slot {
        JointSlot::Proximal => spread_constraint(finger).to_degrees(values.spread_of(finger)),
        _ => 0.0,
    };
    [spread, 0.0, -stretch]
}

/// Rotations for all 15 finger bones, ordered by joint slot then finger.
pub fn solve_hand_pose(values: &JointValues, hand: Hand) -> HandPose {
    let mut bones = Vec::with_capacity(15);
    for slot in JointSlot::ALL {
        for finger in Finger::ALL {
            bones.push(BonePose {
                bone: finger_bone_name(finger, slot, hand),
                euler_deg: joint_euler_deg(values, finger, slot),
            });
        }
    }
    HandPose { bones }
}
