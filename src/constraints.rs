//! Anatomical joint ranges and the normalized-value -> degrees mapping.

/// Closed interval `[lo, hi]`; `lo` maps to `lo` of the target range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub lo: f64,
    pub hi: f64,
}

impl Range {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn midpoint(self) -> f64 {
        (self.lo + self.hi) / 2.0
    }
}

pub const NORM: Range = Range::new(0.0, 1.0);
pub const SPREAD_FINGER_NORM: Range = Range::new(-1.0, 1.0);

pub const SPREAD_THUMB_CMC_DEG: Range = Range::new(5.0, 50.0);
pub const STRETCH_THUMB_CMC_DEG: Range = Range::new(-20.0, 25.0);
pub const STRETCH_THUMB_MCP_DEG: Range = Range::new(-20.0, 45.0);
pub const STRETCH_THUMB_IP_DEG: Range = Range::new(-15.0, 80.0);

pub const SPREAD_FINGER_DEG: Range = Range::new(-20.0, 20.0);
pub const STRETCH_FINGER_MCP_DEG: Range = Range::new(0.0, 80.0);
pub const STRETCH_FINGER_PIP_DEG: Range = Range::new(0.0, 100.0);
pub const STRETCH_FINGER_DIP_DEG: Range = Range::new(0.0, 90.0);

/// Affine map sending `from_lo -> to_lo` and `from_hi -> to_hi`.
///
/// Values outside `[from_lo, from_hi]` extrapolate; nothing is clamped. `from_lo == from_hi`
/// yields a non-finite result.
pub fn scale_range(from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64, x: f64) -> f64 {
    ((to_hi - to_lo) * (x - from_lo)) / (from_hi - from_lo) + to_lo
}

/// One entry of the constraint table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointConstraint {
    SpreadThumbCmc,
    StretchThumbCmc,
    StretchThumbMcp,
    StretchThumbIp,
    SpreadFinger,
    StretchFingerMcp,
    StretchFingerPip,
    StretchFingerDip,
}

impl JointConstraint {
    pub const ALL: [JointConstraint; 8] = [
        JointConstraint::SpreadThumbCmc,
        JointConstraint::StretchThumbCmc,
        JointConstraint::StretchThumbMcp,
        JointConstraint::StretchThumbIp,
        JointConstraint::SpreadFinger,
        JointConstraint::StretchFingerMcp,
        JointConstraint::StretchFingerPip,
        JointConstraint::StretchFingerDip,
    ];

    pub fn domain(self) -> Range {
        match self {
            Self::SpreadFinger => SPREAD_FINGER_NORM,
            _ => NORM,
        }
    }

    pub fn degrees(self) -> Range {
        match self {
            Self::SpreadThumbCmc => SPREAD_THUMB_CMC_DEG,
            Self::StretchThumbCmc => STRETCH_THUMB_CMC_DEG,
            Self::StretchThumbMcp => STRETCH_THUMB_MCP_DEG,
            Self::StretchThumbIp => STRETCH_THUMB_IP_DEG,
            Self::SpreadFinger => SPREAD_FINGER_DEG,
            Self::StretchFingerMcp => STRETCH_FINGER_MCP_DEG,
            Self::StretchFingerPip => STRETCH_FINGER_PIP_DEG,
            Self::StretchFingerDip => STRETCH_FINGER_DIP_DEG,
        }
    }

    /// Normalized value -> degrees.
    pub fn to_degrees(self, norm: f64) -> f64 {
        let from = self.domain();
        let to = self.degrees();
        scale_range(from.lo, from.hi, to.lo, to.hi, norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_exactly() {
        for c in JointConstraint::ALL {
            let from = c.domain();
            let to = c.degrees();
            assert_eq!(c.to_degrees(from.lo), to.lo, "{c:?} lo");
            assert_eq!(c.to_degrees(from.hi), to.hi, "{c:?} hi");
        }
    }

    #[test]
    fn midpoint_maps_to_midpoint() {
        for c in JointConstraint::ALL {
            let got = c.to_degrees(c.domain().midpoint());
            assert!((got - c.degrees().midpoint()).abs() < 1e-12, "{c:?}: {got}");
        }
    }

    #[test]
    fn mapping_is_affine_with_constant_slope() {
        for c in JointConstraint::ALL {
            let from = c.domain();
            let to = c.degrees();
            let k = (to.hi - to.lo) / (from.hi - from.lo);
            for (x1, x2) in [(0.1, 0.7), (-0.5, 0.25), (0.9, 1.6), (-2.0, 3.0)] {
                let lhs = c.to_degrees(x2) - c.to_degrees(x1);
                assert!((lhs - k * (x2 - x1)).abs() < 1e-9, "{c:?}");
            }
        }
    }

    #[test]
    fn out_of_domain_extrapolates() {
        assert_eq!(JointConstraint::StretchFingerPip.to_degrees(1.5), 150.0);
        assert_eq!(JointConstraint::StretchFingerMcp.to_degrees(-0.25), -20.0);
    }

    #[test]
    fn table_values_are_exact() {
        assert_eq!(JointConstraint::SpreadThumbCmc.to_degrees(0.0), 5.0);
        assert_eq!(JointConstraint::StretchThumbIp.to_degrees(1.0), 80.0);
        assert_eq!(JointConstraint::SpreadFinger.to_degrees(0.0), 0.0);
        assert_eq!(JointConstraint::SpreadFinger.to_degrees(-1.0), -20.0);
    }

    #[test]
    fn generic_mapper_handles_reversed_target() {
        assert_eq!(scale_range(0.0, 10.0, 100.0, 0.0, 2.5), 75.0);
    }
}
