//! WACH text format: one static hand pose per block of 20 normalized values.
//!
//! ```text
//! a
//! Left
//!
//! <20 lines>
//!
//! <20 lines>
//! ```

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Finger, Hand, JointSlot};
use crate::foundation::error::{HandvizError, HandvizResult};
use crate::pose::JointValues;

pub const WACH_FIELD_COUNT: usize = 20;
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["txt"];

/// Field positions within a WACH block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WachField {
    ThumbSpread = 0,
    IndexSpread = 1,
    MiddleSpread = 2,
    RingSpread = 3,
    PinkySpread = 4,
    ThumbStretchCmc = 5,
    ThumbStretchMcp = 6,
    ThumbStretchIp = 7,
    IndexStretchMcp = 8,
    IndexStretchPip = 9,
    IndexStretchDip = 10,
    MiddleStretchMcp = 11,
    MiddleStretchPip = 12,
    MiddleStretchDip = 13,
    RingStretchMcp = 14,
    RingStretchPip = 15,
    RingStretchDip = 16,
    PinkyStretchMcp = 17,
    PinkyStretchPip = 18,
    PinkyStretchDip = 19,
}

impl WachField {
    pub fn spread(finger: Finger) -> usize {
        finger.ordinal()
    }

    pub fn stretch(finger: Finger, slot: JointSlot) -> usize {
        Self::ThumbStretchCmc as usize + finger.ordinal() * 3 + slot.ordinal()
    }
}

/// One static pose. Never mutated after parsing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StaticSample {
    pub values: [f64; WACH_FIELD_COUNT],
}

impl StaticSample {
    pub fn new(values: [f64; WACH_FIELD_COUNT]) -> Self {
        Self { values }
    }

    /// Parse 20 decimal strings, as supplied literally by a caller.
    pub fn from_strs<S: AsRef<str>>(fields: &[S]) -> HandvizResult<Self> {
        if fields.len() != WACH_FIELD_COUNT {
            return Err(HandvizError::malformed(format!(
                "a WACH sample needs exactly {WACH_FIELD_COUNT} values, got {}",
                fields.len()
            )));
        }
        let mut values = [0.0; WACH_FIELD_COUNT];
        for (i, (slot, raw)) in values.iter_mut().zip(fields).enumerate() {
            *slot = parse_value(raw.as_ref(), i)?;
        }
        Ok(Self { values })
    }

    pub fn get(&self, field: WachField) -> f64 {
        self.values[field as usize]
    }

    pub fn joint_values(&self) -> JointValues {
        let mut out = JointValues {
            spread: [0.0; 5],
            stretch: [[0.0; 3]; 5],
        };
        for finger in Finger::ALL {
            out.spread[finger.ordinal()] = self.values[WachField::spread(finger)];
            for slot in JointSlot::ALL {
                out.stretch[finger.ordinal()][slot.ordinal()] =
                    self.values[WachField::stretch(finger, slot)];
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WachDocument {
    pub label: String,
    pub hand: Hand,
    pub samples: Vec<StaticSample>,
}

/// Read and parse a `.txt` WACH file.
pub fn read_wach_file(path: &Path) -> HandvizResult<WachDocument> {
    check_extension(path, SUPPORTED_INPUT_EXTENSIONS)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read WACH file '{}'", path.display()))?;
    parse_wach(&content)
}

pub fn parse_wach(content: &str) -> HandvizResult<WachDocument> {
    let mut lines = content.lines().map(str::trim);

    let label = lines
        .next()
        .filter(|l| !l.is_empty())
        .ok_or_else(|| HandvizError::malformed("missing gesture label on line 1"))?;
    validate_label(label)?;
    let hand: Hand = lines
        .next()
        .ok_or_else(|| HandvizError::malformed("missing hand side on line 2"))?
        .parse()?;

    let mut samples = Vec::new();
    let mut block: Vec<&str> = Vec::with_capacity(WACH_FIELD_COUNT);
    // Line numbers are 1-based; the first data line is line 3.
    let mut block_start = 0usize;
    for (offset, line) in lines.enumerate() {
        let line_no = offset + 3;
        if line.is_empty() {
            if !block.is_empty() {
                samples.push(finish_block(&block, samples.len(), block_start)?);
                block.clear();
            }
            continue;
        }
        if block.is_empty() {
            block_start = line_no;
        }
        block.push(line);
    }
    if !block.is_empty() {
        samples.push(finish_block(&block, samples.len(), block_start)?);
    }

    if samples.is_empty() {
        return Err(HandvizError::malformed(format!(
            "no samples found for gesture '{label}'"
        )));
    }

    Ok(WachDocument {
        label: label.to_string(),
        hand,
        samples,
    })
}

fn finish_block(block: &[&str], index: usize, start_line: usize) -> HandvizResult<StaticSample> {
    if block.len() != WACH_FIELD_COUNT {
        return Err(HandvizError::malformed(format!(
            "sample {index} starting at line {start_line} has {} values, expected {WACH_FIELD_COUNT}",
            block.len()
        )));
    }
    StaticSample::from_strs(block)
        .map_err(|e| HandvizError::malformed(format!("sample {index} (line {start_line}): {e}")))
}

fn parse_value(raw: &str, field: usize) -> HandvizResult<f64> {
    let v: f64 = raw.trim().parse().map_err(|_| {
        HandvizError::malformed(format!("field {field}: '{raw}' is not a decimal number"))
    })?;
    if !v.is_finite() {
        return Err(HandvizError::malformed(format!(
            "field {field}: '{raw}' is not finite"
        )));
    }
    Ok(v)
}

/// Labels end up in output file names.
pub fn validate_label(label: &str) -> HandvizResult<()> {
    if label.is_empty() {
        return Err(HandvizError::malformed("gesture label must not be empty"));
    }
    if label.contains(['/', '\\']) || label == "." || label == ".." {
        return Err(HandvizError::malformed(format!(
            "gesture label '{label}' must not contain path separators"
        )));
    }
    Ok(())
}

pub(crate) fn check_extension(path: &Path, supported: &[&str]) -> HandvizResult<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if supported.contains(&ext) {
        return Ok(());
    }
    Err(HandvizError::unsupported_input(format!(
        "'{}' has extension '{ext}', supported: {}",
        path.display(),
        supported.join(", ")
    )))
}
