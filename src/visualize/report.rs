use std::path::PathBuf;

use crate::foundation::core::Hand;
use crate::foundation::error::HandvizResult;

/// Result of one host invocation within a batch.
#[derive(Debug)]
pub struct SampleOutcome {
    /// Sample index for static batches, gesture instance for dynamic ones.
    pub index: usize,
    /// Files the host was asked to write. Empty for interactive runs; the still goes in `png`.
    pub result: HandvizResult<Vec<PathBuf>>,
    /// Cropped still, when one was requested and the host run succeeded.
    pub png: Option<HandvizResult<PathBuf>>,
}

impl SampleOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct BatchReport {
    pub label: String,
    pub hand: Hand,
    pub outcomes: Vec<SampleOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
            && self
                .outcomes
                .iter()
                .all(|o| !matches!(o.png, Some(Err(_))))
    }

    pub fn outputs(&self) -> impl Iterator<Item = &PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::error::HandvizError;

    #[test]
    fn counts_and_outputs() {
        let report = BatchReport {
            label: "a".to_string(),
            hand: Hand::Left,
            outcomes: vec![
                SampleOutcome {
                    index: 0,
                    result: Ok(vec![PathBuf::from("a_Left_0_stl.stl")]),
                    png: None,
                },
                SampleOutcome {
                    index: 1,
                    result: Err(HandvizError::host("boom")),
                    png: None,
                },
            ],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert_eq!(report.outputs().count(), 1);
    }

    #[test]
    fn failed_crop_marks_batch_unsuccessful() {
        let report = BatchReport {
            label: "a".to_string(),
            hand: Hand::Right,
            outcomes: vec![SampleOutcome {
                index: 0,
                result: Ok(vec![]),
                png: Some(Err(HandvizError::post_process("corrupt"))),
            }],
        };
        assert_eq!(report.failed(), 0);
        assert!(!report.is_success());
    }
}
