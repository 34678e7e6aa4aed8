//! The closed set of execution policies.

use crate::core::ExecutionMode;
use crate::staging::{file_name, StagingResult};

/// How a job drives the engine, chosen once from the staging result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPolicy {
    /// One invocation with the batch-control file.
    Batch {
        /// Batch-control file name.
        control_file: String,
    },
    /// One invocation with the sole experiment file.
    Single {
        /// Experiment file name.
        experiment: String,
    },
    /// One invocation per experiment file, in discovery order. May be empty.
    Multi {
        /// Experiment file names.
        experiments: Vec<String>,
    },
}

impl ExecutionPolicy {
    /// Selects the policy: a staged batch-control file always wins, then a
    /// single experiment file, then iteration over all of them.
    #[must_use]
    pub fn select(staged: &StagingResult) -> Self {
        if let Some(batch) = &staged.batch_file {
            return Self::Batch {
                control_file: file_name(batch),
            };
        }
        match staged.experiment_files.as_slice() {
            [only] => Self::Single {
                experiment: file_name(only),
            },
            files => Self::Multi {
                experiments: files.iter().map(|p| file_name(p)).collect(),
            },
        }
    }

    /// Returns the reported execution mode.
    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        match self {
            Self::Batch { .. } => ExecutionMode::Batch,
            Self::Single { .. } => ExecutionMode::Single,
            Self::Multi { .. } => ExecutionMode::Multi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn staged(experiments: &[&str], batch: Option<&str>) -> StagingResult {
        StagingResult {
            experiment_files: experiments.iter().map(|n| PathBuf::from("/w").join(n)).collect(),
            batch_file: batch.map(|n| PathBuf::from("/w").join(n)),
            ..StagingResult::default()
        }
    }

    #[test]
    fn test_batch_takes_precedence() {
        let policy = ExecutionPolicy::select(&staged(&["A.MZX", "B.MZX"], Some("DSSBatch.v48")));
        assert_eq!(
            policy,
            ExecutionPolicy::Batch {
                control_file: "DSSBatch.v48".into()
            }
        );
        assert_eq!(policy.mode(), ExecutionMode::Batch);
    }

    #[test]
    fn test_single_experiment() {
        let policy = ExecutionPolicy::select(&staged(&["A.MZX"], None));
        assert_eq!(
            policy,
            ExecutionPolicy::Single {
                experiment: "A.MZX".into()
            }
        );
    }

    #[test]
    fn test_multi_keeps_discovery_order() {
        let policy = ExecutionPolicy::select(&staged(&["C.MZX", "A.SBX"], None));
        assert_eq!(
            policy,
            ExecutionPolicy::Multi {
                experiments: vec!["C.MZX".into(), "A.SBX".into()]
            }
        );
    }

    #[test]
    fn test_no_experiments_is_empty_multi() {
        let policy = ExecutionPolicy::select(&staged(&[], None));
        assert_eq!(policy, ExecutionPolicy::Multi { experiments: vec![] });
        assert_eq!(policy.mode(), ExecutionMode::Multi);
    }
}
