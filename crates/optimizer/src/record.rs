use crate::error::OptimizerError;
use core_types::ParameterSet;
use serde::{Deserialize, Serialize};

/// One line of optimizer progress.
///
/// Serialized untagged, so each variant is recognised by its fields:
/// episodes carry `episode`, the final summary carries `best_params`, and
/// everything else (announcements, step errors, completion) is a bare `log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptimizationRecord {
    Episode {
        episode: u32,
        log: String,
        /// The Sharpe ratio of this episode's run.
        reward: f64,
        /// The parameters tested in this episode (not necessarily the best).
        params: ParameterSet,
    },
    Summary {
        log: String,
        best_params: ParameterSet,
        best_reward: f64,
    },
    Message {
        log: String,
    },
}

impl OptimizationRecord {
    pub fn message(log: impl Into<String>) -> Self {
        OptimizationRecord::Message { log: log.into() }
    }

    pub fn log(&self) -> &str {
        match self {
            OptimizationRecord::Episode { log, .. }
            | OptimizationRecord::Summary { log, .. }
            | OptimizationRecord::Message { log } => log,
        }
    }

    pub fn episode(&self) -> Option<u32> {
        match self {
            OptimizationRecord::Episode { episode, .. } => Some(*episode),
            _ => None,
        }
    }

    /// Encodes the record as a single newline-terminated JSON line.
    pub fn to_ndjson(&self) -> Result<String, OptimizerError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndjson_is_one_line() {
        let record = OptimizationRecord::Episode {
            episode: 3,
            log: "Ep 3: Testing {period: 14} -> Sharpe: 1.2".to_string(),
            reward: 1.2,
            params: ParameterSet::from([("period".to_string(), 14)]),
        };
        let line = record.to_ndjson().unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        assert_eq!(
            line.trim_end(),
            r#"{"episode":3,"log":"Ep 3: Testing {period: 14} -> Sharpe: 1.2","reward":1.2,"params":{"period":14}}"#
        );
    }

    #[test]
    fn test_variants_decode_by_shape() {
        let message: OptimizationRecord = serde_json::from_str(r#"{"log":"hello"}"#).unwrap();
        assert_eq!(message, OptimizationRecord::message("hello"));

        let summary: OptimizationRecord =
            serde_json::from_str(r#"{"log":"done","best_params":{"a":1},"best_reward":0.5}"#).unwrap();
        assert!(matches!(summary, OptimizationRecord::Summary { best_reward, .. } if best_reward == 0.5));
        assert_eq!(summary.episode(), None);
    }
}
