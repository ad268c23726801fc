//! JSON loading for the command-line front-end.
//!
//! A trace file carries the recorded durations in order (first HIGH,
//! first LOW, ...), the 1-based indices of the unreliable ones, and
//! optionally the trailing HIGH of a normally ended reception.

use crate::categorizer::CategorizerParams;
use crate::types::{Trace, CEIL};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// On-disk form of a recorded trace.
#[derive(Clone, Deserialize)]
pub struct TraceFile {
    /// HIGH/LOW durations in recording order.
    pub durations: Vec<u16>,
    /// 1-based indices of unreliable durations.
    #[serde(default)]
    pub unreliable: Vec<u16>,
    /// Trailing HIGH duration of a normal end; absent after a forced end.
    pub tail_high: Option<u16>,
}

impl TraceFile {
    /// Builds the flagged in-memory trace, validating the recorded ranges.
    pub fn into_trace(self) -> Result<Trace, String> {
        if self.durations.len() % 2 != 0 {
            return Err("trace must hold an even number of durations".to_string());
        }
        let mut payload = self.durations;
        for (k, value) in payload.iter().enumerate() {
            if *value == 0 || *value >= CEIL {
                return Err(format!(
                    "duration {} out of range at position {}",
                    value,
                    k + 1
                ));
            }
        }
        for &index in &self.unreliable {
            let slot = payload
                .get_mut(usize::from(index).wrapping_sub(1))
                .ok_or_else(|| format!("unreliable index {index} out of range"))?;
            *slot |= 1;
        }
        let unreliable_count = self.unreliable.len() as u16;
        let trace = Trace::from_flagged(payload, unreliable_count);
        Ok(match self.tail_high {
            Some(tail) => trace.with_normal_end(tail),
            None => trace,
        })
    }
}

pub fn load_trace(path: &Path) -> Result<TraceFile, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read trace {}: {e}", path.display()))?;
    let trace: TraceFile = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse trace {}: {e}", path.display()))?;
    Ok(trace)
}

pub fn load_params(path: &Path) -> Result<CategorizerParams, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read params {}: {e}", path.display()))?;
    let params: CategorizerParams = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse params {}: {e}", path.display()))?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_file_flags_the_listed_indices() {
        let file = TraceFile {
            durations: vec![400, 1200, 400, 1200],
            unreliable: vec![2, 3],
            tail_high: None,
        };
        let trace = file.into_trace().unwrap();
        assert!(trace.is_reliable(1));
        assert!(trace.is_unreliable(2));
        assert!(trace.is_unreliable(3));
        assert_eq!(trace.unreliable_count(), 2);
    }

    #[test]
    fn out_of_range_durations_are_rejected() {
        let file = TraceFile {
            durations: vec![400, 65_000],
            unreliable: vec![],
            tail_high: None,
        };
        assert!(file.into_trace().is_err());
    }

    #[test]
    fn bad_unreliable_index_is_rejected() {
        let file = TraceFile {
            durations: vec![400, 1200],
            unreliable: vec![7],
            tail_high: None,
        };
        assert!(file.into_trace().is_err());
    }

    #[test]
    fn tail_high_selects_the_normal_end() {
        let file = TraceFile {
            durations: vec![400, 1200],
            unreliable: vec![],
            tail_high: Some(404),
        };
        let trace = file.into_trace().unwrap();
        assert_eq!(trace.raw(3), 404);
        assert_eq!(trace.raw(4), CEIL);
    }
}
