//! Analysis response validation.
//!
//! The model returns a single JSON text payload. Validation is a
//! strongly-typed deserialize into [`AnalysisResult`]: every field the
//! schema marks required must be present, while unknown extra fields
//! are tolerated.

use crate::error::{InsightError, Result};
use crate::models::{AggregatedBa, AnalysisResult};
use std::collections::HashMap;

/// Parse and validate a raw response payload.
///
/// Fails with an analysis error when the payload is empty, is not
/// well-formed JSON, or omits any schema-required field.
pub fn parse_response(raw: &str) -> Result<AnalysisResult> {
    if raw.trim().is_empty() {
        return Err(InsightError::Analysis(
            "No response from model".to_string(),
        ));
    }

    serde_json::from_str(raw)
        .map_err(|e| InsightError::Analysis(format!("Malformed analysis response: {}", e)))
}

/// Gaps between the clusters' member lists and the original input set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageGaps {
    /// Input BAs not assigned to any cluster.
    pub unassigned: Vec<String>,
    /// Input BAs assigned to more than one cluster.
    pub duplicated: Vec<String>,
}

impl CoverageGaps {
    pub fn is_empty(&self) -> bool {
        self.unassigned.is_empty() && self.duplicated.is_empty()
    }
}

/// Compare cluster membership against the aggregated input.
///
/// Every input BA should appear in exactly one cluster, but the model
/// is not force-guaranteed to uphold this; the pipeline logs gaps as
/// warnings and the run still succeeds.
pub fn coverage_gaps(result: &AnalysisResult, rows: &[AggregatedBa]) -> CoverageGaps {
    let mut assignments: HashMap<&str, usize> = HashMap::new();
    for cluster in &result.clusters {
        for member in &cluster.member_bas {
            *assignments.entry(member.as_str()).or_insert(0) += 1;
        }
    }

    let mut gaps = CoverageGaps::default();
    for row in rows {
        match assignments.get(row.ba.as_str()) {
            None => gaps.unassigned.push(row.ba.clone()),
            Some(count) if *count > 1 => gaps.duplicated.push(row.ba.clone()),
            Some(_) => {}
        }
    }

    gaps
}
