//! Data models for business-area aggregation and analysis.
//!
//! This module contains the core data structures: the per-BA aggregate
//! produced from the CSV, the cluster/summary structures returned by
//! the AI analysis, and the report envelope.
//!
//! The serde wire names (camelCase) are part of the LLM contract: the
//! aggregates are serialized into the prompt and the response schema
//! uses the same field names, so renames here change the API contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregated statistics for one business area.
///
/// One entry per distinct BA key, in the order the key was first seen
/// in the input file. Immutable once the aggregation run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedBa {
    /// The grouping key, used verbatim from the CSV (no normalization).
    pub ba: String,
    /// Sum of the amounts of all contributing rows.
    pub total_amount: f64,
    /// Number of contributing rows (always >= 1).
    pub transaction_count: usize,
    /// `total_amount / transaction_count`.
    pub avg_amount: f64,
    /// Population standard deviation of the per-row amounts
    /// (0 when only one row contributed).
    pub std_dev_amount: f64,
}

/// One segment identified by the AI analysis.
///
/// All fields are required; a response missing any of them is rejected
/// by the validator. Extra fields in the payload are tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterData {
    /// Unique id within the result set.
    pub id: String,
    /// Display name of the segment.
    pub name: String,
    /// Narrative description of the segment's behavior.
    pub description: String,
    /// Who the members of this segment likely are.
    pub customer_persona: String,
    /// Short descriptive traits (typically 3-4).
    pub characteristics: Vec<String>,
    /// BA keys assigned to this cluster.
    #[serde(rename = "memberBAs")]
    pub member_bas: Vec<String>,
}

/// Executive-level narrative produced alongside the clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveInsight {
    /// High-level overview for decision makers.
    pub overview: String,
    /// Actionable strategic recommendations, in priority order.
    pub strategic_recommendations: Vec<String>,
    /// Longer-term policy implications.
    pub policy_implications: Vec<String>,
}

/// The complete result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Segments identified by the model, in the order returned.
    pub clusters: Vec<ClusterData>,
    /// Executive summary over all segments.
    pub executive_summary: ExecutiveInsight,
}

/// Metadata about one insight run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Name of the input CSV file.
    pub input_file: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Name of the LLM model used.
    pub model_used: String,
    /// Number of distinct business areas aggregated.
    pub business_areas: usize,
    /// Duration of the full run in seconds.
    pub duration_seconds: f64,
}

/// The complete report handed to the presentation layer.
///
/// `analysis` is `None` for dry runs (aggregation only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    /// Metadata about the run.
    pub metadata: ReportMetadata,
    /// Aggregated business areas, in first-seen order.
    pub data: Vec<AggregatedBa>,
    /// AI analysis result, when an analysis was performed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregated_ba_wire_names() {
        let row = AggregatedBa {
            ba: "A".to_string(),
            total_amount: 300.0,
            transaction_count: 2,
            avg_amount: 150.0,
            std_dev_amount: 50.0,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["ba"], "A");
        assert_eq!(json["totalAmount"], 300.0);
        assert_eq!(json["transactionCount"], 2);
        assert_eq!(json["avgAmount"], 150.0);
        assert_eq!(json["stdDevAmount"], 50.0);
    }

    #[test]
    fn test_cluster_member_bas_rename() {
        let cluster = ClusterData {
            id: "c1".to_string(),
            name: "High value".to_string(),
            description: "desc".to_string(),
            customer_persona: "Major dealers".to_string(),
            characteristics: vec!["high volume".to_string()],
            member_bas: vec!["A".to_string(), "B".to_string()],
        };

        let json = serde_json::to_value(&cluster).unwrap();
        assert_eq!(json["customerPersona"], "Major dealers");
        assert!(json["memberBAs"].is_array());

        let back: ClusterData = serde_json::from_value(json).unwrap();
        assert_eq!(back, cluster);
    }

    #[test]
    fn test_analysis_result_round_trip() {
        let result = AnalysisResult {
            clusters: vec![],
            executive_summary: ExecutiveInsight {
                overview: "overview".to_string(),
                strategic_recommendations: vec!["do x".to_string()],
                policy_implications: vec!["policy y".to_string()],
            },
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("executiveSummary"));
        assert!(json.contains("strategicRecommendations"));
        assert!(json.contains("policyImplications"));

        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
