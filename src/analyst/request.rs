//! Analysis request construction.
//!
//! Builds the instructional prompt (with the serialized aggregates
//! embedded) and the structured-output schema the model is contracted
//! to honor. Pure functions, no I/O; the caller owns payload size.

use crate::models::AggregatedBa;
use serde_json::{json, Value};

/// A fully prepared analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Instructional prompt with the aggregated data embedded.
    pub prompt: String,
    /// Structured-output schema the response must conform to.
    pub schema: Value,
    /// Determinism control; kept low for analytical consistency.
    pub temperature: f32,
}

/// Build the analysis request for a set of aggregated business areas.
///
/// `language` is the natural language for all narrative fields
/// (cluster names, personas, the executive summary).
pub fn build_request(rows: &[AggregatedBa], language: &str, temperature: f32) -> AnalysisRequest {
    // The aggregates are small (one row per BA), so the whole set is
    // embedded. Chunking for very large key spaces is the caller's
    // concern, not enforced here.
    let data_context = serde_json::to_string(rows).unwrap_or_else(|_| "[]".to_string());

    let prompt = format!(
        r#"You are a Senior Data Analyst and Business Strategist for a large enterprise.

I have aggregated transaction data for different Business Areas (BA).
Data fields:
- ba: Business Area Name
- totalAmount: Total transaction value
- transactionCount: Number of transactions
- avgAmount: Average value per transaction
- stdDevAmount: Variance in transaction value

Task:
1. Perform a logical clustering analysis on this data to group BAs into 3 distinct segments based on their value and volume patterns.
2. Assign each BA to one cluster.
3. Provide a detailed analysis in {language}.
4. **Crucial**: For "customerPersona", explicitly identify WHO these BAs likely represent based on the data pattern (e.g., "Major Dealers", "Small Retailers", "Ad-hoc Contractors") and describe their nature in detail.
5. Provide high-level executive insights suitable for policy making.

Input Data:
{data_context}
"#
    );

    AnalysisRequest {
        prompt,
        schema: response_schema(),
        temperature,
    }
}

/// The structured-output schema for the analysis response.
///
/// Field names here must match the serde wire names in
/// [`crate::models`]; the validator enforces the `required` lists on
/// deserialize.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "clusters": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "name": {
                            "type": "STRING",
                            "description": "A meaningful segment name (e.g. 'High-value buyers')"
                        },
                        "description": {
                            "type": "STRING",
                            "description": "Detailed description of this segment's behavior"
                        },
                        "customerPersona": {
                            "type": "STRING",
                            "description": "Who are they? What kind of business? A deep profile"
                        },
                        "characteristics": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "3-4 distinguishing traits"
                        },
                        "memberBAs": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "BA keys belonging to this segment"
                        }
                    },
                    "required": ["id", "name", "description", "customerPersona", "characteristics", "memberBAs"]
                }
            },
            "executiveSummary": {
                "type": "OBJECT",
                "properties": {
                    "overview": {
                        "type": "STRING",
                        "description": "Executive overview focused on key insights"
                    },
                    "strategicRecommendations": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "Actionable strategic recommendations"
                    },
                    "policyImplications": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "Long-term policy implications"
                    }
                },
                "required": ["overview", "strategicRecommendations", "policyImplications"]
            }
        },
        "required": ["clusters", "executiveSummary"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<AggregatedBa> {
        vec![
            AggregatedBa {
                ba: "A".to_string(),
                total_amount: 300.0,
                transaction_count: 2,
                avg_amount: 150.0,
                std_dev_amount: 50.0,
            },
            AggregatedBa {
                ba: "B".to_string(),
                total_amount: 50.0,
                transaction_count: 1,
                avg_amount: 50.0,
                std_dev_amount: 0.0,
            },
        ]
    }

    #[test]
    fn test_prompt_embeds_all_rows() {
        let request = build_request(&sample_rows(), "Thai", 0.3);

        assert!(request.prompt.contains("\"ba\":\"A\""));
        assert!(request.prompt.contains("\"ba\":\"B\""));
        assert!(request.prompt.contains("\"totalAmount\":300.0"));
        assert!(request.prompt.contains("3 distinct segments"));
        assert!(request.prompt.contains("Thai"));
        assert_eq!(request.temperature, 0.3);
    }

    #[test]
    fn test_language_is_configurable() {
        let request = build_request(&sample_rows(), "English", 0.3);
        assert!(request.prompt.contains("detailed analysis in English"));
    }

    #[test]
    fn test_schema_required_fields() {
        let schema = response_schema();

        let cluster_required = &schema["properties"]["clusters"]["items"]["required"];
        for field in [
            "id",
            "name",
            "description",
            "customerPersona",
            "characteristics",
            "memberBAs",
        ] {
            assert!(
                cluster_required
                    .as_array()
                    .unwrap()
                    .iter()
                    .any(|v| v == field),
                "missing required cluster field {field}"
            );
        }

        let summary_required = &schema["properties"]["executiveSummary"]["required"];
        for field in ["overview", "strategicRecommendations", "policyImplications"] {
            assert!(summary_required
                .as_array()
                .unwrap()
                .iter()
                .any(|v| v == field));
        }

        assert_eq!(schema["required"], json!(["clusters", "executiveSummary"]));
    }

    #[test]
    fn test_empty_rows_still_builds() {
        let request = build_request(&[], "Thai", 0.1);
        assert!(request.prompt.contains("Input Data:\n[]"));
    }
}
