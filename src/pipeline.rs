//! Upload-cycle orchestration.
//!
//! A small state machine sequencing aggregation and AI analysis:
//!
//! ```text
//! Idle -> ProcessingData -> AnalyzingAi -> Success
//!              |                 |
//!              +----> Error <----+
//! ```
//!
//! `Error` and `Success` both return to `Idle` via an explicit reset.
//! At most one cycle is in flight at a time; the aggregated data and
//! the analysis result are owned exclusively by the pipeline for the
//! duration of one cycle and discarded on reset.

use crate::analysis::aggregate;
use crate::analyst::request::build_request;
use crate::analyst::response::coverage_gaps;
use crate::analyst::GeminiClient;
use crate::error::{InsightError, Result};
use crate::models::{AggregatedBa, AnalysisResult};
use std::path::Path;
use tracing::{info, warn};

/// Current phase of the upload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Waiting for input.
    Idle,
    /// CSV aggregation in progress.
    ProcessingData,
    /// Waiting on the external analysis call.
    AnalyzingAi,
    /// Both phases completed; data and analysis are available.
    Success,
    /// A phase failed; the message is stored, data is not shown.
    Error,
}

/// Holds the state of one upload-to-report cycle.
pub struct Pipeline {
    state: PipelineState,
    data: Vec<AggregatedBa>,
    analysis: Option<AnalysisResult>,
    error: Option<String>,
    /// Language for the analysis narrative.
    language: String,
    /// Determinism control for the analysis call.
    temperature: f32,
}

impl Pipeline {
    pub fn new(language: String, temperature: f32) -> Self {
        Self {
            state: PipelineState::Idle,
            data: Vec::new(),
            analysis: None,
            error: None,
            language,
            temperature,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Aggregated business areas of the current cycle, first-seen order.
    pub fn data(&self) -> &[AggregatedBa] {
        &self.data
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// The stored failure message, present only in the `Error` state.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submit raw CSV text, running the aggregation phase.
    ///
    /// Transitions `Idle -> ProcessingData`, then to `AnalyzingAi` on
    /// success or `Error` on failure. Rejected while another cycle is
    /// in flight or until the previous cycle is reset.
    pub fn submit(&mut self, raw_text: &str) -> Result<()> {
        if self.state != PipelineState::Idle {
            return Err(InsightError::Unexpected(
                "A cycle is already in progress; reset before submitting again".to_string(),
            ));
        }

        self.state = PipelineState::ProcessingData;
        self.error = None;

        match aggregate(raw_text) {
            Ok(data) => {
                info!("Aggregated {} business areas", data.len());
                self.data = data;
                self.state = PipelineState::AnalyzingAi;
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Run the analysis phase against the given client.
    ///
    /// Only valid in `AnalyzingAi`. Transitions to `Success` or
    /// `Error`. The call is awaited to completion; there is no retry
    /// and no cancellation.
    pub async fn run_analysis(&mut self, client: &GeminiClient) -> Result<()> {
        if self.state != PipelineState::AnalyzingAi {
            return Err(InsightError::Unexpected(
                "No aggregated data pending analysis".to_string(),
            ));
        }

        let request = build_request(&self.data, &self.language, self.temperature);

        match client.analyze(&request).await {
            Ok(result) => {
                let gaps = coverage_gaps(&result, &self.data);
                if !gaps.unassigned.is_empty() {
                    warn!("BAs not assigned to any cluster: {:?}", gaps.unassigned);
                }
                if !gaps.duplicated.is_empty() {
                    warn!("BAs assigned to multiple clusters: {:?}", gaps.duplicated);
                }

                self.analysis = Some(result);
                self.state = PipelineState::Success;
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Discard all held data and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = PipelineState::Idle;
        self.data = Vec::new();
        self.analysis = None;
        self.error = None;
    }

    fn fail(&mut self, error: &InsightError) {
        self.error = Some(error.message().to_string());
        self.state = PipelineState::Error;
    }
}

/// Read the full input file as text.
///
/// A single suspend point with one success/failure outcome; read
/// failures are surfaced as unexpected errors with the path included.
pub async fn read_input(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| InsightError::Unexpected(format!("Failed to read file {}: {}", path.display(), e)))
}
