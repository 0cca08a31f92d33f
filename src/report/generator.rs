//! Markdown report generation.
//!
//! Renders the ordered aggregate table and the AI analysis (clusters
//! and executive summary) as a Markdown document. This is the only
//! consumer of the pipeline's output; it must tolerate runs where no
//! distinct key survived aggregation (all rows malformed) and dry
//! runs with no analysis attached.

use crate::models::{AggregatedBa, AnalysisResult, ClusterData, InsightReport, ReportMetadata};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &InsightReport) -> String {
    let mut output = String::new();

    output.push_str("# Business Area Insight Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_data_section(&report.data));

    if let Some(ref analysis) = report.analysis {
        output.push_str(&generate_clusters_section(&analysis.clusters));
        output.push_str(&generate_summary_section(analysis));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input File:** `{}`\n", metadata.input_file));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!(
        "- **Business Areas:** {}\n",
        metadata.business_areas
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the aggregated data table, in first-seen order.
fn generate_data_section(data: &[AggregatedBa]) -> String {
    let mut section = String::new();

    section.push_str("## Aggregated Business Areas\n\n");

    if data.is_empty() {
        section.push_str("No business areas could be aggregated from the input file. ");
        section.push_str("Every data row was malformed or the file had no usable rows.\n\n");
        return section;
    }

    section.push_str("| BA | Total Amount | Transactions | Average | Std Dev |\n");
    section.push_str("|:---|---:|---:|---:|---:|\n");

    for row in data {
        section.push_str(&format!(
            "| {} | {:.2} | {} | {:.2} | {:.2} |\n",
            row.ba, row.total_amount, row.transaction_count, row.avg_amount, row.std_dev_amount
        ));
    }
    section.push('\n');

    section
}

/// Generate one section per cluster.
fn generate_clusters_section(clusters: &[ClusterData]) -> String {
    let mut section = String::new();

    section.push_str("## Segments\n\n");

    if clusters.is_empty() {
        section.push_str("The analysis returned no segments.\n\n");
        return section;
    }

    for cluster in clusters {
        section.push_str(&generate_cluster_block(cluster));
    }

    section
}

/// Generate a single cluster block.
fn generate_cluster_block(cluster: &ClusterData) -> String {
    let mut block = String::new();

    block.push_str(&format!("### {}\n\n", cluster.name));
    block.push_str(&format!("{}\n\n", cluster.description));
    block.push_str(&format!(
        "> **Customer Persona:** {}\n\n",
        cluster.customer_persona
    ));

    if !cluster.characteristics.is_empty() {
        block.push_str("**Characteristics:**\n\n");
        for characteristic in &cluster.characteristics {
            block.push_str(&format!("- {}\n", characteristic));
        }
        block.push('\n');
    }

    if !cluster.member_bas.is_empty() {
        block.push_str(&format!(
            "**Members ({}):** {}\n\n",
            cluster.member_bas.len(),
            cluster.member_bas.join(", ")
        ));
    }

    block.push_str("---\n\n");

    block
}

/// Generate the executive summary section.
fn generate_summary_section(analysis: &AnalysisResult) -> String {
    let summary = &analysis.executive_summary;
    let mut section = String::new();

    section.push_str("## Executive Summary\n\n");
    section.push_str(&summary.overview);
    section.push_str("\n\n");

    if !summary.strategic_recommendations.is_empty() {
        section.push_str("### Strategic Recommendations\n\n");
        for (i, recommendation) in summary.strategic_recommendations.iter().enumerate() {
            section.push_str(&format!("{}. {}\n", i + 1, recommendation));
        }
        section.push('\n');
    }

    if !summary.policy_implications.is_empty() {
        section.push_str("### Policy Implications\n\n");
        for (i, implication) in summary.policy_implications.iter().enumerate() {
            section.push_str(&format!("{}. {}\n", i + 1, implication));
        }
        section.push('\n');
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by ba-insight*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &InsightReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a Markdown report to a file.
#[allow(dead_code)] // Alternative to writing at the call site
pub fn write_report(report: &InsightReport, path: &Path) -> Result<()> {
    let content = generate_markdown_report(report);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
