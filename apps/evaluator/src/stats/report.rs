//! Markdown comparison report.

use crate::stats::comparison::{ComparisonRecord, TargetValidation};
use crate::stats::frr::statistical_power;
use crate::stats::summary::RunSummary;

/// Everything the report renders.
pub struct ReportInput<'a> {
    pub record: &'a ComparisonRecord,
    pub validation: &'a TargetValidation,
    pub baseline: &'a RunSummary,
    pub compared: &'a RunSummary,
    pub alpha: f64,
}

pub fn render_report(input: &ReportInput<'_>) -> String {
    let ReportInput {
        record,
        validation,
        baseline,
        compared,
        alpha,
    } = input;
    let mut lines: Vec<String> = Vec::new();

    lines.push("# FRR Comparison Report: Keyword Baseline vs Multi-Stage Screening".to_string());
    lines.push(String::new());

    lines.push("## Summary Statistics".to_string());
    lines.push(format!("- **Baseline System FRR**: {}", pct(record.baseline_frr)));
    lines.push(format!("- **Multi-Stage System FRR**: {}", pct(record.compared_frr)));
    lines.push(format!("- **Absolute Improvement**: {}", pct(record.absolute_improvement)));
    lines.push(format!("- **Relative Improvement**: {}", pct(record.relative_improvement)));
    lines.push(format!(
        "- **Sample Size**: {} candidates",
        thousands(record.sample_size)
    ));
    lines.push(String::new());

    lines.push("## Statistical Analysis".to_string());
    lines.push(format!("- **Effect Size (Cohen's h)**: {:.3}", record.effect_size));
    lines.push(format!(
        "- **Effect Magnitude**: {}",
        record.effect_magnitude().label()
    ));
    lines.push(format!(
        "- **Statistical Significance**: {}",
        if record.statistically_significant { "Yes" } else { "No" }
    ));
    lines.push(format!(
        "- **95% Confidence Interval (improvement)**: [{}, {}]",
        pct(record.confidence_interval.0),
        pct(record.confidence_interval.1)
    ));
    lines.push(format!(
        "- **Statistical Power (α = {alpha})**: {}",
        pct(statistical_power(
            record.sample_size,
            baseline.target,
            compared.target,
            *alpha
        ))
    ));
    lines.push(String::new());

    lines.push("## Detailed Per-System Comparison".to_string());
    push_system(&mut lines, "Baseline System (Keyword Matching)", baseline);
    push_system(&mut lines, "Multi-Stage System (Scoring + Review Triage)", compared);

    let fewer = record.baseline_stats.false_rejections as i64
        - record.compared_stats.false_rejections as i64;
    lines.push("## Business Impact".to_string());
    lines.push(format!(
        "- **Fewer False Rejections**: {} qualified candidates no longer incorrectly rejected",
        signed_thousands(fewer)
    ));
    lines.push(format!(
        "- **Candidate Experience**: {} reduction in qualified candidate rejections",
        pct(record.relative_improvement)
    ));
    lines.push(String::new());

    lines.push("## Target Validation".to_string());
    for (name, passed) in validation.criteria() {
        let status = if passed { "PASSED" } else { "FAILED" };
        lines.push(format!("- **{name}**: {status}"));
    }
    lines.push(String::new());

    lines.push("## Overall Assessment".to_string());
    if validation.meets_all_criteria {
        lines.push(
            "**SUCCESS**: the multi-stage system significantly reduces FRR and meets all evaluation criteria."
                .to_string(),
        );
    } else if record.absolute_improvement > 0.0 {
        lines.push(
            "**PARTIAL SUCCESS**: FRR improved, but not every evaluation criterion is met."
                .to_string(),
        );
    } else {
        lines.push("**NO IMPROVEMENT**: the multi-stage system did not lower FRR.".to_string());
    }

    lines.join("\n")
}

fn push_system(lines: &mut Vec<String>, title: &str, summary: &RunSummary) {
    let stats = &summary.stats;
    lines.push(format!("### {title}"));
    lines.push(format!("- Total Candidates: {}", thousands(stats.total)));
    lines.push(format!("- Qualified Candidates: {}", thousands(stats.qualified)));
    lines.push(format!("- False Rejections: {}", thousands(stats.false_rejections)));
    lines.push(format!("- False Acceptances: {}", thousands(stats.false_acceptances)));
    lines.push(format!("- Accuracy: {}", pct(stats.accuracy())));
    lines.push(format!(
        "- FRR: {} (95% CI [{}, {}], target {} ± {}: {})",
        pct(summary.frr),
        pct(summary.confidence_interval.0),
        pct(summary.confidence_interval.1),
        pct(summary.target),
        pct(summary.tolerance),
        if summary.validated { "PASSED" } else { "FAILED" }
    ));
    if summary.failures > 0 || summary.skipped > 0 {
        lines.push(format!(
            "- Excluded: {} failed, {} without a job category",
            thousands(summary.failures),
            thousands(summary.skipped)
        ));
    }
    lines.push(String::new());
}

/// Fraction as a percentage with one decimal place.
pub fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// 1234567 → "1,234,567".
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn signed_thousands(n: i64) -> String {
    if n < 0 {
        format!("-{}", thousands(n.unsigned_abs() as usize))
    } else {
        thousands(n as usize)
    }
}
