//! Critique report parsing
//!
//! Scores are best effort: the report text always drives the repair prompt,
//! the parsed scores only feed logging and the run summary.

use contracts::{CategoryScore, Critique};
use once_cell::sync::Lazy;
use regex::Regex;

static SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}(?:\.\d+)?)\s*/\s*10\b").expect("valid score regex"));
static LIST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]\s*").expect("valid list number regex"));
static TRAILING_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\s(:\-–*]*(?:score|rating)?[\s(:\-–*]*$").expect("valid label regex")
});

/// Build a critique from the model's report
pub fn parse_critique(report: impl Into<String>, threshold: u8) -> Critique {
    let report = report.into();
    let scores = parse_scores(&report);
    Critique {
        report,
        scores,
        threshold,
    }
}

/// Recover `category: N/10` style scores, one per line
pub fn parse_scores(report: &str) -> Vec<CategoryScore> {
    report.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<CategoryScore> {
    let caps = SCORE.captures(line)?;
    let whole = caps.get(0)?;
    let score: f32 = caps[1].parse().ok()?;

    let label = line[..whole.start()].trim_start_matches(|c: char| !c.is_alphanumeric());
    let label = LIST_NUMBER.replace(label, "");
    let label = TRAILING_LABEL.replace(&label, "");
    let category = label.trim_matches(|c: char| !c.is_alphanumeric());
    if category.is_empty() {
        return None;
    }

    Some(CategoryScore {
        category: category.to_string(),
        score: score.clamp(0.0, 10.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "1. Promotional offer: 6/10 - the offer text is missing; add \"FLAT 20% OFF\".
2. Grammar - 9 / 10
**3. Color palette**: 7.5/10. Shift the background to red and gold.
- **Festival theme (Score: 10/10)**
Overall the banner is close.";

    #[test]
    fn test_parse_scores() {
        let scores = parse_scores(REPORT);
        let pairs: Vec<(&str, f32)> = scores
            .iter()
            .map(|s| (s.category.as_str(), s.score))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Promotional offer", 6.0),
                ("Grammar", 9.0),
                ("Color palette", 7.5),
                ("Festival theme", 10.0),
            ]
        );
    }

    #[test]
    fn test_failing_categories_use_threshold() {
        let critique = parse_critique(REPORT, 8);
        let failing: Vec<&str> = critique
            .failing_categories()
            .iter()
            .map(|s| s.category.as_str())
            .collect();
        assert_eq!(failing, vec!["Promotional offer", "Color palette"]);
        assert_eq!(critique.lowest_score(), Some(6.0));
        assert_eq!(critique.report, REPORT);
    }

    #[test]
    fn test_report_without_scores() {
        let critique = parse_critique("Make the headline larger.", 8);
        assert!(critique.scores.is_empty());
        assert!(critique.failing_categories().is_empty());
        assert_eq!(critique.lowest_score(), None);
    }

    #[test]
    fn test_bare_score_line_is_skipped() {
        assert!(parse_scores("Score: 8/10").is_empty());
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let scores = parse_scores("Grammar: 12/10");
        assert_eq!(scores[0].score, 10.0);
    }
}
