//! Stage artifacts - what each pipeline stage hands to the next
//!
//! Text artifacts are kept as JSON objects once a stage asked for structured
//! output; image artifacts live on disk (see the workflow's artifact store).

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AspectRatio;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extracting,
    Synthesizing,
    Generating,
    Critiquing,
    Repairing,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extracting => "extracting",
            Stage::Synthesizing => "synthesizing",
            Stage::Generating => "generating",
            Stage::Critiquing => "critiquing",
            Stage::Repairing => "repairing",
            Stage::Done => "done",
        }
    }

    /// Next stage in the linear chain; `Done` is terminal
    pub fn next(&self) -> Stage {
        match self {
            Stage::Extracting => Stage::Synthesizing,
            Stage::Synthesizing => Stage::Generating,
            Stage::Generating => Stage::Critiquing,
            Stage::Critiquing => Stage::Repairing,
            Stage::Repairing | Stage::Done => Stage::Done,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the extraction stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    /// Free-text analysis of the topic
    pub raw_extraction: String,
    /// Product name/logo description from reference images
    pub product_insights: Option<String>,
    /// Consolidated summary object
    pub consolidated: Map<String, Value>,
    /// Consolidated summary with unavailable fields removed
    pub cleaned: Map<String, Value>,
}

/// Structured banner brief that drives image generation
///
/// Keys are whatever the text model produced; accessors match well-known
/// fields ignoring case, spaces, dashes and underscores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor {
    fields: Map<String, Value>,
}

impl Descriptor {
    pub fn from_object(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a top-level field by normalized key
    pub fn get(&self, key: &str) -> Option<&Value> {
        let wanted = normalize_key(key);
        self.fields
            .iter()
            .find(|(k, _)| normalize_key(k) == wanted)
            .map(|(_, v)| v)
    }

    /// Field rendered as display text (strings unquoted, arrays comma-joined)
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_text)
    }

    pub fn objective(&self) -> Option<String> {
        self.text("objective")
    }

    pub fn festival(&self) -> Option<String> {
        self.text("festival")
    }

    pub fn headline(&self) -> Option<String> {
        self.text("headline")
    }

    pub fn cta(&self) -> Option<String> {
        self.text("cta")
    }

    pub fn color_scheme(&self) -> Option<String> {
        self.text("color_scheme")
    }

    pub fn promotional_offer(&self) -> Option<String> {
        self.text("promotional_offer")
    }

    /// Compact JSON form embedded into prompts
    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        other => Some(other.to_string()),
    }
}

/// Score the critique gave one rubric category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    /// Out of 10
    pub score: f32,
}

/// Quality report for the current image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    /// Report text as returned by the model; drives the repair prompt
    pub report: String,
    /// Scores recovered from the report (may be empty)
    pub scores: Vec<CategoryScore>,
    /// Categories scoring below this need fixing
    pub threshold: u8,
}

impl Critique {
    /// Categories scoring under the threshold
    pub fn failing_categories(&self) -> Vec<&CategoryScore> {
        self.scores
            .iter()
            .filter(|s| s.score < f32::from(self.threshold))
            .collect()
    }

    pub fn lowest_score(&self) -> Option<f32> {
        self.scores.iter().map(|s| s.score).reduce(f32::min)
    }
}

/// Every text artifact produced during one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub topic: String,
    pub aspect_ratio: Option<AspectRatio>,
    pub raw_extraction: String,
    pub product_insights: Option<String>,
    pub consolidated_summary: Map<String, Value>,
    pub cleaned_summary: Map<String, Value>,
    pub descriptor: Descriptor,
}

/// Result of a completed banner run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerOutcome {
    /// Final banner location
    pub output_path: PathBuf,
    /// Working file that held every intermediate image
    pub temp_path: PathBuf,
    /// Number of edit operations applied (1 or 2)
    pub edit_passes: u32,
    /// Critiques in the order they were taken
    pub critiques: Vec<Critique>,
    pub session: SessionRecord,
    pub completed_at: DateTime<Utc>,
}
