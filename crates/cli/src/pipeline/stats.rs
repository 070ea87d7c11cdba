//! Run report printed after a banner run.

use std::time::Duration;

use contracts::BannerOutcome;
use observability::StageTimings;
use serde::Serialize;

/// Everything the CLI reports about one run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: BannerOutcome,
    pub timings: StageTimings,
    /// Wall-clock duration including service setup
    pub duration: Duration,
    /// "remote" or "mock"
    pub services: &'static str,
}

#[derive(Serialize)]
struct ReportJson<'a> {
    services: &'a str,
    duration_ms: u128,
    stage_ms: Vec<StageJson>,
    #[serde(flatten)]
    outcome: &'a BannerOutcome,
}

#[derive(Serialize)]
struct StageJson {
    stage: &'static str,
    calls: u64,
    total_ms: f64,
}

impl RunReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        let report = ReportJson {
            services: self.services,
            duration_ms: self.duration.as_millis(),
            stage_ms: self
                .timings
                .iter()
                .map(|(stage, stats)| StageJson {
                    stage,
                    calls: stats.count,
                    total_ms: stats.total_ms,
                })
                .collect(),
            outcome: &self.outcome,
        };
        serde_json::to_string_pretty(&report)
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let outcome = &self.outcome;
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                       Banner Summary                         ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("🖼  Output");
        println!("   ├─ Banner: {}", outcome.output_path.display());
        println!("   ├─ Working image: {}", outcome.temp_path.display());
        println!("   ├─ Edit passes: {}", outcome.edit_passes);
        println!("   ├─ Services: {}", self.services);
        println!("   └─ Duration: {:.2}s", self.duration.as_secs_f64());

        let descriptor = &outcome.session.descriptor;
        println!("\n📝 Descriptor");
        println!("   ├─ Objective: {}", or_dash(descriptor.objective()));
        println!("   ├─ Festival: {}", or_dash(descriptor.festival()));
        println!("   ├─ Headline: {}", or_dash(descriptor.headline()));
        println!("   ├─ CTA: {}", or_dash(descriptor.cta()));
        println!("   ├─ Colors: {}", or_dash(descriptor.color_scheme()));
        println!("   └─ Offer: {}", or_dash(descriptor.promotional_offer()));

        for (i, critique) in outcome.critiques.iter().enumerate() {
            println!("\n🔍 Critique {}", i + 1);
            if critique.scores.is_empty() {
                println!("   └─ (no scores recognized)");
                continue;
            }
            let last = critique.scores.len() - 1;
            for (j, score) in critique.scores.iter().enumerate() {
                let prefix = if j == last { "└─" } else { "├─" };
                let flag = if score.score < f32::from(critique.threshold) {
                    "  ⚠"
                } else {
                    ""
                };
                println!("   {} {}: {}/10{}", prefix, score.category, score.score, flag);
            }
        }

        if !self.timings.is_empty() {
            println!("\n⏱  {}", self.timings);
        }
        println!();
    }
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}
