//! Banner pipeline controller
//!
//! Drives one run through extraction, synthesis, generation, critique and
//! repair, then saves the last accepted image. Services are injected once;
//! each stage takes the previous stage's artifact and returns the next.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use contracts::{
    AspectRatio, BannerConfig, BannerOutcome, BannerRequest, ContractError, Critique, Descriptor,
    ExtractedInfo, ImageData, ImageEditRequest, ImageEditor, ImageGenerationRequest, ImageGenerator,
    SessionRecord, Stage, TextGenerator, TextRequest,
};
use observability::{record_edit_pass, record_run, record_service_call, StageTimings};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::critique::parse_critique;
use crate::error::{Result, WorkflowError};
use crate::imaging;
use crate::naming::output_file_name;
use crate::prompts;
use crate::store::ArtifactStore;
use crate::structured::parse_object;

/// Tunables taken from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Critique categories scoring below this get fixes
    pub score_threshold: u8,
    /// Topic characters kept in the output file name
    pub max_filename_len: usize,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            score_threshold: 8,
            max_filename_len: 50,
        }
    }
}

impl WorkflowSettings {
    pub fn from_config(config: &BannerConfig) -> Self {
        Self {
            score_threshold: config.quality.score_threshold,
            max_filename_len: config.quality.max_filename_len,
        }
    }
}

/// Output of the repair stage
#[derive(Debug, Clone, PartialEq)]
pub struct RepairResult {
    /// Critiques in the order they were taken
    pub critiques: Vec<Critique>,
    /// Edits applied to the working image (1 or 2)
    pub edit_passes: u32,
    /// Working image after the last edit
    pub temp_path: PathBuf,
}

/// Banner generation pipeline
pub struct BannerPipeline<T, I, E> {
    text: T,
    generator: I,
    editor: E,
    store: ArtifactStore,
    settings: WorkflowSettings,
}

impl<T, I, E> BannerPipeline<T, I, E>
where
    T: TextGenerator + Sync,
    I: ImageGenerator + Sync,
    E: ImageEditor + Sync,
{
    pub fn new(
        text: T,
        generator: I,
        editor: E,
        store: ArtifactStore,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            text,
            generator,
            editor,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Run every stage and save the finished banner
    pub async fn execute(&self, request: &BannerRequest) -> Result<BannerOutcome> {
        self.execute_timed(request).await.map(|(outcome, _)| outcome)
    }

    /// Like [`execute`](Self::execute), also returning per-stage timings
    #[instrument(
        name = "banner_run",
        skip(self, request),
        fields(topic = %request.topic, quality_check = request.quality_check)
    )]
    pub async fn execute_timed(
        &self,
        request: &BannerRequest,
    ) -> Result<(BannerOutcome, StageTimings)> {
        let mut timings = StageTimings::new();
        let result = self.run(request, &mut timings).await;
        record_run(result.is_ok());

        match &result {
            Ok(outcome) => info!(
                output = %outcome.output_path.display(),
                edit_passes = outcome.edit_passes,
                total_ms = timings.total_ms(),
                "banner run complete"
            ),
            Err(e) => warn!(error = %e, stage = ?e.failed_stage(), "banner run failed"),
        }
        result.map(|outcome| (outcome, timings))
    }

    async fn run(
        &self,
        request: &BannerRequest,
        timings: &mut StageTimings,
    ) -> Result<BannerOutcome> {
        check_request(request)?;

        let started = Instant::now();
        let extracted = self.extract_information(request).await?;
        stage_done(timings, Stage::Extracting, started);

        let started = Instant::now();
        let descriptor = self.synthesize_prompt(&extracted).await?;
        stage_done(timings, Stage::Synthesizing, started);

        let started = Instant::now();
        self.generate_image(&descriptor, request.aspect_ratio).await?;
        stage_done(timings, Stage::Generating, started);

        let repaired = self
            .run_repair(&descriptor, request.quality_check, timings)
            .await?;
        let output_path = self.finalize(&request.topic).await?;

        Ok(BannerOutcome {
            output_path,
            temp_path: repaired.temp_path,
            edit_passes: repaired.edit_passes,
            critiques: repaired.critiques,
            session: SessionRecord {
                topic: request.topic.clone(),
                aspect_ratio: request.aspect_ratio,
                raw_extraction: extracted.raw_extraction,
                product_insights: extracted.product_insights,
                consolidated_summary: extracted.consolidated,
                cleaned_summary: extracted.cleaned,
                descriptor,
            },
            completed_at: Utc::now(),
        })
    }

    /// Topic analysis, optional image insights, consolidation, cleanup
    ///
    /// Three text calls without reference images, four with them.
    #[instrument(
        name = "stage_extract",
        skip(self, request),
        fields(images = request.images.len())
    )]
    pub async fn extract_information(&self, request: &BannerRequest) -> Result<ExtractedInfo> {
        let stage = Stage::Extracting;

        let raw_extraction = self
            .ask(stage, TextRequest::text(prompts::topic_analysis(&request.topic)))
            .await?;

        let product_insights = if request.has_images() {
            let insights = self.describe_images(&request.images).await?;
            info!(insights = %insights, "reference images examined");
            Some(insights)
        } else {
            None
        };

        let prompt = prompts::consolidate(&raw_extraction, product_insights.as_deref());
        let reply = self.ask(stage, TextRequest::json(prompt)).await?;
        let consolidated = parse_reply(stage, &reply)?;

        let prompt = prompts::scrub_unavailable(&object_json(&consolidated));
        let reply = self.ask(stage, TextRequest::json(prompt)).await?;
        let cleaned = parse_reply(stage, &reply)?;

        info!(
            consolidated_fields = consolidated.len(),
            cleaned_fields = cleaned.len(),
            "information collection complete"
        );
        Ok(ExtractedInfo {
            raw_extraction,
            product_insights,
            consolidated,
            cleaned,
        })
    }

    /// Fill the cleaned summary into the final descriptor
    #[instrument(name = "stage_synthesize", skip(self, extracted))]
    pub async fn synthesize_prompt(&self, extracted: &ExtractedInfo) -> Result<Descriptor> {
        let stage = Stage::Synthesizing;

        let prompt = prompts::fill_descriptor(&object_json(&extracted.cleaned));
        let reply = self.ask(stage, TextRequest::json(prompt)).await?;
        let fields = parse_reply(stage, &reply)?;
        if fields.is_empty() {
            return Err(WorkflowError::stage(
                stage,
                ContractError::malformed(stage.as_str(), "descriptor has no fields"),
            ));
        }

        let descriptor = Descriptor::from_object(fields);
        info!(
            objective = ?descriptor.objective(),
            festival = ?descriptor.festival(),
            offer = ?descriptor.promotional_offer(),
            "information processed"
        );
        Ok(descriptor)
    }

    /// Generate the initial image into the working file
    #[instrument(name = "stage_generate", skip(self, descriptor))]
    pub async fn generate_image(
        &self,
        descriptor: &Descriptor,
        aspect_ratio: Option<AspectRatio>,
    ) -> Result<PathBuf> {
        let stage = Stage::Generating;
        let request = ImageGenerationRequest::new(
            prompts::generate_banner(&descriptor.to_json()),
            aspect_ratio,
        );

        let result = self.generator.generate_images(request).await;
        record_service_call(self.generator.name(), "generate_images", result.is_ok());
        let image = first_image(stage, result)?;

        let path = self.store.write_temp(image).await?.to_path_buf();
        info!(path = %path.display(), "initial image generated");
        Ok(path)
    }

    /// Score the working image against the descriptor
    #[instrument(name = "stage_critique", skip(self, descriptor))]
    pub async fn critique(&self, descriptor: &Descriptor) -> Result<Critique> {
        let stage = Stage::Critiquing;
        let current = self.store.read_temp().await?;

        let prompt = prompts::critique(&descriptor.to_json(), self.settings.score_threshold);
        let report = self
            .ask(stage, TextRequest::text(prompt).with_images(vec![current]))
            .await?;

        let critique = parse_critique(report, self.settings.score_threshold);
        debug!(report = %critique.report, "critique report");
        info!(
            scored = critique.scores.len(),
            failing = critique.failing_categories().len(),
            lowest = ?critique.lowest_score(),
            "issues identified"
        );
        Ok(critique)
    }

    /// Critique and inpaint once, or twice with `quality_check`
    pub async fn repair(
        &self,
        descriptor: &Descriptor,
        quality_check: bool,
    ) -> Result<RepairResult> {
        let mut timings = StageTimings::new();
        self.run_repair(descriptor, quality_check, &mut timings)
            .await
    }

    #[instrument(name = "stage_repair", skip(self, descriptor, timings))]
    async fn run_repair(
        &self,
        descriptor: &Descriptor,
        quality_check: bool,
        timings: &mut StageTimings,
    ) -> Result<RepairResult> {
        let passes = if quality_check { 2 } else { 1 };
        let mut critiques = Vec::with_capacity(passes);

        for pass in 0..passes {
            let started = Instant::now();
            let critique = self.critique(descriptor).await?;
            stage_done(timings, Stage::Critiquing, started);

            let prompt = if pass == 0 {
                prompts::repair(&critique.report)
            } else {
                prompts::repair_retest(&critique.report)
            };
            let started = Instant::now();
            self.apply_edit(prompt).await?;
            stage_done(timings, Stage::Repairing, started);

            info!(pass = pass + 1, "edited image saved");
            critiques.push(critique);
        }

        Ok(RepairResult {
            critiques,
            edit_passes: passes as u32,
            temp_path: self.store.temp_path().to_path_buf(),
        })
    }

    /// Save the working image under the sanitized topic name
    #[instrument(name = "stage_finalize", skip(self))]
    pub async fn finalize(&self, topic: &str) -> Result<PathBuf> {
        let file_name = output_file_name(topic, self.settings.max_filename_len);
        let path = self.store.save_output(&file_name).await?;
        info!(path = %path.display(), "final image saved");
        Ok(path)
    }

    async fn apply_edit(&self, prompt: String) -> Result<()> {
        let stage = Stage::Repairing;
        let base = self.store.read_temp().await?;

        let result = self
            .editor
            .edit_image(ImageEditRequest::inpaint_background(base, prompt))
            .await;
        record_service_call(self.editor.name(), "edit_image", result.is_ok());
        let edited = first_image(stage, result)?;

        self.store.write_temp(edited).await?;
        record_edit_pass();
        Ok(())
    }

    async fn describe_images(&self, paths: &[PathBuf]) -> Result<String> {
        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            images.push(imaging::load_reference_image(path).await?);
        }

        let request = TextRequest::text(prompts::IMAGE_INSIGHTS).with_images(images);
        let insights = self.ask(Stage::Extracting, request).await?;
        Ok(insights.trim().to_string())
    }

    async fn ask(&self, stage: Stage, request: TextRequest) -> Result<String> {
        let result = self.text.generate(request).await;
        record_service_call(self.text.name(), "generate", result.is_ok());
        result.map_err(|e| WorkflowError::stage(stage, e))
    }
}

fn check_request(request: &BannerRequest) -> Result<()> {
    request
        .validate()
        .map_err(|e| WorkflowError::invalid_request(e.to_string()))?;

    if let Some(missing) = request.images.iter().find(|p| !p.is_file()) {
        return Err(WorkflowError::invalid_request(format!(
            "reference image not found: {}",
            missing.display()
        )));
    }
    Ok(())
}

fn stage_done(timings: &mut StageTimings, stage: Stage, started: Instant) {
    let elapsed = started.elapsed();
    timings.record(stage, elapsed);
    debug!(
        stage = %stage,
        next = %stage.next(),
        elapsed_ms = elapsed.as_millis() as u64,
        "stage finished"
    );
}

fn parse_reply(stage: Stage, reply: &str) -> Result<Map<String, Value>> {
    parse_object(stage, reply).map_err(|e| WorkflowError::stage(stage, e))
}

fn first_image(
    stage: Stage,
    result: std::result::Result<Vec<ImageData>, ContractError>,
) -> Result<ImageData> {
    result
        .map_err(|e| WorkflowError::stage(stage, e))?
        .into_iter()
        .next()
        .ok_or(WorkflowError::NoImageReturned { stage })
}

fn object_json(map: &Map<String, Value>) -> String {
    Value::Object(map.clone()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::PathConfig;
    use model_clients::{MockImageClient, MockImageConfig, MockTextClient, MockTextConfig};
    use std::path::Path;

    type MockPipeline = BannerPipeline<MockTextClient, MockImageClient, MockImageClient>;

    fn pipeline(dir: &Path, text: &MockTextClient, images: &MockImageClient) -> MockPipeline {
        let store = ArtifactStore::from_config_under(dir, &PathConfig::default()).unwrap();
        BannerPipeline::new(
            text.clone(),
            images.clone(),
            images.clone(),
            store,
            WorkflowSettings::default(),
        )
    }

    fn descriptor() -> Descriptor {
        match serde_json::json!({"Festival": "Diwali", "Promotional offer": "FLAT 20% OFF"}) {
            Value::Object(map) => Descriptor::from_object(map),
            _ => unreachable!(),
        }
    }

    fn write_png(path: &Path) {
        image::DynamicImage::new_rgba8(8, 8)
            .save_with_format(path, image::ImageFormat::Png)
            .unwrap();
    }

    #[tokio::test]
    async fn test_extract_without_images_makes_three_calls() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        let request = BannerRequest::new("Diwali Sale on Premium Ghee 1kg Jar");
        let extracted = pipeline.extract_information(&request).await.unwrap();

        let prompts = text.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("perspective: Diwali Sale on Premium Ghee 1kg Jar"));
        assert!(prompts[1].starts_with("Respond concisely and summarize"));
        assert!(prompts[1].contains(&extracted.raw_extraction));
        assert!(prompts[2].starts_with("Respond concisely by scrapping"));
        assert!(prompts[2].contains(r#"{"Product":"Premium Ghee 1kg Jar","Objective":"Conversion","#));
        assert!(extracted.product_insights.is_none());
        assert_eq!(extracted.cleaned["Festival"], "Diwali");
        assert!(!extracted.cleaned.contains_key("Subheadline"));
    }

    #[tokio::test]
    async fn test_extract_with_images_describes_before_summary() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        write_png(&logo);

        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        let request = BannerRequest::new("Ghee").with_images(vec![logo]);
        let extracted = pipeline.extract_information(&request).await.unwrap();

        let requests = text.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[1].prompt, prompts::IMAGE_INSIGHTS);
        assert_eq!(requests[1].images.len(), 1);
        assert!(requests[1].images[0].is_jpeg());

        let insights = extracted.product_insights.unwrap();
        assert!(requests[2]
            .prompt
            .ends_with(&format!(" Product insights: {insights}")));
    }

    #[tokio::test]
    async fn test_fenced_replies_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::with_config(MockTextConfig {
            fenced_json: true,
            ..Default::default()
        });
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        let extracted = pipeline
            .extract_information(&BannerRequest::new("Ghee"))
            .await
            .unwrap();
        let descriptor = pipeline.synthesize_prompt(&extracted).await.unwrap();
        assert_eq!(descriptor.festival().as_deref(), Some("Diwali"));
        assert_eq!(descriptor.color_scheme().as_deref(), Some("Red, Gold"));
    }

    #[tokio::test]
    async fn test_malformed_descriptor_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::with_config(MockTextConfig {
            replies: vec![("Task: Fill in".into(), "I cannot help with that.".into())],
            ..Default::default()
        });
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        let err = pipeline
            .execute(&BannerRequest::new("Ghee"))
            .await
            .unwrap_err();
        match err {
            WorkflowError::Stage { stage, source } => {
                assert_eq!(stage, Stage::Synthesizing);
                assert!(matches!(source, ContractError::MalformedResponse { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(images.generate_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_descriptor_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::with_config(MockTextConfig {
            replies: vec![("Task: Fill in".into(), "{}".into())],
            ..Default::default()
        });
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        let extracted = pipeline
            .extract_information(&BannerRequest::new("Ghee"))
            .await
            .unwrap();
        assert!(pipeline.synthesize_prompt(&extracted).await.is_err());
    }

    #[tokio::test]
    async fn test_generate_passes_aspect_ratio() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        let path = pipeline
            .generate_image(&descriptor(), Some(AspectRatio::Portrait9x16))
            .await
            .unwrap();
        pipeline.generate_image(&descriptor(), None).await.unwrap();

        assert_eq!(path, dir.path().join("images/temp/temp.jpg"));
        let requests = images.generation_requests();
        assert_eq!(requests[0].aspect_ratio, Some(AspectRatio::Portrait9x16));
        assert_eq!(requests[1].aspect_ratio, None);
        assert!(requests[0]
            .prompt
            .ends_with(&format!("every detail in json:{}", descriptor().to_json())));
    }

    #[tokio::test]
    async fn test_generate_without_images_errors() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::with_config(MockImageConfig {
            return_empty: true,
            ..Default::default()
        });
        let pipeline = pipeline(dir.path(), &text, &images);

        let err = pipeline.generate_image(&descriptor(), None).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::NoImageReturned {
                stage: Stage::Generating
            }
        ));
    }

    #[tokio::test]
    async fn test_repair_single_pass() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        pipeline.generate_image(&descriptor(), None).await.unwrap();
        let before = pipeline.store().read_temp().await.unwrap();
        let repaired = pipeline.repair(&descriptor(), false).await.unwrap();

        assert_eq!(repaired.edit_passes, 1);
        assert_eq!(repaired.critiques.len(), 1);
        let edits = images.edit_requests();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].base_image, before);
        assert_eq!(edits[0].edit_mode.as_str(), "inpainting-insert");
        assert_eq!(edits[0].mask_mode.as_str(), "background");
        assert!(edits[0].prompt.contains("excellent image quality ad by: "));
        assert_ne!(pipeline.store().read_temp().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_repair_quality_check_two_passes() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        pipeline.generate_image(&descriptor(), None).await.unwrap();
        let repaired = pipeline.repair(&descriptor(), true).await.unwrap();

        assert_eq!(repaired.edit_passes, 2);
        assert_eq!(text.count_prefix("Be direct. Quality check"), 2);
        let edits = images.edit_requests();
        assert_eq!(edits.len(), 2);
        assert!(edits[1].prompt.contains("excellent image quality ad edit by: "));

        // second critique looks at the first edit
        let critique_requests: Vec<_> = text
            .requests()
            .into_iter()
            .filter(|r| r.prompt.starts_with("Be direct"))
            .collect();
        assert_ne!(critique_requests[0].images, critique_requests[1].images);
    }

    #[tokio::test]
    async fn test_critique_scores_against_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        pipeline.generate_image(&descriptor(), None).await.unwrap();
        let critique = pipeline.critique(&descriptor()).await.unwrap();

        assert_eq!(critique.threshold, 8);
        assert_eq!(critique.scores.len(), 4);
        assert_eq!(critique.failing_categories().len(), 2);
        let prompt = &text.requests()[0];
        assert!(prompt.prompt.contains(&descriptor().to_json()));
        assert_eq!(prompt.images.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_topic_rejected_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        let err = pipeline.execute(&BannerRequest::new("   ")).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidRequest { .. }));
        assert_eq!(text.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_reference_image_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        let request =
            BannerRequest::new("Ghee").with_images(vec![dir.path().join("nope.png")]);
        let err = pipeline.execute(&request).await.unwrap_err();
        assert!(err.to_string().contains("nope.png"));
        assert_eq!(text.call_count(), 0);
    }

    #[tokio::test]
    async fn test_service_failure_names_stage() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::with_config(MockImageConfig {
            fail_edit: true,
            ..Default::default()
        });
        let pipeline = pipeline(dir.path(), &text, &images);

        let err = pipeline
            .execute(&BannerRequest::new("Ghee"))
            .await
            .unwrap_err();
        assert_eq!(err.failed_stage(), Some(Stage::Repairing));
        assert!(!dir.path().join("images/output/Ghee.jpg").exists());
    }

    #[tokio::test]
    async fn test_execute_timed_records_stages() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = pipeline(dir.path(), &text, &images);

        let request = BannerRequest::new("Ghee").with_quality_check(true);
        let (outcome, timings) = pipeline.execute_timed(&request).await.unwrap();

        assert_eq!(outcome.edit_passes, 2);
        assert_eq!(timings.get(Stage::Critiquing).unwrap().count, 2);
        assert_eq!(timings.get(Stage::Repairing).unwrap().count, 2);
        assert_eq!(timings.get(Stage::Extracting).unwrap().count, 1);
    }
}
