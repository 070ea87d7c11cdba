//! # Integration Tests
//!
//! End-to-end runs of the banner pipeline against mock services.
//!
//! Covers:
//! - config defaults agreeing with the workflow defaults
//! - full mock runs (no network)
//! - configuration driving a run

#[cfg(test)]
mod contract_tests {
    use std::path::Path;

    use config_loader::{ConfigFormat, ConfigLoader};
    use workflow::WorkflowSettings;

    /// A config with only credentials runs with the documented defaults
    #[test]
    fn test_minimal_config_matches_workflow_defaults() {
        let toml = r#"
[credentials]
gemini_api_key = "k"
gcp_project_id = "p"
"#;
        let config = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();

        assert_eq!(
            WorkflowSettings::from_config(&config),
            WorkflowSettings::default()
        );
        assert_eq!(config.paths.temp_path(), Path::new("images/temp/temp.jpg"));
        assert_eq!(config.paths.output_dir, Path::new("images/output"));
        assert_eq!(config.vertex.location, "us-central1");
        assert_eq!(config.http.timeout_secs, 120);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::{Path, PathBuf};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{AspectRatio, BannerRequest, PathConfig, Stage};
    use model_clients::{MockImageClient, MockImageConfig, MockTextClient, MockTextConfig};
    use workflow::{ArtifactStore, BannerPipeline, WorkflowError, WorkflowSettings};

    const DIWALI_TOPIC: &str = "Diwali Sale on Premium Ghee 1kg Jar";

    type MockPipeline = BannerPipeline<MockTextClient, MockImageClient, MockImageClient>;

    fn build(dir: &Path, text: &MockTextClient, images: &MockImageClient) -> MockPipeline {
        let store = ArtifactStore::from_config_under(dir, &PathConfig::default()).unwrap();
        BannerPipeline::new(
            text.clone(),
            images.clone(),
            images.clone(),
            store,
            WorkflowSettings::default(),
        )
    }

    fn write_reference(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(16, 16, image::Rgb([200, 160, 40]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        path
    }

    /// Topic only: 3 extraction calls, 1 synthesis, 1 critique, 1 generate, 1 edit
    #[tokio::test]
    async fn test_e2e_diwali_topic_only() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = build(dir.path(), &text, &images);

        let outcome = pipeline
            .execute(&BannerRequest::new(DIWALI_TOPIC))
            .await
            .unwrap();

        let expected = dir
            .path()
            .join("images/output/Diwali_Sale_on_Premium_Ghee_1kg_Jar.jpg");
        assert_eq!(outcome.output_path, expected);
        assert!(expected.is_file());
        assert!(dir.path().join("images/temp/temp.jpg").is_file());

        assert_eq!(text.call_count(), 5);
        assert_eq!(text.count_prefix("Deep analyze"), 1);
        assert_eq!(text.count_prefix("Respond concisely and summarize"), 1);
        assert_eq!(text.count_prefix("Respond concisely by scrapping"), 1);
        assert_eq!(text.count_prefix("Task: Fill in"), 1);
        assert_eq!(text.count_prefix("Be direct. Quality check"), 1);
        assert_eq!(images.generate_count(), 1);
        assert_eq!(images.edit_count(), 1);

        assert_eq!(outcome.edit_passes, 1);
        assert_eq!(outcome.critiques.len(), 1);
        assert!(outcome.session.product_insights.is_none());
        assert_eq!(
            outcome.session.descriptor.festival().as_deref(),
            Some("Diwali")
        );

        let saved = image::open(&expected).unwrap();
        assert!(saved.width() > 0);
        let bytes = std::fs::read(&expected).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_e2e_reference_images_described_before_summary() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_reference(dir.path(), "jar.png");
        let second = write_reference(dir.path(), "label.png");
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = build(dir.path(), &text, &images);

        let request = BannerRequest::new(DIWALI_TOPIC).with_images([first, second]);
        let outcome = pipeline.execute(&request).await.unwrap();

        let prompts = text.prompts();
        assert_eq!(prompts.len(), 6);
        assert!(prompts[0].starts_with("Deep analyze"));
        assert!(prompts[1].starts_with("Examine the set of images"));
        assert!(prompts[2].starts_with("Respond concisely and summarize"));
        assert!(prompts[2].contains("Product insights: "));

        let requests = text.requests();
        assert_eq!(requests[1].images.len(), 2);
        assert!(outcome.session.product_insights.is_some());
    }

    #[tokio::test]
    async fn test_e2e_aspect_ratio_reaches_generator() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = build(dir.path(), &text, &images);

        let request =
            BannerRequest::new(DIWALI_TOPIC).with_aspect_ratio(AspectRatio::Landscape16x9);
        let outcome = pipeline.execute(&request).await.unwrap();

        let generated = images.generation_requests();
        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].aspect_ratio, Some(AspectRatio::Landscape16x9));

        let saved = image::open(&outcome.output_path).unwrap();
        assert!(saved.width() > saved.height());
    }

    #[tokio::test]
    async fn test_e2e_quality_check_edits_twice() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = build(dir.path(), &text, &images);

        let request = BannerRequest::new(DIWALI_TOPIC).with_quality_check(true);
        let (outcome, timings) = pipeline.execute_timed(&request).await.unwrap();

        assert_eq!(outcome.edit_passes, 2);
        assert_eq!(outcome.critiques.len(), 2);
        assert_eq!(images.edit_count(), 2);
        assert_eq!(text.count_prefix("Be direct. Quality check"), 2);
        assert_eq!(text.call_count(), 6);

        let edits = images.edit_requests();
        assert!(edits[0].prompt.contains("ad by: "));
        assert!(edits[1].prompt.contains("ad edit by: "));

        assert_eq!(timings.get(Stage::Critiquing).map(|t| t.count), Some(2));
        assert_eq!(timings.get(Stage::Repairing).map(|t| t.count), Some(2));
    }

    #[tokio::test]
    async fn test_e2e_rerun_overwrites_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = build(dir.path(), &text, &images);
        let request = BannerRequest::new(DIWALI_TOPIC);

        let first = pipeline.execute(&request).await.unwrap();
        let second = pipeline.execute(&request).await.unwrap();

        assert_eq!(first.output_path, second.output_path);
        let outputs: Vec<_> = std::fs::read_dir(dir.path().join("images/output"))
            .unwrap()
            .collect();
        assert_eq!(outputs.len(), 1);
        assert_eq!(images.generate_count(), 2);
    }

    #[tokio::test]
    async fn test_e2e_config_drives_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            r#"
[credentials]
gemini_api_key = "k"
gcp_project_id = "p"

[paths]
temp_dir = "{temp}"
output_dir = "{out}"

[quality]
score_threshold = 7
max_filename_len = 12
"#,
            temp = dir.path().join("work").display(),
            out = dir.path().join("done").display(),
        );
        let config = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let store = ArtifactStore::from_config(&config.paths).unwrap();
        let pipeline = BannerPipeline::new(
            text.clone(),
            images.clone(),
            images.clone(),
            store,
            WorkflowSettings::from_config(&config),
        );

        let outcome = pipeline
            .execute(&BannerRequest::new(DIWALI_TOPIC))
            .await
            .unwrap();

        assert_eq!(outcome.output_path, dir.path().join("done/Diwali_Sale.jpg"));
        assert_eq!(outcome.critiques[0].threshold, 7);
        assert!(dir.path().join("work/temp.jpg").is_file());
        assert!(text.prompts()[4].contains("score is below 7."));
    }

    #[tokio::test]
    async fn test_e2e_text_failure_stops_before_images() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::with_config(MockTextConfig {
            fail_prompts: vec!["Task: Fill in".into()],
            ..Default::default()
        });
        let images = MockImageClient::new();
        let pipeline = build(dir.path(), &text, &images);

        let err = pipeline
            .execute(&BannerRequest::new(DIWALI_TOPIC))
            .await
            .unwrap_err();

        assert_eq!(err.failed_stage(), Some(Stage::Synthesizing));
        assert_eq!(images.generate_count(), 0);
        let outputs = std::fs::read_dir(dir.path().join("images/output"))
            .unwrap()
            .count();
        assert_eq!(outputs, 0);
    }

    #[tokio::test]
    async fn test_e2e_edit_failure_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::with_config(MockImageConfig {
            fail_edit: true,
            ..Default::default()
        });
        let pipeline = build(dir.path(), &text, &images);

        let err = pipeline
            .execute(&BannerRequest::new(DIWALI_TOPIC))
            .await
            .unwrap_err();

        assert_eq!(err.failed_stage(), Some(Stage::Repairing));
        let outputs = std::fs::read_dir(dir.path().join("images/output"))
            .unwrap()
            .count();
        assert_eq!(outputs, 0);
    }

    #[tokio::test]
    async fn test_e2e_empty_generation_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::with_config(MockImageConfig {
            return_empty: true,
            ..Default::default()
        });
        let pipeline = build(dir.path(), &text, &images);

        let err = pipeline
            .execute(&BannerRequest::new(DIWALI_TOPIC))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::NoImageReturned {
                stage: Stage::Generating
            }
        ));
    }

    #[tokio::test]
    async fn test_e2e_missing_reference_image() {
        let dir = tempfile::tempdir().unwrap();
        let text = MockTextClient::new();
        let images = MockImageClient::new();
        let pipeline = build(dir.path(), &text, &images);

        let request =
            BannerRequest::new(DIWALI_TOPIC).with_images([dir.path().join("nope.png")]);
        let err = pipeline.execute(&request).await.unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidRequest { .. }));
        assert_eq!(text.call_count(), 0);
    }
}
