//! Multi-stage image analysis.
//!
//! An image is uploaded to each configured stage in order. A stage that
//! rejects the image (for example, "this is not a scalp photo") stops the run.

use tracing::debug;

use crate::{
    decode::decode_stage_verdict, wire, AnalysisOutcome, Body, FormPart, HairscanError, Request,
    ResilientClient, Result,
};

/// Joins a base URL and a path with exactly one `/` between them.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim().trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    )
}

/// Image to analyze.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// One classifier endpoint in the analysis chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnalysisStage {
    pub name: String,
    /// Path relative to the analyzer base URL.
    pub path: String,
}

impl AnalysisStage {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Runs an image through a sequence of remote classifier stages.
#[derive(Clone, Debug)]
pub struct ImageAnalyzer {
    client: ResilientClient,
    base_url: String,
    stages: Vec<AnalysisStage>,
    field_name: String,
}

impl ImageAnalyzer {
    /// Creates an analyzer with the `screen` then `classify` stages.
    pub fn new(client: ResilientClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            stages: vec![
                AnalysisStage::new("screen", "/analysis/screen"),
                AnalysisStage::new("classify", "/analysis/classify"),
            ],
            field_name: "image".to_owned(),
        }
    }

    pub fn with_stages<I>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = AnalysisStage>,
    {
        self.stages = stages.into_iter().collect();
        self
    }

    /// Sets the multipart field the image is uploaded under.
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    pub fn stages(&self) -> &[AnalysisStage] {
        &self.stages
    }

    /// Uploads `image` to every stage in order and collects their verdicts.
    pub async fn analyze(&self, image: &ImageUpload) -> Result<AnalysisOutcome> {
        if image.bytes.is_empty() {
            return Err(HairscanError::InvalidRequest(format!(
                "image '{}' is empty",
                image.file_name
            )));
        }
        if self.stages.is_empty() {
            return Err(HairscanError::InvalidRequest(
                "analyzer has no stages".to_owned(),
            ));
        }

        let mut completed = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            debug!(stage = %stage.name, bytes = image.bytes.len(), "running analysis stage");
            let response: wire::StageResponse =
                self.client.send_json(self.stage_request(stage, image)).await?;
            let verdict = decode_stage_verdict(&stage.name, response)?;

            if !verdict.accepted {
                debug!(stage = %stage.name, label = %verdict.label, "image rejected");
                return Ok(AnalysisOutcome::Rejected { verdict, completed });
            }
            completed.push(verdict);
        }

        Ok(AnalysisOutcome::Completed(completed))
    }

    fn stage_request(&self, stage: &AnalysisStage, image: &ImageUpload) -> Request {
        Request::post(join_url(&self.base_url, &stage.path))
            .header("accept", "application/json")
            .body(Body::Multipart(vec![
                FormPart::file(
                    self.field_name.clone(),
                    image.file_name.clone(),
                    image.content_type.clone(),
                    image.bytes.clone(),
                ),
                FormPart::text("stage", stage.name.clone()),
            ]))
    }
}
