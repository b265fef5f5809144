//! Pipeline registry.
//!
//! Each supported pipeline is a variant of [`Pipeline`] carrying its own
//! parameter shape ([`PipelineParams`]) and validation rules. The
//! [`PipelineRegistry`] maps a submitted pipeline name to its validator.

pub mod fields;
pub mod gatk;
pub mod rnaseq;

use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

pub use fields::FieldError;
pub use gatk::GatkVariantCallingParams;
pub use rnaseq::RnaseqDeseq2Params;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Unknown pipeline '{name}'. Available: [{}]", .available.join(", "))]
    Unknown { name: String, available: Vec<String> },

    #[error("Invalid parameters for '{pipeline}': {}", join_errors(.errors))]
    InvalidParameters {
        pipeline: String,
        errors: Vec<FieldError>,
    },
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    GatkVariantCalling,
    RnaseqDeseq2,
}

impl Pipeline {
    pub const ALL: &'static [Pipeline] = &[Pipeline::GatkVariantCalling, Pipeline::RnaseqDeseq2];

    pub fn name(self) -> &'static str {
        match self {
            Pipeline::GatkVariantCalling => gatk::NAME,
            Pipeline::RnaseqDeseq2 => rnaseq::NAME,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Pipeline::GatkVariantCalling => gatk::DESCRIPTION,
            Pipeline::RnaseqDeseq2 => rnaseq::DESCRIPTION,
        }
    }

    pub fn schema(self) -> Value {
        match self {
            Pipeline::GatkVariantCalling => gatk::schema(),
            Pipeline::RnaseqDeseq2 => rnaseq::schema(),
        }
    }

    pub fn example(self) -> Value {
        match self {
            Pipeline::GatkVariantCalling => gatk::example(),
            Pipeline::RnaseqDeseq2 => rnaseq::example(),
        }
    }

    /// Checks required fields, ranges and enumerations, and fills in defaults.
    pub fn validate(self, parameters: &Value) -> Result<PipelineParams, Vec<FieldError>> {
        let Some(params) = parameters.as_object() else {
            return Err(vec![FieldError::new("parameters", "must be a JSON object")]);
        };
        match self {
            Pipeline::GatkVariantCalling => gatk::validate(params).map(PipelineParams::GatkVariantCalling),
            Pipeline::RnaseqDeseq2 => rnaseq::validate(params).map(PipelineParams::RnaseqDeseq2),
        }
    }
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pipeline {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pipeline::ALL.iter().copied().find(|p| p.name() == s).ok_or(())
    }
}

/// Validated, coerced parameters for one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PipelineParams {
    GatkVariantCalling(GatkVariantCallingParams),
    RnaseqDeseq2(RnaseqDeseq2Params),
}

impl PipelineParams {
    pub fn pipeline(&self) -> Pipeline {
        match self {
            PipelineParams::GatkVariantCalling(_) => Pipeline::GatkVariantCalling,
            PipelineParams::RnaseqDeseq2(_) => Pipeline::RnaseqDeseq2,
        }
    }

    /// The form kept on the job record.
    pub fn to_value(&self) -> Value {
        match self {
            PipelineParams::GatkVariantCalling(p) => json!(p),
            PipelineParams::RnaseqDeseq2(p) => json!(p),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineRegistry {
    pipelines: Vec<Pipeline>,
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::new(Pipeline::ALL.to_vec())
    }
}

impl PipelineRegistry {
    pub fn new(pipelines: Vec<Pipeline>) -> Self {
        Self { pipelines }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.pipelines.iter().map(|p| p.name()).collect()
    }

    pub fn resolve(&self, name: &str) -> Result<Pipeline, PipelineError> {
        name.parse::<Pipeline>()
            .ok()
            .filter(|p| self.pipelines.contains(p))
            .ok_or_else(|| PipelineError::Unknown {
                name: name.to_string(),
                available: self.names().into_iter().map(String::from).collect(),
            })
    }

    pub fn validate(&self, name: &str, parameters: &Value) -> Result<PipelineParams, PipelineError> {
        let pipeline = self.resolve(name)?;
        pipeline
            .validate(parameters)
            .map_err(|errors| PipelineError::InvalidParameters {
                pipeline: pipeline.name().to_string(),
                errors,
            })
    }

    pub fn describe_all(&self) -> Value {
        let pipelines: Vec<Value> = self
            .pipelines
            .iter()
            .map(|p| {
                json!({
                    "name": p.name(),
                    "description": p.description(),
                    "parameters_schema": p.schema(),
                })
            })
            .collect();
        json!({ "available_pipelines": pipelines })
    }

    pub fn describe(&self, name: &str) -> Result<Value, PipelineError> {
        let pipeline = self.resolve(name)?;
        Ok(json!({
            "pipeline_name": pipeline.name(),
            "description": pipeline.description(),
            "parameters_schema": pipeline.schema(),
            "example": pipeline.example(),
        }))
    }
}
