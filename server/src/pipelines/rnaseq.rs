//! RNA-seq differential expression with DESeq2.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::fields::{FieldError, FieldReader};

pub const NAME: &str = "rnaseq_deseq2";
pub const DESCRIPTION: &str = "RNA-seq differential expression analysis with DESeq2";

const DEFAULT_MIN_QUALITY: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTranscriptome {
    GencodeV38,
    GencodeV44,
    #[serde(rename = "ensembl_110")]
    Ensembl110,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantificationMethod {
    #[serde(rename = "salmon")]
    Salmon,
    #[serde(rename = "kallisto")]
    Kallisto,
    #[serde(rename = "rsem")]
    Rsem,
    #[serde(rename = "featureCounts")]
    FeatureCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RnaseqDeseq2Params {
    pub sample_id: String,
    pub reference: ReferenceTranscriptome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastq_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter_sequence: Option<String>,
    pub min_quality: i64,
    pub quantification_method: QuantificationMethod,
}

pub fn validate(params: &Map<String, Value>) -> Result<RnaseqDeseq2Params, Vec<FieldError>> {
    let mut reader = FieldReader::new(params);

    let sample_id: Option<String> = reader.required("sample_id");
    reader.check_not_empty("sample_id", sample_id.as_deref());
    let reference: Option<ReferenceTranscriptome> = reader.required("reference");

    let fastq_files: Option<Vec<String>> = reader.optional("fastq_files");
    for (i, path) in fastq_files.iter().flatten().enumerate() {
        reader.check_storage_path(&format!("fastq_files.{i}"), Some(path));
    }
    let adapter_sequence: Option<String> = reader.optional("adapter_sequence");
    let min_quality: Option<i64> = reader.optional("min_quality");
    reader.check_range("min_quality", min_quality, 0..=40);
    let quantification_method: Option<QuantificationMethod> = reader.optional("quantification_method");

    let errors = reader.into_errors();
    match (sample_id, reference) {
        (Some(sample_id), Some(reference)) if errors.is_empty() => Ok(RnaseqDeseq2Params {
            sample_id,
            reference,
            fastq_files,
            adapter_sequence,
            min_quality: min_quality.unwrap_or(DEFAULT_MIN_QUALITY),
            quantification_method: quantification_method.unwrap_or(QuantificationMethod::Salmon),
        }),
        _ => Err(errors),
    }
}

pub fn schema() -> Value {
    json!({
        "type": "object",
        "required": ["sample_id", "reference"],
        "properties": {
            "sample_id": {"type": "string", "description": "Sample identifier"},
            "reference": {
                "type": "string",
                "enum": ["gencode_v38", "gencode_v44", "ensembl_110"],
                "description": "Reference transcriptome version"
            },
            "fastq_files": {
                "type": "array",
                "items": {"type": "string"},
                "description": "List of FASTQ file paths"
            },
            "adapter_sequence": {"type": "string", "description": "Adapter sequence for trimming"},
            "min_quality": {
                "type": "integer", "minimum": 0, "maximum": 40,
                "default": DEFAULT_MIN_QUALITY,
                "description": "Minimum base quality score"
            },
            "quantification_method": {
                "type": "string",
                "enum": ["salmon", "kallisto", "rsem", "featureCounts"],
                "default": "salmon",
                "description": "Quantification tool"
            }
        }
    })
}

pub fn example() -> Value {
    json!({
        "sample_id": "RNA_001",
        "reference": "gencode_v38",
        "fastq_files": ["s3://data/RNA_001.fastq.gz"],
        "adapter_sequence": "AGATCGGAAGAGC",
        "min_quality": 20,
        "quantification_method": "salmon"
    })
}
