//! GATK variant calling for WGS/WES samples.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::fields::{FieldError, FieldReader};

pub const NAME: &str = "gatk_variant_calling";
pub const DESCRIPTION: &str = "GATK variant calling pipeline for WGS/WES data";

const DEFAULT_QUALITY_THRESHOLD: i64 = 30;
const DEFAULT_DEPTH_THRESHOLD: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceGenome {
    #[serde(rename = "hg19")]
    Hg19,
    #[serde(rename = "hg38")]
    Hg38,
    GRCh37,
    GRCh38,
}

impl ReferenceGenome {
    /// GRCh builds are stored under their UCSC names.
    pub fn normalized(self) -> Self {
        match self {
            ReferenceGenome::GRCh38 | ReferenceGenome::Hg38 => ReferenceGenome::Hg38,
            ReferenceGenome::GRCh37 | ReferenceGenome::Hg19 => ReferenceGenome::Hg19,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantCaller {
    HaplotypeCaller,
    Mutect2,
    UnifiedGenotyper,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatkVariantCallingParams {
    pub sample_id: String,
    pub reference_genome: ReferenceGenome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastq_r1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastq_r2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bam_file: Option<String>,
    pub caller: VariantCaller,
    pub quality_threshold: i64,
    pub depth_threshold: i64,
}

pub fn validate(params: &Map<String, Value>) -> Result<GatkVariantCallingParams, Vec<FieldError>> {
    let mut reader = FieldReader::new(params);

    let sample_id: Option<String> = reader.required("sample_id");
    reader.check_not_empty("sample_id", sample_id.as_deref());
    let reference_genome: Option<ReferenceGenome> = reader.required("reference_genome");

    let fastq_r1: Option<String> = reader.optional("fastq_r1");
    reader.check_storage_path("fastq_r1", fastq_r1.as_deref());
    let fastq_r2: Option<String> = reader.optional("fastq_r2");
    reader.check_storage_path("fastq_r2", fastq_r2.as_deref());
    let bam_file: Option<String> = reader.optional("bam_file");
    reader.check_storage_path("bam_file", bam_file.as_deref());

    let caller: Option<VariantCaller> = reader.optional("caller");
    let quality_threshold: Option<i64> = reader.optional("quality_threshold");
    reader.check_range("quality_threshold", quality_threshold, 0..=60);
    let depth_threshold: Option<i64> = reader.optional("depth_threshold");
    reader.check_min("depth_threshold", depth_threshold, 1);

    let errors = reader.into_errors();
    match (sample_id, reference_genome) {
        (Some(sample_id), Some(reference_genome)) if errors.is_empty() => Ok(GatkVariantCallingParams {
            sample_id,
            reference_genome: reference_genome.normalized(),
            fastq_r1,
            fastq_r2,
            bam_file,
            caller: caller.unwrap_or(VariantCaller::HaplotypeCaller),
            quality_threshold: quality_threshold.unwrap_or(DEFAULT_QUALITY_THRESHOLD),
            depth_threshold: depth_threshold.unwrap_or(DEFAULT_DEPTH_THRESHOLD),
        }),
        _ => Err(errors),
    }
}

pub fn schema() -> Value {
    json!({
        "type": "object",
        "required": ["sample_id", "reference_genome"],
        "properties": {
            "sample_id": {"type": "string", "description": "Sample identifier"},
            "reference_genome": {
                "type": "string",
                "enum": ["hg19", "hg38", "GRCh37", "GRCh38"],
                "description": "Reference genome version"
            },
            "fastq_r1": {"type": "string", "description": "Path to forward reads FASTQ file"},
            "fastq_r2": {"type": "string", "description": "Path to reverse reads FASTQ file"},
            "bam_file": {"type": "string", "description": "Path to aligned BAM file (alternative to FASTQ)"},
            "caller": {
                "type": "string",
                "enum": ["HaplotypeCaller", "Mutect2", "UnifiedGenotyper"],
                "default": "HaplotypeCaller",
                "description": "Variant calling algorithm"
            },
            "quality_threshold": {
                "type": "integer", "minimum": 0, "maximum": 60,
                "default": DEFAULT_QUALITY_THRESHOLD,
                "description": "Minimum base quality score"
            },
            "depth_threshold": {
                "type": "integer", "minimum": 1,
                "default": DEFAULT_DEPTH_THRESHOLD,
                "description": "Minimum read depth for variant calling"
            }
        }
    })
}

pub fn example() -> Value {
    json!({
        "sample_id": "WGS_001",
        "reference_genome": "hg38",
        "fastq_r1": "/data/samples/WGS_001_R1.fastq.gz",
        "fastq_r2": "/data/samples/WGS_001_R2.fastq.gz",
        "caller": "HaplotypeCaller",
        "quality_threshold": 30
    })
}
