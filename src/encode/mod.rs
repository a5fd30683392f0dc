//! Report encoders
//!
//! Both encoders are pure: the same records always give the same bytes.

pub mod cyclonedx;
pub mod json;

use crate::error::Result;
use crate::model::OutputRecord;
use clap::ValueEnum;
use std::fmt;

/// Document shape of the produced report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON array of records
    #[default]
    Json,
    /// CycloneDX 1.5 bill of materials
    #[value(name = "cyclonedx")]
    CycloneDx,
}

impl OutputFormat {
    pub fn encode(&self, records: &[OutputRecord]) -> Result<Vec<u8>> {
        match self {
            OutputFormat::Json => json::encode(records),
            OutputFormat::CycloneDx => cyclonedx::encode(records),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::CycloneDx => write!(f, "cyclonedx"),
        }
    }
}
