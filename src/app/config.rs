//! Run configuration, built once from CLI flags (plus `.env`/environment
//! defaults) and passed by reference to the pipeline.

use std::path::PathBuf;

use crate::cli::{MergeArgs, NormalizeArgs, SamplingArgs, SourceInput};
use crate::domain::SourceKind;
use crate::io::IngestOptions;
use crate::normalize::NormalizeOptions;

/// Configuration for `cprep normalize`.
#[derive(Debug, Clone)]
pub struct PrepConfig {
    pub source: SourceKind,
    pub data_path: PathBuf,
    pub out_dir: PathBuf,
    pub ingest: IngestOptions,
    pub normalize: NormalizeOptions,
}

impl PrepConfig {
    pub fn from_args(args: &NormalizeArgs) -> Self {
        Self {
            source: args.source,
            data_path: args.data.clone(),
            out_dir: args.out.clone(),
            ingest: IngestOptions {
                header_row: args.header_row,
            },
            normalize: normalize_options(&args.sampling),
        }
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.out_dir.join("canonical.csv")
    }

    pub fn feature_order_path(&self) -> PathBuf {
        self.out_dir.join("feature_order.json")
    }

    pub fn report_path(&self) -> PathBuf {
        self.out_dir.join("report.json")
    }
}

/// Configuration for `cprep merge`.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub inputs: Vec<SourceInput>,
    pub out_path: PathBuf,
    pub normalize: NormalizeOptions,
}

impl MergeConfig {
    pub fn from_args(args: &MergeArgs) -> Self {
        Self {
            inputs: args.inputs.clone(),
            out_path: args.out.clone(),
            normalize: normalize_options(&args.sampling),
        }
    }

    pub fn feature_order_path(&self) -> PathBuf {
        self.out_path.with_file_name("feature_order.json")
    }

    pub fn report_path(&self) -> PathBuf {
        self.out_path.with_file_name("report.json")
    }
}

fn normalize_options(args: &SamplingArgs) -> NormalizeOptions {
    NormalizeOptions {
        row_cap: (args.max_rows > 0).then_some(args.max_rows),
        seed: args.seed,
    }
}
