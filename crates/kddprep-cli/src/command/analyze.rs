use std::path::PathBuf;

use anyhow::Context as _;
use kddprep_analysis::{artifact, pipeline, schema::DatasetKind};
use tracing::info;

use crate::util;

const REFERENCE_STATS_SUFFIX: &str = "_reference_stats.json";

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    /// Labeled dataset to analyze
    #[arg(short, long)]
    pub(crate) input: PathBuf,
    /// Prefix of every output file, e.g. `out/kdd` writes `out/kdd_class_types.txt`
    #[arg(short, long)]
    pub(crate) output: PathBuf,
    /// Dataset discretized with the input's reference statistics but not
    /// included in them
    #[arg(long)]
    pub(crate) holdout: Option<PathBuf>,
    /// Record layout of the input files
    #[arg(long, default_value = "kdd")]
    pub(crate) dataset: DatasetKind,
    /// Also write the reference statistics as JSON
    #[arg(long)]
    pub(crate) save_stats: bool,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let AnalyzeArg {
        input,
        output,
        holdout,
        dataset,
        save_stats,
    } = arg;

    util::check_input_path(input)?;
    if let Some(holdout) = holdout {
        util::check_input_path(holdout)?;
    }
    util::check_output_prefix(output)?;

    let schema = dataset.schema();
    let records = util::read_records_file(&schema, "dataset", input)?;
    info!(path = %input.display(), records = records.len(), "loaded dataset");
    let holdout = holdout
        .as_ref()
        .map(|path| {
            let records = util::read_records_file(&schema, "holdout", path)?;
            info!(path = %path.display(), records = records.len(), "loaded holdout dataset");
            anyhow::Ok(records)
        })
        .transpose()?;

    let result = pipeline::run(&schema, &records, holdout.as_deref())
        .with_context(|| format!("Failed to analyze {}", input.display()))?;
    let artifacts = artifact::render_all(&schema, &records, &result)
        .context("Failed to render analysis reports")?;

    let mut files = artifacts
        .into_iter()
        .map(|artifact| {
            let path = util::prefixed_path(output, artifact.kind.file_suffix());
            (path, artifact.contents)
        })
        .collect::<Vec<_>>();
    if *save_stats {
        let mut json = serde_json::to_vec_pretty(&result.reference)
            .context("Failed to serialize reference statistics")?;
        json.push(b'\n');
        files.push((util::prefixed_path(output, REFERENCE_STATS_SUFFIX), json));
    }

    util::write_files(&files)?;
    for (path, _) in &files {
        info!(path = %path.display(), "wrote output file");
    }

    Ok(())
}
