use std::path::PathBuf;

use anyhow::Context as _;
use kddprep_analysis::{
    artifact, schema::DatasetKind, statistics::StatsTable, transform::Discretizer,
};
use tracing::info;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DiscretizeArg {
    /// Reference statistics written by `analyze --save-stats`
    #[arg(long)]
    pub(crate) stats: PathBuf,
    /// Dataset to discretize
    #[arg(short, long)]
    pub(crate) input: PathBuf,
    /// Output CSV path (stdout if omitted)
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,
    /// Record layout of the input file
    #[arg(long, default_value = "kdd")]
    pub(crate) dataset: DatasetKind,
}

pub(crate) fn run(arg: &DiscretizeArg) -> anyhow::Result<()> {
    let DiscretizeArg {
        stats,
        input,
        output,
        dataset,
    } = arg;

    util::check_input_path(stats)?;
    util::check_input_path(input)?;
    if let Some(output) = output {
        util::check_output_prefix(output)?;
    }

    let schema = dataset.schema();
    let reference: StatsTable = util::read_json_file("reference statistics", stats)?;
    let discretizer = Discretizer::new(&schema, &reference)
        .with_context(|| format!("Unusable reference statistics: {}", stats.display()))?;

    let records = util::read_records_file(&schema, "dataset", input)?;
    info!(path = %input.display(), records = records.len(), "loaded dataset");
    let dataset = discretizer
        .discretize_all(&records)
        .with_context(|| format!("Failed to discretize {}", input.display()))?;

    let mut contents = vec![];
    artifact::write_discretized(&mut contents, &dataset.records)
        .context("Failed to render discretized dataset")?;
    let destination = match output {
        Some(path) => {
            util::write_files(&[(path.clone(), contents)])?;
            path.display().to_string()
        }
        None => {
            let mut stdout = Output::stdout();
            stdout.write_bytes(&contents)?;
            stdout.display_path()
        }
    };
    info!(
        records = dataset.len(),
        output = %destination,
        "wrote discretized dataset"
    );

    Ok(())
}
