//! Text and CSV artifacts
//!
//! Every artifact is rendered into memory first. A run that fails in any
//! phase therefore leaves no partially written file behind; the caller only
//! touches the filesystem once all artifacts exist.

use std::io::{self, Write};

use crate::{
    bucket_histogram::{BucketHistogramTable, FeatureHistogram},
    discretize::Bucket,
    partition::{LabelHistogram, RecordClass},
    pipeline::PipelineOutput,
    record::Record,
    schema::Schema,
    statistics::{ClassFeatureStatistics, FeatureStats},
    transform::{self, DiscretizedRecord},
};

/// The artifacts produced by a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ArtifactKind {
    #[display("class-count report")]
    ClassTypes,
    #[display("feature-statistics report")]
    FeatureAnalysis,
    #[display("plotting dataset")]
    PlottingDataset,
    #[display("discretized dataset")]
    Discretized,
    #[display("discretized normal dataset")]
    DiscretizedNormal,
    #[display("discretized attack dataset")]
    DiscretizedAttack,
    #[display("discretized holdout dataset")]
    DiscretizedHoldout,
    #[display("discretized-feature histogram report")]
    BucketHistograms,
}

impl ArtifactKind {
    /// Suffix appended to the output prefix to form the file name.
    #[must_use]
    pub fn file_suffix(self) -> &'static str {
        match self {
            ArtifactKind::ClassTypes => "_class_types.txt",
            ArtifactKind::FeatureAnalysis => "_feature_analysis.txt",
            ArtifactKind::PlottingDataset => "_alternate_dataset.csv",
            ArtifactKind::Discretized => "_discretized.csv",
            ArtifactKind::DiscretizedNormal => "_discretized_normal.csv",
            ArtifactKind::DiscretizedAttack => "_discretized_attack.csv",
            ArtifactKind::DiscretizedHoldout => "_discretized_holdout.csv",
            ArtifactKind::BucketHistograms => "_discretized_feature_analysis.txt",
        }
    }
}

/// A fully rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub contents: Vec<u8>,
}

/// Renders every artifact of a completed run.
///
/// `records` is the primary dataset the run consumed; the plotting dataset
/// is built from its original values.
pub fn render_all(
    schema: &Schema,
    records: &[Record],
    output: &PipelineOutput,
) -> io::Result<Vec<Artifact>> {
    fn render<F>(kind: ArtifactKind, f: F) -> io::Result<Artifact>
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut contents = vec![];
        f(&mut contents)?;
        Ok(Artifact { kind, contents })
    }

    let classes = output.transformed.classes();
    let mut artifacts = vec![
        render(ArtifactKind::ClassTypes, |w| {
            write_class_counts(w, &output.labels)
        })?,
        render(ArtifactKind::FeatureAnalysis, |w| {
            write_feature_statistics(w, &output.statistics)
        })?,
        render(ArtifactKind::PlottingDataset, |w| {
            write_plotting_dataset(w, schema, records)
        })?,
        render(ArtifactKind::Discretized, |w| {
            write_discretized(w, &output.transformed.discretized.records)
        })?,
        render(ArtifactKind::DiscretizedNormal, |w| {
            write_discretized(w, classes.normal.iter().copied())
        })?,
        render(ArtifactKind::DiscretizedAttack, |w| {
            write_discretized(w, classes.attack.iter().copied())
        })?,
    ];
    if let Some(holdout) = &output.transformed.holdout {
        artifacts.push(render(ArtifactKind::DiscretizedHoldout, |w| {
            write_discretized(w, &holdout.records)
        })?);
    }
    artifacts.push(render(ArtifactKind::BucketHistograms, |w| {
        write_bucket_histograms(w, &output.histograms)
    })?);
    Ok(artifacts)
}

/// Writes the class-count report: one row per distinct label, first-seen order.
pub fn write_class_counts<W>(mut w: W, labels: &LabelHistogram) -> io::Result<()>
where
    W: Write,
{
    writeln!(w, "{:20}{:30}", "Class Name:", "Number of Records:")?;
    for (label, count) in labels.iter() {
        writeln!(w, "{label:20}{count:<30}")?;
    }
    Ok(())
}

fn write_stats_columns<W>(w: &mut W, stats: Option<&FeatureStats>) -> io::Result<()>
where
    W: Write,
{
    match stats {
        Some(s) => write!(
            w,
            "{:<15.4}{:<15.4}{:<20.4}{:<20.4}",
            s.mean, s.std_dev, s.nonzero_mean, s.nonzero_std_dev
        ),
        None => write!(w, "{:15}{:15}{:20}{:20}", "N/A", "N/A", "N/A", "N/A"),
    }
}

/// Writes the feature-statistics report: two rows per numeric feature.
///
/// A class without records is shown as `N/A`.
pub fn write_feature_statistics<W>(mut w: W, statistics: &ClassFeatureStatistics) -> io::Result<()>
where
    W: Write,
{
    writeln!(
        w,
        "{:30}{:15}{:15}{:15}{:20}{:20}",
        "Feature Name:", "Record Type:", "Mean:", "Std Dev:", "Non-zero Mean:", "Non-zero Std Dev:"
    )?;
    for row in &statistics.rows {
        for class in RecordClass::ALL {
            write!(w, "{:30}{:15}", row.feature.name(), class.to_string())?;
            write_stats_columns(&mut w, row.get(class))?;
            writeln!(w)?;
        }
    }
    Ok(())
}

/// Writes the plotting dataset: `feature_name,value,label` per record per
/// numeric feature, with the label collapsed to `normal` / `attack`.
pub fn write_plotting_dataset<W>(w: W, schema: &Schema, records: &[Record]) -> io::Result<()>
where
    W: Write,
{
    let mut csv = csv::Writer::from_writer(w);
    csv.write_record(["feature_name", "value", "label"])?;
    for row in transform::plotting_rows(schema, records) {
        csv.write_record([row.feature_name, row.value, &row.class.to_string()])?;
    }
    csv.flush()
}

/// Writes discretized records in the input's field layout, without a header.
pub fn write_discretized<'a, W, I>(w: W, records: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a DiscretizedRecord>,
{
    let mut csv = csv::Writer::from_writer(w);
    for record in records {
        csv.write_record(record.fields())?;
    }
    csv.flush()
}

/// Writes the bucket histogram report: two rows per numeric feature.
///
/// A feature whose reference had no variation shows `-` in every column.
pub fn write_bucket_histograms<W>(mut w: W, table: &BucketHistogramTable) -> io::Result<()>
where
    W: Write,
{
    write!(w, "{:30}{:15}", "Feature Name:", "Record Type:")?;
    for bucket in Bucket::all() {
        write!(w, "{:12}", format!("Label {bucket}:"))?;
    }
    writeln!(w)?;

    for row in &table.rows {
        for class in RecordClass::ALL {
            write!(w, "{:30}{:15}", row.feature.name(), class.to_string())?;
            match row.get(class) {
                FeatureHistogram::Buckets(histogram) => {
                    for count in histogram.counts() {
                        write!(w, "{count:<12}")?;
                    }
                }
                FeatureHistogram::Degenerate { .. } => {
                    for _ in Bucket::all() {
                        write!(w, "{:12}", "-")?;
                    }
                }
            }
            writeln!(w)?;
        }
    }
    Ok(())
}
