use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use kddprep_analysis::{record::Record, schema::Schema};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_bytes(&mut self, contents: &[u8]) -> anyhow::Result<()> {
        self.write_all(contents)
            .with_context(|| format!("Failed to write {}", self.display_path()))?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Parse connection records from CSV text
///
/// The input has no header row. Field counts are validated against the
/// schema rather than by the CSV reader, so a short row reports which line
/// and how many fields it had.
pub fn parse_records<R>(schema: &Schema, reader: R) -> anyhow::Result<Vec<Record>>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    reader
        .records()
        .enumerate()
        .map(|(index, row)| -> anyhow::Result<Record> {
            let row = row?;
            let line = row
                .position()
                .and_then(|pos| usize::try_from(pos.line()).ok())
                .unwrap_or(index + 1);
            Ok(Record::from_fields(schema, line, row.iter())?)
        })
        .collect()
}

/// Read connection records from a CSV file
///
/// # Errors
///
/// Returns error if the file cannot be opened, is not valid CSV, or has a
/// record with the wrong number of fields
pub fn read_records_file<P>(
    schema: &Schema,
    file_kind: &str,
    path: P,
) -> anyhow::Result<Vec<Record>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;
    parse_records(schema, io::BufReader::new(file))
        .with_context(|| format!("Failed to read {} file: {}", file_kind, path.display()))
}

pub fn check_input_path(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        bail!("Input file does not exist: {}", path.display());
    }
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    Output::open(path)?.write_bytes(contents)
}

/// Write every file or none of them
///
/// Contents go to `.tmp` siblings first and are renamed into place once all
/// of them were written. If any write fails, the staged files are removed.
pub fn write_files(files: &[(PathBuf, Vec<u8>)]) -> anyhow::Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for (path, contents) in files {
        let temp = prefixed_path(path, ".tmp");
        let written = write_file(&temp, contents);
        staged.push(temp);
        if let Err(err) = written {
            for temp in &staged {
                let _ = fs::remove_file(temp);
            }
            return Err(err);
        }
    }
    for ((path, _), temp) in files.iter().zip(&staged) {
        fs::rename(temp, path)
            .with_context(|| format!("Failed to rename output file: {}", path.display()))?;
    }
    Ok(())
}

/// Check that the directory an output prefix points into exists
pub fn check_output_prefix(prefix: &Path) -> anyhow::Result<()> {
    match prefix.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            bail!("Output directory does not exist: {}", parent.display())
        }
        _ => Ok(()),
    }
}

/// Append `suffix` to the file name of `prefix`
pub fn prefixed_path(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(prefix.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}
