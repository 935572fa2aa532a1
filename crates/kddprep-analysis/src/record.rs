//! Raw connection records
//!
//! A [`Record`] is one CSV row split into its feature fields and its label.
//! Fields stay as text; numeric features are parsed on demand so that a bad
//! value is reported with the line and feature it came from.

use std::num::ParseFloatError;

use crate::{
    partition::Labeled,
    schema::{NumericFeature, Schema},
};

/// A row that does not carry every field of the schema.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("line {line}: expected {expected} fields, found {found}")]
pub struct RecordFormatError {
    pub line: usize,
    pub expected: usize,
    pub found: usize,
}

/// Why a numeric field was rejected.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::Error,
    derive_more::IsVariant,
)]
pub enum InvalidNumber {
    #[display("{_0}")]
    Syntax(#[error(source)] ParseFloatError),
    /// `inf`, `NaN` or a literal that overflows `f64`.
    #[display("value is not finite")]
    NonFinite,
}

/// A numeric feature field that does not hold a finite decimal number.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("line {line}: field {field} ({name}) is not a finite number: {value:?}")]
pub struct ParseFieldError {
    pub line: usize,
    pub field: usize,
    pub name: &'static str,
    pub value: String,
    pub source: InvalidNumber,
}

/// One input row conforming to a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    line: usize,
    features: Vec<String>,
    label: String,
}

impl Record {
    /// Builds a record from already split fields.
    ///
    /// `line` is the 1-based position of the row in its source and only
    /// appears in error messages. Fields beyond the schema's field count are
    /// dropped; trailing whitespace is stripped from the label.
    pub fn from_fields<I, S>(
        schema: &Schema,
        line: usize,
        fields: I,
    ) -> Result<Self, RecordFormatError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (features, label) = split_fields(schema, line, fields)?;
        Ok(Self {
            line,
            features,
            label,
        })
    }

    /// Builds a record from one comma-separated line.
    ///
    /// # Examples
    ///
    /// ```
    /// use kddprep_analysis::{record::Record, schema::Schema};
    ///
    /// let schema = Schema::kdd();
    /// let mut fields = vec!["0"; 41];
    /// fields[1] = "tcp";
    /// let line = format!("{},normal\n", fields.join(","));
    ///
    /// let record = Record::parse_line(&schema, 1, &line).unwrap();
    /// assert_eq!(record.label(), "normal");
    /// assert_eq!(record.feature(1), Some("tcp"));
    ///
    /// assert!(Record::parse_line(&schema, 2, "0,tcp,http").is_err());
    /// ```
    pub fn parse_line(schema: &Schema, line: usize, text: &str) -> Result<Self, RecordFormatError> {
        Self::from_fields(schema, line, text.split(','))
    }

    /// Parses every non-blank line of a source into records.
    ///
    /// Line numbers count blank lines too, so they match the source file.
    pub fn parse_lines<'a, I>(schema: &Schema, lines: I) -> Result<Vec<Self>, RecordFormatError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim_end_matches(['\r', '\n']).is_empty())
            .map(|(i, text)| Self::parse_line(schema, i + 1, text))
            .collect()
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    #[must_use]
    pub fn feature(&self, index: usize) -> Option<&str> {
        self.features.get(index).map(String::as_str)
    }

    /// All fields in file order, label last.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .map(String::as_str)
            .chain([self.label.as_str()])
    }

    /// Parses the value of a numeric feature.
    ///
    /// Infinite and NaN values are rejected along with malformed ones; they
    /// have no place in a mean or a z-score.
    pub fn numeric_value(&self, feature: NumericFeature) -> Result<f64, ParseFieldError> {
        let value = &self.features[feature.index()];
        let error = |source| ParseFieldError {
            line: self.line,
            field: feature.index(),
            name: feature.name(),
            value: value.clone(),
            source,
        };
        let number = value
            .trim()
            .parse::<f64>()
            .map_err(|err| error(InvalidNumber::Syntax(err)))?;
        if !number.is_finite() {
            return Err(error(InvalidNumber::NonFinite));
        }
        Ok(number)
    }
}

impl Labeled for Record {
    fn label(&self) -> &str {
        &self.label
    }
}

/// Splits a row into `(features, label)` according to the schema.
pub(crate) fn split_fields<I, S>(
    schema: &Schema,
    line: usize,
    fields: I,
) -> Result<(Vec<String>, String), RecordFormatError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let expected = schema.field_count();
    let mut features = fields
        .into_iter()
        .take(expected)
        .map(Into::into)
        .collect::<Vec<String>>();
    if features.len() < expected {
        return Err(RecordFormatError {
            line,
            expected,
            found: features.len(),
        });
    }
    let mut label = features.pop().unwrap_or_default();
    label.truncate(label.trim_end().len());
    Ok((features, label))
}
