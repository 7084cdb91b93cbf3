//! Comma-separated feature matrix loading.
//!
//! Every non-blank line is one row. The first row fixes the dimension count
//! and any later row with a different field count is rejected. Fields are
//! read with C `atof` leniency: the longest numeric prefix wins and a field
//! with none, including bytes that are not valid UTF-8, reads as `0.0`.
//!
//! Empty fields are kept: `1,,2` is three fields with a `0.0` in the middle,
//! where a `strtok`-based reader would collapse it to two.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{FastNormError, Result};

/// Row-major `f32` matrix stored in one flat buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    rows: usize,
    dims: usize,
}

impl FeatureMatrix {
    /// Build from explicit rows. All rows must share the first row's length.
    pub fn from_rows<I, R>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f32]>,
    {
        let mut matrix = FeatureMatrix::default();
        for (idx, row) in rows.into_iter().enumerate() {
            matrix.push_row(row.as_ref(), idx + 1)?;
        }
        Ok(matrix)
    }

    /// Load a matrix from a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| FastNormError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let matrix = Self::parse(BufReader::new(file), path)?;
        tracing::debug!(
            path = %path.display(),
            rows = matrix.rows,
            dims = matrix.dims,
            "loaded feature matrix"
        );
        Ok(matrix)
    }

    /// Load a matrix from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::parse(reader, Path::new("<reader>"))
    }

    fn parse<R: BufRead>(mut reader: R, path: &Path) -> Result<Self> {
        let mut matrix = FeatureMatrix::default();
        let mut fields = Vec::new();
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| FastNormError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }
            fields.clear();
            fields.extend(line.split(|&b| b == b',').map(parse_field_bytes));
            matrix.push_row(&fields, line_no)?;
        }
        Ok(matrix)
    }

    fn push_row(&mut self, row: &[f32], line: usize) -> Result<()> {
        if self.rows == 0 {
            self.dims = row.len();
        } else if row.len() != self.dims {
            return Err(FastNormError::RaggedRow {
                line,
                expected: self.dims,
                found: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Fields per row.
    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dims;
        Some(&self.data[start..start + self.dims])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.rows).map(move |i| &self.data[i * self.dims..(i + 1) * self.dims])
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        // A zero-width matrix has an empty buffer, so the `max(1)` yields no chunks.
        self.data.chunks_exact_mut(self.dims.max(1))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// `atof`-style field parse: longest leading float literal, else `0.0`.
pub fn parse_field(field: &str) -> f32 {
    parse_field_bytes(field.as_bytes())
}

/// Byte-level [`parse_field`]; invalid UTF-8 reads like any other
/// non-numeric text.
pub fn parse_field_bytes(field: &[u8]) -> f32 {
    let b = field.trim_ascii();
    if let Some(v) = std::str::from_utf8(b).ok().and_then(|s| s.parse::<f32>().ok()) {
        return v;
    }
    let end = numeric_prefix_len(b);
    // The prefix is ASCII by construction.
    std::str::from_utf8(&b[..end])
        .ok()
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(0.0)
}

/// Length of the longest `[+-]digits[.digits][(e|E)[+-]digits]` prefix.
fn numeric_prefix_len(b: &[u8]) -> usize {
    let digits = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_end = digits(i);
    let mut end = int_end;
    let mut mantissa_digits = int_end - i;
    if end < b.len() && b[end] == b'.' {
        let frac_end = digits(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }
    if end < b.len() && matches!(b[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < b.len() && matches!(b[j], b'+' | b'-') {
            j += 1;
        }
        let exp_end = digits(j);
        if exp_end > j {
            end = exp_end;
        }
    }
    end
}
