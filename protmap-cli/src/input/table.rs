//! Delimited table reading
//!
//! `.tsv`, `.tab` and `.txt` files are tab-delimited, everything else is
//! comma-delimited. The first row is always a header.

use crate::error::CliError;
use anyhow::{Context, Result};
use protmap_core::{GeneQuery, Provenance, ResolvedRow};
use std::path::Path;

/// An in-memory delimited file
#[derive(Debug, Clone)]
pub struct Table {
    path: String,
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

/// How to turn table cells into queries
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Symbol column (default: first column)
    pub column: Option<String>,
    /// Column carried into `GeneQuery::context`
    pub context_column: Option<String>,
    /// Split cells on `;`
    pub split_multi: bool,
}

/// Field delimiter for a path
pub fn delimiter_for(path: &Path) -> u8 {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("tsv" | "tab" | "txt") => b'\t',
        _ => b',',
    }
}

impl Table {
    /// Read a delimited file with a header row
    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CliError::FileNotFound(path.display().to_string()).into());
        }
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter_for(path))
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        log::debug!("read {} rows from {}", rows.len(), path.display());
        Ok(Self {
            path: path.display().to_string(),
            headers,
            rows,
        })
    }

    /// Header names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the file has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by case-insensitive header name
    ///
    /// With no name, the first column is used.
    pub fn column_index(&self, name: Option<&str>) -> Result<usize> {
        let missing = |column: &str| CliError::MissingColumn {
            column: column.to_string(),
            path: self.path.clone(),
        };
        match name {
            None if self.headers.is_empty() => Err(missing("<first column>").into()),
            None => Ok(0),
            Some(name) => self
                .headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
                .ok_or_else(|| missing(name).into()),
        }
    }

    /// Non-empty cell values of one column, in row order
    pub fn column(&self, name: Option<&str>) -> Result<Vec<String>> {
        let index = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row.get(index))
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Build queries from the table
    pub fn queries(&self, options: &QueryOptions) -> Result<Vec<GeneQuery>> {
        let symbol_index = self.column_index(options.column.as_deref())?;
        let context_index = options
            .context_column
            .as_deref()
            .map(|name| self.column_index(Some(name)))
            .transpose()?;

        let mut queries = Vec::new();
        for row in &self.rows {
            let Some(cell) = row.get(symbol_index) else {
                continue;
            };
            let context = context_index
                .and_then(|i| row.get(i))
                .unwrap_or_default()
                .to_string();

            let tokens: Vec<&str> = if options.split_multi {
                cell.split(';').collect()
            } else {
                vec![cell]
            };
            queries.extend(
                tokens
                    .into_iter()
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(|token| GeneQuery::with_context(token, context.clone())),
            );
        }
        Ok(queries)
    }

    /// Parse rows of a resolved report (`symbol, accession, protein_name, provenance_flag`)
    pub fn resolved_rows(&self) -> Result<Vec<ResolvedRow>> {
        let symbol = self.column_index(Some("symbol"))?;
        let accession = self.column_index(Some("accession"))?;
        let protein_name = self.column_index(Some("protein_name")).ok();
        let provenance = self.column_index(Some("provenance_flag")).ok();

        let mut rows = Vec::new();
        for (line, row) in self.rows.iter().enumerate() {
            let cell = |index: usize| row.get(index).unwrap_or_default().trim().to_string();
            let accession = cell(accession);
            if accession.is_empty() {
                continue;
            }
            let provenance = match provenance.map(cell).filter(|p| !p.is_empty()) {
                Some(flag) => flag.parse::<Provenance>().map_err(|e| {
                    CliError::InvalidArgument(format!("{} row {}: {e}", self.path, line + 2))
                })?,
                None => Provenance::Reviewed,
            };
            rows.push(ResolvedRow {
                symbol: cell(symbol),
                accession,
                protein_name: protein_name.map(cell).unwrap_or_default(),
                provenance,
            });
        }
        Ok(rows)
    }
}
