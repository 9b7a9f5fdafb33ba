//! FASTA export of resolved sequences

use anyhow::{Context, Result};
use protmap_core::ProteinRecord;
use std::io::Write;
use std::path::Path;

const LINE_WIDTH: usize = 60;

/// Write records that carry a sequence; returns how many were written
pub fn write_fasta(path: &Path, records: &[ProteinRecord]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = std::io::BufWriter::new(file);
    let mut written = 0;

    for record in records {
        let Some(sequence) = record.sequence.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        writeln!(out, ">{} {}", record.accession, record.display_name)?;
        for line in sequence.as_bytes().chunks(LINE_WIDTH) {
            out.write_all(line)?;
            out.write_all(b"\n")?;
        }
        written += 1;
    }

    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(written)
}
