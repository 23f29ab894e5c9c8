use std::io::{self, Write};

use crate::projects::{FormSchema, Registration};

const SUBMITTED_AT_COLUMN: &str = "submitted_at";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Io(#[from] io::Error),
}

/// Writes one header row (`submitted_at` then field labels in schema order) and one
/// row per registration. Missing answers are empty cells; multi-choice answers are
/// joined with ", ". Returns the number of data rows written.
pub fn write_csv<W: Write>(
    schema: &FormSchema,
    registrations: &[Registration],
    writer: W,
) -> Result<usize, ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let header = std::iter::once(SUBMITTED_AT_COLUMN.to_string())
        .chain(schema.iter().map(|field| field.label.clone()));
    csv.write_record(header)?;

    for registration in registrations {
        let cells = std::iter::once(registration.submitted_at.to_rfc3339()).chain(
            schema.iter().map(|field| {
                registration
                    .answers
                    .get(&field.id)
                    .map(|answer| answer.display())
                    .unwrap_or_default()
            }),
        );
        csv.write_record(cells)?;
    }

    csv.flush()?;
    Ok(registrations.len())
}
