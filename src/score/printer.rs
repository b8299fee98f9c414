//! Tabular rendering of score collections.
//!
//! Each metric declares its columns as a static slice of [`ColumnSpec`].
//! Raw rows print with the column's cell format; summary rows print with
//! the mean format, which lets a metric suppress misleading means (a text
//! mean format renders as a blank cell).

use super::{Column, Score, ScoreCollection};

/// Cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Right,
}

/// How a cell value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    /// Render the key column's text.
    Text,
    /// Render the numeric column with this many decimals.
    Fixed(usize),
}

/// One column of a metric's report.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Which row field feeds the column.
    pub column: Column,
    /// Header text.
    pub header: &'static str,
    /// Cell format for raw rows.
    pub format: CellFormat,
    /// Alignment in the fixed-width rendering.
    pub justify: Justify,
    /// Cell format for summary rows; `None` inherits `format`.
    pub mean_format: Option<CellFormat>,
}

impl ColumnSpec {
    /// Shorthand for a left-justified text key column.
    pub const fn text(column: Column, header: &'static str) -> Self {
        Self {
            column,
            header,
            format: CellFormat::Text,
            justify: Justify::Left,
            mean_format: None,
        }
    }

    /// Shorthand for a right-justified numeric column whose summary cell is
    /// the mean at the same precision.
    pub const fn numeric(column: Column, header: &'static str, precision: usize) -> Self {
        Self {
            column,
            header,
            format: CellFormat::Fixed(precision),
            justify: Justify::Right,
            mean_format: Some(CellFormat::Fixed(precision)),
        }
    }

    /// Shorthand for a numeric column whose summary cell is blank.
    pub const fn numeric_no_mean(column: Column, header: &'static str, precision: usize) -> Self {
        Self {
            column,
            header,
            format: CellFormat::Fixed(precision),
            justify: Justify::Right,
            mean_format: Some(CellFormat::Text),
        }
    }
}

/// Output flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Fixed-width columns for reading.
    Pretty,
    /// Tab-separated values for diffing and ingestion.
    Tab,
}

fn cell(spec: &ColumnSpec, score: &Score) -> String {
    let format = if score.summary {
        spec.mean_format.unwrap_or(spec.format)
    } else {
        spec.format
    };
    match format {
        CellFormat::Fixed(precision) => match score.number(spec.column) {
            Some(value) => format!("{value:.precision$}"),
            None => String::new(),
        },
        CellFormat::Text => {
            if spec.column.is_numeric() {
                // Text format on a numeric column means "no cell here",
                // used to blank out means that would mislead.
                String::new()
            } else {
                score.text(spec.column)
            }
        }
    }
}

/// Render `scores` under `specs` in the requested format.
pub fn render(specs: &[ColumnSpec], scores: &ScoreCollection, format: TableFormat) -> String {
    let grid: Vec<Vec<String>> = scores
        .rows()
        .iter()
        .map(|score| specs.iter().map(|spec| cell(spec, score)).collect())
        .collect();
    match format {
        TableFormat::Tab => render_tab(specs, &grid),
        TableFormat::Pretty => render_pretty(specs, &grid),
    }
}

fn render_tab(specs: &[ColumnSpec], grid: &[Vec<String>]) -> String {
    let mut out = String::new();
    let headers: Vec<&str> = specs.iter().map(|s| s.header).collect();
    out.push_str(&headers.join("\t"));
    out.push('\n');
    for row in grid {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

fn render_pretty(specs: &[ColumnSpec], grid: &[Vec<String>]) -> String {
    let widths: Vec<usize> = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            grid.iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(spec.header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let mut out = String::new();
    for (i, spec) in specs.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        // Headers follow the column's alignment.
        push_justified(&mut out, spec.header, widths[i], spec.justify);
    }
    out.push('\n');
    for row in grid {
        for (i, spec) in specs.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            push_justified(&mut out, &row[i], widths[i], spec.justify);
        }
        out.push('\n');
    }
    out
}

fn push_justified(out: &mut String, text: &str, width: usize, justify: Justify) {
    match justify {
        Justify::Left => out.push_str(&format!("{text:<width$}")),
        Justify::Right => out.push_str(&format!("{text:>width$}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[ColumnSpec] = &[
        ColumnSpec::text(Column::DocumentId, "DocID"),
        ColumnSpec::numeric_no_mean(Column::Precision, "Prec", 4),
        ColumnSpec::numeric(Column::F1, "F1", 4),
    ];

    fn sample() -> ScoreCollection {
        let mut collection = ScoreCollection::new();
        let mut raw = Score::new("run1");
        raw.document_id = Some("DOC1".into());
        raw.precision = Some(0.5);
        raw.f1 = Some(0.6667);
        collection.add(raw);
        let mut summary = Score::new("run1");
        summary.document_id = Some("Summary".into());
        summary.precision = Some(0.5);
        summary.f1 = Some(0.6667);
        summary.summary = true;
        collection.add(summary);
        collection
    }

    #[test]
    fn summary_rows_blank_suppressed_means() {
        let tab = render(SPECS, &sample(), TableFormat::Tab);
        let lines: Vec<&str> = tab.lines().collect();
        assert_eq!(lines[0], "DocID\tPrec\tF1");
        assert_eq!(lines[1], "DOC1\t0.5000\t0.6667");
        // The mean format for Prec is text, so the summary cell is empty.
        assert_eq!(lines[2], "Summary\t\t0.6667");
    }

    #[test]
    fn pretty_rendering_pads_to_widest_cell() {
        let pretty = render(SPECS, &sample(), TableFormat::Pretty);
        let lines: Vec<&str> = pretty.lines().collect();
        assert_eq!(lines[0], "DocID      Prec      F1");
        assert_eq!(lines[1], "DOC1     0.5000  0.6667");
        assert_eq!(lines[2], "Summary          0.6667");
    }
}
