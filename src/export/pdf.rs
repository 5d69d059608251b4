//! PDF reports drawn directly with PDF content operators.
//!
//! Reports are built as a flat list of blocks, then laid out top to bottom
//! onto US-Letter pages. Only the standard Type1 fonts are used, so text is
//! restricted to ASCII.

use crate::analyser::logic::{Dataset, Stats, health};
use crate::error::Result;
use crate::utils::{ascii_only, fmt_opt, percentage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 50;
const MAX_LINE_CHARS: usize = 92;
const CHART_HEIGHT: i64 = 140;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const FONT_MONO: &str = "F3";

const BLUE: [i64; 3] = [0, 0, 1];
const RED: [i64; 3] = [1, 0, 0];

struct BarChart {
    title: String,
    labels: Vec<String>,
    values: Vec<usize>,
    color: [i64; 3],
}

enum Block {
    Title(String),
    Heading(String),
    Text(String),
    /// Monospaced line, for tables.
    Row(String),
    Spacer,
    Bars(BarChart),
}

impl Block {
    fn height(&self) -> i64 {
        match self {
            Self::Title(_) => 30,
            Self::Heading(_) => 24,
            Self::Text(_) | Self::Row(_) => 13,
            Self::Spacer => 8,
            Self::Bars(_) => CHART_HEIGHT + 50,
        }
    }
}

#[derive(Default)]
struct Report {
    blocks: Vec<Block>,
}

impl Report {
    fn title(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Title(text.into()));
        self
    }

    fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Spacer);
        self.blocks.push(Block::Heading(text.into()));
        self
    }

    fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Text(text.into()));
        self
    }

    fn row(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Row(text.into()));
        self
    }

    fn bars(&mut self, chart: BarChart) -> &mut Self {
        self.blocks.push(Block::Bars(chart));
        self
    }

    /// Splits blocks into pages of content operations.
    fn layout(&self) -> Vec<Vec<Operation>> {
        let mut pages = Vec::new();
        let mut ops = Vec::new();
        let mut y = PAGE_HEIGHT - MARGIN;

        for block in &self.blocks {
            let height = block.height();
            if y - height < MARGIN && !ops.is_empty() {
                pages.push(std::mem::take(&mut ops));
                y = PAGE_HEIGHT - MARGIN;
            }
            y -= height;
            match block {
                Block::Title(text) => push_text(&mut ops, FONT_BOLD, 18, MARGIN, y + 8, text),
                Block::Heading(text) => push_text(&mut ops, FONT_BOLD, 13, MARGIN, y + 6, text),
                Block::Text(text) => push_text(&mut ops, FONT_REGULAR, 10, MARGIN, y + 3, text),
                Block::Row(text) => push_text(&mut ops, FONT_MONO, 9, MARGIN, y + 3, text),
                Block::Spacer => {}
                Block::Bars(chart) => draw_bars(&mut ops, chart, y),
            }
        }

        if !ops.is_empty() || pages.is_empty() {
            pages.push(ops);
        }
        pages
    }

    fn render(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(type1_font("Helvetica"));
        let bold = doc.add_object(type1_font("Helvetica-Bold"));
        let mono = doc.add_object(type1_font("Courier"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_REGULAR => regular,
                FONT_BOLD => bold,
                FONT_MONO => mono,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in self.layout() {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

fn type1_font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn truncate(text: &str, max: usize) -> String {
    let clean = ascii_only(text);
    if clean.len() <= max {
        clean
    } else {
        let mut cut: String = clean.chars().take(max.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

fn push_text(ops: &mut Vec<Operation>, font: &str, size: i64, x: i64, y: i64, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(truncate(text, MAX_LINE_CHARS))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn set_fill(ops: &mut Vec<Operation>, [r, g, b]: [i64; 3]) {
    ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
}

fn fill_rect(ops: &mut Vec<Operation>, x: i64, y: i64, width: i64, height: i64) {
    ops.push(Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]));
    ops.push(Operation::new("f", vec![]));
}

/// Vertical bars scaled to the largest value, with the value above each bar
/// and a truncated label below. `bottom` is the lowest y of the block.
fn draw_bars(ops: &mut Vec<Operation>, chart: &BarChart, bottom: i64) {
    let top = bottom + CHART_HEIGHT + 50;
    push_text(ops, FONT_BOLD, 10, MARGIN, top - 12, &chart.title);

    let base = bottom + 20;
    let area_width = PAGE_WIDTH - 2 * MARGIN;
    let slots = chart.values.len().max(1) as i64;
    let slot = (area_width / slots).max(4);
    let bar_width = (slot * 3 / 4).max(2);
    let max_value = chart.values.iter().copied().max().unwrap_or(0).max(1) as i64;

    // Axis
    set_fill(ops, [0, 0, 0]);
    fill_rect(ops, MARGIN, base - 1, area_width, 1);

    for (i, (label, &value)) in chart.labels.iter().zip(&chart.values).enumerate() {
        let x = MARGIN + i as i64 * slot;
        let height = value as i64 * CHART_HEIGHT / max_value;
        if height > 0 {
            set_fill(ops, chart.color);
            fill_rect(ops, x, base, bar_width, height);
        }
        set_fill(ops, [0, 0, 0]);
        push_text(ops, FONT_REGULAR, 7, x, base + height + 3, &value.to_string());
        let max_chars = usize::try_from(slot / 4).unwrap_or(1).max(1);
        push_text(ops, FONT_REGULAR, 7, x, bottom + 8, &truncate(label, max_chars));
    }
}

fn column_table(report: &mut Report, dataset: &Dataset, stats: &Stats) {
    report.row(format!("{:<32} {:<12} {:>10}", "Column", "Type", "Missing"));
    for column in dataset.columns() {
        let missing = stats.missing_values.get(column.name()).copied().unwrap_or(0);
        report.row(format!(
            "{:<32} {:<12} {:>10}",
            truncate(column.name(), 32),
            column.kind().as_str(),
            missing
        ));
    }
}

/// Title, version, shape and a per-column table.
///
/// # Errors
///
/// Returns an export error if the document cannot be serialized.
pub fn render_basic_report(dataset: &Dataset, stats: &Stats, version: u64) -> Result<Vec<u8>> {
    let mut report = Report::default();
    report
        .title("Data Analysis Report")
        .text(format!("Dataset version: {version}"))
        .text(format!("Shape: {} rows x {} columns", stats.rows, stats.columns))
        .text(format!("Quality score: {:.2} / 100", stats.quality_score))
        .heading("Columns");
    column_table(&mut report, dataset, stats);
    report.render()
}

/// Everything in the basic report plus overview counts, the quality
/// breakdown, completeness and uniqueness per column, numeric summaries,
/// risks and bar charts of missing values and outliers.
///
/// # Errors
///
/// Returns an export error if the document cannot be serialized.
pub fn render_enhanced_report(dataset: &Dataset, stats: &Stats, version: u64) -> Result<Vec<u8>> {
    let numeric = dataset.numeric_columns().len();
    let textual = dataset.columns().iter().filter(|c| c.kind().is_textual()).count();
    let breakdown = &stats.quality_breakdown;

    let mut report = Report::default();
    report
        .title("Enhanced Data Analysis Report")
        .text(format!("Dataset version: {version}"))
        .heading("Overview")
        .text(format!("Rows: {}", stats.rows))
        .text(format!(
            "Columns: {} ({numeric} numeric, {textual} categorical or text)",
            stats.columns
        ))
        .text(format!("Missing cells: {}", stats.total_missing()))
        .text(format!("Duplicate rows: {}", stats.duplicate_rows))
        .text(format!("Outlier values: {}", stats.total_outliers()))
        .text(format!("Memory usage: {} bytes of cell text", stats.memory_usage))
        .heading("Quality Score")
        .text(format!("Score: {:.2} / 100", stats.quality_score))
        .row(format!(
            "Missing    {:>8.2}% x 0.5 = {:>7.2}",
            breakdown.missing_pct, breakdown.missing_penalty
        ))
        .row(format!(
            "Duplicates {:>8.2}% x 0.3 = {:>7.2}",
            breakdown.duplicate_pct, breakdown.duplicate_penalty
        ))
        .row(format!(
            "Outliers   {:>8.2}% x 0.2 = {:>7.2}",
            breakdown.outlier_pct, breakdown.outlier_penalty
        ));

    report.heading("Columns");
    column_table(&mut report, dataset, stats);

    report.heading("Completeness and Uniqueness");
    report.row(format!("{:<32} {:>14} {:>14}", "Column", "Complete %", "Unique %"));
    for column in dataset.columns() {
        let present = column.len() - column.missing_count();
        report.row(format!(
            "{:<32} {:>14.1} {:>14.1}",
            truncate(column.name(), 32),
            percentage(present, column.len()),
            percentage(column.distinct_count(), present)
        ));
    }

    if !stats.numeric_summary.is_empty() {
        report.heading("Numeric Summary");
        report.row(format!(
            "{:<20} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Column", "Mean", "Std", "Min", "Median", "Max"
        ));
        for (name, summary) in &stats.numeric_summary {
            report.row(format!(
                "{:<20} {:>12} {:>12} {:>12} {:>12} {:>12}",
                truncate(name, 20),
                fmt_opt(summary.mean),
                fmt_opt(summary.std),
                fmt_opt(summary.min),
                fmt_opt(summary.median),
                fmt_opt(summary.max)
            ));
        }
    }

    let risks = health::describe_risks(stats);
    if !risks.is_empty() {
        report.heading("Risks");
        for risk in risks {
            report.text(format!("- {risk}"));
        }
    }

    report.heading("Charts").bars(BarChart {
        title: "Missing values per column".to_owned(),
        labels: stats.missing_values.keys().cloned().collect(),
        values: stats.missing_values.values().copied().collect(),
        color: BLUE,
    });
    report.bars(BarChart {
        title: "Outliers per numeric column".to_owned(),
        labels: stats.outliers.keys().cloned().collect(),
        values: stats.outliers.values().copied().collect(),
        color: RED,
    });

    report.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long column name", 10), "a very ...");
        assert_eq!(truncate("caf\u{e9}", 10), "caf?");
    }

    #[test]
    fn test_layout_breaks_pages() {
        let mut report = Report::default();
        for i in 0..200 {
            report.row(format!("line {i}"));
        }
        assert!(report.layout().len() > 1);
    }

    #[test]
    fn test_empty_report_has_one_page() {
        assert_eq!(Report::default().layout().len(), 1);
    }
}
