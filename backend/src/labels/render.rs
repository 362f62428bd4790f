use crate::labels::layout::{
    Align, EnvelopePage, GridPage, LabelDocument, Margins, Page, TextBlock, ENVELOPE_BAND_WEIGHTS,
    PT_TO_MM,
};
use genpdf::elements::{
    Break, FrameCellDecorator, LinearLayout, PageBreak, Paragraph, TableLayout,
};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use genpdf::{Alignment, Document, Element as _, SimplePageDecorator, Size};
use log::debug;
use std::path::PathBuf;
use thiserror::Error;

/// Rough line height as a multiple of the font size, used to fill grid rows.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no usable font family in '{dir}': {reason}")]
    Fonts { dir: String, reason: String },
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] genpdf::error::Error),
}

/// Where to look for TTF files and which families to try, in order.
#[derive(Debug, Clone)]
pub struct FontSource {
    pub dir: PathBuf,
    pub families: Vec<String>,
}

impl FontSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            families: vec!["Arial".to_string(), "LiberationSans".to_string()],
        }
    }
}

/// Load the first family that is fully present in `fonts.dir`.
fn load_font(fonts: &FontSource) -> Result<FontFamily<FontData>, RenderError> {
    let mut reason = String::from("no font family configured");
    for family in &fonts.families {
        match genpdf::fonts::from_files(&fonts.dir, family, None) {
            Ok(f) => return Ok(f),
            Err(e) => {
                debug!("font family {} not loaded: {}", family, e);
                reason = e.to_string();
            }
        }
    }
    Err(RenderError::Fonts {
        dir: fonts.dir.display().to_string(),
        reason,
    })
}

fn pdf_margins(m: Margins) -> genpdf::Margins {
    genpdf::Margins::trbl(m.top, m.right, m.bottom, m.left)
}

fn alignment(align: Align) -> Alignment {
    match align {
        Align::Left => Alignment::Left,
        Align::Center => Alignment::Center,
    }
}

/// Blank lines needed to stretch `block` to `height_mm`.
fn filler_lines(block_lines: usize, font_size: u8, padding: Margins, height_mm: f64) -> usize {
    let line_mm = f64::from(font_size) * PT_TO_MM * LINE_HEIGHT_FACTOR;
    let capacity = ((height_mm - padding.top - padding.bottom) / line_mm).floor();
    if capacity <= 0.0 {
        return 0;
    }
    (capacity as usize).saturating_sub(block_lines)
}

/// A text block as a padded vertical layout; `fill_to_mm` pads it with blank
/// lines to roughly that height.
fn block_element(block: &TextBlock, fill_to_mm: Option<f64>) -> impl genpdf::Element {
    let mut layout = LinearLayout::vertical();
    for line in &block.lines {
        if line.text.is_empty() {
            layout.push(Break::new(1));
            continue;
        }
        let style = if line.bold {
            Style::new().bold()
        } else {
            Style::new()
        };
        let paragraph = Paragraph::new(StyledString::new(line.text.clone(), style))
            .aligned(alignment(block.align));
        layout.push(paragraph.padded(genpdf::Margins::trbl(0.0, 0.0, 0.0, line.indent_mm)));
    }
    if let Some(height) = fill_to_mm {
        let extra = filler_lines(block.lines.len(), block.font_size, block.padding, height);
        if extra > 0 {
            layout.push(Break::new(extra as f64));
        }
    }
    layout
        .padded(pdf_margins(block.padding))
        .styled(Style::new().with_font_size(block.font_size))
}

fn push_envelope(doc: &mut Document, page: &EnvelopePage) -> Result<(), RenderError> {
    let gap = page.title_gap_mm;
    let title = block_element(&page.title, None);
    doc.push(title.padded(genpdf::Margins::trbl(gap, 0.0, gap, 0.0)));

    let mut table = TableLayout::new(ENVELOPE_BAND_WEIGHTS.to_vec());
    let mut row = table.row();
    for cell in &page.band {
        match cell {
            Some(block) => row.push_element(block_element(block, None)),
            None => row.push_element(Paragraph::new("")),
        }
    }
    row.push()?;
    doc.push(table);
    Ok(())
}

fn push_grid(doc: &mut Document, page: &GridPage) -> Result<(), RenderError> {
    let mut table = TableLayout::new(vec![1; page.rows.first().map_or(1, Vec::len)]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    // empty cells still need a block to stretch to the row height
    let empty = page
        .rows
        .iter()
        .flatten()
        .flatten()
        .next()
        .map(|b| TextBlock {
            lines: Vec::new(),
            ..b.clone()
        });

    for cells in &page.rows {
        let mut row = table.row();
        for cell in cells {
            match cell.as_ref().or(empty.as_ref()) {
                Some(block) => row.push_element(block_element(block, Some(page.row_height_mm))),
                None => row.push_element(Paragraph::new("")),
            }
        }
        row.push()?;
    }
    doc.push(table);
    Ok(())
}

/// Renders the logical label document to PDF bytes.
pub fn render(labels: &LabelDocument, fonts: &FontSource) -> Result<Vec<u8>, RenderError> {
    let family = load_font(fonts)?;
    let mut doc = Document::new(family);
    doc.set_title("Customer labels");
    doc.set_paper_size(Size::new(labels.geometry.width_mm, labels.geometry.height_mm));
    doc.set_line_spacing(1.0f64);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(pdf_margins(labels.geometry.margins));
    doc.set_page_decorator(decorator);

    for (i, page) in labels.pages.iter().enumerate() {
        if i > 0 {
            doc.push(PageBreak::new());
        }
        match page {
            Page::Envelope(p) => push_envelope(&mut doc, p)?,
            Page::Grid(p) => push_grid(&mut doc, p)?,
        }
    }

    let mut out = Vec::new();
    doc.render(&mut out)?;
    debug!(
        "rendered {} label pages into {} bytes",
        labels.pages.len(),
        out.len()
    );
    Ok(out)
}
