//! # Label Paginator
//!
//! Lays the view dataset out as logical label pages. Nothing here touches
//! fonts or PDF objects: pages are described as text blocks plus the styling
//! directives (alignment, weight, size, padding) that `render` applies as-is.
//!
//! ## Layouts
//!
//! - **Envelope**: one record per page. A centred "BOOK POST" title sits above
//!   a band of four columns weighted 2:1:1:2, holding the sender block in the
//!   second column and the recipient block in the third.
//! - **Grid**: 5 x 10 cells per page, one record per cell (name, address,
//!   postal code). The final page is padded with empty cells so that every
//!   page has the same shape.
//!
//! Both layouts read their columns through the typed row accessor, so a
//! missing column stops pagination with a `MissingField` error.

use common::model::query::LabelLayout;
use common::model::{Dataset, MissingField, Row};

pub const PT_TO_MM: f64 = 25.4 / 72.0;

pub const ENVELOPE_WIDTH_MM: f64 = 450.0;
pub const ENVELOPE_HEIGHT_MM: f64 = 140.0;
pub const ENVELOPE_TITLE: &str = "BOOK POST";
pub const ENVELOPE_BAND_WEIGHTS: [usize; 4] = [2, 1, 1, 2];
const ENVELOPE_FONT_SIZE: u8 = 12;
const ENVELOPE_TITLE_GAP_MM: f64 = 5.0;
// Eight quarter-em spaces at 12 pt.
const ENVELOPE_INDENT_MM: f64 = 24.0 * PT_TO_MM;

/// Recipient lines in print order; the first one is printed bold.
pub const RECIPIENT_COLUMNS: [&str; 9] = [
    "NAME", "ADDRESS", "PLACE", "LOCATION", "POST", "DISTRICT", "STATE", "PIN", "RMS",
];

pub const GRID_COLUMNS: usize = 5;
pub const GRID_ROWS: usize = 10;
pub const GRID_PAGE_CAPACITY: usize = GRID_COLUMNS * GRID_ROWS;
pub const GRID_PAGE_WIDTH_MM: f64 = 297.0;
pub const GRID_PAGE_HEIGHT_MM: f64 = 210.0;
pub const GRID_MARGIN_MM: f64 = 10.0;
const GRID_FONT_SIZE: u8 = 8;
const GRID_CELL_PADDING_MM: f64 = 1.5;

/// Name, address and postal code, top to bottom.
pub const GRID_CELL_COLUMNS: [&str; 3] = ["NAME", "ADDRESS", "PIN"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const fn trbl(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn all(v: f64) -> Self {
        Self::trbl(v, v, v, v)
    }
}

/// Physical page size and margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margins: Margins,
}

impl Geometry {
    pub fn envelope() -> Self {
        Self {
            width_mm: ENVELOPE_WIDTH_MM,
            height_mm: ENVELOPE_HEIGHT_MM,
            margins: Margins::trbl(25.4, 10.0, 25.4, 10.0),
        }
    }

    pub fn grid() -> Self {
        Self {
            width_mm: GRID_PAGE_WIDTH_MM,
            height_mm: GRID_PAGE_HEIGHT_MM,
            margins: Margins::all(GRID_MARGIN_MM),
        }
    }

    pub fn usable_width_mm(&self) -> f64 {
        self.width_mm - self.margins.left - self.margins.right
    }

    pub fn usable_height_mm(&self) -> f64 {
        self.height_mm - self.margins.top - self.margins.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub bold: bool,
    pub indent_mm: f64,
}

impl Line {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            indent_mm: 0.0,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    fn blank() -> Self {
        Self::plain("")
    }

    fn indented(mut self, indent_mm: f64) -> Self {
        self.indent_mm = indent_mm;
        self
    }
}

/// Stacked lines sharing one set of styling directives.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<Line>,
    pub align: Align,
    pub font_size: u8,
    pub padding: Margins,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopePage {
    pub title: TextBlock,
    /// Space above and below the title.
    pub title_gap_mm: f64,
    /// Band columns, aligned with [`ENVELOPE_BAND_WEIGHTS`]. `None` is blank.
    pub band: Vec<Option<TextBlock>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridPage {
    pub column_width_mm: f64,
    pub row_height_mm: f64,
    /// Always `GRID_ROWS` rows of `GRID_COLUMNS` cells; `None` is padding.
    pub rows: Vec<Vec<Option<TextBlock>>>,
}

impl GridPage {
    pub fn filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Envelope(EnvelopePage),
    Grid(GridPage),
}

/// Logical document handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDocument {
    pub geometry: Geometry,
    pub pages: Vec<Page>,
}

pub fn paginate(
    view: &Dataset,
    layout: LabelLayout,
    sender: &[String],
) -> Result<LabelDocument, MissingField> {
    match layout {
        LabelLayout::Envelope => paginate_envelopes(view, sender),
        LabelLayout::Grid => paginate_grid(view),
    }
}

fn envelope_block(lines: Vec<Line>) -> TextBlock {
    TextBlock {
        lines,
        align: Align::Left,
        font_size: ENVELOPE_FONT_SIZE,
        padding: Margins::trbl(0.0, 0.0, 8.0 * PT_TO_MM, 50.0 * PT_TO_MM),
    }
}

fn sender_block(sender: &[String]) -> TextBlock {
    let mut lines = vec![Line::bold("FROM"), Line::blank()];
    lines.extend(sender.iter().enumerate().map(|(i, text)| {
        let line = if i == 0 {
            Line::bold(text.as_str())
        } else {
            Line::plain(text.as_str())
        };
        line.indented(ENVELOPE_INDENT_MM)
    }));
    envelope_block(lines)
}

fn recipient_block(row: &Row<'_>) -> Result<TextBlock, MissingField> {
    let mut lines = vec![Line::bold("TO"), Line::blank()];
    for (i, column) in RECIPIENT_COLUMNS.iter().enumerate() {
        let text = row.text(column)?;
        let line = if i == 0 {
            Line::bold(text)
        } else {
            Line::plain(text)
        };
        lines.push(line.indented(ENVELOPE_INDENT_MM));
    }
    Ok(envelope_block(lines))
}

fn paginate_envelopes(view: &Dataset, sender: &[String]) -> Result<LabelDocument, MissingField> {
    let from = sender_block(sender);
    let pages = view
        .iter()
        .map(|row| {
            Ok(Page::Envelope(EnvelopePage {
                title: TextBlock {
                    lines: vec![Line::bold(ENVELOPE_TITLE)],
                    align: Align::Center,
                    font_size: ENVELOPE_FONT_SIZE,
                    padding: Margins::all(0.0),
                },
                title_gap_mm: ENVELOPE_TITLE_GAP_MM,
                band: vec![None, Some(from.clone()), Some(recipient_block(&row)?), None],
            }))
        })
        .collect::<Result<Vec<_>, MissingField>>()?;

    Ok(LabelDocument {
        geometry: Geometry::envelope(),
        pages,
    })
}

fn grid_cell(row: &Row<'_>) -> Result<TextBlock, MissingField> {
    let mut lines = Vec::with_capacity(GRID_CELL_COLUMNS.len());
    for (i, column) in GRID_CELL_COLUMNS.iter().enumerate() {
        let text = row.text(column)?;
        lines.push(if i == 0 {
            Line::bold(text)
        } else {
            Line::plain(text)
        });
    }
    Ok(TextBlock {
        lines,
        align: Align::Left,
        font_size: GRID_FONT_SIZE,
        padding: Margins::all(GRID_CELL_PADDING_MM),
    })
}

fn paginate_grid(view: &Dataset) -> Result<LabelDocument, MissingField> {
    let geometry = Geometry::grid();
    let column_width_mm = geometry.usable_width_mm() / GRID_COLUMNS as f64;
    let row_height_mm = geometry.usable_height_mm() / GRID_ROWS as f64;

    let cells = view
        .iter()
        .map(|row| grid_cell(&row))
        .collect::<Result<Vec<_>, _>>()?;

    let pages = cells
        .chunks(GRID_PAGE_CAPACITY)
        .map(|chunk| {
            let mut rows: Vec<Vec<Option<TextBlock>>> = chunk
                .chunks(GRID_COLUMNS)
                .map(|r| {
                    let mut row: Vec<Option<TextBlock>> = r.iter().cloned().map(Some).collect();
                    row.resize(GRID_COLUMNS, None);
                    row
                })
                .collect();
            rows.resize(GRID_ROWS, vec![None; GRID_COLUMNS]);
            Page::Grid(GridPage {
                column_width_mm,
                row_height_mm,
                rows,
            })
        })
        .collect();

    Ok(LabelDocument {
        geometry,
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::Record;
    use pretty_assertions::assert_eq;

    fn labels(n: usize) -> Dataset {
        let mut ds = Dataset::new(
            RECIPIENT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        )
        .unwrap();
        for i in 0..n {
            ds.push(Record::from_texts(RECIPIENT_COLUMNS.iter().map(|c| {
                if *c == "NAME" {
                    format!("Customer {i}")
                } else {
                    format!("{c} {i}")
                }
            })))
            .unwrap();
        }
        ds
    }

    fn sender() -> Vec<String> {
        vec!["ACME PRESS".to_string(), "1 Printers Lane".to_string()]
    }

    fn grid_pages(doc: &LabelDocument) -> Vec<&GridPage> {
        doc.pages
            .iter()
            .map(|p| match p {
                Page::Grid(g) => g,
                Page::Envelope(_) => panic!("expected grid page"),
            })
            .collect()
    }

    #[test]
    fn grid_page_count_and_shape() {
        for (n, pages) in [(0, 0), (1, 1), (49, 1), (50, 1), (51, 2), (120, 3)] {
            let doc = paginate(&labels(n), LabelLayout::Grid, &sender()).unwrap();
            let grid = grid_pages(&doc);
            assert_eq!(grid.len(), pages, "n = {n}");
            for page in &grid {
                assert_eq!(page.rows.len(), GRID_ROWS);
                assert!(page.rows.iter().all(|r| r.len() == GRID_COLUMNS));
            }
            let filled: usize = grid.iter().map(|p| p.filled_cells()).sum();
            assert_eq!(filled, n);
        }
    }

    #[test]
    fn grid_pads_trailing_cells() {
        let doc = paginate(&labels(53), LabelLayout::Grid, &sender()).unwrap();
        let last = grid_pages(&doc)[1];
        assert_eq!(last.filled_cells(), 3);
        assert!(last.rows[0][..3].iter().all(Option::is_some));
        assert!(last.rows[0][3..].iter().all(Option::is_none));
        assert!(last.rows[1..].iter().flatten().all(Option::is_none));
    }

    #[test]
    fn grid_cell_stacks_name_address_pin() {
        let doc = paginate(&labels(7), LabelLayout::Grid, &sender()).unwrap();
        let cell = grid_pages(&doc)[0].rows[1][1].clone().unwrap();
        let texts: Vec<&str> = cell.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Customer 6", "ADDRESS 6", "PIN 6"]);
        assert!(cell.lines[0].bold);
        assert!(!cell.lines[1].bold);
    }

    #[test]
    fn grid_geometry_divides_usable_area() {
        let doc = paginate(&labels(1), LabelLayout::Grid, &sender()).unwrap();
        let page = grid_pages(&doc)[0];
        assert!((page.column_width_mm - 277.0 / 5.0).abs() < 1e-9);
        assert!((page.row_height_mm - 19.0).abs() < 1e-9);
    }

    #[test]
    fn envelope_one_page_per_record_in_order() {
        let doc = paginate(&labels(4), LabelLayout::Envelope, &sender()).unwrap();
        assert_eq!(doc.pages.len(), 4);
        for (i, page) in doc.pages.iter().enumerate() {
            let Page::Envelope(env) = page else {
                panic!("expected envelope page");
            };
            assert_eq!(env.title.lines[0].text, ENVELOPE_TITLE);
            assert_eq!(env.title.align, Align::Center);
            assert_eq!(env.band.len(), ENVELOPE_BAND_WEIGHTS.len());
            assert!(env.band[0].is_none() && env.band[3].is_none());

            let to = env.band[2].as_ref().unwrap();
            assert_eq!(to.lines[0].text, "TO");
            assert_eq!(to.lines[2].text, format!("Customer {i}"));
            assert!(to.lines[2].bold);
            assert_eq!(to.lines.last().unwrap().text, format!("RMS {i}"));

            let from = env.band[1].as_ref().unwrap();
            assert_eq!(from.lines[2].text, "ACME PRESS");
            assert_eq!(from.font_size, 12);
        }
    }

    #[test]
    fn envelope_missing_column_is_fatal() {
        let ds = labels(2).project(&["NAME", "ADDRESS"]).unwrap();
        let err = paginate(&ds, LabelLayout::Envelope, &sender()).unwrap_err();
        assert_eq!(err, MissingField::new("PLACE"));
    }

    #[test]
    fn grid_missing_column_is_fatal() {
        let ds = labels(2).project(&["NAME", "ADDRESS"]).unwrap();
        let err = paginate(&ds, LabelLayout::Grid, &sender()).unwrap_err();
        assert_eq!(err, MissingField::new("PIN"));
    }

    #[test]
    fn null_cells_print_blank() {
        let mut ds = labels(0);
        ds.push(Record::new(vec![None; RECIPIENT_COLUMNS.len()])).unwrap();
        let doc = paginate(&ds, LabelLayout::Envelope, &sender()).unwrap();
        let Page::Envelope(env) = &doc.pages[0] else {
            panic!("expected envelope page");
        };
        assert_eq!(env.band[2].as_ref().unwrap().lines[2].text, "");
    }
}
