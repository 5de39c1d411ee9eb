//! Printable PDF reports.
//!
//! Pages are A4 and use the Courier base fonts, so column text can be cut to fit by character
//! count. Rendering only produces bytes; [`write_document`] is the one place that touches disk.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use tracing::{debug, info};

use crate::error::AppResult;
use crate::model::attendance::Attendance;
use crate::model::job::SettlementMethod;
use crate::report::sanitize::{encode_win_ansi, format_currency, sanitize};
use crate::report::totals::{JobReport, TRANSPORT_RATE, naive_settled_total};
use crate::utils::dates::TIME_FORMAT;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MM: f32 = 72.0 / 25.4;
const MARGIN: f32 = 15.0 * MM;
const ROW_HEIGHT: f32 = 20.0;
const CELL_PADDING: f32 = 3.0;
/// Advance width of every Courier glyph, per point of font size.
const COURIER_ADVANCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
    Right,
}

/// What happens to text wider than its cell.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Overflow {
    /// Cut at the last glyph that fits. Only for free text such as client names.
    Truncate,
    /// Keep every glyph and lower the font size instead.
    Shrink,
}

struct Column {
    title: &'static str,
    width_mm: f32,
    align: Align,
    overflow: Overflow,
}

struct Cell {
    text: String,
    width_mm: f32,
    align: Align,
    overflow: Overflow,
}

impl Cell {
    /// A cell whose text is always printed in full.
    fn new(text: impl Into<String>, width_mm: f32, align: Align) -> Self {
        Self {
            text: text.into(),
            width_mm,
            align,
            overflow: Overflow::Shrink,
        }
    }
}

/// Lays out text lines and bordered table rows, breaking pages when the bottom margin is reached.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    /// Distance from the top edge of the current page
    cursor: f32,
}

impl PageWriter {
    fn new() -> Self {
        let mut writer = Self {
            pages: Vec::new(),
            cursor: 0.0,
        };
        writer.new_page();
        writer
    }

    fn new_page(&mut self) {
        let line_width = Operation::new("w", vec![Object::Real(0.5)]);
        self.pages.push(vec![line_width]);
        self.cursor = MARGIN;
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        // `new` always opens the first page
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Starts a new page when `height` does not fit. Returns true if it did.
    fn reserve(&mut self, height: f32) -> bool {
        if self.cursor + height > PAGE_HEIGHT - MARGIN {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn gap(&mut self, height: f32) {
        self.cursor += height;
    }

    fn text(&mut self, x: f32, baseline: f32, font: Font, size: f32, text: &str) {
        let y = PAGE_HEIGHT - baseline;
        self.ops().extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.resource_name().as_bytes().to_vec()), Object::Real(size)],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Full-width line of text.
    fn line(&mut self, text: &str, font: Font, size: f32, align: Align) {
        let height = size * 1.6;
        self.reserve(height);

        let available = PAGE_WIDTH - 2.0 * MARGIN;
        let text = fit(text, available, size);
        let x = MARGIN + offset(&text, available, size, align);
        let baseline = self.cursor + height * 0.7;
        self.text(x, baseline, font, size, &text);
        self.cursor += height;
    }

    fn row(&mut self, cells: &[Cell], font: Font, size: f32) {
        let top = self.cursor;
        let mut x = MARGIN;

        for cell in cells {
            let width = cell.width_mm * MM;
            self.ops().extend([
                Operation::new(
                    "re",
                    vec![
                        Object::Real(x),
                        Object::Real(PAGE_HEIGHT - top - ROW_HEIGHT),
                        Object::Real(width),
                        Object::Real(ROW_HEIGHT),
                    ],
                ),
                Operation::new("S", vec![]),
            ]);

            let inner = width - 2.0 * CELL_PADDING;
            let (text, size) = match cell.overflow {
                Overflow::Truncate => (fit(&cell.text, inner, size), size),
                Overflow::Shrink => shrink_to_fit(&cell.text, inner, size),
            };
            let text_x = x + CELL_PADDING + offset(&text, inner, size, cell.align);
            let baseline = top + (ROW_HEIGHT + size * 0.7) / 2.0;
            self.text(text_x, baseline, font, size, &text);

            x += width;
        }

        self.cursor += ROW_HEIGHT;
    }

    fn header(&mut self, columns: &[Column]) {
        self.reserve(ROW_HEIGHT);
        let cells: Vec<_> = columns
            .iter()
            .map(|c| Cell::new(c.title, c.width_mm, Align::Left))
            .collect();
        self.row(&cells, Font::Bold, 10.0);
    }

    /// Table body row; repeats the header when the row opens a new page.
    fn body_row(&mut self, columns: &[Column], values: Vec<String>, font: Font) {
        if self.reserve(ROW_HEIGHT) {
            self.header(columns);
        }
        let cells: Vec<_> = columns
            .iter()
            .zip(values)
            .map(|(c, v)| Cell {
                text: v,
                width_mm: c.width_mm,
                align: c.align,
                overflow: c.overflow,
            })
            .collect();
        self.row(&cells, font, 9.0);
    }

    /// Two-cell "label: value" row used by the summary blocks.
    fn summary_row(&mut self, label: &str, value: String, font: Font) {
        self.reserve(ROW_HEIGHT);
        self.row(
            &[
                Cell::new(label, 80.0, Align::Left),
                Cell::new(value, 40.0, Align::Right),
            ],
            font,
            10.0,
        );
    }

    fn finish(self) -> AppResult<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
        });

        let page_count = self.pages.len();
        let mut kids: Vec<Object> = Vec::with_capacity(page_count);
        for operations in self.pages {
            let content = Content { operations }.encode()?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), Object::Real(PAGE_WIDTH), Object::Real(PAGE_HEIGHT)],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;

        debug!(pages = page_count, bytes = buffer.len(), "Document rendered");
        Ok(buffer)
    }
}

/// Sanitized `text`, cut to the number of Courier glyphs that fit in `width`.
fn fit(text: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * COURIER_ADVANCE)).floor().max(0.0) as usize;
    sanitize(text).chars().take(max_chars).collect()
}

/// Sanitized `text` with the font size lowered, if needed, so every glyph fits in `width`.
fn shrink_to_fit(text: &str, width: f32, size: f32) -> (String, f32) {
    let text = sanitize(text);
    let glyphs = text.chars().count() as f32;
    if glyphs * size * COURIER_ADVANCE <= width {
        return (text, size);
    }
    let size = width / (glyphs * COURIER_ADVANCE);
    (text, size)
}

fn offset(text: &str, width: f32, size: f32, align: Align) -> f32 {
    let used = text.chars().count() as f32 * size * COURIER_ADVANCE;
    match align {
        Align::Left => 0.0,
        Align::Center => ((width - used) / 2.0).max(0.0),
        Align::Right => (width - used).max(0.0),
    }
}

const ATTENDANCE_COLUMNS: [Column; 4] = [
    Column {
        title: "Data",
        width_mm: 40.0,
        align: Align::Left,
        overflow: Overflow::Shrink,
    },
    Column {
        title: "Ingresso",
        width_mm: 40.0,
        align: Align::Left,
        overflow: Overflow::Shrink,
    },
    Column {
        title: "Uscita",
        width_mm: 40.0,
        align: Align::Left,
        overflow: Overflow::Shrink,
    },
    Column {
        title: "Ore Lavorate",
        width_mm: 40.0,
        align: Align::Right,
        overflow: Overflow::Shrink,
    },
];

/// Widths add up to the 180 mm between the margins.
const JOB_COLUMNS: [Column; 7] = [
    Column {
        title: "Commessa",
        width_mm: 18.0,
        align: Align::Left,
        overflow: Overflow::Truncate,
    },
    Column {
        title: "Data",
        width_mm: 22.0,
        align: Align::Left,
        overflow: Overflow::Shrink,
    },
    Column {
        title: "Cliente",
        width_mm: 37.0,
        align: Align::Left,
        overflow: Overflow::Truncate,
    },
    Column {
        title: "Pagamento",
        width_mm: 28.0,
        align: Align::Left,
        overflow: Overflow::Shrink,
    },
    Column {
        title: "Contratto",
        width_mm: 25.0,
        align: Align::Right,
        overflow: Overflow::Shrink,
    },
    Column {
        title: "Saldo",
        width_mm: 25.0,
        align: Align::Right,
        overflow: Overflow::Shrink,
    },
    Column {
        title: "Extra",
        width_mm: 25.0,
        align: Align::Right,
        overflow: Overflow::Shrink,
    },
];

/// Monthly attendance sheet for one employee.
pub fn render_attendance(
    employee_name: Option<&str>,
    month: u32,
    year: i32,
    records: &[Attendance],
) -> AppResult<Vec<u8>> {
    let mut page = PageWriter::new();

    page.line(&format!("Timbrature - {year}-{month:02}"), Font::Bold, 16.0, Align::Center);
    let name = match employee_name {
        Some(name) if !records.is_empty() => name,
        _ => "Nessun dato",
    };
    page.line(&format!("Utente: {name}"), Font::Regular, 12.0, Align::Left);
    page.gap(10.0);

    page.header(&ATTENDANCE_COLUMNS);
    let mut total_hours = 0.0;
    for record in records {
        let hours = record.worked_hours();
        total_hours += hours;
        page.body_row(
            &ATTENDANCE_COLUMNS,
            vec![
                record.date.to_string(),
                record.entry_time.format(TIME_FORMAT).to_string(),
                record.exit_time.format(TIME_FORMAT).to_string(),
                format!("{hours:.2}"),
            ],
            Font::Regular,
        );
    }

    page.reserve(ROW_HEIGHT);
    page.row(
        &[
            Cell::new("Totale Ore", 120.0, Align::Left),
            Cell::new(format!("{total_hours:.2}"), 40.0, Align::Right),
        ],
        Font::Bold,
        10.0,
    );

    page.finish()
}

/// Methods summed into the "Totale:" line of the settlement breakdown.
const COLLECTED_BREAKDOWN: [(&str, SettlementMethod); 4] = [
    ("Totale Contanti:", SettlementMethod::Cash),
    ("Totale Assegni:", SettlementMethod::Check),
    ("Totale Bonifico:", SettlementMethod::BankTransfer),
    ("Totale Negozio:", SettlementMethod::InStore),
];

/// Activity report for a date range: job table, totals and settlement breakdown.
pub fn render_jobs(from: NaiveDate, to: NaiveDate, report: &JobReport) -> AppResult<Vec<u8>> {
    let totals = &report.totals;
    let mut page = PageWriter::new();

    page.line(&format!("Attività | {from} - {to}"), Font::Bold, 16.0, Align::Center);
    page.gap(10.0);

    page.header(&JOB_COLUMNS);
    for job in &report.jobs {
        page.body_row(
            &JOB_COLUMNS,
            vec![
                job.project_code.clone(),
                job.date.to_string(),
                job.client.clone(),
                job.settlement.clone(),
                format_currency(job.contract),
                format_currency(job.settled),
                format_currency(job.delivery_extra),
            ],
            Font::Regular,
        );
    }

    page.reserve(ROW_HEIGHT);
    page.row(
        &[
            Cell::new("Totale", 105.0, Align::Right),
            Cell::new(format_currency(totals.total_contract), 25.0, Align::Right),
            Cell::new(format_currency(naive_settled_total(&report.jobs)), 25.0, Align::Right),
            Cell::new(format_currency(totals.total_extras), 25.0, Align::Right),
        ],
        Font::Bold,
        9.0,
    );

    page.gap(10.0);
    page.line("Riepilogo Totali", Font::Bold, 12.0, Align::Left);
    page.summary_row("Totale Contratto:", format_currency(totals.total_contract), Font::Regular);
    page.summary_row(
        &format!("Percentuale trasporto ({:.0}%):", TRANSPORT_RATE * 100.0),
        format_currency(totals.transport_share),
        Font::Regular,
    );
    page.summary_row("Extra su consegne:", format_currency(totals.total_extras), Font::Regular);
    page.summary_row("Totale Lordo:", format_currency(totals.gross_total), Font::Bold);

    page.gap(5.0);
    page.line("Dettaglio Saldi", Font::Bold, 12.0, Align::Left);
    for (label, method) in COLLECTED_BREAKDOWN {
        page.summary_row(label, format_currency(totals.subtotal(method)), Font::Regular);
    }
    page.summary_row("Totale:", format_currency(totals.collected_total()), Font::Bold);
    page.summary_row(
        "Totale Sospeso:",
        format_currency(totals.subtotal(SettlementMethod::Pending)),
        Font::Regular,
    );

    page.finish()
}

/// Writes a rendered document to `dir/file_name`, creating `dir` if needed.
pub fn write_document(dir: &Path, file_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;

    info!(path = %path.display(), bytes = bytes.len(), "Document saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::job::JobRecord;
    use chrono::NaiveTime;
    use strum::IntoEnumIterator;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn attendance(day: u32) -> Attendance {
        Attendance {
            id: day as i64,
            employee_id: 1,
            date: d(day),
            entry_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            exit_time: NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
            worked_minutes: 510,
        }
    }

    fn job(day: u32, client: &str, settlement: &str) -> JobRecord {
        JobRecord {
            id: day as i64,
            date: d(day),
            client: client.to_string(),
            contract: 1000.0,
            settled: 1000.0,
            project_code: "MOV".to_string(),
            settlement: settlement.to_string(),
            delivery_extra: 20.0,
        }
    }

    fn page_texts(bytes: &[u8]) -> Vec<Vec<u8>> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&id| doc.get_page_content(id).unwrap())
            .collect()
    }

    /// Every string drawn with `Tj`, in drawing order.
    fn shown_strings(bytes: &[u8]) -> Vec<Vec<u8>> {
        let doc = Document::load_mem(bytes).unwrap();
        let mut shown = Vec::new();
        for &id in doc.get_pages().values() {
            let content = Content::decode(&doc.get_page_content(id).unwrap()).unwrap();
            for op in content.operations {
                if op.operator != "Tj" {
                    continue;
                }
                if let Some(Object::String(text, _)) = op.operands.first() {
                    shown.push(text.clone());
                }
            }
        }
        shown
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn attendance_sheet_lists_rows_and_total() {
        let records: Vec<_> = (1..=3).map(attendance).collect();
        let bytes = render_attendance(Some("Carlo D'Elia"), 3, 2025, &records).unwrap();

        let pages = page_texts(&bytes);
        assert_eq!(pages.len(), 1);
        assert!(contains(&pages[0], b"Timbrature - 2025-03"));
        assert!(contains(&pages[0], b"Carlo D'Elia"));
        assert!(contains(&pages[0], b"2025-03-02"));
        assert!(contains(&pages[0], b"8.50"));
        assert!(contains(&pages[0], b"25.50"));
    }

    #[test]
    fn empty_attendance_sheet_says_no_data() {
        let bytes = render_attendance(Some("Carlo"), 3, 2025, &[]).unwrap();
        let pages = page_texts(&bytes);
        assert!(contains(&pages[0], b"Nessun dato"));
        assert!(!contains(&pages[0], b"Carlo"));
    }

    #[test]
    fn long_tables_break_pages_and_repeat_the_header() {
        let records: Vec<_> = (1..=31).chain(1..=31).map(attendance).collect();
        let bytes = render_attendance(Some("Carlo"), 3, 2025, &records).unwrap();

        let pages = page_texts(&bytes);
        assert!(pages.len() > 1);
        for page in &pages {
            assert!(contains(page, b"Ingresso"));
        }
    }

    #[test]
    fn job_report_prints_totals_and_breakdown() {
        let report = JobReport::new(vec![
            job(1, "Rossi", "Contanti"),
            job(2, "Bianchi", "Sospeso"),
        ]);
        let bytes = render_jobs(d(1), d(31), &report).unwrap();

        let pages = page_texts(&bytes);
        let all: Vec<u8> = pages.concat();
        assert!(contains(&all, b"Riepilogo Totali"));
        assert!(contains(&all, b"Dettaglio Saldi"));
        assert!(contains(&all, b"Percentuale trasporto"));
        // transport share of 2000 and naive settled total
        assert!(contains(&all, b"120.00"));
        assert!(contains(&all, b"2000.00"));
        assert!(contains(&all, b"Attivit"));
    }

    #[test]
    fn unrepresentable_client_names_do_not_break_rendering() {
        let report = JobReport::new(vec![job(1, "Famiglia 李 🏠", "Bonifico")]);
        let bytes = render_jobs(d(1), d(1), &report).unwrap();

        let all: Vec<u8> = page_texts(&bytes).concat();
        assert!(contains(&all, b"Famiglia"));
    }

    #[test]
    fn settlement_labels_and_large_amounts_print_in_full() {
        let mut jobs: Vec<JobRecord> = SettlementMethod::iter()
            .enumerate()
            .map(|(i, method)| job(i as u32 + 1, "Rossi", method.as_ref()))
            .collect();
        jobs[0].delivery_extra = 12345.0;
        jobs[1].contract = -1500.0;
        let report = JobReport::new(jobs);

        let shown = shown_strings(&render_jobs(d(1), d(31), &report).unwrap());

        for method in SettlementMethod::iter() {
            let label = encode_win_ansi(method.as_ref());
            assert!(shown.contains(&label), "{method} was not printed whole");
        }
        // one extra of 12345 plus five of 20; one contract of -1500
        for amount in ["12345.00 €", "12445.00 €", "-1500.00 €", "3500.00 €"] {
            assert!(shown.contains(&encode_win_ansi(amount)), "{amount} was not printed whole");
        }
    }

    #[test]
    fn long_client_names_are_cut_to_the_column() {
        let name = "Cooperativa Traslochi Riuniti del Mezzogiorno";
        let report = JobReport::new(vec![job(1, name, "Contanti")]);

        let shown = shown_strings(&render_jobs(d(1), d(1), &report).unwrap());

        assert!(!shown.contains(&encode_win_ansi(name)));
        assert!(shown.iter().any(|s| s.starts_with(b"Cooperativa Tras")));
    }

    #[test]
    fn shrink_keeps_every_glyph() {
        assert_eq!(shrink_to_fit("ok", 50.0, 10.0), ("ok".to_string(), 10.0));

        let (text, size) = shrink_to_fit("-1234567.00 €", 60.0, 9.0);
        assert_eq!(text, "-1234567.00 €");
        assert!(size < 9.0);
        assert!(text.chars().count() as f32 * size * COURIER_ADVANCE <= 60.001);
    }

    #[test]
    fn fit_truncates_to_column_width() {
        let text = fit("Un cliente con un nome molto lungo", 50.0, 10.0);
        assert_eq!(text.chars().count(), 8);
        assert_eq!(fit("ok", 50.0, 10.0), "ok");
    }

    #[test]
    fn write_document_is_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = render_attendance(None, 1, 2025, &[]).unwrap();

        let path = write_document(&dir.path().join("exports"), "timbrature.pdf", &bytes).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), bytes);
    }
}
