#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const PAGE_HEIGHT: i64 = 842;
const FONT_SIZE: i64 = 10;
/// Glyphs at size 10 span 8pt above the baseline.
const GLYPH_ASCENT: i64 = 8;

pub const COLUMNS: [i64; 4] = [50, 250, 350, 450];
pub const ROW_HEIGHT: i64 = 20;

/// Text placed with its glyph tops at `top` (page space, y down).
#[derive(Debug, Clone, Copy)]
pub struct TextRun<'a> {
    pub x: i64,
    pub top: i64,
    pub text: &'a str,
}

/// A ruled grid over [`COLUMNS`] starting at `top` with `rows` rows.
#[derive(Debug, Clone, Copy)]
pub struct Grid {
    pub top: i64,
    pub rows: i64,
}

#[derive(Debug, Clone, Default)]
pub struct FixturePage<'a> {
    pub texts: Vec<TextRun<'a>>,
    pub grids: Vec<Grid>,
}

pub fn text(x: i64, top: i64, text: &str) -> TextRun<'_> {
    TextRun { x, top, text }
}

/// Cell text of table row `row` (0-based) in a grid starting at `grid_top`.
pub fn cell(grid_top: i64, row: i64, x: i64, value: &str) -> TextRun<'_> {
    text(x, grid_top + row * ROW_HEIGHT + 4, value)
}

/// A titled location table: header row, region, province, municipality,
/// barangay, a continuation row and one empty row.
pub fn location_report_page() -> FixturePage<'static> {
    let top = 100;
    FixturePage {
        texts: vec![
            text(50, 80, "AFFECTED POPULATION"),
            cell(top, 0, 60, "REGION PROVINCE CITY"),
            cell(top, 1, 141, "NCR"),
            cell(top, 1, 260, "10"),
            cell(top, 1, 360, "0"),
            cell(top, 2, 52, "METRO MANILA"),
            cell(top, 2, 260, "5"),
            cell(top, 2, 360, "1"),
            cell(top, 3, 117, "Quezon City"),
            cell(top, 3, 260, "7"),
            cell(top, 3, 360, "2"),
            cell(top, 4, 188, "Barangay A"),
            cell(top, 4, 260, "4"),
            cell(top, 4, 360, "0"),
            cell(top, 5, 260, "3"),
        ],
        grids: vec![Grid { top, rows: 7 }],
    }
}

/// The location table set in Helvetica, with each first-cell value placed by its
/// standard Helvetica advance widths (NCR and Quezon City centred, METRO MANILA
/// flush left, Barangay A flush right).
pub fn helvetica_location_page() -> FixturePage<'static> {
    let top = 100;
    FixturePage {
        texts: vec![
            text(50, 80, "AFFECTED POPULATION"),
            cell(top, 0, 139, "NCR"),
            cell(top, 0, 260, "10"),
            cell(top, 1, 52, "METRO MANILA"),
            cell(top, 1, 260, "5"),
            cell(top, 2, 122, "Quezon City"),
            cell(top, 2, 260, "7"),
            cell(top, 3, 196, "Barangay A"),
            cell(top, 3, 260, "4"),
        ],
        grids: vec![Grid { top, rows: 4 }],
    }
}

fn grid_operations(grid: &Grid) -> Vec<Operation> {
    let bottom = grid.top + grid.rows * ROW_HEIGHT;
    let mut operations = vec![Operation::new("w", vec![Object::Real(0.5)])];

    let mut segment = |(x0, y0): (i64, i64), (x1, y1): (i64, i64)| {
        operations.push(Operation::new(
            "m",
            vec![Object::Integer(x0), Object::Integer(PAGE_HEIGHT - y0)],
        ));
        operations.push(Operation::new(
            "l",
            vec![Object::Integer(x1), Object::Integer(PAGE_HEIGHT - y1)],
        ));
        operations.push(Operation::new("S", vec![]));
    };

    for x in COLUMNS {
        segment((x, grid.top), (x, bottom));
    }
    for row in 0..=grid.rows {
        let y = grid.top + row * ROW_HEIGHT;
        segment((COLUMNS[0], y), (COLUMNS[3], y));
    }
    operations
}

fn text_operations(run: &TextRun<'_>) -> Vec<Operation> {
    let baseline = PAGE_HEIGHT - run.top - GLYPH_ASCENT;
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), Object::Integer(FONT_SIZE)]),
        Operation::new(
            "Tm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                Object::Integer(run.x),
                Object::Integer(baseline),
            ],
        ),
        Operation::new("Tj", vec![Object::string_literal(run.text)]),
        Operation::new("ET", vec![]),
    ]
}

pub fn create_table_pdf(
    path: &Path,
    pages: &[FixturePage<'_>],
) -> Result<(), Box<dyn std::error::Error>> {
    create_table_pdf_in_font(path, pages, "Courier")
}

/// Builds the PDF with a standard Type1 font that carries no `Widths` array.
pub fn create_table_pdf_in_font(
    path: &Path,
    pages: &[FixturePage<'_>],
    base_font: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        for grid in &page.grids {
            operations.extend(grid_operations(grid));
        }
        for run in &page.texts {
            operations.extend(text_operations(run));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), Object::Integer(PAGE_HEIGHT)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path)?;
    Ok(())
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
        escape_xml(sheet_name)
    )
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + u8::try_from(index % 26).unwrap_or(0));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// Cells that parse as numbers are stored as numeric cells, everything else as inline strings.
fn sheet_xml(rows: &[Vec<String>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (row_index, row) in rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, row_index + 1));
        for (column_index, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let reference = format!("{}{}", column_name(column_index), row_index + 1);
            if value.parse::<f64>().is_ok() {
                xml.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#));
            } else {
                xml.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    escape_xml(value)
                ));
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

pub fn create_test_xlsx(
    path: &Path,
    sheet_name: &str,
    rows: &[Vec<String>],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook_xml(sheet_name)),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(rows)),
    ];
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

pub fn rows(block: &[&[&str]]) -> Vec<Vec<String>> {
    block
        .iter()
        .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
        .collect()
}

/// A header block spelling out every mapped label, one tier per `_` segment.
pub fn full_archive_header(labels: &[&str]) -> Vec<Vec<String>> {
    let mut tiers = vec![vec![String::new(); labels.len()]; 4];
    for (column, label) in labels.iter().enumerate() {
        for (depth, tier) in label.split('_').enumerate() {
            tiers[depth][column] = tier.to_string();
        }
    }
    tiers
}
