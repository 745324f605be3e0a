use std::path::Path;

use pdf_extract::{
    ColorSpace, Document, MediaBox, OutputDev, OutputError, PathOp, Transform, output_doc_page,
};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::model::{BBox, Edge, Glyph, PageLayout};
use crate::options::PageSelection;

/// Glyph box in text space, as fractions of the font size.
const GLYPH_DESCENT: f64 = -0.2;
const GLYPH_ASCENT: f64 = 0.8;
const AXIS_EPSILON: f64 = 0.01;

type Point = (f64, f64);

fn transform_point(transform: &Transform, (x, y): Point) -> Point {
    (
        transform.m11 * x + transform.m21 * y + transform.m31,
        transform.m12 * x + transform.m22 * y + transform.m32,
    )
}

/// Maps PDF user space (y up) onto the page's top-down space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageFrame {
    llx: f64,
    lly: f64,
    urx: f64,
    ury: f64,
}

impl PageFrame {
    fn from_media_box(media_box: &MediaBox) -> Self {
        Self {
            llx: media_box.llx.min(media_box.urx),
            lly: media_box.lly.min(media_box.ury),
            urx: media_box.llx.max(media_box.urx),
            ury: media_box.lly.max(media_box.ury),
        }
    }

    fn to_page(&self, (x, y): Point) -> Point {
        (x - self.llx, self.ury - y)
    }

    fn bounding_box(&self, corners: &[Point]) -> Option<BBox> {
        corners
            .iter()
            .map(|corner| {
                let (x, y) = self.to_page(*corner);
                BBox::new(x, y, x, y)
            })
            .reduce(|acc, point| acc.union(&point))
    }

    fn edge(&self, from: Point, to: Point) -> Option<Edge> {
        let (x0, y0) = self.to_page(from);
        let (x1, y1) = self.to_page(to);
        if (y0 - y1).abs() < AXIS_EPSILON {
            Some(Edge::horizontal(x0, x1, y0))
        } else if (x0 - x1).abs() < AXIS_EPSILON {
            Some(Edge::vertical(x0, y0, y1))
        } else {
            None
        }
    }
}

/// Straight segments of a path in user space. Curves only move the current point.
fn path_segments(path: &pdf_extract::Path, ctm: &Transform) -> Vec<(Point, Point)> {
    let mut segments = Vec::new();
    let mut subpath_start = None;
    let mut current = None;

    for op in &path.ops {
        match *op {
            PathOp::MoveTo(x, y) => {
                let point = transform_point(ctm, (x, y));
                subpath_start = Some(point);
                current = Some(point);
            }
            PathOp::LineTo(x, y) => {
                let point = transform_point(ctm, (x, y));
                if let Some(from) = current {
                    segments.push((from, point));
                }
                current = Some(point);
            }
            PathOp::CurveTo(_, _, _, _, x, y) => {
                current = Some(transform_point(ctm, (x, y)));
            }
            PathOp::Rect(x, y, width, height) => {
                let corners = [(x, y), (x + width, y), (x + width, y + height), (x, y + height)]
                    .map(|corner| transform_point(ctm, corner));
                for (index, from) in corners.iter().enumerate() {
                    segments.push((*from, corners[(index + 1) % corners.len()]));
                }
                subpath_start = Some(corners[0]);
                current = Some(corners[0]);
            }
            PathOp::Close => {
                if let (Some(start), Some(from)) = (subpath_start, current) {
                    segments.push((from, start));
                    current = Some(start);
                }
            }
        }
    }
    segments
}

/// Collects positioned glyphs and ruling edges for each page pdf-extract walks.
#[derive(Debug, Default)]
struct LayoutCollector {
    current: Option<(PageFrame, PageLayout)>,
    pages: Vec<PageLayout>,
}

impl LayoutCollector {
    fn push_glyphs(&mut self, text: &str, bbox: BBox) {
        let Some((_, page)) = self.current.as_mut() else {
            return;
        };
        let chars = text.chars().filter(|ch| !ch.is_control()).collect::<Vec<_>>();
        if let [ch] = chars.as_slice() {
            page.glyphs.push(Glyph { ch: *ch, bbox });
            return;
        }

        // Ligatures decode to several characters sharing one glyph box.
        #[allow(clippy::cast_precision_loss)]
        let step = bbox.width() / chars.len().max(1) as f64;
        for (index, ch) in chars.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let x0 = bbox.x0 + step * index as f64;
            page.glyphs.push(Glyph {
                ch,
                bbox: BBox::new(x0, bbox.top, x0 + step, bbox.bottom),
            });
        }
    }

    fn push_path(&mut self, ctm: &Transform, path: &pdf_extract::Path) {
        let Some((frame, page)) = self.current.as_mut() else {
            return;
        };
        page.edges.extend(
            path_segments(path, ctm)
                .into_iter()
                .filter_map(|(from, to)| frame.edge(from, to)),
        );
    }
}

impl OutputDev for LayoutCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        let frame = PageFrame::from_media_box(media_box);
        let page = PageLayout {
            page_number: page_num,
            width: frame.urx - frame.llx,
            height: frame.ury - frame.lly,
            glyphs: Vec::new(),
            edges: Vec::new(),
        };
        self.current = Some((frame, page));
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        if let Some((_, page)) = self.current.take() {
            debug!(
                page = page.page_number,
                glyphs = page.glyphs.len(),
                edges = page.edges.len(),
                "parsed page layout"
            );
            self.pages.push(page);
        }
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        text: &str,
    ) -> Result<(), OutputError> {
        let Some((frame, _)) = self.current.as_ref() else {
            return Ok(());
        };
        let advance = width * font_size;
        let corners = [
            (0.0, GLYPH_DESCENT * font_size),
            (advance, GLYPH_DESCENT * font_size),
            (advance, GLYPH_ASCENT * font_size),
            (0.0, GLYPH_ASCENT * font_size),
        ]
        .map(|corner| transform_point(trm, corner));
        let bbox = frame.bounding_box(&corners);
        if let Some(bbox) = bbox {
            self.push_glyphs(text, bbox);
        }
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn stroke(
        &mut self,
        ctm: &Transform,
        _colorspace: &ColorSpace,
        _color: &[f64],
        path: &pdf_extract::Path,
    ) -> Result<(), OutputError> {
        self.push_path(ctm, path);
        Ok(())
    }

    fn fill(
        &mut self,
        ctm: &Transform,
        _colorspace: &ColorSpace,
        _color: &[f64],
        path: &pdf_extract::Path,
    ) -> Result<(), OutputError> {
        self.push_path(ctm, path);
        Ok(())
    }
}

fn layouts_from_document(
    document: &Document,
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageLayout>, ExtractError> {
    let mut collector = LayoutCollector::default();
    for page_no in document.get_pages().into_keys() {
        if let Some(selection) = page_selection
            && !selection.contains(page_no)
        {
            continue;
        }
        if let Err(error) = output_doc_page(document, &mut collector, page_no) {
            warn!(page = page_no, %error, "page content could not be interpreted");
            let partial = collector.current.take().map(|(_, page)| page);
            collector.pages.push(partial.unwrap_or_else(|| PageLayout {
                page_number: page_no,
                ..PageLayout::default()
            }));
        }
    }

    if collector.pages.is_empty() {
        return Err(ExtractError::NoPagesSelected);
    }

    Ok(collector.pages)
}

pub(crate) fn read_pdf_layouts(
    input_pdf: &Path,
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageLayout>, ExtractError> {
    let document = Document::load(input_pdf)?;
    layouts_from_document(&document, page_selection)
}

pub(crate) fn read_pdf_layouts_from_bytes(
    input_pdf: &[u8],
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageLayout>, ExtractError> {
    let document = Document::load_mem(input_pdf)?;
    layouts_from_document(&document, page_selection)
}
