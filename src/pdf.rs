use std::io::BufWriter;

use printpdf::*;

use crate::chart::{self, Page, Rgb as ChartRgb, Shape};
use crate::error::{PlanError, Result};

fn color(c: ChartRgb) -> Color {
    let (r, g, b) = c.unit();
    Color::Rgb(Rgb::new(r, g, b, None))
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    first_page: Option<(PdfPageIndex, PdfLayerIndex)>,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(chart::PAGE_W),
            Mm(chart::PAGE_H),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PlanError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PlanError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            first_page: Some((page, layer)),
        })
    }

    /// The document is created with one blank page; use it for the first
    /// chart and append the rest.
    fn next_layer(&mut self, name: &str) -> PdfLayerReference {
        let (page, layer) = match self.first_page.take() {
            Some(first) => first,
            None => self
                .doc
                .add_page(Mm(chart::PAGE_W), Mm(chart::PAGE_H), name),
        };
        self.doc.get_page(page).get_layer(layer)
    }

    fn draw(&mut self, page: &Page) {
        let layer = self.next_layer(&page.title);
        for shape in &page.shapes {
            self.draw_shape(&layer, shape);
        }
    }

    fn draw_shape(&self, layer: &PdfLayerReference, shape: &Shape) {
        // Shapes use a top-left origin; PDF space starts bottom-left.
        let flip = |y: f32| chart::PAGE_H - y;
        match shape {
            Shape::Rect {
                x,
                y,
                w,
                h,
                fill,
                stroke,
            } => {
                layer.set_fill_color(color(*fill));
                let mode = match stroke {
                    Some(s) => {
                        layer.set_outline_color(color(*s));
                        layer.set_outline_thickness(0.3);
                        path::PaintMode::FillStroke
                    }
                    None => path::PaintMode::Fill,
                };
                let rect = Rect::new(Mm(*x), Mm(flip(y + h)), Mm(x + w), Mm(flip(*y))).with_mode(mode);
                layer.add_rect(rect);
            }
            Shape::Line {
                x1,
                y1,
                x2,
                y2,
                color: c,
                width,
                dashed,
            } => {
                layer.set_outline_color(color(*c));
                layer.set_outline_thickness(*width);
                if *dashed {
                    layer.set_line_dash_pattern(LineDashPattern {
                        dash_1: Some(3),
                        gap_1: Some(2),
                        ..Default::default()
                    });
                }
                let line = Line {
                    points: vec![
                        (Point::new(Mm(*x1), Mm(flip(*y1))), false),
                        (Point::new(Mm(*x2), Mm(flip(*y2))), false),
                    ],
                    is_closed: false,
                };
                layer.add_line(line);
                if *dashed {
                    layer.set_line_dash_pattern(LineDashPattern::default());
                }
            }
            Shape::Text {
                x,
                y,
                text,
                size,
                color: c,
                bold,
            } => {
                let font = if *bold { &self.font_bold } else { &self.font };
                layer.set_fill_color(color(*c));
                layer.use_text(text.as_str(), *size, Mm(*x), Mm(flip(*y)), font);
            }
        }
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| PlanError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| PlanError::Pdf(e.to_string()))
    }
}

/// Render each page as one PDF page. `printpdf` stamps the creation date.
pub fn render_pages(title: &str, pages: &[Page]) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(title)?;
    for page in pages {
        pdf.draw(page);
    }
    pdf.to_bytes()
}
