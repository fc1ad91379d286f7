use printpdf::*;
use std::io::{BufWriter, Cursor};
use thiserror::Error;

use crate::font_metrics;
use crate::geometry::{LayoutBox, PageGeometry, PT_TO_MM};
use crate::text::TextBlock;

/// Resolution images are kept at once they are placed
const RASTER_DPI: f32 = 150.0;

#[derive(Debug, Error, PartialEq)]
pub enum SinkError {
    #[error("drawing requested before any page was started")]
    NoPage,

    #[error("document has no pages")]
    EmptyDocument,

    #[error("PDF rendering failed: {0}")]
    Render(String),
}

/// Receives placement instructions from the assembler, strictly in order.
/// Drawing always targets the most recently started page.
pub trait PageSink: Send {
    type Output;

    fn start_page(&mut self) -> Result<(), SinkError>;

    fn draw_text(&mut self, bbox: &LayoutBox, block: &TextBlock) -> Result<(), SinkError>;

    fn draw_image(&mut self, bbox: &LayoutBox, image: &::image::DynamicImage) -> Result<(), SinkError>;

    fn page_count(&self) -> usize;

    /// Seal the document. Called exactly once.
    fn finish(self) -> Result<Self::Output, SinkError>;
}

// ============================================================================
// PAGE MODEL
// ============================================================================

#[derive(Debug, Clone)]
struct RasterImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

#[derive(Debug, Clone)]
enum PageItem {
    Text { bbox: LayoutBox, block: TextBlock },
    Image { bbox: LayoutBox, raster: RasterImage },
}

#[derive(Debug, Clone, Default)]
struct PageContent {
    items: Vec<PageItem>,
}

/// Collects pages in memory and renders them to PDF bytes on `finish`.
///
/// printpdf's document handle is not `Send`, so it only exists inside
/// `finish`, after every fetch has completed.
pub struct PdfPageWriter {
    title: String,
    geometry: PageGeometry,
    pages: Vec<PageContent>,
}

impl PdfPageWriter {
    pub fn new(title: impl Into<String>, geometry: PageGeometry) -> Self {
        Self {
            title: title.into(),
            geometry,
            pages: Vec::new(),
        }
    }

    fn current(&mut self) -> Result<&mut PageContent, SinkError> {
        self.pages.last_mut().ok_or(SinkError::NoPage)
    }
}

impl PageSink for PdfPageWriter {
    type Output = Vec<u8>;

    fn start_page(&mut self) -> Result<(), SinkError> {
        self.pages.push(PageContent::default());
        Ok(())
    }

    fn draw_text(&mut self, bbox: &LayoutBox, block: &TextBlock) -> Result<(), SinkError> {
        self.current()?.items.push(PageItem::Text {
            bbox: *bbox,
            block: block.clone(),
        });
        Ok(())
    }

    fn draw_image(&mut self, bbox: &LayoutBox, image: &::image::DynamicImage) -> Result<(), SinkError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(());
        }
        // pages are held until finish, so keep only what the cell can show
        let target = fit_contain(image.width() as f32, image.height() as f32, bbox);
        let (max_w, max_h) = raster_bounds(&target);
        let rgb = if image.width() > max_w || image.height() > max_h {
            image.thumbnail(max_w, max_h).to_rgb8()
        } else {
            image.to_rgb8()
        };
        let raster = RasterImage {
            width: rgb.width(),
            height: rgb.height(),
            rgb: rgb.into_raw(),
        };
        self.current()?.items.push(PageItem::Image { bbox: *bbox, raster });
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn finish(self) -> Result<Vec<u8>, SinkError> {
        let PdfPageWriter {
            title,
            geometry,
            pages,
        } = self;
        if pages.is_empty() {
            return Err(SinkError::EmptyDocument);
        }

        let width = Mm(geometry.page_width * PT_TO_MM);
        let height = Mm(geometry.page_height * PT_TO_MM);
        let (doc, page1, layer1) = PdfDocument::new(title, width, height, "Layer 1");

        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(render_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(render_error)?,
        };

        for (i, page) in pages.iter().enumerate() {
            let layer = if i == 0 {
                doc.get_page(page1).get_layer(layer1)
            } else {
                let (new_page, new_layer) = doc.add_page(width, height, "Layer 1");
                doc.get_page(new_page).get_layer(new_layer)
            };
            draw_page(page, &layer, &fonts, &geometry);
        }

        let mut buf = Vec::new();
        {
            let mut writer = BufWriter::new(Cursor::new(&mut buf));
            doc.save(&mut writer).map_err(render_error)?;
        }
        Ok(buf)
    }
}

fn render_error<E: std::fmt::Debug>(e: E) -> SinkError {
    SinkError::Render(format!("{e:?}"))
}

// ============================================================================
// DRAWING
// ============================================================================

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn draw_page(page: &PageContent, layer: &PdfLayerReference, fonts: &Fonts, geometry: &PageGeometry) {
    for item in &page.items {
        match item {
            PageItem::Text { bbox, block } => draw_text(bbox, block, layer, fonts, geometry),
            PageItem::Image { bbox, raster } => draw_image(bbox, raster, layer, geometry),
        }
    }
}

fn draw_text(bbox: &LayoutBox, block: &TextBlock, layer: &PdfLayerReference, fonts: &Fonts, geometry: &PageGeometry) {
    layer.set_fill_color(printpdf::Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    let mut top = bbox.y;
    for line in &block.lines {
        // clip lines of oversized blocks at the box edge
        if top + line.height() > bbox.bottom() + 0.01 {
            break;
        }
        let font = if line.bold { &fonts.bold } else { &fonts.regular };
        let baseline = top + font_metrics::get_metrics(line.bold).ascent(line.size);
        let pdf_y = geometry.page_height - baseline;

        layer.use_text(
            line.text.clone(),
            line.size,
            Mm(bbox.x * PT_TO_MM),
            Mm(pdf_y * PT_TO_MM),
            font,
        );
        top += line.height();
    }
}

fn draw_image(bbox: &LayoutBox, raster: &RasterImage, layer: &PdfLayerReference, geometry: &PageGeometry) {
    if raster.width == 0 || raster.height == 0 {
        return;
    }

    let image = printpdf::Image::from(printpdf::ImageXObject {
        width: Px(raster.width as usize),
        height: Px(raster.height as usize),
        color_space: printpdf::ColorSpace::Rgb,
        bits_per_component: printpdf::ColorBits::Bit8,
        interpolate: true,
        image_data: raster.rgb.clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    let target = fit_contain(raster.width as f32, raster.height as f32, bbox);
    // printpdf places images by their bottom-left corner
    let pdf_y = geometry.page_height - target.bottom();

    // 72 DPI makes 1px == 1pt before scaling
    image.add_to_layer(
        layer.clone(),
        printpdf::ImageTransform {
            translate_x: Some(Mm(target.x * PT_TO_MM)),
            translate_y: Some(Mm(pdf_y * PT_TO_MM)),
            scale_x: Some(target.width / raster.width as f32),
            scale_y: Some(target.height / raster.height as f32),
            dpi: Some(72.0),
            ..Default::default()
        },
    );
}

/// Pixel size of `target` at `RASTER_DPI`.
fn raster_bounds(target: &LayoutBox) -> (u32, u32) {
    let px = |pt: f32| ((pt * RASTER_DPI / 72.0).ceil() as u32).max(1);
    (px(target.width), px(target.height))
}

/// Largest box with the image's aspect ratio that fits in `cell`, centred.
pub fn fit_contain(img_w: f32, img_h: f32, cell: &LayoutBox) -> LayoutBox {
    let img_aspect = img_w / img_h;
    let cell_aspect = cell.width / cell.height;

    let (w, h) = if img_aspect > cell_aspect {
        (cell.width, cell.width / img_aspect)
    } else {
        (cell.height * img_aspect, cell.height)
    };

    LayoutBox::new(
        cell.x + (cell.width - w) / 2.0,
        cell.y + (cell.height - h) / 2.0,
        w,
        h,
    )
}

// ============================================================================
// RECORDING SINK
// ============================================================================
