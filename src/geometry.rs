use thiserror::Error;

/// A4 in points
pub const A4_WIDTH_PT: f32 = 595.0;
pub const A4_HEIGHT_PT: f32 = 842.0;

/// Points to millimetres, for printpdf coordinates
pub const PT_TO_MM: f32 = 0.352_777_78;

const DEFAULT_MARGIN: f32 = 36.0;
const DEFAULT_SPACING: f32 = 12.0;
const DEFAULT_CELL_HEIGHT: f32 = 230.0;

// ============================================================================
// LAYOUT BOX
// ============================================================================

/// A rectangle in page coordinates: origin top-left, y grows downward, points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("margins leave no printable area ({width}x{height}pt page, {margin}pt margin)")]
    NoPrintableArea { width: f32, height: f32, margin: f32 },

    #[error("grid cell height {cell_height}pt exceeds printable height {printable}pt")]
    CellTooTall { cell_height: f32, printable: f32 },

    #[error("spacing must be non-negative, got {0}")]
    NegativeSpacing(f32),

    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f32 },

    #[error("grid cell height must be positive, got {0}")]
    EmptyCell(f32),
}

/// Fixed physical page layout. Two image columns always fit in the printable width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub spacing: f32,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl PageGeometry {
    pub fn new(
        page_width: f32,
        page_height: f32,
        margin: f32,
        spacing: f32,
        cell_height: f32,
    ) -> Result<Self, GeometryError> {
        for (name, value) in [
            ("page width", page_width),
            ("page height", page_height),
            ("margin", margin),
            ("spacing", spacing),
            ("cell height", cell_height),
        ] {
            if !value.is_finite() {
                return Err(GeometryError::NotFinite { name, value });
            }
        }
        if spacing < 0.0 {
            return Err(GeometryError::NegativeSpacing(spacing));
        }
        let printable_width = page_width - 2.0 * margin;
        let printable_height = page_height - 2.0 * margin;
        if margin < 0.0 || printable_width - spacing <= 0.0 || printable_height <= 0.0 {
            return Err(GeometryError::NoPrintableArea {
                width: page_width,
                height: page_height,
                margin,
            });
        }
        if cell_height <= 0.0 {
            return Err(GeometryError::EmptyCell(cell_height));
        }
        if cell_height > printable_height {
            return Err(GeometryError::CellTooTall {
                cell_height,
                printable: printable_height,
            });
        }

        Ok(Self {
            page_width,
            page_height,
            margin,
            spacing,
            cell_width: (printable_width - spacing) / 2.0,
            cell_height,
        })
    }

    pub fn a4() -> Self {
        Self {
            page_width: A4_WIDTH_PT,
            page_height: A4_HEIGHT_PT,
            margin: DEFAULT_MARGIN,
            spacing: DEFAULT_SPACING,
            cell_width: (A4_WIDTH_PT - 2.0 * DEFAULT_MARGIN - DEFAULT_SPACING) / 2.0,
            cell_height: DEFAULT_CELL_HEIGHT,
        }
    }

    pub fn printable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn printable_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    /// Lowest y any content may reach
    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Left edge of a grid column (0 or 1)
    pub fn column_x(&self, column: usize) -> f32 {
        self.margin + column as f32 * (self.cell_width + self.spacing)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}
