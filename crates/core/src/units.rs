//! Conversion from document points to presentation length units (EMU),
//! with clipping to the page.

use crate::types::BBox;

/// Presentation length unit. 914,400 per inch.
pub type Emu = i64;

pub const EMU_PER_INCH: Emu = 914_400;
pub const POINTS_PER_INCH: Emu = 72;
/// 12,700 EMU per point.
pub const EMU_PER_POINT: Emu = EMU_PER_INCH / POINTS_PER_INCH;

/// Position and size of a placed shape, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub left: Emu,
    pub top: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Frame {
    pub fn new(left: Emu, top: Emu, width: Emu, height: Emu) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> Emu {
        self.left + self.width
    }

    pub fn bottom(&self) -> Emu {
        self.top + self.height
    }
}

/// Convert a length in points to EMU, truncating toward zero.
pub fn pts_to_emu(points: f64) -> Emu {
    (points * EMU_PER_POINT as f64) as Emu
}

/// Maps document-space boxes onto one output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMapper {
    page_width: Emu,
    page_height: Emu,
}

impl CoordinateMapper {
    /// Create a mapper for a page of the given size in EMU.
    pub fn new(page_width: Emu, page_height: Emu) -> Self {
        Self {
            page_width,
            page_height,
        }
    }

    /// Create a mapper for a page of the given size in points.
    pub fn for_page_points(width: f64, height: f64) -> Self {
        Self::new(pts_to_emu(width), pts_to_emu(height))
    }

    pub fn page_width(&self) -> Emu {
        self.page_width
    }

    pub fn page_height(&self) -> Emu {
        self.page_height
    }

    /// Frame covering the whole page.
    pub fn full_page(&self) -> Frame {
        Frame::new(0, 0, self.page_width.max(1), self.page_height.max(1))
    }

    /// Project a box in points to a frame clipped to the page.
    ///
    /// Left/top are clamped to `[0, page - 1]`, width/height never exceed
    /// the room left on the page and are floored at 1 EMU.
    pub fn project(&self, bbox: &BBox) -> Frame {
        let (left, width) = clip_axis(pts_to_emu(bbox.x0), pts_to_emu(bbox.width()), self.page_width);
        let (top, height) = clip_axis(pts_to_emu(bbox.y0), pts_to_emu(bbox.height()), self.page_height);
        Frame::new(left, top, width, height)
    }
}

fn clip_axis(start: Emu, extent: Emu, page: Emu) -> (Emu, Emu) {
    let start = start.max(0).min((page - 1).max(0));
    let extent = extent.min(page - start).max(1);
    (start, extent)
}
