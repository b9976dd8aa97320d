//! Per-page conversion pipeline.
//!
//! Each page is classified, reconstructed and appended as one slide before
//! the next page is touched, so slides always come out in page order.

use crate::background::{border_thickness, BackgroundReconstructor};
use crate::classify::classify_page;
use crate::deck::{Deck, Slide};
use crate::error::{Error, Result};
use crate::layout::LayoutReconstructor;
use crate::scan::place_scanned_page;
use crate::source::{DocumentSource, PageSource};
use crate::types::{PageMode, PageReport};
use crate::units::{pts_to_emu, CoordinateMapper};

/// Recommended raster qualities.
pub const DPI_PRESETS: [u32; 6] = [72, 100, 150, 200, 250, 300];

/// Raster quality used when none is given.
pub const DEFAULT_DPI: u32 = 150;

/// Highest accepted raster quality.
pub const MAX_DPI: u32 = 1200;

/// Conversion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    dpi: u32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self { dpi: DEFAULT_DPI }
    }
}

impl ConvertOptions {
    /// Create options with the default 150 DPI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raster quality used for backgrounds and scanned pages.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Pixels per document point.
    pub fn scale(&self) -> f64 {
        f64::from(self.dpi) / 72.0
    }

    /// Thickness of the border strips sampled around each word.
    pub fn border_thickness(&self) -> i64 {
        border_thickness(self.scale())
    }

    /// Check the options are usable.
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 || self.dpi > MAX_DPI {
            return Err(Error::InvalidOptions(format!(
                "DPI must be between 1 and {}, got {}",
                MAX_DPI, self.dpi
            )));
        }
        Ok(())
    }
}

/// A finished conversion: the deck plus one report per page, in page order.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub deck: Deck,
    pub reports: Vec<PageReport>,
}

impl Conversion {
    /// Number of pages that kept a native text layer.
    pub fn native_pages(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.mode == PageMode::Native)
            .count()
    }

    /// Number of pages placed as flat images.
    pub fn scan_pages(&self) -> usize {
        self.reports.len() - self.native_pages()
    }
}

/// Drives the page loop over a document.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with the given options.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert every page of `document` into one slide.
    ///
    /// `on_page_done(index, total, mode)` is called after each page with its
    /// 0-based index. Any failure outside per-element placement aborts the
    /// whole conversion and no partial deck is returned.
    pub fn convert<D, F>(&self, document: &D, mut on_page_done: F) -> Result<Conversion>
    where
        D: DocumentSource,
        F: FnMut(usize, usize, PageMode),
    {
        self.options.validate()?;

        let total = document.page_count()?;
        if total == 0 {
            return Err(Error::EmptyDocument);
        }

        let first = document.page(0)?.size();
        let mut deck = Deck::new(pts_to_emu(first.width), pts_to_emu(first.height));
        let mut reports = Vec::with_capacity(total);

        log::info!(
            "Converting {} pages at {} DPI ({}x{} EMU slides)",
            total,
            self.options.dpi(),
            deck.width,
            deck.height
        );

        for index in 0..total {
            let page = document.page(index)?;
            let (slide, report) = self.convert_page(&page, index)?;
            deck.push_slide(slide);

            log::debug!(
                "Page {}/{}: {} ({} words)",
                report.page_number,
                total,
                report.mode,
                report.word_count
            );
            on_page_done(index, total, report.mode);
            reports.push(report);
        }

        Ok(Conversion { deck, reports })
    }

    /// Convert one page into a slide and its report.
    pub fn convert_page<P: PageSource>(&self, page: &P, index: usize) -> Result<(Slide, PageReport)> {
        let size = page.size();
        let mapper = CoordinateMapper::for_page_points(size.width, size.height);
        let mut slide = Slide::new();

        let mode = classify_page(page)?;
        let word_count = match mode {
            PageMode::Native => {
                // background first so it sits under the text layer
                BackgroundReconstructor::new(self.options.scale()).reconstruct(page, &mapper, &mut slide)?;
                LayoutReconstructor::new(mapper).reconstruct(page, &mut slide)?
            }
            PageMode::Scan => {
                place_scanned_page(page, self.options.scale(), &mapper, &mut slide)?;
                0
            }
        };

        Ok((slide, PageReport::new(index + 1, mode, word_count)))
    }
}
