// src/metrics.rs

//! Cell size arithmetic over a [`WindowSize`].
//!
//! The kernel reports the text area in pixels alongside the row and column
//! count. Dividing one by the other gives the size of a single cell. Many
//! terminals leave the pixel fields at 0, in which case no size can be derived
//! and callers fall back to a configured cell.

use crate::config::FallbackConfig;
use crate::os::winsize::{query, WindowSize};

use anyhow::{Context, Result};
use log::warn;
use std::fmt;
use std::os::unix::io::RawFd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMetricsError {
    /// The terminal reports 0 rows.
    ZeroRows,
    /// The terminal reports 0 columns.
    ZeroCols,
    /// The pixel extent is 0 or smaller than the cell count.
    PixelSizeUnavailable,
}

impl fmt::Display for CellMetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellMetricsError::ZeroRows => write!(f, "terminal reports zero rows"),
            CellMetricsError::ZeroCols => write!(f, "terminal reports zero columns"),
            CellMetricsError::PixelSizeUnavailable => {
                write!(f, "terminal does not report its size in pixels")
            }
        }
    }
}

impl std::error::Error for CellMetricsError {}

fn cell_extent(pixels: u16, cells: u16, zero: CellMetricsError) -> Result<u16, CellMetricsError> {
    if cells == 0 {
        return Err(zero);
    }
    match pixels / cells {
        0 => Err(CellMetricsError::PixelSizeUnavailable),
        extent => Ok(extent),
    }
}

/// Pixel height of one cell: `height_px / rows`, truncated.
pub fn cell_height(size: &WindowSize) -> Result<u16, CellMetricsError> {
    cell_extent(size.height_px, size.rows, CellMetricsError::ZeroRows)
}

/// Pixel width of one cell: `width_px / cols`, truncated.
pub fn cell_width(size: &WindowSize) -> Result<u16, CellMetricsError> {
    cell_extent(size.width_px, size.cols, CellMetricsError::ZeroCols)
}

/// Font cell height of the terminal behind `fd`.
pub fn font_height(fd: RawFd) -> Result<u16> {
    let size = query(fd)?;
    let height = cell_height(&size)
        .with_context(|| format!("cannot derive cell height from {:?}", size))?;
    Ok(height)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMetrics {
    pub width_px: u16,
    pub height_px: u16,
}

impl CellMetrics {
    pub fn from_window_size(size: &WindowSize) -> Result<Self, CellMetricsError> {
        Ok(CellMetrics {
            width_px: cell_width(size)?,
            height_px: cell_height(size)?,
        })
    }

    /// Rows needed to hold `px` pixels vertically.
    pub fn rows_for_height(&self, px: u32) -> u32 {
        cells_spanned(px, self.height_px)
    }

    /// Columns needed to hold `px` pixels horizontally.
    pub fn cols_for_width(&self, px: u32) -> u32 {
        cells_spanned(px, self.width_px)
    }
}

impl From<FallbackConfig> for CellMetrics {
    fn from(fallback: FallbackConfig) -> Self {
        CellMetrics {
            width_px: fallback.cell_width_px,
            height_px: fallback.cell_height_px,
        }
    }
}

fn cells_spanned(px: u32, cell_px: u16) -> u32 {
    px.div_ceil(u32::from(cell_px.max(1)))
}

/// Cell metrics together with which axes came from the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub metrics: CellMetrics,
    pub width_fallback: bool,
    pub height_fallback: bool,
}

impl Resolved {
    pub fn used_fallback(&self) -> bool {
        self.width_fallback || self.height_fallback
    }
}

/// Derives cell metrics from `size`, substituting `fallback` per axis.
pub fn resolve(size: &WindowSize, fallback: &FallbackConfig) -> Resolved {
    let (width_px, width_fallback) = match cell_width(size) {
        Ok(w) => (w, false),
        Err(e) => {
            warn!(
                "{}; using fallback cell width of {}px",
                e, fallback.cell_width_px
            );
            (fallback.cell_width_px, true)
        }
    };
    let (height_px, height_fallback) = match cell_height(size) {
        Ok(h) => (h, false),
        Err(e) => {
            warn!(
                "{}; using fallback cell height of {}px",
                e, fallback.cell_height_px
            );
            (fallback.cell_height_px, true)
        }
    };

    Resolved {
        metrics: CellMetrics {
            width_px,
            height_px,
        },
        width_fallback,
        height_fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::pty::openpty;
    use std::os::unix::io::AsRawFd;
    use test_log::test;

    fn size(rows: u16, cols: u16, width_px: u16, height_px: u16) -> WindowSize {
        WindowSize {
            rows,
            cols,
            width_px,
            height_px,
        }
    }

    #[test]
    fn height_is_pixel_height_over_rows() {
        assert_eq!(cell_height(&size(24, 80, 640, 384)), Ok(16));
        assert_eq!(cell_width(&size(24, 80, 640, 384)), Ok(8));
    }

    #[test]
    fn division_truncates() {
        // 1000 / 24 = 41.67
        assert_eq!(cell_height(&size(24, 80, 0, 1000)), Ok(41));
    }

    #[test]
    fn zero_rows_does_not_divide() {
        assert_eq!(
            cell_height(&size(0, 80, 640, 384)),
            Err(CellMetricsError::ZeroRows)
        );
        assert_eq!(
            cell_width(&size(24, 0, 640, 384)),
            Err(CellMetricsError::ZeroCols)
        );
    }

    #[test]
    fn missing_pixels_are_reported() {
        assert_eq!(
            cell_height(&size(24, 80, 0, 0)),
            Err(CellMetricsError::PixelSizeUnavailable)
        );
        // Fewer pixels than rows would give a 0px cell.
        assert_eq!(
            cell_height(&size(24, 80, 640, 10)),
            Err(CellMetricsError::PixelSizeUnavailable)
        );
    }

    #[test]
    fn from_window_size_needs_both_axes() {
        assert_eq!(
            CellMetrics::from_window_size(&size(30, 100, 900, 600)),
            Ok(CellMetrics {
                width_px: 9,
                height_px: 20
            })
        );
        assert_eq!(
            CellMetrics::from_window_size(&size(30, 100, 0, 600)),
            Err(CellMetricsError::PixelSizeUnavailable)
        );
    }

    #[test]
    fn cells_spanned_rounds_up() {
        let metrics = CellMetrics {
            width_px: 8,
            height_px: 16,
        };
        assert_eq!(metrics.rows_for_height(0), 0);
        assert_eq!(metrics.rows_for_height(1), 1);
        assert_eq!(metrics.rows_for_height(16), 1);
        assert_eq!(metrics.rows_for_height(17), 2);
        assert_eq!(metrics.cols_for_width(300), 38);
    }

    #[test]
    fn resolve_falls_back_per_axis() {
        let fallback = FallbackConfig {
            cell_width_px: 7,
            cell_height_px: 14,
        };

        let resolved = resolve(&size(24, 80, 800, 0), &fallback);
        assert_eq!(resolved.metrics.width_px, 10);
        assert_eq!(resolved.metrics.height_px, 14);
        assert!(!resolved.width_fallback);
        assert!(resolved.height_fallback);
        assert!(resolved.used_fallback());

        let resolved = resolve(&size(24, 80, 800, 480), &fallback);
        assert_eq!(
            resolved.metrics,
            CellMetrics {
                width_px: 10,
                height_px: 20
            }
        );
        assert!(!resolved.used_fallback());
    }

    #[test]
    fn font_height_on_pty() {
        let ws = libc::winsize {
            ws_row: 25,
            ws_col: 80,
            ws_xpixel: 720,
            ws_ypixel: 450,
        };
        let pty = openpty(Some(&ws), None).unwrap();

        assert_eq!(font_height(pty.slave.as_raw_fd()).unwrap(), 18);
    }

    #[test]
    fn font_height_without_pixels_is_an_error() {
        let ws = libc::winsize {
            ws_row: 25,
            ws_col: 80,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        let pty = openpty(Some(&ws), None).unwrap();

        let err = font_height(pty.slave.as_raw_fd()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CellMetricsError>(),
            Some(&CellMetricsError::PixelSizeUnavailable)
        );
    }
}
