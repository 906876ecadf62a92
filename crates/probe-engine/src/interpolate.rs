//! Value extraction from a grid message at fractional grid coordinates.
//!
//! Three policies: nearest-cell, bilinear over the four bounding cells, and
//! area-average over a cell range for coverage points. Textual messages are
//! always read nearest-cell; blending strings is meaningless.

use grid_source::{CellValue, GridMessage};

/// Nearest-cell extraction.
pub fn nearest(message: &dyn GridMessage, x: f64, y: f64) -> CellValue {
    message.cell(x.round() as i64, y.round() as i64)
}

/// Bilinear extraction over the four bounding cells.
///
/// If any bounding cell is missing the result is missing; blending around a
/// hole would silently bias the value. Falls back to nearest-cell for
/// textual messages.
pub fn bilinear(message: &dyn GridMessage, x: f64, y: f64) -> CellValue {
    if message.meta().textual {
        return nearest(message, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = (x0 + 1).min(message.width() as i64 - 1);
    let y1 = (y0 + 1).min(message.height() as i64 - 1);

    let (Some(v00), Some(v10), Some(v01), Some(v11)) = (
        message.cell(x0, y0).as_f64(),
        message.cell(x1, y0).as_f64(),
        message.cell(x0, y1).as_f64(),
        message.cell(x1, y1).as_f64(),
    ) else {
        return CellValue::Missing;
    };

    let xf = x - x0 as f64;
    let yf = y - y0 as f64;

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    CellValue::Numeric(top * (1.0 - yf) + bottom * yf)
}

/// Area-average extraction over every cell whose center falls inside the
/// given fractional cell range.
///
/// Missing cells are skipped; the result is missing only when every covered
/// cell is missing. Falls back to nearest-cell at the range center for
/// textual messages.
pub fn area_average(
    message: &dyn GridMessage,
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
) -> CellValue {
    if message.meta().textual {
        return nearest(message, (min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    }

    let x_lo = min_x.ceil() as i64;
    let x_hi = max_x.floor() as i64;
    let y_lo = min_y.ceil() as i64;
    let y_hi = max_y.floor() as i64;

    // A range narrower than one cell still reads the cell under its center.
    if x_lo > x_hi || y_lo > y_hi {
        return nearest(message, (min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    }

    let mut sum = 0.0;
    let mut count = 0u64;
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            if let Some(v) = message.cell(x, y).as_f64() {
                sum += v;
                count += 1;
            }
        }
    }
    if count == 0 {
        CellValue::Missing
    } else {
        CellValue::Numeric(sum / count as f64)
    }
}
