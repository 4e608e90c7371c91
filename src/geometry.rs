//! Plan-view packing check
//!
//! Cells stand upright in a rectangular grid. A pack fits when some grid
//! whose cell count is exactly series × parallel stays inside the footprint
//! limits in either cell orientation.

use crate::models::{CellSpec, Layout, Orientation};

/// Clearance added to the cell thickness and width (mm)
pub const CELL_CLEARANCE_MM: f64 = 0.2;

/// Factor pairs `(a, b)` with `a * b == n`, ordered by ascending `a`
fn factor_pairs(n: u32) -> Vec<(u32, u32)> {
    let mut low = Vec::new();
    let mut high = Vec::new();
    let mut i = 1;
    while i * i <= n {
        if n % i == 0 {
            low.push((i, n / i));
            if i != n / i {
                high.push((n / i, i));
            }
        }
        i += 1;
    }
    low.extend(high.into_iter().rev());
    low
}

/// First grid that fits, trying the thickness-along-X orientation first
pub fn find_layout(
    cell: &CellSpec,
    series: u32,
    parallel: u32,
    max_x: f64,
    max_y: f64,
) -> Option<Layout> {
    let total = series * parallel;
    if total == 0 {
        return None;
    }

    let thickness = cell.thickness_mm + CELL_CLEARANCE_MM;
    let width = cell.width_mm + CELL_CLEARANCE_MM;
    let orientations = [
        (Orientation::ThicknessAlongX, thickness, width),
        (Orientation::WidthAlongX, width, thickness),
    ];
    let pairs = factor_pairs(total);

    for (orientation, unit_x, unit_y) in orientations {
        for &(columns, rows) in &pairs {
            let extent_x = f64::from(columns) * unit_x;
            let extent_y = f64::from(rows) * unit_y;
            if extent_x <= max_x && extent_y <= max_y {
                return Some(Layout {
                    columns,
                    rows,
                    orientation,
                    extent_x,
                    extent_y,
                });
            }
        }
    }
    None
}

/// Whether `series` × `parallel` cells can be tiled inside `max_x` × `max_y`
pub fn fits(cell: &CellSpec, series: u32, parallel: u32, max_x: f64, max_y: f64) -> bool {
    find_layout(cell, series, parallel, max_x, max_y).is_some()
}
