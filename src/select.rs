//! Cheapest-adequate component selection
//!
//! A `None` from any selector means the catalogue holds nothing suitable.
//! That is not an error and does not by itself rule a pack out.

use crate::models::{Bms, Cable, Rated, SelectedCable};

/// Cable insulation temperature limit (°C)
pub const CABLE_MAX_TEMP_C: f64 = 120.0;
/// Copper resistivity (Ω·m)
pub const COPPER_RESISTIVITY: f64 = 1.68e-8;
/// Thermal resistance of the cable run (K·m/W)
pub const CABLE_THERMAL_RESISTANCE: f64 = 0.5;
/// Cable run length (m)
pub const CABLE_LENGTH_M: f64 = 1.0;
/// Floor for the thermal headroom so hot ambients never divide by zero (K)
pub const MIN_THERMAL_HEADROOM_K: f64 = 1.0;

/// Cheapest entry rated for at least `voltage` and `current`.
///
/// Ties go to the entry that comes first in the pool.
pub fn select_component<T: Rated>(pool: &[T], voltage: f64, current: f64) -> Option<&T> {
    pool.iter()
        .filter(|c| c.max_voltage() >= voltage && c.max_current() >= current)
        .fold(None, |best: Option<&T>, c| match best {
            Some(b) if b.price() <= c.price() => Some(b),
            _ => Some(c),
        })
}

/// Cheapest BMS (by master price) that supports `series_cells` and `peak_current`
pub fn select_bms(pool: &[Bms], series_cells: u32, peak_current: f64) -> Option<&Bms> {
    pool.iter()
        .filter(|b| b.max_cells >= series_cells && b.max_current() >= peak_current)
        .fold(None, |best: Option<&Bms>, b| match best {
            Some(cur) if cur.master_price <= b.master_price => Some(cur),
            _ => Some(b),
        })
}

/// Minimum conductor cross-section (mm²) for `peak_current` at `ambient_temp`.
///
/// Simplified steady-state model: I²·ρ·L²·Rth / ΔT, with ΔT the headroom
/// between ambient and the cable limit. ΔT is floored at
/// [`MIN_THERMAL_HEADROOM_K`], so from 119 °C ambient upwards the section
/// stops growing instead of the plain `120 − ambient` going to zero or
/// negative (where every cable would pass).
pub fn required_cable_section(peak_current: f64, ambient_temp: f64) -> f64 {
    let headroom = (CABLE_MAX_TEMP_C - ambient_temp).max(MIN_THERMAL_HEADROOM_K);
    let area_m2 = peak_current.powi(2)
        * COPPER_RESISTIVITY
        * CABLE_LENGTH_M.powi(2)
        * CABLE_THERMAL_RESISTANCE
        / headroom;
    area_m2 * 1e6
}

/// Smallest adequate cable, priced for the out-and-back conductor run.
///
/// Unlike the other selectors this minimises cross-section, not price.
pub fn select_cable(
    pool: &[Cable],
    peak_current: f64,
    max_voltage: f64,
    ambient_temp: f64,
) -> Option<SelectedCable> {
    let min_section = required_cable_section(peak_current, ambient_temp);

    let selected = pool
        .iter()
        .filter(|c| {
            c.section >= min_section && c.vdc_max >= max_voltage && c.a_max >= peak_current
        })
        .fold(None, |best: Option<&Cable>, c| match best {
            Some(b) if b.section <= c.section => Some(b),
            _ => Some(c),
        })?;

    Some(SelectedCable {
        model: format!("{} {}", selected.brand, selected.model),
        section: selected.section,
        price: selected.price * CABLE_LENGTH_M * 2.0,
        link: selected.link.clone(),
    })
}
