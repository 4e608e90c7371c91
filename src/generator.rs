//! Enumeration of series/parallel pack configurations
//!
//! For every catalogue cell the search walks the series counts allowed by
//! the voltage window and the parallel counts from the energy/power minimum
//! up to [`MAX_PARALLEL`]. Candidates that break a hard limit are dropped
//! silently; the survivors get protective components and a price.

use tracing::{debug, info};

use crate::catalogue::Catalogue;
use crate::geometry::{self, CELL_CLEARANCE_MM};
use crate::models::{CellSpec, Configuration, Dimensions, Rated, Requirements, SearchStats};
use crate::select;

/// Vertical clearance above the cells for busbars and wiring (mm)
pub const HEIGHT_CLEARANCE_MM: f64 = 30.0;
/// Upper bound on cells in parallel
pub const MAX_PARALLEL: u32 = 5;
/// Peak current as a multiple of the continuous current
pub const PEAK_CURRENT_FACTOR: f64 = 5.0;
/// Fuse current rating over peak current
pub const FUSE_CURRENT_FACTOR: f64 = 1.25;
/// Relay voltage rating over pack charge voltage
pub const RELAY_VOLTAGE_FACTOR: f64 = 1.25;
/// Relay current rating over peak current
pub const RELAY_CURRENT_FACTOR: f64 = 1.5;

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Smallest parallel count that reaches `required` given what one parallel
/// string contributes. `None` when a string contributes nothing.
fn min_parallel(required: f64, per_string: f64) -> Option<f64> {
    if per_string <= 0.0 || !per_string.is_finite() {
        return None;
    }
    Some((required / per_string).ceil())
}

/// All feasible configurations, unranked
pub fn generate(requirements: &Requirements, catalogue: &Catalogue) -> Vec<Configuration> {
    generate_with_stats(requirements, catalogue).0
}

/// Like [`generate`], also returning counters for every rejection stage
pub fn generate_with_stats(
    requirements: &Requirements,
    catalogue: &Catalogue,
) -> (Vec<Configuration>, SearchStats) {
    let mut configs = Vec::new();
    let mut stats = SearchStats::default();

    for cell in &catalogue.cells {
        stats.cells_considered += 1;

        if cell.height_mm + HEIGHT_CLEARANCE_MM > requirements.max_height {
            debug!(cell = %cell.model, height = cell.height_mm, "too tall");
            stats.cells_too_tall += 1;
            continue;
        }

        let Some((min_series, max_series)) = series_range(cell, requirements) else {
            debug!(cell = %cell.model, "no series count fits the voltage window");
            stats.cells_voltage_mismatch += 1;
            continue;
        };

        for series in min_series..=max_series {
            search_parallel(cell, series, requirements, catalogue, &mut configs, &mut stats);
        }
    }

    stats.valid_configurations = configs.len();
    info!(
        cells = stats.cells_considered,
        attempts = stats.total_attempts,
        valid = stats.valid_configurations,
        "configuration search finished"
    );
    (configs, stats)
}

/// Inclusive series range whose nominal voltage lies in the requested window
fn series_range(cell: &CellSpec, requirements: &Requirements) -> Option<(u32, u32)> {
    if cell.nominal_voltage <= 0.0 {
        return None;
    }
    // a pack needs at least one cell in series
    let min_series = (requirements.min_voltage / cell.nominal_voltage).ceil().max(1.0);
    let max_series = (requirements.max_voltage / cell.nominal_voltage).floor();
    if min_series > max_series || !max_series.is_finite() {
        return None;
    }
    Some((min_series as u32, max_series as u32))
}

fn search_parallel(
    cell: &CellSpec,
    series: u32,
    requirements: &Requirements,
    catalogue: &Catalogue,
    configs: &mut Vec<Configuration>,
    stats: &mut SearchStats,
) {
    let s = f64::from(series);
    let for_energy = min_parallel(requirements.min_energy, s * cell.energy_wh());
    let for_power = min_parallel(requirements.min_continuous_power, s * cell.continuous_power_w());
    let (Some(for_energy), Some(for_power)) = (for_energy, for_power) else {
        return;
    };

    let start = for_energy.max(for_power).max(1.0);
    if start > f64::from(MAX_PARALLEL) {
        return;
    }

    for parallel in (start as u32)..=MAX_PARALLEL {
        stats.total_attempts += 1;
        if let Some(config) = evaluate(cell, series, parallel, requirements, catalogue, stats) {
            configs.push(config);
        }
    }
}

/// Build one candidate, or `None` if it breaks a hard limit
fn evaluate(
    cell: &CellSpec,
    series: u32,
    parallel: u32,
    requirements: &Requirements,
    catalogue: &Catalogue,
    stats: &mut SearchStats,
) -> Option<Configuration> {
    let s = f64::from(series);
    let p = f64::from(parallel);
    let total_cells = series * parallel;
    let n = f64::from(total_cells);

    let voltage = s * cell.nominal_voltage;
    let max_voltage = s * cell.charge_voltage;
    let capacity = cell.capacity_ah() * p;
    let energy = voltage * capacity;
    let weight = cell.weight_kg() * n;
    let impedance = cell.impedance_ohm() * s / p;
    let continuous_power = voltage * cell.continuous_current_a() * p;
    let peak_current = cell.continuous_current_a() * p * PEAK_CURRENT_FACTOR;
    let peak_power = voltage * peak_current;
    let cell_price = cell.price * n;

    let Some(layout) = geometry::find_layout(
        cell,
        series,
        parallel,
        requirements.max_width,
        requirements.max_length,
    ) else {
        stats.rejected_geometry += 1;
        return None;
    };
    if weight > requirements.max_weight {
        stats.rejected_weight += 1;
        return None;
    }
    if continuous_power < requirements.min_continuous_power {
        stats.rejected_power += 1;
        return None;
    }
    if energy < requirements.min_energy {
        stats.rejected_energy += 1;
        return None;
    }

    let pools = &catalogue.components;
    let fuse_current = (FUSE_CURRENT_FACTOR * peak_current).ceil();
    let fuse = select::select_component(&pools.fuses, max_voltage, fuse_current);

    let relay_voltage = (RELAY_VOLTAGE_FACTOR * max_voltage).ceil();
    let relay_current = (RELAY_CURRENT_FACTOR * peak_current).ceil();
    let relay = select::select_component(&pools.relays, relay_voltage, relay_current);

    let cable = select::select_cable(
        &pools.cables,
        peak_current,
        max_voltage,
        requirements.ambient_temp,
    );
    let bms = select::select_bms(&pools.bms, series, peak_current);
    let shunt = select::select_component(&pools.shunts, max_voltage, peak_current);

    let total_price = cell_price
        + fuse.map_or(0.0, Rated::price)
        + relay.map_or(0.0, Rated::price)
        + cable.as_ref().map_or(0.0, |c| c.price)
        + bms.map_or(0.0, Rated::price)
        + shunt.map_or(0.0, Rated::price);
    if total_price > requirements.max_price {
        stats.rejected_price += 1;
        return None;
    }

    let side = n.sqrt().ceil();
    Some(Configuration {
        cell: cell.clone(),
        series_cells: series,
        parallel_cells: parallel,
        battery_voltage: round_to(voltage, 1),
        battery_capacity: round_to(capacity, 1),
        battery_energy: round_to(energy, 0),
        battery_weight: round_to(weight, 1),
        battery_impedance: round_to(impedance, 3),
        continuous_power: round_to(continuous_power, 0),
        peak_power: round_to(peak_power, 0),
        cell_price: round_to(cell_price, 2),
        fuse: fuse.cloned(),
        relay: relay.cloned(),
        cable,
        bms: bms.cloned(),
        shunt: shunt.cloned(),
        total_price: round_to(total_price, 2),
        dimensions: Dimensions {
            length: round_to((cell.width_mm + CELL_CLEARANCE_MM) * side, 1),
            width: round_to((cell.thickness_mm + CELL_CLEARANCE_MM) * side, 1),
            height: round_to(cell.height_mm, 1),
        },
        layout,
        affiliate_link: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::catalogue::ComponentPools;
    use crate::models::{Fuse, Relay, Shunt};

    fn requirements() -> Requirements {
        Requirements {
            min_voltage: 80.0,
            max_voltage: 90.0,
            min_energy: 3000.0,
            min_continuous_power: 3000.0,
            max_weight: 65.0,
            max_price: 5000.0,
            max_width: 900.0,
            max_length: 340.0,
            max_height: 250.0,
            ambient_temp: 35.0,
        }
    }

    fn gotion_lfp30() -> CellSpec {
        Catalogue::builtin().find_cell("LFP-30").cloned().unwrap()
    }

    fn single_cell(cell: CellSpec) -> Catalogue {
        Catalogue::new(vec![cell], Catalogue::builtin().components)
    }

    /// 3.7 V / 4.2 V, 4 Ah at `rate` C in the LFP-30 can
    fn small_cell(rate: f64) -> CellSpec {
        CellSpec {
            brand: "Test".to_string(),
            model: "NMC-4".to_string(),
            nominal_voltage: 3.7,
            charge_voltage: 4.2,
            capacity_mah: 4000.0,
            discharge_rate: rate,
            ..gotion_lfp30()
        }
    }

    /// 4s window: 14.8 V nominal, 16.8 V charged
    fn four_series() -> Requirements {
        Requirements {
            min_voltage: 14.0,
            max_voltage: 15.0,
            min_energy: 0.0,
            min_continuous_power: 0.0,
            max_width: 250.0,
            max_length: 250.0,
            ..requirements()
        }
    }

    fn single_parallel(catalogue: &Catalogue) -> Configuration {
        generate(&four_series(), catalogue)
            .into_iter()
            .find(|c| c.series_cells == 4 && c.parallel_cells == 1)
            .unwrap()
    }

    fn part(model: &str, vdc_max: f64, a_max: f64, price: f64) -> (String, f64, f64, f64) {
        (model.to_string(), vdc_max, a_max, price)
    }

    fn fuses(parts: &[(String, f64, f64, f64)]) -> Vec<Fuse> {
        parts
            .iter()
            .map(|(model, vdc_max, a_max, price)| Fuse {
                brand: "Test".to_string(),
                model: model.clone(),
                vdc_max: *vdc_max,
                a_max: *a_max,
                temp_min: -40.0,
                temp_max: 125.0,
                price: *price,
                link: String::new(),
            })
            .collect()
    }

    fn relays(parts: &[(String, f64, f64, f64)]) -> Vec<Relay> {
        fuses(parts)
            .into_iter()
            .map(|f| Relay {
                brand: f.brand,
                model: f.model,
                vdc_max: f.vdc_max,
                a_max: f.a_max,
                temp_min: f.temp_min,
                temp_max: f.temp_max,
                price: f.price,
                link: f.link,
            })
            .collect()
    }

    fn shunts(parts: &[(String, f64, f64, f64)]) -> Vec<Shunt> {
        fuses(parts)
            .into_iter()
            .map(|f| Shunt {
                brand: f.brand,
                model: f.model,
                vdc_max: f.vdc_max,
                a_max: f.a_max,
                temp_min: f.temp_min,
                temp_max: f.temp_max,
                price: f.price,
                link: f.link,
            })
            .collect()
    }

    #[test]
    fn rounding_helper() {
        assert_relative_eq!(round_to(80.04, 1), 80.0);
        assert_relative_eq!(round_to(2.5, 0), 3.0);
        assert_relative_eq!(round_to(0.0123456, 3), 0.012);
        assert_relative_eq!(round_to(1541.644, 2), 1541.64);
    }

    #[test]
    fn min_parallel_guards_zero_contribution() {
        assert_eq!(min_parallel(3000.0, 2400.0), Some(2.0));
        assert_eq!(min_parallel(0.0, 2400.0), Some(0.0));
        assert_eq!(min_parallel(3000.0, 0.0), None);
    }

    #[test]
    fn derived_quantities_for_25s2p() {
        let catalogue = single_cell(gotion_lfp30());
        let configs = generate(&requirements(), &catalogue);
        let config = configs
            .iter()
            .find(|c| c.series_cells == 25 && c.parallel_cells == 2)
            .unwrap();

        assert_relative_eq!(config.battery_voltage, 80.0);
        assert_relative_eq!(config.battery_capacity, 60.0);
        assert_relative_eq!(config.battery_energy, 4800.0);
        assert_relative_eq!(config.battery_weight, 32.0);
        assert_relative_eq!(config.battery_impedance, 0.019);
        // 80 V · 45 A · 2
        assert_relative_eq!(config.continuous_power, 7200.0);
        // 80 V · 450 A
        assert_relative_eq!(config.peak_power, 36000.0);
        assert_relative_eq!(config.cell_price, 456.0);

        // 450 A peak is beyond every fuse, relay and cable
        assert!(config.fuse.is_none());
        assert!(config.relay.is_none());
        assert!(config.cable.is_none());
        assert_eq!(config.bms.as_ref().unwrap().model, "n-BMS");
        assert_eq!(config.shunt.as_ref().unwrap().model, "SSA-2-250A");
        assert_relative_eq!(config.total_price, 1541.64);

        // ceil(sqrt(50)) = 8 per side
        assert_relative_eq!(config.dimensions.length, 801.6);
        assert_relative_eq!(config.dimensions.width, 165.6);
        assert_relative_eq!(config.dimensions.height, 144.0);
        assert_eq!(config.layout.columns * config.layout.rows, 50);
    }

    #[test]
    fn series_range_follows_voltage_window() {
        let cell = gotion_lfp30();
        assert_eq!(series_range(&cell, &requirements()), Some((25, 28)));

        let mut narrow = requirements();
        narrow.min_voltage = 81.0;
        narrow.max_voltage = 82.0;
        assert_eq!(series_range(&cell, &narrow), None);

        let mut zero = requirements();
        zero.min_voltage = 0.0;
        zero.max_voltage = 3.3;
        assert_eq!(series_range(&cell, &zero), Some((1, 1)));
    }

    #[test]
    fn parallel_never_exceeds_cap() {
        let mut req = requirements();
        req.max_weight = 1000.0;
        req.max_price = 1e9;
        req.max_width = 1e5;
        req.max_length = 1e5;
        req.min_energy = 0.0;
        req.min_continuous_power = 0.0;
        let configs = generate(&req, &single_cell(gotion_lfp30()));
        // 4 series counts x 5 parallel counts
        assert_eq!(configs.len(), 20);
        assert!(configs.iter().all(|c| (1..=MAX_PARALLEL).contains(&c.parallel_cells)));
    }

    #[test]
    fn energy_beyond_cap_yields_nothing() {
        let mut req = requirements();
        // 28s5p of 96 Wh cells is 13440 Wh
        req.min_energy = 20_000.0;
        let (configs, stats) = generate_with_stats(&req, &single_cell(gotion_lfp30()));
        assert!(configs.is_empty());
        assert_eq!(stats.total_attempts, 0);
    }

    #[test]
    fn tall_cells_are_skipped_before_enumeration() {
        let mut req = requirements();
        req.max_height = 150.0;
        let (configs, stats) = generate_with_stats(&req, &single_cell(gotion_lfp30()));
        assert!(configs.is_empty());
        assert_eq!(stats.cells_too_tall, 1);
        assert_eq!(stats.total_attempts, 0);
    }

    #[test]
    fn rejection_reasons_are_counted() {
        let mut req = requirements();
        req.max_weight = 40.0;
        let (configs, stats) = generate_with_stats(&req, &single_cell(gotion_lfp30()));
        // 25s3p already weighs 48 kg
        assert!(configs.iter().all(|c| c.battery_weight <= 40.0));
        assert!(stats.rejected_weight > 0);
        assert_eq!(
            stats.total_attempts,
            stats.rejected_geometry
                + stats.rejected_weight
                + stats.rejected_power
                + stats.rejected_energy
                + stats.rejected_price
                + stats.valid_configurations
        );
    }

    #[test]
    fn empty_component_pools_still_yield_configurations() {
        let catalogue = Catalogue::new(vec![gotion_lfp30()], ComponentPools::default());
        let configs = generate(&requirements(), &catalogue);
        assert!(!configs.is_empty());
        for c in &configs {
            assert!(c.fuse.is_none() && c.relay.is_none() && c.cable.is_none());
            assert!(c.bms.is_none() && c.shunt.is_none());
            assert_abs_diff_eq!(c.total_price, c.cell_price, epsilon = 0.005);
        }
    }

    #[test]
    fn price_limit_excludes_expensive_packs() {
        let mut req = requirements();
        req.max_price = 1500.0;
        let configs = generate(&req, &single_cell(gotion_lfp30()));
        assert!(configs.iter().all(|c| c.total_price <= 1500.0));
        assert!(!configs.iter().any(|c| c.series_cells == 25 && c.parallel_cells == 2));
    }

    #[test]
    fn zero_voltage_cell_is_skipped() {
        let mut cell = gotion_lfp30();
        cell.nominal_voltage = 0.0;
        let (configs, stats) = generate_with_stats(&requirements(), &single_cell(cell));
        assert!(configs.is_empty());
        assert_eq!(stats.cells_voltage_mismatch, 1);
    }

    #[test]
    fn low_current_pack_gets_every_component() {
        // 4s1p: 16 A peak, fuse >= 20 A, relay >= 21 V / 24 A
        let config = single_parallel(&single_cell(small_cell(0.8)));

        assert_eq!(config.fuse.as_ref().unwrap().model, "340027-80V");
        assert_eq!(config.relay.as_ref().unwrap().model, "INVE01-200");
        assert_eq!(config.bms.as_ref().unwrap().model, "c-BMS");
        assert_eq!(config.shunt.as_ref().unwrap().model, "SSA-2-100A");

        // 16.8 V rules out the 15 V cable that 14.8 V nominal would allow
        let cable = config.cable.as_ref().unwrap();
        assert_eq!(cable.model, "TLC 6491X 2.5mm²");
        assert_relative_eq!(cable.section, 2.5);
        assert_relative_eq!(cable.price, 0.56);

        // 36.48 cells + 3.21 + 36.36 + 0.56 + 800 + 82.42
        assert_relative_eq!(config.total_price, 959.03, max_relative = 1e-12);
        assert_abs_diff_eq!(
            config.total_price,
            config.cell_price + config.component_price(),
            epsilon = 0.005
        );
    }

    #[test]
    fn fuse_derating_moves_the_pick() {
        // 20 A peak needs a 25 A fuse: the 30 A part still fits
        let config = single_parallel(&single_cell(small_cell(1.0)));
        assert_eq!(config.fuse.as_ref().unwrap().model, "340027-80V");

        // 28 A peak needs 35 A: only the 100 A parts qualify
        let config = single_parallel(&single_cell(small_cell(1.4)));
        assert_eq!(config.fuse.as_ref().unwrap().model, "142.5631.6102");
    }

    #[test]
    fn ratings_use_derated_charge_voltage_and_peak_current() {
        // 16 A peak at 16.8 V charged, 14.8 V nominal. Each cheap part
        // passes only if its factor or the charge voltage is ignored.
        let mut components = Catalogue::builtin().components;
        components.fuses = fuses(&[
            part("F-18A", 48.0, 18.0, 1.0),
            part("F-30A", 48.0, 30.0, 2.0),
        ]);
        components.relays = relays(&[
            part("R-18V", 18.0, 100.0, 10.0),
            part("R-20A", 48.0, 20.0, 12.0),
            part("R-48V", 48.0, 100.0, 30.0),
        ]);
        components.shunts = shunts(&[
            part("S-15V", 15.0, 100.0, 1.0),
            part("S-100V", 100.0, 100.0, 50.0),
        ]);

        let config = single_parallel(&Catalogue::new(vec![small_cell(0.8)], components));
        assert_eq!(config.fuse.as_ref().unwrap().model, "F-30A");
        assert_eq!(config.relay.as_ref().unwrap().model, "R-48V");
        assert_eq!(config.shunt.as_ref().unwrap().model, "S-100V");
    }
}
