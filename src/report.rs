//! Plain-text rendering of search results, cells and components

use std::fmt;

use crate::catalogue::ComponentPools;
use crate::explorer::CellMetrics;
use crate::models::{CellSpec, Configuration, DesignResult, Orientation, SearchStats};
use crate::ranking::value_ratio;
use crate::requirements::PRESETS;

fn or_dash(name: Option<String>) -> String {
    name.unwrap_or_else(|| "-".to_string())
}

fn optional(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

/// Selected components of one configuration, `-` where none was found
pub fn format_components_line(config: &Configuration) -> String {
    format!(
        "fuse: {}, relay: {}, cable: {}, bms: {}, shunt: {}",
        or_dash(config.fuse.as_ref().map(|f| f.model.clone())),
        or_dash(config.relay.as_ref().map(|r| r.model.clone())),
        or_dash(config.cable.as_ref().map(|c| c.model.clone())),
        or_dash(config.bms.as_ref().map(|b| b.model.clone())),
        or_dash(config.shunt.as_ref().map(|s| s.model.clone())),
    )
}

/// Ranked results table, at most `limit` rows
pub fn format_results(result: &DesignResult, limit: usize) -> String {
    let mut output = String::new();
    if result.results.is_empty() {
        output.push_str("No configuration meets the requirements.\n");
        return output;
    }

    output.push_str(&format!(
        "Showing {} of {} feasible configurations\n",
        result.results.len().min(limit),
        result.total
    ));
    output.push_str(&format!(
        "{:>3}  {:<34} {:>7} {:>8} {:>9} {:>8} {:>9} {:>9} {:>7}\n",
        "#", "Cell", "Layout", "V", "Wh", "kg", "W", "Price", "Wh/$"
    ));
    output.push_str(&"-".repeat(104));
    output.push('\n');

    for (i, c) in result.results.iter().take(limit).enumerate() {
        output.push_str(&format!(
            "{:>3}  {:<34} {:>7} {:>8.1} {:>9.0} {:>8.1} {:>9.0} {:>9.2} {:>7}\n",
            i + 1,
            c.cell.display_name(),
            format!("{}s{}p", c.series_cells, c.parallel_cells),
            c.battery_voltage,
            c.battery_energy,
            c.battery_weight,
            c.continuous_power,
            c.total_price,
            optional(value_ratio(c), 2),
        ));
        output.push_str(&format!("     {}\n", format_components_line(c)));
    }
    output
}

/// Full breakdown of a single configuration
pub fn format_configuration(c: &Configuration) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} {}s{}p ({} cells)\n",
        c.cell.display_name(),
        c.series_cells,
        c.parallel_cells,
        c.total_cells()
    ));
    output.push_str(&format!("  Voltage:    {:.1} V\n", c.battery_voltage));
    output.push_str(&format!("  Capacity:   {:.1} Ah\n", c.battery_capacity));
    output.push_str(&format!("  Energy:     {:.0} Wh\n", c.battery_energy));
    output.push_str(&format!("  Weight:     {:.1} kg\n", c.battery_weight));
    output.push_str(&format!("  Impedance:  {:.3} Ω\n", c.battery_impedance));
    output.push_str(&format!(
        "  Power:      {:.0} W continuous, {:.0} W peak\n",
        c.continuous_power, c.peak_power
    ));
    output.push_str(&format!(
        "  Size:       {:.1} x {:.1} x {:.1} mm\n",
        c.dimensions.length, c.dimensions.width, c.dimensions.height
    ));
    let orientation = match c.layout.orientation {
        Orientation::ThicknessAlongX => "thickness along X",
        Orientation::WidthAlongX => "width along X",
    };
    output.push_str(&format!(
        "  Layout:     {} x {} cells, {} ({:.1} x {:.1} mm)\n",
        c.layout.columns, c.layout.rows, orientation, c.layout.extent_x, c.layout.extent_y
    ));
    output.push_str(&format!("  Components: {}\n", format_components_line(c)));
    output.push_str(&format!(
        "  Price:      {:.2} (cells {:.2}, components {:.2})\n",
        c.total_price,
        c.cell_price,
        c.component_price()
    ));
    output
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Search Statistics ===")?;
        writeln!(f, "Cells considered:      {}", self.cells_considered)?;
        writeln!(f, "  too tall:            {}", self.cells_too_tall)?;
        writeln!(f, "  voltage mismatch:    {}", self.cells_voltage_mismatch)?;
        writeln!(f, "Candidates attempted:  {}", self.total_attempts)?;
        writeln!(f, "  rejected geometry:   {}", self.rejected_geometry)?;
        writeln!(f, "  rejected weight:     {}", self.rejected_weight)?;
        writeln!(f, "  rejected power:      {}", self.rejected_power)?;
        writeln!(f, "  rejected energy:     {}", self.rejected_energy)?;
        writeln!(f, "  rejected price:      {}", self.rejected_price)?;
        write!(f, "Valid configurations:  {}", self.valid_configurations)
    }
}

/// One line per cell
pub fn format_cell_table(cells: &[&CellSpec]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<28} {:<6} {:>7} {:>8} {:>8} {:>6} {:>8}\n",
        "Cell", "Chem", "V", "Ah", "Wh", "C", "Price"
    ));
    output.push_str(&"-".repeat(77));
    output.push('\n');
    for cell in cells {
        output.push_str(&format!(
            "{:<28} {:<6} {:>7.2} {:>8.1} {:>8.1} {:>6.1} {:>8.2}\n",
            cell.display_name(),
            cell.composition,
            cell.nominal_voltage,
            cell.capacity_ah(),
            cell.energy_wh(),
            cell.discharge_rate,
            cell.price
        ));
    }
    output
}

/// Datasheet values and derived metrics for one cell
pub fn format_cell(cell: &CellSpec) -> String {
    let m = CellMetrics::of(cell);
    let mut output = String::new();
    output.push_str(&format!("Cell: {}\n", cell.display_name()));
    output.push_str(&format!(
        "  Chemistry:   {} ({})\n",
        cell.composition, cell.origin_country
    ));
    output.push_str(&format!(
        "  Voltage:     {:.2} V nominal, {:.2} V charge\n",
        cell.nominal_voltage, cell.charge_voltage
    ));
    output.push_str(&format!("  Capacity:    {:.1} Ah\n", m.capacity_ah));
    output.push_str(&format!("  Energy:      {:.1} Wh\n", m.energy_wh));
    output.push_str(&format!(
        "  Power:       {:.0} W at {}C ({:.0} A)\n",
        m.power_w,
        cell.discharge_rate,
        cell.continuous_current_a()
    ));
    output.push_str(&format!("  Impedance:   {} mΩ\n", cell.impedance_mohm));
    output.push_str(&format!("  Weight:      {} g\n", cell.weight_g));
    output.push_str(&format!(
        "  Size:        {} x {} x {} mm ({:.3} L)\n",
        cell.thickness_mm, cell.width_mm, cell.height_mm, m.volume_l
    ));
    output.push_str(&format!(
        "  Density:     {} Wh/L, {} W/L\n",
        optional(m.energy_density_wh_l, 1),
        optional(m.power_density_w_l, 1)
    ));
    output.push_str(&format!("  Cycles:      {}\n", cell.cycles));
    output.push_str(&format!(
        "  Price:       {:.2} ({} Wh per unit)\n",
        cell.price,
        optional(m.energy_per_price, 2)
    ));
    output
}

fn push_section(output: &mut String, title: &str, rows: Vec<String>) {
    output.push_str(&format!("{title} ({}):\n", rows.len()));
    for row in rows {
        output.push_str(&format!("  {row}\n"));
    }
}

fn rating_row(model: &str, vdc: f64, amps: f64, price: f64) -> String {
    format!("{model:<30} {vdc:>6.0} V {amps:>6.0} A {price:>8.2}")
}

/// Component pools grouped by kind
pub fn format_components(pools: &ComponentPools) -> String {
    let mut output = String::new();

    let fuses = pools.fuses.iter();
    let fuses = fuses.map(|f| rating_row(&f.model, f.vdc_max, f.a_max, f.price));
    push_section(&mut output, "Fuses", fuses.collect());

    let relays = pools.relays.iter();
    let relays = relays.map(|r| rating_row(&r.model, r.vdc_max, r.a_max, r.price));
    push_section(&mut output, "Relays", relays.collect());

    let cables = pools
        .cables
        .iter()
        .map(|c| format!("{:<30} {:>6.1} mm² {:>8.2}/m", c.model, c.section, c.price));
    push_section(&mut output, "Cables", cables.collect());

    let bms = pools.bms.iter().map(|b| {
        format!(
            "{:<30} {:>4} cells {:>6.0} A {:>8.2}",
            b.model, b.max_cells, b.a_max, b.master_price
        )
    });
    push_section(&mut output, "BMS", bms.collect());

    let shunts = pools.shunts.iter();
    let shunts = shunts.map(|s| rating_row(&s.model, s.vdc_max, s.a_max, s.price));
    push_section(&mut output, "Shunts", shunts.collect());

    output
}

/// Available presets with the values they set
pub fn format_presets() -> String {
    let mut output = String::from("custom                 (no overrides)\n");
    for p in PRESETS {
        let weight = p.max_weight.map_or(String::new(), |w| format!(", <= {w} kg"));
        output.push_str(&format!(
            "{:<22} {} [{}-{} V, >= {} W, >= {} Wh{}]\n",
            p.name,
            p.label,
            p.min_voltage,
            p.max_voltage,
            p.min_continuous_power,
            p.min_energy,
            weight
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Catalogue;
    use crate::generator::generate;
    use crate::ranking::rank;
    use crate::requirements::DEFAULT_REQUIREMENTS;

    #[test]
    fn absent_components_render_as_dash() {
        let configs = generate(&DEFAULT_REQUIREMENTS, &Catalogue::builtin());
        let lfp30 = configs
            .iter()
            .find(|c| c.cell.model == "LFP-30" && c.series_cells == 25 && c.parallel_cells == 2)
            .unwrap();
        assert_eq!(
            format_components_line(lfp30),
            "fuse: -, relay: -, cable: -, bms: n-BMS, shunt: SSA-2-250A"
        );
    }

    #[test]
    fn empty_result_message() {
        let text = format_results(&rank(Vec::new()), 10);
        assert_eq!(text, "No configuration meets the requirements.\n");
    }

    #[test]
    fn results_respect_limit() {
        let ranked = rank(generate(&DEFAULT_REQUIREMENTS, &Catalogue::builtin()));
        let text = format_results(&ranked, 1);
        // header, column titles, rule, then two lines per configuration
        assert_eq!(text.lines().count(), 3 + 2);
    }

    #[test]
    fn stats_summary_lists_every_counter() {
        let stats = SearchStats {
            cells_considered: 30,
            valid_configurations: 7,
            ..SearchStats::default()
        };
        let text = stats.to_string();
        assert!(text.starts_with("=== Search Statistics ==="));
        assert!(text.contains("Cells considered:      30"));
        assert!(text.ends_with("Valid configurations:  7"));
    }

    #[test]
    fn cell_and_catalogue_views() {
        let catalogue = Catalogue::builtin();
        let text = format_cell(catalogue.find_cell("LF280K").unwrap());
        assert!(text.contains("Capacity:    280.0 Ah"));

        let all: Vec<&CellSpec> = catalogue.cells.iter().collect();
        assert_eq!(format_cell_table(&all).lines().count(), 2 + all.len());
        assert!(format_components(&catalogue.components).contains("Fuses (9):"));
        assert_eq!(format_presets().lines().count(), 1 + PRESETS.len());
    }

    #[test]
    fn configuration_breakdown_is_line_per_field() {
        let ranked = rank(generate(&DEFAULT_REQUIREMENTS, &Catalogue::builtin()));
        let best = &ranked.results[0];
        let text = format_configuration(best);
        assert_eq!(text.lines().count(), 11);
        assert!(text.ends_with('\n'));
        assert!(text.contains(&format_components_line(best)));

        let components = format_components(&Catalogue::builtin().components);
        assert!(components.lines().all(|l| l.ends_with(':') || l.starts_with("  ")));
    }
}
