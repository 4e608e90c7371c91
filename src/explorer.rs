//! Per-cell figures of merit and catalogue filtering

use crate::models::CellSpec;

/// Figures derived from a single cell's datasheet values
#[derive(Debug, Clone, PartialEq)]
pub struct CellMetrics {
    pub capacity_ah: f64,
    pub energy_wh: f64,
    /// Continuous discharge power (W)
    pub power_w: f64,
    pub volume_l: f64,
    /// `None` for a cell with no volume
    pub energy_density_wh_l: Option<f64>,
    pub power_density_w_l: Option<f64>,
    /// Energy per unit price, `None` for a free cell
    pub energy_per_price: Option<f64>,
}

impl CellMetrics {
    pub fn of(cell: &CellSpec) -> Self {
        let capacity_ah = cell.capacity_ah();
        let energy_wh = cell.energy_wh();
        let power_w = energy_wh * cell.discharge_rate;
        let volume_l = cell.height_mm * cell.width_mm * cell.thickness_mm / 1_000_000.0;
        let per = |num: f64, den: f64| (den > 0.0).then(|| num / den);

        CellMetrics {
            capacity_ah,
            energy_wh,
            power_w,
            volume_l,
            energy_density_wh_l: per(energy_wh, volume_l),
            power_density_w_l: per(power_w, volume_l),
            energy_per_price: per(energy_wh, cell.price),
        }
    }
}

/// Criteria for narrowing the cell list. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFilter {
    pub brand: Option<String>,
    pub chemistry: Option<String>,
    /// Case-insensitive substring of brand or model
    pub query: Option<String>,
    pub min_capacity_ah: Option<f64>,
    pub max_capacity_ah: Option<f64>,
    pub max_price: Option<f64>,
    pub min_discharge_rate: Option<f64>,
}

impl CellFilter {
    pub fn matches(&self, cell: &CellSpec) -> bool {
        if let Some(brand) = &self.brand
            && !cell.brand.eq_ignore_ascii_case(brand)
        {
            return false;
        }
        if let Some(chemistry) = &self.chemistry
            && !cell.composition.eq_ignore_ascii_case(chemistry)
        {
            return false;
        }
        if let Some(query) = &self.query {
            let query = query.to_lowercase();
            if !cell.brand.to_lowercase().contains(&query)
                && !cell.model.to_lowercase().contains(&query)
            {
                return false;
            }
        }

        let capacity = cell.capacity_ah();
        self.min_capacity_ah.is_none_or(|min| capacity >= min)
            && self.max_capacity_ah.is_none_or(|max| capacity <= max)
            && self.max_price.is_none_or(|max| cell.price <= max)
            && self.min_discharge_rate.is_none_or(|min| cell.discharge_rate >= min)
    }

    pub fn apply<'a>(&self, cells: &'a [CellSpec]) -> Vec<&'a CellSpec> {
        cells.iter().filter(|c| self.matches(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::catalogue::Catalogue;

    #[test]
    fn metrics_for_lf280k() {
        let catalogue = Catalogue::builtin();
        let m = CellMetrics::of(catalogue.find_cell("LF280K").unwrap());
        assert_relative_eq!(m.capacity_ah, 280.0, max_relative = 1e-12);
        assert_relative_eq!(m.energy_wh, 896.0, max_relative = 1e-12);
        assert_relative_eq!(m.power_w, 896.0, max_relative = 1e-12);
        // 207.5 x 173.7 x 72 mm
        assert_relative_eq!(m.volume_l, 2.595_078, max_relative = 1e-6);
        assert_relative_eq!(m.energy_density_wh_l.unwrap(), 896.0 / 2.595_078, max_relative = 1e-6);
        assert_relative_eq!(m.energy_per_price.unwrap(), 896.0 / 58.0, max_relative = 1e-12);
    }

    #[test]
    fn zero_volume_gives_undefined_density() {
        let mut cell = Catalogue::builtin().cells[0].clone();
        cell.thickness_mm = 0.0;
        cell.price = 0.0;
        let m = CellMetrics::of(&cell);
        assert_eq!(m.volume_l, 0.0);
        assert_eq!(m.energy_density_wh_l, None);
        assert_eq!(m.power_density_w_l, None);
        assert_eq!(m.energy_per_price, None);
    }

    #[test]
    fn default_filter_matches_everything() {
        let catalogue = Catalogue::builtin();
        assert_eq!(CellFilter::default().apply(&catalogue.cells).len(), catalogue.cells.len());
    }

    #[test]
    fn filters_combine() {
        let catalogue = Catalogue::builtin();
        let filter = CellFilter {
            brand: Some("eve".to_string()),
            chemistry: Some("LFP".to_string()),
            min_capacity_ah: Some(100.0),
            ..CellFilter::default()
        };
        let models: Vec<&str> = filter
            .apply(&catalogue.cells)
            .iter()
            .map(|c| c.model.as_str())
            .collect();
        assert_eq!(models, vec!["LF105", "LF105-73103 (Rep)", "LF280K", "LF100L"]);

        let query = CellFilter {
            query: Some("svolt".to_string()),
            max_price: Some(30.0),
            ..CellFilter::default()
        };
        let found = query.apply(&catalogue.cells);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].model, "CE26E891A-51Ah");
    }
}
