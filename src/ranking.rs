//! Value ranking of feasible configurations

use std::cmp::Ordering;

use crate::models::{Configuration, DesignResult};

/// Number of configurations returned for detailed display
pub const RESULTS_LIMIT: usize = 30;
/// Number of configurations returned for plotting
pub const PLOT_LIMIT: usize = 100;

/// Energy per unit of price (Wh per currency unit).
///
/// `None` when the price is zero or the ratio is not finite.
pub fn value_ratio(config: &Configuration) -> Option<f64> {
    if config.total_price <= 0.0 {
        return None;
    }
    let ratio = config.battery_energy / config.total_price;
    ratio.is_finite().then_some(ratio)
}

/// Descending by value ratio; undefined ratios sort last
fn by_value_desc(a: &Configuration, b: &Configuration) -> Ordering {
    match (value_ratio(a), value_ratio(b)) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort by value and slice into the result and plot views.
///
/// The sort is stable, so equal ratios keep generation order.
pub fn rank(mut configs: Vec<Configuration>) -> DesignResult {
    configs.sort_by(by_value_desc);
    let total = configs.len();
    let plot_results: Vec<Configuration> = configs.into_iter().take(PLOT_LIMIT).collect();
    let results = plot_results.iter().take(RESULTS_LIMIT).cloned().collect();

    DesignResult {
        results,
        plot_results,
        total,
        stats: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Catalogue;
    use crate::generator::generate;
    use crate::models::Requirements;

    fn sample() -> Configuration {
        let requirements = Requirements {
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
        };
        generate(&requirements, &Catalogue::builtin()).remove(0)
    }

    fn with(energy: f64, price: f64, series: u32) -> Configuration {
        let mut c = sample();
        c.battery_energy = energy;
        c.total_price = price;
        c.series_cells = series;
        c
    }

    #[test]
    fn ratio_guards_zero_price() {
        assert_eq!(value_ratio(&with(1000.0, 0.0, 1)), None);
        assert_eq!(value_ratio(&with(1000.0, 500.0, 1)), Some(2.0));
    }

    #[test]
    fn sorts_descending_and_keeps_ties_in_order() {
        let ranked = rank(vec![
            with(1000.0, 1000.0, 1),
            with(3000.0, 1000.0, 2),
            with(2000.0, 1000.0, 3),
            with(1000.0, 1000.0, 4),
        ]);
        let order: Vec<u32> = ranked.results.iter().map(|c| c.series_cells).collect();
        assert_eq!(order, vec![2, 3, 1, 4]);
    }

    #[test]
    fn undefined_ratios_go_last() {
        let ranked = rank(vec![with(1000.0, 0.0, 1), with(10.0, 1000.0, 2)]);
        assert_eq!(ranked.results[0].series_cells, 2);
        assert_eq!(ranked.results[1].series_cells, 1);
    }

    #[test]
    fn slices_to_limits() {
        let configs: Vec<_> = (0..150).map(|i| with(1000.0 + f64::from(i), 1000.0, i)).collect();
        let ranked = rank(configs);
        assert_eq!(ranked.total, 150);
        assert_eq!(ranked.results.len(), RESULTS_LIMIT);
        assert_eq!(ranked.plot_results.len(), PLOT_LIMIT);
        assert_eq!(ranked.results[0].series_cells, 149);
        assert_eq!(ranked.results[..], ranked.plot_results[..RESULTS_LIMIT]);
    }

    #[test]
    fn empty_input() {
        let ranked = rank(Vec::new());
        assert_eq!(ranked.total, 0);
        assert!(ranked.results.is_empty());
        assert!(ranked.plot_results.is_empty());
    }
}
