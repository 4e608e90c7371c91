//! Data models for cells, pack components and computed pack configurations

use serde::{Deserialize, Serialize};

/// A single cell as listed in the catalogue.
///
/// Field names on the wire follow the catalogue files (`cells.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "CellModelNo")]
    pub model: String,
    #[serde(rename = "Composition")]
    pub composition: String,
    #[serde(rename = "Cell_Stack")]
    pub stack: String,
    /// Continuous discharge C-rate
    #[serde(rename = "MaxContinuousDischargeRate")]
    pub discharge_rate: f64,
    /// Continuous charge C-rate
    #[serde(rename = "MaxContinuousChargeRate")]
    pub charge_rate: f64,
    #[serde(rename = "NominalVoltage")]
    pub nominal_voltage: f64,
    /// Charge cut-off voltage
    #[serde(rename = "ChargeVoltage")]
    pub charge_voltage: f64,
    #[serde(rename = "Capacity")]
    pub capacity_mah: f64,
    #[serde(rename = "TheMaxDischargeCurrentOfTheTabs")]
    pub tab_current_a: f64,
    #[serde(rename = "Impedance")]
    pub impedance_mohm: f64,
    #[serde(rename = "Weight")]
    pub weight_g: f64,
    #[serde(rename = "Cell_Thickness")]
    pub thickness_mm: f64,
    #[serde(rename = "Cell_Width")]
    pub width_mm: f64,
    #[serde(rename = "Cell_Height")]
    pub height_mm: f64,
    #[serde(rename = "TabsThickness")]
    pub tab_thickness_mm: f64,
    #[serde(rename = "TabsWidth")]
    pub tab_width_mm: f64,
    #[serde(rename = "TabsLength")]
    pub tab_length_mm: f64,
    #[serde(rename = "DistanceBetweenTwoTabs")]
    pub tab_spacing_mm: f64,
    #[serde(rename = "VolumeEnergyDensity")]
    pub volume_energy_density: f64,
    #[serde(rename = "PowerEnergyDensity")]
    pub power_energy_density: f64,
    #[serde(rename = "Cycles")]
    pub cycles: u32,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "OriginCountry")]
    pub origin_country: String,
    /// Solder/terminal type, also used as the affiliate marker
    #[serde(rename = "Connection")]
    pub connection: String,
}

impl CellSpec {
    pub fn capacity_ah(&self) -> f64 {
        self.capacity_mah * 1e-3
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_g * 1e-3
    }

    pub fn impedance_ohm(&self) -> f64 {
        self.impedance_mohm * 1e-3
    }

    /// Energy stored at nominal voltage, in Wh
    pub fn energy_wh(&self) -> f64 {
        self.capacity_ah() * self.nominal_voltage
    }

    /// Continuous discharge current, in A
    pub fn continuous_current_a(&self) -> f64 {
        self.capacity_ah() * self.discharge_rate
    }

    /// Continuous discharge power at nominal voltage, in W
    pub fn continuous_power_w(&self) -> f64 {
        self.continuous_current_a() * self.nominal_voltage
    }

    /// "Brand Model", or just the model for unbranded cells
    pub fn display_name(&self) -> String {
        if self.brand.is_empty() {
            self.model.clone()
        } else {
            format!("{} {}", self.brand, self.model)
        }
    }
}

/// Common view of a catalogue component's electrical ratings and price.
///
/// Every component category implements this so that selection can be
/// written once for all of them.
pub trait Rated {
    fn max_voltage(&self) -> f64;
    fn max_current(&self) -> f64;
    fn price(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fuse {
    pub brand: String,
    pub model: String,
    pub vdc_max: f64,
    pub a_max: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub price: f64,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relay {
    pub brand: String,
    pub model: String,
    pub vdc_max: f64,
    pub a_max: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub price: f64,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shunt {
    pub brand: String,
    pub model: String,
    pub vdc_max: f64,
    pub a_max: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub price: f64,
    #[serde(default)]
    pub link: String,
}

/// Cable sold by the metre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cable {
    pub brand: String,
    pub model: String,
    /// Conductor cross-section in mm²
    pub section: f64,
    pub vdc_max: f64,
    pub a_max: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Price per metre
    pub price: f64,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bms {
    pub brand: String,
    pub model: String,
    /// Maximum supported series cell count
    pub max_cells: u32,
    pub vdc_min: f64,
    pub vdc_max: f64,
    pub a_max: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub master_price: f64,
    pub slave_price: f64,
    #[serde(default)]
    pub link: String,
}

macro_rules! impl_rated {
    ($($ty:ty => $price:ident),* $(,)?) => {
        $(
            impl Rated for $ty {
                fn max_voltage(&self) -> f64 {
                    self.vdc_max
                }

                fn max_current(&self) -> f64 {
                    self.a_max
                }

                fn price(&self) -> f64 {
                    self.$price
                }
            }
        )*
    };
}

impl_rated!(
    Fuse => price,
    Relay => price,
    Shunt => price,
    Cable => price,
    Bms => master_price,
);

/// Cable chosen for a pack, priced for the full conductor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedCable {
    /// "Brand Model"
    pub model: String,
    pub section: f64,
    pub price: f64,
    pub link: String,
}

/// What the user asks of the pack. All values are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    /// Lower bound of the pack nominal voltage (V)
    pub min_voltage: f64,
    /// Upper bound of the pack nominal voltage (V)
    pub max_voltage: f64,
    /// Minimum rated energy (Wh)
    pub min_energy: f64,
    /// Minimum continuous power (W)
    pub min_continuous_power: f64,
    /// Maximum pack weight (kg)
    pub max_weight: f64,
    pub max_price: f64,
    /// Footprint X limit (mm)
    pub max_width: f64,
    /// Footprint Y limit (mm)
    pub max_length: f64,
    /// Height limit (mm)
    pub max_height: f64,
    /// Ambient temperature (°C)
    pub ambient_temp: f64,
}

/// Which cell edge runs along the X axis of the footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Cell thickness along X, width along Y
    ThicknessAlongX,
    /// Cell width along X, thickness along Y
    WidthAlongX,
}

/// Grid arrangement found by the geometry check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Cells along X
    pub columns: u32,
    /// Cells along Y
    pub rows: u32,
    pub orientation: Orientation,
    /// Footprint along X (mm)
    pub extent_x: f64,
    /// Footprint along Y (mm)
    pub extent_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// One feasible pack built from a single cell type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub cell: CellSpec,
    pub series_cells: u32,
    pub parallel_cells: u32,
    /// Nominal pack voltage (V)
    pub battery_voltage: f64,
    /// Pack capacity (Ah)
    pub battery_capacity: f64,
    /// Pack energy (Wh)
    pub battery_energy: f64,
    /// Pack weight (kg)
    pub battery_weight: f64,
    /// Pack impedance (Ω)
    pub battery_impedance: f64,
    /// Continuous power (W)
    pub continuous_power: f64,
    /// Peak power (W)
    pub peak_power: f64,
    /// Price of the cells alone
    pub cell_price: f64,
    pub fuse: Option<Fuse>,
    pub relay: Option<Relay>,
    pub cable: Option<SelectedCable>,
    pub bms: Option<Bms>,
    pub shunt: Option<Shunt>,
    pub total_price: f64,
    pub dimensions: Dimensions,
    pub layout: Layout,
    pub affiliate_link: String,
}

impl Configuration {
    pub fn total_cells(&self) -> u32 {
        self.series_cells * self.parallel_cells
    }

    /// Sum of the selected component prices, BMS at master price
    pub fn component_price(&self) -> f64 {
        self.fuse.as_ref().map_or(0.0, Rated::price)
            + self.relay.as_ref().map_or(0.0, Rated::price)
            + self.cable.as_ref().map_or(0.0, |c| c.price)
            + self.bms.as_ref().map_or(0.0, Rated::price)
            + self.shunt.as_ref().map_or(0.0, Rated::price)
    }
}

/// Counters collected during one search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub cells_considered: usize,
    pub cells_too_tall: usize,
    pub cells_voltage_mismatch: usize,
    /// (series, parallel) pairs evaluated
    pub total_attempts: usize,
    pub rejected_geometry: usize,
    pub rejected_weight: usize,
    pub rejected_power: usize,
    pub rejected_energy: usize,
    pub rejected_price: usize,
    pub valid_configurations: usize,
}

/// Ranked search output handed to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignResult {
    /// Best configurations for detailed display
    pub results: Vec<Configuration>,
    /// Best configurations for plotting
    #[serde(rename = "plotResults")]
    pub plot_results: Vec<Configuration>,
    /// Number of feasible configurations before slicing
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<SearchStats>,
}
