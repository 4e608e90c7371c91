//! Cell and component catalogue
//!
//! The catalogue is plain data handed to the search by value or reference;
//! nothing in the crate keeps a global copy of it.

use serde::{Deserialize, Serialize};

use crate::error::CatalogueError;
use crate::models::{Bms, Cable, CellSpec, Fuse, Relay, Shunt};

/// Component pools, one per category, in catalogue order.
///
/// Order matters: selection ties go to the earlier entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentPools {
    #[serde(default)]
    pub fuses: Vec<Fuse>,
    #[serde(default)]
    pub relays: Vec<Relay>,
    #[serde(default)]
    pub cables: Vec<Cable>,
    #[serde(default)]
    pub bms: Vec<Bms>,
    #[serde(default)]
    pub shunts: Vec<Shunt>,
}

impl ComponentPools {
    pub fn len(&self) -> usize {
        self.fuses.len()
            + self.relays.len()
            + self.cables.len()
            + self.bms.len()
            + self.shunts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything the search draws from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    pub cells: Vec<CellSpec>,
    pub components: ComponentPools,
}

impl Catalogue {
    pub fn new(cells: Vec<CellSpec>, components: ComponentPools) -> Self {
        Self { cells, components }
    }

    /// The reference dataset shipped with the tool
    pub fn builtin() -> Self {
        Self::new(builtin_cells(), builtin_components())
    }

    pub fn find_cell(&self, model: &str) -> Option<&CellSpec> {
        self.cells.iter().find(|c| c.model == model)
    }

    /// Check every record, returning all violations found
    pub fn validate(&self) -> Vec<CatalogueError> {
        let mut errors = Vec::new();
        for cell in &self.cells {
            if let Err(e) = validate_cell(cell) {
                errors.push(e);
            }
        }

        let c = &self.components;
        let checks = c
            .fuses
            .iter()
            .map(validate_fuse)
            .chain(c.relays.iter().map(validate_relay))
            .chain(c.shunts.iter().map(validate_shunt))
            .chain(c.cables.iter().map(validate_cable))
            .chain(c.bms.iter().map(validate_bms));

        errors.extend(checks.filter_map(Result::err));
        errors
    }
}

fn non_negative(record: &str, field: &'static str, value: f64) -> Result<(), CatalogueError> {
    if value.is_nan() || value < 0.0 {
        return Err(CatalogueError::InvalidNumber {
            record: record.to_string(),
            field,
            value,
        });
    }
    Ok(())
}

/// Check a cell against the catalogue invariants
pub fn validate_cell(cell: &CellSpec) -> Result<(), CatalogueError> {
    let record = format!("cell {}", cell.display_name());
    if cell.model.trim().is_empty() {
        return Err(CatalogueError::MissingModel { record });
    }

    let fields = [
        ("MaxContinuousDischargeRate", cell.discharge_rate),
        ("MaxContinuousChargeRate", cell.charge_rate),
        ("NominalVoltage", cell.nominal_voltage),
        ("ChargeVoltage", cell.charge_voltage),
        ("Capacity", cell.capacity_mah),
        ("TheMaxDischargeCurrentOfTheTabs", cell.tab_current_a),
        ("Impedance", cell.impedance_mohm),
        ("Weight", cell.weight_g),
        ("Cell_Thickness", cell.thickness_mm),
        ("Cell_Width", cell.width_mm),
        ("Cell_Height", cell.height_mm),
        ("TabsThickness", cell.tab_thickness_mm),
        ("TabsWidth", cell.tab_width_mm),
        ("TabsLength", cell.tab_length_mm),
        ("DistanceBetweenTwoTabs", cell.tab_spacing_mm),
        ("VolumeEnergyDensity", cell.volume_energy_density),
        ("PowerEnergyDensity", cell.power_energy_density),
        ("Price", cell.price),
    ];
    for (field, value) in fields {
        non_negative(&record, field, value)?;
    }

    if cell.nominal_voltage >= cell.charge_voltage {
        return Err(CatalogueError::VoltageOrder {
            record,
            nominal: cell.nominal_voltage,
            charge: cell.charge_voltage,
        });
    }
    Ok(())
}

fn validate_rated(
    kind: &str,
    model: &str,
    vdc_max: f64,
    a_max: f64,
    price: f64,
) -> Result<(), CatalogueError> {
    let record = format!("{kind} {model}");
    if model.trim().is_empty() {
        return Err(CatalogueError::MissingModel { record });
    }
    non_negative(&record, "vdc_max", vdc_max)?;
    non_negative(&record, "a_max", a_max)?;
    non_negative(&record, "price", price)
}

pub fn validate_fuse(fuse: &Fuse) -> Result<(), CatalogueError> {
    validate_rated("fuse", &fuse.model, fuse.vdc_max, fuse.a_max, fuse.price)
}

pub fn validate_relay(relay: &Relay) -> Result<(), CatalogueError> {
    validate_rated("relay", &relay.model, relay.vdc_max, relay.a_max, relay.price)
}

pub fn validate_shunt(shunt: &Shunt) -> Result<(), CatalogueError> {
    validate_rated("shunt", &shunt.model, shunt.vdc_max, shunt.a_max, shunt.price)
}

pub fn validate_cable(cable: &Cable) -> Result<(), CatalogueError> {
    validate_rated("cable", &cable.model, cable.vdc_max, cable.a_max, cable.price)?;
    non_negative(&format!("cable {}", cable.model), "section", cable.section)
}

pub fn validate_bms(bms: &Bms) -> Result<(), CatalogueError> {
    validate_rated("bms", &bms.model, bms.vdc_max, bms.a_max, bms.master_price)?;
    let record = format!("bms {}", bms.model);
    non_negative(&record, "vdc_min", bms.vdc_min)?;
    non_negative(&record, "slave_price", bms.slave_price)
}

// Every catalogue cell is a prismatic "C" stack with the same tab geometry.
#[allow(clippy::too_many_arguments)]
fn cell(
    brand: &str,
    model: &str,
    composition: &str,
    discharge_rate: f64,
    charge_rate: f64,
    nominal_voltage: f64,
    charge_voltage: f64,
    capacity_mah: f64,
    tab_current_a: f64,
    impedance_mohm: f64,
    weight_g: f64,
    thickness_mm: f64,
    width_mm: f64,
    height_mm: f64,
    volume_energy_density: f64,
    power_energy_density: f64,
    cycles: u32,
    price: f64,
    origin_country: &str,
    connection: &str,
) -> CellSpec {
    CellSpec {
        brand: brand.to_string(),
        model: model.to_string(),
        composition: composition.to_string(),
        stack: "C".to_string(),
        discharge_rate,
        charge_rate,
        nominal_voltage,
        charge_voltage,
        capacity_mah,
        tab_current_a,
        impedance_mohm,
        weight_g,
        thickness_mm,
        width_mm,
        height_mm,
        tab_thickness_mm: 0.15,
        tab_width_mm: 6.0,
        tab_length_mm: 2.0,
        tab_spacing_mm: 0.0,
        volume_energy_density,
        power_energy_density,
        cycles,
        price,
        origin_country: origin_country.to_string(),
        connection: connection.to_string(),
    }
}

// One row per cell, in `cell()` argument order.
#[rustfmt::skip]
fn builtin_cells() -> Vec<CellSpec> {
    vec![
        cell("Gotion", "IFP20100140A-30Ah", "LFP", 2.0, 1.0, 3.2, 3.65, 30000.0, 60.0, 1.5, 615.0, 20.0, 100.0, 140.0, 0.342857143, 156.097561, 3000, 12.0, "China", "Solder"),
        cell("Poweroad", "L148N50B", "NMC", 1.2, 1.0, 3.7, 4.3, 50000.0, 60.0, 1.11, 860.0, 26.66, 148.2, 101.9, 0.459503894, 215.1162791, 2000, 38.38, "China", "L"),
        cell("", "ITPE60", "Unknown", 1.2, 1.0, 3.7, 4.3, 60000.0, 72.0, 1.11, 1090.0, 29.0, 149.0, 120.0, 0.428141634, 203.6697248, 2000, 18.0, "China", "L"),
        cell("Samsung", "SDI94 Li Ion 3.7V 94AH NMC", "NMC", 1.6, 0.765, 3.68, 4.15, 94000.0, 150.4, 0.75, 2100.0, 45.0, 173.0, 133.0, 0.334091491, 164.7238095, 3200, 82.14, "South Korea", "Solder"),
        cell("", "CS0600R0002a", "NMC", 1.0, 1.0, 3.7, 4.2, 60000.0, 60.0, 1.11, 1850.0, 45.0, 173.0, 130.0, 0.219356751, 120.0, 2000, 18.0, "China", "Solder"),
        cell("CATL", "ND-3.7V 60Ah", "NMC", 1.0, 1.0, 3.7, 4.3, 60000.0, 60.0, 0.5, 967.0, 29.0, 148.0, 104.0, 0.49734748, 229.5760083, 2000, 30.0, "China", "Solder"),
        cell("EVE", "LF105", "LFP", 0.5, 0.5, 3.2, 3.65, 105000.0, 52.5, 0.32, 1980.0, 36.35, 130.3, 200.5, 0.35381486, 169.6969697, 2000, 28.0, "China", "Solder"),
        cell("EVE", "LF105-73103 (Rep)", "LFP", 1.0, 1.0, 3.2, 3.65, 105000.0, 105.0, 0.5, 1980.0, 36.7, 130.3, 200.5, 0.350440604, 169.6969697, 3500, 25.0, "China", "Solder"),
        cell("EVE", "LF22k", "LFP", 1.0, 1.0, 3.22, 3.7, 22000.0, 22.0, 0.5, 618.0, 17.7, 148.7, 131.8, 0.204210894, 114.6278317, 2000, 14.0, "China", "Solder"),
        cell("CALB", "L221N113B", "Unknown", 1.0, 1.0, 3.2, 4.35, 113500.0, 113.5, 1.11, 1795.0, 33.36, 220.8, 105.88, 0.465700599, 202.3398329, 1500, 45.0, "China", "Solder"),
        cell("CATL", "LN52148103", "NMC", 1.0, 1.0, 3.65, 4.2, 114000.0, 114.0, 1.0, 1800.0, 52.0, 148.0, 103.0, 0.524922794, 231.1666667, 2000, 48.0, "China", "Solder"),
        cell("ANC", "ANC-100", "LFP", 1.0, 1.0, 3.2, 3.65, 100000.0, 100.0, 0.4, 2000.0, 48.8, 173.9, 121.1, 0.311376929, 160.0, 4000, 55.0, "China", "Solder"),
        cell("BYD", "C47FCSA-102", "LFP", 2.5, 1.0, 3.2, 3.65, 102000.0, 255.0, 0.35, 1990.0, 49.9, 160.0, 118.5, 0.344993785, 164.0201005, 6000, 81.57, "China", "Solder"),
        cell("CALB", "CA-125", "LFP", 1.0, 1.0, 3.2, 3.65, 125000.0, 125.0, 0.9, 2450.0, 36.4, 174.4, 175.3, 0.35944315, 163.2653061, 4000, 28.79, "China", "Solder"),
        cell("CATL", "CATL-100", "LFP", 1.0, 1.0, 3.2, 3.65, 100000.0, 100.0, 0.28, 1950.0, 49.9, 160.0, 119.0, 0.33680807, 164.1025641, 3500, 33.0, "China", "Solder"),
        cell("EVE", "LF280K", "LFP", 1.0, 1.0, 3.2, 3.65, 280000.0, 280.0, 0.25, 5420.0, 72.0, 173.7, 207.5, 0.345269005, 165.3136531, 6000, 58.0, "China", "Solder"),
        cell("EVE", "LF100L", "LFP", 1.0, 1.0, 3.2, 3.65, 100000.0, 100.0, 0.5, 1980.0, 49.9, 160.0, 118.5, 0.338229201, 161.6161616, 5000, 25.44, "China", "Solder"),
        cell("EVE", "LF50K", "LFP", 3.0, 3.0, 3.2, 3.65, 50000.0, 150.0, 0.7, 1395.0, 29.3, 135.3, 185.3, 0.217810668, 114.6953405, 7000, 19.19, "China", "Solder"),
        cell("Gotion", "LFP-102", "LFP", 1.0, 1.0, 3.2, 3.65, 102000.0, 102.0, 0.4, 1926.0, 49.9, 160.0, 118.5, 0.344993785, 169.470405, 3000, 30.0, "China", "Solder"),
        cell("Gotion", "LFP-52", "LFP", 1.0, 1.0, 3.2, 3.65, 52000.0, 52.0, 0.8, 966.0, 28.2, 148.0, 118.5, 0.336452801, 172.2567288, 2000, 19.19, "China", "Solder"),
        cell("Gotion", "LFP-30", "LFP", 1.5, 2.0, 3.2, 3.65, 30000.0, 45.0, 1.5, 640.0, 20.5, 100.0, 144.0, 0.325203252, 150.0, 3000, 9.12, "China", "Solder"),
        cell("LiShen", "LP33-125", "LFP", 1.0, 1.0, 3.2, 3.65, 125000.0, 125.0, 0.5, 2461.0, 33.2, 200.3, 173.2, 0.347290634, 162.5355547, 6000, 48.0, "China", "Solder"),
        cell("REPT", "RP-100", "LFP", 2.0, 1.0, 3.2, 3.65, 100000.0, 200.0, 0.6, 2000.0, 49.9, 160.4, 118.6, 0.337101263, 160.0, 5000, 28.8, "China", "Solder"),
        cell("REPT", "RP-50", "LFP", 2.0, 1.0, 3.2, 3.65, 50000.0, 100.0, 0.6, 1180.0, 39.7, 148.4, 105.1, 0.258400208, 135.5932203, 6000, 19.19, "China", "Solder"),
        cell("CALB", "L221N147A", "NMC", 1.0, 1.0, 3.76, 4.35, 147000.0, 147.0, 0.4, 2340.0, 44.46, 220.8, 105.2, 0.535205925, 236.2051282, 2000, 96.0, "China", "Solder"),
        cell("EVE", "LF100MA", "Unknown", 0.5, 0.5, 3.2, 3.65, 101000.0, 50.5, 0.5, 1920.0, 50.1, 160.0, 118.5, 0.340247774, 168.3333333, 2000, 33.6, "China", "Solder"),
        cell("REPT", "CB29148112EA", "LFP", 2.0, 1.0, 3.22, 3.65, 48000.0, 96.0, 0.5, 1082.0, 29.72, 148.66, 114.61, 0.305233125, 142.8465804, 3000, 18.0, "China", "Solder"),
        cell("Gotion", "IFP28148115A-40Ah", "LFP", 1.0, 1.0, 3.2, 3.65, 40000.0, 40.0, 0.65, 935.0, 28.0, 148.0, 115.0, 0.268591573, 136.8983957, 3000, 16.0, "China", "Solder"),
        cell("Svolt", "CE52E8A0A", "NMC", 1.0, 0.5, 3.64, 4.2, 126000.0, 126.0, 0.4, 1809.0, 52.3, 147.0, 105.3, 0.566532115, 253.5323383, 2000, 52.0, "China", "Solder"),
        cell("Svolt", "CE26E891A-51Ah", "NMC", 0.51, 0.51, 3.65, 4.2, 51000.0, 26.01, 0.6, 855.0, 26.72, 91.4, 96.3, 0.791505804, 217.7192982, 2000, 22.0, "China", "Solder"),
    ]
}

fn fuse(brand: &str, model: &str, vdc_max: f64, a_max: f64, price: f64) -> Fuse {
    Fuse {
        brand: brand.to_string(),
        model: model.to_string(),
        vdc_max,
        a_max,
        temp_min: -40.0,
        temp_max: 125.0,
        price,
        link: String::new(),
    }
}

fn relay(brand: &str, model: &str, vdc_max: f64, a_max: f64, price: f64) -> Relay {
    Relay {
        brand: brand.to_string(),
        model: model.to_string(),
        vdc_max,
        a_max,
        temp_min: -40.0,
        temp_max: 125.0,
        price,
        link: String::new(),
    }
}

fn cable(brand: &str, model: &str, section: f64, vdc_max: f64, a_max: f64, price: f64) -> Cable {
    Cable {
        brand: brand.to_string(),
        model: model.to_string(),
        section,
        vdc_max,
        a_max,
        temp_min: -40.0,
        temp_max: 120.0,
        price,
        link: String::new(),
    }
}

fn shunt(brand: &str, model: &str, vdc_max: f64, a_max: f64, temp_max: f64, price: f64) -> Shunt {
    Shunt {
        brand: brand.to_string(),
        model: model.to_string(),
        vdc_max,
        a_max,
        temp_min: -40.0,
        temp_max,
        price,
        link: String::new(),
    }
}

fn builtin_components() -> ComponentPools {
    ComponentPools {
        fuses: vec![
            fuse("Littelfuse Inc", "0999030.ZXN", 58.0, 30.0, 3.32),
            fuse("ESKA", "340027-80V", 80.0, 30.0, 3.21),
            fuse("Littelfuse Inc", "0HEV030.ZXISO", 450.0, 30.0, 24.35),
            fuse("HELLA", "8JS 742 901-051", 150.0, 100.0, 5.33),
            fuse("Littelfuse Inc", "142.5631.6102", 58.0, 100.0, 3.69),
            fuse("Littelfuse Inc", "153.5631.6151", 32.0, 150.0, 3.94),
            fuse("Cfriend", "EVAE-300A", 125.0, 300.0, 36.6),
            fuse("Cfriend", "EVAE-350A", 125.0, 350.0, 38.0),
            fuse("Cfriend", "EVAE-400A", 125.0, 400.0, 40.0),
        ],
        relays: vec![
            relay("OZSSLJJ", "RL/180", 72.0, 100.0, 47.0),
            relay("Sensata", "D1D100", 100.0, 100.0, 159.0),
            relay("Innuovo", "INVE01-200", 450.0, 200.0, 36.36),
        ],
        cables: vec![
            cable("feked", "Single Core Electric Wire Cable", 2.0, 12.0, 17.5, 1.0),
            cable("TLC", "6491X 1.5mm²", 1.5, 15.0, 17.0, 0.19),
            cable("TLC", "6491X 2.5mm²", 2.5, 24.0, 24.0, 0.28),
            cable("TLC", "6491X 4mm²", 4.0, 32.0, 32.0, 0.44),
            cable("Solar Shop", "SCBAC00662", 6.0, 120.0, 62.0, 1.87),
            cable("MidSummer", "Solar PV Cable", 10.0, 1000.0, 80.0, 2.18),
            cable("Split Charge", "Hi-Flex Battery Cable 16mm²", 16.0, 1000.0, 110.0, 3.3),
            cable("SplitCharge", "Hi-Flex Battery Cable 20mm²", 20.0, 1000.0, 135.0, 3.93),
        ],
        bms: vec![
            Bms {
                brand: "Sensata".to_string(),
                model: "c-BMS".to_string(),
                max_cells: 24,
                vdc_min: 11.0,
                vdc_max: 120.0,
                a_max: 2000.0,
                temp_min: -40.0,
                temp_max: 125.0,
                master_price: 800.0,
                slave_price: 0.0,
                link: String::new(),
            },
            Bms {
                brand: "Sensata".to_string(),
                model: "n-BMS".to_string(),
                max_cells: 384,
                vdc_min: 12.0,
                vdc_max: 1000.0,
                a_max: 5000.0,
                temp_min: -40.0,
                temp_max: 125.0,
                master_price: 1000.0,
                slave_price: 200.0,
                link: String::new(),
            },
        ],
        shunts: vec![
            shunt("Isabellenhuette", "IVT-S-100", 1000.0, 120.0, 105.0, 380.7),
            shunt("Isabellenhuette", "IVT-S-300", 1000.0, 320.0, 105.0, 378.08),
            shunt("Isabellenhuette", "IVT-S-500", 1000.0, 730.0, 105.0, 388.04),
            shunt("Isabellenhuette", "IVT-S-1000", 1000.0, 1100.0, 105.0, 392.02),
            shunt("Isabellenhuette", "IVT-S-2500", 1000.0, 2700.0, 105.0, 405.88),
            shunt("Riedon", "SSA-2-100A", 1500.0, 200.0, 115.0, 82.42),
            shunt("Riedon", "SSA-2-250A", 1500.0, 500.0, 115.0, 85.64),
            shunt("Riedon", "SSA-2-500A", 1500.0, 1000.0, 115.0, 89.34),
            shunt("Riedon", "SSA-2-1000A", 1500.0, 2000.0, 115.0, 93.2),
        ],
    }
}
