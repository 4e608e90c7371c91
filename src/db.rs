//! Database schema and operations for the stored catalogue

use anyhow::Result;
use rusqlite::{Connection, Row};

use crate::catalogue::{Catalogue, ComponentPools};
use crate::models::{Bms, Cable, CellSpec, Fuse, Relay, Shunt};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Cell datasheet values, in catalogue order
        CREATE TABLE IF NOT EXISTS cells (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            model TEXT NOT NULL,
            composition TEXT NOT NULL,
            stack TEXT NOT NULL,
            discharge_rate REAL NOT NULL,
            charge_rate REAL NOT NULL,
            nominal_voltage REAL NOT NULL,
            charge_voltage REAL NOT NULL,
            capacity_mah REAL NOT NULL,
            tab_current_a REAL NOT NULL,
            impedance_mohm REAL NOT NULL,
            weight_g REAL NOT NULL,
            thickness_mm REAL NOT NULL,
            width_mm REAL NOT NULL,
            height_mm REAL NOT NULL,
            tab_thickness_mm REAL NOT NULL,
            tab_width_mm REAL NOT NULL,
            tab_length_mm REAL NOT NULL,
            tab_spacing_mm REAL NOT NULL,
            volume_energy_density REAL NOT NULL,
            power_energy_density REAL NOT NULL,
            cycles INTEGER NOT NULL,
            price REAL NOT NULL,
            origin_country TEXT NOT NULL,
            connection TEXT NOT NULL
        );

        -- Fuses, relays and shunts share one shape
        CREATE TABLE IF NOT EXISTS fuses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            model TEXT NOT NULL,
            vdc_max REAL NOT NULL,
            a_max REAL NOT NULL,
            temp_min REAL NOT NULL,
            temp_max REAL NOT NULL,
            price REAL NOT NULL,
            link TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS relays (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            model TEXT NOT NULL,
            vdc_max REAL NOT NULL,
            a_max REAL NOT NULL,
            temp_min REAL NOT NULL,
            temp_max REAL NOT NULL,
            price REAL NOT NULL,
            link TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS shunts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            model TEXT NOT NULL,
            vdc_max REAL NOT NULL,
            a_max REAL NOT NULL,
            temp_min REAL NOT NULL,
            temp_max REAL NOT NULL,
            price REAL NOT NULL,
            link TEXT NOT NULL
        );

        -- Cable price is per metre
        CREATE TABLE IF NOT EXISTS cables (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            model TEXT NOT NULL,
            section REAL NOT NULL,
            vdc_max REAL NOT NULL,
            a_max REAL NOT NULL,
            temp_min REAL NOT NULL,
            temp_max REAL NOT NULL,
            price REAL NOT NULL,
            link TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS bms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            model TEXT NOT NULL,
            max_cells INTEGER NOT NULL,
            vdc_min REAL NOT NULL,
            vdc_max REAL NOT NULL,
            a_max REAL NOT NULL,
            temp_min REAL NOT NULL,
            temp_max REAL NOT NULL,
            master_price REAL NOT NULL,
            slave_price REAL NOT NULL,
            link TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_cells_model ON cells(model);
        "#,
    )?;
    Ok(())
}

/// Remove every stored cell and component
pub fn clear_catalogue(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM cells;
        DELETE FROM fuses;
        DELETE FROM relays;
        DELETE FROM shunts;
        DELETE FROM cables;
        DELETE FROM bms;
        "#,
    )?;
    Ok(())
}

/// Insert a cell
pub fn insert_cell(conn: &Connection, cell: &CellSpec) -> Result<()> {
    conn.execute(
        "INSERT INTO cells (brand, model, composition, stack, discharge_rate, charge_rate,
             nominal_voltage, charge_voltage, capacity_mah, tab_current_a, impedance_mohm,
             weight_g, thickness_mm, width_mm, height_mm, tab_thickness_mm, tab_width_mm,
             tab_length_mm, tab_spacing_mm, volume_energy_density, power_energy_density,
             cycles, price, origin_country, connection)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
             ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)",
        rusqlite::params![
            cell.brand,
            cell.model,
            cell.composition,
            cell.stack,
            cell.discharge_rate,
            cell.charge_rate,
            cell.nominal_voltage,
            cell.charge_voltage,
            cell.capacity_mah,
            cell.tab_current_a,
            cell.impedance_mohm,
            cell.weight_g,
            cell.thickness_mm,
            cell.width_mm,
            cell.height_mm,
            cell.tab_thickness_mm,
            cell.tab_width_mm,
            cell.tab_length_mm,
            cell.tab_spacing_mm,
            cell.volume_energy_density,
            cell.power_energy_density,
            cell.cycles,
            cell.price,
            cell.origin_country,
            cell.connection,
        ],
    )?;
    Ok(())
}

/// Fuse, relay and shunt rows all have this shape
#[allow(clippy::too_many_arguments)]
fn insert_rated(
    conn: &Connection,
    table: &str,
    brand: &str,
    model: &str,
    vdc_max: f64,
    a_max: f64,
    temp_min: f64,
    temp_max: f64,
    price: f64,
    link: &str,
) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {table} (brand, model, vdc_max, a_max, temp_min, temp_max, price, link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        (brand, model, vdc_max, a_max, temp_min, temp_max, price, link),
    )?;
    Ok(())
}

pub fn insert_fuse(conn: &Connection, f: &Fuse) -> Result<()> {
    insert_rated(
        conn, "fuses", &f.brand, &f.model, f.vdc_max, f.a_max, f.temp_min, f.temp_max, f.price,
        &f.link,
    )
}

pub fn insert_relay(conn: &Connection, r: &Relay) -> Result<()> {
    insert_rated(
        conn, "relays", &r.brand, &r.model, r.vdc_max, r.a_max, r.temp_min, r.temp_max, r.price,
        &r.link,
    )
}

pub fn insert_shunt(conn: &Connection, s: &Shunt) -> Result<()> {
    insert_rated(
        conn, "shunts", &s.brand, &s.model, s.vdc_max, s.a_max, s.temp_min, s.temp_max, s.price,
        &s.link,
    )
}

pub fn insert_cable(conn: &Connection, c: &Cable) -> Result<()> {
    conn.execute(
        "INSERT INTO cables (brand, model, section, vdc_max, a_max, temp_min, temp_max, price, link)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            &c.brand, &c.model, c.section, c.vdc_max, c.a_max, c.temp_min, c.temp_max, c.price,
            &c.link,
        ),
    )?;
    Ok(())
}

pub fn insert_bms(conn: &Connection, b: &Bms) -> Result<()> {
    conn.execute(
        "INSERT INTO bms (brand, model, max_cells, vdc_min, vdc_max, a_max, temp_min, temp_max,
             master_price, slave_price, link)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        (
            &b.brand,
            &b.model,
            b.max_cells,
            b.vdc_min,
            b.vdc_max,
            b.a_max,
            b.temp_min,
            b.temp_max,
            b.master_price,
            b.slave_price,
            &b.link,
        ),
    )?;
    Ok(())
}

/// Store a whole catalogue in one transaction, appending to what is there
pub fn store_catalogue(conn: &mut Connection, catalogue: &Catalogue) -> Result<()> {
    let tx = conn.transaction()?;
    for cell in &catalogue.cells {
        insert_cell(&tx, cell)?;
    }
    let c = &catalogue.components;
    for f in &c.fuses {
        insert_fuse(&tx, f)?;
    }
    for r in &c.relays {
        insert_relay(&tx, r)?;
    }
    for s in &c.shunts {
        insert_shunt(&tx, s)?;
    }
    for cable in &c.cables {
        insert_cable(&tx, cable)?;
    }
    for b in &c.bms {
        insert_bms(&tx, b)?;
    }
    tx.commit()?;
    Ok(())
}

fn cell_from_row(row: &Row<'_>) -> rusqlite::Result<CellSpec> {
    Ok(CellSpec {
        brand: row.get(0)?,
        model: row.get(1)?,
        composition: row.get(2)?,
        stack: row.get(3)?,
        discharge_rate: row.get(4)?,
        charge_rate: row.get(5)?,
        nominal_voltage: row.get(6)?,
        charge_voltage: row.get(7)?,
        capacity_mah: row.get(8)?,
        tab_current_a: row.get(9)?,
        impedance_mohm: row.get(10)?,
        weight_g: row.get(11)?,
        thickness_mm: row.get(12)?,
        width_mm: row.get(13)?,
        height_mm: row.get(14)?,
        tab_thickness_mm: row.get(15)?,
        tab_width_mm: row.get(16)?,
        tab_length_mm: row.get(17)?,
        tab_spacing_mm: row.get(18)?,
        volume_energy_density: row.get(19)?,
        power_energy_density: row.get(20)?,
        cycles: row.get(21)?,
        price: row.get(22)?,
        origin_country: row.get(23)?,
        connection: row.get(24)?,
    })
}

/// List all cells in insertion order
pub fn list_cells(conn: &Connection) -> Result<Vec<CellSpec>> {
    let mut stmt = conn.prepare(
        "SELECT brand, model, composition, stack, discharge_rate, charge_rate, nominal_voltage,
             charge_voltage, capacity_mah, tab_current_a, impedance_mohm, weight_g,
             thickness_mm, width_mm, height_mm, tab_thickness_mm, tab_width_mm, tab_length_mm,
             tab_spacing_mm, volume_energy_density, power_energy_density, cycles, price,
             origin_country, connection
         FROM cells ORDER BY id",
    )?;

    let rows = stmt.query_map([], cell_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Rows of a fuse/relay/shunt table as
/// (brand, model, vdc_max, a_max, temp_min, temp_max, price, link)
type RatedRow = (String, String, f64, f64, f64, f64, f64, String);

fn list_rated(conn: &Connection, table: &str) -> Result<Vec<RatedRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT brand, model, vdc_max, a_max, temp_min, temp_max, price, link
         FROM {table} ORDER BY id"
    ))?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn list_cables(conn: &Connection) -> Result<Vec<Cable>> {
    let mut stmt = conn.prepare(
        "SELECT brand, model, section, vdc_max, a_max, temp_min, temp_max, price, link
         FROM cables ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(Cable {
            brand: row.get(0)?,
            model: row.get(1)?,
            section: row.get(2)?,
            vdc_max: row.get(3)?,
            a_max: row.get(4)?,
            temp_min: row.get(5)?,
            temp_max: row.get(6)?,
            price: row.get(7)?,
            link: row.get(8)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn list_bms(conn: &Connection) -> Result<Vec<Bms>> {
    let mut stmt = conn.prepare(
        "SELECT brand, model, max_cells, vdc_min, vdc_max, a_max, temp_min, temp_max,
             master_price, slave_price, link
         FROM bms ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(Bms {
            brand: row.get(0)?,
            model: row.get(1)?,
            max_cells: row.get(2)?,
            vdc_min: row.get(3)?,
            vdc_max: row.get(4)?,
            a_max: row.get(5)?,
            temp_min: row.get(6)?,
            temp_max: row.get(7)?,
            master_price: row.get(8)?,
            slave_price: row.get(9)?,
            link: row.get(10)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Load the stored catalogue, preserving insertion order in every pool
pub fn load_catalogue(conn: &Connection) -> Result<Catalogue> {
    let fuses = list_rated(conn, "fuses")?
        .into_iter()
        .map(|(brand, model, vdc_max, a_max, temp_min, temp_max, price, link)| Fuse {
            brand,
            model,
            vdc_max,
            a_max,
            temp_min,
            temp_max,
            price,
            link,
        })
        .collect();
    let relays = list_rated(conn, "relays")?
        .into_iter()
        .map(|(brand, model, vdc_max, a_max, temp_min, temp_max, price, link)| Relay {
            brand,
            model,
            vdc_max,
            a_max,
            temp_min,
            temp_max,
            price,
            link,
        })
        .collect();
    let shunts = list_rated(conn, "shunts")?
        .into_iter()
        .map(|(brand, model, vdc_max, a_max, temp_min, temp_max, price, link)| Shunt {
            brand,
            model,
            vdc_max,
            a_max,
            temp_min,
            temp_max,
            price,
            link,
        })
        .collect();

    Ok(Catalogue::new(
        list_cells(conn)?,
        ComponentPools {
            fuses,
            relays,
            cables: list_cables(conn)?,
            bms: list_bms(conn)?,
            shunts,
        },
    ))
}

/// Number of stored cells
pub fn count_cells(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM cells", [], |row| row.get(0))?;
    Ok(usize::try_from(count)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn builtin_catalogue_round_trips() {
        let mut conn = memory_db();
        let catalogue = Catalogue::builtin();
        store_catalogue(&mut conn, &catalogue).unwrap();

        assert_eq!(count_cells(&conn).unwrap(), 30);
        assert_eq!(load_catalogue(&conn).unwrap(), catalogue);
    }

    #[test]
    fn clear_empties_every_table() {
        let mut conn = memory_db();
        store_catalogue(&mut conn, &Catalogue::builtin()).unwrap();
        clear_catalogue(&conn).unwrap();

        let loaded = load_catalogue(&conn).unwrap();
        assert!(loaded.cells.is_empty());
        assert!(loaded.components.is_empty());
    }

    #[test]
    fn schema_init_is_idempotent() {
        let conn = memory_db();
        init_schema(&conn).unwrap();
        assert_eq!(count_cells(&conn).unwrap(), 0);
    }

    #[test]
    fn insertion_order_is_kept() {
        let conn = memory_db();
        let catalogue = Catalogue::builtin();
        for cell in catalogue.cells.iter().rev() {
            insert_cell(&conn, cell).unwrap();
        }
        let models: Vec<String> = list_cells(&conn).unwrap().into_iter().map(|c| c.model).collect();
        let expected: Vec<String> = catalogue.cells.iter().rev().map(|c| c.model.clone()).collect();
        assert_eq!(models, expected);
    }
}
