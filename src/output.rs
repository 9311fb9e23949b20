//! Text output of a finished run, and summaries written to the log.

use crate::error::Error;
use crate::mesh::UniformMesh;
use crate::physics::{IdealGas, Primitive};
use crate::{Setup, NUM_FIELDS};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use tracing::info;

/// Number of leading zones reported by `log_summary`.
pub const SUMMARY_ZONES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
pub enum OutputFields {
    /// density, velocity, temperature
    Primitive,
    /// density, momentum, energy
    Conserved,
}

/// Writes one line `x f0 f1 f2` per zone.
pub fn write_table<W: Write>(writer: &mut W, mesh: &UniformMesh, data: &[f64]) -> Result<(), Error> {
    for (i, cell) in data.chunks_exact(NUM_FIELDS).enumerate() {
        writeln!(
            writer,
            "{:+.12e} {:+.12e} {:+.12e} {:+.12e}",
            mesh.cell_coordinate(i),
            cell[0],
            cell[1],
            cell[2]
        )?;
    }
    Ok(())
}

/// Writes the table to `<outdir>/shll.dat` and returns the file name.
pub fn write_table_file(outdir: &str, mesh: &UniformMesh, data: &[f64]) -> Result<String, Error> {
    create_dir_all(outdir)?;
    let filename = format!("{}/shll.dat", outdir);
    let mut writer = BufWriter::new(File::create(&filename)?);
    write_table(&mut writer, mesh, data)?;
    writer.flush()?;
    info!("write {}", filename);
    Ok(filename)
}

/// Logs the primitive state of the first few zones.
pub fn log_summary(primitive: &[f64]) {
    info!("first {} zones (density, velocity, temperature):", SUMMARY_ZONES);
    for (i, cell) in primitive.chunks_exact(NUM_FIELDS).take(SUMMARY_ZONES).enumerate() {
        info!("Cell [{}] state = {:.2}, {:.2}, {:.2}", i, cell[0], cell[1], cell[2]);
    }
}

/// Sum of each conserved component over the domain, `sum(U) dx`.
pub fn conserved_totals(mesh: &UniformMesh, conserved: &[f64]) -> [f64; 3] {
    let dx = mesh.dx();
    let mut totals = [0.0; 3];
    for cell in conserved.chunks_exact(NUM_FIELDS) {
        for q in 0..NUM_FIELDS {
            totals[q] += cell[q] * dx;
        }
    }
    totals
}

/// L1 norm of the density error against the setup's exact solution, or
/// `None` if the setup has none.
pub fn l1_density_error(
    setup: &dyn Setup,
    eos: &IdealGas,
    mesh: &UniformMesh,
    primitive: &[f64],
    time: f64,
) -> Option<f64> {
    let mut error = 0.0;
    for (i, cell) in primitive.chunks_exact(NUM_FIELDS).enumerate() {
        let exact = setup.reference_solution(eos, mesh.cell_center(i), time)?;
        error += (Primitive::from_slice(cell).density() - exact.density()).abs() * mesh.dx();
    }
    Some(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_one_line_per_zone_with_four_columns() {
        let mesh = UniformMesh::unit_interval(4);
        let data: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let mut bytes = Vec::new();
        write_table(&mut bytes, &mesh, &data).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);

        let row: Vec<f64> = lines[2].split_whitespace().map(|s| s.parse().unwrap()).collect();
        assert_eq!(row, vec![0.5, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn totals_are_weighted_by_zone_width() {
        let mesh = UniformMesh::unit_interval(4);
        let data = vec![1.0, 2.0, 3.0].repeat(4);
        let totals = conserved_totals(&mesh, &data);
        assert!((totals[0] - 1.0).abs() < 1e-15);
        assert!((totals[1] - 2.0).abs() < 1e-15);
        assert!((totals[2] - 3.0).abs() < 1e-15);
    }
}
