//! Read and write evaluation files

mod parm;
mod plot;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub use parm::read_parameters;
pub use plot::{write_fixed_cell_plot, write_utilization_plot};

use crate::density::DensityMap;
use crate::error::Result;
use crate::params::Parameters;
use crate::timing::write_netlist;
use crate::Circuit;

/// Name of the utilization plot script
pub const UTILIZATION_PLOT_FILE: &str = "grid.plt";

/// Name of the fixed cell plot script
pub const FIXED_CELL_PLOT_FILE: &str = "circuit.plt";

/// Read evaluation parameters from a file
pub fn read_parameter_file(path: &Path) -> Result<Parameters> {
    let f = File::open(path)?;
    read_parameters(f)
}

/// Write the timer netlist of a circuit to a file
pub fn write_netlist_file(path: &Path, circuit: &Circuit, params: &Parameters) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_netlist(&mut w, circuit, params)?;
    w.flush()?;
    Ok(())
}

/// Write the gnuplot scripts of the density map in a directory
pub fn write_density_plots(dir: &Path, map: &DensityMap) -> Result<()> {
    let mut w = BufWriter::new(File::create(dir.join(UTILIZATION_PLOT_FILE))?);
    write_utilization_plot(&mut w, map)?;
    w.flush()?;
    let mut w = BufWriter::new(File::create(dir.join(FIXED_CELL_PLOT_FILE))?);
    write_fixed_cell_plot(&mut w, map)?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_parameter_file, write_density_plots, write_netlist_file};
    use super::{FIXED_CELL_PLOT_FILE, UTILIZATION_PLOT_FILE};
    use crate::circuit::generators::testcases;
    use crate::density::DensityMap;
    use crate::params::Parameters;

    #[test]
    fn test_files() {
        let dir = tempfile::tempdir().unwrap();
        let parm = dir.path().join("ICCAD14.parm");
        std::fs::write(&parm, "ALPHA 2.0\n").unwrap();
        let params = read_parameter_file(&parm).unwrap();
        assert_eq!(params.alpha, 2.0);
        assert!(read_parameter_file(&dir.path().join("missing.parm")).is_err());

        let ckt = testcases::inverter_chain(3);
        let netlist = dir.path().join("feed.netlist");
        write_netlist_file(&netlist, &ckt, &params).unwrap();
        assert!(std::fs::read_to_string(&netlist)
            .unwrap()
            .contains("instance in01f01 a:u0/a o:u0/o"));

        let map = DensityMap::build(&ckt, &Parameters::default());
        write_density_plots(dir.path(), &map).unwrap();
        assert!(dir.path().join(UTILIZATION_PLOT_FILE).exists());
        assert!(dir.path().join(FIXED_CELL_PLOT_FILE).exists());
    }
}
