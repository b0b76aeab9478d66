//! Gnuplot scripts of the density map

use std::io::Write;

use crate::density::DensityMap;

/// Write a gnuplot script drawing the utilization of each bin
pub fn write_utilization_plot<W: Write>(w: &mut W, map: &DensityMap) -> std::io::Result<()> {
    writeln!(w, "set term png")?;
    writeln!(w, "set output \"grid.png\"")?;
    writeln!(w, "set autoscale fix")?;
    writeln!(w)?;
    writeln!(w, "set palette defined ( 0 '#000090',\\")?;
    for (i, color) in ["#000fff", "#0090ff", "#0fffee", "#90ff70", "#ffee00", "#ff7000", "#ee0000"]
        .iter()
        .enumerate()
    {
        writeln!(w, "                      {} '{}',\\", i + 1, color)?;
    }
    writeln!(w, "                      8 '#7f0000')")?;
    writeln!(w)?;
    writeln!(w, "plot '-' matrix with image t ''")?;
    for j in 0..map.nb_y() {
        for k in 0..map.nb_x() {
            write!(w, "{} ", map.utilization(k, j))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Write a gnuplot script drawing the bins that contain fixed cells in black
pub fn write_fixed_cell_plot<W: Write>(w: &mut W, map: &DensityMap) -> std::io::Result<()> {
    writeln!(w, "set term png")?;
    writeln!(w, "set output \"circuit.png\"")?;
    writeln!(w, "set autoscale fix")?;
    writeln!(w)?;
    writeln!(w, "set palette defined ( 0 0 0 0, 1 1 1 1 )")?;
    writeln!(w)?;
    writeln!(w, "plot '-' matrix with image t ''")?;
    for j in 0..map.nb_y() {
        for k in 0..map.nb_x() {
            let free = if map.bin(k, j).fixed_area > 0.0 { 0 } else { 1 };
            write!(w, "{} ", free)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{write_fixed_cell_plot, write_utilization_plot};
    use crate::circuit::generators::random;
    use crate::density::DensityMap;
    use crate::params::Parameters;

    #[test]
    fn test_plots() {
        let ckt = random::placement(200, 1);
        let map = DensityMap::build(&ckt, &Parameters::default());
        for fixed in [false, true] {
            let mut buf = Vec::new();
            if fixed {
                write_fixed_cell_plot(&mut buf, &map).unwrap();
            } else {
                write_utilization_plot(&mut buf, &map).unwrap();
            }
            let text = String::from_utf8(buf).unwrap();
            let (_, data) = text.split_once("plot '-' matrix with image t ''\n").unwrap();
            let rows: Vec<&str> = data.lines().collect();
            assert_eq!(rows.len(), map.nb_y());
            for r in rows {
                assert_eq!(r.split_whitespace().count(), map.nb_x());
            }
        }
    }
}
