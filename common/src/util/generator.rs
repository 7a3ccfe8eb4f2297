use rand::Rng;
use std::fs::File;
use std::io::Write;

/// Writes a random placed benchmark in the STN format. Cells are placed
/// uniformly over a die sized for a fixed utilisation; every net gets one
/// driver and a small random fanout.
pub fn generate_random_netlist(
    filename: &str,
    num_cells: usize,
    num_nets: usize,
) -> std::io::Result<()> {
    let mut file = File::create(filename)?;
    let mut rng = rand::thread_rng();

    let cell_w = 1.5;
    let cell_h = 2.0;
    let target_utilization = 0.40;
    let total_cell_area = num_cells as f64 * cell_w * cell_h;
    let die_side = (total_cell_area / target_utilization).sqrt();
    let die_w = die_side.max(20.0);
    let die_h = die_side.max(20.0);

    log::info!(
        "Generating Benchmark: {} cells, {} nets, Die: {:.1}x{:.1}",
        num_cells,
        num_nets,
        die_w,
        die_h
    );

    writeln!(file, "VERSION 1 ;")?;
    writeln!(file, "DESIGN random ;")?;
    writeln!(file, "DIEAREA ( 0 0 ) ( {:.3} {:.3} ) ;", die_w, die_h)?;

    writeln!(file, "COMPONENTS {} ;", num_cells)?;
    for i in 0..num_cells {
        let x = rng.gen_range(0.0..die_w - cell_w);
        let y = rng.gen_range(0.0..die_h - cell_h);
        writeln!(
            file,
            "- inst{} {} {} ( {:.3} {:.3} ) ;",
            i, cell_w, cell_h, x, y
        )?;
    }
    writeln!(file, "END COMPONENTS")?;

    writeln!(file, "NETS {} ;", num_nets)?;
    for i in 0..num_nets {
        write!(file, "- net{} ", i)?;

        let driver = rng.gen_range(0..num_cells);
        write!(
            file,
            "+ DRIVER ( inst{} {:.2} {:.2} ) ",
            driver,
            cell_w * 0.75,
            cell_h * 0.5
        )?;

        let fanout = rng.gen_range(1..=6);
        for _ in 0..fanout {
            let sink = rng.gen_range(0..num_cells);
            write!(
                file,
                "+ SINK ( inst{} {:.2} {:.2} ) ",
                sink,
                cell_w * 0.25,
                cell_h * 0.5
            )?;
        }
        writeln!(file, ";")?;
    }
    writeln!(file, "END NETS")?;
    writeln!(file, "END DESIGN")?;
    Ok(())
}
