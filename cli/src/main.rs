use clap::{Parser, Subcommand};
use rst_common::db::core::NetlistDB;
use rst_common::db::parser;
use rst_common::util::config::Config;
use rst_common::util::{check, generator, logger, visualization};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a Steiner tree for every net of the input netlist.
    Build,
    /// Write a random placed benchmark to inputs/random.stn.
    Generate {
        #[arg(long, default_value_t = 500)]
        cells: usize,
        #[arg(long, default_value_t = 500)]
        nets: usize,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    let config = if args.config.exists() {
        log::info!("Loading configuration from {:?}", args.config);
        let config_str = std::fs::read_to_string(&args.config)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            args.config
        );
        Config::default()
    };

    let command = args.command.unwrap_or(Commands::Build);

    match command {
        Commands::Generate { cells, nets } => {
            if let Some(parent) = Path::new("inputs/random.stn").parent()
                && !parent.exists()
            {
                std::fs::create_dir_all(parent)?;
            }
            log::info!("Generating random benchmark...");
            generator::generate_random_netlist("inputs/random.stn", cells, nets)?;
        }
        Commands::Build => {
            if !Path::new(&config.input.netlist_file).exists() {
                return Err(anyhow::anyhow!(
                    "Input netlist missing: '{}'. Did you run 'generate'?",
                    config.input.netlist_file
                ));
            }
            prepare_output_dir(&config.input.output_dir)?;
            run_build(&config)?;
        }
    }

    Ok(())
}

fn prepare_output_dir(dir: &str) -> anyhow::Result<()> {
    let path = Path::new(dir);
    if !path.exists() {
        log::info!("Creating output directory: {:?}", path);
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

fn run_build(config: &Config) -> anyhow::Result<()> {
    let mut db = NetlistDB::new();

    log::info!("Parsing netlist: {}", config.input.netlist_file);
    parser::parse(&mut db, &config.input.netlist_file).map_err(|e| {
        anyhow::anyhow!(
            "Invalid netlist syntax in '{}': {}",
            config.input.netlist_file,
            e
        )
    })?;
    log::info!(
        "Loaded {} cells, {} nets, {} pins",
        db.num_cells(),
        db.num_nets(),
        db.num_pins()
    );

    rst_steiner::run(&mut db, &config.steiner).map_err(|e| anyhow::anyhow!(e))?;

    check::run(&db, config.steiner.gcell_size)
        .map_err(|e| anyhow::anyhow!("Verification Failed: {}", e))?;

    log::info!("Generating tree visualization...");
    let png_path = format!("{}/steiner.png", config.input.output_dir);
    visualization::draw_steiner_trees(&db, config.steiner.gcell_size, &png_path, 2000, 2000);

    let routed_path = format!("{}/routed.stn", config.input.output_dir);
    log::info!("Writing routed netlist to {}", routed_path);
    save_routes(&db, &routed_path)?;

    Ok(())
}

fn save_routes(db: &NetlistDB, filename: &str) -> std::io::Result<()> {
    use std::io::Write;
    let mut file = std::fs::File::create(filename)?;

    writeln!(file, "NETS {} ;", db.num_nets())?;
    for net in &db.nets {
        writeln!(file, "- {} ;", net.name)?;
        for seg in &net.route_segments {
            writeln!(
                file,
                "  + SEG ( {} {} ) ( {} {} )",
                seg.p1.x, seg.p1.y, seg.p2.x, seg.p2.y
            )?;
        }
    }
    writeln!(file, "END NETS")?;
    Ok(())
}
