//! Eco-factory headless runner
//!
//! Places factories, lets a seeded scripted player feed them garbage and buy
//! upgrades, and reports where the pollution ends up.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eco_core::pollution::pollutes;
use eco_core::{
    default_config_toml, EcologyCategory, FactoryConfigTable, FactoryKind, Scenario,
    ScenarioConfig, Session, SnapshotGenerator, SnapshotWriter, DEFAULT_CONFIG_PATH,
};

/// Command line arguments for the runner
#[derive(Parser, Debug)]
#[command(name = "ecofactory")]
#[command(about = "Headless eco-factory simulation")]
struct Args {
    /// Factory configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seconds of simulated time per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Random seed for the scripted player
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Factory kinds to place, comma separated
    #[arg(long, value_delimiter = ',', default_value = "air,forest,water")]
    factories: Vec<FactoryKind>,

    /// Currency available at the start
    #[arg(long, default_value_t = 100)]
    starting_money: u64,

    /// Currency earned every tick
    #[arg(long, default_value_t = 1)]
    income_per_tick: u64,

    /// Chance per factory per tick that garbage is delivered
    #[arg(long, default_value_t = 0.1)]
    delivery_chance: f32,

    /// Largest single garbage delivery
    #[arg(long, default_value_t = 40.0)]
    max_delivery: f32,

    /// Buy upgrades as soon as they are affordable
    #[arg(long)]
    auto_upgrade: bool,

    /// Interval between snapshots (in ticks, 0 disables)
    #[arg(long, default_value_t = 100)]
    snapshot_interval: u64,

    /// Directory for snapshot output
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the built-in factory configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecofactory=info,eco_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if args.print_default_config {
        match default_config_toml() {
            Ok(toml) => print!("{}", toml),
            Err(e) => {
                error!("Could not render default config: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

/// Loads the factory table from the given path, the default path, or the built-in table.
fn load_config(path: Option<&Path>) -> Result<FactoryConfigTable, eco_core::ConfigError> {
    match path {
        Some(path) => {
            info!("Loading factory config from {}", path.display());
            FactoryConfigTable::from_file(path)
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            info!("Loading factory config from {}", DEFAULT_CONFIG_PATH);
            FactoryConfigTable::from_file(DEFAULT_CONFIG_PATH)
        }
        None => {
            info!("Using built-in factory config");
            Ok(FactoryConfigTable::default())
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_config(args.config.as_deref())?;

    info!("Seed: {}", args.seed);
    info!("Ticks: {} x {}s", args.ticks, args.dt);

    let mut session = Session::new(table, args.starting_money);
    let configured: Vec<&str> = session
        .config()
        .kinds()
        .into_iter()
        .map(|kind| kind.as_str())
        .collect();
    info!("Configured kinds: {}", configured.join(", "));
    for kind in &args.factories {
        let id = session.place_factory(*kind)?;
        info!("  Placed {} factory ({})", kind, id);
    }
    if session.factory_count() == 0 {
        warn!("No factories placed; nothing will burn");
    }

    let mut scenario = Scenario::new(
        ScenarioConfig {
            delivery_chance: args.delivery_chance,
            max_delivery: args.max_delivery,
            income_per_tick: args.income_per_tick,
            auto_upgrade: args.auto_upgrade,
        },
        args.seed,
    );
    debug!("Scenario: {:?}", scenario.config());

    let writer = args
        .output
        .as_ref()
        .map(|dir| SnapshotWriter::new(dir.clone()))
        .transpose()?;
    let mut generator = SnapshotGenerator::new(args.snapshot_interval);

    if let Some(writer) = &writer {
        let snapshot = generator.capture(&session, "simulation_start");
        writer.write_snapshot(&snapshot)?;
        writer.write_current_state(&snapshot)?;
        info!("Writing snapshots to {}", writer.output_dir().display());
    }

    let mut delivered = 0.0f32;
    let mut discarded = 0.0f32;
    let mut upgrades = 0u32;

    for _ in 0..args.ticks {
        let report = scenario.apply(&mut session);
        delivered += report.delivered;
        discarded += report.discarded;
        upgrades += report.upgrades;

        session.tick(args.dt);
        let tick = session.current_tick();

        if let Some(writer) = &writer {
            if generator.should_snapshot(tick) {
                let snapshot = generator.capture(&session, "periodic");
                if let Err(e) = writer.write_snapshot(&snapshot) {
                    warn!("Could not write snapshot at tick {}: {}", tick, e);
                }
                if let Err(e) = writer.write_current_state(&snapshot) {
                    warn!("Could not write current state at tick {}: {}", tick, e);
                }
            }
        }

        if tick % 100 == 0 {
            let ecology = session.ecology();
            info!(
                "Tick {} / {} - money {}, dissatisfaction {:.2}, pollution air {:.2} forest {:.2} water {:.2}",
                tick,
                args.ticks,
                session.money().amount(),
                session.dissatisfaction().level(),
                ecology.level(EcologyCategory::Air),
                ecology.level(EcologyCategory::Forest),
                ecology.level(EcologyCategory::Water),
            );
        }
    }

    if let Some(writer) = &writer {
        // A periodic snapshot on the final tick already holds the end state
        if !generator.captured(session.current_tick()) {
            let snapshot = generator.capture(&session, "simulation_end");
            writer.write_snapshot(&snapshot)?;
            writer.write_current_state(&snapshot)?;
        }
        info!("Generated {} snapshots.", generator.snapshot_count());
    }

    let summary = session.snapshot("summary", "simulation_end");
    info!(
        "Simulation complete. Ran {} ticks ({:.1}s simulated).",
        summary.tick, summary.elapsed_seconds
    );
    info!(
        "Garbage delivered {:.1}, discarded {:.1}, upgrades bought {}",
        delivered, discarded, upgrades
    );
    info!(
        "{} of {} factories burning, {:.1} garbage in storage",
        summary.burning_count(),
        summary.factories.len(),
        summary.total_stored()
    );
    for factory in &summary.factories {
        info!(
            "  factory_{:03} {}: storage {:.0}% of {}, tier {}/{}{}",
            factory.factory_id,
            factory.kind,
            factory.fill_ratio() * 100.0,
            factory.storage_capacity,
            factory.current_upgrade,
            factory.upgrade_count,
            if factory.is_fully_upgraded() { " (max)" } else { "" }
        );
    }
    for category in EcologyCategory::ALL {
        let sources: Vec<&str> = summary
            .factories
            .iter()
            .map(|factory| factory.kind)
            .filter(|&kind| pollutes(kind, category))
            .map(|kind| kind.as_str())
            .collect();
        info!(
            "  {} pollution {:.2} from [{}]",
            category,
            summary.ecology.level(category),
            sources.join(", ")
        );
    }
    info!(
        "Final ecology total {:.2}; dissatisfaction {:.2}; money {}",
        summary.ecology.total(),
        summary.dissatisfaction,
        summary.money
    );

    Ok(())
}
