#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Lane Siege battles and manages
//! stage files.

mod stage_transfer;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lane_siege_core::{
    BattleConfig, BuildingKind, Event, PlayMode, SpeciesId, StageConfig, Team, Vec2,
};
use lane_siege_system_stages::{export_string, import_str, Imported};
use lane_siege_world::{
    advance, assign_species, commit_placement, load_stages, query, set_play_mode, World,
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "lane-siege", version, about = "Headless lane defense battles")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run a battle without rendering and print a summary.
    Simulate(SimulateArgs),
    /// List the buildings a team can place.
    Buildings,
    /// Create, encode and decode stage lists.
    Stages {
        #[command(subcommand)]
        cmd: StagesCmd,
    },
}

#[derive(clap::Args, Debug)]
struct SimulateArgs {
    /// TOML file overriding battle tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stage list as a JSON file or a `stages:v1:` share string.
    #[arg(long)]
    stages: Option<String>,
    /// Simulated seconds to run before stopping.
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,
    /// Player building as `kind@x,y`; may be repeated.
    #[arg(long = "place", value_parser = parse_placement)]
    placements: Vec<Placement>,
    /// Species assigned to every player nest placed with `--place`.
    #[arg(long, value_parser = parse_species)]
    nest_species: Option<SpeciesId>,
    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum StagesCmd {
    /// Print the default stage list as JSON.
    Template {
        /// Use the boss battle layout.
        #[arg(long)]
        boss: bool,
    },
    /// Turn a JSON stage file into a share string.
    Encode {
        /// JSON stage file.
        file: PathBuf,
    },
    /// Turn a share string back into JSON.
    Decode {
        /// Share string starting with `stages:v1:`.
        value: String,
    },
}

#[derive(Clone, Copy, Debug)]
struct Placement {
    kind: BuildingKind,
    point: Vec2,
}

fn parse_placement(value: &str) -> Result<Placement, String> {
    let (kind, coordinates) = value
        .split_once('@')
        .ok_or_else(|| format!("expected kind@x,y, got '{value}'"))?;
    let kind = BuildingKind::from_key(kind.trim())
        .ok_or_else(|| format!("unknown building kind '{kind}'"))?;
    let (x, y) = coordinates
        .split_once(',')
        .ok_or_else(|| format!("expected x,y coordinates, got '{coordinates}'"))?;
    let x: f32 = x.trim().parse().map_err(|_| format!("invalid x '{x}'"))?;
    let y: f32 = y.trim().parse().map_err(|_| format!("invalid y '{y}'"))?;
    Ok(Placement {
        kind,
        point: Vec2::new(x, y),
    })
}

fn parse_species(value: &str) -> Result<SpeciesId, String> {
    SpeciesId::from_key(value.trim()).ok_or_else(|| format!("unknown species '{value}'"))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

/// Entry point for the Lane Siege command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Simulate(args) => simulate(args),
        Cmd::Buildings => {
            list_buildings();
            Ok(())
        }
        Cmd::Stages { cmd } => stages(cmd),
    }
}

fn list_buildings() {
    for kind in BuildingKind::ALL {
        let stats = kind.stats();
        println!("{} ({})", stats.name, kind.key());
        println!("  {}", stats.description);
        println!(
            "  hp {} size {}x{} build time {}s",
            stats.max_hp,
            stats.size.x,
            stats.size.y,
            stats.construction_time.as_secs_f32()
        );
    }
}

fn stages(cmd: StagesCmd) -> Result<()> {
    match cmd {
        StagesCmd::Template { boss } => {
            println!("{}", export_string(&StageConfig::new(boss)));
        }
        StagesCmd::Encode { file } => {
            let imported = read_stage_file(&file)?;
            println!("{}", stage_transfer::encode(&imported.config));
        }
        StagesCmd::Decode { value } => {
            let imported = stage_transfer::decode(&value).context("decoding share string")?;
            report_discarded(&imported);
            println!("{}", export_string(&imported.config));
        }
    }
    Ok(())
}

fn read_stage_file(path: &Path) -> Result<Imported> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading stage file {}", path.display()))?;
    let imported =
        import_str(&text).with_context(|| format!("importing stages from {}", path.display()))?;
    report_discarded(&imported);
    Ok(imported)
}

fn report_discarded(imported: &Imported) {
    if imported.discarded > 0 {
        warn!(discarded = imported.discarded, "skipped malformed stage entries");
    }
}

fn load_config(path: &Path) -> Result<BattleConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_stage_source(source: &str) -> Result<Imported> {
    if stage_transfer::is_share_string(source) {
        let imported = stage_transfer::decode(source).context("decoding share string")?;
        report_discarded(&imported);
        Ok(imported)
    } else {
        read_stage_file(Path::new(source))
    }
}

/// Totals reported once a simulated battle stops.
#[derive(Debug, Default, Serialize)]
struct Summary {
    elapsed_seconds: f32,
    ticks: u64,
    stage: String,
    result: Option<&'static str>,
    player_base_hp_percent: u32,
    enemy_base_hp_percent: u32,
    creatures_spawned: usize,
    creatures_died: usize,
    projectiles_fired: usize,
    structures_destroyed: usize,
    placements_rejected: usize,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::CreatureSpawned { .. } => self.creatures_spawned += 1,
                Event::CreatureDied { .. } => self.creatures_died += 1,
                Event::ProjectileFired { .. } => self.projectiles_fired += 1,
                Event::StructureDestroyed { .. } => self.structures_destroyed += 1,
                Event::PlacementRejected { .. } => self.placements_rejected += 1,
                _ => {}
            }
        }
    }

    fn print_text(&self) {
        println!("{}", self.stage);
        println!(
            "elapsed: {:.2}s over {} ticks",
            self.elapsed_seconds, self.ticks
        );
        println!(
            "bases: player {}% enemy {}%",
            self.player_base_hp_percent, self.enemy_base_hp_percent
        );
        println!(
            "creatures: {} spawned, {} died",
            self.creatures_spawned, self.creatures_died
        );
        println!("projectiles fired: {}", self.projectiles_fired);
        println!("structures destroyed: {}", self.structures_destroyed);
        if self.placements_rejected > 0 {
            println!("placements rejected: {}", self.placements_rejected);
        }
        println!("result: {}", self.result.unwrap_or("undecided"));
    }
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let budget = Duration::try_from_secs_f32(args.seconds)
        .context("--seconds must be a non-negative number")?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => BattleConfig::default(),
    };
    let step = config.max_step();
    if step.is_zero() {
        bail!("max_step_seconds must be positive to run a simulation");
    }

    let mut world = World::with_config(config);
    let mut events = Vec::new();
    let mut summary = Summary::default();
    if !args.json {
        println!("{}", query::welcome_banner(&world));
    }

    if let Some(source) = &args.stages {
        let imported = load_stage_source(source)?;
        load_stages(&mut world, imported.config, &mut events);
    }

    let mut elapsed = Duration::ZERO;
    let mut ticks = 0u64;
    for placement in &args.placements {
        // Wait out the running timer for this kind before building again.
        while query::construction_status(&world, Team::Player, placement.kind).is_some() {
            advance(&mut world, step, &mut events);
            elapsed += step;
            ticks += 1;
        }
        let Some(id) = commit_placement(
            &mut world,
            Team::Player,
            placement.kind,
            placement.point,
            &mut events,
        ) else {
            warn!(
                kind = placement.kind.key(),
                x = placement.point.x,
                y = placement.point.y,
                "placement rejected"
            );
            continue;
        };
        if let (BuildingKind::Nest, Some(species)) = (placement.kind, args.nest_species) {
            if !assign_species(&mut world, id, species, &mut events) {
                warn!(nest = id.get(), species = species.key(), "species assignment rejected");
            }
        }
    }
    summary.record(&events);
    events.clear();

    set_play_mode(&mut world, PlayMode::Battle, &mut events);
    let mut simulated = Duration::ZERO;
    info!(seconds = args.seconds, "battle started");
    while simulated < budget && !query::is_game_over(&world) {
        let dt = step.min(budget - simulated);
        advance(&mut world, dt, &mut events);
        simulated += dt;
        ticks += 1;
        summary.record(&events);
        events.clear();
    }

    summary.elapsed_seconds = (elapsed + simulated).as_secs_f32();
    summary.ticks = ticks;
    summary.stage = query::stage_label(&world);
    summary.result = query::result_label(&world);
    summary.player_base_hp_percent = query::base_hp_percent(&world, Team::Player);
    summary.enemy_base_hp_percent = query::base_hp_percent(&world, Team::Enemy);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serializing summary")?
        );
    } else {
        summary.print_text();
    }
    Ok(())
}
