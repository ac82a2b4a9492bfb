//! Lane Survivor headless entry point
//!
//! Runs one autopiloted session and prints the results.

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

/// Play one autopiloted run of Lane Survivor and print the results.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Seconds of simulated play before stopping.
    #[arg(value_name = "SECONDS", default_value_t = 120.0, value_parser = parse_seconds)]
    seconds: f32,
    /// Difficulty level, 1 (easiest) to 6 (INSANE).
    #[arg(
        value_name = "DIFFICULTY",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(1..=6)
    )]
    difficulty: u8,
    /// Use the single wide lane instead of the three-lane layout.
    #[arg(long)]
    single: bool,
    /// Seed for the simulation RNG.
    #[arg(long, value_name = "N", default_value_t = 0x5EED)]
    seed: u64,
    /// Directory holding save.json and settings.json. Nothing is persisted without it.
    #[arg(long = "save-dir", value_name = "DIR")]
    save_dir: Option<std::path::PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_seconds(raw: &str) -> Result<f32, String> {
    let seconds: f32 = raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("expected a positive duration, got {raw}"));
    }
    Ok(seconds)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lane_survivor::Session;
    use lane_survivor::audio::LogAudio;
    use lane_survivor::consts::SIM_DT;
    use lane_survivor::persistence::MetaProgress;
    use lane_survivor::sim::{ArenaLayout, Difficulty, GamePhase, TickInput};

    let args = CliArgs::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Lane Survivor (headless) starting, seed {:#x}", args.seed);

    let viewport = (800.0, 1000.0);
    let mut session = match &args.save_dir {
        Some(dir) => Session::with_storage(args.seed, viewport, dir, Box::new(LogAudio::default())),
        None => Session::new(
            args.seed,
            viewport,
            lane_survivor::Settings::default(),
            MetaProgress::default(),
            Box::new(LogAudio::default()),
        ),
    };
    let layout = if args.single { ArenaLayout::SingleLane } else { ArenaLayout::ThreeLane };
    session.set_layout(layout);
    session.settings.difficulty = Difficulty::new(usize::from(args.difficulty) - 1);
    session.start_run();

    let frame_ms = SIM_DT as f64 * 1000.0;
    let mut now_ms = 0.0_f64;
    while session.phase() == GamePhase::Playing && session.world.run_time < args.seconds {
        let input = TickInput {
            lateral_axis: autopilot(&session.world),
            ..Default::default()
        };
        session.frame(now_ms, &input);
        now_ms += frame_ms;
    }

    let hud = session.hud();
    println!("\n=== {} ===", if session.phase() == GamePhase::GameOver { "GAME OVER" } else { "TIME UP" });
    println!("Difficulty: {}", hud.difficulty);
    println!("Survived:   {:.1}s", hud.run_time);
    println!("Health:     {:.0}%", hud.health_fraction() * 100.0);
    println!("Wave:       {}", hud.wave);
    println!("Kills:      {}", hud.kills);
    println!("Coins:      {}", hud.coins);
    println!("Lives:      {}", hud.lives);
    println!("Allies:     {}", hud.allies);
    println!("Score:      {}", hud.score);
    println!("Bank:       {}", session.meta().coins);
}

/// Chase the lowest adversary in the lane
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(world: &lane_survivor::sim::SimulationWorld) -> f32 {
    let Some(threat) = world.adversaries.live().max_by(|a, b| a.pos.y.total_cmp(&b.pos.y)) else {
        return 0.0;
    };
    let dx = threat.pos.x - world.player.pos.x;
    if dx.abs() < 5.0 { 0.0 } else { dx.signum() }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
