//! Railshot headless runner
//!
//! Loads one stage from the data directory and lets the autopilot play it at
//! a fixed 60 Hz frame rate, then reports the result into a save profile.
//!
//! ```text
//! railshot [STAGE_ID] [--data DIR] [--seed N] [--difficulty easy|normal|hard]
//!          [--config FILE] [--save FILE]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::path::PathBuf;
    use std::sync::Arc;

    use log::{debug, info, warn};

    use railshot::consts::SIM_DT;
    use railshot::progress::Progress;
    use railshot::settings::{Difficulty, EngineConfig};
    use railshot::sim::{EnemyRegistry, FrameClock, RunSetup, StageRun, TickInput, run_frame};
    use railshot::stage::{StageCatalog, load_stage_file, stage_path};

    /// Give up on runs that never reach a terminal phase
    const MAX_FRAMES: u32 = 60 * 600;

    struct Args {
        stage_id: String,
        data_dir: PathBuf,
        seed: u64,
        difficulty: Option<Difficulty>,
        config: Option<PathBuf>,
        save: Option<PathBuf>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = Args {
            stage_id: "city_1".to_string(),
            data_dir: PathBuf::from("data"),
            seed: RunSetup::default().seed,
            difficulty: None,
            config: None,
            save: None,
        };
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next().ok_or_else(|| format!("{flag} needs a value"))
            };
            match arg.as_str() {
                "--data" => args.data_dir = PathBuf::from(value("--data")?),
                "--seed" => {
                    let raw = value("--seed")?;
                    args.seed = raw.parse().map_err(|_| format!("bad seed: {raw}"))?;
                }
                "--difficulty" => {
                    let raw = value("--difficulty")?;
                    let difficulty = Difficulty::parse(&raw)
                        .ok_or_else(|| format!("unknown difficulty: {raw}"))?;
                    args.difficulty = Some(difficulty);
                }
                "--config" => args.config = Some(PathBuf::from(value("--config")?)),
                "--save" => args.save = Some(PathBuf::from(value("--save")?)),
                flag if flag.starts_with("--") => return Err(format!("unknown flag: {flag}")),
                _ => args.stage_id = arg.clone(),
            }
        }
        Ok(args)
    }

    fn load_config(args: &Args) -> Result<EngineConfig, Box<dyn Error>> {
        let mut config = match &args.config {
            Some(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => EngineConfig::default(),
        };
        if let Some(difficulty) = args.difficulty {
            config.difficulty = difficulty;
        }
        Ok(config)
    }

    fn load_progress(args: &Args) -> Result<Progress, Box<dyn Error>> {
        match &args.save {
            Some(path) if path.exists() => Ok(Progress::from_json(&std::fs::read_to_string(path)?)?),
            _ => Ok(Progress::default()),
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let args = parse_args()?;
        let config = load_config(&args)?;
        let mut progress = load_progress(&args)?;

        let catalog_path = args.data_dir.join("stages.json");
        let catalog = match StageCatalog::load(&catalog_path) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                warn!("No stage catalog at {}: {e}", catalog_path.display());
                None
            }
        };
        if let Some(catalog) = &catalog {
            match catalog.find(&args.stage_id) {
                Some((zone, entry)) => info!("Stage {} ({zone}: {})", entry.id, entry.name),
                None => warn!("Stage {} is not listed in the catalog", args.stage_id),
            }
        }

        let enemies = EnemyRegistry::default();
        let path = stage_path(&args.data_dir, &args.stage_id);
        let (stage, skipped) = load_stage_file(&path, &enemies, config.load_policy)?;
        for e in &skipped {
            warn!("Dropped timeline entry: {e}");
        }

        let setup = RunSetup {
            config,
            enemies: Arc::new(enemies),
            unlocked: progress.unlocked_weapons(),
            seed: args.seed,
        };
        let mut run = StageRun::new(Arc::new(stage), setup);
        let mut clock = FrameClock::new();
        let mut input = TickInput {
            intro_complete: true,
            autopilot: true,
            ..Default::default()
        };

        let mut frames = 0;
        while !run.phase.is_terminal() && frames < MAX_FRAMES {
            run_frame(&mut run, &mut clock, &mut input, SIM_DT);
            for event in &run.events {
                debug!("{:.2}s {event:?}", run.elapsed);
            }
            frames += 1;
        }

        let Some(completion) = run.report_completion(&mut progress) else {
            warn!(
                "Stage {} still in {:?} after {frames} frames",
                run.stage.id, run.phase
            );
            return Ok(());
        };
        for diagnostic in &run.diagnostics {
            warn!(
                "Event {} at {:.2}s was skipped: {}",
                diagnostic.event_index, diagnostic.time, diagnostic.error
            );
        }

        println!(
            "{} {:?}: score {} | coins {} | rescues {} | stars {} | accuracy {:.0}% | {:.1}s",
            completion.stage_id,
            completion.outcome,
            completion.score,
            completion.coins,
            completion.rescues,
            completion.stars,
            completion.stats.accuracy() * 100.0,
            completion.time
        );

        if let Some(next) = catalog.as_ref().and_then(|c| c.next_after(&completion.stage_id)) {
            info!("Next stage: {} ({})", next.name, next.id);
        }

        if let Some(path) = &args.save {
            std::fs::write(path, progress.to_json()?)?;
            info!("Progress saved to {}", path.display());
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Railshot (headless) starting...");
    if let Err(e) = native::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web; hosts drive the library directly
}
