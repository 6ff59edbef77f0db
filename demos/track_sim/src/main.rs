use argh::FromArgs;
use siamtrack::tracker::{
    episode::centered_bbox, run_episode, DiscreteCamera, Environment, PooledEmbedding,
    SiamTracker, SyntheticConfig, SyntheticEnvironment, TrackerConfig,
};

/// Runs the tracker and the discrete camera against a synthetic scene
#[derive(Debug, FromArgs)]
struct Args {
    /// path to a JSON tracker configuration
    #[argh(option, short = 'c')]
    config: Option<std::path::PathBuf>,

    /// maximum number of steps per episode
    #[argh(option, short = 'm', default = "500")]
    max_steps: usize,

    /// number of episodes to run
    #[argh(option, short = 'n', default = "1")]
    episodes: usize,

    /// seed of the target motion of the first episode
    #[argh(option, short = 's', default = "1")]
    seed: u64,

    /// dead-zone radius as a fraction of the shorter frame side
    #[argh(option, short = 'd', default = "0.2")]
    deadzone: f32,

    /// largest per-step target motion in pixels
    #[argh(option, default = "3.0")]
    drift: f32,

    /// side of the initial bounding box in pixels
    #[argh(option, default = "36.0")]
    init_side: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => TrackerConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => TrackerConfig::default(),
    };
    log::info!("tracker config: {}", serde_json::to_string(&config)?);

    let camera = DiscreteCamera::new(args.deadzone);

    let mut results = Vec::with_capacity(args.episodes);
    for i in 0..args.episodes {
        println!("Test {i} is running......");

        let mut env = SyntheticEnvironment::new(SyntheticConfig {
            drift: args.drift,
            max_steps: args.max_steps,
            seed: args.seed + i as u64,
            ..Default::default()
        });
        let mut tracker = SiamTracker::new(config, PooledEmbedding::new(config.stride))?;
        let init_bbox = centered_bbox(env.frame_size(), args.init_side);

        let stats = run_episode(&mut env, &mut tracker, &camera, &init_bbox, args.max_steps)?;
        results.push(stats);

        println!("Test {i} finished.");
    }

    println!("AR;\tEL");
    for stats in &results {
        println!("{:.3};\t{}", stats.accumulated_reward, stats.episode_length);
    }

    Ok(())
}
