use frozen_rl::{
    algo::{SarsaConfig, SarsaLearner, SelectPolicy},
    gym::FrozenLake,
    metrics::MetricsTarget,
    run::{RunOptions, Trainer},
};

fn main() -> frozen_rl::Result<()> {
    env_logger::init();

    let learner = SarsaLearner::new(SarsaConfig {
        episodes: 500,
        select: SelectPolicy::Random,
        ..Default::default()
    });
    let mut trainer = Trainer::new(FrozenLake::new(), learner);

    let metrics = trainer.execute(&RunOptions {
        label: "sarsa frozen lake".to_string(),
        metrics: MetricsTarget::Memory,
    })?;

    if let Some(csv) = metrics {
        print!("{csv}");
    }
    Ok(())
}
