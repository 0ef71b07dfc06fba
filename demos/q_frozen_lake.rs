use frozen_rl::{
    algo::{QLearner, QLearnerConfig},
    gym::FrozenLake,
    metrics::MetricsTarget,
    run::{RunOptions, Trainer},
};

fn main() -> frozen_rl::Result<()> {
    env_logger::init();

    let learner = QLearner::new(QLearnerConfig {
        episodes: 500,
        ..Default::default()
    });
    let mut trainer = Trainer::new(FrozenLake::new(), learner);

    trainer.execute(&RunOptions {
        label: "q frozen lake".to_string(),
        metrics: MetricsTarget::File,
    })?;

    println!("metrics written to outputs/q_frozen_lake.csv");
    Ok(())
}
