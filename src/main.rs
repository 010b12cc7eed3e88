use std::env;

use anyhow::Context;
use log::info;
use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};

use pbt::{MemberBuilder, MemberConfig};

const FEATURES: usize = 4;
const TRAIN_ROWS: usize = 1000;
const EVAL_ROWS: usize = 200;
const CYCLES: usize = 20;
const DATA_SEED: u64 = 42;

/// Noisy linear targets over uniform features.
fn synthetic(rng: &mut StdRng, rows: usize) -> (Array2<f32>, Array2<f32>) {
    let x = Array2::<f32>::from_shape_simple_fn((rows, FEATURES), || {
        rng.random_range(-1.0..1.0)
    });
    let y = Array2::from_shape_fn((rows, 1), |(i, _)| {
        let row = x.row(i);
        row.iter().enumerate().map(|(j, v)| (j + 1) as f32 * v).sum::<f32>()
    });
    let noise =
        Array2::<f32>::from_shape_simple_fn((rows, 1), || rng.random_range(-0.05..0.05));

    (x, y + noise)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => MemberConfig::from_path(&path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => MemberConfig::default(),
    };

    let mut rng = StdRng::seed_from_u64(DATA_SEED);
    let train = synthetic(&mut rng, TRAIN_ROWS);
    let eval = synthetic(&mut rng, EVAL_ROWS);

    let mut member = MemberBuilder::new()
        .build(&config, train, eval)
        .context("building member")?;
    let loss = member.eval()?;
    info!("initial validation loss {loss:.6}");

    for cycle in 1..=CYCLES {
        while !member.ready() {
            member.step()?;
        }

        let loss = member.eval()?;
        let reg = *member.hyperparameter();
        info!(
            "cycle {cycle}: step {} validation loss {loss:.6} (l1 {:.3e}, l2 {:.3e})",
            member.total_steps(),
            reg.l1,
            reg.l2
        );

        member.explore()?;
    }

    Ok(())
}
