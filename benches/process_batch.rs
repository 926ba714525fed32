use std::f64::consts::PI;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hinv_counting::{CountingProcessor, Executor, RunConfig};
use hinv_primitives::{BatchBuilder, EventBatch, EventRecord, InMemorySource, Particle};

const CONFIG: &str = r#"
luminosity: 5000.0
cross_sections:
  Signal: 0.5
selection:
  z_mass_min_mm: 80
  z_mass_max_mm: 100
  met_min_mm: 100
  z_mass_min_ee: 80
  z_mass_max_ee: 100
  met_min_ee: 100
  mjj_min: 500
  mjj_max: 5000
  met_min_jj: 150
"#;

fn random_objects(rng: &mut StdRng, charged: bool) -> Vec<Particle> {
    (0..rng.gen_range(0..5))
        .map(|_| {
            let pt: f64 = rng.gen_range(5.0..200.0);
            let eta: f64 = rng.gen_range(-4.8..4.8);
            let p = Particle::new(pt, eta, rng.gen_range(-PI..PI), pt * eta.cosh());
            if charged { p.with_charge(1.0) } else { p }
        })
        .collect()
}

fn random_batch(rng: &mut StdRng, n: usize) -> EventBatch {
    let mut builder = BatchBuilder::new("Signal");
    for _ in 0..n {
        builder.push(EventRecord {
            muons: random_objects(rng, true),
            electrons: random_objects(rng, true),
            jets: random_objects(rng, false),
            met: rng.gen_range(0.0..400.0),
            weight: rng.gen_range(0.5..1.5),
            ..Default::default()
        });
    }
    builder.build()
}

fn bench_process_batch(c: &mut Criterion) {
    let config = RunConfig::from_yaml_str(CONFIG).unwrap();
    let processor = CountingProcessor::from_config(&config).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let batch = random_batch(&mut rng, 10_000);

    c.bench_function("process_batch_10k", |b| {
        b.iter(|| processor.process(&batch).unwrap());
    });

    let batches: Vec<_> = (0..16).map(|_| random_batch(&mut rng, 2_000)).collect();
    let executor = Executor::new(0).unwrap();
    c.bench_function("executor_16x2k", |b| {
        b.iter_batched(
            || InMemorySource::new(batches.clone()),
            |source| executor.run(&processor, source).unwrap(),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_process_batch);
criterion_main!(benches);
