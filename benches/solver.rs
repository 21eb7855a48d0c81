use criterion::{criterion_group, criterion_main, Criterion};
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};
use potential_intensity::{solve_pi, PiConfig, SurfaceState, VerticalProfile};
use std::time::Duration;

fn moist_tropical_profile() -> VerticalProfile {
    let pressure: Vec<HectoPascal> = (0..19)
        .map(|i| HectoPascal(1000.0 - 50.0 * i as f64))
        .collect();
    let temperature = pressure
        .iter()
        .map(|p| Kelvin(200.0 + (p.unpack() - 100.0) * (100.0 / 900.0)))
        .collect();
    let mixing_ratio = pressure
        .iter()
        .map(|p| (0.018 * (p.unpack() - 100.0) / 900.0).max(0.0))
        .collect();

    VerticalProfile::new(pressure, temperature, mixing_ratio).expect("valid profile")
}

fn full_cell(c: &mut Criterion) {
    let profile = moist_tropical_profile();
    let surface = SurfaceState {
        sst: Celsius(28.0),
        slp: HectoPascal(1008.0),
    };
    let config = PiConfig::default();

    c.bench_function("potential intensity, one cell", |b| {
        b.iter(|| solve_pi(surface, &profile, &config).expect("valid inputs"));
    });
}

fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(200)
        .measurement_time(Duration::from_secs(10))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

criterion_group!(
    name = benches;
    config = build_tester();
    targets = full_cell
);
criterion_main!(benches);
