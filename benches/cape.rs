use criterion::{criterion_group, criterion_main, Criterion};
use metfor::{HectoPascal, Kelvin, Quantity};
use potential_intensity::{evaluate_cape, AscentOptions, Parcel, VerticalProfile};
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

fn ambient_ascent(c: &mut Criterion) {
    let profile = moist_tropical_profile();
    let parcel = Parcel::from_profile_level(&profile, 0).expect("surface level");
    let options = AscentOptions::default();

    c.bench_function("ambient ascent", |b| {
        b.iter(|| evaluate_cape(parcel, &profile, &options).expect("valid inputs"));
    });
}

fn saturated_ascent(c: &mut Criterion) {
    let profile = moist_tropical_profile();
    let parcel = Parcel::saturated(Kelvin(301.15), HectoPascal(970.0)).expect("valid parcel");
    let options = AscentOptions::default();

    c.bench_function("saturated ascent", |b| {
        b.iter(|| evaluate_cape(parcel, &profile, &options).expect("valid inputs"));
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
    targets = ambient_ascent, saturated_ascent
);
criterion_main!(benches);
