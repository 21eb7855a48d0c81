//! End-to-end tests of the gridded evaluation and its worker distribution.

use chrono::{NaiveDate, NaiveDateTime};
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};
use optional::{none, some, Optioned};
use potential_intensity::{evaluate_grid, CellFlag, GridInputs, PiConfig};

const NT: usize = 3;
const NY: usize = 2;
const NX: usize = 2;

fn times() -> Vec<NaiveDateTime> {
    (0..NT)
        .map(|t| {
            NaiveDate::from_ymd_opt(2005, 8, 25)
                .unwrap()
                .and_hms_opt(6 * t as u32, 0, 0)
                .unwrap()
        })
        .collect()
}

fn levels() -> Vec<HectoPascal> {
    (0..19)
        .map(|i| HectoPascal(1000.0 - 50.0 * i as f64))
        .collect()
}

/// A moist tropical column, unstable for a warm sea surface.
fn column() -> (Vec<Kelvin>, Vec<f64>) {
    let levels = levels();
    let temperature = levels
        .iter()
        .map(|p| Kelvin(200.0 + (p.unpack() - 100.0) * (100.0 / 900.0)))
        .collect();
    let mixing_ratio = levels
        .iter()
        .map(|p| (0.018 * (p.unpack() - 100.0) / 900.0).max(0.0))
        .collect();
    (temperature, mixing_ratio)
}

/// A small grid where every cell shares the same sounding. One cell carries a sea
/// surface too cold to analyze and one cell is missing its surface data entirely.
fn build_inputs() -> GridInputs {
    let levels = levels();
    let (temperature, mixing_ratio) = column();
    let ncells = NT * NY * NX;

    let mut sst: Vec<Optioned<Celsius>> = vec![some(Celsius(28.0)); ncells];
    let slp: Vec<Optioned<HectoPascal>> = vec![some(HectoPascal(1008.0)); ncells];

    // (t=1, y=0, x=1) is too cold, (t=2, y=1, x=0) is masked.
    let at = |t: usize, y: usize, x: usize| (t * NY + y) * NX + x;
    sst[at(1, 0, 1)] = some(Celsius(4.0));
    sst[at(2, 1, 0)] = none();

    let mut t_field: Vec<Optioned<Kelvin>> = Vec::with_capacity(ncells * levels.len());
    let mut r_field: Vec<Optioned<f64>> = Vec::with_capacity(ncells * levels.len());
    for _t in 0..NT {
        for k in 0..levels.len() {
            for _cell in 0..(NY * NX) {
                t_field.push(some(temperature[k]));
                r_field.push(some(mixing_ratio[k]));
            }
        }
    }

    GridInputs::new(
        times(),
        vec![10.0, 15.0],
        vec![-40.0, -35.0],
        levels,
        sst,
        slp,
        t_field,
        r_field,
    )
    .expect("consistent grid shapes")
}

#[test]
fn worker_counts_give_identical_results() {
    let inputs = build_inputs();
    let config = PiConfig::default();

    let serial = evaluate_grid(&inputs, &config, 1);
    let parallel = evaluate_grid(&inputs, &config, 4);

    assert_eq!(serial.flags(), parallel.flags());
    assert_eq!(serial.pmin_field(), parallel.pmin_field());
    assert_eq!(serial.vmax_field(), parallel.vmax_field());
}

#[test]
fn every_time_slice_is_evaluated_exactly_once() {
    let inputs = build_inputs();
    let grid = evaluate_grid(&inputs, &PiConfig::default(), 2);

    for t in 0..NT {
        assert_eq!(grid.flag(t, 0, 0), CellFlag::Solved);
        assert!(grid.pmin(t, 0, 0).is_some());
        assert!(grid.vmax(t, 0, 0).is_some());
    }
}

#[test]
fn bad_cells_are_flagged_without_spreading() {
    let inputs = build_inputs();
    let grid = evaluate_grid(&inputs, &PiConfig::default(), 2);

    // The cold cell is rejected by validation and keeps the missing sentinel.
    assert_eq!(grid.flag(1, 0, 1), CellFlag::InvalidInput);
    assert!(!grid.pmin(1, 0, 1).is_some());

    // The masked cell is skipped entirely.
    assert_eq!(grid.flag(2, 1, 0), CellFlag::MissingData);
    assert!(!grid.vmax(2, 1, 0).is_some());

    // Their neighbors in the same slices still solve.
    assert_eq!(grid.flag(1, 0, 0), CellFlag::Solved);
    assert_eq!(grid.flag(2, 1, 1), CellFlag::Solved);

    let summary = grid.summary();
    assert_eq!(summary.solved, NT * NY * NX - 2);
    assert_eq!(summary.invalid, 1);
    assert_eq!(summary.missing, 1);
}
