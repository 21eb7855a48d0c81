//! Pull-based distribution of time slices over worker threads.
//!
//! The coordinator preloads a channel with every time index and closes it; workers pull
//! indices at their own pace, evaluate the slice, and send the result back keyed by its
//! index. Results are written into the output grid by index, so arrival order does not
//! matter and the assembled grid is identical for any worker count.

use crate::{
    grid::{evaluate_time_slice, GridInputs, PiGrid, TimeSlice},
    solver::PiConfig,
};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Evaluate every cell of `inputs` using `workers` threads.
///
/// `workers` is clamped to at least one and to no more than the number of time steps. A
/// single worker uses the same channel protocol as many.
pub fn evaluate_grid(inputs: &GridInputs, config: &PiConfig, workers: usize) -> PiGrid {
    let nt = inputs.times().len();
    let mut output = PiGrid::sized_for(inputs);
    if nt == 0 {
        return output;
    }

    let workers = workers.max(1).min(nt);

    let (job_tx, job_rx): (Sender<usize>, Receiver<usize>) = unbounded();
    let (result_tx, result_rx): (Sender<(usize, TimeSlice)>, Receiver<(usize, TimeSlice)>) =
        unbounded();

    for t in 0..nt {
        // Cannot fail, the receiver is still alive in this scope.
        let _ = job_tx.send(t);
    }
    // Closing the job channel is what lets the workers finish.
    drop(job_tx);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for t in job_rx.iter() {
                    let slice = evaluate_time_slice(inputs, t, config);
                    if result_tx.send((t, slice)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        for (t, slice) in result_rx.iter() {
            output.insert_slice(t, slice);
        }
    });

    let summary = output.summary();
    log::info!(
        "evaluated {} cells: {} solved, {} without convergence, {} invalid, {} missing",
        nt * inputs.cells_per_slice(),
        summary.solved,
        summary.no_convergence,
        summary.invalid,
        summary.missing
    );

    output
}
