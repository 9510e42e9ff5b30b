//! Drives one filtering run over a set of in-process participants.

use std::thread;
use std::time::{Duration, Instant};

use crate::comm::{build_mesh, Communicator};
use crate::convolve::ConvolutionEngine;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::participant::{Coordinator, Participant, Worker};
use crate::partition::Partition;
use crate::plan::FilterPlan;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobReport {
    pub workers: usize,
    pub passes: usize,
    pub elapsed: Duration,
}

/// Filters `image` with `plan` split across `workers` participants.
///
/// Rank 0 runs on the calling thread, the others on their own named
/// threads. Any failure aborts every participant; the error returned is the
/// root cause rather than the disconnects it triggered elsewhere.
pub fn run(image: Image, plan: &FilterPlan, workers: usize) -> Result<(Image, JobReport)> {
    let started = Instant::now();
    let mut comms = build_mesh(workers)?;
    let coordinator_comm = comms.remove(0);

    let (outcome, worker_errors) = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(comms.len());
        let mut spawn_error = None;
        for comm in comms {
            let rank = comm.rank();
            let spawned = thread::Builder::new()
                .name(format!("bandfilter-worker-{rank}"))
                .spawn_scoped(scope, move || Worker::run(comm));
            match spawned {
                Ok(handle) => handles.push((rank, handle)),
                Err(source) => {
                    spawn_error = Some(Error::Spawn { rank, source });
                    break;
                }
            }
        }

        // Dropping the coordinator's links on a spawn failure releases the
        // workers that did start.
        let outcome = match spawn_error {
            Some(err) => {
                drop(coordinator_comm);
                Err(err)
            }
            None => coordinate(coordinator_comm, image, plan),
        };

        let worker_errors: Vec<Error> = handles
            .into_iter()
            .filter_map(|(rank, handle)| match handle.join() {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err),
                Err(_) => Some(Error::ParticipantPanicked(rank)),
            })
            .collect();

        (outcome, worker_errors)
    });

    let output = match (outcome, root_cause(worker_errors)) {
        (Ok(output), None) => output,
        (Ok(_), Some(worker_err)) => return Err(worker_err),
        (Err(err), Some(worker_err)) if err.is_disconnect() => return Err(worker_err),
        (Err(err), _) => return Err(err),
    };

    let report = JobReport {
        workers,
        passes: plan.len(),
        elapsed: started.elapsed(),
    };
    tracing::info!(
        workers,
        passes = report.passes,
        elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
        "Job finished"
    );

    Ok((output, report))
}

fn coordinate<C: Communicator>(
    comm: C,
    image: Image,
    plan: &FilterPlan,
) -> Result<Image> {
    let mut coordinator = Coordinator::distribute(comm, image, plan.clone())?;
    let passes = coordinator.run_filters()?;
    tracing::debug!(rank = coordinator.rank(), passes, "Coordinator band done");
    coordinator.collect()
}

/// First error that is not a disconnect, else the first error.
fn root_cause(errors: Vec<Error>) -> Option<Error> {
    let position = errors
        .iter()
        .position(|err| !err.is_disconnect())
        .unwrap_or(0);
    errors.into_iter().nth(position)
}

/// Applies `plan` to the whole image as a single band, with no messaging.
pub fn run_sequential(image: Image, plan: &FilterPlan) -> Result<Image> {
    let desc = *image.desc();
    let mut partition = Partition::whole(&desc, image.into_rows())?;
    let mut engine = ConvolutionEngine::new(desc.channels);

    for filter in plan.iter() {
        engine.apply(partition.local_rows_mut(), filter.kernel());
    }

    Image::new(desc, partition.into_owned_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ChannelCount, ImageDesc};
    use crate::kernel::Filter;

    fn disconnect(rank: usize) -> Error {
        Error::PeerDisconnected { rank, peer: 0 }
    }

    #[test]
    fn root_cause_skips_disconnects() {
        let errors = vec![
            disconnect(1),
            Error::PartitionMismatch {
                rank: 2,
                expected: 3,
                actual: 1,
            },
            disconnect(3),
        ];
        assert!(matches!(
            root_cause(errors),
            Some(Error::PartitionMismatch { rank: 2, .. })
        ));
    }

    #[test]
    fn root_cause_falls_back_to_first_disconnect() {
        let errors = vec![disconnect(4), disconnect(5)];
        assert!(matches!(
            root_cause(errors),
            Some(Error::PeerDisconnected { rank: 4, .. })
        ));
        assert!(root_cause(Vec::new()).is_none());
    }

    #[test]
    fn sequential_run_leaves_small_images_alone() {
        let desc = ImageDesc::new(ChannelCount::Gray, 2, 2, 255);
        let image = Image::from_bytes(desc, &[1, 2, 3, 4]).unwrap();
        let plan = FilterPlan::new(vec![Filter::Sharpen, Filter::Mean]);

        assert_eq!(run_sequential(image.clone(), &plan).unwrap(), image);
    }

    #[test]
    fn report_counts_passes() {
        let desc = ImageDesc::new(ChannelCount::Gray, 4, 6, 255);
        let plan = FilterPlan::new(vec![Filter::Blur, Filter::Blur]);

        let (_, report) = run(Image::new_filled(desc, 9), &plan, 3).unwrap();
        assert_eq!(report.workers, 3);
        assert_eq!(report.passes, 2);
    }
}
