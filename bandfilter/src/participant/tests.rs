use std::thread;

use super::*;
use crate::comm::{build_mesh, ChannelCommunicator, Message};
use crate::error::Error;
use crate::image::{ChannelCount, Image};
use crate::kernel::Filter;

fn gradient_image(width: usize, height: usize) -> Image {
    let desc = ImageDesc::new(ChannelCount::Gray, width, height, 255);
    let bytes: Vec<u8> = (0..desc.size_in_bytes())
        .map(|i| (i * 37 % 251) as u8)
        .collect();
    Image::from_bytes(desc, &bytes).unwrap()
}

fn split_coordinator(size: usize) -> (ChannelCommunicator, Vec<ChannelCommunicator>) {
    let mut comms = build_mesh(size).unwrap();
    let coordinator = comms.remove(0);
    (coordinator, comms)
}

#[test]
fn coordinator_and_workers_match_single_band() {
    let image = gradient_image(7, 11);
    let plan = FilterPlan::new(vec![Filter::Sharpen, Filter::Blur, Filter::Emboss]);

    let mut whole = Band::new(
        image.desc(),
        &crate::partition::band_layouts(11, 1).unwrap(),
        Partition::whole(image.desc(), image.rows().to_vec()).unwrap(),
        plan.clone(),
    );
    let single = build_mesh(1).unwrap().remove(0);
    assert_eq!(whole.run_filters(&single).unwrap(), 3);
    let expected = whole.into_partition().into_owned_rows();

    let (coordinator_comm, worker_comms) = split_coordinator(3);
    let workers: Vec<_> = worker_comms
        .into_iter()
        .map(|comm| thread::spawn(move || Worker::run(comm)))
        .collect();

    let mut coordinator = Coordinator::distribute(coordinator_comm, image, plan).unwrap();
    assert_eq!(coordinator.rank(), 0);
    assert_eq!(coordinator.run_filters().unwrap(), 3);
    let collected = coordinator.collect().unwrap();

    for worker in workers {
        worker.join().unwrap().unwrap();
    }
    assert_eq!(collected.rows(), expected.as_slice());
}

#[test]
fn worker_rejects_wrong_row_count() {
    let (coordinator, mut workers) = split_coordinator(2);
    let worker = workers.remove(0);
    let desc = ImageDesc::new(ChannelCount::Gray, 3, 4, 255);

    let fake = thread::spawn(move || {
        coordinator.send(1, Message::Metadata(desc)).unwrap();
        coordinator
            .send(1, Message::Plan(FilterPlan::default()))
            .unwrap();
        coordinator.send(1, Message::RowCount(5)).unwrap();
    });

    let result = Worker::receive(worker);
    assert!(matches!(
        result,
        Err(Error::PartitionMismatch {
            rank: 1,
            expected: 2,
            actual: 5
        })
    ));
    fake.join().unwrap();
}

#[test]
fn collector_rejects_short_band() {
    let (coordinator_comm, mut workers) = split_coordinator(2);
    let worker = workers.remove(0);

    let fake = thread::spawn(move || {
        let desc = worker.recv_metadata(0).unwrap();
        worker.recv_plan(0).unwrap();
        let count = worker.recv_row_count(0).unwrap();
        for _ in 0..count {
            worker.recv_row(0, desc.row_len()).unwrap();
        }
        // One row short.
        worker.send(0, Message::RowCount(count - 1)).unwrap();
    });

    let image = gradient_image(5, 4);
    let mut coordinator =
        Coordinator::distribute(coordinator_comm, image, FilterPlan::default()).unwrap();
    assert_eq!(coordinator.run_filters().unwrap(), 0);

    assert!(matches!(
        coordinator.collect(),
        Err(Error::PartitionMismatch {
            rank: 1,
            expected: 2,
            actual: 1
        })
    ));
    fake.join().unwrap();
}

#[test]
fn collector_rejects_unexpected_message() {
    let (coordinator_comm, mut workers) = split_coordinator(2);
    let worker = workers.remove(0);

    let fake = thread::spawn(move || {
        let desc = worker.recv_metadata(0).unwrap();
        worker.recv_plan(0).unwrap();
        let count = worker.recv_row_count(0).unwrap();
        for _ in 0..count {
            worker.recv_row(0, desc.row_len()).unwrap();
        }
        worker.send(0, Message::Row(vec![0; desc.row_len()])).unwrap();
    });

    let image = gradient_image(5, 4);
    let coordinator =
        Coordinator::distribute(coordinator_comm, image, FilterPlan::default()).unwrap();

    assert!(matches!(
        coordinator.collect(),
        Err(Error::ChannelTransferDesync { rank: 0, peer: 1, .. })
    ));
    fake.join().unwrap();
}

#[test]
fn empty_bands_take_part_without_rows() {
    let image = gradient_image(4, 2);
    let (coordinator_comm, worker_comms) = split_coordinator(4);
    let workers: Vec<_> = worker_comms
        .into_iter()
        .map(|comm| thread::spawn(move || Worker::run(comm)))
        .collect();

    let plan = FilterPlan::new(vec![Filter::Mean]);
    let mut coordinator = Coordinator::distribute(coordinator_comm, image.clone(), plan).unwrap();
    assert!(coordinator.layouts()[0].owned.is_empty());
    assert_eq!(coordinator.run_filters().unwrap(), 0);
    let collected = coordinator.collect().unwrap();

    for worker in workers {
        worker.join().unwrap().unwrap();
    }
    // Two rows: both are border rows, so nothing changes.
    assert_eq!(collected, image);
}
