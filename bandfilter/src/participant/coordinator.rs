use super::{Band, Participant};
use crate::comm::{Communicator, Message};
use crate::error::{Error, Result};
use crate::image::{Image, ImageDesc, RowBuffer};
use crate::partition::{band_layouts, BandLayout, Partition};
use crate::plan::FilterPlan;

/// Rank 0: partitions the image, filters the first band like any worker,
/// then reassembles every band into one image.
#[derive(Debug)]
pub struct Coordinator<C: Communicator> {
    comm: C,
    desc: ImageDesc,
    layouts: Vec<BandLayout>,
    band: Band,
}

impl<C: Communicator> Coordinator<C> {
    /// Ships metadata, plan, row count and owned rows to every worker, and
    /// keeps the first band.
    pub fn distribute(comm: C, image: Image, plan: FilterPlan) -> Result<Self> {
        let desc = *image.desc();
        let layouts = band_layouts(desc.height, comm.size())?;
        tracing::info!(
            participants = comm.size(),
            image = %desc,
            plan = %plan,
            "Distributing image"
        );

        let mut rows = image.into_rows();
        let mut remaining = rows.split_off(layouts[0].owned.end);

        for layout in &layouts[1..] {
            let rest = remaining.split_off(layout.owned.len());
            let band_rows = std::mem::replace(&mut remaining, rest);
            send_band(&comm, layout, &desc, &plan, band_rows)?;
        }

        let partition = Partition::new(layouts[0], rows, desc.row_len())?;
        let band = Band::new(&desc, &layouts, partition, plan);

        Ok(Self {
            comm,
            desc,
            layouts,
            band,
        })
    }

    pub fn layouts(&self) -> &[BandLayout] {
        &self.layouts
    }

    /// Gathers every band in rank order into a fresh image. Halo rows are
    /// dropped; workers send owned rows only.
    pub fn collect(self) -> Result<Image> {
        let row_len = self.desc.row_len();
        let mut rows = self.band.into_partition().into_owned_rows();
        rows.reserve(self.desc.height - rows.len());

        for layout in &self.layouts[1..] {
            let peer = layout.rank;
            let expected = layout.owned.len();
            let count = self.comm.recv_row_count(peer)?;
            if count != expected {
                return Err(Error::PartitionMismatch {
                    rank: peer,
                    expected,
                    actual: count,
                });
            }
            for _ in 0..count {
                rows.push(self.comm.recv_row(peer, row_len)?);
            }
        }

        tracing::info!(rows = rows.len(), "Collected all bands");
        Image::new(self.desc, rows)
    }
}

fn send_band<C: Communicator>(
    comm: &C,
    layout: &BandLayout,
    desc: &ImageDesc,
    plan: &FilterPlan,
    rows: Vec<RowBuffer>,
) -> Result<()> {
    let peer = layout.rank;
    tracing::debug!(peer, start = layout.owned.start, end = layout.owned.end, "Sending band");

    comm.send(peer, Message::Metadata(*desc))?;
    comm.send(peer, Message::Plan(plan.clone()))?;
    comm.send(peer, Message::RowCount(rows.len()))?;
    for row in rows {
        comm.send(peer, Message::Row(row))?;
    }

    Ok(())
}

impl<C: Communicator> Participant for Coordinator<C> {
    fn rank(&self) -> usize {
        self.comm.rank()
    }

    fn run_filters(&mut self) -> Result<usize> {
        self.band.run_filters(&self.comm)
    }
}
