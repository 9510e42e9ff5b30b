use super::{Band, Participant};
use crate::comm::{Communicator, Message};
use crate::error::{Error, Result};
use crate::partition::{band_layouts, Partition};

const COORDINATOR: usize = 0;

/// Any rank but 0: receives its band, filters it, and sends it back.
#[derive(Debug)]
pub struct Worker<C: Communicator> {
    comm: C,
    band: Band,
}

impl<C: Communicator> Worker<C> {
    /// Receives metadata, plan, row count and rows from the coordinator.
    pub fn receive(comm: C) -> Result<Self> {
        let rank = comm.rank();
        let desc = comm.recv_metadata(COORDINATOR)?;
        let plan = comm.recv_plan(COORDINATOR)?;
        let count = comm.recv_row_count(COORDINATOR)?;

        let layouts = band_layouts(desc.height, comm.size())?;
        let layout = layouts[rank];
        if count != layout.owned.len() {
            return Err(Error::PartitionMismatch {
                rank,
                expected: layout.owned.len(),
                actual: count,
            });
        }

        let rows = (0..count)
            .map(|_| comm.recv_row(COORDINATOR, desc.row_len()))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            rank,
            start = layout.owned.start,
            end = layout.owned.end,
            "Band received"
        );

        let partition = Partition::new(layout, rows, desc.row_len())?;
        let band = Band::new(&desc, &layouts, partition, plan);

        Ok(Self { comm, band })
    }

    pub fn band(&self) -> &Band {
        &self.band
    }

    /// Sends the owned rows, without halos, back to the coordinator.
    pub fn send_back(self) -> Result<()> {
        let rows = self.band.into_partition().into_owned_rows();
        self.comm
            .send(COORDINATOR, Message::RowCount(rows.len()))?;
        for row in rows {
            self.comm.send(COORDINATOR, Message::Row(row))?;
        }

        Ok(())
    }

    /// Full worker lifecycle.
    pub fn run(comm: C) -> Result<()> {
        let mut worker = Self::receive(comm)?;
        let passes = worker.run_filters()?;
        tracing::debug!(rank = worker.rank(), passes, "Worker done");
        worker.send_back()
    }
}

impl<C: Communicator> Participant for Worker<C> {
    fn rank(&self) -> usize {
        self.comm.rank()
    }

    fn run_filters(&mut self) -> Result<usize> {
        self.band.run_filters(&self.comm)
    }
}
