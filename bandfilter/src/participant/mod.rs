//! Participant roles.
//!
//! Every participant runs the same per-pass loop over its own band: halo
//! exchange, then convolution. The coordinator (rank 0) additionally
//! partitions the image before the loop and collects the bands after it.

mod coordinator;
mod worker;

#[cfg(test)]
mod tests;

use crate::comm::Communicator;
use crate::convolve::ConvolutionEngine;
use crate::error::Result;
use crate::halo::{HaloExchange, HaloTopology};
use crate::image::ImageDesc;
use crate::partition::{BandLayout, Partition};
use crate::plan::FilterPlan;

pub use coordinator::Coordinator;
pub use worker::Worker;

/// A participant's band together with what it needs to filter it.
#[derive(Debug)]
pub struct Band {
    partition: Partition,
    plan: FilterPlan,
    engine: ConvolutionEngine,
    /// `None` when the band owns no rows.
    halo: Option<HaloExchange>,
}

impl Band {
    pub fn new(
        desc: &ImageDesc,
        layouts: &[BandLayout],
        partition: Partition,
        plan: FilterPlan,
    ) -> Self {
        let ranges: Vec<_> = layouts.iter().map(|layout| layout.owned).collect();
        let halo = HaloTopology::new(&ranges)
            .links(partition.rank())
            .map(HaloExchange::new);

        Self {
            partition,
            plan,
            engine: ConvolutionEngine::new(desc.channels),
            halo,
        }
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn plan(&self) -> &FilterPlan {
        &self.plan
    }

    pub fn into_partition(self) -> Partition {
        self.partition
    }

    /// Applies the whole plan. Returns the number of passes run.
    pub fn run_filters<C: Communicator + ?Sized>(&mut self, comm: &C) -> Result<usize> {
        let Some(halo) = self.halo.as_mut() else {
            tracing::debug!(rank = comm.rank(), "Empty band, skipping filters");
            return Ok(0);
        };

        for (pass, filter) in self.plan.iter().enumerate() {
            halo.run(comm, &mut self.partition)?;
            self.engine
                .apply(self.partition.local_rows_mut(), filter.kernel());
            tracing::debug!(rank = comm.rank(), pass, %filter, "Pass applied");
        }

        Ok(self.plan.len())
    }
}

/// Common capability of the coordinator and the workers.
pub trait Participant {
    fn rank(&self) -> usize;

    /// Runs the filter chain over this participant's band.
    fn run_filters(&mut self) -> Result<usize>;
}
