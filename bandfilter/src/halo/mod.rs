//! Boundary-row ("halo") exchange between row-adjacent partitions.
//!
//! Runs once per filter pass, before the convolution for that pass. Each
//! participant first trades rows with the neighbour above, then with the
//! neighbour below. Within every exchange the participant at an even
//! position of the chain sends first and the one at an odd position receives
//! first, so along the whole chain some pair can always make progress even
//! though every send blocks until it is received.


use crate::comm::{Communicator, Message};
use crate::error::Result;
use crate::image::RowBuffer;
use crate::partition::{active_ranks, Partition, RowRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangeOrder {
    SendFirst,
    ReceiveFirst,
}

impl ExchangeOrder {
    pub fn for_position(position: usize) -> Self {
        if position % 2 == 0 {
            ExchangeOrder::SendFirst
        } else {
            ExchangeOrder::ReceiveFirst
        }
    }
}

/// Trades `outgoing` for the peer's boundary row.
pub fn exchange_boundary<C: Communicator + ?Sized>(
    comm: &C,
    peer: usize,
    order: ExchangeOrder,
    outgoing: &[u8],
) -> Result<RowBuffer> {
    let row_len = outgoing.len();
    match order {
        ExchangeOrder::SendFirst => {
            comm.send(peer, Message::Row(outgoing.to_vec()))?;
            comm.recv_row(peer, row_len)
        }
        ExchangeOrder::ReceiveFirst => {
            let incoming = comm.recv_row(peer, row_len)?;
            comm.send(peer, Message::Row(outgoing.to_vec()))?;
            Ok(incoming)
        }
    }
}

/// A participant's place in the chain of non-empty partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HaloLinks {
    pub position: usize,
    pub up: Option<usize>,
    pub down: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HaloTopology {
    chain: Vec<usize>,
}

impl HaloTopology {
    pub fn new(ranges: &[RowRange]) -> Self {
        Self {
            chain: active_ranks(ranges),
        }
    }

    /// `None` for a participant that owns no rows.
    pub fn links(&self, rank: usize) -> Option<HaloLinks> {
        let position = self.chain.iter().position(|&r| r == rank)?;
        Some(HaloLinks {
            position,
            up: position.checked_sub(1).map(|p| self.chain[p]),
            down: self.chain.get(position + 1).copied(),
        })
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaloState {
    Idle,
    ExchangingTop,
    ExchangingBottom,
    Ready,
}

#[derive(Debug)]
pub struct HaloExchange {
    links: HaloLinks,
    order: ExchangeOrder,
    state: HaloState,
}

impl HaloExchange {
    pub fn new(links: HaloLinks) -> Self {
        Self {
            links,
            order: ExchangeOrder::for_position(links.position),
            state: HaloState::Idle,
        }
    }

    pub fn state(&self) -> HaloState {
        self.state
    }

    pub fn order(&self) -> ExchangeOrder {
        self.order
    }

    fn transition(&mut self, rank: usize, next: HaloState) {
        tracing::trace!(rank, from = ?self.state, to = ?next, "Halo state");
        self.state = next;
    }

    /// Refreshes both halo rows of `partition` from its neighbours.
    pub fn run<C: Communicator + ?Sized>(
        &mut self,
        comm: &C,
        partition: &mut Partition,
    ) -> Result<()> {
        let rank = comm.rank();
        self.transition(rank, HaloState::Idle);

        if let Some(up) = self.links.up {
            self.transition(rank, HaloState::ExchangingTop);
            let row = exchange_boundary(comm, up, self.order, partition.first_owned_row())?;
            partition.set_top_halo(row);
        }

        if let Some(down) = self.links.down {
            self.transition(rank, HaloState::ExchangingBottom);
            let row = exchange_boundary(comm, down, self.order, partition.last_owned_row())?;
            partition.set_bottom_halo(row);
        }

        self.transition(rank, HaloState::Ready);
        Ok(())
    }
}
