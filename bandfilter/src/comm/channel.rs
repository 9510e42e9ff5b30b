use crossbeam::channel::{bounded, Receiver, Sender};

use super::{Communicator, Message};
use crate::error::{Error, Result};

/// Our side of the bidirectional channel shared with one peer.
#[derive(Debug)]
struct Link {
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

/// In-process communicator over zero-capacity crossbeam channels: a send
/// completes only once the peer has received, like a synchronous send.
#[derive(Debug)]
pub struct ChannelCommunicator {
    rank: usize,
    size: usize,
    links: Vec<Option<Link>>,
}

impl ChannelCommunicator {
    fn link(&self, peer: usize) -> Result<&Link> {
        self.links
            .get(peer)
            .and_then(Option::as_ref)
            .ok_or(Error::NoRoute {
                rank: self.rank,
                peer,
            })
    }

    /// Ranks this communicator can talk to, ascending.
    pub fn peers(&self) -> Vec<usize> {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.is_some())
            .map(|(peer, _)| peer)
            .collect()
    }
}

impl Communicator for ChannelCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&self, peer: usize, message: Message) -> Result<()> {
        self.link(peer)?
            .tx
            .send(message)
            .map_err(|_| Error::PeerDisconnected {
                rank: self.rank,
                peer,
            })
    }

    fn recv(&self, peer: usize) -> Result<Message> {
        self.link(peer)?
            .rx
            .recv()
            .map_err(|_| Error::PeerDisconnected {
                rank: self.rank,
                peer,
            })
    }
}

/// One communicator per rank, linked coordinator-to-worker and between
/// row-adjacent ranks. Each pair gets exactly one link.
pub fn build_mesh(size: usize) -> Result<Vec<ChannelCommunicator>> {
    if size == 0 {
        return Err(Error::InvalidWorkerCount(size));
    }

    let mut comms: Vec<ChannelCommunicator> = (0..size)
        .map(|rank| ChannelCommunicator {
            rank,
            size,
            links: (0..size).map(|_| None).collect(),
        })
        .collect();

    let star = (1..size).map(|worker| (0, worker));
    let chain = (1..size.saturating_sub(1)).map(|rank| (rank, rank + 1));
    for (a, b) in star.chain(chain) {
        let (tx_ab, rx_ab) = bounded(0);
        let (tx_ba, rx_ba) = bounded(0);
        comms[a].links[b] = Some(Link {
            tx: tx_ab,
            rx: rx_ba,
        });
        comms[b].links[a] = Some(Link {
            tx: tx_ba,
            rx: rx_ab,
        });
    }

    for comm in &comms {
        tracing::trace!(rank = comm.rank, peers = ?comm.peers(), "Mesh links");
    }

    Ok(comms)
}
