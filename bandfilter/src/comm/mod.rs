//! Point-to-point message passing between participants.
//!
//! Every send and receive blocks until the peer issues the matching
//! operation; nothing is buffered in between.

mod channel;


use crate::error::{Error, Result};
use crate::image::{ImageDesc, RowBuffer};
use crate::plan::FilterPlan;

pub use channel::{build_mesh, ChannelCommunicator};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Metadata(ImageDesc),
    Plan(FilterPlan),
    RowCount(usize),
    Row(RowBuffer),
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Metadata(_) => "metadata",
            Message::Plan(_) => "plan",
            Message::RowCount(_) => "row count",
            Message::Row(_) => "row",
        }
    }
}

pub trait Communicator: Send {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Blocks until `peer` takes the message.
    fn send(&self, peer: usize, message: Message) -> Result<()>;

    /// Blocks until `peer` sends.
    fn recv(&self, peer: usize) -> Result<Message>;

    fn recv_metadata(&self, peer: usize) -> Result<ImageDesc> {
        match self.recv(peer)? {
            Message::Metadata(desc) => Ok(desc),
            other => Err(self.desync(peer, "metadata", other.kind())),
        }
    }

    fn recv_plan(&self, peer: usize) -> Result<FilterPlan> {
        match self.recv(peer)? {
            Message::Plan(plan) => Ok(plan),
            other => Err(self.desync(peer, "plan", other.kind())),
        }
    }

    fn recv_row_count(&self, peer: usize) -> Result<usize> {
        match self.recv(peer)? {
            Message::RowCount(count) => Ok(count),
            other => Err(self.desync(peer, "row count", other.kind())),
        }
    }

    /// Receives one row and checks its length.
    fn recv_row(&self, peer: usize, row_len: usize) -> Result<RowBuffer> {
        match self.recv(peer)? {
            Message::Row(row) if row.len() == row_len => Ok(row),
            Message::Row(row) => Err(self.desync(
                peer,
                &format!("row of {row_len} samples"),
                &format!("row of {} samples", row.len()),
            )),
            other => Err(self.desync(peer, "row", other.kind())),
        }
    }

    fn desync(&self, peer: usize, expected: &str, actual: &str) -> Error {
        Error::ChannelTransferDesync {
            rank: self.rank(),
            peer,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
