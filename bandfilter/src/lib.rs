//! Bandfilter - row-band parallel 3x3 convolution.
//!
//! The image is split into contiguous row bands, one per participant. Before
//! every filter pass, row-adjacent participants trade their boundary rows
//! (halo exchange) so edge pixels see their true neighbours; afterwards the
//! coordinator stitches the bands back together. The result is byte-identical
//! to filtering the whole image in one piece.
//!
//! ```no_run
//! use bandfilter::{job, FilterPlan, Image, UnknownFilterPolicy};
//!
//! # fn main() -> bandfilter::Result<()> {
//! let image = Image::read_file("input.pgm")?;
//! let parsed = FilterPlan::parse(["blur", "sharpen"], UnknownFilterPolicy::Skip)?;
//! let (output, report) = job::run(image, &parsed.plan, 4)?;
//! output.save_file("output.pgm")?;
//! println!("{} passes in {:?}", report.passes, report.elapsed);
//! # Ok(())
//! # }
//! ```

pub mod comm;
pub mod config;
pub mod convolve;
pub mod error;
pub mod halo;
pub mod image;
pub mod job;
pub mod kernel;
pub mod participant;
pub mod partition;
pub mod plan;

// ============================================================================
// Re-exports
// ============================================================================

pub use comm::{build_mesh, ChannelCommunicator, Communicator, Message};
pub use config::{JobSettings, RunConfig};
pub use error::{Error, Result};
pub use image::{ChannelCount, Image, ImageDesc, RowBuffer};
pub use job::JobReport;
pub use kernel::{Filter, Kernel};
pub use participant::{Coordinator, Participant, Worker};
pub use partition::{BandLayout, Partition, RowRange};
pub use plan::{FilterPlan, ParsedPlan, UnknownFilterPolicy};
