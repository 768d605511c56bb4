//! Stage sequencing
//!
//! The state machine a scenario run moves through and the sequencer that
//! drives it.

pub mod sequencer;
pub mod state;


pub use sequencer::{StageSequencer, STDERR_TAIL_LINES};
pub use state::{FailureReason, SequenceState};
