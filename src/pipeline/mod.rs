//! LLM Pipeline Module
//!
//! The scripted walk through a simplified language-model pipeline:
//!
//! - `stage`: the seven fixed diagram stages and their connections
//! - `script`: the ordered list of move, ramp and pause steps
//! - `sequencer`: executes the script and publishes observable state
//! - `clock`: the suspension points the sequencer awaits
//! - `palette`: stage colors derived from the gauge values
//!
//! Nothing here depends on the terminal; the views only read
//! `SequencerState`.

pub mod clock;
pub mod palette;
pub mod script;
pub mod sequencer;
pub mod stage;

pub use clock::{Clock, InstantClock, TokioClock};
pub use script::{Gauge, Script};
pub use sequencer::{Sequencer, SequencerState};
pub use stage::Stage;
