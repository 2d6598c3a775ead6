pub mod api;
pub mod chars;
pub mod clock;
pub mod config;
pub mod consts;
pub mod distribution;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod proximity;
pub mod state;
pub mod synth;
pub mod trace;

pub use api::{DecodeReport, Decoder};
pub use error::{DecoderError, DgResult};
pub use proximity::ProximityInfo;
pub use state::{GestureState, InputMode};
pub use trace::InputTrace;
