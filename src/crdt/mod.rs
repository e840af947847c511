//! Causal, convergent state types used by the gossip protocol: a
//! last-writer-wins map and a grow/shrink counter, both merged under
//! concurrent updates without coordination.

pub mod error;
pub mod lww_map;
pub mod pn_counter;
pub mod timestamp;

pub use error::CrdtError;
pub use lww_map::LwwMap;
pub use pn_counter::PnCounter;
pub use timestamp::Timestamp;
