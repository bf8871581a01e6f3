pub mod plan;
pub mod sequencer;
