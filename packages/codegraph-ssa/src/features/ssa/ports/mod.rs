//! SSA ports

pub mod cfg_emitter;

pub use cfg_emitter::CfgEmitter;
