//! SSA feature
//!
//! Value graph, on-demand phi construction and the structured control-flow
//! builders the lowering drives.
//!
//! - domain/         - Arena ids, values, blocks, functions, variables
//! - infrastructure/ - Value graph, scope arena, Braun phi resolver, cursor,
//!                     control-flow builders, renderer
//! - ports/          - `CfgEmitter` seam between builders and the lowering

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::*;
pub use infrastructure::*;
pub use ports::CfgEmitter;
