//! Blueprint domain models

pub mod blueprint;

pub use blueprint::{Blueprint, BlueprintKind, BlueprintState, MemberTable, CONSTRUCTOR};
