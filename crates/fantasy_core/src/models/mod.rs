//! Roster data model: entities (players) grouped into teams.

pub mod entity;
pub mod roster;

pub use entity::{Entity, EntityRecord, DRIVER_POSITION};
pub use roster::{Group, GroupRecord, Roster};
