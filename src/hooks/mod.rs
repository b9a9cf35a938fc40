//! Feature hooks: glue between the player's DOM and its reactive store.
//! These only run in the browser.

pub mod context;
pub mod player;

pub use context::PlayerContext;
pub use player::{init, use_player};
