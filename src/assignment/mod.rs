//! Assignment module: per-student assignment listings with submission state.

pub mod handlers;
