//! Dashboard statistics for the teacher and student home screens.

pub mod handlers;
