pub mod diff;
pub mod timestamp;
