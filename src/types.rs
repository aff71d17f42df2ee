pub mod changes;
pub mod push;
pub mod schedule;
