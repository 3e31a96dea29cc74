pub mod poll;
pub mod sync;
