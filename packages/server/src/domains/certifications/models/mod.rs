pub mod certification;

pub use certification::*;
