pub mod rfq;

pub use rfq::*;
