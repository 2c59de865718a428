pub mod email;
pub mod quote;

pub use email::*;
pub use quote::*;
