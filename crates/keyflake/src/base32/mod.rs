mod crockford;
mod error;
mod interface;

pub use crockford::*;
pub use error::*;
pub use interface::*;
