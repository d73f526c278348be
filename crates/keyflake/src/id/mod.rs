mod interface;
mod record;
#[cfg(feature = "serde")]
mod serde;

pub use interface::*;
pub use record::*;
