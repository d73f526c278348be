mod atomic;
mod error;
mod interface;
mod lock;
mod minter;
mod mutex;
mod status;

pub use atomic::*;
pub use error::*;
pub use interface::*;
pub use lock::*;
pub use minter::*;
pub(crate) use mutex::*;
pub use status::*;
