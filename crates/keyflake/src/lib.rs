#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base32;
pub mod generator;
pub mod id;
pub mod page;
pub mod time;

pub use crate::generator::{
    AtomicSnowflakeGenerator, Error, IdMinter, LockSnowflakeGenerator, MinterConfig, Poll, Result,
    RollbackPolicy, SnowflakeGenerator,
};
pub use crate::id::{RecordId, SnowflakeId};
pub use crate::page::{
    Cursor, Filter, KeysetPaginator, Page, PageRequest, PageSize, PageSource, Record,
    SortDirection, SortKey, Value,
};
pub use crate::time::{MEDIA_EPOCH, MonotonicClock, SystemClock, TimeSource};
