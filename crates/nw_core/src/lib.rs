pub mod error;
pub mod runstate;
pub mod storage;
pub mod types;

pub use error::Error;
pub use runstate::{RunState, ROW_COUNT_KEY, ROW_SET_KEY};
pub use storage::{LoadPolicy, LoadReport, RawStore, RowFailure};
pub use types::Article;

pub type Result<T> = std::result::Result<T, Error>;
