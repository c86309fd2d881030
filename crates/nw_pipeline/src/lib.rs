pub mod loader;
pub mod runner;

pub use loader::load;
pub use runner::{Pipeline, RunSummary};

pub mod prelude {
    pub use super::{Pipeline, RunSummary};
    pub use nw_core::{LoadPolicy, RawStore, Result, RunState};
}
