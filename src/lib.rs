pub mod cli;
pub mod config;
pub mod query;
pub mod refresh;
pub mod schema;
pub mod source;
pub mod transform;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use refresh::{refresh_database, run_refresh, RefreshSummary};
pub use ui::{Phase, PlainUi, SilentUi, Ui, UiApp};
