pub mod auto_sync;
mod config_cmd;
mod data;
mod sync_cmd;
mod workout;

pub use config_cmd::ConfigCommand;
pub use data::{ClearCommand, ExportCommand, ImportCommand};
pub use sync_cmd::SyncCommand;
pub use workout::{print_groups, HistoryCommand, LogCommand, RemoveCommand};
