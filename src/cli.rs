//! CLI domain: parse, route, output and presentation only.
//! Route table dispatches to the primitive operations and the store.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, StoreCommands};
pub use presentation::{
    format_info_json, format_info_table, format_store_list_json, format_store_list_text,
    format_string_json,
};
pub use route::{parse_elements, RunContext};
