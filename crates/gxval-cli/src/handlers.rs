//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod profiles;
mod rules;
mod utils;
mod validate;

pub use profiles::handle_profiles;
pub use rules::handle_rules;
pub use validate::handle_validate;
