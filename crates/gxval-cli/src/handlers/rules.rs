//! Rule catalogue command handler

use crate::error::Result;
use crate::output::{OutputWriter, RuleEntry};
use gxval_core::IssueCode;
use tracing::debug;

/// Handle the rules command
pub fn handle_rules(output: &mut OutputWriter) -> Result<()> {
    let rules: Vec<RuleEntry> = IssueCode::all().map(RuleEntry::from).collect();
    debug!(count = rules.len(), "Listing rule catalogue");
    output.rules(&rules)
}
