//! Profile listing command handler

use super::utils::build_registry;
use crate::config::Config;
use crate::error::Result;
use crate::output::{OutputWriter, ProfileEntry};
use tracing::debug;

/// Handle the profiles command
pub fn handle_profiles(config: &Config, output: &mut OutputWriter) -> Result<()> {
    let registry = build_registry(config)?;
    let profiles: Vec<ProfileEntry> = registry.profiles().map(ProfileEntry::from).collect();
    debug!(count = profiles.len(), "Listing profiles");
    output.profiles(&profiles)
}
