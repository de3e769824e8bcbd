//! Shared configuration for Monitor Manager: the per-user config directory,
//! the JSON files for settings, shortcuts and favorites, and the
//! "start with Windows" registry entry.

pub mod config;
pub mod startup;
