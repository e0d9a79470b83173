#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod interaction;
pub mod ir;
pub mod layout;
pub mod layout_dump;
#[cfg(feature = "cli")]
pub mod logging;
pub mod overrides;
pub mod persist;
pub mod schedule;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
