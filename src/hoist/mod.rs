pub mod audit;
pub mod config;
pub mod lockfile;
pub mod paths;
pub mod scan;
pub mod tracker;
pub mod util;
pub mod vcs_cache;
pub mod warn;
