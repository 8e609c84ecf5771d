// Navigation core for browsing remote file trees - exposes all modules for testing

pub mod config;
pub mod nav;
pub mod services;
