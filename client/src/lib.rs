mod app;
mod config;
mod dom;
mod export;
mod host;
mod keys;
mod logging;
mod panel;
mod render;
mod stamp_pad;
mod state;

pub use app::run;
pub use config::ClientConfig;
