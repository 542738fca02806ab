pub mod charts;
pub mod data;
pub mod engine;
pub mod layout;
pub mod logging;
pub mod server;
pub mod state;
