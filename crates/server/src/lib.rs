pub mod cli;
pub mod logging;
pub mod state;
pub mod ws;
