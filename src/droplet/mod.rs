//! Helpers for scripts running inside the application container.

mod ports;
mod procfile;

pub use ports::{PORT_CHECK_TIMEOUT, PortError, find_port, port_bound};
pub use procfile::{PROCFILE, find_start_command};
