pub mod config;
pub mod droplet;
pub mod handlers;
pub mod observability;
pub mod startup;
