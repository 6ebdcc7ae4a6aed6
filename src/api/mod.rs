// API module - HTTP endpoints

pub mod attendance;
pub mod auth;
pub mod branches;
pub mod cards;
pub mod devices;
pub mod events;
pub mod finance;
pub mod health;
pub mod members;
pub mod middleware;
pub mod scan;
pub mod transfers;
