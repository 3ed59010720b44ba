pub mod config;
pub mod geocode;
pub mod login;
pub mod seed;
