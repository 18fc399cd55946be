pub mod cache;
pub mod config;
pub mod errors;
pub mod imaging;
pub mod models;
pub mod pipeline;
pub mod resolvers;
pub mod roster;
