pub mod models;
pub mod resolver;
