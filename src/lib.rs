pub mod app;
pub mod discovery;
pub mod handlers;
pub mod models;
pub mod playback;
pub mod render;
pub mod service;
pub mod utils;
