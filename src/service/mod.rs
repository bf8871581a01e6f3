pub mod composer;
pub mod main_axum;
pub mod state;
