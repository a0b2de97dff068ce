pub mod api;
pub mod menu;
pub mod message;
pub mod reply;
