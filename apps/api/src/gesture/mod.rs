pub mod handlers;
pub mod registry;
pub mod shake;
