pub mod handlers;
pub mod list;
