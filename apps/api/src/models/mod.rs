pub mod fridge;
pub mod item;
pub mod shopping;

pub use fridge::{Fridge, NewFridge};
pub use item::{DatedItem, ItemUpdate, NewItem};
pub use shopping::ShoppingEntry;
