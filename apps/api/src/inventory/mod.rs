// Fridge contents: expiry classification, listing, and the HTTP surface.
// Classification is pure and takes "today" from the caller; only handlers
// read the clock.

pub mod digest;
pub mod expiry;
pub mod handlers;
pub mod listing;
