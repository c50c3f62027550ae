#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod feedback;
pub mod reply;

pub use feedback::Feedback;
pub use reply::Reply;
