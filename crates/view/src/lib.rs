pub mod deferred;
pub mod messages;
pub mod view;

pub use view::*;
