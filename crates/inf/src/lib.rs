#![warn(clippy::unwrap_used)]

pub mod cast;
pub mod duration;
pub mod progressinfo;

#[doc(inline)]
pub use progressinfo::CancellationToken;
#[doc(inline)]
pub use progressinfo::ProgressNotification;
