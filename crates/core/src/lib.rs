//! Pack opening engine. Keep this crate free of IO and platform concerns.

pub mod autoplay;
pub mod binder;
pub mod catalog;
pub mod config;
pub mod events;
pub mod names;
pub mod pack;
pub mod rarity;
pub mod rng;
pub mod sampler;
pub mod session;

pub use autoplay::*;
pub use binder::*;
pub use catalog::*;
pub use config::*;
pub use events::*;
pub use names::*;
pub use pack::*;
pub use rarity::*;
pub use rng::*;
pub use sampler::*;
pub use session::*;
