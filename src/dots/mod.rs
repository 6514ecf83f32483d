pub mod messages;
pub mod model;
pub mod monitor;
pub mod overlay;
pub mod platform;
pub mod render;
pub mod sim;
pub mod state;

pub use model::{Particle, SpawnRanges, Viewport};
pub use overlay::DotsOverlay;
pub use sim::{ParticleField, TickClock};
