pub mod health;
pub mod overlay;
pub mod queue;
pub mod redis;
