pub mod lifecycle;
pub mod logic;

pub use lifecycle::SessionStore;
