pub mod messaging;

// Re-export messaging types
pub use messaging::CommandBus;
