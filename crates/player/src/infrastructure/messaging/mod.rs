//! Command Bus messaging infrastructure.
//!
//! `CommandBus` is the in-process side of the save channel. A transport task
//! (WebSocket, IPC, or a test harness) drains its receiver and feeds service
//! replies back through [`CommandBus::receive`].

pub mod command_bus;

pub use command_bus::CommandBus;
