pub mod chat;
pub mod handoff;
pub mod health;
pub mod tools;
