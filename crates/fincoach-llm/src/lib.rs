mod client;

pub use client::OpenAiProvider;
