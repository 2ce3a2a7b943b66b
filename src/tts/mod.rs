pub mod client;
pub mod composer;

pub use client::{AudioFetcher, HttpAudioFetcher};
pub use composer::UrlComposer;
