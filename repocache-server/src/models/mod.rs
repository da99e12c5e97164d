//! Domain models shared by the upstream client, the cache, and the HTTP layer

pub mod repository;

pub use repository::{Repository, UpstreamOwner, UpstreamRepo};
