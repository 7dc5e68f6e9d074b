// Mon Feb 02 2026 - Alex

pub mod discovery;

pub use discovery::{Discoverer, DiscoveryError, ExtensionDiscoverer, ListDiscoverer, SentinelDiscoverer};
