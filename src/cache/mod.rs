// Preloaded-query cache module.
// Fingerprints, shared fetch handles and the per-environment handle cache.

pub mod fingerprint;
pub mod handle;
pub mod preload;

pub use fingerprint::Fingerprint;
pub use handle::{FetchHandle, FetchPolicy, FetchStatus};
pub use preload::{FetchOptions, PreloadCache};
