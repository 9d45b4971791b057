//! Quota-aware collection of the `YouTube` most-popular charts.
//!
//! The [`Collector`] walks regions × categories sequentially, paginating each
//! chart through a [`TrendingSource`] while a [`CredentialRotator`] keeps the
//! active API key inside its daily quota. A finished [`CollectionRun`] is
//! written out by [`persist_run`].

pub mod credentials;
pub mod error;
pub mod fetcher;
pub mod orchestrator;
pub mod persist;
pub mod quota;
pub mod snapshot;
pub mod source;

pub use credentials::{fingerprint, Connector, Credential, CredentialRotator, CredentialUsage};
pub use error::{CollectError, SnapshotError};
pub use fetcher::{fetch_trending, FetchOutcome, FetchRequest, PAGE_DELAY};
pub use orchestrator::{
    batch_id_for, CollectionPlan, CollectionRun, Collector, CollectorSettings,
};
pub use persist::{hydrate_quota_seeds, persist_run, PersistReport};
pub use quota::{QuotaTracker, VIDEOS_LIST_COST};
pub use snapshot::{snapshot_path, write_snapshot};
pub use source::{TrendingSource, YoutubeConnector};
