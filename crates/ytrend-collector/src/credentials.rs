//! API keys, their fingerprints, and rotation between them.

use sha2::{Digest, Sha256};
use ytrend_youtube::YoutubeError;

use crate::error::CollectError;
use crate::quota::QuotaTracker;
use crate::source::TrendingSource;

/// Stable, non-reversible identifier for an API key: the first 16 hex chars
/// of its SHA-256 digest. Safe to log and persist.
#[must_use]
pub fn fingerprint(key: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(key.as_bytes()));
    digest[..16].to_string()
}

/// One API key. `Debug` never prints the key.
#[derive(Clone)]
pub struct Credential {
    key: String,
    fingerprint: String,
}

impl Credential {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let fingerprint = fingerprint(&key);
        Self { key, fingerprint }
    }

    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Builds a [`TrendingSource`] bound to one API key.
pub trait Connector: Send + Sync {
    type Source: TrendingSource;

    /// # Errors
    ///
    /// Returns a [`YoutubeError`] if a client cannot be built for `api_key`.
    fn connect(&self, api_key: &str) -> Result<Self::Source, YoutubeError>;
}

/// Usage one credential accumulated over a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialUsage {
    /// 0-based position in the rotation order.
    pub index: usize,
    pub fingerprint: String,
    pub requests_made: u64,
    pub quota_used: u64,
    pub daily_limit: u64,
}

/// The credential currently in use. Replaced as a whole on rotation.
///
/// Fields stay crate-private so `index` always names the credential whose
/// client is in `source`.
pub struct ActiveCredential<S> {
    pub(crate) index: usize,
    pub(crate) tracker: QuotaTracker,
    pub(crate) source: S,
}

impl<S> ActiveCredential<S> {
    /// 0-based position of this credential in the rotation order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn tracker(&self) -> &QuotaTracker {
        &self.tracker
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RetiredUsage {
    requests: u64,
    cost: u64,
    touched: bool,
}

/// Owns the ordered credential list and the single active credential.
pub struct CredentialRotator<C: Connector> {
    credentials: Vec<Credential>,
    connector: C,
    daily_limit: u64,
    /// Units already spent today per credential, from persisted usage plus
    /// whatever earlier runs of this process reported.
    seeds: Vec<u64>,
    retired: Vec<RetiredUsage>,
    active: ActiveCredential<C::Source>,
}

impl<C: Connector> CredentialRotator<C> {
    /// Connects the first credential. `seeds[i]` is the usage already spent
    /// today by credential `i`; missing entries count as zero.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::NoCredentials`] for an empty list, or
    /// [`CollectError::Client`] if the first client cannot be built.
    pub fn new(
        credentials: Vec<Credential>,
        connector: C,
        daily_limit: u64,
        seeds: &[u64],
    ) -> Result<Self, CollectError> {
        let Some(first) = credentials.first() else {
            return Err(CollectError::NoCredentials);
        };
        let seeds: Vec<u64> = (0..credentials.len())
            .map(|i| seeds.get(i).copied().unwrap_or(0))
            .collect();
        let source = connector.connect(&first.key)?;
        let active = ActiveCredential {
            index: 0,
            tracker: QuotaTracker::seeded(daily_limit, seeds[0]),
            source,
        };
        let retired = vec![RetiredUsage::default(); credentials.len()];

        Ok(Self {
            credentials,
            connector,
            daily_limit,
            seeds,
            retired,
            active,
        })
    }

    #[must_use]
    pub fn active(&self) -> &ActiveCredential<C::Source> {
        &self.active
    }

    pub(crate) fn active_mut(&mut self) -> &mut ActiveCredential<C::Source> {
        &mut self.active
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    #[must_use]
    pub fn daily_limit(&self) -> u64 {
        self.daily_limit
    }

    /// Switches to the next credential in order, wrapping around.
    ///
    /// The next client is built before anything changes; the active state is
    /// then replaced in one assignment. Returns `false`, leaving everything
    /// untouched, with a single credential or when the next client cannot be
    /// built.
    pub fn rotate(&mut self) -> bool {
        if self.credentials.len() <= 1 {
            tracing::warn!("quota rotation requested but only one API key is configured");
            return false;
        }

        let from = self.active.index;
        let next = (from + 1) % self.credentials.len();
        let credential = &self.credentials[next];
        let source = match self.connector.connect(&credential.key) {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(
                    key_number = next + 1,
                    fingerprint = %credential.fingerprint,
                    error = %e,
                    "failed to build client for next API key; staying on current key"
                );
                return false;
            }
        };

        self.retire_active();
        let consumed = self.seeds[next].saturating_add(self.retired[next].cost);
        self.active = ActiveCredential {
            index: next,
            tracker: QuotaTracker::seeded(self.daily_limit, consumed),
            source,
        };

        tracing::info!(
            from_key = from + 1,
            to_key = next + 1,
            fingerprint = %self.credentials[next].fingerprint,
            remaining = self.active.tracker.remaining(),
            "rotated to next API key"
        );
        true
    }

    /// Rotates until the active tracker can afford `cost`, trying each other
    /// credential at most once. Returns `false` if none can.
    pub fn ensure_capacity(&mut self, cost: u64) -> bool {
        let mut attempts = 0;
        while !self.active.tracker.can_proceed(cost) {
            if attempts + 1 >= self.credentials.len() || !self.rotate() {
                return false;
            }
            attempts += 1;
        }
        true
    }

    /// Drains the usage accumulated since the last call, one entry per
    /// credential touched, ordered by index. The active credential is always
    /// included, so the result is never empty.
    pub fn take_usage(&mut self) -> Vec<CredentialUsage> {
        self.retire_active();

        let mut usage = Vec::new();
        for (index, retired) in self.retired.iter_mut().enumerate() {
            if !retired.touched && index != self.active.index {
                continue;
            }
            usage.push(CredentialUsage {
                index,
                fingerprint: self.credentials[index].fingerprint.clone(),
                requests_made: retired.requests,
                quota_used: retired.cost,
                daily_limit: self.daily_limit,
            });
            self.seeds[index] = self.seeds[index].saturating_add(retired.cost);
            *retired = RetiredUsage::default();
        }

        self.active.tracker = QuotaTracker::seeded(self.daily_limit, self.seeds[self.active.index]);
        usage
    }

    /// Replaces the per-credential baseline, e.g. with fresh totals from the
    /// store at the start of a scheduled run, and resets in-memory usage.
    pub fn reseed(&mut self, seeds: &[u64]) {
        for (i, seed) in self.seeds.iter_mut().enumerate() {
            *seed = seeds.get(i).copied().unwrap_or(0);
        }
        self.retired.fill(RetiredUsage::default());
        self.active.tracker = QuotaTracker::seeded(self.daily_limit, self.seeds[self.active.index]);
    }

    /// Folds the active tracker's session usage into the ledger and zeroes
    /// its session baseline.
    fn retire_active(&mut self) {
        let requests = self.active.tracker.requests_made();
        let cost = self.active.tracker.session_cost();
        let consumed = self.active.tracker.consumed();

        let entry = &mut self.retired[self.active.index];
        entry.requests = entry.requests.saturating_add(requests);
        entry.cost = entry.cost.saturating_add(cost);
        entry.touched = true;
        self.active.tracker = QuotaTracker::seeded(self.daily_limit, consumed);
    }
}
