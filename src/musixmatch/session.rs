//! Musixmatch session token lifecycle
//!
//! The desktop API hands out anonymous `user_token`s that stop working after
//! about a minute. [`SessionManager`] keeps the current one in memory and on
//! disk, and makes sure concurrent callers share a single refresh.

use crate::error::LyricsError;
use crate::musixmatch::token_store::TokenStore;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(55);
pub const DEFAULT_TOKEN_NAME: &str = "musixmatch_token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub value: String,
    /// Unix time in milliseconds
    #[serde(rename = "expires")]
    pub expires_at: u64,
}

impl Credential {
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at
    }
}

/// Where fresh tokens come from.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> anyhow::Result<String>;
}

pub trait Clock: Send + Sync {
    /// Unix time in milliseconds
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

type RefreshOutcome = Result<Credential, Arc<anyhow::Error>>;
type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Default)]
struct State {
    credential: Option<Credential>,
    store_checked: bool,
    pending: Option<PendingRefresh>,
}

struct Inner {
    source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    store: Option<(TokenStore, String)>,
    ttl: Duration,
    state: Mutex<State>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn refresh(self: Arc<Self>) -> RefreshOutcome {
        let now = self.clock.now_ms();
        info!("fetching musixmatch token");
        let outcome = self.source.fetch_token().await.map(|value| Credential {
            value,
            expires_at: now + self.ttl.as_millis() as u64,
        });

        {
            let mut st = self.lock_state();
            st.pending = None;
            match &outcome {
                Ok(cred) => st.credential = Some(cred.clone()),
                Err(e) => warn!("musixmatch token fetch failed: {:#}", e),
            }
        }

        if let Ok(cred) = &outcome {
            self.persist(cred).await;
        }
        outcome.map_err(Arc::new)
    }

    /// Best-effort: the in-memory credential stays valid whatever happens here.
    async fn persist(&self, cred: &Credential) {
        let Some((store, name)) = &self.store else {
            return;
        };
        if let Err(e) = store.save(name, cred).await {
            warn!("could not persist musixmatch token: {:#}", e);
        }
    }
}

pub struct SessionManagerBuilder {
    source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    store: Option<(TokenStore, String)>,
    ttl: Duration,
}

impl SessionManagerBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(mut self, store: TokenStore, name: impl Into<String>) -> Self {
        self.store = Some((store, name.into()));
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn build(self) -> SessionManager {
        SessionManager {
            inner: Arc::new(Inner {
                source: self.source,
                clock: self.clock,
                store: self.store,
                ttl: self.ttl,
                state: Mutex::new(State::default()),
            }),
        }
    }
}

/// Shared handle; clones see the same token and the same in-flight refresh.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn builder(source: Arc<dyn TokenSource>) -> SessionManagerBuilder {
        SessionManagerBuilder {
            source,
            clock: Arc::new(SystemClock),
            store: None,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// A valid token, from memory, disk or a fresh fetch in that order.
    pub async fn token(&self) -> Result<String, LyricsError> {
        self.load_from_store().await;

        let refresh = {
            let mut st = self.inner.lock_state();
            let now = self.inner.clock.now_ms();
            if let Some(cred) = st.credential.as_ref().filter(|c| c.is_fresh(now)) {
                return Ok(cred.value.clone());
            }
            if let Some(pending) = st.pending.clone() {
                debug!("joining in-flight token refresh");
                pending
            } else {
                let pending = Inner::refresh(self.inner.clone()).boxed().shared();
                st.pending = Some(pending.clone());
                pending
            }
        };

        refresh
            .await
            .map(|cred| cred.value)
            .map_err(|e| LyricsError::TokenUnavailable(format!("{:#}", e)))
    }

    /// Forget the in-memory token so the next call fetches a new one.
    pub fn invalidate(&self) {
        let mut st = self.inner.lock_state();
        st.credential = None;
        st.store_checked = true;
    }

    /// The disk cache is read at most once, and only while memory is empty.
    async fn load_from_store(&self) {
        let Some((store, name)) = &self.inner.store else {
            return;
        };
        {
            let st = self.inner.lock_state();
            if st.store_checked || st.credential.is_some() {
                return;
            }
        }

        let loaded = match store.load(name).await {
            Ok(cred) => cred,
            Err(e) => {
                warn!("ignoring cached musixmatch token: {:#}", e);
                None
            }
        };

        let mut st = self.inner.lock_state();
        st.store_checked = true;
        if st.credential.is_none() {
            if loaded.is_some() {
                debug!("loaded musixmatch token from {}", store.path_for(name).display());
            }
            st.credential = loaded;
        }
    }
}
