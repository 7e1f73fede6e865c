use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::codec::EncodedImage;
use crate::models::{RecommendationResult, Selections};

/// A successful round trip together with the selections that produced it.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StoredResult {
    pub result: RecommendationResult,
    pub selections: Selections,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SessionState {
    pub id: Uuid,
    pub selections: Selections,
    #[serde(skip)]
    pub photo: Option<EncodedImage>,
    pub has_photo: bool,
    pub last: Option<StoredResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            selections: Selections::default(),
            photo: None,
            has_photo: false,
            last: None,
            created_at: now,
            updated_at: now,
        }
    }
}

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;

/// Per-session state keyed by id. Sessions never see each other's data.
/// Sessions idle for longer than `ttl` are treated as gone and swept on `create`.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionState>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }
}

impl SessionStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { inner: Arc::default(), ttl }
    }

    fn is_live(&self, session: &SessionState, now: DateTime<Utc>) -> bool {
        now - session.updated_at <= self.ttl
    }

    pub fn create(&self) -> SessionState {
        let id = Uuid::new_v4();
        let session = SessionState::new(id);
        let mut guard = self.inner.write();
        let before = guard.len();
        guard.retain(|_, s| self.is_live(s, session.created_at));
        let evicted = before - guard.len();
        if evicted > 0 {
            info!("🧹 Evicted {} idle sessions", evicted);
        }
        guard.insert(id, session.clone());
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<SessionState> {
        self.inner.read().get(id).filter(|s| self.is_live(s, Utc::now())).cloned()
    }

    fn live_mut<'a>(&self, guard: &'a mut HashMap<Uuid, SessionState>, id: &Uuid) -> Option<&'a mut SessionState> {
        let now = Utc::now();
        guard.get_mut(id).filter(|s| self.is_live(s, now))
    }

    /// Records the latest form state. A new photo replaces the held one; `None` keeps it.
    pub fn record_input(&self, id: &Uuid, selections: Selections, photo: Option<EncodedImage>) -> Option<SessionState> {
        let mut guard = self.inner.write();
        let session = self.live_mut(&mut guard, id)?;
        session.selections = selections;
        if let Some(photo) = photo {
            session.photo = Some(photo);
            session.has_photo = true;
        }
        session.updated_at = Utc::now();
        Some(session.clone())
    }

    /// Replaces the last result wholesale.
    pub fn store_result(&self, id: &Uuid, stored: StoredResult) -> bool {
        let mut guard = self.inner.write();
        match self.live_mut(&mut guard, id) {
            Some(session) => {
                session.last = Some(stored);
                session.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}
