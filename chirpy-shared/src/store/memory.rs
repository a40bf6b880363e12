//! In-memory implementation of the store traits.
//!
//! Every operation takes the single lock once, so each call is atomic with
//! respect to every other call, matching the single-row guarantees of the
//! Postgres backend. Data is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChirpStore, RefreshTokenRepository, StoreError, StoreResult, UserStore};
use crate::models::{
    chirp::{Chirp, ChirpQuery, CreateChirp, SortOrder},
    refresh_token::RefreshToken,
    user::{CreateUser, User},
};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    /// Insertion order doubles as creation order
    chirps: Vec<Chirp>,
    refresh_tokens: HashMap<String, RefreshToken>,
}

/// All stores backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict("Email already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Option<User>> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::Conflict("Email already exists".to_string()));
        }

        Ok(state.users.get_mut(&id).map(|user| {
            user.email = email.to_string();
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_to_red(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        match state.users.get_mut(&id) {
            Some(user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reset(&self) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let removed = state.users.len() as u64;

        state.users.clear();
        state.chirps.clear();
        state.refresh_tokens.clear();

        Ok(removed)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ChirpStore for MemoryStore {
    async fn create(&self, data: CreateChirp) -> StoreResult<Chirp> {
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            body: data.body,
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.chirps.push(chirp.clone());

        Ok(chirp)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Chirp>> {
        let state = self.state.read().await;
        Ok(state.chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self, query: ChirpQuery) -> StoreResult<Vec<Chirp>> {
        let state = self.state.read().await;

        let mut chirps: Vec<Chirp> = state
            .chirps
            .iter()
            .filter(|c| query.author_id.map_or(true, |author| c.user_id == author))
            .cloned()
            .collect();

        if query.sort == SortOrder::Desc {
            chirps.reverse();
        }

        Ok(chirps)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.chirps.len();
        state.chirps.retain(|c| c.id != id);

        Ok(state.chirps.len() < before)
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn insert(&self, token: &RefreshToken) -> StoreResult<()> {
        let mut state = self.state.write().await;

        if state.refresh_tokens.contains_key(&token.token) {
            return Err(StoreError::Conflict("Refresh token already exists".to_string()));
        }
        state.refresh_tokens.insert(token.token.clone(), token.clone());

        Ok(())
    }

    async fn find(&self, token: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(self.state.read().await.refresh_tokens.get(token).cloned())
    }

    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> StoreResult<Option<RefreshToken>> {
        let mut state = self.state.write().await;

        Ok(state.refresh_tokens.get_mut(token).map(|record| {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(at);
                record.updated_at = at;
            }
            record.clone()
        }))
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let count = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, record| record.expires_at >= before);

        Ok((count - state.refresh_tokens.len()) as u64)
    }
}
