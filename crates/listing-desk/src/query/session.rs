use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    tokens: Option<SessionTokens>,
    profile: Option<UserProfile>,
    /// Bumped on every token change so concurrent refreshers can tell whether
    /// someone else already rotated the tokens they saw fail.
    generation: u64,
}

/// Signed-in user's tokens and cached profile, shared by API clients.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
    refresh_gate: Mutex<()>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: SessionTokens) -> Self {
        let session = Self::new();
        session.sign_in(tokens, None);
        session
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().tokens.is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read()
            .tokens
            .as_ref()
            .map(|tokens| tokens.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read()
            .tokens
            .as_ref()
            .map(|tokens| tokens.refresh_token.clone())
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.read().profile.clone()
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn sign_in(&self, tokens: SessionTokens, profile: Option<UserProfile>) {
        let mut state = self.write();
        state.tokens = Some(tokens);
        state.profile = profile;
        state.generation += 1;
    }

    pub fn rotate(&self, tokens: SessionTokens) {
        let mut state = self.write();
        state.tokens = Some(tokens);
        state.generation += 1;
    }

    pub fn clear(&self) {
        let mut state = self.write();
        state.tokens = None;
        state.profile = None;
        state.generation += 1;
    }

    /// Held while a refresh is in flight so only one caller refreshes.
    pub(crate) fn refresh_gate(&self) -> &Mutex<()> {
        &self.refresh_gate
    }
}
