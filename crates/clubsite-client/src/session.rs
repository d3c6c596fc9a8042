//! Bearer token state and the 401 → refresh → retry-once policy.

use std::future::Future;
use std::sync::Mutex;

use crate::error::ClientError;
use crate::token::TokenStore;

/// How a single attempt at an API call ended.
#[derive(Debug)]
pub enum Reply<T> {
    Done(T),
    /// The server answered 401.
    Unauthorized,
}

#[derive(Debug, Default)]
struct TokenState {
    token: Option<String>,
    /// Bumped whenever the token is replaced or cleared.
    generation: u64,
}

/// Holds the access token and serializes refreshes.
///
/// When several calls get a 401 at once, the first one through the gate
/// refreshes and the rest reuse its outcome.
#[derive(Debug)]
pub struct Session {
    store: TokenStore,
    state: Mutex<TokenState>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl Session {
    /// Loads any saved token from `store`.
    pub fn open(store: TokenStore) -> Result<Self, ClientError> {
        let token = store.load()?;
        Ok(Self {
            store,
            state: Mutex::new(TokenState {
                token,
                generation: 0,
            }),
            refresh_gate: tokio::sync::Mutex::new(()),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.snapshot().0
    }

    /// Replaces the token and persists it.
    pub fn set_token(&self, token: String) -> Result<(), ClientError> {
        self.store.save(&token)?;
        self.replace(Some(token));
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.replace(None);
        self.store.clear()
    }

    /// Runs `send` with the current token. On a 401 the token is refreshed
    /// through `refresh` and `send` is tried exactly once more.
    pub async fn call<T, S, SFut, R, RFut>(&self, send: S, refresh: R) -> Result<T, ClientError>
    where
        S: Fn(Option<String>) -> SFut,
        SFut: Future<Output = Result<Reply<T>, ClientError>>,
        R: FnOnce() -> RFut,
        RFut: Future<Output = Result<String, ClientError>>,
    {
        let (token, generation) = self.snapshot();
        if let Reply::Done(value) = send(token).await? {
            return Ok(value);
        }

        let fresh = self.refresh_after(generation, refresh).await?;
        match send(Some(fresh)).await? {
            Reply::Done(value) => Ok(value),
            Reply::Unauthorized => Err(ClientError::Unauthorized),
        }
    }

    async fn refresh_after<R, RFut>(&self, seen: u64, refresh: R) -> Result<String, ClientError>
    where
        R: FnOnce() -> RFut,
        RFut: Future<Output = Result<String, ClientError>>,
    {
        let _gate = self.refresh_gate.lock().await;

        let (token, generation) = self.snapshot();
        if generation != seen {
            // Someone else refreshed (or failed to) while we waited.
            return token.ok_or(ClientError::Unauthorized);
        }

        log::info!("Access token rejected, refreshing");
        match refresh().await {
            Ok(token) => {
                self.set_token(token.clone())?;
                Ok(token)
            }
            Err(err) => {
                log::warn!("Token refresh failed: {err}");
                self.clear()?;
                Err(ClientError::Unauthorized)
            }
        }
    }

    fn snapshot(&self) -> (Option<String>, u64) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        (state.token.clone(), state.generation)
    }

    fn replace(&self, token: Option<String>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.token = token;
        state.generation += 1;
    }
}
