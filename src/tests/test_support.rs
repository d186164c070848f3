use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::Error;
use crate::token::{TokenData, TokenStore};

#[derive(Clone, Copy)]
pub enum RefreshBehavior {
    Issue,
    Reject,
    Fail,
}

/// Token store double counting refresh and removal calls.
pub struct FakeStore {
    tokens: Mutex<Option<TokenData>>,
    issued: String,
    behavior: RefreshBehavior,
    gate: Option<Arc<Notify>>,
    refresh_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl FakeStore {
    pub fn new(tokens: Option<TokenData>) -> Self {
        Self {
            tokens: Mutex::new(tokens),
            issued: "fresh".to_string(),
            behavior: RefreshBehavior::Issue,
            gate: None,
            refresh_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_tokens(access: &str, refresh: Option<&str>) -> Self {
        Self::new(Some(TokenData::new(access, refresh.map(str::to_string))))
    }

    pub fn behavior(mut self, behavior: RefreshBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Blocks every refresh until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    /// Simulates a fresh login.
    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) {
        *self.tokens.lock().unwrap() = Some(TokenData::new(access, refresh.map(str::to_string)));
    }
}

#[async_trait]
impl TokenStore for FakeStore {
    async fn get_token(&self) -> Result<Option<String>, Error> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .as_ref()
            .map(|t| t.access_token.clone()))
    }

    async fn get_token_data(&self) -> Result<Option<TokenData>, Error> {
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<Option<String>, Error> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.behavior {
            RefreshBehavior::Issue => {
                *self.tokens.lock().unwrap() = Some(TokenData::new(
                    self.issued.clone(),
                    Some(refresh_token.to_string()),
                ));
                Ok(Some(self.issued.clone()))
            }
            RefreshBehavior::Reject => Ok(None),
            RefreshBehavior::Fail => Err(Error::TokenStore("issuer unreachable".into())),
        }
    }

    async fn remove_token(&self) -> Result<(), Error> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        *self.tokens.lock().unwrap() = None;
        Ok(())
    }
}
