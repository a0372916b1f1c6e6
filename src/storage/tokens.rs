//! Saved token store

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;

use crate::errors::Result;
use crate::models::types::Token;
use crate::storage::{load_or_default, read_lock, save_json, write_lock};

pub struct TokenStore {
    tokens: RwLock<Vec<Token>>,
    path: PathBuf,
}

impl TokenStore {
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join("tokens.json");
        let tokens = load_or_default(&path)?;
        Ok(Self {
            tokens: RwLock::new(tokens),
            path,
        })
    }

    /// Insert or replace by id, stamping timestamps. The creation time of
    /// an existing token is preserved.
    pub fn save(&self, mut token: Token) -> Result<()> {
        let mut tokens = write_lock(&self.tokens);
        let now = Utc::now();
        token.updated_at = now;
        if let Some(existing) = tokens.iter_mut().find(|t| t.id == token.id) {
            token.created_at = existing.created_at;
            *existing = token;
        } else {
            token.created_at = now;
            tokens.push(token);
        }
        save_json(&self.path, &*tokens)
    }

    pub fn list(&self) -> Vec<Token> {
        read_lock(&self.tokens).clone()
    }

    pub fn get(&self, id: &str) -> Option<Token> {
        read_lock(&self.tokens).iter().find(|t| t.id == id).cloned()
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut tokens = write_lock(&self.tokens);
        if let Some(pos) = tokens.iter().position(|t| t.id == id) {
            tokens.remove(pos);
            return save_json(&self.path, &*tokens);
        }
        Ok(())
    }
}
