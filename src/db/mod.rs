//! Database layer.
//!
//! Score rows rely on the store for uniqueness: `insert_score_if_absent`
//! writes at most one row per activity ID and reports whether it did.
//! There is no application-level locking around it.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{ScoredActivity, User, UserTokens};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TOKENS: &str = "tokens";
    /// Scored activities (keyed by activity_id)
    pub const SCORES: &str = "scores";
}

/// Store backend selected at startup.
#[derive(Clone)]
pub enum Db {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Db {
    // ─── Score Operations ────────────────────────────────────────

    /// Insert a score row unless one already exists for its activity ID.
    ///
    /// Returns `true` if a row was added, `false` for an existing ID.
    pub async fn insert_score_if_absent(&self, score: &ScoredActivity) -> Result<bool, AppError> {
        match self {
            Db::Firestore(db) => db.insert_score_if_absent(score).await,
            Db::Memory(db) => Ok(db.insert_score_if_absent(score)),
        }
    }

    /// Every stored score row.
    pub async fn list_scores(&self) -> Result<Vec<ScoredActivity>, AppError> {
        match self {
            Db::Firestore(db) => db.list_scores().await,
            Db::Memory(db) => Ok(db.list_scores()),
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, athlete_id: u64) -> Result<Option<User>, AppError> {
        match self {
            Db::Firestore(db) => db.get_user(athlete_id).await,
            Db::Memory(db) => Ok(db.get_user(athlete_id)),
        }
    }

    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        match self {
            Db::Firestore(db) => db.upsert_user(user).await,
            Db::Memory(db) => {
                db.upsert_user(user);
                Ok(())
            }
        }
    }

    // ─── Token Operations ────────────────────────────────────────

    pub async fn get_tokens(&self, athlete_id: u64) -> Result<Option<UserTokens>, AppError> {
        match self {
            Db::Firestore(db) => db.get_tokens(athlete_id).await,
            Db::Memory(db) => Ok(db.get_tokens(athlete_id)),
        }
    }

    pub async fn set_tokens(&self, athlete_id: u64, tokens: &UserTokens) -> Result<(), AppError> {
        match self {
            Db::Firestore(db) => db.set_tokens(athlete_id, tokens).await,
            Db::Memory(db) => {
                db.set_tokens(athlete_id, tokens);
                Ok(())
            }
        }
    }
}

impl From<FirestoreDb> for Db {
    fn from(db: FirestoreDb) -> Self {
        Db::Firestore(db)
    }
}

impl From<MemoryDb> for Db {
    fn from(db: MemoryDb) -> Self {
        Db::Memory(db)
    }
}
