//! SQLite-backed local persistent store.
//!
//! Everything lives in one key-value table created from
//! `assets/schema.sql`. Values are plain strings, or JSON for the plan list
//! and the default profile.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use tokio::task;

use super::{LocalStore, PlanSecret};
use crate::{
    error::{LocalStoreResultExt, Result, ResultExt},
    models::User,
};

const PLANS_KEY: &str = "app:plans";
const DEFAULT_USER_KEY: &str = "app:defaultUser";
const DEFAULT_DISPLAY_NAME: &str = "Me";

fn access_key_key(plan_id: &str) -> String {
    format!("plan:{plan_id}:accessKey")
}

fn me_user_key(plan_id: &str) -> String {
    format!("plan:{plan_id}:meUserId")
}

fn pending_deletes_key(plan_id: &str) -> String {
    format!("plan:{plan_id}:pendingDeletes")
}

/// Connection to the key-value database.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Opens the database at `path` and creates the table if needed.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection =
            Connection::open(path).store_context("Failed to open database connection")?;
        connection
            .execute_batch(include_str!("../../assets/schema.sql"))
            .store_context("Failed to initialize database schema")?;
        Ok(Self { connection })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.connection
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .store_context("Failed to read value")
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.connection
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .store_context("Failed to write value")?;
        Ok(())
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.set(key, &serde_json::to_string(value)?)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.connection
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .store_context("Failed to remove value")?;
        Ok(())
    }

    /// Runs `f` inside a transaction, committing only if it succeeds.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        self.connection
            .execute_batch("BEGIN IMMEDIATE")
            .store_context("Failed to begin transaction")?;
        match f(self) {
            Ok(value) => {
                self.connection
                    .execute_batch("COMMIT")
                    .store_context("Failed to commit transaction")?;
                Ok(value)
            }
            Err(e) => {
                let _ = self.connection.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Deletes every application and plan key. Returns the number of rows
    /// removed.
    pub fn clear(&self) -> Result<usize> {
        self.connection
            .execute(
                "DELETE FROM kv WHERE key LIKE 'app:%' OR key LIKE 'plan:%'",
                [],
            )
            .store_context("Failed to clear store")
    }

    fn plan_ids(&self) -> Result<Vec<String>> {
        Ok(self.get_json(PLANS_KEY)?.unwrap_or_default())
    }
}

/// [`LocalStore`] over a SQLite file. Each call opens its own connection on
/// the blocking thread pool.
#[derive(Debug, Clone)]
pub struct SqliteLocalStore {
    db_path: PathBuf,
}

impl SqliteLocalStore {
    /// Creates the store and its schema at `db_path`.
    pub async fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            db_path: db_path.into(),
        };
        store.run(|_| Ok(())).await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            f(&mut db)
        })
        .await
        .with_context("Task join error")?
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn plan_ids(&self) -> Result<Vec<String>> {
        self.run(|db| db.plan_ids()).await
    }

    async fn add_plan(
        &self,
        id: &str,
        access_key: &str,
        me_user_id: Option<&str>,
    ) -> Result<()> {
        let id = id.to_string();
        let access_key = access_key.to_string();
        let me_user_id = me_user_id.map(String::from);

        self.run(move |db| {
            db.transaction(|db| {
                let mut ids = db.plan_ids()?;
                if !ids.contains(&id) {
                    ids.push(id.clone());
                }
                db.set_json(PLANS_KEY, &ids)?;
                db.set(&access_key_key(&id), &access_key)?;
                match &me_user_id {
                    Some(user_id) => db.set(&me_user_key(&id), user_id),
                    None => db.remove(&me_user_key(&id)),
                }
            })
        })
        .await
    }

    async fn remove_plan(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.run(move |db| {
            db.transaction(|db| {
                let mut ids = db.plan_ids()?;
                ids.retain(|known| known != &id);
                db.set_json(PLANS_KEY, &ids)?;
                db.remove(&access_key_key(&id))?;
                db.remove(&me_user_key(&id))?;
                db.remove(&pending_deletes_key(&id))
            })
        })
        .await
    }

    async fn plan_secret(&self, id: &str) -> Result<Option<PlanSecret>> {
        let id = id.to_string();
        self.run(move |db| {
            let access_key = db.get(&access_key_key(&id))?;
            let me_user_id = db.get(&me_user_key(&id))?;
            Ok(access_key
                .zip(me_user_id)
                .map(|(access_key, me_user_id)| PlanSecret {
                    access_key,
                    me_user_id,
                }))
        })
        .await
    }

    async fn me_user_id(&self, id: &str) -> Result<Option<String>> {
        let key = me_user_key(id);
        self.run(move |db| db.get(&key)).await
    }

    async fn access_key(&self, id: &str) -> Result<Option<String>> {
        let key = access_key_key(id);
        self.run(move |db| db.get(&key)).await
    }

    async fn set_me_user_id(&self, id: &str, user_id: &str) -> Result<()> {
        let key = me_user_key(id);
        let user_id = user_id.to_string();
        self.run(move |db| db.set(&key, &user_id)).await
    }

    async fn default_user(&self) -> Result<User> {
        self.run(|db| match db.get_json::<User>(DEFAULT_USER_KEY)? {
            Some(user) => Ok(user),
            None => {
                let user = User::new(DEFAULT_DISPLAY_NAME);
                db.set_json(DEFAULT_USER_KEY, &user)?;
                Ok(user)
            }
        })
        .await
    }

    async fn set_default_user(&self, user: &User) -> Result<()> {
        let user = user.normalized()?;
        self.run(move |db| db.set_json(DEFAULT_USER_KEY, &user)).await
    }

    async fn pending_deletes(&self, id: &str) -> Result<Vec<String>> {
        let key = pending_deletes_key(id);
        self.run(move |db| Ok(db.get_json(&key)?.unwrap_or_default()))
            .await
    }

    async fn add_pending_deletes(&self, id: &str, task_ids: &[String]) -> Result<()> {
        if task_ids.is_empty() {
            return Ok(());
        }
        let key = pending_deletes_key(id);
        let task_ids = task_ids.to_vec();
        self.run(move |db| {
            db.transaction(|db| {
                let mut pending: Vec<String> = db.get_json(&key)?.unwrap_or_default();
                for task_id in task_ids {
                    if !pending.contains(&task_id) {
                        pending.push(task_id);
                    }
                }
                db.set_json(&key, &pending)
            })
        })
        .await
    }

    async fn resolve_pending_deletes(&self, id: &str, task_ids: &[String]) -> Result<()> {
        if task_ids.is_empty() {
            return Ok(());
        }
        let key = pending_deletes_key(id);
        let task_ids = task_ids.to_vec();
        self.run(move |db| {
            db.transaction(|db| {
                let mut pending: Vec<String> = db.get_json(&key)?.unwrap_or_default();
                pending.retain(|task_id| !task_ids.contains(task_id));
                if pending.is_empty() {
                    db.remove(&key)
                } else {
                    db.set_json(&key, &pending)
                }
            })
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.run(|db| db.clear().map(|_| ())).await
    }
}
