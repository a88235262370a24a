//! CRUD operations for [`User`] directory records.

use chrono::{DateTime, Utc};
use collabryta_shared::constants::{DEFAULT_USER_ROLE, DEFAULT_USER_STATUS};
use rusqlite::params;

use crate::database::{decode_opt_ts, decode_ts, encode_ts, Database};
use crate::error::{Result, StoreError};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, email, name, role, is_active, status, last_seen, created_at";

impl Database {
    /// Register a user and return the stored record.
    pub fn create_user(&self, user: &NewUser, now: DateTime<Utc>) -> Result<User> {
        self.conn().execute(
            "INSERT INTO users (email, name, role, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.email,
                user.name,
                user.role.as_deref().unwrap_or(DEFAULT_USER_ROLE),
                DEFAULT_USER_STATUS,
                encode_ts(&now),
            ],
        )?;
        self.get_user(self.conn().last_insert_rowid())
    }

    pub fn get_user(&self, id: i64) -> Result<User> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .map_err(StoreError::from_lookup)
    }

    /// Like [`Database::get_user`] but absence is `Ok(None)`.
    pub fn find_user(&self, id: i64) -> Result<Option<User>> {
        match self.get_user(id) {
            Ok(user) => Ok(Some(user)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List users ordered by id.
    pub fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC LIMIT ?1 OFFSET ?2"
        ))?;

        let rows = stmt.query_map(params![limit, skip], row_to_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    /// Of the given ids, return those that belong to existing users, ascending
    /// and without duplicates.
    pub fn existing_user_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        let mut stmt = self.conn().prepare("SELECT 1 FROM users WHERE id = ?1")?;
        let mut found: Vec<i64> = Vec::new();
        for id in ids {
            if stmt.exists(params![id])? {
                found.push(*id);
            }
        }
        found.sort_unstable();
        found.dedup();
        Ok(found)
    }

    /// Update presence fields. Returns `true` if the user exists.
    pub fn set_user_presence(
        &self,
        id: i64,
        is_active: bool,
        status: &str,
        last_seen: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE users SET is_active = ?1, status = ?2, last_seen = ?3 WHERE id = ?4",
            params![is_active, status, last_seen.as_ref().map(encode_ts), id],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let last_seen: Option<String> = row.get(6)?;
    let created_str: String = row.get(7)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        is_active: row.get(4)?,
        status: row.get(5)?,
        last_seen: decode_opt_ts(6, last_seen)?,
        created_at: decode_ts(7, &created_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn create_and_fetch_user() {
        let db = db();
        let now = Utc::now();
        let user = db
            .create_user(
                &NewUser {
                    email: "ana@example.com".into(),
                    name: Some("Ana".into()),
                    role: None,
                },
                now,
            )
            .unwrap();

        assert_eq!(user.role, DEFAULT_USER_ROLE);
        assert_eq!(user.status, DEFAULT_USER_STATUS);
        assert!(user.is_active);
        assert_eq!(db.get_user(user.id).unwrap(), user);
    }

    #[test]
    fn list_users_pages_by_id() {
        let db = db();
        let ids: Vec<i64> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|name| {
                db.create_user(
                    &NewUser {
                        email: format!("{name}@example.com"),
                        ..Default::default()
                    },
                    Utc::now(),
                )
                .unwrap()
                .id
            })
            .collect();

        let page = |skip, limit| -> Vec<i64> {
            db.list_users(skip, limit)
                .unwrap()
                .iter()
                .map(|u| u.id)
                .collect()
        };
        assert_eq!(page(0, 2), ids[..2].to_vec());
        assert_eq!(page(2, 2), ids[2..4].to_vec());
        assert_eq!(page(4, 2), ids[4..].to_vec());
        assert!(page(5, 2).is_empty());
        assert_eq!(page(1, 100), ids[1..].to_vec());
    }

    #[test]
    fn missing_user_is_not_found() {
        let db = db();
        assert!(matches!(db.get_user(42), Err(StoreError::NotFound)));
        assert_eq!(db.find_user(42).unwrap(), None);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = db();
        let new = NewUser {
            email: "dup@example.com".into(),
            ..Default::default()
        };
        db.create_user(&new, Utc::now()).unwrap();
        assert!(matches!(
            db.create_user(&new, Utc::now()),
            Err(StoreError::Sqlite(_))
        ));
    }

    #[test]
    fn presence_update_and_existing_ids() {
        let db = db();
        let a = db
            .create_user(&NewUser { email: "a@x".into(), ..Default::default() }, Utc::now())
            .unwrap();
        assert!(db.set_user_presence(a.id, false, "Away", Some(Utc::now())).unwrap());
        let reloaded = db.get_user(a.id).unwrap();
        assert!(!reloaded.is_active);
        assert_eq!(reloaded.status, "Away");
        assert!(reloaded.last_seen.is_some());

        assert_eq!(db.existing_user_ids(&[a.id, 99, a.id]).unwrap(), vec![a.id]);
        assert!(!db.set_user_presence(99, true, "Online", None).unwrap());
    }
}
