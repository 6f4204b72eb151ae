use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use gather_core::{UsageStat, UserBadge, UserProfile};
use rusqlite::OptionalExtension;
use rusqlite::{Connection, Row, params};

pub const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");
pub const MIGRATION_0002: &str = include_str!("../migrations/0002_add_referral_count.sql");

pub const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", MIGRATION_0001),
    ("0002_add_referral_count", MIGRATION_0002),
];

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (name, sql) in MIGRATIONS {
            if *name == "0002_add_referral_count" {
                tx.execute_batch(sql)?;
                ensure_users_referral_column(&tx)?;
                continue;
            }
            tx.execute_batch(sql)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        country_code: Option<&str>,
        created_at: &str,
    ) -> Result<UserProfile> {
        self.conn.execute(
            r#"
            INSERT INTO users (id, username, country_code, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![id, username, country_code, created_at],
        )?;
        self.get_user(id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserProfile>> {
        self.conn
            .query_row(
                r#"
                SELECT id, username, country_code, total_tokens, total_cost,
                       global_rank, country_rank, referral_count, created_at
                FROM users
                WHERE id = ?1
                "#,
                params![id],
                row_to_user,
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserProfile>> {
        self.conn
            .query_row(
                r#"
                SELECT id, username, country_code, total_tokens, total_cost,
                       global_rank, country_rank, referral_count, created_at
                FROM users
                WHERE username = ?1
                "#,
                params![username],
                row_to_user,
            )
            .optional()
            .map_err(DbError::from)
    }

    /// Record that `referred_id` signed up through `referrer_id` and bump the
    /// referrer's counter. A user can only be referred once; repeat calls are
    /// no-ops and return false.
    pub fn record_referral(
        &self,
        referred_id: &str,
        referrer_id: &str,
        created_at: &str,
    ) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO referrals (referred_id, referrer_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![referred_id, referrer_id, created_at],
        )?;
        if inserted == 0 {
            return Ok(false);
        }
        self.conn.execute(
            "UPDATE users SET referral_count = referral_count + 1 WHERE id = ?1",
            params![referrer_id],
        )?;
        Ok(true)
    }

    /// Insert or replace per-device daily rows. The key is
    /// (user_id, date, device_id); a re-submission for the same key replaces
    /// the stored row rather than double counting it.
    pub fn upsert_usage_stats(&mut self, rows: &[UsageStat]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO usage_stats (
                  user_id, date, device_id, total_tokens, cost_usd, submitted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(user_id, date, device_id) DO UPDATE SET
                  total_tokens = excluded.total_tokens,
                  cost_usd = excluded.cost_usd,
                  submitted_at = excluded.submitted_at
                "#,
            )?;
            for row in rows {
                let changed = stmt.execute(params![
                    row.user_id,
                    row.date,
                    row.device_id,
                    row.total_tokens as i64,
                    row.cost_usd,
                    row.submitted_at,
                ])?;
                if changed > 0 {
                    written += 1;
                }
            }
        }
        tx.commit()?;
        Ok(written)
    }

    pub fn usage_rows_in_range(
        &self,
        user_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<UsageStat>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id, date, device_id, total_tokens, cost_usd, submitted_at
            FROM usage_stats
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            ORDER BY date ASC, device_id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![user_id, start, end], row_to_usage_stat)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn all_usage_rows(&self, user_id: &str) -> Result<Vec<UsageStat>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id, date, device_id, total_tokens, cost_usd, submitted_at
            FROM usage_stats
            WHERE user_id = ?1
            ORDER BY date ASC, device_id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![user_id], row_to_usage_stat)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Re-derive a user's lifetime totals from their usage rows and store
    /// them on the users row. Returns the fresh (tokens, cost) pair.
    pub fn update_user_totals(&self, user_id: &str) -> Result<(u64, f64)> {
        let (tokens, cost): (i64, f64) = self.conn.query_row(
            r#"
            SELECT COALESCE(SUM(total_tokens), 0), COALESCE(SUM(cost_usd), 0)
            FROM usage_stats
            WHERE user_id = ?1
            "#,
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        self.conn.execute(
            "UPDATE users SET total_tokens = ?1, total_cost = ?2 WHERE id = ?3",
            params![tokens, cost, user_id],
        )?;
        Ok((tokens.max(0) as u64, cost))
    }

    /// Reassign global and per-country ranks for every user, ordered by
    /// lifetime tokens. Ties break by signup time so ranks are stable across
    /// recomputes.
    pub fn recompute_ranks(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                SELECT id, country_code
                FROM users
                ORDER BY total_tokens DESC, created_at ASC, id ASC
                "#,
            )?;
            let users = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut update = tx.prepare(
                "UPDATE users SET global_rank = ?1, country_rank = ?2 WHERE id = ?3",
            )?;
            let mut country_positions: HashMap<String, i64> = HashMap::new();
            for (position, (id, country_code)) in users.iter().enumerate() {
                let global_rank = position as i64 + 1;
                let country_rank = country_code.as_ref().map(|code| {
                    let next = country_positions.entry(code.clone()).or_insert(0);
                    *next += 1;
                    *next
                });
                update.execute(params![global_rank, country_rank, id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn leaderboard(
        &self,
        limit: u32,
        offset: u32,
        country: Option<&str>,
    ) -> Result<Vec<UserProfile>> {
        let rows = if let Some(country) = country {
            let mut stmt = self.conn.prepare(
                r#"
                SELECT id, username, country_code, total_tokens, total_cost,
                       global_rank, country_rank, referral_count, created_at
                FROM users
                WHERE country_code = ?1
                ORDER BY total_tokens DESC, created_at ASC, id ASC
                LIMIT ?2 OFFSET ?3
                "#,
            )?;
            stmt.query_map(params![country, limit, offset], row_to_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            let mut stmt = self.conn.prepare(
                r#"
                SELECT id, username, country_code, total_tokens, total_cost,
                       global_rank, country_rank, referral_count, created_at
                FROM users
                ORDER BY total_tokens DESC, created_at ASC, id ASC
                LIMIT ?1 OFFSET ?2
                "#,
            )?;
            stmt.query_map(params![limit, offset], row_to_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        Ok(rows)
    }

    /// The first `limit` signups from a country, in signup order. Used for
    /// the early-adopter cohort check.
    pub fn country_cohort_user_ids(&self, country_code: &str, limit: u32) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id
            FROM users
            WHERE country_code = ?1
            ORDER BY created_at ASC, id ASC
            LIMIT ?2
            "#,
        )?;
        let ids = stmt
            .query_map(params![country_code, limit], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub fn earned_badge_types(&self, user_id: &str) -> Result<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT badge_type FROM user_badges WHERE user_id = ?1")?;
        let types = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<BTreeSet<_>, _>>()?;
        Ok(types)
    }

    /// Batch-persist newly earned badges in one transaction. INSERT OR IGNORE
    /// absorbs concurrent evaluations racing on the same badge, so the
    /// returned count is how many rows this call actually created.
    pub fn insert_user_badges(
        &mut self,
        user_id: &str,
        badge_types: &[&str],
        earned_at: &str,
    ) -> Result<usize> {
        if badge_types.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO user_badges (user_id, badge_type, earned_at)
                VALUES (?1, ?2, ?3)
                "#,
            )?;
            for badge_type in badge_types {
                let rows = stmt.execute(params![user_id, badge_type, earned_at])?;
                if rows > 0 {
                    inserted += 1;
                }
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn list_user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id, badge_type, earned_at
            FROM user_badges
            WHERE user_id = ?1
            ORDER BY earned_at ASC, badge_type ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![user_id], row_to_user_badge)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM app_setting WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get::<_, String>(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO app_setting (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn ensure_users_referral_column(conn: &Connection) -> Result<()> {
    if !table_has_column(conn, "users", "referral_count")? {
        conn.execute(
            "ALTER TABLE users ADD COLUMN referral_count INTEGER NOT NULL DEFAULT 0",
            [],
        )?;
    }
    Ok(())
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        id: row.get(0)?,
        username: row.get(1)?,
        country_code: row.get(2)?,
        total_tokens: row.get::<_, i64>(3)?.max(0) as u64,
        total_cost: row.get(4)?,
        global_rank: row.get::<_, Option<i64>>(5)?.map(|rank| rank as u32),
        country_rank: row.get::<_, Option<i64>>(6)?.map(|rank| rank as u32),
        referral_count: row.get::<_, i64>(7)?.max(0) as u32,
        created_at: row.get(8)?,
    })
}

fn row_to_usage_stat(row: &Row<'_>) -> rusqlite::Result<UsageStat> {
    Ok(UsageStat {
        user_id: row.get(0)?,
        date: row.get(1)?,
        device_id: row.get(2)?,
        total_tokens: row.get::<_, i64>(3)?.max(0) as u64,
        cost_usd: row.get(4)?,
        submitted_at: row.get(5)?,
    })
}

fn row_to_user_badge(row: &Row<'_>) -> rusqlite::Result<UserBadge> {
    Ok(UserBadge {
        user_id: row.get(0)?,
        badge_type: row.get(1)?,
        earned_at: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Db {
        let mut db = Db::open(":memory:").expect("open db");
        db.migrate().expect("migrate db");
        db
    }

    fn make_user(db: &Db, id: &str, country: Option<&str>, created_at: &str) -> UserProfile {
        db.create_user(id, &format!("user-{id}"), country, created_at)
            .expect("create user")
    }

    fn make_stat(user_id: &str, date: &str, device_id: &str, tokens: u64, cost: f64) -> UsageStat {
        UsageStat {
            user_id: user_id.to_string(),
            date: date.to_string(),
            device_id: device_id.to_string(),
            total_tokens: tokens,
            cost_usd: cost,
            submitted_at: "2024-06-10T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn migrate_twice_is_safe() {
        let mut db = setup_db();
        db.migrate().expect("second migrate");
    }

    #[test]
    fn create_and_fetch_user() {
        let db = setup_db();
        let user = make_user(&db, "u1", Some("NL"), "2024-06-01T00:00:00Z");
        assert_eq!(user.username, "user-u1");
        assert_eq!(user.total_tokens, 0);
        assert_eq!(user.global_rank, None);

        let by_name = db
            .get_user_by_username("user-u1")
            .expect("query")
            .expect("found");
        assert_eq!(by_name.id, "u1");
        assert!(db.get_user("missing").expect("query").is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let db = setup_db();
        make_user(&db, "u1", None, "2024-06-01T00:00:00Z");
        let err = db.create_user("u2", "user-u1", None, "2024-06-02T00:00:00Z");
        assert!(err.is_err());
    }

    #[test]
    fn resubmission_replaces_the_row() {
        let mut db = setup_db();
        make_user(&db, "u1", None, "2024-06-01T00:00:00Z");
        db.upsert_usage_stats(&[make_stat("u1", "2024-06-10", "laptop", 500, 1.0)])
            .expect("insert");
        db.upsert_usage_stats(&[make_stat("u1", "2024-06-10", "laptop", 800, 2.0)])
            .expect("upsert");

        let rows = db.all_usage_rows("u1").expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_tokens, 800);
        assert_eq!(rows[0].cost_usd, 2.0);
    }

    #[test]
    fn devices_keep_separate_rows() {
        let mut db = setup_db();
        make_user(&db, "u1", None, "2024-06-01T00:00:00Z");
        db.upsert_usage_stats(&[
            make_stat("u1", "2024-06-10", "laptop", 500, 1.0),
            make_stat("u1", "2024-06-10", "desktop", 300, 0.5),
        ])
        .expect("insert");

        let rows = db.all_usage_rows("u1").expect("rows");
        assert_eq!(rows.len(), 2);
        let total: u64 = rows.iter().map(|row| row.total_tokens).sum();
        assert_eq!(total, 800);
    }

    #[test]
    fn range_query_is_inclusive_and_ordered() {
        let mut db = setup_db();
        make_user(&db, "u1", None, "2024-06-01T00:00:00Z");
        db.upsert_usage_stats(&[
            make_stat("u1", "2024-06-08", "laptop", 100, 0.1),
            make_stat("u1", "2024-06-10", "laptop", 300, 0.3),
            make_stat("u1", "2024-06-12", "laptop", 500, 0.5),
        ])
        .expect("insert");

        let rows = db
            .usage_rows_in_range("u1", "2024-06-08", "2024-06-10")
            .expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2024-06-08");
        assert_eq!(rows[1].date, "2024-06-10");
    }

    #[test]
    fn totals_recompute_from_rows() {
        let mut db = setup_db();
        make_user(&db, "u1", None, "2024-06-01T00:00:00Z");
        db.upsert_usage_stats(&[
            make_stat("u1", "2024-06-09", "laptop", 1_000, 2.5),
            make_stat("u1", "2024-06-10", "laptop", 2_000, 2.5),
        ])
        .expect("insert");

        let (tokens, cost) = db.update_user_totals("u1").expect("totals");
        assert_eq!(tokens, 3_000);
        assert_eq!(cost, 5.0);
        let user = db.get_user("u1").expect("query").expect("found");
        assert_eq!(user.total_tokens, 3_000);
        assert_eq!(user.total_cost, 5.0);
    }

    #[test]
    fn ranks_order_by_tokens_with_country_partitions() {
        let mut db = setup_db();
        make_user(&db, "u1", Some("NL"), "2024-06-01T00:00:00Z");
        make_user(&db, "u2", Some("NL"), "2024-06-02T00:00:00Z");
        make_user(&db, "u3", Some("DE"), "2024-06-03T00:00:00Z");
        make_user(&db, "u4", None, "2024-06-04T00:00:00Z");
        db.upsert_usage_stats(&[
            make_stat("u1", "2024-06-10", "laptop", 100, 0.0),
            make_stat("u2", "2024-06-10", "laptop", 300, 0.0),
            make_stat("u3", "2024-06-10", "laptop", 200, 0.0),
        ])
        .expect("insert");
        for id in ["u1", "u2", "u3", "u4"] {
            db.update_user_totals(id).expect("totals");
        }
        db.recompute_ranks().expect("ranks");

        let u2 = db.get_user("u2").expect("query").expect("found");
        assert_eq!(u2.global_rank, Some(1));
        assert_eq!(u2.country_rank, Some(1));
        let u3 = db.get_user("u3").expect("query").expect("found");
        assert_eq!(u3.global_rank, Some(2));
        assert_eq!(u3.country_rank, Some(1));
        let u1 = db.get_user("u1").expect("query").expect("found");
        assert_eq!(u1.global_rank, Some(3));
        assert_eq!(u1.country_rank, Some(2));
        let u4 = db.get_user("u4").expect("query").expect("found");
        assert_eq!(u4.global_rank, Some(4));
        assert_eq!(u4.country_rank, None);
    }

    #[test]
    fn badge_inserts_are_idempotent() {
        let mut db = setup_db();
        make_user(&db, "u1", None, "2024-06-01T00:00:00Z");
        let first = db
            .insert_user_badges("u1", &["tokens_1m", "streak_7"], "2024-06-10T12:00:00Z")
            .expect("insert");
        assert_eq!(first, 2);

        let second = db
            .insert_user_badges("u1", &["tokens_1m", "cost_100"], "2024-06-11T12:00:00Z")
            .expect("insert");
        assert_eq!(second, 1);

        let earned = db.earned_badge_types("u1").expect("earned");
        assert_eq!(earned.len(), 3);
        let listed = db.list_user_badges("u1").expect("list");
        assert_eq!(listed.len(), 3);
        // original earned_at survives the duplicate insert
        assert!(
            listed
                .iter()
                .any(|badge| badge.badge_type == "tokens_1m"
                    && badge.earned_at == "2024-06-10T12:00:00Z")
        );
    }

    #[test]
    fn country_cohort_is_first_n_by_signup() {
        let db = setup_db();
        for n in 0..12 {
            make_user(
                &db,
                &format!("u{n:02}"),
                Some("NL"),
                &format!("2024-06-{:02}T00:00:00Z", n + 1),
            );
        }
        make_user(&db, "de1", Some("DE"), "2024-06-01T00:00:00Z");

        let cohort = db.country_cohort_user_ids("NL", 10).expect("cohort");
        assert_eq!(cohort.len(), 10);
        assert_eq!(cohort.first().map(String::as_str), Some("u00"));
        assert_eq!(cohort.last().map(String::as_str), Some("u09"));
        assert!(!cohort.contains(&"de1".to_string()));
    }

    #[test]
    fn referrals_count_once_per_referred_user() {
        let db = setup_db();
        make_user(&db, "u1", None, "2024-06-01T00:00:00Z");
        make_user(&db, "u2", None, "2024-06-02T00:00:00Z");

        assert!(
            db.record_referral("u2", "u1", "2024-06-02T00:00:00Z")
                .expect("referral")
        );
        assert!(
            !db.record_referral("u2", "u1", "2024-06-03T00:00:00Z")
                .expect("repeat")
        );

        let referrer = db.get_user("u1").expect("query").expect("found");
        assert_eq!(referrer.referral_count, 1);
    }

    #[test]
    fn leaderboard_filters_and_paginates() {
        let mut db = setup_db();
        make_user(&db, "u1", Some("NL"), "2024-06-01T00:00:00Z");
        make_user(&db, "u2", Some("DE"), "2024-06-02T00:00:00Z");
        make_user(&db, "u3", Some("NL"), "2024-06-03T00:00:00Z");
        db.upsert_usage_stats(&[
            make_stat("u1", "2024-06-10", "laptop", 100, 0.0),
            make_stat("u2", "2024-06-10", "laptop", 300, 0.0),
            make_stat("u3", "2024-06-10", "laptop", 200, 0.0),
        ])
        .expect("insert");
        for id in ["u1", "u2", "u3"] {
            db.update_user_totals(id).expect("totals");
        }

        let all = db.leaderboard(10, 0, None).expect("leaderboard");
        let ids: Vec<&str> = all.iter().map(|user| user.id.as_str()).collect();
        assert_eq!(ids, vec!["u2", "u3", "u1"]);

        let nl = db.leaderboard(10, 0, Some("NL")).expect("leaderboard");
        let ids: Vec<&str> = nl.iter().map(|user| user.id.as_str()).collect();
        assert_eq!(ids, vec!["u3", "u1"]);

        let second_page = db.leaderboard(1, 1, None).expect("leaderboard");
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].id, "u3");
    }

    #[test]
    fn settings_upsert_and_read_back() {
        let db = setup_db();
        assert!(db.get_setting("streak_anchor").expect("get").is_none());
        db.set_setting("streak_anchor", "today_only").expect("set");
        db.set_setting("streak_anchor", "today_or_yesterday")
            .expect("set");
        assert_eq!(
            db.get_setting("streak_anchor").expect("get").as_deref(),
            Some("today_or_yesterday")
        );
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gather.db");
        {
            let mut db = Db::open(&path).expect("open");
            db.migrate().expect("migrate");
            make_user(&db, "u1", None, "2024-06-01T00:00:00Z");
            db.upsert_usage_stats(&[make_stat("u1", "2024-06-10", "laptop", 42, 0.1)])
                .expect("insert");
        }
        let mut db = Db::open(&path).expect("reopen");
        db.migrate().expect("migrate again");
        let rows = db.all_usage_rows("u1").expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_tokens, 42);
    }
}
