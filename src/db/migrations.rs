//! Database migrations
//!
//! The schema is embedded in the binary as versioned SQL, one flavour per
//! backend. Applied versions are recorded in `_migrations`, so running the
//! bootstrap on every start is idempotent.
//!
//! ```ignore
//! use handon::db::{create_pool, migrations};
//!
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

use anyhow::{Context, Result};
use sqlx::{MySqlPool, Row, SqlitePool};

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

/// A database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Must be unique; migrations apply in ascending order
    pub version: i32,
    pub name: &'static str,
    pub up_sqlite: &'static str,
    pub up_mysql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(150) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                full_name VARCHAR(255) NOT NULL DEFAULT '',
                points INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                username VARCHAR(150) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                full_name VARCHAR(255) NOT NULL DEFAULT '',
                points BIGINT NOT NULL DEFAULT 0,
                created_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)
            );
        "#,
    },
    Migration {
        version: 2,
        name: "create_campaigns",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS campaigns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                creator_id INTEGER NOT NULL,
                title VARCHAR(255) NOT NULL,
                body TEXT NOT NULL,
                image VARCHAR(500),
                urgency_level VARCHAR(10) NOT NULL DEFAULT 'low',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (creator_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_campaigns_creator_id ON campaigns(creator_id);
            CREATE INDEX IF NOT EXISTS idx_campaigns_urgency_created ON campaigns(urgency_level, created_at);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS campaigns (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                creator_id BIGINT NOT NULL,
                title VARCHAR(255) NOT NULL,
                body TEXT NOT NULL,
                image VARCHAR(500),
                urgency_level VARCHAR(10) NOT NULL DEFAULT 'low',
                created_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
                FOREIGN KEY (creator_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_campaigns_creator_id ON campaigns(creator_id);
            CREATE INDEX idx_campaigns_urgency_created ON campaigns(urgency_level, created_at);
        "#,
    },
    // At most one open session per (user, campaign). SQLite can express this
    // as a partial unique index; MySQL needs a generated column that is NULL
    // for closed sessions, since NULLs never collide in a unique key.
    //
    // MySQL rejects CASCADE, SET NULL and SET DEFAULT on foreign keys over
    // base columns of a stored generated column, so session rows RESTRICT
    // deletes of their user and campaign on both backends.
    Migration {
        version: 3,
        name: "create_sessions",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                campaign_id INTEGER NOT NULL,
                status VARCHAR(10) NOT NULL DEFAULT 'started',
                start_at TIMESTAMP NOT NULL,
                end_at TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE RESTRICT,
                FOREIGN KEY (campaign_id) REFERENCES campaigns(id) ON DELETE RESTRICT
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_pair_status ON sessions(user_id, campaign_id, status);
            CREATE INDEX IF NOT EXISTS idx_sessions_campaign_id ON sessions(campaign_id);
            CREATE UNIQUE INDEX IF NOT EXISTS uq_sessions_active_pair
                ON sessions(user_id, campaign_id)
                WHERE status = 'started' AND end_at IS NULL;
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                user_id BIGINT NOT NULL,
                campaign_id BIGINT NOT NULL,
                status VARCHAR(10) NOT NULL DEFAULT 'started',
                start_at DATETIME(6) NOT NULL,
                end_at DATETIME(6) NULL,
                active_pair VARCHAR(48) GENERATED ALWAYS AS (
                    CASE WHEN status = 'started' AND end_at IS NULL
                        THEN CONCAT(user_id, ':', campaign_id)
                        ELSE NULL
                    END
                ) STORED,
                UNIQUE KEY uq_sessions_active_pair (active_pair),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE RESTRICT,
                FOREIGN KEY (campaign_id) REFERENCES campaigns(id) ON DELETE RESTRICT
            );
            CREATE INDEX idx_sessions_pair_status ON sessions(user_id, campaign_id, status);
            CREATE INDEX idx_sessions_campaign_id ON sessions(campaign_id);
        "#,
    },
    Migration {
        version: 4,
        name: "create_events",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                creator_id INTEGER NOT NULL,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                image VARCHAR(500),
                is_private BOOLEAN NOT NULL DEFAULT 0,
                start_at TIMESTAMP NOT NULL,
                end_at TIMESTAMP,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (creator_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS event_registrations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                registered_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (event_id, user_id),
                FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_event_registrations_user_id ON event_registrations(user_id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS events (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                creator_id BIGINT NOT NULL,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                image VARCHAR(500),
                is_private BOOLEAN NOT NULL DEFAULT FALSE,
                start_at DATETIME(6) NOT NULL,
                end_at DATETIME(6) NULL,
                created_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
                FOREIGN KEY (creator_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS event_registrations (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                event_id BIGINT NOT NULL,
                user_id BIGINT NOT NULL,
                registered_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
                UNIQUE KEY uq_event_registrations_pair (event_id, user_id),
                FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_event_registrations_user_id ON event_registrations(user_id);
        "#,
    },
    // Locations, skills and interests are flat name catalogues. Users tag
    // themselves with skills and interests; events point at a location and
    // use an interest as their category.
    Migration {
        version: 5,
        name: "create_catalogs_and_profiles",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS locations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS skills (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS interests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS user_skills (
                user_id INTEGER NOT NULL,
                skill_id INTEGER NOT NULL,
                PRIMARY KEY (user_id, skill_id),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (skill_id) REFERENCES skills(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS user_interests (
                user_id INTEGER NOT NULL,
                interest_id INTEGER NOT NULL,
                PRIMARY KEY (user_id, interest_id),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (interest_id) REFERENCES interests(id) ON DELETE CASCADE
            );
            ALTER TABLE users ADD COLUMN city VARCHAR(255) NOT NULL DEFAULT '';
            ALTER TABLE users ADD COLUMN info VARCHAR(1000) NOT NULL DEFAULT '';
            ALTER TABLE events ADD COLUMN location_id INTEGER REFERENCES locations(id) ON DELETE SET NULL;
            ALTER TABLE events ADD COLUMN category_id INTEGER REFERENCES interests(id) ON DELETE SET NULL;
            CREATE INDEX IF NOT EXISTS idx_events_location_id ON events(location_id);
            CREATE INDEX IF NOT EXISTS idx_events_category_id ON events(category_id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS locations (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(100) NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS skills (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(255) NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS interests (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(255) NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS user_skills (
                user_id BIGINT NOT NULL,
                skill_id BIGINT NOT NULL,
                PRIMARY KEY (user_id, skill_id),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (skill_id) REFERENCES skills(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS user_interests (
                user_id BIGINT NOT NULL,
                interest_id BIGINT NOT NULL,
                PRIMARY KEY (user_id, interest_id),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (interest_id) REFERENCES interests(id) ON DELETE CASCADE
            );
            ALTER TABLE users
                ADD COLUMN city VARCHAR(255) NOT NULL DEFAULT '',
                ADD COLUMN info VARCHAR(1000) NOT NULL DEFAULT '';
            ALTER TABLE events
                ADD COLUMN location_id BIGINT NULL,
                ADD COLUMN category_id BIGINT NULL,
                ADD CONSTRAINT fk_events_location FOREIGN KEY (location_id) REFERENCES locations(id) ON DELETE SET NULL,
                ADD CONSTRAINT fk_events_category FOREIGN KEY (category_id) REFERENCES interests(id) ON DELETE SET NULL;
            CREATE INDEX idx_events_location_id ON events(location_id);
            CREATE INDEX idx_events_category_id ON events(category_id);
        "#,
    },
];

/// Apply every migration not yet recorded in `_migrations`.
///
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;
    let mut count = 0;

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }
        tracing::info!("Applying migration {}: {}", migration.version, migration.name);
        apply_migration(pool, migration)
            .await
            .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
        count += 1;
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("Schema is up to date");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabaseDriver::Mysql => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };

    pool.execute(sql).await?;
    Ok(())
}

async fn applied_versions(pool: &DynDatabasePool) -> Result<Vec<i32>> {
    let versions = match pool.driver() {
        DatabaseDriver::Sqlite => applied_versions_sqlite(pool.as_sqlite().unwrap()).await?,
        DatabaseDriver::Mysql => applied_versions_mysql(pool.as_mysql().unwrap()).await?,
    };
    Ok(versions.into_iter().map(|v| v as i32).collect())
}

async fn applied_versions_sqlite(pool: &SqlitePool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;
    Ok(rows.iter().map(|row| row.get::<i64, _>("version")).collect())
}

async fn applied_versions_mysql(pool: &MySqlPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;
    Ok(rows.iter().map(|row| row.get::<i32, _>("version") as i64).collect())
}

async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => migration.up_sqlite,
        DatabaseDriver::Mysql => migration.up_mysql,
    };

    for statement in split_sql_statements(sql) {
        pool.execute(statement)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    let record = format!(
        "INSERT INTO _migrations (version, name) VALUES ({}, '{}')",
        migration.version, migration.name
    );
    pool.execute(&record).await?;

    Ok(())
}

fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split a migration script on `;`, dropping blanks and comment-only chunks.
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
        .collect()
}

fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

/// Number of migrations not yet applied
pub async fn pending_count(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;
    let applied = applied_versions(pool).await?;
    Ok(MIGRATIONS
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    async fn migrated_pool() -> DynDatabasePool {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        pool
    }

    async fn seed_user_and_campaign(pool: &SqlitePool) {
        sqlx::query("INSERT INTO users (username, email, full_name) VALUES ('ana', 'ana@example.com', 'Ana')")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO campaigns (creator_id, title, body, urgency_level) VALUES (1, 'Flood relief', 'Sandbags', 'urgent')",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_run_migrations_is_idempotent() {
        let pool = create_test_pool().await.unwrap();

        let count = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(count, MIGRATIONS.len());

        let count = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_pending_count() {
        let pool = create_test_pool().await.unwrap();
        assert_eq!(pending_count(&pool).await.unwrap(), MIGRATIONS.len());

        run_migrations(&pool).await.unwrap();
        assert_eq!(pending_count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_user_points_default_to_zero() {
        let pool = migrated_pool().await;
        let sqlite = pool.as_sqlite().unwrap();
        seed_user_and_campaign(sqlite).await;

        let points: i64 = sqlx::query_scalar("SELECT points FROM users WHERE id = 1")
            .fetch_one(sqlite)
            .await
            .unwrap();
        assert_eq!(points, 0);
    }

    #[tokio::test]
    async fn test_active_pair_guard_rejects_second_open_session() {
        let pool = migrated_pool().await;
        let sqlite = pool.as_sqlite().unwrap();
        seed_user_and_campaign(sqlite).await;

        let insert = "INSERT INTO sessions (user_id, campaign_id, status, start_at) VALUES (1, 1, 'started', '2024-01-01T00:00:00+00:00')";
        sqlx::query(insert).execute(sqlite).await.unwrap();

        let second = sqlx::query(insert).execute(sqlite).await;
        let err = second.unwrap_err();
        assert!(err.as_database_error().map(|e| e.is_unique_violation()).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_active_pair_guard_allows_closed_history() {
        let pool = migrated_pool().await;
        let sqlite = pool.as_sqlite().unwrap();
        seed_user_and_campaign(sqlite).await;

        for hour in 0..3 {
            sqlx::query(
                "INSERT INTO sessions (user_id, campaign_id, status, start_at, end_at) VALUES (1, 1, 'stopped', ?, ?)",
            )
            .bind(format!("2024-01-01T0{}:00:00+00:00", hour))
            .bind(format!("2024-01-01T0{}:30:00+00:00", hour))
            .execute(sqlite)
            .await
            .unwrap();
        }

        let open = sqlx::query(
            "INSERT INTO sessions (user_id, campaign_id, status, start_at) VALUES (1, 1, 'started', '2024-01-01T05:00:00+00:00')",
        )
        .execute(sqlite)
        .await;
        assert!(open.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let pool = migrated_pool().await;
        let sqlite = pool.as_sqlite().unwrap();

        let result = sqlx::query(
            "INSERT INTO sessions (user_id, campaign_id, status, start_at) VALUES (99, 99, 'started', '2024-01-01T00:00:00+00:00')",
        )
        .execute(sqlite)
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_event_registration_unique_per_pair() {
        let pool = migrated_pool().await;
        let sqlite = pool.as_sqlite().unwrap();
        seed_user_and_campaign(sqlite).await;

        sqlx::query("INSERT INTO events (creator_id, title, start_at) VALUES (1, 'Beach cleanup', '2024-06-01T09:00:00+00:00')")
            .execute(sqlite)
            .await
            .unwrap();

        let register = "INSERT INTO event_registrations (event_id, user_id) VALUES (1, 1)";
        sqlx::query(register).execute(sqlite).await.unwrap();
        assert!(sqlx::query(register).execute(sqlite).await.is_err());
    }

    #[tokio::test]
    async fn test_sessions_restrict_parent_deletes() {
        let pool = migrated_pool().await;
        let sqlite = pool.as_sqlite().unwrap();
        seed_user_and_campaign(sqlite).await;

        sqlx::query(
            "INSERT INTO sessions (user_id, campaign_id, status, start_at) VALUES (1, 1, 'started', '2024-01-01T00:00:00+00:00')",
        )
        .execute(sqlite)
        .await
        .unwrap();

        assert!(sqlx::query("DELETE FROM campaigns WHERE id = 1").execute(sqlite).await.is_err());
        assert!(sqlx::query("DELETE FROM users WHERE id = 1").execute(sqlite).await.is_err());

        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(sqlite)
            .await
            .unwrap();
        assert_eq!(sessions, 1);
    }

    #[test]
    fn test_mysql_sessions_foreign_keys_avoid_referential_actions() {
        let sessions = MIGRATIONS
            .iter()
            .find(|m| m.name == "create_sessions")
            .expect("sessions migration");

        assert!(sessions.up_mysql.contains("GENERATED ALWAYS AS"));
        for action in ["CASCADE", "SET NULL", "SET DEFAULT"] {
            assert!(
                !sessions.up_mysql.contains(action),
                "stored generated column base columns cannot use ON DELETE {}",
                action
            );
        }
        assert_eq!(sessions.up_mysql.matches("ON DELETE RESTRICT").count(), 2);
    }

    #[tokio::test]
    async fn test_catalog_links_unique_per_user() {
        let pool = migrated_pool().await;
        let sqlite = pool.as_sqlite().unwrap();
        seed_user_and_campaign(sqlite).await;

        sqlx::query("INSERT INTO skills (name) VALUES ('First aid')")
            .execute(sqlite)
            .await
            .unwrap();
        assert!(sqlx::query("INSERT INTO skills (name) VALUES ('First aid')")
            .execute(sqlite)
            .await
            .is_err());

        let link = "INSERT INTO user_skills (user_id, skill_id) VALUES (1, 1)";
        sqlx::query(link).execute(sqlite).await.unwrap();
        assert!(sqlx::query(link).execute(sqlite).await.is_err());

        let city: String = sqlx::query_scalar("SELECT city FROM users WHERE id = 1")
            .fetch_one(sqlite)
            .await
            .unwrap();
        assert_eq!(city, "");
    }

    #[test]
    fn test_split_sql_statements() {
        let sql = "CREATE TABLE a (id INT); CREATE TABLE b (id INT);";
        assert_eq!(split_sql_statements(sql), vec!["CREATE TABLE a (id INT)", "CREATE TABLE b (id INT)"]);

        let sql_with_comments = "-- Comment\nCREATE TABLE a (id INT);\n-- trailing";
        assert_eq!(split_sql_statements(sql_with_comments).len(), 1);
    }

    #[test]
    fn test_is_comment_only() {
        assert!(is_comment_only("-- This is a comment"));
        assert!(is_comment_only("-- Line 1\n\n-- Line 2"));
        assert!(!is_comment_only("CREATE TABLE test"));
        assert!(!is_comment_only("-- Comment\nCREATE TABLE test"));
    }

    #[test]
    fn test_every_migration_has_both_flavours() {
        let mut versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        versions.dedup();
        assert_eq!(versions.len(), MIGRATIONS.len());
        for migration in MIGRATIONS {
            assert!(!split_sql_statements(migration.up_sqlite).is_empty());
            assert!(!split_sql_statements(migration.up_mysql).is_empty());
        }
    }
}
