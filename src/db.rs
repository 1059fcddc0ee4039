use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::SqliteConnection;

use crate::config::Config;

pub(crate) type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

const IN_MEMORY: &str = ":memory:";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS ingredients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        amount TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS recipes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT
    );

    CREATE TABLE IF NOT EXISTS recipe_ingredients (
        recipe_id INTEGER NOT NULL,
        ingredient TEXT NOT NULL,
        PRIMARY KEY (recipe_id, ingredient)
    );

    CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_ingredient
        ON recipe_ingredients(ingredient);

    CREATE TABLE IF NOT EXISTS recipe_categories (
        recipe_id INTEGER PRIMARY KEY,
        category TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_recipe_categories_category
        ON recipe_categories(category);
";

/// Pragmas applied to every connection the pool hands out.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        // journal_mode stays "memory" for in-memory databases
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL;",
            self.busy_timeout.as_millis()
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

pub(crate) fn build_pool(config: &Config) -> Result<DbPool, r2d2::PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);
    let builder = r2d2::Pool::builder().connection_customizer(Box::new(ConnectionOptions {
        busy_timeout: config.busy_timeout,
    }));

    // each connection to ":memory:" opens its own private database, so the
    // pool keeps exactly one and never recycles it
    let builder = if config.database_url == IN_MEMORY {
        if config.pool_size > 1 {
            log::info!("in-memory database, using a single pooled connection");
        }
        builder.max_size(1).max_lifetime(None).idle_timeout(None)
    } else {
        builder.max_size(config.pool_size)
    };
    builder.build(manager)
}

/// Creates any missing tables. Safe to run on every startup.
pub(crate) fn initialize_schema(conn: &mut SqliteConnection) -> diesel::QueryResult<()> {
    conn.batch_execute(SCHEMA)
}

#[cfg(test)]
pub(crate) fn test_connection() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(IN_MEMORY).unwrap();
    initialize_schema(&mut conn).unwrap();
    conn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{categories, ingredients, recipe_categories, recipe_ingredients, recipes};
    use diesel::prelude::*;

    #[test]
    fn schema_bootstrap_is_idempotent() {
        let mut conn = test_connection();
        initialize_schema(&mut conn).unwrap();

        assert_eq!(categories::table.count().get_result::<i64>(&mut conn).unwrap(), 0);
        assert_eq!(ingredients::table.count().get_result::<i64>(&mut conn).unwrap(), 0);
        assert_eq!(recipes::table.count().get_result::<i64>(&mut conn).unwrap(), 0);
        assert_eq!(recipe_ingredients::table.count().get_result::<i64>(&mut conn).unwrap(), 0);
        assert_eq!(recipe_categories::table.count().get_result::<i64>(&mut conn).unwrap(), 0);
    }

    #[test]
    fn pool_connections_share_one_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_url: dir.path().join("pool.db").to_string_lossy().into_owned(),
            host: "127.0.0.1".to_string(),
            port: 0,
            pool_size: 2,
            busy_timeout: Duration::from_millis(100),
        };
        let pool = build_pool(&config).unwrap();
        initialize_schema(&mut pool.get().unwrap()).unwrap();

        let mut first = pool.get().unwrap();
        let mut second = pool.get().unwrap();
        first
            .batch_execute("INSERT INTO categories (name) VALUES ('dessert')")
            .unwrap();
        let count: i64 = categories::table
            .count()
            .get_result(&mut *second)
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn in_memory_pool_keeps_one_database() {
        let config = Config {
            database_url: ":memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            pool_size: 4,
            busy_timeout: Duration::from_millis(100),
        };
        let pool = build_pool(&config).unwrap();
        assert_eq!(pool.max_size(), 1);
        initialize_schema(&mut pool.get().unwrap()).unwrap();

        {
            let mut conn = pool.get().unwrap();
            conn.batch_execute("INSERT INTO categories (name) VALUES ('dessert')")
                .unwrap();
        }
        let mut conn = pool.get().unwrap();
        let found = crate::recipes::find_all_recipes(&mut conn).unwrap();
        assert!(found.is_empty());
        let count: i64 = categories::table.count().get_result(&mut *conn).unwrap();
        assert_eq!(count, 1);
    }
}
