//! SQLite state store.
//!
//! One `bot_state` row (id 1) plus the price and moving-average series. Every
//! save rewrites all three tables inside a single transaction.

use crate::domain::error::BotError;
use crate::domain::indicator::IndicatorPair;
use crate::domain::position::PositionState;
use crate::domain::price_history::PriceHistory;
use crate::domain::state::{BotState, STATE_ID};
use crate::ports::config_port::ConfigPort;
use crate::ports::state_port::StatePort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

pub struct SqliteStateAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStateAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BotError> {
        let db_path = config
            .get_string("sqlite", "path")
            .ok_or_else(|| BotError::ConfigMissing {
                section: "sqlite".into(),
                key: "path".into(),
            })?;

        let pool_size = config.get_int("sqlite", "pool_size", 2).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| BotError::persistence(e))?;

        tracing::debug!(path = %db_path, pool_size, "opened sqlite state store");
        Ok(Self { pool })
    }

    /// Single-connection pool; each in-memory connection is its own database.
    pub fn in_memory() -> Result<Self, BotError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| BotError::persistence(e))?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), BotError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS bot_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                in_position INTEGER NOT NULL,
                purchase_price REAL NOT NULL,
                highest_price_since_buy REAL NOT NULL,
                last_known_price REAL NOT NULL,
                last_known_rsi REAL NOT NULL,
                previous_short_ma REAL NOT NULL,
                previous_long_ma REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS price_history (
                seq INTEGER PRIMARY KEY,
                price REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS ma_history (
                seq INTEGER PRIMARY KEY,
                short_ma REAL NOT NULL,
                long_ma REAL NOT NULL
            );",
        )
        .map_err(|e: rusqlite::Error| BotError::persistence(e))?;

        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, BotError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| BotError::persistence(e))
    }
}

impl StatePort for SqliteStateAdapter {
    fn load(&self) -> Result<Option<BotState>, BotError> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                "SELECT in_position, purchase_price, highest_price_since_buy,
                        last_known_price, last_known_rsi,
                        previous_short_ma, previous_long_ma
                 FROM bot_state WHERE id = ?1",
                params![STATE_ID],
                |row| {
                    Ok((
                        PositionState {
                            in_position: row.get(0)?,
                            purchase_price: row.get(1)?,
                            highest_price_since_buy: row.get(2)?,
                            last_known_price: row.get(3)?,
                            last_known_rsi: row.get(4)?,
                        },
                        IndicatorPair::new(row.get(5)?, row.get(6)?),
                    ))
                },
            )
            .optional()
            .map_err(|e: rusqlite::Error| BotError::persistence(e))?;

        let Some((position, previous)) = row else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare("SELECT price FROM price_history ORDER BY seq")
            .map_err(|e: rusqlite::Error| BotError::persistence(e))?;
        let prices = stmt
            .query_map([], |row| row.get::<_, f64>(0))
            .map_err(|e: rusqlite::Error| BotError::persistence(e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e: rusqlite::Error| BotError::persistence(e))?;

        let mut stmt = conn
            .prepare("SELECT short_ma, long_ma FROM ma_history ORDER BY seq")
            .map_err(|e: rusqlite::Error| BotError::persistence(e))?;
        let pairs = stmt
            .query_map([], |row| Ok(IndicatorPair::new(row.get(0)?, row.get(1)?)))
            .map_err(|e: rusqlite::Error| BotError::persistence(e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e: rusqlite::Error| BotError::persistence(e))?;

        Ok(Some(BotState {
            position,
            previous,
            history: PriceHistory::from_parts(prices, pairs),
        }))
    }

    fn save(&self, state: &BotState) -> Result<(), BotError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| BotError::persistence(e))?;

        let p = &state.position;
        tx.execute(
            "INSERT OR REPLACE INTO bot_state (id, in_position, purchase_price,
                 highest_price_since_buy, last_known_price, last_known_rsi,
                 previous_short_ma, previous_long_ma)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                STATE_ID,
                p.in_position,
                p.purchase_price,
                p.highest_price_since_buy,
                p.last_known_price,
                p.last_known_rsi,
                state.previous.short_ma,
                state.previous.long_ma
            ],
        )
        .map_err(|e: rusqlite::Error| BotError::persistence(e))?;

        tx.execute_batch("DELETE FROM price_history; DELETE FROM ma_history;")
            .map_err(|e: rusqlite::Error| BotError::persistence(e))?;

        {
            let mut insert = tx
                .prepare("INSERT INTO price_history (seq, price) VALUES (?1, ?2)")
                .map_err(|e: rusqlite::Error| BotError::persistence(e))?;
            for (seq, price) in state.history.prices().iter().enumerate() {
                insert
                    .execute(params![seq as i64, price])
                    .map_err(|e: rusqlite::Error| BotError::persistence(e))?;
            }

            let mut insert = tx
                .prepare("INSERT INTO ma_history (seq, short_ma, long_ma) VALUES (?1, ?2, ?3)")
                .map_err(|e: rusqlite::Error| BotError::persistence(e))?;
            for (seq, pair) in state.history.ma_history().iter().enumerate() {
                insert
                    .execute(params![seq as i64, pair.short_ma, pair.long_ma])
                    .map_err(|e: rusqlite::Error| BotError::persistence(e))?;
            }
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| BotError::persistence(e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyConfig;

    impl ConfigPort for EmptyConfig {
        fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
            None
        }
        fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
            default
        }
        fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
            default
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn store() -> SqliteStateAdapter {
        let adapter = SqliteStateAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
        adapter
    }

    fn sample_state() -> BotState {
        let mut history = PriceHistory::new();
        for p in [100.0, 101.5, 99.25] {
            history.push(p, 10);
        }
        history.record_pair(IndicatorPair::new(100.2, 100.1), 10);
        let mut position = PositionState::default();
        position.enter_long(101.5);
        position.observe_price(103.0);
        position.last_known_price = 99.25;
        position.last_known_rsi = 48.5;
        BotState {
            position,
            previous: IndicatorPair::new(100.2, 100.1),
            history,
        }
    }

    #[test]
    fn from_config_missing_path() {
        let result = SqliteStateAdapter::from_config(&EmptyConfig);
        match result {
            Err(BotError::ConfigMissing { section, key }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn empty_store_loads_none() {
        assert_eq!(store().load().unwrap(), None);
    }

    #[test]
    fn load_without_schema_is_persistence_error() {
        let adapter = SqliteStateAdapter::in_memory().unwrap();
        let err = adapter.load().unwrap_err();
        assert!(err.is_persistence());
    }

    #[test]
    fn save_then_load_restores_state() {
        let store = store();
        let state = sample_state();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
    }

    #[test]
    fn save_replaces_previous_history() {
        let store = store();
        store.save(&sample_state()).unwrap();

        let mut smaller = BotState::default();
        smaller.history.push(42.0, 10);
        store.save(&smaller).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.history.prices(), &[42.0]);
        assert!(loaded.history.ma_history().is_empty());
        assert!(loaded.position.is_flat());
    }
}
