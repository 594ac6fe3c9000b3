//! SQLite-backed spell storage.
//!
//! The database holds two tables keyed by spell name:
//! - `Spells_Main (Name, Level, School)`
//! - `Spells_Desc (Name, Description)`

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::common::error::SpellStoreError;

/// A spell with its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellRecord {
    pub name: String,
    pub level: String,
    pub school: String,
    pub description: String,
}

/// Read-only spell lookups.
#[async_trait]
pub trait SpellStore: Send + Sync {
    /// Names of all spells containing `fragment`, in table order.
    async fn search_names(&self, fragment: &str) -> Result<Vec<String>, SpellStoreError>;

    /// Point lookup of one spell by exact name.
    async fn fetch_spell(&self, name: &str) -> Result<Option<SpellRecord>, SpellStoreError>;
}

/// SQLite implementation of [`SpellStore`].
#[derive(Debug, Clone)]
pub struct SqliteSpellStore {
    pool: SqlitePool,
}

impl SqliteSpellStore {
    /// Open the database read-only.
    ///
    /// The connection is made on first use, so a missing file shows up as
    /// [`SpellStoreError::Unavailable`] on lookup rather than at startup.
    pub fn open(db_path: &str) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(options);
        Self { pool }
    }

    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpellStore for SqliteSpellStore {
    async fn search_names(&self, fragment: &str) -> Result<Vec<String>, SpellStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SpellStoreError::Unavailable)?;
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT Name FROM Spells_Desc WHERE instr(lower(Name), lower(?)) > 0")
                .bind(fragment)
                .fetch_all(&mut *conn)
                .await
                .map_err(SpellStoreError::Query)?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn fetch_spell(&self, name: &str) -> Result<Option<SpellRecord>, SpellStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SpellStoreError::Unavailable)?;
        let row: Option<(String, Option<String>, Option<String>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT m.Name, CAST(m.Level AS TEXT), m.School, d.Description
            FROM Spells_Main m
            JOIN Spells_Desc d ON d.Name = m.Name
            WHERE m.Name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(SpellStoreError::Query)?;

        Ok(row.map(|(name, level, school, description)| SpellRecord {
            name,
            level: level.unwrap_or_default(),
            school: school.unwrap_or_default(),
            description: description.unwrap_or_default(),
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory store seeded with a few spells.
    pub(crate) async fn seeded_store() -> SqliteSpellStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query("CREATE TABLE Spells_Main (Name TEXT, Level INTEGER, School TEXT)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE Spells_Desc (Name TEXT, Description TEXT)")
            .execute(&pool)
            .await
            .unwrap();

        let spells = [
            ("Fireball", 3, "Evocation", "A bright streak flashes from your pointing finger."),
            ("Fire Shield", 4, "Evocation", "Thin and wispy flames wreathe your body."),
            ("Mage Hand", 0, "Conjuration", "A spectral, floating hand appears."),
        ];
        for (name, level, school, description) in spells {
            sqlx::query("INSERT INTO Spells_Main (Name, Level, School) VALUES (?, ?, ?)")
                .bind(name)
                .bind(level)
                .bind(school)
                .execute(&pool)
                .await
                .unwrap();
            sqlx::query("INSERT INTO Spells_Desc (Name, Description) VALUES (?, ?)")
                .bind(name)
                .bind(description)
                .execute(&pool)
                .await
                .unwrap();
        }

        // Description without main metadata.
        sqlx::query("INSERT INTO Spells_Desc (Name, Description) VALUES ('Orphan Spell', 'Lost.')")
            .execute(&pool)
            .await
            .unwrap();

        SqliteSpellStore::from_pool(pool)
    }

    #[tokio::test]
    async fn test_search_names_is_substring_match() {
        let store = seeded_store().await;
        let names = store.search_names("fire").await.unwrap();
        assert_eq!(names, vec!["Fireball".to_string(), "Fire Shield".to_string()]);
    }

    #[tokio::test]
    async fn test_search_names_no_match() {
        let store = seeded_store().await;
        assert!(store.search_names("Wish").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_spell_exact_name() {
        let store = seeded_store().await;
        let spell = store.fetch_spell("Fireball").await.unwrap().unwrap();
        assert_eq!(spell.level, "3");
        assert_eq!(spell.school, "Evocation");
        assert!(spell.description.starts_with("A bright streak"));
    }

    #[tokio::test]
    async fn test_fetch_spell_is_not_fuzzy() {
        let store = seeded_store().await;
        assert!(store.fetch_spell("Fire").await.unwrap().is_none());
        assert!(store.fetch_spell("Orphan Spell").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_database_is_unavailable() {
        let store = SqliteSpellStore::open("/nonexistent/mtgbot/spells.db");
        let result = store.search_names("Fireball").await;
        assert!(matches!(result, Err(SpellStoreError::Unavailable(_))));
    }
}
