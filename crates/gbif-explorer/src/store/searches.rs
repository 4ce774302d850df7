//! Search session CRUD.

use super::Database;
use crate::error::StoreResult;
use crate::models::{Search, SearchStatus};

const SEARCH_COLUMNS: &str = "id, person_name, created_at, result_count, status, error_message";

impl Database {
    /// Record a new search for `person_name` in the `downloading` state.
    pub async fn create_search(&self, person_name: &str) -> StoreResult<i64> {
        let result = sqlx::query(
            "INSERT INTO searches (person_name, created_at, status) VALUES (?, ?, ?)",
        )
        .bind(person_name)
        .bind(chrono::Utc::now().timestamp())
        .bind(SearchStatus::Downloading.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Mark a search completed with the number of records the fetch returned.
    pub async fn complete_search(&self, id: i64, result_count: i64) -> StoreResult<()> {
        sqlx::query("UPDATE searches SET status = ?, result_count = ?, error_message = NULL WHERE id = ?")
            .bind(SearchStatus::Completed.as_str())
            .bind(result_count)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Mark a search failed.
    pub async fn fail_search(&self, id: i64, message: &str) -> StoreResult<()> {
        sqlx::query("UPDATE searches SET status = ?, error_message = ? WHERE id = ?")
            .bind(SearchStatus::Error.as_str())
            .bind(message)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Look up a search by id.
    pub async fn get_search(&self, id: i64) -> StoreResult<Option<Search>> {
        let search = sqlx::query_as::<_, Search>(&format!(
            "SELECT {SEARCH_COLUMNS} FROM searches WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(search)
    }

    /// Most recent searches first.
    pub async fn recent_searches(&self, limit: i64) -> StoreResult<Vec<Search>> {
        let searches = sqlx::query_as::<_, Search>(&format!(
            "SELECT {SEARCH_COLUMNS} FROM searches ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(searches)
    }

    /// Delete a search and, through the foreign key cascade, its occurrences.
    ///
    /// Returns `false` if no such search existed.
    pub async fn delete_search(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM searches WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
