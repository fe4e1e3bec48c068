use sqlx::{
    Row, Sqlite,
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
};

use crate::error::{Error, Result};
use crate::models::{Poll, PollOption, Vote};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create the database file if it doesn't exist, then connect.
    pub async fn new(db_url: &str) -> Result<Self> {
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url).await?;
        }

        Self::connect(db_url).await
    }

    pub async fn connect(db_url: &str) -> Result<Self> {
        // One interactive session, one statement at a time; no operation
        // spans connections.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    // Initialize the database schema
    async fn init_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS polls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                owner_username TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS options (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                option_text TEXT NOT NULL,
                poll_id INTEGER NOT NULL,
                FOREIGN KEY (poll_id) REFERENCES polls(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                username TEXT NOT NULL,
                option_id INTEGER NOT NULL,
                FOREIGN KEY (option_id) REFERENCES options(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    // Create a new poll and return its generated id
    pub async fn create_poll(&self, title: &str, owner_username: &str) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO polls (title, owner_username)
            VALUES (?, ?)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(owner_username)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("id"))
    }

    // Get a poll by id
    pub async fn get_poll(&self, poll_id: i64) -> Result<Poll> {
        let row = sqlx::query(
            r#"
            SELECT id, title, owner_username
            FROM polls
            WHERE id = ?
            "#,
        )
        .bind(poll_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::PollNotFound(poll_id))?;

        Ok(Poll {
            id: row.get("id"),
            title: row.get("title"),
            owner_username: row.get("owner_username"),
        })
    }

    // Get every poll, in no particular order
    pub async fn get_all_polls(&self) -> Result<Vec<Poll>> {
        let polls = sqlx::query(
            r#"
            SELECT id, title, owner_username
            FROM polls
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| Poll {
            id: row.get("id"),
            title: row.get("title"),
            owner_username: row.get("owner_username"),
        })
        .collect();

        Ok(polls)
    }

    // Get the most recently created poll, if any
    pub async fn get_latest_poll(&self) -> Result<Option<Poll>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, owner_username
            FROM polls
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Poll {
            id: row.get("id"),
            title: row.get("title"),
            owner_username: row.get("owner_username"),
        }))
    }

    // Get all options belonging to a poll
    pub async fn get_poll_options(&self, poll_id: i64) -> Result<Vec<PollOption>> {
        let options = sqlx::query(
            r#"
            SELECT id, option_text, poll_id
            FROM options
            WHERE poll_id = ?
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| PollOption {
            id: row.get("id"),
            option_text: row.get("option_text"),
            poll_id: row.get("poll_id"),
        })
        .collect();

        Ok(options)
    }

    // Add an option to an existing poll and return its generated id.
    // The foreign key constraint rejects a poll_id that doesn't exist.
    pub async fn add_option(&self, option_text: &str, poll_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO options (option_text, poll_id)
            VALUES (?, ?)
            RETURNING id
            "#,
        )
        .bind(option_text)
        .bind(poll_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("id"))
    }

    // Get an option by id
    pub async fn get_option(&self, option_id: i64) -> Result<PollOption> {
        let row = sqlx::query(
            r#"
            SELECT id, option_text, poll_id
            FROM options
            WHERE id = ?
            "#,
        )
        .bind(option_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::OptionNotFound(option_id))?;

        Ok(PollOption {
            id: row.get("id"),
            option_text: row.get("option_text"),
            poll_id: row.get("poll_id"),
        })
    }

    // Get all votes cast for an option
    pub async fn get_votes_for_option(&self, option_id: i64) -> Result<Vec<Vote>> {
        let votes = sqlx::query(
            r#"
            SELECT username, option_id
            FROM votes
            WHERE option_id = ?
            "#,
        )
        .bind(option_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| Vote {
            username: row.get("username"),
            option_id: row.get("option_id"),
        })
        .collect();

        Ok(votes)
    }

    // Record a vote. Duplicate votes by the same username are allowed.
    pub async fn add_vote(&self, username: &str, option_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO votes (username, option_id)
            VALUES (?, ?)
            "#,
        )
        .bind(username)
        .bind(option_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::connect("sqlite::memory:")
            .await
            .expect("in-memory database")
    }

    #[tokio::test]
    async fn created_poll_round_trips() {
        let db = test_db().await;

        let id = db.create_poll("Lunch spot", "alice").await.unwrap();
        let poll = db.get_poll(id).await.unwrap();

        assert_eq!(poll.id, id);
        assert_eq!(poll.title, "Lunch spot");
        assert_eq!(poll.owner_username, "alice");
    }

    #[tokio::test]
    async fn poll_ids_are_monotonic() {
        let db = test_db().await;

        let first = db.create_poll("First", "alice").await.unwrap();
        let second = db.create_poll("Second", "bob").await.unwrap();

        assert!(second > first);
    }

    #[tokio::test]
    async fn missing_poll_is_not_found() {
        let db = test_db().await;

        let err = db.get_poll(42).await.unwrap_err();
        assert!(matches!(err, Error::PollNotFound(42)));
    }

    #[tokio::test]
    async fn missing_option_is_not_found() {
        let db = test_db().await;

        let err = db.get_option(7).await.unwrap_err();
        assert!(matches!(err, Error::OptionNotFound(7)));
    }

    #[tokio::test]
    async fn options_stay_with_their_poll() {
        let db = test_db().await;

        let lunch = db.create_poll("Lunch spot", "alice").await.unwrap();
        let movie = db.create_poll("Movie night", "bob").await.unwrap();

        let pizza = db.add_option("Pizza", lunch).await.unwrap();
        let sushi = db.add_option("Sushi", lunch).await.unwrap();
        db.add_option("Dune", movie).await.unwrap();

        let options = db.get_poll_options(lunch).await.unwrap();
        let mut ids: Vec<i64> = options.iter().map(|o| o.id).collect();
        ids.sort_unstable();

        let mut expected = vec![pizza, sushi];
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn votes_are_fetched_by_option() {
        let db = test_db().await;

        let poll = db.create_poll("Lunch spot", "alice").await.unwrap();
        let pizza = db.add_option("Pizza", poll).await.unwrap();
        let sushi = db.add_option("Sushi", poll).await.unwrap();

        db.add_vote("bob", pizza).await.unwrap();
        db.add_vote("carol", pizza).await.unwrap();
        db.add_vote("dave", sushi).await.unwrap();

        let votes = db.get_votes_for_option(pizza).await.unwrap();
        let mut usernames: Vec<&str> = votes.iter().map(|v| v.username.as_str()).collect();
        usernames.sort_unstable();

        assert_eq!(usernames, vec!["bob", "carol"]);
    }

    #[tokio::test]
    async fn option_for_missing_poll_is_rejected() {
        let db = test_db().await;

        let err = db.add_option("Pizza", 999).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn vote_for_missing_option_is_rejected() {
        let db = test_db().await;

        let err = db.add_vote("bob", 999).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn duplicate_votes_are_allowed() {
        let db = test_db().await;

        let poll = db.create_poll("Lunch spot", "alice").await.unwrap();
        let pizza = db.add_option("Pizza", poll).await.unwrap();

        db.add_vote("bob", pizza).await.unwrap();
        db.add_vote("bob", pizza).await.unwrap();

        let votes = db.get_votes_for_option(pizza).await.unwrap();
        assert_eq!(votes.len(), 2);
    }

    #[tokio::test]
    async fn latest_poll_has_the_highest_id() {
        let db = test_db().await;

        assert!(db.get_latest_poll().await.unwrap().is_none());

        db.create_poll("First", "alice").await.unwrap();
        let second = db.create_poll("Second", "bob").await.unwrap();

        let latest = db.get_latest_poll().await.unwrap().unwrap();
        assert_eq!(latest.id, second);
    }
}
