//! Book persistence.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::models::Book;

/// Schema for the `books` table; the checks mirror the payload constraints.
pub(crate) const CREATE_BOOKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        title          TEXT    NOT NULL CHECK (length(trim(title)) > 0),
        author         TEXT    NOT NULL CHECK (length(trim(author)) > 0),
        published_date TEXT    NOT NULL,
        isbn           TEXT    NOT NULL CHECK (length(isbn) > 0),
        price          REAL    NOT NULL CHECK (price > 0)
    );
"#;

const BOOK_COLUMNS: &str = "id, title, author, published_date, isbn, price";

/// Storage contract for books
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert when `book.id` is `None`, otherwise overwrite (or create) the row with that id.
    async fn save(&self, book: Book) -> anyhow::Result<Book>;

    async fn find_all(&self) -> anyhow::Result<Vec<Book>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>>;

    /// Removing an absent id is a no-op
    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()>;
}

/// [`BookRepository`] over the `books` table of a SQLite pool
#[derive(Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn save(&self, book: Book) -> anyhow::Result<Book> {
        // A NULL id never conflicts, so SQLite assigns a fresh one.
        let sql = format!(
            "INSERT INTO books ({BOOK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 author = excluded.author,
                 published_date = excluded.published_date,
                 isbn = excluded.isbn,
                 price = excluded.price
             RETURNING {BOOK_COLUMNS}"
        );

        sqlx::query_as::<_, Book>(&sql)
            .bind(book.id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.published_date)
            .bind(&book.isbn)
            .bind(book.price)
            .fetch_one(&self.pool)
            .await
            .context("failed to save book")
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Book>> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .context("failed to list books")
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load book {id}"))
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete book {id}"))?;

        tracing::debug!(book_id = id, rows = result.rows_affected(), "book delete executed");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Fresh in-memory database with the `books` table created
    pub(crate) async fn memory_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::raw_sql(CREATE_BOOKS_TABLE).execute(&pool).await.unwrap();
        pool
    }

    pub(crate) fn book(title: &str, isbn: &str, price: f64) -> Book {
        Book {
            id: None,
            title: title.to_string(),
            author: "Author".to_string(),
            published_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            isbn: isbn.to_string(),
            price,
        }
    }

    #[tokio::test]
    async fn save_without_id_assigns_one() {
        let repo = SqliteBookRepository::new(memory_pool().await);

        let first = repo.save(book("Book One", "9781234567890", 19.99)).await.unwrap();
        let second = repo.save(book("Book Two", "9780987654321", 29.99)).await.unwrap();

        assert!(first.id.is_some());
        assert_ne!(first.id, second.id);
        assert_eq!(first.title, "Book One");
        assert_eq!(second.price, 29.99);
    }

    #[tokio::test]
    async fn save_with_existing_id_overwrites_row() {
        let repo = SqliteBookRepository::new(memory_pool().await);
        let saved = repo.save(book("Draft", "9781234567890", 10.0)).await.unwrap();

        let mut revised = book("Final", "0987654321", 12.5);
        revised.id = saved.id;
        repo.save(revised.clone()).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all, vec![revised]);
    }

    #[tokio::test]
    async fn save_with_unknown_id_inserts_under_that_id() {
        let repo = SqliteBookRepository::new(memory_pool().await);
        let mut ghost = book("Ghost", "9781234567890", 5.0);
        ghost.id = Some(99);

        let saved = repo.save(ghost).await.unwrap();
        assert_eq!(saved.id, Some(99));
        assert!(repo.find_by_id(99).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn find_by_id_returns_none_when_absent() {
        let repo = SqliteBookRepository::new(memory_pool().await);
        assert_eq!(repo.find_by_id(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_is_a_no_op_for_missing_rows() {
        let repo = SqliteBookRepository::new(memory_pool().await);
        let saved = repo.save(book("Doomed", "9781234567890", 1.0)).await.unwrap();
        let id = saved.id.unwrap();

        repo.delete_by_id(id).await.unwrap();
        repo.delete_by_id(id).await.unwrap();
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn table_checks_reject_non_positive_price() {
        let repo = SqliteBookRepository::new(memory_pool().await);
        let err = repo.save(book("Free", "9781234567890", 0.0)).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to save book");
    }
}
