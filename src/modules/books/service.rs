use std::sync::Arc;

use super::models::Book;
use super::repository::BookRepository;

/// Book use cases; everything is delegated to the repository.
#[derive(Clone)]
pub struct BookService {
    repo: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        Self { repo }
    }

    pub async fn save_book(&self, book: Book) -> anyhow::Result<Book> {
        self.repo.save(book).await
    }

    pub async fn get_all_books(&self) -> anyhow::Result<Vec<Book>> {
        self.repo.find_all().await
    }

    pub async fn get_book_by_id(&self, id: i64) -> anyhow::Result<Option<Book>> {
        self.repo.find_by_id(id).await
    }

    /// Replace the book stored under `id`; the payload's own id is ignored.
    ///
    /// There is no existence check: a missing `id` is created.
    pub async fn update_book_by_id(&self, id: i64, mut book: Book) -> anyhow::Result<Book> {
        book.id = Some(id);
        self.repo.save(book).await
    }

    /// No existence check; callers decide whether absence is an error.
    pub async fn delete_book(&self, id: i64) -> anyhow::Result<()> {
        self.repo.delete_by_id(id).await
    }
}
