pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookmanager_kernel::{InitCtx, Migration, Module};
use once_cell::sync::OnceCell;

use repository::SqliteBookRepository;
use service::BookService;

/// Book records CRUD, served under `/api/books`
pub struct BooksModule {
    service: OnceCell<Arc<BookService>>,
}

impl BooksModule {
    pub const fn new() -> Self {
        Self {
            service: OnceCell::new(),
        }
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let repository = SqliteBookRepository::new(ctx.db.clone());
        let service = Arc::new(BookService::new(Arc::new(repository)));
        if self.service.set(service).is_err() {
            anyhow::bail!("books module initialized twice");
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        match self.service.get() {
            Some(service) => routes::router(Arc::clone(service)),
            None => {
                tracing::warn!(module = self.name(), "routes requested before init; serving none");
                Router::new()
            }
        }
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: repository::CREATE_BOOKS_TABLE,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = serde_json::json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    }]);
    let book_body = serde_json::json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookPayload" }
            }
        }
    });

    serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "Get List of all the Books from the Book Manager",
                    "tags": ["Book Manager"],
                    "responses": {
                        "200": {
                            "description": "All books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Add a new Book to the Book Manager",
                    "tags": ["Book Manager"],
                    "requestBody": book_body.clone(),
                    "responses": {
                        "201": book_response("Created book"),
                        "400": error_response("Validation failed")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a specific Book from the Book Manager",
                    "tags": ["Book Manager"],
                    "parameters": id_param.clone(),
                    "responses": {
                        "200": book_response("The book"),
                        "404": error_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Update Book details in the Book Manager",
                    "tags": ["Book Manager"],
                    "parameters": id_param.clone(),
                    "requestBody": book_body,
                    "responses": {
                        "200": book_response("Updated book"),
                        "400": error_response("Validation failed")
                    }
                },
                "delete": {
                    "summary": "Delete a Book from the Book Manager",
                    "tags": ["Book Manager"],
                    "parameters": id_param,
                    "responses": {
                        "200": {
                            "description": "Deletion confirmation",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        },
                        "404": error_response("Book not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "publishedDate": { "type": "string", "format": "date" },
                        "isbn": { "type": "string", "pattern": "^(978|979)?[0-9]{9}([0-9]|X)$" },
                        "price": { "type": "number", "exclusiveMinimum": 0 }
                    },
                    "required": ["id", "title", "author", "publishedDate", "isbn", "price"]
                },
                "BookPayload": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "author": { "type": "string", "minLength": 1 },
                        "publishedDate": { "type": "string", "format": "date" },
                        "isbn": { "type": "string", "pattern": "^(978|979)?[0-9]{9}([0-9]|X)$" },
                        "price": { "type": "number", "exclusiveMinimum": 0 }
                    },
                    "required": ["title", "author", "publishedDate", "isbn", "price"]
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}
