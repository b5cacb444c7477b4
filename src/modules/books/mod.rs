pub mod error;
pub mod models;
pub mod query;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

pub use error::CatalogError;
pub use models::{Book, BookPage, BookStats, CreateBook, UpdateBook};
pub use query::ListParams;
pub use store::BookStore;

/// Book catalog module: CRUD, search, and statistics over an in-memory store
pub struct BooksModule {
    store: Arc<BookStore>,
}

impl BooksModule {
    pub fn new() -> Self {
        Self::with_store(Arc::new(BookStore::new()))
    }

    /// Build the module around an existing store
    pub fn with_store(store: Arc<BookStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<BookStore> {
        &self.store
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
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let books = self.store.len().await;
        tracing::info!(
            module = self.name(),
            books,
            "books module stopped; in-memory catalog discarded"
        );
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64", "minimum": 1 }
    });

    json!({
        "paths": {
            "/books": {
                "get": {
                    "summary": "List books",
                    "description": "Filter, sort, and page the catalog. Invalid parameters fall back to defaults.",
                    "tags": ["Books"],
                    "parameters": [
                        { "name": "q", "in": "query", "required": false, "schema": { "type": "string" },
                          "description": "Case-insensitive match on title or author" },
                        { "name": "sort", "in": "query", "required": false,
                          "schema": { "type": "string", "enum": ["title", "author", "year"], "default": "title" } },
                        { "name": "order", "in": "query", "required": false,
                          "schema": { "type": "string", "enum": ["asc", "desc"], "default": "asc" } },
                        { "name": "offset", "in": "query", "required": false,
                          "schema": { "type": "integer", "minimum": 0, "default": 0 } },
                        { "name": "limit", "in": "query", "required": false,
                          "schema": { "type": "integer", "minimum": 1, "maximum": 100, "default": 10 } }
                    ],
                    "responses": {
                        "200": {
                            "description": "Page of books",
                            "headers": {
                                "X-Total-Count": {
                                    "description": "Number of matching books before paging",
                                    "schema": { "type": "integer" }
                                }
                            },
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/CreateBook" }
                            }
                        }
                    },
                    "responses": {
                        "201": book_response("Book created"),
                        "409": error_response("A book with the same title and author already exists"),
                        "422": error_response("Invalid request body")
                    }
                }
            },
            "/books/stats": {
                "get": {
                    "summary": "Catalog statistics",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "Statistics over the whole catalog",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookStats" }
                                }
                            }
                        }
                    }
                }
            },
            "/books/{id}": {
                "put": {
                    "summary": "Update a book",
                    "description": "Only the supplied fields are changed.",
                    "tags": ["Books"],
                    "parameters": [id_param.clone()],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/UpdateBook" }
                            }
                        }
                    },
                    "responses": {
                        "200": book_response("Book updated"),
                        "404": error_response("Book not found"),
                        "409": error_response("A book with the same title and author already exists"),
                        "422": error_response("Invalid request body")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_param],
                    "responses": {
                        "204": { "description": "Book deleted" },
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
                        "id": { "type": "integer", "format": "int64", "description": "Identifier assigned by the catalog" },
                        "title": { "type": "string", "description": "Title of the book" },
                        "author": { "type": "string", "description": "Author of the book" },
                        "year": { "type": "integer", "format": "int32", "description": "Publication year" },
                        "read": { "type": "boolean", "description": "Whether the book has been read" }
                    },
                    "required": ["id", "title", "author", "year", "read"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "author": { "type": "string", "minLength": 1 },
                        "year": { "type": "integer", "format": "int32" },
                        "read": { "type": "boolean", "default": false }
                    },
                    "required": ["title", "author", "year"]
                },
                "UpdateBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "author": { "type": "string", "minLength": 1 },
                        "year": { "type": "integer", "format": "int32" },
                        "read": { "type": "boolean" }
                    }
                },
                "BookStats": {
                    "type": "object",
                    "properties": {
                        "count": { "type": "integer" },
                        "read_count": { "type": "integer" },
                        "top_author": { "type": "string", "description": "\"N/A\" when the catalog is empty" }
                    },
                    "required": ["count", "read_count", "top_author"]
                }
            }
        }
    })
}
