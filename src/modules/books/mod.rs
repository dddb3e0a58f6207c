pub mod handlers;
pub mod models;

use async_trait::async_trait;
use axum::{routing::get, Router};
use serde_json::json;
use shelf_kernel::{InitCtx, Module};

/// Mock `book` resource mounted at `/books`
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
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
        Router::new()
            .route(
                "/",
                get(handlers::list_books).post(handlers::create_book),
            )
            .route(
                "/{id}",
                get(handlers::get_book).delete(handlers::delete_book),
            )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_ref = json!({ "$ref": "#/components/schemas/Book" });
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "description": "Book identifier (ignored)",
            "schema": { "type": "string" }
        });
        let book_properties = json!({
            "id": {
                "type": "string",
                "format": "uuid",
                "description": "Unique identifier for the book"
            },
            "title": {
                "type": "string",
                "minLength": 1,
                "description": "Title of the book"
            },
            "author": {
                "type": "string",
                "minLength": 1,
                "description": "Author of the book"
            },
            "summary": {
                "type": "string",
                "minLength": 5,
                "description": "Short summary of the book"
            },
            "totalPages": {
                "type": "integer",
                "minimum": 1,
                "description": "Total page count"
            }
        });
        let required = json!(["id", "title", "author", "summary", "totalPages"]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Success",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": book_ref }
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
                                    "schema": { "$ref": "#/components/schemas/PostBook" }
                                },
                                "application/x-www-form-urlencoded": {
                                    "schema": { "$ref": "#/components/schemas/PostBook" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Created",
                                "content": {
                                    "application/json": { "schema": book_ref }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": {
                                "description": "Success",
                                "content": {
                                    "application/json": { "schema": book_ref }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "Deleted" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": book_properties,
                        "required": required
                    },
                    "PostBook": {
                        "type": "object",
                        "properties": book_properties,
                        "required": required
                    }
                }
            }
        }))
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

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
