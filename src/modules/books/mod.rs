pub mod clock;
pub mod ids;
mod lenient;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

pub use service::{BookError, BookService};

/// Books module: the bookshelf inventory mounted at `/books`
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(service: Arc<BookService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<BookService> {
        &self.service
    }

    fn shelf_size(&self) -> usize {
        self.service.repository().len().unwrap_or_default()
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
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            books = self.shelf_size(),
            "books module started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        // The shelf lives in memory only; whatever is on it is dropped here.
        tracing::info!(
            module = self.name(),
            books = self.shelf_size(),
            "books module stopped"
        );
        Ok(())
    }
}

/// Create the books module over a fresh in-memory shelf
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new(Arc::new(BookService::in_memory())))
}

fn fail_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/FailResponse" }
            }
        }
    })
}

fn success_response(description: &str, data: Option<serde_json::Value>) -> serde_json::Value {
    let mut properties = json!({
        "status": { "type": "string", "enum": ["success"] },
        "message": { "type": "string" }
    });
    if let Some(data) = data {
        properties["data"] = data;
    }
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": properties,
                    "required": ["status"]
                }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = json!({
        "name": "book_id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    });
    let payload_body = json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookPayload" }
            }
        }
    });
    let query_param = |name: &str, description: &str| {
        json!({
            "name": name,
            "in": "query",
            "required": false,
            "description": description,
            "schema": { "type": "string" }
        })
    };

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "parameters": [
                        query_param("name", "Case-insensitive substring of the book name"),
                        query_param("reading", "1/true or 0/false; ignored when name is set"),
                        query_param("finished", "1/true or 0/false; ignored when name or reading is set")
                    ],
                    "responses": {
                        "200": success_response("Book summaries", Some(json!({
                            "type": "object",
                            "properties": {
                                "books": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/BookSummary" }
                                }
                            }
                        })))
                    }
                },
                "post": {
                    "summary": "Add a book",
                    "tags": ["Books"],
                    "requestBody": payload_body.clone(),
                    "responses": {
                        "201": success_response("Book added", Some(json!({
                            "type": "object",
                            "properties": { "bookId": { "type": "string" } }
                        }))),
                        "400": fail_response("Missing name or readPage above pageCount"),
                        "500": fail_response("Book could not be stored")
                    }
                }
            },
            "/{book_id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [id_param.clone()],
                    "responses": {
                        "200": success_response("Full book record", Some(json!({
                            "type": "object",
                            "properties": { "book": { "$ref": "#/components/schemas/Book" } }
                        }))),
                        "404": fail_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace a book",
                    "tags": ["Books"],
                    "parameters": [id_param.clone()],
                    "requestBody": payload_body,
                    "responses": {
                        "200": success_response("Book updated", None),
                        "400": fail_response("Missing name or readPage above pageCount"),
                        "404": fail_response("Book not found")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_param],
                    "responses": {
                        "200": success_response("Book deleted", None),
                        "404": fail_response("Book not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "BookPayload": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "year": { "type": "number" },
                        "author": { "type": "string" },
                        "summary": { "type": "string" },
                        "publisher": { "type": "string" },
                        "pageCount": { "type": "number" },
                        "readPage": { "type": "number" },
                        "reading": { "type": "boolean" }
                    },
                    "required": ["name"]
                },
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "year": { "type": ["number", "null"] },
                        "author": { "type": ["string", "null"] },
                        "summary": { "type": ["string", "null"] },
                        "publisher": { "type": ["string", "null"] },
                        "pageCount": { "type": ["number", "null"] },
                        "readPage": { "type": ["number", "null"] },
                        "reading": { "type": "boolean" },
                        "finished": { "type": "boolean" },
                        "insertedAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": ["id", "name", "reading", "finished", "insertedAt", "updatedAt"]
                },
                "BookSummary": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "publisher": { "type": ["string", "null"] }
                    },
                    "required": ["id", "name"]
                }
            }
        }
    })
}
