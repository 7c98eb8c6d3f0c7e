//! OpenAPI description served at `/openapi.json`

use serde_json::{json, Value};
use std::sync::OnceLock;

pub const TITLE: &str = "The Birds API";
pub const VERSION: &str = "0.0.1";

const DESCRIPTION: &str = "\
## A very small bird API

A read-only HTTP/JSON API over a fixed set of birds. It shows:
* a root resource returning a plain JSON object,
* a collection resource with an optional query parameter,
* an item resource addressed by a path parameter,
* 404 responses for absent birds and 422 responses for malformed ids.";

static DOCUMENT: OnceLock<Value> = OnceLock::new();

/// The OpenAPI document, built on first use
pub fn document() -> &'static Value {
    DOCUMENT.get_or_init(build_document)
}

fn build_document() -> Value {
    json!({
        "openapi": "3.1.0",
        "info": {
            "title": TITLE,
            "description": DESCRIPTION,
            "version": VERSION,
        },
        "paths": {
            "/": { "get": root_operation() },
            "/birds": { "get": birds_operation() },
            "/birds/{birdid}": { "get": bird_operation() },
        },
        "components": { "schemas": schemas() },
    })
}

fn json_content(schema: Value) -> Value {
    json!({ "application/json": { "schema": schema } })
}

fn root_operation() -> Value {
    json!({
        "summary": "Root",
        "description": "The root resource which returns a simple example **JSON object**.",
        "operationId": "root",
        "responses": {
            "200": {
                "description": "Successful Response",
                "content": json_content(json!({ "$ref": "#/components/schemas/Greeting" })),
            }
        }
    })
}

fn birds_operation() -> Value {
    json!({
        "summary": "Birds",
        "description": "Return the collection of birds. Without `starts_with` all birds are returned; \
                        `/birds?starts_with=T` returns the birds whose name begins with \"T\".",
        "operationId": "birds",
        "parameters": [{
            "name": "starts_with",
            "in": "query",
            "required": false,
            "description": "Return birds whose names begin with the string `starts_with`.",
            "schema": { "type": "string" }
        }],
        "responses": {
            "200": {
                "description": "Successful Response",
                "content": json_content(json!({ "$ref": "#/components/schemas/BirdCollection" })),
            },
            "404": { "description": "No bird name begins with `starts_with`" }
        }
    })
}

fn bird_operation() -> Value {
    json!({
        "summary": "Bird",
        "description": "Return the name of the bird with the given `birdid`.",
        "operationId": "bird",
        "parameters": [{
            "name": "birdid",
            "in": "path",
            "required": true,
            "description": "`birdid` is a five-digit number that identifies a specific bird.",
            "schema": { "type": "integer" }
        }],
        "responses": {
            "200": {
                "description": "Successful Response",
                "content": json_content(json!({ "type": "string" })),
            },
            "404": { "description": "No bird with this `birdid`" },
            "422": {
                "description": "Validation Error",
                "content": json_content(json!({ "$ref": "#/components/schemas/HTTPValidationError" })),
            }
        }
    })
}

fn schemas() -> Value {
    let validation_issue = json!({
        "type": "object",
        "required": ["type", "loc", "msg"],
        "properties": {
            "type": { "type": "string" },
            "loc": { "type": "array", "items": { "type": "string" } },
            "msg": { "type": "string" },
            "input": {}
        }
    });

    json!({
        "Greeting": {
            "type": "object",
            "required": ["greeting", "number"],
            "properties": {
                "greeting": { "type": "string" },
                "number": { "type": "integer" }
            }
        },
        "BirdCollection": {
            "type": "object",
            "required": ["birds", "count"],
            "properties": {
                "birds": {
                    "type": "object",
                    "propertyNames": { "pattern": "^-?[0-9]+$" },
                    "additionalProperties": { "type": "string" }
                },
                "count": { "type": "integer", "minimum": 0 }
            }
        },
        "HTTPValidationError": {
            "type": "object",
            "properties": {
                "detail": { "type": "array", "items": validation_issue }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_info() {
        let doc = document();
        assert_eq!(doc["openapi"], "3.1.0");
        assert_eq!(doc["info"]["title"], TITLE);
        assert_eq!(doc["info"]["version"], VERSION);
    }

    #[test]
    fn test_document_lists_endpoints() {
        let paths = document()["paths"].as_object().unwrap();
        let mut names: Vec<&str> = paths.keys().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["/", "/birds", "/birds/{birdid}"]);

        let param = &document()["paths"]["/birds/{birdid}"]["get"]["parameters"][0];
        assert_eq!(param["name"], "birdid");
        assert_eq!(param["schema"]["type"], "integer");
    }
}
