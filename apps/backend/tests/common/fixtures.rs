//! Request bodies and factory functions for creating test data.

use serde_json::json;
use uuid::Uuid;

/// Password used for every test user.
pub const PASSWORD: &str = "pw1";

/// Generate a unique username to avoid collisions between test runs.
pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().to_string()[..8])
}

/// Body for POST /register and POST /login.
pub fn credentials(username: &str, password: &str) -> serde_json::Value {
    json!({ "username": username, "password": password })
}

/// Body for POST /flashcard.
pub fn create_flashcard(question: &str, answer: &str, tags: Option<&[&str]>) -> serde_json::Value {
    match tags {
        Some(tags) => json!({ "question": question, "answer": answer, "tags": tags }),
        None => json!({ "question": question, "answer": answer }),
    }
}

/// Body for PUT /flashcard/:id with only the given fields.
pub fn update_flashcard(question: Option<&str>, answer: Option<&str>) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    if let Some(q) = question {
        obj.insert("question".to_string(), json!(q));
    }
    if let Some(a) = answer {
        obj.insert("answer".to_string(), json!(a));
    }
    serde_json::Value::Object(obj)
}

/// Body for POST /tag and POST /flashcard/:id/tag.
pub fn tag(name: &str) -> serde_json::Value {
    json!({ "name": name })
}

/// Pull the id out of a JSON response body.
pub fn id_of(body: &serde_json::Value) -> String {
    body["id"].as_str().expect("response has no id").to_string()
}

/// Names of the tags in a response array.
pub fn tag_names(tags: &serde_json::Value) -> Vec<String> {
    tags.as_array()
        .expect("tags is not an array")
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}
