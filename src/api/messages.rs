//! Messaging endpoints
//!
//! A conversation is stored server-side as two independent streams, one per
//! sender. The client fetches both and merges them by timestamp.

use super::seg;
use crate::http::{ApiClient, ApiResult};
use crate::models::{Message, NewMessage};
use std::collections::HashSet;

/// Messages the nutritionist sent to the client
pub async fn sent_by_nutritionist(
    client: &ApiClient,
    nutritionist_id: &str,
    client_id: &str,
) -> ApiResult<Vec<Message>> {
    client
        .get(&format!(
            "/nuts/messages/{}/{}",
            seg(nutritionist_id),
            seg(client_id)
        ))
        .await
}

/// Messages the client sent to the nutritionist
pub async fn sent_by_client(
    client: &ApiClient,
    client_id: &str,
    nutritionist_id: &str,
) -> ApiResult<Vec<Message>> {
    client
        .get(&format!(
            "/client/messages/{}/{}",
            seg(client_id),
            seg(nutritionist_id)
        ))
        .await
}

pub async fn send_from_nutritionist(client: &ApiClient, body: &NewMessage) -> ApiResult<Message> {
    client.post("/nuts/sendMessage", body).await
}

pub async fn send_from_client(client: &ApiClient, body: &NewMessage) -> ApiResult<Message> {
    client.post("/client/sendMessage", body).await
}

/// Both sides of a conversation, oldest first
pub async fn conversation(
    client: &ApiClient,
    nutritionist_id: &str,
    client_id: &str,
) -> ApiResult<Vec<Message>> {
    let (outgoing, incoming) = tokio::try_join!(
        sent_by_nutritionist(client, nutritionist_id, client_id),
        sent_by_client(client, client_id, nutritionist_id),
    )?;
    Ok(merge_conversation(outgoing, incoming))
}

/// Merge two message streams into ascending timestamp order.
///
/// Equal timestamps keep their input order (`a` before `b`). A message id
/// seen twice is kept once.
pub fn merge_conversation(a: Vec<Message>, b: Vec<Message>) -> Vec<Message> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Message> = a
        .into_iter()
        .chain(b)
        .filter(|m| m.id.is_empty() || seen.insert(m.id.clone()))
        .collect();
    merged.sort_by_key(|m| m.timestamp);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::testing::{session_store, MockBackend};
    use axum::{routing::get, Json, Router};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn msg(id: &str, from: &str, to: &str, minute: u32) -> Message {
        Message {
            id: id.to_string(),
            sender_id: from.to_string(),
            receiver_id: to.to_string(),
            content: format!("message {}", id),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 10, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_merge_orders_by_timestamp() {
        let from_nut = vec![msg("n1", "nut", "cli", 1), msg("n2", "nut", "cli", 5)];
        let from_client = vec![msg("c1", "cli", "nut", 3), msg("c2", "cli", "nut", 0)];

        let merged = merge_conversation(from_nut, from_client);
        let ids: Vec<&str> = merged.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "n1", "c1", "n2"]);
    }

    #[test]
    fn test_merge_ties_and_duplicates() {
        let merged = merge_conversation(
            vec![msg("a", "nut", "cli", 2), msg("dup", "nut", "cli", 4)],
            vec![msg("b", "cli", "nut", 2), msg("dup", "nut", "cli", 4)],
        );
        let ids: Vec<&str> = merged.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "dup"]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_conversation(Vec::new(), Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_conversation_fetches_both_streams() {
        let router = Router::new()
            .route(
                "/nuts/messages/:nut/:client",
                get(|| async {
                    Json(json!([
                        {"_id": "n1", "senderId": "nut", "receiverId": "cli", "content": "Hi", "timestamp": "2026-03-01T10:00:00Z"},
                        {"_id": "n2", "senderId": "nut", "receiverId": "cli", "content": "Great", "timestamp": "2026-03-01T10:10:00Z"}
                    ]))
                }),
            )
            .route(
                "/client/messages/:client/:nut",
                get(|| async {
                    Json(json!([
                        {"_id": "c1", "senderId": "cli", "receiverId": "nut", "content": "Hello", "timestamp": "2026-03-01T10:05:00Z"}
                    ]))
                }),
            );
        let backend = MockBackend::start(router).await;
        let client = backend.client(session_store("ana@nutri.io", Role::Nutritionist));

        let messages = conversation(&client, "nut", "cli").await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Hi", "Hello", "Great"]);
        assert_eq!(backend.count("GET /nuts/messages/nut/cli"), 1);
        assert_eq!(backend.count("GET /client/messages/cli/nut"), 1);
    }
}
