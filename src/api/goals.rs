//! Goal endpoints

use super::seg;
use crate::http::{ApiClient, ApiResult};
use crate::models::{Goal, GoalUpdate, NewGoal};

pub async fn list(client: &ApiClient, client_id: &str) -> ApiResult<Vec<Goal>> {
    client.get(&format!("/client/goal/{}", seg(client_id))).await
}

pub async fn create(client: &ApiClient, body: &NewGoal) -> ApiResult<Goal> {
    client.post("/client/goal", body).await
}

pub async fn update(client: &ApiClient, id: &str, body: &GoalUpdate) -> ApiResult<Goal> {
    client.put(&format!("/client/goal/{}", seg(id)), body).await
}

pub async fn delete(client: &ApiClient, id: &str) -> ApiResult<()> {
    client.delete(&format!("/client/goal/{}", seg(id))).await
}
