//! Progress metric endpoints

use super::seg;
use crate::http::{ApiClient, ApiResult};
use crate::models::{NewProgress, ProgressEntry};

pub async fn list(client: &ApiClient, client_id: &str) -> ApiResult<Vec<ProgressEntry>> {
    client
        .get(&format!("/client/progress/{}", seg(client_id)))
        .await
}

pub async fn record(client: &ApiClient, body: &NewProgress) -> ApiResult<ProgressEntry> {
    client.post("/client/progress", body).await
}
