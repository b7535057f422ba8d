//! Client endpoints

use super::seg;
use crate::http::{ApiClient, ApiResult};
use crate::models::{Client, NewClient};

pub async fn list(client: &ApiClient) -> ApiResult<Vec<Client>> {
    client.get("/clients").await
}

/// Clients assigned to one nutritionist
pub async fn by_nutritionist(client: &ApiClient, nutritionist_id: &str) -> ApiResult<Vec<Client>> {
    client
        .get(&format!("/client/byNutId/{}", seg(nutritionist_id)))
        .await
}

/// Profile of the client registered under `email`
pub async fn by_email(client: &ApiClient, email: &str) -> ApiResult<Client> {
    client.get_query("/client/email", &[("email", email)]).await
}

pub async fn create(client: &ApiClient, body: &NewClient) -> ApiResult<Client> {
    client.post("/clients", body).await
}

pub async fn update(client: &ApiClient, id: &str, body: &NewClient) -> ApiResult<Client> {
    client.put(&format!("/clients/{}", seg(id)), body).await
}

pub async fn delete(client: &ApiClient, id: &str) -> ApiResult<()> {
    client.delete(&format!("/clients/{}", seg(id))).await
}
