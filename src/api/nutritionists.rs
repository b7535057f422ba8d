//! Nutritionist endpoints

use super::seg;
use crate::http::{ApiClient, ApiResult};
use crate::models::{NewNutritionist, Nutritionist};

pub async fn list(client: &ApiClient) -> ApiResult<Vec<Nutritionist>> {
    client.get("/nutritionists").await
}

/// Profile of the nutritionist registered under `email`
pub async fn by_email(client: &ApiClient, email: &str) -> ApiResult<Nutritionist> {
    client.get_query("/nuts/email", &[("email", email)]).await
}

pub async fn create(client: &ApiClient, body: &NewNutritionist) -> ApiResult<Nutritionist> {
    client.post("/nutritionists", body).await
}

pub async fn update(client: &ApiClient, id: &str, body: &NewNutritionist) -> ApiResult<Nutritionist> {
    client.put(&format!("/nutritionists/{}", seg(id)), body).await
}

pub async fn delete(client: &ApiClient, id: &str) -> ApiResult<()> {
    client.delete(&format!("/nutritionists/{}", seg(id))).await
}
