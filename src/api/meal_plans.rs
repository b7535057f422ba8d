//! Meal plan endpoints

use super::seg;
use crate::http::{ApiClient, ApiResult};
use crate::models::{MealPlanEntry, NewMealPlanEntry};

pub async fn list(client: &ApiClient, client_id: &str) -> ApiResult<Vec<MealPlanEntry>> {
    client.get(&format!("/mealplans/{}", seg(client_id))).await
}

pub async fn create(client: &ApiClient, body: &NewMealPlanEntry) -> ApiResult<MealPlanEntry> {
    client.post("/mealplans", body).await
}

pub async fn delete(client: &ApiClient, id: &str) -> ApiResult<()> {
    client.delete(&format!("/mealplans/{}", seg(id))).await
}
