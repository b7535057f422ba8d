//! Appointment endpoints

use super::seg;
use crate::http::{ApiClient, ApiResult};
use crate::models::{Appointment, AppointmentUpdate, NewAppointment};

pub async fn for_nutritionist(client: &ApiClient, nutritionist_id: &str) -> ApiResult<Vec<Appointment>> {
    client
        .get(&format!("/appointments/nutritionist/{}", seg(nutritionist_id)))
        .await
}

pub async fn for_client(client: &ApiClient, client_id: &str) -> ApiResult<Vec<Appointment>> {
    client
        .get(&format!("/appointments/client/{}", seg(client_id)))
        .await
}

pub async fn add(client: &ApiClient, body: &NewAppointment) -> ApiResult<Appointment> {
    client.post("/appointments/add", body).await
}

pub async fn update(client: &ApiClient, id: &str, body: &AppointmentUpdate) -> ApiResult<Appointment> {
    client.put(&format!("/appointments/{}", seg(id)), body).await
}

pub async fn delete(client: &ApiClient, id: &str) -> ApiResult<()> {
    client.delete(&format!("/appointments/{}", seg(id))).await
}
