//! Nutritionist dashboard: own clients, schedule, messages and client tracking

use super::{settle, settle_read, Collection, Dashboard, DashboardError, DashboardResult, LoadState, Notices};
use crate::api;
use crate::forms::{AppointmentForm, FormInput, GoalForm, MealPlanForm, MessageForm, ProgressForm};
use crate::http::ApiClient;
use crate::models::{
    Appointment, AppointmentStatus, AppointmentUpdate, Client, Goal, MealPlanEntry, Message,
    NewMessage, Nutritionist, ProgressEntry, Role,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct NutritionistData {
    pub profile: Nutritionist,
    pub clients: Collection<Client>,
    pub appointments: Collection<Appointment>,
    /// Conversations opened so far, keyed by client id
    pub conversations: HashMap<String, Vec<Message>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NutritionistStats {
    pub clients: usize,
    pub upcoming_appointments: usize,
    pub completed_appointments: usize,
}

/// Outcome of a broadcast; each recipient succeeds or fails on its own
#[derive(Debug, Clone, Default)]
pub struct BroadcastReport {
    pub sent: Vec<Message>,
    /// (client id, error)
    pub failed: Vec<(String, String)>,
}

impl BroadcastReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct NutritionistDashboard {
    api: Arc<ApiClient>,
    state: LoadState<NutritionistData>,
    notices: Notices,
}

impl NutritionistDashboard {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: LoadState::Idle,
            notices: Notices::default(),
        }
    }

    pub fn state(&self) -> &LoadState<NutritionistData> {
        &self.state
    }

    pub fn data(&self) -> Option<&NutritionistData> {
        self.state.ready()
    }

    pub fn profile(&self) -> Option<&Nutritionist> {
        self.state.ready().map(|d| &d.profile)
    }

    /// Scheduled appointments from `now` on, soonest first
    pub fn upcoming_appointments(&self, now: DateTime<Utc>) -> Vec<&Appointment> {
        let Some(data) = self.state.ready() else {
            return Vec::new();
        };
        let mut upcoming: Vec<&Appointment> = data
            .appointments
            .iter()
            .filter(|a| a.is_upcoming(now))
            .collect();
        upcoming.sort_by_key(|a| a.date_time);
        upcoming
    }

    pub fn stats(&self, now: DateTime<Utc>) -> NutritionistStats {
        let Some(data) = self.state.ready() else {
            return NutritionistStats::default();
        };
        NutritionistStats {
            clients: data.clients.len(),
            upcoming_appointments: data.appointments.iter().filter(|a| a.is_upcoming(now)).count(),
            completed_appointments: data
                .appointments
                .iter()
                .filter(|a| a.status == AppointmentStatus::Completed)
                .count(),
        }
    }

    fn loaded(&mut self) -> DashboardResult<&mut NutritionistData> {
        self.state.ready_mut().ok_or(DashboardError::NotLoaded)
    }

    /// Profile id, provided `client_id` is one of this nutritionist's clients
    fn own_client(&mut self, client_id: &str) -> DashboardResult<String> {
        let data = self.loaded()?;
        if !data.clients.contains(client_id) {
            return Err(DashboardError::UnknownRecord(client_id.to_string()));
        }
        Ok(data.profile.id.clone())
    }

    // ---- messaging ----

    /// Fetch both sides of the conversation with a client, oldest first
    pub async fn conversation(&mut self, client_id: &str) -> DashboardResult<&[Message]> {
        let result = self.try_conversation(client_id).await;
        settle_read(&mut self.state, &mut self.notices, result)?;
        let data = self.loaded()?;
        Ok(data
            .conversations
            .get(client_id)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    async fn try_conversation(&mut self, client_id: &str) -> DashboardResult<()> {
        let nutritionist_id = self.own_client(client_id)?;
        let messages = api::messages::conversation(&self.api, &nutritionist_id, client_id).await?;
        self.loaded()?
            .conversations
            .insert(client_id.to_string(), messages);
        Ok(())
    }

    pub async fn send_message(&mut self, client_id: &str, form: &MessageForm) -> DashboardResult<Message> {
        let result = self.try_send_message(client_id, form).await;
        settle(&mut self.state, &mut self.notices, result, |_| "Message sent".to_string())
    }

    async fn try_send_message(&mut self, client_id: &str, form: &MessageForm) -> DashboardResult<Message> {
        let content = form.validate()?;
        let nutritionist_id = self.own_client(client_id)?;
        let body = NewMessage {
            sender_id: nutritionist_id,
            receiver_id: client_id.to_string(),
            content,
        };
        let sent = api::messages::send_from_nutritionist(&self.api, &body).await?;
        if let Some(thread) = self.loaded()?.conversations.get_mut(client_id) {
            thread.push(sent.clone());
        }
        Ok(sent)
    }

    /// Send the same message to every client at once.
    ///
    /// Recipients are independent: a failed post is reported in the result
    /// and the successful ones stand.
    pub async fn broadcast(&mut self, form: &MessageForm) -> DashboardResult<BroadcastReport> {
        let result = self.try_broadcast(form).await;
        settle(&mut self.state, &mut self.notices, result, |report| {
            format!(
                "Message sent to {} of {} clients",
                report.sent.len(),
                report.sent.len() + report.failed.len()
            )
        })
    }

    async fn try_broadcast(&mut self, form: &MessageForm) -> DashboardResult<BroadcastReport> {
        let content = form.validate()?;
        let data = self.loaded()?;
        let bodies: Vec<NewMessage> = data
            .clients
            .iter()
            .map(|c| NewMessage {
                sender_id: data.profile.id.clone(),
                receiver_id: c.id.clone(),
                content: content.clone(),
            })
            .collect();

        let client = &self.api;
        let outcomes = join_all(bodies.iter().map(|body| async move {
            (body, api::messages::send_from_nutritionist(client, body).await)
        }))
        .await;

        let mut report = BroadcastReport::default();
        let mut expired = false;
        for (body, outcome) in outcomes {
            match outcome {
                Ok(message) => report.sent.push(message),
                Err(e) => {
                    expired |= e.is_session_expired();
                    tracing::warn!(client = %body.receiver_id, error = %e, "Broadcast delivery failed");
                    report.failed.push((body.receiver_id.clone(), e.to_string()));
                }
            }
        }
        if expired {
            return Err(DashboardError::SessionExpired);
        }

        let data = self.loaded()?;
        for message in &report.sent {
            if let Some(thread) = data.conversations.get_mut(&message.receiver_id) {
                thread.push(message.clone());
            }
        }
        Ok(report)
    }

    // ---- appointments ----

    pub async fn schedule(&mut self, form: &AppointmentForm) -> DashboardResult<Appointment> {
        let result = self.try_schedule(form).await;
        settle(&mut self.state, &mut self.notices, result, |a| {
            format!("Appointment scheduled for {}", a.date_time.format("%Y-%m-%d %H:%M"))
        })
    }

    async fn try_schedule(&mut self, form: &AppointmentForm) -> DashboardResult<Appointment> {
        let mut body = form.validate()?;
        body.nutritionist_id = Some(self.own_client(&body.client_id)?);
        let created = api::appointments::add(&self.api, &body).await?;
        self.loaded()?.appointments.insert(created.clone());
        Ok(created)
    }

    pub async fn set_appointment_status(
        &mut self,
        id: &str,
        status: AppointmentStatus,
    ) -> DashboardResult<Appointment> {
        let result = self.try_update_appointment(id, status).await;
        settle(&mut self.state, &mut self.notices, result, |a| {
            format!("Appointment marked {}", a.status)
        })
    }

    pub async fn cancel_appointment(&mut self, id: &str) -> DashboardResult<Appointment> {
        self.set_appointment_status(id, AppointmentStatus::Cancelled).await
    }

    async fn try_update_appointment(
        &mut self,
        id: &str,
        status: AppointmentStatus,
    ) -> DashboardResult<Appointment> {
        if !self.loaded()?.appointments.contains(id) {
            return Err(DashboardError::UnknownRecord(id.to_string()));
        }
        let update = AppointmentUpdate {
            status: Some(status),
            ..Default::default()
        };
        let updated = api::appointments::update(&self.api, id, &update).await?;
        self.loaded()?.appointments.insert(updated.clone());
        Ok(updated)
    }

    pub async fn delete_appointment(&mut self, id: &str) -> DashboardResult<Appointment> {
        let result = self.try_delete_appointment(id).await;
        settle(&mut self.state, &mut self.notices, result, |_| {
            "Appointment deleted".to_string()
        })
    }

    async fn try_delete_appointment(&mut self, id: &str) -> DashboardResult<Appointment> {
        if !self.loaded()?.appointments.contains(id) {
            return Err(DashboardError::UnknownRecord(id.to_string()));
        }
        api::appointments::delete(&self.api, id).await?;
        self.loaded()?
            .appointments
            .remove(id)
            .ok_or_else(|| DashboardError::UnknownRecord(id.to_string()))
    }

    // ---- client tracking ----

    pub async fn set_goal(&mut self, form: &GoalForm) -> DashboardResult<Goal> {
        let result = self.try_set_goal(form).await;
        settle(&mut self.state, &mut self.notices, result, |g| {
            format!("Goal \"{}\" set", g.title)
        })
    }

    async fn try_set_goal(&mut self, form: &GoalForm) -> DashboardResult<Goal> {
        let body = form.validate()?;
        self.own_client(&body.client_id)?;
        let goal = api::goals::create(&self.api, &body).await?;
        self.patch_client_goals(&goal);
        Ok(goal)
    }

    /// Mirror a new goal into the client's summary list
    fn patch_client_goals(&mut self, goal: &Goal) {
        if let Some(data) = self.state.ready_mut() {
            if let Some(client) = data.clients.get(&goal.client_id) {
                let mut client = client.clone();
                client.goals.push(goal.title.clone());
                data.clients.replace(client);
            }
        }
    }

    pub async fn record_progress(&mut self, form: &ProgressForm) -> DashboardResult<ProgressEntry> {
        let result = self.try_record_progress(form).await;
        settle(&mut self.state, &mut self.notices, result, |p| {
            format!("Progress recorded for {}", p.date)
        })
    }

    async fn try_record_progress(&mut self, form: &ProgressForm) -> DashboardResult<ProgressEntry> {
        let body = form.validate()?;
        self.own_client(&body.client_id)?;
        Ok(api::progress::record(&self.api, &body).await?)
    }

    pub async fn add_meal(&mut self, form: &MealPlanForm) -> DashboardResult<MealPlanEntry> {
        let result = self.try_add_meal(form).await;
        settle(&mut self.state, &mut self.notices, result, |m| {
            format!("Added {} for {}", m.meal, m.day)
        })
    }

    async fn try_add_meal(&mut self, form: &MealPlanForm) -> DashboardResult<MealPlanEntry> {
        let body = form.validate()?;
        self.own_client(&body.client_id)?;
        Ok(api::meal_plans::create(&self.api, &body).await?)
    }

    /// Progress history of one client, oldest first
    pub async fn client_progress(&mut self, client_id: &str) -> DashboardResult<Vec<ProgressEntry>> {
        let result = self.try_client_progress(client_id).await;
        settle_read(&mut self.state, &mut self.notices, result)
    }

    async fn try_client_progress(&mut self, client_id: &str) -> DashboardResult<Vec<ProgressEntry>> {
        self.own_client(client_id)?;
        let mut entries = api::progress::list(&self.api, client_id).await?;
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    pub async fn client_goals(&mut self, client_id: &str) -> DashboardResult<Vec<Goal>> {
        let result = self.try_client_goals(client_id).await;
        settle_read(&mut self.state, &mut self.notices, result)
    }

    async fn try_client_goals(&mut self, client_id: &str) -> DashboardResult<Vec<Goal>> {
        self.own_client(client_id)?;
        Ok(api::goals::list(&self.api, client_id).await?)
    }
}

#[async_trait]
impl Dashboard for NutritionistDashboard {
    fn role(&self) -> Role {
        Role::Nutritionist
    }

    async fn load(&mut self) -> DashboardResult<()> {
        self.state = LoadState::Loading;

        let result = async {
            let session = self
                .api
                .current_session()?
                .ok_or(DashboardError::SessionExpired)?;
            let profile = api::nutritionists::by_email(&self.api, &session.user.email).await?;
            let (clients, appointments) = tokio::try_join!(
                api::clients::by_nutritionist(&self.api, &profile.id),
                api::appointments::for_nutritionist(&self.api, &profile.id),
            )?;
            Ok::<_, DashboardError>(NutritionistData {
                profile,
                clients: Collection::new(clients),
                appointments: Collection::new(appointments),
                conversations: HashMap::new(),
            })
        }
        .await;

        match result {
            Ok(data) => {
                tracing::debug!(
                    nutritionist = %data.profile.id,
                    clients = data.clients.len(),
                    appointments = data.appointments.len(),
                    "Nutritionist dashboard loaded"
                );
                self.state = LoadState::Ready(data);
                Ok(())
            }
            Err(err) => {
                self.state = LoadState::Failed(err.to_string());
                self.notices.error(err.to_string());
                Err(err)
            }
        }
    }

    fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{session_store, MockBackend};
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        routing::{get, post, put},
        Json, Router,
    };
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
    }

    fn backend_routes() -> Router {
        Router::new()
            .route(
                "/nuts/email",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    match q.get("email").map(String::as_str) {
                        Some("ana@nutri.io") => Ok(Json(json!({"_id": "n1", "name": "Ana", "email": "ana@nutri.io"}))),
                        _ => Err(StatusCode::NOT_FOUND),
                    }
                }),
            )
            .route(
                "/client/byNutId/:id",
                get(|| async {
                    Json(json!([
                        {"_id": "c1", "name": "Bo", "email": "bo@x.io", "nutritionistId": "n1"},
                        {"_id": "c2", "name": "Cy", "email": "cy@x.io", "nutritionistId": "n1"}
                    ]))
                }),
            )
            .route(
                "/appointments/nutritionist/:id",
                get(|| async {
                    Json(json!([
                        {"_id": "a1", "clientId": "c1", "dateTime": "2026-10-05T09:00:00Z", "type": "Intake"},
                        {"_id": "a2", "clientId": "c2", "dateTime": "2026-09-01T09:00:00Z", "type": "Review", "status": "completed"},
                        {"_id": "a3", "clientId": "c2", "dateTime": "2026-10-02T09:00:00Z", "type": "Review"}
                    ]))
                }),
            )
            .route(
                "/appointments/add",
                post(|Json(body): Json<Value>| async move {
                    let mut created = body;
                    created["_id"] = json!("a9");
                    (StatusCode::CREATED, Json(created))
                }),
            )
            .route(
                "/appointments/:id",
                put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    Json(json!({
                        "_id": id, "clientId": "c1", "dateTime": "2026-10-05T09:00:00Z",
                        "type": "Intake", "status": body["status"]
                    }))
                })
                .delete(|| async { StatusCode::NO_CONTENT }),
            )
            .route(
                "/nuts/sendMessage",
                post(|Json(body): Json<Value>| async move {
                    if body["receiverId"] == "c2" {
                        return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "mailbox full"}))));
                    }
                    let mut sent = body;
                    sent["_id"] = json!(format!("m-{}", sent["receiverId"].as_str().unwrap_or_default()));
                    sent["timestamp"] = json!("2026-10-01T12:30:00Z");
                    Ok(Json(sent))
                }),
            )
            .route(
                "/nuts/messages/:nut/:client",
                get(|| async {
                    Json(json!([
                        {"_id": "m1", "senderId": "n1", "receiverId": "c1", "content": "Welcome", "timestamp": "2026-10-01T08:00:00Z"}
                    ]))
                }),
            )
            .route(
                "/client/messages/:client/:nut",
                get(|| async {
                    Json(json!([
                        {"_id": "m2", "senderId": "c1", "receiverId": "n1", "content": "Thanks", "timestamp": "2026-10-01T07:00:00Z"}
                    ]))
                }),
            )
            .route(
                "/client/goal",
                post(|Json(body): Json<Value>| async move {
                    let mut goal = body;
                    goal["_id"] = json!("g1");
                    Json(goal)
                }),
            )
    }

    async fn loaded(backend: &MockBackend) -> NutritionistDashboard {
        let mut dashboard =
            NutritionistDashboard::new(backend.client(session_store("ana@nutri.io", Role::Nutritionist)));
        dashboard.load().await.unwrap();
        dashboard
    }

    #[tokio::test]
    async fn test_load_scopes_by_profile() {
        let backend = MockBackend::start(backend_routes()).await;
        let dashboard = loaded(&backend).await;

        assert_eq!(dashboard.profile().unwrap().id, "n1");
        assert_eq!(backend.count("GET /client/byNutId/n1"), 1);
        assert_eq!(backend.count("GET /appointments/nutritionist/n1"), 1);

        let upcoming: Vec<&str> = dashboard
            .upcoming_appointments(now())
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(upcoming, vec!["a3", "a1"]);

        let stats = dashboard.stats(now());
        assert_eq!(stats.clients, 2);
        assert_eq!(stats.upcoming_appointments, 2);
        assert_eq!(stats.completed_appointments, 1);
    }

    #[tokio::test]
    async fn test_unknown_profile_fails_load() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard =
            NutritionistDashboard::new(backend.client(session_store("ghost@nutri.io", Role::Nutritionist)));

        assert!(matches!(
            dashboard.load().await,
            Err(DashboardError::Api(crate::http::ApiError::NotFound(_)))
        ));
        assert!(dashboard.state().error().is_some());
        assert_eq!(backend.count("GET /client/byNutId"), 0);
    }

    #[tokio::test]
    async fn test_schedule_and_update_patch_locally() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded(&backend).await;

        let form = AppointmentForm {
            client_id: "c1".into(),
            date_time: "2026-10-09 10:00".into(),
            kind: "Follow-up".into(),
            notes: String::new(),
        };
        let created = dashboard.schedule(&form).await.unwrap();
        assert_eq!(created.nutritionist_id.as_deref(), Some("n1"));
        assert_eq!(dashboard.data().unwrap().appointments.len(), 4);

        dashboard
            .set_appointment_status("a1", AppointmentStatus::Completed)
            .await
            .unwrap();
        let data = dashboard.data().unwrap();
        assert_eq!(data.appointments.get("a1").unwrap().status, AppointmentStatus::Completed);
        assert_eq!(data.appointments.len(), 4);

        dashboard.delete_appointment("a3").await.unwrap();
        assert!(!dashboard.data().unwrap().appointments.contains("a3"));
        assert_eq!(backend.count("GET /appointments"), 1);
    }

    #[tokio::test]
    async fn test_schedule_for_foreign_client_is_rejected() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded(&backend).await;

        let form = AppointmentForm {
            client_id: "c77".into(),
            date_time: "2026-10-09 10:00".into(),
            kind: "Follow-up".into(),
            notes: String::new(),
        };
        assert!(matches!(
            dashboard.schedule(&form).await,
            Err(DashboardError::UnknownRecord(_))
        ));
        assert_eq!(backend.count("POST /appointments"), 0);
    }

    #[tokio::test]
    async fn test_conversation_then_send() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded(&backend).await;

        let ids: Vec<String> = dashboard
            .conversation("c1")
            .await
            .unwrap()
            .iter()
            .map(|m| m.id.clone())
            .collect();
        assert_eq!(ids, vec!["m2", "m1"]);

        let sent = dashboard.send_message("c1", &MessageForm::new("See you")).await.unwrap();
        assert_eq!(sent.sender_id, "n1");
        let thread = &dashboard.data().unwrap().conversations["c1"];
        assert_eq!(thread.len(), 3);
        assert_eq!(thread[2].content, "See you");
        assert_eq!(backend.count("GET /nuts/messages"), 1);
    }

    #[tokio::test]
    async fn test_blank_message_is_not_sent() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded(&backend).await;

        assert!(matches!(
            dashboard.send_message("c1", &MessageForm::new("  ")).await,
            Err(DashboardError::Validation(_))
        ));
        assert!(matches!(
            dashboard.broadcast(&MessageForm::new("")).await,
            Err(DashboardError::Validation(_))
        ));
        assert_eq!(backend.count("POST /nuts/sendMessage"), 0);
    }

    #[tokio::test]
    async fn test_broadcast_reports_partial_failure() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded(&backend).await;

        let report = dashboard.broadcast(&MessageForm::new("Clinic closed Friday")).await.unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.sent.len(), 1);
        assert_eq!(report.sent[0].receiver_id, "c1");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "c2");
        assert!(report.failed[0].1.contains("mailbox full"));
        assert_eq!(backend.count("POST /nuts/sendMessage"), 2);
        assert_eq!(
            dashboard.notices_mut().drain().pop().unwrap().message,
            "Message sent to 1 of 2 clients"
        );
    }

    #[tokio::test]
    async fn test_set_goal_updates_client_summary() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded(&backend).await;

        let goal = dashboard
            .set_goal(&GoalForm {
                client_id: "c2".into(),
                title: "Drink 2L water".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(goal.id, "g1");
        assert_eq!(
            dashboard.data().unwrap().clients.get("c2").unwrap().goals,
            vec!["Drink 2L water"]
        );
    }

    #[tokio::test]
    async fn test_expired_session_while_reading_progress_fails_dashboard() {
        let routes = backend_routes()
            .route("/client/progress/:id", get(|| async { StatusCode::UNAUTHORIZED }))
            .route("/client/goal/:id", get(|| async { StatusCode::FORBIDDEN }));
        let backend = MockBackend::start(routes).await;

        let mut dashboard = loaded(&backend).await;
        let err = dashboard.client_progress("c1").await.unwrap_err();
        assert!(matches!(err, DashboardError::SessionExpired));
        assert!(dashboard.state().error().is_some());
        assert!(!dashboard.is_ready());
        assert_eq!(
            dashboard.notices_mut().drain().pop().unwrap().message,
            "Session expired, please log in again"
        );

        let mut dashboard = loaded(&backend).await;
        assert!(matches!(
            dashboard.client_goals("c2").await,
            Err(DashboardError::SessionExpired)
        ));
        assert!(dashboard.state().error().is_some());
        assert_eq!(backend.count("GET /client/progress/c1"), 1);
    }

    #[tokio::test]
    async fn test_reading_foreign_client_progress_makes_no_call() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded(&backend).await;

        let err = dashboard.client_progress("c9").await.unwrap_err();
        assert!(matches!(err, DashboardError::UnknownRecord(_)));
        assert!(dashboard.is_ready());
        assert_eq!(backend.count("GET /client/progress/c9"), 0);
    }
}
