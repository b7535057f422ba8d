//! Client dashboard: own goals, progress, meal plan, appointments and the
//! conversation with the assigned nutritionist

use super::{settle, settle_read, Collection, Dashboard, DashboardError, DashboardResult, LoadState, Notices};
use crate::api;
use crate::forms::{AppointmentForm, FormInput, GoalForm, MessageForm, ProgressForm};
use crate::http::ApiClient;
use crate::models::{
    Appointment, AppointmentStatus, AppointmentUpdate, Client, Goal, GoalStatus, GoalUpdate,
    MealPlanEntry, Message, NewMessage, ProgressEntry, Role,
};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ClientData {
    pub profile: Client,
    pub goals: Collection<Goal>,
    /// Oldest first
    pub progress: Collection<ProgressEntry>,
    pub meal_plan: Collection<MealPlanEntry>,
    pub appointments: Collection<Appointment>,
    /// Filled the first time the conversation is opened
    pub conversation: Option<Vec<Message>>,
}

impl ClientData {
    fn nutritionist_id(&self) -> DashboardResult<String> {
        self.profile
            .nutritionist_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or(DashboardError::NoNutritionist)
    }
}

pub struct ClientDashboard {
    api: Arc<ApiClient>,
    state: LoadState<ClientData>,
    notices: Notices,
}

impl ClientDashboard {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: LoadState::Idle,
            notices: Notices::default(),
        }
    }

    pub fn state(&self) -> &LoadState<ClientData> {
        &self.state
    }

    pub fn data(&self) -> Option<&ClientData> {
        self.state.ready()
    }

    pub fn profile(&self) -> Option<&Client> {
        self.state.ready().map(|d| &d.profile)
    }

    /// Progress entries, oldest first
    pub fn progress_history(&self) -> &[ProgressEntry] {
        self.state
            .ready()
            .map(|d| d.progress.as_slice())
            .unwrap_or_default()
    }

    pub fn latest_progress(&self) -> Option<&ProgressEntry> {
        self.progress_history().last()
    }

    /// Meal plan entries for one day, in meal order
    pub fn meal_plan_for(&self, day: &str) -> Vec<&MealPlanEntry> {
        let Some(data) = self.state.ready() else {
            return Vec::new();
        };
        let mut meals: Vec<&MealPlanEntry> = data
            .meal_plan
            .iter()
            .filter(|m| m.day.eq_ignore_ascii_case(day.trim()))
            .collect();
        meals.sort_by_key(|m| m.meal as u8);
        meals
    }

    fn loaded(&mut self) -> DashboardResult<&mut ClientData> {
        self.state.ready_mut().ok_or(DashboardError::NotLoaded)
    }

    fn own_id(&mut self) -> DashboardResult<String> {
        Ok(self.loaded()?.profile.id.clone())
    }

    // ---- messaging ----

    /// Both sides of the conversation with the assigned nutritionist
    pub async fn conversation(&mut self) -> DashboardResult<&[Message]> {
        let result = self.try_conversation().await;
        settle_read(&mut self.state, &mut self.notices, result)?;
        Ok(self.loaded()?.conversation.as_deref().unwrap_or_default())
    }

    async fn try_conversation(&mut self) -> DashboardResult<()> {
        let data = self.loaded()?;
        let nutritionist_id = data.nutritionist_id()?;
        let client_id = data.profile.id.clone();
        let messages = api::messages::conversation(&self.api, &nutritionist_id, &client_id).await?;
        self.loaded()?.conversation = Some(messages);
        Ok(())
    }

    pub async fn send_message(&mut self, form: &MessageForm) -> DashboardResult<Message> {
        let result = self.try_send_message(form).await;
        settle(&mut self.state, &mut self.notices, result, |_| "Message sent".to_string())
    }

    async fn try_send_message(&mut self, form: &MessageForm) -> DashboardResult<Message> {
        let content = form.validate()?;
        let data = self.loaded()?;
        let body = NewMessage {
            sender_id: data.profile.id.clone(),
            receiver_id: data.nutritionist_id()?,
            content,
        };
        let sent = api::messages::send_from_client(&self.api, &body).await?;
        if let Some(thread) = self.loaded()?.conversation.as_mut() {
            thread.push(sent.clone());
        }
        Ok(sent)
    }

    // ---- goals ----

    /// Add a goal for this client; the form's client field is ignored
    pub async fn add_goal(&mut self, form: &GoalForm) -> DashboardResult<Goal> {
        let result = self.try_add_goal(form).await;
        settle(&mut self.state, &mut self.notices, result, |g| {
            format!("Goal \"{}\" added", g.title)
        })
    }

    async fn try_add_goal(&mut self, form: &GoalForm) -> DashboardResult<Goal> {
        let form = GoalForm {
            client_id: self.own_id()?,
            ..form.clone()
        };
        let body = form.validate()?;
        let goal = api::goals::create(&self.api, &body).await?;
        self.loaded()?.goals.insert(goal.clone());
        Ok(goal)
    }

    pub async fn update_goal(&mut self, id: &str, update: &GoalUpdate) -> DashboardResult<Goal> {
        let result = self.try_update_goal(id, update).await;
        settle(&mut self.state, &mut self.notices, result, |g| {
            format!("Goal \"{}\" updated", g.title)
        })
    }

    pub async fn complete_goal(&mut self, id: &str) -> DashboardResult<Goal> {
        let update = GoalUpdate {
            status: Some(GoalStatus::Achieved),
            ..Default::default()
        };
        self.update_goal(id, &update).await
    }

    async fn try_update_goal(&mut self, id: &str, update: &GoalUpdate) -> DashboardResult<Goal> {
        if !self.loaded()?.goals.contains(id) {
            return Err(DashboardError::UnknownRecord(id.to_string()));
        }
        let goal = api::goals::update(&self.api, id, update).await?;
        self.loaded()?.goals.insert(goal.clone());
        Ok(goal)
    }

    pub async fn delete_goal(&mut self, id: &str) -> DashboardResult<Goal> {
        let result = self.try_delete_goal(id).await;
        settle(&mut self.state, &mut self.notices, result, |g| {
            format!("Goal \"{}\" removed", g.title)
        })
    }

    async fn try_delete_goal(&mut self, id: &str) -> DashboardResult<Goal> {
        if !self.loaded()?.goals.contains(id) {
            return Err(DashboardError::UnknownRecord(id.to_string()));
        }
        api::goals::delete(&self.api, id).await?;
        self.loaded()?
            .goals
            .remove(id)
            .ok_or_else(|| DashboardError::UnknownRecord(id.to_string()))
    }

    // ---- progress ----

    pub async fn record_progress(&mut self, form: &ProgressForm) -> DashboardResult<ProgressEntry> {
        let result = self.try_record_progress(form).await;
        settle(&mut self.state, &mut self.notices, result, |p| {
            format!("Progress recorded for {}", p.date)
        })
    }

    async fn try_record_progress(&mut self, form: &ProgressForm) -> DashboardResult<ProgressEntry> {
        let form = ProgressForm {
            client_id: self.own_id()?,
            ..form.clone()
        };
        let body = form.validate()?;
        let entry = api::progress::record(&self.api, &body).await?;

        let data = self.loaded()?;
        let mut entries = data.progress.as_slice().to_vec();
        if !entry.id.is_empty() {
            entries.retain(|e| e.id != entry.id);
        }
        entries.push(entry.clone());
        entries.sort_by_key(|e| e.date);
        data.progress = Collection::new(entries);
        Ok(entry)
    }

    // ---- appointments ----

    /// Ask the assigned nutritionist for an appointment
    pub async fn request_appointment(&mut self, form: &AppointmentForm) -> DashboardResult<Appointment> {
        let result = self.try_request_appointment(form).await;
        settle(&mut self.state, &mut self.notices, result, |a| {
            format!("Appointment requested for {}", a.date_time.format("%Y-%m-%d %H:%M"))
        })
    }

    async fn try_request_appointment(&mut self, form: &AppointmentForm) -> DashboardResult<Appointment> {
        let form = AppointmentForm {
            client_id: self.own_id()?,
            ..form.clone()
        };
        let mut body = form.validate()?;
        body.nutritionist_id = Some(self.loaded()?.nutritionist_id()?);
        let created = api::appointments::add(&self.api, &body).await?;
        self.loaded()?.appointments.insert(created.clone());
        Ok(created)
    }

    pub async fn cancel_appointment(&mut self, id: &str) -> DashboardResult<Appointment> {
        let result = self.try_cancel_appointment(id).await;
        settle(&mut self.state, &mut self.notices, result, |_| {
            "Appointment cancelled".to_string()
        })
    }

    async fn try_cancel_appointment(&mut self, id: &str) -> DashboardResult<Appointment> {
        if !self.loaded()?.appointments.contains(id) {
            return Err(DashboardError::UnknownRecord(id.to_string()));
        }
        let update = AppointmentUpdate {
            status: Some(AppointmentStatus::Cancelled),
            ..Default::default()
        };
        let updated = api::appointments::update(&self.api, id, &update).await?;
        self.loaded()?.appointments.insert(updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl Dashboard for ClientDashboard {
    fn role(&self) -> Role {
        Role::Client
    }

    async fn load(&mut self) -> DashboardResult<()> {
        self.state = LoadState::Loading;

        let result = async {
            let session = self
                .api
                .current_session()?
                .ok_or(DashboardError::SessionExpired)?;
            let profile = api::clients::by_email(&self.api, &session.user.email).await?;
            let (goals, mut progress, meal_plan, appointments) = tokio::try_join!(
                api::goals::list(&self.api, &profile.id),
                api::progress::list(&self.api, &profile.id),
                api::meal_plans::list(&self.api, &profile.id),
                api::appointments::for_client(&self.api, &profile.id),
            )?;
            progress.sort_by_key(|e| e.date);
            Ok::<_, DashboardError>(ClientData {
                profile,
                goals: Collection::new(goals),
                progress: Collection::new(progress),
                meal_plan: Collection::new(meal_plan),
                appointments: Collection::new(appointments),
                conversation: None,
            })
        }
        .await;

        match result {
            Ok(data) => {
                tracing::debug!(
                    client = %data.profile.id,
                    goals = data.goals.len(),
                    appointments = data.appointments.len(),
                    "Client dashboard loaded"
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
