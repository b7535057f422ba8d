//! Admin dashboard: every nutritionist and client on the marketplace

use super::{settle, Collection, Dashboard, DashboardError, DashboardResult, LoadState, Notices};
use crate::api;
use crate::forms::{ClientForm, FormInput, NutritionistForm};
use crate::http::ApiClient;
use crate::models::{AccountStatus, Client, Nutritionist, Role};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything the admin screen shows
#[derive(Debug, Clone, Default)]
pub struct AdminData {
    pub nutritionists: Collection<Nutritionist>,
    pub clients: Collection<Client>,
}

/// A client joined with the name of its nutritionist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub plan: String,
    pub status: AccountStatus,
    pub nutritionist: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub nutritionists: usize,
    pub active_nutritionists: usize,
    pub clients: usize,
    pub active_clients: usize,
    pub unassigned_clients: usize,
}

pub struct AdminDashboard {
    api: Arc<ApiClient>,
    state: LoadState<AdminData>,
    notices: Notices,
}

impl AdminDashboard {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: LoadState::Idle,
            notices: Notices::default(),
        }
    }

    pub fn state(&self) -> &LoadState<AdminData> {
        &self.state
    }

    pub fn data(&self) -> Option<&AdminData> {
        self.state.ready()
    }

    /// Clients with nutritionist names resolved from the nutritionist list
    pub fn client_rows(&self) -> Vec<ClientRow> {
        let Some(data) = self.state.ready() else {
            return Vec::new();
        };

        let names: HashMap<&str, &str> = data
            .nutritionists
            .iter()
            .map(|n| (n.id.as_str(), n.name.as_str()))
            .collect();

        data.clients
            .iter()
            .map(|c| ClientRow {
                id: c.id.clone(),
                name: c.name.clone(),
                email: c.email.clone(),
                plan: c.plan.clone().unwrap_or_default(),
                status: c.status,
                nutritionist: match c.nutritionist_id.as_deref() {
                    None | Some("") => "Unassigned".to_string(),
                    Some(id) => names.get(id).copied().unwrap_or("Unknown").to_string(),
                },
            })
            .collect()
    }

    pub fn stats(&self) -> AdminStats {
        let Some(data) = self.state.ready() else {
            return AdminStats::default();
        };

        AdminStats {
            nutritionists: data.nutritionists.len(),
            active_nutritionists: data
                .nutritionists
                .iter()
                .filter(|n| n.status == AccountStatus::Active)
                .count(),
            clients: data.clients.len(),
            active_clients: data
                .clients
                .iter()
                .filter(|c| c.status == AccountStatus::Active)
                .count(),
            unassigned_clients: data
                .clients
                .iter()
                .filter(|c| c.nutritionist_id.as_deref().map_or(true, str::is_empty))
                .count(),
        }
    }

    fn loaded(&mut self) -> DashboardResult<&mut AdminData> {
        self.state.ready_mut().ok_or(DashboardError::NotLoaded)
    }

    // ---- nutritionists ----

    pub async fn add_nutritionist(&mut self, form: &NutritionistForm) -> DashboardResult<Nutritionist> {
        let result = self.try_add_nutritionist(form).await;
        settle(&mut self.state, &mut self.notices, result, |n| {
            format!("Nutritionist {} added", n.name)
        })
    }

    async fn try_add_nutritionist(&mut self, form: &NutritionistForm) -> DashboardResult<Nutritionist> {
        let body = form.validate()?;
        self.loaded()?;
        let created = api::nutritionists::create(&self.api, &body).await?;
        self.loaded()?.nutritionists.insert(created.clone());
        Ok(created)
    }

    pub async fn update_nutritionist(
        &mut self,
        id: &str,
        form: &NutritionistForm,
    ) -> DashboardResult<Nutritionist> {
        let result = self.try_update_nutritionist(id, form).await;
        settle(&mut self.state, &mut self.notices, result, |n| {
            format!("Nutritionist {} updated", n.name)
        })
    }

    async fn try_update_nutritionist(
        &mut self,
        id: &str,
        form: &NutritionistForm,
    ) -> DashboardResult<Nutritionist> {
        let body = form.validate()?;
        if !self.loaded()?.nutritionists.contains(id) {
            return Err(DashboardError::UnknownRecord(id.to_string()));
        }
        let updated = api::nutritionists::update(&self.api, id, &body).await?;
        self.loaded()?.nutritionists.insert(updated.clone());
        Ok(updated)
    }

    pub async fn delete_nutritionist(&mut self, id: &str) -> DashboardResult<Nutritionist> {
        let result = self.try_delete_nutritionist(id).await;
        settle(&mut self.state, &mut self.notices, result, |n| {
            format!("Nutritionist {} removed", n.name)
        })
    }

    async fn try_delete_nutritionist(&mut self, id: &str) -> DashboardResult<Nutritionist> {
        if !self.loaded()?.nutritionists.contains(id) {
            return Err(DashboardError::UnknownRecord(id.to_string()));
        }
        api::nutritionists::delete(&self.api, id).await?;
        self.loaded()?
            .nutritionists
            .remove(id)
            .ok_or_else(|| DashboardError::UnknownRecord(id.to_string()))
    }

    // ---- clients ----

    pub async fn add_client(&mut self, form: &ClientForm) -> DashboardResult<Client> {
        let result = self.try_add_client(form).await;
        settle(&mut self.state, &mut self.notices, result, |c| {
            format!("Client {} added", c.name)
        })
    }

    async fn try_add_client(&mut self, form: &ClientForm) -> DashboardResult<Client> {
        let body = form.validate()?;
        self.loaded()?;
        let created = api::clients::create(&self.api, &body).await?;
        self.loaded()?.clients.insert(created.clone());
        Ok(created)
    }

    pub async fn update_client(&mut self, id: &str, form: &ClientForm) -> DashboardResult<Client> {
        let result = self.try_update_client(id, form).await;
        settle(&mut self.state, &mut self.notices, result, |c| {
            format!("Client {} updated", c.name)
        })
    }

    async fn try_update_client(&mut self, id: &str, form: &ClientForm) -> DashboardResult<Client> {
        let body = form.validate()?;
        if !self.loaded()?.clients.contains(id) {
            return Err(DashboardError::UnknownRecord(id.to_string()));
        }
        let updated = api::clients::update(&self.api, id, &body).await?;
        self.loaded()?.clients.insert(updated.clone());
        Ok(updated)
    }

    pub async fn delete_client(&mut self, id: &str) -> DashboardResult<Client> {
        let result = self.try_delete_client(id).await;
        settle(&mut self.state, &mut self.notices, result, |c| {
            format!("Client {} removed", c.name)
        })
    }

    async fn try_delete_client(&mut self, id: &str) -> DashboardResult<Client> {
        if !self.loaded()?.clients.contains(id) {
            return Err(DashboardError::UnknownRecord(id.to_string()));
        }
        api::clients::delete(&self.api, id).await?;
        self.loaded()?
            .clients
            .remove(id)
            .ok_or_else(|| DashboardError::UnknownRecord(id.to_string()))
    }
}

#[async_trait]
impl Dashboard for AdminDashboard {
    fn role(&self) -> Role {
        Role::Admin
    }

    async fn load(&mut self) -> DashboardResult<()> {
        self.state = LoadState::Loading;

        let fetched = tokio::try_join!(
            api::nutritionists::list(&self.api),
            api::clients::list(&self.api),
        );

        match fetched {
            Ok((nutritionists, clients)) => {
                tracing::debug!(
                    nutritionists = nutritionists.len(),
                    clients = clients.len(),
                    "Admin dashboard loaded"
                );
                self.state = LoadState::Ready(AdminData {
                    nutritionists: Collection::new(nutritionists),
                    clients: Collection::new(clients),
                });
                Ok(())
            }
            Err(e) => {
                let err = DashboardError::from(e);
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
    use crate::testing::{offline_client, session_store, MockBackend};
    use axum::{
        extract::Path,
        http::StatusCode,
        routing::{get, put},
        Json, Router,
    };
    use serde_json::{json, Value};

    fn backend_routes() -> Router {
        Router::new()
            .route(
                "/nutritionists",
                get(|| async {
                    Json(json!([
                        {"_id": "n1", "name": "Ana Costa", "email": "ana@nutri.io", "status": "active", "clientCount": 1},
                        {"_id": "n2", "name": "Ben Ito", "email": "ben@nutri.io", "status": "inactive"}
                    ]))
                })
                .post(|Json(body): Json<Value>| async move {
                    let mut created = body;
                    created["_id"] = json!("n3");
                    (StatusCode::CREATED, Json(created))
                }),
            )
            .route(
                "/nutritionists/:id",
                put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    let mut updated = body;
                    updated["_id"] = json!(id);
                    Json(updated)
                })
                .delete(|| async { StatusCode::NO_CONTENT }),
            )
            .route(
                "/clients",
                get(|| async {
                    Json(json!([
                        {"_id": "c1", "name": "Bo", "email": "bo@x.io", "nutritionistId": "n1", "plan": "Premium"},
                        {"_id": "c2", "name": "Cy", "email": "cy@x.io"},
                        {"_id": "c3", "name": "Di", "email": "di@x.io", "nutritionistId": "gone", "status": "inactive"}
                    ]))
                }),
            )
            .route("/clients/:id", axum::routing::delete(|| async { StatusCode::OK }))
    }

    async fn loaded_dashboard(backend: &MockBackend) -> AdminDashboard {
        let mut dashboard = AdminDashboard::new(backend.client(session_store("root@nutri.io", Role::Admin)));
        dashboard.load().await.unwrap();
        dashboard
    }

    fn nutritionist_form() -> NutritionistForm {
        NutritionistForm {
            name: "Cleo Park".into(),
            email: "cleo@nutri.io".into(),
            phone: "555-0199".into(),
            address: "12 Elm St".into(),
            specialization: "Diabetes".into(),
            status: "active".into(),
            password: "temp-pass".into(),
        }
    }

    #[tokio::test]
    async fn test_load_and_enrich() {
        let backend = MockBackend::start(backend_routes()).await;
        let dashboard = loaded_dashboard(&backend).await;

        assert!(dashboard.is_ready());
        let rows = dashboard.client_rows();
        assert_eq!(rows[0].nutritionist, "Ana Costa");
        assert_eq!(rows[0].plan, "Premium");
        assert_eq!(rows[1].nutritionist, "Unassigned");
        assert_eq!(rows[2].nutritionist, "Unknown");

        let stats = dashboard.stats();
        assert_eq!(stats.nutritionists, 2);
        assert_eq!(stats.active_nutritionists, 1);
        assert_eq!(stats.clients, 3);
        assert_eq!(stats.active_clients, 2);
        assert_eq!(stats.unassigned_clients, 1);
    }

    #[tokio::test]
    async fn test_add_appears_without_refetch() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded_dashboard(&backend).await;

        let created = dashboard.add_nutritionist(&nutritionist_form()).await.unwrap();
        assert_eq!(created.id, "n3");

        let data = dashboard.data().unwrap();
        assert_eq!(data.nutritionists.len(), 3);
        assert_eq!(data.nutritionists.get("n3").unwrap().name, "Cleo Park");
        assert_eq!(backend.count("GET /nutritionists"), 1);
        assert_eq!(backend.count("POST /nutritionists"), 1);

        let notice = dashboard.notices_mut().drain().pop().unwrap();
        assert_eq!(notice.message, "Nutritionist Cleo Park added");
    }

    #[tokio::test]
    async fn test_update_patches_in_place() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded_dashboard(&backend).await;

        let mut form = NutritionistForm::from(dashboard.data().unwrap().nutritionists.get("n2").unwrap());
        form.phone = "555-0102".into();
        form.specialization = "Vegan diets".into();
        form.status = "active".into();
        dashboard.update_nutritionist("n2", &form).await.unwrap();

        let data = dashboard.data().unwrap();
        assert_eq!(data.nutritionists.len(), 2);
        assert_eq!(data.nutritionists.get("n2").unwrap().status, AccountStatus::Active);
        assert_eq!(backend.count("PUT /nutritionists/n2"), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_without_refetch() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded_dashboard(&backend).await;

        dashboard.delete_client("c2").await.unwrap();

        let data = dashboard.data().unwrap();
        assert!(!data.clients.contains("c2"));
        assert_eq!(data.clients.len(), 2);
        assert_eq!(backend.count("GET /clients"), 1);
        assert_eq!(backend.count("DELETE /clients/c2"), 1);

        let err = dashboard.delete_client("c2").await.unwrap_err();
        assert!(matches!(err, DashboardError::UnknownRecord(_)));
        assert_eq!(backend.count("DELETE /clients/c2"), 1);
    }

    #[tokio::test]
    async fn test_empty_required_field_blocks_submission() {
        let backend = MockBackend::start(backend_routes()).await;
        let mut dashboard = loaded_dashboard(&backend).await;

        let mut form = nutritionist_form();
        form.name = "   ".into();
        let err = dashboard.add_nutritionist(&form).await.unwrap_err();

        match err {
            DashboardError::Validation(errors) => assert!(errors.has("name")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(backend.count("POST"), 0);
        assert_eq!(
            dashboard.notices_mut().drain().pop().unwrap().message,
            "name is required"
        );

        let client_form = ClientForm {
            name: "Eve".into(),
            phone: "555".into(),
            ..Default::default()
        };
        assert!(matches!(
            dashboard.add_client(&client_form).await,
            Err(DashboardError::Validation(_))
        ));
        assert_eq!(backend.count("POST"), 0);
    }

    #[tokio::test]
    async fn test_not_loaded_makes_no_calls() {
        let mut dashboard = AdminDashboard::new(offline_client(session_store("root@nutri.io", Role::Admin)));
        let err = dashboard.add_nutritionist(&nutritionist_form()).await.unwrap_err();
        assert!(matches!(err, DashboardError::NotLoaded));
        assert!(dashboard.client_rows().is_empty());
    }

    #[tokio::test]
    async fn test_expired_session_fails_dashboard() {
        let router = Router::new()
            .route("/nutritionists", get(|| async { StatusCode::UNAUTHORIZED }))
            .route("/clients", get(|| async { Json(json!([])) }));
        let backend = MockBackend::start(router).await;
        let store = session_store("root@nutri.io", Role::Admin);
        let mut dashboard = AdminDashboard::new(backend.client(store.clone()));

        let err = dashboard.load().await.unwrap_err();
        assert!(matches!(err, DashboardError::SessionExpired));
        assert!(dashboard.state().error().is_some());
        assert!(!crate::session::Session::has_token(store.as_ref()).unwrap());
    }
}
