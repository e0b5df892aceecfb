use axum::{
    extract::State,
    response::Redirect,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use crate::http::server::AppState;
use crate::load_balancer::{Instance, InstanceAddr};

/// One pool entry as reported by `GET /`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceStatus {
    pub index: usize,
    pub ip: String,
    pub port: u16,
    pub active: bool,
}

/// One pool entry as reported by `GET /health`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub ip: String,
    pub port: u16,
    pub active: bool,
}

impl From<&Instance> for HealthStatus {
    fn from(instance: &Instance) -> Self {
        Self {
            ip: instance.addr.host.clone(),
            port: instance.addr.port,
            active: instance.is_healthy(),
        }
    }
}

// Fields stay strings so that malformed input is ignored instead of rejected.
#[derive(Debug, Deserialize)]
pub struct AddInstanceForm {
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub port: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveInstanceForm {
    #[serde(default)]
    pub index: String,
}

impl AddInstanceForm {
    fn addr(&self) -> Option<InstanceAddr> {
        let ip = self.ip.trim();
        if ip.is_empty() {
            return None;
        }
        let port = self.port.trim().parse::<u16>().ok()?;
        Some(InstanceAddr::new(ip, port))
    }
}

/// `GET /`: current pool, without probing.
pub async fn list_instances(State(state): State<AppState>) -> Json<Vec<InstanceStatus>> {
    let statuses = state
        .pool
        .snapshot()
        .iter()
        .enumerate()
        .map(|(index, instance)| InstanceStatus {
            index,
            ip: instance.addr.host.clone(),
            port: instance.addr.port,
            active: instance.is_healthy(),
        })
        .collect();
    Json(statuses)
}

/// `GET /health`: probe every instance, then report.
pub async fn check_health(State(state): State<AppState>) -> Json<Vec<HealthStatus>> {
    state.pool.health_check_all().await;
    let statuses = state
        .pool
        .snapshot()
        .iter()
        .map(|instance| HealthStatus::from(&**instance))
        .collect();
    Json(statuses)
}

/// `POST /add_instance` with form fields `ip`, `port`.
pub async fn add_instance(
    State(state): State<AppState>,
    Form(form): Form<AddInstanceForm>,
) -> Redirect {
    match form.addr() {
        Some(addr) => {
            let healthy = state.pool.add(addr.clone()).await;
            tracing::info!(addr = %addr, healthy, "Instance added via admin API");
        }
        None => {
            tracing::warn!(ip = %form.ip, port = %form.port, "Ignoring malformed add_instance request");
        }
    }
    Redirect::to("/")
}

/// `POST /remove_instance` with form field `index`.
pub async fn remove_instance(
    State(state): State<AppState>,
    Form(form): Form<RemoveInstanceForm>,
) -> Redirect {
    match form.index.trim().parse::<usize>() {
        Ok(index) => {
            if state.pool.remove(index).is_none() {
                tracing::debug!(index, "remove_instance index out of range");
            }
        }
        Err(_) => {
            tracing::warn!(index = %form.index, "Ignoring malformed remove_instance request");
        }
    }
    Redirect::to("/")
}
