use crate::errors::AppError;
use crate::gate;
use crate::intake::parse_quantity;
use crate::models::{
    AdminLoginForm, DataSource, AdminRecordsResponse, SaveRecordsRequest, SaveRecordsResponse, SubmitForm,
    SubmitRequest, SubmitResponse,
};
use crate::state::AppState;
use crate::storage::Revision;
use crate::ui::{Notice, render_admin_grid, render_admin_login, render_index};
use crate::workflow::{self, Dashboard};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Html,
    Form, Json,
};
use tracing::info;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let _cycle = state.cycle.lock().await;
    let dashboard = workflow::load_dashboard(state.store.as_ref()).await;
    Html(render_index(&dashboard, None))
}

/// Always answers with the dashboard page; failures carry their status and
/// an error notice.
pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> (StatusCode, Html<String>) {
    let _cycle = state.cycle.lock().await;

    let result = match parse_quantity(&form.quantity_kg) {
        Ok(quantity_kg) => {
            workflow::submit_request(state.store.as_ref(), &form.cafe_name, quantity_kg).await
        }
        Err(err) => Err(err.into()),
    };

    match result {
        Ok(submitted) => {
            let mut message = format!(
                "✅ {}: request received. {} requests saved in total.",
                submitted.record.cafe_name, submitted.request_count
            );
            if submitted.loaded_from == DataSource::Unavailable {
                message.push_str(
                    " The sheet could not be read beforehand, so it now holds only this request.",
                );
            }
            let notice = Notice::Success(message);
            (
                StatusCode::OK,
                Html(render_index(&submitted.dashboard, Some(&notice))),
            )
        }
        Err(err) => {
            let dashboard = workflow::load_dashboard(state.store.as_ref()).await;
            let notice = Notice::Error(format!("Could not submit: {}", err.message));
            (err.status, Html(render_index(&dashboard, Some(&notice))))
        }
    }
}

pub async fn get_summary(State(state): State<AppState>) -> Json<Dashboard> {
    let _cycle = state.cycle.lock().await;
    Json(workflow::load_dashboard(state.store.as_ref()).await)
}

pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let _cycle = state.cycle.lock().await;
    let submitted =
        workflow::submit_request(state.store.as_ref(), &payload.cafe_name, payload.quantity_kg)
            .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            record: submitted.record,
            request_count: submitted.request_count,
        }),
    ))
}

pub async fn admin_login_page() -> Html<String> {
    Html(render_admin_login(None))
}

pub async fn admin_login(
    State(state): State<AppState>,
    Form(form): Form<AdminLoginForm>,
) -> (StatusCode, Html<String>) {
    if !gate::reveals(&form.password, &state.settings.admin_password) {
        info!("admin grid requested with the wrong password");
        return (
            StatusCode::FORBIDDEN,
            Html(render_admin_login(Some("Wrong password."))),
        );
    }

    let _cycle = state.cycle.lock().await;
    let table = workflow::admin_records(state.store.as_ref()).await;
    (StatusCode::OK, Html(render_admin_grid(&table, &form.password)))
}

pub async fn get_admin_records(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminRecordsResponse>, AppError> {
    require_admin(&headers, &state)?;
    let _cycle = state.cycle.lock().await;
    let table = workflow::admin_records(state.store.as_ref()).await;
    Ok(Json(AdminRecordsResponse {
        records: table.records,
        revision: table.revision.map(|revision| revision.to_string()),
        source: table.source,
    }))
}

pub async fn put_admin_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SaveRecordsRequest>,
) -> Result<Json<SaveRecordsResponse>, AppError> {
    require_admin(&headers, &state)?;
    let _cycle = state.cycle.lock().await;
    let expected = payload
        .revision
        .filter(|revision| !revision.is_empty())
        .map(Revision::new);
    let saved =
        workflow::save_records(state.store.as_ref(), payload.records, expected.as_ref()).await?;
    Ok(Json(SaveRecordsResponse {
        saved: saved.rows,
        revision: saved.revision.map(|revision| revision.to_string()),
    }))
}

pub async fn healthy() -> &'static str {
    "ok"
}

fn require_admin(headers: &HeaderMap, state: &AppState) -> Result<(), AppError> {
    let supplied = headers
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if gate::reveals(supplied, &state.settings.admin_password) {
        Ok(())
    } else {
        Err(AppError::forbidden("admin password required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Backend, Settings};
    use crate::storage::MemoryStore;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn state_over(store: Arc<MemoryStore>) -> AppState {
        AppState::new(
            store,
            Settings {
                port: 0,
                backend: Backend::Memory,
                admin_password: "beans".to_string(),
            },
        )
    }

    fn form(cafe_name: &str, quantity_kg: &str) -> Form<SubmitForm> {
        Form(SubmitForm {
            cafe_name: cafe_name.to_string(),
            quantity_kg: quantity_kg.to_string(),
        })
    }

    #[tokio::test]
    async fn failed_form_write_renders_dashboard_with_notice() {
        let store = Arc::new(MemoryStore::default());
        store.fail_writes.store(true, Ordering::Relaxed);

        let (status, Html(html)) =
            submit_form(State(state_over(store.clone())), form("Cafe A", "3")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains(r#"data-type="error">Could not submit: store rejected the write"#));
        assert!(html.contains(r#"id="request-count">0<"#));
    }

    #[tokio::test]
    async fn submit_over_unreadable_sheet_warns_about_replacement() {
        let store = Arc::new(MemoryStore::default());
        store.fail_reads.store(true, Ordering::Relaxed);

        let (status, Html(html)) =
            submit_form(State(state_over(store.clone())), form("Cafe A", "3")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("so it now holds only this request."));

        store.fail_reads.store(false, Ordering::Relaxed);
        let (_, Html(html)) = submit_form(State(state_over(store)), form("Cafe B", "1")).await;
        assert!(html.contains("2 requests saved in total."));
        assert!(!html.contains("holds only this request"));
    }
}
