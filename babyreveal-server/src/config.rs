use axum::{extract::State, routing::get, Json};
use babyreveal_core::{AppConfig, ConfigPatch};
use log::info;

use crate::{
    auth::AdminSession,
    errors::ServerResult,
    schemas::{ConfigSchema, ValidatedJson},
    Router, ServerContext,
};

async fn config(State(context): State<ServerContext>) -> Json<AppConfig> {
    Json(context.reveal.storage.config().await)
}

async fn update_config(
    _session: AdminSession,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<ConfigSchema>,
) -> ServerResult<Json<AppConfig>> {
    let config = context
        .reveal
        .storage
        .save_config(ConfigPatch::from(body))
        .await?;

    info!("Config was updated");

    Ok(Json(config))
}

pub fn router() -> Router {
    Router::new().route("/config", get(config).post(update_config))
}
