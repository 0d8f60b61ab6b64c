use axum::{extract::State, routing::get, Json};
use babyreveal_core::{NewVote, Vote, VoteStats};
use log::info;
use serde_json::{json, Value};

use crate::{
    auth::AdminSession,
    errors::ServerResult,
    schemas::{ValidatedJson, VoteSchema},
    Router, ServerContext,
};

async fn list_votes(State(context): State<ServerContext>) -> Json<Vec<Vote>> {
    Json(context.reveal.storage.votes().await)
}

async fn create_vote(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<VoteSchema>,
) -> ServerResult<Json<Vote>> {
    let new_vote = NewVote::try_from(body)?;
    let vote = context.reveal.storage.add_vote(new_vote).await?;

    info!("{} voted {:?}", vote.name, vote.choice);

    Ok(Json(vote))
}

async fn clear_votes(
    _session: AdminSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Value>> {
    context.reveal.storage.clear_votes().await?;

    info!("All votes were cleared");

    Ok(Json(json!({ "success": true })))
}

async fn vote_stats(State(context): State<ServerContext>) -> Json<VoteStats> {
    let votes = context.reveal.storage.votes().await;

    Json(VoteStats::from_votes(&votes))
}

pub fn router() -> Router {
    Router::new()
        .route(
            "/votes",
            get(list_votes).post(create_vote).delete(clear_votes),
        )
        .route("/votes/stats", get(vote_stats))
}
