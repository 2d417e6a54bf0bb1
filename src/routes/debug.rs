use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Report configured providers and cache state
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {
            "routing_provider": state.synthesizer.routing_provider_name(),
            "max_attempts": state.synthesizer.config().max_attempts,
            "time_budget_ms": state.synthesizer.config().time_budget_ms,
        }
    });

    match state.poi_cache {
        Some(ref cache) => {
            let stats = cache.stats();
            status["checks"]["poi_cache"] = json!({
                "hits": stats.hits,
                "misses": stats.misses,
                "hit_rate": stats.hit_rate,
                "entries": stats.entries,
            });
        }
        None => {
            status["checks"]["poi_cache"] = json!("disabled");
        }
    }

    if state.seed.is_some() {
        status["checks"]["seeded"] = json!(true);
    }

    Json(status)
}
