use axum::Json;

use crate::catalog::{self, ExerciseSpec};

pub async fn list() -> Json<&'static [ExerciseSpec]> {
    Json(catalog::all())
}
