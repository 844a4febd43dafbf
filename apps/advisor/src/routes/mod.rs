pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::account::handlers as account;
use crate::assistant;
use crate::colleges;
use crate::quiz::handlers as quiz;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Wizard
        .route("/api/v1/sessions", post(quiz::handle_create_session))
        .route("/api/v1/questions", get(quiz::handle_questions))
        .route(
            "/api/v1/sessions/:sid/wizard",
            get(quiz::handle_get_wizard),
        )
        .route(
            "/api/v1/sessions/:sid/wizard/step",
            post(quiz::handle_step),
        )
        .route(
            "/api/v1/sessions/:sid/wizard/fields",
            put(quiz::handle_put_fields),
        )
        .route(
            "/api/v1/sessions/:sid/wizard/save",
            post(quiz::handle_save_incomplete),
        )
        .route(
            "/api/v1/sessions/:sid/wizard/resume",
            post(quiz::handle_resume),
        )
        // Submission and local records
        .route(
            "/api/v1/sessions/:sid/quiz/submit",
            post(quiz::handle_submit),
        )
        .route("/api/v1/sessions/:sid/quiz/last", get(quiz::handle_last_quiz))
        .route(
            "/api/v1/sessions/:sid/quiz/saved",
            get(quiz::handle_saved_list),
        )
        .route("/api/v1/sessions/:sid/online", put(quiz::handle_set_online))
        // Widgets
        .route(
            "/api/v1/sessions/:sid/assistant",
            post(assistant::handle_ask),
        )
        .route("/api/v1/colleges", get(colleges::handle_colleges))
        // Account
        .route("/api/v1/sessions/:sid/signup", post(account::handle_signup))
        .route("/api/v1/sessions/:sid/login", post(account::handle_login))
        .route(
            "/api/v1/sessions/:sid/login-test",
            post(account::handle_login_test),
        )
        .route("/api/v1/sessions/:sid/logout", post(account::handle_logout))
        .route(
            "/api/v1/sessions/:sid/profile",
            get(account::handle_get_profile).post(account::handle_update_profile),
        )
        .with_state(state)
}
