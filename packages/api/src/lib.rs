// ABOUTME: HTTP API layer for ManagMe providing REST endpoints and routing
// ABOUTME: Hosts the domain API router and the token service router

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use managme_auth::AuthService;
use managme_storage::DataStore;

pub mod auth_handlers;
pub mod middleware;
pub mod projects_handlers;
pub mod response;
pub mod stories_handlers;
pub mod tasks_handlers;
pub mod users_handlers;

/// Shared state of the domain API.
pub type ApiState = Arc<DataStore>;

/// Shared state of the token service.
pub type AuthState = Arc<AuthService>;

fn projects_router() -> Router<ApiState> {
    Router::new()
        .route("/", get(projects_handlers::list_projects))
        .route("/", post(projects_handlers::create_project))
        .route("/{id}", get(projects_handlers::get_project))
        .route("/{id}", put(projects_handlers::update_project))
        .route("/{id}", patch(projects_handlers::update_project))
        .route("/{id}", delete(projects_handlers::delete_project))
        .route("/search/{term}", get(projects_handlers::search_projects))
        .route("/{id}/stories", get(projects_handlers::project_stories))
}

fn stories_router() -> Router<ApiState> {
    Router::new()
        .route("/", get(stories_handlers::list_stories))
        .route("/", post(stories_handlers::create_story))
        .route("/{id}", get(stories_handlers::get_story))
        .route("/{id}", put(stories_handlers::update_story))
        .route("/{id}", patch(stories_handlers::update_story))
        .route("/{id}", delete(stories_handlers::delete_story))
        .route("/{id}/tasks", get(stories_handlers::story_tasks))
}

fn tasks_router() -> Router<ApiState> {
    Router::new()
        .route("/", get(tasks_handlers::list_tasks))
        .route("/", post(tasks_handlers::create_task))
        .route("/{id}", get(tasks_handlers::get_task))
        .route("/{id}", put(tasks_handlers::update_task))
        .route("/{id}", patch(tasks_handlers::update_task))
        .route("/{id}", delete(tasks_handlers::delete_task))
        .route("/state/{state}", get(tasks_handlers::tasks_by_state))
        .route("/{id}/assign", post(tasks_handlers::assign_task))
        .route("/{id}/complete", post(tasks_handlers::complete_task))
}

fn users_router() -> Router<ApiState> {
    Router::new()
        .route("/", get(users_handlers::list_users))
        .route("/assignable", get(users_handlers::assignable_users))
        .route("/{id}", get(users_handlers::get_user))
}

/// Creates the domain API router serving `/api/projects`, `/api/stories`,
/// `/api/tasks` and `/api/users`.
pub fn create_api_router(store: ApiState) -> Router {
    Router::new()
        .nest("/api/projects", projects_router())
        .nest("/api/stories", stories_router())
        .nest("/api/tasks", tasks_router())
        .nest("/api/users", users_router())
        .with_state(store)
}

/// Creates the token service router serving `/api/auth`.
///
/// `logout` and `me` sit behind bearer verification; `login` and
/// `refresh` are open.
pub fn create_auth_router(auth: AuthState) -> Router {
    let protected = Router::new()
        .route("/logout", post(auth_handlers::logout))
        .route("/me", get(auth_handlers::me))
        .layer(from_fn_with_state(auth.clone(), middleware::require_auth));

    let routes = Router::new()
        .route("/login", post(auth_handlers::login))
        .route("/refresh", post(auth_handlers::refresh))
        .merge(protected);

    Router::new().nest("/api/auth", routes).with_state(auth)
}
