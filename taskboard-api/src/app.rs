/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use taskboard_shared::{
    auth::{
        authorization::{require_role, RolePolicy},
        jwt::TokenService,
        middleware::{authenticate, AuthContext},
    },
    services::{AuthService, TaskService},
    store::{Datastore, UserStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; every field is a
/// cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Backend, for health checks
    pub store: Arc<dyn Datastore>,

    /// Credential store, for role lookups
    pub users: Arc<dyn UserStore>,

    /// Auth component
    pub auth: AuthService,

    /// Task component
    pub tasks: TaskService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires both components to `store`
    pub fn new<S>(store: Arc<S>, config: Config) -> Self
    where
        S: Datastore + 'static,
    {
        let tokens = TokenService::new(config.jwt.secret.clone(), config.token_ttl());

        Self {
            store: store.clone(),
            users: store.clone(),
            auth: AuthService::new(store.clone(), tokens),
            tasks: TaskService::new(store),
            config: Arc::new(config),
        }
    }

    /// Token service used to issue and verify bearer tokens
    pub fn tokens(&self) -> &TokenService {
        self.auth.tokens()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// GET    /health           public
/// POST   /auth/register    public
/// POST   /auth/login       public
/// GET    /tasks            bearer
/// POST   /tasks/bulk       bearer
/// PATCH  /tasks/:id        bearer
/// DELETE /tasks/:id        bearer
/// GET    /users/me         bearer
/// GET    /users            bearer + {admin}
/// ```
///
/// # Middleware Stack
///
/// 1. Request tracing (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer authentication, then the group's role policy if it has one
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login));

    // Route table: each protected group with its allowed-roles set
    let task_routes = protect(
        Router::new()
            .route("/tasks", get(routes::tasks::list_tasks))
            .route("/tasks/bulk", post(routes::tasks::create_bulk))
            .route(
                "/tasks/:id",
                patch(routes::tasks::update_task).delete(routes::tasks::delete_task),
            ),
        &state,
        None,
    );

    let profile_routes = protect(
        Router::new().route("/users/me", get(routes::users::me)),
        &state,
        None,
    );

    let admin_routes = protect(
        Router::new().route("/users", get(routes::users::list_users)),
        &state,
        Some(RolePolicy::admin_only()),
    );

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(task_routes)
        .merge(profile_routes)
        .merge(admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Puts `router` behind bearer authentication and, if given, a role policy
fn protect(
    router: Router<AppState>,
    state: &AppState,
    policy: Option<RolePolicy>,
) -> Router<AppState> {
    let router = match policy {
        Some(policy) => router.route_layer(from_fn_with_state(
            RoleGate {
                users: state.users.clone(),
                policy: Arc::new(policy),
            },
            role_gate_layer,
        )),
        None => router,
    };

    // Added last so it runs first
    router.route_layer(from_fn_with_state(state.clone(), jwt_auth_layer))
}

/// JWT authentication middleware layer
///
/// Validates the bearer token, then injects `AuthContext` into request
/// extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(state.tokens(), req.headers())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[derive(Clone)]
struct RoleGate {
    users: Arc<dyn UserStore>,
    policy: Arc<RolePolicy>,
}

/// Role policy middleware layer; runs after `jwt_auth_layer`
async fn role_gate_layer(
    State(gate): State<RoleGate>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

    let role = require_role(gate.users.as_ref(), &auth, &gate.policy)
        .await
        .map_err(|e| {
            tracing::warn!(user_id = %auth.user_id, policy = %gate.policy, error = %e, "Access denied");
            e
        })?;

    tracing::debug!(user_id = %auth.user_id, role = %role, "Role policy satisfied");

    Ok(next.run(req).await)
}
