use crate::{
    auth::{
        auth_dto::{AuthResponse, LoginRequest, RegisterRequest},
        auth_handlers,
    },
    middleware::{auth::TOKEN_HEADER, auth_middleware},
    state::AppState,
    todo::{
        todo_dto::{CreateTodoRequest, TodoPage, UpdateTodoRequest},
        todo_handlers,
        todo_models::Todo,
    },
};
use axum::http::{
    header::{HeaderName, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::auth_handlers::register,
        crate::auth::auth_handlers::login,
        crate::todo::todo_handlers::get_todos,
        crate::todo::todo_handlers::create_todo,
        crate::todo::todo_handlers::update_todo,
        crate::todo::todo_handlers::delete_todo,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            CreateTodoRequest,
            UpdateTodoRequest,
            TodoPage,
            Todo,
        )
    ),
    tags(
        (name = "auth", description = "Account registration and login"),
        (name = "todos", description = "Per-user todo management")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(TOKEN_HEADER),
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([HeaderName::from_static(TOKEN_HEADER), CONTENT_TYPE])
        .allow_credentials(true);

    // Public routes (no auth required)
    let account_routes = Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login));

    // Protected routes (token required)
    let todo_routes = Router::new()
        .route(
            "/todos",
            get(todo_handlers::get_todos).post(todo_handlers::create_todo),
        )
        .route(
            "/todos/:id",
            patch(todo_handlers::update_todo).delete(todo_handlers::delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(account_routes)
        .merge(todo_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
