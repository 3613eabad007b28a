use std::{sync::Arc, net::{SocketAddr, IpAddr, Ipv4Addr}, str::FromStr, any::Any, time::Duration};
use clap::{Parser, ValueEnum};
use axum::{routing::{any, get}, Router};
use axum::http::{header::CONTENT_TYPE, Method};
use axum::response::{IntoResponse, Response};
use handlebars::{Handlebars, TemplateError};
use services::github_user_service::GitHubUserService;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub mod models;
pub mod controllers;
pub mod clients;
pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod mappers;
pub mod time;
pub mod validators;

use clients::github_api_client::{GithubApiClient, GITHUB_API_BASE};
use controllers::{github_user::{self, GITHUB_USER_ROUTE}, index};
use errors::ApiError;
use repositories::github_user_repository::GitHubUserRepository;
use time::{Clock, SystemClock};


// Command line interface
#[derive(Parser, Debug)]
#[clap(name="github-user-cache", about="Caching proxy for the GitHub user API")]
struct Opt {
    #[clap(short = 'l', long = "log", env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[clap(short = 'a', long = "addr", env = "ADDR", default_value = "::1")]
    addr: String,

    #[clap(short = 'p', long = "port", env = "PORT", default_value = "8080")]
    port: u16,

    #[clap(long = "style", env = "API_STYLE", value_enum, default_value = "edge")]
    style: ApiStyle,

    /// Seconds a fetched user stays cached
    #[clap(long = "cache-ttl", env = "CACHE_TTL", default_value = "3600", value_parser = clap::value_parser!(u32).range(1..))]
    cache_ttl: u32,

    /// Seconds between sweeps of expired cache entries
    #[clap(long = "cache-check-period", env = "CACHE_CHECK_PERIOD", default_value = "600", value_parser = clap::value_parser!(u64).range(1..))]
    cache_check_period: u64,

    #[clap(long = "github-api", env = "GITHUB_API_URL", default_value = GITHUB_API_BASE)]
    github_api: String,

    #[clap(long = "github-token", env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Seconds before an upstream request is abandoned
    #[clap(long = "upstream-timeout", env = "UPSTREAM_TIMEOUT", default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    upstream_timeout: u64,
}

/// Shape of the public endpoint.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiStyle {
    /// Last path segment, OPTIONS preflight and `Access-Control-Allow-Origin: *`
    Edge,
    /// Last path segment or `?username=` query, no CORS handling
    Node,
}

pub struct AppState {
    registry: Handlebars<'static>,
    clock: Arc<dyn Clock>,
    style: ApiStyle,
    github_user_service: GitHubUserService
}

pub fn build_registry() -> Result<Handlebars<'static>, TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_template_string("template", include_str!("templates/template.hbs"))?;
    handlebars.register_template_string("index", include_str!("templates/index.hbs"))?;
    Ok(handlebars)
}

pub fn router(state: Arc<AppState>) -> Router {
    // Panics are turned into responses inside the CORS layer so that their
    // 500 still carries Allow-Origin.
    let api = Router::new()
        .route(GITHUB_USER_ROUTE, any(github_user::get_user))
        .route(&format!("{}/", GITHUB_USER_ROUTE), any(github_user::get_user))
        .route(&format!("{}/*rest", GITHUB_USER_ROUTE), any(github_user::get_user))
        .layer(CatchPanicLayer::custom(handle_panic));
    let api = match state.style {
        ApiStyle::Edge => api.layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE]),
        ),
        ApiStyle::Node => api,
    };

    Router::new()
        .route("/", get(index::get_index))
        .layer(CatchPanicLayer::custom(handle_panic))
        .merge(api)
        .layer(ServiceBuilder::new().layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        ))
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown error".to_string()
    };
    log::error!("Handler panicked: {}", detail);
    ApiError::Internal(detail).into_response()
}

#[tokio::main]
async fn main() {
    // Fetch console arguments
    let opt = Opt::parse();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", format!("{},hyper=info,mio=info", opt.log_level));
    }
    // Enable console logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Register templates
    let handlebars = build_registry().unwrap_or_else(|err| {
        panic!("Failed to register templates!\n{:?}", err);
    });

    // Create reqwest client
    let client = GithubApiClient::new(
        &opt.github_api,
        opt.github_token.clone(),
        Duration::from_secs(opt.upstream_timeout),
    ).unwrap_or_else(|err| {
        panic!("Failed to create GitHub client!\n{:?}", err);
    });

    // Setup repositories
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let github_user_repository = Arc::new(GitHubUserRepository::new(
        clock.clone(),
        chrono::Duration::seconds(i64::from(opt.cache_ttl)),
    ));
    github_user_repository.clone().spawn_sweeper(Duration::from_secs(opt.cache_check_period));

    // Setup services
    let github_user_service = GitHubUserService::new(github_user_repository, Arc::new(client));

    // Setup controller routes and inject app state
    let app_state = Arc::new(AppState {
        registry: handlebars,
        clock,
        style: opt.style,
        github_user_service,
    });
    let app = router(app_state);

    let sock_addr = SocketAddr::from((
        IpAddr::from_str(opt.addr.as_str()).unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        opt.port
    ));
    log::info!("Now listening on http://{} ({:?} style)", sock_addr, opt.style);

    axum::Server::bind(&sock_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .unwrap_or_else(|err| {
            panic!("Server error!\n{:?}", err);
        });
}
