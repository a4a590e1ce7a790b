use axum::{
    Router,
    http::{HeaderValue, Method, request},
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use identity_adapters::{
    config::AllowedOrigins,
    http::routes::{
        deactivate_user, github_authorize_url, github_login, login, refresh_token, register,
        request_email_verification, update_user, verify_email,
    },
};
use identity_application::VerificationPolicy;
use identity_core::{
    EmailClient, GithubOAuthProvider, PasswordHasher, TokenService, UserRepository,
    VerificationCodeStore,
};

/// Main identity service exposing the register/login/token/verification
/// routes.
pub struct IdentityService {
    router: Router,
}

impl IdentityService {
    /// Wire the routes to the provided collaborators.
    ///
    /// Collaborators implement Clone via internal shared handles (pools,
    /// `Arc<RwLock>`), so each route is given exactly the state it needs.
    #[allow(clippy::too_many_arguments)]
    pub fn new<R, S, H, T, E, P>(
        users: R,
        codes: S,
        password_hasher: H,
        tokens: T,
        email_client: E,
        github: P,
        verification_policy: VerificationPolicy,
    ) -> Self
    where
        R: UserRepository + Clone + 'static,
        S: VerificationCodeStore + Clone + 'static,
        H: PasswordHasher + Clone + 'static,
        T: TokenService + Clone + 'static,
        E: EmailClient + Clone + 'static,
        P: GithubOAuthProvider + Clone + 'static,
    {
        let router = Router::new()
            // Registration needs the user repository, hasher and email client
            .route("/register", post(register::<R, H, E>))
            .with_state((
                users.clone(),
                password_hasher.clone(),
                email_client.clone(),
            ))
            // Login resolves credentials and issues a token
            .route("/login", post(login::<R, H, T>))
            .with_state((users.clone(), password_hasher.clone(), tokens.clone()))
            // Refresh only needs the token service
            .route("/refresh-token", post(refresh_token::<T>))
            .with_state(tokens.clone())
            // Profile updates act on the token holder
            .route("/update-user", put(update_user::<R, H, T>))
            .with_state((users.clone(), password_hasher.clone(), tokens.clone()))
            // Deactivation acts on the token holder
            .route("/deactivate-user", delete(deactivate_user::<R, T>))
            .with_state((users.clone(), tokens.clone()))
            // OAuth entry points
            .route("/github/authorize-url", get(github_authorize_url::<P>))
            .with_state(github.clone())
            .route("/github/login", post(github_login::<R, P, H, T, E>))
            .with_state((
                users.clone(),
                github,
                password_hasher,
                tokens,
                email_client.clone(),
            ))
            // Email verification flow
            .route(
                "/request-verification",
                post(request_email_verification::<R, S, E>),
            )
            .with_state((
                users.clone(),
                codes.clone(),
                email_client.clone(),
                verification_policy.clone(),
            ))
            .route("/verify-email", post(verify_email::<R, S, E>))
            .with_state((users, codes, email_client, verification_policy));

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(TraceLayer::new_for_http());
        self
    }

    /// Finish the router, optionally restricting cross-origin access to the
    /// configured allow-list.
    pub fn into_router(mut self, allowed_origins: Option<AllowedOrigins>) -> Router {
        if let Some(allowed_origins) = allowed_origins {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        allowed_origins.contains(origin)
                    },
                ));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    /// Run the identity service as a standalone server.
    pub async fn run(
        self,
        listener: TcpListener,
        allowed_origins: Option<AllowedOrigins>,
    ) -> Result<(), std::io::Error> {
        let router = self.into_router(allowed_origins);

        tracing::info!("Identity service listening on {}", listener.local_addr()?);

        axum::serve(listener, router).await
    }
}
