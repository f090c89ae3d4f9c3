//! End-to-end tests for the auth crate
//! Service level first, then through the HTTP router.

#[cfg(test)]
mod fixtures {
    use std::sync::Arc;

    use platform::kv::MemoryKeyValueStore;

    use crate::application::AuthConfig;
    use crate::domain::entity::user::User;
    use crate::domain::repository::UserRepository;
    use crate::domain::services::TokenCodec;
    use crate::domain::value_object::{
        email::Email,
        user_password::{RawPassword, UserPassword},
        user_role::UserRole,
    };
    use crate::infra::{InMemoryUserRepository, KvSessionStore};
    use crate::presentation::AuthAppState;

    pub type Sessions = KvSessionStore<MemoryKeyValueStore>;
    pub type State = AuthAppState<InMemoryUserRepository, Sessions>;

    pub const PASSWORD: &str = "pw12345";

    pub fn state() -> State {
        state_with(AuthConfig::with_random_secret())
    }

    pub fn state_with(config: AuthConfig) -> State {
        let codec = TokenCodec::new(&config.token_secret).unwrap();
        let sessions = KvSessionStore::new(Arc::new(MemoryKeyValueStore::new()));
        AuthAppState::new(InMemoryUserRepository::new(), sessions, codec, config)
    }

    /// Insert a principal directly, bypassing registration
    pub async fn seed_user(state: &State, email: &str, role: UserRole, active: bool) -> User {
        let raw = RawPassword::new(PASSWORD.to_string()).unwrap();
        let mut user = User::new(
            Email::new(email).unwrap(),
            UserPassword::from_raw(&raw, state.config.pepper()).unwrap(),
            "Seed",
            "User",
        )
        .with_role(role);
        if !active {
            user.deactivate();
        }
        state.users.create(&user).await.unwrap();
        user
    }
}

#[cfg(test)]
mod service_tests {
    use std::sync::Arc;

    use super::fixtures::{self, PASSWORD, Sessions, State};
    use crate::application::{
        AuthConfig, AuthOutput, BootstrapAdminInput, BootstrapAdminUseCase, CurrentUserUseCase,
        LoginInput, LoginUseCase, LogoutUseCase, RefreshTokenUseCase, RegisterInput,
        RegisterUseCase, RevokeSessionUseCase,
    };
    use crate::domain::repository::{SessionRepository, UserRepository};
    use crate::domain::services::TokenCodec;
    use crate::domain::value_object::{
        email::Email, token_kind::TokenKind, user_id::UserId, user_role::UserRole,
    };
    use crate::error::AuthError;
    use crate::infra::InMemoryUserRepository;
    use crate::presentation::middleware::authenticate;
    use axum::http::{HeaderMap, HeaderValue, header};

    fn register_use_case(state: &State) -> RegisterUseCase<InMemoryUserRepository, Sessions> {
        RegisterUseCase::new(
            state.users.clone(),
            state.sessions.clone(),
            state.codec.clone(),
            state.config.clone(),
        )
    }

    fn login_use_case(state: &State) -> LoginUseCase<InMemoryUserRepository, Sessions> {
        LoginUseCase::new(
            state.users.clone(),
            state.sessions.clone(),
            state.codec.clone(),
            state.config.clone(),
        )
    }

    fn refresh_use_case(state: &State) -> RefreshTokenUseCase<Sessions> {
        RefreshTokenUseCase::new(
            state.sessions.clone(),
            state.codec.clone(),
            state.config.clone(),
        )
    }

    async fn register(state: &State, email: &str) -> AuthOutput {
        register_use_case(state)
            .execute(RegisterInput {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                first_name: "Ann".to_string(),
                last_name: "Bee".to_string(),
            })
            .await
            .unwrap()
    }

    async fn login(state: &State, email: &str, password: &str) -> Result<AuthOutput, AuthError> {
        login_use_case(state)
            .execute(LoginInput {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_register_issues_tokens_and_session() {
        let state = fixtures::state();
        let output = register(&state, "A@B.io").await;

        assert_eq!(output.user.email, "a@b.io");
        assert_eq!(output.user.role, UserRole::User);

        let access = state
            .codec
            .verify_kind(&output.tokens.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(access.user_id, output.user.id);

        let stored = state.sessions.get(&output.user.id).await.unwrap();
        assert_eq!(stored, output.tokens.refresh_token);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let state = fixtures::state();
        let first = register(&state, "a@b.io").await;

        let err = register_use_case(&state)
            .execute(RegisterInput {
                email: " A@B.IO ".to_string(),
                password: PASSWORD.to_string(),
                first_name: "Other".to_string(),
                last_name: "Person".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailExists));

        // The rejected attempt leaves the first registration's session alone
        let payload = authenticate(&state.codec, &bearer(&first.tokens.access_token)).unwrap();
        assert_eq!(payload.user_id, first.user.id);
        assert_eq!(
            state.sessions.get(&first.user.id).await.unwrap(),
            first.tokens.refresh_token
        );
        assert!(
            refresh_use_case(&state)
                .execute(&first.tokens.refresh_token)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_register_with_unusable_lifetime_creates_nothing() {
        let state = fixtures::state_with(AuthConfig {
            refresh_token_ttl: std::time::Duration::from_secs(10_000_000_000_000),
            ..AuthConfig::with_random_secret()
        });

        let err = register_use_case(&state)
            .execute(RegisterInput {
                email: "a@b.io".to_string(),
                password: PASSWORD.to_string(),
                first_name: "Ann".to_string(),
                last_name: "Bee".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));

        let email = Email::new("a@b.io").unwrap();
        assert!(!state.users.exists_by_email(&email).await.unwrap());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_idempotent() {
        let state = fixtures::state();
        let bootstrap = BootstrapAdminUseCase::new(state.users.clone(), state.config.clone());
        let input = || BootstrapAdminInput {
            email: "Root@B.io".to_string(),
            password: PASSWORD.to_string(),
        };

        let created = bootstrap.execute(input()).await.unwrap();
        assert_eq!(created.role, UserRole::Admin);
        assert_eq!(created.email, "root@b.io");

        let again = bootstrap.execute(input()).await.unwrap();
        assert_eq!(again.id, created.id);

        let output = login(&state, "root@b.io", PASSWORD).await.unwrap();
        assert_eq!(output.user.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_leaves_existing_user_role() {
        let state = fixtures::state();
        let member = register(&state, "a@b.io").await;

        let summary = BootstrapAdminUseCase::new(state.users.clone(), state.config.clone())
            .execute(BootstrapAdminInput {
                email: "a@b.io".to_string(),
                password: "another-pass".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(summary.id, member.user.id);
        assert_eq!(summary.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let state = fixtures::state();
        let err = register_use_case(&state)
            .execute(RegisterInput {
                email: "not-an-email".to_string(),
                password: PASSWORD.to_string(),
                first_name: "Ann".to_string(),
                last_name: "Bee".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_replaces_previous_session() {
        let state = fixtures::state();
        let registered = register(&state, "a@b.io").await;
        let first = login(&state, "a@b.io", PASSWORD).await.unwrap();
        let second = login(&state, "a@b.io", PASSWORD).await.unwrap();

        let stored = state.sessions.get(&registered.user.id).await.unwrap();
        assert_eq!(stored, second.tokens.refresh_token);

        let refresh = refresh_use_case(&state);
        assert!(matches!(
            refresh.execute(&registered.tokens.refresh_token).await,
            Err(AuthError::InvalidRefreshToken)
        ));
        assert!(matches!(
            refresh.execute(&first.tokens.refresh_token).await,
            Err(AuthError::InvalidRefreshToken)
        ));
        assert!(refresh.execute(&second.tokens.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_failures() {
        let state = fixtures::state();
        register(&state, "a@b.io").await;
        fixtures::seed_user(&state, "off@b.io", UserRole::User, false).await;

        assert!(matches!(
            login(&state, "a@b.io", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&state, "nobody@b.io", PASSWORD).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&state, "garbage", PASSWORD).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&state, "off@b.io", PASSWORD).await,
            Err(AuthError::AccountInactive)
        ));
    }

    #[tokio::test]
    async fn test_refresh_rotates_single_use() {
        let state = fixtures::state();
        let output = register(&state, "a@b.io").await;
        let refresh = refresh_use_case(&state);

        let rotated = refresh.execute(&output.tokens.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, output.tokens.refresh_token);
        assert_eq!(
            state.sessions.get(&output.user.id).await.unwrap(),
            rotated.refresh_token
        );

        // Replaying the retired token fails and does not disturb the session
        assert!(matches!(
            refresh.execute(&output.tokens.refresh_token).await,
            Err(AuthError::InvalidRefreshToken)
        ));
        assert!(refresh.execute(&rotated.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_keeps_identity_and_role() {
        let state = fixtures::state();
        let admin = fixtures::seed_user(&state, "root@b.io", UserRole::Admin, true).await;
        let output = login(&state, "root@b.io", PASSWORD).await.unwrap();

        let rotated = refresh_use_case(&state)
            .execute(&output.tokens.refresh_token)
            .await
            .unwrap();
        let access = state
            .codec
            .verify_kind(&rotated.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(access.user_id, admin.user_id);
        assert_eq!(access.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_refresh_rejections() {
        let state = fixtures::state();
        let output = register(&state, "a@b.io").await;
        let refresh = refresh_use_case(&state);

        // Access token presented as refresh token
        assert!(matches!(
            refresh.execute(&output.tokens.access_token).await,
            Err(AuthError::InvalidRefreshToken)
        ));

        // Garbage
        assert!(matches!(
            refresh.execute("v1.local.nope").await,
            Err(AuthError::InvalidRefreshToken)
        ));

        // Expired, even though it is well formed
        let expired = state
            .codec
            .mint(
                output.user.id,
                UserRole::User,
                TokenKind::Refresh,
                chrono::Duration::seconds(-1),
            )
            .unwrap();
        assert!(matches!(
            refresh.execute(&expired).await,
            Err(AuthError::InvalidRefreshToken)
        ));

        // Minted under another key
        let foreign = TokenCodec::new(&[3u8; 32])
            .unwrap()
            .mint(
                output.user.id,
                UserRole::User,
                TokenKind::Refresh,
                chrono::Duration::hours(1),
            )
            .unwrap();
        assert!(matches!(
            refresh.execute(&foreign).await,
            Err(AuthError::InvalidRefreshToken)
        ));

        // The real session is untouched by all of the above
        assert!(refresh.execute(&output.tokens.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_ends_refresh_but_not_access() {
        let state = fixtures::state();
        let output = register(&state, "a@b.io").await;

        let logout = LogoutUseCase::new(state.sessions.clone());
        logout.execute(&output.user.id).await.unwrap();
        logout.execute(&output.user.id).await.unwrap();

        assert!(matches!(
            refresh_use_case(&state)
                .execute(&output.tokens.refresh_token)
                .await,
            Err(AuthError::InvalidRefreshToken)
        ));

        let payload = authenticate(&state.codec, &bearer(&output.tokens.access_token)).unwrap();
        assert_eq!(payload.user_id, output.user.id);
    }

    #[tokio::test]
    async fn test_logout_unknown_principal_is_ok() {
        let state = fixtures::state();
        LogoutUseCase::new(state.sessions.clone())
            .execute(&UserId::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_current_user_reports_session_state() {
        let state = fixtures::state();
        let output = register(&state, "a@b.io").await;
        let current = CurrentUserUseCase::new(state.users.clone(), state.sessions.clone());

        let before = current.execute(&output.user.id).await.unwrap();
        assert!(before.session_active);
        assert_eq!(before.user, output.user);

        LogoutUseCase::new(state.sessions.clone())
            .execute(&output.user.id)
            .await
            .unwrap();
        let after = current.execute(&output.user.id).await.unwrap();
        assert!(!after.session_active);

        assert!(matches!(
            current.execute(&UserId::new()).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_revoke_session() {
        let state = fixtures::state();
        let admin = fixtures::seed_user(&state, "root@b.io", UserRole::Admin, true).await;
        let output = register(&state, "a@b.io").await;
        let revoke = RevokeSessionUseCase::new(state.users.clone(), state.sessions.clone());

        revoke.execute(&admin.user_id, &output.user.id).await.unwrap();
        assert!(!state.sessions.exists(&output.user.id).await.unwrap());

        assert!(matches!(
            revoke.execute(&admin.user_id, &UserId::new()).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_refresh_has_one_winner() {
        let state = fixtures::state();
        let output = register(&state, "a@b.io").await;
        let refresh = Arc::new(refresh_use_case(&state));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let refresh = refresh.clone();
                let token = output.tokens.refresh_token.clone();
                tokio::spawn(async move { refresh.execute(&token).await })
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(tokens) => winners.push(tokens),
                Err(AuthError::InvalidRefreshToken) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(
            state.sessions.get(&output.user.id).await.unwrap(),
            winners[0].refresh_token
        );
    }
}

#[cfg(test)]
mod router_tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::fixtures::{self, PASSWORD};
    use crate::domain::value_object::user_role::UserRole;
    use crate::presentation::auth_router;

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn register(app: &Router, email: &str) -> Value {
        let (status, body) = send(
            app,
            request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "firstName": "Ann",
                    "lastName": "Bee",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn login(app: &Router, email: &str) -> Value {
        let (status, body) = send(
            app,
            request(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_register_response_shape() {
        let app = auth_router(fixtures::state());
        let body = register(&app, "a@b.io").await;

        assert!(body["accessToken"].as_str().unwrap().starts_with("v1.local."));
        assert!(body["refreshToken"].as_str().unwrap().starts_with("v1.local."));
        assert_eq!(body["user"]["email"], "a@b.io");
        assert_eq!(body["user"]["firstName"], "Ann");
        assert_eq!(body["user"]["lastName"], "Bee");
        assert_eq!(body["user"]["role"], "USER");
    }

    #[tokio::test]
    async fn test_register_conflict_and_login_failure() {
        let app = auth_router(fixtures::state());
        register(&app, "a@b.io").await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "email": "a@b.io",
                    "password": PASSWORD,
                    "firstName": "Ann",
                    "lastName": "Bee",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["detail"], "email already exists");

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "email": "a@b.io", "password": "nope" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_access_guard_errors() {
        let app = auth_router(fixtures::state());
        let tokens = register(&app, "a@b.io").await;

        let (status, body) = send(&app, request("GET", "/auth/me", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "authorization header is required");

        let req = Request::builder()
            .uri("/auth/me")
            .header(header::AUTHORIZATION, "Basic abc")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "unsupported authorization type");

        let (status, body) =
            send(&app, request("GET", "/auth/me", Some("v1.local.bogus"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "invalid access token");

        let refresh = tokens["refreshToken"].as_str().unwrap();
        let (status, body) = send(&app, request("GET", "/auth/me", Some(refresh), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "invalid token type");
    }

    #[tokio::test]
    async fn test_expired_access_token() {
        let state = fixtures::state();
        let user = fixtures::seed_user(&state, "a@b.io", UserRole::User, true).await;
        let expired = state
            .codec
            .mint(
                user.user_id,
                UserRole::User,
                crate::domain::value_object::token_kind::TokenKind::Access,
                chrono::Duration::seconds(-5),
            )
            .unwrap();
        let app = auth_router(state);

        let (status, body) = send(&app, request("GET", "/auth/me", Some(&expired), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "access token has expired");
    }

    #[tokio::test]
    async fn test_full_session_lifecycle() {
        let app = auth_router(fixtures::state());
        let registered = register(&app, "a@b.io").await;
        let access = registered["accessToken"].as_str().unwrap().to_string();
        let refresh = registered["refreshToken"].as_str().unwrap().to_string();

        let (status, me) = send(&app, request("GET", "/auth/me", Some(&access), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["user"]["id"], registered["user"]["id"]);
        assert_eq!(me["sessionActive"], true);

        let (status, rotated) = send(
            &app,
            request(
                "POST",
                "/auth/refresh",
                None,
                Some(json!({ "refreshToken": refresh })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(rotated["refreshToken"], refresh.as_str());

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/auth/refresh",
                None,
                Some(json!({ "refreshToken": refresh })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "invalid refresh token");

        let (status, _) = send(&app, request("POST", "/auth/logout", Some(&access), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/auth/refresh",
                None,
                Some(json!({ "refreshToken": rotated["refreshToken"] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "invalid refresh token");

        // Access token outlives the session
        let (status, me) = send(&app, request("GET", "/auth/me", Some(&access), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["sessionActive"], false);
    }

    #[tokio::test]
    async fn test_admin_route_role_guard() {
        let state = fixtures::state();
        fixtures::seed_user(&state, "root@b.io", UserRole::Admin, true).await;
        let app = auth_router(state.clone());

        let member = register(&app, "a@b.io").await;
        let member_access = member["accessToken"].as_str().unwrap().to_string();
        let member_id = member["user"]["id"].as_str().unwrap().to_string();
        let uri = format!("/auth/sessions/{member_id}");

        let (status, body) = send(&app, request("DELETE", &uri, Some(&member_access), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "insufficient permissions");

        let admin = login(&app, "root@b.io").await;
        assert_eq!(admin["user"]["role"], "ADMIN");
        let admin_access = admin["accessToken"].as_str().unwrap().to_string();

        let (status, _) = send(&app, request("DELETE", &uri, Some(&admin_access), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/auth/refresh",
                None,
                Some(json!({ "refreshToken": member["refreshToken"] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "invalid refresh token");

        let (status, _) = send(
            &app,
            request(
                "DELETE",
                "/auth/sessions/not-a-uuid",
                Some(&admin_access),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unknown = format!("/auth/sessions/{}", uuid::Uuid::new_v4());
        let (status, _) = send(&app, request("DELETE", &unknown, Some(&admin_access), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Admin-only route is still behind the access check
        let (status, _) = send(&app, request("DELETE", &uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
