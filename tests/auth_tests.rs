use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use filewriter::api::AppState;
use filewriter::config::Config;
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Drives the page routes like a browser: one cookie jar, no redirect following.
struct Browser {
    router: Router,
    state: Arc<AppState>,
    cookie: Option<String>,
    _root: TempDir,
}

struct Page {
    status: StatusCode,
    location: Option<String>,
    set_cookie: Option<String>,
    body: String,
}

impl Browser {
    async fn new() -> Self {
        let root = tempfile::tempdir().unwrap();

        let mut config = Config::default();
        config.database.url = "sqlite::memory:".to_string();
        config.files.root = root.path().to_string_lossy().into_owned();
        config.security.api_key = Some("test-api-key".to_string());
        config.security.session_secret = Some("test-session-secret".to_string());

        let state = filewriter::api::create_app_state_from_config(config)
            .await
            .expect("Failed to create app state");
        let router = filewriter::api::router(state.clone());

        Self {
            router,
            state,
            cookie: None,
            _root: root,
        }
    }

    async fn send(&mut self, mut request: Request<Body>) -> Page {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response: Response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());

        if let Some(set_cookie) = &set_cookie {
            let pair = set_cookie.split(';').next().unwrap_or_default();
            let removed = set_cookie.contains("Max-Age=0") || pair.ends_with('=');
            self.cookie = if removed {
                None
            } else {
                Some(pair.to_string())
            };
        }

        let body = response.into_body().collect().await.unwrap().to_bytes();
        Page {
            status,
            location,
            set_cookie,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }

    async fn get(&mut self, uri: &str) -> Page {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Page {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    async fn register(&mut self, username: &str, email: &str, password: &str) -> Page {
        self.post_form(
            "/auth/register",
            &[
                ("username", username),
                ("email", email),
                ("password", password),
                ("confirm_password", password),
            ],
        )
        .await
    }

    async fn login(&mut self, email: &str, password: &str) -> Page {
        self.post_form("/auth/login", &[("email", email), ("password", password)])
            .await
    }
}

#[tokio::test]
async fn test_register_then_login_reaches_dashboard() {
    let mut browser = Browser::new().await;

    let page = browser.register("amaru", "amaru@example.com", "pw-123").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/auth/login"));

    let page = browser.get("/auth/login").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Registration successful!"));

    let page = browser.login("amaru@example.com", "pw-123").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/"));

    let page = browser.get("/dashboard").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Signed in as amaru"));
    assert!(page.body.contains("Login successful!"));

    let page = browser.get("/").await;
    assert!(page.body.contains("Welcome back, amaru"));

    let page = browser.get("/auth/login").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected_without_new_row() {
    let mut browser = Browser::new().await;

    browser.register("amaru", "amaru@example.com", "pw").await;
    assert_eq!(browser.state.store().count_users().await.unwrap(), 1);

    let page = browser.register("someone", "amaru@example.com", "pw").await;
    assert_eq!(page.status, StatusCode::CONFLICT);
    assert!(page.body.contains("Username or email already exists"));

    let page = browser.register("amaru", "other@example.com", "pw").await;
    assert_eq!(page.status, StatusCode::CONFLICT);

    assert_eq!(browser.state.store().count_users().await.unwrap(), 1);
    let user = browser
        .state
        .store()
        .get_user_by_email("amaru@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.username, "amaru");
}

#[tokio::test]
async fn test_registration_validation() {
    let mut browser = Browser::new().await;

    let page = browser
        .post_form(
            "/auth/register",
            &[
                ("username", "amaru"),
                ("email", "amaru@example.com"),
                ("password", "one"),
                ("confirm_password", "two"),
            ],
        )
        .await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);
    assert!(page.body.contains("Passwords do not match"));
    assert!(page.body.contains("value=\"amaru@example.com\""));

    let page = browser
        .post_form("/auth/register", &[("username", "amaru")])
        .await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);
    assert!(page.body.contains("All fields are required"));

    assert_eq!(browser.state.store().count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn test_wrong_password_leaves_session_unauthenticated() {
    let mut browser = Browser::new().await;
    browser.register("amaru", "amaru@example.com", "right").await;

    let page = browser.login("amaru@example.com", "wrong").await;
    assert_eq!(page.status, StatusCode::FORBIDDEN);
    assert!(page.body.contains("Invalid email or password"));

    let page = browser.login("nobody@example.com", "right").await;
    assert_eq!(page.status, StatusCode::FORBIDDEN);

    let page = browser.get("/dashboard").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(
        page.location.as_deref(),
        Some("/auth/login?next=%2Fdashboard")
    );
}

#[tokio::test]
async fn test_inactive_account_cannot_log_in() {
    let mut browser = Browser::new().await;
    browser.register("amaru", "amaru@example.com", "pw").await;
    assert!(
        browser
            .state
            .store()
            .set_user_active("amaru@example.com", false)
            .await
            .unwrap()
    );

    let page = browser.login("amaru@example.com", "pw").await;
    assert_eq!(page.status, StatusCode::FORBIDDEN);
    assert!(page.body.contains("Your account is inactive"));
}

#[tokio::test]
async fn test_deactivation_ends_existing_session() {
    let mut browser = Browser::new().await;
    browser.register("amaru", "amaru@example.com", "pw").await;
    browser.login("amaru@example.com", "pw").await;
    assert_eq!(browser.get("/auth/profile").await.status, StatusCode::OK);

    browser
        .state
        .store()
        .set_user_active("amaru@example.com", false)
        .await
        .unwrap();

    let page = browser.get("/auth/profile").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_follows_only_local_next() {
    let mut browser = Browser::new().await;
    browser.register("amaru", "amaru@example.com", "pw").await;

    let page = browser.get("/auth/profile").await;
    assert_eq!(
        page.location.as_deref(),
        Some("/auth/login?next=%2Fauth%2Fprofile")
    );

    let page = browser
        .post_form(
            "/auth/login?next=%2Fauth%2Fprofile",
            &[("email", "amaru@example.com"), ("password", "pw")],
        )
        .await;
    assert_eq!(page.location.as_deref(), Some("/auth/profile"));

    browser.get("/auth/logout").await;

    let page = browser
        .post_form(
            "/auth/login?next=%2F%2Fevil.example",
            &[("email", "amaru@example.com"), ("password", "pw")],
        )
        .await;
    assert_eq!(page.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_remember_me_extends_cookie_lifetime() {
    let mut browser = Browser::new().await;
    browser.register("amaru", "amaru@example.com", "pw").await;

    let page = browser
        .post_form(
            "/auth/login",
            &[
                ("email", "amaru@example.com"),
                ("password", "pw"),
                ("remember", "1"),
            ],
        )
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    let cookie = page.set_cookie.unwrap();
    assert!(cookie.contains("filewriter_session="));
    assert!(cookie.contains("Max-Age=2592000"));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let mut browser = Browser::new().await;
    browser.register("amaru", "amaru@example.com", "pw").await;
    browser.login("amaru@example.com", "pw").await;

    let page = browser.get("/auth/logout").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/"));

    let page = browser.get("/").await;
    assert!(page.body.contains("You have been logged out."));
    assert!(!page.body.contains("Welcome back"));

    let page = browser.get("/dashboard").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);

    let page = browser.get("/auth/logout").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_change_password() {
    let mut browser = Browser::new().await;
    browser.register("amaru", "amaru@example.com", "old-pw").await;
    browser.login("amaru@example.com", "old-pw").await;

    let page = browser
        .post_form(
            "/auth/change_password",
            &[
                ("current_password", "not-it"),
                ("new_password", "new-pw"),
                ("confirm_password", "new-pw"),
            ],
        )
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/auth/profile"));
    let page = browser.get("/auth/profile").await;
    assert!(page.body.contains("Current password is incorrect"));

    browser
        .post_form(
            "/auth/change_password",
            &[
                ("current_password", "old-pw"),
                ("new_password", "new-pw"),
                ("confirm_password", "different"),
            ],
        )
        .await;
    let page = browser.get("/auth/profile").await;
    assert!(page.body.contains("New passwords do not match"));

    browser
        .post_form(
            "/auth/change_password",
            &[
                ("current_password", "old-pw"),
                ("new_password", "new-pw"),
                ("confirm_password", "new-pw"),
            ],
        )
        .await;
    let page = browser.get("/auth/profile").await;
    assert!(page.body.contains("Password changed successfully"));

    browser.get("/auth/logout").await;
    assert_eq!(
        browser.login("amaru@example.com", "old-pw").await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        browser.login("amaru@example.com", "new-pw").await.status,
        StatusCode::SEE_OTHER
    );
}

#[tokio::test]
async fn test_change_password_requires_login() {
    let mut browser = Browser::new().await;

    let page = browser
        .post_form(
            "/auth/change_password",
            &[
                ("current_password", "a"),
                ("new_password", "b"),
                ("confirm_password", "b"),
            ],
        )
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert!(page.location.unwrap().starts_with("/auth/login"));
}
