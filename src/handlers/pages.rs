use axum::response::Html;

static INDEX_HTML: &str = include_str!("../web/index.html");
static PATIENT_LOGIN_HTML: &str = include_str!("../web/patient_login.html");
static DOCTOR_LOGIN_HTML: &str = include_str!("../web/doctor_login.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn patient_login_page() -> Html<&'static str> {
    Html(PATIENT_LOGIN_HTML)
}

pub async fn doctor_login_page() -> Html<&'static str> {
    Html(DOCTOR_LOGIN_HTML)
}
