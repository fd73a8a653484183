//! API token handling for the dashboard.
//!
//! The backend authenticates with a bearer token. The operator pastes it on
//! the login page and it is persisted to the configured token file, so every
//! browser talking to this dashboard shares it. Without a token every page
//! except `/login` and `/healthz` redirects to the login page.

use axum::{
    Form,
    extract::{Query, Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::api_types::{LoginForm, LoginQuery};
use crate::error::login_redirect;
use crate::state::AppState;
use crate::templates::html_escape;

/// Paths reachable without a token.
fn is_public(path: &str) -> bool {
    path == "/login" || path == "/healthz"
}

/// Redirects to the login page when no API token is stored.
pub async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_public(request.uri().path()) || state.tokens().is_set() {
        return next.run(request).await;
    }
    tracing::debug!(path = %request.uri().path(), "No API token, redirecting to login");
    login_redirect()
}

/// Handler for the login page (GET)
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    Html(login_page_template(query.error.as_deref()))
}

/// Handler for login form submission (POST)
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let token = form.token.trim();
    if token.is_empty() {
        return Redirect::to("/login?error=empty").into_response();
    }

    if let Err(e) = state.tokens().set(token) {
        tracing::warn!(error = %e, "Failed to persist API token");
        return Redirect::to("/login?error=storage").into_response();
    }
    // Cached results belong to whoever was logged in before.
    state.queries().cache().clear();
    tracing::info!("API token stored");
    Redirect::to("/").into_response()
}

/// Handler for logout
pub async fn logout(State(state): State<AppState>) -> Response {
    if let Err(e) = state.queries().logout() {
        tracing::warn!(error = %e, "Failed to remove persisted API token");
    }
    tracing::info!("Logged out");
    Redirect::to("/login").into_response()
}

fn error_message(code: &str) -> &'static str {
    match code {
        "empty" => "Informe o token de acesso.",
        "storage" => "Não foi possível salvar o token. Verifique as permissões do arquivo.",
        _ => "Não foi possível entrar. Tente novamente.",
    }
}

/// Generate the login page HTML
fn login_page_template(error: Option<&str>) -> String {
    let error_html = error
        .map(|code| {
            format!(
                r##"<div class="mb-6 p-4 bg-red-50 dark:bg-red-900/20 border border-red-200 dark:border-red-800 rounded-lg">
            <div class="flex items-center gap-3">
                <i class="fas fa-exclamation-circle text-red-500"></i>
                <span class="text-red-700 dark:text-red-400">{}</span>
            </div>
        </div>"##,
                html_escape(error_message(code))
            )
        })
        .unwrap_or_default();

    format!(
        r##"<!DOCTYPE html>
<html lang="pt-BR" x-data="{{
    darkMode: localStorage.getItem('darkMode') === 'true'
}}" :class="{{ 'dark': darkMode }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Entrar - OCR Dashboard</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <script>
        tailwind.config = {{
            darkMode: 'class',
            theme: {{
                extend: {{
                    colors: {{
                        primary: {{
                            50: '#eff6ff',
                            100: '#dbeafe',
                            200: '#bfdbfe',
                            300: '#93c5fd',
                            400: '#60a5fa',
                            500: '#3b82f6',
                            600: '#2563eb',
                            700: '#1d4ed8',
                            800: '#1e40af',
                            900: '#1e3a8a',
                        }}
                    }}
                }}
            }}
        }}
    </script>
    <script defer src="https://unpkg.com/alpinejs@3.x.x/dist/cdn.min.js"></script>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css">
</head>
<body class="bg-gradient-to-br from-primary-600 via-primary-700 to-primary-900 dark:from-gray-900 dark:via-gray-800 dark:to-gray-900 min-h-screen flex items-center justify-center p-4">
    <div class="absolute top-4 right-4">
        <button @click="darkMode = !darkMode; localStorage.setItem('darkMode', darkMode)"
                class="p-3 bg-white/10 hover:bg-white/20 rounded-full text-white transition-colors">
            <i class="fas" :class="darkMode ? 'fa-sun' : 'fa-moon'"></i>
        </button>
    </div>

    <div class="w-full max-w-md">
        <div class="text-center mb-8">
            <i class="fas fa-file-lines text-5xl text-white mb-4"></i>
            <h1 class="text-2xl font-bold text-white">OCR Dashboard</h1>
            <p class="text-primary-200 dark:text-gray-400">Processamento de documentos com IA</p>
        </div>

        <div class="bg-white dark:bg-gray-800 rounded-2xl shadow-2xl p-8">
            <div class="text-center mb-6">
                <h2 class="text-xl font-semibold text-gray-900 dark:text-white">Entrar</h2>
                <p class="text-gray-500 dark:text-gray-400 mt-1">Informe o token de acesso à API</p>
            </div>

            {error_html}

            <form method="POST" action="/login" class="space-y-5">
                <div>
                    <label for="token" class="block text-sm font-medium text-gray-700 dark:text-gray-300 mb-2">
                        Token de acesso
                    </label>
                    <div class="relative" x-data="{{ show: false }}">
                        <div class="absolute inset-y-0 left-0 pl-3 flex items-center pointer-events-none">
                            <i class="fas fa-key text-gray-400"></i>
                        </div>
                        <input :type="show ? 'text' : 'password'" type="password" id="token" name="token" required autofocus
                            class="block w-full pl-10 pr-12 py-3 border border-gray-300 dark:border-gray-600 rounded-lg
                                   bg-white dark:bg-gray-700 text-gray-900 dark:text-white
                                   focus:ring-2 focus:ring-primary-500 focus:border-primary-500 transition-colors"
                            placeholder="Cole o token aqui">
                        <button type="button" @click="show = !show"
                            class="absolute inset-y-0 right-0 pr-3 flex items-center text-gray-400 hover:text-gray-600 dark:hover:text-gray-300">
                            <i class="fas" :class="show ? 'fa-eye-slash' : 'fa-eye'"></i>
                        </button>
                    </div>
                </div>

                <button type="submit"
                    class="w-full py-3 px-4 bg-primary-600 hover:bg-primary-700 text-white font-medium rounded-lg
                           shadow-lg shadow-primary-500/30 transition-all duration-200">
                    <span class="flex items-center justify-center gap-2">
                        <i class="fas fa-sign-in-alt"></i>
                        Entrar
                    </span>
                </button>
            </form>
        </div>
    </div>
</body>
</html>"##
    )
}
