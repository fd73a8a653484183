//! HTML templates for the dashboard.
//!
//! Uses a simple template approach with Tailwind CSS and HTMX.

/// Sidebar entry highlighted as the current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Dashboard,
    Gallery,
    Document,
}

/// Base HTML layout wrapper.
pub fn layout(title: &str, active: NavItem, content: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="pt-BR" x-data="{{
    darkMode: localStorage.getItem('darkMode') === 'true',
    sidebarOpen: true
}}" :class="{{ 'dark': darkMode }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - OCR Dashboard</title>
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
                            500: '#3b82f6',
                            600: '#2563eb',
                            700: '#1d4ed8',
                            900: '#1e3a8a',
                        }}
                    }}
                }}
            }}
        }}
    </script>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script defer src="https://unpkg.com/alpinejs@3.x.x/dist/cdn.min.js"></script>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css">
    <style>
        [x-cloak] {{ display: none !important; }}
        .htmx-indicator {{ display: none; }}
        .htmx-request .htmx-indicator {{ display: inline-block; }}
        .htmx-request.htmx-indicator {{ display: inline-block; }}
    </style>
</head>
<body class="bg-gray-50 dark:bg-gray-900 min-h-screen">
    {NAV}

    <div class="flex">
        {SIDEBAR}

        <main class="flex-1 p-6 lg:p-8">
            <div class="max-w-7xl mx-auto">
                {content}
            </div>
        </main>
    </div>

    {TOAST}

    <script>
        document.body.addEventListener('htmx:afterSwap', function(evt) {{
            if (typeof Alpine !== 'undefined') {{
                Alpine.initTree(evt.detail.target);
            }}
        }});

        function showToast(message, type = 'success') {{
            const toast = document.getElementById('toast');
            const toastMessage = document.getElementById('toast-message');
            toastMessage.textContent = message;
            toast.className = toast.className.replace(/bg-\w+-500/, type === 'error' ? 'bg-red-500' : 'bg-green-500');
            toast.classList.remove('hidden');
            setTimeout(() => toast.classList.add('hidden'), 3000);
        }}
    </script>
</body>
</html>"##,
        title = html_escape(title),
        NAV = nav_template(),
        SIDEBAR = sidebar_template(active),
        TOAST = toast_template(),
    )
}

fn nav_template() -> &'static str {
    r##"<nav class="bg-primary-600 dark:bg-primary-900 text-white px-4 py-3 sticky top-0 z-50 shadow-lg">
        <div class="flex items-center justify-between">
            <div class="flex items-center gap-4">
                <button @click="sidebarOpen = !sidebarOpen" class="p-2 hover:bg-primary-700 rounded-lg lg:hidden">
                    <i class="fas fa-bars"></i>
                </button>
                <a href="/" class="flex items-center gap-2 font-semibold">
                    <i class="fas fa-file-lines"></i>
                    <span>OCR Dashboard</span>
                </a>
            </div>
            <div class="flex items-center gap-4">
                <div hx-get="/fragments/ai?compact=true" hx-trigger="load, every 30s" class="hidden md:flex items-center gap-2 text-sm"></div>
                <button @click="darkMode = !darkMode; localStorage.setItem('darkMode', darkMode)"
                        class="p-2 hover:bg-primary-700 rounded-lg">
                    <i class="fas" :class="darkMode ? 'fa-sun' : 'fa-moon'"></i>
                </button>
            </div>
        </div>
    </nav>"##
}

fn sidebar_link(href: &str, icon: &str, label: &str, active: bool) -> String {
    let state = if active {
        "bg-primary-50 dark:bg-primary-900/50 text-primary-600 dark:text-primary-400"
    } else {
        "text-gray-700 dark:text-gray-200"
    };
    format!(
        r##"<a href="{href}" class="flex items-center gap-3 px-4 py-3 {state} hover:bg-primary-50 dark:hover:bg-primary-900/50 rounded-lg transition-colors">
                    <i class="fas fa-{icon} w-5"></i>
                    <span>{label}</span>
                </a>"##
    )
}

fn sidebar_template(active: NavItem) -> String {
    format!(
        r##"<aside class="w-64 bg-white dark:bg-gray-800 border-r border-gray-200 dark:border-gray-700 min-h-[calc(100vh-56px)] transition-all duration-300"
              :class="{{ '-ml-64': !sidebarOpen }}"
              x-cloak>
            <nav class="p-4 space-y-2">
                {dashboard}
                {gallery}

                <div class="pt-4 pb-2 px-4 text-xs font-semibold text-gray-400 dark:text-gray-500 uppercase tracking-wider">
                    Conta
                </div>
                {logout}
            </nav>
        </aside>"##,
        dashboard = sidebar_link("/", "chart-line", "Painel", active == NavItem::Dashboard),
        gallery = sidebar_link("/gallery", "images", "Documentos", active != NavItem::Dashboard),
        logout = sidebar_link("/logout", "right-from-bracket", "Sair", false),
    )
}

fn toast_template() -> &'static str {
    r##"<div id="toast" class="hidden fixed bottom-4 right-4 bg-green-500 text-white px-6 py-3 rounded-lg shadow-lg z-50 transition-all">
        <span id="toast-message"></span>
    </div>"##
}

/// Card component.
pub fn card(title: &str, content: &str) -> String {
    format!(
        r##"<div class="bg-white dark:bg-gray-800 rounded-xl shadow-sm border border-gray-200 dark:border-gray-700 overflow-hidden">
            <div class="px-6 py-4 border-b border-gray-200 dark:border-gray-700">
                <h3 class="text-lg font-semibold text-gray-900 dark:text-white">{title}</h3>
            </div>
            <div class="p-6">
                {content}
            </div>
        </div>"##
    )
}

/// Stats card component.
pub fn stats_card(title: &str, value: &str, icon: &str, color: &str) -> String {
    format!(
        r##"<div class="bg-white dark:bg-gray-800 rounded-xl shadow-sm border border-gray-200 dark:border-gray-700 p-6">
            <div class="flex items-center justify-between">
                <div>
                    <p class="text-sm text-gray-500 dark:text-gray-400">{title}</p>
                    <p class="text-2xl font-bold text-gray-900 dark:text-white mt-1">{value}</p>
                </div>
                <div class="w-12 h-12 rounded-full bg-{color}-100 dark:bg-{color}-900/30 flex items-center justify-center">
                    <i class="fas fa-{icon} text-{color}-500 text-xl"></i>
                </div>
            </div>
        </div>"##
    )
}

/// Badge component.
pub fn badge(text: &str, color: &str) -> String {
    format!(
        r##"<span class="inline-flex items-center px-2.5 py-0.5 rounded-full text-xs font-medium bg-{color}-100 dark:bg-{color}-900/30 text-{color}-800 dark:text-{color}-300">{text}</span>"##,
        text = html_escape(text),
    )
}

/// Small POST form rendered as a single button.
///
/// `confirm` adds a browser confirmation before the request is sent. Only the
/// HTMX request carries `confirmed=true`; a plain form post lands on the
/// server-side confirmation page instead.
pub fn action_button(action: &str, label: &str, icon: &str, variant: &str, confirm: Option<&str>) -> String {
    let classes = match variant {
        "primary" => "bg-primary-600 hover:bg-primary-700 text-white",
        "danger" => "bg-red-600 hover:bg-red-700 text-white",
        "success" => "bg-green-600 hover:bg-green-700 text-white",
        _ => "bg-gray-200 dark:bg-gray-700 hover:bg-gray-300 dark:hover:bg-gray-600 text-gray-700 dark:text-gray-200",
    };
    let confirm_attrs = match confirm {
        Some(question) => format!(
            r#" hx-confirm="{}" hx-vals='{{"confirmed": "true"}}'"#,
            html_escape(question)
        ),
        None => String::new(),
    };
    format!(
        r##"<form method="POST" action="{action}" hx-post="{action}"{confirm_attrs} class="inline">
            <button type="submit" class="{classes} px-3 py-1.5 rounded-lg text-sm font-medium transition-colors disabled:opacity-50 inline-flex items-center gap-1">
                <i class="fas fa-{icon}"></i> {label}
            </button>
        </form>"##
    )
}

/// Empty state component.
pub fn empty_state(icon: &str, title: &str, description: &str, action: Option<(&str, &str)>) -> String {
    let action_html = action.map_or(String::new(), |(text, href)| {
        format!(r##"<a href="{href}" class="mt-4 inline-flex items-center gap-2 bg-primary-600 hover:bg-primary-700 text-white px-4 py-2 rounded-lg font-medium transition-colors">
            {text}
        </a>"##)
    });

    format!(
        r##"<div class="text-center py-12">
            <i class="fas fa-{icon} text-4xl text-gray-400 dark:text-gray-600 mb-4"></i>
            <h3 class="text-lg font-medium text-gray-900 dark:text-white">{title}</h3>
            <p class="mt-1 text-gray-500 dark:text-gray-400">{description}</p>
            {action_html}
        </div>"##
    )
}

/// Static error block shown in place of a component that failed to load.
pub fn error_block(message: &str) -> String {
    format!(
        r##"<div class="p-4 bg-red-50 dark:bg-red-900/20 border border-red-200 dark:border-red-800 rounded-lg">
            <div class="flex items-center gap-3">
                <i class="fas fa-exclamation-circle text-red-500"></i>
                <span class="text-red-700 dark:text-red-400">{message}</span>
            </div>
        </div>"##
    )
}

/// Dismissable informational notice.
pub fn notice(message: &str) -> String {
    format!(
        r##"<div x-data="{{ open: true }}" x-show="open" class="mb-6 p-4 bg-blue-50 dark:bg-blue-900/20 border border-blue-200 dark:border-blue-800 rounded-lg flex items-center justify-between">
            <span class="text-blue-700 dark:text-blue-300"><i class="fas fa-info-circle mr-2"></i>{message}</span>
            <button @click="open = false" class="text-blue-500 hover:text-blue-700"><i class="fas fa-xmark"></i></button>
        </div>"##,
        message = html_escape(message),
    )
}

/// Tab bar whose entries are plain links, so the selected tab survives reloads.
pub fn tab_links(tabs: &[(&str, &str, &str)], active: &str) -> String {
    let links: String = tabs
        .iter()
        .map(|(key, label, icon)| {
            let state = if *key == active {
                "border-primary-600 text-primary-600 dark:text-primary-400"
            } else {
                "border-transparent text-gray-500 hover:text-gray-700 hover:border-gray-300"
            };
            format!(
                r##"<a href="/?tab={key}" class="px-4 py-2 border-b-2 font-medium text-sm transition-colors {state}">
                    <i class="fas fa-{icon} mr-1"></i> {label}
                </a>"##
            )
        })
        .collect();

    format!(
        r##"<div class="border-b border-gray-200 dark:border-gray-700 mb-6">
            <nav class="flex gap-2">
                {links}
            </nav>
        </div>"##
    )
}

/// Escape text for HTML content and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
