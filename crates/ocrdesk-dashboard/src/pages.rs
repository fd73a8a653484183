//! Page templates for dashboard views.
//!
//! Every function here is a pure rendering of query results plus UI state.
//! `None` in place of a result means the query failed, and the component
//! shows its static error block instead.

use crate::api_types::Tab;
use crate::templates::{
    NavItem, action_button, badge, card, empty_state, error_block, html_escape, layout, notice,
    stats_card, tab_links,
};
use ocrdesk_client::{ApiClient, AssetKind};
use ocrdesk_core::format::{
    ConfidenceScale, Pagination, format_date_short, format_datetime_long,
    format_file_size, format_gallery_confidence, format_list_confidence, format_optional_size,
    status_color, status_label,
};
use ocrdesk_core::{
    AcceptPolicy, AiCorrection, AiModel, AiStatus, Document, DocumentId, ModelStatus, Page,
    Statistics, UploadProgress, UploadStatus,
};

const DELETE_QUESTION: &str = "Tem certeza que deseja excluir este documento?";

/// Event that makes document lists on screen reload.
pub const DOCUMENTS_CHANGED: &str = "documents-changed";

fn document_path(id: &DocumentId) -> String {
    format!("/documents/{}", urlencoding::encode(id.as_str()))
}

fn section(title: &str, content: &str) -> String {
    format!(
        r##"<section>
            <h2 class="text-lg font-medium text-gray-900 dark:text-white mb-6">{title}</h2>
            {content}
        </section>"##
    )
}

// =============================================================================
// Dashboard shell
// =============================================================================

/// Body of each dashboard tab, rendered by the handler.
pub struct TabContent {
    pub statistics: Option<String>,
    pub documents: Option<String>,
    pub upload: Option<String>,
    pub ai: Option<String>,
}

pub fn dashboard_page(tab: Tab, selected: Option<&Document>, content: TabContent) -> String {
    let tabs: Vec<(&str, &str, &str)> = Tab::ALL
        .iter()
        .map(|t| (t.key(), t.label(), t.icon()))
        .collect();

    let notice_html = selected
        .map(|doc| notice(&format!("Documento selecionado: {}", doc.filename)))
        .unwrap_or_default();

    let body = match tab {
        Tab::Overview => format!(
            r##"<div class="space-y-8">
                {stats}
                {ai}
                <div class="max-w-4xl">{recent}</div>
            </div>"##,
            stats = section("Estatísticas Gerais", content.statistics.as_deref().unwrap_or_default()),
            ai = section("Inteligência Artificial", content.ai.as_deref().unwrap_or_default()),
            recent = section("Documentos Recentes", content.documents.as_deref().unwrap_or_default()),
        ),
        Tab::Documents => section("Todos os Documentos", content.documents.as_deref().unwrap_or_default()),
        Tab::Upload => format!(
            r##"<div class="max-w-2xl">{}</div>"##,
            section("Upload de Documentos", content.upload.as_deref().unwrap_or_default())
        ),
    };

    let page = format!(
        r##"<div class="mb-8">
            <h1 class="text-3xl font-bold text-gray-900 dark:text-white">OCR de Documentos</h1>
            <p class="text-gray-500 dark:text-gray-400 mt-1">Envie documentos digitalizados, processe OCR e acompanhe as correções da IA</p>
        </div>
        {notice_html}
        {tabs}
        {body}"##,
        tabs = tab_links(&tabs, tab.key()),
    );

    layout(tab.label(), NavItem::Dashboard, &page)
}

// =============================================================================
// Statistics
// =============================================================================

/// One of the fixed statistics cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub icon: &'static str,
    pub color: &'static str,
}

/// The six statistics cards, in display order.
pub fn statistic_cards(stats: &Statistics) -> [StatCard; 6] {
    let card = |title, value: String, icon, color| StatCard {
        title,
        value,
        icon,
        color,
    };
    [
        card("Total de Documentos", stats.total_documents.to_string(), "file-lines", "blue"),
        card("Documentos Processados", stats.processed_documents.to_string(), "circle-check", "green"),
        card("Documentos Hoje", stats.documents_today.to_string(), "clock", "yellow"),
        card(
            "Confiança Média",
            ConfidenceScale::Fraction.format(stats.average_confidence),
            "arrow-trend-up",
            "purple",
        ),
        card("Total de Correções", stats.total_corrections.to_string(), "bullseye", "indigo"),
        card(
            "Precisão da IA",
            ConfidenceScale::Fraction.format(stats.ai_accuracy),
            "brain",
            "pink",
        ),
    ]
}

pub fn statistics_fragment(stats: Option<&Statistics>, refresh_secs: u64) -> String {
    let inner = match stats {
        Some(stats) => {
            let cards: String = statistic_cards(stats)
                .iter()
                .map(|c| stats_card(c.title, &c.value, c.icon, c.color))
                .collect();
            format!(r##"<div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-6">{cards}</div>"##)
        }
        None => error_block("Erro ao carregar estatísticas."),
    };
    format!(
        r##"<div id="statistics" hx-get="/fragments/statistics" hx-trigger="every {refresh_secs}s" hx-swap="outerHTML">
            {inner}
        </div>"##
    )
}

// =============================================================================
// Document list
// =============================================================================

fn document_row(doc: &Document) -> String {
    let path = document_path(&doc.id);
    let delete = action_button(
        &format!("{path}/delete"),
        "Excluir",
        "trash",
        "danger",
        Some(DELETE_QUESTION),
    );
    format!(
        r##"<div class="bg-white dark:bg-gray-800 rounded-xl shadow-sm border border-gray-200 dark:border-gray-700 p-4 hover:shadow-md transition-shadow">
            <div class="flex items-center justify-between">
                <div class="flex items-center gap-4 flex-1 min-w-0">
                    <i class="fas fa-file text-2xl text-gray-400"></i>
                    <div class="flex-1 min-w-0">
                        <div class="flex items-center gap-2 mb-1">
                            <a href="{path}" class="text-sm font-medium text-gray-900 dark:text-white truncate hover:text-primary-600">{filename}</a>
                            {status}
                        </div>
                        <div class="flex items-center gap-4 text-xs text-gray-500 dark:text-gray-400">
                            <span><i class="fas fa-calendar mr-1"></i>{date}</span>
                            <span>{size}</span>
                            <span><i class="fas fa-clock mr-1"></i>Confiança: {confidence}</span>
                        </div>
                    </div>
                </div>
                <div class="flex items-center gap-2">
                    <a href="/?tab=documents&selected={id}" title="Visualizar documento"
                       class="p-2 text-gray-400 hover:text-primary-600 hover:bg-primary-50 rounded-lg transition-colors">
                        <i class="fas fa-eye"></i>
                    </a>
                    {delete}
                </div>
            </div>
        </div>"##,
        filename = html_escape(&doc.filename),
        status = badge(status_label(&doc.status), status_color(&doc.status)),
        date = format_date_short(doc.created_or_uploaded()),
        size = format_optional_size(doc.file_size),
        confidence = format_list_confidence(doc.confidence_score),
        id = urlencoding::encode(doc.id.as_str()),
    )
}

fn page_link(label: &str, target: Option<u32>) -> String {
    match target {
        Some(page) => format!(
            r##"<a href="/?tab=documents&page={page}" hx-get="/fragments/documents?page={page}" hx-target="#document-list" hx-swap="outerHTML"
                   class="bg-gray-200 dark:bg-gray-700 hover:bg-gray-300 dark:hover:bg-gray-600 text-gray-700 dark:text-gray-200 px-4 py-2 rounded-lg text-sm font-medium">{label}</a>"##
        ),
        None => format!(
            r##"<button disabled class="bg-gray-200 dark:bg-gray-700 text-gray-700 dark:text-gray-200 px-4 py-2 rounded-lg text-sm font-medium opacity-50 cursor-not-allowed">{label}</button>"##
        ),
    }
}

fn pagination_controls(pagination: &Pagination) -> String {
    if !pagination.is_visible() {
        return String::new();
    }
    let previous = page_link(
        "Anterior",
        pagination.has_previous().then(|| pagination.page - 1),
    );
    let next = page_link("Próxima", pagination.has_next().then(|| pagination.page + 1));
    format!(
        r##"<div class="flex items-center justify-between mt-4">
            <div class="text-sm text-gray-700 dark:text-gray-300">{summary}</div>
            <div class="flex items-center gap-2">
                {previous}
                <span class="text-sm text-gray-700 dark:text-gray-300">Página {page} de {total_pages}</span>
                {next}
            </div>
        </div>"##,
        summary = pagination.summary(),
        page = pagination.page,
        total_pages = pagination.total_pages,
    )
}

/// Paginated document list. `page` is `None` when the listing failed.
pub fn document_list_fragment(page: Option<&Page<Document>>, current_page: u32) -> String {
    let inner = match page {
        None => error_block("Erro ao carregar documentos. Tente novamente."),
        Some(page) if page.is_empty() => empty_state(
            "file",
            "Nenhum documento encontrado",
            "Faça upload de documentos para começar a análise.",
            Some(("Enviar documentos", "/?tab=upload")),
        ),
        Some(page) => {
            let rows: String = page.items.iter().map(document_row).collect();
            let pagination = Pagination::new(page.page, page.per_page, page.total, page.total_pages);
            format!(
                r##"<div class="space-y-3">{rows}</div>
                {controls}"##,
                controls = pagination_controls(&pagination),
            )
        }
    };
    format!(
        r##"<div id="document-list" hx-get="/fragments/documents?page={current_page}" hx-trigger="{DOCUMENTS_CHANGED} from:body" hx-swap="outerHTML">
            {inner}
        </div>"##
    )
}

// =============================================================================
// Gallery
// =============================================================================

fn image_preview(label: &str, src: &str) -> String {
    format!(
        r##"<div class="flex flex-col items-center gap-2">
            <span class="text-xs text-gray-500">{label}</span>
            <img src="{src}" alt="{label}" class="w-40 h-auto border rounded shadow" onerror="this.style.display='none'">
        </div>"##,
        src = html_escape(src),
    )
}

fn gallery_item(doc: &Document, client: &ApiClient, process_pending: bool) -> String {
    let path = document_path(&doc.id);
    let process = if doc.status.is_processable() {
        let label = if process_pending { "Processando..." } else { "Processar OCR" };
        action_button(&format!("{path}/process"), label, "play", "primary", None)
    } else {
        String::new()
    };
    let delete = action_button(&format!("{path}/delete"), "Excluir", "trash", "danger", Some(DELETE_QUESTION));
    let text = doc
        .original_text
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("Nenhum texto extraído.");

    format!(
        r##"<div class="bg-white dark:bg-gray-800 rounded-xl shadow-sm border border-gray-200 dark:border-gray-700 p-4 flex flex-col md:flex-row gap-4 items-start md:items-center">
            {original}
            {preprocessed}
            <div class="flex-1 space-y-2 text-sm text-gray-700 dark:text-gray-300">
                <div><span class="font-semibold">Arquivo:</span> <a href="{path}" class="hover:text-primary-600">{filename}</a></div>
                <div><span class="font-semibold">Status:</span> {status}</div>
                <div><span class="font-semibold">Data de Upload:</span> {uploaded}</div>
                <div><span class="font-semibold">Confiança:</span> {confidence}</div>
                <div>
                    <span class="font-semibold">Texto OCR:</span>
                    <div class="bg-gray-100 dark:bg-gray-900 rounded p-2 mt-1 text-xs max-h-32 overflow-auto whitespace-pre-line">{text}</div>
                </div>
                <div class="flex gap-2 pt-2">{process}{delete}</div>
            </div>
        </div>"##,
        original = image_preview("Original", &client.asset_url(AssetKind::Original, &doc.filename)),
        preprocessed = image_preview(
            "Pré-processada",
            &client.asset_url(AssetKind::Preprocessed, &doc.filename)
        ),
        filename = html_escape(&doc.filename),
        status = html_escape(doc.status.as_str()),
        uploaded = format_datetime_long(doc.upload_date.as_deref()),
        confidence = format_gallery_confidence(doc.confidence_score),
        text = html_escape(text),
    )
}

/// Document gallery with images and OCR text. `docs` is `None` when the listing failed.
pub fn gallery_page(docs: Option<&Page<Document>>, client: &ApiClient, process_pending: bool) -> String {
    let content = match docs {
        None => error_block("Erro ao carregar documentos."),
        Some(page) if page.is_empty() => empty_state(
            "images",
            "Nenhum documento encontrado.",
            "",
            Some(("Enviar documentos", "/?tab=upload")),
        ),
        Some(page) => {
            let items: String = page
                .items
                .iter()
                .map(|doc| gallery_item(doc, client, process_pending))
                .collect();
            format!(r##"<div class="space-y-6">{items}</div>"##)
        }
    };

    let page = format!(
        r##"<div class="mb-8">
            <h1 class="text-3xl font-bold text-gray-900 dark:text-white">Documentos</h1>
            <p class="text-gray-500 dark:text-gray-400 mt-1">Imagens originais, pré-processadas e texto extraído</p>
        </div>
        {content}"##
    );
    layout("Documentos", NavItem::Gallery, &page)
}

// =============================================================================
// Upload
// =============================================================================

pub fn upload_panel(accept: &AcceptPolicy, uploads: &[UploadProgress]) -> String {
    format!(
        r##"<div class="space-y-4">
            <form method="POST" action="/uploads" enctype="multipart/form-data"
                  hx-post="/uploads" hx-encoding="multipart/form-data" hx-target="#upload-progress" hx-swap="outerHTML"
                  class="border-2 border-dashed border-gray-300 dark:border-gray-600 hover:border-primary-500 rounded-lg p-8 text-center transition-colors">
                <i class="fas fa-cloud-arrow-up text-4xl text-gray-400 mb-4"></i>
                <p class="text-lg font-medium text-gray-900 dark:text-white mb-2">Selecione os arquivos para enviar</p>
                <input type="file" name="files" multiple required accept="{accept_attr}"
                       class="block mx-auto text-sm text-gray-500 file:mr-4 file:py-2 file:px-4 file:rounded-lg file:border-0 file:bg-primary-50 file:text-primary-700">
                <p class="text-xs text-gray-400 mt-2">Formatos suportados: {hint}</p>
                <p class="text-xs text-gray-400">Tamanho máximo: {max}</p>
                <button type="submit" class="mt-4 bg-primary-600 hover:bg-primary-700 text-white px-4 py-2 rounded-lg font-medium transition-colors">
                    <i class="fas fa-upload mr-1"></i> Enviar
                    <span class="htmx-indicator"><i class="fas fa-spinner fa-spin ml-1"></i></span>
                </button>
            </form>
            {progress}
        </div>"##,
        accept_attr = accept.accept_attribute(),
        hint = accept.supported_hint(),
        max = format_file_size(accept.max_file_bytes()),
        progress = uploads_fragment(uploads),
    )
}

fn upload_entry(entry: &UploadProgress) -> String {
    let icon = match entry.status {
        UploadStatus::Completed => r#"<i class="fas fa-circle-check text-green-500"></i>"#,
        UploadStatus::Error => r#"<i class="fas fa-circle-exclamation text-red-500"></i>"#,
        UploadStatus::Processing => r#"<i class="fas fa-spinner fa-spin text-primary-500"></i>"#,
        UploadStatus::Uploading => "",
    };
    let detail = match entry.status {
        UploadStatus::Uploading => format!(
            r##"<div class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2">
                <div class="bg-primary-600 h-2 rounded-full transition-all" style="width: {progress}%"></div>
            </div>"##,
            progress = entry.progress
        ),
        UploadStatus::Processing => {
            r#"<p class="text-xs text-gray-500 mt-1">Processando...</p>"#.to_string()
        }
        UploadStatus::Error => format!(
            r#"<p class="text-xs text-red-600 mt-1">{}</p>"#,
            html_escape(entry.error.as_deref().unwrap_or("Erro ao enviar arquivo."))
        ),
        UploadStatus::Completed => String::new(),
    };

    format!(
        r##"<div class="bg-white dark:bg-gray-800 rounded-lg border border-gray-200 dark:border-gray-700 p-4">
            <div class="flex items-center justify-between mb-2">
                <div class="flex items-center gap-3">
                    <i class="fas fa-file text-gray-400"></i>
                    <div>
                        <p class="text-sm font-medium text-gray-900 dark:text-white">{name}</p>
                        <p class="text-xs text-gray-500">{size}</p>
                    </div>
                </div>
                <div class="flex items-center gap-2">
                    {icon}
                    <form method="POST" action="/uploads/{id}/dismiss" hx-post="/uploads/{id}/dismiss" hx-target="#upload-progress" hx-swap="outerHTML">
                        <button type="submit" title="Remover" class="text-gray-400 hover:text-gray-600"><i class="fas fa-xmark"></i></button>
                    </form>
                </div>
            </div>
            {detail}
        </div>"##,
        name = html_escape(&entry.file_name),
        size = format_file_size(entry.file_size),
        id = entry.id,
    )
}

/// Upload progress list. Polls itself while any entry is unfinished.
pub fn uploads_fragment(entries: &[UploadProgress]) -> String {
    let polling = if entries.iter().any(|e| !e.status.is_finished()) {
        r#" hx-get="/fragments/uploads" hx-trigger="every 1s" hx-swap="outerHTML""#
    } else {
        ""
    };
    if entries.is_empty() {
        return format!(r#"<div id="upload-progress"{polling}></div>"#);
    }
    let items: String = entries.iter().map(upload_entry).collect();
    format!(
        r##"<div id="upload-progress"{polling} class="space-y-3">
            <h3 class="text-sm font-medium text-gray-900 dark:text-white">Progresso do Envio</h3>
            {items}
        </div>"##
    )
}

// =============================================================================
// AI
// =============================================================================

/// Model card and live status. `None` values failed to load.
pub fn ai_fragment(model: Option<&AiModel>, status: Option<&AiStatus>, train_pending: bool, compact: bool) -> String {
    if compact {
        return match status {
            Some(s) => format!(
                r##"<span class="flex items-center gap-1"><span class="w-2 h-2 bg-green-400 rounded-full animate-pulse"></span>IA: {} · {}</span>"##,
                html_escape(&s.status),
                ConfidenceScale::Fraction.format(s.accuracy),
            ),
            None => r##"<span class="flex items-center gap-1"><span class="w-2 h-2 bg-red-400 rounded-full"></span>IA indisponível</span>"##.to_string(),
        };
    }

    let model_html = match model {
        Some(m) => {
            let training = train_pending || m.status == ModelStatus::Training;
            let train = if training {
                r##"<button disabled class="bg-primary-600 text-white px-3 py-1.5 rounded-lg text-sm font-medium opacity-50 cursor-not-allowed"><i class="fas fa-spinner fa-spin"></i> Treinando...</button>"##.to_string()
            } else {
                action_button("/ai/train", "Treinar modelo", "brain", "primary", None)
            };
            format!(
                r##"<dl class="grid grid-cols-2 gap-4 text-sm">
                    <div><dt class="text-gray-500">Modelo</dt><dd class="font-medium text-gray-900 dark:text-white">{name}</dd></div>
                    <div><dt class="text-gray-500">Versão</dt><dd class="font-medium text-gray-900 dark:text-white">{version}</dd></div>
                    <div><dt class="text-gray-500">Status</dt><dd>{status}</dd></div>
                    <div><dt class="text-gray-500">Precisão</dt><dd class="font-medium text-gray-900 dark:text-white">{accuracy}</dd></div>
                    <div><dt class="text-gray-500">Último treino</dt><dd class="font-medium text-gray-900 dark:text-white">{trained}</dd></div>
                    <div><dt class="text-gray-500">Dados de treino</dt><dd class="font-medium text-gray-900 dark:text-white">{size}</dd></div>
                </dl>
                <div class="mt-4">{train}</div>"##,
                name = html_escape(&m.name),
                version = html_escape(&m.version),
                status = badge(m.status.label(), m.status.color()),
                accuracy = ConfidenceScale::Fraction.format(m.accuracy),
                trained = format_datetime_long(Some(&m.last_trained)),
                size = m.training_data_size,
            )
        }
        None => error_block("Erro ao carregar o modelo de IA."),
    };

    let status_html = match status {
        Some(s) => format!(
            r##"<p class="text-sm text-gray-500 dark:text-gray-400 mt-4">Status atual: <span class="font-medium">{}</span> · precisão {}</p>"##,
            html_escape(&s.status),
            ConfidenceScale::Fraction.format(s.accuracy),
        ),
        None => String::new(),
    };

    format!(
        r##"<div id="ai-panel" hx-get="/fragments/ai" hx-trigger="every 30s" hx-swap="outerHTML">
            {card}
        </div>"##,
        card = card("Modelo de IA", &format!("{model_html}{status_html}")),
    )
}

// =============================================================================
// Document detail
// =============================================================================

fn correction_block(record: &AiCorrection) -> String {
    let invalid: Vec<_> = record.invalid_edits().into_iter().map(|(c, _)| c.id.clone()).collect();
    let rows: String = record
        .corrections
        .iter()
        .map(|c| {
            let position = if invalid.contains(&c.id) {
                badge("posição inválida", "red")
            } else {
                format!("{}–{}", c.position.start(), c.position.end())
            };
            format!(
                r##"<tr class="hover:bg-gray-50 dark:hover:bg-gray-700/50">
                    <td class="px-4 py-2">{kind}</td>
                    <td class="px-4 py-2 line-through text-red-600">{original}</td>
                    <td class="px-4 py-2 text-green-700">{corrected}</td>
                    <td class="px-4 py-2">{position}</td>
                    <td class="px-4 py-2">{confidence}</td>
                </tr>"##,
                kind = c.kind.label(),
                original = html_escape(&c.original),
                corrected = html_escape(&c.corrected),
                confidence = ConfidenceScale::Fraction.format(c.confidence),
            )
        })
        .collect();

    let edits = if record.corrections.is_empty() {
        r#"<p class="text-sm text-gray-500">Nenhuma alteração sugerida.</p>"#.to_string()
    } else {
        format!(
            r##"<div class="overflow-x-auto">
                <table class="min-w-full text-sm divide-y divide-gray-200 dark:divide-gray-700">
                    <thead><tr class="text-left text-xs text-gray-500 uppercase">
                        <th class="px-4 py-2">Tipo</th><th class="px-4 py-2">Original</th><th class="px-4 py-2">Corrigido</th><th class="px-4 py-2">Posição</th><th class="px-4 py-2">Confiança</th>
                    </tr></thead>
                    <tbody class="divide-y divide-gray-200 dark:divide-gray-700">{rows}</tbody>
                </table>
            </div>"##
        )
    };

    format!(
        r##"<div class="border border-gray-200 dark:border-gray-700 rounded-lg p-4 space-y-3">
            <div class="flex items-center justify-between text-sm text-gray-500">
                <span>{created}</span>
                <span>Confiança: {confidence}</span>
            </div>
            <div class="bg-gray-100 dark:bg-gray-900 rounded p-2 text-xs whitespace-pre-line">{corrected}</div>
            {edits}
        </div>"##,
        created = format_datetime_long(Some(&record.created_at)),
        confidence = ConfidenceScale::Fraction.format(record.confidence_score),
        corrected = html_escape(&record.corrected_text),
    )
}

/// Texts, metadata and AI corrections of one document.
pub fn document_detail_page(
    doc: &Document,
    corrections: Option<&[AiCorrection]>,
    client: &ApiClient,
    correction_pending: bool,
) -> String {
    let path = document_path(&doc.id);
    let process = if doc.status.is_processable() {
        action_button(&format!("{path}/process"), "Processar OCR", "play", "primary", None)
    } else {
        String::new()
    };
    let delete = action_button(&format!("{path}/delete"), "Excluir", "trash", "danger", Some(DELETE_QUESTION));
    let generate = if correction_pending {
        r##"<button disabled class="bg-green-600 text-white px-3 py-1.5 rounded-lg text-sm font-medium opacity-50"><i class="fas fa-spinner fa-spin"></i> Gerando...</button>"##.to_string()
    } else {
        action_button(&format!("{path}/corrections"), "Gerar correção", "wand-magic-sparkles", "success", None)
    };

    let text_block = |text: Option<&str>| {
        html_escape(text.filter(|t| !t.is_empty()).unwrap_or("Nenhum texto extraído."))
    };

    let info = format!(
        r##"<dl class="grid grid-cols-2 md:grid-cols-4 gap-4 text-sm">
            <div><dt class="text-gray-500">Status</dt><dd>{status}</dd></div>
            <div><dt class="text-gray-500">Enviado em</dt><dd>{created}</dd></div>
            <div><dt class="text-gray-500">Tamanho</dt><dd>{size}</dd></div>
            <div><dt class="text-gray-500">Confiança</dt><dd>{confidence}</dd></div>
        </dl>
        <div class="flex gap-4 mt-6">{original}{preprocessed}</div>
        <div class="flex gap-2 mt-6">{process}{delete}</div>"##,
        status = badge(status_label(&doc.status), status_color(&doc.status)),
        created = format_date_short(doc.created_or_uploaded()),
        size = format_optional_size(doc.file_size),
        confidence = format_list_confidence(doc.confidence_score),
        original = image_preview("Original", &client.asset_url(AssetKind::Original, &doc.filename)),
        preprocessed = image_preview(
            "Pré-processada",
            &client.asset_url(AssetKind::Preprocessed, &doc.filename)
        ),
    );

    let texts = format!(
        r##"<div class="grid grid-cols-1 md:grid-cols-2 gap-6">
            <div><h4 class="text-sm font-semibold mb-2">Texto original</h4><div class="bg-gray-100 dark:bg-gray-900 rounded p-3 text-sm whitespace-pre-line max-h-96 overflow-auto">{original}</div></div>
            <div><h4 class="text-sm font-semibold mb-2">Texto corrigido</h4><div class="bg-gray-100 dark:bg-gray-900 rounded p-3 text-sm whitespace-pre-line max-h-96 overflow-auto">{corrected}</div></div>
        </div>"##,
        original = text_block(doc.original_text.as_deref()),
        corrected = text_block(doc.corrected_text.as_deref()),
    );

    let corrections_html = match corrections {
        None => error_block("Erro ao carregar correções."),
        Some([]) => empty_state("wand-magic-sparkles", "Nenhuma correção gerada", "Gere uma correção com a IA para este documento.", None),
        Some(records) => records.iter().map(correction_block).collect::<Vec<_>>().join("\n"),
    };

    let page = format!(
        r##"<div class="mb-8 flex items-center justify-between">
            <div>
                <a href="/gallery" class="text-sm text-primary-600 hover:underline"><i class="fas fa-arrow-left mr-1"></i>Documentos</a>
                <h1 class="text-3xl font-bold text-gray-900 dark:text-white mt-2">{filename}</h1>
            </div>
        </div>
        <div class="space-y-6">
            {info}
            {texts}
            {corrections}
        </div>"##,
        filename = html_escape(&doc.filename),
        info = card("Informações", &info),
        texts = card("Texto extraído", &texts),
        corrections = card(
            "Correções da IA",
            &format!(r##"<div class="mb-4">{generate}</div><div class="space-y-4">{corrections_html}</div>"##)
        ),
    );
    layout(&doc.filename, NavItem::Document, &page)
}

// =============================================================================
// Delete confirmation
// =============================================================================

/// Confirmation shown when a delete arrives without `confirmed=true`.
pub fn confirm_delete_page(id: &DocumentId, filename: Option<&str>, back: &str) -> String {
    let path = document_path(id);
    let name = filename.map(html_escape).unwrap_or_else(|| html_escape(id.as_str()));
    let content = format!(
        r##"<div class="max-w-lg mx-auto">
            {card}
        </div>"##,
        card = card(
            "Excluir documento",
            &format!(
                r##"<p class="text-gray-700 dark:text-gray-300 mb-2">{DELETE_QUESTION}</p>
                <p class="font-medium text-gray-900 dark:text-white mb-6">{name}</p>
                <form method="POST" action="{path}/delete" class="flex gap-2">
                    <input type="hidden" name="confirmed" value="true">
                    <input type="hidden" name="back" value="{back}">
                    <button type="submit" class="bg-red-600 hover:bg-red-700 text-white px-4 py-2 rounded-lg font-medium"><i class="fas fa-trash mr-1"></i>Excluir</button>
                    <a href="{back}" class="bg-gray-200 dark:bg-gray-700 hover:bg-gray-300 text-gray-700 dark:text-gray-200 px-4 py-2 rounded-lg font-medium">Cancelar</a>
                </form>"##,
                back = html_escape(back),
            )
        ),
    );
    layout("Excluir documento", NavItem::Document, &content)
}
