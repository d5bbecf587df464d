pub const APP_STYLES: &str = r#"
:root {
    --bg: #f8fafc;
    --surface: #ffffff;
    --surface-muted: #f1f5f9;
    --border-color: #e2e8f0;
    --text-primary: #0f172a;
    --text-secondary: #475569;
    --accent: #2563eb;
    --positive: #16a34a;
    --negative: #dc2626;
}

:root.dark {
    --bg: #0f172a;
    --surface: #1e293b;
    --surface-muted: #111827;
    --border-color: #334155;
    --text-primary: #f8fafc;
    --text-secondary: #94a3b8;
    --accent: #60a5fa;
    --positive: #4ade80;
    --negative: #f87171;
}

body {
    margin: 0;
    background: var(--bg);
    color: var(--text-primary);
    font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
}

.app-shell {
    min-height: 100vh;
    display: flex;
    flex-direction: column;
}

.app-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    gap: 1rem;
    padding: 0.75rem 1.25rem;
    background: var(--surface);
    border-bottom: 1px solid var(--border-color);
}

.app-title {
    font-weight: 700;
    font-size: 1.05rem;
}

.app-nav {
    display: flex;
    gap: 0.75rem;
}

.app-nav a {
    color: var(--text-secondary);
    text-decoration: none;
    padding: 0.25rem 0.5rem;
    border-radius: 0.375rem;
}

.app-nav a.active {
    color: var(--text-primary);
    background: var(--surface-muted);
}

.app-main {
    flex: 1;
    padding: 1rem 1.25rem 4rem;
    display: flex;
    flex-direction: column;
    gap: 1rem;
}

.card {
    background: var(--surface);
    border: 1px solid var(--border-color);
    border-radius: 0.5rem;
    padding: 0.85rem 1rem;
}

.card h2, .card h3 {
    margin: 0 0 0.6rem 0;
    font-size: 0.95rem;
}

.muted {
    color: var(--text-secondary);
    font-size: 0.85rem;
}

.error-text {
    color: var(--negative);
    font-size: 0.85rem;
}

.btn {
    border: 1px solid var(--border-color);
    background: var(--surface-muted);
    color: var(--text-primary);
    border-radius: 0.375rem;
    padding: 0.3rem 0.7rem;
    cursor: pointer;
    font-size: 0.85rem;
}

.btn:disabled {
    opacity: 0.5;
    cursor: default;
}

.btn-primary {
    background: var(--accent);
    border-color: var(--accent);
    color: #ffffff;
}

.input {
    border: 1px solid var(--border-color);
    background: var(--surface);
    color: var(--text-primary);
    border-radius: 0.375rem;
    padding: 0.3rem 0.5rem;
    font-size: 0.85rem;
}

.row {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    flex-wrap: wrap;
}

.ticker-chip {
    display: inline-flex;
    align-items: center;
    gap: 0.25rem;
    font-weight: 600;
    font-size: 0.8rem;
    padding: 0.1rem 0.45rem;
    border-radius: 999px;
    border: 1px solid var(--border-color);
    background: var(--surface-muted);
    cursor: pointer;
}

.ticker-chip.watched {
    border-color: var(--accent);
}

.citations {
    display: flex;
    flex-wrap: wrap;
    gap: 0.3rem;
    margin-top: 0.25rem;
}

.citation {
    font-size: 0.72rem;
    color: var(--text-secondary);
    border: 1px dashed var(--border-color);
    border-radius: 0.25rem;
    padding: 0 0.3rem;
}

.sparkline polyline {
    fill: none;
    stroke: var(--accent);
    stroke-width: 1.5;
}

.toasts {
    position: fixed;
    top: 1rem;
    right: 1rem;
    display: flex;
    flex-direction: column;
    gap: 0.5rem;
    z-index: 50;
}

.toast {
    background: var(--surface);
    border: 1px solid var(--border-color);
    border-left: 4px solid var(--accent);
    border-radius: 0.375rem;
    padding: 0.5rem 0.75rem;
    font-size: 0.85rem;
    cursor: pointer;
}

.toast-success {
    border-left-color: var(--positive);
}

.toast-error {
    border-left-color: var(--negative);
}
"#;

pub const DASHBOARD_STYLES: &str = r#"
.dashboard-grid {
    display: grid;
    grid-template-columns: minmax(0, 2fr) minmax(0, 1fr);
    gap: 1rem;
}

@media (max-width: 960px) {
    .dashboard-grid {
        grid-template-columns: minmax(0, 1fr);
    }
}

.week-strip {
    display: grid;
    grid-template-columns: repeat(5, minmax(0, 1fr));
    gap: 0.5rem;
}

.day-cell {
    border: 1px solid var(--border-color);
    border-radius: 0.375rem;
    padding: 0.4rem;
    text-align: center;
    cursor: pointer;
    background: var(--surface);
}

.day-cell.selected {
    border-color: var(--accent);
    background: var(--surface-muted);
}

.day-count {
    font-size: 1.1rem;
    font-weight: 700;
}

.tod-groups {
    display: grid;
    grid-template-columns: repeat(3, minmax(0, 1fr));
    gap: 0.75rem;
    margin-top: 0.75rem;
}

.tod-group h4 {
    margin: 0 0 0.35rem 0;
    font-size: 0.8rem;
    color: var(--text-secondary);
}

.highlight-card, .idea-card, .alert-tile, .summary-card {
    border: 1px solid var(--border-color);
    border-radius: 0.375rem;
    padding: 0.5rem 0.65rem;
    margin-bottom: 0.5rem;
}

.highlight-card ul {
    margin: 0.35rem 0 0 1rem;
    padding: 0;
    font-size: 0.85rem;
}

.idea-card .confidence {
    font-size: 0.72rem;
    text-transform: uppercase;
    color: var(--text-secondary);
}

.movers-table {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.85rem;
}

.movers-table td, .movers-table th {
    padding: 0.25rem 0.35rem;
    border-bottom: 1px solid var(--border-color);
    text-align: left;
}

.up {
    color: var(--positive);
}

.down {
    color: var(--negative);
}

.drawer {
    position: fixed;
    top: 0;
    right: 0;
    bottom: 0;
    width: min(420px, 100vw);
    background: var(--surface);
    border-left: 1px solid var(--border-color);
    padding: 1rem;
    overflow-y: auto;
    z-index: 40;
    box-shadow: -8px 0 24px rgba(0, 0, 0, 0.15);
}

.drawer-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 0.75rem;
}

.metric-row {
    display: flex;
    justify-content: space-between;
    gap: 0.5rem;
    font-size: 0.85rem;
    padding: 0.2rem 0;
}
"#;

pub const CHAT_STYLES: &str = r#"
.chat-dock {
    position: fixed;
    bottom: 0;
    right: 1rem;
    width: min(440px, calc(100vw - 2rem));
    z-index: 30;
    background: var(--surface);
    border: 1px solid var(--border-color);
    border-bottom: none;
    border-radius: 0.5rem 0.5rem 0 0;
    box-shadow: 0 -4px 16px rgba(0, 0, 0, 0.12);
}

.chat-dock-toggle {
    width: 100%;
    text-align: left;
    border: none;
    background: transparent;
    color: var(--text-primary);
    padding: 0.55rem 0.85rem;
    font-weight: 600;
    cursor: pointer;
}

.chat-panel {
    display: flex;
    flex-direction: column;
    gap: 0.6rem;
    padding: 0 0.85rem 0.85rem;
    max-height: 70vh;
    overflow-y: auto;
}

.chat-snapshot {
    background: var(--surface-muted);
    border-radius: 0.375rem;
    padding: 0.5rem;
    font-size: 0.82rem;
}

.suggestions {
    display: flex;
    flex-wrap: wrap;
    gap: 0.35rem;
}

.suggestion {
    font-size: 0.78rem;
    border: 1px solid var(--border-color);
    border-radius: 999px;
    padding: 0.15rem 0.55rem;
    background: var(--surface);
    color: var(--text-primary);
    cursor: pointer;
}

.chat-exchange {
    border-top: 1px solid var(--border-color);
    padding-top: 0.45rem;
    font-size: 0.85rem;
}

.chat-question {
    font-weight: 600;
    margin-bottom: 0.3rem;
}

.chat-input {
    display: flex;
    gap: 0.4rem;
}

.chat-input textarea {
    flex: 1;
    resize: vertical;
    min-height: 2.2rem;
}
"#;

pub const DOCUMENTS_STYLES: &str = r#"
.documents-layout {
    display: grid;
    grid-template-columns: minmax(0, 1fr) minmax(0, 2fr);
    gap: 1rem;
}

@media (max-width: 960px) {
    .documents-layout {
        grid-template-columns: minmax(0, 1fr);
    }
}

.doc-item {
    display: flex;
    justify-content: space-between;
    align-items: center;
    gap: 0.5rem;
    padding: 0.35rem 0.25rem;
    border-bottom: 1px solid var(--border-color);
    font-size: 0.85rem;
}

.doc-item.active {
    background: var(--surface-muted);
}

.panel-table {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.85rem;
}

.panel-table td, .panel-table th {
    padding: 0.25rem 0.35rem;
    border-bottom: 1px solid var(--border-color);
    text-align: left;
    vertical-align: top;
}

.runs-table {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.82rem;
}

.runs-table td, .runs-table th {
    padding: 0.3rem 0.4rem;
    border-bottom: 1px solid var(--border-color);
    text-align: left;
}
"#;
