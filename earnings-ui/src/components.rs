pub mod app;
pub mod chat_dock;
pub mod chat_panel;
pub mod common;
pub mod dashboard;
pub mod detail_drawer;
pub mod documents;
pub mod ingestion;
pub mod styles;

pub use app::{App, Route};
pub use chat_dock::ChatDock;
pub use chat_panel::ChatPanel;
pub use common::{CitationList, Sparkline, TickerChip, Toasts};
pub use dashboard::Dashboard;
pub use detail_drawer::DetailDrawer;
pub use documents::Documents;
pub use ingestion::Ingestion;
