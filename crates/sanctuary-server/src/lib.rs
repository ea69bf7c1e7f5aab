//! Session and preview-server manager behind the sanctuary browser UI.

pub mod config;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod handlers;
pub mod launch;
pub mod pages;
pub mod preview;
pub mod shutdown;
pub mod workspace;

pub use config::Config;
pub use cursor::DirectoryCursor;
pub use editor::EditorSession;
pub use error::ServerError;
pub use handlers::{router, AppState};
pub use preview::{PreviewServer, PreviewStatus, StartOutcome, StopOutcome};
pub use shutdown::{ShutdownListener, ShutdownTrigger};
pub use workspace::Workspace;
