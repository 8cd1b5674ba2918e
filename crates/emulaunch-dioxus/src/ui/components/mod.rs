mod app_list;
mod error_screen;
mod permission_screen;
mod prompt_dialog;

pub use app_list::AppList;
pub use error_screen::ErrorScreen;
pub use permission_screen::PermissionScreen;
pub use prompt_dialog::PromptDialog;
