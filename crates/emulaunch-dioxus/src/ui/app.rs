use super::components::{AppList, ErrorScreen, PermissionScreen, PromptDialog};
use super::session::{GateSession, GateView};
use crate::platform;
use dioxus::prelude::*;
use emulaunch_config::Config;

/// Root component: runs the startup gate, then shows the app list
#[component]
pub fn App(config: Config) -> Element {
    let mut session = use_signal(|| GateSession::launch(&config));
    let view = session.read().view().clone();

    match view {
        GateView::Starting => rsx! {
            div { class: "gate-loading", "Starting..." }
        },
        GateView::AwaitingPermission(_) => rsx! {
            PermissionScreen {
                on_open_settings: move |_| {
                    if !platform::request_permissions() {
                        log::warn!("Could not open the permission settings page");
                    }
                },
                on_answered: move |_| session.write().permission_answered(),
            }
        },
        GateView::Prompt(prompt) => rsx! {
            PromptDialog {
                title: prompt.title().to_string(),
                message: prompt.message(),
                on_acknowledge: move |_| {
                    let end_now = session.write().acknowledge();
                    if end_now {
                        platform::finish_session();
                    }
                },
            }
        },
        GateView::Apps => rsx! {
            AppList { data_dir: config.data_dir.clone() }
        },
        GateView::Ended(reason) => rsx! {
            ErrorScreen {
                title: "Error".to_string(),
                message: reason.notice().to_string(),
                details: None,
                on_close: move |_| platform::finish_session(),
            }
        },
        GateView::Failed(details) => rsx! {
            ErrorScreen {
                title: "Startup failed".to_string(),
                message: "The launcher could not be set up.".to_string(),
                details: Some(details),
                on_close: move |_| platform::finish_session(),
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dioxus::dioxus_core::VirtualDom;
    use dioxus_ssr::render;
    use tempfile::TempDir;

    fn render_app(config: Config) -> String {
        let mut dom = VirtualDom::new_with_props(App, AppProps { config });
        dom.rebuild_in_place();
        render(&dom)
    }

    fn config_in(temp_dir: &TempDir) -> Config {
        let mut config = Config::with_data_dir(temp_dir.path().join("emu"));
        config.settings_path = Some(temp_dir.path().join("settings.toml"));
        config
    }

    #[test]
    fn test_capable_desktop_renders_app_list() {
        let temp_dir = TempDir::new().unwrap();

        let html = render_app(config_in(&temp_dir));

        assert!(html.contains("Apps"));
        assert!(html.contains("No apps installed yet"));
    }

    #[test]
    fn test_scoped_first_run_renders_warning_dialog() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(&temp_dir);
        config.force_scoped_storage = true;
        let data_dir = config.data_dir.display().to_string();

        let html = render_app(config);

        assert!(html.contains("Warning"));
        assert!(html.contains(&data_dir));
    }

    #[test]
    fn test_low_capability_renders_error_dialog() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(&temp_dir);
        config.gles_version_override = Some(0x20000);

        let html = render_app(config);

        assert!(html.contains("OpenGL ES 3.0 or newer is required"));
        assert!(!html.contains("No apps installed yet"));
    }
}
