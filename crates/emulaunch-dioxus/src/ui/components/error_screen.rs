use dioxus::prelude::*;

/// Full-screen notice shown when the session cannot continue
#[component]
pub fn ErrorScreen(
    title: String,
    message: String,
    details: Option<String>,
    on_close: Option<EventHandler<()>>,
) -> Element {
    rsx! {
        div {
            style: "display: flex; flex-direction: column; align-items: center; justify-content: center; min-height: 100vh; padding: 24px; text-align: center;",
            h1 {
                style: "color: #dc322f;",
                "{title}"
            }
            p { "{message}" }
            if let Some(ref detail_text) = details {
                pre {
                    style: "text-align: left; white-space: pre-wrap; word-break: break-word; margin-top: 16px;",
                    "{detail_text}"
                }
            }
            if let Some(on_close) = on_close {
                button {
                    class: "setup-btn submit",
                    onclick: move |_| on_close.call(()),
                    "Close"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dioxus::dioxus_core::VirtualDom;
    use dioxus_ssr::render;

    #[test]
    fn test_error_screen_renders_title_and_message() {
        let mut dom = VirtualDom::new_with_props(
            ErrorScreen,
            ErrorScreenProps {
                title: "Permission denied".to_string(),
                message: "Storage permission is required".to_string(),
                details: None,
                on_close: None,
            },
        );
        dom.rebuild_in_place();
        let html = render(&dom);

        assert!(html.contains("Permission denied"));
        assert!(html.contains("Storage permission is required"));
        assert!(!html.contains("Close"));
    }

    #[test]
    fn test_error_screen_renders_with_details() {
        let mut dom = VirtualDom::new_with_props(
            ErrorScreen,
            ErrorScreenProps {
                title: "Startup failed".to_string(),
                message: "Could not set up the launcher".to_string(),
                details: Some("Failed to parse settings at /tmp/settings.toml".to_string()),
                on_close: None,
            },
        );
        dom.rebuild_in_place();
        let html = render(&dom);

        assert!(html.contains("Startup failed"));
        assert!(html.contains("Failed to parse settings at /tmp/settings.toml"));
    }

    #[test]
    fn test_error_screen_with_close_action() {
        #[allow(non_snake_case)]
        fn Harness() -> Element {
            rsx! {
                ErrorScreen {
                    title: "Error",
                    message: "Session over",
                    on_close: move |_| {},
                }
            }
        }

        let mut dom = VirtualDom::new(Harness);
        dom.rebuild_in_place();
        let html = render(&dom);

        assert!(html.contains("Close"));
    }
}
