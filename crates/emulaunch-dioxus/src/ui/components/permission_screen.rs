use dioxus::prelude::*;

/// Shown while a storage permission request is outstanding
#[component]
pub fn PermissionScreen(on_open_settings: EventHandler<()>, on_answered: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "setup-screen",
            div {
                class: "permission-notice",
                p {
                    class: "permission-title",
                    "Storage Permission Required"
                }
                p {
                    "The emulator needs permission to read and write its data folder on this device."
                }
                p {
                    class: "permission-instructions",
                    "Please grant storage permission in Settings, then come back."
                }
            }

            div {
                class: "setup-buttons",
                button {
                    class: "setup-btn secondary",
                    onclick: move |_| on_open_settings.call(()),
                    "Open Settings"
                }
                button {
                    class: "setup-btn submit",
                    onclick: move |_| on_answered.call(()),
                    "Continue"
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
    fn test_permission_screen_offers_settings_and_continue() {
        #[allow(non_snake_case)]
        fn Harness() -> Element {
            rsx! {
                PermissionScreen {
                    on_open_settings: move |_| {},
                    on_answered: move |_| {},
                }
            }
        }

        let mut dom = VirtualDom::new(Harness);
        dom.rebuild_in_place();
        let html = render(&dom);

        assert!(html.contains("Storage Permission Required"));
        assert!(html.contains("Open Settings"));
        assert!(html.contains("Continue"));
    }
}
