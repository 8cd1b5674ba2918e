use dioxus::prelude::*;

/// Modal dialog with a single OK action. There is no way to dismiss it
/// other than acknowledging.
#[component]
pub fn PromptDialog(title: String, message: String, on_acknowledge: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "modal-backdrop",
            style: "position: fixed; inset: 0; display: flex; align-items: center; justify-content: center; background: rgba(0, 0, 0, 0.4);",
            div {
                class: "modal-dialog",
                "role": "alertdialog",
                style: "max-width: 480px; padding: 24px; background: #fdf6e3; border-radius: 8px;",
                h2 { "{title}" }
                p {
                    style: "white-space: pre-wrap;",
                    "{message}"
                }
                div {
                    class: "setup-buttons",
                    button {
                        class: "setup-btn submit",
                        onclick: move |_| on_acknowledge.call(()),
                        "OK"
                    }
                }
            }
        }
    }
}
