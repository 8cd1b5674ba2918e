use dioxus::prelude::*;
use emulaunch_engine::io::{self, AppKind};
use std::path::PathBuf;

/// Installed apps and packages under the emulator data directory
#[component]
pub fn AppList(data_dir: PathBuf) -> Element {
    let apps = use_signal(|| io::scan_apps(&data_dir).map_err(|e| e.to_string()));
    let apps_hint = data_dir.join(io::APPS_FOLDER).display().to_string();

    let rows: Result<Vec<(String, String, bool)>, String> =
        apps.read().as_ref().map_err(|e| e.clone()).map(|apps| {
            apps.iter()
                .map(|app| {
                    (
                        app.relative_path.to_string(),
                        app.name.clone(),
                        app.kind == AppKind::Package,
                    )
                })
                .collect()
        });

    rsx! {
        div {
            class: "app-list",
            h2 { "Apps" }
            match rows {
                Err(error) => rsx! {
                    p { class: "setup-error", "Could not read apps: {error}" }
                },
                Ok(rows) if rows.is_empty() => rsx! {
                    p {
                        class: "empty-state",
                        "No apps installed yet. Copy games into {apps_hint}"
                    }
                },
                Ok(rows) => rsx! {
                    ul {
                        for (key, name, is_package) in rows {
                            li {
                                key: "{key}",
                                class: "app-item",
                                span { class: "app-name", "{name}" }
                                if is_package {
                                    span { class: "app-badge", " (not installed)" }
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dioxus::dioxus_core::VirtualDom;
    use dioxus_ssr::render;
    use tempfile::TempDir;

    fn render_for(data_dir: PathBuf) -> String {
        let mut dom = VirtualDom::new_with_props(AppList, AppListProps { data_dir });
        dom.rebuild_in_place();
        render(&dom)
    }

    #[test]
    fn test_lists_installed_apps_and_packages() {
        let temp_dir = TempDir::new().unwrap();
        let apps = temp_dir.path().join("apps");
        std::fs::create_dir_all(apps.join("Bounce")).unwrap();
        std::fs::write(apps.join("Snake.sis"), b"").unwrap();

        let html = render_for(temp_dir.path().to_path_buf());

        assert!(html.contains("Bounce"));
        assert!(html.contains("Snake"));
        assert_eq!(html.matches("(not installed)").count(), 1);
    }

    #[test]
    fn test_empty_apps_folder_shows_hint() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("apps")).unwrap();

        let html = render_for(temp_dir.path().to_path_buf());

        assert!(html.contains("No apps installed yet"));
    }

    #[test]
    fn test_missing_apps_folder_shows_error() {
        let temp_dir = TempDir::new().unwrap();

        let html = render_for(temp_dir.path().to_path_buf());

        assert!(html.contains("Could not read apps"));
    }
}
