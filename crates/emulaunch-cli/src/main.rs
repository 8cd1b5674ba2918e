use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use emulaunch_config::{AppDataStore, Config};
use emulaunch_engine::io::{self, AppKind, DataDirEnvironment, InstalledApp};
use emulaunch_engine::{
    BlockReason, CapabilityLevel, Collaborators, FixedCapability, FixedStoragePolicy, GateError,
    GatingController, LaunchKind, Permission, PermissionBroker, PermissionOutcome, PermissionSet,
    PresentationSurface, Prompt, Step,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::cell::Cell;
use std::rc::Rc;
use std::{
    env,
    fs::{File, OpenOptions},
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

/// Stands in for the host permission dialog: the user answers in the terminal.
struct TerminalBroker {
    granted: Rc<Cell<bool>>,
}

impl PermissionBroker for TerminalBroker {
    fn is_granted(&self, _permission: &Permission) -> bool {
        self.granted.get()
    }

    fn request(&mut self, permissions: &PermissionSet) {
        log::info!("Asking for {} permission(s) in the terminal", permissions.len());
    }
}

struct TerminalSurface {
    activated: Rc<Cell<bool>>,
}

impl PresentationSurface for TerminalSurface {
    fn bind_volume_to_media(&mut self) {
        log::debug!("Terminal sessions have no volume routing");
    }

    fn activate(&mut self) {
        self.activated.set(true);
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Screen {
    Permission(PermissionSet),
    Prompt(Prompt),
    Apps,
    Ended(BlockReason),
}

struct App {
    data_dir: PathBuf,
    controller: GatingController,
    screen: Screen,
    granted: Rc<Cell<bool>>,
    activated: Rc<Cell<bool>>,
    apps: Vec<InstalledApp>,
    app_list_state: ListState,
    status: Option<String>,
}

impl App {
    fn new(config: &Config) -> Result<Self> {
        let granted = Rc::new(Cell::new(!config.force_scoped_storage));
        let activated = Rc::new(Cell::new(false));
        let level = config
            .gles_version_override
            .map(CapabilityLevel::from_raw)
            .unwrap_or(CapabilityLevel::MINIMUM);

        let controller = GatingController::new(Collaborators {
            capability: Box::new(FixedCapability(level)),
            storage_policy: Box::new(FixedStoragePolicy {
                legacy: !config.force_scoped_storage,
            }),
            permissions: Box::new(TerminalBroker {
                granted: granted.clone(),
            }),
            settings: Box::new(AppDataStore::open(config.settings_path())?),
            environment: Box::new(DataDirEnvironment::new(config.data_dir.clone())),
            surface: Box::new(TerminalSurface {
                activated: activated.clone(),
            }),
        });

        Ok(Self {
            data_dir: config.data_dir.clone(),
            controller,
            screen: Screen::Apps,
            granted,
            activated,
            apps: Vec::new(),
            app_list_state: ListState::default(),
            status: None,
        })
    }

    fn start(&mut self) -> Result<()> {
        let result = self.controller.start(LaunchKind::ColdStart);
        self.apply(result)
    }

    fn apply(&mut self, result: Result<Step, GateError>) -> Result<()> {
        self.screen = match result? {
            Step::AwaitingPermission(set) => Screen::Permission(set),
            Step::Prompt(prompt) => Screen::Prompt(prompt),
            Step::Ready => {
                if !self.activated.get() {
                    anyhow::bail!("gate reported ready without activating the app list");
                }
                self.load_apps();
                Screen::Apps
            }
            Step::SessionEnded(reason) => Screen::Ended(reason),
        };
        Ok(())
    }

    fn answer_permission(&mut self, granted: bool) -> Result<()> {
        let Screen::Permission(requested) = &self.screen else {
            return Ok(());
        };
        let outcome = PermissionOutcome::uniform(requested, granted);
        self.granted.set(granted);
        let result = self.controller.permission_outcome(outcome);
        self.apply(result)
    }

    fn acknowledge(&mut self) -> Result<()> {
        let result = self.controller.acknowledge();
        self.apply(result)
    }

    fn load_apps(&mut self) {
        match io::scan_apps(&self.data_dir) {
            Ok(apps) => {
                self.apps = apps;
                self.status = None;
            }
            Err(e) => {
                self.apps = Vec::new();
                self.status = Some(format!("Could not read apps: {e}"));
            }
        }
        if !self.apps.is_empty() {
            self.app_list_state.select(Some(0));
        }
    }

    fn next_app(&mut self) {
        if self.apps.is_empty() {
            return;
        }
        let i = match self.app_list_state.selected() {
            Some(i) => (i + 1) % self.apps.len(),
            None => 0,
        };
        self.app_list_state.select(Some(i));
    }

    fn previous_app(&mut self) {
        if self.apps.is_empty() {
            return;
        }
        let i = match self.app_list_state.selected() {
            Some(0) | None => self.apps.len() - 1,
            Some(i) => i - 1,
        };
        self.app_list_state.select(Some(i));
    }
}

const LOG_FILE: &str = "emulaunch-cli.log";

/// Open the append-only log file under `dir`, creating both if needed.
fn open_log_file(dir: &Path) -> std::io::Result<File> {
    std::fs::create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
}

/// The terminal belongs to ratatui, so log lines go to a file instead.
fn init_logging() {
    let dir = Config::config_dir();
    match open_log_file(&dir) {
        Ok(file) => {
            env_logger::Builder::from_default_env()
                .filter_level(log::LevelFilter::Info)
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!(
            "Warning: logging disabled, cannot open {}: {e}",
            dir.join(LOG_FILE).display()
        ),
    }
}

fn main() -> Result<()> {
    init_logging();

    // Data dir from CLI args, else the config file, else the default location
    let args: Vec<String> = env::args().collect();

    let mut config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} [data-dir]", args[0]);
            process::exit(1);
        }
    };

    if args.len() == 2 {
        config.data_dir = PathBuf::from(&args[1]);
    } else if args.len() > 2 {
        eprintln!("Usage: {} [data-dir]", args[0]);
        process::exit(1);
    }

    if let Err(e) = io::validate_data_dir(&config.data_dir) {
        eprintln!(
            "Error: Data directory '{}' is invalid: {e}",
            config.data_dir.display()
        );
        process::exit(1);
    }

    let mut app = App::new(&config)?;
    app.start()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match res {
        Err(err) => println!("{err:?}"),
        Ok(()) => {
            if let Screen::Ended(reason) = app.screen {
                eprintln!("{}", reason.notice());
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            let screen = app.screen.clone();
            match (screen, key.code) {
                (Screen::Ended(_), _) => return Ok(()),
                (_, KeyCode::Char('q')) => return Ok(()),
                (Screen::Permission(_), KeyCode::Char('y')) => app.answer_permission(true)?,
                (Screen::Permission(_), KeyCode::Char('n')) => app.answer_permission(false)?,
                (Screen::Prompt(prompt), KeyCode::Enter) => {
                    let ends = prompt.ends_session();
                    app.acknowledge()?;
                    if ends {
                        return Ok(());
                    }
                }
                (Screen::Apps, KeyCode::Down | KeyCode::Char('j')) => app.next_app(),
                (Screen::Apps, KeyCode::Up | KeyCode::Char('k')) => app.previous_app(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    render_app_list(f, app, chunks[0]);

    let help = match &app.screen {
        Screen::Permission(_) => "y: Grant | n: Deny | q: Quit",
        Screen::Prompt(_) => "Enter: OK",
        Screen::Apps => "q: Quit | ↑/k: Previous | ↓/j: Next",
        Screen::Ended(_) => "Press any key to exit",
    };
    f.render_widget(Paragraph::new(Line::from(Span::raw(help))), chunks[1]);

    match app.screen.clone() {
        Screen::Permission(set) => {
            let names: Vec<&str> = set.iter().map(Permission::as_str).collect();
            let message = format!(
                "The emulator needs access to shared storage.\n\nRequested: {}\n\nGrant access? [y/n]",
                names.join(", ")
            );
            render_dialog(f, "Storage Permission Required", &message);
        }
        Screen::Prompt(prompt) => render_dialog(f, prompt.title(), &prompt.message()),
        Screen::Ended(reason) => render_dialog(f, "Error", reason.notice()),
        Screen::Apps => {}
    }
}

fn render_app_list(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .apps
        .iter()
        .map(|installed| {
            let badge = match installed.kind {
                AppKind::Installed => "",
                AppKind::Package => " (not installed)",
            };
            ListItem::new(Line::from(vec![
                Span::raw(installed.name.clone()),
                Span::styled(badge, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let title = match (&app.status, app.screen == Screen::Apps) {
        (Some(status), true) => status.clone(),
        _ => "Apps".to_string(),
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(list, area, &mut app.app_list_state);
}

fn render_dialog(f: &mut Frame, title: &str, message: &str) {
    let area = centered(f.area(), 60, 40);
    let dialog = Paragraph::new(message.to_string())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .style(Style::default().fg(Color::White).bg(Color::Blue)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config_in(temp_dir: &TempDir) -> Config {
        let mut config = Config::with_data_dir(temp_dir.path().join("emu"));
        config.settings_path = Some(temp_dir.path().join("settings.toml"));
        config
    }

    #[test]
    fn test_default_config_reaches_app_list() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = App::new(&config_in(&temp_dir)).unwrap();

        app.start().unwrap();

        assert_eq!(app.screen, Screen::Apps);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_scoped_storage_asks_then_warns_then_lists_apps() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(&temp_dir);
        config.force_scoped_storage = true;
        std::fs::create_dir_all(config.data_dir.join("apps").join("Bounce")).unwrap();

        let mut app = App::new(&config).unwrap();
        app.start().unwrap();
        assert_eq!(app.screen, Screen::Permission(PermissionSet::storage()));

        app.answer_permission(true).unwrap();
        assert!(matches!(app.screen, Screen::Prompt(Prompt::StorageWarning { .. })));

        app.acknowledge().unwrap();
        assert_eq!(app.screen, Screen::Apps);
        assert_eq!(app.apps.len(), 1);
        assert_eq!(app.app_list_state.selected(), Some(0));
    }

    #[test]
    fn test_denied_permission_ends_session() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(&temp_dir);
        config.force_scoped_storage = true;

        let mut app = App::new(&config).unwrap();
        app.start().unwrap();
        app.answer_permission(false).unwrap();

        assert_eq!(app.screen, Screen::Ended(BlockReason::PermissionDenied));
    }

    #[test]
    fn test_selection_wraps_around() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        for name in ["a", "b"] {
            std::fs::create_dir_all(config.data_dir.join("apps").join(name)).unwrap();
        }
        let mut app = App::new(&config).unwrap();
        app.start().unwrap();

        app.previous_app();
        assert_eq!(app.app_list_state.selected(), Some(1));
        app.next_app();
        assert_eq!(app.app_list_state.selected(), Some(0));
    }

    #[test]
    fn test_log_file_is_created_and_appended() {
        use std::io::Write;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested");

        let mut first = open_log_file(&dir).unwrap();
        writeln!(first, "one").unwrap();
        let mut second = open_log_file(&dir).unwrap();
        writeln!(second, "two").unwrap();

        let content = std::fs::read_to_string(dir.join(LOG_FILE)).unwrap();
        assert_eq!(content, "one\ntwo\n");
    }
}
