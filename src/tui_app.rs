use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{
    env, fs,
    io::{self, Stdout},
    path::{Path, PathBuf},
};

use decrx::crx::helpers::{is_zip, parse_crx};
use decrx::extract::unpack_crx_file;

/// Header fields shown on the inspect screen before unpacking.
#[derive(Debug, Clone)]
struct ContainerInfo {
    path: PathBuf,
    format: String,
    fields: Vec<(&'static str, String)>,
}

#[derive(Debug)]
enum Screen {
    Browser,
    Inspect(ContainerInfo),
    Done(String),
    Failed(String),
}

#[derive(Debug)]
struct App {
    screen: Screen,
    packages: Vec<PathBuf>,
    selection: ListState,
    current_dir: PathBuf,
    output_dir: PathBuf,
}

impl App {
    fn new() -> anyhow::Result<App> {
        let current_dir = env::current_dir()?;
        let output_dir = current_dir.join("out");

        let mut app = App {
            screen: Screen::Browser,
            packages: Vec::new(),
            selection: ListState::default(),
            current_dir,
            output_dir,
        };

        app.refresh_packages()?;
        Ok(app)
    }

    fn refresh_packages(&mut self) -> anyhow::Result<()> {
        self.packages.clear();

        for entry in fs::read_dir(&self.current_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match path.extension().and_then(|e| e.to_str()) {
                Some("crx") | Some("zip") => self.packages.push(path),
                _ => {}
            }
        }

        self.packages.sort();
        self.selection
            .select(if self.packages.is_empty() { None } else { Some(0) });
        Ok(())
    }

    fn select_next(&mut self) {
        if self.packages.is_empty() {
            return;
        }

        let i = match self.selection.selected() {
            Some(i) if i + 1 >= self.packages.len() => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.selection.select(Some(i));
    }

    fn select_previous(&mut self) {
        if self.packages.is_empty() {
            return;
        }

        let i = match self.selection.selected() {
            Some(0) | None => self.packages.len() - 1,
            Some(i) => i - 1,
        };
        self.selection.select(Some(i));
    }

    fn selected_path(&self) -> Option<&PathBuf> {
        self.selection.selected().and_then(|i| self.packages.get(i))
    }

    fn inspect_selected(&mut self) {
        let Some(path) = self.selected_path().cloned() else {
            return;
        };

        self.screen = match inspect_container(&path) {
            Ok(info) => Screen::Inspect(info),
            Err(err) => Screen::Failed(err.to_string()),
        };
    }

    fn unpack_inspected(&mut self) {
        let Screen::Inspect(info) = &self.screen else {
            return;
        };
        let path = info.path.clone();

        self.screen = match self.unpack(&path) {
            Ok(dest) => Screen::Done(dest),
            Err(err) => Screen::Failed(err.to_string()),
        };
    }

    fn unpack(&self, path: &Path) -> anyhow::Result<String> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("extension");
        let dest = self.output_dir.join(stem);

        if dest.exists() {
            fs::remove_dir_all(&dest)?;
        }

        let dest = unpack_crx_file(path, Some(&dest))?;
        Ok(dest.display().to_string())
    }

    fn back_to_browser(&mut self) {
        self.screen = Screen::Browser;
    }
}

fn inspect_container(path: &Path) -> anyhow::Result<ContainerInfo> {
    let data = fs::read(path)?;

    let mut fields: Vec<(&'static str, String)> =
        vec![("file size", format!("{} bytes", data.len()))];

    let format = if is_zip(&data) {
        fields.push(("zip payload", format!("{} bytes", data.len())));
        "plain zip archive".to_string()
    } else {
        let package = parse_crx(&data)?;
        if let Some(key) = package.public_key {
            fields.push(("public key", format!("{} bytes", key.len())));
        }
        if let Some(signature) = package.signature {
            fields.push(("signature", format!("{} bytes", signature.len())));
        }
        if let Some(header) = package.signed_header {
            fields.push(("signed header", format!("{} bytes", header.len())));
        }
        fields.push(("zip payload", format!("{} bytes", package.zip.len())));
        format!("crx container, version {}", package.version.number())
    };

    Ok(ContainerInfo {
        path: path.to_path_buf(),
        format,
        fields,
    })
}

pub fn run_tui() -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new()?;
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match &app.screen {
            Screen::Browser => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
                KeyCode::Enter => app.inspect_selected(),
                KeyCode::Char('r') => app.refresh_packages()?,
                _ => {}
            },
            Screen::Inspect(_) => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Enter | KeyCode::Char('u') => app.unpack_inspected(),
                KeyCode::Esc | KeyCode::Backspace => app.back_to_browser(),
                _ => {}
            },
            Screen::Done(_) | Screen::Failed(_) => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter | KeyCode::Char(' ') => app.back_to_browser(),
                _ => {}
            },
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let header = Paragraph::new("decrx — CRX package unpacker")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let instructions = match &app.screen {
        Screen::Browser => "↑/↓: Navigate | Enter: Inspect | R: Refresh | Q/Esc: Quit",
        Screen::Inspect(_) => "Enter/U: Unpack | Esc: Back | Q: Quit",
        Screen::Done(_) | Screen::Failed(_) => "Enter/Space: Back to file browser | Q/Esc: Quit",
    };

    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);

    match &app.screen {
        Screen::Browser => render_browser(f, chunks[1], app),
        Screen::Inspect(info) => render_inspect(f, chunks[1], info),
        Screen::Done(dest) => render_done(f, chunks[1], dest),
        Screen::Failed(message) => render_failed(f, chunks[1], message),
    }
}

fn render_browser(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("Packages").borders(Borders::ALL);

    if app.packages.is_empty() {
        let empty = Paragraph::new("No .crx or .zip files found in current directory")
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .packages
        .iter()
        .map(|path| {
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown");
            ListItem::new(Line::from(Span::raw(filename.to_string())))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Black).bg(Color::White));

    f.render_stateful_widget(list, area, &mut app.selection.clone());
}

fn render_inspect(f: &mut Frame, area: Rect, info: &ContainerInfo) {
    let name = info
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let mut lines = vec![
        Line::from(Span::styled(
            name.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            info.format.clone(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
    ];

    for (key, value) in &info.fields {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<14}", key), Style::default().fg(Color::Gray)),
            Span::raw(value.clone()),
        ]));
    }

    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Container").borders(Borders::ALL));
    f.render_widget(details, area);
}

fn render_done(f: &mut Frame, area: Rect, dest: &str) {
    let message = format!(
        "✓ Unpacked successfully!\n\nOutput directory: {}\n\nPress Enter or Space to continue",
        dest
    );

    let done = Paragraph::new(message)
        .style(Style::default().fg(Color::Green))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Success").borders(Borders::ALL));
    f.render_widget(done, area);
}

fn render_failed(f: &mut Frame, area: Rect, message: &str) {
    let text = format!(
        "✗ Could not unpack package:\n\n{}\n\nPress Enter or Space to continue",
        message
    );

    let failed = Paragraph::new(text)
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Error").borders(Borders::ALL));
    f.render_widget(failed, area);
}
