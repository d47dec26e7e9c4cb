use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use tdoc::{Document, markdown};

use tabulist::list::content::{insert_text_at, remove_before, split_at, visible_len};
use tabulist::list::navigation::get_wrapper_items;
use tabulist::list::{
    BlockCommand, BlockCommands, BlockData, Caret, CaretPosition, KeyIntent, KeyPress,
    ListConfig, ListStyle, ListTabulator, markup_from_paragraph,
};
use tabulist::render::{CursorVisualPosition, RenderResult, render_list, render_paragraph};
use tabulist::theme::Theme;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Parser, Debug)]
#[command(name = "tabulist", version, about = "Edit nested lists in the terminal")]
struct Cli {
    /// Block file to edit (JSON array of paragraph and list blocks)
    file: PathBuf,

    /// TOML file with list options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Style of new lists: unordered, ordered or checklist
    #[arg(long, value_parser = parse_style)]
    style: Option<ListStyle>,

    /// Deepest level items may be indented to
    #[arg(long, value_parser = parse_max_level)]
    max_level: Option<usize>,

    /// Open the document without allowing changes
    #[arg(long)]
    read_only: bool,

    /// Markdown or FTML document whose first list replaces the first list block
    #[arg(long)]
    import: Option<PathBuf>,

    /// Write log output to this file
    #[arg(long)]
    log: Option<PathBuf>,
}

fn parse_style(value: &str) -> Result<ListStyle, String> {
    ListStyle::from_name(value).ok_or_else(|| format!("unknown list style `{value}`"))
}

fn parse_max_level(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(level) if level > 0 => Ok(level),
        _ => Err(format!("`{value}` is not a positive integer")),
    }
}

fn main() -> Result<()> {
    run()
}

/// The terminal UI owns stdout and stderr, so log output only goes to a file.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref())?;

    let config = load_config(&cli)?;
    let (blocks, initial_status) = load_blocks(&cli.file)?;
    let mut app = App::new(
        blocks,
        config,
        cli.read_only,
        cli.file.clone(),
        initial_status,
    );
    if let Some(path) = &cli.import {
        app.import(path)?;
    }

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

fn load_config(cli: &Cli) -> Result<ListConfig> {
    let mut config = match &cli.config {
        Some(path) => ListConfig::load(path)?,
        None => ListConfig::default(),
    };
    if let Some(style) = cli.style {
        config = config.with_default_style(style);
    }
    if let Some(max_level) = cli.max_level {
        config = config.with_max_level(max_level);
    }
    Ok(config)
}

fn load_blocks(path: &Path) -> Result<(Vec<BlockData>, Option<String>)> {
    if !path.exists() {
        return Ok((Vec::new(), Some("New document".to_string())));
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let blocks: Vec<BlockData> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse blocks in {}", path.display()))?;
    info!("loaded {} blocks from {}", blocks.len(), path.display());
    Ok((blocks, None))
}

fn read_import(path: &Path) -> Result<Document> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "md" | "markdown" | "mkd" | "mdown"));
    if is_markdown {
        markdown::parse(std::io::Cursor::new(content))
            .map_err(|err| anyhow!("failed to parse {}: {err}", path.display()))
    } else {
        tdoc::parse(std::io::Cursor::new(content))
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    while !app.should_quit() {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt)?;
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

enum DocBlock {
    Paragraph(String),
    List(ListTabulator),
}

impl DocBlock {
    fn from_data(data: BlockData, config: &ListConfig, read_only: bool) -> Self {
        match data {
            BlockData::Paragraph { text } => DocBlock::Paragraph(text),
            BlockData::List(data) => {
                let mut list = ListTabulator::new(Some(data), config.clone(), read_only);
                list.render();
                DocBlock::List(list)
            }
        }
    }

    fn new_list(config: &ListConfig, read_only: bool) -> Self {
        let mut list = ListTabulator::new(None, config.clone(), read_only);
        list.render();
        DocBlock::List(list)
    }

    fn to_data(&self) -> BlockData {
        match self {
            DocBlock::Paragraph(text) => BlockData::Paragraph { text: text.clone() },
            DocBlock::List(list) => BlockData::List(list.save(None)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum BlockCaret {
    Paragraph(usize),
    List(Caret),
}

struct App {
    blocks: Vec<DocBlock>,
    config: ListConfig,
    read_only: bool,
    file_path: PathBuf,
    focus: usize,
    caret: BlockCaret,
    theme: Theme,
    scroll_top: usize,
    last_view_height: usize,
    should_quit: bool,
    dirty: bool,
    status_message: Option<(String, Instant)>,
}

impl App {
    fn new(
        blocks: Vec<BlockData>,
        config: ListConfig,
        read_only: bool,
        path: PathBuf,
        initial_status: Option<String>,
    ) -> Self {
        let mut blocks: Vec<DocBlock> = blocks
            .into_iter()
            .map(|block| DocBlock::from_data(block, &config, read_only))
            .collect();
        if blocks.is_empty() {
            blocks.push(DocBlock::new_list(&config, read_only));
        }

        let mut app = Self {
            blocks,
            config,
            read_only,
            file_path: path,
            focus: 0,
            caret: BlockCaret::Paragraph(0),
            theme: Theme::new(),
            scroll_top: 0,
            last_view_height: 1,
            should_quit: false,
            dirty: false,
            status_message: initial_status.map(|msg| (msg, Instant::now())),
        };
        app.focus_block(0, CaretPosition::Start);
        app
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn import(&mut self, path: &Path) -> Result<()> {
        let document = read_import(path)?;
        let Some(markup) = document.paragraphs.iter().find_map(markup_from_paragraph) else {
            self.set_status(format!("No list found in {}", path.display()));
            return Ok(());
        };
        if self.read_only {
            self.set_status("Read-only: import skipped");
            return Ok(());
        }

        let index = match self
            .blocks
            .iter()
            .position(|block| matches!(block, DocBlock::List(_)))
        {
            Some(index) => index,
            None => {
                self.blocks
                    .push(DocBlock::new_list(&self.config, self.read_only));
                self.blocks.len() - 1
            }
        };
        if let Some(DocBlock::List(list)) = self.blocks.get_mut(index) {
            if list.on_paste(&markup).is_some() {
                self.dirty = true;
                info!("imported list from {}", path.display());
                self.set_status(format!("Imported list from {}", path.display()));
            }
        }
        self.focus_block(index, CaretPosition::Start);
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let status_height = if area.height > 1 { 2 } else { 1 };
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(status_height)])
            .split(area);

        let editor_area = vertical[0];
        let status_area = vertical[1];

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(editor_area);
        let text_area = horizontal[0];
        let scrollbar_area = horizontal[1];

        let render = self.render_document(text_area.width.max(1) as usize);

        let viewport_height = text_area.height as usize;
        self.last_view_height = viewport_height.max(1);
        self.adjust_scroll(&render, viewport_height);

        let paragraph = Paragraph::new(Text::from(render.lines.clone()))
            .style(Style::default().bg(self.theme.background))
            .block(Block::default().borders(Borders::NONE))
            .scroll((self.scroll_top as u16, 0));
        frame.render_widget(paragraph, text_area);

        let mut scrollbar_state = ScrollbarState::new(render.total_lines).position(self.scroll_top);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);

        if let Some(cursor) = render.cursor {
            if cursor.line >= self.scroll_top
                && cursor.line < self.scroll_top + viewport_height
                && text_area.width > 0
            {
                let cursor_y = text_area.y + (cursor.line - self.scroll_top) as u16;
                let cursor_x = text_area.x + cursor.column.min(text_area.width - 1);
                frame.set_cursor_position(Position::new(cursor_x, cursor_y));
            }
        }

        let status_text = self.status_line();
        let status_widget = Paragraph::new(Line::from(vec![
            Span::styled(self.file_path.display().to_string(), self.theme.filename_style()),
            Span::raw(status_text),
        ]))
        .style(self.theme.status_bar_style())
        .block(Block::default().borders(Borders::TOP));
        frame.render_widget(status_widget, status_area);
    }

    fn status_line(&mut self) -> String {
        self.prune_status_message();
        let marker = if self.dirty { "*" } else { "" };
        let kind = match self.blocks.get(self.focus) {
            Some(DocBlock::List(list)) => list.style().name(),
            _ => "paragraph",
        };
        let details = format!(
            "{} | {} | Block {}/{}",
            marker,
            kind,
            self.focus + 1,
            self.blocks.len()
        );
        if let Some((message, _)) = &self.status_message {
            return format!("{details} | {message}");
        }
        format!("{details} | Ctrl-S save | Ctrl-Q quit | Ctrl-X check")
    }

    fn prune_status_message(&mut self) {
        if let Some((_, instant)) = &self.status_message {
            if instant.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
            }
        }
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let viewport = viewport_height.max(1);
        let max_scroll = render.total_lines.saturating_sub(viewport);
        if let Some(cursor) = &render.cursor {
            if cursor.line < self.scroll_top {
                self.scroll_top = cursor.line;
            } else if cursor.line >= self.scroll_top + viewport {
                self.scroll_top = (cursor.line + 1).saturating_sub(viewport);
            }
        }
        if self.scroll_top > max_scroll {
            self.scroll_top = max_scroll;
        }
    }

    /// Lays out every block, one blank line apart.
    fn render_document(&self, width: usize) -> RenderResult {
        let mut lines = Vec::new();
        let mut cursor = None;
        for (index, block) in self.blocks.iter().enumerate() {
            if index > 0 {
                lines.push(Line::from(""));
            }
            let focused = index == self.focus;
            let result = match block {
                DocBlock::Paragraph(text) => {
                    let offset = match self.caret {
                        BlockCaret::Paragraph(offset) if focused => Some(offset),
                        _ => None,
                    };
                    render_paragraph(text, offset, width, &self.theme)
                }
                DocBlock::List(list) => {
                    let caret = match self.caret {
                        BlockCaret::List(caret) if focused => Some(caret),
                        _ => None,
                    };
                    match list.root() {
                        Some(root) => render_list(
                            list.tree(),
                            root,
                            list.renderer(),
                            caret.as_ref(),
                            width,
                            &self.theme,
                        ),
                        None => render_paragraph("", None, width, &self.theme),
                    }
                }
            };
            if let Some(position) = result.cursor {
                cursor = Some(CursorVisualPosition {
                    line: lines.len() + position.line,
                    column: position.column,
                });
            }
            lines.extend(result.lines);
        }
        let total_lines = lines.len();
        RenderResult {
            lines,
            cursor,
            total_lines,
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('q' | 'c'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('s'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.save()?;
            }
            (KeyCode::Char('x'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.toggle_checkbox();
            }
            (KeyCode::Left, _) => self.move_horizontal(false),
            (KeyCode::Right, _) => self.move_horizontal(true),
            (KeyCode::Up, _) => self.move_vertical(false),
            (KeyCode::Down, _) => self.move_vertical(true),
            (KeyCode::Home, _) => self.move_home(),
            (KeyCode::End, _) => self.move_end(),
            (KeyCode::PageUp, _) => {
                self.scroll_top = self.scroll_top.saturating_sub(self.last_view_height.max(1));
            }
            (KeyCode::PageDown, _) => {
                self.scroll_top += self.last_view_height.max(1);
            }
            _ if self.read_only => {}
            _ => match self.caret {
                BlockCaret::List(_) => self.handle_list_key(key),
                BlockCaret::Paragraph(_) => self.handle_paragraph_key(key),
            },
        }
        Ok(())
    }

    /// Hands the key to the focused list first. Whatever it leaves to the
    /// native editor (typing, deleting inside text) is applied afterwards.
    fn handle_list_key(&mut self, key: KeyEvent) {
        let index = self.focus;
        let BlockCaret::List(mut caret) = self.caret else {
            return;
        };
        let Some(DocBlock::List(list)) = self.blocks.get_mut(index) else {
            return;
        };

        let mut host = BlockCommands::new(index);
        let outcome = list.handle_key(&KeyPress::from(key), &mut caret, &mut host);
        debug!("list key {:?}: {outcome:?}", key.code);

        if outcome.prevent_default {
            self.dirty = true;
        } else if let Some(tree) = list.tree_mut() {
            let edited = match key.code {
                KeyCode::Backspace => caret.delete_backward(tree),
                KeyCode::Char(ch)
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    caret.insert_text(tree, &ch.to_string())
                }
                _ => false,
            };
            if edited {
                self.dirty = true;
            }
        }
        self.caret = BlockCaret::List(caret);

        let leaves_list = outcome.prevent_default
            && !outcome.stop_propagation
            && KeyIntent::from_event(&key) == Some(KeyIntent::Backspace);
        self.apply_commands(host.into_commands());
        if leaves_list {
            self.backspace_at_list_start(index);
        }
        self.prune_empty_lists();
    }

    fn apply_commands(&mut self, commands: Vec<BlockCommand>) {
        for command in commands {
            match command {
                BlockCommand::Insert { index, block } => {
                    let index = index.min(self.blocks.len());
                    let block = DocBlock::from_data(block, &self.config, self.read_only);
                    self.blocks.insert(index, block);
                    if index <= self.focus {
                        self.focus += 1;
                    }
                    self.dirty = true;
                }
                BlockCommand::Focus { index, position } => self.focus_block(index, position),
            }
        }
    }

    /// Backspace at the very start of a list: a list right before it absorbs
    /// this one, a paragraph before it takes the caret.
    fn backspace_at_list_start(&mut self, index: usize) {
        let Some(previous) = index.checked_sub(1) else {
            return;
        };
        match self.blocks.get(previous) {
            Some(DocBlock::List(_)) => self.merge_list_into_previous(index),
            Some(DocBlock::Paragraph(_)) => self.focus_block(previous, CaretPosition::End),
            None => {}
        }
    }

    fn merge_list_into_previous(&mut self, index: usize) {
        let data = match self.blocks.get(index) {
            Some(DocBlock::List(list)) => list.save(None),
            _ => return,
        };
        let Some(DocBlock::List(previous)) = self.blocks.get_mut(index - 1) else {
            return;
        };
        let caret = previous
            .root()
            .and_then(|root| get_wrapper_items(previous.tree(), root, false).last().copied())
            .map(|item| Caret::at_end(previous.tree(), item));
        previous.merge(&data);

        self.blocks.remove(index);
        self.focus = index - 1;
        if let Some(caret) = caret {
            self.caret = BlockCaret::List(caret);
        }
        self.dirty = true;
    }

    /// Drops list blocks whose last item was moved out.
    fn prune_empty_lists(&mut self) {
        let mut index = 0;
        while index < self.blocks.len() {
            let empty = matches!(&self.blocks[index], DocBlock::List(list) if list.first_item().is_none());
            if !empty || self.blocks.len() == 1 {
                index += 1;
                continue;
            }
            self.blocks.remove(index);
            if self.focus > index {
                self.focus -= 1;
            } else if self.focus == index {
                let target = index.min(self.blocks.len() - 1);
                self.focus_block(target, CaretPosition::Start);
            }
        }
    }

    fn handle_paragraph_key(&mut self, key: KeyEvent) {
        let index = self.focus;
        let BlockCaret::Paragraph(offset) = self.caret else {
            return;
        };
        let Some(DocBlock::Paragraph(text)) = self.blocks.get_mut(index) else {
            return;
        };

        match key.code {
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                *text = insert_text_at(text, offset, &ch.to_string());
                self.caret = BlockCaret::Paragraph(offset + 1);
                self.dirty = true;
            }
            KeyCode::Backspace if offset > 0 => {
                *text = remove_before(text, offset);
                self.caret = BlockCaret::Paragraph(offset - 1);
                self.dirty = true;
            }
            KeyCode::Backspace => self.join_paragraph_with_previous(index),
            KeyCode::Enter => {
                let (head, tail) = split_at(text, offset);
                *text = head;
                self.blocks.insert(index + 1, DocBlock::Paragraph(tail));
                self.focus_block(index + 1, CaretPosition::Start);
                self.dirty = true;
            }
            _ => {}
        }
    }

    fn join_paragraph_with_previous(&mut self, index: usize) {
        let Some(previous) = index.checked_sub(1) else {
            return;
        };
        match self.blocks.get(previous) {
            Some(DocBlock::Paragraph(_)) => {
                let DocBlock::Paragraph(text) = self.blocks.remove(index) else {
                    return;
                };
                if let Some(DocBlock::Paragraph(target)) = self.blocks.get_mut(previous) {
                    let offset = visible_len(target);
                    target.push_str(&text);
                    self.focus = previous;
                    self.caret = BlockCaret::Paragraph(offset);
                    self.dirty = true;
                }
            }
            Some(DocBlock::List(_)) => {
                let is_empty = matches!(self.blocks.get(index), Some(DocBlock::Paragraph(text)) if text.is_empty());
                if is_empty {
                    self.blocks.remove(index);
                    self.dirty = true;
                }
                self.focus_block(previous, CaretPosition::End);
            }
            None => {}
        }
    }

    fn focus_block(&mut self, index: usize, position: CaretPosition) {
        let Some(block) = self.blocks.get(index) else {
            return;
        };
        let caret = match block {
            DocBlock::Paragraph(text) => BlockCaret::Paragraph(match position {
                CaretPosition::Start => 0,
                CaretPosition::End => visible_len(text),
            }),
            DocBlock::List(list) => {
                let item = match position {
                    CaretPosition::Start => list.first_item(),
                    CaretPosition::End => list.root().and_then(|root| {
                        get_wrapper_items(list.tree(), root, false).last().copied()
                    }),
                };
                let Some(item) = item else {
                    return;
                };
                BlockCaret::List(match position {
                    CaretPosition::Start => Caret::at_start(item),
                    CaretPosition::End => Caret::at_end(list.tree(), item),
                })
            }
        };
        self.focus = index;
        self.caret = caret;
    }

    fn move_horizontal(&mut self, forward: bool) {
        let moved = match (self.caret, self.blocks.get(self.focus)) {
            (BlockCaret::Paragraph(offset), Some(DocBlock::Paragraph(text))) => {
                let target = if forward {
                    (offset < visible_len(text)).then_some(offset + 1)
                } else {
                    offset.checked_sub(1)
                };
                if let Some(target) = target {
                    self.caret = BlockCaret::Paragraph(target);
                }
                target.is_some()
            }
            (BlockCaret::List(mut caret), Some(DocBlock::List(list))) => {
                let moved = list.root().is_some_and(|root| {
                    if forward {
                        caret.move_right(list.tree(), root)
                    } else {
                        caret.move_left(list.tree(), root)
                    }
                });
                self.caret = BlockCaret::List(caret);
                moved
            }
            _ => false,
        };
        if !moved {
            self.move_to_neighbour_block(forward);
        }
    }

    fn move_vertical(&mut self, down: bool) {
        let moved = match (self.caret, self.blocks.get(self.focus)) {
            (BlockCaret::List(mut caret), Some(DocBlock::List(list))) => {
                let moved = list.root().is_some_and(|root| {
                    if down {
                        caret.move_down(list.tree(), root)
                    } else {
                        caret.move_up(list.tree(), root)
                    }
                });
                self.caret = BlockCaret::List(caret);
                moved
            }
            _ => false,
        };
        if !moved {
            self.move_to_neighbour_block(down);
        }
    }

    fn move_to_neighbour_block(&mut self, forward: bool) {
        if forward {
            if self.focus + 1 < self.blocks.len() {
                self.focus_block(self.focus + 1, CaretPosition::Start);
            }
        } else if let Some(previous) = self.focus.checked_sub(1) {
            self.focus_block(previous, CaretPosition::End);
        }
    }

    fn move_home(&mut self) {
        self.caret = match self.caret {
            BlockCaret::Paragraph(_) => BlockCaret::Paragraph(0),
            BlockCaret::List(mut caret) => {
                caret.move_home();
                BlockCaret::List(caret)
            }
        };
    }

    fn move_end(&mut self) {
        match (self.caret, self.blocks.get(self.focus)) {
            (BlockCaret::Paragraph(_), Some(DocBlock::Paragraph(text))) => {
                self.caret = BlockCaret::Paragraph(visible_len(text));
            }
            (BlockCaret::List(mut caret), Some(DocBlock::List(list))) => {
                caret.move_end(list.tree());
                self.caret = BlockCaret::List(caret);
            }
            _ => {}
        }
    }

    fn toggle_checkbox(&mut self) {
        let BlockCaret::List(caret) = self.caret else {
            return;
        };
        let Some(DocBlock::List(list)) = self.blocks.get_mut(self.focus) else {
            return;
        };
        if let Some(checked) = list.toggle_checkbox(caret.item) {
            self.dirty = true;
            let state = if checked { "Checked" } else { "Unchecked" };
            self.set_status(state);
        }
    }

    fn on_tick(&mut self) {
        self.prune_status_message();
    }

    fn save(&mut self) -> Result<()> {
        if self.read_only {
            self.set_status("Read-only: not saved");
            return Ok(());
        }
        let blocks: Vec<BlockData> = self.blocks.iter().map(DocBlock::to_data).collect();
        let contents =
            serde_json::to_string_pretty(&blocks).context("failed to serialize blocks")?;
        fs::write(&self.file_path, contents)
            .with_context(|| format!("failed to write {}", self.file_path.display()))?;
        info!(
            "saved {} blocks to {}",
            blocks.len(),
            self.file_path.display()
        );

        self.dirty = false;
        self.set_status("Saved");
        Ok(())
    }
}
