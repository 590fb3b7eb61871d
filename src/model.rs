use arboard::Clipboard;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, trace};

use crate::domain::{Control, HELP_TEXT, Message, TableConfig, TableError};
use crate::filter::{self, FilterState};
use crate::inputter::{InputResult, Inputter};
use crate::record::{CATEGORIES, Record, STATUSES, TYPES};
use crate::render::{Counter, HtmlRenderer};
use crate::table::Dataset;
use crate::ui::TABLE_CHROME_HEIGHT;

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
}

/// A single-select control over a closed option set. `None` is the
/// "All" entry, i.e. unset.
#[derive(Debug, Clone)]
pub struct Select {
    label: &'static str,
    options: &'static [&'static str],
    selected: Option<usize>,
}

impl Select {
    pub fn new(label: &'static str, options: &'static [&'static str]) -> Self {
        Self {
            label,
            options,
            selected: None,
        }
    }

    /// The control value, empty when unset.
    pub fn value(&self) -> &'static str {
        self.selected.map(|idx| self.options[idx]).unwrap_or("")
    }

    pub fn set(&mut self, value: &str) -> Result<(), TableError> {
        let value = filter::validate_option(self.label, value, self.options)?;
        self.selected = self.options.iter().position(|o| *o == value);
        Ok(())
    }

    pub fn next(&mut self) {
        self.selected = match self.selected {
            None if !self.options.is_empty() => Some(0),
            Some(idx) if idx + 1 < self.options.len() => Some(idx + 1),
            _ => None,
        };
    }

    pub fn previous(&mut self) {
        self.selected = match self.selected {
            None => self.options.len().checked_sub(1),
            Some(0) => None,
            Some(idx) => Some(idx - 1),
        };
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

pub struct UIData {
    pub name: String,
    pub search: InputResult,
    pub category: String,
    pub kind: String,
    pub status: String,
    pub focus: Control,
    pub rows: Vec<[String; 6]>,
    pub selected_row: usize,
    pub counter: Counter,
    pub show_empty_state: bool,
    pub show_popup: bool,
    pub popup_message: String,
    pub status_message: String,
    pub last_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            search: InputResult::default(),
            category: String::new(),
            kind: String::new(),
            status: String::new(),
            focus: Control::Search,
            rows: Vec::new(),
            selected_row: 0,
            counter: Counter::new(0, 0),
            show_empty_state: true,
            show_popup: false,
            popup_message: String::new(),
            status_message: String::new(),
            last_update: Instant::now(),
        }
    }
}

pub struct Model {
    config: TableConfig,
    pub status: Status,
    modus: Modus,
    dataset: Dataset,
    visible: Vec<usize>, // Dataset indices of the rows currently shown, in dataset order
    input: Inputter,
    category_select: Select,
    type_select: Select,
    status_select: Select,
    focus: Control,
    curser_row: usize,
    table_height: usize,
    uidata: UIData,
    status_message: String,
}

impl Model {
    pub fn init(config: &TableConfig, dataset: Dataset) -> Result<Self, TableError> {
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            dataset,
            visible: Vec::new(),
            input: Inputter::default(),
            category_select: Select::new("category", &CATEGORIES),
            type_select: Select::new("type", &TYPES),
            status_select: Select::new("status", &STATUSES),
            focus: Control::Search,
            curser_row: 0,
            table_height: 0,
            uidata: UIData::empty(),
            status_message: String::new(),
        };
        info!("Initializing table with {} records", model.dataset.len());
        model.status_message = format!("Loaded {} records", model.dataset.len());
        model.filter_and_render();
        Ok(model)
    }

    /// Preset the controls, e.g. from the command line, and re-render.
    pub fn set_filters(
        &mut self,
        search: &str,
        category: &str,
        kind: &str,
        status: &str,
    ) -> Result<(), TableError> {
        self.input.set(search);
        self.category_select.set(category)?;
        self.type_select.set(kind)?;
        self.status_select.set(status)?;
        self.filter_and_render();
        Ok(())
    }

    pub fn filter_state(&self) -> FilterState {
        FilterState::from_controls(
            self.input.value(),
            self.category_select.value(),
            self.type_select.value(),
            self.status_select.value(),
        )
    }

    pub fn visible_records(&self) -> Vec<&Record> {
        self.visible
            .iter()
            .filter_map(|&idx| self.dataset.get(idx))
            .collect()
    }

    pub fn counter(&self) -> Counter {
        Counter::new(self.visible.len(), self.dataset.len())
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    /// Search keystrokes go to the search field only while it has focus.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::TABLE && self.focus == Control::Search
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TableError> {
        if let Some(msg) = message {
            trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::FocusNext => self.set_focus(self.focus.next()),
                    Message::FocusPrevious => self.set_focus(self.focus.previous()),
                    Message::NextOption => self.change_option(true),
                    Message::PreviousOption => self.change_option(false),
                    Message::Activate => {
                        if self.focus == Control::Reset {
                            self.reset();
                        }
                    }
                    Message::Reset => self.reset(),
                    Message::MoveUp => self.move_selection_up(1),
                    Message::MoveDown => self.move_selection_down(1),
                    Message::MovePageUp => self.move_selection_up(self.page_size()),
                    Message::MovePageDown => self.move_selection_down(self.page_size()),
                    Message::CopyRow => self.copy_row(),
                    Message::ExportHtml => {
                        let path = self.config.export_file.clone();
                        if let Err(e) = self.export_html(&path) {
                            error!("Export to {:?} failed: {:?}", path, e);
                            self.set_status_message(format!("Export failed: {e}"));
                        }
                    }
                    Message::Help => self.show_help(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::RawKey(key) => self.raw_input(key),
                    Message::Exit => {}
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit => self.exit(),
                    _ => (),
                },
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    /// One full pass: read the controls, filter the dataset, rebuild the rows
    /// and the counter.
    fn filter_and_render(&mut self) {
        let state = self.filter_state();
        debug!("Filtering with {:?}", state);
        self.visible = filter::apply(self.dataset.records(), &state);
        if self.curser_row >= self.visible.len() {
            self.curser_row = self.visible.len().saturating_sub(1);
        }
        info!("Filtered results: {} records", self.visible.len());
        self.update_uidata();
    }

    fn reset(&mut self) {
        info!("Resetting all filters");
        self.input.clear();
        self.category_select.clear();
        self.type_select.clear();
        self.status_select.clear();
        self.curser_row = 0;
        self.set_status_message("Filters reset");
        self.filter_and_render();
    }

    fn set_focus(&mut self, focus: Control) {
        trace!("Focus {:?} -> {:?}", self.focus, focus);
        self.focus = focus;
        self.uidata.focus = focus;
        self.uidata.last_update = Instant::now();
    }

    fn focused_select(&mut self) -> Option<&mut Select> {
        match self.focus {
            Control::Category => Some(&mut self.category_select),
            Control::Type => Some(&mut self.type_select),
            Control::Status => Some(&mut self.status_select),
            Control::Search | Control::Reset => None,
        }
    }

    fn change_option(&mut self, forward: bool) {
        if let Some(select) = self.focused_select() {
            if forward {
                select.next();
            } else {
                select.previous();
            }
            debug!("{} changed: {:?}", select.label, select.value());
            self.filter_and_render();
        }
    }

    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        if !self.raw_keyevents() {
            return;
        }
        let result = self.input.read(key);
        if result.changed {
            debug!("Search input changed: {:?}", result.input);
            self.filter_and_render();
        } else {
            self.uidata.search = result;
            self.uidata.last_update = Instant::now();
        }
    }

    fn show_help(&mut self) {
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
        self.uidata.last_update = Instant::now();
    }

    fn exit(&mut self) {
        if self.modus == Modus::POPUP {
            trace!("Close popup ...");
            self.modus = Modus::TABLE;
            self.uidata.show_popup = false;
            self.uidata.last_update = Instant::now();
        }
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!("UI was resized! w:{}, h:{}->{}", width, self.table_height, height);
        self.table_height = height.saturating_sub(TABLE_CHROME_HEIGHT);
    }

    fn page_size(&self) -> usize {
        self.table_height.max(1)
    }

    fn move_selection_up(&mut self, size: usize) {
        self.curser_row = self.curser_row.saturating_sub(size);
        self.uidata.selected_row = self.curser_row;
        self.uidata.last_update = Instant::now();
    }

    fn move_selection_down(&mut self, size: usize) {
        let last = self.visible.len().saturating_sub(1);
        self.curser_row = (self.curser_row + size).min(last);
        self.uidata.selected_row = self.curser_row;
        self.uidata.last_update = Instant::now();
    }

    fn selected_record(&self) -> Option<&Record> {
        self.visible
            .get(self.curser_row)
            .and_then(|&idx| self.dataset.get(idx))
    }

    fn copy_row(&mut self) {
        let Some(row) = self.selected_record().map(Record::as_csv_row) else {
            self.set_status_message("Nothing to copy");
            return;
        };
        trace!("Row content: {}", row);

        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(row)) {
            Ok(_) => {
                trace!("Copied row to clipboard.");
                self.set_status_message("Copied row to clipboard");
            }
            Err(e) => {
                error!("Error copying to clipboard: {:?}", e);
                self.set_status_message("Clipboard not available");
            }
        }
    }

    /// Write the current view, controls included, as a static html page.
    pub fn export_html(&mut self, path: &Path) -> Result<(), TableError> {
        let html = HtmlRenderer::render_page(
            self.dataset.name(),
            self.input.value(),
            &self.filter_state(),
            &self.visible_records(),
            self.counter(),
        );
        fs::write(path, html)?;
        info!("Exported {} records to {:?}", self.visible.len(), path);
        self.set_status_message(format!(
            "Exported {} records to {}",
            self.visible.len(),
            path.display()
        ));
        Ok(())
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_update = Instant::now();
    }

    fn update_uidata(&mut self) {
        let rows = self
            .visible_records()
            .iter()
            .map(|r| r.cells())
            .collect::<Vec<_>>();

        self.uidata = UIData {
            name: self.dataset.name().to_string(),
            search: self.input.get(),
            category: self.category_select.value().to_string(),
            kind: self.type_select.value().to_string(),
            status: self.status_select.value().to_string(),
            focus: self.focus,
            show_empty_state: rows.is_empty(),
            rows,
            selected_row: self.curser_row,
            counter: self.counter(),
            show_popup: self.modus == Modus::POPUP,
            popup_message: self.uidata.popup_message.clone(),
            status_message: self.status_message.clone(),
            last_update: Instant::now(),
        };
    }
}
