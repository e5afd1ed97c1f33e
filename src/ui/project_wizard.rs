use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{NewProject, Project, ProjectUpdate};

#[derive(Debug, PartialEq)]
pub enum ProjectWizardAction {
    Cancel,
    Create(NewProject),
    Import(NewProject),
    Update(i64, ProjectUpdate),
    Invalid(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WizardMode {
    Add,
    Import,
    Update(i64),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ProjectField {
    Name,
    Description,
    Link,
}

pub struct ProjectWizardState {
    pub mode: WizardMode,
    pub name: String,
    pub description: String,
    pub link: String,
    pub current_field: ProjectField,
    pub editing: bool,
}

impl ProjectWizardState {
    pub fn new() -> Self {
        Self::blank(WizardMode::Add)
    }

    pub fn import() -> Self {
        Self::blank(WizardMode::Import)
    }

    fn blank(mode: WizardMode) -> Self {
        Self {
            mode,
            name: String::new(),
            description: String::new(),
            link: String::new(),
            current_field: ProjectField::Name,
            editing: false,
        }
    }

    /// Only description and link can change once a project exists.
    pub fn from_existing(project: Project) -> Self {
        Self {
            mode: WizardMode::Update(project.id),
            name: project.name,
            description: project.description,
            link: project.link,
            current_field: ProjectField::Description,
            editing: false,
        }
    }

    fn name_is_locked(&self) -> bool {
        matches!(self.mode, WizardMode::Update(_))
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Name => ProjectField::Description,
            ProjectField::Description => ProjectField::Link,
            ProjectField::Link if self.name_is_locked() => ProjectField::Description,
            ProjectField::Link => ProjectField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Name => ProjectField::Link,
            ProjectField::Description if self.name_is_locked() => ProjectField::Link,
            ProjectField::Description => ProjectField::Name,
            ProjectField::Link => ProjectField::Description,
        };
    }

    fn current_value_mut(&mut self) -> Option<&mut String> {
        match self.current_field {
            ProjectField::Name if self.name_is_locked() => None,
            ProjectField::Name => Some(&mut self.name),
            ProjectField::Description => Some(&mut self.description),
            ProjectField::Link => Some(&mut self.link),
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        if let Some(value) = self.current_value_mut() {
            match key {
                KeyCode::Char(c) => value.push(c),
                KeyCode::Backspace => {
                    value.pop();
                }
                _ => {}
            }
        }
    }

    fn link_label(&self) -> &'static str {
        match self.mode {
            WizardMode::Import => "File Path",
            _ => "Link",
        }
    }

    /// Build the action for the save key. Name validation is left to the repository.
    pub fn submit(&self) -> ProjectWizardAction {
        match self.mode {
            WizardMode::Add => ProjectWizardAction::Create(NewProject::new(
                self.name.clone(),
                self.description.clone(),
                self.link.clone(),
            )),
            WizardMode::Import => {
                let path = self.link.trim();
                if path.is_empty() {
                    return ProjectWizardAction::Invalid("File path cannot be empty!");
                }
                ProjectWizardAction::Import(NewProject::import(
                    self.name.clone(),
                    self.description.clone(),
                    path,
                ))
            }
            WizardMode::Update(id) => ProjectWizardAction::Update(
                id,
                ProjectUpdate::new(self.description.clone(), self.link.clone()),
            ),
        }
    }
}

impl Default for ProjectWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = match state.mode {
        WizardMode::Add => "Add Project",
        WizardMode::Import => "Import Project",
        WizardMode::Update(_) => "Update Project",
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = if state.editing {
        "Enter - Save field | Esc - Stop editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save project | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &ProjectWizardState, area: Rect) {
    let fields = [
        (ProjectField::Name, "Name", state.name.as_str()),
        (ProjectField::Description, "Description", state.description.as_str()),
        (ProjectField::Link, state.link_label(), state.link.as_str()),
    ];

    let items: Vec<ListItem> = fields
        .iter()
        .map(|(field, label, value)| {
            let selected = *field == state.current_field;
            let locked = *field == ProjectField::Name && state.name_is_locked();

            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else if locked {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };

            let value_span = if selected && state.editing {
                Span::styled(
                    format!("{}|", value),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(value.to_string())
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", label), label_style),
                value_span,
            ]))
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Project Details"));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ProjectWizardState) -> Result<Option<ProjectWizardAction>> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            return Ok(handle_key(state, key.code));
        }
    }
    Ok(None)
}

pub fn handle_key(state: &mut ProjectWizardState, code: KeyCode) -> Option<ProjectWizardAction> {
    match code {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(ProjectWizardAction::Cancel);
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => return Some(state.submit()),
        _ if state.editing => state.edit_current_field(code),
        _ => {}
    }

    None
}
