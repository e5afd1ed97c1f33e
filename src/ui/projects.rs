use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::models::{Project, ProjectSummary};
use crate::ui::components::notice::centered_rect;

// Represents the state of the project list screen
pub struct ProjectsState {
    projects: Vec<ProjectSummary>,
    list_state: ListState,
    details: Option<Project>,
    show_delete_confirmation: bool,
}

impl ProjectsState {
    pub fn new(projects: Vec<ProjectSummary>) -> Self {
        let mut list_state = ListState::default();
        if !projects.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            projects,
            list_state,
            details: None,
            show_delete_confirmation: false,
        }
    }

    pub fn next(&mut self) {
        if self.projects.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= self.projects.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.projects.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.projects.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Move the cursor onto `id` if it is listed
    pub fn select_id(&mut self, id: i64) {
        if let Some(i) = self.projects.iter().position(|p| p.id == id) {
            self.list_state.select(Some(i));
        }
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.show_delete_confirmation
    }

    pub fn selected_project(&self) -> Option<&ProjectSummary> {
        self.list_state.selected().and_then(|i| self.projects.get(i))
    }

    pub fn selected_project_id(&self) -> Option<i64> {
        self.selected_project().map(|p| p.id)
    }

    pub fn set_details(&mut self, details: Option<Project>) {
        self.details = details;
    }
}

#[derive(Debug, PartialEq)]
pub enum ProjectAction {
    Quit,
    AddProject,
    ImportProject,
    UpdateProject(i64),
    DeleteProject(i64),
    SelectionChanged(i64),
    NoSelection,
}

pub fn render_projects<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(3),
                Constraint::Length(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    let items: Vec<ListItem> = state
        .projects
        .iter()
        .map(|project| ListItem::new(format!("{}: {}", project.id, project.name)))
        .collect();

    let projects_list = List::new(items)
        .block(Block::default().title("Projects").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(projects_list, chunks[0], &mut state.list_state);

    render_details(frame, state, chunks[1]);

    let buttons_text = if state.selected_project().is_some() {
        "<A> Add | <U> Update | <D> Delete | <I> Import | <Q> Quit"
    } else {
        "<A> Add | <I> Import | <Q> Quit"
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[2]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_details<B: Backend>(frame: &mut Frame<B>, state: &ProjectsState, area: Rect) {
    let label = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let lines = match &state.details {
        Some(project) => {
            let description = if project.description.is_empty() {
                "No description provided."
            } else {
                project.description.as_str()
            };

            let mut lines = vec![
                Spans::from(vec![Span::styled("Name: ", label), Span::raw(project.name.clone())]),
                Spans::from(vec![
                    Span::styled("Description: ", label),
                    Span::raw(description.to_string()),
                ]),
                Spans::from(vec![
                    Span::styled("Created At: ", label),
                    Span::raw(project.created_at.clone()),
                ]),
            ];
            if !project.link.is_empty() {
                lines.push(Spans::from(vec![
                    Span::styled("Link: ", label),
                    Span::styled(
                        project.link.clone(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
                    ),
                ]));
            }
            lines
        }
        None => vec![Spans::from("Select a project to see details.")],
    };

    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Details").borders(Borders::ALL));

    frame.render_widget(details, area);
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(60, 30, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this project?"),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(tui::widgets::Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

pub fn handle_input(state: &mut ProjectsState) -> Result<Option<ProjectAction>> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            return Ok(handle_key(state, key.code));
        }
    }
    Ok(None)
}

pub fn handle_key(state: &mut ProjectsState, code: KeyCode) -> Option<ProjectAction> {
    if state.show_delete_confirmation {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                state.toggle_delete_confirmation();
                return state.selected_project_id().map(ProjectAction::DeleteProject);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                state.toggle_delete_confirmation();
            }
            _ => {}
        }
        return None;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(ProjectAction::Quit),
        KeyCode::Char('a') => Some(ProjectAction::AddProject),
        KeyCode::Char('i') => Some(ProjectAction::ImportProject),
        KeyCode::Char('u') => Some(
            state
                .selected_project_id()
                .map_or(ProjectAction::NoSelection, ProjectAction::UpdateProject),
        ),
        KeyCode::Char('d') => {
            if state.selected_project().is_some() {
                state.toggle_delete_confirmation();
                None
            } else {
                Some(ProjectAction::NoSelection)
            }
        }
        KeyCode::Down => {
            state.next();
            state.selected_project_id().map(ProjectAction::SelectionChanged)
        }
        KeyCode::Up => {
            state.previous();
            state.selected_project_id().map(ProjectAction::SelectionChanged)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_support::buffer_text;
    use tui::{backend::TestBackend, Terminal};

    fn summaries(names: &[&str]) -> Vec<ProjectSummary> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| ProjectSummary {
                id: i as i64 + 1,
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn navigation_wraps_and_reports_selection() {
        let mut state = ProjectsState::new(summaries(&["a", "b", "c"]));
        assert_eq!(state.selected_project_id(), Some(1));

        assert_eq!(handle_key(&mut state, KeyCode::Up), Some(ProjectAction::SelectionChanged(3)));
        assert_eq!(handle_key(&mut state, KeyCode::Down), Some(ProjectAction::SelectionChanged(1)));
        assert_eq!(handle_key(&mut state, KeyCode::Down), Some(ProjectAction::SelectionChanged(2)));
    }

    #[test]
    fn empty_list_has_no_selection() {
        let mut state = ProjectsState::new(Vec::new());
        assert_eq!(handle_key(&mut state, KeyCode::Down), None);
        assert_eq!(handle_key(&mut state, KeyCode::Char('u')), Some(ProjectAction::NoSelection));
        assert_eq!(handle_key(&mut state, KeyCode::Char('d')), Some(ProjectAction::NoSelection));
        assert!(!state.is_confirming_delete());
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut state = ProjectsState::new(summaries(&["a", "b"]));
        state.select_id(2);

        assert_eq!(handle_key(&mut state, KeyCode::Char('d')), None);
        assert!(state.is_confirming_delete());

        // Other keys are swallowed while the prompt is up
        assert_eq!(handle_key(&mut state, KeyCode::Char('a')), None);
        assert_eq!(handle_key(&mut state, KeyCode::Char('y')), Some(ProjectAction::DeleteProject(2)));
        assert!(!state.is_confirming_delete());
    }

    #[test]
    fn delete_can_be_declined() {
        let mut state = ProjectsState::new(summaries(&["a"]));
        handle_key(&mut state, KeyCode::Char('d'));
        assert_eq!(handle_key(&mut state, KeyCode::Char('n')), None);
        assert!(!state.is_confirming_delete());
        assert_eq!(handle_key(&mut state, KeyCode::Char('q')), Some(ProjectAction::Quit));
    }

    #[test]
    fn update_targets_selected_project() {
        let mut state = ProjectsState::new(summaries(&["a", "b"]));
        state.select_id(2);
        assert_eq!(handle_key(&mut state, KeyCode::Char('u')), Some(ProjectAction::UpdateProject(2)));
        assert_eq!(handle_key(&mut state, KeyCode::Char('a')), Some(ProjectAction::AddProject));
        assert_eq!(handle_key(&mut state, KeyCode::Char('i')), Some(ProjectAction::ImportProject));
    }

    #[test]
    fn renders_list_and_details() {
        let mut state = ProjectsState::new(summaries(&["Site", "Blog"]));
        state.set_details(Some(Project {
            id: 1,
            name: "Site".into(),
            description: String::new(),
            link: "http://x".into(),
            created_at: "2024-05-01 10:00:00".into(),
        }));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|f| render_projects(f, &mut state)).unwrap();

        let text = buffer_text(terminal.backend());
        assert!(text.contains("1: Site"));
        assert!(text.contains("2: Blog"));
        assert!(text.contains("No description provided."));
        assert!(text.contains("2024-05-01 10:00:00"));
        assert!(text.contains("http://x"));
    }

    #[test]
    fn renders_placeholder_without_details() {
        let mut state = ProjectsState::new(Vec::new());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|f| render_projects(f, &mut state)).unwrap();

        assert!(buffer_text(terminal.backend()).contains("Select a project to see details."));
    }
}
