use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use portfolio_manager::{
    config,
    db::{self, Database},
    logging,
    ui::{
        components::notice::{self, render_notice, Notice},
        project_wizard::{
            handle_input as handle_project_wizard_input, render_project_wizard,
            ProjectWizardAction, ProjectWizardState,
        },
        projects::{handle_input as handle_projects_input, render_projects, ProjectAction, ProjectsState},
    },
};

/// Track portfolio projects in a local SQLite database
#[derive(Parser, Debug)]
#[command(name = "portfolio_manager", version)]
struct Cli {
    /// Database file, overrides PORTFOLIO_DATABASE_PATH
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Log file, overrides PORTFOLIO_LOG_FILE
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// Represents the current screen in the app
enum AppScreen {
    Projects,
    ProjectWizard,
}

// Main application state
struct AppState {
    db: Database,
    screen: AppScreen,
    projects_state: ProjectsState,
    project_wizard_state: Option<ProjectWizardState>,
    notice: Option<Notice>,
}

impl AppState {
    fn new(db: Database) -> Self {
        Self {
            db,
            screen: AppScreen::Projects,
            projects_state: ProjectsState::new(Vec::new()),
            project_wizard_state: None,
            notice: None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init()?.with_overrides(cli.database, cli.log_file);
    logging::init(&config)?;

    // Failing to open storage is the one fatal path
    let db = db::init(&config).await?;

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(db);

    let result = match load_projects_screen(&mut app_state, None).await {
        Ok(()) => run_app(&mut terminal, &mut app_state).await,
        Err(err) => Err(err),
    };

    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app_state.db.close().await;

    if let Err(err) = result {
        tracing::error!(error = %err, "portfolio manager stopped");
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| {
            match app_state.screen {
                AppScreen::Projects => render_projects(f, &mut app_state.projects_state),
                AppScreen::ProjectWizard => {
                    if let Some(state) = &mut app_state.project_wizard_state {
                        render_project_wizard(f, state);
                    }
                }
            }
            if let Some(notice) = &app_state.notice {
                render_notice(f, notice);
            }
        })?;

        if app_state.notice.is_some() {
            if notice::handle_input()? {
                app_state.notice = None;
            }
            continue;
        }

        let should_quit = match app_state.screen {
            AppScreen::Projects => handle_projects_screen(app_state).await?,
            AppScreen::ProjectWizard => handle_project_wizard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

/// Reload the list, optionally moving the cursor onto `select`
async fn load_projects_screen(app_state: &mut AppState, select: Option<i64>) -> Result<()> {
    let projects = app_state.db.list_projects().await?;

    app_state.projects_state = ProjectsState::new(projects);
    if let Some(id) = select {
        app_state.projects_state.select_id(id);
    }
    app_state.project_wizard_state = None;
    app_state.screen = AppScreen::Projects;

    refresh_details(app_state).await
}

async fn refresh_details(app_state: &mut AppState) -> Result<()> {
    let details = match app_state.projects_state.selected_project_id() {
        Some(id) => app_state.db.get_project(id).await?,
        None => None,
    };
    app_state.projects_state.set_details(details);
    Ok(())
}

/// Turn validation and absence errors into a notice, propagate the rest
fn show_user_error(app_state: &mut AppState, err: db::Error) -> Result<()> {
    if err.is_user_facing() {
        app_state.notice = Some(Notice::error(err.to_string()));
        Ok(())
    } else {
        Err(err.into())
    }
}

async fn handle_projects_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_projects_input(&mut app_state.projects_state)? {
        Some(ProjectAction::Quit) => return Ok(true),
        Some(ProjectAction::AddProject) => {
            app_state.project_wizard_state = Some(ProjectWizardState::new());
            app_state.screen = AppScreen::ProjectWizard;
        }
        Some(ProjectAction::ImportProject) => {
            app_state.project_wizard_state = Some(ProjectWizardState::import());
            app_state.screen = AppScreen::ProjectWizard;
        }
        Some(ProjectAction::UpdateProject(id)) => match app_state.db.require_project(id).await {
            Ok(project) => {
                app_state.project_wizard_state = Some(ProjectWizardState::from_existing(project));
                app_state.screen = AppScreen::ProjectWizard;
            }
            Err(err) => {
                show_user_error(app_state, err)?;
                load_projects_screen(app_state, None).await?;
            }
        },
        Some(ProjectAction::DeleteProject(id)) => {
            if app_state.db.delete_project(id).await? == 0 {
                show_user_error(app_state, db::Error::NotFound(id))?;
            } else {
                app_state.notice = Some(Notice::info("Project deleted successfully!"));
            }
            load_projects_screen(app_state, None).await?;
        }
        Some(ProjectAction::SelectionChanged(_)) => refresh_details(app_state).await?,
        Some(ProjectAction::NoSelection) => {
            app_state.notice = Some(Notice::error("No project selected!"));
        }
        None => {}
    }

    Ok(false)
}

async fn handle_project_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if app_state.project_wizard_state.is_none() {
        load_projects_screen(app_state, None).await?;
        return Ok(false);
    }

    let action = match app_state.project_wizard_state.as_mut() {
        Some(state) => handle_project_wizard_input(state)?,
        None => None,
    };

    match action {
        Some(ProjectWizardAction::Cancel) => {
            let selected = app_state.projects_state.selected_project_id();
            load_projects_screen(app_state, selected).await?;
        }
        Some(ProjectWizardAction::Create(project)) => {
            match app_state.db.create_project(&project).await {
                Ok(id) => {
                    load_projects_screen(app_state, Some(id)).await?;
                    app_state.notice = Some(Notice::info(format!(
                        "Project '{}' added successfully!",
                        project.name
                    )));
                }
                Err(err) => show_user_error(app_state, err)?,
            }
        }
        Some(ProjectWizardAction::Import(project)) => {
            match app_state.db.create_project(&project).await {
                Ok(id) => {
                    load_projects_screen(app_state, Some(id)).await?;
                    app_state.notice = Some(Notice::info(format!(
                        "Project '{}' imported successfully!",
                        project.name
                    )));
                }
                Err(err) => show_user_error(app_state, err)?,
            }
        }
        Some(ProjectWizardAction::Update(id, update)) => {
            if app_state.db.update_project(id, &update).await? == 0 {
                show_user_error(app_state, db::Error::NotFound(id))?;
                load_projects_screen(app_state, None).await?;
            } else {
                load_projects_screen(app_state, Some(id)).await?;
                app_state.notice = Some(Notice::info("Project updated successfully!"));
            }
        }
        Some(ProjectWizardAction::Invalid(message)) => {
            app_state.notice = Some(Notice::error(message));
        }
        None => {}
    }

    Ok(false)
}
