mod backend;
mod config;
mod db;
mod error;
mod ledger;
mod models;
mod service;
mod session;
mod storage;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use uuid::Uuid;

use crate::config::{Cli, Config};
use crate::error::LedgerResult;
use crate::models::SessionUser;
use crate::service::Ledger;
use crate::session::Session;
use crate::storage::{Attachment, FileStorage};
use crate::ui::{
    attachments::{self, AttachmentAction, AttachmentsState},
    dashboard::{self, DashboardAction, DashboardState},
    home,
    invoice_wizard::{self, InvoiceWizardAction, InvoiceWizardState},
    login::{self, LoginAction, LoginState},
    notifications::{self, NotificationAction, NotificationsState},
    payroll::{self, PayrollAction, PayrollState},
    project_detail::{self, ProjectDetailAction, ProjectDetailState},
    projects::{self, ProjectAction, ProjectsState},
    render_nav, NavAction, View,
};

// Represents the current screen in the app
enum AppScreen {
    Login(LoginState),
    Dashboard(DashboardState),
    Home,
    Projects(ProjectsState),
    ProjectDetail(ProjectDetailState),
    InvoiceWizard(InvoiceWizardState, Uuid), // Folder to return to
    Attachments(AttachmentsState),
    Payroll(PayrollState),
    Notifications(NotificationsState),
}

impl AppScreen {
    fn for_view(view: View, ledger: &Ledger) -> Self {
        match view {
            View::Dashboard => AppScreen::Dashboard(DashboardState::new(ledger)),
            View::Home => AppScreen::Home,
            View::Projects => AppScreen::Projects(ProjectsState::new(ledger)),
            View::Payroll => AppScreen::Payroll(PayrollState::new()),
            View::Notifications => AppScreen::Notifications(NotificationsState::new()),
        }
    }

    fn view(&self) -> View {
        match self {
            AppScreen::Dashboard(_) => View::Dashboard,
            AppScreen::Home => View::Home,
            AppScreen::Payroll(_) => View::Payroll,
            AppScreen::Notifications(_) => View::Notifications,
            _ => View::Projects,
        }
    }

    /// Inline status text of the current screen, where it has one.
    fn set_message(&mut self, message: Option<String>) {
        let slot = match self {
            AppScreen::Login(s) => &mut s.message,
            AppScreen::Dashboard(s) => &mut s.message,
            AppScreen::Home => return,
            AppScreen::Projects(s) => &mut s.message,
            AppScreen::ProjectDetail(s) => &mut s.message,
            AppScreen::InvoiceWizard(s, _) => &mut s.message,
            AppScreen::Attachments(s) => &mut s.message,
            AppScreen::Payroll(s) => &mut s.message,
            AppScreen::Notifications(s) => &mut s.message,
        };
        *slot = message;
    }
}

// Main application state
struct AppState {
    ledger: Ledger,
    session_rx: watch::Receiver<Option<SessionUser>>,
    screen: AppScreen,
    login_email: Option<String>,
}

impl AppState {
    fn new(ledger: Ledger, login_email: Option<String>) -> Self {
        let session_rx = ledger.session().subscribe();
        Self {
            ledger,
            session_rx,
            screen: AppScreen::Login(LoginState::new(login_email.clone())),
            login_email,
        }
    }

    /// Show the outcome of a ledger call on the current screen.
    fn report(&mut self, result: LedgerResult<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "operation failed");
                self.screen.set_message(Some(e.to_string()));
                false
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init(&cli)?;
    init_tracing(&config)?;
    println!("Initializing project ledger...");

    // Initialize database connection
    let db = Arc::new(db::init(&config).await?);
    println!("Database connection established");

    let storage = Arc::new(FileStorage::from_config(&config));
    let session = Arc::new(Session::new(db.clone(), config.admin_emails.clone()));
    let ledger = Ledger::new(db, storage, session);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(ledger, cli.email);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "ledger exited with an error");
        println!("Error: {}", err);
    }

    println!("Thanks for using Project Ledger!");

    Ok(())
}

/// Log to a file; the terminal belongs to the UI.
fn init_tracing(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("opening log file {}", config.log_file.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .init();

    info!(log_file = %config.log_file.display(), "logging initialised");
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        if app_state.session_rx.has_changed()? {
            let user = app_state.session_rx.borrow_and_update().clone();
            on_session_change(app_state, user).await;
        }

        let AppState { ledger, screen, .. } = app_state;
        terminal.draw(|f| render(f, screen, ledger))?;

        if handle_screen(app_state).await? {
            break;
        }
    }

    Ok(())
}

async fn on_session_change(app_state: &mut AppState, user: Option<SessionUser>) {
    match user {
        Some(user) => {
            let loaded = app_state.ledger.reload().await;
            app_state.screen = AppScreen::for_view(View::start(user.role), &app_state.ledger);
            app_state.report(loaded);
        }
        None => {
            app_state.ledger.clear();
            app_state.screen = AppScreen::Login(LoginState::new(app_state.login_email.clone()));
        }
    }
}

fn render<B: Backend>(frame: &mut Frame<B>, screen: &mut AppScreen, ledger: &Ledger) {
    if let AppScreen::Login(state) = screen {
        login::render_login(frame, state);
        return;
    }
    let Ok(user) = ledger.viewer() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)].as_ref())
        .split(frame.size());
    let notification_count = if user.is_admin() {
        ledger.notifications().count()
    } else {
        0
    };
    render_nav(frame, chunks[0], &user, screen.view(), notification_count);
    let body = chunks[1];

    match screen {
        AppScreen::Login(_) => {}
        AppScreen::Dashboard(state) => dashboard::render_dashboard(frame, body, state, ledger),
        AppScreen::Home => home::render_home(frame, body, &user, ledger),
        AppScreen::Projects(state) => projects::render_projects(frame, body, state, &user, ledger),
        AppScreen::ProjectDetail(state) => {
            if let Some(folder) = ledger.data().folder(state.folder_id()) {
                project_detail::render_project_detail(frame, body, state, &user, folder);
            }
        }
        AppScreen::InvoiceWizard(state, _) => invoice_wizard::render_invoice_wizard(frame, body, state),
        AppScreen::Attachments(state) => {
            if let Some((_, invoice)) = ledger.data().invoice(state.invoice_id()) {
                attachments::render_attachments(frame, body, state, &user, invoice);
            }
        }
        AppScreen::Payroll(state) => payroll::render_payroll(frame, body, state, ledger),
        AppScreen::Notifications(state) => {
            notifications::render_notifications(frame, body, state, &ledger.notifications())
        }
    }
}

fn folder_ids(ledger: &Ledger) -> Vec<Uuid> {
    ledger.data().folders.iter().map(|f| f.id).collect()
}

async fn handle_screen(app_state: &mut AppState) -> Result<bool> {
    if let AppScreen::Login(_) = app_state.screen {
        return handle_login_screen(app_state).await;
    }
    // Signed out underneath us; the next loop turn shows the login screen.
    let Ok(user) = app_state.ledger.viewer() else {
        return Ok(false);
    };

    match app_state.screen {
        AppScreen::Login(_) => Ok(false),
        AppScreen::Dashboard(_) => handle_dashboard_screen(app_state).await,
        AppScreen::Home => match home::handle_input()? {
            Some(nav) => navigate(app_state, nav).await,
            None => Ok(false),
        },
        AppScreen::Projects(_) => handle_projects_screen(app_state, &user).await,
        AppScreen::ProjectDetail(_) => handle_project_detail_screen(app_state, &user).await,
        AppScreen::InvoiceWizard(..) => handle_invoice_wizard_screen(app_state).await,
        AppScreen::Attachments(_) => handle_attachments_screen(app_state, &user).await,
        AppScreen::Payroll(_) => handle_payroll_screen(app_state).await,
        AppScreen::Notifications(_) => handle_notifications_screen(app_state).await,
    }
}

async fn navigate(app_state: &mut AppState, nav: NavAction) -> Result<bool> {
    match nav {
        NavAction::Go(view) => {
            app_state.screen = AppScreen::for_view(view, &app_state.ledger);
        }
        NavAction::Logout => {
            let session = app_state.ledger.session().clone();
            let result = session.sign_out().await;
            app_state.report(result);
        }
        NavAction::Quit => return Ok(true),
    }
    Ok(false)
}

async fn handle_login_screen(app_state: &mut AppState) -> Result<bool> {
    let AppScreen::Login(state) = &mut app_state.screen else {
        return Ok(false);
    };
    match login::handle_input(state)? {
        Some(LoginAction::Quit) => return Ok(true),
        Some(LoginAction::Submit { email, password }) => {
            let session = app_state.ledger.session().clone();
            if let Err(e) = session.sign_in(&email, &password).await {
                app_state.screen.set_message(Some(e.to_string()));
            }
        }
        None => {}
    }
    Ok(false)
}

async fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    let projects = folder_ids(&app_state.ledger);
    let AppScreen::Dashboard(state) = &mut app_state.screen else {
        return Ok(false);
    };
    match dashboard::handle_input(state, &projects)? {
        Some(DashboardAction::CreateProject(name)) => {
            let result = app_state.ledger.create_project(&name).await;
            app_state.report(result);
        }
        Some(DashboardAction::Nav(nav)) => return navigate(app_state, nav).await,
        None => {}
    }
    Ok(false)
}

async fn handle_projects_screen(app_state: &mut AppState, user: &SessionUser) -> Result<bool> {
    let projects = folder_ids(&app_state.ledger);
    let AppScreen::Projects(state) = &mut app_state.screen else {
        return Ok(false);
    };
    let visible: Vec<Uuid> = state
        .visible(&app_state.ledger.data().folders)
        .iter()
        .map(|f| f.id)
        .collect();

    match projects::handle_input(state, user, &visible, &projects)? {
        Some(ProjectAction::Open(folder_id)) => {
            app_state.screen = AppScreen::ProjectDetail(ProjectDetailState::new(folder_id));
        }
        Some(ProjectAction::ToggleActive(folder_id)) => {
            let result = app_state.ledger.toggle_project_active(folder_id).await;
            app_state.report(result);
        }
        Some(ProjectAction::Delete(folder_id)) => {
            let result = app_state.ledger.delete_folder(folder_id).await;
            app_state.report(result);
        }
        Some(ProjectAction::Nav(nav)) => return navigate(app_state, nav).await,
        None => {}
    }
    Ok(false)
}

async fn handle_project_detail_screen(app_state: &mut AppState, user: &SessionUser) -> Result<bool> {
    let AppScreen::ProjectDetail(state) = &mut app_state.screen else {
        return Ok(false);
    };
    let Some(folder) = app_state.ledger.data().folder(state.folder_id()) else {
        // The folder went away in the last reload.
        app_state.screen = AppScreen::Projects(ProjectsState::new(&app_state.ledger));
        return Ok(false);
    };
    let folder_id = folder.id;

    match project_detail::handle_input(state, user, folder)? {
        Some(ProjectDetailAction::Back) => {
            app_state.screen = AppScreen::Projects(ProjectsState::new(&app_state.ledger));
        }
        Some(ProjectDetailAction::NewInvoice(folder_id)) => {
            let wizard = InvoiceWizardState::new(folder_id, app_state.ledger.today());
            app_state.screen = AppScreen::InvoiceWizard(wizard, folder_id);
        }
        Some(ProjectDetailAction::EditInvoice(invoice_id)) => {
            let today = app_state.ledger.today();
            if let Some((_, invoice)) = app_state.ledger.data().invoice(invoice_id) {
                let wizard = InvoiceWizardState::edit(invoice, today);
                app_state.screen = AppScreen::InvoiceWizard(wizard, folder_id);
            }
        }
        Some(ProjectDetailAction::DeleteInvoice(invoice_id)) => {
            let result = app_state.ledger.delete_invoice(invoice_id).await;
            app_state.report(result);
        }
        Some(ProjectDetailAction::TogglePaid(invoice_id)) => {
            let result = app_state.ledger.toggle_paid(invoice_id).await;
            app_state.report(result);
        }
        Some(ProjectDetailAction::MarkSeen(invoice_id)) => {
            let result = app_state.ledger.mark_seen(invoice_id).await;
            app_state.report(result);
        }
        Some(ProjectDetailAction::OpenFiles(invoice_id)) => {
            app_state.screen = AppScreen::Attachments(AttachmentsState::new(folder_id, invoice_id));
        }
        None => {}
    }
    Ok(false)
}

async fn handle_invoice_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let AppScreen::InvoiceWizard(state, folder_id) = &mut app_state.screen else {
        return Ok(false);
    };
    let folder_id = *folder_id;

    let result = match invoice_wizard::handle_input(state)? {
        Some(InvoiceWizardAction::Cancel) => Ok(()),
        Some(InvoiceWizardAction::Create {
            folder_id,
            amount,
            expected_payment_date,
            attachment,
        }) => {
            let attachment = match attachment {
                Some(path) => match Attachment::read(&path).await {
                    Ok(file) => Some(file),
                    Err(e) => {
                        let message = format!("Could not read {}: {e}", path.display());
                        app_state.screen.set_message(Some(message));
                        return Ok(false);
                    }
                },
                None => None,
            };
            app_state
                .ledger
                .add_invoice(folder_id, amount, expected_payment_date, attachment)
                .await
        }
        Some(InvoiceWizardAction::Update { invoice_id, changes }) => {
            app_state.ledger.update_invoice(invoice_id, changes).await
        }
        None => return Ok(false),
    };

    if app_state.report(result) {
        app_state.screen = AppScreen::ProjectDetail(ProjectDetailState::new(folder_id));
    }
    Ok(false)
}

async fn handle_attachments_screen(app_state: &mut AppState, user: &SessionUser) -> Result<bool> {
    let AppScreen::Attachments(state) = &mut app_state.screen else {
        return Ok(false);
    };
    let folder_id = state.folder_id();
    let Some((_, invoice)) = app_state.ledger.data().invoice(state.invoice_id()) else {
        app_state.screen = AppScreen::ProjectDetail(ProjectDetailState::new(folder_id));
        return Ok(false);
    };

    match attachments::handle_input(state, user, invoice)? {
        Some(AttachmentAction::Back) => {
            let mut detail = ProjectDetailState::new(folder_id);
            if let Some(folder) = app_state.ledger.data().folder(folder_id) {
                detail.select_invoice(folder, state.invoice_id());
            }
            app_state.screen = AppScreen::ProjectDetail(detail);
        }
        Some(AttachmentAction::Add { invoice_id, path }) => {
            let result = match Attachment::read(&path).await {
                Ok(file) => app_state.ledger.add_invoice_file(invoice_id, file).await,
                Err(e) => Err(e),
            };
            app_state.report(result);
        }
        Some(AttachmentAction::DeleteFile(file_id)) => {
            let result = app_state.ledger.delete_invoice_file(file_id).await;
            app_state.report(result);
        }
        Some(AttachmentAction::DeleteLegacy(invoice_id)) => {
            let result = app_state.ledger.delete_legacy_file(invoice_id).await;
            app_state.report(result);
        }
        None => {}
    }
    Ok(false)
}

async fn handle_payroll_screen(app_state: &mut AppState) -> Result<bool> {
    let folders = folder_ids(&app_state.ledger);
    let AppScreen::Payroll(state) = &mut app_state.screen else {
        return Ok(false);
    };
    match payroll::handle_input(state, &folders)? {
        Some(PayrollAction::Add { folder_id, amount }) => {
            let result = app_state.ledger.add_payroll(folder_id, amount).await;
            app_state.report(result);
        }
        Some(PayrollAction::Nav(nav)) => return navigate(app_state, nav).await,
        None => {}
    }
    Ok(false)
}

async fn handle_notifications_screen(app_state: &mut AppState) -> Result<bool> {
    let inbox = app_state.ledger.notifications();
    let AppScreen::Notifications(state) = &mut app_state.screen else {
        return Ok(false);
    };
    match notifications::handle_input(state, &inbox)? {
        Some(NotificationAction::Open {
            folder_id,
            invoice_id,
            unseen,
        }) => {
            if unseen {
                let result = app_state.ledger.mark_seen(invoice_id).await;
                if !app_state.report(result) {
                    return Ok(false);
                }
            }
            let mut detail = ProjectDetailState::new(folder_id);
            if let Some(folder) = app_state.ledger.data().folder(folder_id) {
                detail.select_invoice(folder, invoice_id);
            }
            app_state.screen = AppScreen::ProjectDetail(detail);
        }
        Some(NotificationAction::Nav(nav)) => return navigate(app_state, nav).await,
        None => {}
    }
    Ok(false)
}
