use std::sync::Arc;

use anyhow::{Context, Result};
use helpdesk_app::{
    HeadlessRouter, HelpDeskApp, LoginOutcome, LogoutOutcome, NavigationResult, ScriptedDialogs,
};
use helpdesk_config::HelpDeskConfig;
use helpdesk_domain::{RouteParams, TicketStatus};
use helpdesk_eventbus::{NotificationBus, NotificationBusConfig};
use helpdesk_gateway::BackendGateway;

const DEMO_USERNAME: &str = "foo";
const DEMO_PASSWORD: &str = "bar1";

#[tokio::main]
async fn main() -> Result<()> {
    let config = helpdesk_config::load_from_env()?;
    init_logging(&config);

    let gateway: Arc<dyn BackendGateway> = Arc::new(helpdesk_gateway::build_provider(
        &config.gateway.provider,
        config.gateway.seed_demo_data,
    )?);
    let bus = Arc::new(NotificationBus::new(NotificationBusConfig {
        buffer_capacity: config.eventbus.buffer_capacity,
    }));
    let router = Arc::new(HeadlessRouter::new(bus.clone()));
    let dialogs = Arc::new(ScriptedDialogs::new());
    let mut app = HelpDeskApp::new(&config, gateway, bus, router.clone(), dialogs.clone());

    run_demo(&mut app, &dialogs).await?;
    tracing::info!(
        navigations = router.history().len(),
        dialogs = dialogs.requests().len(),
        "demo session finished"
    );
    Ok(())
}

fn init_logging(config: &HelpDeskConfig) {
    let fallback = config.logging.filter.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .init();
}

async fn run_demo(app: &mut HelpDeskApp, dialogs: &ScriptedDialogs) -> Result<()> {
    if app.login(DEMO_USERNAME, DEMO_PASSWORD).await? != LoginOutcome::Succeeded {
        anyhow::bail!("demo credentials were rejected: {}", app.login_screen().message);
    }
    tracing::info!(
        activity = app.home().activity().map_or(0, <[_]>::len),
        "logged in"
    );

    dialogs.push_output("Printer jam");
    let opened = app
        .navigate_thread(RouteParams::new().with("id", "new"))
        .await?;
    tracing::info!(?opened, "new ticket draft");

    let thread = app.thread_mut().context("thread screen after navigation")?;
    thread.set_message("The office printer jams on every duplex job.");
    app.submit_thread(TicketStatus::Open).await?;
    let saved_id = app
        .thread()
        .and_then(|thread| thread.ticket())
        .and_then(|ticket| ticket.id)
        .context("saved ticket id")?;
    tracing::info!(ticket_id = %saved_id, tabs = app.shell().tabs().len(), "ticket submitted");

    let existing = app
        .navigate_thread(RouteParams::new().with("id", 1_u64))
        .await?;
    if let NavigationResult::Completed(target) = &existing {
        tracing::info!(route = %target.route, tabs = app.shell().tabs().len(), "existing ticket opened");
    }

    while let Some(tab) = app.shell().tabs().first().cloned() {
        app.close_tab(&tab).await?;
        tracing::info!(title = %tab.title, remaining = app.shell().tabs().len(), "tab closed");
    }

    if app.logout().await? == LogoutOutcome::LoggedOut {
        tracing::info!(root = ?app.session().root(), "logged out");
    }
    Ok(())
}
