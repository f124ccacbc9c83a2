use std::{fs, process, sync::Arc};

use chefer::{
    application::{
        chrome::ChromeService,
        content::ContentService,
        error::AppError,
        import::import_catalog,
        intake::{IntakeService, NotificationSettings},
        menu::MenuQueryService,
        repos::{CatalogRepo, ContentRepo, IntakeRepo, StoreHealth},
    },
    cache::{CacheConfig, CacheThrough, MemoryCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        mail::build_mailer,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Import(args) => run_import(settings, args).await,
        config::Command::Newsletter(args) => match args.command {
            config::NewsletterCommand::Send(send) => run_newsletter_send(settings, send).await,
        },
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let intake = build_intake_service(&settings, repositories.clone())?;

    let catalog: Arc<dyn CatalogRepo> = repositories.clone();
    let content: Arc<dyn ContentRepo> = repositories.clone();
    let health: Arc<dyn StoreHealth> = repositories;

    let cache_config = CacheConfig::from(&settings.cache);
    let cache = CacheThrough::new(Arc::new(MemoryCache::new(&cache_config)), cache_config);

    let state = HttpState {
        menu: Arc::new(MenuQueryService::new(catalog.clone())),
        content: Arc::new(ContentService::new(content, catalog, cache)),
        intake: Arc::new(intake),
        chrome: Arc::new(ChromeService::new(&settings.site)),
        health,
    };

    serve_http(&settings, state).await
}

async fn run_import(settings: config::Settings, args: config::ImportArgs) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let path = args.file;

    info!(
        target = "chefer::import",
        path = %path.display(),
        "Starting import"
    );

    let summary = import_catalog(repositories.as_ref(), &path).await?;
    info!(
        target = "chefer::import",
        menus = summary.menus,
        categories = summary.categories,
        tags = summary.tags,
        dishes = summary.dishes,
        items = summary.items,
        content = summary.content,
        blog_posts = summary.blog_posts,
        "Import completed"
    );
    Ok(())
}

async fn run_newsletter_send(
    settings: config::Settings,
    args: config::NewsletterSendArgs,
) -> Result<(), AppError> {
    let body = fs::read_to_string(&args.message_file).map_err(|err| {
        AppError::validation(format!(
            "failed to read message file `{}`: {err}",
            args.message_file.display()
        ))
    })?;

    let repositories = init_repositories(&settings).await?;
    let intake = build_intake_service(&settings, repositories)?;

    let report = intake.broadcast(&args.subject, &body).await?;
    for (address, reason) in &report.failures {
        warn!(target = "chefer::newsletter", address = %address, reason = %reason, "delivery failed");
    }
    info!(
        target = "chefer::newsletter",
        sent = report.sent,
        failed = report.failures.len(),
        "Newsletter sent"
    );
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(AppError::from)?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(AppError::from)?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_intake_service(
    settings: &config::Settings,
    repositories: Arc<PostgresRepositories>,
) -> Result<IntakeService, AppError> {
    let mailer = build_mailer(&settings.mail).map_err(AppError::from)?;
    let intake: Arc<dyn IntakeRepo> = repositories.clone();
    let content: Arc<dyn ContentRepo> = repositories;
    Ok(IntakeService::new(
        intake,
        content,
        mailer,
        NotificationSettings {
            admin_address: settings.mail.admin.clone(),
            signature: settings.site.brand_title.clone(),
        },
    ))
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "chefer::serve",
        addr = %settings.server.addr,
        "Listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target = "chefer::serve", error = %err, "failed to listen for shutdown signal");
    }
}
