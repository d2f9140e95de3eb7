use std::sync::Arc;

use anyhow::{Error, Result};
use charsi_notifier::{
    api::{AppState, run_api_server},
    clients::{
        ChatStore, NotificationStore, UserDirectory, database::DatabaseClient,
        fcm::FcmConnector, health::HealthChecker, mailer::SmtpMailer, memory::InMemoryStore,
    },
    config::Config,
    dispatcher::{Collaborators, Dispatcher},
    utils::init_tracing,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;
    init_tracing();

    let _ = rustls::crypto::ring::default_provider().install_default();

    let (notifications, chats, users) = match &config.database_url {
        Some(database_url) => {
            let database = Arc::new(DatabaseClient::connect(database_url).await?);
            database.ensure_schema().await?;

            let notifications: Arc<dyn NotificationStore> = database.clone();
            let chats: Arc<dyn ChatStore> = database.clone();
            let users: Arc<dyn UserDirectory> = database;
            (notifications, chats, users)
        }
        None => {
            warn!("DATABASE_URL not set, notifications are kept in memory");

            let store = Arc::new(InMemoryStore::new());
            let notifications: Arc<dyn NotificationStore> = store.clone();
            let chats: Arc<dyn ChatStore> = store.clone();
            let users: Arc<dyn UserDirectory> = store;
            (notifications, chats, users)
        }
    };

    let frontend_url = config.frontend_base_url();
    info!(app_env = ?config.app_env, frontend_url = %frontend_url, "Configuration loaded");

    let dispatcher = Arc::new(Dispatcher::new(
        Collaborators {
            notifications: notifications.clone(),
            chats,
            users,
            mailer: Arc::new(SmtpMailer::from_config(&config)?),
            push_connector: Arc::new(FcmConnector::from_config(&config)?),
        },
        frontend_url,
    ));

    let state = Arc::new(AppState {
        dispatcher: dispatcher.clone(),
        health_checker: HealthChecker::new(notifications, dispatcher),
    });

    run_api_server(&config, state).await
}
