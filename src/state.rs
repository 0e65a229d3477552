use crate::{
    config::RuntimeConfiguration,
    data::{photo::UploadStore, student::Student},
    error::{GetDatabaseConnectionSnafu, OpenDatabaseSnafu, RollcallResult},
    flash::{self, FlashCategory, FlashMessage},
    maud_conveniences::{render_flashes, render_nav},
};
use jiff::SignedDuration;
use maud::{DOCTYPE, Markup, html};
use snafu::ResultExt;
use sqlx::{
    Pool, Sqlite,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::ops::Deref;
use tower_sessions::Session;

#[derive(Clone, Debug)]
pub struct RollcallState {
    pool: Pool<Sqlite>,
    config: RuntimeConfiguration,
    uploads: UploadStore,
}

impl RollcallState {
    pub async fn new(options: SqlitePoolOptions, config: RuntimeConfiguration) -> RollcallResult<Self> {
        let db_config = config.db_config();
        let connect_options = SqliteConnectOptions::new()
            .filename(&db_config.path)
            .create_if_missing(true);

        let pool = options
            .max_connections(db_config.max_connections)
            .connect_with(connect_options)
            .await
            .context(OpenDatabaseSnafu)?;
        info!(path = ?db_config.path, "Connected to the SQLite database");

        Student::init_schema(&pool).await?;

        let uploads = UploadStore::new(config.upload_config().directory.clone()).await?;

        Ok(Self {
            pool,
            config,
            uploads,
        })
    }

    #[allow(clippy::unused_self, clippy::needless_pass_by_value)] //in case self is ever needed :), and to allow direct html! usage
    pub fn render(&self, flashes: Vec<FlashMessage>, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Rollcall" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center text-white" {
                    (render_nav())
                    main class="flex flex-col items-center justify-center w-full p-8 space-y-4" {
                        (render_flashes(&flashes))
                        (markup)
                    }
                }
            }
        }
    }

    /// Takes this session's pending flashes and renders `markup` with them.
    pub async fn render_page(&self, session: &Session, markup: Markup) -> RollcallResult<Markup> {
        let flashes = flash::take(session).await?;
        Ok(self.render(flashes, markup))
    }

    pub async fn flash(
        &self,
        session: &Session,
        category: FlashCategory,
        message: impl Into<String>,
    ) -> RollcallResult<()> {
        let ttl = SignedDuration::from_secs(self.config.server_config().flash_ttl_secs);
        flash::push(session, FlashMessage::new(category, message, ttl)).await
    }

    pub async fn get_connection(&self) -> RollcallResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    pub const fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

impl Deref for RollcallState {
    type Target = Pool<Sqlite>;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
