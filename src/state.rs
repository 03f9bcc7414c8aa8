use crate::{
    config::RuntimeConfiguration,
    error::{
        GetDatabaseConnectionSnafu, MigrateSnafu, OpenDatabaseSnafu, RosterResult, StoreAction,
    },
};
use maud::{DOCTYPE, Markup, html};
use snafu::ResultExt;
use sqlx::{
    Pool, Sqlite,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{ops::Deref, str::FromStr, time::Duration};

/// Shared handle to the student store and the runtime configuration.
///
/// The pool is opened (and the schema applied) in [`RosterState::new`] and must be released
/// with [`RosterState::sensible_shutdown`] once the server has drained.
#[derive(Clone, Debug)]
pub struct RosterState {
    pool: Pool<Sqlite>,
    config: RuntimeConfiguration,
}

impl RosterState {
    pub async fn new(options: SqlitePoolOptions, config: RuntimeConfiguration) -> RosterResult<Self> {
        let db_config = config.db_config();
        let connect_options = SqliteConnectOptions::from_str(db_config.url())
            .context(OpenDatabaseSnafu)?
            .create_if_missing(true);

        let mut options = options.max_connections(db_config.max_connections());
        if db_config.is_in_memory() {
            //the database lives exactly as long as its one connection
            warn!("In-memory store, limiting the pool to one connection that is never recycled");
            options = options
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }

        let pool = options
            .connect_with(connect_options)
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;
        info!(url = db_config.url(), "Student store ready");

        Ok(Self { pool, config })
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    #[allow(clippy::unused_self)]
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Student Registration" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center justify-center text-white p-8" {
                    (markup)
                }
            }
        }
    }

    pub async fn get_connection(&self, action: StoreAction) -> RosterResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu { action })
    }

    pub async fn sensible_shutdown(&self) {
        info!("Closing student store");
        self.pool.close().await;
    }
}

impl Deref for RosterState {
    type Target = Pool<Sqlite>;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
