use diesel_async::{
    AsyncConnection, AsyncPgConnection, RunQueryDsl,
    pooled_connection::{
        AsyncDieselConnectionManager,
        deadpool::{Object, Pool},
    },
};
use rstest::fixture;
use tokio::sync::OnceCell;

use crate::server::{run_migrations, util::DevContainer};

struct TestState {
    container: DevContainer,
    db_pool: Pool<AsyncPgConnection>,
}

impl TestState {
    async fn new() -> Self {
        let container = DevContainer::new("labtrack-backend_unit_test", false)
            .await
            .unwrap();

        let db_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(
            container.db_url().await.unwrap(),
        );
        let db_pool = Pool::builder(db_config).build().unwrap();

        run_migrations(db_pool.get().await.unwrap()).await.unwrap();

        Self { container, db_pool }
    }
}

static TEST_STATE: OnceCell<TestState> = OnceCell::const_new();
pub type DbConnection = Object<AsyncPgConnection>;

/// A connection to a migrated database shared by every test in this crate.
/// Tests should give the records they write unique names.
#[fixture]
pub async fn db_conn() -> DbConnection {
    let test_state = TEST_STATE.get_or_init(TestState::new).await;

    test_state.db_pool.get().await.unwrap()
}

/// A connection to a new, empty database named `name` in the shared container.
/// Unlike [`db_conn`], nothing in it is shared with other tests. With
/// `migrated` set, the tables exist but hold only what the migrations insert.
pub async fn isolated_db_conn(name: &str, migrated: bool) -> AsyncPgConnection {
    let test_state = TEST_STATE.get_or_init(TestState::new).await;

    let mut shared = test_state.db_pool.get().await.unwrap();
    diesel::sql_query(format!("CREATE DATABASE {name}"))
        .execute(&mut *shared)
        .await
        .unwrap();

    let db_url = test_state.container.db_url().await.unwrap();
    let db_url = format!("{}/{name}", db_url.trim_end_matches("/postgres"));

    if migrated {
        let db_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&db_url);
        let db_pool = Pool::builder(db_config).max_size(1).build().unwrap();
        run_migrations(db_pool.get().await.unwrap()).await.unwrap();
    }

    AsyncPgConnection::establish(&db_url).await.unwrap()
}
