use testcontainers_modules::{
    postgres::Postgres,
    testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner},
};

const POSTGRES_VERSION: &str = "17-alpine";

/// A Postgres container for development and tests. It is removed when this is
/// dropped.
pub struct DevContainer {
    container: ContainerAsync<Postgres>,
    db_root_password: Option<String>,
}

impl DevContainer {
    /// Starts a container named `container_name`. Without `with_password`,
    /// the container trusts every connection.
    ///
    /// # Errors
    pub async fn new(container_name: &str, with_password: bool) -> anyhow::Result<Self> {
        let image = Postgres::default();
        let (image, db_root_password) = if with_password {
            let password = format!("{container_name}-{}", std::process::id());
            (image.with_password(&password), Some(password))
        } else {
            (image.with_host_auth(), None)
        };

        let container = image
            .with_tag(POSTGRES_VERSION)
            .with_container_name(format!("{container_name}-{}", std::process::id()))
            .start()
            .await?;

        Ok(Self {
            container,
            db_root_password,
        })
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.db_root_password.as_deref()
    }

    /// # Errors
    pub async fn db_host(&self) -> anyhow::Result<String> {
        Ok(self.container.get_host().await?.to_string())
    }

    /// # Errors
    pub async fn db_port(&self) -> anyhow::Result<u16> {
        Ok(self.container.get_host_port_ipv4(5432).await?)
    }

    /// # Errors
    pub async fn db_url(&self) -> anyhow::Result<String> {
        let credentials = match self.password() {
            Some(password) => format!("postgres:{password}"),
            None => "postgres".to_string(),
        };

        Ok(format!(
            "postgres://{credentials}@{}:{}/postgres",
            self.db_host().await?,
            self.db_port().await?
        ))
    }
}
