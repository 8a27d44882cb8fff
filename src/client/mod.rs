//! Tharstern API client.
//!
//! Provides the main client interface. Building a client authenticates it;
//! every service is usable as soon as `build` returns.

use std::sync::Arc;
use tracing::instrument;

use crate::auth::Session;
use crate::config::{TharsternConfig, TharsternConfigBuilder};
use crate::errors::{TharsternError, TharsternResult};
use crate::services::{EstimatesService, JobsService, OrdersService, ProductsService, ServiceContext};
use crate::transport::{HttpTransport, HttpTransportImpl};

/// The main Tharstern client.
///
/// # Example
///
/// ```rust,no_run
/// use tharstern_client::{RecordFilter, TharsternClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = TharsternClient::builder()
///         .host("mis.example.com")
///         .username("ops@example.com")
///         .password("secret")
///         .application_id("web-shop")
///         .build()
///         .await?;
///
///     let product = client.products().get("BC-85x55").await?;
///     let jobs = client.jobs().list(&RecordFilter::by_reference("J-100")).await?;
///     println!("{} / {} jobs", product["Name"], jobs.len());
///     Ok(())
/// }
/// ```
pub struct TharsternClient {
    config: TharsternConfig,
    session: Arc<Session>,
    transport: Arc<dyn HttpTransport>,
    products_service: ProductsService,
    estimates_service: EstimatesService,
    orders_service: OrdersService,
    jobs_service: JobsService,
}

impl TharsternClient {
    /// Creates a new client builder.
    pub fn builder() -> TharsternClientBuilder {
        TharsternClientBuilder::new()
    }

    /// Connects to `host` and authenticates.
    ///
    /// `port` defaults to 80.
    pub async fn connect(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        application_id: impl Into<String>,
        port: Option<u16>,
    ) -> TharsternResult<Self> {
        let mut builder = TharsternClientBuilder::new()
            .host(host)
            .username(username)
            .password(password)
            .application_id(application_id);
        if let Some(port) = port {
            builder = builder.port(port);
        }
        builder.build().await
    }

    /// Creates a client from environment variables.
    ///
    /// See [`TharsternConfig::from_env`].
    pub async fn from_env() -> TharsternResult<Self> {
        let config = TharsternConfig::from_env()?;
        TharsternClientBuilder::from_config(config).build().await
    }

    /// Requests a fresh token.
    ///
    /// Must not race with other calls on the same client.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> TharsternResult<()> {
        self.session.authenticate(self.transport.as_ref()).await
    }

    /// Returns the products service.
    pub fn products(&self) -> &ProductsService {
        &self.products_service
    }

    /// Returns the estimates service.
    pub fn estimates(&self) -> &EstimatesService {
        &self.estimates_service
    }

    /// Returns the sales orders service.
    pub fn orders(&self) -> &OrdersService {
        &self.orders_service
    }

    /// Returns the jobs service.
    pub fn jobs(&self) -> &JobsService {
        &self.jobs_service
    }

    /// Returns the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TharsternConfig {
        &self.config
    }
}

impl std::fmt::Debug for TharsternClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TharsternClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for the Tharstern client.
pub struct TharsternClientBuilder {
    config_builder: TharsternConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl TharsternClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: TharsternConfigBuilder::new(),
            transport: None,
        }
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: TharsternConfig) -> Self {
        Self {
            config_builder: TharsternConfigBuilder::new()
                .host(&config.host)
                .port(config.port)
                .username(&config.username)
                .password(config.password())
                .application_id(&config.application_id)
                .timeout(config.timeout),
            transport: None,
        }
    }

    /// Sets the service host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.host(host);
        self
    }

    /// Sets the service port.
    pub fn port(mut self, port: u16) -> Self {
        self.config_builder = self.config_builder.port(port);
        self
    }

    /// Sets the account email.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.username(username);
        self
    }

    /// Sets the account password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.password(password);
        self
    }

    /// Sets the application id.
    pub fn application_id(mut self, application_id: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.application_id(application_id);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client and authenticates it.
    ///
    /// # Errors
    ///
    /// Configuration errors, and any error from the initial authentication.
    pub async fn build(self) -> TharsternResult<TharsternClient> {
        let config = self.config_builder.build()?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(
                HttpTransportImpl::new(config.timeout)
                    .map_err(|e| TharsternError::configuration(e.to_string()))?,
            ),
        };

        let session = Arc::new(Session::new(&config));
        session.authenticate(transport.as_ref()).await?;

        let context = ServiceContext::new(Arc::clone(&transport), Arc::clone(&session));

        Ok(TharsternClient {
            config,
            session,
            transport,
            products_service: ProductsService::new(context.clone()),
            estimates_service: EstimatesService::new(context.clone()),
            orders_service: OrdersService::new(context.clone()),
            jobs_service: JobsService::new(context),
        })
    }
}

impl Default for TharsternClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
