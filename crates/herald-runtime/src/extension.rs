//! Host-facing registry extension.
//!
//! The host plugin system calls into [`RegistryExtension`] at two points:
//!
//! 1. [`init`](PluginRegistryExtension::init) once at startup. This boots
//!    the platform if nobody else has, installs Herald's own plugin type,
//!    waits for the activation subsystem and arms listening for
//!    [`PluginInterface`](herald_core::PluginInterface) components.
//! 2. [`search_for_type`](PluginRegistryExtension::search_for_type) once per
//!    plugin type the host wants tracked.
//!
//! ```rust,ignore
//! let extension = RegistryExtension::builder(platform, container, resolver, monitor)
//!     .config_loader(ConfigLoader::new().with_current_dir())
//!     .with_logging()
//!     .build()?;
//!
//! extension.init(registry).await?;
//! extension.search_for_type(&step_plugin_type).await;
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use herald_core::{
    ActivationMonitor, ApplicationContext, BoxedComponent, ComponentType, ContainerBoot,
    ContextResolver, PlatformBootstrap, PluginRegistry, PluginTypeDescriptor, PropertySource,
};
use herald_framework::{
    CompletionListener, NotifierScheduler, PluginTracker, ReadinessGate, RegistryLifecycleListener,
};

use crate::config::{BootstrapConfig, ConfigLoader, HeraldConfig};
use crate::error::{BootstrapError, RuntimeError, RuntimeResult};
use crate::logging;

/// Identifier of Herald's own plugin type.
pub const EXTENSION_PLUGIN_TYPE_ID: &str = "HeraldRegistryPlugin";

/// Display name of Herald's own plugin type.
pub const EXTENSION_PLUGIN_TYPE_NAME: &str = "Herald";

/// Bean property holding a plugin's identifier.
pub const PLUGIN_ID_PROPERTY: &str = "ID";

// =============================================================================
// Plugin type
// =============================================================================

/// Plugin type under which tracked components are registered with the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtensionPluginType;

impl PluginTypeDescriptor for ExtensionPluginType {
    fn id(&self) -> &str {
        EXTENSION_PLUGIN_TYPE_ID
    }

    fn name(&self) -> &str {
        EXTENSION_PLUGIN_TYPE_NAME
    }

    fn component_type(&self) -> ComponentType {
        ComponentType::of::<ExtensionPluginType>()
    }
}

// =============================================================================
// Extension contract
// =============================================================================

/// Calls the host plugin system makes into a registry extension.
#[async_trait]
pub trait PluginRegistryExtension: Send + Sync {
    /// One-time initialization against the host registry.
    async fn init(&self, registry: Arc<dyn PluginRegistry>) -> RuntimeResult<()>;

    /// Starts tracking components of `plugin_type`.
    async fn search_for_type(&self, plugin_type: &dyn PluginTypeDescriptor);

    /// Best-effort identifier lookup; failures are logged, never returned.
    async fn plugin_id(&self, plugin_type: ComponentType, instance: &BoxedComponent)
    -> Option<String>;
}

// =============================================================================
// RegistryExtension
// =============================================================================

/// The registry extension Herald installs into the host.
pub struct RegistryExtension {
    platform: Arc<dyn PlatformBootstrap>,
    container: Arc<dyn ContainerBoot>,
    tracker: Arc<PluginTracker>,
    gate: ReadinessGate,
    bootstrap: BootstrapConfig,
    bootstrap_started: AtomicBool,
    bootstrap_outcome: OnceCell<Result<(), Arc<BootstrapError>>>,
    interrupt: CancellationToken,
    plugin_type: Arc<ExtensionPluginType>,
}

impl RegistryExtension {
    /// Starts building an extension from the host's collaborators.
    pub fn builder(
        platform: Arc<dyn PlatformBootstrap>,
        container: Arc<dyn ContainerBoot>,
        resolver: Arc<dyn ContextResolver>,
        monitor: Arc<dyn ActivationMonitor>,
    ) -> ExtensionBuilder {
        ExtensionBuilder {
            platform,
            container,
            resolver,
            monitor,
            config: None,
            loader: None,
            runtime: None,
            completion_listener: None,
            init_logging: false,
        }
    }

    /// The tracker occurrences are reported to.
    pub fn tracker(&self) -> &Arc<PluginTracker> {
        &self.tracker
    }

    /// Herald's own plugin type.
    pub fn plugin_type(&self) -> Arc<ExtensionPluginType> {
        Arc::clone(&self.plugin_type)
    }

    /// Whether this extension ran (or is running) the platform bootstrap.
    pub fn bootstrap_started(&self) -> bool {
        self.bootstrap_started.load(Ordering::Acquire)
    }

    /// Token that aborts readiness waits in progress.
    ///
    /// Once cancelled it stays cancelled and later waits return at once.
    pub fn interrupt_handle(&self) -> CancellationToken {
        self.interrupt.clone()
    }

    /// Interrupts readiness waits and shuts the notifier scheduler down.
    pub async fn shutdown(&self) {
        self.interrupt.cancel();
        self.tracker.scheduler().shutdown().await;
    }

    async fn wait_for_activation(&self) {
        info!(
            timeout_ms = self.gate.timeout().as_millis() as u64,
            "Waiting for activation subsystem"
        );
        self.gate.await_ready(&self.interrupt).await;
    }

    /// Boots the platform at most once per extension.
    ///
    /// Concurrent callers wait for the one bootstrap in progress and all see
    /// its outcome, failure included.
    async fn ensure_bootstrapped(&self) -> Result<(), Arc<BootstrapError>> {
        self.bootstrap_outcome
            .get_or_init(|| async {
                if self.platform.is_initialized() {
                    debug!("Host platform already initialized, skipping bootstrap");
                    return Ok(());
                }
                self.bootstrap_started.store(true, Ordering::Release);
                self.run_bootstrap().await.map_err(|err| {
                    error!(error = %err, "Bootstrap failed");
                    Arc::new(err)
                })
            })
            .await
            .clone()
    }

    /// Runs the synchronous platform and container startup on the blocking
    /// pool.
    async fn run_bootstrap(&self) -> Result<(), BootstrapError> {
        let user_dir = self.bootstrap.user_dir.clone();
        info!(user_dir = %user_dir.display(), "Bootstrapping host platform");

        let platform = Arc::clone(&self.platform);
        let container = Arc::clone(&self.container);
        let container_args = self.bootstrap.container_args.clone();

        tokio::task::spawn_blocking(move || {
            let context = ApplicationContext::standalone(user_dir);
            platform.init(&context).map_err(BootstrapError::Platform)?;
            container
                .startup(container_args.as_deref())
                .map_err(BootstrapError::Container)
        })
        .await
        .map_err(BootstrapError::Aborted)??;

        info!("Host platform started");
        Ok(())
    }
}

#[async_trait]
impl PluginRegistryExtension for RegistryExtension {
    async fn init(&self, registry: Arc<dyn PluginRegistry>) -> RuntimeResult<()> {
        self.ensure_bootstrapped()
            .await
            .map_err(RuntimeError::Bootstrap)?;

        registry.register_extension_type(self.plugin_type.clone());
        self.wait_for_activation().await;

        let plugin_interface = ComponentType::plugin_interface();
        self.tracker.register_plugin_class(plugin_interface);
        self.tracker.add_lifecycle_listener(
            plugin_interface,
            Arc::new(RegistryLifecycleListener::new(
                registry,
                self.plugin_type.clone(),
            )),
        );
        Ok(())
    }

    async fn search_for_type(&self, plugin_type: &dyn PluginTypeDescriptor) {
        self.wait_for_activation().await;
        self.tracker.register_plugin_class(plugin_type.component_type());
    }

    async fn plugin_id(
        &self,
        plugin_type: ComponentType,
        instance: &BoxedComponent,
    ) -> Option<String> {
        match self
            .tracker
            .get_property(plugin_type, instance, PLUGIN_ID_PROPERTY)
            .await
        {
            Ok(Some(Value::String(id))) => Some(id),
            Ok(Some(other)) => {
                warn!(
                    component = %instance.id(),
                    value = %other,
                    "Plugin id is not a string"
                );
                None
            }
            Ok(None) => None,
            Err(err) => {
                error!(
                    component = %instance.id(),
                    plugin_type = %plugin_type,
                    error = %err,
                    "Failed to read plugin id"
                );
                None
            }
        }
    }
}

impl fmt::Debug for RegistryExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryExtension")
            .field("bootstrap", &self.bootstrap)
            .field("bootstrap_started", &self.bootstrap_started())
            .field("gate", &self.gate)
            .field("scheduler", self.tracker.scheduler())
            .finish()
    }
}

// =============================================================================
// ExtensionBuilder
// =============================================================================

/// Builder for [`RegistryExtension`].
///
/// Configuration comes from, in order of preference: an explicit
/// [`config`](Self::config), a [`config_loader`](Self::config_loader), or
/// the built-in defaults.
pub struct ExtensionBuilder {
    platform: Arc<dyn PlatformBootstrap>,
    container: Arc<dyn ContainerBoot>,
    resolver: Arc<dyn ContextResolver>,
    monitor: Arc<dyn ActivationMonitor>,
    config: Option<HeraldConfig>,
    loader: Option<ConfigLoader>,
    runtime: Option<Handle>,
    completion_listener: Option<Arc<dyn CompletionListener>>,
    init_logging: bool,
}

impl ExtensionBuilder {
    /// Uses a pre-loaded configuration.
    pub fn config(mut self, config: HeraldConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads configuration with `loader` at build time.
    pub fn config_loader(mut self, loader: ConfigLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Runtime notifiers are spawned on. Defaults to the current runtime.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Listener told about every finished occurrence.
    pub fn completion_listener(mut self, listener: Arc<dyn CompletionListener>) -> Self {
        self.completion_listener = Some(listener);
        self
    }

    /// Installs the global subscriber from the logging configuration.
    pub fn with_logging(mut self) -> Self {
        self.init_logging = true;
        self
    }

    /// Loads configuration and assembles the extension on the chosen runtime.
    pub fn build(self) -> RuntimeResult<RegistryExtension> {
        let config = match (self.config, self.loader) {
            (Some(config), _) => config,
            (None, Some(loader)) => loader.load()?,
            (None, None) => HeraldConfig::default(),
        };

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| RuntimeError::NoRuntime)?,
        };

        let mut scheduler =
            NotifierScheduler::new(runtime).with_retry_delay(config.notifier.retry_delay());
        if let Some(listener) = self.completion_listener {
            scheduler = scheduler.with_completion_listener(listener);
        }
        let tracker = PluginTracker::new(self.resolver, Arc::new(scheduler));

        info!(
            user_dir = %config.bootstrap.user_dir.display(),
            readiness_timeout_ms = config.readiness.timeout_ms,
            retry_delay_ms = config.notifier.retry_delay_ms,
            "Registry extension configured"
        );

        Ok(RegistryExtension {
            platform: self.platform,
            container: self.container,
            tracker: Arc::new(tracker),
            gate: ReadinessGate::new(self.monitor, config.readiness.timeout()),
            bootstrap: config.bootstrap,
            bootstrap_started: AtomicBool::new(false),
            bootstrap_outcome: OnceCell::new(),
            interrupt: CancellationToken::new(),
            plugin_type: Arc::new(ExtensionPluginType),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::{
        BeanFactory, BoxError, BoxedFactory, Component, LifecycleEvent, PluginInterface,
        RegistryResult, ResolveError, ResolveResult,
    };
    use herald_framework::{ActivationPhase, ActivationState, Outcome};
    use parking_lot::Mutex;
    use std::any::Any;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::time::Instant;

    // ─── Stubs ───────────────────────────────────────────────────────────────

    struct Step(String);

    impl Component for Step {
        fn id(&self) -> &str {
            &self.0
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl PluginInterface for Step {}

    fn step(id: &str) -> BoxedComponent {
        Arc::new(Step(id.to_string()))
    }

    #[derive(Default)]
    struct StubPlatform {
        initialized: bool,
        fail: bool,
        contexts: Mutex<Vec<ApplicationContext>>,
    }

    impl PlatformBootstrap for StubPlatform {
        fn is_initialized(&self) -> bool {
            self.initialized
        }

        fn init(&self, context: &ApplicationContext) -> Result<(), BoxError> {
            self.contexts.lock().push(context.clone());
            if self.fail {
                return Err("solution repository missing".into());
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingContainer {
        startups: AtomicUsize,
        fail: bool,
    }

    impl ContainerBoot for CountingContainer {
        fn startup(&self, _args: Option<&[String]>) -> Result<(), BoxError> {
            self.startups.fetch_add(1, Ordering::SeqCst);
            // Widen the window for racing initializers.
            std::thread::sleep(Duration::from_millis(20));
            if self.fail {
                return Err("container failed to start".into());
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct JournalRegistry {
        types: Mutex<Vec<String>>,
        plugins: Mutex<Vec<(String, String)>>,
    }

    impl PluginRegistry for JournalRegistry {
        fn register_extension_type(&self, descriptor: Arc<dyn PluginTypeDescriptor>) {
            self.types.lock().push(descriptor.id().to_string());
        }

        fn register_plugin(&self, plugin_type: &str, instance: &BoxedComponent) -> RegistryResult<()> {
            self.plugins
                .lock()
                .push((plugin_type.to_string(), instance.id().to_string()));
            Ok(())
        }

        fn remove_plugin(&self, _plugin_type: &str, instance: &BoxedComponent) -> RegistryResult<()> {
            self.plugins.lock().retain(|(_, id)| id != instance.id());
            Ok(())
        }
    }

    struct IdFactory;

    impl BeanFactory for IdFactory {
        fn bean_property(&self, instance: &dyn Component, name: &str) -> Result<Option<Value>, BoxError> {
            match name {
                PLUGIN_ID_PROPERTY if instance.id() == "numeric" => Ok(Some(Value::from(7))),
                PLUGIN_ID_PROPERTY => Ok(Some(Value::String(instance.id().to_string()))),
                _ => Ok(None),
            }
        }
    }

    #[derive(Clone, Copy)]
    enum Wiring {
        Ready,
        Pending,
        Broken,
    }

    struct StubResolver(Wiring);

    #[async_trait]
    impl ContextResolver for StubResolver {
        async fn resolve(&self, _instance: &BoxedComponent) -> ResolveResult<Option<BoxedFactory>> {
            match self.0 {
                Wiring::Ready => Ok(Some(Arc::new(IdFactory))),
                Wiring::Pending => Ok(None),
                Wiring::Broken => Err(ResolveError::tracker("tracker closed")),
            }
        }

        fn unwrapper_available(&self) -> bool {
            true
        }
    }

    struct StepPluginType;

    impl PluginTypeDescriptor for StepPluginType {
        fn id(&self) -> &str {
            "StepPluginType"
        }

        fn name(&self) -> &str {
            "Step"
        }

        fn component_type(&self) -> ComponentType {
            ComponentType::of::<StepPluginType>()
        }
    }

    fn started() -> Arc<ActivationState> {
        let state = Arc::new(ActivationState::new(1));
        state.set_phase(ActivationPhase::Started);
        state
    }

    struct Fixture {
        platform: Arc<StubPlatform>,
        container: Arc<CountingContainer>,
        registry: Arc<JournalRegistry>,
        extension: Arc<RegistryExtension>,
    }

    fn fixture(
        platform: StubPlatform,
        container: CountingContainer,
        wiring: Wiring,
        monitor: Arc<dyn ActivationMonitor>,
        config: HeraldConfig,
    ) -> Fixture {
        let platform = Arc::new(platform);
        let container = Arc::new(container);
        let extension = RegistryExtension::builder(
            platform.clone(),
            container.clone(),
            Arc::new(StubResolver(wiring)),
            monitor,
        )
        .config(config)
        .build()
        .unwrap();

        Fixture {
            platform,
            container,
            registry: Arc::new(JournalRegistry::default()),
            extension: Arc::new(extension),
        }
    }

    fn ready_fixture(wiring: Wiring) -> Fixture {
        fixture(
            StubPlatform::default(),
            CountingContainer::default(),
            wiring,
            started(),
            HeraldConfig::default(),
        )
    }

    // ─── init ────────────────────────────────────────────────────────────────

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_init_boots_once() {
        let fx = ready_fixture(Wiring::Ready);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let extension = Arc::clone(&fx.extension);
                let registry: Arc<dyn PluginRegistry> = fx.registry.clone();
                tokio::spawn(async move { extension.init(registry).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(fx.container.startups.load(Ordering::SeqCst), 1);
        assert_eq!(fx.platform.contexts.lock().len(), 1);
        assert!(fx.extension.bootstrap_started());
        assert_eq!(fx.registry.types.lock().len(), 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_init_shares_bootstrap_failure() {
        let fx = fixture(
            StubPlatform::default(),
            CountingContainer {
                fail: true,
                ..Default::default()
            },
            Wiring::Ready,
            started(),
            HeraldConfig::default(),
        );

        let first = tokio::spawn({
            let extension = Arc::clone(&fx.extension);
            let registry: Arc<dyn PluginRegistry> = fx.registry.clone();
            async move { extension.init(registry).await }
        });
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = tokio::spawn({
            let extension = Arc::clone(&fx.extension);
            let registry: Arc<dyn PluginRegistry> = fx.registry.clone();
            async move { extension.init(registry).await }
        });

        for result in [first.await.unwrap(), second.await.unwrap()] {
            let err = result.unwrap_err();
            assert!(matches!(
                err,
                RuntimeError::Bootstrap(ref cause) if matches!(**cause, BootstrapError::Container(_))
            ));
        }

        assert_eq!(fx.container.startups.load(Ordering::SeqCst), 1);
        assert!(fx.registry.types.lock().is_empty());
        let tracker = fx.extension.tracker();
        assert!(!tracker.is_tracked(ComponentType::plugin_interface()));
        assert!(!tracker.listeners().contains(ComponentType::plugin_interface()));

        // The failure is remembered; a later caller does not retry the boot.
        assert!(fx.extension.init(fx.registry.clone()).await.is_err());
        assert_eq!(fx.container.startups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_init_uses_configured_user_dir() {
        let mut config = HeraldConfig::default();
        config.bootstrap.user_dir = PathBuf::from("/opt/host");
        let fx = fixture(
            StubPlatform::default(),
            CountingContainer::default(),
            Wiring::Ready,
            started(),
            config,
        );

        fx.extension.init(fx.registry.clone()).await.unwrap();

        assert_eq!(
            *fx.platform.contexts.lock(),
            vec![ApplicationContext::standalone("/opt/host")]
        );
    }

    #[tokio::test]
    async fn test_initialized_platform_skips_bootstrap() {
        let fx = fixture(
            StubPlatform {
                initialized: true,
                ..Default::default()
            },
            CountingContainer::default(),
            Wiring::Ready,
            started(),
            HeraldConfig::default(),
        );

        fx.extension.init(fx.registry.clone()).await.unwrap();

        assert_eq!(fx.container.startups.load(Ordering::SeqCst), 0);
        assert!(!fx.extension.bootstrap_started());
        assert_eq!(*fx.registry.types.lock(), vec![EXTENSION_PLUGIN_TYPE_ID]);
        let tracker = fx.extension.tracker();
        assert!(tracker.is_tracked(ComponentType::plugin_interface()));
        assert!(tracker.listeners().contains(ComponentType::plugin_interface()));
    }

    #[tokio::test]
    async fn test_bootstrap_failure_propagates() {
        let fx = fixture(
            StubPlatform::default(),
            CountingContainer {
                fail: true,
                ..Default::default()
            },
            Wiring::Ready,
            started(),
            HeraldConfig::default(),
        );
        let err = fx.extension.init(fx.registry.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Bootstrap(ref cause) if matches!(**cause, BootstrapError::Container(_))
        ));
        assert!(fx.registry.types.lock().is_empty());

        let fx = fixture(
            StubPlatform {
                fail: true,
                ..Default::default()
            },
            CountingContainer::default(),
            Wiring::Ready,
            started(),
            HeraldConfig::default(),
        );
        let err = fx.extension.init(fx.registry.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Bootstrap(ref cause) if matches!(**cause, BootstrapError::Platform(_))
        ));
        assert_eq!(fx.container.startups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_waits_for_activation_cycle() {
        let state = Arc::new(ActivationState::new(2));
        let fx = fixture(
            StubPlatform::default(),
            CountingContainer::default(),
            Wiring::Ready,
            state.clone(),
            HeraldConfig::default(),
        );

        tokio::spawn(async move {
            for phase in [
                ActivationPhase::Started,
                ActivationPhase::Stopped,
                ActivationPhase::Started,
            ] {
                tokio::time::sleep(Duration::from_secs(1)).await;
                state.set_phase(phase);
            }
        });

        let start = Instant::now();
        fx.extension.init(fx.registry.clone()).await.unwrap();
        // Bootstrap blocks on real time; only the readiness wait moves the paused clock.
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(
            fx.extension
                .tracker()
                .is_tracked(ComponentType::plugin_interface())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_aborts_wait_and_init_continues() {
        let state = Arc::new(ActivationState::new(1));
        let fx = fixture(
            StubPlatform {
                initialized: true,
                ..Default::default()
            },
            CountingContainer::default(),
            Wiring::Ready,
            state,
            HeraldConfig::default(),
        );

        let interrupt = fx.extension.interrupt_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            interrupt.cancel();
        });

        let start = Instant::now();
        fx.extension.init(fx.registry.clone()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert!(
            fx.extension
                .tracker()
                .listeners()
                .contains(ComponentType::plugin_interface())
        );

        // Later waits return immediately.
        let again = Instant::now();
        fx.extension.search_for_type(&StepPluginType).await;
        assert_eq!(again.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_readiness_timeout_from_config() {
        let mut config = HeraldConfig::default();
        config.readiness.timeout_ms = 2_000;
        let fx = fixture(
            StubPlatform {
                initialized: true,
                ..Default::default()
            },
            CountingContainer::default(),
            Wiring::Ready,
            Arc::new(ActivationState::new(1)),
            config,
        );

        let start = Instant::now();
        fx.extension.search_for_type(&StepPluginType).await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        assert!(
            fx.extension
                .tracker()
                .is_tracked(ComponentType::of::<StepPluginType>())
        );
    }

    // ─── search_for_type / plugin_id ─────────────────────────────────────────

    #[tokio::test]
    async fn test_search_for_type_tracks_type() {
        let fx = ready_fixture(Wiring::Ready);
        let ty = ComponentType::of::<StepPluginType>();
        assert!(!fx.extension.tracker().is_tracked(ty));

        fx.extension.search_for_type(&StepPluginType).await;
        assert!(fx.extension.tracker().is_tracked(ty));
    }

    #[tokio::test]
    async fn test_plugin_id_lookup() {
        let ty = ComponentType::of::<StepPluginType>();

        let fx = ready_fixture(Wiring::Ready);
        assert_eq!(
            fx.extension.plugin_id(ty, &step("csv-input")).await,
            Some("csv-input".to_string())
        );
        assert_eq!(fx.extension.plugin_id(ty, &step("numeric")).await, None);

        let fx = ready_fixture(Wiring::Pending);
        assert_eq!(fx.extension.plugin_id(ty, &step("csv-input")).await, None);

        let fx = ready_fixture(Wiring::Broken);
        assert_eq!(fx.extension.plugin_id(ty, &step("csv-input")).await, None);
    }

    // ─── end to end ──────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_occurrences_reach_host_registry() {
        let fx = ready_fixture(Wiring::Ready);
        fx.extension.init(fx.registry.clone()).await.unwrap();
        let tracker = fx.extension.tracker();
        let ty = ComponentType::plugin_interface();

        let added = tracker
            .service_changed(ty, LifecycleEvent::Added, step("table-output"))
            .unwrap()
            .completion()
            .await
            .unwrap();
        assert!(matches!(added.outcome, Outcome::Delivered));
        assert_eq!(
            *fx.registry.plugins.lock(),
            vec![(
                EXTENSION_PLUGIN_TYPE_ID.to_string(),
                "table-output".to_string()
            )]
        );

        let removed = tracker
            .service_changed(ty, LifecycleEvent::Removed, step("table-output"))
            .unwrap()
            .completion()
            .await
            .unwrap();
        assert!(matches!(removed.outcome, Outcome::Delivered));
        assert!(fx.registry.plugins.lock().is_empty());

        fx.extension.shutdown().await;
        assert!(tracker.scheduler().is_shut_down());
    }

    #[test]
    fn test_build_without_runtime_fails() {
        let result = RegistryExtension::builder(
            Arc::new(StubPlatform::default()),
            Arc::new(CountingContainer::default()),
            Arc::new(StubResolver(Wiring::Ready)),
            started(),
        )
        .build();
        assert!(matches!(result, Err(RuntimeError::NoRuntime)));
    }

    #[test]
    fn test_extension_plugin_type() {
        let ty = ExtensionPluginType;
        assert_eq!(ty.id(), "HeraldRegistryPlugin");
        assert_eq!(ty.name(), "Herald");
        assert_eq!(
            ty.component_type(),
            ComponentType::of::<ExtensionPluginType>()
        );
    }
}
