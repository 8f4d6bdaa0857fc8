use std::sync::Arc;

use log::Logger;

use crate::gate::AccessGate;
use crate::registry::Registry;
use crate::store::Store;

/// Marker bound for store outputs carried through the routes.
pub trait SafeStore: Clone + Send + Sync {}

impl<T: Clone + Send + Sync> SafeStore for T {}

pub type SafeRegistry = dyn Registry + Send + Sync;
pub type ReceiptStore<O> = dyn Store<Output = O> + Send + Sync;

#[derive(Clone)]
pub struct Environment<O: Clone + Send + Sync> {
    pub logger: Arc<Logger>,
    pub registry: Arc<SafeRegistry>,
    pub store: Arc<ReceiptStore<O>>,
    pub gate: Arc<dyn AccessGate>,
    pub config: Config,
}

impl<O: Clone + Send + Sync> Environment<O> {
    pub fn new(
        logger: Arc<Logger>,
        registry: Arc<SafeRegistry>,
        store: Arc<ReceiptStore<O>>,
        gate: Arc<dyn AccessGate>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            registry,
            store,
            gate,
            config,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Path segment under which the registration routes are served.
    pub(crate) registrations_path: String,

    /// Remote filename the full CSV is re-uploaded under after every save.
    pub(crate) sync_filename: String,
}

impl Config {
    pub fn new(registrations_path: impl Into<String>, sync_filename: impl Into<String>) -> Self {
        Self {
            registrations_path: registrations_path.into(),
            sync_filename: sync_filename.into(),
        }
    }
}
