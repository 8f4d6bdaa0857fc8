use futures::future::BoxFuture;

use crate::errors::BackendError;
use crate::registration::{Registration, RegistrationForm};

/// Capabilities of the durable registration store.
pub trait Registry {
    /// Returns every stored registration in insertion order.
    fn all(&self) -> BoxFuture<Result<Vec<Registration>, BackendError>>;

    /// Stamps and appends a registration, rejecting a duplicate phone number.
    fn save(&self, form: RegistrationForm) -> BoxFuture<Result<Registration, BackendError>>;

    /// Removes every stored registration. Idempotent.
    fn clear(&self) -> BoxFuture<Result<(), BackendError>>;

    fn count(&self) -> BoxFuture<Result<i64, BackendError>>;
}

pub use self::file::*;

mod file {
    use std::io::ErrorKind;
    use std::path::PathBuf;
    use std::sync::Arc;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use log::{error, Logger};
    use time::OffsetDateTime;
    use tokio::fs;
    use tokio::sync::Mutex;

    use crate::errors::BackendError;
    use crate::phone;
    use crate::registration::{Registration, RegistrationForm};

    /// A registry persisted as one JSON array in a single file.
    ///
    /// Every read-modify-write runs under the mutex and rewrites the whole
    /// file through a temporary sibling plus rename, so overlapping requests
    /// within this process cannot lose writes. A second process pointed at
    /// the same file is still last-write-wins.
    pub struct FileRegistry {
        path: PathBuf,
        lock: Mutex<()>,
        logger: Arc<Logger>,
    }

    impl FileRegistry {
        pub fn new(path: impl Into<PathBuf>, logger: Arc<Logger>) -> Self {
            FileRegistry {
                path: path.into(),
                lock: Mutex::new(()),
                logger,
            }
        }

        /// Reads the stored list. A missing file is an empty registry; an
        /// unreadable one is treated the same and only logged.
        async fn load(&self) -> Result<Vec<Registration>, BackendError> {
            let raw = match fs::read(&self.path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
                Err(e) => return Err(BackendError::Io { source: e }),
            };

            match serde_json::from_slice(&raw) {
                Ok(registrations) => Ok(registrations),
                Err(e) => {
                    error!(
                        self.logger,
                        "Discarding unreadable registry contents";
                        "path" => format!("{}", self.path.display()),
                        "error" => format!("{}", e)
                    );
                    Ok(vec![])
                }
            }
        }

        async fn persist(&self, registrations: &[Registration]) -> Result<(), BackendError> {
            let raw = serde_json::to_vec(registrations)
                .map_err(|e| BackendError::Serialization { source: e })?;

            let staging = self.path.with_extension("tmp");
            fs::write(&staging, &raw)
                .await
                .map_err(|e| BackendError::Io { source: e })?;
            fs::rename(&staging, &self.path)
                .await
                .map_err(|e| BackendError::Io { source: e })?;

            Ok(())
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Registry for FileRegistry {
        fn all(&self) -> BoxFuture<Result<Vec<Registration>, BackendError>> {
            async move {
                let _guard = self.lock.lock().await;

                self.load().await
            }
            .boxed()
        }

        fn save(&self, form: RegistrationForm) -> BoxFuture<Result<Registration, BackendError>> {
            async move {
                let _guard = self.lock.lock().await;

                let mut registrations = self.load().await?;

                let key = phone::normalized_key(&form.phone_number);
                if registrations
                    .iter()
                    .any(|existing| phone::normalized_key(existing.phone_number()) == key)
                {
                    return Err(BackendError::AlreadyRegistered);
                }

                let registration = Registration::from_form(form, OffsetDateTime::now_utc());
                registrations.push(registration.clone());
                self.persist(&registrations).await?;

                Ok(registration)
            }
            .boxed()
        }

        fn clear(&self) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let _guard = self.lock.lock().await;

                match fs::remove_file(&self.path).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(BackendError::Io { source: e }),
                }
            }
            .boxed()
        }

        fn count(&self) -> BoxFuture<Result<i64, BackendError>> {
            async move {
                let _guard = self.lock.lock().await;

                Ok(self.load().await?.len() as i64)
            }
            .boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use slog::{o, Discard, Logger};
    use tempfile::TempDir;

    use super::{FileRegistry, Registry};
    use crate::errors::BackendError;
    use crate::registration::RegistrationForm;

    fn make_registry(dir: &TempDir) -> FileRegistry {
        FileRegistry::new(
            dir.path().join("registrations.json"),
            Arc::new(Logger::root(Discard, o!())),
        )
    }

    fn form(phone: &str) -> RegistrationForm {
        RegistrationForm {
            full_name: "Amina B.".to_owned(),
            phone_number: phone.to_owned(),
            gender: "F".to_owned(),
            major: "GIIA".to_owned(),
            year: "2".to_owned(),
            ..RegistrationForm::default()
        }
    }

    #[tokio::test]
    async fn saving_appends_a_stamped_record() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let registry = make_registry(&dir);

        let saved = registry
            .save(form("+212 612 345 678"))
            .await
            .expect("save registration");

        assert!(saved.id() > 0);
        assert_eq!(saved.phone_number(), "+212 612 345 678");

        let all = registry.all().await.expect("read registry");
        assert_eq!(all.len(), 1);
        assert_eq!(registry.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn duplicate_phones_are_rejected_without_a_write() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let registry = make_registry(&dir);

        registry
            .save(form("+212 612 345 678"))
            .await
            .expect("save registration");

        // spacing differences must not defeat the comparison
        let result = registry.save(form("+212612  345 678")).await;
        match result {
            Err(BackendError::AlreadyRegistered) => {}
            other => panic!("expected AlreadyRegistered, got {:?}", other.map(|r| r.id())),
        }

        assert_eq!(registry.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn clearing_is_idempotent_and_empties_the_registry() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let registry = make_registry(&dir);

        registry
            .save(form("+212 612 345 678"))
            .await
            .expect("save registration");

        registry.clear().await.expect("clear registry");
        registry.clear().await.expect("clear empty registry");

        assert_eq!(registry.count().await.expect("count"), 0);
        assert!(registry.all().await.expect("read registry").is_empty());
    }

    #[tokio::test]
    async fn corrupt_contents_read_as_empty() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("registrations.json");
        std::fs::write(&path, b"{not json").expect("write corrupt file");

        let registry = FileRegistry::new(&path, Arc::new(Logger::root(Discard, o!())));

        assert!(registry.all().await.expect("read registry").is_empty());

        // a save after corruption starts a fresh list
        registry
            .save(form("+212 612 345 678"))
            .await
            .expect("save registration");
        assert_eq!(registry.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn records_survive_a_reopen() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("registrations.json");

        {
            let registry =
                FileRegistry::new(&path, Arc::new(Logger::root(Discard, o!())));
            registry
                .save(form("+212 612 345 678"))
                .await
                .expect("save registration");
        }

        let reopened = FileRegistry::new(&path, Arc::new(Logger::root(Discard, o!())));
        let all = reopened.all().await.expect("read registry");

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].phone_number(), "+212 612 345 678");
    }
}
