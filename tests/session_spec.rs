use anyhow::Result;
use folio_admin::session::*;
use speculate2::speculate;

/// Persistence whose writes always fail.
struct BrokenPersistence;

impl SessionPersistence for BrokenPersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(None)
    }

    fn save(&self, _record: &PersistedSession) -> Result<()> {
        anyhow::bail!("disk full")
    }

    fn clear(&self) -> Result<()> {
        anyhow::bail!("disk full")
    }
}

/// Persistence that saves but cannot clear.
struct StickyPersistence(MemoryPersistence);

impl SessionPersistence for StickyPersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        self.0.load()
    }

    fn save(&self, record: &PersistedSession) -> Result<()> {
        self.0.save(record)
    }

    fn clear(&self) -> Result<()> {
        anyhow::bail!("read-only storage")
    }
}

/// Persistence whose saved record can be neither read nor removed.
struct UnreadablePersistence;

impl SessionPersistence for UnreadablePersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        anyhow::bail!("permission denied")
    }

    fn save(&self, _record: &PersistedSession) -> Result<()> {
        anyhow::bail!("permission denied")
    }

    fn clear(&self) -> Result<()> {
        anyhow::bail!("permission denied")
    }
}

fn sticky_store() -> CredentialStore {
    CredentialStore::with_persistence(StickyPersistence(MemoryPersistence::new()))
}

fn sqlite_at(path: std::path::PathBuf) -> SqlitePersistence {
    let db = SqlitePersistence::open(path).expect("Failed to open session database");
    db.migrate().expect("Failed to migrate");
    db
}

speculate! {
    before {
        let persistence = MemoryPersistence::new();
        let store = CredentialStore::with_persistence(persistence.clone());
    }

    describe "login" {
        it "moves from unauthenticated to authenticated" {
            assert!(!store.is_authenticated());

            store.login("abc").expect("login should succeed");

            assert!(store.is_authenticated());
            assert_eq!(store.token().unwrap().as_str(), "abc");
        }

        it "saves the token" {
            store.login("abc").unwrap();
            assert_eq!(persistence.current().unwrap().token, "abc");
        }

        it "rejects an empty token and changes nothing" {
            let err = store.login("").unwrap_err();

            assert!(matches!(err, SessionError::EmptyToken));
            assert!(!store.is_authenticated());
            assert!(persistence.current().is_none());
        }

        it "replaces an existing session as a whole" {
            store.login("first").unwrap();
            let before = store.snapshot();

            store.login("second").unwrap();
            let after = store.snapshot();

            assert_eq!(after.session.token().unwrap().as_str(), "second");
            assert!(after.generation > before.generation);
            assert_eq!(persistence.current().unwrap().token, "second");
        }

        it "leaves the session untouched when saving fails" {
            let broken = CredentialStore::with_persistence(BrokenPersistence);

            let err = broken.login("abc").unwrap_err();

            assert!(matches!(err, SessionError::Persistence(_)));
            assert!(!broken.is_authenticated());
        }
    }

    describe "invalidate" {
        it "ends the session and clears the saved record" {
            store.login("abc").unwrap();

            assert!(store.invalidate());

            assert!(!store.is_authenticated());
            assert!(store.token().is_none());
            assert!(persistence.current().is_none());
        }

        it "is a no-op while unauthenticated" {
            let before = store.snapshot();

            assert!(!store.invalidate());

            assert_eq!(store.snapshot(), before);
        }

        it "still clears memory when the saved record cannot be removed" {
            let sticky = sticky_store();
            sticky.login("abc").unwrap();

            assert!(sticky.invalidate());
            assert!(!sticky.is_authenticated());
        }
    }

    describe "logout" {
        it "ends the session" {
            store.login("abc").unwrap();
            store.logout().expect("logout should succeed");

            assert!(!store.is_authenticated());
            assert!(persistence.current().is_none());
        }

        it "reports a failure to clear the saved record" {
            let sticky = sticky_store();
            sticky.login("abc").unwrap();

            let err = sticky.logout().unwrap_err();

            assert!(matches!(err, SessionError::Persistence(_)));
            assert!(!sticky.is_authenticated());
        }

        it "is idempotent" {
            store.logout().unwrap();
            store.logout().unwrap();
            assert!(!store.is_authenticated());
        }
    }

    describe "rehydrate" {
        it "restores a saved session" {
            let saved = MemoryPersistence::with_record(PersistedSession::new("saved-token"));

            let restored = CredentialStore::rehydrated(saved).expect("rehydrate should succeed");

            assert!(restored.is_authenticated());
            assert_eq!(restored.token().unwrap().as_str(), "saved-token");
        }

        it "stays unauthenticated without a saved session" {
            assert!(!store.rehydrate().unwrap());
            assert!(!store.is_authenticated());
        }

        it "discards a saved record with an empty token" {
            let saved = MemoryPersistence::with_record(PersistedSession::new(""));

            let restored = CredentialStore::rehydrated(saved.clone()).unwrap();

            assert!(!restored.is_authenticated());
            assert!(saved.current().is_none());
        }

        it "does nothing without a persistence layer" {
            let ephemeral = CredentialStore::new();
            assert!(!ephemeral.rehydrate().unwrap());
        }

        it "survives a process restart through sqlite" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("session.db");

            let first_run = CredentialStore::with_persistence(sqlite_at(path.clone()));
            first_run.login("persisted-token").unwrap();
            drop(first_run);

            let second_run = CredentialStore::rehydrated(sqlite_at(path.clone())).unwrap();
            assert_eq!(second_run.token().unwrap().as_str(), "persisted-token");

            second_run.logout().unwrap();
            drop(second_run);

            let third_run = CredentialStore::rehydrated(sqlite_at(path)).unwrap();
            assert!(!third_run.is_authenticated());
        }

        it "discards a corrupt sqlite record and can log in again" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("session.db");
            let db = sqlite_at(path.clone());

            let raw = rusqlite::Connection::open(&path).expect("Failed to open raw connection");
            raw.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES ('admin', 'not json', '')",
                [],
            )
            .expect("Failed to insert corrupt record");

            let restored =
                CredentialStore::rehydrated(db.clone()).expect("rehydrate should succeed");

            assert!(!restored.is_authenticated());
            assert!(db.load().unwrap().is_none());
            restored.logout().expect("logout should succeed");
            restored.login("fresh-token").unwrap();
            assert_eq!(db.load().unwrap().unwrap().token, "fresh-token");
        }

        it "reports a record that can be neither read nor removed" {
            let err = CredentialStore::rehydrated(UnreadablePersistence).unwrap_err();
            assert!(matches!(err, SessionError::Persistence(_)));
        }
    }

    describe "readers" {
        it "see the session and its generation change together" {
            let writer = store.clone();
            let handle = std::thread::spawn(move || {
                for i in 0..500 {
                    writer.login(format!("token-{}", i)).unwrap();
                    writer.invalidate();
                }
            });

            let mut last_generation = 0;
            for _ in 0..500 {
                let snapshot = store.snapshot();
                assert!(snapshot.generation >= last_generation);
                assert_eq!(
                    snapshot.session.is_authenticated(),
                    snapshot.generation % 2 == 1
                );
                last_generation = snapshot.generation;
            }
            handle.join().unwrap();
        }
    }
}
