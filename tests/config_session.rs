#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Mutex, MutexGuard};
    use taskboard::api::{RowStore, Store};
    use taskboard::libs::config::{Backend, Config, LocalConfig, ENV_API_KEY, ENV_API_URL, ENV_BACKEND, ENV_DB_FILE};
    use taskboard::libs::error::Error;
    use taskboard::libs::messages::Message;
    use taskboard::libs::row_id::RowId;
    use taskboard::libs::session::Session;
    use taskboard::libs::user::{Role, User};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    /// HOME and the TASKBOARD_* variables are process-wide.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvTestContext {
        temp_dir: TempDir,
        _guard: MutexGuard<'static, ()>,
    }

    impl TestContext for EnvTestContext {
        fn setup() -> Self {
            let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            for key in [ENV_BACKEND, ENV_API_URL, ENV_API_KEY, ENV_DB_FILE] {
                std::env::remove_var(key);
            }
            EnvTestContext {
                temp_dir,
                _guard: guard,
            }
        }
    }

    fn alice() -> User {
        User {
            user_id: RowId::Int(2),
            username: "alice".to_string(),
            role: Role::User,
            created_at: None,
        }
    }

    #[test_context(EnvTestContext)]
    #[test]
    fn test_config_roundtrip_through_file(ctx: &mut EnvTestContext) {
        assert_eq!(Config::read().unwrap(), Config::default());

        let db_file = ctx.temp_dir.path().join("board.db");
        let config = Config {
            backend: Backend::Local,
            remote: None,
            local: Some(LocalConfig {
                db_file: Some(db_file.clone()),
            }),
        };
        config.save().unwrap();

        let loaded = Config::read().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.local_db_path().unwrap(), db_file);
    }

    #[test_context(EnvTestContext)]
    #[test]
    fn test_environment_overrides_file(_ctx: &mut EnvTestContext) {
        Config::default().save().unwrap();
        std::env::set_var(ENV_BACKEND, "REMOTE");
        std::env::set_var(ENV_API_URL, "https://demo.supabase.co");
        std::env::set_var(ENV_API_KEY, "anon-key");
        std::env::set_var(ENV_DB_FILE, "/tmp/override.db");

        let config = Config::load().unwrap();
        for key in [ENV_BACKEND, ENV_API_URL, ENV_API_KEY, ENV_DB_FILE] {
            std::env::remove_var(key);
        }

        assert_eq!(config.backend, Backend::Remote);
        let remote = config.remote.as_ref().unwrap();
        assert_eq!(remote.api_url, "https://demo.supabase.co");
        assert_eq!(remote.api_key, "anon-key");
        assert_eq!(config.local_db_path().unwrap(), PathBuf::from("/tmp/override.db"));
    }

    #[test_context(EnvTestContext)]
    #[test]
    fn test_remote_backend_requires_settings(_ctx: &mut EnvTestContext) {
        let config = Config {
            backend: Backend::Remote,
            ..Default::default()
        };
        assert!(matches!(Store::from_config(&config), Err(Error::Config(_))));
    }

    #[test_context(EnvTestContext)]
    #[test]
    fn test_local_store_opens_in_data_dir(_ctx: &mut EnvTestContext) {
        let store = Store::from_config(&Config::default()).unwrap();
        assert!(store.location().ends_with("taskboard.db"));

        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(store.ping()).unwrap();
    }

    #[test_context(EnvTestContext)]
    #[test]
    fn test_session_lifecycle(_ctx: &mut EnvTestContext) {
        assert!(Session::load().unwrap().is_none());
        assert!(matches!(Session::current(), Err(Error::Unauthorized(Message::NotLoggedIn))));

        Session::save(&alice()).unwrap();
        assert_eq!(Session::current().unwrap(), alice());
        assert!(matches!(Session::admin(), Err(Error::Unauthorized(Message::AdminRequired))));

        assert!(Session::clear().unwrap());
        assert!(!Session::clear().unwrap());
        assert!(Session::load().unwrap().is_none());
    }

    #[test_context(EnvTestContext)]
    #[test]
    fn test_admin_session(_ctx: &mut EnvTestContext) {
        let admin = User {
            role: Role::Admin,
            username: "admin".to_string(),
            ..alice()
        };
        Session::save(&admin).unwrap();
        assert_eq!(Session::admin().unwrap().username, "admin");
    }
}
