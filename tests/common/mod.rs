use std::path::PathBuf;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the test subscriber once per binary.
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
            )
            .try_init();
    });
}

/// A per-test scratch file under the system temp dir. Callers clean up.
pub fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("ladder_processor_it");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(format!("{}_{}.json", name, std::process::id()))
}
