use std::collections::HashMap;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with process environment variables temporarily changed.
///
/// Access is serialized through a global lock because env vars are process
/// state and Rust runs tests in parallel. The previous values are restored
/// when `f` returns, including on panic.
///
/// Each `(key, value)` pair sets the variable when `value` is `Some` and
/// removes it when `None`.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _restore = EnvSnapshot::apply(changes);
    f()
}

struct EnvSnapshot {
    saved: HashMap<String, Option<String>>,
}

impl EnvSnapshot {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let mut saved = HashMap::new();
        for (key, value) in changes {
            saved
                .entry(key.to_string())
                .or_insert_with(|| std::env::var(key).ok());
            match value {
                Some(new_value) => std::env::set_var(key, new_value),
                None => std::env::remove_var(key),
            }
        }
        Self { saved }
    }
}

impl Drop for EnvSnapshot {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain() {
            match value {
                Some(original) => std::env::set_var(&key, original),
                None => std::env::remove_var(&key),
            }
        }
    }
}
