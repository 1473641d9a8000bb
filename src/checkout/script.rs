use futures_util::future::BoxFuture;
use tokio::sync::OnceCell;

use super::CheckoutError;

/// Proof that the gateway's embeddable checkout script is available.
/// Only minted by a [`ScriptGate`], so holding one means the load ran.
#[derive(Debug, Clone, Copy)]
pub struct ScriptHandle {
    _private: (),
}

/// Environment-specific script loading (a `<script>` injection in a real
/// client, a no-op in tests).
pub trait LoadScript {
    fn load(&self) -> BoxFuture<'_, Result<(), String>>;
}

/// One-time latch around the script load. Concurrent callers coalesce on a
/// single load; a failed load is retryable, a successful one is permanent
/// for the life of the process.
pub struct ScriptGate {
    cell: OnceCell<ScriptHandle>,
}

impl ScriptGate {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn ensure<L: LoadScript>(&self, loader: &L) -> Result<ScriptHandle, CheckoutError> {
        self.cell
            .get_or_try_init(|| async {
                loader
                    .load()
                    .await
                    .map(|_| ScriptHandle { _private: () })
                    .map_err(CheckoutError::ScriptLoad)
            })
            .await
            .map(|handle| *handle)
    }
}

impl Default for ScriptGate {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide gate: the script is loaded once and reused across
/// every orchestrator instance.
static CHECKOUT_SCRIPT_GATE: ScriptGate = ScriptGate::new();

pub fn checkout_script_gate() -> &'static ScriptGate {
    &CHECKOUT_SCRIPT_GATE
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        calls: AtomicUsize,
        fail_first: AtomicUsize,
    }

    impl CountingLoader {
        fn new(failures: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: AtomicUsize::new(failures),
            }
        }
    }

    impl LoadScript for CountingLoader {
        fn load(&self) -> BoxFuture<'_, Result<(), String>> {
            async {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_first.load(Ordering::SeqCst) > 0 {
                    self.fail_first.fetch_sub(1, Ordering::SeqCst);
                    Err("script unreachable".to_string())
                } else {
                    Ok(())
                }
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn the_script_loads_exactly_once() {
        let gate = ScriptGate::new();
        let loader = CountingLoader::new(0);

        claim::assert_ok!(gate.ensure(&loader).await);
        claim::assert_ok!(gate.ensure(&loader).await);
        claim::assert_ok!(gate.ensure(&loader).await);

        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert!(gate.is_loaded());
    }

    #[tokio::test]
    async fn a_failed_load_can_be_retried() {
        let gate = ScriptGate::new();
        let loader = CountingLoader::new(1);

        claim::assert_err!(gate.ensure(&loader).await);
        assert!(!gate.is_loaded());

        claim::assert_ok!(gate.ensure(&loader).await);
        assert!(gate.is_loaded());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }
}
