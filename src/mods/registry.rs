//! Mod registry - holds registered mods and fans events out to them

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};

use futures::FutureExt;
use tracing::{debug, error, info};

use crate::application::errors::ModError;
use super::trait_def::{Event, Mod};

/// What happened during one event dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Number of mods whose hook was invoked
    pub invoked: usize,
    /// Number of hooks that returned an error or panicked
    pub failed: usize,
    /// First mod that vetoed a before-command event
    pub vetoed_by: Option<String>,
}

impl EventOutcome {
    pub fn is_vetoed(&self) -> bool {
        self.vetoed_by.is_some()
    }
}

/// Registry of mods, keyed by name and kept in registration order.
///
/// The registry is an ordinary value: create one, hand it (or an `Arc` of
/// it) to whatever needs to register mods or dispatch events.
pub struct ModRegistry {
    mods: RwLock<Vec<Arc<dyn Mod>>>,
}

impl ModRegistry {
    pub fn new() -> Self {
        Self {
            mods: RwLock::new(Vec::new()),
        }
    }

    /// Register a mod. Returns false if the name is taken or the mod
    /// refuses registration.
    pub fn register(&self, m: Arc<dyn Mod>) -> bool {
        {
            let Ok(mut mods) = self.mods.write() else {
                error!("Mod registry lock poisoned, cannot register '{}'", m.name());
                return false;
            };

            if !m.can_register() || mods.iter().any(|existing| existing.name() == m.name()) {
                return false;
            }

            mods.push(Arc::clone(&m));
        }

        m.register();
        info!("Registered mod: {}", m.name());
        true
    }

    /// Unregister a mod by its name. Returns false if the mod refuses or
    /// is not registered.
    pub fn unregister(&self, m: &dyn Mod) -> bool {
        if !m.can_unregister() {
            return false;
        }

        let removed = match self.mods.write() {
            Ok(mut mods) => match mods.iter().position(|existing| existing.name() == m.name()) {
                Some(index) => {
                    mods.remove(index);
                    true
                }
                None => false,
            },
            Err(_) => {
                error!("Mod registry lock poisoned, cannot unregister '{}'", m.name());
                false
            }
        };

        if removed {
            m.unregister();
            info!("Unregistered mod: {}", m.name());
        }
        removed
    }

    /// Get a mod by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Mod>> {
        self.mods.read()
            .ok()?
            .iter()
            .find(|m| m.name() == name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all registered mods, in registration order
    pub fn names(&self) -> Vec<String> {
        self.snapshot().iter().map(|m| m.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.mods.read()
            .map(|m| m.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke the hook for `event` on every registered mod, one after
    /// another. A failing or panicking hook is logged and skipped; the
    /// remaining mods still run.
    pub async fn dispatch_event(&self, event: Event<'_>) -> EventOutcome {
        let mut outcome = EventOutcome::default();

        for m in self.snapshot() {
            outcome.invoked += 1;

            let result = AssertUnwindSafe(event.fire(m.as_ref()))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(ModError::Panicked(panic_message(panic.as_ref()))));

            match result {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Mod '{}' vetoed {}", m.name(), event.hook_name());
                    if outcome.vetoed_by.is_none() {
                        outcome.vetoed_by = Some(m.name().to_string());
                    }
                }
                Err(e) => {
                    outcome.failed += 1;
                    // Captured only when RUST_BACKTRACE is set. A panicking hook also
                    // gets the panic location from the default panic hook.
                    let backtrace = Backtrace::capture();
                    error!(
                        mod_name = m.name(),
                        event = event.hook_name(),
                        error_kind = e.kind(),
                        "error while triggering event on mod: {}\ndetails: {:?}\nbacktrace:\n{}",
                        e,
                        e,
                        backtrace
                    );
                }
            }
        }

        outcome
    }

    /// Mods registered right now. Taken before dispatch so no lock is held
    /// while hooks run.
    fn snapshot(&self) -> Vec<Arc<dyn Mod>> {
        self.mods.read()
            .map(|mods| mods.clone())
            .unwrap_or_default()
    }
}

impl Default for ModRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Command, Message, User};
    use crate::mods::trait_def::HookResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Tracker {
        name: String,
        locked: bool,
        fail: bool,
        panic: bool,
        veto: bool,
        registered: AtomicUsize,
        unregistered: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl Tracker {
        fn named(name: &str) -> Self {
            Self { name: name.to_string(), ..Default::default() }
        }
    }

    #[async_trait]
    impl Mod for Tracker {
        fn name(&self) -> &str {
            &self.name
        }

        fn can_register(&self) -> bool {
            !self.locked
        }

        fn can_unregister(&self) -> bool {
            !self.locked
        }

        fn register(&self) {
            self.registered.fetch_add(1, Ordering::SeqCst);
        }

        fn unregister(&self) {
            self.unregistered.fetch_add(1, Ordering::SeqCst);
        }

        async fn on_privmsg_received(&self, msg: &Message) -> HookResult {
            if self.panic {
                panic!("tracker panicked");
            }
            if self.fail {
                return Err(ModError::Hook("tracker failed".to_string()));
            }
            self.seen.lock().unwrap().push(msg.raw.clone());
            Ok(())
        }

        async fn on_before_command_execute(&self, _msg: &Message, _cmd: &Command) -> HookResult<bool> {
            Ok(!self.veto)
        }
    }

    fn message(text: &str) -> Message {
        Message::from_text("#chan", User::new("alice"), text)
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let registry = ModRegistry::new();
        let first = Arc::new(Tracker::named("echo"));
        assert!(registry.register(first.clone()));
        assert!(!registry.register(Arc::new(Tracker::named("echo"))));
        assert_eq!(registry.len(), 1);
        assert_eq!(first.registered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_locked_mod_cannot_register() {
        let registry = ModRegistry::new();
        let locked = Arc::new(Tracker { locked: true, ..Tracker::named("locked") });
        assert!(!registry.register(locked.clone()));
        assert!(registry.is_empty());
        assert_eq!(locked.registered.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregister() {
        let registry = ModRegistry::new();
        let tracker = Arc::new(Tracker::named("echo"));

        assert!(!registry.unregister(tracker.as_ref()));
        assert_eq!(tracker.unregistered.load(Ordering::SeqCst), 0);

        registry.register(tracker.clone());
        assert!(registry.unregister(tracker.as_ref()));
        assert!(!registry.contains("echo"));
        assert_eq!(tracker.unregistered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_names_keep_registration_order() {
        let registry = ModRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(Arc::new(Tracker::named(name)));
        }
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn test_failing_hook_does_not_stop_dispatch() {
        let registry = ModRegistry::new();
        registry.register(Arc::new(Tracker { fail: true, ..Tracker::named("broken") }));
        registry.register(Arc::new(Tracker { panic: true, ..Tracker::named("panicky") }));
        let healthy = Arc::new(Tracker::named("healthy"));
        registry.register(healthy.clone());

        let msg = message("hello");
        let outcome = registry.dispatch_event(Event::PrivmsgReceived(&msg)).await;

        assert_eq!(outcome.invoked, 3);
        assert_eq!(outcome.failed, 2);
        assert_eq!(*healthy.seen.lock().unwrap(), vec!["hello".to_string()]);
    }

    /// Log sink shared with the test body
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_hook_failure_is_logged_with_details() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let registry = ModRegistry::new();
        registry.register(Arc::new(Tracker { panic: true, ..Tracker::named("panicky") }));
        let msg = message("hello");

        let outcome = tracing::subscriber::with_default(subscriber, || {
            futures::executor::block_on(registry.dispatch_event(Event::PrivmsgReceived(&msg)))
        });
        assert_eq!(outcome.failed, 1);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("panicky"));
        assert!(output.contains("on_privmsg_received"));
        assert!(output.contains("Panicked"));
        assert!(output.contains("tracker panicked"));
        assert!(output.contains("backtrace:"));
    }

    #[tokio::test]
    async fn test_missing_hook_is_noop() {
        let registry = ModRegistry::new();
        registry.register(Arc::new(Tracker::named("quiet")));

        let outcome = registry.dispatch_event(Event::Connected).await;
        assert_eq!(outcome, EventOutcome { invoked: 1, failed: 0, vetoed_by: None });
    }

    #[tokio::test]
    async fn test_veto_is_reported() {
        let registry = ModRegistry::new();
        registry.register(Arc::new(Tracker::named("ok")));
        registry.register(Arc::new(Tracker { veto: true, ..Tracker::named("guard") }));

        let msg = Message::from_command("#chan", User::new("alice"), "vote", vec![]);
        let cmd = Command::new("vote");
        let outcome = registry
            .dispatch_event(Event::BeforeCommandExecute { msg: &msg, cmd: &cmd })
            .await;

        assert_eq!(outcome.vetoed_by.as_deref(), Some("guard"));
        assert_eq!(outcome.invoked, 2);
    }
}
