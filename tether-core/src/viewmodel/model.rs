//! View Model
//!
//! The base every concrete view model builds on. A view model outlives the
//! views bound to it: the host attaches a fresh view on every `resume` and
//! drops it on `pause`, while the streams, registered resources and
//! accumulated state stay with the view model until `destroy`.
//!
//! # Host Protocol
//!
//! ```text
//! create(context, saved_state)   exactly once, first
//! resume(view)                   0..n times, each followed by pause
//! pause()
//! destroy()                      exactly once, last
//! ```
//!
//! `push_result` and `push_intent` may be called any time between `create`
//! and `destroy`, attached or not. Calls outside that protocol are handled
//! according to the configured [`ViolationPolicy`].

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::channel::SignalChannel;
use super::environment::{Analytics, Environment};
use super::registry::{Disposable, SubscriptionRegistry};
use super::state::{Hook, ViewModelState};
use crate::config::ViolationPolicy;
use crate::error::LifecycleError;
use crate::lifecycle::{bind_to_lifecycle, View, ViewAttachment};
use crate::stream::{Observable, Transformer};

/// Opaque state a host saved for a previous incarnation of the view model.
pub type SavedState = serde_json::Map<String, serde_json::Value>;

/// Lifecycle-scoped base for view models.
///
/// - `V`: the view type the host attaches
/// - `R`: payload of host-delivered results
/// - `I`: payload of incoming navigation intents
pub struct ViewModel<V: View, R, I> {
    environment: Environment,
    state: Mutex<ViewModelState>,
    attachment: ViewAttachment<V>,
    results: SignalChannel<R>,
    intents: SignalChannel<I>,
    registry: SubscriptionRegistry,
}

impl<V, R, I> ViewModel<V, R, I>
where
    V: View,
    R: Clone + Send + 'static,
    I: Clone + Send + 'static,
{
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            state: Mutex::new(ViewModelState::Uncreated),
            attachment: ViewAttachment::new(),
            results: SignalChannel::new("results"),
            intents: SignalChannel::new("intents"),
            registry: SubscriptionRegistry::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.environment.config().label
    }

    pub fn state(&self) -> ViewModelState {
        *self.state.lock()
    }

    pub fn analytics(&self) -> &Arc<dyn Analytics> {
        self.environment.analytics()
    }

    // ------------------------------------------------------------------------
    // Host hooks
    // ------------------------------------------------------------------------

    /// The host created the view model's first view.
    ///
    /// `context` and `saved_state` are for concrete view models; the base
    /// only starts from a detached state.
    pub fn create<C: ?Sized>(
        &self,
        _context: &C,
        saved_state: Option<&SavedState>,
    ) -> Result<(), LifecycleError> {
        if !self.advance(Hook::Create)? {
            return Ok(());
        }

        tracing::debug!(
            view_model = self.label(),
            restored = saved_state.is_some(),
            "create"
        );
        self.attachment.detach();
        Ok(())
    }

    /// Attach `view`, detaching whichever view was attached before.
    pub fn resume(&self, view: Arc<V>) -> Result<(), LifecycleError> {
        if !self.advance(Hook::Resume)? {
            return Ok(());
        }

        tracing::debug!(view_model = self.label(), "resume");
        self.attachment.attach(view);
        Ok(())
    }

    pub fn pause(&self) -> Result<(), LifecycleError> {
        if !self.advance(Hook::Pause)? {
            return Ok(());
        }

        tracing::debug!(view_model = self.label(), "pause");
        self.attachment.detach();
        Ok(())
    }

    /// Retire the view model.
    ///
    /// Releases every registered resource, then completes the attachment
    /// channel (and with it every bound stream) and both signal channels.
    ///
    /// A destroy before `create` or without a matching `pause` is a
    /// violation, but the teardown still runs so nothing registered leaks.
    pub fn destroy(&self) -> Result<(), LifecycleError> {
        let previous = {
            let mut state = self.state.lock();
            let previous = *state;
            if !previous.is_destroyed() {
                *state = ViewModelState::Destroyed;
            }
            previous
        };

        if previous.is_destroyed() {
            return self.violation(Hook::Destroy, previous).map(|_| ());
        }

        tracing::debug!(view_model = self.label(), from = %previous, "destroy");
        let failures = self.registry.dispose_all();
        if !failures.is_empty() {
            tracing::warn!(
                view_model = self.label(),
                failed = failures.len(),
                "some registered resources failed to release"
            );
        }

        self.attachment.complete();
        self.results.close();
        self.intents.close();

        match previous.after(Hook::Destroy) {
            Some(_) => Ok(()),
            None => self.violation(Hook::Destroy, previous).map(|_| ()),
        }
    }

    // ------------------------------------------------------------------------
    // Inbound signals
    // ------------------------------------------------------------------------

    /// Deliver a result to the view model, attached or not.
    pub fn push_result(&self, result: R) -> Result<(), LifecycleError> {
        if self.advance(Hook::PushResult)? {
            self.results.push(result);
        }
        Ok(())
    }

    /// Deliver an incoming navigation intent, attached or not.
    pub fn push_intent(&self, intent: I) -> Result<(), LifecycleError> {
        if self.advance(Hook::PushIntent)? {
            self.intents.push(intent);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Outbound contract for concrete view models
    // ------------------------------------------------------------------------

    /// Results pushed from now on. Completes on `destroy`.
    pub fn results(&self) -> Observable<R> {
        self.results.stream()
    }

    /// Intents pushed from now on. Completes on `destroy`.
    pub fn intents(&self) -> Observable<I> {
        self.intents.stream()
    }

    /// The binding operator for this view model.
    ///
    /// Compose every stream the view model exposes with it, so the stream
    /// ends when the attached view is finished or the view model is
    /// destroyed.
    pub fn bind_to_lifecycle<T: Send + 'static>(&self) -> Transformer<T, T> {
        bind_to_lifecycle(&self.attachment)
    }

    /// Register a resource to release on `destroy`.
    ///
    /// Prefer composing with [`bind_to_lifecycle`](Self::bind_to_lifecycle).
    /// After `destroy` the resource is released immediately.
    pub fn add_subscription<D: Disposable + 'static>(&self, entry: D) -> Result<(), LifecycleError> {
        let allowed = self.advance(Hook::AddSubscription);
        // Released even when the call is rejected, so nothing leaks.
        self.registry.add(entry);
        allowed.map(|_| ())
    }

    /// Apply `hook` to the state machine.
    ///
    /// `Ok(true)` means the hook is allowed and the state has moved on;
    /// `Ok(false)` means it was a violation ignored under the lenient
    /// policy.
    fn advance(&self, hook: Hook) -> Result<bool, LifecycleError> {
        let mut state = self.state.lock();
        let current = *state;

        match current.after(hook) {
            Some(next) => {
                *state = next;
                Ok(true)
            }
            None => {
                drop(state);
                self.violation(hook, current)
            }
        }
    }

    /// Report `hook` as out of order in `state` under the configured policy.
    fn violation(&self, hook: Hook, state: ViewModelState) -> Result<bool, LifecycleError> {
        match self.environment.config().violation_policy {
            ViolationPolicy::Strict => Err(LifecycleError::ProtocolViolation { hook, state }),
            ViolationPolicy::Lenient => {
                tracing::warn!(
                    view_model = self.label(),
                    %hook,
                    %state,
                    "out-of-order view model call"
                );
                Ok(false)
            }
        }
    }
}

impl<V: View, R, I> fmt::Debug for ViewModel<V, R, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("label", &self.environment.config().label)
            .field("state", &*self.state.lock())
            .field("attachment", &self.attachment)
            .field("results", &self.results)
            .field("intents", &self.intents)
            .field("registry", &self.registry)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewModelConfig;
    use crate::lifecycle::{LifecycleEvent, LifecycleRelay};
    use crate::stream::{Event, Subscription};
    use crate::viewmodel::FnDisposable;
    use crate::DisposeError;

    struct StubView {
        relay: LifecycleRelay,
    }

    impl StubView {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                relay: LifecycleRelay::new(),
            })
        }
    }

    impl View for StubView {
        fn lifecycle(&self) -> Observable<LifecycleEvent> {
            self.relay.observe()
        }
    }

    type TestViewModel = ViewModel<StubView, String, String>;

    fn record_intents(vm: &TestViewModel) -> (Subscription, Arc<Mutex<Vec<Event<String>>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        let subscription = vm
            .intents()
            .subscribe_events(move |event| events_clone.lock().push(event));
        (subscription, events)
    }

    fn view_model(policy: ViolationPolicy) -> TestViewModel {
        let config = ViewModelConfig::default()
            .with_label("test")
            .with_policy(policy);
        ViewModel::new(Environment::default().with_config(config))
    }

    #[test]
    fn hooks_walk_the_state_machine() {
        let vm = view_model(ViolationPolicy::Strict);
        assert_eq!(vm.state(), ViewModelState::Uncreated);

        vm.create(&(), None).unwrap();
        assert_eq!(vm.state(), ViewModelState::Created);

        vm.resume(StubView::new()).unwrap();
        assert_eq!(vm.state(), ViewModelState::Resumed);

        vm.pause().unwrap();
        assert_eq!(vm.state(), ViewModelState::Paused);

        vm.destroy().unwrap();
        assert_eq!(vm.state(), ViewModelState::Destroyed);
    }

    #[test]
    fn strict_policy_reports_violations() {
        let vm = view_model(ViolationPolicy::Strict);

        assert_eq!(
            vm.pause(),
            Err(LifecycleError::ProtocolViolation {
                hook: Hook::Pause,
                state: ViewModelState::Uncreated,
            })
        );

        vm.create(&(), None).unwrap();
        vm.destroy().unwrap();

        assert_eq!(
            vm.push_intent("late".to_string()),
            Err(LifecycleError::ProtocolViolation {
                hook: Hook::PushIntent,
                state: ViewModelState::Destroyed,
            })
        );
        assert!(vm.resume(StubView::new()).is_err());
        assert!(vm.destroy().is_err());
        assert_eq!(vm.state(), ViewModelState::Destroyed);
    }

    #[test]
    fn lenient_policy_ignores_violations() {
        let vm = view_model(ViolationPolicy::Lenient);

        assert_eq!(vm.resume(StubView::new()), Ok(()));
        assert_eq!(vm.state(), ViewModelState::Uncreated);

        vm.create(&(), None).unwrap();
        vm.destroy().unwrap();

        assert_eq!(vm.create(&(), None), Ok(()));
        assert_eq!(vm.push_result("late".to_string()), Ok(()));
        assert_eq!(vm.state(), ViewModelState::Destroyed);
    }

    #[test]
    fn strict_destroy_before_create_is_reported_but_tears_down() {
        let vm = view_model(ViolationPolicy::Strict);
        let registered = Subscription::new();
        vm.add_subscription(registered.clone()).unwrap();
        let (_subscription, intents) = record_intents(&vm);

        assert_eq!(
            vm.destroy(),
            Err(LifecycleError::ProtocolViolation {
                hook: Hook::Destroy,
                state: ViewModelState::Uncreated,
            })
        );
        assert_eq!(vm.state(), ViewModelState::Destroyed);
        assert!(registered.is_cancelled());
        assert_eq!(*intents.lock(), vec![Event::Completed]);
    }

    #[test]
    fn strict_destroy_without_pause_is_reported_but_tears_down() {
        let vm = view_model(ViolationPolicy::Strict);
        vm.create(&(), None).unwrap();
        let view = StubView::new();
        vm.resume(view.clone()).unwrap();
        let registered = Subscription::new();
        vm.add_subscription(registered.clone()).unwrap();

        assert_eq!(
            vm.destroy(),
            Err(LifecycleError::ProtocolViolation {
                hook: Hook::Destroy,
                state: ViewModelState::Resumed,
            })
        );
        assert_eq!(vm.state(), ViewModelState::Destroyed);
        assert!(registered.is_cancelled());
    }

    #[test]
    fn lenient_out_of_order_destroy_still_tears_down() {
        for resume_first in [false, true] {
            let vm = view_model(ViolationPolicy::Lenient);
            if resume_first {
                vm.create(&(), None).unwrap();
                vm.resume(StubView::new()).unwrap();
            }
            let registered = Subscription::new();
            vm.add_subscription(registered.clone()).unwrap();
            let (_subscription, intents) = record_intents(&vm);

            assert_eq!(vm.destroy(), Ok(()));
            assert_eq!(vm.state(), ViewModelState::Destroyed);
            assert!(registered.is_cancelled());
            assert_eq!(*intents.lock(), vec![Event::Completed]);
        }
    }

    #[test]
    fn second_destroy_is_reported() {
        let vm = view_model(ViolationPolicy::Strict);
        vm.create(&(), None).unwrap();
        vm.destroy().unwrap();

        assert_eq!(
            vm.destroy(),
            Err(LifecycleError::ProtocolViolation {
                hook: Hook::Destroy,
                state: ViewModelState::Destroyed,
            })
        );
    }

    #[test]
    fn violation_message_names_hook_and_state() {
        let err = LifecycleError::ProtocolViolation {
            hook: Hook::PushResult,
            state: ViewModelState::Destroyed,
        };
        assert_eq!(
            err.to_string(),
            "`push_result` is not allowed while the view model is destroyed"
        );
    }

    #[test]
    fn create_accepts_saved_state() {
        let vm = view_model(ViolationPolicy::Strict);
        let mut saved = SavedState::new();
        saved.insert("page".to_string(), serde_json::json!(3));

        vm.create("activity", Some(&saved)).unwrap();
        assert_eq!(vm.state(), ViewModelState::Created);
    }

    #[test]
    fn destroy_releases_registry_despite_failures() {
        let vm = view_model(ViolationPolicy::Strict);
        vm.create(&(), None).unwrap();

        let first = Subscription::new();
        let last = Subscription::new();
        vm.add_subscription(first.clone()).unwrap();
        vm.add_subscription(FnDisposable::new(|| Err(DisposeError::Failed("busy".into()))))
            .unwrap();
        vm.add_subscription(last.clone()).unwrap();

        vm.destroy().unwrap();

        assert!(first.is_cancelled());
        assert!(last.is_cancelled());
    }

    #[test]
    fn add_subscription_after_destroy_releases_immediately() {
        let vm = view_model(ViolationPolicy::Strict);
        vm.create(&(), None).unwrap();
        vm.destroy().unwrap();

        let late = Subscription::new();
        assert!(vm.add_subscription(late.clone()).is_err());
        assert!(late.is_cancelled());
    }

    #[test]
    fn destroy_completes_signal_streams() {
        let vm = view_model(ViolationPolicy::Lenient);
        vm.create(&(), None).unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        let _subscription = vm
            .results()
            .subscribe_events(move |event| events_clone.lock().push(event));

        vm.push_result("ok".to_string()).unwrap();
        vm.destroy().unwrap();
        vm.push_result("ignored".to_string()).unwrap();

        assert_eq!(
            *events.lock(),
            vec![Event::Next("ok".to_string()), Event::Completed]
        );
    }

    #[test]
    fn analytics_comes_from_environment() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Default)]
        struct CountingAnalytics(AtomicUsize);

        impl Analytics for CountingAnalytics {
            fn track(&self, _event: &str, _properties: serde_json::Value) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let analytics = Arc::new(CountingAnalytics::default());
        let vm: TestViewModel = ViewModel::new(Environment::new(analytics.clone()));

        vm.analytics().track("Discover Page Viewed", serde_json::json!({ "page": 1 }));
        assert_eq!(analytics.0.load(Ordering::SeqCst), 1);
    }
}
