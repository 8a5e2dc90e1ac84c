//! Visualization lifecycle controller.
//!
//! One controller drives one chart panel. It keeps the panel consistent with
//! two independent inputs:
//! - the dependency value (e.g. the selected scenario), which decides what
//!   data should be fetched
//! - the display intent, pushed by the view through [`VizController::display`]
//!   and [`VizController::undisplay`]
//!
//! The render sink is active exactly when the display intent is set and the
//! lifecycle state is [`LifecycleState::Displayable`].
//!
//! Every dependency change bumps a generation counter. A fetch remembers the
//! generation it was started for, and its result is dropped if the counter
//! has moved on by the time it resolves.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::task::{noop_waker_ref, LocalSpawn, LocalSpawnExt};
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::dependency::Dependency;
use crate::error::{FetchError, FetchResult};
use crate::observable::{Observable, Subscription};
use crate::sink::RenderSink;
use crate::state::LifecycleState;

type DataSource<D, P> = Box<dyn Fn(&D) -> LocalBoxFuture<'static, FetchResult<Rc<P>>>>;

struct Inner<D, P> {
    dependency: Option<D>,
    generation: u64,
    state: LifecycleState,
    display_intent: bool,
    rendered: bool,
    payload: Option<Rc<P>>,
    sink: Box<dyn RenderSink<P>>,
}

impl<D, P> Inner<D, P> {
    fn render(&mut self) {
        if self.rendered {
            return;
        }
        if let Some(payload) = self.payload.as_deref() {
            self.sink.generate_graph(payload);
            self.rendered = true;
        }
    }

    fn clear(&mut self) {
        if self.rendered {
            self.sink.remove_graph();
            self.rendered = false;
        }
    }
}

struct Core<D, P> {
    name: Rc<str>,
    inner: RefCell<Inner<D, P>>,
    state: Observable<LifecycleState>,
    source: DataSource<D, P>,
    spawner: Box<dyn LocalSpawn>,
}

impl<D: Clone + 'static, P: 'static> Core<D, P> {
    fn on_dependency(self: &Rc<Self>, dependency: Option<D>) {
        let generation = {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.payload = None;
            inner.clear();
            inner.dependency = dependency.clone();
            inner.state = if dependency.is_some() {
                LifecycleState::Loading
            } else {
                LifecycleState::Unavailable
            };
            inner.generation
        };

        let Some(dependency) = dependency else {
            debug!(panel = %self.name, generation, "dependency absent");
            self.publish();
            return;
        };

        debug!(panel = %self.name, generation, "dependency changed, loading");
        self.publish();
        self.start_fetch(&dependency, generation);
    }

    fn start_fetch(self: &Rc<Self>, dependency: &D, generation: u64) {
        let mut request = (self.source)(dependency);

        // Already-resolved requests (cache hits) are applied synchronously.
        let mut cx = Context::from_waker(noop_waker_ref());
        if let Poll::Ready(result) = request.poll_unpin(&mut cx) {
            self.complete(generation, result);
            return;
        }

        info!(panel = %self.name, generation, "fetch started");
        let weak = Rc::downgrade(self);
        let task = async move {
            let result = request.await;
            if let Some(core) = weak.upgrade() {
                core.complete(generation, result);
            }
        };
        if let Err(err) = self.spawner.spawn_local(task) {
            warn!(panel = %self.name, generation, error = %err, "could not spawn fetch");
            self.complete(
                generation,
                Err(FetchError::Spawn {
                    what: err.to_string(),
                }),
            );
        }
    }

    fn complete(&self, generation: u64, result: FetchResult<Rc<P>>) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.generation != generation {
                debug!(
                    panel = %self.name,
                    generation,
                    current = inner.generation,
                    "discarding stale fetch result"
                );
                return;
            }

            match result {
                Ok(payload) => {
                    debug!(panel = %self.name, generation, "payload ready");
                    inner.payload = Some(payload);
                    inner.state = LifecycleState::Displayable;
                    if inner.display_intent {
                        inner.render();
                    }
                }
                Err(err) => {
                    warn!(panel = %self.name, generation, error = %err, "fetch failed");
                    inner.clear();
                    inner.state = LifecycleState::Failed(err);
                }
            }
        }
        self.publish();
    }

    fn publish(&self) {
        let state = self.inner.borrow().state.clone();
        self.state.set(state);
    }
}

/// Lifecycle controller for one visualization panel.
///
/// `D` is the dependency value, `P` the fetched payload. Dropping the
/// controller deregisters it from its dependency and clears the sink.
pub struct VizController<D, P> {
    core: Rc<Core<D, P>>,
    subscription: RefCell<Option<Subscription>>,
}

impl<D: Clone + 'static, P: 'static> VizController<D, P> {
    /// Wire a controller to `dependency`.
    ///
    /// Registers exactly one change listener and immediately reacts to the
    /// dependency's current value. Fetches that do not resolve on their first
    /// poll run on `spawner`.
    pub fn new<Dep, F, S, Sp>(
        name: impl Into<String>,
        dependency: &Dep,
        source: F,
        sink: S,
        spawner: Sp,
    ) -> Self
    where
        Dep: Dependency<D> + ?Sized,
        F: Fn(&D) -> LocalBoxFuture<'static, FetchResult<Rc<P>>> + 'static,
        S: RenderSink<P> + 'static,
        Sp: LocalSpawn + 'static,
    {
        let name: String = name.into();
        let core = Rc::new(Core {
            name: Rc::from(name),
            inner: RefCell::new(Inner {
                dependency: None,
                generation: 0,
                state: LifecycleState::Unavailable,
                display_intent: false,
                rendered: false,
                payload: None,
                sink: Box::new(sink),
            }),
            state: Observable::new(LifecycleState::Unavailable),
            source: Box::new(source),
            spawner: Box::new(spawner),
        });

        let weak = Rc::downgrade(&core);
        let subscription = dependency.on_change(Box::new(move |value| {
            if let Some(core) = weak.upgrade() {
                core.on_dependency(value);
            }
        }));
        core.on_dependency(dependency.current());

        Self {
            core,
            subscription: RefCell::new(Some(subscription)),
        }
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Request the visualization to be shown.
    ///
    /// Renders the cached payload right away when it is displayable; never
    /// starts a fetch. No-op once disposed.
    pub fn display(&self) {
        if self.is_disposed() {
            return;
        }
        let mut inner = self.core.inner.borrow_mut();
        inner.display_intent = true;
        if inner.state.is_displayable() {
            inner.render();
        }
    }

    /// Request the visualization to be hidden, clearing it if drawn.
    pub fn undisplay(&self) {
        let mut inner = self.core.inner.borrow_mut();
        inner.display_intent = false;
        inner.clear();
    }

    /// Refetch after a failure. Returns `false` unless the state was `Failed`
    /// and the controller is still live.
    pub fn retry(&self) -> bool {
        if self.is_disposed() {
            return false;
        }
        let dependency = {
            let inner = self.core.inner.borrow();
            if !inner.state.is_failed() {
                return false;
            }
            inner.dependency.clone()
        };
        info!(panel = %self.core.name, "retrying");
        self.core.on_dependency(dependency);
        true
    }

    /// Deregister from the dependency and clear the sink. Idempotent.
    ///
    /// Fetches still in flight are discarded when they resolve.
    pub fn dispose(&self) {
        if let Some(subscription) = self.subscription.borrow_mut().take() {
            subscription.unsubscribe();
            debug!(panel = %self.core.name, "disposed");
        }
        let mut inner = self.core.inner.borrow_mut();
        inner.generation += 1;
        inner.display_intent = false;
        inner.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.subscription.borrow().is_none()
    }

    pub fn state(&self) -> LifecycleState {
        self.core.state.get()
    }

    /// Observe lifecycle transitions.
    pub fn subscribe_state(&self, listener: impl Fn(&LifecycleState) + 'static) -> Subscription {
        self.core.state.subscribe(listener)
    }

    pub fn is_displayed(&self) -> bool {
        self.core.inner.borrow().display_intent
    }

    /// Whether the sink currently shows a representation.
    pub fn is_rendered(&self) -> bool {
        self.core.inner.borrow().rendered
    }

    /// Payload for the current dependency, once fetched.
    pub fn payload(&self) -> Option<Rc<P>> {
        self.core.inner.borrow().payload.clone()
    }

    pub fn dependency(&self) -> Option<D> {
        self.core.inner.borrow().dependency.clone()
    }
}

impl<D, P> Drop for VizController<D, P> {
    fn drop(&mut self) {
        self.subscription.get_mut().take();
        if let Ok(mut inner) = self.core.inner.try_borrow_mut() {
            inner.generation += 1;
            inner.display_intent = false;
            inner.clear();
        }
    }
}

impl<D, P> fmt::Debug for VizController<D, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.core.inner.borrow();
        f.debug_struct("VizController")
            .field("name", &self.core.name)
            .field("state", &inner.state)
            .field("generation", &inner.generation)
            .field("display_intent", &inner.display_intent)
            .field("rendered", &inner.rendered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::fn_sink;
    use futures::channel::oneshot;
    use futures::executor::LocalPool;
    use futures::future;
    use std::cell::Cell;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Generate(String),
        Remove,
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    fn logging_sink(log: &Log) -> impl RenderSink<String> + use<> {
        let (gen_log, rm_log) = (Rc::clone(log), Rc::clone(log));
        fn_sink(
            move |p: &String| gen_log.borrow_mut().push(Call::Generate(p.clone())),
            move || rm_log.borrow_mut().push(Call::Remove),
        )
    }

    /// Data source whose responses are released by the test.
    #[derive(Clone, Default)]
    struct Gate {
        pending: Rc<RefCell<HashMap<u32, Vec<oneshot::Sender<FetchResult<Rc<String>>>>>>>,
        calls: Rc<Cell<u32>>,
    }

    impl Gate {
        fn source(
            &self,
        ) -> impl Fn(&u32) -> LocalBoxFuture<'static, FetchResult<Rc<String>>> + use<> {
            let gate = self.clone();
            move |key: &u32| {
                gate.calls.set(gate.calls.get() + 1);
                let (tx, rx) = oneshot::channel();
                gate.pending.borrow_mut().entry(*key).or_default().push(tx);
                async move {
                    rx.await
                        .unwrap_or_else(|_| Err(FetchError::transport("dropped")))
                }
                .boxed_local()
            }
        }

        fn resolve(&self, key: u32, result: FetchResult<&str>) {
            let tx = self
                .pending
                .borrow_mut()
                .get_mut(&key)
                .and_then(|senders| (!senders.is_empty()).then(|| senders.remove(0)))
                .expect("a pending fetch for key");
            let _ = tx.send(result.map(|s| Rc::new(s.to_string())));
        }
    }

    fn setup(initial: Option<u32>) -> (Observable<Option<u32>>, Gate, Log, LocalPool, VizController<u32, String>) {
        let dep = Observable::new(initial);
        let gate = Gate::default();
        let log: Log = Rc::default();
        let pool = LocalPool::new();
        let ctrl = VizController::new("test", &dep, gate.source(), logging_sink(&log), pool.spawner());
        (dep, gate, log, pool, ctrl)
    }

    #[test]
    fn absent_dependency_is_unavailable() {
        let (_dep, gate, log, _pool, ctrl) = setup(None);
        assert_eq!(ctrl.state(), LifecycleState::Unavailable);
        ctrl.display();
        assert_eq!(gate.calls.get(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn initial_value_triggers_fetch() {
        let (_dep, gate, _log, mut pool, ctrl) = setup(Some(1));
        assert_eq!(ctrl.state(), LifecycleState::Loading);
        assert_eq!(gate.calls.get(), 1);

        gate.resolve(1, Ok("p1"));
        pool.run_until_stalled();
        assert_eq!(ctrl.state(), LifecycleState::Displayable);
        assert_eq!(ctrl.payload().as_deref().map(String::as_str), Some("p1"));
    }

    #[test]
    fn hidden_panel_defers_rendering() {
        let (_dep, gate, log, mut pool, ctrl) = setup(Some(1));
        gate.resolve(1, Ok("p1"));
        pool.run_until_stalled();
        assert!(log.borrow().is_empty());

        ctrl.display();
        ctrl.display();
        assert_eq!(*log.borrow(), vec![Call::Generate("p1".into())]);
        assert_eq!(gate.calls.get(), 1);

        ctrl.undisplay();
        ctrl.undisplay();
        assert_eq!(
            *log.borrow(),
            vec![Call::Generate("p1".into()), Call::Remove]
        );
    }

    #[test]
    fn full_selection_walkthrough() {
        let (dep, gate, log, mut pool, ctrl) = setup(None);
        assert_eq!(ctrl.state(), LifecycleState::Unavailable);

        dep.set(Some(1));
        gate.resolve(1, Ok("P1"));
        pool.run_until_stalled();
        assert_eq!(ctrl.state(), LifecycleState::Displayable);

        ctrl.display();
        assert_eq!(*log.borrow(), vec![Call::Generate("P1".into())]);

        dep.set(Some(2));
        assert_eq!(ctrl.state(), LifecycleState::Loading);
        assert_eq!(
            *log.borrow(),
            vec![Call::Generate("P1".into()), Call::Remove]
        );

        gate.resolve(2, Ok("P2"));
        pool.run_until_stalled();
        assert_eq!(ctrl.state(), LifecycleState::Displayable);

        ctrl.undisplay();
        assert_eq!(
            *log.borrow(),
            vec![
                Call::Generate("P1".into()),
                Call::Remove,
                Call::Generate("P2".into()),
                Call::Remove,
            ]
        );
    }

    #[test]
    fn stale_result_is_discarded() {
        let (dep, gate, log, mut pool, ctrl) = setup(Some(1));
        ctrl.display();
        dep.set(Some(2));

        gate.resolve(2, Ok("B"));
        pool.run_until_stalled();
        gate.resolve(1, Ok("A"));
        pool.run_until_stalled();

        assert_eq!(ctrl.state(), LifecycleState::Displayable);
        assert_eq!(ctrl.payload().as_deref().map(String::as_str), Some("B"));
        assert_eq!(*log.borrow(), vec![Call::Generate("B".into())]);
    }

    #[test]
    fn stale_result_after_deselect_is_discarded() {
        let (dep, gate, _log, mut pool, ctrl) = setup(Some(1));
        dep.set(None);
        gate.resolve(1, Ok("A"));
        pool.run_until_stalled();
        assert_eq!(ctrl.state(), LifecycleState::Unavailable);
        assert!(ctrl.payload().is_none());
    }

    #[test]
    fn failure_is_surfaced_and_retryable() {
        let (_dep, gate, log, mut pool, ctrl) = setup(Some(4));
        ctrl.display();
        gate.resolve(4, Err(FetchError::transport("timeout")));
        pool.run_until_stalled();

        assert_eq!(
            ctrl.state(),
            LifecycleState::Failed(FetchError::transport("timeout"))
        );
        assert!(log.borrow().is_empty());

        assert!(ctrl.retry());
        assert_eq!(ctrl.state(), LifecycleState::Loading);
        assert!(!ctrl.retry());

        gate.resolve(4, Ok("ok"));
        pool.run_until_stalled();
        assert_eq!(*log.borrow(), vec![Call::Generate("ok".into())]);
    }

    #[test]
    fn ready_source_resolves_synchronously() {
        let dep = Observable::new(Some(3_u32));
        let log: Log = Rc::default();
        let pool = LocalPool::new();
        let ctrl = VizController::new(
            "sync",
            &dep,
            |k: &u32| future::ready(Ok(Rc::new(format!("v{}", k)))).boxed_local(),
            logging_sink(&log),
            pool.spawner(),
        );
        assert_eq!(ctrl.state(), LifecycleState::Displayable);
        ctrl.display();
        assert_eq!(*log.borrow(), vec![Call::Generate("v3".into())]);
    }

    #[test]
    fn state_changes_are_observable() {
        let (dep, gate, _log, mut pool, ctrl) = setup(None);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let out = Rc::clone(&seen);
        let _sub = ctrl.subscribe_state(move |s| out.borrow_mut().push(s.label()));

        dep.set(Some(1));
        gate.resolve(1, Ok("x"));
        pool.run_until_stalled();
        dep.set(None);

        assert_eq!(*seen.borrow(), vec!["loading", "displayable", "unavailable"]);
    }

    #[test]
    fn dispose_deregisters_and_clears() {
        let (dep, gate, log, mut pool, ctrl) = setup(Some(1));
        gate.resolve(1, Ok("x"));
        pool.run_until_stalled();
        ctrl.display();
        assert_eq!(dep.subscriber_count(), 1);

        ctrl.dispose();
        ctrl.dispose();
        assert!(ctrl.is_disposed());
        assert_eq!(dep.subscriber_count(), 0);
        assert_eq!(*log.borrow(), vec![Call::Generate("x".into()), Call::Remove]);

        dep.set(Some(2));
        assert_eq!(gate.calls.get(), 1);
    }

    #[test]
    fn disposed_controller_ignores_display() {
        let (_dep, gate, log, mut pool, ctrl) = setup(Some(1));
        gate.resolve(1, Ok("x"));
        pool.run_until_stalled();

        ctrl.dispose();
        ctrl.display();
        assert!(!ctrl.is_rendered());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn disposed_controller_refuses_retry() {
        let (_dep, gate, _log, mut pool, ctrl) = setup(Some(1));
        gate.resolve(1, Err(FetchError::transport("timeout")));
        pool.run_until_stalled();
        assert!(ctrl.state().is_failed());

        ctrl.dispose();
        assert!(!ctrl.retry());
        assert_eq!(gate.calls.get(), 1);
    }

    #[test]
    fn drop_deregisters() {
        let (dep, _gate, _log, _pool, ctrl) = setup(Some(1));
        drop(ctrl);
        assert_eq!(dep.subscriber_count(), 0);
    }
}
