//! Application bootstrapper.
//!
//! An [`Application`] is built once by the entry point with its root selector and
//! root render function; neither can change afterwards. Each
//! [`Application::bootstrap`] call runs `before_init` right away and then the
//! middleware chain. Only the first call schedules the mount and its init hooks
//! for the content-loaded signal.

mod host;
mod sanitize;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::element::ElementRegistry;
use crate::error::ComponentError;

pub use host::{HostDocument, MemoryDocument, ReadyState};
pub use sanitize::{prepare, sanitize_document};

pub type Hook = Box<dyn FnOnce()>;
pub type Middleware = Box<dyn FnMut()>;
pub type ComponentInit = Box<dyn FnOnce(&dyn ElementRegistry) -> Result<(), ComponentError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Unstarted,
    AwaitingDocumentReady,
    Mounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted,
    /// The root selector matched nothing; not retried.
    Skipped,
}

/// What a repeated `bootstrap` call does with middleware registered earlier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiddlewarePolicy {
    /// Every middleware runs once, during the call that registered it.
    #[default]
    RunOnce,
    /// Every call re-runs all middleware accumulated so far, then the new ones.
    Replay,
}

/// Hooks for one `bootstrap` call.
#[derive(Default)]
pub struct Bootstrap {
    before_init: Option<Hook>,
    on_init: Option<Hook>,
    components: Vec<ComponentInit>,
    after_init: Vec<Hook>,
    middlewares: Vec<Middleware>,
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrap")
            .field("before_init", &self.before_init.is_some())
            .field("on_init", &self.on_init.is_some())
            .field("components", &self.components.len())
            .field("after_init", &self.after_init.len())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

impl Bootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs synchronously at the start of `bootstrap`, before anything touches the DOM.
    pub fn before_init(mut self, f: impl FnOnce() + 'static) -> Self {
        self.before_init = Some(Box::new(f));
        self
    }

    /// Runs after the root markup is in place.
    pub fn on_init(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_init = Some(Box::new(f));
        self
    }

    /// A component registration, run after `on_init` in the order added.
    pub fn component(
        mut self,
        f: impl FnOnce(&dyn ElementRegistry) -> Result<(), ComponentError> + 'static,
    ) -> Self {
        self.components.push(Box::new(f));
        self
    }

    /// Runs after every component registration.
    pub fn after_init(mut self, f: impl FnOnce() + 'static) -> Self {
        self.after_init.push(Box::new(f));
        self
    }

    pub fn middleware(mut self, f: impl FnMut() + 'static) -> Self {
        self.middlewares.push(Box::new(f));
        self
    }
}

struct MiddlewareSlot {
    run: Middleware,
    consumed: bool,
}

pub struct Application {
    root: String,
    app: Box<dyn Fn() -> String>,
    host: Rc<dyn HostDocument>,
    registry: Rc<dyn ElementRegistry>,
    policy: MiddlewarePolicy,
    middlewares: RefCell<Vec<MiddlewareSlot>>,
    state: Cell<BootState>,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("root", &self.root)
            .field("policy", &self.policy)
            .field("middlewares", &self.middleware_count())
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

impl Application {
    pub fn new(
        root: impl Into<String>,
        app: impl Fn() -> String + 'static,
        host: Rc<dyn HostDocument>,
        registry: Rc<dyn ElementRegistry>,
    ) -> Self {
        Self {
            root: root.into(),
            app: Box::new(app),
            host,
            registry,
            policy: MiddlewarePolicy::default(),
            middlewares: RefCell::new(Vec::new()),
            state: Cell::new(BootState::Unstarted),
        }
    }

    pub fn with_middleware_policy(mut self, policy: MiddlewarePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn state(&self) -> BootState {
        self.state.get()
    }

    pub fn middleware_count(&self) -> usize {
        self.middlewares.borrow().len()
    }

    /// The app markup, trimmed and without newlines.
    pub fn render_markup(&self) -> String {
        prepare(&(self.app)())
    }

    pub fn bootstrap(self: &Rc<Self>, options: Bootstrap) {
        let Bootstrap {
            before_init,
            on_init,
            components,
            after_init,
            middlewares,
        } = options;

        if let Some(hook) = before_init {
            hook();
        }

        // Only the first call mounts; a remount would drop the live elements.
        if self.state.get() == BootState::Unstarted {
            self.state.set(BootState::AwaitingDocumentReady);
            let this = Rc::clone(self);
            self.host.when_content_loaded(Box::new(move || {
                this.content_loaded(on_init, components, after_init);
            }));
        } else if on_init.is_some() || !components.is_empty() || !after_init.is_empty() {
            log::warn!(
                "bootstrap already {:?}; init hooks of this call are ignored",
                self.state.get()
            );
        }

        self.run_middlewares(middlewares);
    }

    /// Renders, sanitizes and injects the app markup into the root element.
    pub fn mount(&self) -> MountOutcome {
        let markup = sanitize_document(&self.render_markup());
        if self.host.replace_root(&self.root, &markup) {
            self.state.set(BootState::Mounted);
            log::info!("mounted app into `{}`", self.root);
            MountOutcome::Mounted
        } else {
            log::warn!("root `{}` not found, mount skipped", self.root);
            MountOutcome::Skipped
        }
    }

    fn content_loaded(
        &self,
        on_init: Option<Hook>,
        components: Vec<ComponentInit>,
        after_init: Vec<Hook>,
    ) {
        if self.mount() == MountOutcome::Skipped {
            return;
        }
        if self.host.ready_state() < ReadyState::Interactive {
            return;
        }

        if let Some(hook) = on_init {
            hook();
        }
        for init in components {
            if let Err(err) = init(self.registry.as_ref()) {
                log::error!("component registration failed: {err}");
            }
        }
        for hook in after_init {
            hook();
        }
    }

    fn run_middlewares(&self, added: Vec<Middleware>) {
        // Taken out so a middleware may call back into the application.
        let mut slots = std::mem::take(&mut *self.middlewares.borrow_mut());
        slots.extend(added.into_iter().map(|run| MiddlewareSlot {
            run,
            consumed: false,
        }));

        for slot in &mut slots {
            if self.policy == MiddlewarePolicy::RunOnce && slot.consumed {
                continue;
            }
            (slot.run)();
            slot.consumed = true;
        }

        let mut stored = self.middlewares.borrow_mut();
        let registered_meanwhile = std::mem::take(&mut *stored);
        slots.extend(registered_meanwhile);
        *stored = slots;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{define_component, ComponentDefinition, MemoryRegistry};

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn FnMut()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = Rc::clone(&log);
        let make = move |name: &str| -> Box<dyn FnMut()> {
            let log = Rc::clone(&handle);
            let name = name.to_string();
            Box::new(move || log.borrow_mut().push(name.clone()))
        };
        (log, make)
    }

    fn app_with(doc: &Rc<MemoryDocument>, markup: &'static str) -> Rc<Application> {
        let host: Rc<dyn HostDocument> = doc.clone();
        Rc::new(Application::new(
            "#app",
            move || markup.to_string(),
            host,
            Rc::new(MemoryRegistry::new()),
        ))
    }

    #[test]
    fn test_mount_trims_and_strips_scripts() {
        let doc = Rc::new(MemoryDocument::new().with_root("#app"));
        let app = app_with(&doc, "<h1>hi</h1>\n<script>alert('x')</script>\n");

        app.bootstrap(Bootstrap::new());
        assert_eq!(app.state(), BootState::AwaitingDocumentReady);
        assert_eq!(doc.root_html("#app").as_deref(), Some(""));

        doc.fire_content_loaded();
        assert_eq!(doc.root_html("#app").as_deref(), Some("<h1>hi</h1>"));
        assert_eq!(app.state(), BootState::Mounted);
    }

    #[test]
    fn test_lifecycle_order() {
        let doc = Rc::new(MemoryDocument::new().with_root("#app"));
        let app = app_with(&doc, "<p>x</p>");
        let (log, make) = recorder();

        let (mut before, mut init, mut comp, mut after, mut mw) =
            (make("before"), make("init"), make("component"), make("after"), make("middleware"));
        app.bootstrap(
            Bootstrap::new()
                .before_init(move || before())
                .on_init(move || init())
                .component(move |_| {
                    comp();
                    Ok(())
                })
                .after_init(move || after())
                .middleware(move || mw()),
        );
        assert_eq!(*log.borrow(), vec!["before", "middleware"]);

        doc.fire_content_loaded();
        assert_eq!(
            *log.borrow(),
            vec!["before", "middleware", "init", "component", "after"]
        );
    }

    #[test]
    fn test_missing_root_skips_mount_and_init() {
        let doc = Rc::new(MemoryDocument::new().with_root("#other"));
        let app = app_with(&doc, "<p>x</p>");
        let (log, make) = recorder();
        let mut init = make("init");

        app.bootstrap(Bootstrap::new().on_init(move || init()));
        doc.fire_content_loaded();

        assert!(log.borrow().is_empty());
        assert_eq!(app.state(), BootState::AwaitingDocumentReady);
        assert_eq!(doc.root_html("#other").as_deref(), Some(""));
        assert_eq!(app.mount(), MountOutcome::Skipped);
    }

    #[test]
    fn test_already_loaded_document_mounts_immediately() {
        let doc = Rc::new(MemoryDocument::new().with_root("#app"));
        doc.set_ready_state(ReadyState::Complete);
        let app = app_with(&doc, "<p>late</p>");

        app.bootstrap(Bootstrap::new());
        assert_eq!(doc.root_html("#app").as_deref(), Some("<p>late</p>"));
        assert_eq!(doc.pending_listeners(), 0);
    }

    #[test]
    fn test_component_errors_do_not_stop_bootstrap() {
        let doc = Rc::new(MemoryDocument::new().with_root("#app"));
        let registry = Rc::new(MemoryRegistry::new());
        let app = Rc::new(Application::new(
            "#app",
            || "<x-ok></x-ok>".to_string(),
            doc.clone(),
            registry.clone(),
        ));
        let (log, make) = recorder();
        let mut after = make("after");

        app.bootstrap(
            Bootstrap::new()
                .component(|r| define_component(r, ComponentDefinition::new("broken", |_| String::new())?))
                .component(|r| define_component(r, ComponentDefinition::new("x-ok", |_| "ok".into())?))
                .after_init(move || after()),
        );
        doc.fire_content_loaded();

        assert_eq!(registry.tags(), vec!["x-ok"]);
        assert_eq!(*log.borrow(), vec!["after"]);
    }

    #[test]
    fn test_second_bootstrap_keeps_root_and_app() {
        let doc = Rc::new(MemoryDocument::new().with_root("#app"));
        let app = app_with(&doc, "<p>first</p>");
        let (log, make) = recorder();
        let mut before = make("second-before");

        app.bootstrap(Bootstrap::new());
        app.bootstrap(Bootstrap::new().before_init(move || before()));
        assert_eq!(*log.borrow(), vec!["second-before"]);

        doc.fire_content_loaded();
        assert_eq!(app.root(), "#app");
        assert_eq!(doc.root_html("#app").as_deref(), Some("<p>first</p>"));
    }

    #[test]
    fn test_late_bootstrap_does_not_remount() {
        let doc = Rc::new(MemoryDocument::new().with_root("#app"));
        let renders = Rc::new(Cell::new(0));
        let counter = Rc::clone(&renders);
        let host: Rc<dyn HostDocument> = doc.clone();
        let app = Rc::new(Application::new(
            "#app",
            move || {
                counter.set(counter.get() + 1);
                format!("<p>render {}</p>", counter.get())
            },
            host,
            Rc::new(MemoryRegistry::new()),
        ));
        let (log, make) = recorder();
        let (mut init, mut late_init, mut mw) = (make("init"), make("late-init"), make("late-mw"));

        app.bootstrap(Bootstrap::new().on_init(move || init()));
        doc.fire_content_loaded();
        assert_eq!(renders.get(), 1);

        app.bootstrap(
            Bootstrap::new()
                .on_init(move || late_init())
                .middleware(move || mw()),
        );
        assert_eq!(renders.get(), 1);
        assert_eq!(doc.root_html("#app").as_deref(), Some("<p>render 1</p>"));
        assert_eq!(*log.borrow(), vec!["init", "late-mw"]);
        assert_eq!(app.state(), BootState::Mounted);
    }

    #[test]
    fn test_middleware_runs_once_by_default() {
        let doc = Rc::new(MemoryDocument::new().with_root("#app"));
        let app = app_with(&doc, "");
        let (log, make) = recorder();

        app.bootstrap(Bootstrap::new().middleware(make("a")).middleware(make("b")));
        app.bootstrap(Bootstrap::new().middleware(make("c")));

        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(app.middleware_count(), 3);
    }

    #[test]
    fn test_middleware_replay_policy_reruns_accumulated() {
        let doc = Rc::new(MemoryDocument::new().with_root("#app"));
        let host: Rc<dyn HostDocument> = doc.clone();
        let app = Rc::new(
            Application::new("#app", String::new, host, Rc::new(MemoryRegistry::new()))
                .with_middleware_policy(MiddlewarePolicy::Replay),
        );
        let (log, make) = recorder();

        app.bootstrap(Bootstrap::new().middleware(make("a")));
        app.bootstrap(Bootstrap::new().middleware(make("b")));

        assert_eq!(*log.borrow(), vec!["a", "a", "b"]);
    }

    #[test]
    fn test_middleware_may_bootstrap_again() {
        let doc = Rc::new(MemoryDocument::new().with_root("#app"));
        let app = app_with(&doc, "");
        let (log, make) = recorder();
        let inner = make("inner");
        let handle = Rc::clone(&app);
        let mut slot = Some(inner);

        app.bootstrap(Bootstrap::new().middleware(move || {
            if let Some(inner) = slot.take() {
                handle.bootstrap(Bootstrap::new().middleware(inner));
            }
        }));

        assert_eq!(*log.borrow(), vec!["inner"]);
        assert_eq!(app.middleware_count(), 2);
    }
}
