//! The page controller.
//!
//! `Dashboard` owns the document and every component mounted on it. The
//! host feeds it [`DomEvent`]s, drains background results into it with
//! [`Dashboard::pump`], calls [`Dashboard::tick`] from its timer and carries
//! out the [`Effect`]s it hands back.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::api::MonitoringAction;
use crate::config::DashboardConfig;
use crate::dom::{Document, NodeId};
use crate::enhance::{Enhancer, TableControl, WidgetControl};
use crate::error::{Error, Result};
use crate::event_queue::{EventQueue, UiEvent};
use crate::health::{self, HealthSnapshot};
use crate::monitoring::MonitoringPanel;
use crate::navigation::{ClickableRows, Navigation};
use crate::notifications::{Level, Notice, Notifications};
use crate::panels::Panels;
use crate::settings::KeyValueStore;
use crate::sidebar::SidebarManager;
use crate::theme::{Theme, ThemeManager};

pub const GENERIC_ERROR: &str = "An error occurred. Please try again.";

/// Facts only the host knows.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub path: String,
    pub prefers_dark: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    Click { target: NodeId },
    Input { target: NodeId, value: String },
    KeyPress { target: NodeId, key: String },
    /// A tab trigger finished showing its pane.
    TabShown { trigger: NodeId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Navigate(String),
    Reload,
    Dispatch(MonitoringAction),
    RefreshStatus,
}

#[derive(Debug, Clone, Copy)]
enum Binding {
    ThemeToggle,
    SidebarToggle,
    Panel(usize),
    NavLink,
    Row,
    Toast(Uuid),
    Monitoring(MonitoringAction),
    Widget(WidgetControl),
}

pub struct Dashboard {
    doc: Document,
    store: Box<dyn KeyValueStore>,
    config: DashboardConfig,
    theme: ThemeManager,
    sidebar: Option<SidebarManager>,
    panels: Panels,
    navigation: Navigation,
    rows: ClickableRows,
    enhancer: Enhancer,
    notifications: Notifications,
    monitoring: Option<MonitoringPanel>,
    indicator: Option<NodeId>,
    bindings: HashMap<NodeId, Binding>,
    effects: Vec<Effect>,
    reload_at: Option<Instant>,
    last_health: Option<HealthSnapshot>,
}

impl Dashboard {
    /// Runs every page initializer against `doc`.
    #[tracing::instrument(skip_all, fields(path = %ctx.path))]
    pub fn mount(
        mut doc: Document,
        mut store: Box<dyn KeyValueStore>,
        config: DashboardConfig,
        ctx: &PageContext,
        now: Instant,
    ) -> Result<Self> {
        let theme = ThemeManager::mount(&mut doc, store.as_mut(), ctx.prefers_dark)?;
        let sidebar = SidebarManager::mount(&mut doc, store.as_mut())?;
        let panels = Panels::mount(&mut doc, store.as_mut())?;
        let navigation = Navigation::mount(&mut doc, &ctx.path);
        let rows = ClickableRows::mount(&mut doc);
        let mut enhancer = Enhancer::new();
        let controls = enhancer.enhance_all(&mut doc);
        let monitoring = MonitoringPanel::mount(&doc);
        let indicator = doc.get_element_by_id(health::INDICATOR_ID);

        let mut dashboard = Self {
            notifications: Notifications::new(config.toast_duration()),
            reload_at: config.auto_refresh().map(|after| now + after),
            doc,
            store,
            config,
            theme,
            sidebar,
            panels,
            navigation,
            rows,
            enhancer,
            monitoring,
            indicator,
            bindings: HashMap::new(),
            effects: Vec::new(),
            last_health: None,
        };
        dashboard.bind_all(controls);

        if dashboard
            .monitoring
            .as_ref()
            .is_some_and(|m| m.badge().is_some())
        {
            dashboard.effects.push(Effect::RefreshStatus);
        }
        info!(
            widgets = dashboard.enhancer.tables().len() + dashboard.enhancer.grids().len(),
            bindings = dashboard.bindings.len(),
            "dashboard mounted"
        );
        Ok(dashboard)
    }

    fn bind_all(&mut self, controls: Vec<(NodeId, WidgetControl)>) {
        if let Some(toggle) = self.theme.toggle_button() {
            self.bindings.insert(toggle, Binding::ThemeToggle);
        }
        if let Some(sidebar) = &self.sidebar {
            self.bindings.insert(sidebar.toggle_button(), Binding::SidebarToggle);
        }
        for (i, panel) in self.panels.panels().iter().enumerate() {
            self.bindings.insert(panel.toggle_button(), Binding::Panel(i));
        }
        for &link in self.navigation.links() {
            self.bindings.insert(link, Binding::NavLink);
        }
        for &row in self.rows.rows() {
            self.bindings.insert(row, Binding::Row);
        }
        if let Some(panel) = &self.monitoring {
            for &(node, action) in panel.buttons() {
                self.bindings.insert(node, Binding::Monitoring(action));
            }
        }
        self.bind_widgets(controls);
    }

    fn bind_widgets(&mut self, controls: Vec<(NodeId, WidgetControl)>) {
        for (node, control) in controls {
            self.bindings.insert(node, Binding::Widget(control));
        }
    }

    /// The innermost bound node at or above `target`.
    fn binding_for(&self, target: NodeId) -> Option<(NodeId, Binding)> {
        let mut cur = Some(target);
        while let Some(node) = cur {
            if let Some(id) = self.notifications.by_close_button(node) {
                return Some((node, Binding::Toast(id)));
            }
            if let Some(binding) = self.bindings.get(&node) {
                return Some((node, *binding));
            }
            cur = self.doc.parent(node);
        }
        None
    }

    /// Applies one DOM event. Errors are left to the caller; see
    /// [`Dashboard::dispatch`].
    pub fn handle(&mut self, event: DomEvent) -> Result<()> {
        match event {
            DomEvent::Click { target } => {
                self.ensure_connected(target)?;
                if let Some((node, binding)) = self.binding_for(target) {
                    self.on_click(node, target, binding)?;
                }
            }
            DomEvent::Input { target, value } => {
                self.ensure_connected(target)?;
                self.doc.set_value(target, &value);
                if let Some(Binding::Widget(
                    control @ WidgetControl::Table(_, TableControl::Search),
                )) = self.bindings.get(&target).copied()
                {
                    self.enhancer.handle(&mut self.doc, control, Some(&value));
                }
            }
            DomEvent::KeyPress { target, key } => {
                self.ensure_connected(target)?;
                if let Some((row, Binding::Row)) = self.binding_for(target) {
                    if let Some(href) = self.rows.on_key(&self.doc, row, &key) {
                        self.effects.push(Effect::Navigate(href));
                    }
                }
            }
            DomEvent::TabShown { trigger } => {
                self.ensure_connected(trigger)?;
                let controls = self.enhancer.on_tab_shown(&mut self.doc, trigger);
                self.bind_widgets(controls);
            }
        }
        Ok(())
    }

    /// [`Dashboard::handle`] behind the global error handler: a failure is
    /// logged and surfaced as a toast, and the page keeps working.
    pub fn dispatch(&mut self, event: DomEvent, now: Instant) {
        if let Err(e) = self.handle(event) {
            self.report_error(&e, now);
        }
    }

    fn ensure_connected(&self, node: NodeId) -> Result<()> {
        if self.doc.is_connected(node) {
            Ok(())
        } else {
            Err(Error::DetachedNode(node))
        }
    }

    fn on_click(&mut self, node: NodeId, target: NodeId, binding: Binding) -> Result<()> {
        debug!(?binding, "click");
        match binding {
            Binding::ThemeToggle => {
                let theme = self.theme.toggle(&mut self.doc, self.store.as_mut())?;
                debug!(theme = theme.as_str(), "theme toggled");
            }
            Binding::SidebarToggle => {
                if let Some(sidebar) = &self.sidebar {
                    sidebar.toggle(&mut self.doc, self.store.as_mut())?;
                }
            }
            Binding::Panel(idx) => {
                self.panels.toggle(idx, &mut self.doc, self.store.as_mut())?;
            }
            Binding::NavLink => self.navigation.on_link_click(&mut self.doc),
            Binding::Row => {
                if let Some(href) = self.rows.on_click(&self.doc, node, target) {
                    self.effects.push(Effect::Navigate(href));
                }
            }
            Binding::Toast(id) => {
                self.notifications.dismiss(&mut self.doc, id);
            }
            Binding::Monitoring(action) => {
                if self.doc.element(node).is_disabled() {
                    return Ok(());
                }
                if let Some(panel) = &self.monitoring {
                    panel.begin(&mut self.doc, action);
                }
                self.effects.push(Effect::Dispatch(action));
            }
            Binding::Widget(WidgetControl::Table(_, TableControl::Search)) => {}
            Binding::Widget(control) => self.enhancer.handle(&mut self.doc, control, None),
        }
        Ok(())
    }

    /// Folds one background result into the page.
    pub fn apply(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::Health(snapshot) => {
                if let Some(indicator) = self.indicator {
                    health::apply_badge(&mut self.doc, indicator, snapshot.status);
                }
                self.last_health = Some(snapshot);
            }
            UiEvent::Monitoring(state) => {
                if let Some(panel) = &self.monitoring {
                    panel.apply(&mut self.doc, state);
                }
            }
            UiEvent::Notify(notice) => {
                self.notifications.show(&mut self.doc, &notice, None, now);
            }
            UiEvent::Error(message) => {
                error!(%message, "background task failed");
                self.notify(Notice::new(GENERIC_ERROR, Level::Danger), now);
            }
        }
    }

    /// Applies everything queued by background tasks; returns the count.
    pub fn pump(&mut self, queue: &EventQueue, now: Instant) -> usize {
        let events = queue.drain();
        let n = events.len();
        for event in events {
            self.apply(event, now);
        }
        n
    }

    /// Timer work: expires toasts and schedules the auto refresh.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.expire(&mut self.doc, now);
        if self.reload_at.is_some_and(|at| at <= now) {
            info!("auto refresh");
            self.reload_at = None;
            self.effects.push(Effect::Reload);
        }
    }

    /// Effects produced since the last call, oldest first.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn report_error(&mut self, err: &Error, now: Instant) {
        error!(error = %err, "Error");
        self.notify(Notice::new(GENERIC_ERROR, Level::Danger), now);
    }

    pub fn notify(&mut self, notice: Notice, now: Instant) -> Uuid {
        self.notifications.show(&mut self.doc, &notice, None, now)
    }

    /// Whether the page shows a health badge worth polling for.
    pub fn wants_health(&self) -> bool {
        self.indicator.is_some()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn theme(&self) -> Theme {
        ThemeManager::current(&self.doc)
    }

    pub fn enhancer(&self) -> &Enhancer {
        &self.enhancer
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn monitoring(&self) -> Option<&MonitoringPanel> {
        self.monitoring.as_ref()
    }

    pub fn last_health(&self) -> Option<&HealthSnapshot> {
        self.last_health.as_ref()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.notifications.next_deadline(), self.reload_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
