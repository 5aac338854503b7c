use std::time::Duration;

use shared::domain::ButtonEvent;
use tracing::debug;

use crate::{
    controller::{ControllerAction, UiController},
    mirror::{CoalescingMirror, MirrorEvent},
    scheduler::{BridgeEvent, CoalesceTimers, ManualTimers},
    sinks::{DeviceSink, RemoteSink},
};

/// Mirror and controller wired together. Only the scheduler's worker owns one.
pub struct Bridge<D, R, T> {
    mirror: CoalescingMirror<R, T>,
    controller: UiController<D>,
}

impl<D, R, T> Bridge<D, R, T>
where
    D: DeviceSink,
    R: RemoteSink,
    T: CoalesceTimers,
{
    pub fn new(device: D, remote: R, timers: T) -> Self {
        Self {
            mirror: CoalescingMirror::new(remote, timers),
            controller: UiController::new(device),
        }
    }

    pub fn with_quiet_window(device: D, remote: R, timers: T, quiet_window: Duration) -> Self {
        Self {
            mirror: CoalescingMirror::with_quiet_window(remote, timers, quiet_window),
            controller: UiController::new(device),
        }
    }

    /// Paints the initial menu view.
    pub fn start(&mut self) {
        self.controller.start();
    }

    pub fn handle(&mut self, event: BridgeEvent) {
        let events = match event {
            BridgeEvent::Remote(message) => self.mirror.apply(message),
            BridgeEvent::Button(button) => self.on_button(button),
            BridgeEvent::TimerFired { channel, token } => self.mirror.on_timer(channel, token),
        };
        self.forward(events);
    }

    fn on_button(&mut self, event: ButtonEvent) -> Vec<MirrorEvent> {
        match self.controller.on_button(event) {
            Some(action) => self.perform(action),
            None => Vec::new(),
        }
    }

    fn perform(&mut self, action: ControllerAction) -> Vec<MirrorEvent> {
        debug!(?action, "bridge: controller action");
        match action {
            ControllerAction::NavActivate => self.mirror.navigation_activate(),
            ControllerAction::NavNext => self.mirror.navigation_next(),
            ControllerAction::NavPrev => self.mirror.navigation_previous(),
            ControllerAction::ModuleNext => self.mirror.module_next(),
            ControllerAction::ModulePrev => self.mirror.module_previous(),
            ControllerAction::PageNext => self.mirror.page_next(),
            ControllerAction::PagePrev => self.mirror.page_previous(),
            ControllerAction::SetParam { index, ctrl } => return self.mirror.param_set(index, ctrl),
        }
        Vec::new()
    }

    fn forward(&mut self, events: Vec<MirrorEvent>) {
        for event in events {
            self.controller.on_mirror_event(event);
        }
    }

    pub fn mirror(&self) -> &CoalescingMirror<R, T> {
        &self.mirror
    }

    pub fn controller(&self) -> &UiController<D> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut UiController<D> {
        &mut self.controller
    }
}

impl<D: DeviceSink, R: RemoteSink> Bridge<D, R, ManualTimers> {
    /// Moves the manual clock forward and delivers every timer that came due.
    pub fn advance(&mut self, by: Duration) {
        let fired = self.mirror.timers_mut().advance(by);
        for event in fired {
            self.handle(event);
        }
    }
}
