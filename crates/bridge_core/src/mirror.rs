//! Mirror of the remote display state.
//!
//! The remote repaints its menu by sending `/clearText` followed by the full
//! content again. Forwarding that literally makes the controller screen blink,
//! so each channel (lines, params) coalesces bursts: a clear snapshots the
//! state, silences notifications and arms a quiet timer; when the timer fires
//! the final state is diffed against the snapshot and only real changes are
//! emitted.

use std::time::Duration;

use shared::{
    domain::{Line, LineIndex, Param, ParamIndex, MAX_LINES, MAX_PARAMS},
    protocol::{RemoteCommand, RemoteMessage},
};
use tracing::{debug, info};

use crate::{
    scheduler::{CoalesceChannel, CoalesceTimers, TimerToken},
    sinks::RemoteSink,
};

pub const QUIET_WINDOW: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq)]
pub enum MirrorEvent {
    LinesCleared,
    LineChanged {
        line: LineIndex,
        text: String,
        selected: bool,
    },
    ParamNameChanged {
        index: ParamIndex,
        name: String,
    },
    ParamValueChanged {
        index: ParamIndex,
        value: String,
    },
    /// `None` means the control bar should be removed.
    ParamCtrlChanged {
        index: ParamIndex,
        ctrl: Option<f32>,
    },
}

#[derive(Debug, Default)]
struct Burst<S> {
    token: Option<TimerToken>,
    snapshot: Option<S>,
}

impl<S> Burst<S> {
    fn is_pending(&self) -> bool {
        self.token.is_some()
    }
}

pub struct CoalescingMirror<R, T> {
    remote: R,
    timers: T,
    quiet_window: Duration,
    lines: [String; MAX_LINES],
    selected_line: LineIndex,
    params: [Param; MAX_PARAMS],
    line_burst: Burst<[Line; MAX_LINES]>,
    param_burst: Burst<[Param; MAX_PARAMS]>,
    really_clear: bool,
    changing_module: bool,
}

impl<R: RemoteSink, T: CoalesceTimers> CoalescingMirror<R, T> {
    pub fn new(remote: R, timers: T) -> Self {
        Self::with_quiet_window(remote, timers, QUIET_WINDOW)
    }

    pub fn with_quiet_window(remote: R, timers: T, quiet_window: Duration) -> Self {
        Self {
            remote,
            timers,
            quiet_window,
            lines: Default::default(),
            selected_line: LineIndex::FIRST,
            params: Default::default(),
            line_burst: Burst::default(),
            param_burst: Burst::default(),
            really_clear: false,
            changing_module: false,
        }
    }

    pub fn apply(&mut self, message: RemoteMessage) -> Vec<MirrorEvent> {
        let mut events = Vec::new();
        match message {
            RemoteMessage::Text { line, text } => self.set_text(line, text, &mut events),
            RemoteMessage::SelectText { line } => self.select_line(line, &mut events),
            RemoteMessage::ClearText => {
                if self.changing_module {
                    self.changing_module = false;
                    self.clear_params(true);
                }
                self.clear_lines();
            }
            RemoteMessage::ParamDesc { index, name } => {
                let slot = &mut self.params[index.get()];
                if slot.name != name {
                    slot.name = name.clone();
                    if !self.param_burst.is_pending() {
                        events.push(MirrorEvent::ParamNameChanged { index, name });
                    }
                }
            }
            RemoteMessage::ParamValue { index, value } => {
                let slot = &mut self.params[index.get()];
                if slot.value != value {
                    slot.value = value.clone();
                    if !self.param_burst.is_pending() {
                        events.push(MirrorEvent::ParamValueChanged { index, value });
                    }
                }
            }
            RemoteMessage::ParamCtrl { index, ctrl } => {
                let slot = &mut self.params[index.get()];
                if slot.ctrl != ctrl {
                    slot.ctrl = ctrl;
                    if !self.param_burst.is_pending() {
                        events.push(MirrorEvent::ParamCtrlChanged {
                            index,
                            ctrl: Some(ctrl),
                        });
                    }
                }
            }
            RemoteMessage::Module => {
                if self.changing_module {
                    debug!("mirror: module settled");
                }
                self.changing_module = false;
            }
        }
        events
    }

    fn set_text(&mut self, line: LineIndex, text: String, events: &mut Vec<MirrorEvent>) {
        if self.lines[line.get()] == text {
            return;
        }
        self.lines[line.get()] = text.clone();
        if !self.line_burst.is_pending() {
            events.push(MirrorEvent::LineChanged {
                line,
                text,
                selected: self.selected_line == line,
            });
        }
    }

    fn select_line(&mut self, line: LineIndex, events: &mut Vec<MirrorEvent>) {
        if self.selected_line == line {
            return;
        }
        let previous = self.selected_line;
        self.selected_line = line;
        if !self.line_burst.is_pending() {
            events.push(MirrorEvent::LineChanged {
                line: previous,
                text: self.lines[previous.get()].clone(),
                selected: false,
            });
            events.push(MirrorEvent::LineChanged {
                line,
                text: self.lines[line.get()].clone(),
                selected: true,
            });
        }
    }

    fn clear_lines(&mut self) {
        if self.line_burst.is_pending() {
            self.timers.cancel(CoalesceChannel::Lines);
        } else {
            self.line_burst.snapshot = Some(self.rendered_lines());
        }
        let token = self.timers.arm(CoalesceChannel::Lines, self.quiet_window);
        self.line_burst.token = Some(token);
        self.lines = Default::default();
    }

    /// `really_clear` is set on a module switch. A page turn past the first or
    /// last page gets no reply at all, so an empty result then means "keep
    /// what was there" rather than "the module has no parameters".
    fn clear_params(&mut self, really_clear: bool) {
        if self.param_burst.is_pending() {
            self.timers.cancel(CoalesceChannel::Params);
        } else {
            self.param_burst.snapshot = Some(self.params.clone());
        }
        let token = self.timers.arm(CoalesceChannel::Params, self.quiet_window);
        self.param_burst.token = Some(token);
        self.really_clear = really_clear;
        self.params = Default::default();
    }

    pub fn on_timer(&mut self, channel: CoalesceChannel, token: TimerToken) -> Vec<MirrorEvent> {
        let burst_token = match channel {
            CoalesceChannel::Lines => self.line_burst.token,
            CoalesceChannel::Params => self.param_burst.token,
        };
        if burst_token != Some(token) {
            debug!(?channel, "mirror: ignoring stale timer");
            return Vec::new();
        }
        match channel {
            CoalesceChannel::Lines => self.commit_lines(),
            CoalesceChannel::Params => self.commit_params(),
        }
    }

    fn commit_lines(&mut self) -> Vec<MirrorEvent> {
        self.line_burst.token = None;
        let snapshot = self.line_burst.snapshot.take().unwrap_or_default();

        if self.lines.iter().all(String::is_empty) {
            return vec![MirrorEvent::LinesCleared];
        }

        self.rendered_lines()
            .into_iter()
            .zip(snapshot)
            .zip(LineIndex::all())
            .filter(|((current, before), _)| current != before)
            .map(|((current, _), line)| MirrorEvent::LineChanged {
                line,
                text: current.text,
                selected: current.inverted,
            })
            .collect()
    }

    fn commit_params(&mut self) -> Vec<MirrorEvent> {
        self.param_burst.token = None;
        let snapshot = self.param_burst.snapshot.take().unwrap_or_default();

        if self.params.iter().all(Param::is_empty) {
            if !self.really_clear {
                debug!("mirror: page turn produced no parameters, restoring previous page");
                self.params = snapshot;
                return Vec::new();
            }
            info!("mirror: module has no parameters");
            return ParamIndex::all()
                .flat_map(|index| {
                    [
                        MirrorEvent::ParamNameChanged {
                            index,
                            name: String::new(),
                        },
                        MirrorEvent::ParamValueChanged {
                            index,
                            value: String::new(),
                        },
                        MirrorEvent::ParamCtrlChanged { index, ctrl: None },
                    ]
                })
                .collect();
        }

        let mut events = Vec::new();
        let slots = self.params.iter().zip(&snapshot);
        for (index, (current, before)) in ParamIndex::all().zip(slots) {
            if current.name != before.name {
                events.push(MirrorEvent::ParamNameChanged {
                    index,
                    name: current.name.clone(),
                });
            }
            if current.value != before.value {
                events.push(MirrorEvent::ParamValueChanged {
                    index,
                    value: current.value.clone(),
                });
            }
            if current.displayed_ctrl() != before.displayed_ctrl() {
                events.push(MirrorEvent::ParamCtrlChanged {
                    index,
                    ctrl: current.displayed_ctrl(),
                });
            }
        }
        events
    }

    fn rendered_lines(&self) -> [Line; MAX_LINES] {
        let mut lines: [Line; MAX_LINES] = Default::default();
        for (index, line) in LineIndex::all().zip(lines.iter_mut()) {
            line.text = self.lines[index.get()].clone();
            line.inverted = index == self.selected_line;
        }
        lines
    }

    pub fn navigation_activate(&mut self) {
        self.remote.send_command(RemoteCommand::NavActivate);
    }

    pub fn navigation_next(&mut self) {
        self.remote.send_command(RemoteCommand::NavNext);
    }

    pub fn navigation_previous(&mut self) {
        self.remote.send_command(RemoteCommand::NavPrev);
    }

    pub fn module_next(&mut self) {
        self.changing_module = true;
        self.remote.send_command(RemoteCommand::ModuleNext);
    }

    pub fn module_previous(&mut self) {
        self.changing_module = true;
        self.remote.send_command(RemoteCommand::ModulePrev);
    }

    pub fn page_next(&mut self) {
        self.clear_params(false);
        self.remote.send_command(RemoteCommand::PageNext);
    }

    pub fn page_previous(&mut self) {
        self.clear_params(false);
        self.remote.send_command(RemoteCommand::PagePrev);
    }

    /// Sends a control value and reports it locally right away unless a
    /// parameter burst is in flight.
    ///
    /// The mirrored slot takes the new value so later diffs compare against
    /// what the controller shows. During a burst nothing is reported, so the
    /// snapshot keeps the value the controller still has.
    pub fn param_set(&mut self, index: ParamIndex, ctrl: f32) -> Vec<MirrorEvent> {
        let ctrl = ctrl.clamp(0.0, 1.0);
        self.remote.send_command(RemoteCommand::ParamCtrl { index, ctrl });
        if self.param_burst.is_pending() {
            return Vec::new();
        }
        self.params[index.get()].ctrl = ctrl;
        vec![MirrorEvent::ParamCtrlChanged {
            index,
            ctrl: Some(ctrl),
        }]
    }

    pub fn lines(&self) -> &[String; MAX_LINES] {
        &self.lines
    }

    pub fn selected_line(&self) -> LineIndex {
        self.selected_line
    }

    pub fn params(&self) -> &[Param; MAX_PARAMS] {
        &self.params
    }

    pub fn is_pending(&self, channel: CoalesceChannel) -> bool {
        match channel {
            CoalesceChannel::Lines => self.line_burst.is_pending(),
            CoalesceChannel::Params => self.param_burst.is_pending(),
        }
    }

    pub fn is_changing_module(&self) -> bool {
        self.changing_module
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }
}

#[cfg(test)]
#[path = "tests/mirror_tests.rs"]
mod tests;
