//! Controller-side UI state machine.
//!
//! Button B flips between the menu view, which mirrors the remote's text
//! lines, and the parameter view, which shows up to eight name/value rows with
//! control bars. Mode switches are the only full repaints; everything else is
//! painted incrementally from [`MirrorEvent`]s.

use device_codec::DeviceCommand;
use shared::domain::{Button, ButtonEvent, Line, Param, ParamIndex, ViewMode, MAX_LINES, MAX_PARAMS};
use tracing::{debug, info};

use crate::{mirror::MirrorEvent, sinks::DeviceSink};

/// Control change applied per press while editing a parameter.
pub const CTRL_STEP: f32 = 4.0 / 127.0;

const NO_PARAMS_MESSAGE: [&str; 2] = ["This module has", "no params!"];

/// What a button press asks of the remote side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerAction {
    NavActivate,
    NavNext,
    NavPrev,
    ModuleNext,
    ModulePrev,
    PageNext,
    PagePrev,
    SetParam { index: ParamIndex, ctrl: f32 },
}

pub struct UiController<D> {
    device: D,
    mode: ViewMode,
    lines: [Line; MAX_LINES],
    params: [Param; MAX_PARAMS],
    selected_param: ParamIndex,
    changing_param: Option<ParamIndex>,
}

impl<D: DeviceSink> UiController<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            mode: ViewMode::Unknown,
            lines: Default::default(),
            params: Default::default(),
            selected_param: ParamIndex::FIRST,
            changing_param: None,
        }
    }

    pub fn start(&mut self) {
        self.enter_mode(ViewMode::Menu);
    }

    fn toggle_mode(&mut self) {
        let next = if self.mode == ViewMode::Params {
            ViewMode::Menu
        } else {
            ViewMode::Params
        };
        self.enter_mode(next);
    }

    fn enter_mode(&mut self, mode: ViewMode) {
        if self.mode == mode {
            return;
        }
        info!(from = ?self.mode, to = ?mode, "controller: switching view");

        self.send(DeviceCommand::ClearScreen);
        self.send(DeviceCommand::SetViewMode { mode });
        self.mode = mode;

        match mode {
            ViewMode::Menu => {
                for row in 0..MAX_LINES {
                    let line = self.lines[row].clone();
                    self.send(DeviceCommand::print_line(row as u8, line.text, line.inverted));
                }
            }
            ViewMode::Params => {
                self.selected_param = ParamIndex::FIRST;
                self.changing_param = None;
                let mut any_defined = false;
                for index in ParamIndex::all() {
                    if self.is_defined(index) {
                        any_defined = true;
                        let selected = index == self.selected_param;
                        self.print_param(index, selected);
                        self.print_ctrl(index, selected);
                    }
                }
                if !any_defined {
                    for (row, text) in NO_PARAMS_MESSAGE.iter().enumerate() {
                        self.send(DeviceCommand::print_line(row as u8, *text, false));
                    }
                }
            }
            ViewMode::Unknown => {}
        }
    }

    pub fn on_mirror_event(&mut self, event: MirrorEvent) {
        match event {
            MirrorEvent::LinesCleared => {
                self.lines = Default::default();
                if self.mode == ViewMode::Menu {
                    self.send(DeviceCommand::ClearScreen);
                }
            }
            MirrorEvent::LineChanged {
                line,
                text,
                selected,
            } => {
                self.lines[line.get()] = Line {
                    text: text.clone(),
                    inverted: selected,
                };
                if self.mode == ViewMode::Menu {
                    self.send(DeviceCommand::print_line(line.as_u8(), text, selected));
                }
            }
            MirrorEvent::ParamNameChanged { index, name } => {
                self.params[index.get()].name = name;
                self.param_row_changed(index);
            }
            MirrorEvent::ParamValueChanged { index, value } => {
                self.params[index.get()].value = value;
                self.param_row_changed(index);
            }
            MirrorEvent::ParamCtrlChanged { index, ctrl } => {
                self.params[index.get()].ctrl = ctrl.unwrap_or_default();
                if self.mode == ViewMode::Params {
                    if self.is_defined(index) {
                        self.print_ctrl(index, index == self.selected_param);
                    } else {
                        self.send(DeviceCommand::DeleteCtrl { index });
                    }
                }
            }
        }
    }

    fn param_row_changed(&mut self, index: ParamIndex) {
        if self.mode == ViewMode::Params {
            let highlighted = index == self.selected_param && self.changing_param.is_none();
            self.print_param(index, highlighted);
        }
        if index == self.selected_param && !self.is_defined(index) {
            self.settle_selection();
        }
    }

    /// Keeps the cursor on a defined parameter (or the first slot) after the
    /// selected one disappeared.
    fn settle_selection(&mut self) {
        self.changing_param = None;
        if self.selected_param == ParamIndex::FIRST {
            return;
        }
        debug!(index = %self.selected_param, "controller: selected parameter vanished");
        self.selected_param = ParamIndex::FIRST;
        if self.mode == ViewMode::Params {
            self.repaint_slot(ParamIndex::FIRST, true);
        }
    }

    pub fn on_button(&mut self, event: ButtonEvent) -> Option<ControllerAction> {
        if !event.down {
            return None;
        }
        if event.button == Button::B {
            self.toggle_mode();
            return None;
        }

        match self.mode {
            ViewMode::Menu => match event.button {
                Button::A => Some(ControllerAction::NavActivate),
                Button::Up => Some(ControllerAction::NavPrev),
                Button::Down => Some(ControllerAction::NavNext),
                Button::Left => Some(ControllerAction::ModulePrev),
                Button::Right => Some(ControllerAction::ModuleNext),
                Button::B => None,
            },
            ViewMode::Params => match event.button {
                Button::Down => {
                    self.move_selection(self.selected_param.next());
                    None
                }
                Button::Up => {
                    self.move_selection(self.selected_param.prev());
                    None
                }
                Button::Right => {
                    if self.changing_param.is_none() {
                        self.reset_selection();
                        Some(ControllerAction::PageNext)
                    } else {
                        self.adjust_selected(CTRL_STEP)
                    }
                }
                Button::Left => {
                    if self.changing_param.is_none() {
                        self.reset_selection();
                        Some(ControllerAction::PagePrev)
                    } else {
                        self.adjust_selected(-CTRL_STEP)
                    }
                }
                Button::A => {
                    if self.changing_param.is_none() {
                        self.begin_edit()
                    } else {
                        self.end_edit();
                        None
                    }
                }
                Button::B => None,
            },
            ViewMode::Unknown => None,
        }
    }

    fn move_selection(&mut self, target: Option<ParamIndex>) {
        let was_editing = self.changing_param.take().is_some();
        let previous = self.selected_param;

        match target.filter(|index| self.is_defined(*index)) {
            Some(next) => {
                self.selected_param = next;
                self.repaint_slot(previous, false);
                self.repaint_slot(next, true);
            }
            None if was_editing => self.repaint_slot(previous, true),
            None => {}
        }
    }

    fn reset_selection(&mut self) {
        let previous = self.selected_param;
        if previous == ParamIndex::FIRST {
            return;
        }
        self.selected_param = ParamIndex::FIRST;
        self.repaint_slot(previous, false);
        self.repaint_slot(ParamIndex::FIRST, true);
    }

    fn begin_edit(&mut self) -> Option<ControllerAction> {
        let index = self.selected_param;
        if !self.is_defined(index) {
            return None;
        }
        self.changing_param = Some(index);
        self.print_param(index, false);
        self.print_ctrl(index, true);
        // Echo the current value so the remote grabs this control.
        Some(ControllerAction::SetParam {
            index,
            ctrl: self.params[index.get()].ctrl,
        })
    }

    fn end_edit(&mut self) {
        self.changing_param = None;
        self.repaint_slot(self.selected_param, true);
    }

    fn adjust_selected(&self, delta: f32) -> Option<ControllerAction> {
        let index = self.selected_param;
        if !self.is_defined(index) {
            return None;
        }
        let ctrl = (self.params[index.get()].ctrl + delta).clamp(0.0, 1.0);
        Some(ControllerAction::SetParam { index, ctrl })
    }

    fn repaint_slot(&mut self, index: ParamIndex, highlighted: bool) {
        if self.is_defined(index) {
            self.print_param(index, highlighted);
            self.print_ctrl(index, highlighted);
        }
    }

    fn print_param(&mut self, index: ParamIndex, inverted: bool) {
        let text = self.params[index.get()].row_text();
        self.send(DeviceCommand::print_line(index.as_u8(), text, inverted));
    }

    fn print_ctrl(&mut self, index: ParamIndex, inverted: bool) {
        let ctrl = self.params[index.get()].ctrl;
        self.send(DeviceCommand::print_ctrl(index, ctrl, inverted));
    }

    fn is_defined(&self, index: ParamIndex) -> bool {
        self.params[index.get()].is_defined()
    }

    fn send(&mut self, command: DeviceCommand) {
        self.device.send_frame(command);
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn selected_param(&self) -> ParamIndex {
        self.selected_param
    }

    pub fn changing_param(&self) -> Option<ParamIndex> {
        self.changing_param
    }

    pub fn params(&self) -> &[Param; MAX_PARAMS] {
        &self.params
    }

    pub fn lines(&self) -> &[Line; MAX_LINES] {
        &self.lines
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
