use super::*;

type TestController = UiController<Vec<DeviceCommand>>;

fn param(index: usize) -> ParamIndex {
    ParamIndex::new(index).expect("param index")
}

fn press(controller: &mut TestController, button: Button) -> Option<ControllerAction> {
    controller.on_button(ButtonEvent::down(button))
}

fn define_param(controller: &mut TestController, index: usize, name: &str, value: &str, ctrl: f32) {
    controller.on_mirror_event(MirrorEvent::ParamNameChanged {
        index: param(index),
        name: name.into(),
    });
    controller.on_mirror_event(MirrorEvent::ParamValueChanged {
        index: param(index),
        value: value.into(),
    });
    controller.on_mirror_event(MirrorEvent::ParamCtrlChanged {
        index: param(index),
        ctrl: Some(ctrl),
    });
}

/// Controller in the parameter view with two defined slots and a drained sink.
fn params_view() -> TestController {
    let mut controller = UiController::new(Vec::new());
    controller.start();
    define_param(&mut controller, 0, "Cutoff", "440Hz", 0.5);
    define_param(&mut controller, 1, "Res", "0.1", 0.1);
    press(&mut controller, Button::B);
    assert_eq!(controller.mode(), ViewMode::Params);
    controller.device_mut().clear();
    controller
}

#[test]
fn start_paints_an_empty_menu() {
    let mut controller = UiController::new(Vec::new());
    assert_eq!(controller.mode(), ViewMode::Unknown);
    controller.start();

    let mut expected = vec![
        DeviceCommand::ClearScreen,
        DeviceCommand::SetViewMode {
            mode: ViewMode::Menu,
        },
    ];
    expected.extend((0..MAX_LINES as u8).map(|row| DeviceCommand::print_line(row, "", false)));
    assert_eq!(controller.device(), &expected);

    controller.device_mut().clear();
    controller.start();
    assert!(controller.device().is_empty());
}

#[test]
fn menu_lines_are_cached_while_in_param_view() {
    let mut controller = UiController::new(Vec::new());
    controller.start();
    press(&mut controller, Button::B);
    controller.device_mut().clear();

    controller.on_mirror_event(MirrorEvent::LineChanged {
        line: shared::domain::LineIndex::FIRST,
        text: "Synth".into(),
        selected: true,
    });
    assert!(controller.device().is_empty());
    assert_eq!(controller.lines()[0].text, "Synth");

    press(&mut controller, Button::B);
    assert_eq!(controller.mode(), ViewMode::Menu);
    assert!(controller
        .device()
        .contains(&DeviceCommand::print_line(0, "Synth", true)));
}

#[test]
fn param_view_without_params_shows_a_notice() {
    let mut controller = UiController::new(Vec::new());
    controller.start();
    controller.device_mut().clear();

    press(&mut controller, Button::B);
    assert_eq!(
        controller.device(),
        &vec![
            DeviceCommand::ClearScreen,
            DeviceCommand::SetViewMode {
                mode: ViewMode::Params,
            },
            DeviceCommand::print_line(0, "This module has", false),
            DeviceCommand::print_line(1, "no params!", false),
        ]
    );
}

#[test]
fn entering_param_view_highlights_the_first_slot() {
    let mut controller = UiController::new(Vec::new());
    controller.start();
    define_param(&mut controller, 0, "Cutoff", "440Hz", 0.5);
    define_param(&mut controller, 1, "Res", "0.1", 0.1);
    controller.device_mut().clear();

    press(&mut controller, Button::B);
    assert_eq!(
        controller.device(),
        &vec![
            DeviceCommand::ClearScreen,
            DeviceCommand::SetViewMode {
                mode: ViewMode::Params,
            },
            DeviceCommand::print_line(0, "Cutoff: 440Hz", true),
            DeviceCommand::print_ctrl(param(0), 0.5, true),
            DeviceCommand::print_line(1, "Res: 0.1", false),
            DeviceCommand::print_ctrl(param(1), 0.1, false),
        ]
    );
}

#[test]
fn menu_buttons_map_to_navigation_actions() {
    let mut controller = UiController::new(Vec::new());
    controller.start();

    assert_eq!(press(&mut controller, Button::A), Some(ControllerAction::NavActivate));
    assert_eq!(press(&mut controller, Button::Down), Some(ControllerAction::NavNext));
    assert_eq!(press(&mut controller, Button::Up), Some(ControllerAction::NavPrev));
    assert_eq!(press(&mut controller, Button::Right), Some(ControllerAction::ModuleNext));
    assert_eq!(press(&mut controller, Button::Left), Some(ControllerAction::ModulePrev));
    assert_eq!(controller.on_button(ButtonEvent::up(Button::A)), None);
    assert_eq!(controller.on_button(ButtonEvent::up(Button::B)), None);
    assert_eq!(controller.mode(), ViewMode::Menu);
}

#[test]
fn cursor_moves_between_defined_params_only() {
    let mut controller = params_view();

    assert_eq!(press(&mut controller, Button::Down), None);
    assert_eq!(controller.selected_param(), param(1));
    assert_eq!(
        controller.device(),
        &vec![
            DeviceCommand::print_line(0, "Cutoff: 440Hz", false),
            DeviceCommand::print_ctrl(param(0), 0.5, false),
            DeviceCommand::print_line(1, "Res: 0.1", true),
            DeviceCommand::print_ctrl(param(1), 0.1, true),
        ]
    );

    controller.device_mut().clear();
    press(&mut controller, Button::Down);
    assert_eq!(controller.selected_param(), param(1));
    assert!(controller.device().is_empty());

    press(&mut controller, Button::Up);
    press(&mut controller, Button::Up);
    assert_eq!(controller.selected_param(), param(0));
}

#[test]
fn editing_steps_the_selected_control() {
    let mut controller = params_view();

    assert_eq!(
        press(&mut controller, Button::A),
        Some(ControllerAction::SetParam {
            index: param(0),
            ctrl: 0.5,
        })
    );
    assert_eq!(controller.changing_param(), Some(param(0)));
    assert_eq!(
        controller.device(),
        &vec![
            DeviceCommand::print_line(0, "Cutoff: 440Hz", false),
            DeviceCommand::print_ctrl(param(0), 0.5, true),
        ]
    );

    assert_eq!(
        press(&mut controller, Button::Right),
        Some(ControllerAction::SetParam {
            index: param(0),
            ctrl: 0.5 + CTRL_STEP,
        })
    );
    assert_eq!(
        press(&mut controller, Button::Left),
        Some(ControllerAction::SetParam {
            index: param(0),
            ctrl: 0.5 - CTRL_STEP,
        })
    );

    controller.device_mut().clear();
    assert_eq!(press(&mut controller, Button::A), None);
    assert_eq!(controller.changing_param(), None);
    assert_eq!(
        controller.device(),
        &vec![
            DeviceCommand::print_line(0, "Cutoff: 440Hz", true),
            DeviceCommand::print_ctrl(param(0), 0.5, true),
        ]
    );
}

#[test]
fn control_steps_are_clamped() {
    let mut controller = UiController::new(Vec::new());
    controller.start();
    define_param(&mut controller, 0, "Level", "max", 1.0);
    press(&mut controller, Button::B);
    press(&mut controller, Button::A);

    assert_eq!(
        press(&mut controller, Button::Right),
        Some(ControllerAction::SetParam {
            index: param(0),
            ctrl: 1.0,
        })
    );
}

#[test]
fn paging_resets_the_cursor() {
    let mut controller = params_view();
    press(&mut controller, Button::Down);
    controller.device_mut().clear();

    assert_eq!(press(&mut controller, Button::Right), Some(ControllerAction::PageNext));
    assert_eq!(controller.selected_param(), param(0));
    assert_eq!(
        controller.device(),
        &vec![
            DeviceCommand::print_line(1, "Res: 0.1", false),
            DeviceCommand::print_ctrl(param(1), 0.1, false),
            DeviceCommand::print_line(0, "Cutoff: 440Hz", true),
            DeviceCommand::print_ctrl(param(0), 0.5, true),
        ]
    );
    assert_eq!(press(&mut controller, Button::Left), Some(ControllerAction::PagePrev));
}

#[test]
fn moving_while_editing_leaves_edit_mode() {
    let mut controller = params_view();
    press(&mut controller, Button::A);
    controller.device_mut().clear();

    press(&mut controller, Button::Up);
    assert_eq!(controller.changing_param(), None);
    assert_eq!(controller.selected_param(), param(0));
    assert_eq!(
        controller.device(),
        &vec![
            DeviceCommand::print_line(0, "Cutoff: 440Hz", true),
            DeviceCommand::print_ctrl(param(0), 0.5, true),
        ]
    );
}

#[test]
fn undefined_slot_loses_its_control_bar() {
    let mut controller = params_view();
    controller.on_mirror_event(MirrorEvent::ParamNameChanged {
        index: param(1),
        name: String::new(),
    });
    controller.on_mirror_event(MirrorEvent::ParamValueChanged {
        index: param(1),
        value: String::new(),
    });
    controller.on_mirror_event(MirrorEvent::ParamCtrlChanged {
        index: param(1),
        ctrl: None,
    });

    assert_eq!(
        controller.device(),
        &vec![
            DeviceCommand::print_line(1, "", false),
            DeviceCommand::print_line(1, "", false),
            DeviceCommand::DeleteCtrl { index: param(1) },
        ]
    );
}

#[test]
fn selection_falls_back_when_the_selected_param_vanishes() {
    let mut controller = params_view();
    press(&mut controller, Button::Down);
    press(&mut controller, Button::A);
    assert_eq!(controller.changing_param(), Some(param(1)));

    controller.on_mirror_event(MirrorEvent::ParamNameChanged {
        index: param(1),
        name: String::new(),
    });
    assert_eq!(controller.selected_param(), param(1));
    controller.on_mirror_event(MirrorEvent::ParamValueChanged {
        index: param(1),
        value: String::new(),
    });

    assert_eq!(controller.selected_param(), param(0));
    assert_eq!(controller.changing_param(), None);
    assert!(controller
        .device()
        .ends_with(&[
            DeviceCommand::print_line(0, "Cutoff: 440Hz", true),
            DeviceCommand::print_ctrl(param(0), 0.5, true),
        ]));
}

#[test]
fn param_updates_in_menu_view_are_not_painted() {
    let mut controller = UiController::new(Vec::new());
    controller.start();
    controller.device_mut().clear();

    define_param(&mut controller, 3, "Attack", "10ms", 0.2);
    assert!(controller.device().is_empty());
    assert_eq!(controller.params()[3].name, "Attack");
}
