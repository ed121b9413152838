mod common;

use std::time::Duration;

use common::{RecordingSink, Script, ScriptedButtons};
use voucher_kiosk::hardware::{ButtonId, HardwareError, RenderFrame};
use voucher_kiosk::menu::{ChoiceMenu, CounterMenu, MenuEngine, MenuError, TextEntryMenu, Variant};

use ButtonId::{Cancel, Confirm, Decrement, Increment};

fn run<V: Variant>(
    script: Script,
    menu: &mut V,
) -> (Result<Option<V::Output>, HardwareError>, RecordingSink) {
    let sink = RecordingSink::new();
    let mut engine =
        MenuEngine::new(script.buttons(), sink.clone()).with_poll_interval(Duration::ZERO);
    (engine.run(menu), sink)
}

fn choices(labels: &[&str]) -> ChoiceMenu {
    ChoiceMenu::new("Pick one", labels.iter().copied()).unwrap()
}

#[test]
fn yes_no_wraps_back_to_yes() {
    let mut menu = choices(&["Yes", "No"]);
    let script = Script::new().tap(Increment).tap(Increment).tap(Confirm);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some("Yes".to_string()));
}

#[test]
fn n_increments_return_to_the_first_choice() {
    let mut menu = choices(&["a", "b", "c", "d"]);
    let script = Script::new().taps(Increment, 4).tap(Confirm);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some("a".to_string()));
}

#[test]
fn decrement_from_first_choice_selects_the_last() {
    let mut menu = choices(&["a", "b", "c"]);
    let script = Script::new().tap(Decrement).tap(Confirm);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some("c".to_string()));
}

#[test]
fn choice_values_are_returned_instead_of_labels() {
    let mut menu = ChoiceMenu::with_values("Intern?", [("Yes", true), ("No", false)]).unwrap();
    let script = Script::new().tap(Increment).tap(Confirm);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some(false));
}

#[test]
fn empty_choice_list_is_rejected() {
    let labels: [&str; 0] = [];
    assert_eq!(
        ChoiceMenu::new("Nothing", labels).unwrap_err(),
        MenuError::EmptyChoices
    );
}

#[test]
fn counter_steps_up_and_down() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let script = Script::new()
        .taps(Increment, 3)
        .tap(Decrement)
        .tap(Confirm);
    let (result, sink) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some(2));
    assert_eq!(sink.last_frame(), Some(RenderFrame::new(["Qty:  2"])));
}

#[test]
fn counter_floors_at_zero_and_zero_is_a_result() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let script = Script::new().taps(Decrement, 3).tap(Confirm);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some(0));
}

#[test]
fn counter_has_no_ceiling_by_default() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let script = Script::new().taps(Increment, 120).tap(Confirm);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some(120));
}

#[test]
fn configured_ceiling_caps_the_counter() {
    let mut menu = CounterMenu::new("Qty").unwrap().with_ceiling(3);
    let script = Script::new().taps(Increment, 5).tap(Confirm);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some(3));
}

#[test]
fn blank_prompt_is_rejected() {
    assert_eq!(CounterMenu::new("  ").unwrap_err(), MenuError::EmptyPrompt);
}

#[test]
fn cancel_yields_no_result_for_every_variant() {
    let cancel = || Script::new().tap(Increment).tap(Cancel);

    let (result, _) = run(cancel(), &mut choices(&["Yes", "No"]));
    assert_eq!(result.unwrap(), None);

    let (result, _) = run(cancel(), &mut CounterMenu::new("Qty").unwrap());
    assert_eq!(result.unwrap(), None);

    let (result, _) = run(cancel(), &mut TextEntryMenu::new("Name").unwrap());
    assert_eq!(result.unwrap(), None);
}

#[test]
fn held_button_fires_once() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let script = Script::new().hold(Increment, 40).tap(Confirm);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some(1));
}

#[test]
fn held_confirm_does_not_leak_into_the_next_menu() {
    let mut buttons: ScriptedButtons = Script::new()
        .hold(Confirm, 5)
        .tap(Increment)
        .tap(Confirm)
        .buttons();
    let sink = RecordingSink::new();

    let first = {
        let mut engine =
            MenuEngine::new(&mut buttons, sink.clone()).with_poll_interval(Duration::ZERO);
        engine.run(&mut CounterMenu::new("First").unwrap()).unwrap()
    };
    assert_eq!(first, Some(0));

    let mut engine = MenuEngine::new(&mut buttons, sink).with_poll_interval(Duration::ZERO);
    let second = engine.run(&mut CounterMenu::new("Second").unwrap()).unwrap();
    assert_eq!(second, Some(1));
}

#[test]
fn drain_waits_for_release() {
    let buttons = Script::new().hold(Confirm, 4).buttons();
    let polls = buttons.refresh_counter();
    let mut engine =
        MenuEngine::new(buttons, RecordingSink::new()).with_poll_interval(Duration::ZERO);
    let result = engine.run(&mut CounterMenu::new("Qty").unwrap()).unwrap();
    assert_eq!(result, Some(0));
    // One poll confirms, three more see it held, one sees the release.
    assert_eq!(*polls.lock(), 5);
    let (buttons, _) = engine.into_parts();
    assert_eq!(buttons.remaining(), 0);
}

#[test]
fn cancel_wins_over_simultaneous_presses() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let script = Script::new().chord(&[Increment, Cancel, Confirm]);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), None);
}

#[test]
fn confirm_wins_over_steps() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let script = Script::new().chord(&[Increment, Confirm]);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some(0));
}

#[test]
fn held_increment_masks_a_later_decrement() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let script = Script::new()
        .poll(&[Increment])
        .poll(&[Increment])
        .poll(&[Increment, Decrement])
        .poll(&[Increment, Decrement])
        .poll(&[Increment])
        .idle(1)
        .tap(Confirm);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some(1));
}

#[test]
fn increment_pressed_over_a_held_decrement_fires() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let script = Script::new()
        .taps(Increment, 2)
        .poll(&[Decrement])
        .poll(&[Decrement, Increment])
        .idle(1)
        .tap(Confirm);
    let (result, _) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some(2));
}

#[test]
fn sink_is_written_only_when_the_frame_changes() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let script = Script::new()
        .idle(5)
        .hold(Increment, 5)
        .idle(5)
        .tap(Confirm);
    let (result, sink) = run(script, &mut menu);
    assert_eq!(result.unwrap(), Some(1));
    assert_eq!(sink.clears(), 1);
    assert_eq!(
        sink.frames(),
        vec![RenderFrame::new(["Qty:  0"]), RenderFrame::new(["Qty:  1"])]
    );
}

#[test]
fn choice_render_marks_the_active_label() {
    let mut menu = choices(&["Withdraw", "Buy"]);
    let script = Script::new().idle(1).tap(Increment).tap(Cancel);
    let (_, sink) = run(script, &mut menu);
    assert_eq!(
        sink.frames(),
        vec![
            RenderFrame::new(["Pick one", "> Withdraw", "  Buy"]),
            RenderFrame::new(["Pick one", "  Withdraw", "> Buy"]),
        ]
    );
}

#[test]
fn long_lists_scroll_to_keep_the_active_label_visible() {
    let mut menu = choices(&["a", "b", "c", "d"]).with_visible_rows(3);
    let script = Script::new().taps(Increment, 3).tap(Cancel);
    let (_, sink) = run(script, &mut menu);
    assert_eq!(
        sink.last_frame(),
        Some(RenderFrame::new(["Pick one", "  b", "  c", "> d"]))
    );
}

#[test]
fn counter_below_a_line_keeps_the_screen() {
    let mut menu = CounterMenu::new("Amount").unwrap().below(3);
    let script = Script::new().idle(1).tap(Confirm);
    let (_, sink) = run(script, &mut menu);
    assert_eq!(sink.clears(), 0);
    assert_eq!(
        sink.last_frame(),
        Some(RenderFrame::new(["Amount:  0"]).starting_at(3))
    );
}

#[test]
fn transport_fault_is_propagated() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let (result, _) = run(Script::new().tap(Increment), &mut menu);
    assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
}

#[test]
fn failing_sink_is_a_transport_fault() {
    let buttons = Script::new().idle(1).tap(Confirm).buttons();
    let mut engine =
        MenuEngine::new(buttons, RecordingSink::failing()).with_poll_interval(Duration::ZERO);
    let result = engine.run(&mut CounterMenu::new("Qty").unwrap());
    assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
}

#[test]
fn attention_cursor_is_turned_off_on_every_exit() {
    let mut name = TextEntryMenu::new("Name").unwrap();
    let (result, sink) = run(Script::new().tap(Confirm), &mut name);
    assert_eq!(result.unwrap(), Some(String::new()));
    assert_eq!(sink.attention(), vec![true, false]);

    let (result, sink) = run(Script::new().tap(Cancel), &mut name);
    assert_eq!(result.unwrap(), None);
    assert_eq!(sink.attention(), vec![true, false]);

    let (result, sink) = run(Script::new(), &mut name);
    assert!(result.is_err());
    assert_eq!(sink.attention(), vec![true, false]);
}

#[test]
fn choice_and_counter_leave_the_cursor_alone() {
    let mut menu = CounterMenu::new("Qty").unwrap();
    let (_, sink) = run(Script::new().tap(Confirm), &mut menu);
    assert!(sink.attention().is_empty());
}
