//! Evaluator tests: framing events, turtle commands, variables, expressions,
//! control flow, functions, error recovery and the run limits.

use kidcode_eval::{evaluate, from_fn, EvalConfig, Environment, Evaluator};
use kidcode_parser::parse;
use kidcode_types::ast::Program;
use kidcode_types::Event;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn program(source: &str) -> Program {
    let result = parse(source);
    if result.errors.has_errors() {
        panic!(
            "parse errors:\n{}",
            result
                .errors
                .iter()
                .map(|e| format!("  [{}] {}", e.code, e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
    result.program
}

fn run_with(source: &str, config: &EvalConfig) -> Vec<Event> {
    let program = program(source);
    let cancel = AtomicBool::new(false);
    evaluate(&program, Environment::new(config), config, &cancel)
}

/// Run with default settings and drop the Clear/Move framing.
fn run(source: &str) -> Vec<Event> {
    let events = run_with(source, &EvalConfig::default());
    assert_eq!(events[0], Event::Clear);
    assert!(matches!(events[1], Event::Move { .. }));
    events[2..].to_vec()
}

fn says(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Say { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

fn errors(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Error { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// `(to_x, to_y, direction)` of every Move event.
fn poses(events: &[Event]) -> Vec<(i64, i64, i64)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Move {
                to_x, to_y, direction, ..
            } => Some((*to_x, *to_y, *direction)),
            _ => None,
        })
        .collect()
}

fn start_move() -> Event {
    Event::Move {
        from_x: 250,
        from_y: 250,
        to_x: 250,
        to_y: 250,
        direction: 0,
        pen_down: true,
        color: "blue".into(),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Framing
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_empty_program_emits_framing_only() {
    let events = run_with("", &EvalConfig::default());
    assert_eq!(events, vec![Event::Clear, start_move()]);
}

#[test]
fn test_framing_uses_configured_start() {
    let config = EvalConfig {
        start_x: 10,
        start_y: 20,
        start_direction: -90,
        pen_down: false,
        default_color: "Red".into(),
        ..EvalConfig::default()
    };
    let events = run_with("", &config);
    assert_eq!(
        events[1],
        Event::Move {
            from_x: 10,
            from_y: 20,
            to_x: 10,
            to_y: 20,
            direction: 270,
            pen_down: false,
            color: "red".into(),
        }
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Turtle commands
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_move_forward() {
    let events = run("move forward 100");
    assert_eq!(
        events,
        vec![Event::Move {
            from_x: 250,
            from_y: 250,
            to_x: 250,
            to_y: 150,
            direction: 0,
            pen_down: true,
            color: "blue".into(),
        }]
    );
}

#[test]
fn test_square_returns_home() {
    let events = run("repeat 4\n  move forward 100\n  turn right 90\nend repeat");
    assert_eq!(
        poses(&events),
        vec![
            (250, 150, 0),
            (250, 150, 90),
            (350, 150, 90),
            (350, 150, 180),
            (350, 250, 180),
            (350, 250, 270),
            (250, 250, 270),
            (250, 250, 0),
        ]
    );
}

#[test]
fn test_turns_restore_heading() {
    let events = run("move forward 10\nturn right 90\nmove forward 10\nturn left 90");
    let last = poses(&events).last().copied();
    assert_eq!(last.map(|p| p.2), Some(0));
}

#[test]
fn test_heading_always_normalized() {
    let events = run("turn left 30\nturn right 1000\nturn left 720\nturn right 0 - 45");
    for (_, _, direction) in poses(&events) {
        assert!((0..360).contains(&direction), "direction {direction}");
    }
    assert_eq!(poses(&events)[0].2, 330);
}

#[test]
fn test_pen_state_in_move_events() {
    let events = run("pen up\nmove forward 10\npen down");
    let pens: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            Event::Move { pen_down, .. } => Some(*pen_down),
            _ => None,
        })
        .collect();
    assert_eq!(pens, vec![false, false, true]);
}

#[test]
fn test_color_changes() {
    let events = run("color \"GREEN\"\nmove forward 5");
    let colors: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            Event::Move { color, .. } => Some(color.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(colors, vec!["green", "green"]);
}

#[test]
fn test_color_from_list() {
    let source = "set colors = [\"red\", \"purple\"]\ncolor colors[1]\nsay 1";
    let events = run(source);
    assert!(errors(&events).is_empty());
    assert!(matches!(&events[0], Event::Move { color, .. } if color == "purple"));
}

#[test]
fn test_unknown_color_is_recoverable() {
    let events = run("color \"chartreuse\"\nmove forward 1");
    assert_eq!(errors(&events), vec!["Unknown color 'chartreuse'"]);
    assert!(matches!(&events[1], Event::Move { color, .. } if color == "blue"));
}

#[test]
fn test_move_requires_number() {
    let events = run("move forward \"far\"\nsay \"still here\"");
    assert_eq!(errors(&events), vec!["'move forward' requires a number, got a string"]);
    assert_eq!(says(&events), vec!["still here"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Variables & expressions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_set_and_say() {
    let events = run("set x = 5\nsay x");
    assert_eq!(events, vec![Event::say("5")]);
}

#[test]
fn test_undefined_variable() {
    let events = run("say y");
    assert_eq!(events, vec![Event::error("variable 'y' not found")]);
}

#[test]
fn test_reassignment() {
    assert_eq!(says(&run("set x = 1\nset x = x + 1\nsay x")), vec!["2"]);
}

#[test]
fn test_arithmetic_and_precedence() {
    let events = run("say 2 + 3 * 4\nsay (2 + 3) * 4\nsay 7 / 2\nsay 10 - 3 - 2");
    assert_eq!(says(&events), vec!["14", "20", "3", "5"]);
}

#[test]
fn test_comparisons_produce_booleans() {
    let events = run("say 1 < 2\nsay 1 > 2\nsay 3 == 3\nsay 3 != 3");
    assert_eq!(says(&events), vec!["true", "false", "true", "false"]);
}

#[test]
fn test_string_concatenation() {
    let events = run("set name = \"Cody\"\nsay \"Hi \" + name + \"!\"\nsay \"n=\" + 3\nsay 1 + 2 + \"x\"");
    assert_eq!(says(&events), vec!["Hi Cody!", "n=3", "3x"]);
}

#[test]
fn test_string_with_other_operator_is_error() {
    let events = run("say \"a\" * 2\nsay \"a\" == \"a\"");
    assert_eq!(
        errors(&events),
        vec!["Cannot use '*' with a string", "Cannot use '==' with a string"]
    );
}

#[test]
fn test_division_by_zero() {
    let events = run("set z = 5 / 0\nsay z");
    assert_eq!(
        events,
        vec![
            Event::error("Division by zero"),
            Event::error("variable 'z' not found"),
        ]
    );
}

#[test]
fn test_overflow_is_recoverable() {
    let events = run("say 9223372036854775807 + 1\nsay \"ok\"");
    assert_eq!(errors(&events).len(), 1);
    assert_eq!(says(&events), vec!["ok"]);
}

#[test]
fn test_lists_and_indexing() {
    let events = run("set xs = [1, \"two\", [3]]\nsay xs\nsay xs[1]\nsay xs[2][0] + 1");
    assert_eq!(says(&events), vec!["[1, two, [3]]", "two", "4"]);
}

#[test]
fn test_index_out_of_bounds() {
    let events = run("say [\"a\", \"b\"][5]");
    assert_eq!(
        events,
        vec![Event::error("index 5 out of bounds for list of size 2")]
    );
}

#[test]
fn test_index_type_errors() {
    let events = run("say 5[0]\nsay [1][\"0\"]");
    assert_eq!(
        errors(&events),
        vec![
            "Cannot index into a number",
            "List index must be a number, got a string"
        ]
    );
}

#[test]
fn test_error_short_circuits_list() {
    let events = run("say [1, missing, 5 / 0]");
    assert_eq!(errors(&events), vec!["variable 'missing' not found"]);
}

#[test]
fn test_error_short_circuits_infix() {
    let events = run("say nope + 1 / 0");
    assert_eq!(errors(&events), vec!["variable 'nope' not found"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Control flow
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_repeat_count() {
    let events = run("repeat 3\n  move forward 10\nend");
    assert_eq!(poses(&events).len(), 3);
}

#[test]
fn test_repeat_zero_and_negative() {
    assert!(run("repeat 0\n  say 1\nend\nrepeat 0 - 2\n  say 2\nend").is_empty());
}

#[test]
fn test_repeat_requires_number() {
    let events = run("repeat \"3\"\n  say 1\nend");
    assert_eq!(errors(&events), vec!["'repeat' requires a number, got a string"]);
    assert!(says(&events).is_empty());
}

#[test]
fn test_error_inside_loop_does_not_stop_loop() {
    let events = run("repeat 2\n  say missing\n  say \"after\"\nend");
    assert_eq!(
        events,
        vec![
            Event::error("variable 'missing' not found"),
            Event::say("after"),
            Event::error("variable 'missing' not found"),
            Event::say("after"),
        ]
    );
}

#[test]
fn test_if_else() {
    let source = "set x = 7\nif x > 5\n  say \"big\"\nelse\n  say \"small\"\nend if";
    assert_eq!(says(&run(source)), vec!["big"]);
    let source = "set x = 2\nif x > 5\n  say \"big\"\nelse\n  say \"small\"\nend if";
    assert_eq!(says(&run(source)), vec!["small"]);
}

#[test]
fn test_non_boolean_conditions_are_truthy() {
    let source = "if 0\n  say \"a\"\nend\nif \"\"\n  say \"b\"\nend\nif []\n  say \"c\"\nend";
    assert_eq!(says(&run(source)), vec!["a", "b", "c"]);
}

#[test]
fn test_condition_error_is_reported() {
    let events = run("if ghost\n  say 1\nelse\n  say 2\nend");
    assert_eq!(events, vec![Event::error("variable 'ghost' not found")]);
}

#[test]
fn test_loop_variable_pattern() {
    let source = "set i = 0\nrepeat 3\n  set i = i + 1\n  say i\nend";
    assert_eq!(says(&run(source)), vec!["1", "2", "3"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_parameter_scoped_to_call() {
    let source = "define greet name\n  say \"Hello \" + name\nend define\ngreet \"Sam\"\nsay name";
    let events = run(source);
    assert_eq!(
        events,
        vec![
            Event::say("Hello Sam"),
            Event::error("variable 'name' not found"),
        ]
    );
}

#[test]
fn test_function_draws_with_world_state() {
    let source = "define square size\n  repeat 4\n    move forward size\n    turn right 90\n  end\nend\nsquare 20\nmove forward 5";
    let events = run(source);
    assert_eq!(poses(&events).len(), 9);
    assert_eq!(poses(&events).last().copied(), Some((250, 245, 0)));
}

#[test]
fn test_arguments_evaluated_in_caller_scope() {
    let source = "define show x\n  say x\nend\nset x = 1\nshow x + 1\nsay x";
    assert_eq!(says(&run(source)), vec!["2", "1"]);
}

#[test]
fn test_function_sees_globals() {
    let source = "set step = 3\ndefine walk\n  say step\nend\nwalk";
    assert_eq!(says(&run(source)), vec!["3"]);
}

#[test]
fn test_set_inside_function_is_local() {
    let source = "set x = 1\ndefine change\n  set x = 2\n  say x\nend\nchange\nsay x";
    assert_eq!(says(&run(source)), vec!["2", "1"]);
}

#[test]
fn test_nested_definition_is_global() {
    let source = "define outer\n  define inner\n    say \"inner\"\n  end\nend\nouter\ninner";
    assert_eq!(says(&run(source)), vec!["inner"]);
}

#[test]
fn test_call_before_definition() {
    let events = run("hello\ndefine hello\n  say 1\nend\nhello");
    assert_eq!(
        events,
        vec![Event::error("function 'hello' not defined"), Event::say("1")]
    );
}

#[test]
fn test_arity_mismatch() {
    let events = run("define add a b\n  say a + b\nend\nadd 1\nadd 1 2");
    assert_eq!(
        events,
        vec![
            Event::error("function 'add' expects 2 arguments, got 1"),
            Event::say("3"),
        ]
    );
}

#[test]
fn test_recursion_with_base_case() {
    let source = "define count n\n  if n > 0\n    say n\n    count n - 1\n  end\nend\ncount 3";
    assert_eq!(says(&run(source)), vec!["3", "2", "1"]);
}

#[test]
fn test_unbounded_recursion_hits_depth_limit() {
    let config = EvalConfig {
        max_call_depth: 50,
        ..EvalConfig::default()
    };
    let events = run_with("define down\n  down\nend\ndown\nsay \"after\"", &config);
    assert_eq!(errors(&events), vec!["maximum call depth of 50 exceeded"]);
    assert_eq!(says(&events), vec!["after"]);
}

#[test]
fn test_default_depth_limit_does_not_overflow_stack() {
    let events = run("define down\n  down\nend\ndown");
    assert_eq!(errors(&events), vec!["maximum call depth of 10000 exceeded"]);
}

#[test]
fn test_default_depth_allows_deep_countdown() {
    let source = "define count n\n  if n > 0\n    count n - 1\n  end\nend\ncount 1500\nsay \"done\"";
    let events = run(source);
    assert!(errors(&events).is_empty(), "{:?}", errors(&events));
    assert_eq!(says(&events), vec!["done"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Limits & cancellation
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_instruction_ceiling_halts_with_one_error() {
    let config = EvalConfig {
        instruction_limit: 100,
        ..EvalConfig::default()
    };
    let events = run_with("repeat 1000\n  say 1\nend\nsay \"never\"", &config);
    let timeout = "Execution timed out! Possible infinite loop.";
    assert_eq!(events.last(), Some(&Event::error(timeout)));
    assert_eq!(errors(&events), vec![timeout]);
    assert!(!says(&events).contains(&"never".to_string()));
}

#[test]
fn test_default_ceiling_stops_runaway_loop() {
    let events = run("repeat 2000000\n  set x = 1\nend");
    assert_eq!(
        events,
        vec![Event::error("Execution timed out! Possible infinite loop.")]
    );
}

#[test]
fn test_loop_statements_count_once_each() {
    // 600,001 statements, well under the default ceiling.
    let events = run("repeat 600000\n  set x = 1\nend\nsay \"done\"");
    assert!(errors(&events).is_empty(), "{:?}", errors(&events));
    assert_eq!(says(&events), vec!["done"]);
}

#[test]
fn test_ceiling_counts_body_statements_exactly() {
    let config = EvalConfig {
        instruction_limit: 10,
        ..EvalConfig::default()
    };
    let events = run_with("repeat 100\n  say 1\nend", &config);
    assert_eq!(says(&events).len(), 9);
    assert!(events.last().is_some_and(Event::is_error));
}

#[test]
fn test_empty_loop_still_reaches_ceiling() {
    let config = EvalConfig {
        instruction_limit: 1_000,
        ..EvalConfig::default()
    };
    let events = run_with("repeat 999999999\nend\nsay \"never\"", &config);
    assert_eq!(
        errors(&events),
        vec!["Execution timed out! Possible infinite loop."]
    );
    assert!(says(&events).is_empty());
}

#[test]
fn test_ceiling_applies_inside_functions() {
    let config = EvalConfig {
        instruction_limit: 1_000,
        ..EvalConfig::default()
    };
    let source = "define spin\n  repeat 10\n    turn right 1\n  end\n  spin\nend\nspin";
    let events = run_with(source, &config);
    assert_eq!(errors(&events).len(), 1);
    assert!(events.last().is_some_and(Event::is_error));
}

#[test]
fn test_cancelled_before_start_emits_framing_only() {
    let program = program("say 1\nsay 2");
    let config = EvalConfig::default();
    let cancel = AtomicBool::new(true);
    let events = evaluate(&program, Environment::new(&config), &config, &cancel);
    assert_eq!(events, vec![Event::Clear, start_move()]);
}

#[test]
fn test_cancel_mid_run_keeps_earlier_events() {
    let program = program("repeat 100\n  say \"tick\"\nend");
    let config = EvalConfig::default();
    let cancel = AtomicBool::new(false);
    let mut events = Vec::new();
    let sink = from_fn(|event: Event| {
        if matches!(event, Event::Say { .. }) {
            cancel.store(true, Ordering::Release);
        }
        events.push(event);
    });
    Evaluator::new(Environment::new(&config), config.clone(), &cancel, sink).run(&program);
    assert_eq!(says(&events), vec!["tick"]);
    assert!(errors(&events).is_empty());
}

// ══════════════════════════════════════════════════════════════════════════════
// Determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_evaluation_determinism_100_iterations() {
    let source = "set colors = [\"red\", \"green\", \"blue\"]\nset i = 0\nrepeat 6\n  color colors[i - i / 3 * 3]\n  move forward 10 * i\n  turn right 45\n  set i = i + 1\nend";
    let first = run(source);
    for i in 0..100 {
        assert_eq!(first, run(source), "determinism failure at iteration {i}");
    }
}
