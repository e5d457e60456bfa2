// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Behavior-preservation tests.
//!
//! Each script runs twice in fresh Lua states — original and minified —
//! with an injected `emit` recorder. The two captures must match
//! exactly; anything else means the transform changed the program.

use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Lua, Value};

use crate::minify;
use crate::tests::CORPUS;

fn format_value(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.to_string_lossy().to_string(),
        other => panic!("emit only takes scalars in tests, got {other:?}"),
    }
}

/// Executes `script` with an `emit` global and returns what it emitted.
fn run_capture(script: &str) -> Vec<String> {
    let lua = Lua::new();
    let captured: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = captured.clone();
    let emit = lua
        .create_function(move |_, value: Value| {
            sink.borrow_mut().push(format_value(&value));
            Ok(())
        })
        .expect("create emit");
    lua.globals().set("emit", emit).expect("set emit");

    lua.load(script).exec().unwrap_or_else(|e| {
        panic!("script failed to execute:\n{script}\nerror: {e}");
    });

    let result = captured.borrow().clone();
    result
}

fn assert_behavior_preserved(source: &str) {
    let minified = minify(source).expect("minification failed");
    let before = run_capture(source);
    let after = run_capture(&minified);
    assert!(
        !before.is_empty(),
        "test script emitted nothing, it proves nothing:\n{source}"
    );
    assert_eq!(
        before, after,
        "behavior diverged\noriginal:\n{source}\nminified:\n{minified}"
    );
}

#[test]
fn corpus_behavior_is_preserved() {
    for source in CORPUS {
        assert_behavior_preserved(source);
    }
}

#[test]
fn shadowing_keeps_the_right_variable() {
    assert_behavior_preserved(
        "local v = \"outer\"\ndo\n    local v = \"inner\"\n    emit(v)\nend\nemit(v)\n",
    );
}

#[test]
fn local_initializer_sees_the_outer_world() {
    assert_behavior_preserved("x = 41\nlocal x = x + 1\nemit(x)\nemit(_G.x)\n");
}

#[test]
fn repeat_condition_sees_body_locals() {
    assert_behavior_preserved(
        "local rounds = 0\nrepeat\n    local done = rounds >= 3\n    rounds = rounds + 1\nuntil done\nemit(rounds)\n",
    );
}

#[test]
fn upvalues_stay_shared_between_closures() {
    assert_behavior_preserved(
        "local function pair()\n    local n = 0\n    local function up() n = n + 1 end\n    local function get() return n end\n    return up, get\nend\nlocal up, get = pair()\nup()\nup()\nemit(get())\n",
    );
}

#[test]
fn goto_labels_still_resolve() {
    assert_behavior_preserved(
        "local hits = 0\nfor i = 1, 5 do\n    if i % 2 == 0 then goto continue end\n    hits = hits + 1\n    ::continue::\nend\nemit(hits)\n",
    );
}

#[test]
fn join_sensitive_expressions_evaluate_identically() {
    assert_behavior_preserved(
        "local x = 10\nlocal y = 3\nemit(x - -y)\nemit(x - - -y)\nemit(1 .. 2)\nemit(2 .. .5)\n",
    );
}

#[test]
fn method_calls_and_fields_survive() {
    assert_behavior_preserved(
        "local Tank = {level = 2}\nfunction Tank:fill(amount)\n    self.level = self.level + amount\n    return self.level\nend\nemit(Tank:fill(5))\nemit(Tank.level)\n",
    );
}

#[test]
fn stormworks_style_tick_loop_is_preserved() {
    let source = "\
ticks = 0
function onTick()
    ticks = ticks + 1
    local throttle = input.getNumber(1)
    local clamped = throttle
    if clamped > 1 then clamped = 1 end
    output.setNumber(1, clamped * ticks)
end
";
    let minified = minify(source).expect("minification failed");
    assert_eq!(drive_tick_harness(source), drive_tick_harness(&minified));
}

/// Loads a script that defines `onTick`, stubs the Stormworks `input` /
/// `output` tables, runs three ticks and returns everything written.
fn drive_tick_harness(script: &str) -> Vec<(i64, f64)> {
    let lua = Lua::new();
    let written: Rc<RefCell<Vec<(i64, f64)>>> = Rc::new(RefCell::new(Vec::new()));

    let input = lua.create_table().expect("input table");
    let get_number = lua
        .create_function(|_, _channel: i64| Ok(0.75_f64))
        .expect("getNumber");
    input.set("getNumber", get_number).expect("set getNumber");

    let output = lua.create_table().expect("output table");
    let sink = written.clone();
    let set_number = lua
        .create_function(move |_, (channel, value): (i64, f64)| {
            sink.borrow_mut().push((channel, value));
            Ok(())
        })
        .expect("setNumber");
    output.set("setNumber", set_number).expect("set setNumber");

    lua.globals().set("input", input).expect("set input");
    lua.globals().set("output", output).expect("set output");

    lua.load(script).exec().expect("script load");
    let on_tick: mlua::Function = lua.globals().get("onTick").expect("onTick defined");
    for _ in 0..3 {
        on_tick.call::<()>(()).expect("tick");
    }

    let result = written.borrow().clone();
    result
}
