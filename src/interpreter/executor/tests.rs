//! Program-level interpreter tests.

use pretty_assertions::assert_eq;

use crate::interpreter::executor::{Interpreter, Options, ProgramResult};
use crate::interpreter::value::Value;

fn run(source: &str) -> ProgramResult {
    let mut interp = Interpreter::new();
    interp.run(source, "<test>").unwrap()
}

/// Literal form of the last top-level value.
fn eval(source: &str) -> String {
    run(source).last().map(|v| v.repr()).unwrap_or_default()
}

fn error(source: &str) -> String {
    let mut interp = Interpreter::new();
    interp.run(source, "<test>").unwrap_err().to_string()
}

fn output(source: &str) -> Vec<String> {
    let mut interp = Interpreter::new();
    let buffer = interp.capture_output();
    interp.run(source, "<test>").unwrap();
    let lines = buffer.borrow().clone();
    lines
}

// ===== Operators over containers =====

#[test]
fn test_list_concatenation_preserves_order() {
    assert_eq!(eval("[1, 2] + [3, 4]"), "[1, 2, 3, 4]");
    assert_eq!(eval("len([1, 2] + [3])"), "3");
    assert_eq!(eval("[1] + 2"), "[1, 2]");
}

#[test]
fn test_dict_union_takes_right_values() {
    assert_eq!(
        eval(r#"{"a": 1, "b": 2} + {"b": 3, "c": 4}"#),
        r#"{"a": 1, "b": 3, "c": 4}"#
    );
}

#[test]
fn test_none_equality() {
    assert_eq!(eval("none == 0"), "true");
    assert_eq!(eval("0 == none"), "true");
    assert_eq!(eval(r#"none == "str""#), "false");
    assert_eq!(eval("none == none"), "true");
}

#[test]
fn test_truthiness_in_conditions() {
    assert_eq!(
        eval(r#"[not 0, not "", not [], not {}, not none, not 1, not "a", not [0]]"#),
        "[true, true, true, true, true, false, false, false]"
    );
}

#[test]
fn test_logical_operators_yield_operands() {
    assert_eq!(eval(r#"0 or "x""#), r#""x""#);
    assert_eq!(eval("1 and 0"), "0");
    assert_eq!(eval("none && missing"), "none");
    assert_eq!(eval("1 || missing"), "1");
}

// ===== Variables =====

#[test]
fn test_lists_alias_on_assignment() {
    assert_eq!(eval("var a = [1]\nvar b = a\nb.append(2)\na"), "[1, 2]");
}

#[test]
fn test_copy_is_shallow_and_deep_copy_recurses() {
    let source = "\
var a = [[1], 2]
var b = copy(a)
var c = deep_copy(a)
b.append(3)
a[0].append(9)
[a, b, c]";
    assert_eq!(eval(source), "[[[1, 9], 2], [[1, 9], 2, 3], [[1], 2]]");
}

#[test]
fn test_constants_cannot_be_reassigned() {
    assert!(error("const X = 1\nX = 2").contains("Cannot reassign constant 'X'"));
}

#[test]
fn test_compound_assignment_needs_a_binding() {
    assert_eq!(eval("var n = 2\nn **= 3\nn"), "8");
    assert!(error("m += 1").contains("Undefined identifier 'm'"));
}

#[test]
fn test_delete() {
    assert_eq!(eval("var xs = [1, 2, 3, 4]\ndel xs[1]\nxs"), "[1, 3, 4]");
    assert_eq!(eval("var xs = [1, 2, 3, 4]\ndel xs[0:2]\nxs"), "[3, 4]");
    assert_eq!(eval("var d = {\"a\": 1, \"b\": 2}\ndel d[\"a\"]\nd"), r#"{"b": 2}"#);
    assert!(error("var x = 1\ndel x\nx").contains("Undefined identifier 'x'"));
    assert!(error("del nothing").contains("Undefined identifier 'nothing'"));
    assert!(error("var xs = [1]\ndel xs[3]").contains("Index out of bounds"));
}

#[test]
fn test_indexing_and_slicing() {
    assert_eq!(eval("[1, 2, 3][-1]"), "3");
    assert_eq!(eval(r#""hello"[1:3]"#), r#""el""#);
    assert_eq!(eval("[1, 2, 3][-2:]"), "[2, 3]");
    assert_eq!(eval("var xs = [1]\nxs[3] = 4\nxs"), "[1, none, none, 4]");
    assert_eq!(eval("var d = {}\nd[\"k\"] = 1\nd[\"k\"] += 1\nd"), r#"{"k": 2}"#);
    assert!(error("[1][5]").contains("Index out of bounds: 5 (length 1)"));
}

#[test]
fn test_oversized_results_are_runtime_errors() {
    assert!(error("[1, 2] * 10 ** 300").contains("Result of '*' is too large"));
    assert!(error("\"ab\" * 10 ** 300").contains("Result of '*' is too large"));
    assert!(error("var l = [1]\nl[10 ** 300] = 2").contains("is too large"));
}

// ===== Control flow =====

#[test]
fn test_for_accumulates_iteration_values() {
    assert_eq!(eval("for i to 10: i"), "[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]");
    assert_eq!(eval("for i = 1 to 10 step 2: i"), "[1, 3, 5, 7, 9]");
    assert_eq!(eval("for i = 3 to 0: i"), "[3, 2, 1]");
    assert!(error("for i = 0 to 3 step 0: i").contains("step cannot be zero"));
}

#[test]
fn test_break_and_continue() {
    assert_eq!(eval("for i to 6: if i % 2 == 0: continue else: i"), "[1, 3, 5]");
    assert_eq!(eval("for i to 100: if i == 3: break else: i"), "[0, 1, 2]");
    assert!(error("break").contains("'break' outside of a loop"));
}

#[test]
fn test_loop_control_does_not_cross_function_boundaries() {
    assert!(error("fun f() { break }\nfor i to 3: f()").contains("'break' outside of a loop"));
    assert!(error("fun g() { continue }\nwhile true: g()")
        .contains("'continue' outside of a loop"));
}

#[test]
fn test_while_and_foreach() {
    assert_eq!(eval("var i = 0\nwhile i < 3: i += 1"), "[1, 2, 3]");
    assert_eq!(
        eval(r#"foreach k, v in {"a": 1, "b": 2}: k + str(v)"#),
        r#"["a1", "b2"]"#
    );
    assert_eq!(eval(r#"foreach c in "ab": c.upper()"#), r#"["A", "B"]"#);
    assert_eq!(eval("foreach i, v in [10, 20]: i + v"), "[10, 21]");
}

#[test]
fn test_switch_matches_any_case_value() {
    let source = "\
var v = 3
switch v {
    case 4, 3: \"4 or 3\"
    default: \"default\"
}";
    assert_eq!(eval(source), r#""4 or 3""#);
    assert_eq!(eval(&source.replace("var v = 3", "var v = 9")), r#""default""#);
}

#[test]
fn test_optional_chaining_short_circuits() {
    assert_eq!(eval("none?.()?.()"), "none");
    assert_eq!(eval("var d = none\nd?.name.length"), "none");
    assert_eq!(eval("var xs = none\nxs?.[0]"), "none");
    assert!(error("none.name").contains("has no member 'name'"));
}

// ===== Functions =====

#[test]
fn test_rest_and_default_parameters() {
    let source = "\
fun f(a, b = a * 2, ...rest) -> [a, b, rest]
[f(1), f(1, 5), f(1, 5, 6, 7)]";
    assert_eq!(eval(source), "[[1, 2, []], [1, 5, []], [1, 5, [6, 7]]]");
    assert_eq!(eval("fun g(x?) -> x\ng()"), "none");
    assert_eq!(eval("fun h(a, b = 2) -> arguments\nh(1)"), "[1]");
}

#[test]
fn test_argument_count_is_checked() {
    assert!(error("fun f(a) -> a\nf(1, 2)")
        .contains("Too many arguments for 'f': expected at most 1, got 2"));
    assert!(error("fun f(a) -> a\nf()").contains("Too few arguments for 'f': missing 'a'"));
}

#[test]
fn test_rest_parameter_must_be_single_and_last() {
    assert!(error("fun f(...a, b) -> a\nf(1, 2)").contains("may only have one rest parameter"));
    assert!(error("fun f(...a, ...b) -> a\nf(1)").contains("may only have one rest parameter"));
}

#[test]
fn test_declared_types_are_enforced() {
    let err = error("fun f(n: number) -> n\nf(\"x\")");
    assert!(err.starts_with("TypeError"));
    assert!(err.contains("Expected number for 'n', found string"));
    assert!(error("var x: string = 1").contains("Expected string for 'x'"));
    assert!(error("var y: string = \"a\"\ny = 2").contains("Expected string for 'y'"));
    assert_eq!(eval("fun f(n?: number) -> n\nf(none)"), "none");
    assert!(error("fun f(x?: dynamic) -> x\nf()").contains("cannot default to none"));
}

#[test]
fn test_type_checks_can_be_disabled() {
    let mut interp = Interpreter::with_options(Options {
        type_checks: false,
        ..Options::default()
    });
    let result = interp.run("var x: string = 1\nx", "<test>").unwrap();
    assert_eq!(result.last().and_then(Value::as_number), Some(1.0));
}

#[test]
fn test_closures_keep_their_context() {
    let source = "\
fun make_counter() {
    var count = 0
    return fun () {
        count += 1
        return count
    }
}
var c = make_counter()
c()
c()";
    assert_eq!(eval(source), "2");
}

#[test]
fn test_auto_return_if_without_match_is_none() {
    let source = "\
fun sign(n) -> if n > 0: \"pos\" elif n < 0: \"neg\"
[sign(1), sign(-1), sign(0)]";
    assert_eq!(eval(source), r#"["pos", "neg", none]"#);
}

#[test]
fn test_call_contexts_are_released() {
    let mut interp = Interpreter::new();
    interp.run("fun f(x) -> x + 1\nf(1)", "<test>").unwrap();
    let live = interp.env.live_contexts();
    interp.run("f(2)\nf(3)\nlen([1])", "<test>").unwrap();
    assert_eq!(interp.env.live_contexts(), live);
}

#[test]
fn test_call_depth_is_bounded() {
    let mut interp = Interpreter::with_options(Options {
        max_call_depth: 20,
        ..Options::default()
    });
    let err = interp
        .run("fun f(n) -> f(n + 1)\nf(0)", "<test>")
        .unwrap_err();
    assert!(err.to_string().contains("Maximum call depth of 20 exceeded"));
}

#[test]
fn test_error_trace_lists_contexts() {
    let source = "\
fun inner() {
    return 1 / 0
}
fun outer() -> inner()
outer()";
    let mut interp = Interpreter::new();
    let err = interp.run(source, "main.lm").unwrap_err();
    let frames: Vec<(String, usize)> = err
        .trace
        .iter()
        .map(|frame| (frame.context.clone(), frame.line))
        .collect();
    assert_eq!(
        frames,
        vec![
            ("<program>".to_string(), 5),
            ("outer".to_string(), 4),
            ("inner".to_string(), 2),
        ]
    );
    assert!(err.trace.iter().all(|frame| frame.file == "main.lm"));
    assert!(err.to_string().contains("Division by zero"));
}

// ===== Classes =====

#[test]
fn test_instances_own_their_fields() {
    let source = "\
class Test {
    property value = none
}
var t = new Test()
t.value = 5
var t2 = new Test()
[t.value, t2.value]";
    assert_eq!(eval(source), "[5, none]");
}

#[test]
fn test_init_and_inherited_init() {
    let source = "\
class Point {
    property x: number = 0
    property y: number = 0
    fun __init(x, y) {
        self.x = x
        self.y = y
    }
}
class Point3 extends Point {
    property z = 7
}
var p = new Point3(1, 2)
[p.x, p.y, p.z, type(p)]";
    assert_eq!(eval(source), r#"[1, 2, 7, "Point3"]"#);
    assert!(error("class E {}\nnew E(1)").contains("Too many arguments for 'new E'"));
}

#[test]
fn test_super_runs_parent_body_on_derived_instance() {
    let source = "\
class Base {
    property log = []
    fun setup(x) {
        self.log.append(\"base \" + str(x))
        self.ready = true
    }
}
class Derived extends Base {
    fun setup(x) {
        super(x * 2)
        self.log.append(\"derived\")
    }
}
var d = new Derived()
d.setup(1)
[d.log, d.ready]";
    assert_eq!(eval(source), r#"[["base 2", "derived"], true]"#);
}

#[test]
fn test_super_member_access() {
    let source = "\
class Animal {
    fun speak() -> \"...\"
}
class Dog extends Animal {
    fun speak() -> \"woof\"
    fun both() -> [super.speak(), self.speak()]
}
new Dog().both()";
    assert_eq!(eval(source), r#"["...", "woof"]"#);
}

#[test]
fn test_visibility_is_enforced() {
    let source = "\
class Account {
    private property balance = 10
    fun deposit(n) {
        self.balance += n
        return self.balance
    }
}
var a = new Account()
a.deposit(5)";
    assert_eq!(eval(source), "15");
    let err = error(&format!("{}\na.balance", source));
    assert!(err.contains("Illegal access to private member 'balance' of 'Account'"));

    let protected = "\
class Base {
    protected fun secret() -> 42
}
class Child extends Base {
    fun reveal() -> self.secret()
}";
    assert_eq!(eval(&format!("{}\nnew Child().reveal()", protected)), "42");
    assert!(error(&format!("{}\nnew Child().secret()", protected))
        .contains("Illegal access to protected member 'secret'"));
}

#[test]
fn test_statics_live_on_the_class() {
    let source = "\
class Counter {
    static property count: number = 0
    static fun bump() {
        Counter::count += 1
        return Counter::count
    }
}
class Sub extends Counter {}
Counter::bump()
Counter::bump()";
    assert_eq!(eval(source), "2");
    assert_eq!(eval(&format!("{}\nSub::count", source)), "2");
    assert!(error(&format!("{}\nCounter::count = \"x\"", source))
        .contains("Expected number for 'count', found string"));
}

#[test]
fn test_getters_and_setters() {
    let source = "\
class Temp {
    property celsius = 0
    get fahrenheit() -> self.celsius * 9 / 5 + 32
    set fahrenheit(f) {
        self.celsius = (f - 32) * 5 / 9
    }
}
var t = new Temp()
t.fahrenheit = 212
[t.fahrenheit, t.celsius]";
    assert_eq!(eval(source), "[212, 100]");

    let read_only = "\
class C {
    get name() -> \"c\"
}
var c = new C()
c.name = \"d\"";
    assert!(error(read_only).contains("Property 'name' of 'C' is read-only"));
}

#[test]
fn test_enums_are_ordinals() {
    let source = "enum Color { RED, GREEN, BLUE }\n[Color::RED, Color::BLUE, Color.GREEN]";
    assert_eq!(eval(source), "[0, 2, 1]");
    assert!(error("enum Color { RED }\nColor::PINK").contains("has no member 'PINK'"));
}

// ===== Natives =====

#[test]
fn test_dictionary_keys_shadow_methods() {
    assert_eq!(eval("var d = {\"keys\": 1}\nd.keys"), "1");
}

#[test]
fn test_print_output_is_captured() {
    assert_eq!(output("print(\"a\", 1)\nprint()"), vec!["a 1".to_string(), String::new()]);
}

#[test]
fn test_exit_from_nested_function() {
    let source = "\
fun stop() {
    exit(4)
    print(\"unreachable\")
}
print(\"before\")
stop()
print(\"after\")";
    let mut interp = Interpreter::new();
    let buffer = interp.capture_output();
    let result = interp.run(source, "<test>").unwrap();
    assert_eq!(result.exit_code(), Some(4));
    assert_eq!(buffer.borrow().clone(), vec!["before".to_string()]);
}

#[test]
fn test_type_names() {
    assert_eq!(
        eval(r#"[type(1), type("a"), type([]), type({}), type(none), type(true), type(len)]"#),
        r#"["number", "string", "list", "dict", "none", "bool", "function"]"#
    );
}
