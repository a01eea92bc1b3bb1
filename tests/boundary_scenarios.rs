// SPDX-License-Identifier: MIT OR Apache-2.0
//! The boundary scenarios and invariants from the interpreter's own testable-
//! properties section, run end to end through [`feather::Interpreter`] (which
//! is itself `feather_stub::StubHost` plus the full built-in catalog).

use feather::Interpreter;

fn eval(script: &str) -> String {
    let mut interp = Interpreter::new();
    interp.eval(script).unwrap_or_else(|e| panic!("script {script:?} failed: {e}"))
}

#[test]
fn s1_incr_accumulates() {
    assert_eq!(eval("set x 3; incr x 4; set x"), "7");
}

#[test]
fn s2_proc_with_default_parameter() {
    assert_eq!(eval("proc f {a {b 2}} {expr {$a+$b}}; f 5"), "7");
}

#[test]
fn s3_variadic_args_parameter_collects_the_rest() {
    assert_eq!(eval("proc f args {llength $args}; f a b c d"), "4");
}

#[test]
fn s4_lindex_returns_a_nested_list_element_as_is() {
    assert_eq!(eval("set L {1 {2 3} 4}; lindex $L 1"), "2 3");
}

#[test]
fn s5_catch_captures_the_message_and_marks_it_read() {
    assert_eq!(eval("catch {error oops} r; list $r [info exists r]"), "oops 1");
}

#[test]
fn s6_namespace_eval_seeds_a_qualified_variable() {
    assert_eq!(eval("namespace eval x {variable v 10}; set ::x::v"), "10");
}

#[test]
fn s7_string_match_uses_glob_semantics() {
    assert_eq!(eval("string match {a*c} abbc"), "1");
}

#[test]
fn s8_format_pads_and_substitutes() {
    assert_eq!(eval(r#"format "%05d-%s" 42 hi"#), "00042-hi");
}

#[test]
fn s9_for_loop_builds_a_list_across_iterations() {
    assert_eq!(eval("for {set i 0} {$i<3} {incr i} {lappend r $i}; set r"), "0 1 2");
}

#[test]
fn s10_command_substitution_runs_before_the_enclosing_word_is_built() {
    assert_eq!(eval(r#"set result "a [set b 1] c""#), "a 1 c");
}

#[test]
fn invariant_incr_auto_creates_then_increments() {
    assert_eq!(eval("incr x; incr x"), "2");
}

#[test]
fn invariant_upvar_writes_through_to_the_caller() {
    assert_eq!(
        eval("proc setter {} {upvar 1 a b; set b 7}; set a 0; setter; set a"),
        "7"
    );
}

#[test]
fn invariant_catch_returns_one_on_error_and_zero_on_success() {
    assert_eq!(eval("catch {error boom}"), "1");
    assert_eq!(eval("catch {set x 1}"), "0");
}

#[test]
fn invariant_list_round_trips_through_join_and_split() {
    assert_eq!(eval("join [split [join {a b c} X] X] X"), eval("join {a b c} X"));
}

#[test]
fn break_outside_a_loop_becomes_an_error() {
    let mut interp = Interpreter::new();
    let err = interp.eval("break").unwrap_err();
    assert_eq!(err.to_string(), "invoked \"break\" outside of a loop");
}

#[test]
fn tailcall_replaces_the_current_procedure_frame() {
    assert_eq!(
        eval("proc inner {} {return done}; proc outer {} {tailcall inner}; outer"),
        "done"
    );
}
