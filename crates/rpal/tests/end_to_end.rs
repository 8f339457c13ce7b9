//! Drives the full lex→parse→standardize→compile→evaluate pipeline and
//! asserts on captured stdout.

use rpal::run_source;

// ─── End-to-end scenarios ────────────────────────────────────────────────

#[test]
fn scenario_arithmetic() {
    assert_eq!(run_source("let x = 3 + 4 * 2 in Print x").unwrap(), "11\n");
}

#[test]
fn scenario_recursion_via_rec() {
    let src = "let rec f n = n eq 0 -> 1 | n * f (n-1) in Print (f 5)";
    assert_eq!(run_source(src).unwrap(), "120\n");
}

#[test]
fn scenario_tuple_and_indexing() {
    assert_eq!(run_source("let t = (10, 20, 30) in Print (t 2)").unwrap(), "20\n");
}

#[test]
fn scenario_higher_order() {
    let src = "let twice f x = f (f x) in Print (twice (fn x. x+1) 5)";
    assert_eq!(run_source(src).unwrap(), "7\n");
}

#[test]
fn scenario_conditional() {
    assert_eq!(run_source("Print ((5 gr 3) -> 'yes' | 'no')").unwrap(), "yes\n");
}

#[test]
fn scenario_simultaneous_definitions() {
    assert_eq!(run_source("let a = 1 and b = 2 in Print (a + b)").unwrap(), "3\n");
}

// ─── Laws ────────────────────────────────────────────────────────────────

#[test]
fn law_aug_extends_tuple_by_one_element() {
    let without = run_source("Print (1, 2)").unwrap();
    let with = run_source("Print ((1, 2) aug 3)").unwrap();
    assert_eq!(without, "(1, 2)\n");
    assert_eq!(with, "(1, 2, 3)\n");
}

#[test]
fn law_order_isempty_istuple_on_nil() {
    assert_eq!(run_source("Print (Order nil)").unwrap(), "0\n");
    assert_eq!(run_source("Print (Isempty nil)").unwrap(), "true\n");
    assert_eq!(run_source("Print (Istuple (1, 2))").unwrap(), "true\n");
}

#[test]
fn law_stem_stern_reconstruct_the_string() {
    let src = "let s = 'hello world' in Print (Conc (Stem s) (Stern s))";
    assert_eq!(run_source(src).unwrap(), "hello world\n");
}

#[test]
fn law_eq_compares_printed_value() {
    // The source literal `true` lexes straight to the integer 1, so getting
    // an actual Bool to compare against an Int means producing one via a
    // comparison: `1` renders "1" and `1 gr 0` renders "true", and `eq`
    // compares those rendered strings directly.
    assert_eq!(run_source("Print (1 eq (1 gr 0))").unwrap(), "false\n");
}

// ─── Error surfaces ──────────────────────────────────────────────────────

#[test]
fn unbound_identifier_is_fatal() {
    assert!(run_source("Print nosuchname").is_err());
}

#[test]
fn division_by_zero_is_fatal() {
    assert!(run_source("Print (1 / 0)").is_err());
}

#[test]
fn tuple_index_out_of_range_is_fatal() {
    assert!(run_source("Print ((1, 2) 5)").is_err());
}

#[test]
fn nested_tuples_render_recursively() {
    let src = "Print (1, (2, 3), 4)";
    assert_eq!(run_source(src).unwrap(), "(1, (2, 3), 4)\n");
}

#[test]
fn within_chains_a_definition_into_another() {
    let src = "let x1 = 1 within x2 = x1 + 1 in Print x2";
    assert_eq!(run_source(src).unwrap(), "2\n");
}

#[test]
fn tuple_destructuring_lambda_binds_each_element() {
    let src = "let f = fn (x, y). x + y in Print (f (3, 4))";
    assert_eq!(run_source(src).unwrap(), "7\n");
}

#[test]
fn where_clause_is_equivalent_to_let() {
    let src = "Print (x + 1) where x = 10";
    assert_eq!(run_source(src).unwrap(), "11\n");
}
