use alloc::{borrow::Cow, string::String, vec::Vec};

use rstest::rstest;

use super::util::{pre, run};

#[test]
fn empty_script_yields_nothing() {
    assert!(run("").is_empty());
}

#[test]
fn script_without_separator_is_one_batch() {
    assert_eq!(run("SELECT 1;\nSELECT 2;\n"), ["SELECT 1;\nSELECT 2;\n"]);
}

#[test]
fn crlf_three_batches() {
    assert_eq!(
        run("BATCH A\r\nGO\r\nBATCH B\r\nGO\r\nBATCH C\r\n"),
        ["BATCH A\r\n", "BATCH B\r\n", "BATCH C\r\n"]
    );
}

#[test]
fn lf_batches() {
    assert_eq!(run("a\nGO\nb"), ["a\n", "b"]);
}

#[rstest]
#[case("a\ngo\nb")]
#[case("a\nGo\nb")]
#[case("a\n  GO  \nb")]
#[case("a\n\tgO\nb")]
fn separator_case_and_padding(#[case] script: &str) {
    assert_eq!(run(script), ["a\n", "b"]);
}

#[rstest]
#[case("a\nGO 5\nb")]
#[case("a\nGOTO x\nb")]
#[case("a\nx GO\nb")]
#[case("a GO b\n")]
fn lines_that_are_not_separators(#[case] script: &str) {
    let batches = run(script);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], script);
}

#[test]
fn go_inside_line_comment_does_not_split() {
    let script = "A\r\n--GO\r\nB\r\n";
    assert_eq!(run(script), [script]);
}

#[test]
fn go_inside_block_comment_does_not_split() {
    let script = "A\n/*\nGO\n*/\nB\n";
    assert_eq!(run(script), [script]);
}

#[test]
fn go_inside_string_does_not_split() {
    let script = "SELECT 'a\nGO\nb';\n";
    assert_eq!(run(script), [script]);
}

#[test]
fn go_inside_quoted_identifier_does_not_split() {
    let script = "SELECT [a\nGO\nb];\n";
    assert_eq!(run(script), [script]);
}

#[test]
fn go_inside_unterminated_block_comment_does_not_split() {
    let script = "A\n/* open\nGO\nB\n";
    assert_eq!(run(script), [script]);
}

#[test]
fn separator_after_comment_line_splits() {
    assert_eq!(run("-- c\nGO\nb\n"), ["-- c\n", "b\n"]);
}

#[rstest]
#[case("GO\na\n", &["a\n"])] // leading separator
#[case("a\nGO\nGO\nb\n", &["a\n", "b\n"])] // adjacent separators
#[case("a\nGO\n", &["a\n"])] // trailing separator
#[case("GO\nGO\n", &[])]
fn empty_batches_are_suppressed(#[case] script: &str, #[case] expected: &[&str]) {
    assert_eq!(run(script), expected);
}

#[test]
fn directive_free_batches_are_borrowed() {
    let mut p = pre();
    let script = "SELECT 'x';\nGO\n-- done\nSELECT 2;\n";
    let batches: Vec<Cow<'_, str>> = p.process(script).collect::<Result<_, _>>().unwrap();
    assert!(batches.iter().all(|b| matches!(b, Cow::Borrowed(_))));
    assert_eq!(batches, ["SELECT 'x';\n", "-- done\nSELECT 2;\n"]);
}

#[test]
fn batches_rejoined_with_separators_reconstruct_input() {
    let script = "a\nGO\nb\ngo\r\nc";
    let batches = run(script);
    assert_eq!(batches, ["a\n", "b\n", "c"]);
    let rejoined: String = ["a\n", "GO\n", "b\n", "go\r\n", "c"].concat();
    assert_eq!(rejoined, script);
}

#[test]
fn errors_fuse_the_iterator_and_keep_earlier_batches() {
    let mut p = pre();
    let mut it = p.process("A\nGO\n$(nope)\n");
    assert_eq!(it.next().unwrap().unwrap(), "A\n");
    assert!(it.next().unwrap().is_err());
    assert!(it.next().is_none());
}

#[test]
fn scan_is_lazy_per_batch() {
    // The failing reference sits in the second batch; the first pull must
    // succeed untouched.
    let mut p = pre();
    let mut it = p.process("fine\nGO\n$(missing)");
    assert_eq!(it.next().unwrap().unwrap(), "fine\n");
}
