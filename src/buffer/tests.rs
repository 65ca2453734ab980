use super::search::BadCharTable;
use super::GapBuffer;
use crate::registers::PasteRegister;

fn new_buf() -> GapBuffer {
    GapBuffer::new(0, 16).unwrap()
}

fn type_str(b: &mut GapBuffer, s: &str) {
    for byte in s.bytes() {
        b.insert_char(byte, 1).unwrap();
    }
}

fn text(b: &GapBuffer) -> Vec<u8> {
    let mut out = b.data[..b.gap_start].to_vec();
    out.extend_from_slice(&b.data[b.gap_end..b.sentinel_index()]);
    out
}

#[test]
fn invariants_hold_after_inserts() {
    let mut b = new_buf();
    type_str(&mut b, "one\ntwo\nthree\n");
    assert!(b.gap_start <= b.gap_end);
    assert!(b.gap_end < b.sentinel_index() + 1);
    assert_eq!(b.data[b.sentinel_index()], super::SENTINEL);
    assert_eq!(b.row, 4);
    assert_eq!(b.col, 0);
}

/// Scenario 1: `hello<Ctrl-a><Ctrl-d><Ctrl-d>lo` on an empty buffer.
/// `start_of_line` leaves "hello" entirely right of the cursor; the two
/// deletes drop "h" and "e", leaving "llo"; inserting "lo" at the start
/// then yields "lollo" with the cursor after the inserted text.
#[test]
fn scenario_insert_delete_reinsert() {
    let mut b = new_buf();
    type_str(&mut b, "hello");
    b.start_of_line();
    b.delete_char(1).unwrap();
    b.delete_char(1).unwrap();
    type_str(&mut b, "lo");
    assert_eq!(text(&b), b"lollo");
    assert_eq!(b.col, 2);
}

/// Scenario 2: two lines down then end-of-line lands on the `\n` after
/// "three".
#[test]
fn scenario_down_lines_then_eol() {
    let mut b = new_buf();
    type_str(&mut b, "one\ntwo\nthree\n");
    b.start_of_buffer();
    b.down_line(1).unwrap();
    b.down_line(1).unwrap();
    b.end_of_line();
    assert_eq!(b.cursor(), 13);
    assert_eq!(b.row, 3);
    assert_eq!(b.col, 5);
}

/// Scenario 3: repeated Quick-Search over "aXbXcXdXe".
#[test]
fn scenario_repeated_search() {
    let mut b = new_buf();
    type_str(&mut b, "aXbXcXdXe");
    b.start_of_buffer();
    let table = BadCharTable::build(b"X");
    b.search(b"X", &table).unwrap();
    assert_eq!(b.cursor(), 1);
    for expected in [3, 5, 7] {
        b.search(b"X", &table).unwrap();
        assert_eq!(b.cursor(), expected);
    }
    assert!(b.search(b"X", &table).is_err());
}

/// Scenario 4: brace matching is its own inverse.
#[test]
fn scenario_match_brace_round_trip() {
    let mut b = new_buf();
    type_str(&mut b, "(a(b)c)");
    b.start_of_buffer();
    b.match_brace().unwrap();
    assert_eq!(b.cursor(), 6);
    b.match_brace().unwrap();
    assert_eq!(b.cursor(), 0);
}

/// Scenario 5: mark, copy, paste with a multiplier.
#[test]
fn scenario_mark_copy_paste_multiplier() {
    let mut b = new_buf();
    type_str(&mut b, "foo bar\n");
    b.start_of_buffer();
    b.set_mark();
    b.move_right(7).unwrap();
    let mut reg = PasteRegister::default();
    b.copy_region(&mut reg, false).unwrap();
    b.end_of_buffer();
    b.paste(&reg, 3).unwrap();
    assert_eq!(text(&b), b"foo bar\nfoo barfoo barfoo bar");
}

#[test]
fn move_left_right_is_identity() {
    let mut b = new_buf();
    type_str(&mut b, "abcdef");
    let before = b.cursor();
    b.move_left(4).unwrap();
    b.move_right(4).unwrap();
    assert_eq!(b.cursor(), before);
}

#[test]
fn insert_then_backspace_restores_text() {
    let mut b = new_buf();
    type_str(&mut b, "hello");
    let before = text(&b);
    let (row, col) = (b.row, b.col);
    b.insert_char(b'!', 3).unwrap();
    b.backspace(3).unwrap();
    assert_eq!(text(&b), before);
    assert_eq!((b.row, b.col), (row, col));
}

#[test]
fn move_left_past_start_fails_without_mutation() {
    let mut b = new_buf();
    type_str(&mut b, "abc");
    let g = b.cursor();
    b.move_left(g).unwrap();
    assert_eq!(b.cursor(), 0);
    assert!(b.move_left(1).is_err());
    assert_eq!(b.cursor(), 0);
}

#[test]
fn match_brace_on_sentinel_is_noop_success() {
    let mut b = new_buf();
    type_str(&mut b, "abc");
    b.end_of_buffer();
    assert!(b.match_brace().is_ok());
    assert_eq!(b.cursor(), 3);
}

#[test]
fn trim_clean_on_empty_buffer_is_noop() {
    let mut b = new_buf();
    b.trim_clean();
    assert_eq!(text(&b), b"");
    assert!(!b.modified);
}

#[test]
fn trim_clean_strips_trailing_whitespace_and_keeps_one_newline() {
    let mut b = new_buf();
    type_str(&mut b, "line one  \nline two\t\t\n\n\n");
    b.trim_clean();
    assert_eq!(text(&b), b"line one\nline two\n");
}

#[test]
fn search_longer_than_remaining_text_fails() {
    let mut b = new_buf();
    type_str(&mut b, "short");
    b.start_of_buffer();
    let table = BadCharTable::build(b"muchlongerneedle");
    assert!(b.search(b"muchlongerneedle", &table).is_err());
}

#[test]
fn write_then_read_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.txt");
    let mut b = new_buf();
    type_str(&mut b, "line one\nline two\n");
    b.write_buffer(&path, false).unwrap();

    let mut reread = new_buf();
    reread.insert_file(&path).unwrap();
    assert_eq!(text(&reread), text(&b));
}

#[test]
fn save_with_backup_preserves_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("target.txt");
    std::fs::write(&path, b"old content").unwrap();

    let mut b = new_buf();
    type_str(&mut b, "new content");
    b.filename = Some(path.clone());
    b.write_buffer(&path, true).unwrap();

    let backup = std::fs::read(format!("{}~", path.display())).unwrap();
    assert_eq!(backup, b"old content");
    let target = std::fs::read(&path).unwrap();
    assert_eq!(target, b"new content");
    assert!(!b.modified);
}

#[test]
fn replace_in_region_substitutes_every_match_or_none() {
    let mut b = new_buf();
    type_str(&mut b, "cat cat cat");
    b.start_of_buffer();
    b.set_mark();
    b.end_of_buffer();
    b.replace_in_region(b"/cat/dog").unwrap();
    assert_eq!(text(&b), b"dog dog dog");
}

#[test]
fn replace_in_region_fails_without_mark() {
    let mut b = new_buf();
    type_str(&mut b, "cat cat cat");
    assert!(b.replace_in_region(b"/cat/dog").is_err());
}
