//! Offset translation against files mutated multiple times in one attempt.

use modbay::fs::PatchWriter;

const BASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz1234567890";

fn base_file(td: &tempfile::TempDir) -> std::path::PathBuf {
    let p = td.path().join("data.bin");
    std::fs::write(&p, BASE).unwrap();
    p
}

#[test]
fn insert_splices_and_grows() {
    let td = tempfile::tempdir().unwrap();
    let p = td.path().join("data.bin");
    // 37 bytes.
    std::fs::write(&p, b"abcdefghijklmnopqrstuvwxyz1234567890\n").unwrap();

    let mut w = PatchWriter::new();
    let rec = w.write(&p, b"Test", 5, true).unwrap();
    assert_eq!(rec.offset, 5);
    assert_eq!(rec.bytes_written, 4);
    assert_eq!(rec.bytes_added, 4);

    let out = std::fs::read(&p).unwrap();
    assert_eq!(out.len(), 41);
    assert_eq!(&out, b"abcdeTestfghijklmnopqrstuvwxyz1234567890\n");
}

#[test]
fn same_offset_inserts_land_in_order() {
    let td = tempfile::tempdir().unwrap();
    let p = base_file(&td);

    let mut w = PatchWriter::new();
    w.write(&p, b"AAAA", 12, true).unwrap();
    // Second insert at the same original offset translates past the first.
    assert_eq!(w.translate(&p, 12), 16);
    w.write(&p, b"BBBB", 12, true).unwrap();

    let out = std::fs::read(&p).unwrap();
    assert_eq!(&out, b"abcdefghijklAAAABBBBmnopqrstuvwxyz1234567890");
}

#[test]
fn overwrite_keeps_length() {
    let td = tempfile::tempdir().unwrap();
    let p = base_file(&td);

    let mut w = PatchWriter::new();
    let rec = w.write(&p, b"Test", 5, false).unwrap();
    assert_eq!(rec.bytes_added, 0);

    let out = std::fs::read(&p).unwrap();
    assert_eq!(out.len(), BASE.len());
    assert_eq!(&out, b"abcdeTestjklmnopqrstuvwxyz1234567890");
}

#[test]
fn later_offsets_translate_over_earlier_insert() {
    let td = tempfile::tempdir().unwrap();
    let p = base_file(&td);

    let mut w = PatchWriter::new();
    w.write(&p, b"Test", 5, true).unwrap();
    assert_eq!(w.translate(&p, 10), 14);
    w.write(&p, b"XXXX", 10, false).unwrap();

    let out = std::fs::read(&p).unwrap();
    assert_eq!(&out, b"abcdeTestfghijXXXXopqrstuvwxyz1234567890");
}

#[test]
fn offsets_before_an_insert_are_unaffected() {
    let td = tempfile::tempdir().unwrap();
    let p = base_file(&td);

    let mut w = PatchWriter::new();
    w.write(&p, b"Test", 20, true).unwrap();
    assert_eq!(w.translate(&p, 5), 5);
    w.write(&p, b"XX", 5, false).unwrap();

    let out = std::fs::read(&p).unwrap();
    assert_eq!(&out, b"abcdeXXhijklmnopqrstTestuvwxyz1234567890");
}

#[test]
fn range_replace_shrinks_and_shifts_later_offsets() {
    let td = tempfile::tempdir().unwrap();
    let p = base_file(&td);

    let mut w = PatchWriter::new();
    let rec = w.write_range(&p, b"XY", 5, 9).unwrap();
    assert_eq!(rec.bytes_added, -2);

    let out = std::fs::read(&p).unwrap();
    assert_eq!(out.len(), BASE.len() - 2);
    assert_eq!(&out, b"abcdeXYjklmnopqrstuvwxyz1234567890");
    assert_eq!(w.translate(&p, 20), 18);
}

#[test]
fn range_replace_grows() {
    let td = tempfile::tempdir().unwrap();
    let p = base_file(&td);

    let mut w = PatchWriter::new();
    let rec = w.write_range(&p, b"LONGER", 5, 9).unwrap();
    assert_eq!(rec.bytes_added, 2);

    let out = std::fs::read(&p).unwrap();
    assert_eq!(out.len(), BASE.len() + 2);
    assert_eq!(&out, b"abcdeLONGERjklmnopqrstuvwxyz1234567890");
}

#[test]
fn range_replace_with_equal_length_is_net_zero() {
    let td = tempfile::tempdir().unwrap();
    let p = base_file(&td);

    let mut w = PatchWriter::new();
    let rec = w.write_range(&p, b"WXYZ", 5, 9).unwrap();
    assert_eq!(rec.bytes_added, 0);

    let out = std::fs::read(&p).unwrap();
    assert_eq!(&out, b"abcdeWXYZjklmnopqrstuvwxyz1234567890");
    assert_eq!(w.translate(&p, 20), 20);
}

#[test]
fn insert_after_an_overwrite_is_untranslated() {
    let td = tempfile::tempdir().unwrap();
    let p = base_file(&td);

    let mut w = PatchWriter::new();
    w.write(&p, b"Test", 5, false).unwrap();
    assert_eq!(w.translate(&p, 7), 7);
    w.write(&p, b"YY", 7, true).unwrap();

    let out = std::fs::read(&p).unwrap();
    assert_eq!(&out, b"abcdeTeYYstjklmnopqrstuvwxyz1234567890");
}

#[test]
fn non_overlapping_range_pairs_both_land() {
    let td = tempfile::tempdir().unwrap();
    let p = base_file(&td);

    let mut w = PatchWriter::new();
    w.write_range(&p, b"AAAA", 5, 9).unwrap();
    w.write_range(&p, b"BBBB", 20, 24).unwrap();

    let out = std::fs::read(&p).unwrap();
    assert_eq!(&out, b"abcdeAAAAjklmnopqrstBBBByz1234567890");
}

#[test]
fn out_of_bounds_writes_error_without_touching_the_file() {
    let td = tempfile::tempdir().unwrap();
    let p = base_file(&td);

    let mut w = PatchWriter::new();
    assert!(w.write(&p, b"Test", 100, true).is_err());
    assert!(w.write(&p, b"Test", 35, false).is_err());
    assert_eq!(std::fs::read(&p).unwrap(), BASE);
}
