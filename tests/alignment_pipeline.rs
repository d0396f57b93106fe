//! End-to-end tests: SAM/BAM files on disk through the reader and the slider.

use std::fs::File;
use std::io::Write;

use noodles::bam;
use noodles::core::Position;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use samslider::{
    AlignmentReader, AlignmentSource, Disposition, Format, PairMode, ReadMode, Result,
    SlideError, SliderConfig, WindowSlider,
};
use tempfile::NamedTempFile;

fn create_sam_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

const HEADER: &str = "@HD\tVN:1.6\tSO:coordinate\n\
                      @SQ\tSN:chr1\tLN:60\n\
                      @SQ\tSN:chr2\tLN:40\n\
                      @PG\tID:test\n";

fn line(name: &str, flag: u16, rname: &str, pos: u64, mapq: u8) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t8M\t=\t{}\t50\tACGTACGT\tIIIIIIII\tNM:i:0\n",
        name, flag, rname, pos, mapq, pos
    )
}

/// (seqname, start, end, member names)
fn collect(path: &std::path::Path, config: SliderConfig) -> Vec<(String, u64, u64, Vec<String>)> {
    WindowSlider::open(path, config)
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap()
        .into_iter()
        .map(|(w, members)| {
            (
                w.seqname,
                w.start,
                w.end,
                members.into_iter().map(|r| r.name).collect(),
            )
        })
        .collect()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_sam_overlapping_windows_across_references() {
    // POS is 1-based: a=4, b=11, c=24 on chr1; d=1 on chr2 (0-based)
    let body = [
        line("a", 0, "chr1", 5, 60),
        line("b", 0, "chr1", 12, 30),
        line("c", 0, "chr1", 25, 10),
        line("d", 0, "chr2", 2, 0),
    ]
    .concat();
    let file = create_sam_file(&format!("{}{}", HEADER, body));

    let config = SliderConfig::new(20, 10).unwrap();
    let windows = collect(file.path(), config);

    assert_eq!(
        windows,
        vec![
            ("chr1".to_string(), 0, 20, names(&["a", "b"])),
            ("chr1".to_string(), 10, 30, names(&["b", "c"])),
            ("chr1".to_string(), 20, 40, names(&["c"])),
            ("chr2".to_string(), 0, 20, names(&["d"])),
        ]
    );
}

#[test]
fn test_sam_payload_preserved() {
    let file = create_sam_file(&format!("{}{}", HEADER, line("a", 0, "chr1", 5, 42)));
    let config = SliderConfig::new(10, 10).unwrap();
    let mut slider = WindowSlider::open(file.path(), config).unwrap();

    let (window, members) = slider.next().unwrap().unwrap();
    assert_eq!(window.to_string(), "chr1\t0\t10");
    let record = &members[0];
    assert_eq!(record.mapq, 42);
    assert_eq!(record.record.cigar().as_ref().len(), 1);
    assert_eq!(record.record.mate_reference_sequence_id(), Some(0));
    assert_eq!(record.record.mate_alignment_start(), Position::new(5));
    assert_eq!(record.record.template_length(), 50);
    assert_eq!(record.record.sequence().as_ref(), b"ACGTACGT");
    assert_eq!(record.record.data().len(), 1);
}

#[test]
fn test_sam_proper_pairs_collapsed() {
    let body = [
        line("p", 0x1 | 0x2 | 0x40, "chr1", 3, 60),
        line("q", 0, "chr1", 6, 60),
        line("p", 0x1 | 0x2 | 0x80, "chr1", 9, 60),
    ]
    .concat();
    let file = create_sam_file(&format!("{}{}", HEADER, body));

    let config = SliderConfig::new(10, 10)
        .unwrap()
        .with_pairing(PairMode::CollapseProperPairs);
    let mut slider = WindowSlider::open(file.path(), config).unwrap();
    let windows: Vec<_> = slider.by_ref().collect::<Result<_>>().unwrap();

    assert_eq!(windows.len(), 1);
    let members: Vec<&str> = windows[0].1.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(members, vec!["p", "q"]);
    assert_eq!(slider.stats().count(Disposition::MateRepresented), 1);
}

#[test]
fn test_sam_unsorted_positions() {
    let body = [line("a", 0, "chr1", 30, 60), line("b", 0, "chr1", 3, 60)].concat();
    let file = create_sam_file(&format!("{}{}", HEADER, body));

    let config = SliderConfig::new(10, 10).unwrap();
    let results: Vec<_> = WindowSlider::open(file.path(), config).unwrap().collect();

    // windows before position 29 are emitted, then the violation
    let err = results
        .into_iter()
        .find_map(|r| r.err())
        .expect("expected an ordering violation");
    assert!(matches!(err, SlideError::OrderingViolation(_)));
}

#[test]
fn test_sam_undeclared_reference() {
    let file = create_sam_file(&format!("{}{}", HEADER, line("a", 0, "chrX", 5, 60)));
    let config = SliderConfig::new(10, 10).unwrap();
    let mut slider = WindowSlider::open(file.path(), config).unwrap();

    assert!(matches!(
        slider.next(),
        Some(Err(SlideError::InvalidRecord { record: 1, .. }))
    ));
    assert!(slider.next().is_none());
}

/// Re-encode a SAM file as BAM with the same header and records.
fn sam_to_bam(sam: &std::path::Path) -> NamedTempFile {
    let mut reader = AlignmentReader::open(sam, ReadMode::Sam).unwrap();
    let header = reader.references().to_header().unwrap();
    let records: Vec<_> = reader.by_ref().collect::<Result<_>>().unwrap();

    let bam_file = NamedTempFile::new().unwrap();
    let mut writer = bam::io::Writer::new(File::create(bam_file.path()).unwrap());
    writer.write_header(&header).unwrap();
    for record in &records {
        writer.write_alignment_record(&header, &record.record).unwrap();
    }
    AlignmentWrite::finish(&mut writer, &header).unwrap();
    bam_file
}

#[test]
fn test_bam_and_sam_give_same_windows() {
    let body = [
        line("a", 0, "chr1", 5, 60),
        line("b", 4, "*", 0, 0),
        line("c", 0, "chr2", 30, 10),
    ]
    .concat();
    let sam = create_sam_file(&format!("{}{}", HEADER, body));
    let bam = sam_to_bam(sam.path());

    let from_sam = collect(sam.path(), SliderConfig::new(15, 5).unwrap());
    let from_bam = collect(bam.path(), SliderConfig::new(15, 5).unwrap());
    assert_eq!(from_sam, from_bam);
    assert!(!from_sam.is_empty());

    let forced = collect(
        bam.path(),
        SliderConfig::new(15, 5).unwrap().with_mode(ReadMode::Bam),
    );
    assert_eq!(forced, from_sam);
}

#[test]
fn test_bam_magic_rejected_in_sam_mode() {
    let sam = create_sam_file(&format!("{}{}", HEADER, line("a", 0, "chr1", 5, 60)));
    let bam = sam_to_bam(sam.path());

    let reader = AlignmentReader::open(bam.path(), ReadMode::Auto).unwrap();
    assert_eq!(reader.format(), Format::Bam);

    let config = SliderConfig::new(10, 10).unwrap().with_mode(ReadMode::Sam);
    let result: Result<Vec<_>> = WindowSlider::open(bam.path(), config).and_then(|s| s.collect());
    assert!(result.is_err());
}

#[test]
fn test_reader_references_from_header() {
    let file = create_sam_file(HEADER);
    let reader = AlignmentReader::open(file.path(), ReadMode::Auto).unwrap();
    let refs = reader.references();
    assert_eq!(refs.len(), 2);
    assert_eq!(refs.tid("chr2"), Some(1));
    assert_eq!(refs.length(1), Some(40));
}
