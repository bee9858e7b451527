/*!
 * Tests for SRT parsing and size-bounded chunking
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use subtrans::subtitle_processor::{SubtitleDocument, ENTRY_SEPARATOR};

use crate::common::{create_temp_dir, create_test_file, numbered_srt};

const WORDS: [&str; 12] = [
    "the", "river", "train", "♪", "- Who's", "there?", "ça", "va", "日本", "quickly", "night", "Me.",
];

fn random_entry(rng: &mut StdRng, number: usize) -> String {
    let lines = rng.random_range(1..=3);
    let text: Vec<String> = (0..lines)
        .map(|_| {
            let words = rng.random_range(1..=12);
            (0..words)
                .map(|_| WORDS[rng.random_range(0..WORDS.len())])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    format!(
        "{}\n00:{:02}:{:02},{:03} --> 00:{:02}:{:02},{:03}\n{}",
        number,
        number / 60 % 60, number % 60, rng.random_range(0..1000),
        number / 60 % 60, number % 60, 999,
        text.join("\n")
    )
}

fn random_document(rng: &mut StdRng) -> String {
    let count = rng.random_range(1..=120);
    let entries: Vec<String> = (1..=count).map(|i| random_entry(rng, i)).collect();
    // Vary the blank-line run between entries
    let mut content = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            content.push_str(if rng.random_bool(0.2) { "\n\n\n" } else { "\n\n" });
        }
        content.push_str(entry);
    }
    content.push('\n');
    content
}

#[test]
fn test_splitIntoChunks_withRandomDocuments_shouldKeepEveryEntryInOrderWithinBounds() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let content = random_document(&mut rng);
        let document = SubtitleDocument::parse(&content);
        let max_chunk_chars = rng.random_range(20..=2_000);

        let chunks = document.split_into_chunks(max_chunk_chars);

        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|chunk| !chunk.is_empty()));

        let flattened: Vec<_> = chunks.iter().flat_map(|chunk| chunk.entries().iter().cloned()).collect();
        assert_eq!(flattened, document.entries);

        for chunk in &chunks {
            if chunk.len() > 1 {
                assert!(
                    chunk.char_len() <= max_chunk_chars,
                    "chunk of {} entries has {} chars, limit {}",
                    chunk.len(), chunk.char_len(), max_chunk_chars
                );
            }
            assert_eq!(chunk.char_len(), chunk.text().chars().count());
        }

        let rejoined = chunks.iter().map(|chunk| chunk.text()).collect::<Vec<_>>().join(ENTRY_SEPARATOR);
        assert_eq!(rejoined, document.to_string());
    }
}

#[test]
fn test_splitIntoChunks_withOversizedEntry_shouldIsolateIt() {
    let long_text = "word ".repeat(100);
    let content = format!(
        "1\n00:00:01,000 --> 00:00:02,000\nshort\n\n2\n00:00:03,000 --> 00:00:04,000\n{}\n\n3\n00:00:05,000 --> 00:00:06,000\nshort\n",
        long_text.trim()
    );
    let document = SubtitleDocument::parse(&content);

    let chunks = document.split_into_chunks(100);

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1].len(), 1);
    assert!(chunks[1].char_len() > 100);
}

#[test]
fn test_splitIntoChunks_withEmptyDocument_shouldReturnNoChunks() {
    assert!(SubtitleDocument::parse("\n\n  \n").split_into_chunks(100).is_empty());
}

#[test]
fn test_splitIntoChunks_shouldFlushExactlyAtLimit() {
    let content = "1\nA\n\n2\nB\n\n3\nC\n";
    let document = SubtitleDocument::parse(content);
    // Each entry is 3 chars; two entries plus separator are 8
    assert_eq!(document.split_into_chunks(8).iter().map(|c| c.len()).collect::<Vec<_>>(), vec![2, 1]);
    assert_eq!(document.split_into_chunks(7).iter().map(|c| c.len()).collect::<Vec<_>>(), vec![1, 1, 1]);
}

#[test]
fn test_fromFile_shouldParseEntries() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "a.srt", &numbered_srt(5)).unwrap();

    let document = SubtitleDocument::from_file(&path).unwrap();

    assert_eq!(document.len(), 5);
    assert_eq!(document.entries[4].timestamp_line(), Some("00:00:05,000 --> 00:00:05,500"));
}

#[test]
fn test_fromFile_withMissingFile_shouldFail() {
    let dir = create_temp_dir().unwrap();
    assert!(SubtitleDocument::from_file(dir.path().join("none.srt")).is_err());
}
