//! Properties of the checksum constructors.

use std::collections::BTreeMap;
use std::io::{self, Read};

use rstest::rstest;
use serde::Serialize;
use xxhash_rust::xxh3::xxh3_128;

use crate::Checksum;

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

#[test]
fn identical_strings_hash_identically() {
    assert_eq!(Checksum::of_str("hello"), Checksum::of_str("hello"));
    assert_ne!(Checksum::of_str("hello"), Checksum::of_str("world"));
}

#[test]
fn single_byte_change_alters_checksum() {
    assert_ne!(Checksum::of_str("abc"), Checksum::of_str("abd"));
}

#[test]
fn empty_string_hashes_empty_span() {
    assert_eq!(Checksum::of_str(""), Checksum::from_digest(xxh3_128(&[])));
    assert!(!Checksum::of_str("").is_null());
}

#[test]
fn utf16_hashes_little_endian_units() {
    let text = "héllo, wörld";
    let units: Vec<u16> = text.encode_utf16().collect();
    let bytes: Vec<u8> = units.iter().flat_map(|unit| unit.to_le_bytes()).collect();

    assert_eq!(Checksum::of_utf16(&units), Checksum::of_bytes(&bytes));
    assert_ne!(Checksum::of_utf16(&units), Checksum::of_str(text));
}

#[test]
fn utf16_spanning_several_chunks_is_consistent() {
    let units: Vec<u16> = (0..1000_u16).collect();
    let bytes: Vec<u8> = units.iter().flat_map(|unit| unit.to_le_bytes()).collect();
    assert_eq!(Checksum::of_utf16(&units), Checksum::of_bytes(&bytes));
}

// ---------------------------------------------------------------------------
// String sequences
// ---------------------------------------------------------------------------

#[test]
fn sequence_equals_nul_separated_concatenation() {
    assert_eq!(
        Checksum::of_strings(["a", "b"]),
        Checksum::of_bytes(b"a\0b\0")
    );
}

#[rstest]
#[case::reordered(&["b", "a"])]
#[case::merged(&["ab"])]
#[case::comma_joined(&["a,b"])]
#[case::trailing_empty(&["a", "b", ""])]
fn sequence_is_partition_and_order_sensitive(#[case] other: &[&str]) {
    assert_ne!(Checksum::of_strings(["a", "b"]), Checksum::of_strings(other));
}

#[test]
fn empty_sequence_differs_from_single_empty_string() {
    let none: [&str; 0] = [];
    assert_ne!(Checksum::of_strings(none), Checksum::of_strings([""]));
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// Reader yielding its payload a few bytes at a time, interrupting once.
struct TricklingReader {
    payload: Vec<u8>,
    offset: usize,
    interrupted: bool,
}

impl Read for TricklingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.interrupted {
            self.interrupted = true;
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let remaining = self.payload.get(self.offset..).unwrap_or_default();
        let count = remaining.len().min(buf.len()).min(3);
        if let (Some(target), Some(source)) = (buf.get_mut(..count), remaining.get(..count)) {
            target.copy_from_slice(source);
        }
        self.offset += count;
        Ok(count)
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk vanished"))
    }
}

#[test]
fn stream_matches_in_memory_bytes() {
    let payload: Vec<u8> = (0..20_000_u32)
        .map(|value| u8::try_from(value % 251).expect("remainder fits in a byte"))
        .collect();
    let streamed = Checksum::from_reader(payload.as_slice()).expect("slice reads cannot fail");
    assert_eq!(streamed, Checksum::of_bytes(&payload));
}

#[test]
fn stream_retries_interrupted_reads() {
    let reader = TricklingReader {
        payload: b"module contents".to_vec(),
        offset: 0,
        interrupted: false,
    };
    let streamed = Checksum::from_reader(reader).expect("interruptions are retried");
    assert_eq!(streamed, Checksum::of_str("module contents"));
}

#[test]
fn stream_errors_reach_the_caller() {
    let error = Checksum::from_reader(FailingReader).expect_err("read failure must surface");
    assert_eq!(error.to_string(), "disk vanished");
}

// ---------------------------------------------------------------------------
// Serialiser hook
// ---------------------------------------------------------------------------

#[test]
fn serialiser_output_is_hashed_verbatim() {
    let checksum = Checksum::create_with("payload", |value, sink| {
        sink.write_bytes(value.as_bytes());
        Ok::<_, io::Error>(())
    })
    .expect("infallible serialiser");
    assert_eq!(checksum, Checksum::of_str("payload"));
}

#[test]
fn length_prefixed_strings_keep_fields_apart() {
    let fields = |first: &str, second: &str| {
        Checksum::create_with(&(first, second), |(first, second), sink| {
            sink.write_str(first);
            sink.write_str(second);
            Ok::<_, io::Error>(())
        })
        .expect("infallible serialiser")
    };
    assert_ne!(fields("ab", "c"), fields("a", "bc"));
}

#[test]
fn serialiser_errors_are_returned_unchanged() {
    let result = Checksum::create_with(&42_u32, |_, sink| {
        sink.write_u32(1);
        Err("unsupported node")
    });
    assert_eq!(result, Err("unsupported node"));
}

#[test]
fn writer_counts_bytes() {
    Checksum::create_with(&(), |(), sink| {
        sink.write_u8(1);
        sink.write_bool(true);
        sink.write_u32(2);
        sink.write_u64(3);
        sink.write_i64(-4);
        sink.write_checksum(Checksum::NULL);
        assert_eq!(sink.bytes_written(), 1 + 1 + 4 + 8 + 8 + 16);
        Ok::<_, io::Error>(())
    })
    .expect("infallible serialiser");
}

/// A node in a graph that may refer back to its ancestors.
struct Node {
    name: &'static str,
    children: Vec<usize>,
}

/// Serialises a graph depth-first, writing a back-reference marker instead of
/// revisiting nodes already on the path.
fn serialise_graph(nodes: &[Node], sink: &mut crate::ChecksumWriter<'_>) {
    fn visit(
        nodes: &[Node],
        index: usize,
        path: &mut Vec<usize>,
        sink: &mut crate::ChecksumWriter<'_>,
    ) {
        if let Some(depth) = path.iter().position(|visited| *visited == index) {
            sink.write_u8(b'^');
            sink.write_u64(u64::try_from(depth).expect("path depth fits in u64"));
            return;
        }
        let Some(node) = nodes.get(index) else {
            return;
        };
        sink.write_u8(b'{');
        sink.write_str(node.name);
        path.push(index);
        for child in &node.children {
            visit(nodes, *child, path, sink);
        }
        path.pop();
        sink.write_u8(b'}');
    }
    visit(nodes, 0, &mut Vec::new(), sink);
}

#[test]
fn cyclic_graphs_hash_through_a_cycle_breaking_serialiser() {
    let node = |name, children| Node { name, children };
    let cyclic = vec![node("module", vec![1]), node("type", vec![0])];
    let acyclic = vec![node("module", vec![1]), node("type", Vec::new())];

    let hash = |nodes: &[Node]| {
        Checksum::create_with(nodes, |nodes, sink| {
            serialise_graph(nodes, sink);
            Ok::<_, io::Error>(())
        })
        .expect("infallible serialiser")
    };

    assert_eq!(hash(cyclic.as_slice()), hash(cyclic.as_slice()));
    assert_ne!(hash(cyclic.as_slice()), hash(acyclic.as_slice()));
}

#[derive(Serialize)]
struct Project {
    name: String,
    files: BTreeMap<String, Checksum>,
}

#[test]
fn serde_values_hash_their_json_encoding() {
    let project = Project {
        name: String::from("weaver"),
        files: BTreeMap::from([
            (String::from("lib.rs"), Checksum::of_str("pub mod a;")),
            (String::from("a.rs"), Checksum::of_str("fn a() {}")),
        ]),
    };
    let json = serde_json::to_vec(&project).expect("serialise project");

    let checksum = Checksum::of_serialize(&project).expect("serialise project");
    assert_eq!(checksum, Checksum::of_bytes(&json));
    assert_eq!(Checksum::of_serialize(&project).ok(), Some(checksum));
}

// ---------------------------------------------------------------------------
// Combination
// ---------------------------------------------------------------------------

fn members() -> [Checksum; 4] {
    [
        Checksum::of_str("one"),
        Checksum::of_str("two"),
        Checksum::of_str("three"),
        Checksum::of_str("four"),
    ]
}

#[test]
fn fixed_arity_matches_sequence_form() {
    let [a, b, c, d] = members();
    assert_eq!(Checksum::combine(a, b), Checksum::combine_all([a, b]));
    assert_eq!(Checksum::combine3(a, b, c), Checksum::combine_all([a, b, c]));
    assert_eq!(
        Checksum::combine4(a, b, c, d),
        Checksum::combine_all([a, b, c, d])
    );
}

#[test]
fn combination_hashes_concatenated_bytes() {
    let [a, b, _, _] = members();
    let mut bytes = a.as_bytes().to_vec();
    bytes.extend_from_slice(b.as_bytes());
    assert_eq!(Checksum::combine(a, b), Checksum::of_bytes(&bytes));
}

#[test]
fn combination_is_order_sensitive() {
    let [a, b, c, _] = members();
    assert_ne!(Checksum::combine(a, b), Checksum::combine(b, a));
    assert_ne!(Checksum::combine3(a, b, c), Checksum::combine3(c, b, a));
}

#[test]
fn long_sequences_combine_incrementally() {
    let files: Vec<Checksum> = (0..100)
        .map(|index| Checksum::of_str(&format!("file{index}")))
        .collect();
    let bytes: Vec<u8> = files
        .iter()
        .flat_map(|checksum| *checksum.as_bytes())
        .collect();
    assert_eq!(
        Checksum::combine_all(files.iter().copied()),
        Checksum::of_bytes(&bytes)
    );
}
