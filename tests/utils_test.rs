use std::num::NonZeroUsize;

use sortify::utils::*;

fn size(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    // RFC 7636 appendix B
    let challenge = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
    assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");

    let challenge2 = generate_code_challenge("different_verifier");
    assert_ne!(challenge, challenge2);
    assert!(
        challenge2
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_chunk_keeps_order_and_covers_everything() {
    let items: Vec<u32> = (0..120).collect();
    let chunks = chunk(&items, size(50));

    let lengths: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(lengths, vec![50, 50, 20]);

    let joined: Vec<u32> = chunks.concat();
    assert_eq!(joined, items);
}

#[test]
fn test_chunk_exact_multiple() {
    let items: Vec<u32> = (0..1200).collect();
    let chunks = chunk(&items, size(100));

    assert_eq!(chunks.len(), 12);
    assert!(chunks.iter().all(|c| c.len() == 100));
}

#[test]
fn test_chunk_smaller_than_size() {
    let items = ["a", "b", "c"];
    let chunks = chunk(&items, size(50));

    assert_eq!(chunks, vec![&items[..]]);
}

#[test]
fn test_chunk_empty_input() {
    let items: Vec<String> = Vec::new();
    assert!(chunk(&items, size(50)).is_empty());
}

#[test]
fn test_distinct_keeps_first_seen_order() {
    let ids = vec!["A2", "A1", "A2", "A3", "A1"];
    assert_eq!(distinct(ids), vec!["A2", "A1", "A3"]);
}

#[test]
fn test_distinct_empty() {
    let ids: Vec<String> = Vec::new();
    assert!(distinct(ids).is_empty());
}

#[test]
fn test_track_uri() {
    assert_eq!(
        track_uri("4iV5W9uYEdYUVa79Axb7Rh"),
        "spotify:track:4iV5W9uYEdYUVa79Axb7Rh"
    );
}
