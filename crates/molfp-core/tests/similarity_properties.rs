//! Property checks for the codecs and similarity metrics.
//!
//! Inputs come from seeded generators so every run sees the same cases.

use molfp_core::similarity::bitmap::{pair_counts, PopcountPath};
use molfp_core::similarity::{bitmap, sparse};
use molfp_core::{
    all_values_above, count_range_overlap, streaming_dice, BitmapFingerprint, ByteA,
    SparseFingerprint,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Helpers
// ============================================================================

fn random_bytes(rng: &mut StdRng, len: usize, density: f64) -> Vec<u8> {
    (0..len)
        .map(|_| {
            (0..8).fold(0u8, |b, bit| {
                if rng.gen_bool(density) {
                    b | (1 << bit)
                } else {
                    b
                }
            })
        })
        .collect()
}

fn random_sparse(rng: &mut StdRng, width: u32, max_len: usize) -> SparseFingerprint {
    let len = rng.gen_range(0..=max_len);
    let entries: Vec<(u32, i32)> = (0..len)
        .map(|_| (rng.gen_range(0..width), rng.gen_range(1..40)))
        .collect();
    SparseFingerprint::from_entries(width, entries).unwrap()
}

// ============================================================================
// Bitmap metrics
// ============================================================================

#[test]
fn test_tanimoto_self_is_one_unless_empty() {
    let mut rng = StdRng::seed_from_u64(7);
    for len in [1usize, 3, 4, 21, 64, 128, 256] {
        let a = random_bytes(&mut rng, len, 0.3);
        let expected = if a.iter().all(|b| *b == 0) { 0.0 } else { 1.0 };
        assert_eq!(bitmap::tanimoto(&a, &a).unwrap(), expected, "len {len}");
    }
    assert_eq!(bitmap::tanimoto(&[0u8; 64], &[0u8; 64]).unwrap(), 0.0);
}

#[test]
fn test_dice_symmetric_and_bounded() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let len = rng.gen_range(0..80);
        let a = random_bytes(&mut rng, len, 0.2);
        let b = random_bytes(&mut rng, len, 0.5);
        let ab = bitmap::dice(&a, &b).unwrap();
        let ba = bitmap::dice(&b, &a).unwrap();
        assert_eq!(ab, ba);
        assert!((0.0..=1.0).contains(&ab));
    }
}

#[test]
fn test_word_and_byte_paths_agree() {
    let mut rng = StdRng::seed_from_u64(13);
    for len in 0..=67usize {
        let a = random_bytes(&mut rng, len, 0.4);
        let b = random_bytes(&mut rng, len, 0.4);
        assert_eq!(
            pair_counts(&a, &b, PopcountPath::Word).unwrap(),
            pair_counts(&a, &b, PopcountPath::Bytewise).unwrap(),
            "len {len}"
        );
    }
}

#[test]
fn test_tversky_matches_tanimoto_and_dice() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..100 {
        let a = random_bytes(&mut rng, 64, 0.25);
        let b = random_bytes(&mut rng, 64, 0.25);
        let t = bitmap::tanimoto(&a, &b).unwrap();
        let d = bitmap::dice(&a, &b).unwrap();
        assert!((bitmap::tversky(&a, &b, 1.0, 1.0).unwrap() - t).abs() < 1e-12);
        assert!((bitmap::tversky(&a, &b, 0.5, 0.5).unwrap() - d).abs() < 1e-12);
    }
}

// ============================================================================
// Sparse metrics
// ============================================================================

#[test]
fn test_streaming_dice_matches_materialized() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..300 {
        let a = random_sparse(&mut rng, 2048, 40);
        let b = random_sparse(&mut rng, 2048, 40);
        let streamed = streaming_dice(&a.to_wire(), &b.to_wire()).unwrap();
        let materialized = sparse::dice(&a, &b).unwrap();
        assert!(
            (streamed - materialized).abs() < 1e-9,
            "{streamed} vs {materialized}"
        );
    }
}

#[test]
fn test_streaming_dice_overlapping_key_spaces() {
    // small width forces many shared keys
    let mut rng = StdRng::seed_from_u64(29);
    for _ in 0..300 {
        let a = random_sparse(&mut rng, 16, 12);
        let b = random_sparse(&mut rng, 16, 12);
        let streamed = streaming_dice(&a.to_wire(), &b.to_wire()).unwrap();
        assert!((streamed - a.dice(&b).unwrap()).abs() < 1e-9);
        assert!((streamed - b.dice(&a).unwrap()).abs() < 1e-9);
    }
}

#[test]
fn test_sparse_tanimoto_bounds() {
    let mut rng = StdRng::seed_from_u64(31);
    for _ in 0..100 {
        let a = random_sparse(&mut rng, 256, 20);
        let b = random_sparse(&mut rng, 256, 20);
        let t = a.tanimoto(&b).unwrap();
        assert!((0.0..=1.0).contains(&t));
        assert!(t <= a.dice(&b).unwrap() + 1e-12);
    }
}

#[test]
fn test_threshold_scan_example() {
    let fp = SparseFingerprint::from_entries(64, [(3, 2), (10, 5), (30, 9)]).unwrap();
    let wire = fp.to_wire();
    assert!(all_values_above(&wire, 1).unwrap());
    assert!(!all_values_above(&wire, 5).unwrap());
}

// ============================================================================
// Codecs
// ============================================================================

#[test]
fn test_bitmap_varlena_round_trip() {
    let mut rng = StdRng::seed_from_u64(37);
    for len in [0usize, 1, 21, 64, 256] {
        let payload = random_bytes(&mut rng, len, 0.5);
        let stored = ByteA::from(payload).to_varlena();
        let fp = BitmapFingerprint::from_varlena(&stored).unwrap();
        assert_eq!(fp.to_varlena(), stored);
    }
}

#[test]
fn test_sparse_varlena_round_trip() {
    let mut rng = StdRng::seed_from_u64(41);
    for _ in 0..50 {
        let fp = random_sparse(&mut rng, 1 << 20, 64);
        let stored = fp.to_varlena();
        let back = SparseFingerprint::from_varlena(&stored).unwrap();
        assert_eq!(back.to_varlena(), stored);
        assert_eq!(back, fp);
    }
}

#[test]
fn test_range_overlap_low_never_exceeds_high() {
    let mut rng = StdRng::seed_from_u64(43);
    for _ in 0..100 {
        let stored = random_sparse(&mut rng, 4096, 30);
        let query = random_sparse(&mut rng, 4096, 30);
        let ranges = stored.to_range_compressed(32).unwrap();
        let r = count_range_overlap(&ranges, &query).unwrap();
        assert!(r.overlap_low <= r.overlap_high);
        assert!(r.query_sum >= r.overlap_high);
    }
}
