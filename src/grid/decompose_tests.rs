use super::*;
use proptest::prelude::*;

/// Every index in `range` covered exactly once, nothing outside it.
fn assert_exact_cover(segments: &[Segment], range: Range<usize>, width: u32) {
    let total: usize = segments.iter().map(Segment::len).sum();
    assert_eq!(
        total,
        range.len(),
        "cell count mismatch for {:?} w={}",
        range,
        width
    );

    let mut hits = vec![0u8; range.len()];
    for seg in segments {
        assert!(!seg.is_empty(), "empty segment emitted: {:?}", seg);
        assert!(seg.x_end <= width, "segment past row end: {:?}", seg);
        for i in seg.cells(width) {
            assert!(range.contains(&i), "index {} outside {:?}", i, range);
            hits[i - range.start] += 1;
        }
    }
    assert!(
        hits.iter().all(|&h| h == 1),
        "overlap or gap for {:?} w={}",
        range,
        width
    );
}

#[test]
fn test_multi_row_example() {
    let segments = decompose_range(50..250, 100, 0);
    assert_eq!(
        segments,
        vec![
            Segment::new(0, 50, 100, 0),
            Segment::new(1, 0, 100, 0),
            Segment::new(2, 0, 50, 0),
        ]
    );
}

#[test]
fn test_empty_range_yields_nothing() {
    for a in [0usize, 7, 100, 250] {
        assert!(decompose_range(a..a, 100, 3).is_empty());
    }
}

#[test]
fn test_single_row_range() {
    assert_eq!(decompose_range(12..18, 100, 5), vec![Segment::new(0, 12, 18, 5)]);
    assert_eq!(decompose_range(130..131, 100, 0), vec![Segment::new(1, 30, 31, 0)]);
}

#[test]
fn test_end_on_row_boundary_omits_last_row() {
    // [100, 300) is exactly rows 1 and 2.
    assert_eq!(
        decompose_range(100..300, 100, 0),
        vec![Segment::new(1, 0, 100, 0), Segment::new(2, 0, 100, 0)]
    );
    // Ending at the row boundary right after a partial first row.
    assert_eq!(decompose_range(40..100, 100, 0), vec![Segment::new(0, 40, 100, 0)]);
}

#[test]
fn test_width_one_is_one_segment_per_index() {
    let segments = decompose_range(3..9, 1, 0);
    assert_eq!(segments.len(), 6);
    assert_exact_cover(&segments, 3..9, 1);
}

#[test]
fn test_exhaustive_small_grids() {
    for width in 1u32..=9 {
        let len = 4 * width as usize + 3;
        for a in 0..=len {
            for b in a..=len {
                let segments = decompose_range(a..b, width, 0);
                assert_exact_cover(&segments, a..b, width);
                // Minimality: one segment per touched row.
                if a < b {
                    let rows = (b - 1) / width as usize - a / width as usize + 1;
                    assert_eq!(segments.len(), rows, "a={} b={} w={}", a, b, width);
                }
            }
        }
    }
}

#[test]
fn test_batch_tags_follow_range_order() {
    let ranges = vec![0..5, 5..5, 8..30];
    let segments = decompose_batch(&ranges, 10);

    for (tag, range) in ranges.iter().enumerate() {
        let own: Vec<Segment> = segments
            .iter()
            .copied()
            .filter(|s| s.query_tag == tag as u32)
            .collect();
        assert_exact_cover(&own, range.clone(), 10);
    }
    assert!(segments.iter().all(|s| s.query_tag != 1));
}

#[test]
fn test_segments_agree_with_geometry_mapping() {
    use crate::grid::GridGeometry;

    for width in [1u32, 3, 8, 13, 100] {
        let len = 301;
        let geometry = GridGeometry::new(len, width).unwrap();
        for range in [0..len, 5..5, 7..200, width as usize..len] {
            for seg in decompose_range(range.clone(), width, 0) {
                for (x, i) in (seg.x_start..seg.x_end).zip(seg.cells(width)) {
                    assert_eq!(geometry.cell_of(i), (x, seg.y), "w={} i={}", width, i);
                    assert_eq!(geometry.linear_of(x, seg.y), i);
                    assert!(geometry.contains(x, seg.y));
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_segments_partition_range(
        width in 1u32..512,
        a in 0usize..20_000,
        len in 0usize..20_000,
    ) {
        let b = a + len;
        let segments = decompose_range(a..b, width, 9);
        assert_exact_cover(&segments, a..b, width);
        prop_assert!(segments.iter().all(|s| s.query_tag == 9));
        // Rows strictly increasing.
        prop_assert!(segments.windows(2).all(|p| p[0].y < p[1].y));
    }
}
