use crate::{
    config::MergerConfig,
    direction::Direction,
    key::OrderedKeyComparator,
    merge::IndexMerger,
    stream::{IndexEntry, IndexStreamOptions, VecIndexStream},
    test_support::{Row, collect_rows, merger_over},
    value::Value,
};

fn row_keys(rows: &[Row]) -> Vec<u64> {
    rows.iter()
        .map(|(_, projections)| {
            assert!(
                projections.windows(2).all(|pair| pair[0] == pair[1]),
                "every stream in a row must agree on the key: {projections:?}"
            );
            projections[0]
        })
        .collect()
}

#[test]
fn disjoint_streams_never_invoke_callback() {
    let mut merger = merger_over(&[&[1, 3, 5, 7], &[2, 4, 6, 8, 10]]);
    let mut calls = 0usize;

    let more = merger
        .next(|_, _| {
            calls += 1;
            true
        })
        .expect("merge should succeed");

    assert!(!more, "first call must already report exhaustion");
    assert_eq!(calls, 0);
}

#[test]
fn single_shared_key_yields_one_row() {
    let mut merger = merger_over(&[&[1, 3, 5, 7, 8, 9], &[2, 4, 6, 8, 10]]);
    let rows = collect_rows(&mut merger);

    assert_eq!(rows, vec![(vec![(0, 4), (1, 3)], vec![8, 8])]);
}

#[test]
fn duplicate_keys_emit_full_cross_product() {
    let mut merger = merger_over(&[&[1, 1], &[1, 1]]);
    let rows = collect_rows(&mut merger);

    let documents: Vec<_> = rows.into_iter().map(|(documents, _)| documents).collect();
    assert_eq!(
        documents,
        vec![
            vec![(0, 0), (1, 0)],
            vec![(0, 0), (1, 1)],
            vec![(0, 1), (1, 0)],
            vec![(0, 1), (1, 1)],
        ]
    );
}

#[test]
fn cross_product_counts_multiply_per_key() {
    let mut merger = merger_over(&[&[1, 1, 3, 4], &[1, 1, 2, 4]]);
    let rows = collect_rows(&mut merger);

    assert_eq!(row_keys(&rows), vec![1, 1, 1, 1, 4]);
}

#[test]
fn three_way_join_keeps_only_keys_in_every_stream() {
    let mut merger = merger_over(&[
        &[1, 1, 3, 4, 6, 7, 8, 9],
        &[1, 1, 2, 4, 6, 7, 8, 10],
        &[2, 2, 2, 4, 7, 8, 10],
    ]);
    let rows = collect_rows(&mut merger);

    assert_eq!(row_keys(&rows), vec![4, 7, 8]);
    assert!(rows.iter().all(|(documents, _)| documents.len() == 3));
}

#[test]
fn single_stream_passes_every_entry_through_in_order() {
    let mut merger = merger_over(&[&[0, 1, 2, 3]]);
    let rows = collect_rows(&mut merger);

    assert_eq!(
        rows,
        vec![
            (vec![(0, 0)], vec![0]),
            (vec![(0, 1)], vec![1]),
            (vec![(0, 2)], vec![2]),
            (vec![(0, 3)], vec![3]),
        ]
    );
}

#[test]
fn single_stream_with_duplicates_emits_each_entry_once() {
    let mut merger = merger_over(&[&[5, 5, 6]]);
    let rows = collect_rows(&mut merger);

    assert_eq!(row_keys(&rows), vec![5, 5, 6]);
}

#[test]
fn empty_stream_exhausts_immediately() {
    let mut merger = merger_over(&[&[], &[1, 2]]);

    assert!(
        !merger
            .next(|_, _| panic!("no row can match an empty stream"))
            .expect("merge should succeed")
    );
}

#[test]
fn descending_streams_join_in_descending_key_order() {
    let desc = OrderedKeyComparator::from_direction(Direction::Desc);
    let stream = |id: usize, keys: &[u64]| {
        let entries = keys
            .iter()
            .enumerate()
            .map(|(ordinal, key)| IndexEntry::new((id, ordinal), vec![*key], vec![*key]))
            .collect();
        VecIndexStream::from_entries(entries, desc)
    };
    let config = MergerConfig::new().with_direction(Direction::Desc);
    let mut merger = IndexMerger::builder(1, config.comparator())
        .config(config)
        .stream(stream(0, &[9, 7, 5, 3]), 1)
        .stream(stream(1, &[8, 7, 3, 1]), 1)
        .build()
        .expect("merger should build");

    let rows = collect_rows(&mut merger);

    assert_eq!(row_keys(&rows), vec![7, 3]);
}

#[test]
fn composite_keys_must_match_on_every_component() {
    let asc = OrderedKeyComparator::default();
    // columns: [country, city, population]
    let cities = vec![
        (
            "c1",
            vec![Value::from("de"), Value::from("berlin"), Value::Uint(3_600)],
        ),
        (
            "c2",
            vec![Value::from("de"), Value::from("bonn"), Value::Uint(330)],
        ),
        (
            "c3",
            vec![Value::from("fr"), Value::from("paris"), Value::Uint(2_100)],
        ),
    ];
    // columns: [city, country, venue]
    let venues = vec![
        (
            "v1",
            vec![Value::from("bonn"), Value::from("de"), Value::from("hall")],
        ),
        (
            "v2",
            vec![Value::from("paris"), Value::from("us"), Value::from("dome")],
        ),
        (
            "v3",
            vec![Value::from("berlin"), Value::from("de"), Value::from("arena")],
        ),
    ];

    let city_options = IndexStreamOptions::new(vec![0, 1], vec![2]);
    let venue_options = IndexStreamOptions::new(vec![1, 0], vec![2]);
    let mut merger = IndexMerger::builder(2, asc)
        .stream(
            VecIndexStream::from_rows(cities, &city_options, asc)
                .expect("city rows should map"),
            city_options.projection_width(),
        )
        .stream(
            VecIndexStream::from_rows(venues, &venue_options, asc)
                .expect("venue rows should map"),
            venue_options.projection_width(),
        )
        .build()
        .expect("merger should build");

    let rows = collect_rows(&mut merger);

    assert_eq!(
        rows,
        vec![
            (vec!["c1", "v3"], vec![Value::Uint(3_600), Value::from("arena")]),
            (vec!["c2", "v1"], vec![Value::Uint(330), Value::from("hall")]),
        ],
        "paris only matches on city, not on country"
    );
}

#[test]
fn projections_concatenate_in_stream_order_with_per_stream_widths() {
    let asc = OrderedKeyComparator::default();
    let wide = VecIndexStream::from_entries(
        vec![IndexEntry::new(1u8, vec![4u64], vec![40, 41])],
        asc,
    );
    let bare = VecIndexStream::from_entries(vec![IndexEntry::new(2u8, vec![4u64], vec![])], asc);
    let narrow = VecIndexStream::from_entries(
        vec![IndexEntry::new(3u8, vec![4u64], vec![42])],
        asc,
    );

    let mut merger = IndexMerger::builder(1, asc)
        .stream(wide, 2)
        .stream(bare, 0)
        .stream(narrow, 1)
        .build()
        .expect("merger should build");

    assert_eq!(
        collect_rows(&mut merger),
        vec![(vec![1, 2, 3], vec![40, 41, 42])]
    );
}
