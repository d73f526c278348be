use std::collections::HashSet;

use keyflake::{
    Cursor, Filter, KeysetPaginator, Page, PageRequest, PageSize, PageSource, Record, RecordId,
    SortDirection, Value,
    page::{Error, MemoryCollection, PaginateError, SortKey},
};

const TOTAL: u64 = 205;
const BASE_MS: i64 = 1_700_000_000_000;

#[derive(Clone, Debug, PartialEq)]
struct Movie {
    id: RecordId,
    created_at: i64,
    genre: &'static str,
}

impl Record for Movie {
    fn id(&self) -> RecordId {
        self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "created_at" => Some(Value::Timestamp(self.created_at)),
            "genre" => Some(Value::from(self.genre)),
            _ => None,
        }
    }
}

/// 205 movies, three per `created_at` value, with identifiers deliberately
/// not in `created_at` order.
fn dataset() -> Vec<Movie> {
    (0..TOTAL)
        .map(|i| Movie {
            // 37 is coprime to 205, so the identifiers are a permutation.
            id: RecordId::from((i * 37) % TOTAL + 1, 2, 0),
            created_at: BASE_MS + 1_000 * i64::try_from(i / 3).unwrap(),
            genre: if i % 2 == 0 { "drama" } else { "comedy" },
        })
        .collect()
}

fn expected_desc(rows: &[Movie]) -> Vec<Movie> {
    let mut rows = rows.to_vec();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    rows
}

fn paginator() -> KeysetPaginator {
    KeysetPaginator::new("created_at", SortDirection::Descending)
}

fn collect_pages<S>(source: &S, mut request: PageRequest) -> Vec<Page<Movie>>
where
    S: PageSource<Row = Movie>,
    S::Error: std::fmt::Debug,
{
    let paginator = paginator();
    let mut pages = Vec::new();
    loop {
        let page = paginator.paginate(source, &request).unwrap();
        let next = request.next(&page);
        pages.push(page);
        match next {
            Some(r) => request = r,
            None => break pages,
        }
    }
}

#[test]
fn pages_cover_the_dataset_exactly_once() {
    let rows = dataset();
    let collection = MemoryCollection::from(rows.clone());
    let request = PageRequest::first(Filter::All, PageSize::new(50).unwrap());

    let pages = collect_pages(&collection, request);

    let sizes: Vec<usize> = pages.iter().map(Page::len).collect();
    let more: Vec<bool> = pages.iter().map(|p| p.has_more).collect();
    assert_eq!(sizes, [50, 50, 50, 50, 5]);
    assert_eq!(more, [true, true, true, true, false]);
    assert!(pages[4].next_cursor.is_none());

    let all: Vec<Movie> = pages.into_iter().flatten().collect();
    assert_eq!(all, expected_desc(&rows));

    let unique: HashSet<RecordId> = all.iter().map(|m| m.id).collect();
    assert_eq!(unique.len(), rows.len());
}

#[test]
fn ties_are_broken_by_id_and_stable_across_runs() {
    let collection = MemoryCollection::from(dataset());
    let request = PageRequest::first(Filter::All, PageSize::new(7).unwrap());

    let first: Vec<RecordId> = collect_pages(&collection, request.clone())
        .into_iter()
        .flatten()
        .map(|m| m.id)
        .collect();
    let second: Vec<RecordId> = collect_pages(&collection, request)
        .into_iter()
        .flatten()
        .map(|m| m.id)
        .collect();
    assert_eq!(first, second);

    let ordered = collect_pages(
        &collection,
        PageRequest::first(Filter::All, PageSize::new(7).unwrap()),
    )
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();
    for pair in ordered.windows(2) {
        if pair[0].created_at == pair[1].created_at {
            assert!(pair[0].id > pair[1].id, "{pair:?}");
        } else {
            assert!(pair[0].created_at > pair[1].created_at);
        }
    }
}

#[test]
fn resuming_from_any_boundary_returns_the_strict_suffix() {
    let rows = dataset();
    let expected = expected_desc(&rows);
    let collection = MemoryCollection::from(rows);
    let paginator = paginator();

    for (i, boundary) in expected.iter().enumerate() {
        let cursor = paginator.cursor_after(boundary).unwrap();
        let request = PageRequest {
            filter: Filter::All,
            cursor: Some(cursor),
            size: PageSize::unbounded(),
        };
        let page = paginator.paginate(&collection, &request).unwrap();
        assert!(!page.has_more);
        assert_eq!(page.rows, &expected[i + 1..], "boundary {i}");
    }
}

#[test]
fn deleted_boundary_row_still_resumes_correctly() {
    let rows = dataset();
    let expected = expected_desc(&rows);
    let mut collection = MemoryCollection::from(rows);
    let size = PageSize::new(50).unwrap();

    let first = paginator()
        .paginate(&collection, &PageRequest::first(Filter::All, size))
        .unwrap();
    let cursor = first.next_cursor.clone().unwrap();
    assert_eq!(collection.remove(cursor.id), 1);

    let request = PageRequest {
        filter: Filter::All,
        cursor: Some(cursor),
        size,
    };
    let second = paginator().paginate(&collection, &request).unwrap();
    assert_eq!(second.rows, &expected[50..100]);
}

#[test]
fn rows_inserted_behind_the_cursor_do_not_shift_later_pages() {
    let rows = dataset();
    let expected = expected_desc(&rows);
    let mut collection = MemoryCollection::from(rows);
    let size = PageSize::new(50).unwrap();

    let request = PageRequest::first(Filter::All, size);
    let first = paginator().paginate(&collection, &request).unwrap();

    // A newer row lands in the region already returned.
    collection.insert(Movie {
        id: RecordId::from(10_000, 2, 0),
        created_at: BASE_MS + 1_000_000,
        genre: "drama",
    });

    let second = paginator()
        .paginate(&collection, &request.next(&first).unwrap())
        .unwrap();
    assert_eq!(second.rows, &expected[50..100]);
}

#[test]
fn base_filter_is_combined_with_the_boundary() {
    let rows = dataset();
    let dramas: Vec<Movie> = expected_desc(&rows)
        .into_iter()
        .filter(|m| m.genre == "drama")
        .collect();
    let collection = MemoryCollection::from(rows);

    let request = PageRequest::first(Filter::eq("genre", "drama"), PageSize::new(20).unwrap());
    let all: Vec<Movie> = collect_pages(&collection, request)
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(all, dramas);
}

#[test]
fn ascending_scan_is_the_reverse_of_descending() {
    let rows = dataset();
    let collection = MemoryCollection::from(rows.clone());
    let paginator = KeysetPaginator::new("created_at", SortDirection::Ascending);

    let mut request = PageRequest::first(Filter::All, PageSize::new(33).unwrap());
    let mut ascending = Vec::new();
    loop {
        let page = paginator.paginate(&collection, &request).unwrap();
        let next = request.next(&page);
        ascending.extend(page);
        match next {
            Some(r) => request = r,
            None => break,
        }
    }

    let mut expected = expected_desc(&rows);
    expected.reverse();
    assert_eq!(ascending, expected);
}

#[test]
fn last_id_flow_matches_cursor_flow() {
    let collection = MemoryCollection::from(dataset());
    let size = PageSize::new(50).unwrap();
    let paginator = paginator();

    let first = paginator
        .paginate(&collection, &PageRequest::first(Filter::All, size))
        .unwrap();
    let last_id = first.rows.last().unwrap().id;

    let cursor = paginator.cursor_from_last_id(&collection, last_id).unwrap();
    assert_eq!(Some(&cursor), first.next_cursor.as_ref());

    let unknown = RecordId::from(99_999, 0, 0);
    let err = paginator
        .cursor_from_last_id(&collection, unknown)
        .unwrap_err();
    assert!(matches!(
        err,
        PaginateError::Page(Error::UnknownBoundary { id }) if id == unknown
    ));
}

#[test]
fn cursor_tokens_survive_a_round_trip_through_text() {
    let collection = MemoryCollection::from(dataset());
    let size = PageSize::new(50).unwrap();
    let paginator = paginator();

    let first = paginator
        .paginate(&collection, &PageRequest::first(Filter::All, size))
        .unwrap();
    let token = first.next_cursor.as_ref().unwrap().to_string();

    let resumed = PageRequest {
        filter: Filter::All,
        cursor: Some(token.parse::<Cursor>().unwrap()),
        size,
    };
    let direct = PageRequest::first(Filter::All, size).next(&first).unwrap();
    assert_eq!(
        paginator.paginate(&collection, &resumed).unwrap(),
        paginator.paginate(&collection, &direct).unwrap()
    );
}

#[derive(Debug, PartialEq)]
struct Offline;

struct OfflineSource;

impl PageSource for OfflineSource {
    type Row = Movie;
    type Error = Offline;

    fn fetch(
        &self,
        _filter: &Filter,
        _sort: &[SortKey],
        _limit: Option<usize>,
    ) -> Result<Vec<Movie>, Offline> {
        Err(Offline)
    }
}

#[test]
fn storage_errors_propagate_unchanged() {
    let err = paginator()
        .paginate(&OfflineSource, &PageRequest::default())
        .unwrap_err();
    assert_eq!(err.into_source(), Some(Offline));
}

/// Asserts the storage sees exactly `page_size + 1` as its limit.
struct LimitProbe(MemoryCollection<Movie>);

impl PageSource for LimitProbe {
    type Row = Movie;
    type Error = std::convert::Infallible;

    fn fetch(
        &self,
        filter: &Filter,
        sort: &[SortKey],
        limit: Option<usize>,
    ) -> Result<Vec<Movie>, Self::Error> {
        assert_eq!(limit, Some(11));
        assert_eq!(sort, paginator().sort_keys());
        self.0.fetch(filter, sort, limit)
    }
}

#[test]
fn storage_is_asked_for_one_extra_row() {
    let probe = LimitProbe(MemoryCollection::from(dataset()));
    let page = paginator()
        .paginate(&probe, &PageRequest::first(Filter::All, PageSize::new(10).unwrap()))
        .unwrap();
    assert_eq!(page.len(), 10);
    assert!(page.has_more);
}

#[cfg(feature = "serde")]
#[test]
fn json_documents_paginate_by_integer_timestamps() {
    use keyflake::page::JsonRecord;
    use serde_json::json;

    let docs: Vec<JsonRecord> = (0..12_u64)
        .map(|i| {
            serde_json::from_value(json!({
                "_id": RecordId::from(i + 1, 2, 0).to_string(),
                "created_at": BASE_MS + 10 * i64::try_from(i / 4).unwrap(),
            }))
            .unwrap()
        })
        .collect();
    let collection = MemoryCollection::from(docs);
    let paginator = KeysetPaginator::new("created_at", SortDirection::Descending);

    let first = paginator
        .paginate(
            &collection,
            &PageRequest::first(Filter::All, PageSize::new(5).unwrap()),
        )
        .unwrap();
    assert!(first.has_more);

    // A cursor built by hand from a timestamp-kind value resumes the same way.
    let cursor = first.next_cursor.clone().unwrap();
    let by_hand = Cursor::new(Value::Timestamp(BASE_MS + 10), cursor.id);
    let a = paginator
        .paginate(
            &collection,
            &PageRequest {
                filter: Filter::All,
                cursor: Some(cursor),
                size: PageSize::new(5).unwrap(),
            },
        )
        .unwrap();
    let b = paginator
        .paginate(
            &collection,
            &PageRequest {
                filter: Filter::All,
                cursor: Some(by_hand),
                size: PageSize::new(5).unwrap(),
            },
        )
        .unwrap();
    assert_eq!(a.rows, b.rows);
    assert_eq!(a.len() + first.len(), 10);

    let json = serde_json::to_value(&first).unwrap();
    assert_eq!(json["has_more"], json!(true));
    assert_eq!(json["rows"].as_array().unwrap().len(), 5);
}

#[cfg(feature = "serde")]
#[test]
fn json_documents_with_mixed_number_kinds_page_completely() {
    use keyflake::page::JsonRecord;

    // `4` and `4.0` parse to different kinds but tie on the sort field.
    let docs: Vec<JsonRecord> = serde_json::from_str(
        r#"[
            { "_id": "4194304",  "rating": 5 },
            { "_id": "8388608",  "rating": 4.5 },
            { "_id": "12582912", "rating": 4 },
            { "_id": "16777216", "rating": 3.5 },
            { "_id": "20971520", "rating": 3 },
            { "_id": "25165824", "rating": 4.0 },
            { "_id": "29360128", "rating": 4 }
        ]"#,
    )
    .unwrap();
    let collection = MemoryCollection::from(docs);

    let walk = |direction: SortDirection, size: usize| -> Vec<u64> {
        let paginator = KeysetPaginator::new("rating", direction);
        let mut request = PageRequest::first(Filter::All, PageSize::new(size).unwrap());
        let mut seen = Vec::new();
        loop {
            let page = paginator.paginate(&collection, &request).unwrap();
            seen.extend(page.rows.iter().map(|row| row.id().timestamp()));
            match request.next(&page) {
                Some(next) => request = next,
                None => break seen,
            }
        }
    };

    for size in [1, 2, 3, 7] {
        assert_eq!(walk(SortDirection::Descending, size), [1, 2, 7, 6, 3, 4, 5], "size {size}");
        assert_eq!(walk(SortDirection::Ascending, size), [5, 4, 3, 6, 7, 2, 1], "size {size}");
    }
}
