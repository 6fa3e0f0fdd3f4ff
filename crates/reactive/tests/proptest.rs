//! Property-based tests for livepage-reactive using proptest.

use livepage_core::Record;
use livepage_reactive::{
    page_count, query_for_cursor, reduce, select_mode, LivePager, PageCursor, PaginationConfig,
    PaginationEvent, PaginationMode, PaginationState,
};
use livepage_source::Collection;
use proptest::prelude::*;

fn arb_state() -> impl Strategy<Value = PaginationState<u32>> {
    (
        prop::collection::vec(any::<u32>(), 0..20),
        any::<bool>(),
        any::<bool>(),
        0usize..50,
        prop::option::of(1usize..20),
        0usize..20,
    )
        .prop_map(
            |(result, is_fetching, is_exhausted, limit, page, page_count)| PaginationState {
                result,
                is_fetching,
                is_exhausted,
                limit,
                page,
                page_count,
            },
        )
}

#[derive(Clone, Debug)]
enum Op {
    FetchMore,
    FetchPage(usize),
    Reset,
    Insert,
    Delete(u64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::FetchMore),
        (0usize..6).prop_map(Op::FetchPage),
        Just(Op::Reset),
        Just(Op::Insert),
        (1u64..40).prop_map(Op::Delete),
    ]
}

fn make_collection(n: u64) -> Collection {
    let collection = Collection::new("items");
    for i in 1..=n {
        collection
            .insert(Record::new(i).with_field("rank", (i % 7) as i64))
            .unwrap();
    }
    collection
}

fn make_config(page_size: usize, starting_page: Option<usize>) -> PaginationConfig {
    let builder = PaginationConfig::builder().page_size(page_size).sort_by("rank");
    match starting_page {
        Some(page) => builder.starting_page(page),
        None => builder,
    }
    .build()
    .unwrap()
}

proptest! {
    /// Exhaustion is decided purely by the result length against the limit.
    #[test]
    fn fetch_success_exhaustion(state in arb_state(), items in prop::collection::vec(any::<u32>(), 0..60)) {
        let limit = state.limit;
        let len = items.len();
        let next = reduce(state, PaginationEvent::FetchSuccess(items));
        prop_assert_eq!(next.is_exhausted, limit == 0 || len < limit);
        prop_assert!(!next.is_fetching);
        prop_assert_eq!(next.result.len(), len);
    }

    /// Reset always empties the result and restores the limit.
    #[test]
    fn reset_from_any_state(state in arb_state(), n in 0usize..30) {
        let page = state.page;
        let next = reduce(state, PaginationEvent::Reset(n));
        prop_assert!(next.result.is_empty());
        prop_assert_eq!(next.limit, n);
        prop_assert!(next.is_fetching);
        prop_assert_eq!(next.page, page);
    }

    /// FetchMore grows the limit and advances a defined page.
    #[test]
    fn fetch_more_grows_limit(state in arb_state(), n in 1usize..30) {
        let before = state.clone();
        let next = reduce(state, PaginationEvent::FetchMore(n));
        prop_assert_eq!(next.limit, before.limit + n);
        prop_assert_eq!(next.page, before.page.map(|p| p + 1));
        prop_assert_eq!(next.result, before.result);
        prop_assert!(next.is_fetching);
    }

    /// CountPages only touches the page count.
    #[test]
    fn count_pages_is_isolated(state in arb_state(), c in 0usize..100) {
        let before = state.clone();
        let next = reduce(state, PaginationEvent::CountPages(c));
        prop_assert_eq!(next.page_count, c);
        prop_assert_eq!(PaginationState { page_count: before.page_count, ..next }, before);
    }

    /// Mode selection depends only on a zero page size and a starting page.
    #[test]
    fn select_mode_total(page_size in 0usize..100, starting_page in prop::option::of(1usize..100)) {
        let mode = select_mode(page_size, starting_page);
        match (page_size, starting_page) {
            (0, _) => prop_assert_eq!(mode, PaginationMode::None),
            (_, None) => prop_assert_eq!(mode, PaginationMode::InfiniteScroll),
            (_, Some(_)) => prop_assert_eq!(mode, PaginationMode::Traditional),
        }
    }

    /// A page query skips every earlier page and is one page long.
    #[test]
    fn traditional_query_window(page_size in 1usize..50, page in 1usize..50, limit in 0usize..100) {
        let config = make_config(page_size, Some(1));
        let query = query_for_cursor(PageCursor { limit, page: Some(page) }, &config, PaginationMode::Traditional);
        prop_assert_eq!(query.skip, Some((page - 1) * page_size));
        prop_assert_eq!(query.limit, Some(page_size));
    }

    /// The page count covers every item with the fewest pages.
    #[test]
    fn page_count_is_ceiling(total in 0usize..1000, page_size in 1usize..50) {
        let pages = page_count(total, page_size);
        prop_assert!(pages * page_size >= total);
        prop_assert!(pages == 0 || (pages - 1) * page_size < total);
    }

    /// Out-of-range pages leave the pager untouched; in-range pages land.
    #[test]
    fn fetch_page_guard(n in 0u64..30, page_size in 1usize..8, page in 0usize..10) {
        let pager = LivePager::new(make_collection(n), make_config(page_size, Some(1))).unwrap();
        let before = pager.snapshot();
        let accepted = pager.fetch_page(page);

        if page == 0 || page > before.page_count {
            prop_assert!(!accepted);
            prop_assert_eq!(pager.snapshot(), before);
        } else {
            prop_assert!(accepted);
            prop_assert_eq!(pager.current_page(), Some(page));
            let expected = (n as usize).saturating_sub((page - 1) * page_size).min(page_size);
            prop_assert_eq!(pager.items().len(), expected);
        }
    }

    /// Load-more requests are ignored once the view is exhausted.
    #[test]
    fn fetch_more_ignored_when_exhausted(n in 0u64..20, page_size in 1usize..8) {
        let pager = LivePager::new(make_collection(n), make_config(page_size, None)).unwrap();
        while pager.fetch_more() {}

        prop_assert!(pager.is_exhausted());
        let before = pager.snapshot();
        prop_assert!(!pager.fetch_more());
        prop_assert_eq!(pager.snapshot(), before);
        prop_assert_eq!(pager.items().len(), n as usize);
    }

    /// Reset is ignored while only the first batch is loaded.
    #[test]
    fn reset_ignored_at_first_batch(n in 0u64..20, page_size in 1usize..8) {
        let pager = LivePager::new(make_collection(n), make_config(page_size, None)).unwrap();
        let before = pager.snapshot();
        prop_assert!(!pager.reset_list());
        prop_assert_eq!(pager.snapshot(), before);
    }

    /// No operation sequence leaves more than one live subscription per role,
    /// and dropping the pager releases them all.
    #[test]
    fn subscription_discipline(
        n in 0u64..25,
        page_size in 1usize..6,
        paged in any::<bool>(),
        ops in prop::collection::vec(arb_op(), 0..40),
    ) {
        let collection = make_collection(n);
        let starting_page = if paged { Some(1) } else { None };
        let pager = LivePager::new(collection.clone(), make_config(page_size, starting_page)).unwrap();
        let roles = if paged { 2 } else { 1 };
        let mut next_id = 1000;

        for op in ops {
            match op {
                Op::FetchMore => { pager.fetch_more(); }
                Op::FetchPage(p) => { pager.fetch_page(p); }
                Op::Reset => { pager.reset_list(); }
                Op::Insert => {
                    next_id += 1;
                    collection.insert(Record::new(next_id).with_field("rank", 3i64)).unwrap();
                }
                Op::Delete(id) => { let _ = collection.delete(id); }
            }
            prop_assert_eq!(collection.live_query_count(), roles);
            prop_assert_eq!(pager.live_subscriptions(), roles);
            prop_assert!(!pager.is_fetching());
        }

        drop(pager);
        prop_assert_eq!(collection.live_query_count(), 0);
    }
}
