//! End-to-end tests: a `LivePager` over an in-memory `Collection`.

use livepage_core::{Record, SortOrder, Value};
use livepage_reactive::{
    LivePager, LiveSource, PaginationConfig, PaginationMode, PaginationState, QueryDescription,
};
use livepage_source::{Collection, Delivery, Emission, Listener, SourceId, SubscriptionHandle};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

fn titled(collection: &Collection, titles: &[&str]) {
    for (i, title) in titles.iter().enumerate() {
        collection
            .insert(
                Record::new(i as u64 + 1)
                    .with_field("title", *title)
                    .with_field("position", i as i64),
            )
            .unwrap();
    }
}

fn titles<S: LiveSource<Item = Rc<Record>>>(pager: &LivePager<S>) -> Vec<String> {
    pager
        .items()
        .iter()
        .filter_map(|r| r.get("title").and_then(|v| v.as_str()).map(String::from))
        .collect()
}

fn numbered(n: u64) -> Collection {
    let collection = Collection::new("numbers");
    for i in 1..=n {
        collection
            .insert(Record::new(i).with_field("n", i as i64))
            .unwrap();
    }
    collection
}

fn infinite(page_size: usize) -> PaginationConfig {
    PaginationConfig::builder()
        .page_size(page_size)
        .sort_by("position")
        .sort_order(SortOrder::Ascending)
        .build()
        .unwrap()
}

fn traditional(page_size: usize, starting_page: usize) -> PaginationConfig {
    PaginationConfig::builder()
        .page_size(page_size)
        .starting_page(starting_page)
        .sort_by("n")
        .sort_order(SortOrder::Ascending)
        .build()
        .unwrap()
}

/// Wraps a source and records every query it is asked to subscribe to.
struct Recording<S> {
    inner: S,
    queries: Rc<RefCell<Vec<QueryDescription>>>,
}

impl<S: LiveSource> LiveSource for Recording<S> {
    type Item = S::Item;

    fn source_id(&self) -> SourceId {
        self.inner.source_id()
    }

    fn is_query_valid(&self, query: &QueryDescription) -> bool {
        self.inner.is_query_valid(query)
    }

    fn subscribe(&self, query: &QueryDescription, listener: Listener<S::Item>) -> SubscriptionHandle {
        self.queries.borrow_mut().push(query.clone());
        self.inner.subscribe(query, listener)
    }
}

#[test]
fn test_infinite_scroll_end_to_end() {
    let collection = Collection::new("letters");
    titled(&collection, &["A", "B"]);

    let pager = LivePager::new(collection.clone(), infinite(2)).unwrap();
    assert_eq!(pager.mode(), PaginationMode::InfiniteScroll);
    assert_eq!(titles(&pager), vec!["A", "B"]);
    assert!(!pager.is_exhausted());
    assert!(!pager.is_fetching());
    assert_eq!(pager.limit(), 2);

    // A third item shows up while the first batch is loaded; it is outside
    // the window until the next fetch.
    collection
        .insert(
            Record::new(3)
                .with_field("title", "C")
                .with_field("position", 2i64),
        )
        .unwrap();
    assert_eq!(titles(&pager), vec!["A", "B"]);

    assert!(pager.fetch_more());
    assert_eq!(pager.limit(), 4);
    assert_eq!(titles(&pager), vec!["A", "B", "C"]);
    assert!(pager.is_exhausted());
    assert!(!pager.fetch_more());
}

#[test]
fn test_traditional_end_to_end() {
    let queries = Rc::new(RefCell::new(Vec::new()));
    let source = Recording {
        inner: numbered(12),
        queries: queries.clone(),
    };

    let pager = LivePager::new(source, traditional(5, 1)).unwrap();
    assert_eq!(pager.mode(), PaginationMode::Traditional);
    assert_eq!(pager.page_count(), 3);
    assert_eq!(pager.current_page(), Some(1));
    assert_eq!(pager.items().len(), 5);

    assert!(pager.fetch_page(3));
    let ids: Vec<u64> = pager.items().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![11, 12]);
    assert_eq!(pager.current_page(), Some(3));
    // A short page is exhausted.
    assert!(pager.is_exhausted());

    let last = queries.borrow().last().cloned().unwrap();
    assert_eq!(last.skip, Some(10));
    assert_eq!(last.limit, Some(5));
    assert_eq!(last.sort.as_ref().map(|s| s.field.as_str()), Some("n"));

    // Count query is unconstrained and opened once.
    let counts = queries
        .borrow()
        .iter()
        .filter(|q| q.is_unbounded() && q.sort.is_none())
        .count();
    assert_eq!(counts, 1);
}

#[test]
fn test_traditional_starting_page() {
    let pager = LivePager::new(numbered(12), traditional(5, 2)).unwrap();
    let ids: Vec<u64> = pager.items().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![6, 7, 8, 9, 10]);
    assert!(!pager.is_exhausted());
}

#[test]
fn test_page_count_follows_data() {
    let collection = numbered(10);
    let pager = LivePager::new(collection.clone(), traditional(5, 1)).unwrap();
    assert_eq!(pager.page_count(), 2);

    collection
        .insert(Record::new(11).with_field("n", 11i64))
        .unwrap();
    assert_eq!(pager.page_count(), 3);
    assert!(pager.fetch_page(3));

    collection.delete(11).unwrap();
    assert_eq!(pager.page_count(), 2);
    assert!(pager.items().is_empty());
    assert!(!pager.fetch_page(3));
    assert!(pager.fetch_page(2));
}

#[test]
fn test_reset_end_to_end() {
    let collection = numbered(10);
    let config = PaginationConfig::builder().page_size(2).build().unwrap();
    let pager = LivePager::new(collection.clone(), config).unwrap();
    assert!(pager.fetch_more());
    assert!(pager.fetch_more());
    assert_eq!(pager.limit(), 6);
    assert_eq!(pager.items().len(), 6);

    let seen: Rc<RefCell<Vec<PaginationState<Rc<Record>>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    pager.watch(move |s| sink.borrow_mut().push(s.clone()));

    assert!(pager.reset_list());
    let first = seen.borrow()[0].clone();
    assert!(first.result.is_empty());
    assert_eq!(first.limit, 2);
    assert!(first.is_fetching);

    assert_eq!(pager.items().len(), 2);
    assert!(!pager.is_fetching());
    assert!(!pager.reset_list());
}

#[test]
fn test_guards_are_noops() {
    let unpaginated = LivePager::new(numbered(3), PaginationConfig::default()).unwrap();
    let before = unpaginated.snapshot();
    assert!(!unpaginated.fetch_more());
    assert!(!unpaginated.fetch_page(1));
    assert!(!unpaginated.reset_list());
    assert_eq!(unpaginated.snapshot(), before);

    let paged = LivePager::new(numbered(3), traditional(2, 1)).unwrap();
    let before = paged.snapshot();
    assert!(!paged.fetch_more());
    assert!(!paged.reset_list());
    assert!(!paged.fetch_page(0));
    assert!(!paged.fetch_page(3));
    assert_eq!(paged.snapshot(), before);
}

#[test]
fn test_fetch_more_ignored_while_fetching() {
    let collection = Collection::with_delivery("deferred", Delivery::Deferred);
    titled(&collection, &["A", "B", "C"]);

    let pager = LivePager::new(collection.clone(), infinite(2)).unwrap();
    assert!(pager.is_fetching());
    assert!(!pager.fetch_more());

    collection.flush();
    assert!(!pager.is_fetching());
    assert!(pager.fetch_more());
    assert!(pager.is_fetching());
    assert!(!pager.fetch_more());
    assert_eq!(pager.limit(), 4);

    collection.flush();
    assert_eq!(titles(&pager), vec!["A", "B", "C"]);
}

#[test]
fn test_stale_deferred_emission_is_dropped() {
    let collection = Collection::with_delivery("deferred", Delivery::Deferred);
    titled(&collection, &["A", "B", "C", "D", "E"]);

    let pager = LivePager::new(collection.clone(), infinite(2)).unwrap();
    collection.flush();
    assert_eq!(titles(&pager), vec!["A", "B"]);

    // The first query's update is queued, then the query is superseded.
    collection
        .update(1, |r| {
            r.set("title", "A2");
        })
        .unwrap();
    assert!(pager.fetch_more());
    assert_eq!(collection.live_query_count(), 1);

    collection.flush();
    assert_eq!(titles(&pager), vec!["A2", "B", "C", "D"]);
    assert_eq!(pager.limit(), 4);
}

/// A source that never forgets a listener, so released subscriptions can
/// still be poked.
struct Leaky {
    id: SourceId,
    items: RefCell<Vec<u32>>,
    listeners: RefCell<Vec<Rc<Listener<u32>>>>,
    live: Rc<Cell<usize>>,
}

impl Leaky {
    fn new(items: Vec<u32>) -> Rc<Self> {
        Rc::new(Self {
            id: livepage_source::next_source_id(),
            items: RefCell::new(items),
            listeners: RefCell::new(Vec::new()),
            live: Rc::new(Cell::new(0)),
        })
    }

    fn poke_all(&self, items: Vec<u32>) {
        let listeners: Vec<_> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(Emission::Many(items.clone()));
        }
    }
}

impl LiveSource for Leaky {
    type Item = u32;

    fn source_id(&self) -> SourceId {
        self.id
    }

    fn is_query_valid(&self, _query: &QueryDescription) -> bool {
        true
    }

    fn subscribe(&self, query: &QueryDescription, listener: Listener<u32>) -> SubscriptionHandle {
        let listener = Rc::new(listener);
        self.listeners.borrow_mut().push(listener.clone());
        let items = self.items.borrow();
        let end = query.limit.unwrap_or(items.len()).min(items.len());
        listener(Emission::Many(items[..end].to_vec()));

        self.live.set(self.live.get() + 1);
        let live = self.live.clone();
        SubscriptionHandle::new(self.listeners.borrow().len() as u64, move || {
            live.set(live.get() - 1)
        })
    }
}

#[test]
fn test_released_listener_cannot_apply_results() {
    let source = Leaky::new((1..=10).collect());
    let config = PaginationConfig::builder().page_size(3).build().unwrap();
    let pager = LivePager::new(source.clone(), config).unwrap();
    assert!(pager.fetch_more());
    assert_eq!(source.live.get(), 1);
    assert_eq!(pager.items(), (1..=6).collect::<Vec<_>>());

    // Only the current listener may land its result.
    source.poke_all(vec![42]);
    assert_eq!(pager.items(), vec![42]);

    drop(pager);
    assert_eq!(source.live.get(), 0);
    source.poke_all(vec![7]);
}

#[test]
fn test_single_item_emission_is_normalized() {
    let collection = numbered(5);
    let first_even = collection.find_one(|r| r.get("n").and_then(|v| v.as_i64()).unwrap_or(1) % 2 == 0);

    let pager = LivePager::new(first_even, PaginationConfig::default()).unwrap();
    let ids: Vec<u64> = pager.items().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn test_filtered_source() {
    let collection = numbered(20);
    let odd = collection.find(|r| r.get("n").and_then(|v| v.as_i64()).unwrap_or(0) % 2 == 1);

    let pager = LivePager::new(odd, traditional(4, 1)).unwrap();
    assert_eq!(pager.page_count(), 3);
    assert!(pager.fetch_page(3));
    let ids: Vec<u64> = pager.items().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![17, 19]);
    assert_eq!(collection.live_query_count(), 2);
}

#[test]
fn test_replace_source() {
    let first = Collection::new("first");
    titled(&first, &["A", "B", "C"]);
    let second = Collection::new("second");
    titled(&second, &["X", "Y"]);

    let pager = LivePager::new(first.clone(), infinite(2)).unwrap();
    assert!(pager.fetch_more());
    assert_eq!(titles(&pager), vec!["A", "B", "C"]);

    pager.replace_source(second.clone());
    assert_eq!(pager.source_id(), second.source_id());
    assert_eq!(first.live_query_count(), 0);
    assert_eq!(second.live_query_count(), 1);
    // The grown limit carries over to the new source.
    assert_eq!(pager.limit(), 4);
    assert_eq!(titles(&pager), vec!["X", "Y"]);
}

#[test]
fn test_closed_source_releases_and_recovers() {
    let first = numbered(12);
    let pager = LivePager::new(first.clone(), traditional(5, 1)).unwrap();
    assert_eq!(pager.live_subscriptions(), 2);

    first.close();
    assert!(pager.fetch_page(2));
    assert_eq!(pager.live_subscriptions(), 0);
    // State was already fetching when the query was rejected.
    assert_eq!(pager.current_page(), Some(2));

    let second = numbered(12);
    pager.replace_source(second.clone());
    assert_eq!(pager.live_subscriptions(), 2);
    let ids: Vec<u64> = pager.items().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![6, 7, 8, 9, 10]);
}

#[test]
fn test_plain_values() {
    let collection = Collection::new("letters");
    titled(&collection, &["A", "B"]);
    let config = PaginationConfig::builder()
        .sort_by("position")
        .sort_order(SortOrder::Ascending)
        .materialize_plain(true)
        .build()
        .unwrap();

    let pager = LivePager::new(collection.clone(), config).unwrap();
    let plain: Vec<_> = pager.result().into_iter().map(|m| m.into_plain()).collect();
    assert_eq!(plain[0].get("title"), Some(&Value::from("A")));
    assert_eq!(plain[1].get("position"), Some(&Value::Int64(1)));

    // A later change produces a fresh plain copy; the old one is untouched.
    collection
        .update(1, |r| {
            r.set("title", "Z");
        })
        .unwrap();
    assert_eq!(plain[0].get("title"), Some(&Value::from("A")));
    let fresh = pager.result()[0].clone().into_plain();
    assert_eq!(fresh.get("title"), Some(&Value::from("Z")));
}

#[test]
fn test_reentrant_watcher_loads_everything() {
    let collection = numbered(9);
    let config = PaginationConfig::builder().page_size(2).build().unwrap();
    let pager = Rc::new(LivePager::new(collection.clone(), config).unwrap());

    let weak: Weak<LivePager<Collection>> = Rc::downgrade(&pager);
    pager.watch(move |state| {
        if !state.is_fetching && !state.is_exhausted {
            if let Some(pager) = weak.upgrade() {
                pager.fetch_more();
            }
        }
    });

    assert!(pager.fetch_more());
    assert!(pager.is_exhausted());
    assert_eq!(pager.items().len(), 9);
    assert_eq!(collection.live_query_count(), 1);
    assert_eq!(pager.live_subscriptions(), 1);
}

#[test]
fn test_watcher_dispose_on_page_change_opens_nothing() {
    let collection = numbered(12);
    let pager = Rc::new(LivePager::new(collection.clone(), traditional(5, 1)).unwrap());

    let weak: Weak<LivePager<Collection>> = Rc::downgrade(&pager);
    pager.watch(move |state| {
        if state.page == Some(2) {
            if let Some(pager) = weak.upgrade() {
                pager.dispose();
            }
        }
    });

    assert!(pager.fetch_page(2));
    assert!(pager.is_disposed());
    assert_eq!(pager.live_subscriptions(), 0);
    assert_eq!(collection.live_query_count(), 0);

    // Later changes reach nobody.
    collection.insert(Record::new(100).with_field("n", 0i64)).unwrap();
    assert_eq!(collection.live_query_count(), 0);
}

#[test]
fn test_watcher_dispose_on_first_result_opens_nothing() {
    let collection = numbered(12);
    let pager = Rc::new(LivePager::new(collection.clone(), traditional(5, 1)).unwrap());

    let weak: Weak<LivePager<Collection>> = Rc::downgrade(&pager);
    pager.watch(move |state| {
        if state.page == Some(3) && !state.is_fetching {
            if let Some(pager) = weak.upgrade() {
                pager.dispose();
            }
        }
    });

    assert!(pager.fetch_page(3));
    assert!(pager.is_disposed());
    assert_eq!(pager.live_subscriptions(), 0);
    assert_eq!(collection.live_query_count(), 0);
}

#[test]
fn test_resync_after_close_releases() {
    let first = numbered(12);
    let pager = LivePager::new(first.clone(), traditional(5, 1)).unwrap();
    assert_eq!(pager.live_subscriptions(), 2);

    first.close();
    pager.resync();
    assert_eq!(pager.live_subscriptions(), 0);
    assert_eq!(first.live_query_count(), 0);
    assert_eq!(pager.current_page(), Some(1));

    let second = numbered(12);
    pager.replace_source(second.clone());
    assert_eq!(pager.live_subscriptions(), 2);
    assert_eq!(second.live_query_count(), 2);
    let ids: Vec<u64> = pager.items().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_subscription_discipline() {
    let collection = numbered(30);
    let pager = LivePager::new(collection.clone(), traditional(4, 1)).unwrap();
    assert_eq!(collection.live_query_count(), 2);

    for page in [2, 5, 8, 1, 3, 3] {
        assert!(pager.fetch_page(page));
        assert_eq!(collection.live_query_count(), 2);
        assert_eq!(pager.live_subscriptions(), 2);
    }

    pager.dispose();
    assert_eq!(collection.live_query_count(), 0);
    assert_eq!(pager.live_subscriptions(), 0);

    // A disposed pager never changes again.
    let before = pager.snapshot();
    collection.insert(Record::new(99).with_field("n", 0i64)).unwrap();
    assert_eq!(pager.snapshot(), before);
}
