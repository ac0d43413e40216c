//! Dedup merge throughput: appending fresh pages vs re-merging a page that
//! is already fully accumulated.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::collections::HashSet;

use pokedex_lib::crawling::merge_unique;
use pokedex_lib::domain::ItemDetail;
use pokedex_lib::test_utils::sample_detail;

fn accumulated(len: u32) -> (Vec<ItemDetail>, HashSet<u32>) {
    let items: Vec<ItemDetail> = (1..=len).map(sample_detail).collect();
    let seen = items.iter().map(|item| item.id).collect();
    (items, seen)
}

fn bench_merge(c: &mut Criterion) {
    let fresh_page: Vec<ItemDetail> = (1001..=1020).map(sample_detail).collect();
    let repeated_page: Vec<ItemDetail> = (1..=20).map(sample_detail).collect();

    c.bench_function("merge_fresh_page_into_1000", |b| {
        b.iter_batched(
            || (accumulated(1000), fresh_page.clone()),
            |((mut items, mut seen), page)| black_box(merge_unique(&mut items, &mut seen, page)),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("merge_repeated_page_into_1000", |b| {
        b.iter_batched(
            || (accumulated(1000), repeated_page.clone()),
            |((mut items, mut seen), page)| black_box(merge_unique(&mut items, &mut seen, page)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
