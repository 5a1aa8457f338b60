use chrono::Utc;
use common::{BookId, UserId};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use domain::{Book, Money, OrderBuilder};

fn catalog(size: usize) -> Vec<Book> {
    (0..size)
        .map(|i| Book {
            id: BookId::new(),
            isbn: format!("isbn-{i}"),
            title: format!("Book {i}"),
            category: "Fiction".to_string(),
            price: Money::from_cents(500 + i as i64),
            author: "Author".to_string(),
            image: None,
        })
        .collect()
}

fn bench_order_builder(c: &mut Criterion) {
    let books = catalog(50);

    c.bench_function("build_order_50_lines", |b| {
        b.iter(|| {
            let mut builder = OrderBuilder::new(UserId::new());
            for book in &books {
                builder.add_line(black_box(book), 3).unwrap();
            }
            builder.build(Utc::now()).unwrap()
        })
    });

    c.bench_function("line_subtotal_sum", |b| {
        let mut builder = OrderBuilder::new(UserId::new());
        for book in &books {
            builder.add_line(book, 2).unwrap();
        }
        let order = builder.build(Utc::now()).unwrap();

        b.iter(|| {
            let total: Money = order.line_items().iter().map(|l| l.subtotal()).sum();
            black_box(total)
        })
    });
}

criterion_group!(benches, bench_order_builder);
criterion_main!(benches);
