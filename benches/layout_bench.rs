use bufferlayout::{BufferLayout, Layout, VarBytes, VarString};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::OnceLock;

#[derive(Debug, Default, Clone)]
struct Quote {
    instrument: [u8; 16],
    price:      i64,
    size:       u32,
    venue:      VarString<1>,
    extra:      VarBytes<2>,
}

impl BufferLayout for Quote {
    fn layout() -> &'static Layout<Self> {
        static LAYOUT: OnceLock<Layout<Quote>> = OnceLock::new();
        LAYOUT.get_or_init(|| {
            Layout::builder()
                .fixed("instrument", |q: &Quote| &q.instrument, |q, v| q.instrument = v)
                .fixed("price", |q: &Quote| &q.price, |q, v| q.price = v)
                .fixed("size", |q: &Quote| &q.size, |q, v| q.size = v)
                .variable("venue", |q: &Quote| &q.venue, |q, v| q.venue = v)
                .variable("extra", |q: &Quote| &q.extra, |q, v| q.extra = v)
                .build()
        })
    }
}

fn sample() -> Quote {
    Quote {
        instrument: [7u8; 16],
        price:      1_234_567,
        size:       100,
        venue:      "XNAS".into(),
        extra:      vec![0xAB; 64].into(),
    }
}

fn bench_encode(c: &mut Criterion) {
    let quote = sample();
    c.bench_function("encode_quote", |b| b.iter(|| black_box(&quote).encode()));
}

fn bench_decode(c: &mut Criterion) {
    let bytes = sample().encode().unwrap();
    c.bench_function("decode_quote", |b| b.iter(|| Quote::decode(black_box(&bytes))));
}

fn bench_decode_stream(c: &mut Criterion) {
    let mut stream = Vec::new();
    for _ in 0..1000 {
        Quote::layout().encode_into(&sample(), &mut stream).unwrap();
    }

    c.bench_function("decode_1000_back_to_back", |b| {
        b.iter(|| {
            let mut offset = 0;
            while offset < stream.len() {
                let (_, used) = Quote::decode_prefix(black_box(&stream[offset..])).unwrap();
                offset += used;
            }
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_decode_stream);
criterion_main!(benches);
