use criterion::{criterion_group, criterion_main, Criterion};
use dnsrelay_proto::{Message, QueryType, Question, Record};
use std::net::Ipv4Addr;

fn query_packet() -> Vec<u8> {
    Message::query(0x1234, Question::new("www.example.com".into(), QueryType::A))
    .encode()
    .unwrap()
}

fn response_packet() -> Vec<u8> {
    let request = Message::query(0x1234, Question::new("www.example.com".into(), QueryType::A));
    Message::response_to(&request)
    .with_answers([Record::A {
                domain: "www.example.com".into(),
                addr: Ipv4Addr::new(93, 184, 216, 34),
                ttl: 300,
            }])
    .encode()
    .unwrap()
}

fn decoding(packet: &[u8]) {
    let _ = Message::decode(packet).unwrap();
}

fn criterion_benchmark(c: &mut Criterion) {
    let query = query_packet();
    let response = response_packet();

    c.bench_function("decoding query packet", |b| b.iter(|| decoding(&query)));
    c.bench_function("decoding response packet", |b| {
            b.iter(|| decoding(&response))
        });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
