//! Benchmarks for keeperlb components.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use keeperlb::balancer::{create_balancer, ConnectionBalancer};
use keeperlb::config::Policy;
use keeperlb::util::{hostname_levenshtein_distance, hostname_prefix_distance};

fn hosts(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("node-{i}.rack-{}.dc1.example.com:2181", i % 4))
        .collect()
}

fn online_balancer(policy: Policy, n: usize) -> Box<dyn ConnectionBalancer> {
    let mut balancer = create_balancer(policy, &hosts(n), "node-0.rack-0.dc1.example.com");
    for id in 0..n {
        balancer.mark_online(id);
    }
    balancer
}

fn benchmark_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_next");
    group.throughput(Throughput::Elements(1));

    for (name, policy) in [
        ("random", Policy::Random),
        ("round_robin", Policy::RoundRobin),
        ("first_or_random", Policy::FirstOrRandom),
        ("in_order", Policy::InOrder),
        ("nearest_hostname", Policy::NearestHostname),
    ] {
        let mut balancer = online_balancer(policy, 16);
        group.bench_function(name, |b| {
            b.iter(|| black_box(balancer.select_next().unwrap()))
        });
    }

    group.finish();
}

fn benchmark_worth_checking(c: &mut Criterion) {
    let mut balancer = create_balancer(Policy::InOrder, &hosts(16), "node-0");
    for id in 0..8 {
        balancer.mark_offline(id);
    }

    c.bench_function("worth_checking", |b| {
        b.iter(|| black_box(balancer.worth_checking(Some(12))))
    });
}

fn benchmark_distance(c: &mut Criterion) {
    let local = "node-3.rack-1.dc1.example.com";
    let remote = "node-7.rack-2.dc2.example.com:2181";

    c.bench_function("hostname_prefix_distance", |b| {
        b.iter(|| black_box(hostname_prefix_distance(local, remote)))
    });

    c.bench_function("hostname_levenshtein_distance", |b| {
        b.iter(|| black_box(hostname_levenshtein_distance(local, remote)))
    });
}

criterion_group!(
    benches,
    benchmark_selection,
    benchmark_worth_checking,
    benchmark_distance
);
criterion_main!(benches);
