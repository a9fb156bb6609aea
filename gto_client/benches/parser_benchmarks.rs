use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gto_client::game::parser::{parse_action_data, parse_node_data, parse_pot_stacks};

const HANDS: [&str; 13] = ["A", "K", "Q", "J", "T", "9", "8", "7", "6", "5", "4", "3", "2"];

/// Helper to render a node export with `n_hands` holdings per role
fn node_export(n_hands: usize, actions: &[String]) -> String {
    let k = actions.len();
    let mut oop = format!("OOP, {n_hands} hands, {k} actions\nHand Combos Equity\n");
    let mut ip = format!("IP, {n_hands} hands\nHand Combos Equity\n");
    for i in 0..n_hands {
        let hand = format!("{}h{}d", HANDS[i % 13], HANDS[(i / 13) % 13]);
        oop.push_str(&format!("{hand} 6 {:.3}", 50.0));
        for a in 0..k {
            oop.push_str(&format!(" {:.3}", 100.0 / k as f64 + a as f64));
        }
        for a in 0..k {
            oop.push_str(&format!(" {:.3}", a as f64 - 0.5));
        }
        oop.push('\n');
        ip.push_str(&format!("{hand} 6 {:.3}\n", 50.0));
    }
    format!("[GTO+ export][Board: 2d2c2h3d3c][{oop}][{ip}]")
}

/// Benchmark node-data parsing as ranges grow
fn bench_parse_node_data(c: &mut Criterion) {
    let actions: Vec<String> = ["Bet 33", "Bet 75", "Check"].iter().map(|s| s.to_string()).collect();
    let mut group = c.benchmark_group("parse_node_data");
    for n_hands in [3, 169, 1326] {
        let export = node_export(n_hands, &actions);
        group.bench_with_input(BenchmarkId::from_parameter(n_hands), &export, |b, export| {
            b.iter(|| parse_node_data(export, &actions).unwrap());
        });
    }
    group.finish();
}

/// Benchmark the small bracketed replies
fn bench_parse_small_replies(c: &mut Criterion) {
    c.bench_function("parse_pot_stacks", |b| {
        b.iter(|| parse_pot_stacks("[Pot and stacks][Pot: 12.5][OOP Stack: 93.75][IP Stack: 93.75]").unwrap());
    });
    c.bench_function("parse_action_data", |b| {
        b.iter(|| parse_action_data("[Action data: Bet 33,Bet 75,Bet 150,Check]").unwrap());
    });
}

criterion_group!(benches, bench_parse_node_data, bench_parse_small_replies);
criterion_main!(benches);
