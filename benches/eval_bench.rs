use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tdchess::brain::{Brain, BrainConfig};
use tdchess::eval::{heuristic, EvalWeights, Evaluator};
use tdchess::Board;

fn bench_eval(c: &mut Criterion) {
    let b = Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    let w = EvalWeights::default();
    c.bench_function("heuristic_kiwipete", |ben| ben.iter(|| black_box(heuristic(black_box(&b), &w))));

    let mut brain = Brain::new(BrainConfig::default());
    brain.set_value(b.fingerprint(), 0.25, 40);
    let eval = Evaluator::new(&brain, w);
    c.bench_function("blended_eval_kiwipete", |ben| ben.iter(|| black_box(eval.evaluate_board(black_box(&b)))));
}

criterion_group!(benches, bench_eval);
criterion_main!(benches);
