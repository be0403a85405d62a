use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nav_bt::{BehaviorTree, BtNode, BtStatus, Condition, ReactiveSequence, ERROR_CODE};
use nav_core::{ActionRuntime, Blackboard, ErrorCode, TickContext};

fn always_true(_ctx: &TickContext, _bb: &Blackboard) -> bool {
    true
}

fn bench_bt_tick(c: &mut Criterion) {
    let mut children = (0..31)
        .map(|_| Box::new(Condition::new(always_true)) as Box<dyn BtNode>)
        .collect::<Vec<_>>();
    children.push(Box::new(nav_bt::would_a_route_recovery_help_node(
        "recovery",
        ERROR_CODE,
    )));

    let root = ReactiveSequence::new(children);
    let mut blackboard = Blackboard::new();
    blackboard.set(&ERROR_CODE, ErrorCode::Unknown);
    let mut tree = BehaviorTree::new(Box::new(root), blackboard, ActionRuntime::new());

    let mut tick: u64 = 0;
    c.bench_function("nav-bt/tick(conditions=32)", |b| {
        b.iter(|| {
            let status = tree.tick_once(&TickContext::new(tick, 0.1));
            black_box(status == BtStatus::Success);
            tick = tick.wrapping_add(1);
        })
    });
}

criterion_group!(benches, bench_bt_tick);
criterion_main!(benches);
