use std::cell::Cell;
use std::rc::Rc;

use nav_bt::{BtNode, BtStatus, Condition, MemSelector, MemSequence, Selector, Sequence};
use nav_core::{ActionRuntime, BbKey, Blackboard, TickContext};

const GATE: BbKey<bool> = BbKey::new("gate");

/// Leaf returning a fixed status and counting ticks and resets.
struct StubLeaf {
    status: BtStatus,
    ticks: Rc<Cell<u32>>,
    resets: Rc<Cell<u32>>,
}

#[derive(Clone, Default)]
struct Counts {
    ticks: Rc<Cell<u32>>,
    resets: Rc<Cell<u32>>,
}

impl Counts {
    fn leaf(&self, status: BtStatus) -> Box<dyn BtNode> {
        Box::new(StubLeaf {
            status,
            ticks: self.ticks.clone(),
            resets: self.resets.clone(),
        })
    }
}

impl BtNode for StubLeaf {
    fn tick(&mut self, _: &TickContext, _: &mut Blackboard, _: &mut ActionRuntime) -> BtStatus {
        self.ticks.set(self.ticks.get() + 1);
        self.status
    }

    fn reset(&mut self) {
        self.resets.set(self.resets.get() + 1);
    }
}

fn gate_open(_ctx: &TickContext, bb: &Blackboard) -> bool {
    bb.get(&GATE).ok().flatten().copied().unwrap_or(false)
}

fn tick(node: &mut dyn BtNode, bb: &mut Blackboard, tick: u64) -> BtStatus {
    node.tick(&TickContext::new(tick, 0.1), bb, &mut ActionRuntime::new())
}

#[test]
fn reactive_sequence_aborts_and_halts_the_running_child() {
    let running = Counts::default();
    let mut node = Sequence::new(vec![
        Box::new(Condition::new(gate_open)),
        running.leaf(BtStatus::Running),
    ]);
    let mut bb = Blackboard::new();
    bb.set(&GATE, true);

    assert_eq!(tick(&mut node, &mut bb, 0), BtStatus::Running);
    assert_eq!(tick(&mut node, &mut bb, 1), BtStatus::Running);
    assert_eq!(running.resets.get(), 0);

    bb.set(&GATE, false);
    assert_eq!(tick(&mut node, &mut bb, 2), BtStatus::Failure);
    assert_eq!(running.ticks.get(), 2);
    assert_eq!(running.resets.get(), 1);
}

#[test]
fn reactive_fallback_halts_a_lower_priority_child_when_a_higher_one_runs() {
    let high = Counts::default();
    let low = Counts::default();
    let mut bb = Blackboard::new();
    bb.set(&GATE, false);
    let mut node = Selector::new(vec![
        Box::new(MemSequence::new(vec![
            Box::new(Condition::new(gate_open)),
            high.leaf(BtStatus::Running),
        ])),
        low.leaf(BtStatus::Running),
    ]);

    assert_eq!(tick(&mut node, &mut bb, 0), BtStatus::Running);
    assert_eq!((low.ticks.get(), low.resets.get()), (1, 0));

    bb.set(&GATE, true);
    assert_eq!(tick(&mut node, &mut bb, 1), BtStatus::Running);
    assert_eq!(high.ticks.get(), 1);
    assert_eq!((low.ticks.get(), low.resets.get()), (1, 1));
}

#[test]
fn memory_sequence_resumes_without_rechecking_earlier_children() {
    let running = Counts::default();
    let mut bb = Blackboard::new();
    bb.set(&GATE, true);
    let mut node = MemSequence::new(vec![
        Box::new(Condition::new(gate_open)),
        running.leaf(BtStatus::Running),
    ]);

    assert_eq!(tick(&mut node, &mut bb, 0), BtStatus::Running);
    bb.set(&GATE, false);
    assert_eq!(tick(&mut node, &mut bb, 1), BtStatus::Running);
    assert_eq!(running.ticks.get(), 2);
    assert_eq!(running.resets.get(), 0);
}

#[test]
fn flows_report_decisive_and_exhausted_outcomes() {
    let counts = Counts::default();
    let mut bb = Blackboard::new();

    let mut fallback = MemSelector::new(vec![
        counts.leaf(BtStatus::Failure),
        counts.leaf(BtStatus::Success),
        counts.leaf(BtStatus::Failure),
    ]);
    assert_eq!(tick(&mut fallback, &mut bb, 0), BtStatus::Success);
    assert_eq!(counts.ticks.get(), 2);

    let mut all_fail = Selector::new(vec![counts.leaf(BtStatus::Failure)]);
    assert_eq!(tick(&mut all_fail, &mut bb, 1), BtStatus::Failure);

    let mut all_succeed = Sequence::new(vec![
        counts.leaf(BtStatus::Success),
        counts.leaf(BtStatus::Success),
    ]);
    assert_eq!(tick(&mut all_succeed, &mut bb, 2), BtStatus::Success);
}
