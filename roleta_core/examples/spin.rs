use roleta_core::{seed_fingerprint, ItemList, SeededSource, WheelSession};

fn main() {
    // Example end-to-end spin with a reproducible seed
    let seed = "example-seed";
    let mut items = ItemList::new();
    items.add("Chess").expect("valid item");
    items.add("Reading").expect("valid item");
    items.add_weighted("Running", 2.0).expect("valid item");

    let mut source = SeededSource::new(seed);
    let mut session = WheelSession::new();
    let target = session.spin(&items, &mut source).expect("non-empty list");
    let outcome = session.settle().expect("one spin pending");
    println!(
        "seed_fingerprint={} target={:.2} selected={}",
        seed_fingerprint(seed),
        target,
        outcome.selected.name
    );
}
