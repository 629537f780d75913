//! A reader thread samples the published state while the owner keeps committing.
use cowstate::StateRoot;
use std::{sync::mpsc, thread, time::Duration};

fn main() {
    let mut root = StateRoot::new(Vec::<u32>::new());
    let reader = root.reader();
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    let sampler = thread::spawn(move || {
        while stop_rx.try_recv().is_err() {
            let snapshot = reader.detach();
            println!("reader sees {} entries", snapshot.len());
            thread::sleep(Duration::from_millis(5));
        }
    });

    for i in 0..20 {
        let mut tx = root.transaction();
        tx.push(i);
        drop(tx);
        thread::sleep(Duration::from_millis(2));
    }
    let _ = stop_tx.send(());
    if sampler.join().is_err() {
        eprintln!("reader thread panicked");
    }

    println!("final: {:?}", *root.detach());
}
