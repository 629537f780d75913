use cowstate::{Node, Outcome, StateRoot};

#[derive(Debug, Clone)]
struct Profile {
    name: Node<String>,
    age: Node<u32>,
    active: Node<bool>,
}

fn main() {
    let mut root = StateRoot::new(Profile {
        name: Node::new("Alice".to_string()),
        age: Node::new(30),
        active: Node::new(true),
    });

    root.subscribe(|root: &StateRoot<Profile>| {
        let profile = root.detach();
        println!("committed: {} ({})", *profile.name, *profile.age);
    });

    // Committed when the transaction goes out of scope
    {
        let mut tx = root.transaction();
        tx.age.set(31u32);
    }

    // Cancelled transactions leave the published value untouched
    {
        let mut tx = root.transaction();
        tx.name.set("Mallory");
        tx.cancel();
    }
    println!("after cancel: {}", *root.detach().name);

    // The closure form commits on Ok and rolls back on Err
    let result = root.transact(|profile| {
        profile.active.set(false);
        if *profile.age > 30 {
            return Err("cannot deactivate");
        }
        Ok(())
    });
    println!("transact: {result:?}, active: {}", *root.detach().active);

    let tx = root.transaction();
    assert_eq!(tx.rollback(), Outcome::RolledBack);

    println!("\nfinal: {:?}", *root.detach());
}
