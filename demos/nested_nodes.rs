//! Shows which payloads are copied when a deeply nested value is written.
use cowstate::{Node, OptNode, StateRoot};

#[derive(Debug, Clone)]
struct Task {
    title: Node<String>,
    done: Node<bool>,
}

#[derive(Debug, Clone)]
struct Project {
    name: Node<String>,
    tasks: Node<Vec<Node<Task>>>,
    owner: OptNode<String>,
}

fn task(title: &str) -> Node<Task> {
    Node::new(Task {
        title: Node::new(title.to_string()),
        done: Node::new(false),
    })
}

fn main() {
    let mut root = StateRoot::new(Project {
        name: Node::new("TaskManager".to_string()),
        tasks: Node::new(vec![task("design"), task("build"), task("ship")]),
        owner: OptNode::none(),
    });

    let before = root.detach();
    {
        let mut tx = root.transaction();
        tx.tasks[1].done.set(true);
        tx.owner.set("bob");
    }
    let after = root.detach();

    // Only the path from the root to the written leaf was copied
    println!("project name shared: {}", before.name == after.name);
    println!("task list shared:    {}", before.tasks == after.tasks);
    for (old, new) in before.tasks.iter().zip(after.tasks.iter()) {
        println!(
            "  {:<8} shared: {:<5} done: {} -> {}",
            *new.title,
            old == new,
            *old.done,
            *new.done
        );
    }
    println!("owner: {:?} -> {:?}", before.owner.get(), after.owner.get());
}
