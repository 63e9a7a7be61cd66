//! Stepwise script execution with snapshot history
//!
//! A [`Session`] runs every step of a parsed script up front, capturing a
//! full [`Snapshot`] after each one. The TUI then scrubs the history
//! forward and backward without re-executing anything.
//!
//! Allocator failures are part of the show, not a reason to stop: a
//! rejected double free or an out-of-memory allocation is logged against
//! its script line and execution continues. Only parsing (done before a
//! session exists) can abort a script.

use super::{Command, Step};
use crate::heap::{Address, Heap};
use rustc_hash::FxHashMap;

/// A live pointer binding: payload address plus the requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    pub address: Address,
    pub size: usize,
}

/// One line of session output, tied to the script line that produced it.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub text: String,
    pub line: usize,
    pub is_error: bool,
}

/// Full state after some prefix of the script has run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// `None` until an `init` step has succeeded.
    pub heap: Option<Heap>,
    /// Name → pointer bindings currently live.
    pub pointers: FxHashMap<String, Pointer>,
    /// Output accumulated so far (dump tables, results, errors).
    pub log: Vec<LogLine>,
}

impl Snapshot {
    fn empty() -> Self {
        Snapshot {
            heap: None,
            pointers: FxHashMap::default(),
            log: Vec::new(),
        }
    }
}

/// Executes a script and holds its snapshot history.
pub struct Session {
    steps: Vec<Step>,
    /// `snapshots[i]` is the state after `i` steps; index 0 is pristine.
    snapshots: Vec<Snapshot>,
    /// Index of the current snapshot.
    position: usize,
}

impl Session {
    /// Execute every step of `steps`, building the full history.
    pub fn run(steps: Vec<Step>) -> Self {
        let mut snapshots = vec![Snapshot::empty()];

        for step in &steps {
            let mut next = snapshots
                .last()
                .expect("history always has an initial snapshot")
                .clone();
            execute(&mut next, step);
            snapshots.push(next);
        }

        Session {
            steps,
            snapshots,
            position: 0,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of snapshots, including the pristine one.
    pub fn total_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// State at the current position.
    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.position]
    }

    /// Final state, with the complete log.
    pub fn last(&self) -> &Snapshot {
        self.snapshots
            .last()
            .expect("history always has an initial snapshot")
    }

    /// Source line of the step about to execute, if any.
    pub fn current_line(&self) -> Option<usize> {
        self.steps.get(self.position).map(|step| step.line)
    }

    /// Advance one step. Returns false at the end of the history.
    pub fn step_forward(&mut self) -> bool {
        if self.position + 1 < self.snapshots.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Go back one step. Returns false at the start.
    pub fn step_backward(&mut self) -> bool {
        if self.position > 0 {
            self.position -= 1;
            true
        } else {
            false
        }
    }

    pub fn rewind_to_start(&mut self) {
        self.position = 0;
    }

    pub fn jump_to_end(&mut self) {
        self.position = self.snapshots.len() - 1;
    }
}

/// Apply one step to a snapshot, appending to its log.
fn execute(snapshot: &mut Snapshot, step: &Step) {
    let line = step.line;

    match &step.command {
        Command::Init { size } => {
            if snapshot.heap.is_some() {
                error(snapshot, line, "heap already initialized".to_string());
                return;
            }
            match Heap::new(*size) {
                Ok(heap) => {
                    info(
                        snapshot,
                        line,
                        format!(
                            "initialized {}-byte region ({} usable)",
                            heap.region_size(),
                            heap.usable_size()
                        ),
                    );
                    snapshot.heap = Some(heap);
                }
                Err(e) => error(snapshot, line, e.to_string()),
            }
        }

        Command::Alloc { name, size } => {
            let Some(heap) = snapshot.heap.as_mut() else {
                error(snapshot, line, "heap not initialized".to_string());
                return;
            };
            match heap.allocate(*size) {
                Ok(address) => {
                    snapshot.pointers.insert(
                        name.clone(),
                        Pointer {
                            address,
                            size: *size,
                        },
                    );
                    info(
                        snapshot,
                        line,
                        format!("{} = 0x{:08x} ({} bytes)", name, address, size),
                    );
                }
                Err(e) => error(snapshot, line, e.to_string()),
            }
        }

        Command::Free { name, keep_binding } => {
            let Some(pointer) = snapshot.pointers.get(name).copied() else {
                error(snapshot, line, format!("unknown pointer '{}'", name));
                return;
            };
            let Some(heap) = snapshot.heap.as_mut() else {
                error(snapshot, line, "heap not initialized".to_string());
                return;
            };
            match heap.release(pointer.address) {
                Ok(()) => {
                    if !keep_binding {
                        snapshot.pointers.remove(name);
                    }
                    info(
                        snapshot,
                        line,
                        format!("freed {} (0x{:08x})", name, pointer.address),
                    );
                }
                Err(e) => error(snapshot, line, e.to_string()),
            }
        }

        Command::Dump => {
            let Some(heap) = snapshot.heap.as_ref() else {
                error(snapshot, line, "heap not initialized".to_string());
                return;
            };
            let table = heap.dump_to_string();
            for text in table.lines() {
                snapshot.log.push(LogLine {
                    text: text.to_string(),
                    line,
                    is_error: false,
                });
            }
        }
    }
}

fn info(snapshot: &mut Snapshot, line: usize, text: String) {
    snapshot.log.push(LogLine {
        text,
        line,
        is_error: false,
    });
}

fn error(snapshot: &mut Snapshot, line: usize, text: String) {
    snapshot.log.push(LogLine {
        text: format!("error: {}", text),
        line,
        is_error: true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;

    fn run(source: &str) -> Session {
        let steps = parse_script(source).expect("parse failed");
        Session::run(steps)
    }

    #[test]
    fn test_snapshots_accumulate_per_step() {
        let session = run("init 4096\np = alloc 20\nfree p");
        assert_eq!(session.total_snapshots(), 4);

        assert!(session.current().heap.is_none());

        let after_init = &session.snapshots[1];
        assert!(after_init.heap.is_some());
        assert!(after_init.pointers.is_empty());

        let after_alloc = &session.snapshots[2];
        assert_eq!(after_alloc.pointers.len(), 1);
        assert_eq!(after_alloc.pointers["p"].address, 8);

        let after_free = &session.snapshots[3];
        assert!(after_free.pointers.is_empty());
    }

    #[test]
    fn test_navigation() {
        let mut session = run("init 4096\np = alloc 20");
        assert_eq!(session.current_line(), Some(1));

        assert!(session.step_forward());
        assert!(session.step_forward());
        assert!(!session.step_forward());
        assert_eq!(session.position(), 2);
        assert_eq!(session.current_line(), None);

        assert!(session.step_backward());
        assert_eq!(session.position(), 1);

        session.rewind_to_start();
        assert_eq!(session.position(), 0);
        session.jump_to_end();
        assert_eq!(session.position(), 2);
    }

    #[test]
    fn test_double_init_is_logged_not_fatal() {
        let session = run("init 4096\ninit 4096\np = alloc 20");
        let last = session.last();
        assert!(last.log.iter().any(|l| l.is_error));
        // The later alloc still ran against the first heap
        assert_eq!(last.pointers.len(), 1);
    }

    #[test]
    fn test_double_free_demo() {
        let session = run("init 4096\np = alloc 20\nfree p !\nfree p !");
        let last = session.last();

        let errors: Vec<_> = last.log.iter().filter(|l| l.is_error).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].text.contains("not allocated"));
    }

    #[test]
    fn test_unknown_pointer_and_missing_init() {
        let session = run("free p\ninit 4096\nfree q");
        let last = session.last();
        let errors: Vec<_> = last.log.iter().filter(|l| l.is_error).collect();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_dump_goes_to_the_log() {
        let session = run("init 4096\np = alloc 20\ndump");
        let last = session.last();
        assert!(last.log.iter().any(|l| l.text.contains("Block list")));
        assert!(last
            .log
            .iter()
            .any(|l| l.text.contains("Total used size = 24")));
    }
}
