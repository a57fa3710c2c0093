//! Cycle release for shared runtime objects.
//!
//! Frames captured by closures, classes and instances are reference counted
//! and can reach themselves (a function stored in the frame it closes over,
//! an instance holding one of its own bound methods). The interpreter
//! registers each such object here through a weak handle; when the
//! interpreter goes away every object still alive has its bindings emptied,
//! which breaks the cycles and lets the counts fall to zero.

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::class::{Class, Instance};
use crate::environment::{EnvRef, Environment};
use crate::value::Value;

/// Registrations between sweeps of dead weak handles.
const PRUNE_INTERVAL: usize = 1024;

#[derive(Default)]
pub struct Reclaimer {
    frames: Vec<Weak<RefCell<Environment>>>,
    classes: Vec<Weak<Class>>,
    instances: Vec<Weak<RefCell<Instance>>>,
    since_prune: usize,
}

impl Reclaimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_frame(&mut self, frame: &EnvRef) {
        // A frame captured by several closures only needs one entry.
        if self
            .frames
            .last()
            .is_some_and(|last| std::ptr::eq(last.as_ptr(), Rc::as_ptr(frame)))
        {
            return;
        }

        self.frames.push(Rc::downgrade(frame));
        self.tick();
    }

    pub fn track_class(&mut self, class: &Rc<Class>) {
        self.classes.push(Rc::downgrade(class));
        self.tick();
    }

    pub fn track_instance(&mut self, instance: &Rc<RefCell<Instance>>) {
        self.instances.push(Rc::downgrade(instance));
        self.tick();
    }

    /// Number of registered objects that are still alive.
    pub fn live(&self) -> usize {
        let frames = self.frames.iter().filter(|w| w.strong_count() > 0).count();
        let classes = self.classes.iter().filter(|w| w.strong_count() > 0).count();
        let instances = self
            .instances
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count();

        frames + classes + instances
    }

    /// Forget handles whose objects have already been freed.
    pub fn prune(&mut self) {
        self.frames.retain(|w| w.strong_count() > 0);
        self.classes.retain(|w| w.strong_count() > 0);
        self.instances.retain(|w| w.strong_count() > 0);
        self.since_prune = 0;

        debug!("Reclaimer pruned; {} handle(s) remain", self.handles());
    }

    /// Empty every live object's bindings. Returns how many were emptied.
    pub fn release(&mut self) -> usize {
        let mut released: usize = 0;
        // Values are dropped only after each borrow ends, since dropping one
        // may free (and borrow) another registered object.
        let mut graveyard: Vec<Value> = Vec::new();

        for frame in mem::take(&mut self.frames) {
            if let Some(frame) = frame.upgrade() {
                let values = frame.borrow_mut().clear();
                graveyard.extend(values);
                released += 1;
            }
        }

        for instance in mem::take(&mut self.instances) {
            if let Some(instance) = instance.upgrade() {
                let values = instance.borrow_mut().take_fields();
                graveyard.extend(values);
                released += 1;
            }
        }

        for class in mem::take(&mut self.classes) {
            if let Some(class) = class.upgrade() {
                graveyard.extend(class.take_fields());
                released += 1;
            }
        }

        let mut nested: Vec<Value> = Vec::new();
        for value in graveyard.iter() {
            match value {
                Value::Tuple(tuple) => {
                    let items = tuple.borrow_mut().take();
                    nested.extend(items);
                }
                Value::Map(map) => {
                    let items = map.borrow_mut().take();
                    nested.extend(items);
                }
                _ => {}
            }
        }

        drop(graveyard);
        drop(nested);

        info!("Reclaimer released {} object(s)", released);

        released
    }

    fn handles(&self) -> usize {
        self.frames.len() + self.classes.len() + self.instances.len()
    }

    fn tick(&mut self) {
        self.since_prune += 1;

        if self.since_prune >= PRUNE_INTERVAL {
            self.prune();
        }
    }
}

impl Drop for Reclaimer {
    fn drop(&mut self) {
        self.release();
    }
}
