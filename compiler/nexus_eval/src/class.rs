//! Runtime representation of classes and instances.
//!
//! A class is an immutable node in a reference graph: name, optional
//! superclass link, and a method table. Instances hold a non-owning
//! (shared) class reference plus their own mutable field map. Method
//! resolution is an explicit ancestor-chain walk; the hierarchy is
//! fixed at declaration time and small.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use nexus_ir::Name;

use crate::function::FunctionValue;
use crate::Value;

/// A declared class.
#[derive(Debug)]
pub struct ClassValue {
    pub name: Name,
    pub superclass: Option<Rc<ClassValue>>,
    pub methods: FxHashMap<Name, Rc<FunctionValue>>,
}

impl ClassValue {
    /// Resolve a method by walking this class then its ancestors.
    pub fn find_method(&self, name: Name) -> Option<Rc<FunctionValue>> {
        if let Some(method) = self.methods.get(&name) {
            return Some(Rc::clone(method));
        }
        let mut ancestor = self.superclass.as_ref();
        while let Some(class) = ancestor {
            if let Some(method) = class.methods.get(&name) {
                return Some(Rc::clone(method));
            }
            ancestor = class.superclass.as_ref();
        }
        None
    }
}

/// An instance of a class: shared class reference plus field map.
///
/// The field map starts empty (an `init` method may populate it) and is
/// freely mutable through `Set` expressions afterwards.
#[derive(Debug)]
pub struct InstanceValue {
    pub class: Rc<ClassValue>,
    pub fields: FxHashMap<Name, Value>,
}

impl InstanceValue {
    pub fn new(class: Rc<ClassValue>) -> Self {
        InstanceValue {
            class,
            fields: FxHashMap::default(),
        }
    }

    /// Read a field. Missing fields are `None`; the interpreter maps
    /// that to `null` (or a method, in call position).
    pub fn get_field(&self, name: Name) -> Option<Value> {
        self.fields.get(&name).cloned()
    }

    /// Write a field, creating it if absent.
    pub fn set_field(&mut self, name: Name, value: Value) {
        self.fields.insert(name, value);
    }
}
