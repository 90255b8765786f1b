//! Named holes in templates and the values bound to them.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use rewrite_python_lst::tree::Tree;

type Constraint = Rc<dyn Fn(&Tree) -> bool>;

/// A named placeholder, written `{name}` in template code.
///
/// A variadic capture stands for a run of list elements (call arguments,
/// collection elements, statements) and binds to all of them.
#[derive(Clone)]
pub struct Capture {
    name: String,
    variadic: Option<(usize, Option<usize>)>,
    constraint: Option<Constraint>,
    type_hint: Option<String>,
}

impl Capture {
    pub fn new(name: impl Into<String>) -> Self {
        Capture {
            name: name.into(),
            variadic: None,
            constraint: None,
            type_hint: None,
        }
    }

    /// Binds `min..=max` list elements; `max` of `None` is unbounded.
    pub fn variadic(mut self, min: usize, max: Option<usize>) -> Self {
        self.variadic = Some((min, max));
        self
    }

    /// Only matches subtrees accepted by `predicate`. For variadic captures
    /// every element must be accepted.
    pub fn with_constraint(mut self, predicate: impl Fn(&Tree) -> bool + 'static) -> Self {
        self.constraint = Some(Rc::new(predicate));
        self
    }

    /// Records the type the capture is expected to have. Trees carry no
    /// type information, so this is documentation for the host.
    pub fn with_type_hint(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    /// Whether `count` elements satisfy the variadic bounds.
    pub(crate) fn accepts_count(&self, count: usize) -> bool {
        match self.variadic {
            Some((min, max)) => count >= min && max.is_none_or(|max| count <= max),
            None => count == 1,
        }
    }

    pub(crate) fn accepts(&self, tree: &Tree) -> bool {
        self.constraint.as_ref().is_none_or(|predicate| predicate(tree))
    }
}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capture")
            .field("name", &self.name)
            .field("variadic", &self.variadic)
            .field("constrained", &self.constraint.is_some())
            .field("type_hint", &self.type_hint)
            .finish()
    }
}

/// What a capture is bound to.
#[derive(Clone, Debug)]
pub enum Bound {
    One(Tree),
    Many(Vec<Tree>),
}

/// Values for a template's captures: the result of a successful match, or
/// values supplied by hand before applying a template.
#[derive(Clone, Debug, Default)]
pub struct Captured {
    values: HashMap<String, Bound>,
}

impl Captured {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to one subtree.
    pub fn with(mut self, name: impl Into<String>, tree: impl Into<Tree>) -> Self {
        self.values.insert(name.into(), Bound::One(tree.into()));
        self
    }

    /// Binds `name` to a run of list elements.
    pub fn with_all(mut self, name: impl Into<String>, trees: Vec<Tree>) -> Self {
        self.values.insert(name.into(), Bound::Many(trees));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Tree> {
        match self.values.get(name)? {
            Bound::One(tree) => Some(tree),
            Bound::Many(_) => None,
        }
    }

    pub fn get_all(&self, name: &str) -> Option<&[Tree]> {
        match self.values.get(name)? {
            Bound::Many(trees) => Some(trees),
            Bound::One(tree) => Some(std::slice::from_ref(tree)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn bound(&self, name: &str) -> Option<&Bound> {
        self.values.get(name)
    }

    pub(crate) fn bind(&mut self, name: &str, bound: Bound) {
        self.values.insert(name.to_string(), bound);
    }
}
