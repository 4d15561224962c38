//! Condition chains for WHERE / ON / HAVING predicates.
//!
//! A [`ConditionChain`] is an ordered sequence of [`ConditionNode`]s and
//! [`Group`]s, each carrying the [`Connector`] that joins it to its
//! predecessor. Grouping is always explicit: no operator precedence is
//! inferred, wrap a chain in a [`Group`] to parenthesize it.
//!
//! # Example
//! ```
//! use qbkit::condition::{ConditionNode, Group};
//!
//! let chain = ConditionNode::new("a")
//!     .equals("b")
//!     .and(ConditionNode::new("x").is_null())
//!     .or(Group::new(
//!         ConditionNode::new("y").greater_than("1").and(ConditionNode::new("z").less_than("2")),
//!     ));
//!
//! assert_eq!(chain.render(), "a = b AND x IS NULL OR (y > 1 AND z < 2)");
//! ```

use crate::error::{QbError, QbResult};
use std::fmt;

/// Comparison operator of a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `a = b`
    Equals,
    /// `a > b`
    GreaterThan,
    /// `a < b`
    LessThan,
    /// `a >= b`
    GreaterOrEqual,
    /// `a <= b`
    LessOrEqual,
    /// `a IS NULL`
    IsNull,
    /// `a IN (b1,b2,...)`
    In,
}

impl Operator {
    /// SQL literal for this operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::IsNull => "IS NULL",
            Operator::In => "IN",
        }
    }
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Single(String),
    List(Vec<String>),
}

impl Operand {
    fn render(&self) -> String {
        match self {
            Operand::Single(term) => term.clone(),
            Operand::List(terms) => format!("({})", terms.join(",")),
        }
    }
}

/// Boolean connector between a chain element and its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    And,
    Or,
    /// Only valid for the first element of a chain.
    #[default]
    None,
}

impl Connector {
    /// SQL literal (`AND` / `OR`, empty for [`Connector::None`]).
    pub fn as_sql(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
            Connector::None => "",
        }
    }

    /// Connector used for a non-leading element.
    pub(crate) fn or_and(self) -> Self {
        match self {
            Connector::None => Connector::And,
            other => other,
        }
    }
}

/// A single predicate: `term_a <operator> [term_b]`.
///
/// A node without an operator renders as its trimmed `term_a`, which is how
/// hand-written predicate text enters a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionNode {
    term_a: String,
    operator: Option<Operator>,
    term_b: Option<Operand>,
}

impl ConditionNode {
    /// Start a predicate on `term_a`.
    pub fn new(term_a: impl Into<String>) -> Self {
        Self {
            term_a: term_a.into(),
            operator: None,
            term_b: None,
        }
    }

    /// A predicate whose text is used verbatim.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql)
    }

    fn compare(mut self, operator: Operator, term_b: Operand) -> Self {
        self.operator = Some(operator);
        self.term_b = Some(term_b);
        self
    }

    /// `term_a = term_b`
    pub fn equals(self, term_b: impl Into<String>) -> Self {
        self.compare(Operator::Equals, Operand::Single(term_b.into()))
    }

    /// `term_a > term_b`
    pub fn greater_than(self, term_b: impl Into<String>) -> Self {
        self.compare(Operator::GreaterThan, Operand::Single(term_b.into()))
    }

    /// `term_a < term_b`
    pub fn less_than(self, term_b: impl Into<String>) -> Self {
        self.compare(Operator::LessThan, Operand::Single(term_b.into()))
    }

    /// `term_a >= term_b`
    pub fn greater_or_equal(self, term_b: impl Into<String>) -> Self {
        self.compare(Operator::GreaterOrEqual, Operand::Single(term_b.into()))
    }

    /// `term_a <= term_b`
    pub fn less_or_equal(self, term_b: impl Into<String>) -> Self {
        self.compare(Operator::LessOrEqual, Operand::Single(term_b.into()))
    }

    /// `term_a IS NULL`
    pub fn is_null(mut self) -> Self {
        self.operator = Some(Operator::IsNull);
        self.term_b = None;
        self
    }

    /// `term_a IN (v1,v2,...)`
    pub fn in_list<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.compare(Operator::In, Operand::List(values))
    }

    pub fn term_a(&self) -> &str {
        &self.term_a
    }

    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    pub fn term_b(&self) -> Option<&Operand> {
        self.term_b.as_ref()
    }

    /// Render this predicate alone (no connector).
    pub fn render(&self) -> String {
        let operator = self.operator.map(Operator::as_sql).unwrap_or("");
        let term_b = self.term_b.as_ref().map(Operand::render).unwrap_or_default();
        format!("{} {} {}", self.term_a, operator, term_b)
            .trim()
            .to_string()
    }

    /// Start a chain with this node and append `element` with `AND`.
    pub fn and(self, element: impl Into<Element>) -> ConditionChain {
        ConditionChain::from(self).and(element)
    }

    /// Start a chain with this node and append `element` with `OR`.
    pub fn or(self, element: impl Into<Element>) -> ConditionChain {
        ConditionChain::from(self).or(element)
    }
}

impl fmt::Display for ConditionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A parenthesized sub-chain.
#[derive(Debug, Clone, Default)]
pub struct Group {
    inner: ConditionChain,
}

impl Group {
    pub fn new(inner: impl Into<ConditionChain>) -> Self {
        Self {
            inner: inner.into(),
        }
    }

    pub fn inner(&self) -> &ConditionChain {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut ConditionChain {
        &mut self.inner
    }

    pub fn render(&self) -> String {
        format!("({})", self.inner.render())
    }

    /// Start a chain with this group and append `element` with `AND`.
    pub fn and(self, element: impl Into<Element>) -> ConditionChain {
        ConditionChain::from(self).and(element)
    }

    /// Start a chain with this group and append `element` with `OR`.
    pub fn or(self, element: impl Into<Element>) -> ConditionChain {
        ConditionChain::from(self).or(element)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Anything that can sit in a chain.
#[derive(Debug, Clone)]
pub enum Element {
    Node(ConditionNode),
    Group(Group),
}

impl Element {
    pub fn render(&self) -> String {
        match self {
            Element::Node(node) => node.render(),
            Element::Group(group) => group.render(),
        }
    }
}

impl From<ConditionNode> for Element {
    fn from(node: ConditionNode) -> Self {
        Element::Node(node)
    }
}

impl From<Group> for Element {
    fn from(group: Group) -> Self {
        Element::Group(group)
    }
}

impl From<&str> for Element {
    fn from(sql: &str) -> Self {
        Element::Node(ConditionNode::raw(sql))
    }
}

impl From<String> for Element {
    fn from(sql: String) -> Self {
        Element::Node(ConditionNode::raw(sql))
    }
}

/// One linked slot of a [`ConditionChain`].
#[derive(Debug, Clone)]
pub struct ChainElement {
    element: Element,
    connector: Connector,
    previous: Option<usize>,
    next: Option<usize>,
}

impl ChainElement {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn connector(&self) -> Connector {
        self.connector
    }

    /// Arena index of the predecessor.
    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    /// Arena index of the successor.
    pub fn next(&self) -> Option<usize> {
        self.next
    }

    fn render(&self) -> String {
        let body = self.element.render();
        match self.previous {
            Some(_) => format!("{} {}", self.connector.as_sql(), body),
            None => body,
        }
    }
}

/// Ordered AND/OR chain of predicates and groups.
///
/// Elements are stored in an arena and linked by index, so splicing never
/// moves existing elements. The head always carries [`Connector::None`];
/// every later element carries `AND` or `OR`.
#[derive(Debug, Clone, Default)]
pub struct ConditionChain {
    elements: Vec<ChainElement>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl ConditionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append `element` as the new tail with `AND`.
    pub fn and(mut self, element: impl Into<Element>) -> Self {
        self.push(Connector::And, element);
        self
    }

    /// Append `element` as the new tail with `OR`.
    pub fn or(mut self, element: impl Into<Element>) -> Self {
        self.push(Connector::Or, element);
        self
    }

    /// Append `element` as the new tail.
    ///
    /// On an empty chain the element becomes the head and its connector is
    /// forced to [`Connector::None`]; otherwise `None` is read as `AND`.
    pub fn push(&mut self, connector: Connector, element: impl Into<Element>) -> &mut Self {
        let index = self.elements.len();
        let element = element.into();

        match self.tail {
            None => {
                self.elements.push(ChainElement {
                    element,
                    connector: Connector::None,
                    previous: None,
                    next: None,
                });
                self.head = Some(index);
            }
            Some(tail) => {
                self.elements.push(ChainElement {
                    element,
                    connector: connector.or_and(),
                    previous: Some(tail),
                    next: None,
                });
                self.elements[tail].next = Some(index);
            }
        }

        self.tail = Some(index);
        self
    }

    /// Insert `element` right after the element at logical `position`.
    ///
    /// Splicing after the tail makes the new element the tail.
    pub fn splice_after(
        &mut self,
        position: usize,
        connector: Connector,
        element: impl Into<Element>,
    ) -> QbResult<&mut Self> {
        let anchor = self.index_at(position).ok_or_else(|| {
            QbError::invalid_config(format!(
                "cannot splice after position {} in a chain of {} elements",
                position,
                self.len()
            ))
        })?;

        let index = self.elements.len();
        let next = self.elements[anchor].next;

        self.elements.push(ChainElement {
            element: element.into(),
            connector: connector.or_and(),
            previous: Some(anchor),
            next,
        });
        self.elements[anchor].next = Some(index);

        match next {
            Some(successor) => self.elements[successor].previous = Some(index),
            None => self.tail = Some(index),
        }

        Ok(self)
    }

    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, move |&i| self.elements[i].next)
    }

    fn index_at(&self, position: usize) -> Option<usize> {
        self.indices().nth(position)
    }

    /// Elements in link order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainElement> + '_ {
        self.indices().map(move |i| &self.elements[i])
    }

    /// Element at logical `position`.
    pub fn get(&self, position: usize) -> Option<&ChainElement> {
        self.index_at(position).map(|i| &self.elements[i])
    }

    pub fn first(&self) -> Option<&ChainElement> {
        self.head.map(|i| &self.elements[i])
    }

    pub fn last(&self) -> Option<&ChainElement> {
        self.tail.map(|i| &self.elements[i])
    }

    /// Wrap this chain in parentheses.
    pub fn group(self) -> Group {
        Group::new(self)
    }

    /// Render the chain left to right.
    pub fn render(&self) -> String {
        self.iter()
            .map(ChainElement::render)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ConditionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<ConditionNode> for ConditionChain {
    fn from(node: ConditionNode) -> Self {
        let mut chain = ConditionChain::new();
        chain.push(Connector::None, node);
        chain
    }
}

impl From<Group> for ConditionChain {
    fn from(group: Group) -> Self {
        let mut chain = ConditionChain::new();
        chain.push(Connector::None, group);
        chain
    }
}

impl From<&str> for ConditionChain {
    fn from(sql: &str) -> Self {
        ConditionChain::from(ConditionNode::raw(sql))
    }
}

impl From<String> for ConditionChain {
    fn from(sql: String) -> Self {
        ConditionChain::from(ConditionNode::raw(sql))
    }
}
