//! Forest serializer: renders a completed table as a Graphviz DOT digraph.
//!
//! Everything reachable from `(start, whole input)` is rendered as a shared
//! structure rather than unfolded into trees:
//!
//! - production children get plain edges; the two children of a binary
//!   production are grouped in a dashed cluster (one alternative),
//! - side-conditions get dotted edges to a separately expanded *root*,
//! - leaves point at ports of a single record node holding the input.
//!
//! Each root is expanded breadth-first with its own defined-set, and node
//! identifiers carry the root index, so a ref that appears under several
//! roots is rendered once per root without identifier collisions.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::debug;

use super::table::{DerivationRef, DerivationTable, Span};

// ── Configuration ───────────────────────────────────────────────────────

/// Configuration for the forest serializer.
#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Name of the emitted digraph.
    pub graph_name: String,
    /// Append `[start,end)` to every node label.
    pub show_spans: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            graph_name: "ParseTree".to_string(),
            show_spans: false,
        }
    }
}

// ── Public API ──────────────────────────────────────────────────────────

/// Render the parse forest of `table` as DOT text.
///
/// The table's start symbol and alphabet must be configured. Output is
/// deterministic: every set is walked in its natural order.
pub fn emit_dot(table: &DerivationTable, config: &ForestConfig) -> String {
    let mut emitter = Emitter {
        table,
        config,
        out: String::new(),
        roots: VecDeque::new(),
        root_of: BTreeMap::new(),
    };
    emitter.run();
    emitter.out
}

// ── Emitter ─────────────────────────────────────────────────────────────

/// Name of the record node listing the input.
const STRING_NODE: &str = "string";

struct Emitter<'a> {
    table: &'a DerivationTable,
    config: &'a ForestConfig,
    out: String,
    /// Roots waiting for expansion, with their index.
    roots: VecDeque<(DerivationRef, usize)>,
    /// Root index assigned to each ref that was reached as a root.
    root_of: BTreeMap<DerivationRef, usize>,
}

/// Rendering context for one root's expansion.
struct RootScope {
    index: usize,
    defined: BTreeSet<DerivationRef>,
}

impl Emitter<'_> {
    fn run(&mut self) {
        self.out
            .push_str(&format!("digraph {} {{\n", quote_id(&self.config.graph_name)));

        let start = DerivationRef::new(self.table.start(), self.table.full_span());
        self.root_index(start);
        let mut expanded = 0usize;
        while let Some((root, index)) = self.roots.pop_front() {
            self.expand(root, index);
            expanded += 1;
        }
        debug!("forest: expanded {expanded} root(s)");

        self.emit_string_node();
        self.out.push_str("}\n");
    }

    /// Index of the root copy for `r`, scheduling a new root if needed.
    fn root_index(&mut self, r: DerivationRef) -> usize {
        if let Some(&index) = self.root_of.get(&r) {
            return index;
        }
        let index = self.root_of.len();
        self.root_of.insert(r, index);
        self.roots.push_back((r, index));
        index
    }

    fn expand(&mut self, root: DerivationRef, index: usize) {
        let mut scope = RootScope {
            index,
            defined: BTreeSet::from([root]),
        };
        self.out.push('\n');
        self.define(root, index, "\t");

        let table = self.table;
        let mut queue = VecDeque::from([root]);
        while let Some(r) = queue.pop_front() {
            let Some(node) = table.try_get(r.span, r.symbol) else {
                continue;
            };
            let from = node_id(r, scope.index);

            for &context in &node.contexts {
                let target = self.root_index(context);
                self.out.push_str(&format!(
                    "\t{from} -> {} [style=\"dotted\"];\n",
                    node_id(context, target)
                ));
            }

            for (alt, production) in node.productions.iter().enumerate() {
                let fresh: Vec<DerivationRef> = production
                    .iter()
                    .copied()
                    .filter(|&child| scope.defined.insert(child))
                    .collect();
                if production.len() == 1 {
                    for &child in &fresh {
                        self.define(child, scope.index, "\t");
                    }
                } else if !fresh.is_empty() {
                    self.out.push_str(&format!(
                        "\tsubgraph cluster_{from}_alt{alt} {{\n\t\tcolor=blue style=dashed\n"
                    ));
                    for &child in &fresh {
                        self.define(child, scope.index, "\t\t");
                    }
                    self.out.push_str("\t}\n");
                }
                queue.extend(fresh);

                for &child in production {
                    self.out
                        .push_str(&format!("\t{from} -> {};\n", node_id(child, scope.index)));
                }
            }

            if r.span.len() == 1 && node.is_leaf() {
                self.out
                    .push_str(&format!("\t{from} -> {STRING_NODE}:{};\n", r.span.start));
            }
        }
    }

    fn define(&mut self, r: DerivationRef, index: usize, indent: &str) {
        let mut label = self.table.alphabet().label(r.symbol);
        if self.config.show_spans {
            label.push_str(&format!(" {}", r.span));
        }
        self.out.push_str(&format!(
            "{indent}{} [label=\"{}\"];\n",
            node_id(r, index),
            escape_label(&label)
        ));
    }

    /// The input as one record node, one port per leaf in position order.
    fn emit_string_node(&mut self) {
        let mut fields = String::from("|");
        for i in 0..self.table.size() {
            for (symbol, node) in self.table.cell(Span::new(i, i + 1)) {
                if node.is_leaf() {
                    let text = self.table.alphabet().label(symbol);
                    fields.push_str(&format!(" <{i}> {} |", escape_record(&text)));
                }
            }
        }
        self.out.push_str(&format!(
            "\n\t{STRING_NODE} [shape=\"record\", label=\"{fields}\"];\n"
        ));
    }
}

fn node_id(r: DerivationRef, root: usize) -> String {
    format!("v{}_{}_{}_{}", r.symbol.0, r.span.start, r.span.end, root)
}

/// Bare DOT identifier when possible, quoted string otherwise.
fn quote_id(name: &str) -> String {
    let bare = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if bare {
        name.to_string()
    } else {
        format!("\"{}\"", escape_label(name))
    }
}

/// Escape text for a double-quoted DOT string.
fn escape_label(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c if c.is_control() => out.extend(c.escape_default()),
            c => out.push(c),
        }
    }
    out
}

/// Escape text for a field of a record-shaped node inside a quoted label.
fn escape_record(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().flat_map(|c| {
        let visible: Vec<char> = if c.is_control() {
            c.escape_default().collect()
        } else {
            vec![c]
        };
        visible
    }) {
        match ch {
            '{' | '}' | '|' | '<' | '>' | ' ' => {
                out.push('\\');
                out.push(ch);
            }
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}
