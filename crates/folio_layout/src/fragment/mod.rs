//! Text fragmentation
//!
//! Splits a rich text tree into one token per character so each character
//! can be animated on its own. The tree is never modified: fragmentation is
//! a pure pass producing an ordered token list plus the list of styled
//! wrappers, and each token records which wrappers enclose it. A renderer
//! draws every token inside its wrappers, so the wrapper styling still
//! scopes exactly the characters it scoped in the source.
//!
//! ```
//! use folio_layout::fragment::{fragment, FragmentOptions, RichTree};
//!
//! let tree = RichTree::parse(r#"<span class="accent">Hi</span> there"#);
//! let tokens = fragment(&tree, &FragmentOptions::default());
//!
//! let text: String = tokens.iter().map(|t| t.ch).collect();
//! assert_eq!(text, "Hi\u{00A0}there");
//! assert_eq!(tokens[0].scope.len(), 1);
//! assert!(tokens[2].scope.is_empty());
//! ```

pub mod parser;

use std::cell::{Cell, OnceCell};
use std::ops::Range;

use folio_animation::TargetId;
use smallvec::SmallVec;

/// Non-breaking space substituted for literal spaces
pub const NBSP: char = '\u{00A0}';

/// A node of a rich text tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RichNode {
    Text(String),
    Element {
        tag: String,
        class: Option<String>,
        children: Vec<RichNode>,
    },
}

/// An immutable rich text tree
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RichTree {
    pub nodes: Vec<RichNode>,
}

impl RichTree {
    pub fn new(nodes: Vec<RichNode>) -> Self {
        Self { nodes }
    }

    /// Parse HTML-like markup
    pub fn parse(markup: &str) -> Self {
        Self::new(parser::parse(markup))
    }

    /// True when the tree holds no characters at all
    pub fn is_empty(&self) -> bool {
        fn has_text(nodes: &[RichNode]) -> bool {
            nodes.iter().any(|node| match node {
                RichNode::Text(text) => !text.is_empty(),
                RichNode::Element { children, .. } => has_text(children),
            })
        }
        !has_text(&self.nodes)
    }

    /// Concatenated text of every leaf run
    pub fn plain_text(&self) -> String {
        fn collect(nodes: &[RichNode], out: &mut String) {
            for node in nodes {
                match node {
                    RichNode::Text(text) => out.push_str(text),
                    RichNode::Element { children, .. } => collect(children, out),
                }
            }
        }
        let mut out = String::new();
        collect(&self.nodes, &mut out);
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentOptions {
    /// Replace literal spaces with U+00A0 so they do not collapse
    pub substitute_nbsp: bool,
    /// Leave whitespace-only runs out of the animation set
    ///
    /// Their tokens are still emitted so the rendered text is unchanged.
    pub skip_blank_runs: bool,
}

impl Default for FragmentOptions {
    fn default() -> Self {
        Self {
            substitute_nbsp: true,
            skip_blank_runs: false,
        }
    }
}

/// One character of fragmented text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharToken {
    /// Position in the token list (document order)
    pub index: usize,
    /// Character to render
    pub ch: char,
    /// Character as it appeared in the source
    pub source: char,
    /// Index of the leaf text run this character came from
    pub run: usize,
    /// Enclosing wrappers, outermost first (indices into the wrapper list)
    pub scope: SmallVec<[usize; 4]>,
    /// False for tokens rendered in place without an entrance
    pub animated: bool,
}

impl CharToken {
    /// Animation target for this token
    pub fn target_id(&self, prefix: &str) -> TargetId {
        TargetId::indexed(prefix, self.index)
    }
}

/// A styled element enclosing some tokens
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wrapper {
    pub tag: String,
    pub class: Option<String>,
    /// Nesting depth, 0 for top-level wrappers
    pub depth: usize,
    /// Tokens this wrapper encloses
    pub tokens: Range<usize>,
}

/// Output of a fragmentation pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragmentation {
    pub tokens: Vec<CharToken>,
    pub wrappers: Vec<Wrapper>,
    /// Number of leaf runs that produced tokens
    pub runs: usize,
}

impl Fragmentation {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Animation targets for every token, in document order
    pub fn target_ids(&self, prefix: &str) -> Vec<TargetId> {
        self.tokens.iter().map(|t| t.target_id(prefix)).collect()
    }

    /// Targets of the tokens that take part in the entrance
    pub fn animated_target_ids(&self, prefix: &str) -> Vec<TargetId> {
        self.tokens
            .iter()
            .filter(|t| t.animated)
            .map(|t| t.target_id(prefix))
            .collect()
    }

    /// Source text reassembled from the tokens
    pub fn source_text(&self) -> String {
        self.tokens.iter().map(|t| t.source).collect()
    }
}

struct Fragmenter<'o> {
    options: &'o FragmentOptions,
    out: Fragmentation,
    scope: SmallVec<[usize; 4]>,
}

impl Fragmenter<'_> {
    fn walk(&mut self, nodes: &[RichNode]) {
        for node in nodes {
            match node {
                RichNode::Text(text) => self.emit_run(text),
                RichNode::Element {
                    tag,
                    class,
                    children,
                } => {
                    let wrapper = self.out.wrappers.len();
                    let start = self.out.tokens.len();
                    self.out.wrappers.push(Wrapper {
                        tag: tag.clone(),
                        class: class.clone(),
                        depth: self.scope.len(),
                        tokens: start..start,
                    });

                    self.scope.push(wrapper);
                    self.walk(children);
                    self.scope.pop();

                    let end = self.out.tokens.len();
                    self.out.wrappers[wrapper].tokens = start..end;
                }
            }
        }
    }

    fn emit_run(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let animated = !(self.options.skip_blank_runs && text.trim().is_empty());

        let run = self.out.runs;
        self.out.runs += 1;
        for source in text.chars() {
            let ch = if self.options.substitute_nbsp && source == ' ' {
                NBSP
            } else {
                source
            };
            let index = self.out.tokens.len();
            self.out.tokens.push(CharToken {
                index,
                ch,
                source,
                run,
                scope: self.scope.clone(),
                animated,
            });
        }
    }
}

/// Fragment a tree, returning tokens and wrappers
pub fn fragment_tree(tree: &RichTree, options: &FragmentOptions) -> Fragmentation {
    let mut fragmenter = Fragmenter {
        options,
        out: Fragmentation::default(),
        scope: SmallVec::new(),
    };
    fragmenter.walk(&tree.nodes);
    fragmenter.out
}

/// Fragment a tree into ordered character tokens
///
/// An empty tree produces an empty list.
pub fn fragment(tree: &RichTree, options: &FragmentOptions) -> Vec<CharToken> {
    fragment_tree(tree, options).tokens
}

/// Rich text as mounted on the page
///
/// Fragmentation runs lazily, exactly once for the lifetime of the mount.
pub struct MountedText {
    tree: RichTree,
    options: FragmentOptions,
    fragments: OnceCell<Fragmentation>,
    passes: Cell<u32>,
}

impl MountedText {
    pub fn new(tree: RichTree, options: FragmentOptions) -> Self {
        Self {
            tree,
            options,
            fragments: OnceCell::new(),
            passes: Cell::new(0),
        }
    }

    pub fn from_markup(markup: &str, options: FragmentOptions) -> Self {
        Self::new(RichTree::parse(markup), options)
    }

    pub fn tree(&self) -> &RichTree {
        &self.tree
    }

    pub fn fragmentation(&self) -> &Fragmentation {
        self.fragments.get_or_init(|| {
            self.passes.set(self.passes.get() + 1);
            let out = fragment_tree(&self.tree, &self.options);
            tracing::debug!(tokens = out.len(), runs = out.runs, "text fragmented");
            out
        })
    }

    pub fn tokens(&self) -> &[CharToken] {
        &self.fragmentation().tokens
    }

    pub fn wrappers(&self) -> &[Wrapper] {
        &self.fragmentation().wrappers
    }

    pub fn is_empty(&self) -> bool {
        self.fragmentation().is_empty()
    }

    /// How many times fragmentation has run for this mount
    pub fn fragmentation_passes(&self) -> u32 {
        self.passes.get()
    }
}
