//! Declaration scanning.
//!
//! Walks a directory tree, parses every `.rs` file with `syn` and collects the
//! names of the structs it declares. The name binding is positional: the
//! syntax tree is flattened into a pre-order stream of nodes and a struct body
//! is bound to the identifier that immediately precedes it in that stream.
//!
//! For an ordinary declaration such as `pub struct Order { .. }` the preceding
//! identifier is the struct's own name. When other syntax sits between the
//! name and the body the binding follows the stream anyway: a generic struct
//! `struct Page<T> { .. }` binds `T`, and `struct Wrapper<T> where T: Clone`
//! binds `Clone`. Downstream output relies on this exact behaviour, so it is
//! kept rather than resolved against `ItemStruct::ident`.

use crate::error::{Result, TypeportError};
use std::fs;
use std::path::{Path, PathBuf};
use syn::visit::{self, Visit};
use syn::{
    Attribute, BareFnArg, Block, Expr, Field, Generics, Ident, ImplItem, Item, ItemStruct, Pat,
    PathArguments, ReturnType, Signature, Stmt, TraitItem, Type, Variant, Visibility,
};
use tracing::{debug, error, info, trace};
use walkdir::WalkDir;

/// Suffix of the files the scanner parses.
pub const SOURCE_EXTENSION: &str = ".rs";

/// A struct name discovered in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationName {
    /// The identifier as written, raw prefix included (`r#type`).
    pub name: String,
    /// File the declaration was found in. Only used for diagnostics.
    pub source: PathBuf,
}

/// Ordered result of a scan: directory walk order, then declaration order
/// within each file. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    declarations: Vec<DeclarationName>,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeclarationName> {
        self.declarations.iter()
    }

    /// The discovered names, in emission order.
    pub fn names(&self) -> Vec<&str> {
        self.declarations.iter().map(|d| d.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = &'a DeclarationName;
    type IntoIter = std::slice::Iter<'a, DeclarationName>;

    fn into_iter(self) -> Self::IntoIter {
        self.declarations.iter()
    }
}

/// Scanner over a single directory root.
#[derive(Debug, Clone)]
pub struct DeclarationScanner {
    root: PathBuf,
}

impl DeclarationScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scans every source file under the root.
    ///
    /// Any walk error or unparseable file aborts the whole scan; a partial
    /// name set would produce an incomplete generated program.
    pub fn scan(&self) -> Result<ScanResult> {
        debug!("Scanning {:?} for struct declarations", self.root);
        let mut declarations = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                error!("Error walking {:?}: {}", path, err);
                TypeportError::discovery(path, err.to_string())
            })?;

            if entry.file_type().is_dir() || !is_source_file(entry.path()) {
                trace!("Skipping {:?}", entry.path());
                continue;
            }

            let found = scan_file(entry.path())?;
            debug!("Found {} structs in {:?}", found.len(), entry.path());
            declarations.extend(found);
        }

        info!("Found {} structs under {:?}", declarations.len(), self.root);
        Ok(ScanResult { declarations })
    }
}

/// Compares raw bytes so that names which are not valid UTF-8 still count.
fn is_source_file(path: &Path) -> bool {
    path.file_name().is_some_and(|name| {
        name.as_encoded_bytes().ends_with(SOURCE_EXTENSION.as_bytes())
    })
}

/// Scans one file, tagging each name with the file's path.
pub fn scan_file(path: &Path) -> Result<Vec<DeclarationName>> {
    let content = fs::read_to_string(path).map_err(|err| {
        error!("Error loading Rust file {:?}: {}", path, err);
        TypeportError::parse_error(path, err.to_string())
    })?;

    let names = scan_source(&content).map_err(|err| {
        error!("Error parsing Rust file {:?}: {}", path, err);
        TypeportError::parse_error(path, err.to_string())
    })?;

    Ok(names
        .into_iter()
        .map(|name| DeclarationName {
            name,
            source: path.to_path_buf(),
        })
        .collect())
}

/// Parses Rust source text and returns the bound struct names in order.
pub fn scan_source(content: &str) -> syn::Result<Vec<String>> {
    let syntax = syn::parse_file(content)?;
    let mut collector = NodeCollector::default();
    collector.visit_file(&syntax);
    Ok(bind_declarations(&collector.nodes))
}

/// One step of the flattened syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Ident(String),
    StructBody,
    Other,
}

/// Applies the "last identifier before a struct body" rule to a node stream.
fn bind_declarations(nodes: &[Node]) -> Vec<String> {
    let mut candidate = String::new();
    let mut structs = Vec::new();

    for node in nodes {
        match node {
            Node::Ident(name) => candidate.clone_from(name),
            Node::StructBody => {
                if !candidate.is_empty() {
                    structs.push(std::mem::take(&mut candidate));
                }
            }
            Node::Other => candidate.clear(),
        }
    }

    structs
}

/// Flattens a syntax tree into a pre-order [`Node`] stream.
///
/// Syntax that is absent from the source (inherited visibility, a struct
/// without generics) yields no node.
#[derive(Default)]
struct NodeCollector {
    nodes: Vec<Node>,
}

impl NodeCollector {
    fn other(&mut self) {
        self.nodes.push(Node::Other);
    }
}

impl<'ast> Visit<'ast> for NodeCollector {
    fn visit_ident(&mut self, ident: &'ast Ident) {
        self.nodes.push(Node::Ident(ident.to_string()));
    }

    fn visit_item_struct(&mut self, node: &'ast ItemStruct) {
        for attr in &node.attrs {
            self.visit_attribute(attr);
        }
        self.visit_visibility(&node.vis);
        self.visit_ident(&node.ident);
        self.visit_generics(&node.generics);
        self.nodes.push(Node::StructBody);
        self.visit_fields(&node.fields);
    }

    fn visit_item(&mut self, node: &'ast Item) {
        self.other();
        visit::visit_item(self, node);
    }

    fn visit_attribute(&mut self, node: &'ast Attribute) {
        self.other();
        visit::visit_attribute(self, node);
    }

    fn visit_visibility(&mut self, node: &'ast Visibility) {
        if matches!(node, Visibility::Inherited) {
            return;
        }
        self.other();
        visit::visit_visibility(self, node);
    }

    fn visit_generics(&mut self, node: &'ast Generics) {
        if node.params.is_empty() && node.where_clause.is_none() {
            return;
        }
        self.other();
        visit::visit_generics(self, node);
    }

    fn visit_field(&mut self, node: &'ast Field) {
        self.other();
        visit::visit_field(self, node);
    }

    fn visit_variant(&mut self, node: &'ast Variant) {
        self.other();
        visit::visit_variant(self, node);
    }

    fn visit_path_arguments(&mut self, node: &'ast PathArguments) {
        if matches!(node, PathArguments::None) {
            return;
        }
        self.other();
        visit::visit_path_arguments(self, node);
    }

    fn visit_return_type(&mut self, node: &'ast ReturnType) {
        if matches!(node, ReturnType::Default) {
            return;
        }
        self.other();
        visit::visit_return_type(self, node);
    }

    fn visit_bare_fn_arg(&mut self, node: &'ast BareFnArg) {
        self.other();
        visit::visit_bare_fn_arg(self, node);
    }

    fn visit_type(&mut self, node: &'ast Type) {
        self.other();
        visit::visit_type(self, node);
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        self.other();
        visit::visit_path(self, node);
    }

    fn visit_expr(&mut self, node: &'ast Expr) {
        self.other();
        visit::visit_expr(self, node);
    }

    fn visit_stmt(&mut self, node: &'ast Stmt) {
        self.other();
        visit::visit_stmt(self, node);
    }

    fn visit_pat(&mut self, node: &'ast Pat) {
        self.other();
        visit::visit_pat(self, node);
    }

    fn visit_block(&mut self, node: &'ast Block) {
        self.other();
        visit::visit_block(self, node);
    }

    fn visit_signature(&mut self, node: &'ast Signature) {
        self.other();
        visit::visit_signature(self, node);
    }

    fn visit_impl_item(&mut self, node: &'ast ImplItem) {
        self.other();
        visit::visit_impl_item(self, node);
    }

    fn visit_trait_item(&mut self, node: &'ast TraitItem) {
        self.other();
        visit::visit_trait_item(self, node);
    }
}
