//! Java front end backed by tree-sitter
//!
//! The syntax tree is only walked once, to cut the file into
//! [`JavaSegment`]s: imports, type names (declarations, generics,
//! annotations) and invoked method names become typed segments, everything
//! in between stays verbatim source. Names are resolved through the file's
//! single-type imports, and invocation receivers through the declared types
//! of locals, parameters and fields, through qualified type names, and
//! through single static imports for unqualified calls. A receiver whose
//! type could only come from an on-demand import keeps its written name.
//! There is no cross-file type attribution.

use crate::error::ParseError;
use crate::parsers::DocumentParser;
use im::Vector;
use jpm_tree::{Document, DocumentKind, Import, JavaDocument, JavaSegment, MethodName, TypeRef};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tree_sitter::{Language, Node, Parser};

/// Parses `.java` files into [`JavaDocument`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaParser;

impl DocumentParser for JavaParser {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Java
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Document, ParseError> {
        parse_java(path, content).map(Document::from)
    }

    fn extensions(&self) -> &[&str] {
        &["java"]
    }
}

/// Names visible in one compilation unit
#[derive(Debug, Default)]
struct Scope<'s> {
    package: Option<&'s str>,
    /// simple name → fully-qualified name, from single-type imports
    imports: HashMap<&'s str, &'s str>,
    /// member name → declaring type, from single static imports
    static_members: HashMap<&'s str, &'s str>,
    /// variable name → declared type; `None` once two declarations disagree
    variables: HashMap<&'s str, Option<&'s str>>,
    /// methods declared in this file, which shadow static imports
    methods: HashSet<&'s str>,
}

/// What a call's receiver is known to be
type Receiver = (Option<String>, Option<String>);

fn starts_upper(name: &str) -> bool {
    name.starts_with(|c: char| c.is_uppercase())
}

impl<'s> Scope<'s> {
    fn collect(root: Node<'_>, src: &'s str) -> Self {
        let mut scope = Self::default();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => scope.package = package_name(child, src),
                "import_declaration" => {
                    let written = text(child, src);
                    if let Some((simple, path)) = single_type_import(written) {
                        scope.imports.insert(simple, path);
                    } else if let Some((member, owner)) = single_static_import(written) {
                        scope.static_members.insert(member, owner);
                    }
                }
                _ => {}
            }
        }
        scope.collect_variables(root, src);
        scope
    }

    fn collect_variables(&mut self, node: Node<'_>, src: &'s str) {
        match node.kind() {
            "local_variable_declaration" | "field_declaration" => {
                if let Some(ty) = node.child_by_field_name("type").and_then(|t| declared_type(t, src)) {
                    let mut cursor = node.walk();
                    for declarator in node.children_by_field_name("declarator", &mut cursor) {
                        if let Some(name) = declarator.child_by_field_name("name") {
                            self.declare(text(name, src), ty);
                        }
                    }
                }
            }
            "formal_parameter" | "enhanced_for_statement" | "resource" => {
                let ty = node.child_by_field_name("type").and_then(|t| declared_type(t, src));
                if let (Some(ty), Some(name)) = (ty, node.child_by_field_name("name")) {
                    self.declare(text(name, src), ty);
                }
            }
            "method_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.methods.insert(text(name, src));
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.collect_variables(child, src);
        }
    }

    fn declare(&mut self, name: &'s str, ty: &'s str) {
        self.variables
            .entry(name)
            .and_modify(|known| {
                if *known != Some(ty) {
                    *known = None;
                }
            })
            .or_insert(Some(ty));
    }

    /// Fully-qualified name of a type as written, if the imports say
    fn resolve(&self, written: &str) -> Option<String> {
        let (head, rest) = match written.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (written, None),
        };
        if let Some(imported) = self.imports.get(head) {
            return Some(match rest {
                Some(rest) => format!("{imported}.{rest}"),
                None => (*imported).to_string(),
            });
        }
        // `java.util.List` is already qualified; `Map.Entry` without an import is not
        (rest.is_some() && head.starts_with(|c: char| c.is_ascii_lowercase())).then(|| written.to_string())
    }

    /// A declared type, qualified when possible
    fn typed(&self, written: &str) -> Receiver {
        match self.resolve(written) {
            Some(resolved) => (Some(resolved), None),
            None if !written.contains('.') => (None, Some(written.to_string())),
            None => (None, None),
        }
    }

    fn receiver(&self, object: Node<'_>, src: &str) -> Receiver {
        let written = text(object, src);
        let name = match object.kind() {
            "identifier" => written,
            "field_access" => {
                let this_field = object
                    .child_by_field_name("object")
                    .filter(|target| target.kind() == "this")
                    .and_then(|_| object.child_by_field_name("field"));
                match this_field {
                    Some(field) => text(field, src),
                    None => return self.qualified_receiver(written),
                }
            }
            "scoped_identifier" => return self.qualified_receiver(written),
            _ => return (None, None),
        };
        match self.variables.get(name) {
            Some(Some(declared)) => self.typed(declared),
            Some(None) => (None, None),
            // static call on a type
            None if starts_upper(name) => self.typed(name),
            None => (None, None),
        }
    }

    /// `hudson.Util` or `Outer.Inner` used as the receiver of a static call
    fn qualified_receiver(&self, written: &str) -> Receiver {
        if !is_plain_name(written) {
            return (None, None);
        }
        let head = written.split('.').next().unwrap_or(written);
        let last = written.rsplit('.').next().unwrap_or(written);
        if self.variables.contains_key(head) || !starts_upper(last) {
            return (None, None);
        }
        (self.resolve(written), None)
    }

    /// Declaring type of an unqualified call brought in by a static import
    fn static_owner(&self, method: &str) -> Option<String> {
        if self.methods.contains(method) {
            return None;
        }
        self.static_members.get(method).map(|owner| (*owner).to_string())
    }
}

fn text<'s>(node: Node<'_>, src: &'s str) -> &'s str {
    &src[node.byte_range()]
}

fn package_name<'s>(node: Node<'_>, src: &'s str) -> Option<&'s str> {
    let mut cursor = node.walk();
    let name = node
        .named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))?;
    Some(text(name, src))
}

/// Type name of a declaration, without type arguments
fn declared_type<'s>(node: Node<'_>, src: &'s str) -> Option<&'s str> {
    match node.kind() {
        "type_identifier" | "scoped_type_identifier" => Some(text(node, src)),
        "generic_type" => node.named_child(0).and_then(|base| declared_type(base, src)),
        _ => None,
    }
}

fn parse_import(written: &str) -> Option<Import> {
    let body = written.strip_prefix("import")?.strip_suffix(';')?.trim();
    let (is_static, body) = match body.strip_prefix("static") {
        Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest.trim_start()),
        _ => (false, body),
    };
    let (wildcard, path) = match body.strip_suffix(".*") {
        Some(path) => (true, path),
        None => (false, body),
    };
    let path: String = path.split_whitespace().collect();
    if path.is_empty() {
        return None;
    }
    Some(Import {
        path,
        is_static,
        wildcard,
    })
}

fn single_type_import(written: &str) -> Option<(&str, &str)> {
    let body = written.strip_prefix("import")?.strip_suffix(';')?.trim();
    if body.starts_with("static") || body.ends_with('*') || body.contains(char::is_whitespace) {
        return None;
    }
    let simple = body.rsplit('.').next()?;
    Some((simple, body))
}

/// `import static a.B.member;` as `(member, a.B)`
fn single_static_import(written: &str) -> Option<(&str, &str)> {
    let body = written.strip_prefix("import")?.strip_suffix(';')?.trim();
    let body = body.strip_prefix("static")?;
    if !body.starts_with(char::is_whitespace) {
        return None;
    }
    let body = body.trim();
    if body.ends_with('*') || body.contains(char::is_whitespace) {
        return None;
    }
    let (owner, member) = body.rsplit_once('.')?;
    Some((member, owner))
}

fn is_plain_name(written: &str) -> bool {
    written.chars().all(|c| c == '.' || c == '_' || c == '$' || c.is_alphanumeric())
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).filter(Node::has_error).collect();
    children.into_iter().find_map(first_error)
}

/// Typed segments with their byte ranges, in source order
struct Segmenter<'a, 's> {
    src: &'s str,
    scope: &'a Scope<'s>,
    spans: Vec<(usize, usize, JavaSegment)>,
}

impl Segmenter<'_, '_> {
    fn push(&mut self, node: Node<'_>, segment: JavaSegment) {
        self.spans.push((node.start_byte(), node.end_byte(), segment));
    }

    fn type_ref(&self, node: Node<'_>) -> JavaSegment {
        let written = text(node, self.src);
        JavaSegment::TypeRef(TypeRef {
            text: written.to_string(),
            resolved: self.scope.resolve(written),
        })
    }

    fn visit(&mut self, node: Node<'_>) {
        match node.kind() {
            "package_declaration" => {}
            "import_declaration" => {
                let written = text(node, self.src);
                match parse_import(written) {
                    Some(import) if import.to_string() == written => self.push(node, JavaSegment::Import(import)),
                    _ => tracing::trace!(import = written, "non-canonical import kept as source"),
                }
            }
            "type_identifier" | "scoped_type_identifier" if is_plain_name(text(node, self.src)) => {
                let segment = self.type_ref(node);
                self.push(node, segment);
            }
            "marker_annotation" | "annotation" => {
                let name = node.child_by_field_name("name");
                self.visit_children(node, |this, child| {
                    if name.is_some_and(|n| n.id() == child.id()) {
                        let segment = this.type_ref(child);
                        this.push(child, segment);
                        true
                    } else {
                        false
                    }
                });
            }
            "method_invocation" => {
                let name = node.child_by_field_name("name");
                let (receiver_type, receiver_text) = match node.child_by_field_name("object") {
                    Some(object) => self.scope.receiver(object, self.src),
                    None => (
                        name.and_then(|n| self.scope.static_owner(text(n, self.src))),
                        None,
                    ),
                };
                self.visit_children(node, |this, child| {
                    if name.is_some_and(|n| n.id() == child.id()) {
                        let call = MethodName {
                            name: text(child, this.src).to_string(),
                            receiver_type: receiver_type.clone(),
                            receiver_text: receiver_text.clone(),
                        };
                        this.push(child, JavaSegment::MethodName(call));
                        true
                    } else {
                        false
                    }
                });
            }
            _ => self.visit_children(node, |_, _| false),
        }
    }

    /// Visit every child that `claim` does not take
    fn visit_children(&mut self, node: Node<'_>, mut claim: impl FnMut(&mut Self, Node<'_>) -> bool) {
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        for child in children {
            if !claim(self, child) {
                self.visit(child);
            }
        }
    }

    fn finish(self) -> Vector<JavaSegment> {
        let mut segments = Vector::new();
        let mut at = 0;
        for (start, end, segment) in self.spans {
            if start > at {
                segments.push_back(JavaSegment::Source(self.src[at..start].to_string()));
            }
            segments.push_back(segment);
            at = end;
        }
        if at < self.src.len() {
            segments.push_back(JavaSegment::Source(self.src[at..].to_string()));
        }
        segments
    }
}

/// Parse a Java compilation unit
///
/// # Errors
/// [`ParseError::Syntax`] when tree-sitter recovers from any error; a
/// partially understood file is never handed to recipes.
pub fn parse_java(path: &Path, content: &str) -> Result<JavaDocument, ParseError> {
    let language: Language = tree_sitter_java::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::Grammar(e.to_string()))?;
    let tree = parser
        .parse(content, None)
        .ok_or_else(|| ParseError::syntax(path, 0, "parser produced no tree"))?;
    let root = tree.root_node();
    if root.has_error() {
        let offset = first_error(root).map_or(0, |n| n.start_byte());
        return Err(ParseError::syntax(path, offset as u64, "invalid Java syntax"));
    }

    let scope = Scope::collect(root, content);
    let mut segmenter = Segmenter {
        src: content,
        scope: &scope,
        spans: Vec::new(),
    };
    segmenter.visit(root);
    let segments = segmenter.finish();
    tracing::trace!(path = %path.display(), segments = segments.len(), "parsed java");
    Ok(JavaDocument::new(scope.package.map(str::to_string), segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FORM_TEST: &str = r#"package io.jenkins.plugins.example;

import com.gargoylesoftware.htmlunit.html.HtmlForm;
import com.gargoylesoftware.htmlunit.html.HtmlInput;
import java.util.List;

public class FormTest {
    private HtmlForm form;

    @Test
    public void submit(List<String> names) throws Exception {
        HtmlInput input = this.form.getInputByName("name");
        input.setValueAttribute(names.get(0));
    }
}
"#;

    fn parse(content: &str) -> JavaDocument {
        parse_java(Path::new("FormTest.java"), content).unwrap()
    }

    fn type_refs(doc: &JavaDocument) -> Vec<(&str, Option<&str>)> {
        doc.segments()
            .iter()
            .filter_map(|s| match s {
                JavaSegment::TypeRef(t) => Some((t.text.as_str(), t.resolved.as_deref())),
                _ => None,
            })
            .collect()
    }

    fn calls(doc: &JavaDocument) -> Vec<(&str, Option<&str>)> {
        doc.segments()
            .iter()
            .filter_map(|s| match s {
                JavaSegment::MethodName(m) => Some((m.name.as_str(), m.receiver_type.as_deref())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn prints_back_unchanged() {
        let doc = parse(FORM_TEST);
        assert_eq!(doc.to_string(), FORM_TEST);
        assert_eq!(doc.package(), Some("io.jenkins.plugins.example"));
        assert_eq!(doc.imports().count(), 3);
    }

    #[test]
    fn resolves_types_through_imports() {
        let doc = parse(FORM_TEST);
        let refs = type_refs(&doc);
        assert!(refs.contains(&("HtmlForm", Some("com.gargoylesoftware.htmlunit.html.HtmlForm"))));
        assert!(refs.contains(&("HtmlInput", Some("com.gargoylesoftware.htmlunit.html.HtmlInput"))));
        assert!(refs.contains(&("List", Some("java.util.List"))));
        assert!(refs.contains(&("Test", None)));
    }

    #[test]
    fn resolves_receivers_from_declarations() {
        let doc = parse(FORM_TEST);
        assert_eq!(
            calls(&doc),
            vec![
                ("getInputByName", Some("com.gargoylesoftware.htmlunit.html.HtmlForm")),
                ("setValueAttribute", Some("com.gargoylesoftware.htmlunit.html.HtmlInput")),
                ("get", Some("java.util.List")),
            ]
        );
    }

    #[test]
    fn odd_import_spelling_stays_source() {
        let content = "import  java.util.List ;\n\nclass A { List<String> xs; }\n";
        let doc = parse(content);
        assert_eq!(doc.to_string(), content);
        assert_eq!(doc.imports().count(), 0);
        // still used to resolve names
        assert!(type_refs(&doc).contains(&("List", Some("java.util.List"))));
    }

    #[test]
    fn qualified_names_resolve_to_themselves() {
        let doc = parse("class A { @javax.annotation.Nonnull java.util.List<String> xs; }\n");
        assert_eq!(
            type_refs(&doc),
            vec![
                ("javax.annotation.Nonnull", Some("javax.annotation.Nonnull")),
                ("java.util.List", Some("java.util.List")),
                ("String", None),
            ]
        );
    }

    fn receivers(doc: &JavaDocument) -> Vec<(&str, Option<&str>, Option<&str>)> {
        doc.segments()
            .iter()
            .filter_map(|s| match s {
                JavaSegment::MethodName(m) => {
                    Some((m.name.as_str(), m.receiver_type.as_deref(), m.receiver_text.as_deref()))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn qualified_and_imported_static_receivers() {
        let doc = parse(
            "import hudson.Util;\n\nclass A {\n    String a(long t) { return hudson.Util.getPastTimeString(t); }\n    String b(long t) { return Util.getPastTimeString(t); }\n}\n",
        );
        assert_eq!(
            receivers(&doc),
            vec![
                ("getPastTimeString", Some("hudson.Util"), None),
                ("getPastTimeString", Some("hudson.Util"), None),
            ]
        );
    }

    #[test]
    fn static_imports_resolve_unqualified_calls() {
        let doc = parse(
            "import static hudson.Util.getPastTimeString;\n\nclass A {\n    String a(long t) { return getPastTimeString(t); }\n    String b() { return local(); }\n}\n",
        );
        assert_eq!(doc.imports().count(), 1);
        assert_eq!(
            receivers(&doc),
            vec![("getPastTimeString", Some("hudson.Util"), None), ("local", None, None)]
        );
    }

    #[test]
    fn local_method_shadows_static_import() {
        let doc = parse(
            "import static hudson.Util.format;\n\nclass A {\n    String format(long t) { return \"\"; }\n    String b() { return format(1); }\n}\n",
        );
        assert_eq!(receivers(&doc), vec![("format", None, None)]);
    }

    #[test]
    fn on_demand_types_keep_their_spelling() {
        let doc = parse(
            "import com.gargoylesoftware.htmlunit.html.*;\n\nclass A {\n    void f(HtmlInput a) { a.setValueAttribute(\"x\"); HtmlPage.x(); field.inner.run(); }\n}\n",
        );
        assert_eq!(doc.on_demand_packages().collect::<Vec<_>>(), vec!["com.gargoylesoftware.htmlunit.html"]);
        assert_eq!(
            receivers(&doc),
            vec![
                ("setValueAttribute", None, Some("HtmlInput")),
                ("x", None, Some("HtmlPage")),
                ("run", None, None),
            ]
        );
    }

    #[test]
    fn rejects_broken_source() {
        let err = parse_java(Path::new("A.java"), "class A { void f( }").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
