//! Building a [`SymbolTable`] from a typed tree.
//!
//! The build runs in three passes:
//!
//! 1. A top-down walk opens a scope for the module and for every function,
//!    lambda, class and comprehension, binds every declaration in the scope
//!    it belongs to, and queues every read.
//! 2. Queued reads are resolved through the scope chain, falling back to
//!    builtins. Class scopes are only visible to code directly in the class
//!    body.
//! 3. Class bases and members are attached, in source order.
//!
//! Reads resolve after all bindings are known, so a name assigned anywhere in
//! a function is local to the whole function.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, trace};
use tuglint_python_cst::visitor::{self, TreeVisitor, VisitResult};
use tuglint_python_cst::{
    CallExpr, ClassDef, FuncDef, GlobalStmt, Lambda, Name, Node, NodeId, NonlocalStmt, QualifiedExpr,
    SliceExpr, SubscriptionExpr, Tree,
};

use crate::builtins::builtin_symbol;
use crate::error::Result;
use crate::scope::{Scope, ScopeId, ScopeKind};
use crate::symbol::{FunctionData, Symbol, SymbolId, SymbolKind, UsageKind};
use crate::table::SymbolTable;

impl SymbolTable {
    /// Build the symbol table of `tree`, the module `module_name`.
    ///
    /// Fully qualified names of module level definitions are prefixed with
    /// `module_name` unless it is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolTableError`](crate::SymbolTableError) only on an
    /// internal protocol violation; unresolved names and hierarchies are
    /// recorded as state.
    pub fn build(tree: &Tree, module_name: &str) -> Result<SymbolTable> {
        let mut binder = Binder::new(tree, module_name);
        binder.bind_module();
        binder.resolve_reads()?;
        binder.resolve_classes()?;
        let table = binder.table;
        debug!(
            module = module_name,
            symbols = table.len(),
            scopes = table.scopes().count(),
            "built symbol table"
        );
        Ok(table)
    }
}

/// A name read waiting for resolution.
struct PendingRead {
    node: NodeId,
    scope: ScopeId,
    name: String,
}

/// Where the qualified name of a newly bound symbol comes from.
enum QualifiedName {
    /// Derived from the declaring scope.
    Scoped,
    /// Given by an import; `None` for relative imports.
    Imported(Option<String>),
}

/// A class whose bases and members are attached in the last pass.
struct PendingClass {
    symbol: SymbolId,
    def: NodeId,
    scope: ScopeId,
}

struct Binder<'t> {
    tree: &'t Tree,
    table: SymbolTable,
    /// Qualified name prefix of each scope, by scope index.
    prefixes: Vec<String>,
    current: ScopeId,
    /// Name nodes already recorded as declarations.
    declared: HashSet<NodeId>,
    reads: Vec<PendingRead>,
    classes: Vec<PendingClass>,
    /// The first parameter of the enclosing instance method and its class scope.
    receiver: Option<(&'t str, ScopeId)>,
    /// Attributes assigned through the receiver, per class scope.
    instance_attributes: BTreeMap<ScopeId, Vec<SymbolId>>,
}

impl<'t> Binder<'t> {
    fn new(tree: &'t Tree, module_name: &str) -> Self {
        let mut table = SymbolTable::new(module_name);
        let module = table.add_scope(Scope::new(ScopeKind::Module, tree.root(), None));
        Binder {
            tree,
            table,
            prefixes: vec![module_name.to_string()],
            current: module,
            declared: HashSet::new(),
            reads: Vec::new(),
            classes: Vec::new(),
            receiver: None,
            instance_attributes: BTreeMap::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Scopes and names
    // ------------------------------------------------------------------------

    fn open_scope(&mut self, kind: ScopeKind, node: NodeId, prefix: String) -> ScopeId {
        let scope = self.table.add_scope(Scope::new(kind, node, Some(self.current)));
        self.prefixes.push(prefix);
        scope
    }

    fn module_scope(&self) -> ScopeId {
        ScopeId::new(0)
    }

    fn qualify(&self, scope: ScopeId, name: &str) -> String {
        let prefix = &self.prefixes[scope.index()];
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        }
    }

    /// Variables of module and class scopes are addressable from outside.
    fn variable_fqn(&self, scope: ScopeId, name: &str) -> Option<String> {
        match self.table.scope(scope).kind {
            ScopeKind::Module | ScopeKind::Class => Some(self.qualify(scope, name)),
            _ => None,
        }
    }

    fn name_text(&self, id: NodeId) -> Option<&'t str> {
        self.tree.node(id).as_name().map(|name| name.name.as_str())
    }

    /// The scope a binding of `name` in `start` lands in, after `global` and
    /// `nonlocal` redirection.
    fn declaring_scope(&self, start: ScopeId, name: &str) -> ScopeId {
        let scope = self.table.scope(start);
        if scope.is_global(name) {
            return self.module_scope();
        }
        if !scope.is_nonlocal(name) {
            return start;
        }
        let mut nearest = None;
        let mut parent = scope.parent;
        while let Some(id) = parent {
            let enclosing = self.table.scope(id);
            if enclosing.kind.is_function_like() {
                if enclosing.lookup(name).is_some() {
                    return id;
                }
                nearest.get_or_insert(id);
            }
            parent = enclosing.parent;
        }
        nearest.unwrap_or(start)
    }

    /// Assignment expressions bind outside of comprehensions.
    fn walrus_scope(&self) -> ScopeId {
        let mut scope = self.current;
        while self.table.scope(scope).kind == ScopeKind::Comprehension {
            match self.table.scope(scope).parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        scope
    }

    /// Combine a new definition with the symbol already bound to its name.
    fn merge_alternative(&mut self, existing: SymbolId, alternative: SymbolId) -> SymbolId {
        let symbol = self.table.symbol_mut(existing);
        if let SymbolKind::Ambiguous(alternatives) = &mut symbol.kind {
            alternatives.push(alternative);
            return existing;
        }
        let name = symbol.name.clone();
        let fqn = symbol
            .fully_qualified_name
            .clone()
            .or_else(|| self.table.symbol(alternative).fully_qualified_name.clone());
        trace!(name = %name, "name bound by several definitions");
        self.table
            .add_symbol(Symbol::new(name, fqn, SymbolKind::Ambiguous(vec![existing, alternative])))
    }

    /// Bind a `def` or `class` name to its freshly created symbol.
    fn declare_definition(&mut self, name_node: NodeId, name: &str, symbol: SymbolId, kind: UsageKind) {
        self.table.add_usage(symbol, name_node, kind);
        self.declared.insert(name_node);
        let scope = self.declaring_scope(self.current, name);
        match self.table.scope(scope).lookup(name) {
            None => self.table.scope_mut(scope).bind(name, symbol),
            Some(existing) => {
                let merged = self.merge_alternative(existing, symbol);
                if merged != existing {
                    self.table.scope_mut(scope).bind(name, merged);
                }
            }
        }
    }

    /// Bind a name node starting from scope `start`.
    fn bind_name(&mut self, start: ScopeId, name_node: NodeId, kind: UsageKind, qualified: QualifiedName) {
        let Some(name) = self.name_text(name_node) else {
            return;
        };
        let scope = self.declaring_scope(start, name);
        let new_fqn = match qualified {
            QualifiedName::Scoped => self.variable_fqn(scope, name),
            QualifiedName::Imported(fqn) => fqn,
        };
        let symbol = match self.table.scope(scope).lookup(name) {
            None => {
                let symbol = self.table.add_other_symbol(name, new_fqn);
                self.table.scope_mut(scope).bind(name, symbol);
                symbol
            }
            Some(existing) => match &self.table.symbol(existing).kind {
                SymbolKind::Other => existing,
                SymbolKind::Ambiguous(alternatives) => {
                    let plain = alternatives
                        .iter()
                        .copied()
                        .find(|&alternative| matches!(self.table.symbol(alternative).kind, SymbolKind::Other));
                    match plain {
                        Some(plain) => plain,
                        None => {
                            let symbol = self.table.add_other_symbol(name, new_fqn);
                            self.merge_alternative(existing, symbol);
                            symbol
                        }
                    }
                }
                SymbolKind::Function(_) | SymbolKind::Class(_) => {
                    let symbol = self.table.add_other_symbol(name, new_fqn);
                    let merged = self.merge_alternative(existing, symbol);
                    self.table.scope_mut(scope).bind(name, merged);
                    symbol
                }
            },
        };
        self.table.add_usage(symbol, name_node, kind);
        self.declared.insert(name_node);
    }

    /// Bind every name in an assignment target. Receiver attributes become
    /// instance attributes; other parts of the target are visited as reads.
    fn bind_target(&mut self, target: NodeId, kind: UsageKind) {
        let mut collector = TargetCollector::default();
        visitor::walk(self.tree, target, &mut collector);
        for name in collector.names {
            self.bind_name(self.current, name, kind, QualifiedName::Scoped);
        }
        for attribute in collector.attributes {
            self.bind_instance_attribute(attribute);
        }
        self.visit(target);
    }

    fn bind_instance_attribute(&mut self, attribute: NodeId) {
        let Some((receiver, class_scope)) = self.receiver else {
            return;
        };
        let Some(qualified) = self.tree.node(attribute).as_qualified_expr() else {
            return;
        };
        if self.name_text(qualified.qualifier) != Some(receiver) {
            return;
        }
        let Some(name) = self.name_text(qualified.name) else {
            return;
        };
        let existing = self.instance_attributes.get(&class_scope).and_then(|attributes| {
            attributes
                .iter()
                .copied()
                .find(|&symbol| self.table.symbol(symbol).name == name)
        });
        let symbol = match existing {
            Some(symbol) => symbol,
            None => {
                let fqn = self.qualify(class_scope, name);
                let symbol = self.table.add_other_symbol(name, Some(fqn));
                self.instance_attributes.entry(class_scope).or_default().push(symbol);
                symbol
            }
        };
        self.table.add_usage(symbol, qualified.name, UsageKind::Assignment);
    }

    fn record_read(&mut self, id: NodeId, name: &Name) {
        if !name.is_variable || self.declared.contains(&id) || matches!(name.name.as_str(), "True" | "False") {
            return;
        }
        self.reads.push(PendingRead {
            node: id,
            scope: self.current,
            name: name.name.clone(),
        });
    }

    /// Record `global` and `nonlocal` names declared in `body`, not counting
    /// nested functions and classes.
    fn scan_declarations(&mut self, scope: ScopeId, body: NodeId) {
        let mut scanner = DeclarationScanner::default();
        visitor::walk(self.tree, body, &mut scanner);
        let scope = self.table.scope_mut(scope);
        scope.globals.extend(scanner.globals);
        scope.nonlocals.extend(scanner.nonlocals);
    }

    // ------------------------------------------------------------------------
    // Pass 1: declarations
    // ------------------------------------------------------------------------

    fn bind_module(&mut self) {
        let root = self.tree.root();
        self.visit_children(root);
    }

    fn visit_children(&mut self, id: NodeId) {
        let tree = self.tree;
        for child in tree.child_nodes(id) {
            self.visit(child);
        }
    }

    fn visit_all(&mut self, ids: &[NodeId]) {
        for &id in ids {
            self.visit(id);
        }
    }

    fn visit_opt(&mut self, id: Option<NodeId>) {
        if let Some(id) = id {
            self.visit(id);
        }
    }

    fn visit(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.node(id) {
            Node::FuncDef(def) => self.function_def(id, def),
            Node::ClassDef(def) => self.class_def(id, def),
            Node::Lambda(lambda) => self.lambda(id, lambda),
            Node::ComprehensionExpr(comprehension) => {
                self.comprehension(id, comprehension.comprehension, &[comprehension.result_expression])
            }
            Node::DictComprehension(comprehension) => {
                self.comprehension(id, comprehension.comprehension, &[comprehension.key, comprehension.value])
            }
            Node::Decorator(decorator) => {
                if let Some(&first) = tree.node(decorator.name).as_dotted_name().and_then(|d| d.names.first()) {
                    if let Some(name) = self.name_text(first) {
                        self.reads.push(PendingRead {
                            node: first,
                            scope: self.current,
                            name: name.to_string(),
                        });
                    }
                }
                self.visit_opt(decorator.arguments);
            }
            Node::ImportName(import) => {
                for &module in &import.modules {
                    self.import_name(module);
                }
            }
            Node::ImportFrom(import) => {
                let module = match import.module {
                    Some(module) if import.relative_level(tree) == 0 => Some(self.dotted_text(module)),
                    _ => None,
                };
                let relative = import.relative_level(tree) > 0;
                for &aliased in &import.imported_names {
                    self.import_from(aliased, module.as_deref(), relative);
                }
            }
            Node::GlobalStmt(GlobalStmt { names, .. }) | Node::NonlocalStmt(NonlocalStmt { names, .. }) => {
                for &name_node in names {
                    if let Some(name) = self.name_text(name_node) {
                        let scope = self.declaring_scope(self.current, name);
                        let symbol = match self.table.scope(scope).lookup(name) {
                            Some(symbol) => symbol,
                            None => {
                                let fqn = self.variable_fqn(scope, name);
                                let symbol = self.table.add_other_symbol(name, fqn);
                                self.table.scope_mut(scope).bind(name, symbol);
                                symbol
                            }
                        };
                        self.table.add_usage(symbol, name_node, UsageKind::GlobalDeclaration);
                        self.declared.insert(name_node);
                    }
                }
            }
            Node::AssignmentStmt(assignment) => {
                self.visit(assignment.assigned_value);
                for &lhs in &assignment.lhs_expressions {
                    self.bind_target(lhs, UsageKind::Assignment);
                }
            }
            Node::CompoundAssignment(assignment) => {
                self.visit(assignment.rhs_expression);
                self.bind_target(assignment.lhs_expression, UsageKind::CompoundAssignment);
            }
            Node::AnnotatedAssignment(assignment) => {
                self.visit(assignment.annotation);
                self.visit_opt(assignment.assigned_value);
                self.bind_target(assignment.variable, UsageKind::Assignment);
            }
            Node::ForStmt(for_stmt) => {
                self.visit_all(&for_stmt.test_expressions);
                for &target in &for_stmt.expressions {
                    self.bind_target(target, UsageKind::LoopDeclaration);
                }
                self.visit(for_stmt.body);
                self.visit_opt(for_stmt.else_clause);
            }
            Node::WithItem(item) => {
                self.visit(item.test);
                if let Some(target) = item.target {
                    self.bind_target(target, UsageKind::WithInstance);
                }
            }
            Node::ExceptClause(clause) => {
                self.visit_opt(clause.exception);
                if let Some(instance) = clause.exception_instance {
                    self.bind_target(instance, UsageKind::ExceptionInstance);
                }
                self.visit(clause.body);
            }
            Node::AssignmentExpression(assignment) => {
                self.visit(assignment.expression);
                let scope = self.walrus_scope();
                self.bind_name(scope, assignment.name, UsageKind::Assignment, QualifiedName::Scoped);
            }
            Node::Name(name) => self.record_read(id, name),
            _ => self.visit_children(id),
        }
    }

    fn dotted_text(&self, dotted: NodeId) -> String {
        let names = self
            .tree
            .node(dotted)
            .as_dotted_name()
            .map(|d| d.names.as_slice())
            .unwrap_or_default();
        names
            .iter()
            .filter_map(|&name| self.name_text(name))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `import a.b` binds `a`; `import a.b as c` binds `c` to `a.b`.
    fn import_name(&mut self, aliased: NodeId) {
        let Some(aliased_name) = self.tree.node(aliased).as_aliased_name() else {
            return;
        };
        let path = self.dotted_text(aliased_name.dotted_name);
        match aliased_name.alias {
            Some(alias) => self.bind_name(self.current, alias, UsageKind::Import, QualifiedName::Imported(Some(path))),
            None => {
                let first = self
                    .tree
                    .node(aliased_name.dotted_name)
                    .as_dotted_name()
                    .and_then(|d| d.names.first().copied());
                if let Some(first) = first {
                    let fqn = self.name_text(first).map(str::to_string);
                    self.bind_name(self.current, first, UsageKind::Import, QualifiedName::Imported(fqn));
                }
            }
        }
    }

    /// `from m import x as y` binds `y` to `m.x`. Relative imports have no
    /// qualified name.
    fn import_from(&mut self, aliased: NodeId, module: Option<&str>, relative: bool) {
        let Some(aliased_name) = self.tree.node(aliased).as_aliased_name() else {
            return;
        };
        let imported = self.dotted_text(aliased_name.dotted_name);
        let fqn = match module {
            Some(module) if !relative => Some(format!("{}.{}", module, imported)),
            _ => None,
        };
        let bound = match aliased_name.alias {
            Some(alias) => Some(alias),
            None => self
                .tree
                .node(aliased_name.dotted_name)
                .as_dotted_name()
                .and_then(|d| d.names.first().copied()),
        };
        if let Some(bound) = bound {
            self.bind_name(self.current, bound, UsageKind::Import, QualifiedName::Imported(fqn));
        }
    }

    /// Visit parameter defaults and annotations in the current scope.
    fn visit_parameter_parts(&mut self, parameters: Option<NodeId>) -> Vec<NodeId> {
        let tree = self.tree;
        let parameters: Vec<NodeId> = parameters
            .and_then(|list| tree.node(list).as_parameter_list())
            .map(|list| list.parameters.clone())
            .unwrap_or_default();
        for &parameter in &parameters {
            if let Some(parameter) = tree.node(parameter).as_parameter() {
                self.visit_opt(parameter.annotation);
                self.visit_opt(parameter.default_value);
            }
        }
        parameters
    }

    /// Bind parameter names in the current scope.
    fn bind_parameters(&mut self, parameters: &[NodeId]) {
        let tree = self.tree;
        for &parameter in parameters {
            if let Some(name) = tree.node(parameter).as_parameter().and_then(|p| p.name) {
                self.bind_name(self.current, name, UsageKind::Parameter, QualifiedName::Scoped);
            }
        }
    }

    fn function_def(&mut self, id: NodeId, def: &'t FuncDef) {
        let tree = self.tree;
        self.visit_all(&def.decorators);
        let parameters = self.visit_parameter_parts(def.parameters);
        self.visit_opt(def.return_annotation);

        let Some(name) = self.name_text(def.name) else {
            return;
        };
        let decorators: Vec<String> = def
            .decorators
            .iter()
            .filter_map(|&d| tree.node(d).as_decorator())
            .map(|d| tree.text(d.name))
            .collect();
        let mut parameter_names = Vec::new();
        let mut has_variadic_parameter = false;
        let mut first_positional = None;
        for (index, &parameter) in parameters.iter().enumerate() {
            let Some(parameter) = tree.node(parameter).as_parameter() else {
                continue;
            };
            let star = parameter.star_token.map(|t| tree.token(t).value.as_str());
            if matches!(star, Some("*" | "**")) && parameter.name.is_some() {
                has_variadic_parameter = true;
            }
            if let Some(parameter_name) = parameter.name.and_then(|n| self.name_text(n)) {
                if index == 0 && star.is_none() {
                    first_positional = Some(parameter_name);
                }
                parameter_names.push(parameter_name.to_string());
            }
        }
        let in_class = self.table.scope(self.current).kind == ScopeKind::Class;
        let is_static_or_class = decorators
            .iter()
            .any(|d| d == "staticmethod" || d == "classmethod");
        let is_instance_method = in_class && !is_static_or_class && first_positional.is_some();

        let fqn = self.qualify(self.current, name);
        let data = FunctionData {
            parameter_names,
            has_variadic_parameter,
            has_decorators: !decorators.is_empty(),
            decorators,
            is_async: def.is_async(),
            is_instance_method,
            definition: Some(tree.range(def.name)),
        };
        let symbol = self.table.add_function_symbol(name, Some(fqn.clone()), data);
        self.declare_definition(def.name, name, symbol, UsageKind::FuncDeclaration);

        let class_scope = self.current;
        let scope = self.open_scope(ScopeKind::Function, id, fqn);
        self.scan_declarations(scope, def.body);
        let saved_scope = std::mem::replace(&mut self.current, scope);
        let receiver = match first_positional {
            Some(receiver) if is_instance_method => Some((receiver, class_scope)),
            _ => None,
        };
        let saved_receiver = std::mem::replace(&mut self.receiver, receiver);
        self.bind_parameters(&parameters);
        self.visit(def.body);
        self.receiver = saved_receiver;
        self.current = saved_scope;
    }

    fn class_def(&mut self, id: NodeId, def: &'t ClassDef) {
        let tree = self.tree;
        self.visit_all(&def.decorators);
        self.visit_opt(def.args);

        let Some(name) = self.name_text(def.name) else {
            return;
        };
        let fqn = self.qualify(self.current, name);
        let symbol = self.table.add_class_symbol(name, Some(fqn.clone()));
        if let SymbolKind::Class(data) = &mut self.table.symbol_mut(symbol).kind {
            data.has_decorators = !def.decorators.is_empty();
            data.definition = Some(tree.range(def.name));
        }
        self.declare_definition(def.name, name, symbol, UsageKind::ClassDeclaration);

        let scope = self.open_scope(ScopeKind::Class, id, fqn);
        self.scan_declarations(scope, def.body);
        let saved_scope = std::mem::replace(&mut self.current, scope);
        let saved_receiver = self.receiver.take();
        self.visit(def.body);
        self.receiver = saved_receiver;
        self.current = saved_scope;
        self.classes.push(PendingClass { symbol, def: id, scope });
    }

    fn lambda(&mut self, id: NodeId, lambda: &'t Lambda) {
        let parameters = self.visit_parameter_parts(lambda.parameters);
        let prefix = self.prefixes[self.current.index()].clone();
        let scope = self.open_scope(ScopeKind::Lambda, id, prefix);
        let saved_scope = std::mem::replace(&mut self.current, scope);
        self.bind_parameters(&parameters);
        self.visit(lambda.body);
        self.current = saved_scope;
    }

    /// The first iterable is evaluated in the enclosing scope; everything else
    /// in the comprehension's own scope.
    fn comprehension(&mut self, id: NodeId, first_for: NodeId, results: &[NodeId]) {
        let tree = self.tree;
        let Some(first) = tree.node(first_for).as_comp_for() else {
            return;
        };
        self.visit(first.iterable);

        let prefix = self.prefixes[self.current.index()].clone();
        let scope = self.open_scope(ScopeKind::Comprehension, id, prefix);
        let saved_scope = std::mem::replace(&mut self.current, scope);
        self.bind_target(first.loop_expression, UsageKind::LoopDeclaration);
        let mut clause = first.nested_clause;
        while let Some(current) = clause {
            clause = match tree.node(current) {
                Node::CompFor(comp_for) => {
                    self.visit(comp_for.iterable);
                    self.bind_target(comp_for.loop_expression, UsageKind::LoopDeclaration);
                    comp_for.nested_clause
                }
                Node::CompIf(comp_if) => {
                    self.visit(comp_if.condition);
                    comp_if.nested_clause
                }
                _ => {
                    self.visit(current);
                    None
                }
            };
        }
        self.visit_all(results);
        self.current = saved_scope;
    }

    // ------------------------------------------------------------------------
    // Pass 2: reads
    // ------------------------------------------------------------------------

    fn resolve_reads(&mut self) -> Result<()> {
        let reads = std::mem::take(&mut self.reads);
        let mut unresolved = 0usize;
        for read in reads {
            match self.resolve_name(read.scope, &read.name)? {
                Some(symbol) => self.table.add_usage(symbol, read.node, UsageKind::Other),
                None => unresolved += 1,
            }
        }
        trace!(unresolved, "resolved reads");
        Ok(())
    }

    fn resolve_name(&mut self, start: ScopeId, name: &str) -> Result<Option<SymbolId>> {
        let mut current = Some(start);
        while let Some(id) = current {
            let scope = self.table.scope(id);
            if scope.is_global(name) {
                if let Some(symbol) = self.table.scope(self.module_scope()).lookup(name) {
                    return Ok(Some(symbol));
                }
                break;
            }
            if id == start || scope.kind != ScopeKind::Class {
                if let Some(symbol) = scope.lookup(name) {
                    return Ok(Some(symbol));
                }
            }
            current = scope.parent;
        }
        builtin_symbol(&mut self.table, name)
    }

    // ------------------------------------------------------------------------
    // Pass 3: class hierarchies
    // ------------------------------------------------------------------------

    fn resolve_classes(&mut self) -> Result<()> {
        let tree = self.tree;
        for class in std::mem::take(&mut self.classes) {
            let Some(def) = tree.node(class.def).as_class_def() else {
                continue;
            };
            let arguments = def
                .args
                .and_then(|args| tree.node(args).as_arg_list())
                .map(|args| args.arguments.as_slice())
                .unwrap_or_default();
            for &argument in arguments {
                match tree.node(argument) {
                    Node::RegularArgument(argument) if argument.keyword.is_some() => {}
                    Node::RegularArgument(argument) => self.add_base(class.symbol, argument.expression)?,
                    _ => self.table.set_has_super_class_without_symbol(class.symbol)?,
                }
            }

            let scope = self.table.scope(class.scope);
            let mut members = scope.symbols().to_vec();
            if let Some(attributes) = self.instance_attributes.get(&class.scope) {
                members.extend(
                    attributes
                        .iter()
                        .copied()
                        .filter(|&attribute| scope.lookup(&self.table.symbol(attribute).name).is_none()),
                );
            }
            self.table.add_members(class.symbol, members)?;
        }
        Ok(())
    }

    fn add_base(&mut self, class: SymbolId, base: NodeId) -> Result<()> {
        let superclass = match self.tree.node(base) {
            Node::Name(_) => self.table.symbol_of(base),
            Node::QualifiedExpr(_) => self.qualified_base(base),
            _ => None,
        };
        match superclass {
            Some(superclass) => self.table.add_super_class(class, superclass),
            None => self.table.set_has_super_class_without_symbol(class),
        }
    }

    /// `a.b.C`: the qualified name of the root symbol followed by the
    /// attribute path.
    fn qualified_base(&mut self, base: NodeId) -> Option<SymbolId> {
        let mut path = Vec::new();
        let mut current = base;
        while let Some(qualified) = self.tree.node(current).as_qualified_expr() {
            path.push(self.name_text(qualified.name)?);
            current = qualified.qualifier;
        }
        let root = self.table.symbol_of(current)?;
        let root_fqn = self.table.symbol(root).fully_qualified_name.clone()?;
        path.reverse();
        let fqn = format!("{}.{}", root_fqn, path.join("."));

        if let Some(class) = self
            .table
            .symbols_with_fqn(&fqn)
            .find(|&id| self.table.symbol(id).is_class())
        {
            return Some(class);
        }
        if let Some(external) = self.table.shared_symbol(&fqn) {
            return Some(external);
        }
        let name = path.last().copied().unwrap_or_default();
        let external = self.table.add_other_symbol(name, Some(fqn.clone()));
        self.table.register_shared(&fqn, external);
        Some(external)
    }
}

// ============================================================================
// Helper visitors
// ============================================================================

/// Collects the names bound by an assignment target and the attribute
/// targets. Subscripts and calls bind nothing.
#[derive(Default)]
struct TargetCollector {
    names: Vec<NodeId>,
    attributes: Vec<NodeId>,
}

impl TreeVisitor for TargetCollector {
    fn visit_name(&mut self, _tree: &Tree, id: NodeId, _node: &Name) -> VisitResult {
        self.names.push(id);
        VisitResult::SkipChildren
    }

    fn visit_qualified_expr(&mut self, _tree: &Tree, id: NodeId, _node: &QualifiedExpr) -> VisitResult {
        self.attributes.push(id);
        VisitResult::SkipChildren
    }

    fn visit_subscription_expr(&mut self, _tree: &Tree, _id: NodeId, _node: &SubscriptionExpr) -> VisitResult {
        VisitResult::SkipChildren
    }

    fn visit_slice_expr(&mut self, _tree: &Tree, _id: NodeId, _node: &SliceExpr) -> VisitResult {
        VisitResult::SkipChildren
    }

    fn visit_call_expr(&mut self, _tree: &Tree, _id: NodeId, _node: &CallExpr) -> VisitResult {
        VisitResult::SkipChildren
    }
}

/// Collects `global` and `nonlocal` names of one function or class body.
#[derive(Default)]
struct DeclarationScanner {
    globals: Vec<String>,
    nonlocals: Vec<String>,
}

fn names_of<'a>(tree: &'a Tree, names: &'a [NodeId]) -> impl Iterator<Item = String> + 'a {
    names
        .iter()
        .filter_map(|&name| tree.node(name).as_name())
        .map(|name| name.name.clone())
}

impl TreeVisitor for DeclarationScanner {
    fn visit_func_def(&mut self, _tree: &Tree, _id: NodeId, _node: &FuncDef) -> VisitResult {
        VisitResult::SkipChildren
    }

    fn visit_class_def(&mut self, _tree: &Tree, _id: NodeId, _node: &ClassDef) -> VisitResult {
        VisitResult::SkipChildren
    }

    fn visit_lambda(&mut self, _tree: &Tree, _id: NodeId, _node: &Lambda) -> VisitResult {
        VisitResult::SkipChildren
    }

    fn visit_global_stmt(&mut self, tree: &Tree, _id: NodeId, node: &GlobalStmt) -> VisitResult {
        self.globals.extend(names_of(tree, &node.names));
        VisitResult::SkipChildren
    }

    fn visit_nonlocal_stmt(&mut self, tree: &Tree, _id: NodeId, node: &NonlocalStmt) -> VisitResult {
        self.nonlocals.extend(names_of(tree, &node.names));
        VisitResult::SkipChildren
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuglint_python_cst::{parse_module, ParseOptions};

    fn build(source: &str) -> (Tree, SymbolTable) {
        let tree = parse_module(source, ParseOptions::default()).unwrap();
        let table = SymbolTable::build(&tree, "mod").unwrap();
        (tree, table)
    }

    /// Name nodes with the given text, in source order.
    fn names(tree: &Tree, text: &str) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = tree
            .ids()
            .filter(|&id| tree.node(id).as_name().is_some_and(|n| n.name == text))
            .collect();
        ids.sort_by_key(|&id| tree.span(id).start);
        ids
    }

    fn module_symbol(table: &SymbolTable, name: &str) -> SymbolId {
        let module = table.module_scope().unwrap();
        table.scope(module).lookup(name).unwrap()
    }

    #[test]
    fn test_module_variables_have_qualified_names() {
        let (tree, table) = build("x = 1\nprint(x)\n");
        let x = module_symbol(&table, "x");
        assert_eq!(table.symbol(x).fully_qualified_name.as_deref(), Some("mod.x"));
        let uses = names(&tree, "x");
        assert_eq!(table.symbol_of(uses[0]), Some(x));
        assert_eq!(table.symbol_of(uses[1]), Some(x));
        let kinds: Vec<UsageKind> = table.symbol(x).usages().iter().map(|u| u.kind).collect();
        assert_eq!(kinds, vec![UsageKind::Assignment, UsageKind::Other]);
    }

    #[test]
    fn test_function_locals_shadow_module_names() {
        let (tree, table) = build("x = 1\ndef f(a):\n    x = a\n    return x\n");
        let module_x = module_symbol(&table, "x");
        let uses = names(&tree, "x");
        let local_x = table.symbol_of(uses[1]).unwrap();
        assert_ne!(module_x, local_x);
        assert_eq!(table.symbol_of(uses[2]), Some(local_x));
        assert_eq!(table.symbol(local_x).fully_qualified_name, None);

        let f = module_symbol(&table, "f");
        let data = table.symbol(f).function_data().unwrap();
        assert_eq!(data.parameter_names, vec!["a".to_string()]);
        assert_eq!(table.symbol(f).fully_qualified_name.as_deref(), Some("mod.f"));
    }

    #[test]
    fn test_global_and_nonlocal_redirect_bindings() {
        let source = "\
count = 0
def bump():
    global count
    count += 1
def outer():
    total = 0
    def inner():
        nonlocal total
        total = 1
    return total
";
        let (tree, table) = build(source);
        let count = module_symbol(&table, "count");
        for id in names(&tree, "count") {
            assert_eq!(table.symbol_of(id), Some(count));
        }
        let totals = names(&tree, "total");
        let total = table.symbol_of(totals[0]).unwrap();
        for &id in &totals {
            assert_eq!(table.symbol_of(id), Some(total));
        }
        let bump_scope = table
            .scopes()
            .find(|(_, s)| s.kind == ScopeKind::Function && s.is_global("count"))
            .map(|(id, _)| id);
        assert!(bump_scope.is_some());
    }

    #[test]
    fn test_class_scope_is_skipped_by_methods() {
        let source = "\
x = 1
class A:
    x = 2
    y = x
    def m(self):
        return x
";
        let (tree, table) = build(source);
        let uses = names(&tree, "x");
        let module_x = module_symbol(&table, "x");
        let class_x = table.symbol_of(uses[1]).unwrap();
        assert_ne!(class_x, module_x);
        assert_eq!(table.symbol(class_x).fully_qualified_name.as_deref(), Some("mod.A.x"));
        assert_eq!(table.symbol_of(uses[2]), Some(class_x));
        assert_eq!(table.symbol_of(uses[3]), Some(module_x));
    }

    #[test]
    fn test_comprehension_scope() {
        let source = "items = [1]\nsquares = [i * i for i in items if i]\nlast = (y := 3)\n";
        let (tree, table) = build(source);
        let uses = names(&tree, "i");
        let i = table.symbol_of(uses[0]).unwrap();
        assert!(uses.iter().all(|&id| table.symbol_of(id) == Some(i)));
        assert!(table.scope(table.module_scope().unwrap()).lookup("i").is_none());
        assert!(table.scopes().any(|(_, s)| s.kind == ScopeKind::Comprehension));
        assert!(table.scope(table.module_scope().unwrap()).lookup("y").is_some());
    }

    #[test]
    fn test_imports() {
        let source = "\
import os.path
import collections.abc as cabc
from typing import List as L, Dict
from . import sibling
";
        let (_, table) = build(source);
        let fqn = |name: &str| table.symbol(module_symbol(&table, name)).fully_qualified_name.clone();
        assert_eq!(fqn("os").as_deref(), Some("os"));
        assert_eq!(fqn("cabc").as_deref(), Some("collections.abc"));
        assert_eq!(fqn("L").as_deref(), Some("typing.List"));
        assert_eq!(fqn("Dict").as_deref(), Some("typing.Dict"));
        assert_eq!(fqn("sibling"), None);
    }

    #[test]
    fn test_redefinition_is_ambiguous() {
        let source = "def f(): pass\nclass f: pass\nf()\n";
        let (tree, table) = build(source);
        let f = module_symbol(&table, "f");
        assert!(table.symbol(f).is_ambiguous());
        let alternatives = table.symbol(f).alternatives();
        assert_eq!(alternatives.len(), 2);
        assert!(table.symbol(alternatives[0]).is_function());
        assert!(table.symbol(alternatives[1]).is_class());
        let uses = names(&tree, "f");
        assert_eq!(table.symbol_of(uses[0]), Some(alternatives[0]));
        assert_eq!(table.symbol_of(uses[2]), Some(f));
    }

    #[test]
    fn test_function_then_assignment_is_ambiguous() {
        let (_, table) = build("def g(): pass\ng = 1\n");
        let g = module_symbol(&table, "g");
        let alternatives = table.symbol(g).alternatives();
        assert_eq!(alternatives.len(), 2);
        assert!(!table.symbol(alternatives[1]).is_function());
    }

    #[test]
    fn test_function_data() {
        let source = "\
class A:
    @staticmethod
    def s(x): pass
    async def m(self, *args, **kwargs): pass
";
        let (_, table) = build(source);
        let a = module_symbol(&table, "A");
        let class = table.class_symbol(a).unwrap();
        let s = class.resolve_member("s").unwrap();
        let s = table.symbol(s).function_data().unwrap();
        assert!(s.has_decorators);
        assert_eq!(s.decorators, vec!["staticmethod".to_string()]);
        assert!(!s.is_instance_method);

        let m = table.class_symbol(a).unwrap().resolve_member("m").unwrap();
        assert_eq!(table.symbol(m).fully_qualified_name.as_deref(), Some("mod.A.m"));
        let m = table.symbol(m).function_data().unwrap();
        assert!(m.is_async);
        assert!(m.is_instance_method);
        assert!(m.has_variadic_parameter);
        assert_eq!(m.parameter_names, vec!["self", "args", "kwargs"]);
        assert!(m.definition.is_some());
    }

    #[test]
    fn test_class_bases_and_members() {
        let source = "\
import abc
class Base:
    def run(self):
        self.state = 1
class Child(Base, metaclass=abc.ABCMeta):
    pass
class Mixed(abc.ABC):
    pass
class Dynamic(make_base()):
    pass
";
        let (_, table) = build(source);
        let base = module_symbol(&table, "Base");
        let child = table.class_symbol(module_symbol(&table, "Child")).unwrap();
        assert_eq!(child.superclasses(), &[base]);
        assert!(!child.has_unresolved_type_hierarchy());
        assert!(child.resolve_member("run").is_some());
        assert!(child.resolve_member("state").is_some());

        let mixed = table.class_symbol(module_symbol(&table, "Mixed")).unwrap();
        assert!(mixed.is_or_extends_name("abc.ABC"));
        assert!(mixed.has_unresolved_type_hierarchy());

        let dynamic = table.class_symbol(module_symbol(&table, "Dynamic")).unwrap();
        assert!(dynamic.superclasses().is_empty());
        assert!(dynamic.has_unresolved_type_hierarchy());
    }

    #[test]
    fn test_builtin_bases_resolve() {
        let (_, table) = build("class MyError(ValueError):\n    pass\n");
        let class = table.class_symbol(module_symbol(&table, "MyError")).unwrap();
        assert!(class.is_or_extends_name("Exception"));
        assert!(!class.has_unresolved_type_hierarchy());
        assert!(class.can_have_member("args"));
        assert!(!class.can_have_member("missing"));
    }

    #[test]
    fn test_cyclic_bases_terminate() {
        let (_, table) = build("class x(y): pass\nclass y(z): pass\nclass z(x): pass\n");
        let x = table.class_symbol(module_symbol(&table, "x")).unwrap();
        assert!(!x.has_unresolved_type_hierarchy());
        assert!(x.is_or_extends(module_symbol(&table, "y")));
        assert!(!x.is_or_extends_name("a"));
    }

    #[test]
    fn test_loop_with_and_except_bindings() {
        let source = "\
for k, v in pairs:
    pass
with open(p) as handle:
    pass
try:
    pass
except OSError as err:
    raise err
";
        let (tree, table) = build(source);
        let kind_of = |name: &str| table.symbol(module_symbol(&table, name)).usages()[0].kind;
        assert_eq!(kind_of("k"), UsageKind::LoopDeclaration);
        assert_eq!(kind_of("v"), UsageKind::LoopDeclaration);
        assert_eq!(kind_of("handle"), UsageKind::WithInstance);
        assert_eq!(kind_of("err"), UsageKind::ExceptionInstance);
        let open = table.symbol_of(names(&tree, "open")[0]).unwrap();
        assert!(table.is_builtin(open));
        assert_eq!(table.symbol_of(names(&tree, "pairs")[0]), None);
    }
}
