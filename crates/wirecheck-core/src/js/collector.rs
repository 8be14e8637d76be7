//! Walks one parsed file and records function definitions, DOM queries and
//! call sites.

use std::collections::HashSet;

use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    AssignExpr, AssignTarget, CallExpr, Callee, Class, ClassDecl, ClassMethod, ClassProp,
    Constructor, Decl, DefaultDecl, ExportDecl, ExportDefaultDecl, ExportDefaultExpr,
    ExportSpecifier, Expr, ExprOrSpread, FnDecl, FnExpr, KeyValueProp,
    Lit, MemberExpr, MemberProp, MethodKind, MethodProp, ModuleExportName, NamedExport, NewExpr,
    OptCall, OptChainBase, OptChainExpr, Pat, PrivateMethod, Prop, PropName, PropOrSpread,
    SimpleAssignTarget, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::parser::{ParseError, ParsedFile};
use crate::model::{
    CallKind, CallSiteRecord, DYNAMIC_SELECTOR, DomQueryRecord, FunctionDef, FunctionKind,
    QueryMethod,
};

const GLOBAL_OBJECTS: &[&str] = &["window", "globalThis", "self"];

/// Everything learned from a single file. Merged into the function registry
/// in discovery order.
#[derive(Debug, Clone, Default)]
pub struct FileModel {
    pub file_path: String,
    pub definitions: Vec<FunctionDef>,
    pub dom_queries: Vec<DomQueryRecord>,
    pub call_sites: Vec<(String, CallSiteRecord)>,
    /// Errors swc recovered from while still producing a tree.
    pub recovered_errors: Vec<ParseError>,
}

pub fn collect(file: &ParsedFile, file_path: &str) -> FileModel {
    let mut collector = FunctionCollector {
        file,
        model: FileModel {
            file_path: file_path.to_string(),
            recovered_errors: file.errors().to_vec(),
            ..Default::default()
        },
        contexts: Vec::new(),
        exported_classes: Vec::new(),
        exported_names: HashSet::new(),
    };

    if let Some(module) = file.module() {
        module.visit_with(&mut collector);
    }

    collector.finish()
}

struct FunctionCollector<'a> {
    file: &'a ParsedFile,
    model: FileModel,
    /// One entry per enclosing function; `None` for anonymous ones.
    contexts: Vec<Option<String>>,
    exported_classes: Vec<bool>,
    /// Names exported by a form that does not define them in place.
    exported_names: HashSet<String>,
}

impl FunctionCollector<'_> {
    fn finish(mut self) -> FileModel {
        for def in &mut self.model.definitions {
            if self.exported_names.contains(&def.name) {
                def.is_exported = true;
            }
        }
        self.model
    }

    fn current_context(&self) -> Option<String> {
        self.contexts.iter().rev().find_map(|c| c.clone())
    }

    fn is_top_level(&self) -> bool {
        self.contexts.is_empty()
    }

    fn with_context(&mut self, name: Option<String>, f: impl FnOnce(&mut Self)) {
        self.contexts.push(name);
        f(self);
        self.contexts.pop();
    }

    fn define(&mut self, name: &str, span: Span, kind: FunctionKind, is_exported: bool) {
        let line_number = self.file.line_of(span);
        self.model.definitions.push(FunctionDef {
            name: name.to_string(),
            file_path: self.model.file_path.clone(),
            line_number,
            is_exported,
            kind,
        });
    }

    fn record_call(&mut self, name: &str, span: Span, kind: CallKind, via_global: bool) {
        let record = CallSiteRecord {
            file_path: self.model.file_path.clone(),
            line_number: self.file.line_of(span),
            context: self.current_context(),
            kind,
            via_global,
        };
        self.model.call_sites.push((name.to_string(), record));
    }

    fn handle_fn_decl(&mut self, node: &FnDecl, exported: bool) {
        let name = node.ident.sym.to_string();
        self.define(&name, node.ident.span, FunctionKind::Declaration, exported);
        self.with_context(Some(name), |this| node.function.visit_with(this));
    }

    fn handle_var_declarator(&mut self, node: &VarDeclarator, exported: bool) {
        let (Pat::Ident(binding), Some(init)) = (&node.name, node.init.as_deref()) else {
            node.visit_children_with(self);
            return;
        };
        let name = binding.id.sym.to_string();

        match unwrap_paren(init) {
            Expr::Fn(fn_expr) => {
                self.define(&name, binding.id.span, FunctionKind::Expression, exported);
                self.with_context(Some(name), |this| fn_expr.function.visit_with(this));
            }
            Expr::Arrow(arrow) if self.is_top_level() => {
                self.define(&name, binding.id.span, FunctionKind::Arrow, exported);
                self.with_context(Some(name), |this| arrow.visit_children_with(this));
            }
            _ => node.visit_children_with(self),
        }
    }

    fn handle_class(&mut self, class: &Class, exported: bool) {
        self.exported_classes.push(exported);
        class.visit_children_with(self);
        self.exported_classes.pop();
    }

    fn class_is_exported(&self) -> bool {
        self.exported_classes.last().copied().unwrap_or(false)
    }

    fn inspect_call(&mut self, callee: &Expr, args: &[ExprOrSpread], span: Span) {
        if let Some((receiver, method)) = member_call(callee) {
            if let Some(query) = QueryMethod::from_name(method) {
                self.record_query(query, args.first(), span);
            }

            // A bare receiver is recorded when the callee is visited.
            if matches!(method, "bind" | "call" | "apply") && !is_bare_ident(receiver) {
                if let Some((target, via_global)) = callee_name(receiver) {
                    self.record_call(target, span, CallKind::Reference, via_global);
                }
            }
        }

        if let Some((name, via_global)) = callee_name(callee) {
            self.record_call(name, span, CallKind::Call, via_global);
        }
    }

    /// Visits a call's callee and arguments. A bare identifier callee is
    /// already recorded as a call, not as a reference.
    fn visit_call_parts(&mut self, callee: &Expr, args: &[ExprOrSpread]) {
        if !is_bare_ident(callee) {
            callee.visit_with(self);
        }
        for arg in args {
            arg.visit_with(self);
        }
    }

    fn record_query(&mut self, method: QueryMethod, first_arg: Option<&ExprOrSpread>, span: Span) {
        let Some(arg) = first_arg else {
            return;
        };
        let selector = match arg.spread {
            Some(_) => None,
            None => literal_string(&arg.expr),
        }
        .unwrap_or_else(|| DYNAMIC_SELECTOR.to_string());

        self.model.dom_queries.push(DomQueryRecord {
            method,
            selector,
            file_path: self.model.file_path.clone(),
            line_number: self.file.line_of(span),
            function_context: self.current_context(),
        });
    }

    fn export_assignment(&mut self, name: &str, value: &Expr) {
        self.exported_names.insert(name.to_string());

        match unwrap_paren(value) {
            Expr::Fn(fn_expr) => {
                self.define(name, fn_expr.function.span, FunctionKind::Expression, true);
                self.with_context(Some(name.to_string()), |this| {
                    fn_expr.function.visit_with(this)
                });
            }
            Expr::Arrow(arrow) => {
                self.define(name, arrow.span, FunctionKind::Arrow, true);
                self.with_context(Some(name.to_string()), |this| {
                    arrow.visit_children_with(this)
                });
            }
            Expr::Ident(ident) => {
                self.exported_names.insert(ident.sym.to_string());
                self.record_call(ident.sym.as_ref(), ident.span, CallKind::Reference, false);
            }
            other => other.visit_with(self),
        }
    }

    fn export_object(&mut self, value: &Expr) {
        match unwrap_paren(value) {
            Expr::Object(object) => {
                for prop in &object.props {
                    let PropOrSpread::Prop(prop) = prop else {
                        continue;
                    };
                    match prop.as_ref() {
                        Prop::Shorthand(ident) => {
                            self.exported_names.insert(ident.sym.to_string());
                        }
                        Prop::KeyValue(kv) => {
                            if let Some(key) = prop_name(&kv.key) {
                                self.exported_names.insert(key);
                            }
                            if let Expr::Ident(ident) = unwrap_paren(&kv.value) {
                                self.exported_names.insert(ident.sym.to_string());
                            }
                        }
                        Prop::Method(method) => {
                            if let Some(key) = prop_name(&method.key) {
                                self.exported_names.insert(key);
                            }
                        }
                        _ => {}
                    }
                }
            }
            Expr::Ident(ident) => {
                self.exported_names.insert(ident.sym.to_string());
            }
            Expr::Fn(FnExpr {
                ident: Some(ident), ..
            }) => {
                self.exported_names.insert(ident.sym.to_string());
            }
            _ => {}
        }
        value.visit_with(self);
    }
}

impl Visit for FunctionCollector<'_> {
    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.handle_fn_decl(node, false);
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        self.handle_var_declarator(node, false);
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        let name = node.ident.as_ref().map(|ident| ident.sym.to_string());
        self.with_context(name, |this| node.function.visit_with(this));
    }

    fn visit_arrow_expr(&mut self, node: &swc_ecma_ast::ArrowExpr) {
        self.with_context(None, |this| node.visit_children_with(this));
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.handle_class(&node.class, false);
    }

    fn visit_class_expr(&mut self, node: &swc_ecma_ast::ClassExpr) {
        self.handle_class(&node.class, false);
    }

    fn visit_constructor(&mut self, node: &Constructor) {
        self.with_context(Some("constructor".to_string()), |this| {
            node.visit_children_with(this)
        });
    }

    fn visit_class_method(&mut self, node: &ClassMethod) {
        let name = prop_name(&node.key);
        if let (Some(name), MethodKind::Method) = (&name, node.kind) {
            let exported = self.class_is_exported();
            self.define(name, node.key.span(), FunctionKind::ClassMethod, exported);
        }
        self.with_context(name, |this| node.function.visit_with(this));
    }

    fn visit_private_method(&mut self, node: &PrivateMethod) {
        let name = format!("#{}", node.key.name);
        self.with_context(Some(name), |this| node.function.visit_with(this));
    }

    fn visit_class_prop(&mut self, node: &ClassProp) {
        let name = prop_name(&node.key);
        match (name, node.value.as_deref().map(unwrap_paren)) {
            (Some(name), Some(Expr::Fn(fn_expr))) => {
                let exported = self.class_is_exported();
                self.define(&name, node.key.span(), FunctionKind::ClassProperty, exported);
                self.with_context(Some(name), |this| fn_expr.function.visit_with(this));
            }
            (Some(name), Some(Expr::Arrow(arrow))) => {
                let exported = self.class_is_exported();
                self.define(&name, node.key.span(), FunctionKind::ClassProperty, exported);
                self.with_context(Some(name), |this| arrow.visit_children_with(this));
            }
            _ => node.visit_children_with(self),
        }
    }

    fn visit_method_prop(&mut self, node: &MethodProp) {
        let name = prop_name(&node.key);
        if let Some(name) = &name {
            self.define(name, node.key.span(), FunctionKind::ObjectMethod, false);
        }
        self.with_context(name, |this| node.function.visit_with(this));
    }

    fn visit_key_value_prop(&mut self, node: &KeyValueProp) {
        let name = prop_name(&node.key);
        match (name, unwrap_paren(&node.value)) {
            (Some(name), Expr::Fn(fn_expr)) => {
                self.define(&name, node.key.span(), FunctionKind::ObjectMethod, false);
                self.with_context(Some(name), |this| fn_expr.function.visit_with(this));
            }
            (Some(name), Expr::Arrow(arrow)) => {
                self.define(&name, node.key.span(), FunctionKind::ObjectMethod, false);
                self.with_context(Some(name), |this| arrow.visit_children_with(this));
            }
            _ => node.visit_children_with(self),
        }
    }

    fn visit_prop(&mut self, node: &Prop) {
        if let Prop::Shorthand(ident) = node {
            self.record_call(ident.sym.as_ref(), ident.span, CallKind::Reference, false);
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        match &node.callee {
            Callee::Expr(callee) => {
                self.inspect_call(callee, &node.args, node.span);
                self.visit_call_parts(callee, &node.args);
            }
            _ => node.visit_children_with(self),
        }
    }

    fn visit_opt_chain_expr(&mut self, node: &OptChainExpr) {
        match opt_call(&node.base) {
            Some(call) => {
                self.inspect_call(&call.callee, &call.args, call.span);
                self.visit_call_parts(&call.callee, &call.args);
            }
            None => node.visit_children_with(self),
        }
    }

    fn visit_new_expr(&mut self, node: &NewExpr) {
        if let Some((name, via_global)) = callee_name(&node.callee) {
            self.record_call(name, node.span, CallKind::Construct, via_global);
        }
        self.visit_call_parts(&node.callee, node.args.as_deref().unwrap_or_default());
    }

    /// Any other identifier read counts as a reference: `[onSave]`,
    /// `const alias = f`, `return f`, `cond ? a : b`, `{f}` in JSX.
    fn visit_expr(&mut self, node: &Expr) {
        if let Expr::Ident(ident) = node {
            self.record_call(ident.sym.as_ref(), ident.span, CallKind::Reference, false);
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        if let Some(target) = assign_member(&node.left) {
            match export_target(target) {
                Some(ExportTarget::Named(name)) => {
                    self.export_assignment(name, &node.right);
                    return;
                }
                Some(ExportTarget::ModuleObject) => {
                    self.export_object(&node.right);
                    return;
                }
                None => {}
            }
        }
        node.visit_children_with(self);
    }

    fn visit_export_decl(&mut self, node: &ExportDecl) {
        match &node.decl {
            Decl::Fn(fn_decl) => self.handle_fn_decl(fn_decl, true),
            Decl::Var(var) => {
                for declarator in &var.decls {
                    self.handle_var_declarator(declarator, true);
                }
            }
            Decl::Class(class) => self.handle_class(&class.class, true),
            _ => node.visit_children_with(self),
        }
    }

    fn visit_export_default_decl(&mut self, node: &ExportDefaultDecl) {
        match &node.decl {
            DefaultDecl::Fn(fn_expr) => {
                let name = fn_expr.ident.as_ref().map(|ident| ident.sym.to_string());
                if let (Some(name), Some(ident)) = (&name, &fn_expr.ident) {
                    self.define(name, ident.span, FunctionKind::Declaration, true);
                }
                self.with_context(name, |this| fn_expr.function.visit_with(this));
            }
            DefaultDecl::Class(class) => self.handle_class(&class.class, true),
            _ => node.visit_children_with(self),
        }
    }

    fn visit_export_default_expr(&mut self, node: &ExportDefaultExpr) {
        if let Expr::Ident(ident) = unwrap_paren(&node.expr) {
            self.exported_names.insert(ident.sym.to_string());
        }
        node.visit_children_with(self);
    }

    fn visit_named_export(&mut self, node: &NamedExport) {
        if node.src.is_some() {
            return;
        }
        for specifier in &node.specifiers {
            if let ExportSpecifier::Named(named) = specifier {
                if let ModuleExportName::Ident(ident) = &named.orig {
                    self.exported_names.insert(ident.sym.to_string());
                }
            }
        }
    }
}

enum ExportTarget<'a> {
    /// `window.f`, `globalThis.f`, `self.f`, `exports.f`, `module.exports.f`
    Named(&'a str),
    /// `module.exports`
    ModuleObject,
}

fn export_target(member: &MemberExpr) -> Option<ExportTarget<'_>> {
    let MemberProp::Ident(prop) = &member.prop else {
        return None;
    };
    let prop = prop.sym.as_ref();

    match unwrap_paren(&member.obj) {
        Expr::Ident(obj) if GLOBAL_OBJECTS.contains(&obj.sym.as_ref()) => {
            Some(ExportTarget::Named(prop))
        }
        Expr::Ident(obj) if obj.sym.as_ref() == "exports" => Some(ExportTarget::Named(prop)),
        Expr::Ident(obj) if obj.sym.as_ref() == "module" && prop == "exports" => {
            Some(ExportTarget::ModuleObject)
        }
        Expr::Member(inner) if is_module_exports(inner) => Some(ExportTarget::Named(prop)),
        _ => None,
    }
}

fn is_module_exports(member: &MemberExpr) -> bool {
    let is_module = matches!(unwrap_paren(&member.obj), Expr::Ident(obj) if obj.sym.as_ref() == "module");
    let is_exports = matches!(&member.prop, MemberProp::Ident(prop) if prop.sym.as_ref() == "exports");
    is_module && is_exports
}

fn assign_member(target: &AssignTarget) -> Option<&MemberExpr> {
    match target {
        AssignTarget::Simple(SimpleAssignTarget::Member(member)) => Some(member),
        _ => None,
    }
}

fn is_bare_ident(expr: &Expr) -> bool {
    matches!(unwrap_paren(expr), Expr::Ident(_))
}

fn opt_call(base: &OptChainBase) -> Option<&OptCall> {
    match base {
        OptChainBase::Call(call) => Some(call),
        OptChainBase::Member(_) => None,
    }
}

pub(crate) fn unwrap_paren(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_paren(&paren.expr),
        other => other,
    }
}

/// Receiver and method name of `obj.method` or `obj?.method`.
fn member_call(callee: &Expr) -> Option<(&Expr, &str)> {
    match unwrap_paren(callee) {
        Expr::Member(member) => member_parts(member),
        Expr::OptChain(chain) => {
            let base: &OptChainBase = &chain.base;
            match base {
                OptChainBase::Member(member) => member_parts(member),
                OptChainBase::Call(_) => None,
            }
        }
        _ => None,
    }
}

fn member_parts(member: &MemberExpr) -> Option<(&Expr, &str)> {
    match &member.prop {
        MemberProp::Ident(prop) => Some((&member.obj, prop.sym.as_ref())),
        _ => None,
    }
}

/// Name a call site is recorded under, and whether it goes through a global object.
fn callee_name(callee: &Expr) -> Option<(&str, bool)> {
    match unwrap_paren(callee) {
        Expr::Ident(ident) => Some((ident.sym.as_ref(), false)),
        expr => {
            let (receiver, name) = member_call(expr)?;
            let via_global = matches!(
                unwrap_paren(receiver),
                Expr::Ident(obj) if GLOBAL_OBJECTS.contains(&obj.sym.as_ref())
            );
            Some((name, via_global))
        }
    }
}

fn literal_string(expr: &Expr) -> Option<String> {
    match unwrap_paren(expr) {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            Some(tpl.quasis.first().map(|q| q.raw.to_string()).unwrap_or_default())
        }
        _ => None,
    }
}

fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        _ => None,
    }
}
