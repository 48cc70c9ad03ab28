//! The bidirectional typer and the top-level driver.
//!
//! The central procedure is [`Checker::check_expr`]: inference when no
//! expected type is given, checking against it when one is. Dispatch is by
//! tree shape. Every rule either returns the expression's type or returns
//! `None` after registering a diagnostic; the driver keeps going with the
//! next declaration, so all errors in a program surface in one run.
//!
//! Three extension flags cut across the rules. Structural subtyping turns
//! equality checks into subtype checks. Ambiguous-as-bottom turns
//! ambiguous-type errors into `Bottom` syntheses. Type reconstruction
//! replaces equality checks with constraints that the driver solves after
//! the body pass.

use lumen_syntax::{
    Decl, Expr, ExprKind, FieldBinding, FunDecl, MatchArm, Param, Pattern, Program, TypeExpr,
};
use rustc_hash::FxHashMap;

use crate::context::TypeContext;
use crate::error::{Diagnostic, DiagnosticSink, ErrorKind, NodeRef};
use crate::extensions::ExtensionSet;
use crate::patterns;
use crate::translate::translate;
use crate::ty::{duplicate_label, field_type, Ty};
use crate::unify::{ConstraintStore, Solution, VarSupply};

const MAIN: &str = "main";

/// The checker: owns the diagnostic sink, the constraint store, and the
/// type-variable supply for one program check.
pub struct Checker {
    extensions: ExtensionSet,
    sink: DiagnosticSink,
    constraints: ConstraintStore,
    vars: VarSupply,
}

impl Checker {
    pub fn new(extensions: ExtensionSet) -> Self {
        Checker {
            extensions,
            sink: DiagnosticSink::new(),
            constraints: ConstraintStore::new(),
            vars: VarSupply::new(),
        }
    }

    /// Run the whole pipeline: structure check, signature pass, body pass,
    /// and (under reconstruction) constraint solving.
    pub fn check_program(mut self, program: &Program) -> Vec<Diagnostic> {
        self.check_structure(program);

        let mut root = TypeContext::root();
        self.collect_signatures(&program.decls, &mut root);
        for decl in &program.decls {
            if let Decl::Fun(fun) = decl {
                self.check_fun(fun, &root);
            }
        }

        if self.extensions.type_reconstruction() {
            match self.constraints.solve() {
                Solution::Satisfied => {}
                Solution::Conflict { expected, actual, origin } => self.sink.report(
                    ErrorKind::UnexpectedTypeForExpression,
                    vec![expected.into(), actual.into(), origin.into()],
                ),
                Solution::Infinite { origin } => self
                    .sink
                    .report(ErrorKind::OccursCheckInfiniteType, vec![origin.into()]),
            }
        }

        self.sink.into_diagnostics()
    }

    // ── Structure check ─────────────────────────────────────────────────

    /// Exactly one `main` with exactly one parameter.
    fn check_structure(&mut self, program: &Program) {
        let main = program.decls.iter().find_map(|decl| match decl {
            Decl::Fun(fun) if fun.name == MAIN => Some(fun),
            _ => None,
        });
        match main {
            None => self.sink.report(ErrorKind::MissingMain, vec![]),
            Some(fun) if fun.params.len() != 1 => self
                .sink
                .report(ErrorKind::IncorrectArityOfMain, vec![fun.params.len().into()]),
            Some(_) => {}
        }
    }

    // ── Signature pass ──────────────────────────────────────────────────

    /// Register every function signature and exception-type declaration of
    /// `decls` in `ctx`, before any body is looked at.
    fn collect_signatures(&mut self, decls: &[Decl], ctx: &mut TypeContext<'_>) {
        for decl in decls {
            match decl {
                Decl::Fun(fun) => {
                    let signature = self.signature_of(fun, ctx);
                    ctx.bind_fun(fun.name.as_str(), signature);
                }
                Decl::ExceptionType(exc) => {
                    let ty = self.translate_annotation(&exc.ty, ctx);
                    ctx.set_exception(ty);
                }
            }
        }
    }

    /// The declared type of a function: `(param) -> (ret)`, wrapped in a
    /// `Forall` when the declaration carries type parameters. A parameter
    /// list left empty reads as a `Unit` parameter.
    fn signature_of(&mut self, fun: &FunDecl, ctx: &TypeContext<'_>) -> Ty {
        let param_ty = match fun.params.first() {
            Some(Param { ty, .. }) => translate(ty, &mut self.vars),
            None => Ty::Unit,
        };
        let ret_ty = translate(&fun.return_ty, &mut self.vars);
        let fun_ty = Ty::fun(param_ty, ret_ty);
        let signature = if fun.type_params.is_empty() {
            fun_ty
        } else {
            Ty::Forall(fun.type_params.clone(), Box::new(fun_ty))
        };
        self.check_resolved(&signature, ctx);
        self.check_labels(&signature);
        signature
    }

    // ── Body pass ───────────────────────────────────────────────────────

    fn check_fun(&mut self, fun: &FunDecl, parent: &TypeContext<'_>) {
        let Some(signature) = parent.lookup_fun(&fun.name).cloned() else {
            return;
        };
        let (type_params, fun_ty) = match signature {
            Ty::Forall(params, body) => (params, *body),
            other => (Vec::new(), other),
        };
        let Ty::Fun(param_ty, ret_ty) = fun_ty else {
            unreachable!("function signatures are always function types");
        };

        let mut ctx = parent.child();
        for param in &type_params {
            ctx.bind_generic(param.as_str());
        }
        if let Some(param) = fun.params.first() {
            ctx.bind_var(param.name.as_str(), (*param_ty).clone());
        }
        self.collect_signatures(&fun.decls, &mut ctx);
        for decl in &fun.decls {
            if let Decl::Fun(nested) = decl {
                self.check_fun(nested, &ctx);
            }
        }
        self.check_expr(&ctx, &fun.body, Some(&ret_ty));
    }

    // ── Annotation hygiene ──────────────────────────────────────────────

    /// Translate a user-written type annotation and validate it: every
    /// generic name must resolve in scope, and no record or variant may
    /// repeat a label.
    fn translate_annotation(&mut self, node: &TypeExpr, ctx: &TypeContext<'_>) -> Ty {
        let ty = translate(node, &mut self.vars);
        self.check_resolved(&ty, ctx);
        self.check_labels(&ty);
        ty
    }

    fn check_resolved(&mut self, ty: &Ty, ctx: &TypeContext<'_>) {
        for name in ty.free_generics() {
            if ctx.lookup_generic(&name).is_none() {
                self.sink.report(ErrorKind::UndefinedTypeVariable, vec![name.into()]);
            }
        }
    }

    fn check_labels(&mut self, ty: &Ty) {
        match ty {
            Ty::Record(fields) => {
                if duplicate_label(fields).is_some() {
                    self.sink
                        .report(ErrorKind::DuplicateRecordTypeFields, vec![ty.clone().into()]);
                }
                for (_, field) in fields {
                    self.check_labels(field);
                }
            }
            Ty::Variant(fields) => {
                if let Some(label) = duplicate_label(fields) {
                    self.sink.report(
                        ErrorKind::DuplicateVariantTypeFields,
                        vec![label.to_string().into(), ty.clone().into()],
                    );
                }
                for (_, field) in fields {
                    self.check_labels(field);
                }
            }
            Ty::Fun(param, ret) => {
                self.check_labels(param);
                self.check_labels(ret);
            }
            Ty::Tuple(items) => {
                for item in items {
                    self.check_labels(item);
                }
            }
            Ty::Sum(left, right) => {
                self.check_labels(left);
                self.check_labels(right);
            }
            Ty::List(elem) => self.check_labels(elem),
            Ty::Ref(inner) => self.check_labels(inner),
            Ty::Forall(_, body) => self.check_labels(body),
            _ => {}
        }
    }

    // ── The typer ───────────────────────────────────────────────────────

    /// Infer (no `expected`) or check (with it) one expression. Returns
    /// the expression's type, or `None` after a diagnostic.
    fn check_expr(
        &mut self,
        ctx: &TypeContext<'_>,
        expr: &Expr,
        expected: Option<&Ty>,
    ) -> Option<Ty> {
        match &expr.kind {
            ExprKind::True | ExprKind::False => self.validate(Ty::Bool, expected, expr),
            ExprKind::Int(_) => self.validate(Ty::Nat, expected, expr),
            ExprKind::Unit => self.validate(Ty::Unit, expected, expr),
            ExprKind::Var(name) => self.check_var(ctx, name, expected, expr),
            ExprKind::IsZero(inner) => {
                self.check_expr(ctx, inner, Some(&Ty::Nat))?;
                self.validate(Ty::Bool, expected, expr)
            }
            ExprKind::Succ(inner) | ExprKind::Pred(inner) => {
                self.check_expr(ctx, inner, Some(&Ty::Nat))?;
                self.validate(Ty::Nat, expected, expr)
            }
            ExprKind::If { cond, then_branch, else_branch } => {
                self.check_expr(ctx, cond, Some(&Ty::Bool))?;
                let then_ty = self.check_expr(ctx, then_branch, expected)?;
                self.check_expr(ctx, else_branch, Some(&then_ty))?;
                Some(then_ty)
            }
            ExprKind::Abstraction { param, param_ty, body } => {
                self.check_abstraction(ctx, param, param_ty, body, expected, expr)
            }
            ExprKind::TypeAbstraction { params, body } => {
                self.check_type_abstraction(ctx, params, body, expected, expr)
            }
            ExprKind::Apply { callee, arg } => {
                self.check_apply(ctx, callee, arg, expected, expr)
            }
            ExprKind::TypeApply { callee, args } => {
                self.check_type_apply(ctx, callee, args, expected, expr)
            }
            ExprKind::Seq { first, second } => {
                self.check_expr(ctx, first, Some(&Ty::Unit))?;
                self.check_expr(ctx, second, expected)
            }
            ExprKind::Ascribe { expr: inner, ty } => {
                let target = self.translate_annotation(ty, ctx);
                self.check_expr(ctx, inner, Some(&target))?;
                self.validate(target, expected, expr)
            }
            ExprKind::Let { pattern, value, body } => {
                self.check_let(ctx, pattern, value, body, expected)
            }
            ExprKind::Tuple(items) => self.check_tuple(ctx, items, expected, expr),
            ExprKind::TupleProj { expr: inner, index } => {
                self.check_tuple_proj(ctx, inner, *index, expected, expr)
            }
            ExprKind::Record(fields) => self.check_record(ctx, fields, expected, expr),
            ExprKind::FieldProj { expr: inner, label } => {
                self.check_field_proj(ctx, inner, label, expected, expr)
            }
            ExprKind::Match { scrutinee, arms } => {
                self.check_match(ctx, scrutinee, arms, expected, expr)
            }
            ExprKind::Inl(payload) => self.check_injection(ctx, payload, true, expected, expr),
            ExprKind::Inr(payload) => self.check_injection(ctx, payload, false, expected, expr),
            ExprKind::Variant { label, payload } => {
                self.check_variant(ctx, label, payload.as_deref(), expected, expr)
            }
            ExprKind::List(items) => self.check_list(ctx, items, expected, expr),
            ExprKind::Cons { head, tail } => self.check_cons(ctx, head, tail, expected, expr),
            ExprKind::Head(inner) => self.check_head(ctx, inner, expected, expr),
            ExprKind::Tail(inner) => self.check_tail(ctx, inner, expected, expr),
            ExprKind::IsEmpty(inner) => self.check_is_empty(ctx, inner, expected, expr),
            ExprKind::NewRef(inner) => self.check_new_ref(ctx, inner, expected, expr),
            ExprKind::Deref(inner) => self.check_deref(ctx, inner, expected, expr),
            ExprKind::Assign { target, value } => {
                self.check_assign(ctx, target, value, expected, expr)
            }
            ExprKind::MemoryAddress(address) => {
                self.check_memory_address(address, expected, expr)
            }
            ExprKind::NatRec { bound, initial, step } => {
                self.check_nat_rec(ctx, bound, initial, step, expected)
            }
            ExprKind::Fix(inner) => self.check_fix(ctx, inner, expected, expr),
            ExprKind::Panic => self.check_panic(expected, expr),
            ExprKind::Throw(payload) => self.check_throw(ctx, payload, expected, expr),
            ExprKind::TryWith { body, fallback } => {
                self.check_try_with(ctx, body, fallback, expected, expr)
            }
            ExprKind::TryCatch { body, pattern, handler } => {
                self.check_try_catch(ctx, body, pattern, handler, expected, expr)
            }
            ExprKind::TryCastAs { body, ty, pattern, arm, fallback } => {
                self.check_try_cast_as(ctx, body, ty, pattern, arm, fallback, expected)
            }
            ExprKind::Cast { expr: inner, ty } => {
                self.check_expr(ctx, inner, None)?;
                let target = self.translate_annotation(ty, ctx);
                self.validate(target, expected, expr)
            }
        }
    }

    fn check_var(
        &mut self,
        ctx: &TypeContext<'_>,
        name: &str,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let actual = ctx
            .lookup_var(name)
            .or_else(|| ctx.lookup_fun(name))
            .cloned();
        let Some(actual) = actual else {
            self.sink
                .report(ErrorKind::UndefinedVariable, vec![name.to_string().into()]);
            return None;
        };
        self.validate(actual, expected, expr)
    }

    fn check_abstraction(
        &mut self,
        ctx: &TypeContext<'_>,
        param: &str,
        param_ty: &TypeExpr,
        body: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let declared = self.translate_annotation(param_ty, ctx);
        match expected {
            None | Some(Ty::Top) => {
                let mut body_ctx = ctx.child();
                body_ctx.bind_var(param, declared.clone());
                let body_ty = self.check_expr(&body_ctx, body, None)?;
                self.validate(Ty::fun(declared, body_ty), expected, expr)
            }
            Some(Ty::Fun(expected_param, expected_ret)) => {
                let expected_param: &Ty = expected_param;
                let expected_ret: &Ty = expected_ret;
                if self.extensions.type_reconstruction() {
                    self.constraints.add(
                        declared.clone(),
                        expected_param.clone(),
                        NodeRef::expr(expr),
                    );
                } else {
                    let ok = expected_param
                        .is_subtype_of(&declared, self.extensions.structural_subtyping());
                    if !ok {
                        self.sink.report(
                            ErrorKind::UnexpectedTypeForParameter,
                            vec![
                                expected_param.clone().into(),
                                declared.into(),
                                NodeRef::text(param).into(),
                            ],
                        );
                        return None;
                    }
                }
                let mut body_ctx = ctx.child();
                body_ctx.bind_var(param, declared.clone());
                let body_ty = self.check_expr(&body_ctx, body, Some(expected_ret))?;
                Some(Ty::fun(declared, body_ty))
            }
            Some(var @ Ty::Var(_)) if self.extensions.type_reconstruction() => {
                let ret = self.vars.fresh();
                self.constraints.add(
                    var.clone(),
                    Ty::fun(declared.clone(), ret.clone()),
                    NodeRef::expr(expr),
                );
                let mut body_ctx = ctx.child();
                body_ctx.bind_var(param, declared.clone());
                let body_ty = self.check_expr(&body_ctx, body, Some(&ret))?;
                Some(Ty::fun(declared, body_ty))
            }
            Some(other) => {
                // Re-infer without expectation so the diagnostic can show
                // the function type the lambda actually has.
                let mut body_ctx = ctx.child();
                body_ctx.bind_var(param, declared.clone());
                let body_ty = self.check_expr(&body_ctx, body, None)?;
                self.sink.report(
                    ErrorKind::UnexpectedLambda,
                    vec![
                        other.clone().into(),
                        Ty::fun(declared, body_ty).into(),
                        NodeRef::expr(expr).into(),
                    ],
                );
                None
            }
        }
    }

    fn check_type_abstraction(
        &mut self,
        ctx: &TypeContext<'_>,
        params: &[String],
        body: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let mut body_ctx = ctx.child();
        for param in params {
            body_ctx.bind_generic(param.as_str());
        }
        let body_ty = self.check_expr(&body_ctx, body, None)?;
        // Prenex: a quantified body folds into one quantifier.
        let actual = match body_ty {
            Ty::Forall(inner_params, inner_body) => {
                let mut all = params.to_vec();
                all.extend(inner_params);
                Ty::Forall(all, inner_body)
            }
            body_ty => Ty::Forall(params.to_vec(), Box::new(body_ty)),
        };
        self.validate(actual, expected, expr)
    }

    fn check_apply(
        &mut self,
        ctx: &TypeContext<'_>,
        callee: &Expr,
        arg: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let callee_ty = self.check_expr(ctx, callee, None)?;
        if self.extensions.type_reconstruction() {
            let arg_ty = self.check_expr(ctx, arg, None)?;
            let ret = match expected {
                Some(ty) => ty.clone(),
                None => self.vars.fresh(),
            };
            self.constraints
                .add(callee_ty, Ty::fun(arg_ty, ret.clone()), NodeRef::expr(expr));
            return Some(ret);
        }
        match callee_ty {
            Ty::Fun(param, ret) => {
                self.check_expr(ctx, arg, Some(&*param))?;
                self.validate(*ret, expected, expr)
            }
            other => {
                self.sink.report(
                    ErrorKind::NotAFunction,
                    vec![other.into(), NodeRef::expr(callee).into()],
                );
                None
            }
        }
    }

    fn check_type_apply(
        &mut self,
        ctx: &TypeContext<'_>,
        callee: &Expr,
        args: &[TypeExpr],
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let callee_ty = self.check_expr(ctx, callee, None)?;
        let (params, body) = match callee_ty {
            Ty::Forall(params, body) => (params, body),
            other => {
                self.sink.report(
                    ErrorKind::NotAGenericFunction,
                    vec![other.into(), NodeRef::expr(callee).into()],
                );
                return None;
            }
        };
        if !matches!(*body, Ty::Fun(_, _)) {
            self.sink.report(
                ErrorKind::NotAGenericFunction,
                vec![Ty::Forall(params, body).into(), NodeRef::expr(callee).into()],
            );
            return None;
        }
        if params.len() != args.len() {
            self.sink.report(
                ErrorKind::IncorrectNumberOfTypeArguments,
                vec![params.len().into(), args.len().into()],
            );
            return None;
        }
        let mut subst = FxHashMap::default();
        for (param, arg) in params.iter().zip(args.iter()) {
            subst.insert(param.clone(), self.translate_annotation(arg, ctx));
        }
        let instantiated = body.substitute(&subst);
        // A parameter that survives instantiation has no binding anywhere.
        if let Some(unresolved) = instantiated
            .free_generics()
            .into_iter()
            .find(|name| ctx.lookup_generic(name).is_none())
        {
            self.sink
                .report(ErrorKind::UndefinedTypeVariable, vec![unresolved.into()]);
            return None;
        }
        self.validate(instantiated, expected, expr)
    }

    fn check_let(
        &mut self,
        ctx: &TypeContext<'_>,
        pattern: &Pattern,
        value: &Expr,
        body: &Expr,
        expected: Option<&Ty>,
    ) -> Option<Ty> {
        let value_ty = self.check_expr(ctx, value, None)?;
        if !patterns::is_compatible(pattern, &value_ty) {
            self.sink.report(
                ErrorKind::UnexpectedPatternForType,
                vec![braced([pattern.to_string()]).into(), value_ty.into()],
            );
            return None;
        }
        let mut body_ctx = ctx.child();
        if !self.bind_pattern(&mut body_ctx, pattern, &value_ty) {
            return None;
        }
        self.check_expr(&body_ctx, body, expected)
    }

    fn check_tuple(
        &mut self,
        ctx: &TypeContext<'_>,
        items: &[Expr],
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        match expected {
            None | Some(Ty::Tuple(_)) | Some(Ty::Top) | Some(Ty::Var(_)) => {}
            Some(other) => {
                let actual = self.infer_tuple(ctx, items)?;
                self.sink.report(
                    ErrorKind::UnexpectedTuple,
                    vec![other.clone().into(), actual.into(), NodeRef::expr(expr).into()],
                );
                return None;
            }
        }
        let actual = self.infer_tuple(ctx, items)?;
        self.validate(actual, expected, expr)
    }

    fn infer_tuple(&mut self, ctx: &TypeContext<'_>, items: &[Expr]) -> Option<Ty> {
        let mut types = Vec::with_capacity(items.len());
        for item in items {
            types.push(self.check_expr(ctx, item, None)?);
        }
        Some(Ty::Tuple(types))
    }

    fn check_tuple_proj(
        &mut self,
        ctx: &TypeContext<'_>,
        inner: &Expr,
        index: u64,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let tuple_ty = self.check_expr(ctx, inner, None)?;
        let items = match tuple_ty {
            Ty::Tuple(items) => items,
            other => {
                self.sink.report(
                    ErrorKind::NotATuple,
                    vec![other.into(), NodeRef::expr(inner).into()],
                );
                return None;
            }
        };
        // Projections are one-based.
        if index == 0 || index as usize > items.len() {
            self.sink.report(
                ErrorKind::TupleIndexOutOfBounds,
                vec![index.into(), items.len().into()],
            );
            return None;
        }
        let item_ty = items[index as usize - 1].clone();
        self.validate(item_ty, expected, expr)
    }

    fn check_record(
        &mut self,
        ctx: &TypeContext<'_>,
        fields: &[FieldBinding],
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        match expected {
            None | Some(Ty::Record(_)) | Some(Ty::Top) | Some(Ty::Var(_)) => {}
            Some(other) => {
                let actual = self.infer_record(ctx, fields)?;
                self.sink.report(
                    ErrorKind::UnexpectedRecord,
                    vec![other.clone().into(), actual.into(), NodeRef::expr(expr).into()],
                );
                return None;
            }
        }
        let actual = self.infer_record(ctx, fields)?;
        if let Ty::Record(actual_fields) = &actual {
            if duplicate_label(actual_fields).is_some() {
                self.sink
                    .report(ErrorKind::DuplicateRecordFields, vec![actual.clone().into()]);
                return None;
            }
        }
        if let Some(expected_ty @ Ty::Record(expected_fields)) = expected {
            let Ty::Record(actual_fields) = &actual else { unreachable!() };
            if duplicate_label(expected_fields).is_some() {
                self.sink.report(
                    ErrorKind::DuplicateRecordTypeFields,
                    vec![expected_ty.clone().into()],
                );
                return None;
            }
            let missing: Vec<&str> = expected_fields
                .iter()
                .map(|(label, _)| label.as_str())
                .filter(|label| field_type(actual_fields, label).is_none())
                .collect();
            if !missing.is_empty() {
                self.sink.report(
                    ErrorKind::MissingRecordFields,
                    vec![braced(missing).into(), expected_ty.clone().into()],
                );
                return None;
            }
            let extra: Vec<&str> = actual_fields
                .iter()
                .map(|(label, _)| label.as_str())
                .filter(|label| field_type(expected_fields, label).is_none())
                .collect();
            if !extra.is_empty() && !self.extensions.structural_subtyping() {
                self.sink.report(
                    ErrorKind::UnexpectedRecordFields,
                    vec![braced(extra).into(), expected_ty.clone().into()],
                );
                return None;
            }
            for (binding, (label, field_ty)) in fields.iter().zip(actual_fields.iter()) {
                let Some(want) = field_type(expected_fields, label) else {
                    continue; // extra field, permitted above
                };
                if self.extensions.type_reconstruction() {
                    self.constraints.add(
                        want.clone(),
                        field_ty.clone(),
                        NodeRef::expr(&binding.expr),
                    );
                } else if !field_ty
                    .is_subtype_of(want, self.extensions.structural_subtyping())
                {
                    self.sink.report(
                        ErrorKind::UnexpectedTypeForExpression,
                        vec![
                            want.clone().into(),
                            field_ty.clone().into(),
                            NodeRef::expr(&binding.expr).into(),
                        ],
                    );
                    return None;
                }
            }
            return Some(expected_ty.clone());
        }
        self.validate(actual, expected, expr)
    }

    fn infer_record(
        &mut self,
        ctx: &TypeContext<'_>,
        fields: &[FieldBinding],
    ) -> Option<Ty> {
        let mut types = Vec::with_capacity(fields.len());
        for field in fields {
            let ty = self.check_expr(ctx, &field.expr, None)?;
            types.push((field.label.clone(), ty));
        }
        Some(Ty::Record(types))
    }

    fn check_field_proj(
        &mut self,
        ctx: &TypeContext<'_>,
        inner: &Expr,
        label: &str,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let record_ty = self.check_expr(ctx, inner, None)?;
        let Ty::Record(fields) = &record_ty else {
            self.sink.report(
                ErrorKind::NotARecord,
                vec![record_ty.clone().into(), NodeRef::expr(inner).into()],
            );
            return None;
        };
        let Some(field_ty) = field_type(fields, label) else {
            self.sink.report(
                ErrorKind::UnexpectedFieldAccess,
                vec![label.to_string().into(), record_ty.clone().into()],
            );
            return None;
        };
        let field_ty = field_ty.clone();
        self.validate(field_ty, expected, expr)
    }

    fn check_match(
        &mut self,
        ctx: &TypeContext<'_>,
        scrutinee: &Expr,
        arms: &[MatchArm],
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let scrutinee_ty = self.check_expr(ctx, scrutinee, None)?;
        if arms.is_empty() {
            self.sink
                .report(ErrorKind::IllegalEmptyMatching, vec![NodeRef::expr(expr).into()]);
            return None;
        }
        let pattern_refs: Vec<&Pattern> = arms.iter().map(|arm| &arm.pattern).collect();
        let ill_typed = patterns::find_ill_typed(&pattern_refs, &scrutinee_ty);
        if !ill_typed.is_empty() {
            self.sink.report(
                ErrorKind::UnexpectedPatternForType,
                vec![
                    braced(ill_typed.iter().map(|p| p.to_string())).into(),
                    scrutinee_ty.into(),
                ],
            );
            return None;
        }
        // The first arm's type becomes the reference the remaining arms
        // are checked against when no outer expectation exists.
        let mut reference = expected.cloned();
        for arm in arms {
            let mut arm_ctx = ctx.child();
            if !self.bind_pattern(&mut arm_ctx, &arm.pattern, &scrutinee_ty) {
                return None;
            }
            let arm_ty = self.check_expr(&arm_ctx, &arm.body, reference.as_ref())?;
            if reference.is_none() {
                reference = Some(arm_ty);
            }
        }
        if !patterns::covers(&pattern_refs, &scrutinee_ty) {
            self.sink
                .report(ErrorKind::NonexhaustiveMatchPatterns, vec![scrutinee_ty.into()]);
            return None;
        }
        reference
    }

    fn check_injection(
        &mut self,
        ctx: &TypeContext<'_>,
        payload: &Expr,
        is_left: bool,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        match expected {
            None => {
                if self.extensions.type_reconstruction() {
                    let left = self.vars.fresh();
                    let right = self.vars.fresh();
                    let side = if is_left { &left } else { &right };
                    self.check_expr(ctx, payload, Some(side))?;
                    return Some(Ty::sum(left, right));
                }
                if self.extensions.ambiguous_as_bottom() {
                    self.check_expr(ctx, payload, None)?;
                    return Some(Ty::Bottom);
                }
                self.sink
                    .report(ErrorKind::AmbiguousSumType, vec![NodeRef::expr(expr).into()]);
                None
            }
            Some(sum @ Ty::Sum(left, right)) => {
                let side: &Ty = if is_left { left } else { right };
                self.check_expr(ctx, payload, Some(side))?;
                Some(sum.clone())
            }
            Some(Ty::Top) => {
                self.check_expr(ctx, payload, None)?;
                Some(Ty::Top)
            }
            Some(var @ Ty::Var(_)) if self.extensions.type_reconstruction() => {
                let left = self.vars.fresh();
                let right = self.vars.fresh();
                self.constraints.add(
                    var.clone(),
                    Ty::sum(left.clone(), right.clone()),
                    NodeRef::expr(expr),
                );
                let side = if is_left { &left } else { &right };
                self.check_expr(ctx, payload, Some(side))?;
                Some(Ty::sum(left, right))
            }
            Some(other) => {
                self.sink
                    .report(ErrorKind::UnexpectedInjection, vec![other.clone().into()]);
                None
            }
        }
    }

    fn check_variant(
        &mut self,
        ctx: &TypeContext<'_>,
        label: &str,
        payload: Option<&Expr>,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        match expected {
            None => {
                if self.extensions.type_reconstruction() {
                    let payload_ty = match payload {
                        Some(payload) => self.check_expr(ctx, payload, None)?,
                        None => Ty::Unit,
                    };
                    return Some(Ty::Variant(vec![(label.to_string(), payload_ty)]));
                }
                if self.extensions.ambiguous_as_bottom() {
                    if let Some(payload) = payload {
                        self.check_expr(ctx, payload, None)?;
                    }
                    return Some(Ty::Bottom);
                }
                self.sink
                    .report(ErrorKind::AmbiguousVariantType, vec![NodeRef::expr(expr).into()]);
                None
            }
            Some(variant @ Ty::Variant(fields)) => {
                let Some(field_ty) = field_type(fields, label) else {
                    self.sink.report(
                        ErrorKind::UnexpectedVariantLabel,
                        vec![
                            label.to_string().into(),
                            NodeRef::expr(expr).into(),
                            variant.clone().into(),
                        ],
                    );
                    return None;
                };
                let field_ty = field_ty.clone();
                match payload {
                    Some(payload) => {
                        self.check_expr(ctx, payload, Some(&field_ty))?;
                    }
                    // A nullary label reads as a unit payload.
                    None => {
                        self.validate(Ty::Unit, Some(&field_ty), expr)?;
                    }
                }
                Some(variant.clone())
            }
            Some(Ty::Top) => {
                if let Some(payload) = payload {
                    self.check_expr(ctx, payload, None)?;
                }
                Some(Ty::Top)
            }
            Some(var @ Ty::Var(_)) if self.extensions.type_reconstruction() => {
                let payload_ty = match payload {
                    Some(payload) => self.check_expr(ctx, payload, None)?,
                    None => Ty::Unit,
                };
                let actual = Ty::Variant(vec![(label.to_string(), payload_ty)]);
                self.constraints
                    .add(var.clone(), actual.clone(), NodeRef::expr(expr));
                Some(actual)
            }
            Some(other) => {
                let payload_ty = match payload {
                    Some(payload) => self.check_expr(ctx, payload, None)?,
                    None => Ty::Unit,
                };
                self.sink.report(
                    ErrorKind::UnexpectedVariant,
                    vec![
                        other.clone().into(),
                        Ty::Variant(vec![(label.to_string(), payload_ty)]).into(),
                        NodeRef::expr(expr).into(),
                    ],
                );
                None
            }
        }
    }

    fn check_list(
        &mut self,
        ctx: &TypeContext<'_>,
        items: &[Expr],
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        match expected {
            None | Some(Ty::List(_)) | Some(Ty::Top) | Some(Ty::Var(_)) => {}
            Some(other) => {
                let actual = self.check_list(ctx, items, None, expr)?;
                self.sink.report(
                    ErrorKind::UnexpectedList,
                    vec![other.clone().into(), actual.into(), NodeRef::expr(expr).into()],
                );
                return None;
            }
        }
        if items.is_empty() {
            return match expected {
                Some(list @ Ty::List(_)) => Some(list.clone()),
                Some(var @ Ty::Var(_)) if self.extensions.type_reconstruction() => {
                    let elem = self.vars.fresh();
                    let actual = Ty::list(elem);
                    self.constraints
                        .add(var.clone(), actual.clone(), NodeRef::expr(expr));
                    Some(actual)
                }
                _ => {
                    if self.extensions.type_reconstruction() {
                        return Some(Ty::list(self.vars.fresh()));
                    }
                    if self.extensions.ambiguous_as_bottom() {
                        return Some(Ty::list(Ty::Bottom));
                    }
                    self.sink
                        .report(ErrorKind::AmbiguousList, vec![NodeRef::expr(expr).into()]);
                    None
                }
            };
        }
        let mut types = Vec::with_capacity(items.len());
        for item in items {
            types.push(self.check_expr(ctx, item, None)?);
        }
        let list_ty = match expected {
            Some(list @ Ty::List(_)) => list.clone(),
            _ => Ty::list(types[0].clone()),
        };
        let Ty::List(elem) = &list_ty else { unreachable!() };
        for (item, item_ty) in items.iter().zip(types.iter()) {
            if self.extensions.type_reconstruction() {
                self.constraints
                    .add((**elem).clone(), item_ty.clone(), NodeRef::expr(item));
            } else if !item_ty.is_subtype_of(elem, self.extensions.structural_subtyping()) {
                self.sink.report(
                    ErrorKind::UnexpectedTypeForExpression,
                    vec![
                        list_ty.clone().into(),
                        item_ty.clone().into(),
                        NodeRef::expr(item).into(),
                    ],
                );
                return None;
            }
        }
        match expected {
            None | Some(Ty::List(_)) => Some(list_ty),
            _ => self.validate(list_ty, expected, expr),
        }
    }

    fn check_cons(
        &mut self,
        ctx: &TypeContext<'_>,
        head: &Expr,
        tail: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        match expected {
            None | Some(Ty::List(_)) | Some(Ty::Top) | Some(Ty::Var(_)) => {}
            Some(other) => {
                let actual = self.check_cons(ctx, head, tail, None, expr)?;
                self.sink.report(
                    ErrorKind::UnexpectedList,
                    vec![other.clone().into(), actual.into(), NodeRef::expr(expr).into()],
                );
                return None;
            }
        }
        let head_ty = self.check_expr(ctx, head, None)?;
        if let Some(list @ Ty::List(elem)) = expected {
            if self.extensions.type_reconstruction() {
                self.constraints
                    .add((**elem).clone(), head_ty.clone(), NodeRef::expr(head));
            } else if !head_ty.is_subtype_of(elem, self.extensions.structural_subtyping()) {
                self.sink.report(
                    ErrorKind::UnexpectedTypeForExpression,
                    vec![list.clone().into(), head_ty.into(), NodeRef::expr(head).into()],
                );
                return None;
            }
        }
        let actual = Ty::list(head_ty);
        self.check_expr(ctx, tail, Some(&actual))?;
        match expected {
            None | Some(Ty::List(_)) => Some(actual),
            _ => self.validate(actual, expected, expr),
        }
    }

    fn check_head(
        &mut self,
        ctx: &TypeContext<'_>,
        inner: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let list_ty = self.check_expr(ctx, inner, None)?;
        match list_ty {
            Ty::List(elem) => self.validate(*elem, expected, expr),
            var @ Ty::Var(_) if self.extensions.type_reconstruction() => {
                let elem = self.vars.fresh();
                self.constraints
                    .add(var, Ty::list(elem.clone()), NodeRef::expr(inner));
                self.validate(elem, expected, expr)
            }
            other => {
                self.sink.report(
                    ErrorKind::NotAList,
                    vec![other.into(), NodeRef::expr(inner).into()],
                );
                None
            }
        }
    }

    fn check_tail(
        &mut self,
        ctx: &TypeContext<'_>,
        inner: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let list_ty = self.check_expr(ctx, inner, None)?;
        match list_ty {
            list @ Ty::List(_) => self.validate(list, expected, expr),
            var @ Ty::Var(_) if self.extensions.type_reconstruction() => {
                let elem = self.vars.fresh();
                let list = Ty::list(elem);
                self.constraints
                    .add(var, list.clone(), NodeRef::expr(inner));
                self.validate(list, expected, expr)
            }
            other => {
                self.sink.report(
                    ErrorKind::NotAList,
                    vec![other.into(), NodeRef::expr(inner).into()],
                );
                None
            }
        }
    }

    fn check_is_empty(
        &mut self,
        ctx: &TypeContext<'_>,
        inner: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let list_ty = self.check_expr(ctx, inner, None)?;
        match list_ty {
            Ty::List(_) => {}
            var @ Ty::Var(_) if self.extensions.type_reconstruction() => {
                let elem = self.vars.fresh();
                self.constraints
                    .add(var, Ty::list(elem), NodeRef::expr(inner));
            }
            other => {
                self.sink.report(
                    ErrorKind::NotAList,
                    vec![other.into(), NodeRef::expr(inner).into()],
                );
                return None;
            }
        }
        self.validate(Ty::Bool, expected, expr)
    }

    fn check_new_ref(
        &mut self,
        ctx: &TypeContext<'_>,
        inner: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        match expected {
            Some(reference @ Ty::Ref(pointee)) => {
                let pointee: &Ty = pointee;
                self.check_expr(ctx, inner, Some(pointee))?;
                Some(reference.clone())
            }
            None | Some(Ty::Top) | Some(Ty::Var(_)) => {
                let inner_ty = self.check_expr(ctx, inner, None)?;
                self.validate(Ty::reference(inner_ty), expected, expr)
            }
            Some(other) => {
                let inner_ty = self.check_expr(ctx, inner, None)?;
                self.sink.report(
                    ErrorKind::UnexpectedReference,
                    vec![
                        other.clone().into(),
                        Ty::reference(inner_ty).into(),
                        NodeRef::expr(expr).into(),
                    ],
                );
                None
            }
        }
    }

    fn check_deref(
        &mut self,
        ctx: &TypeContext<'_>,
        inner: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let ref_ty = self.check_expr(ctx, inner, None)?;
        match ref_ty {
            Ty::Ref(pointee) => self.validate(*pointee, expected, expr),
            var @ Ty::Var(_) if self.extensions.type_reconstruction() => {
                let pointee = self.vars.fresh();
                self.constraints
                    .add(var, Ty::reference(pointee.clone()), NodeRef::expr(inner));
                self.validate(pointee, expected, expr)
            }
            other => {
                self.sink.report(
                    ErrorKind::NotAReference,
                    vec![other.into(), NodeRef::expr(inner).into()],
                );
                None
            }
        }
    }

    fn check_assign(
        &mut self,
        ctx: &TypeContext<'_>,
        target: &Expr,
        value: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let target_ty = self.check_expr(ctx, target, None)?;
        match target_ty {
            Ty::Ref(pointee) => {
                self.check_expr(ctx, value, Some(&*pointee))?;
            }
            var @ Ty::Var(_) if self.extensions.type_reconstruction() => {
                let pointee = self.vars.fresh();
                self.constraints
                    .add(var, Ty::reference(pointee.clone()), NodeRef::expr(target));
                self.check_expr(ctx, value, Some(&pointee))?;
            }
            other => {
                self.sink.report(
                    ErrorKind::NotAReference,
                    vec![other.into(), NodeRef::expr(target).into()],
                );
                return None;
            }
        }
        self.validate(Ty::Unit, expected, expr)
    }

    fn check_memory_address(
        &mut self,
        address: &str,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        match expected {
            Some(reference @ Ty::Ref(_)) => Some(reference.clone()),
            Some(var @ Ty::Var(_)) if self.extensions.type_reconstruction() => {
                let pointee = self.vars.fresh();
                let reference = Ty::reference(pointee);
                self.constraints
                    .add(var.clone(), reference.clone(), NodeRef::expr(expr));
                Some(reference)
            }
            Some(other) => {
                self.sink.report(
                    ErrorKind::UnexpectedMemoryAddress,
                    vec![address.to_string().into(), other.clone().into()],
                );
                None
            }
            None => {
                self.sink.report(
                    ErrorKind::AmbiguousReferenceType,
                    vec![NodeRef::expr(expr).into()],
                );
                None
            }
        }
    }

    fn check_nat_rec(
        &mut self,
        ctx: &TypeContext<'_>,
        bound: &Expr,
        initial: &Expr,
        step: &Expr,
        expected: Option<&Ty>,
    ) -> Option<Ty> {
        self.check_expr(ctx, bound, Some(&Ty::Nat))?;
        let initial_ty = self.check_expr(ctx, initial, expected)?;
        let step_ty = self.check_expr(ctx, step, None)?;
        if self.extensions.type_reconstruction() {
            let want = Ty::fun(Ty::Nat, Ty::fun(initial_ty.clone(), initial_ty.clone()));
            self.constraints.add(step_ty, want, NodeRef::expr(step));
            return Some(initial_ty);
        }
        // The step must be Nat -> (T -> T) with T the initial value's type;
        // each layer of that shape gets its own diagnostic.
        let (step_param, step_ret) = match step_ty {
            Ty::Fun(param, ret) => (param, ret),
            other => {
                self.sink.report(
                    ErrorKind::UnexpectedTypeForExpression,
                    vec![
                        Ty::fun(Ty::Unknown, Ty::Unknown).into(),
                        other.into(),
                        NodeRef::expr(step).into(),
                    ],
                );
                return None;
            }
        };
        if *step_param != Ty::Nat {
            self.sink.report(
                ErrorKind::UnexpectedTypeForParameter,
                vec![Ty::Nat.into(), (*step_param).into(), NodeRef::expr(step).into()],
            );
            return None;
        }
        let (iter_param, iter_ret) = match *step_ret {
            Ty::Fun(param, ret) => (param, ret),
            other => {
                self.sink.report(
                    ErrorKind::UnexpectedTypeForExpression,
                    vec![
                        Ty::fun(Ty::Unknown, Ty::Unknown).into(),
                        other.into(),
                        NodeRef::expr(step).into(),
                    ],
                );
                return None;
            }
        };
        if iter_param != iter_ret {
            self.sink.report(
                ErrorKind::UnexpectedTypeForExpression,
                vec![(*iter_ret).into(), (*iter_param).into(), NodeRef::expr(step).into()],
            );
            return None;
        }
        if *iter_param != initial_ty {
            self.sink.report(
                ErrorKind::UnexpectedTypeForExpression,
                vec![initial_ty.into(), (*iter_param).into(), NodeRef::expr(step).into()],
            );
            return None;
        }
        Some(initial_ty)
    }

    fn check_fix(
        &mut self,
        ctx: &TypeContext<'_>,
        inner: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let inner_ty = self.check_expr(ctx, inner, None)?;
        if self.extensions.type_reconstruction() {
            let ret = match expected {
                Some(ty) => ty.clone(),
                None => self.vars.fresh(),
            };
            self.constraints.add(
                inner_ty,
                Ty::fun(ret.clone(), ret.clone()),
                NodeRef::expr(expr),
            );
            return Some(ret);
        }
        let (param, ret) = match inner_ty {
            Ty::Fun(param, ret) => (param, ret),
            other => {
                self.sink.report(
                    ErrorKind::NotAFunction,
                    vec![other.into(), NodeRef::expr(inner).into()],
                );
                return None;
            }
        };
        if param != ret {
            self.sink.report(
                ErrorKind::UnexpectedTypeForExpression,
                vec![
                    Ty::fun((*param).clone(), (*param).clone()).into(),
                    Ty::Fun(param, ret).into(),
                    NodeRef::expr(inner).into(),
                ],
            );
            return None;
        }
        self.validate(*ret, expected, expr)
    }

    fn check_panic(&mut self, expected: Option<&Ty>, expr: &Expr) -> Option<Ty> {
        match expected {
            Some(ty) => Some(ty.clone()),
            None => {
                if self.extensions.type_reconstruction() {
                    return Some(self.vars.fresh());
                }
                if self.extensions.ambiguous_as_bottom() {
                    return Some(Ty::Bottom);
                }
                self.sink
                    .report(ErrorKind::AmbiguousPanicType, vec![NodeRef::expr(expr).into()]);
                None
            }
        }
    }

    fn check_throw(
        &mut self,
        ctx: &TypeContext<'_>,
        payload: &Expr,
        expected: Option<&Ty>,
        expr: &Expr,
    ) -> Option<Ty> {
        let Some(exception_ty) = ctx.exception().cloned() else {
            self.sink.report(ErrorKind::ExceptionTypeNotDeclared, vec![]);
            return None;
        };
        self.check_expr(ctx, payload, Some(&exception_ty))?;
        match expected {
            Some(ty) => Some(ty.clone()),
            None => {
                if self.extensions.type_reconstruction() {
                    return Some(self.vars.fresh());
                }
                if self.extensions.ambiguous_as_bottom() {
                    return Some(Ty::Bottom);
                }
                self.sink
                    .report(ErrorKind::AmbiguousThrowType, vec![NodeRef::expr(expr).into()]);
                None
            }
        }
    }

    fn check_try_with(
        &mut self,
        ctx: &TypeContext<'_>,
        body: &Expr,
        fallback: &Expr,
        expected: Option<&Ty>,
        _expr: &Expr,
    ) -> Option<Ty> {
        if ctx.exception().is_none() {
            self.sink.report(ErrorKind::ExceptionTypeNotDeclared, vec![]);
            return None;
        }
        let body_ty = self.check_expr(ctx, body, expected)?;
        self.check_expr(ctx, fallback, Some(&body_ty))?;
        Some(body_ty)
    }

    fn check_try_catch(
        &mut self,
        ctx: &TypeContext<'_>,
        body: &Expr,
        pattern: &Pattern,
        handler: &Expr,
        expected: Option<&Ty>,
        _expr: &Expr,
    ) -> Option<Ty> {
        let Some(exception_ty) = ctx.exception().cloned() else {
            self.sink.report(ErrorKind::ExceptionTypeNotDeclared, vec![]);
            return None;
        };
        let body_ty = self.check_expr(ctx, body, expected)?;
        if !patterns::is_compatible(pattern, &exception_ty) {
            self.sink.report(
                ErrorKind::UnexpectedPatternForType,
                vec![braced([pattern.to_string()]).into(), exception_ty.into()],
            );
            return None;
        }
        let mut handler_ctx = ctx.child();
        if !self.bind_pattern(&mut handler_ctx, pattern, &exception_ty) {
            return None;
        }
        self.check_expr(&handler_ctx, handler, Some(&body_ty))?;
        Some(body_ty)
    }

    #[allow(clippy::too_many_arguments)]
    fn check_try_cast_as(
        &mut self,
        ctx: &TypeContext<'_>,
        body: &Expr,
        ty: &TypeExpr,
        pattern: &Pattern,
        arm: &Expr,
        fallback: &Expr,
        expected: Option<&Ty>,
    ) -> Option<Ty> {
        // The tried expression's own type is unconstrained by the cast.
        self.check_expr(ctx, body, None)?;
        let target = self.translate_annotation(ty, ctx);
        if !patterns::is_compatible(pattern, &target) {
            self.sink.report(
                ErrorKind::UnexpectedPatternForType,
                vec![braced([pattern.to_string()]).into(), target.into()],
            );
            return None;
        }
        let mut arm_ctx = ctx.child();
        if !self.bind_pattern(&mut arm_ctx, pattern, &target) {
            return None;
        }
        let arm_ty = self.check_expr(&arm_ctx, arm, expected)?;
        self.check_expr(ctx, fallback, Some(&arm_ty))?;
        Some(arm_ty)
    }

    // ── Pattern binding ─────────────────────────────────────────────────

    /// Bind the variables of `pattern` against scrutinee type `ty` in
    /// `ctx`, recursing into sub-patterns. Shapes were already vetted by
    /// well-formedness; returns false only when binding itself finds a
    /// problem (duplicate record pattern labels, a pattern whose type an
    /// unresolved scrutinee cannot determine).
    fn bind_pattern(
        &mut self,
        ctx: &mut TypeContext<'_>,
        pattern: &Pattern,
        ty: &Ty,
    ) -> bool {
        let pattern = pattern.skip_ascriptions();
        if let Pattern::Var { name } = pattern {
            // First binding of a name within one pattern wins.
            if !ctx.bound_in_scope(name) {
                ctx.bind_var(name.as_str(), ty.clone());
            }
            return true;
        }
        match (pattern, ty) {
            // An unresolved scrutinee: the pattern's shape constrains it,
            // except variant patterns, whose label set cannot be invented.
            (pattern, var @ Ty::Var(_)) if self.extensions.type_reconstruction() => {
                let demanded = match pattern {
                    Pattern::True | Pattern::False => Ty::Bool,
                    Pattern::Int { .. } | Pattern::Succ { .. } => Ty::Nat,
                    Pattern::Unit => Ty::Unit,
                    Pattern::Inl { .. } | Pattern::Inr { .. } => {
                        Ty::sum(self.vars.fresh(), self.vars.fresh())
                    }
                    Pattern::Tuple { items } => {
                        Ty::Tuple(items.iter().map(|_| self.vars.fresh()).collect())
                    }
                    Pattern::Record { fields } => Ty::Record(
                        fields
                            .iter()
                            .map(|f| (f.label.clone(), self.vars.fresh()))
                            .collect(),
                    ),
                    Pattern::List { .. } | Pattern::Cons { .. } => {
                        Ty::list(self.vars.fresh())
                    }
                    Pattern::Variant { .. } => {
                        self.sink.report(
                            ErrorKind::AmbiguousPatternType,
                            vec![NodeRef::pattern(pattern).into()],
                        );
                        return false;
                    }
                    Pattern::Var { .. } | Pattern::Asc { .. } => unreachable!(),
                };
                self.constraints
                    .add(var.clone(), demanded.clone(), NodeRef::pattern(pattern));
                self.bind_pattern(ctx, pattern, &demanded)
            }
            (Pattern::True | Pattern::False | Pattern::Int { .. } | Pattern::Unit, _) => true,
            (Pattern::Succ { inner }, Ty::Nat) => self.bind_pattern(ctx, inner, &Ty::Nat),
            (Pattern::Inl { inner }, Ty::Sum(left, _)) => {
                let left = (**left).clone();
                self.bind_pattern(ctx, inner, &left)
            }
            (Pattern::Inr { inner }, Ty::Sum(_, right)) => {
                let right = (**right).clone();
                self.bind_pattern(ctx, inner, &right)
            }
            (Pattern::Tuple { items }, Ty::Tuple(elems)) => {
                let elems = elems.clone();
                items
                    .iter()
                    .zip(elems.iter())
                    .all(|(item, elem)| self.bind_pattern(ctx, item, elem))
            }
            (Pattern::Record { fields }, Ty::Record(tys)) => {
                for (i, field) in fields.iter().enumerate() {
                    if fields[..i].iter().any(|f| f.label == field.label) {
                        self.sink.report(
                            ErrorKind::DuplicateRecordPatternFields,
                            vec![NodeRef::pattern(pattern).into()],
                        );
                        return false;
                    }
                }
                let tys = tys.clone();
                fields.iter().all(|field| {
                    match field_type(&tys, &field.label) {
                        Some(field_ty) => {
                            let field_ty = field_ty.clone();
                            self.bind_pattern(ctx, &field.pattern, &field_ty)
                        }
                        None => true, // rejected by well-formedness already
                    }
                })
            }
            (Pattern::Variant { label, payload }, Ty::Variant(fields)) => {
                match (payload, field_type(fields, label).cloned()) {
                    (Some(payload), Some(field_ty)) => {
                        self.bind_pattern(ctx, payload, &field_ty)
                    }
                    _ => true,
                }
            }
            (Pattern::List { items }, Ty::List(elem)) => {
                let elem = (**elem).clone();
                items.iter().all(|item| self.bind_pattern(ctx, item, &elem))
            }
            (Pattern::Cons { head, tail }, Ty::List(elem)) => {
                let elem = (**elem).clone();
                self.bind_pattern(ctx, head, &elem) && self.bind_pattern(ctx, tail, ty)
            }
            _ => true,
        }
    }

    // ── The central validator ───────────────────────────────────────────

    /// Reconcile an inferred type with the expected one.
    ///
    /// With no expectation, the inferred type stands. Under reconstruction
    /// the pair becomes a constraint and the expectation stands. Otherwise
    /// tuple/record shapes are vetted for sharper diagnostics, then the
    /// subtype (or equality) check decides.
    fn validate(&mut self, actual: Ty, expected: Option<&Ty>, node: &Expr) -> Option<Ty> {
        let Some(expected) = expected else {
            return Some(actual);
        };
        if self.extensions.type_reconstruction() {
            self.constraints
                .add(expected.clone(), actual, NodeRef::expr(node));
            return Some(expected.clone());
        }
        let subtyping = self.extensions.structural_subtyping();
        match (&actual, expected) {
            (Ty::Tuple(a), Ty::Tuple(e)) if a.len() != e.len() => {
                self.sink.report(
                    ErrorKind::UnexpectedTupleLength,
                    vec![e.len().into(), a.len().into(), NodeRef::expr(node).into()],
                );
                return None;
            }
            (Ty::Record(a), Ty::Record(e)) => {
                if duplicate_label(a).is_some() {
                    self.sink
                        .report(ErrorKind::DuplicateRecordFields, vec![actual.clone().into()]);
                    return None;
                }
                if duplicate_label(e).is_some() {
                    self.sink.report(
                        ErrorKind::DuplicateRecordTypeFields,
                        vec![expected.clone().into()],
                    );
                    return None;
                }
                let missing: Vec<&str> = e
                    .iter()
                    .map(|(label, _)| label.as_str())
                    .filter(|label| field_type(a, label).is_none())
                    .collect();
                if !missing.is_empty() {
                    self.sink.report(
                        ErrorKind::MissingRecordFields,
                        vec![braced(missing).into(), expected.clone().into()],
                    );
                    return None;
                }
                let extra: Vec<&str> = a
                    .iter()
                    .map(|(label, _)| label.as_str())
                    .filter(|label| field_type(e, label).is_none())
                    .collect();
                if !extra.is_empty() && !subtyping {
                    self.sink.report(
                        ErrorKind::UnexpectedRecordFields,
                        vec![braced(extra).into(), expected.clone().into()],
                    );
                    return None;
                }
            }
            _ => {}
        }
        if actual.is_subtype_of(expected, subtyping) {
            Some(actual)
        } else {
            let kind = if subtyping {
                ErrorKind::UnexpectedSubtype
            } else {
                ErrorKind::UnexpectedTypeForExpression
            };
            self.sink.report(
                kind,
                vec![expected.clone().into(), actual.into(), NodeRef::expr(node).into()],
            );
            None
        }
    }
}

/// `{a, b, c}` — the brace-list form diagnostics quote field and pattern
/// collections in.
fn braced<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(flags: &[&str]) -> Checker {
        Checker::new(ExtensionSet::from_names(flags.iter().copied()))
    }

    fn check_in_root(checker: &mut Checker, expr: &Expr, expected: Option<&Ty>) -> Option<Ty> {
        let root = TypeContext::root();
        checker.check_expr(&root, expr, expected)
    }

    #[test]
    fn atoms_synthesize_their_types() {
        let mut c = checker(&[]);
        assert_eq!(check_in_root(&mut c, &Expr::bool(true), None), Some(Ty::Bool));
        assert_eq!(check_in_root(&mut c, &Expr::int(3), None), Some(Ty::Nat));
        assert_eq!(check_in_root(&mut c, &Expr::unit(), None), Some(Ty::Unit));
        assert!(c.sink.is_empty());
    }

    #[test]
    fn undefined_variable_reports() {
        let mut c = checker(&[]);
        assert_eq!(check_in_root(&mut c, &Expr::var("x"), None), None);
        assert_eq!(c.sink.diagnostics()[0].kind, ErrorKind::UndefinedVariable);
    }

    #[test]
    fn lambda_against_non_function_expectation() {
        let mut c = checker(&[]);
        let lambda = Expr::lambda("x", TypeExpr::Nat, Expr::var("x"));
        assert_eq!(check_in_root(&mut c, &lambda, Some(&Ty::Nat)), None);
        assert_eq!(c.sink.diagnostics()[0].kind, ErrorKind::UnexpectedLambda);
    }

    #[test]
    fn application_of_non_function() {
        let mut c = checker(&[]);
        let app = Expr::apply(Expr::int(1), Expr::int(2));
        assert_eq!(check_in_root(&mut c, &app, None), None);
        assert_eq!(c.sink.diagnostics()[0].kind, ErrorKind::NotAFunction);
    }

    #[test]
    fn braced_joins_with_commas() {
        assert_eq!(braced(["a", "b"]), "{a, b}");
        assert_eq!(braced(["only"]), "{only}");
    }
}
