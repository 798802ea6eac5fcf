//! Recursive expression/statement evaluator (§4.5) — the core of this crate.
//!
//! Grounded on the teacher's `interpreter/mod.rs` (`Interpreter::run_expression`
//! / `run_statement` / `run_block` / `run_fn_call` dispatch shape), generalized
//! from its 4-variant value model and ad hoc built-ins into the full spec:
//! typed call protocol with positional + default parameters, struct
//! construction, and the `StatementResult` control-flow channel.
mod statement_result;

pub use statement_result::{Flow, StatementResult};

use log::trace;

use crate::ast::{
    Access, AccessAssign, Ast, BinaryVerb, Block, Expression, FunctionBody, FunctionCall,
    FunctionDef, FunctionLiteral, If, InitArgs, InitExpr, ListExpr, Literal, Param, Position,
    Statement, StructDef, TypeName, UnaryOp, UnaryVerb, VarAssign, VarDef, While,
};
use crate::builtins;
use crate::context::{conforms, ContextRef};
use crate::error::{err, ErrorKind, EvalError};
use crate::value::{
    arithmetic, bitwise, logical, ordering, unary, AccessModifier, Function, StructInstance,
    StructType, UserFunction, Value,
};

/// Owns the global context and drives evaluation of a whole program.
pub struct Evaluator {
    global: ContextRef,
}

impl Evaluator {
    /// Construct a fresh evaluator: a root context seeded with the built-in
    /// registry (§4.4), matching spec §2's data-flow description ("the
    /// evaluator constructs a root context seeded with built-ins").
    pub fn new() -> Result<Self, EvalError> {
        let global = ContextRef::new_root("global");
        let root_position = Position::new("<builtins>", 0, 0);
        builtins::install(&global, &root_position)?;
        Ok(Self { global })
    }

    pub fn global(&self) -> &ContextRef {
        &self.global
    }

    /// Evaluate a whole program: visit each top-level statement in order,
    /// returning the last statement's value. Non-`Normal` flow escaping the
    /// top level (a `break`/`continue` with no enclosing loop) is a runtime
    /// error; `return` outside a function is already rejected inside
    /// `eval_statement` itself (§4.5.6).
    pub fn run(&self, ast: &Ast) -> Result<Value, EvalError> {
        let mut last = Value::Null;
        for statement in ast.nodes() {
            let result = self.eval_statement(statement, &self.global)?;
            if !result.is_normal() {
                return Err(err(
                    ErrorKind::RuntimeError,
                    "break/continue/return escaped to top level",
                    statement.position(),
                ));
            }
            last = result.value;
        }
        Ok(last)
    }

    // ---------------------------------------------------------------- //
    // Statements
    // ---------------------------------------------------------------- //

    fn eval_statement(
        &self,
        statement: &Statement,
        ctx: &ContextRef,
    ) -> Result<StatementResult, EvalError> {
        match statement {
            Statement::ExpressionStmt(expr) => {
                Ok(StatementResult::normal(self.eval_expression(expr, ctx)?))
            }
            Statement::BlockStatement(block) => self.eval_block(block, ctx),
            Statement::VarDef(var_def) => self.eval_var_def(var_def, ctx),
            Statement::VarAssign(assign) => self.eval_var_assign(assign, ctx),
            Statement::AccessAssign(access_assign) => self.eval_access_assign(access_assign, ctx),
            Statement::FunctionDef(func_def) => self.eval_function_def(func_def, ctx),
            Statement::StructDef(struct_def) => self.eval_struct_def(struct_def, ctx),
            Statement::If(if_stmt) => self.eval_if(if_stmt, ctx),
            Statement::While(while_stmt) => self.eval_while(while_stmt, ctx),
            Statement::Return(expr, position) => self.eval_return(expr.as_ref(), position, ctx),
            Statement::Break(_) => Ok(StatementResult {
                value: Value::Null,
                flow: Flow::Break,
            }),
            Statement::Continue(_) => Ok(StatementResult {
                value: Value::Null,
                flow: Flow::Continue,
            }),
            Statement::Import(_) => Ok(StatementResult::normal(Value::Null)),
        }
    }

    /// Block entry/exit (§4.5.2, §5 "scoped acquisition"): a fresh child
    /// context is created for the block's own handle and dropped once this
    /// call returns — there is no separate "current context" variable to
    /// restore, so every exit path (including `?`-propagated errors)
    /// restores the caller's context for free.
    fn eval_block(&self, block: &Block, ctx: &ContextRef) -> Result<StatementResult, EvalError> {
        let name = format!("<Block {}>", block.position);
        trace!("entering {name}");
        let child = ctx.child(name);
        let mut last = StatementResult::normal(Value::Null);
        for statement in &block.statements {
            let result = self.eval_statement(statement, &child)?;
            if !result.is_normal() {
                return Ok(result);
            }
            last = result;
        }
        Ok(last)
    }

    fn eval_var_def(&self, var_def: &VarDef, ctx: &ContextRef) -> Result<StatementResult, EvalError> {
        let (type_name, value) = match (&var_def.type_name, &var_def.initializer) {
            (TypeName::Inferred, Some(initializer)) => {
                let value = self.eval_expression(initializer, ctx)?;
                (value.type_name(), value)
            }
            (declared, Some(initializer)) => {
                let value = self.eval_expression(initializer, ctx)?;
                if !conforms(declared, &value) {
                    return Err(err(
                        ErrorKind::VariableTypeMismatch,
                        format!(
                            "initializer has type '{}', expected '{declared}'",
                            value.type_name()
                        ),
                        &var_def.position,
                    ));
                }
                (declared.clone(), value)
            }
            (declared, None) => (declared.clone(), default_value_for(declared)),
        };

        let access_modifier = access_modifier_for(var_def.is_public, var_def.is_const);
        ctx.def(&var_def.name, type_name, access_modifier, value.clone(), &var_def.position)?;
        Ok(StatementResult::normal(value))
    }

    fn eval_var_assign(
        &self,
        assign: &VarAssign,
        ctx: &ContextRef,
    ) -> Result<StatementResult, EvalError> {
        let value = self.eval_expression(&assign.value, ctx)?;
        ctx.set(&assign.name, value.clone(), &assign.position)?;
        Ok(StatementResult::normal(value))
    }

    fn eval_access_assign(
        &self,
        access_assign: &AccessAssign,
        ctx: &ContextRef,
    ) -> Result<StatementResult, EvalError> {
        let target = self.eval_expression(&access_assign.target, ctx)?;
        let Value::StructInstance(instance) = target else {
            return Err(err(
                ErrorKind::ValueError,
                format!(
                    "cannot access field '{}' on a value of type '{}'",
                    access_assign.field,
                    target.type_name()
                ),
                &access_assign.position,
            ));
        };
        let value = self.eval_expression(&access_assign.value, ctx)?;
        instance
            .context()
            .set(&access_assign.field, value.clone(), &access_assign.position)?;
        Ok(StatementResult::normal(value))
    }

    fn eval_function_def(
        &self,
        func_def: &FunctionDef,
        ctx: &ContextRef,
    ) -> Result<StatementResult, EvalError> {
        let function = Function::new_user(UserFunction {
            name: Some(func_def.name.clone()),
            params: func_def.params.clone(),
            defaults: func_def.defaults.clone(),
            variadic: func_def.variadic,
            return_type: func_def.return_type.clone(),
            body: func_def.body.clone(),
            closure: ctx.clone(),
        });
        let access_modifier = access_modifier_for(func_def.is_public, true);
        ctx.def(
            &func_def.name,
            TypeName::Function,
            access_modifier,
            Value::Function(function),
            &func_def.position,
        )?;
        Ok(StatementResult::normal(Value::Null))
    }

    fn eval_struct_def(
        &self,
        struct_def: &StructDef,
        ctx: &ContextRef,
    ) -> Result<StatementResult, EvalError> {
        let struct_type = StructType::new(struct_def.name.clone(), struct_def.fields.clone(), ctx.clone());
        let access_modifier = access_modifier_for(struct_def.is_public, true);
        ctx.def(
            &struct_def.name,
            TypeName::Struct(struct_def.name.clone()),
            access_modifier,
            Value::StructType(struct_type),
            &struct_def.position,
        )?;
        Ok(StatementResult::normal(Value::Null))
    }

    fn eval_if(&self, if_stmt: &If, ctx: &ContextRef) -> Result<StatementResult, EvalError> {
        if self.eval_condition(&if_stmt.condition, ctx)? {
            return self.eval_block(&if_stmt.body, ctx);
        }
        for elif in &if_stmt.elifs {
            if self.eval_condition(&elif.condition, ctx)? {
                return self.eval_block(&elif.block, ctx);
            }
        }
        if let Some(else_block) = &if_stmt.else_block {
            return self.eval_block(else_block, ctx);
        }
        Ok(StatementResult::normal(Value::Null))
    }

    fn eval_while(&self, while_stmt: &While, ctx: &ContextRef) -> Result<StatementResult, EvalError> {
        loop {
            if !self.eval_condition(&while_stmt.condition, ctx)? {
                return Ok(StatementResult::normal(Value::Null));
            }
            let result = self.eval_block(&while_stmt.body, ctx)?;
            match result.flow {
                Flow::Normal | Flow::Continue => continue,
                Flow::Break => return Ok(StatementResult::normal(Value::Null)),
                Flow::Return => return Ok(result),
            }
        }
    }

    fn eval_condition(&self, expr: &Expression, ctx: &ContextRef) -> Result<bool, EvalError> {
        match self.eval_expression(expr, ctx)? {
            Value::Bool(b) => Ok(b),
            other => Err(err(
                ErrorKind::ConditionType,
                format!("condition must be Bool, got '{}'", other.type_name()),
                expr.position(),
            )),
        }
    }

    /// `return` first walks the scope chain for a `"<Function "` frame
    /// (§4.5.6); if none is found it is a hard error.
    fn eval_return(
        &self,
        expr: Option<&Expression>,
        position: &Position,
        ctx: &ContextRef,
    ) -> Result<StatementResult, EvalError> {
        if ctx.innermost_function_scope().is_none() {
            return Err(err(
                ErrorKind::ReturnOutsideFunction,
                "'return' used outside of a function",
                position,
            ));
        }
        let value = match expr {
            Some(expr) => self.eval_expression(expr, ctx)?,
            None => Value::Null,
        };
        Ok(StatementResult {
            value,
            flow: Flow::Return,
        })
    }

    // ---------------------------------------------------------------- //
    // Expressions
    // ---------------------------------------------------------------- //

    fn eval_expression(&self, expr: &Expression, ctx: &ContextRef) -> Result<Value, EvalError> {
        match expr {
            Expression::ValueLiteral(literal, _) => Ok(literal_to_value(literal)),
            Expression::VarRef(name, position) => ctx.get(name).ok_or_else(|| {
                err(
                    ErrorKind::UndefinedVariable,
                    format!("undefined variable '{name}'"),
                    position,
                )
            }),
            Expression::Binary(binary_op) => {
                let lhs = self.eval_expression(&binary_op.lhs, ctx)?;
                let rhs = self.eval_expression(&binary_op.rhs, ctx)?;
                self.eval_binary(binary_op.verb, &lhs, &rhs, &binary_op.position)
            }
            Expression::Unary(unary_op) => self.eval_unary(unary_op, ctx),
            Expression::FunctionCall(call) => self.eval_function_call(call, ctx),
            Expression::FunctionLiteral(literal) => Ok(self.eval_function_literal(literal, ctx)),
            Expression::InitExpr(init_expr) => self.eval_init_expr(init_expr, ctx),
            Expression::ListExpr(ListExpr { position, .. }) => Err(err(
                ErrorKind::NotSupported,
                "list expressions are not supported",
                position,
            )),
            Expression::Access(access) => self.eval_access(access, ctx),
        }
    }

    /// Binary dispatch (§4.5.1): both sides are already evaluated
    /// left-to-right by the caller — no short-circuiting (SPEC_FULL.md §9
    /// Open Question 1, pinned).
    fn eval_binary(
        &self,
        verb: BinaryVerb,
        lhs: &Value,
        rhs: &Value,
        position: &Position,
    ) -> Result<Value, EvalError> {
        use BinaryVerb::*;
        match verb {
            Add | Sub | Mul | Div | Mod | Pow => arithmetic(verb, lhs, rhs, position),
            Eq => Ok(Value::Bool(lhs == rhs)),
            NotEq => Ok(Value::Bool(lhs != rhs)),
            Lt | LtEq | Gt | GtEq => ordering(verb, lhs, rhs, position).map(Value::Bool),
            And | Or => logical(verb, lhs, rhs, position),
            BitAnd | BitOr | BitXor | Shl | Shr => bitwise(verb, lhs, rhs, position),
        }
    }

    fn eval_unary(&self, unary_op: &UnaryOp, ctx: &ContextRef) -> Result<Value, EvalError> {
        let operand = self.eval_expression(&unary_op.operand, ctx)?;
        unary(unary_op.verb, &operand, &unary_op.position)
    }

    fn eval_function_literal(&self, literal: &FunctionLiteral, ctx: &ContextRef) -> Value {
        let body = match &literal.body {
            FunctionBody::Block(block) => block.clone(),
            FunctionBody::Expr(expr) => Block {
                position: expr.position().clone(),
                statements: vec![Statement::Return(Some((**expr).clone()), expr.position().clone())],
            },
        };
        Value::Function(Function::new_user(UserFunction {
            name: None,
            params: literal.params.clone(),
            defaults: literal.defaults.clone(),
            variadic: literal.variadic,
            return_type: literal.return_type.clone(),
            body,
            closure: ctx.clone(),
        }))
    }

    fn eval_function_call(
        &self,
        call: &FunctionCall,
        ctx: &ContextRef,
    ) -> Result<Value, EvalError> {
        let callee = self.eval_expression(&call.callee, ctx)?;
        let Value::Function(function) = callee else {
            return Err(err(
                ErrorKind::NotAFunction,
                format!("cannot call a value of type '{}'", callee.type_name()),
                &call.position,
            ));
        };
        // §4.5.3 step 1: the arity check runs against the syntactic argument
        // count, before any argument expression is evaluated — an
        // out-of-range call must fail with ArgumentMismatch even if one of
        // the extra argument expressions would itself error.
        check_arity(&function, call.args.len(), &call.position)?;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval_expression(arg, ctx)?);
        }
        self.call_function(&function, args, ctx, &call.position)
    }

    /// Function call protocol (§4.5.3). Arity has already been checked by
    /// `eval_function_call` before arguments were evaluated.
    fn call_function(
        &self,
        function: &Function,
        args: Vec<Value>,
        caller_ctx: &ContextRef,
        position: &Position,
    ) -> Result<Value, EvalError> {
        if let Some(builtin) = function.as_builtin() {
            return (builtin.call)(&args, position);
        }

        let user = function.as_user().expect("function is user or builtin");
        let p = user.params.len();
        let n = p + user.defaults.len();

        // Step 2: positional arguments, already evaluated by the caller in
        // its own context, left-to-right. Type-check each against its
        // declared parameter type.
        let mut bound: Vec<(String, TypeName, Value)> = Vec::with_capacity(n);
        for (param, value) in user.params.iter().zip(args.iter()) {
            check_param_type(param, value, position)?;
            bound.push((param.name.clone(), param.type_name.clone(), value.clone()));
        }

        // Step 3: default-filling. Each unsupplied default is evaluated in
        // the *caller's* current context (SPEC_FULL.md §9 Open Question 3).
        let supplied_defaults = args.len() - p;
        for (i, default_param) in user.defaults.iter().enumerate() {
            if i < supplied_defaults {
                let value = args[p + i].clone();
                if !conforms(&default_param.type_name, &value) {
                    return Err(err(
                        ErrorKind::ArgumentTypeMismatch,
                        format!(
                            "argument '{}' has type '{}', expected '{}'",
                            default_param.name,
                            value.type_name(),
                            default_param.type_name
                        ),
                        position,
                    ));
                }
                bound.push((default_param.name.clone(), default_param.type_name.clone(), value));
            } else {
                let value = self.eval_expression(&default_param.default, caller_ctx)?;
                if !conforms(&default_param.type_name, &value) {
                    return Err(err(
                        ErrorKind::DefaultParameterType,
                        format!(
                            "default value for '{}' has type '{}', expected '{}'",
                            default_param.name,
                            value.type_name(),
                            default_param.type_name
                        ),
                        position,
                    ));
                }
                bound.push((default_param.name.clone(), default_param.type_name.clone(), value));
            }
        }

        // Step 4: create the call context; parent is the function's
        // *captured closure context*, never the caller's.
        let scope_name = format!(
            "<Function {}()>",
            user.name.as_deref().unwrap_or("<anonymous>")
        );
        let call_ctx = user.closure.child(scope_name);

        // Step 5: bind parameters as Const slots.
        for (name, type_name, value) in bound {
            call_ctx.def(&name, type_name, AccessModifier::Const, value, position)?;
        }

        // Step 6: execute the body.
        let result = self.eval_block(&user.body, &call_ctx)?;
        let return_value = match result.flow {
            Flow::Return => result.value,
            _ => Value::Null,
        };

        // Step 7: return-type check.
        if !matches!(user.return_type, TypeName::Any) && !conforms(&user.return_type, &return_value)
        {
            return Err(err(
                ErrorKind::ReturnTypeMismatch,
                format!(
                    "'{}' declares return type '{}' but returned '{}'",
                    user.name.as_deref().unwrap_or("<anonymous>"),
                    user.return_type,
                    return_value.type_name()
                ),
                position,
            ));
        }

        Ok(return_value)
    }

    fn eval_init_expr(&self, init_expr: &InitExpr, ctx: &ContextRef) -> Result<Value, EvalError> {
        let struct_value = self.eval_expression(&init_expr.struct_expr, ctx)?;
        let Value::StructType(struct_type) = struct_value else {
            return Err(err(
                ErrorKind::NotAFunction,
                format!(
                    "cannot construct an instance of a value of type '{}'",
                    struct_value.type_name()
                ),
                &init_expr.position,
            ));
        };

        let instance_ctx = struct_type.def_context().child(format!(
            "<Instance {}@{}>",
            struct_type.name(),
            struct_type.id()
        ));

        match &init_expr.args {
            InitArgs::Positional(exprs) => {
                if exprs.len() != struct_type.fields().len() {
                    return Err(err(
                        ErrorKind::ArgumentMismatch,
                        format!(
                            "struct '{}' has {} field(s), got {} positional argument(s)",
                            struct_type.name(),
                            struct_type.fields().len(),
                            exprs.len()
                        ),
                        &init_expr.position,
                    ));
                }
                for (field, expr) in struct_type.fields().iter().zip(exprs.iter()) {
                    let value = self.eval_expression(expr, ctx)?;
                    self.bind_field(&instance_ctx, field, value, &init_expr.position)?;
                }
            }
            InitArgs::Named(pairs) => {
                for field in struct_type.fields() {
                    let value = match pairs.iter().find(|(name, _)| name == &field.name) {
                        Some((_, expr)) => self.eval_expression(expr, ctx)?,
                        None => self.eval_field_default(&struct_type, field, &init_expr.position)?,
                    };
                    self.bind_field(&instance_ctx, field, value, &init_expr.position)?;
                }
                for (name, _) in pairs {
                    if struct_type.field(name).is_none() {
                        return Err(err(
                            ErrorKind::UndefinedVariable,
                            format!("struct '{}' has no field '{name}'", struct_type.name()),
                            &init_expr.position,
                        ));
                    }
                }
            }
            InitArgs::Shorthand(names) => {
                for field in struct_type.fields() {
                    let value = match names.iter().find(|name| *name == &field.name) {
                        Some(name) => ctx.get(name).ok_or_else(|| {
                            err(
                                ErrorKind::UndefinedVariable,
                                format!("undefined variable '{name}'"),
                                &init_expr.position,
                            )
                        })?,
                        None => self.eval_field_default(&struct_type, field, &init_expr.position)?,
                    };
                    self.bind_field(&instance_ctx, field, value, &init_expr.position)?;
                }
            }
        }

        Ok(Value::StructInstance(StructInstance::new(
            struct_type,
            instance_ctx,
        )))
    }

    fn eval_field_default(
        &self,
        struct_type: &StructType,
        field: &crate::ast::FieldDecl,
        position: &Position,
    ) -> Result<Value, EvalError> {
        match &field.default_value {
            Some(expr) => self.eval_expression(expr, struct_type.def_context()),
            None => Ok(default_value_for(&field.type_name)),
        }
    }

    fn bind_field(
        &self,
        instance_ctx: &ContextRef,
        field: &crate::ast::FieldDecl,
        value: Value,
        position: &Position,
    ) -> Result<(), EvalError> {
        if !conforms(&field.type_name, &value) {
            return Err(err(
                ErrorKind::VariableTypeMismatch,
                format!(
                    "field '{}' has type '{}', got '{}'",
                    field.name,
                    field.type_name,
                    value.type_name()
                ),
                position,
            ));
        }
        instance_ctx.def(
            &field.name,
            field.type_name.clone(),
            field.access_modifier,
            value,
            position,
        )
    }

    fn eval_access(&self, access: &Access, ctx: &ContextRef) -> Result<Value, EvalError> {
        let target = self.eval_expression(&access.target, ctx)?;
        let Value::StructInstance(instance) = target else {
            return Err(err(
                ErrorKind::ValueError,
                format!(
                    "cannot access field '{}' on a value of type '{}'",
                    access.field,
                    target.type_name()
                ),
                &access.position,
            ));
        };
        let Some(field) = instance.struct_type().field(&access.field) else {
            return Err(err(
                ErrorKind::UndefinedVariable,
                format!(
                    "struct '{}' has no field '{}'",
                    instance.struct_type().name(),
                    access.field
                ),
                &access.position,
            ));
        };
        if !field.access_modifier.is_public() {
            return Err(err(
                ErrorKind::ValueError,
                format!("field '{}' is not public", access.field),
                &access.position,
            ));
        }
        instance.context().get(&access.field).ok_or_else(|| {
            err(
                ErrorKind::UndefinedVariable,
                format!("field '{}' is not bound", access.field),
                &access.position,
            )
        })
    }
}

fn access_modifier_for(is_public: bool, is_const: bool) -> AccessModifier {
    match (is_public, is_const) {
        (true, true) => AccessModifier::PublicConst,
        (true, false) => AccessModifier::Public,
        (false, true) => AccessModifier::Const,
        (false, false) => AccessModifier::Normal,
    }
}

/// Default value for a declared type with no initializer (§4.5.4).
fn default_value_for(type_name: &TypeName) -> Value {
    match type_name {
        TypeName::Int => Value::Int(0),
        TypeName::Double => Value::Double(0.0),
        TypeName::String => Value::String(String::new()),
        TypeName::Bool => Value::Bool(false),
        _ => Value::Null,
    }
}

fn literal_to_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Int(i) => Value::Int(*i),
        Literal::Double(d) => Value::from_double(*d),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
    }
}

/// §4.5.3 step 1: validate the syntactic argument count against the
/// callee's arity before any argument expression is evaluated.
fn check_arity(function: &Function, arg_count: usize, position: &Position) -> Result<(), EvalError> {
    if let Some(builtin) = function.as_builtin() {
        if builtin.arity >= 0 && arg_count as i32 != builtin.arity {
            return Err(err(
                ErrorKind::BuiltinArgumentMismatch,
                format!(
                    "'{}' expects {} argument(s), got {arg_count}",
                    builtin.name, builtin.arity
                ),
                position,
            ));
        }
        return Ok(());
    }

    let user = function.as_user().expect("function is user or builtin");
    let p = user.params.len();
    let n = p + user.defaults.len();
    if arg_count < p || arg_count > n {
        return Err(err(
            ErrorKind::ArgumentMismatch,
            format!(
                "'{}' expects between {p} and {n} argument(s), got {arg_count}",
                user.name.as_deref().unwrap_or("<anonymous>")
            ),
            position,
        ));
    }
    Ok(())
}

fn check_param_type(param: &Param, value: &Value, position: &Position) -> Result<(), EvalError> {
    if conforms(&param.type_name, value) {
        Ok(())
    } else {
        Err(err(
            ErrorKind::ArgumentTypeMismatch,
            format!(
                "argument '{}' has type '{}', expected '{}'",
                param.name,
                value.type_name(),
                param.type_name
            ),
            position,
        ))
    }
}
