use std::fmt;

use serde::Serialize;

use cql_core::{Type, Value};

use crate::config::{AggregateConfig, FunctionConfig};
use crate::error::{Result, SchemaError};
use crate::literal::parse_literal;
use crate::registry::{TypeRegistry, parse_schema_type};

/// `name(type,type)`, the identity of a function or aggregate within its
/// keyspace. Overloads differ only in their signature.
pub fn signature(name: &str, argument_types: &[Type]) -> String {
    let args: Vec<String> = argument_types.iter().map(Type::to_string).collect();
    format!("{name}({})", args.join(","))
}

// ════════════════════════════════════════════════════════════════
//  Function
// ════════════════════════════════════════════════════════════════

/// User-defined function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    simple_name: String,
    arguments: Vec<(String, Type)>,
    return_type: Type,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    called_on_null_input: bool,
    signature: String,
}

impl Function {
    pub fn new(simple_name: impl Into<String>, arguments: Vec<(String, Type)>, return_type: Type) -> Self {
        let simple_name = simple_name.into();
        let types: Vec<Type> = arguments.iter().map(|(_, t)| t.clone()).collect();
        Self {
            signature: signature(&simple_name, &types),
            simple_name,
            arguments,
            return_type,
            language: None,
            body: None,
            called_on_null_input: false,
        }
    }

    pub fn with_body(mut self, language: impl Into<String>, body: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self.body = Some(body.into());
        self
    }

    pub fn with_called_on_null_input(mut self, called: bool) -> Self {
        self.called_on_null_input = called;
        self
    }

    pub fn from_config(config: &FunctionConfig, registry: &TypeRegistry) -> Result<Self> {
        let ctx = format!("function '{}'", config.name);
        let arguments = config
            .arguments
            .iter()
            .map(|arg| {
                parse_schema_type(&arg.ty, registry)
                    .map(|ty| (arg.name.clone(), ty))
                    .map_err(|e| e.with_context(format!("{ctx} argument '{}'", arg.name)))
            })
            .collect::<Result<Vec<_>>>()?;
        let return_type = parse_schema_type(&config.returns, registry)
            .map_err(|e| e.with_context(format!("{ctx} return type")))?;

        let mut function = Function::new(&config.name, arguments, return_type)
            .with_called_on_null_input(config.called_on_null_input);
        function.language = config.language.clone();
        function.body = config.body.clone();
        Ok(function)
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    /// Full name, e.g. `avg_state(tuple<int, bigint>,int)`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn arguments(&self) -> &[(String, Type)] {
        &self.arguments
    }

    pub fn argument_types(&self) -> Vec<&Type> {
        self.arguments.iter().map(|(_, t)| t).collect()
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn is_called_on_null_input(&self) -> bool {
        self.called_on_null_input
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature)
    }
}

// ════════════════════════════════════════════════════════════════
//  Aggregate
// ════════════════════════════════════════════════════════════════

/// User-defined aggregate: folds rows through a state function, optionally
/// finishing with a final function.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    simple_name: String,
    argument_types: Vec<Type>,
    state_function: Function,
    final_function: Option<Function>,
    state_type: Type,
    initial_condition: Option<Value>,
    signature: String,
}

impl Aggregate {
    /// Build an aggregate. The state function must take the state type
    /// followed by the argument types; the final function, if any, must
    /// take the state type alone.
    pub fn new(
        simple_name: impl Into<String>,
        argument_types: Vec<Type>,
        state_type: Type,
        state_function: Function,
        final_function: Option<Function>,
    ) -> Result<Self> {
        let simple_name = simple_name.into();
        let sig = signature(&simple_name, &argument_types);

        let mut expected = vec![&state_type];
        expected.extend(argument_types.iter());
        if state_function.argument_types() != expected {
            return Err(SchemaError::Config(format!(
                "aggregate {sig}: state function {state_function} does not accept ({})",
                join(&expected)
            )));
        }
        if let Some(ffunc) = &final_function {
            if ffunc.argument_types() != [&state_type] {
                return Err(SchemaError::Config(format!(
                    "aggregate {sig}: final function {ffunc} does not accept ({state_type})"
                )));
            }
        }

        Ok(Self {
            simple_name,
            argument_types,
            state_function,
            final_function,
            state_type,
            initial_condition: None,
            signature: sig,
        })
    }

    /// Set the initial state. The value must be of the state type.
    pub fn with_initial_condition(mut self, value: Value) -> Result<Self> {
        let value = self
            .state_type
            .coerce(value)
            .map_err(|e| e.with_context(format!("aggregate {} initial condition", self.signature)))?;
        self.initial_condition = Some(value);
        Ok(self)
    }

    /// Build an aggregate from configuration. The state and final functions
    /// are looked up by signature in `functions`.
    pub fn from_config(
        config: &AggregateConfig,
        registry: &TypeRegistry,
        functions: &[Function],
    ) -> Result<Self> {
        let ctx = format!("aggregate '{}'", config.name);
        let argument_types = config
            .arguments
            .iter()
            .map(|t| parse_schema_type(t, registry))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.with_context(&ctx))?;
        let state_type =
            parse_schema_type(&config.state_type, registry).map_err(|e| e.with_context(&ctx))?;

        let lookup = |name: &str, args: &[Type]| {
            let sig = signature(name, args);
            functions
                .iter()
                .find(|f| f.signature() == sig)
                .cloned()
                .ok_or_else(|| SchemaError::Config(format!("{ctx}: unknown function {sig}")))
        };

        let mut state_args = vec![state_type.clone()];
        state_args.extend(argument_types.iter().cloned());
        let state_function = lookup(&config.state_function, &state_args)?;
        let final_function = config
            .final_function
            .as_deref()
            .map(|name| lookup(name, std::slice::from_ref(&state_type)))
            .transpose()?;

        let aggregate = Aggregate::new(
            &config.name,
            argument_types,
            state_type,
            state_function,
            final_function,
        )?;
        match &config.initial_condition {
            Some(literal) => {
                let value = parse_literal(aggregate.state_type(), literal)
                    .map_err(|e| SchemaError::from(e).with_context(&ctx))?;
                aggregate.with_initial_condition(value)
            }
            None => Ok(aggregate),
        }
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn argument_types(&self) -> &[Type] {
        &self.argument_types
    }

    pub fn state_function(&self) -> &Function {
        &self.state_function
    }

    pub fn final_function(&self) -> Option<&Function> {
        self.final_function.as_ref()
    }

    pub fn state_type(&self) -> &Type {
        &self.state_type
    }

    /// Final function's return type, or the state type without one.
    pub fn return_type(&self) -> &Type {
        self.final_function
            .as_ref()
            .map_or(&self.state_type, Function::return_type)
    }

    pub fn initial_condition(&self) -> Option<&Value> {
        self.initial_condition.as_ref()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "signature": self.signature,
            "state_function": self.state_function.signature(),
            "final_function": self.final_function.as_ref().map(Function::signature),
            "state_type": self.state_type,
            "return_type": self.return_type(),
            "initial_condition": self.initial_condition.as_ref().map(serde_json::Value::from),
        })
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature)
    }
}

fn join(types: &[&Type]) -> String {
    types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(",")
}
