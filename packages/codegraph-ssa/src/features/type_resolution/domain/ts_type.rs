//! Semantic types for JavaScript/TypeScript values
//!
//! Best-effort analysis hints, not a sound type system:
//! - Primitives: `number`, `string`, `boolean`, `undefined`, `null`
//! - Containers: slices (`T[]`), maps (`Map<K, V>`), named objects with
//!   type arguments (`Promise<T>`, `Set<T>`)
//! - Function and union types
//! - Blueprint types, in a static (class container) or instance view

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::ssa::domain::ids::BlueprintId;

pub const PROMISE: &str = "Promise";

/// Which side of a blueprint a value stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlueprintView {
    /// The class container itself (`A`)
    Static,
    /// An object built by `new A()`
    Instance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    Any,
    Number,
    String,
    Boolean,
    Undefined,
    Null,
    /// Named object, possibly generic: `Promise<T>`, `Date`
    Object { name: String, args: Vec<Type> },
    Slice(Box<Type>),
    Map { key: Box<Type>, value: Box<Type> },
    Function { params: Vec<Type>, ret: Box<Type> },
    Union(Vec<Type>),
    Blueprint {
        id: BlueprintId,
        name: String,
        view: BlueprintView,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Type {
    pub kind: TypeKind,
    /// Source-level names this type was reached through (aliases, annotations)
    pub names: Vec<String>,
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            names: Vec::new(),
        }
    }

    pub fn any() -> Self {
        Self::new(TypeKind::Any)
    }

    pub fn number() -> Self {
        Self::new(TypeKind::Number)
    }

    pub fn string() -> Self {
        Self::new(TypeKind::String)
    }

    pub fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }

    pub fn undefined() -> Self {
        Self::new(TypeKind::Undefined)
    }

    pub fn null() -> Self {
        Self::new(TypeKind::Null)
    }

    pub fn object(name: impl Into<String>, args: Vec<Type>) -> Self {
        Self::new(TypeKind::Object {
            name: name.into(),
            args,
        })
    }

    pub fn slice(element: Type) -> Self {
        Self::new(TypeKind::Slice(Box::new(element)))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Self::new(TypeKind::Map {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Self::new(TypeKind::Function {
            params,
            ret: Box::new(ret),
        })
    }

    pub fn promise(inner: Type) -> Self {
        Self::object(PROMISE, vec![inner])
    }

    pub fn blueprint(id: BlueprintId, name: impl Into<String>, view: BlueprintView) -> Self {
        Self::new(TypeKind::Blueprint {
            id,
            name: name.into(),
            view,
        })
    }

    /// Flattening, de-duplicating union; one member collapses to itself
    pub fn union(types: Vec<Type>) -> Self {
        let mut flattened: Vec<Type> = Vec::new();
        for ty in types {
            let members = match ty.kind {
                TypeKind::Union(inner) => inner,
                _ => vec![ty],
            };
            for member in members {
                if !flattened.iter().any(|t| t.kind == member.kind) {
                    flattened.push(member);
                }
            }
        }
        // `any` absorbs every other member
        if flattened.iter().any(|t| t.is_any()) {
            return Self::any();
        }
        match flattened.len() {
            0 => Self::any(),
            1 => flattened.remove(0),
            _ => Self::new(TypeKind::Union(flattened)),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.names.contains(&name) {
            self.names.push(name);
        }
        self
    }

    pub fn is_any(&self) -> bool {
        matches!(self.kind, TypeKind::Any)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.kind, TypeKind::Undefined)
    }

    /// `Promise` object, or a type whose full name says so
    pub fn is_promise(&self) -> bool {
        match &self.kind {
            TypeKind::Object { name, .. } if name == PROMISE => true,
            _ => self.full_name().starts_with("Promise<"),
        }
    }

    /// `T` of `Promise<T>`; `any` for a bare `Promise`
    pub fn promise_inner(&self) -> Option<Type> {
        if !self.is_promise() {
            return None;
        }
        match &self.kind {
            TypeKind::Object { args, .. } => Some(args.first().cloned().unwrap_or_else(Type::any)),
            _ => Some(Type::any()),
        }
    }

    /// Element type of slices, `any` otherwise
    pub fn element(&self) -> Type {
        match &self.kind {
            TypeKind::Slice(element) => element.as_ref().clone(),
            TypeKind::Map { value, .. } => value.as_ref().clone(),
            _ => Type::any(),
        }
    }

    pub fn return_type(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::Function { ret, .. } => Some(ret),
            _ => None,
        }
    }

    pub fn blueprint_ref(&self) -> Option<(BlueprintId, BlueprintView)> {
        match &self.kind {
            TypeKind::Blueprint { id, view, .. } => Some((*id, *view)),
            _ => None,
        }
    }

    /// Coarse category used for mismatch checks
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeKind::Any => "any",
            TypeKind::Number => "number",
            TypeKind::String => "string",
            TypeKind::Boolean => "boolean",
            TypeKind::Undefined => "undefined",
            TypeKind::Null => "null",
            TypeKind::Object { .. } => "object",
            TypeKind::Slice(_) => "slice",
            TypeKind::Map { .. } => "map",
            TypeKind::Function { .. } => "function",
            TypeKind::Union(_) => "union",
            TypeKind::Blueprint { .. } => "blueprint",
        }
    }

    /// Result of JavaScript `typeof`, when the type decides it
    pub fn typeof_name(&self) -> Option<&'static str> {
        let name = match &self.kind {
            TypeKind::Number => "number",
            TypeKind::String => "string",
            TypeKind::Boolean => "boolean",
            TypeKind::Undefined => "undefined",
            TypeKind::Null | TypeKind::Object { .. } | TypeKind::Slice(_) | TypeKind::Map { .. } => {
                "object"
            }
            TypeKind::Function { .. } => "function",
            TypeKind::Blueprint {
                view: BlueprintView::Static,
                ..
            } => "function",
            TypeKind::Blueprint {
                view: BlueprintView::Instance,
                ..
            } => "object",
            TypeKind::Any | TypeKind::Union(_) => return None,
        };
        Some(name)
    }

    pub fn full_name(&self) -> String {
        match &self.kind {
            TypeKind::Any => "any".to_string(),
            TypeKind::Number => "number".to_string(),
            TypeKind::String => "string".to_string(),
            TypeKind::Boolean => "boolean".to_string(),
            TypeKind::Undefined => "undefined".to_string(),
            TypeKind::Null => "null".to_string(),
            TypeKind::Object { name, args } if args.is_empty() => name.clone(),
            TypeKind::Object { name, args } => format!("{}<{}>", name, join(args, ", ")),
            TypeKind::Slice(element) => match element.kind {
                TypeKind::Union(_) | TypeKind::Function { .. } => {
                    format!("({})[]", element.full_name())
                }
                _ => format!("{}[]", element.full_name()),
            },
            TypeKind::Map { key, value } => {
                format!("Map<{}, {}>", key.full_name(), value.full_name())
            }
            TypeKind::Function { params, ret } => {
                format!("({}) => {}", join(params, ", "), ret.full_name())
            }
            TypeKind::Union(members) => join(members, " | "),
            TypeKind::Blueprint { name, .. } => name.clone(),
        }
    }
}

fn join(types: &[Type], separator: &str) -> String {
    types
        .iter()
        .map(Type::full_name)
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}
