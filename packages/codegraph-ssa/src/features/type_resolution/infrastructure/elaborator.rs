/*
 * Type elaborator
 *
 * Syntactic type annotation → semantic `Type`.
 *
 * Resolution order for a named reference:
 * 1. Structural builtins (`Array`, `Promise`, `Map`, `Set`, `Record`)
 * 2. Names the unit defines (classes, interfaces, enums, aliases)
 * 3. Builtin objects (`Date`, `RegExp`, `Error`, ...)
 * 4. Opaque named object
 */

use crate::features::syntax::domain::ast::{LiteralType, TypeNode, TypeNodeKind};
use crate::features::type_resolution::domain::{Type, TypeKind};
use crate::features::type_resolution::ports::TypeLookup;
use crate::shared::models::Span;

use super::builtins::is_builtin_object;

pub fn elaborate(node: &TypeNode, lookup: &dyn TypeLookup) -> Type {
    match &node.kind {
        TypeNodeKind::Keyword(keyword) => keyword_type(keyword),
        TypeNodeKind::Reference { name, args } => {
            let args: Vec<Type> = args.iter().map(|arg| elaborate(arg, lookup)).collect();
            reference_type(name, args, lookup)
        }
        TypeNodeKind::Array(element) => Type::slice(elaborate(element, lookup)),
        TypeNodeKind::Union(members) => {
            Type::union(members.iter().map(|m| elaborate(m, lookup)).collect())
        }
        TypeNodeKind::Intersection(members) => members
            .first()
            .map(|first| elaborate(first, lookup))
            .unwrap_or_else(Type::any),
        TypeNodeKind::Tuple(_) => Type::slice(Type::any()),
        TypeNodeKind::Function {
            params,
            return_type,
        } => Type::function(
            params.iter().map(|p| elaborate(p, lookup)).collect(),
            elaborate(return_type, lookup),
        ),
        TypeNodeKind::Literal(literal) => match literal {
            LiteralType::Number(_) => Type::number(),
            LiteralType::String(_) => Type::string(),
            LiteralType::Boolean(_) => Type::boolean(),
            LiteralType::Null => Type::null(),
            LiteralType::Undefined => Type::undefined(),
        },
        TypeNodeKind::Optional(inner) => {
            Type::union(vec![elaborate(inner, lookup), Type::undefined()])
        }
        TypeNodeKind::Parenthesized(inner) => elaborate(inner, lookup),
        TypeNodeKind::ObjectLiteral => Type::object("object", Vec::new()),
        TypeNodeKind::TypeQuery(_) | TypeNodeKind::This | TypeNodeKind::Unsupported(_) => {
            Type::any()
        }
    }
}

fn keyword_type(keyword: &str) -> Type {
    match keyword {
        "number" | "bigint" => Type::number(),
        "string" => Type::string(),
        "boolean" => Type::boolean(),
        "void" | "undefined" => Type::undefined(),
        "null" => Type::null(),
        "object" => Type::object("object", Vec::new()),
        "symbol" => Type::object("Symbol", Vec::new()),
        // any, unknown, never
        _ => Type::any(),
    }
}

fn reference_type(name: &str, mut args: Vec<Type>, lookup: &dyn TypeLookup) -> Type {
    let mut first_arg = || {
        if args.is_empty() {
            Type::any()
        } else {
            args.remove(0)
        }
    };
    match name {
        "Array" | "ReadonlyArray" => return Type::slice(first_arg()),
        "Promise" | "PromiseLike" => return Type::promise(first_arg()),
        "Map" | "WeakMap" | "ReadonlyMap" | "Record" => {
            let key = first_arg();
            let value = first_arg();
            return Type::map(key, value);
        }
        "Set" | "WeakSet" | "ReadonlySet" => return Type::object("Set", vec![first_arg()]),
        "String" => return Type::string(),
        "Number" => return Type::number(),
        "Boolean" => return Type::boolean(),
        _ => {}
    }

    if let Some(found) = lookup.lookup_type(name) {
        return found.with_name(name);
    }
    // A.B: retry with the last segment
    if let Some((_, last)) = name.rsplit_once('.') {
        if let Some(found) = lookup.lookup_type(last) {
            return found.with_name(name);
        }
    }
    if is_builtin_object(name) {
        return Type::object(name, Vec::new());
    }
    Type::object(name, args)
}

/// Outcome of merging an inferred type with an annotation
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMerge {
    pub ty: Option<Type>,
    /// `(explicit, inferred)` full names when the kinds disagree
    pub mismatch: Option<(String, String)>,
}

/// Merge an inferred type with an explicit annotation
///
/// A missing or `any` side yields the other; equal kinds merge their name
/// sets with the explicit names first; differing kinds keep the explicit
/// type and report a mismatch.
pub fn merge_type_with_annotation(inferred: Option<&Type>, explicit: Option<&Type>) -> TypeMerge {
    let kept = |ty: Option<&Type>| TypeMerge {
        ty: ty.cloned(),
        mismatch: None,
    };
    let (inferred, explicit) = match (inferred, explicit) {
        (None, explicit) => return kept(explicit),
        (inferred, None) => return kept(inferred),
        (Some(inferred), Some(explicit)) => (inferred, explicit),
    };
    if explicit.is_any() {
        return kept(Some(inferred));
    }
    if inferred.is_any() {
        return kept(Some(explicit));
    }

    if inferred.kind_name() == explicit.kind_name() {
        let mut merged = explicit.clone();
        for name in &inferred.names {
            if !merged.names.contains(name) {
                merged.names.push(name.clone());
            }
        }
        return kept(Some(&merged));
    }

    let mismatch = if compatible(explicit, inferred) {
        None
    } else {
        Some((explicit.full_name(), inferred.full_name()))
    };
    TypeMerge {
        ty: Some(explicit.clone()),
        mismatch,
    }
}

/// Kind pairs that differ but are not worth a warning
fn compatible(explicit: &Type, inferred: &Type) -> bool {
    match (&explicit.kind, &inferred.kind) {
        (_, TypeKind::Undefined | TypeKind::Null) => true,
        (TypeKind::Union(members), _) => members.iter().any(|m| {
            m.is_any() || m.kind_name() == inferred.kind_name() || compatible(m, inferred)
        }),
        // enum members are numbers or strings; interfaces describe any object
        (TypeKind::Blueprint { .. }, _) => true,
        (TypeKind::Object { .. }, TypeKind::Blueprint { .. } | TypeKind::Map { .. }) => true,
        (TypeKind::Function { .. }, TypeKind::Blueprint { .. }) => true,
        _ => false,
    }
}

/// Build a type from its printed name: `Promise<string>`, `number[]`, `A | B`
pub fn create_type_by_name(name: &str, lookup: &dyn TypeLookup) -> Type {
    elaborate(&parse_type_name(name), lookup)
}

fn parse_type_name(name: &str) -> TypeNode {
    let name = name.trim();
    let node = |kind| TypeNode::new(kind, Span::zero());

    let members = split_top_level(name, '|');
    if members.len() > 1 {
        return node(TypeNodeKind::Union(
            members.into_iter().map(parse_type_name).collect(),
        ));
    }
    if let Some(element) = name.strip_suffix("[]") {
        return node(TypeNodeKind::Array(Box::new(parse_type_name(element))));
    }
    if let Some(inner) = name.strip_prefix('(').and_then(|n| n.strip_suffix(')')) {
        return node(TypeNodeKind::Parenthesized(Box::new(parse_type_name(inner))));
    }
    if let (Some(open), true) = (name.find('<'), name.ends_with('>')) {
        let base = &name[..open];
        let inner = &name[open + 1..name.len() - 1];
        return node(TypeNodeKind::Reference {
            name: base.trim().to_string(),
            args: split_top_level(inner, ',')
                .into_iter()
                .map(parse_type_name)
                .collect(),
        });
    }
    match name {
        "number" | "string" | "boolean" | "any" | "unknown" | "never" | "void" | "undefined"
        | "null" | "object" | "symbol" | "bigint" => node(TypeNodeKind::Keyword(name.to_string())),
        "" => node(TypeNodeKind::Keyword("any".to_string())),
        _ => node(TypeNodeKind::Reference {
            name: name.to_string(),
            args: Vec::new(),
        }),
    }
}

/// Split on `separator` outside of `<>` and `()` nesting
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}
