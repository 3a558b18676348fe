// Route table and path matching.
// Maps locations to a query, its variables and the view that renders it.

pub mod preload;

use std::collections::HashMap;

use serde_json::{Value, json};

use crate::error::{BlogError, Result};
use crate::github::Operation;
use crate::github::operations::{POST_QUERY, POSTS_QUERY};

pub use preload::preload;

/// Parameters captured from a matched path.
pub type RouteParams = HashMap<String, String>;

/// Which view renders a route's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Posts,
    Post,
}

/// Immutable route declaration.
#[derive(Debug)]
pub struct RouteDescriptor {
    pub pattern: &'static str,
    pub operation: &'static Operation,
    pub variables: fn(&RouteParams) -> Result<Value>,
    pub view: ViewKind,
}

/// Routes in precedence order for equally ranked matches.
pub static ROUTES: [RouteDescriptor; 3] = [
    RouteDescriptor {
        pattern: "/",
        operation: &POSTS_QUERY,
        variables: posts_variables,
        view: ViewKind::Posts,
    },
    RouteDescriptor {
        pattern: "/post/:issueNumber/:slug?",
        operation: &POST_QUERY,
        variables: post_variables,
        view: ViewKind::Post,
    },
    RouteDescriptor {
        pattern: "/post/:issueNumber",
        operation: &POST_QUERY,
        variables: post_variables,
        view: ViewKind::Post,
    },
];

fn posts_variables(_params: &RouteParams) -> Result<Value> {
    Ok(json!({}))
}

fn post_variables(params: &RouteParams) -> Result<Value> {
    let issue_number = params
        .get("issueNumber")
        .and_then(|raw| raw.parse::<u64>().ok())
        .ok_or_else(|| BlogError::NotFound("Missing post.".to_string()))?;
    Ok(json!({ "issueNumber": issue_number }))
}

/// A location resolved against the route table.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: &'static RouteDescriptor,
    pub params: RouteParams,
    pub path: String,
}

impl RouteMatch {
    pub fn variables(&self) -> Result<Value> {
        (self.route.variables)(&self.params)
    }

    pub fn view(&self) -> ViewKind {
        self.route.view
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Static(&'a str),
    Param(&'a str),
    Optional(&'a str),
}

const SEGMENT_POINTS: u32 = 4;
const STATIC_POINTS: u32 = 3;
const DYNAMIC_POINTS: u32 = 2;
const ROOT_POINTS: u32 = 1;

fn parse_pattern(pattern: &str) -> Vec<Segment<'_>> {
    split_path(pattern)
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => match name.strip_suffix('?') {
                Some(name) => Segment::Optional(name),
                None => Segment::Param(name),
            },
            None => Segment::Static(segment),
        })
        .collect()
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Match one pattern, returning its rank and captured parameters.
fn match_pattern(pattern: &str, path: &str) -> Option<(u32, RouteParams)> {
    let segments = parse_pattern(pattern);
    let mut parts = split_path(path).peekable();
    let mut params = RouteParams::new();

    if segments.is_empty() {
        return parts.peek().is_none().then_some((ROOT_POINTS, params));
    }

    let mut score = 0;
    for segment in segments {
        match (segment, parts.next()) {
            (Segment::Static(expected), Some(part)) if expected == part => {
                score += SEGMENT_POINTS + STATIC_POINTS;
            }
            (Segment::Param(name), Some(part)) | (Segment::Optional(name), Some(part)) => {
                params.insert(name.to_string(), part.to_string());
                score += SEGMENT_POINTS + DYNAMIC_POINTS;
            }
            (Segment::Optional(_), None) => {}
            _ => return None,
        }
    }

    parts.peek().is_none().then_some((score, params))
}

/// Remove the basepath prefix; `None` when the path lies outside it.
fn strip_basepath<'a>(basepath: &str, path: &'a str) -> Option<&'a str> {
    let base = basepath.trim_end_matches('/');
    if base.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Resolve a location to the best-ranked route.
///
/// Query string and fragment are ignored. Equal ranks go to the earlier route.
pub fn resolve(basepath: &str, location: &str) -> Option<RouteMatch> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let path = strip_basepath(basepath, path)?;

    let mut best: Option<(u32, &'static RouteDescriptor, RouteParams)> = None;
    for route in ROUTES.iter() {
        if let Some((score, params)) = match_pattern(route.pattern, path) {
            if best.as_ref().is_none_or(|(top, _, _)| score > *top) {
                best = Some((score, route, params));
            }
        }
    }

    best.map(|(_, route, params)| RouteMatch {
        route,
        params,
        path: location.to_string(),
    })
}
