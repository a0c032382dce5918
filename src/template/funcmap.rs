use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::{Error, Result, Store};

/// A function callable from a template by name.
pub type TemplateFn = Box<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Names under which [`FuncMap::new`] binds the store's queries.
pub const STORE_FUNCS: [&str; 8] = ["exists", "ls", "lsdir", "get", "gets", "getallkvs", "getv", "getvs"];

/// Name-keyed table of functions handed to a template renderer.
pub struct FuncMap {
    funcs: BTreeMap<String, TemplateFn>,
}

impl FuncMap {
    /// Creates a table with the store's queries bound under [`STORE_FUNCS`].
    pub fn new(store: Arc<dyn Store>) -> Self {
        let mut map = Self::empty();

        let s = store.clone();
        map.register("exists", move |args| {
            let key = single_string("exists", args)?;
            Ok(Value::Bool(s.exists(key)))
        });
        let s = store.clone();
        map.register("ls", move |args| {
            let path = single_string("ls", args)?;
            Ok(serde_json::to_value(s.list(path))?)
        });
        let s = store.clone();
        map.register("lsdir", move |args| {
            let path = single_string("lsdir", args)?;
            Ok(serde_json::to_value(s.list_dir(path))?)
        });
        let s = store.clone();
        map.register("get", move |args| {
            let key = single_string("get", args)?;
            Ok(serde_json::to_value(s.get(key))?)
        });
        let s = store.clone();
        map.register("gets", move |args| {
            let pattern = single_string("gets", args)?;
            Ok(serde_json::to_value(s.get_all(pattern))?)
        });
        let s = store.clone();
        map.register("getallkvs", move |args| {
            check_arity("getallkvs", args, 0..=0, "0")?;
            Ok(serde_json::to_value(s.get_all_kvs())?)
        });
        let s = store.clone();
        map.register("getv", move |args| {
            check_arity("getv", args, 1..=2, "1 or 2")?;
            let key = string_arg("getv", args, 0)?;
            let default = match args.get(1) {
                Some(_) => Some(string_arg("getv", args, 1)?),
                None => None,
            };
            Ok(Value::String(s.get_value(key, default)))
        });
        let s = store;
        map.register("getvs", move |args| {
            let pattern = single_string("getvs", args)?;
            Ok(serde_json::to_value(s.get_all_values(pattern))?)
        });

        map
    }

    /// Creates a table with no functions registered.
    pub fn empty() -> Self {
        Self { funcs: BTreeMap::new() }
    }

    /// Binds `f` under `name`, replacing any function already registered there.
    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.funcs.insert(name.to_string(), Box::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&TemplateFn> {
        self.funcs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.funcs.keys().map(String::as_str).collect()
    }

    /// Invokes the function registered under `name`.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let f = self
            .get(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
        f(args)
    }
}

fn check_arity(
    name: &str,
    args: &[Value],
    allowed: std::ops::RangeInclusive<usize>,
    expected: &'static str,
) -> Result<()> {
    if allowed.contains(&args.len()) {
        return Ok(());
    }
    Err(Error::Arity {
        name: name.to_string(),
        expected,
        got: args.len(),
    })
}

fn string_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::ArgumentType {
            name: name.to_string(),
            index,
        })
}

fn single_string<'a>(name: &str, args: &'a [Value]) -> Result<&'a str> {
    check_arity(name, args, 1..=1, "1")?;
    string_arg(name, args, 0)
}
