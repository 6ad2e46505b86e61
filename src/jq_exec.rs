//! jq pre-filter for input documents, backed by jaq.
use anyhow::{Context, Result, anyhow};
use jaq_core::{Compiler, Ctx, RcIter, compile::Undefined, load};
use jaq_json::Val;
use serde_json::Value;

/// Run `filter_src` over one document; every output becomes its own document.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    for (ix, item) in outputs.enumerate() {
        let val = item.map_err(|e| anyhow!("jq output #{ix}: {e:?}"))?;
        // Val renders as JSON text
        let doc = serde_json::from_str::<Value>(&val.to_string())
            .with_context(|| format!("jq output #{ix} is not JSON"))?;
        out.push(doc);
    }
    Ok(out)
}

fn format_parse_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> anyhow::Error {
    let lines = errs
        .into_iter()
        .map(|(file, err)| format!("parse error: {err:?} in `{}`", file.code))
        .collect::<Vec<_>>();
    anyhow!(lines.join("\n"))
}

fn format_undefined_errors(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> anyhow::Error {
    let lines = errs
        .into_iter()
        .flat_map(|(file, list)| {
            list.into_iter()
                .map(move |(name, undef)| format!("undefined `{name}`: {undef:?} in `{}`", file.code))
        })
        .collect::<Vec<_>>();
    anyhow!(lines.join("\n"))
}
