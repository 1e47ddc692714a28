//! config command - Show, get, or set configuration values

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::config::{Config, FileConfig};
use crate::git::Git;
use crate::ui::output;

/// Keys accepted by `get` and `set`.
pub const KEYS: &[&str] = &[
    "layout.batch_size",
    "layout.parallel",
    "layout.threads",
    "display.max_rows",
    "display.decorate",
];

/// Repository config root, if `cwd` is inside a repository.
fn repo_root(ctx: &Context) -> Result<Option<PathBuf>> {
    let cwd = ctx.cwd()?;
    Ok(Git::open(&cwd).ok().map(|git| git.config_root().to_path_buf()))
}

fn load(ctx: &Context) -> Result<(Config, Option<PathBuf>)> {
    let root = repo_root(ctx)?;
    let config = Config::load(root.as_deref()).context("Failed to load config")?;
    Ok((config, root))
}

/// Effective value of a key, formatted for display.
pub fn effective_value(config: &Config, key: &str) -> Result<String> {
    let value = match key {
        "layout.batch_size" => config.batch_size().to_string(),
        "layout.parallel" => config.parallel().to_string(),
        "layout.threads" => config.threads().to_string(),
        "display.max_rows" => config
            .max_rows()
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string()),
        "display.decorate" => config.decorate().to_string(),
        _ => bail!("Unknown configuration key: {}", key),
    };
    Ok(value)
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("Invalid value for {}: {}", key, value))
}

/// Set `key` in one config file.
pub fn apply_value(file: &mut FileConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "layout.batch_size" => {
            file.layout.get_or_insert_with(Default::default).batch_size = Some(parse(key, value)?)
        }
        "layout.parallel" => {
            file.layout.get_or_insert_with(Default::default).parallel = Some(parse(key, value)?)
        }
        "layout.threads" => {
            file.layout.get_or_insert_with(Default::default).threads = Some(parse(key, value)?)
        }
        "display.max_rows" => {
            file.display.get_or_insert_with(Default::default).max_rows = Some(parse(key, value)?)
        }
        "display.decorate" => {
            file.display.get_or_insert_with(Default::default).decorate = Some(parse(key, value)?)
        }
        _ => bail!("Unknown configuration key: {}", key),
    }
    file.validate()?;
    Ok(())
}

/// Print every key with its effective value and the files it came from.
pub fn show(ctx: &Context) -> Result<()> {
    let (config, _) = load(ctx)?;

    let source = |path: Option<&std::path::Path>| {
        path.map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
    };
    println!("# global: {}", source(config.global_config_loaded_from()));
    println!("# repo:   {}", source(config.repo_config_loaded_from()));

    for key in KEYS {
        println!("{} = {}", key, effective_value(&config, key)?);
    }
    Ok(())
}

/// Print the effective value of one key.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let (config, _) = load(ctx)?;
    println!("{}", effective_value(&config, key)?);
    Ok(())
}

/// Set a value in the repository (or global) config file.
pub fn set(ctx: &Context, key: &str, value: &str, global: bool) -> Result<()> {
    let (config, root) = load(ctx)?;

    let path = if global {
        let mut file = config.global.clone();
        apply_value(&mut file, key, value)?;
        Config::write_global(&file).context("Failed to write config")?
    } else {
        let Some(root) = root else {
            bail!("Not inside a git repository; use --global to set a global value");
        };
        let mut file = config.repo.clone().unwrap_or_default();
        apply_value(&mut file, key, value)?;
        Config::write_repo(&root, &file).context("Failed to write config")?
    };

    output::success(
        format!("Set {} = {} in {}", key, value, path.display()),
        ctx.verbosity(),
    );
    Ok(())
}
