use anyhow::{Context, Result, bail};
use std::env;
use std::fs;
use std::path::PathBuf;

use dirauto_config::DirConfig;
use dirauto_directive::{DirContext, Scope, View};
use dirauto_text::bidi::Direction;

const USAGE: &str = "Usage: dirauto [--config <dirauto.toml>] <command>

Commands:
  classify <text>                      print ltr, rtl or neutral
  escape <ltr|rtl> <tag> <attr> <value>  print the escaped attribute value
  render <file.html> [key=value ...]   print the direction of every element with a dir attribute";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let mut config_path: Option<PathBuf> = None;
    if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            bail!("--config expects a path");
        }
        config_path = Some(PathBuf::from(args.remove(1)));
        args.remove(0);
    }

    let config = match &config_path {
        Some(path) => {
            let mut config = DirConfig::load_from_file(path)?;
            config.merge_with_env();
            config
        }
        None => DirConfig::load(),
    };
    log::debug!(
        "bidi enabled={} heuristic={:?} locale={}",
        config.bidi.enabled,
        config.bidi.heuristic,
        config.bidi.locale
    );
    let context = DirContext::from_config(&config);

    let Some(command) = args.first().cloned() else {
        eprintln!("{USAGE}");
        bail!("missing <command>");
    };
    let rest = &args[1..];

    match command.as_str() {
        "classify" => {
            let text = rest.join(" ");
            let dir = context.policy().classifier().classify(&text);
            println!("{dir}");
        }
        "escape" => {
            let [dir, tag, attr, value] = rest else {
                eprintln!("{USAGE}");
                bail!("escape expects <ltr|rtl> <tag> <attr> <value>");
            };
            let element_dir = Direction::from_html_dir(dir);
            if element_dir.is_neutral() {
                bail!("element direction must be ltr or rtl, got '{dir}'");
            }
            let escaped = context.policy().escape(element_dir, attr, tag, value);
            println!("{escaped}");
        }
        "render" => {
            let Some(input) = rest.first() else {
                eprintln!("{USAGE}");
                bail!("missing <file.html>");
            };
            let html = fs::read_to_string(input)
                .with_context(|| format!("failed to read HTML file '{input}'"))?;

            let mut scope = Scope::new();
            for binding in &rest[1..] {
                let Some((key, value)) = binding.split_once('=') else {
                    bail!("scope binding must look like key=value, got '{binding}'");
                };
                scope.set(key, value);
            }

            let mut view = View::compile_with(&html, &context)?;
            view.digest(&scope);
            log::info!("rendered {input}");
            for id in view.controlled_elements() {
                println!(
                    "<{}> dir={:?} text={:?}",
                    view.tag(id).unwrap_or_default(),
                    view.dir_property(id),
                    view.text_content(id).trim()
                );
            }
        }
        other => {
            eprintln!("{USAGE}");
            bail!("unknown command '{other}'");
        }
    }
    Ok(())
}
